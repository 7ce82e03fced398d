//! Shared runtime state, stored in Serenity's `TypeMap` as `Arc<AppState>`.

use crate::commands::fishing::autofish::AutofishTask;
use crate::commands::fishing::logic::FishMarket;
use crate::commands::trading::alerts::PriceAlert;
use crate::config::Config;
use crate::database::DbPool;
use crate::services::prices::PriceClient;
use chrono::Utc;
use serenity::model::id::UserId;
use serenity::prelude::TypeMapKey;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::RwLock;

pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub prices: PriceClient,
    /// Species prices, repriced every 15 minutes.
    pub fish_market: RwLock<FishMarket>,
    /// Users with a jade stone bought but not yet cut. A std mutex so the guard can release on drop.
    pub jade_sessions: Mutex<HashSet<UserId>>,
    pub autofish: RwLock<HashMap<UserId, AutofishTask>>,
    pub price_alerts: RwLock<HashMap<UserId, Vec<PriceAlert>>>,
    /// Set on the first `ready`; reconnects must not spawn the loops twice.
    pub schedulers_started: AtomicBool,
}

impl AppState {
    pub fn new(db: DbPool, config: Config, prices: PriceClient) -> Self {
        Self {
            db,
            config,
            prices,
            fish_market: RwLock::new(FishMarket::at_base(Utc::now())),
            jade_sessions: Mutex::new(HashSet::new()),
            autofish: RwLock::new(HashMap::new()),
            price_alerts: RwLock::new(HashMap::new()),
            schedulers_started: AtomicBool::new(false),
        }
    }

    pub async fn from_ctx(ctx: &serenity::prelude::Context) -> Option<Arc<Self>> {
        ctx.data.read().await.get::<AppState>().cloned()
    }

    /// Claims the single jade slot of a user. `None` while they already hold one.
    pub fn begin_jade_session(self: &Arc<Self>, user_id: UserId) -> Option<JadeSessionGuard> {
        let mut sessions = self
            .jade_sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if !sessions.insert(user_id) {
            return None;
        }
        Some(JadeSessionGuard {
            state: Arc::clone(self),
            user_id,
        })
    }
}

impl TypeMapKey for AppState {
    type Value = Arc<AppState>;
}

/// Releases the user's jade slot when dropped, on every exit path.
pub struct JadeSessionGuard {
    state: Arc<AppState>,
    user_id: UserId,
}

impl Drop for JadeSessionGuard {
    fn drop(&mut self) {
        self.state
            .jade_sessions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.user_id);
    }
}
