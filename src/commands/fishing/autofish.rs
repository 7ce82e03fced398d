//! Per-user auto-fishing tasks: one background catch per minute until the session ends.

use super::logic::{land_catch, roll_haul, upgrade_levels};
use super::ui;
use crate::AppState;
use crate::constants::AUTOFISH_INTERVAL_SECS;
use chrono::{DateTime, Utc};
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// A running auto-fishing session, owned by `AppState::autofish`.
pub struct AutofishTask {
    pub handle: JoinHandle<()>,
    pub started_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub channel_id: ChannelId,
    pub casts: Arc<AtomicI64>,
    pub fish: Arc<AtomicI64>,
}

impl AutofishTask {
    pub fn casts(&self) -> i64 {
        self.casts.load(Ordering::Relaxed)
    }

    pub fn fish(&self) -> i64 {
        self.fish.load(Ordering::Relaxed)
    }
}

/// True while the member sits in any voice channel of the guild.
pub fn in_voice(ctx: &Context, guild_id: Option<GuildId>, user_id: UserId) -> bool {
    let Some(guild_id) = guild_id else {
        return false;
    };
    ctx.cache.guild(guild_id).is_some_and(|guild| {
        guild
            .voice_states
            .get(&user_id)
            .is_some_and(|v| v.channel_id.is_some())
    })
}

/// Spawns the loop and registers it. Returns `false` if the user already has one.
pub async fn start(
    ctx: &Context,
    state: &Arc<AppState>,
    user_id: UserId,
    guild_id: Option<GuildId>,
    channel_id: ChannelId,
    hours: i64,
) -> bool {
    let mut tasks = state.autofish.write().await;
    if tasks.contains_key(&user_id) {
        return false;
    }
    let started_at = Utc::now();
    let ends_at = started_at + chrono::Duration::hours(hours);
    let casts = Arc::new(AtomicI64::new(0));
    let fish = Arc::new(AtomicI64::new(0));

    let handle = tokio::spawn(run_loop(
        ctx.clone(),
        Arc::clone(state),
        user_id,
        guild_id,
        channel_id,
        started_at,
        ends_at,
        Arc::clone(&casts),
        Arc::clone(&fish),
    ));
    tasks.insert(
        user_id,
        AutofishTask {
            handle,
            started_at,
            ends_at,
            channel_id,
            casts,
            fish,
        },
    );
    info!(target: "fishing.auto", user = user_id.get(), hours, "autofish started");
    true
}

/// Aborts and removes the user's task, returning it for the summary.
pub async fn stop(state: &AppState, user_id: UserId) -> Option<AutofishTask> {
    let task = state.autofish.write().await.remove(&user_id)?;
    task.handle.abort();
    info!(target: "fishing.auto", user = user_id.get(), casts = task.casts(), "autofish stopped");
    Some(task)
}

#[allow(clippy::too_many_arguments)]
async fn run_loop(
    ctx: Context,
    state: Arc<AppState>,
    user_id: UserId,
    guild_id: Option<GuildId>,
    channel_id: ChannelId,
    started_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    casts: Arc<AtomicI64>,
    fish: Arc<AtomicI64>,
) {
    let mut ticker = tokio::time::interval(Duration::from_secs(AUTOFISH_INTERVAL_SECS));
    loop {
        ticker.tick().await;
        if Utc::now() >= ends_at {
            break;
        }
        match cast_once(&ctx, &state, user_id, guild_id).await {
            Ok((embed, caught)) => {
                casts.fetch_add(1, Ordering::Relaxed);
                fish.fetch_add(caught, Ordering::Relaxed);
                let message = CreateMessage::new()
                    .content(format!("<@{user_id}>"))
                    .embed(embed);
                if let Err(e) = channel_id.send_message(&ctx.http, message).await {
                    warn!(target: "fishing.auto", user = user_id.get(), error = %e, "could not post catch");
                }
            }
            Err(e) => {
                warn!(target: "fishing.auto", user = user_id.get(), error = %e, "autofish cast failed");
            }
        }
    }

    // A newer session for the same user keeps its own entry.
    {
        let mut tasks = state.autofish.write().await;
        if tasks
            .get(&user_id)
            .is_some_and(|t| t.started_at == started_at)
        {
            tasks.remove(&user_id);
        }
    }
    let summary = CreateEmbed::new()
        .title("🤖 Auto-Fishing Finished")
        .description(format!(
            "<@{user_id}>'s session is over.\n🎣 Casts: **{}**\n🐟 Fish caught: **{}**",
            casts.load(Ordering::Relaxed),
            fish.load(Ordering::Relaxed)
        ))
        .color(crate::ui::style::COLOR_INFO);
    if let Err(e) = channel_id
        .send_message(&ctx.http, CreateMessage::new().embed(summary))
        .await
    {
        warn!(target: "fishing.auto", user = user_id.get(), error = %e, "could not post summary");
    }
    info!(target: "fishing.auto", user = user_id.get(), "autofish finished");
}

async fn cast_once(
    ctx: &Context,
    state: &AppState,
    user_id: UserId,
    guild_id: Option<GuildId>,
) -> Result<(CreateEmbed, i64), sqlx::Error> {
    let (rod, _, net) = upgrade_levels(&state.db, user_id).await?;
    let voice = in_voice(ctx, guild_id, user_id);
    let haul = {
        let mut rng = rand::rng();
        roll_haul(&mut rng, rod, net, voice)
    };
    let outcome = land_catch(&state.db, user_id, &haul, Utc::now(), false).await?;
    let market = state.fish_market.read().await;
    let caught = haul.iter().map(|(_, n)| n).sum();
    Ok((
        ui::catch_embed(&haul, &market, voice, true, &outcome.unlocked),
        caught,
    ))
}
