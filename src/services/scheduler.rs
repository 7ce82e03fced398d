//! Background loops started once on the first `ready`.
//!
//! Every loop ticks on a `tokio::time::interval`, logs its own failures and keeps going.

use crate::AppState;
use crate::commands::leveling::kumpul::process_sessions;
use crate::commands::quests::logic::{generate_daily_quest, is_generation_hour, sweep_completions};
use crate::commands::quests::run::announce_quest;
use crate::commands::quests::ui::completion_embed;
use crate::commands::shop::logic::generate_daily_shop;
use crate::commands::shop::run::announce_shop;
use crate::commands::tax::logic::{collect_weekly_tax, is_weekly_tax_window, week_start};
use crate::commands::tax::run::report_embed;
use crate::commands::trading::alerts::check_price_alerts;
use crate::constants::{FISH_MARKET_REFRESH_MINS, PRICE_ALERT_INTERVAL_SECS, QUEST_SWEEP_INTERVAL_SECS};
use crate::database;
use chrono::{DateTime, Utc};
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::prelude::Context;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

const MINUTE: Duration = Duration::from_secs(60);
const HOUR: Duration = Duration::from_secs(60 * 60);

/// Spawns every loop. Later calls (gateway reconnects) are no-ops.
pub fn start(ctx: &Context, state: &Arc<AppState>) {
    if state.schedulers_started.swap(true, Ordering::SeqCst) {
        debug!(target: "scheduler", "loops already running");
        return;
    }
    spawn_loop("kumpul", MINUTE, ctx, state, |ctx, state| async move {
        process_sessions(&ctx, &state, Utc::now()).await?;
        Ok(())
    });
    spawn_loop("quests.generate", HOUR, ctx, state, |ctx, state| async move {
        quest_tick(&ctx, &state, Utc::now()).await
    });
    spawn_loop(
        "quests.sweep",
        Duration::from_secs(QUEST_SWEEP_INTERVAL_SECS),
        ctx,
        state,
        |ctx, state| async move { sweep_tick(&ctx, &state).await },
    );
    spawn_loop("shop.daily", HOUR, ctx, state, |ctx, state| async move {
        if let Some((shop_id, slots)) = generate_daily_shop(&state.db, Utc::now(), false).await? {
            announce_shop(&ctx, &state, &shop_id, &slots).await;
        }
        Ok(())
    });
    spawn_loop(
        "fishing.market",
        Duration::from_secs(FISH_MARKET_REFRESH_MINS * 60),
        ctx,
        state,
        |_, state| async move {
            let now = Utc::now();
            let mut market = state.fish_market.write().await;
            {
                let mut rng = rand::rng();
                market.reprice(&mut rng, now);
            }
            debug!(target: "fishing.market", "fish market repriced");
            Ok(())
        },
    );
    spawn_loop(
        "trading.alert",
        Duration::from_secs(PRICE_ALERT_INTERVAL_SECS),
        ctx,
        state,
        |ctx, state| async move {
            check_price_alerts(&ctx, &state).await;
            Ok(())
        },
    );
    spawn_weekly_tax(ctx, state);
    info!(target: "scheduler", "background loops started");
}

fn spawn_loop<F, Fut>(name: &'static str, every: Duration, ctx: &Context, state: &Arc<AppState>, step: F)
where
    F: Fn(Context, Arc<AppState>) -> Fut + Send + 'static,
    Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let ctx = ctx.clone();
    let state = Arc::clone(state);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if let Err(e) = step(ctx.clone(), Arc::clone(&state)).await {
                warn!(target: "scheduler", task = name, error = %e, "background task failed");
            }
        }
    });
}

/// Generates at 07:00 WIB, or whenever no quest is running (first boot, missed hour).
async fn quest_tick(ctx: &Context, state: &AppState, now: DateTime<Utc>) -> anyhow::Result<()> {
    let running = database::quests::active_quest(&state.db, now).await?;
    if running.is_some() && !is_generation_hour(now) {
        return Ok(());
    }
    if let Some(quest) = generate_daily_quest(&state.db, now).await? {
        announce_quest(ctx, state, &quest).await;
    }
    Ok(())
}

async fn sweep_tick(ctx: &Context, state: &AppState) -> anyhow::Result<()> {
    let done = sweep_completions(&state.db).await?;
    if done.is_empty() {
        return Ok(());
    }
    let Some(channel) = state.config.quest_channel_id else {
        return Ok(());
    };
    for completed in &done {
        post(ctx, channel, completion_embed(completed), "quests.sweep").await;
    }
    Ok(())
}

/// Checks every minute and collects once inside the Monday window. The last collected
/// week lives in the task, so a restart inside the window can collect again.
fn spawn_weekly_tax(ctx: &Context, state: &Arc<AppState>) {
    let ctx = ctx.clone();
    let state = Arc::clone(state);
    tokio::spawn(async move {
        let mut collected_week: Option<DateTime<Utc>> = None;
        let mut interval = tokio::time::interval(MINUTE);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let now = Utc::now();
            let week = week_start(now);
            if !is_weekly_tax_window(now) || collected_week == Some(week) {
                continue;
            }
            match collect_weekly_tax(&state.db, now).await {
                Ok(report) => {
                    collected_week = Some(week);
                    if let Some(channel) = state.config.quest_channel_id {
                        post(&ctx, channel, report_embed(&report, false), "tax.weekly").await;
                    }
                }
                Err(e) => warn!(target: "tax.weekly", error = %e, "weekly tax collection failed"),
            }
        }
    });
}

async fn post(ctx: &Context, channel: serenity::model::id::ChannelId, embed: CreateEmbed, target: &'static str) {
    if let Err(e) = channel
        .send_message(&ctx.http, CreateMessage::new().embed(embed))
        .await
    {
        warn!(target: "scheduler", task = target, channel = channel.get(), error = %e, "announcement failed");
    }
}
