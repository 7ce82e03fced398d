//! Contains the run logic for `quest`, `queststats` and `qhelp`, plus the quest announcer.

use super::logic::next_reset;
use super::ui;
use crate::AppState;
use crate::commands::common::{reply, target_or_author};
use crate::database;
use crate::database::models::GlobalQuest;
use crate::error::CommandResult;
use crate::ui::style::{COLOR_INFO, help_embed};
use chrono::Utc;
use serenity::builder::CreateMessage;
use serenity::model::channel::Message;
use serenity::prelude::*;
use std::sync::Arc;
use tracing::warn;

/// Posts a new quest with `@everyone` to the configured announcement channel.
pub async fn announce_quest(ctx: &Context, state: &AppState, quest: &GlobalQuest) {
    let Some(channel) = state.config.quest_channel_id else {
        return;
    };
    let builder = CreateMessage::new()
        .content("@everyone")
        .embed(ui::announcement_embed(quest));
    if let Err(e) = channel.send_message(&ctx.http, builder).await {
        warn!(target: "quests.generate", channel = channel.get(), error = %e, "quest announcement failed");
    }
}

pub async fn run_quest(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let now = Utc::now();
    let Some(quest) = database::quests::active_quest(&state.db, now).await? else {
        reply(ctx, msg, ui::no_quest_embed(next_reset(now))).await?;
        return Ok(());
    };
    let mine = database::quests::user_progress(&state.db, &quest.quest_id, msg.author.id).await?;
    let top = database::quests::top_progress(&state.db, &quest.quest_id, 10).await?;
    let participation = database::quests::participation(&state.db, &quest.quest_id).await?;
    reply(ctx, msg, ui::quest_embed(&quest, mine.as_ref(), &top, participation)).await?;
    Ok(())
}

pub async fn run_quest_stats(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    let user = target_or_author(ctx, msg, args.first()).await?;
    let stats = database::quests::quest_stats(&state.db, user.id).await?;
    let quest = database::quests::active_quest(&state.db, Utc::now()).await?;
    let progress = match &quest {
        Some(q) => database::quests::user_progress(&state.db, &q.quest_id, user.id).await?,
        None => None,
    };
    let current = quest.as_ref().map(|q| (q, progress.as_ref()));
    reply(ctx, msg, ui::stats_embed(&user.name, &stats, current)).await?;
    Ok(())
}

pub async fn run_quest_help(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let p = &state.config.prefix;
    let embed = help_embed(
        "📖 Daily Quest System",
        "One global quest per day, shared by every player.",
        COLOR_INFO,
        &[
            (
                "📋 Commands",
                format!("`{p}quest` today's quest and leaderboard\n`{p}queststats [@user]` completed quests"),
            ),
            (
                "🎯 Quest Types",
                "🟠 Catch rare+ fish\n🎣 Catch any fish\n📈 Realise trading profit\n💎 Cut rare+ jade stones\n🎰 Roll the gacha".to_string(),
            ),
            (
                "⚙️ How it works",
                "• A new quest spawns every day at **07:00 WIB** and lasts 24 hours\n• Progress counts automatically as you play\n• Rewards are paid within 10 seconds of finishing\n• Rewards give Rupiah and permanent luck".to_string(),
            ),
        ],
    );
    reply(ctx, msg, embed).await?;
    Ok(())
}
