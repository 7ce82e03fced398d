//! Prefix entry points for profiles, the leaderboard and the rank ladder.

use super::ui::{self, ProfileExtras};
use crate::AppState;
use crate::commands::achievements::logic::{ACHIEVEMENTS, total_luck_bonus};
use crate::commands::common::{reply, target_or_author};
use crate::commands::shop::logic::has_double_daily_xp;
use crate::constants::LEADERBOARD_SIZE;
use crate::database;
use crate::error::{CommandError, CommandResult};
use chrono::Utc;
use serenity::model::channel::Message;
use serenity::prelude::*;
use std::sync::Arc;

pub async fn run_profile(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    let user = target_or_author(ctx, msg, args.first()).await?;
    let profile = database::users::get_or_create_user(&state.db, user.id).await?;
    let extras = ProfileExtras {
        portfolio_count: database::kumpul::portfolio_count(&state.db, user.id).await?,
        achievements_unlocked: database::achievements::unlocked_count(&state.db, user.id).await?,
        achievements_total: ACHIEVEMENTS.len(),
        achievement_luck: total_luck_bonus(&state.db, user.id).await?,
        double_xp_active: has_double_daily_xp(&state.db, user.id, Utc::now()).await?,
    };
    reply(
        ctx,
        msg,
        ui::profile_embed(user.display_name(), &profile, &extras, &state.config.prefix),
    )
    .await?;
    Ok(())
}

pub async fn run_top(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let rows = database::users::top_users(&state.db, LEADERBOARD_SIZE).await?;
    if rows.is_empty() {
        return Err(CommandError::bad("No players on the leaderboard yet!"));
    }
    reply(ctx, msg, ui::top_embed(&rows)).await?;
    Ok(())
}

pub async fn run_rank(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    let user = target_or_author(ctx, msg, args.first()).await?;
    let profile = database::users::get_or_create_user(&state.db, user.id).await?;
    reply(ctx, msg, ui::rank_embed(user.display_name(), &profile)).await?;
    Ok(())
}
