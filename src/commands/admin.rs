//! Server setup overview and the owner-only maintenance commands.

use crate::AppState;
use crate::commands::common::{reply, require_guild, require_owner, resolve_user};
use crate::commands::leveling::logic::{Rank, check_level_up, sync_rank_role};
use crate::commands::quests::logic::{QuestKind, force_daily_quest, update_quest_progress};
use crate::commands::quests::run::announce_quest;
use crate::constants::{ALLOWED_PORTO_CHANNELS, MAIN_PORTO_CHANNEL_NAME};
use crate::database;
use crate::error::{CommandError, CommandResult};
use crate::ui::style::{COLOR_INFO, COLOR_PURPLE, success_embed};
use crate::util::{parse_i64, rp, thousands};
use chrono::Utc;
use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::*;
use std::sync::Arc;
use tracing::info;

pub async fn run_setup(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let roles = Rank::ALL
        .iter()
        .map(|rank| match state.config.rank_role(*rank) {
            Some(id) => format!("{} **{}**: <@&{id}>", rank.emoji(), rank.role_name()),
            None => format!("{} **{}**: not configured", rank.emoji(), rank.role_name()),
        })
        .collect::<Vec<_>>()
        .join("\n");
    let channels = format!(
        "**Kumpul channels**: {}\n**Main portfolio channel**: `#{MAIN_PORTO_CHANNEL_NAME}`\n**Announcements**: {}",
        ALLOWED_PORTO_CHANNELS
            .iter()
            .map(|c| format!("`#{c}`"))
            .collect::<Vec<_>>()
            .join(", "),
        state
            .config
            .quest_channel_id
            .map_or_else(|| "not configured".to_string(), |c| format!("<#{c}>"))
    );
    let (hits, misses) = state.prices.cache_stats();
    let users = database::users::count_users(&state.db).await?;
    let embed = CreateEmbed::new()
        .title("⚙️ Mochi Setup")
        .color(COLOR_INFO)
        .field("🏅 Rank Roles", roles, false)
        .field("📺 Channels", channels, false)
        .field(
            "📊 Runtime",
            format!(
                "**Prefix**: `{}`\n**Owners**: {}\n**Players**: {}\n**Price cache**: {hits} hits / {misses} misses",
                state.config.prefix,
                state.config.owner_ids.len(),
                thousands(users)
            ),
            false,
        );
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_cheat_xp(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    const USAGE: &str = "cheatxp @user <xp>";
    require_owner(state, msg)?;
    let [target, amount, ..] = args else {
        return Err(CommandError::missing(USAGE));
    };
    let user = resolve_user(ctx, target).await?;
    let xp = parse_i64(amount)?;
    database::users::add_xp(&state.db, user.id, xp).await?;
    let up = check_level_up(&state.db, user.id).await?;
    let profile = database::users::get_or_create_user(&state.db, user.id).await?;
    if let Some(guild_id) = msg.guild_id {
        sync_rank_role(ctx, &state.config, guild_id, user.id, profile.level).await;
    }
    info!(target: "admin", owner = msg.author.id.get(), user = user.id.get(), xp, "xp granted by owner");
    let level_line = match up {
        Some(up) => format!("Leveled **{} → {}**", up.old_level, up.new_level),
        None => format!("Still level **{}**", profile.level),
    };
    reply(
        ctx,
        msg,
        success_embed(
            "🛠️ XP Granted",
            format!(
                "{} received **{} XP** (total {}).\n{level_line}",
                user.name,
                thousands(xp),
                thousands(profile.xp)
            ),
        ),
    )
    .await?;
    Ok(())
}

pub async fn run_cheat_rp(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    const USAGE: &str = "cheatrp @user <amount>";
    require_owner(state, msg)?;
    let [target, amount, ..] = args else {
        return Err(CommandError::missing(USAGE));
    };
    let user = resolve_user(ctx, target).await?;
    let amount = parse_i64(amount)?;
    if !database::users::add_currency(&state.db, user.id, amount).await? {
        return Err(CommandError::bad("That would leave the balance negative."));
    }
    info!(target: "admin", owner = msg.author.id.get(), user = user.id.get(), amount, "currency granted by owner");
    let balance = database::users::get_or_create_user(&state.db, user.id)
        .await?
        .currency;
    reply(
        ctx,
        msg,
        success_embed(
            "🛠️ Currency Granted",
            format!("{} received **{}**.\nBalance: {}", user.name, rp(amount), rp(balance)),
        ),
    )
    .await?;
    Ok(())
}

pub async fn run_force_quest_gen(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    require_owner(state, msg)?;
    let quest = force_daily_quest(&state.db, Utc::now()).await?;
    announce_quest(ctx, state, &quest).await;
    reply(
        ctx,
        msg,
        success_embed(
            "🛠️ Quest Regenerated",
            format!(
                "{} **{}**\n{}\n`{}`",
                quest.emoji, quest.title, quest.description, quest.quest_id
            ),
        ),
    )
    .await?;
    Ok(())
}

/// Adds quest progress to the caller, to exercise the completion sweep.
pub async fn run_test_quest(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    const USAGE: &str = "testquest <fish_rare|fish_any|trade_profit|jade_cut|gacha_roll> [amount]";
    require_owner(state, msg)?;
    let kind = args
        .first()
        .ok_or(CommandError::missing(USAGE))?
        .parse::<QuestKind>()
        .map_err(|_| CommandError::missing(USAGE))?;
    let amount = match args.get(1) {
        Some(raw) => parse_i64(raw)?.max(1),
        None => 1,
    };
    update_quest_progress(&state.db, msg.author.id, kind, amount).await;
    reply(
        ctx,
        msg,
        success_embed(
            "🛠️ Quest Progress Added",
            format!(
                "+{amount} `{}` progress. Completions are paid by the next sweep.",
                kind.as_str()
            ),
        ),
    )
    .await?;
    Ok(())
}

pub async fn run_quest_debug(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    require_owner(state, msg)?;
    let now = Utc::now();
    let active = database::quests::active_quest(&state.db, now).await?;
    let recent = database::quests::recent_quests(&state.db, 5).await?;
    let pending = database::quests::pending_completions(&state.db).await?;

    let active_line = match &active {
        Some(q) => {
            let (participants, completed) =
                database::quests::participation(&state.db, &q.quest_id).await?;
            format!(
                "`{}` {} {} (target {})\nParticipants: {participants} • Completed: {completed}\nExpires <t:{}:R>",
                q.quest_id,
                q.emoji,
                q.title,
                q.target_amount,
                q.expires_at.timestamp()
            )
        }
        None => "None".to_string(),
    };
    let recent_lines = recent
        .iter()
        .map(|q| {
            format!(
                "`{}` {} active={} created <t:{}:R>",
                q.quest_id,
                q.quest_type,
                q.active,
                q.created_at.timestamp()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let embed = CreateEmbed::new()
        .title("🔍 Quest Debug")
        .color(COLOR_PURPLE)
        .field("Active", active_line, false)
        .field(
            "Recent",
            if recent_lines.is_empty() { "None".to_string() } else { recent_lines },
            false,
        )
        .field("Unpaid completions", pending.len().to_string(), true)
        .field("Guild", require_guild(msg).map_or("DM".to_string(), |g| g.to_string()), true);
    reply(ctx, msg, embed).await?;
    Ok(())
}
