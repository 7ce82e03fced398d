//! Prefix entry points for the fishing commands.

use super::autofish::{self, in_voice};
use super::data::UpgradeKind;
use super::logic::{
    FishBoard, UpgradeOutcome, buy_upgrade, compare_points, execute_sale, land_catch, leaderboard,
    match_stack, price_sale, roll_haul, roll_robot_catch, upgrade_levels,
};
use super::ui;
use crate::AppState;
use crate::commands::common::{reply, resolve_user, target_or_author};
use crate::constants::{
    AUTOFISH_DEFAULT_HOURS, AUTOFISH_MAX_HOURS, AUTOFISH_MIN_HOURS, FISH_COOLDOWN_SECS,
    FISH_DAILY_COOLDOWN_HOURS, LEADERBOARD_SIZE,
};
use crate::database;
use crate::error::{CommandError, CommandResult};
use crate::ui::style::{COLOR_INFO, COLOR_SUCCESS, error_embed, footer, help_embed, success_embed};
use crate::util::{format_duration, parse_i64, rp};
use chrono::{Duration, Utc};
use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::model::id::UserId;
use serenity::prelude::*;
use std::sync::Arc;

async fn stacks_of(state: &AppState, user_id: UserId) -> Result<Vec<(String, i64)>, sqlx::Error> {
    Ok(database::fishing::inventory(&state.db, user_id)
        .await?
        .into_iter()
        .map(|s| (s.fish_name, s.amount))
        .collect())
}

pub async fn run_fish(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let user_id = msg.author.id;
    if state.autofish.read().await.contains_key(&user_id) {
        return Err(CommandError::bad(
            "You are auto-fishing right now! Use `stopautofish` first.",
        ));
    }
    let now = Utc::now();
    let stats = database::fishing::get_stats(&state.db, user_id).await?;
    if let Some(last) = stats.last_fish_time {
        let ready_at = last + Duration::seconds(FISH_COOLDOWN_SECS);
        if now < ready_at {
            return Err(CommandError::Cooldown((ready_at - now).num_seconds().max(1)));
        }
    }

    database::users::ensure_user(&state.db, user_id).await?;
    let (rod, _, net) = upgrade_levels(&state.db, user_id).await?;
    let voice = in_voice(ctx, msg.guild_id, user_id);
    let haul = {
        let mut rng = rand::rng();
        roll_haul(&mut rng, rod, net, voice)
    };
    let outcome = land_catch(&state.db, user_id, &haul, now, true).await?;
    let embed = {
        let market = state.fish_market.read().await;
        ui::catch_embed(&haul, &market, voice, false, &outcome.unlocked)
    };
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_autofish(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    let hours = match args.first() {
        Some(raw) => {
            let hours = parse_i64(raw)?;
            if !(AUTOFISH_MIN_HOURS..=AUTOFISH_MAX_HOURS).contains(&hours) {
                return Err(CommandError::bad(format!(
                    "Duration must be between {AUTOFISH_MIN_HOURS} and {AUTOFISH_MAX_HOURS} hours."
                )));
            }
            hours
        }
        None => AUTOFISH_DEFAULT_HOURS,
    };
    database::users::ensure_user(&state.db, msg.author.id).await?;
    let started = autofish::start(
        ctx,
        state,
        msg.author.id,
        msg.guild_id,
        msg.channel_id,
        hours,
    )
    .await;
    if !started {
        return Err(CommandError::bad(
            "You already have an auto-fishing session! Check it with `afstatus`.",
        ));
    }
    let embed = success_embed(
        "🤖 Auto-Fishing Started!",
        format!(
            "Your line is in the water for **{hours} hour(s)**.\nOne catch every minute, posted in this channel.\nStop anytime with `stopautofish`."
        ),
    )
    .footer(footer("💡 Stay in a voice channel for the voice bonus"));
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_stop_autofish(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let Some(task) = autofish::stop(state, msg.author.id).await else {
        return Err(CommandError::bad("You have no auto-fishing session running."));
    };
    let ran = Utc::now() - task.started_at;
    let embed = success_embed(
        "🛑 Auto-Fishing Stopped",
        format!(
            "Ran for **{}**.\n🎣 Casts: **{}**\n🐟 Fish caught: **{}**",
            format_duration(ran),
            task.casts(),
            task.fish()
        ),
    );
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_autofish_status(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let embed = {
        let tasks = state.autofish.read().await;
        match tasks.get(&msg.author.id) {
            Some(task) => {
                let now = Utc::now();
                CreateEmbed::new()
                    .title("🤖 Auto-Fishing Status")
                    .color(COLOR_INFO)
                    .field("⏱️ Running for", format_duration(now - task.started_at), true)
                    .field(
                        "⏳ Remaining",
                        format_duration((task.ends_at - now).max(Duration::zero())),
                        true,
                    )
                    .field("📍 Channel", format!("<#{}>", task.channel_id), true)
                    .field("🎣 Casts", task.casts().to_string(), true)
                    .field("🐟 Fish", task.fish().to_string(), true)
            }
            None => CreateEmbed::new()
                .title("🤖 Auto-Fishing Status")
                .description("No session running. Start one with `autofish [1-12]`.")
                .color(COLOR_INFO),
        }
    };
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_inventory(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    let target = target_or_author(ctx, msg, args.first()).await?;
    let stacks = stacks_of(state, target.id).await?;
    let embed = {
        let market = state.fish_market.read().await;
        ui::inventory_embed(&target.name, &stacks, &market)
    };
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_sell_fish(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    const USAGE: &str = "sellfish <all | fish name> [amount|all]";
    let first = args.first().ok_or(CommandError::missing(USAGE))?;
    let user_id = msg.author.id;
    let stacks = stacks_of(state, user_id).await?;
    if stacks.is_empty() {
        return Err(CommandError::bad("You have no fish to sell!"));
    }

    let items: Vec<(String, i64)> = if first.eq_ignore_ascii_case("all") {
        stacks
    } else {
        // The last argument is the amount when it parses as one; the rest is the name.
        let (name_parts, amount_raw) = match args.split_last() {
            Some((last, rest))
                if !rest.is_empty()
                    && (last.eq_ignore_ascii_case("all") || parse_i64(last).is_ok()) =>
            {
                (rest, Some(*last))
            }
            _ => (args, None),
        };
        let query = name_parts.join(" ");
        let (name, held) = match_stack(&stacks, &query)
            .ok_or_else(|| CommandError::bad(format!("You have no fish matching `{query}`.")))?;
        let amount = match amount_raw {
            None => 1,
            Some(raw) if raw.eq_ignore_ascii_case("all") => *held,
            Some(raw) => parse_i64(raw)?,
        };
        if amount <= 0 {
            return Err(CommandError::bad("Amount must be positive."));
        }
        if amount > *held {
            return Err(CommandError::bad(format!(
                "You only have **{held}** {name}."
            )));
        }
        vec![(name.clone(), amount)]
    };

    let level = database::users::get_or_create_user(&state.db, user_id).await?.level;
    let receipt = {
        let market = state.fish_market.read().await;
        price_sale(&market, &items, level)
    };
    if !execute_sale(&state.db, user_id, &receipt).await? {
        return Err(CommandError::bad(
            "Your inventory changed during the sale. Nothing was sold, try again.",
        ));
    }
    reply(ctx, msg, ui::sale_embed(&receipt)).await?;
    Ok(())
}

pub async fn run_fish_market(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let embed = {
        let market = state.fish_market.read().await;
        ui::market_embed(&market)
    };
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_fish_upgrade(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    let user_id = msg.author.id;
    let profile = database::users::get_or_create_user(&state.db, user_id).await?;
    let Some(raw) = args.first() else {
        let levels = upgrade_levels(&state.db, user_id).await?;
        reply(ctx, msg, ui::upgrades_embed(levels, profile.currency)).await?;
        return Ok(());
    };
    let kind: UpgradeKind = raw
        .parse()
        .map_err(|_| CommandError::bad("Choose `rod`, `robot` or `net`."))?;

    let embed = match buy_upgrade(&state.db, user_id, kind).await? {
        UpgradeOutcome::Upgraded { new_level, cost } => success_embed(
            format!("{} {} Upgraded!", kind.emoji(), kind.name()),
            format!(
                "Now **Lv.{new_level}/{}** for {}.\n{}",
                kind.max_level(),
                rp(cost),
                kind.description()
            ),
        ),
        UpgradeOutcome::MaxLevel => error_embed(
            "Max Level",
            format!("Your {} is already at the maximum level.", kind.name()),
        ),
        UpgradeOutcome::Insufficient { cost } => error_embed(
            "Not enough money",
            format!(
                "You need {} but only have {}.",
                rp(cost),
                rp(profile.currency)
            ),
        ),
    };
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_fish_daily(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let user_id = msg.author.id;
    let now = Utc::now();
    let (rod, robot, _) = upgrade_levels(&state.db, user_id).await?;
    if robot == 0 {
        return Err(CommandError::bad(
            "You don't own a fishing robot yet! Buy one with `fishupgrade robot`.",
        ));
    }
    let stats = database::fishing::get_stats(&state.db, user_id).await?;
    if let Some(last) = stats.last_daily_claim {
        let ready_at = last + Duration::hours(FISH_DAILY_COOLDOWN_HOURS);
        if now < ready_at {
            return Err(CommandError::bad(format!(
                "Your robot is still fishing. Come back in **{}**.",
                format_duration(ready_at - now)
            )));
        }
    }
    let haul = {
        let mut rng = rand::rng();
        roll_robot_catch(&mut rng, robot, rod)
    };
    database::fishing::set_daily_claim(&state.db, user_id, now).await?;
    let outcome = land_catch(&state.db, user_id, &haul, now, false).await?;
    let embed = {
        let market = state.fish_market.read().await;
        ui::catch_embed(&haul, &market, false, true, &outcome.unlocked)
            .title(format!("🤖 Robot Daily Catch (Lv.{robot})"))
            .color(COLOR_SUCCESS)
    };
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_fish_stats(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    let target = target_or_author(ctx, msg, args.first()).await?;
    let stats = database::fishing::get_stats(&state.db, target.id).await?;
    let levels = upgrade_levels(&state.db, target.id).await?;
    let stacks = stacks_of(state, target.id).await?;
    let embed = {
        let market = state.fish_market.read().await;
        ui::stats_embed(&target.name, stats.total_fish_caught, levels, &stacks, &market)
    };
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_fish_rate(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let rod = database::fishing::upgrade_level(&state.db, msg.author.id, UpgradeKind::Rod.key())
        .await?;
    reply(ctx, msg, ui::rates_embed(rod)).await?;
    Ok(())
}

pub async fn run_fish_leaderboard(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    let board = FishBoard::parse(args.first().copied())
        .ok_or_else(|| CommandError::bad("Choose `caught`, `value` or `unique`."))?;
    let market = state.fish_market.read().await.clone();
    let rows = leaderboard(&state.db, &market, board, LEADERBOARD_SIZE as usize).await?;
    reply(ctx, msg, ui::leaderboard_embed(board, &rows)).await?;
    Ok(())
}

pub async fn run_fish_compare(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    const USAGE: &str = "fcompare @user [@user2]";
    let first = args.first().ok_or(CommandError::missing(USAGE))?;
    let (a, b) = match args.get(1) {
        Some(second) => (
            resolve_user(ctx, first).await?,
            resolve_user(ctx, second).await?,
        ),
        None => (msg.author.clone(), resolve_user(ctx, first).await?),
    };
    if a.id == b.id {
        return Err(CommandError::bad("Pick two different users to compare."));
    }

    let mut values = Vec::with_capacity(2);
    for user in [&a, &b] {
        let caught = database::fishing::get_stats(&state.db, user.id)
            .await?
            .total_fish_caught;
        let held: i64 = stacks_of(state, user.id).await?.iter().map(|(_, n)| n).sum();
        let rod = database::fishing::upgrade_level(&state.db, user.id, UpgradeKind::Rod.key())
            .await?;
        values.push([caught, held, rod]);
    }
    let points = compare_points(&values[0], &values[1]);
    let stats = [
        ("🎣 Total Caught", values[0][0], values[1][0]),
        ("🎒 Inventory", values[0][1], values[1][1]),
        ("🎣 Rod Level", values[0][2], values[1][2]),
    ];
    let embed = ui::compare_embed(
        (a.id.get(), a.name.as_str()),
        (b.id.get(), b.name.as_str()),
        &stats,
        points,
    );
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_fish_help(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let p = &state.config.prefix;
    let embed = help_embed(
        "🎣 Fishing Guide",
        "Catch fish, sell them on the market and upgrade your gear.",
        COLOR_INFO,
        &[
            (
                "🎣 Fishing",
                format!(
                    "`{p}fish` cast once (1 min cooldown)\n`{p}autofish [1-12]` fish every minute for hours\n`{p}stopautofish` • `{p}afstatus`\n`{p}fishdaily` collect your robot's daily catch"
                ),
            ),
            (
                "💰 Market",
                format!(
                    "`{p}inventory [@user]`\n`{p}sellfish all` • `{p}sellfish <fish> <n|all>`\n`{p}fishmarket` prices refresh every 15 minutes (25% fee)"
                ),
            ),
            (
                "⚙️ Upgrades",
                format!(
                    "`{p}fishupgrade` list • `{p}fishupgrade <rod|robot|net>`\n🎣 Rod: better rare odds and bigger catches\n🤖 Robot: passive daily fish\n🕸️ Net: extra haul while in voice"
                ),
            ),
            (
                "📊 Stats",
                format!(
                    "`{p}fishstats [@user]` • `{p}frate`\n`{p}flb [caught|value|unique]`\n`{p}fcompare @user [@user2]`"
                ),
            ),
            (
                "🎤 Voice Bonus",
                "Fishing while in a voice channel gives 2.5x casts and 1.5x fish per cast.".to_string(),
            ),
        ],
    );
    reply(ctx, msg, embed).await?;
    Ok(())
}
