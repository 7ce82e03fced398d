//! Prefix entry points for jade cutting.

use super::logic::{
    ANNOUNCE_MIN_PRICE, JadeBoard, find_tier, jade_luck, leaderboard, roll_cut, settle_cut,
};
use super::ui;
use crate::AppState;
use crate::commands::achievements::logic::total_luck;
use crate::commands::common::{await_confirmation, clear_reactions, reply, show, target_or_author};
use crate::constants::{CONFIRM_TIMEOUT_SECS, EMOJI_HAMMER, JADE_CUT_TIMEOUT_SECS, LEADERBOARD_SIZE};
use crate::database;
use crate::error::{CommandError, CommandResult};
use crate::ui::style::{COLOR_INFO, help_embed};
use crate::util::rp;
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::{Message, ReactionType};
use serenity::prelude::*;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub async fn run_buy_jade(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    const USAGE: &str = "buyjade <lumpur|pasir|giok|jade|imperial>";
    let query = args.first().ok_or(CommandError::missing(USAGE))?;
    let tier = find_tier(query).ok_or_else(|| {
        CommandError::bad(format!(
            "Stone not found! See the list with `{}jadeshop`.",
            state.config.prefix
        ))
    })?;
    let user_id = msg.author.id;
    let Some(_session) = state.begin_jade_session(user_id) else {
        return Err(CommandError::bad(
            "⚠️ You still have an uncut stone! Finish it or wait for it to time out.",
        ));
    };

    let profile = database::users::get_or_create_user(&state.db, user_id).await?;
    if profile.currency < tier.price {
        return Err(CommandError::bad(format!(
            "Not enough balance!\n💰 Needed: {}\n💳 Balance: {}",
            rp(tier.price),
            rp(profile.currency)
        )));
    }
    let luck = jade_luck(total_luck(&state.db, user_id).await?);

    let mut prompt = reply(ctx, msg, ui::confirm_embed(tier, profile.currency, luck)).await?;
    match await_confirmation(ctx, &prompt, user_id, CONFIRM_TIMEOUT_SECS).await? {
        Some(true) => {}
        Some(false) => {
            show(ctx, &mut prompt, ui::notice_embed("❌ Purchase Canceled", "The jade purchase was canceled.")).await;
            clear_reactions(ctx, &prompt).await;
            return Ok(());
        }
        None => {
            show(ctx, &mut prompt, ui::notice_embed("⏰ Confirmation Timed Out", "The purchase was canceled.")).await;
            clear_reactions(ctx, &prompt).await;
            return Ok(());
        }
    }

    if !database::users::add_currency(&state.db, user_id, -tier.price).await? {
        clear_reactions(ctx, &prompt).await;
        return Err(CommandError::bad("Your balance changed and is no longer enough."));
    }

    clear_reactions(ctx, &prompt).await;
    show(ctx, &mut prompt, ui::ready_embed(tier, luck)).await;
    let hammer = ReactionType::Unicode(EMOJI_HAMMER.to_string());
    if let Err(e) = prompt.react(&ctx.http, hammer).await {
        warn!(target: "jade.cut", error = %e, "could not add hammer reaction");
    }
    let cut = prompt
        .await_reaction(&ctx.shard)
        .author_id(user_id)
        .filter(|r| r.emoji.unicode_eq(EMOJI_HAMMER))
        .timeout(Duration::from_secs(JADE_CUT_TIMEOUT_SECS))
        .await;

    if cut.is_none() {
        database::users::add_currency(&state.db, user_id, tier.price).await?;
        show(
            ctx,
            &mut prompt,
            ui::notice_embed(
                "⏰ Time's Up!",
                format!("The stone was not cut. Refunded: {}", rp(tier.price)),
            ),
        )
        .await;
        clear_reactions(ctx, &prompt).await;
        return Ok(());
    }

    show(
        ctx,
        &mut prompt,
        CreateEmbed::new()
            .title("🔨 Cutting the stone...")
            .description(format!("{} *Tok... tok... tok...*", tier.emoji))
            .color(tier.color),
    )
    .await;
    clear_reactions(ctx, &prompt).await;

    let result = {
        let mut rng = rand::rng();
        roll_cut(&mut rng, tier, luck)
    };
    tokio::time::sleep(Duration::from_secs(2)).await;
    let settled = settle_cut(&state.db, user_id, tier, result, profile.level).await?;
    show(ctx, &mut prompt, ui::result_embed(tier, &settled, luck)).await;

    if result.jackpot && tier.price >= ANNOUNCE_MIN_PRICE {
        let announcement = ui::jackpot_announcement(user_id.get(), tier, result.reward, result.multiplier);
        if let Err(e) = msg
            .channel_id
            .send_message(&ctx.http, CreateMessage::new().embed(announcement))
            .await
        {
            warn!(target: "jade.cut", error = %e, "could not announce jackpot");
        }
    }
    Ok(())
}

pub async fn run_jade_shop(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    reply(ctx, msg, ui::shop_embed(&state.config.prefix)).await?;
    Ok(())
}

pub async fn run_jade_stats(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    let target = target_or_author(ctx, msg, args.first()).await?;
    let stats = database::jade::get_stats(&state.db, target.id).await?;
    let luck = jade_luck(total_luck(&state.db, target.id).await?);
    reply(ctx, msg, ui::stats_embed(&target.name, &stats, luck)).await?;
    Ok(())
}

pub async fn run_jade_leaderboard(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    let board = JadeBoard::parse(args.first().copied());
    let rows = leaderboard(&state.db, board, LEADERBOARD_SIZE as usize).await?;
    reply(ctx, msg, ui::leaderboard_embed(board, &rows, &state.config.prefix)).await?;
    Ok(())
}

pub async fn run_jade_rate(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let luck = jade_luck(total_luck(&state.db, msg.author.id).await?);
    reply(ctx, msg, ui::rates_embed(luck)).await?;
    Ok(())
}

pub async fn run_jade_help(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let p = &state.config.prefix;
    let embed = help_embed(
        "🪨 Jade Guide",
        "Buy a stone, cut it open, and hope for treasure.",
        COLOR_INFO,
        &[
            (
                "🎮 Playing",
                format!(
                    "`{p}jadeshop` list the stones\n`{p}buyjade <lumpur|pasir|giok|jade|imperial>`\nConfirm with ✅ in 30s, then cut with 🔨 within 60s.\nIf you never cut, the price is refunded."
                ),
            ),
            (
                "📊 Stats",
                format!(
                    "`{p}jadestats [@user]`\n`{p}jlb [profit|spent|won|cuts|jackpots|winrate]`\n`{p}jrate` your odds with luck"
                ),
            ),
            (
                "💡 Rules",
                "• Loss pays 0x to 0.95x, a win 1.05x up to the stone's max\n• Jackpot chance is 0.05% for every stone\n• Luck lowers the loss rate (min 10%)\n• A 2% jade tax applies to payouts below level 20\n• One stone at a time".to_string(),
            ),
        ],
    );
    reply(ctx, msg, embed).await?;
    Ok(())
}
