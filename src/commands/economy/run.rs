//! Prefix entry points: `tradeitem`, `use`, `weekly`, `giverp` and `ehelp`.

use super::item::BoosterItem;
use super::logic::{TradeOutcome, UseOutcome, WeeklyOutcome, claim_weekly, execute_trade, use_booster};
use crate::AppState;
use crate::commands::common::{reply, resolve_user, say};
use crate::commands::leveling::logic::Rank;
use crate::constants::CONFIRM_TIMEOUT_SECS;
use crate::database;
use crate::error::{CommandError, CommandResult};
use crate::ui::style::{COLOR_GOLD, help_embed, success_embed};
use crate::util::{format_duration, parse_i64, rp};
use chrono::Utc;
use serenity::model::channel::Message;
use serenity::prelude::*;
use std::sync::Arc;
use std::time::Duration;

fn parse_item(raw: &str) -> Result<BoosterItem, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::bad("Invalid item! Use `2x`, `4x`, `8x`, `10x` or `20x`."))
}

pub async fn run_trade_item(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    const USAGE: &str = "tradeitem @user <2x|4x|8x|10x|20x> <amount> <price>";
    let [target, item, amount, price, ..] = args else {
        return Err(CommandError::missing(USAGE));
    };
    let buyer = resolve_user(ctx, target).await?;
    let seller = &msg.author;
    if buyer.id == seller.id {
        return Err(CommandError::bad("You can't trade with yourself!"));
    }
    if buyer.bot {
        return Err(CommandError::bad("You can't trade with bots."));
    }
    let item = parse_item(item)?;
    let amount = parse_i64(amount)?;
    let price = parse_i64(price)?;
    if amount <= 0 || price < 0 {
        return Err(CommandError::bad("Amount must be positive and price cannot be negative."));
    }

    let seller_row = database::users::get_or_create_user(&state.db, seller.id).await?;
    let held = item.count_in(&seller_row);
    if held < amount {
        return Err(CommandError::bad(format!("You only have `{held}` {item} item(s)!")));
    }
    let buyer_row = database::users::get_or_create_user(&state.db, buyer.id).await?;
    if buyer_row.currency < price {
        return Err(CommandError::bad(format!(
            "<@{}> doesn't have enough money! Needs {}",
            buyer.id,
            rp(price)
        )));
    }

    let prompt = say(
        ctx,
        msg,
        format!(
            "<@{}>, type `y` or `n` within 30 seconds to confirm buying:\n**{amount}x {item}** for **{}** from <@{}>",
            buyer.id,
            rp(price),
            seller.id
        ),
    )
    .await?;
    let answer = msg
        .channel_id
        .await_reply(&ctx.shard)
        .author_id(buyer.id)
        .filter(|m| matches!(m.content.trim().to_lowercase().as_str(), "y" | "n"))
        .timeout(Duration::from_secs(CONFIRM_TIMEOUT_SECS))
        .await;
    prompt.delete(&ctx.http).await.ok();

    let Some(answer) = answer else {
        say(ctx, msg, "⏰ Confirmation timed out! Trade canceled.").await?;
        return Ok(());
    };
    if !answer.content.trim().eq_ignore_ascii_case("y") {
        say(ctx, msg, "❌ The buyer canceled the trade.").await?;
        return Ok(());
    }

    let text = match execute_trade(&state.db, seller.id, buyer.id, item, amount, price).await? {
        TradeOutcome::Done { tax, net } => format!(
            "✅ Trade complete! <@{}> bought {amount}x {item} from <@{}>.\n💰 Seller received {} (tax {}).",
            buyer.id,
            seller.id,
            rp(net),
            rp(tax)
        ),
        TradeOutcome::SellerShort { held } => {
            format!("❌ Trade failed: the seller now only has `{held}` {item}.")
        }
        TradeOutcome::BuyerShort => "❌ Trade failed: the buyer no longer has enough money.".to_string(),
    };
    say(ctx, msg, text).await?;
    Ok(())
}

pub async fn run_use(ctx: &Context, msg: &Message, state: &Arc<AppState>, args: &[&str]) -> CommandResult {
    let raw = args
        .first()
        .ok_or(CommandError::missing("use <2x|4x|8x|10x|20x>"))?;
    let item = parse_item(raw)?;
    let text = match use_booster(&state.db, msg.author.id, item).await? {
        UseOutcome::Activated => format!(
            "✨ **{item}** is active for your next portfolio! Post one with `{}kumpul`.",
            state.config.prefix
        ),
        UseOutcome::AlreadyActive(mult) => {
            format!("⚠️ You already have an active XP effect (**{mult}x XP**)! Wait until it is used.")
        }
        UseOutcome::NoItem => format!("❌ You don't have any {item} items!"),
    };
    say(ctx, msg, text).await?;
    Ok(())
}

pub async fn run_weekly(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let text = match claim_weekly(&state.db, msg.author.id, Utc::now()).await? {
        WeeklyOutcome::Claimed => {
            let level = database::users::get_or_create_user(&state.db, msg.author.id)
                .await?
                .level;
            format!(
                "🎁 **Weekly Bonus Claimed!**\n<@{}> received **1x XP 2x item** as a {} perk!\nUse it with `{}use 2x`",
                msg.author.id,
                Rank::for_level(level).title(),
                state.config.prefix
            )
        }
        WeeklyOutcome::LevelTooLow(level) => format!(
            "⚠️ The weekly bonus is for **Bangsawan** (Level 15) and above!\nYour level: **{level}** ({})",
            Rank::for_level(level).title()
        ),
        WeeklyOutcome::Cooldown(left) => format!(
            "⏰ You already claimed this week!\nClaim again in **{}**",
            format_duration(left)
        ),
    };
    say(ctx, msg, text).await?;
    Ok(())
}

pub async fn run_give_rp(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    const USAGE: &str = "giverp @user <amount>";
    let [target, amount, ..] = args else {
        return Err(CommandError::missing(USAGE));
    };
    let receiver = resolve_user(ctx, target).await?;
    let amount = parse_i64(amount)?;
    if amount <= 0 {
        return Err(CommandError::bad("The amount must be positive."));
    }
    if receiver.id == msg.author.id {
        return Err(CommandError::bad("You can't transfer to yourself!"));
    }
    let balance = database::users::get_or_create_user(&state.db, msg.author.id)
        .await?
        .currency;
    if !database::users::transfer_currency(&state.db, msg.author.id, receiver.id, amount).await? {
        return Err(CommandError::bad(format!(
            "Not enough balance! You only have {}",
            rp(balance)
        )));
    }
    tracing::info!(target: "economy.transfer", from = msg.author.id.get(), to = receiver.id.get(), amount, "currency transfer");
    let embed = success_embed(
        "✅ Transfer Complete!",
        format!(
            "<@{}> sent **{}** to <@{}>",
            msg.author.id,
            rp(amount),
            receiver.id
        ),
    );
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_economy_help(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let p = &state.config.prefix;
    let embed = help_embed(
        "💰 Economy Guide",
        "Earn, trade and spend your Rupiah and XP boosters.",
        COLOR_GOLD,
        &[
            (
                "🎁 XP Items",
                format!(
                    "`{p}use <2x|4x|8x|10x|20x>` arm a booster for your next portfolio\n`{p}weekly` free XP 2x item for level 15+ (every 7 days)\n`{p}gacha` spend a roll • `{p}rate` see the odds"
                ),
            ),
            (
                "🤝 Trading",
                format!(
                    "`{p}tradeitem @user <item> <amount> <price>` sell items (10% tax)\n`{p}giverp @user <amount>` send Rupiah"
                ),
            ),
            (
                "🏪 Spending",
                format!("`{p}shop` daily shop • `{p}jadeshop` jade stones • `{p}market` crypto"),
            ),
        ],
    );
    reply(ctx, msg, embed).await?;
    Ok(())
}
