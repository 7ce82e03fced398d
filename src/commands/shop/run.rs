//! `shop`, `shopbuy`, `shopinfo`, `shophistory` and the owner-only `forceshopgen`.

use super::logic::{
    PurchaseOutcome, current_slots, generate_daily_shop, match_slot, next_reset, purchase,
    search_catalog,
};
use super::ui;
use crate::AppState;
use crate::commands::common::{await_confirmation, clear_reactions, reply, require_owner, show};
use crate::constants::CONFIRM_TIMEOUT_SECS;
use crate::database;
use crate::error::{CommandError, CommandResult};
use crate::util::{parse_limit, rp};
use chrono::Utc;
use serenity::builder::CreateMessage;
use serenity::model::channel::Message;
use serenity::prelude::*;
use std::sync::Arc;
use tracing::warn;

pub async fn run_shop(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let now = Utc::now();
    let slots = current_slots(&state.db, now).await?;
    if slots.is_empty() {
        reply(ctx, msg, ui::closed_embed(next_reset(now))).await?;
        return Ok(());
    }
    let balance = database::users::get_or_create_user(&state.db, msg.author.id)
        .await?
        .currency;
    reply(
        ctx,
        msg,
        ui::shop_embed(&slots, balance, &state.config.prefix, next_reset(now)),
    )
    .await?;
    Ok(())
}

pub async fn run_shop_buy(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    const USAGE: &str = "shopbuy <item name>";
    if args.is_empty() {
        return Err(CommandError::missing(USAGE));
    }
    let query = args.join(" ");
    let user_id = msg.author.id;
    let slots = current_slots(&state.db, Utc::now()).await?;
    let Some((slot, item)) = match_slot(&slots, &query) else {
        return Err(CommandError::bad(format!(
            "Item not found or sold out!\n📋 See what's available with `{}shop`.",
            state.config.prefix
        )));
    };

    let balance = database::users::get_or_create_user(&state.db, user_id)
        .await?
        .currency;
    if balance < slot.price {
        return Err(CommandError::bad(format!(
            "**Not enough balance!**\n💰 Needed: {}\n💳 Balance: {}",
            rp(slot.price),
            rp(balance)
        )));
    }

    let mut prompt = reply(ctx, msg, ui::confirm_embed(slot, item, balance)).await?;
    let answer = await_confirmation(ctx, &prompt, user_id, CONFIRM_TIMEOUT_SECS).await?;
    clear_reactions(ctx, &prompt).await;
    match answer {
        Some(true) => {}
        Some(false) => {
            show(ctx, &mut prompt, ui::canceled_embed("❌ Purchase Canceled")).await;
            return Ok(());
        }
        None => {
            show(ctx, &mut prompt, ui::canceled_embed("⏰ Timed out! Purchase canceled.")).await;
            return Ok(());
        }
    }

    match purchase(&state.db, user_id, slot, item, Utc::now()).await? {
        PurchaseOutcome::Bought { reward } => {
            show(
                ctx,
                &mut prompt,
                ui::bought_embed(item, slot.price, slot.stock - 1, &reward),
            )
            .await;
            Ok(())
        }
        PurchaseOutcome::SoldOut => Err(CommandError::bad("This item just **SOLD OUT**!")),
        PurchaseOutcome::TooPoor => Err(CommandError::bad(
            "Your balance changed and is no longer enough.",
        )),
    }
}

pub async fn run_shop_info(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    if args.is_empty() {
        reply(ctx, msg, ui::system_info_embed(&state.config.prefix)).await?;
        return Ok(());
    }
    let query = args.join(" ");
    let item = search_catalog(&query)
        .ok_or_else(|| CommandError::bad(format!("No shop item matches `{query}`.")))?;
    let slots = current_slots(&state.db, Utc::now()).await?;
    let today = slots.iter().find(|s| s.item_key == item.key);
    reply(ctx, msg, ui::item_embed(item, today)).await?;
    Ok(())
}

pub async fn run_shop_history(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    let limit = parse_limit(args.first(), 10, 50)?;
    let purchases = database::shop::purchases(&state.db, msg.author.id, limit).await?;
    if purchases.is_empty() {
        return Err(CommandError::bad("📜 You haven't bought anything yet!"));
    }
    reply(ctx, msg, ui::history_embed(&msg.author.name, &purchases)).await?;
    Ok(())
}

/// Posts the opening announcement to the quest channel, if one is configured.
pub async fn announce_shop(ctx: &Context, state: &AppState, shop_id: &str, slots: &[database::models::ShopSlot]) {
    let Some(channel) = state.config.quest_channel_id else {
        return;
    };
    let builder = CreateMessage::new()
        .content("@everyone")
        .embed(ui::announcement_embed(shop_id, slots, &state.config.prefix));
    if let Err(e) = channel.send_message(&ctx.http, builder).await {
        warn!(target: "shop.daily", channel = channel.get(), error = %e, "shop announcement failed");
    }
}

pub async fn run_force_shop_gen(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    require_owner(state, msg)?;
    let Some((shop_id, slots)) = generate_daily_shop(&state.db, Utc::now(), true).await? else {
        return Err(CommandError::bad("Shop generation produced nothing."));
    };
    announce_shop(ctx, state, &shop_id, &slots).await;
    reply(
        ctx,
        msg,
        crate::ui::style::success_embed(
            "🛒 Shop Regenerated",
            format!(
                "Shop `{shop_id}` now has **{}** items ({} deals).",
                slots.len(),
                slots.iter().filter(|s| s.is_special).count()
            ),
        ),
    )
    .await?;
    Ok(())
}
