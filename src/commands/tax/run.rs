//! `taxinfo`, `taxhistory`, `taxstats` and the owner-only `forcetax`.

use super::logic::{TaxKind, WeeklyTaxReport, force_collection, is_exempt, next_collection};
use crate::AppState;
use crate::commands::common::{mention, reply, require_owner};
use crate::constants::TAX_EXEMPT_LEVEL;
use crate::database;
use crate::error::{CommandError, CommandResult};
use crate::ui::style::{COLOR_GOLD, COLOR_INFO, footer};
use crate::util::{medal, parse_limit, rp, thousands};
use chrono::Utc;
use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::*;
use std::sync::Arc;

/// The collection summary, used by `forcetax` and the weekly scheduler.
pub fn report_embed(report: &WeeklyTaxReport, forced: bool) -> CreateEmbed {
    let title = if forced {
        "🏛️ Tax Collection (Forced)"
    } else {
        "🏛️ Weekly Tax Collection"
    };
    CreateEmbed::new()
        .title(title)
        .description("5% income tax has been collected from every balance.")
        .color(COLOR_GOLD)
        .field("💰 Total Collected", rp(report.total), true)
        .field("👥 Taxed Users", report.payers.to_string(), true)
        .field("👑 Tax Exempt", report.exempt.to_string(), true)
        .field(
            "ℹ️ Info",
            format!("Players at level {TAX_EXEMPT_LEVEL}+ are exempt from every tax."),
            false,
        )
}

pub async fn run_tax_info(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let level = database::users::get_or_create_user(&state.db, msg.author.id)
        .await?
        .level;
    let status = if is_exempt(level) {
        "👑 You are **exempt** from all taxes!"
    } else {
        "💸 You currently pay taxes."
    };
    let rates = TaxKind::ALL
        .iter()
        .filter(|k| **k != TaxKind::Income)
        .map(|k| format!("{}: **{}%**", k.label(), k.rate() * 100.0))
        .collect::<Vec<_>>()
        .join("\n");
    let embed = CreateEmbed::new()
        .title("🏛️ Tax System Information")
        .description(status)
        .color(COLOR_INFO)
        .field(
            "📉 Weekly Income Tax",
            format!(
                "**5%** of your balance every Monday 17:00 UTC (00:00 WIB Tuesday)\nNext collection: <t:{}:R>",
                next_collection(Utc::now()).timestamp()
            ),
            false,
        )
        .field(
            format!("📊 Transaction Taxes (free at level {TAX_EXEMPT_LEVEL}+)"),
            rates,
            false,
        )
        .footer(footer(format!("Your level: {level}")));
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_tax_history(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    let limit = parse_limit(args.first(), 10, 20)?;
    let rows = database::tax::history(&state.db, msg.author.id, limit).await?;
    let total = database::tax::user_total(&state.db, msg.author.id).await?;
    let body = if rows.is_empty() {
        "You haven't paid any tax yet.".to_string()
    } else {
        rows.iter()
            .map(|r| {
                format!(
                    "{} • **{}** • <t:{}:R>",
                    TaxKind::label_for(&r.tax_type),
                    rp(r.amount),
                    r.collected_at.timestamp()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let embed = CreateEmbed::new()
        .title(format!("📜 Tax History • {}", msg.author.name))
        .description(body)
        .color(COLOR_INFO)
        .field("💰 Total Paid", rp(total), false);
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_tax_stats(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let (total, count) = database::tax::totals(&state.db).await?;
    let top = database::tax::top_payers(&state.db, 10).await?;
    let top_text = if top.is_empty() {
        "No data".to_string()
    } else {
        top.iter()
            .enumerate()
            .map(|(i, p)| {
                format!(
                    "{} {} • {} ({} payments)",
                    medal(i + 1),
                    mention(p.user_id),
                    rp(p.total_paid),
                    p.payments
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    let embed = CreateEmbed::new()
        .title("📊 Mochi Tax System Stats")
        .color(COLOR_GOLD)
        .field(
            "💰 Total Tax Collected (All Types)",
            format!("{}\nfrom {} payments", rp(total), thousands(count)),
            false,
        )
        .field("🏆 Top Taxpayers", top_text, false);
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_force_tax(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    require_owner(state, msg)?;
    let Some(report) = force_collection(&state.db, Utc::now()).await? else {
        return Err(CommandError::bad(
            "A forced collection already ran this week. Try again next Monday.",
        ));
    };
    reply(ctx, msg, report_embed(&report, true)).await?;
    Ok(())
}
