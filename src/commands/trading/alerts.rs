//! In-memory price alerts: `alert`, `alerts`, `delalert` and the minute checker.

use crate::AppState;
use crate::commands::common::reply;
use crate::error::{CommandError, CommandResult};
use crate::services::prices::{Crypto, Quote, find_crypto};
use crate::ui::style::{COLOR_WARNING, footer};
use crate::util::{parse_f64, parse_i64, thousands_f};
use chrono::{DateTime, Utc};
use serenity::builder::{CreateEmbed, CreateMessage};
use serenity::model::channel::Message;
use serenity::model::id::UserId;
use serenity::prelude::*;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertCondition {
    Above,
    Below,
}

impl AlertCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCondition::Above => "above",
            AlertCondition::Below => "below",
        }
    }
}

impl FromStr for AlertCondition {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "above" | ">" => Ok(AlertCondition::Above),
            "below" | "<" => Ok(AlertCondition::Below),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PriceAlert {
    pub crypto: &'static Crypto,
    pub condition: AlertCondition,
    pub target: f64,
    pub created_at: DateTime<Utc>,
}

impl PriceAlert {
    pub fn is_hit(&self, price: f64) -> bool {
        match self.condition {
            AlertCondition::Above => price >= self.target,
            AlertCondition::Below => price <= self.target,
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "**{}** {} Rp {}",
            self.crypto.ticker(),
            self.condition.as_str(),
            thousands_f(self.target, 0)
        )
    }
}

/// Removes and returns every alert whose condition the quotes satisfy.
/// Alerts for coins without a quote stay armed.
pub fn take_triggered(
    alerts: &mut HashMap<UserId, Vec<PriceAlert>>,
    quotes: &HashMap<&'static str, Quote>,
) -> Vec<(UserId, PriceAlert, f64)> {
    let mut fired = Vec::new();
    for (user_id, list) in alerts.iter_mut() {
        list.retain(|alert| match quotes.get(alert.crypto.symbol) {
            Some(q) if alert.is_hit(q.price) => {
                fired.push((*user_id, alert.clone(), q.price));
                false
            }
            _ => true,
        });
    }
    alerts.retain(|_, list| !list.is_empty());
    fired
}

pub async fn run_alert(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    const USAGE: &str = "alert <crypto> <above|below> <price>";
    let [coin, condition, price, ..] = args else {
        return Err(CommandError::missing(USAGE));
    };
    let crypto = find_crypto(coin).ok_or_else(|| {
        CommandError::bad(format!(
            "Crypto `{coin}` is not available! Check `{}market`.",
            state.config.prefix
        ))
    })?;
    let condition = condition
        .parse::<AlertCondition>()
        .map_err(|_| CommandError::bad("Condition must be `above` or `below`!"))?;
    let target = parse_f64(price)?;
    if target <= 0.0 {
        return Err(CommandError::bad("The target price must be above 0!"));
    }
    let alert = PriceAlert {
        crypto,
        condition,
        target,
        created_at: Utc::now(),
    };
    let line = alert.describe();
    state
        .price_alerts
        .write()
        .await
        .entry(msg.author.id)
        .or_default()
        .push(alert);
    info!(target: "trading.alert", user = msg.author.id.get(), coin = crypto.symbol, target, "price alert set");
    msg.channel_id
        .say(
            &ctx.http,
            format!("✅ Alert set!\n📊 {line}\nYou'll get a DM when it triggers!"),
        )
        .await?;
    Ok(())
}

pub async fn run_alerts(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let lines: Vec<String> = state
        .price_alerts
        .read()
        .await
        .get(&msg.author.id)
        .map(|list| {
            list.iter()
                .enumerate()
                .map(|(i, a)| format!("`{}.` {}", i + 1, a.describe()))
                .collect()
        })
        .unwrap_or_default();
    if lines.is_empty() {
        return Err(CommandError::bad("📭 You haven't set any alerts!"));
    }
    let embed = CreateEmbed::new()
        .title("🔔 Active Price Alerts")
        .description(lines.join("\n"))
        .color(COLOR_WARNING)
        .footer(footer(format!(
            "Use {}delalert <number> to remove one",
            state.config.prefix
        )));
    reply(ctx, msg, embed).await?;
    Ok(())
}

pub async fn run_delete_alert(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    const USAGE: &str = "delalert <number>";
    let index = parse_i64(args.first().ok_or(CommandError::missing(USAGE))?)?;
    let removed = {
        let mut alerts = state.price_alerts.write().await;
        let Some(list) = alerts.get_mut(&msg.author.id).filter(|l| !l.is_empty()) else {
            return Err(CommandError::bad("📭 You don't have any alerts!"));
        };
        if index < 1 || index as usize > list.len() {
            return Err(CommandError::bad(format!("Alert number {index} does not exist!")));
        }
        let removed = list.remove(index as usize - 1);
        if list.is_empty() {
            alerts.remove(&msg.author.id);
        }
        removed
    };
    msg.channel_id
        .say(&ctx.http, format!("✅ Alert removed!\n📊 {}", removed.describe()))
        .await?;
    Ok(())
}

/// One pass of the alert checker: quotes every watched coin, fires and DMs hits.
pub async fn check_price_alerts(ctx: &Context, state: &AppState) {
    let watched: Vec<&'static Crypto> = {
        let alerts = state.price_alerts.read().await;
        let mut coins: Vec<&'static Crypto> = alerts
            .values()
            .flatten()
            .map(|a| a.crypto)
            .collect();
        coins.sort_by_key(|c| c.symbol);
        coins.dedup_by_key(|c| c.symbol);
        coins
    };
    if watched.is_empty() {
        return;
    }
    let mut quotes = HashMap::new();
    for crypto in watched {
        match state.prices.quote(crypto).await {
            Ok(q) => {
                quotes.insert(crypto.symbol, q);
            }
            Err(e) => warn!(target: "trading.alert", coin = crypto.symbol, error = %e, "alert quote failed"),
        }
    }
    let fired = take_triggered(&mut *state.price_alerts.write().await, &quotes);
    debug!(target: "trading.alert", fired = fired.len(), "alert pass done");
    for (user_id, alert, price) in fired {
        let embed = CreateEmbed::new()
            .title("🔔 Price Alert Triggered!")
            .description(format!(
                "{}\n💹 Current price: **Rp {}**",
                alert.describe(),
                thousands_f(price, 0)
            ))
            .color(COLOR_WARNING)
            .footer(footer(format!("Set {}", alert.created_at.format("%d %b %H:%M UTC"))));
        if let Err(e) = user_id
            .direct_message(&ctx.http, CreateMessage::new().embed(embed))
            .await
        {
            warn!(target: "trading.alert", user = user_id.get(), error = %e, "alert DM failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::prices::find_crypto;

    fn alert(symbol: &str, condition: AlertCondition, target: f64) -> PriceAlert {
        PriceAlert {
            crypto: find_crypto(symbol).unwrap(),
            condition,
            target,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn conditions_parse() {
        assert_eq!("ABOVE".parse::<AlertCondition>(), Ok(AlertCondition::Above));
        assert_eq!("<".parse::<AlertCondition>(), Ok(AlertCondition::Below));
        assert!("sideways".parse::<AlertCondition>().is_err());
    }

    #[test]
    fn triggered_alerts_are_removed_once() {
        let user = UserId::new(1);
        let mut alerts = HashMap::new();
        alerts.insert(
            user,
            vec![
                alert("btc", AlertCondition::Above, 100.0),
                alert("eth", AlertCondition::Below, 50.0),
                alert("sol", AlertCondition::Above, 1.0),
            ],
        );
        let mut quotes = HashMap::new();
        quotes.insert("btc", Quote { price: 120.0, change_24h: 0.0 });
        quotes.insert("eth", Quote { price: 60.0, change_24h: 0.0 });

        let fired = take_triggered(&mut alerts, &quotes);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].1.crypto.symbol, "btc");
        // eth not hit, sol has no quote: both stay armed.
        assert_eq!(alerts[&user].len(), 2);
        assert!(take_triggered(&mut alerts, &quotes).is_empty());
    }
}
