//! The `help` overview, and its redirects to each system's own help page.

use crate::AppState;
use crate::commands::common::reply;
use crate::commands::{achievements, economy, fishing, jade, quests, shop, tax, trading};
use crate::constants::MAIN_PORTO_CHANNEL_NAME;
use crate::error::CommandResult;
use crate::ui::style::{COLOR_MOCHI, footer};
use serenity::builder::CreateEmbed;
use serenity::model::channel::Message;
use serenity::prelude::*;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HelpCategory {
    Fishing,
    Jade,
    Trading,
    Economy,
    Achievements,
    Quests,
    Shop,
    Tax,
}

impl FromStr for HelpCategory {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fish" | "fishing" | "f" => Ok(Self::Fishing),
            "jade" | "j" | "gacha" => Ok(Self::Jade),
            "trade" | "trading" | "t" | "crypto" => Ok(Self::Trading),
            "economy" | "e" | "eco" => Ok(Self::Economy),
            "achievement" | "achievements" | "ach" => Ok(Self::Achievements),
            "quest" | "quests" | "q" => Ok(Self::Quests),
            "shop" | "store" | "s" => Ok(Self::Shop),
            "tax" | "pajak" => Ok(Self::Tax),
            _ => Err(()),
        }
    }
}

pub async fn run_help(
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    match args.first().and_then(|a| a.parse::<HelpCategory>().ok()) {
        Some(HelpCategory::Fishing) => fishing::run::run_fish_help(ctx, msg, state).await,
        Some(HelpCategory::Jade) => jade::run::run_jade_help(ctx, msg, state).await,
        Some(HelpCategory::Trading) => trading::run::run_trading_help(ctx, msg, state).await,
        Some(HelpCategory::Economy) => economy::run::run_economy_help(ctx, msg, state).await,
        Some(HelpCategory::Achievements) => {
            achievements::run::run_achievement_help(ctx, msg, state).await
        }
        Some(HelpCategory::Quests) => quests::run::run_quest_help(ctx, msg, state).await,
        Some(HelpCategory::Shop) => shop::run::run_shop_info(ctx, msg, state, &[]).await,
        Some(HelpCategory::Tax) => tax::run::run_tax_info(ctx, msg, state).await,
        None => {
            let porto = porto_channel(ctx, msg).await;
            let owner = state.config.is_owner(msg.author.id);
            reply(ctx, msg, overview_embed(&state.config.prefix, &porto, owner)).await?;
            Ok(())
        }
    }
}

/// `<#id>` of the main portfolio channel when this guild has one.
async fn porto_channel(ctx: &Context, msg: &Message) -> String {
    let fallback = format!("`#{MAIN_PORTO_CHANNEL_NAME}`");
    let Some(guild_id) = msg.guild_id else {
        return fallback;
    };
    match guild_id.channels(&ctx.http).await {
        Ok(channels) => channels
            .values()
            .find(|c| c.name == MAIN_PORTO_CHANNEL_NAME)
            .map_or(fallback, |c| format!("<#{}>", c.id)),
        Err(_) => fallback,
    }
}

pub fn overview_embed(p: &str, porto: &str, owner: bool) -> CreateEmbed {
    let mut embed = CreateEmbed::new()
        .title("✨ Mochi Bot • Command List")
        .description(format!(
            "**An interactive portfolio server with XP, levels, currency, gacha and trading!**\n\n💡 **Tip**: use `{p}help <category>` for details\n📋 Categories: `fish`, `jade`, `trade`, `economy`, `achievement`, `quest`, `shop`, `tax`"
        ))
        .color(COLOR_MOCHI)
        .field(
            "🎯 Basic Commands",
            format!(
                "`{p}kumpul` gather XP in {porto}\n`{p}profile [@user]` view a profile\n`{p}rank` the rank system\n`{p}top` leaderboard\n`{p}help <category>` detailed help"
            ),
            false,
        )
        .field(
            "🎰 Gacha & Items",
            format!(
                "`{p}gacha` roll the gacha (needs a roll)\n`{p}rate` gacha rates\n`{p}use <2x|4x|8x|10x|20x>` use an XP item\n`{p}weekly` [Bangsawan+] free 2x XP\n`{p}tradeitem` sell items to a friend"
            ),
            false,
        )
        .field(
            "🏆 Achievements",
            format!("`{p}achievements [@user]` achievements & luck bonus\n`{p}achhelp` achievement guide"),
            false,
        )
        .field(
            "🎯 Daily Quest",
            format!(
                "`{p}quest` active quest & progress\n`{p}queststats [@user]` quest statistics\n⏰ **A new quest every day at 07:00 WIB!**"
            ),
            false,
        )
        .field(
            "🛒 Daily Shop",
            format!("`{p}shop` today's items\n`{p}shopbuy <item>` buy an item\n🔥 **Special deals & limited stock!**"),
            false,
        )
        .field(
            "🎮 Quick Access",
            format!(
                "🎣 **Fishing**: `{p}fhelp`\n💎 **Jade**: `{p}jhelp`\n📈 **Trading**: `{p}thelp`\n💰 **Economy**: `{p}ehelp`\n🏆 **Achievements**: `{p}achhelp`\n🎯 **Quest**: `{p}qhelp`\n🛒 **Shop**: `{p}shopinfo`\n🏛️ **Tax**: `{p}taxinfo`"
            ),
            false,
        );
    if owner {
        embed = embed.field(
            "🛠️ Owner Only",
            format!(
                "`{p}setup` role & channel config\n`{p}cheatxp @user <xp>`\n`{p}cheatrp @user <amount>`\n`{p}forcequestgen` • `{p}forceshopgen` • `{p}forcetax`\n`{p}testquest <type> [amount]`\n`{p}questdebug`"
            ),
            false,
        );
    }
    embed.footer(footer(format!("Mochi Bot • {p}help <category> for the full details")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories_accept_aliases() {
        assert_eq!("FISH".parse::<HelpCategory>(), Ok(HelpCategory::Fishing));
        assert_eq!("crypto".parse::<HelpCategory>(), Ok(HelpCategory::Trading));
        assert_eq!("store".parse::<HelpCategory>(), Ok(HelpCategory::Shop));
        assert!("dance".parse::<HelpCategory>().is_err());
    }
}
