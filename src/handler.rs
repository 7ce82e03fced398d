//! Gateway event handler: prefix command routing, kumpul reactions and scheduler start-up.

use crate::AppState;
use crate::commands::{
    achievements, admin, economy, fishing, gacha, help, jade, leveling, quests, shop, tax, trading,
};
use crate::error::{CommandError, CommandResult};
use crate::services::scheduler;
use serenity::async_trait;
use serenity::client::Context;
use serenity::model::channel::{Message, Reaction};
use serenity::model::gateway::Ready;
use serenity::prelude::EventHandler;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Kumpul,
    Profile,
    Rank,
    Top,
    Help,
    Gacha,
    Rate,
    Use,
    Weekly,
    TradeItem,
    GiveRp,
    EconomyHelp,
    Achievements,
    AchievementHelp,
    Quest,
    QuestStats,
    QuestHelp,
    Shop,
    ShopBuy,
    ShopInfo,
    ShopHistory,
    ForceShopGen,
    TaxInfo,
    TaxHistory,
    TaxStats,
    ForceTax,
    Fish,
    Autofish,
    StopAutofish,
    AutofishStatus,
    Inventory,
    SellFish,
    FishMarket,
    FishUpgrade,
    FishDaily,
    FishStats,
    FishRate,
    FishLeaderboard,
    FishCompare,
    FishHelp,
    BuyJade,
    JadeShop,
    JadeStats,
    JadeLeaderboard,
    JadeRate,
    JadeHelp,
    Market,
    Buy,
    Sell,
    Portfolio,
    Chart,
    History,
    Alert,
    Alerts,
    DeleteAlert,
    NetWorth,
    Convert,
    TradingHelp,
    Setup,
    CheatXp,
    CheatRp,
    ForceQuestGen,
    TestQuest,
    QuestDebug,
}

/// Every command with its names; the first name is the canonical one.
const COMMANDS: &[(&[&str], Command)] = &[
    (&["kumpul"], Command::Kumpul),
    (&["profile"], Command::Profile),
    (&["rank"], Command::Rank),
    (&["top"], Command::Top),
    (&["help", "h", "commands", "cmd"], Command::Help),
    (&["gacha"], Command::Gacha),
    (&["rate"], Command::Rate),
    (&["use"], Command::Use),
    (&["weekly"], Command::Weekly),
    (&["tradeitem"], Command::TradeItem),
    (&["giverp", "givecurrency", "pay"], Command::GiveRp),
    (&["ehelp", "economyhelp", "help_economy"], Command::EconomyHelp),
    (&["achievements", "ach", "achieve"], Command::Achievements),
    (&["achhelp", "achievementhelp"], Command::AchievementHelp),
    (&["quest", "q", "dailyquest"], Command::Quest),
    (&["queststats", "qstats"], Command::QuestStats),
    (&["qhelp", "questhelp"], Command::QuestHelp),
    (&["shop", "store", "dailyshop"], Command::Shop),
    (&["shopbuy", "sbuy"], Command::ShopBuy),
    (&["shopinfo"], Command::ShopInfo),
    (&["shophistory", "shoph"], Command::ShopHistory),
    (&["forceshopgen"], Command::ForceShopGen),
    (&["taxinfo"], Command::TaxInfo),
    (&["taxhistory", "taxh"], Command::TaxHistory),
    (&["taxstats"], Command::TaxStats),
    (&["forcetax"], Command::ForceTax),
    (&["fish"], Command::Fish),
    (&["autofish", "af"], Command::Autofish),
    (&["stopautofish", "stopaf"], Command::StopAutofish),
    (&["afstatus", "autofishstatus"], Command::AutofishStatus),
    (&["inventory", "inv"], Command::Inventory),
    (&["sellfish"], Command::SellFish),
    (&["fishmarket", "fmarket"], Command::FishMarket),
    (&["fishupgrade", "fupgrade", "fishup"], Command::FishUpgrade),
    (&["fishdaily", "fdaily"], Command::FishDaily),
    (&["fishstats", "fstats"], Command::FishStats),
    (&["frate", "fishrate"], Command::FishRate),
    (&["flb", "fishleaderboard", "fishlb"], Command::FishLeaderboard),
    (&["fcompare", "fishcompare", "fc"], Command::FishCompare),
    (&["fhelp", "fishhelp"], Command::FishHelp),
    (&["buyjade", "bjade"], Command::BuyJade),
    (&["jadeshop", "jshop"], Command::JadeShop),
    (&["jadestats", "jstats"], Command::JadeStats),
    (&["jadeleaderboard", "jlb"], Command::JadeLeaderboard),
    (&["jrate", "jaderate"], Command::JadeRate),
    (&["jhelp", "jadehelp"], Command::JadeHelp),
    (&["market"], Command::Market),
    (&["buy"], Command::Buy),
    (&["sell"], Command::Sell),
    (&["portfolio"], Command::Portfolio),
    (&["chart"], Command::Chart),
    (&["history"], Command::History),
    (&["alert"], Command::Alert),
    (&["alerts"], Command::Alerts),
    (&["delalert"], Command::DeleteAlert),
    (&["networth"], Command::NetWorth),
    (&["convert"], Command::Convert),
    (&["thelp", "tradinghelp", "helptrade", "help_trade"], Command::TradingHelp),
    (&["setup"], Command::Setup),
    (&["cheatxp"], Command::CheatXp),
    (&["cheatrp"], Command::CheatRp),
    (&["forcequestgen"], Command::ForceQuestGen),
    (&["testquest"], Command::TestQuest),
    (&["questdebug"], Command::QuestDebug),
];

impl FromStr for Command {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.to_lowercase();
        COMMANDS
            .iter()
            .find(|(names, _)| names.contains(&s.as_str()))
            .map(|(_, command)| *command)
            .ok_or(())
    }
}

impl Command {
    /// Canonical name, used for `DISABLED_COMMANDS` and error replies.
    pub fn name(self) -> &'static str {
        COMMANDS
            .iter()
            .find(|(_, command)| *command == self)
            .map_or("unknown", |(names, _)| names[0])
    }
}

/// Splits `content` into the command word and its arguments when it starts with `prefix`.
pub fn parse_invocation<'a>(content: &'a str, prefix: &str) -> Option<(&'a str, Vec<&'a str>)> {
    let body = content.strip_prefix(prefix)?;
    let mut words = body.split_whitespace();
    let command = words.next()?;
    Some((command, words.collect()))
}

async fn dispatch(
    command: Command,
    ctx: &Context,
    msg: &Message,
    state: &Arc<AppState>,
    args: &[&str],
) -> CommandResult {
    match command {
        Command::Kumpul => leveling::kumpul::run_kumpul(ctx, msg, state).await,
        Command::Profile => leveling::run::run_profile(ctx, msg, state, args).await,
        Command::Rank => leveling::run::run_rank(ctx, msg, state, args).await,
        Command::Top => leveling::run::run_top(ctx, msg, state).await,
        Command::Help => help::run_help(ctx, msg, state, args).await,
        Command::Gacha => gacha::run::run_gacha(ctx, msg, state).await,
        Command::Rate => gacha::run::run_rate(ctx, msg, state).await,
        Command::Use => economy::run::run_use(ctx, msg, state, args).await,
        Command::Weekly => economy::run::run_weekly(ctx, msg, state).await,
        Command::TradeItem => economy::run::run_trade_item(ctx, msg, state, args).await,
        Command::GiveRp => economy::run::run_give_rp(ctx, msg, state, args).await,
        Command::EconomyHelp => economy::run::run_economy_help(ctx, msg, state).await,
        Command::Achievements => achievements::run::run_achievements(ctx, msg, state, args).await,
        Command::AchievementHelp => achievements::run::run_achievement_help(ctx, msg, state).await,
        Command::Quest => quests::run::run_quest(ctx, msg, state).await,
        Command::QuestStats => quests::run::run_quest_stats(ctx, msg, state, args).await,
        Command::QuestHelp => quests::run::run_quest_help(ctx, msg, state).await,
        Command::Shop => shop::run::run_shop(ctx, msg, state).await,
        Command::ShopBuy => shop::run::run_shop_buy(ctx, msg, state, args).await,
        Command::ShopInfo => shop::run::run_shop_info(ctx, msg, state, args).await,
        Command::ShopHistory => shop::run::run_shop_history(ctx, msg, state, args).await,
        Command::ForceShopGen => shop::run::run_force_shop_gen(ctx, msg, state).await,
        Command::TaxInfo => tax::run::run_tax_info(ctx, msg, state).await,
        Command::TaxHistory => tax::run::run_tax_history(ctx, msg, state, args).await,
        Command::TaxStats => tax::run::run_tax_stats(ctx, msg, state).await,
        Command::ForceTax => tax::run::run_force_tax(ctx, msg, state).await,
        Command::Fish => fishing::run::run_fish(ctx, msg, state).await,
        Command::Autofish => fishing::run::run_autofish(ctx, msg, state, args).await,
        Command::StopAutofish => fishing::run::run_stop_autofish(ctx, msg, state).await,
        Command::AutofishStatus => fishing::run::run_autofish_status(ctx, msg, state).await,
        Command::Inventory => fishing::run::run_inventory(ctx, msg, state, args).await,
        Command::SellFish => fishing::run::run_sell_fish(ctx, msg, state, args).await,
        Command::FishMarket => fishing::run::run_fish_market(ctx, msg, state).await,
        Command::FishUpgrade => fishing::run::run_fish_upgrade(ctx, msg, state, args).await,
        Command::FishDaily => fishing::run::run_fish_daily(ctx, msg, state).await,
        Command::FishStats => fishing::run::run_fish_stats(ctx, msg, state, args).await,
        Command::FishRate => fishing::run::run_fish_rate(ctx, msg, state).await,
        Command::FishLeaderboard => fishing::run::run_fish_leaderboard(ctx, msg, state, args).await,
        Command::FishCompare => fishing::run::run_fish_compare(ctx, msg, state, args).await,
        Command::FishHelp => fishing::run::run_fish_help(ctx, msg, state).await,
        Command::BuyJade => jade::run::run_buy_jade(ctx, msg, state, args).await,
        Command::JadeShop => jade::run::run_jade_shop(ctx, msg, state).await,
        Command::JadeStats => jade::run::run_jade_stats(ctx, msg, state, args).await,
        Command::JadeLeaderboard => jade::run::run_jade_leaderboard(ctx, msg, state, args).await,
        Command::JadeRate => jade::run::run_jade_rate(ctx, msg, state).await,
        Command::JadeHelp => jade::run::run_jade_help(ctx, msg, state).await,
        Command::Market => trading::run::run_market(ctx, msg, state).await,
        Command::Buy => trading::run::run_buy(ctx, msg, state, args).await,
        Command::Sell => trading::run::run_sell(ctx, msg, state, args).await,
        Command::Portfolio => trading::run::run_portfolio(ctx, msg, state, args).await,
        Command::Chart => trading::run::run_chart(ctx, msg, state, args).await,
        Command::History => trading::run::run_history(ctx, msg, state, args).await,
        Command::Alert => trading::alerts::run_alert(ctx, msg, state, args).await,
        Command::Alerts => trading::alerts::run_alerts(ctx, msg, state).await,
        Command::DeleteAlert => trading::alerts::run_delete_alert(ctx, msg, state, args).await,
        Command::NetWorth => trading::run::run_networth(ctx, msg, state).await,
        Command::Convert => trading::run::run_convert(ctx, msg, state, args).await,
        Command::TradingHelp => trading::run::run_trading_help(ctx, msg, state).await,
        Command::Setup => admin::run_setup(ctx, msg, state).await,
        Command::CheatXp => admin::run_cheat_xp(ctx, msg, state, args).await,
        Command::CheatRp => admin::run_cheat_rp(ctx, msg, state, args).await,
        Command::ForceQuestGen => admin::run_force_quest_gen(ctx, msg, state).await,
        Command::TestQuest => admin::run_test_quest(ctx, msg, state, args).await,
        Command::QuestDebug => admin::run_quest_debug(ctx, msg, state).await,
    }
}

pub struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if msg.author.bot {
            return;
        }
        let Some(state) = AppState::from_ctx(&ctx).await else {
            error!(target: "handler", "AppState missing from the TypeMap");
            return;
        };
        let Some((word, args)) = parse_invocation(&msg.content, &state.config.prefix) else {
            return;
        };
        let Ok(command) = Command::from_str(word) else {
            return;
        };
        let name = command.name();
        debug!(target: "handler", command = name, user = msg.author.id.get(), "command received");

        let result = if state.config.is_disabled(name) {
            Err(CommandError::Disabled)
        } else {
            dispatch(command, &ctx, &msg, &state, &args).await
        };
        let Err(e) = result else {
            return;
        };
        if e.is_internal() {
            error!(target: "handler", command = name, user = msg.author.id.get(), error = %e, "command failed");
        }
        if let Err(send_err) = msg
            .channel_id
            .say(&ctx.http, e.user_message(&state.config.prefix, name))
            .await
        {
            warn!(target: "handler", command = name, error = %send_err, "could not send error reply");
        }
    }

    async fn reaction_add(&self, ctx: Context, reaction: Reaction) {
        let Some(state) = AppState::from_ctx(&ctx).await else {
            return;
        };
        leveling::kumpul::handle_reaction(&ctx, &state, &reaction).await;
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(target: "handler", user = %ready.user.name, guilds = ready.guilds.len(), "connected and ready");
        match AppState::from_ctx(&ctx).await {
            Some(state) => scheduler::start(&ctx, &state),
            None => error!(target: "handler", "AppState missing, background loops not started"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve_to_canonical_names() {
        assert_eq!(Command::from_str("pay"), Ok(Command::GiveRp));
        assert_eq!(Command::from_str("FLB"), Ok(Command::FishLeaderboard));
        assert_eq!(Command::GiveRp.name(), "giverp");
        assert!(Command::from_str("dance").is_err());
    }

    #[test]
    fn every_name_is_unique() {
        let names: Vec<&str> = COMMANDS.iter().flat_map(|(n, _)| n.iter().copied()).collect();
        for (i, a) in names.iter().enumerate() {
            assert!(names[i + 1..].iter().all(|b| b != a), "duplicate `{a}`");
        }
    }

    #[test]
    fn invocation_needs_the_prefix() {
        assert_eq!(
            parse_invocation("mochi!buy btc 50000", "mochi!"),
            Some(("buy", vec!["btc", "50000"]))
        );
        assert_eq!(parse_invocation("buy btc", "mochi!"), None);
        assert_eq!(parse_invocation("mochi!   ", "mochi!"), None);
    }
}
