// Central game constants: channels, emojis, cooldowns and timeouts.
use chrono_tz::Tz;

pub const DEFAULT_PREFIX: &str = "mochi!";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://mochi.db?mode=rwc";

/// Schedules (quests, shop, shop ids) follow Western Indonesia Time.
pub const WIB: Tz = chrono_tz::Asia::Jakarta;

// Kumpul (portfolio gathering) sessions.
pub const ALLOWED_PORTO_CHANNELS: &[&str] = &["mochi", "test-bot", "┍✨porto"];
pub const MAIN_PORTO_CHANNEL_NAME: &str = "┍✨porto";
pub const KUMPUL_COOLDOWN_DAYS: i64 = 7;
pub const KUMPUL_DURATION_DAYS: i64 = 7;
pub const KUMPUL_XP_PER_FIRE: i64 = 1;
pub const KUMPUL_BOOST_WINDOW_MINS: i64 = 60;
pub const KUMPUL_HISTORY_LOOKBACK: u8 = 5;
pub const KUMPUL_CANCEL_TIMEOUT_SECS: u64 = 600;

pub const EMOJI_FIRE: &str = "🔥";
pub const EMOJI_CANCEL: &str = "❌";
pub const EMOJI_CONFIRM: &str = "✅";
pub const EMOJI_DENY: &str = "🚫";
pub const EMOJI_HAMMER: &str = "🔨";

// Interactive confirmations.
pub const CONFIRM_TIMEOUT_SECS: u64 = 30;
pub const JADE_CUT_TIMEOUT_SECS: u64 = 60;

// Leveling.
pub const LEVEL_UP_CURRENCY_PER_LEVEL: i64 = 50_000;
pub const WEEKLY_MIN_LEVEL: i64 = 15;
pub const WEEKLY_COOLDOWN_DAYS: i64 = 7;

// Fishing.
pub const FISH_COOLDOWN_SECS: i64 = 60;
pub const FISH_SELL_TAX_RATE: f64 = 0.25;
pub const FISH_MARKET_REFRESH_MINS: u64 = 15;
pub const AUTOFISH_MIN_HOURS: i64 = 1;
pub const AUTOFISH_MAX_HOURS: i64 = 12;
pub const AUTOFISH_DEFAULT_HOURS: i64 = 2;
pub const AUTOFISH_INTERVAL_SECS: u64 = 60;
pub const FISH_DAILY_COOLDOWN_HOURS: i64 = 24;

// Trading.
pub const PRICE_CACHE_TTL_SECS: u64 = 30;
pub const DUST_THRESHOLD: f64 = 1e-8;
pub const PRICE_ALERT_INTERVAL_SECS: u64 = 60;

// Quests.
pub const QUEST_SWEEP_INTERVAL_SECS: u64 = 10;
pub const QUEST_GENERATION_HOUR_WIB: u32 = 7;
pub const QUEST_DURATION_HOURS: i64 = 24;

// Tax.
pub const TAX_EXEMPT_LEVEL: i64 = 20;
pub const WEEKLY_TAX_HOUR_UTC: u32 = 17;
pub const WEEKLY_TAX_WINDOW_MINS: u32 = 5;

// Shop.
pub const SHOP_RETENTION_DAYS: i64 = 7;

// Leaderboards.
pub const LEADERBOARD_SIZE: i64 = 10;
