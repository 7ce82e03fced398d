//! Command-level error type and its mapping to user-facing replies.
//!
//! Every prefix command returns [`CommandResult`]. The handler turns an `Err` into exactly one
//! chat reply via [`CommandError::user_message`] and logs the internal variants.

use crate::services::prices::PriceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommandError {
    /// A required positional argument was not supplied. Carries the usage line.
    #[error("missing argument; usage: {usage}")]
    MissingArgument { usage: &'static str },
    #[error("expected a number, got `{0}`")]
    NotANumber(String),
    #[error("no member found for `{0}`")]
    MemberNotFound(String),
    #[error("invalid argument: {0}")]
    BadArgument(String),
    #[error("on cooldown for {0}s")]
    Cooldown(i64),
    #[error("owner-only command")]
    NotOwner,
    #[error("command is disabled")]
    Disabled,
    #[error("command can only be used in a server")]
    GuildOnly,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error(transparent)]
    Price(#[from] PriceError),
    #[error(transparent)]
    Discord(#[from] serenity::Error),
}

pub type CommandResult = Result<(), CommandError>;

impl CommandError {
    pub fn missing(usage: &'static str) -> Self {
        Self::MissingArgument { usage }
    }

    pub fn bad(reason: impl Into<String>) -> Self {
        Self::BadArgument(reason.into())
    }

    /// Errors the user did not cause; these get logged at `error` level.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Price(_) | Self::Discord(_))
    }

    pub fn user_message(&self, prefix: &str, command: &str) -> String {
        match self {
            Self::MissingArgument { usage } => format!(
                "❓ **Incomplete command!**\n✅ Usage: `{prefix}{usage}`\n📌 See `{prefix}help` for more."
            ),
            Self::NotANumber(_) => format!(
                "❌ **Wrong input!**\nYou must enter a **number**, not letters.\n📌 Type `{prefix}help` to see the correct format."
            ),
            Self::MemberNotFound(_) => {
                "❌ **User not found!**\nMake sure you mention the user correctly: `@username`".to_string()
            }
            Self::BadArgument(reason) => format!("❌ {reason}"),
            Self::Cooldown(secs) => {
                format!("⏰ Wait **{secs} seconds** before using this command again!")
            }
            Self::NotOwner => "❌ You do not have permission to use this command!".to_string(),
            Self::Disabled => "❌ This command is currently disabled!".to_string(),
            Self::GuildOnly => {
                "❌ This command can only be used in a server, not in DMs!".to_string()
            }
            Self::Price(_) => "❌ Failed to fetch market prices. Try again shortly.".to_string(),
            Self::Database(_) | Self::Discord(_) => {
                let detail: String = self.to_string().chars().take(100).collect();
                format!(
                    "❌ **Unexpected error!**\nCommand: `{command}`\nError: `{detail}`\n\nTry again or contact an admin if it keeps happening."
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_is_prefixed() {
        let msg = CommandError::missing("use <2x|4x|8x|10x|20x>").user_message("mochi!", "use");
        assert!(msg.contains("`mochi!use <2x|4x|8x|10x|20x>`"));
    }

    #[test]
    fn only_infrastructure_errors_are_internal() {
        assert!(!CommandError::NotOwner.is_internal());
        assert!(!CommandError::Cooldown(5).is_internal());
        assert!(CommandError::Database(sqlx::Error::RowNotFound).is_internal());
    }

    #[test]
    fn internal_detail_is_truncated() {
        let msg = CommandError::Database(sqlx::Error::Protocol("x".repeat(500)))
            .user_message("mochi!", "shopbuy");
        assert!(msg.contains("`shopbuy`"));
        assert!(msg.len() < 400);
    }
}
