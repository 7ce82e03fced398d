//! Runtime configuration read from the environment (after `.env` is loaded).

use crate::commands::leveling::logic::Rank;
use crate::constants::{DEFAULT_DATABASE_URL, DEFAULT_PREFIX};
use serenity::model::id::{ChannelId, RoleId, UserId};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable `{0}`")]
    Missing(&'static str),
    #[error("environment variable `{var}` is not a valid Discord id: `{value}`")]
    InvalidId { var: String, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub database_url: String,
    pub prefix: String,
    pub owner_ids: Vec<UserId>,
    pub quest_channel_id: Option<ChannelId>,
    pub rank_roles: Vec<(Rank, RoleId)>,
    pub disabled_commands: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests never touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let token = non_empty("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;
        let database_url =
            non_empty("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let prefix = non_empty("COMMAND_PREFIX").unwrap_or_else(|| DEFAULT_PREFIX.to_string());

        let owner_ids = match non_empty("OWNER_IDS") {
            Some(raw) => parse_id_list("OWNER_IDS", &raw)?
                .into_iter()
                .map(UserId::new)
                .collect(),
            None => Vec::new(),
        };

        let quest_channel_id = non_empty("QUEST_CHANNEL_ID")
            .map(|raw| parse_id("QUEST_CHANNEL_ID", &raw).map(ChannelId::new))
            .transpose()?;

        let mut rank_roles = Vec::new();
        for rank in Rank::ALL {
            let var = format!("RANK_ROLE_{}", rank.role_name().to_uppercase());
            if let Some(raw) = non_empty(&var) {
                rank_roles.push((rank, RoleId::new(parse_id(&var, &raw)?)));
            }
        }

        let disabled_commands = non_empty("DISABLED_COMMANDS")
            .map(|raw| {
                raw.split(',')
                    .map(|s| s.trim().to_lowercase())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            token,
            database_url,
            prefix,
            owner_ids,
            quest_channel_id,
            rank_roles,
            disabled_commands,
        })
    }

    pub fn is_owner(&self, user_id: UserId) -> bool {
        self.owner_ids.contains(&user_id)
    }

    pub fn rank_role(&self, rank: Rank) -> Option<RoleId> {
        self.rank_roles
            .iter()
            .find(|(r, _)| *r == rank)
            .map(|(_, id)| *id)
    }

    pub fn is_disabled(&self, command: &str) -> bool {
        self.disabled_commands.iter().any(|c| c == command)
    }
}

fn parse_id(var: &str, raw: &str) -> Result<u64, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| ConfigError::InvalidId {
            var: var.to_string(),
            value: raw.to_string(),
        })
}

fn parse_id_list(var: &str, raw: &str) -> Result<Vec<u64>, ConfigError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_id(var, s))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn token_is_required() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert_eq!(err, ConfigError::Missing("DISCORD_TOKEN"));
    }

    #[test]
    fn defaults_and_lists() {
        let cfg = Config::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("OWNER_IDS", "11, 22"),
            ("RANK_ROLE_RAJA", "99"),
            ("DISABLED_COMMANDS", "Chart, autofish"),
        ]))
        .unwrap();
        assert_eq!(cfg.prefix, "mochi!");
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert!(cfg.is_owner(UserId::new(22)));
        assert!(!cfg.is_owner(UserId::new(33)));
        assert_eq!(cfg.rank_role(Rank::Raja), Some(RoleId::new(99)));
        assert_eq!(cfg.rank_role(Rank::Warga), None);
        assert!(cfg.is_disabled("chart"));
        assert!(cfg.quest_channel_id.is_none());
    }

    #[test]
    fn bad_ids_name_the_variable() {
        let err = Config::from_lookup(lookup(&[
            ("DISCORD_TOKEN", "abc"),
            ("QUEST_CHANNEL_ID", "not-a-number"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidId { ref var, .. } if var == "QUEST_CHANNEL_ID"));
    }
}
