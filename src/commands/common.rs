//! Helpers shared by every command: replying, resolving target users and confirmations.

use crate::AppState;
use crate::constants::{EMOJI_CANCEL, EMOJI_CONFIRM};
use crate::error::CommandError;
use serenity::builder::{CreateEmbed, CreateMessage, EditMessage};
use serenity::model::channel::{Message, ReactionType};
use serenity::model::id::{ChannelId, GuildId, UserId};
use serenity::model::user::User;
use serenity::prelude::*;
use serenity::utils::parse_user_mention;
use std::time::Duration;
use tracing::warn;

/// Sends `embed` as a reply to the invoking message.
pub async fn reply(ctx: &Context, msg: &Message, embed: CreateEmbed) -> Result<Message, CommandError> {
    let builder = CreateMessage::new().embed(embed).reference_message(msg);
    Ok(msg.channel_id.send_message(&ctx.http, builder).await?)
}

pub async fn say(ctx: &Context, msg: &Message, text: impl Into<String>) -> Result<Message, CommandError> {
    Ok(msg.channel_id.say(&ctx.http, text).await?)
}

pub fn require_guild(msg: &Message) -> Result<GuildId, CommandError> {
    msg.guild_id.ok_or(CommandError::GuildOnly)
}

pub fn require_owner(state: &AppState, msg: &Message) -> Result<(), CommandError> {
    if state.config.is_owner(msg.author.id) {
        Ok(())
    } else {
        Err(CommandError::NotOwner)
    }
}

/// Resolves a `@mention` or raw id argument to a user.
pub async fn resolve_user(ctx: &Context, raw: &str) -> Result<User, CommandError> {
    let id = parse_user_mention(raw)
        .or_else(|| raw.parse::<u64>().ok().filter(|v| *v != 0).map(UserId::new))
        .ok_or_else(|| CommandError::MemberNotFound(raw.to_string()))?;
    id.to_user(&ctx.http)
        .await
        .map_err(|_| CommandError::MemberNotFound(raw.to_string()))
}

/// The user named by the first argument, or the author when it is absent.
pub async fn target_or_author(
    ctx: &Context,
    msg: &Message,
    raw: Option<&&str>,
) -> Result<User, CommandError> {
    match raw {
        Some(r) => resolve_user(ctx, r).await,
        None => Ok(msg.author.clone()),
    }
}

/// Adds ✅/❌ to `prompt` and waits for `user_id` to pick one.
/// `Some(true)` confirmed, `Some(false)` declined, `None` timed out.
pub async fn await_confirmation(
    ctx: &Context,
    prompt: &Message,
    user_id: UserId,
    timeout_secs: u64,
) -> Result<Option<bool>, CommandError> {
    prompt
        .react(&ctx.http, ReactionType::Unicode(EMOJI_CONFIRM.to_string()))
        .await?;
    prompt
        .react(&ctx.http, ReactionType::Unicode(EMOJI_CANCEL.to_string()))
        .await?;
    let reaction = prompt
        .await_reaction(&ctx.shard)
        .author_id(user_id)
        .filter(|r| r.emoji.unicode_eq(EMOJI_CONFIRM) || r.emoji.unicode_eq(EMOJI_CANCEL))
        .timeout(Duration::from_secs(timeout_secs))
        .await;
    Ok(reaction.map(|r| r.emoji.unicode_eq(EMOJI_CONFIRM)))
}

/// Replaces the embed of a prompt. Failures only lose cosmetics, so they are logged.
pub async fn show(ctx: &Context, prompt: &mut Message, embed: CreateEmbed) {
    if let Err(e) = prompt.edit(&ctx.http, EditMessage::new().embed(embed)).await {
        warn!(target: "commands", message = prompt.id.get(), error = %e, "could not edit prompt");
    }
}

pub async fn clear_reactions(ctx: &Context, prompt: &Message) {
    if let Err(e) = prompt.delete_reactions(&ctx.http).await {
        warn!(target: "commands", message = prompt.id.get(), error = %e, "could not clear reactions");
    }
}

/// Posts a short-lived notice that deletes itself after `secs`. Failures are logged.
pub async fn say_briefly(ctx: &Context, channel: ChannelId, text: impl Into<String>, secs: u64) {
    let sent = match channel.say(&ctx.http, text).await {
        Ok(m) => m,
        Err(e) => {
            warn!(target: "commands", channel = channel.get(), error = %e, "could not post notice");
            return;
        }
    };
    let http = ctx.http.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(secs)).await;
        if let Err(e) = channel.delete_message(&http, sent.id).await {
            warn!(target: "commands", channel = channel.get(), error = %e, "could not delete notice");
        }
    });
}

/// `<@id>` for a stored user id.
pub fn mention(user_id: i64) -> String {
    format!("<@{user_id}>")
}
