//! Kumpul sessions: week-long portfolio posts whose 🔥 reactions pay XP to the author.
//!
//! A session moves `active -> ended` when its week is over, or `active -> calculating`
//! while an owner confirms a cancel over DM. Each 🔥 above `max_reactions` is paid once;
//! after the first hour the counter resets hourly so a fresh round pays again.

use super::logic::{check_level_up, sync_rank_role};
use super::ui;
use crate::AppState;
use crate::commands::achievements::logic::{Metric, check_achievement_progress};
use crate::commands::common::{clear_reactions, mention, reply, say_briefly, show};
use crate::commands::fishing::ui::achievement_lines;
use crate::commands::shop::logic::has_double_daily_xp;
use crate::constants::{
    ALLOWED_PORTO_CHANNELS, EMOJI_CANCEL, EMOJI_CONFIRM, EMOJI_DENY, EMOJI_FIRE,
    KUMPUL_BOOST_WINDOW_MINS, KUMPUL_CANCEL_TIMEOUT_SECS, KUMPUL_COOLDOWN_DAYS,
    KUMPUL_DURATION_DAYS, KUMPUL_HISTORY_LOOKBACK, KUMPUL_XP_PER_FIRE,
};
use crate::database;
use crate::database::kumpul::SessionStatus;
use crate::database::models::KumpulSession;
use crate::error::{CommandError, CommandResult};
use crate::ui::style::success_embed;
use crate::util::format_duration;
use chrono::{DateTime, Duration, Utc};
use serenity::builder::{CreateMessage, GetMessages};
use serenity::model::channel::{Message, Reaction, ReactionType};
use serenity::model::id::{ChannelId, MessageId, UserId};
use serenity::prelude::*;
use std::sync::Arc;
use tracing::{info, warn};

/// Lifetime of the on-channel "+XP" and reset notices.
const NOTICE_SECS: u64 = 10;

/// Time left on the kumpul cooldown, if any.
pub fn cooldown_left(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<Duration> {
    let ready_at = last? + Duration::days(KUMPUL_COOLDOWN_DAYS);
    (ready_at > now).then(|| ready_at - now)
}

/// True when `author` wrote something other than a bot command among `recent`.
pub fn posted_portfolio<'a>(
    recent: impl IntoIterator<Item = (UserId, &'a str)>,
    author: UserId,
    prefix: &str,
) -> bool {
    recent
        .into_iter()
        .any(|(user, content)| user == author && !content.trim_start().starts_with(prefix))
}

/// XP owed when the 🔥 count moved from `prev_max` to `count`. `None` when nothing new.
pub fn xp_award(prev_max: i64, count: i64, mult: f64, double: bool) -> Option<i64> {
    if count <= prev_max {
        return None;
    }
    let mut xp = (count - prev_max) as f64 * KUMPUL_XP_PER_FIRE as f64 * mult.max(1.0);
    if double {
        xp *= 2.0;
    }
    Some(xp.floor() as i64)
}

/// What the minute processor does with one active session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStep {
    /// Past `end_time`.
    End,
    /// Inside the first hour: only the check stamp moves.
    Touch,
    /// An hour since the last check: the paid count resets.
    Reset,
    Wait,
}

pub fn next_check(session: &KumpulSession, now: DateTime<Utc>) -> SessionStep {
    let window = Duration::minutes(KUMPUL_BOOST_WINDOW_MINS);
    if now >= session.end_time {
        SessionStep::End
    } else if now - session.start_time < window {
        SessionStep::Touch
    } else if now - session.last_xp_check_time >= window {
        SessionStep::Reset
    } else {
        SessionStep::Wait
    }
}

pub async fn run_kumpul(ctx: &Context, msg: &Message, state: &Arc<AppState>) -> CommandResult {
    let channel_name = msg.channel_id.name(ctx).await?;
    if !ALLOWED_PORTO_CHANNELS.contains(&channel_name.as_str()) {
        return Err(CommandError::bad(format!(
            "This command can only be used in: {}",
            ALLOWED_PORTO_CHANNELS
                .iter()
                .map(|c| format!("`#{c}`"))
                .collect::<Vec<_>>()
                .join(", ")
        )));
    }

    let recent = msg
        .channel_id
        .messages(
            &ctx.http,
            GetMessages::new().before(msg.id).limit(KUMPUL_HISTORY_LOOKBACK),
        )
        .await?;
    let posted = posted_portfolio(
        recent.iter().map(|m| (m.author.id, m.content.as_str())),
        msg.author.id,
        &state.config.prefix,
    );
    if !posted {
        return Err(CommandError::bad(
            "Post your portfolio in this channel first, then run the command right after it!",
        ));
    }

    let user_id = msg.author.id;
    let now = Utc::now();
    let profile = database::users::get_or_create_user(&state.db, user_id).await?;
    if let Some(left) = cooldown_left(profile.last_kumpul_time, now) {
        return Err(CommandError::bad(format!(
            "⏰ You can start a new kumpul in **{}**.",
            format_duration(left)
        )));
    }
    if database::kumpul::open_session_for(&state.db, user_id)
        .await?
        .is_some()
    {
        return Err(CommandError::bad(
            "You already have an active kumpul session! Wait for it to end.",
        ));
    }

    let post = msg
        .channel_id
        .send_message(
            &ctx.http,
            CreateMessage::new().embed(ui::kumpul_start_embed(user_id.get())),
        )
        .await?;
    post.react(&ctx.http, ReactionType::Unicode(EMOJI_FIRE.to_string()))
        .await?;
    post.react(&ctx.http, ReactionType::Unicode(EMOJI_CANCEL.to_string()))
        .await?;

    let end = now + Duration::days(KUMPUL_DURATION_DAYS);
    database::kumpul::create_session(&state.db, post.id, user_id, msg.channel_id, now, end)
        .await?;
    let count = {
        let mut tx = state.db.begin().await?;
        database::users::set_last_kumpul_time(&mut *tx, user_id, now).await?;
        let count = database::kumpul::increment_portfolio(&mut *tx, user_id).await?;
        tx.commit().await?;
        count
    };
    info!(target: "kumpul.start", user = user_id.get(), message = post.id.get(), portfolio = count, "kumpul session started");

    let unlocked =
        check_achievement_progress(&state.db, user_id, Metric::PortfolioCount, count).await?;
    if !unlocked.is_empty() {
        reply(
            ctx,
            msg,
            success_embed("🏆 Achievement Unlocked!", achievement_lines(&unlocked)),
        )
        .await?;
    }
    Ok(())
}

/// Entry point for every reaction-add event.
pub async fn handle_reaction(ctx: &Context, state: &Arc<AppState>, reaction: &Reaction) {
    let Some(user_id) = reaction.user_id else {
        return;
    };
    if user_id == ctx.cache.current_user().id {
        return;
    }
    let is_fire = reaction.emoji.unicode_eq(EMOJI_FIRE);
    let is_cancel = reaction.emoji.unicode_eq(EMOJI_CANCEL);
    if !is_fire && !is_cancel {
        return;
    }
    let session = match database::kumpul::get_session(&state.db, reaction.message_id).await {
        Ok(Some(s)) if s.status() == Some(SessionStatus::Active) => s,
        Ok(_) => return,
        Err(e) => {
            warn!(target: "kumpul.reaction", message = reaction.message_id.get(), error = %e, "session lookup failed");
            return;
        }
    };

    let result = if is_cancel {
        if !state.config.is_owner(user_id) {
            return;
        }
        cancel_flow(ctx, state, &session, user_id).await
    } else {
        pay_fire(ctx, state, &session, reaction).await
    };
    if let Err(e) = result {
        warn!(target: "kumpul.reaction", message = session.message_id, error = %e, "reaction handling failed");
    }
}

/// Non-bot users who reacted 🔥, paging through the 100-per-request limit.
async fn count_fire(ctx: &Context, channel: ChannelId, message: MessageId) -> Result<i64, serenity::Error> {
    let mut count = 0;
    let mut after: Option<UserId> = None;
    loop {
        let page = channel
            .reaction_users(
                &ctx.http,
                message,
                ReactionType::Unicode(EMOJI_FIRE.to_string()),
                Some(100),
                after,
            )
            .await?;
        count += page.iter().filter(|u| !u.bot).count() as i64;
        match page.last() {
            Some(last) if page.len() == 100 => after = Some(last.id),
            _ => return Ok(count),
        }
    }
}

async fn pay_fire(
    ctx: &Context,
    state: &Arc<AppState>,
    session: &KumpulSession,
    reaction: &Reaction,
) -> Result<(), CommandError> {
    let count = count_fire(ctx, session.channel(), session.message()).await?;
    let owner = session.owner();
    let now = Utc::now();
    let profile = database::users::get_or_create_user(&state.db, owner).await?;
    let double = has_double_daily_xp(&state.db, owner, now).await?;
    let Some(xp) = xp_award(session.max_reactions, count, profile.next_xp_mult, double) else {
        return Ok(());
    };

    let mut tx = state.db.begin().await?;
    if !database::kumpul::raise_max_reactions(&mut *tx, session.message(), session.max_reactions, count)
        .await?
    {
        // Another event paid this round already.
        tx.rollback().await?;
        return Ok(());
    }
    database::users::add_xp(&mut *tx, owner, xp).await?;
    tx.commit().await?;
    info!(target: "kumpul.reaction", user = owner.get(), fires = count, xp, mult = profile.next_xp_mult, double, "kumpul xp paid");

    say_briefly(
        ctx,
        session.channel(),
        format!("🎉 {} gained **+{xp} XP** from {count} {EMOJI_FIRE}!", mention(session.user_id)),
        NOTICE_SECS,
    )
    .await;

    if let Some(up) = check_level_up(&state.db, owner).await? {
        if let Some(guild_id) = reaction.guild_id {
            sync_rank_role(ctx, &state.config, guild_id, owner, up.new_level).await;
        }
        session
            .channel()
            .send_message(
                &ctx.http,
                CreateMessage::new().embed(ui::level_up_embed(session.user_id, &up)),
            )
            .await?;
    }
    Ok(())
}

async fn cancel_flow(
    ctx: &Context,
    state: &Arc<AppState>,
    session: &KumpulSession,
    owner_id: UserId,
) -> Result<(), CommandError> {
    let message_id = session.message();
    if !database::kumpul::transition_status(
        &state.db,
        message_id,
        SessionStatus::Active,
        SessionStatus::Calculating,
    )
    .await?
    {
        return Ok(());
    }

    let answer = ask_owner(ctx, session, owner_id).await;
    let confirmed = match answer {
        Ok(a) => a,
        Err(e) => {
            warn!(target: "kumpul.cancel", owner = owner_id.get(), error = %e, "could not reach owner, session resumes");
            None
        }
    };

    if confirmed == Some(true) {
        database::kumpul::transition_status(
            &state.db,
            message_id,
            SessionStatus::Calculating,
            SessionStatus::Canceled,
        )
        .await?;
        database::users::set_next_xp_mult(&state.db, session.owner(), 1.0).await?;
        info!(target: "kumpul.cancel", owner = owner_id.get(), message = message_id.get(), "kumpul session canceled");
        session
            .channel()
            .say(
                &ctx.http,
                format!(
                    "{EMOJI_CANCEL} The kumpul session of {} was canceled by an admin.",
                    mention(session.user_id)
                ),
            )
            .await?;
    } else {
        database::kumpul::transition_status(
            &state.db,
            message_id,
            SessionStatus::Calculating,
            SessionStatus::Active,
        )
        .await?;
    }
    Ok(())
}

/// DMs the owner with ✅/🚫. `Some(true)` cancel, `Some(false)` keep, `None` timed out.
async fn ask_owner(
    ctx: &Context,
    session: &KumpulSession,
    owner_id: UserId,
) -> Result<Option<bool>, serenity::Error> {
    let owner = owner_id.to_user(ctx).await?;
    let link = session.message().link(session.channel(), None);
    let dm = owner_id.create_dm_channel(ctx).await?;
    let mut prompt = dm
        .send_message(
            &ctx.http,
            CreateMessage::new().embed(ui::cancel_verify_embed(
                session.user_id,
                &link,
                session.max_reactions,
                &owner.name,
            )),
        )
        .await?;
    prompt
        .react(&ctx.http, ReactionType::Unicode(EMOJI_CONFIRM.to_string()))
        .await?;
    prompt
        .react(&ctx.http, ReactionType::Unicode(EMOJI_DENY.to_string()))
        .await?;

    let picked = prompt
        .await_reaction(&ctx.shard)
        .author_id(owner_id)
        .filter(|r| r.emoji.unicode_eq(EMOJI_CONFIRM) || r.emoji.unicode_eq(EMOJI_DENY))
        .timeout(std::time::Duration::from_secs(KUMPUL_CANCEL_TIMEOUT_SECS))
        .await
        .map(|r| r.emoji.unicode_eq(EMOJI_CONFIRM));

    let (title, description) = match picked {
        Some(true) => ("✅ Session Canceled", format!("The session of {} was canceled.", mention(session.user_id))),
        Some(false) => ("🚫 Cancel Aborted", "The session keeps running.".to_string()),
        None => ("⏰ Timed Out", "No answer, the session keeps running.".to_string()),
    };
    show(ctx, &mut prompt, ui::cancel_result_embed(title, description, picked == Some(true))).await;
    Ok(picked)
}

/// One pass of the minute processor over every active session.
pub async fn process_sessions(
    ctx: &Context,
    state: &AppState,
    now: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    for session in database::kumpul::active_sessions(&state.db).await? {
        let message_id = session.message();
        match next_check(&session, now) {
            SessionStep::End => {
                if !database::kumpul::transition_status(
                    &state.db,
                    message_id,
                    SessionStatus::Active,
                    SessionStatus::Ended,
                )
                .await?
                {
                    continue;
                }
                database::users::set_next_xp_mult(&state.db, session.owner(), 1.0).await?;
                info!(target: "kumpul.end", user = session.user_id, message = session.message_id, "kumpul session ended");
                announce_end(ctx, &session).await;
            }
            SessionStep::Touch => {
                database::kumpul::mark_xp_check(&state.db, message_id, now, false).await?;
            }
            SessionStep::Reset => {
                database::kumpul::mark_xp_check(&state.db, message_id, now, true).await?;
                say_briefly(
                    ctx,
                    session.channel(),
                    format!(
                        "🔄 New {EMOJI_FIRE} round for {}'s kumpul: fresh reactions pay XP again!",
                        mention(session.user_id)
                    ),
                    NOTICE_SECS,
                )
                .await;
            }
            SessionStep::Wait => {}
        }
    }
    Ok(())
}

async fn announce_end(ctx: &Context, session: &KumpulSession) {
    let text = format!(
        "⏰ The {KUMPUL_DURATION_DAYS}-day kumpul session of {} has ended. Thanks for gathering! {EMOJI_FIRE}",
        mention(session.user_id)
    );
    if let Err(e) = session.channel().say(&ctx.http, text).await {
        warn!(target: "kumpul.end", channel = session.channel_id, error = %e, "could not announce session end");
    }
    if let Ok(post) = session.channel().message(&ctx.http, session.message()).await {
        clear_reactions(ctx, &post).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session(start: DateTime<Utc>, last_check: DateTime<Utc>) -> KumpulSession {
        KumpulSession {
            message_id: 1,
            user_id: 2,
            channel_id: 3,
            start_time: start,
            end_time: start + Duration::days(KUMPUL_DURATION_DAYS),
            max_reactions: 0,
            status: "active".into(),
            last_xp_check_time: last_check,
        }
    }

    #[test]
    fn cooldown_runs_a_week() {
        let now = Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap();
        assert_eq!(cooldown_left(None, now), None);
        assert_eq!(
            cooldown_left(Some(now - Duration::days(6)), now),
            Some(Duration::days(1))
        );
        assert_eq!(cooldown_left(Some(now - Duration::days(7)), now), None);
    }

    #[test]
    fn portfolio_must_not_be_a_command() {
        let me = UserId::new(10);
        let other = UserId::new(11);
        let history = [(other, "nice"), (me, "mochi!profile")];
        assert!(!posted_portfolio(history, me, "mochi!"));
        let history = [(other, "nice"), (me, "my new artwork")];
        assert!(posted_portfolio(history, me, "mochi!"));
    }

    #[test]
    fn award_pays_only_new_fires() {
        assert_eq!(xp_award(3, 3, 1.0, false), None);
        assert_eq!(xp_award(3, 2, 1.0, false), None);
        assert_eq!(xp_award(3, 5, 1.0, false), Some(2));
        assert_eq!(xp_award(0, 5, 4.0, false), Some(20));
        assert_eq!(xp_award(0, 5, 4.0, true), Some(40));
    }

    #[test]
    fn processor_steps_follow_the_clock() {
        let start = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let s = session(start, start);
        assert_eq!(next_check(&s, start + Duration::minutes(30)), SessionStep::Touch);
        let s = session(start, start + Duration::minutes(59));
        assert_eq!(next_check(&s, start + Duration::minutes(90)), SessionStep::Wait);
        assert_eq!(next_check(&s, start + Duration::minutes(119)), SessionStep::Reset);
        assert_eq!(next_check(&s, start + Duration::days(8)), SessionStep::End);
    }
}
