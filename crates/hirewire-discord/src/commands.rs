//! Prefix command implementations.
//!
//! Every command answers the requester with an explicit success or
//! error line. Store failures are logged and reported as a generic
//! failure; no command silently swallows a write error.

use serenity::builder::{CreateEmbed, CreateEmbedFooter, CreateMessage};
use serenity::model::channel::Message;
use serenity::model::id::ChannelId;
use serenity::prelude::Context;
use tracing::warn;

use hirewire_core::format::format_interview_list;
use hirewire_core::update::{parse_updates, ParseUpdatesError};
use hirewire_core::validate::{looks_like_time, parse_date, parse_time};
use hirewire_store::InterviewStore;

use crate::handler::InterviewHandler;
use crate::send::send_chunked;

const GENERIC_FAILURE: &str = "❌ Something went wrong, please try again later.";
const NOT_FOUND_OR_NOT_YOURS: &str = "❌ Interview not found or you don't have permission!";
const NEED_ADMIN: &str = "❌ Sorry, you need administrator permissions to use this command!";

/// Route one parsed command to its handler. Unknown commands are
/// ignored so the bot stays quiet on other bots' prefixes.
pub async fn dispatch(
    handler: &InterviewHandler,
    ctx: &Context,
    msg: &Message,
    command: &str,
    args: &str,
) {
    let store = handler.store.as_ref();
    let result = match command {
        "schedule" => schedule(ctx, msg, args, store).await,
        "my_interviews" => my_interviews(ctx, msg, store).await,
        "total" => total(ctx, msg, store).await,
        "update_interview" => update_interview(ctx, msg, args, store).await,
        "delete_interview" => delete_interview(ctx, msg, args, store).await,
        "all_interviews" => all_interviews(ctx, msg, store).await,
        "announce" => announce(ctx, msg, args, handler.config.channel_id).await,
        "help" => help(ctx, msg, &handler.config.command_prefix).await,
        _ => return,
    };

    if let Err(e) = result {
        warn!(command, error = %e, "command reply failed");
    }
}

/// `schedule <YYYY-MM-DD> [HH:MM] <category> <description>`
async fn schedule(
    ctx: &Context,
    msg: &Message,
    args: &str,
    store: &InterviewStore,
) -> Result<(), serenity::Error> {
    let parsed = match parse_schedule_args(args) {
        Ok(parsed) => parsed,
        Err(reply) => {
            msg.channel_id.say(&ctx.http, reply).await?;
            return Ok(());
        }
    };

    let created = store.create(
        msg.author.id.get() as i64,
        &msg.author.name,
        parsed.date,
        parsed.time.as_deref(),
        &parsed.category,
        &parsed.description,
    );

    match created {
        Ok(id) => {
            let when = match &parsed.time {
                Some(t) => format!("{} at {t}", parsed.date),
                None => parsed.date.to_string(),
            };
            msg.channel_id
                .say(&ctx.http, format!("✅ Interview scheduled for {when}! (ID {id})"))
                .await?;
        }
        Err(e) => {
            warn!(error = %e, "schedule insert failed");
            msg.channel_id.say(&ctx.http, GENERIC_FAILURE).await?;
        }
    }
    Ok(())
}

async fn my_interviews(
    ctx: &Context,
    msg: &Message,
    store: &InterviewStore,
) -> Result<(), serenity::Error> {
    let records = match store.list_for_owner(msg.author.id.get() as i64, false) {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "my_interviews query failed");
            msg.channel_id.say(&ctx.http, GENERIC_FAILURE).await?;
            return Ok(());
        }
    };

    if records.is_empty() {
        msg.channel_id
            .say(&ctx.http, "You have no scheduled interviews! 🎉")
            .await?;
        return Ok(());
    }

    let text = format_interview_list(&records, "Your Scheduled Interviews 📅", false, store.today());
    send_chunked(&ctx.http, msg.channel_id, &text).await
}

async fn total(ctx: &Context, msg: &Message, store: &InterviewStore) -> Result<(), serenity::Error> {
    match store.count_for_owner(msg.author.id.get() as i64) {
        Ok(count) => {
            msg.channel_id
                .say(
                    &ctx.http,
                    format!("🎉 You've scheduled {count} interviews in total!"),
                )
                .await?;
        }
        Err(e) => {
            warn!(error = %e, "total query failed");
            msg.channel_id.say(&ctx.http, GENERIC_FAILURE).await?;
        }
    }
    Ok(())
}

/// `update_interview <ID> key=value ...`
async fn update_interview(
    ctx: &Context,
    msg: &Message,
    args: &str,
    store: &InterviewStore,
) -> Result<(), serenity::Error> {
    let (id_token, updates) = match args.split_once(char::is_whitespace) {
        Some((id_token, rest)) => (id_token, rest.trim()),
        None => (args.trim(), ""),
    };
    let Ok(id) = id_token.parse::<i64>() else {
        msg.channel_id
            .say(&ctx.http, "❌ Usage: `update_interview <ID> key=value ...`")
            .await?;
        return Ok(());
    };

    let patch = match parse_updates(updates) {
        Ok(patch) => patch,
        Err(e) => {
            let reply = match e {
                ParseUpdatesError::NoRecognizedKeys => {
                    "❌ Valid keys: date=YYYY-MM-DD, time=HH:MM, type=, desc="
                }
                ParseUpdatesError::InvalidDate(_) => "❌ Invalid date format! Use YYYY-MM-DD",
                ParseUpdatesError::InvalidTime(_) => {
                    "❌ Invalid time format! Use HH:MM (24-hour format)"
                }
            };
            msg.channel_id.say(&ctx.http, reply).await?;
            return Ok(());
        }
    };

    match store.update(id, msg.author.id.get() as i64, &patch) {
        Ok(true) => {
            msg.channel_id
                .say(&ctx.http, "✅ Interview updated successfully!")
                .await?;
        }
        Ok(false) => {
            msg.channel_id.say(&ctx.http, NOT_FOUND_OR_NOT_YOURS).await?;
        }
        Err(e) => {
            warn!(id, error = %e, "update failed");
            msg.channel_id.say(&ctx.http, GENERIC_FAILURE).await?;
        }
    }
    Ok(())
}

/// `delete_interview <ID>`
async fn delete_interview(
    ctx: &Context,
    msg: &Message,
    args: &str,
    store: &InterviewStore,
) -> Result<(), serenity::Error> {
    let Ok(id) = args.trim().parse::<i64>() else {
        msg.channel_id
            .say(&ctx.http, "❌ Usage: `delete_interview <ID>`")
            .await?;
        return Ok(());
    };

    match store.delete(id, msg.author.id.get() as i64) {
        Ok(true) => {
            msg.channel_id
                .say(&ctx.http, "✅ Interview deleted successfully!")
                .await?;
        }
        Ok(false) => {
            msg.channel_id.say(&ctx.http, NOT_FOUND_OR_NOT_YOURS).await?;
        }
        Err(e) => {
            warn!(id, error = %e, "delete failed");
            msg.channel_id.say(&ctx.http, GENERIC_FAILURE).await?;
        }
    }
    Ok(())
}

/// Admin-only: every future interview across owners, with owner names.
async fn all_interviews(
    ctx: &Context,
    msg: &Message,
    store: &InterviewStore,
) -> Result<(), serenity::Error> {
    if !is_admin(ctx, msg).await {
        msg.channel_id.say(&ctx.http, NEED_ADMIN).await?;
        return Ok(());
    }

    let records = match store.list_all_future() {
        Ok(records) => records,
        Err(e) => {
            warn!(error = %e, "all_interviews query failed");
            msg.channel_id.say(&ctx.http, GENERIC_FAILURE).await?;
            return Ok(());
        }
    };

    if records.is_empty() {
        msg.channel_id
            .say(&ctx.http, "No interviews scheduled yet! 📭")
            .await?;
        return Ok(());
    }

    let text = format_interview_list(&records, "All Scheduled Interviews", true, store.today());
    send_chunked(&ctx.http, msg.channel_id, &text).await
}

/// Admin-only: post an announcement embed to the configured channel.
async fn announce(
    ctx: &Context,
    msg: &Message,
    args: &str,
    channel_id: u64,
) -> Result<(), serenity::Error> {
    if !is_admin(ctx, msg).await {
        msg.channel_id.say(&ctx.http, NEED_ADMIN).await?;
        return Ok(());
    }

    let text = args.trim();
    if text.is_empty() {
        msg.channel_id
            .say(&ctx.http, "❌ Usage: `announce <message>`")
            .await?;
        return Ok(());
    }

    let embed = CreateEmbed::new()
        .title("📢 Announcement")
        .description(text)
        .colour(0x7289DA)
        .footer(CreateEmbedFooter::new(format!("From: {}", msg.author.name)));

    let target = ChannelId::new(channel_id);
    match target
        .send_message(&ctx.http, CreateMessage::new().embed(embed))
        .await
    {
        Ok(_) => {
            msg.channel_id.say(&ctx.http, "✅ Announcement sent!").await?;
        }
        Err(e) => {
            warn!(channel_id, error = %e, "announcement delivery failed");
            msg.channel_id
                .say(&ctx.http, "⚠️ Could not post to the announcement channel!")
                .await?;
        }
    }
    Ok(())
}

async fn help(ctx: &Context, msg: &Message, prefix: &str) -> Result<(), serenity::Error> {
    let mut embed = CreateEmbed::new()
        .title("Hirewire 📅")
        .description("Here's everything I can do!")
        .colour(0xFFB6C1)
        .field(
            "📝 User Commands",
            format!(
                "`{prefix}schedule <date> [time] <category> <description>` - Schedule an interview\n\
                 \u{2002}Example: `{prefix}schedule 2024-03-01 14:30 Technical \"System Design\"`\n\
                 `{prefix}my_interviews` - List your upcoming interviews\n\
                 `{prefix}total` - Show your all-time interview count\n\
                 `{prefix}update_interview <ID> <key=value>` - Modify an interview\n\
                 \u{2002}Valid keys: date=, time=, type=, desc=\n\
                 `{prefix}delete_interview <ID>` - Remove an interview"
            ),
            false,
        );

    if is_admin(ctx, msg).await {
        embed = embed.field(
            "👑 Admin Commands",
            format!(
                "`{prefix}all_interviews` - View all scheduled interviews\n\
                 `{prefix}announce <message>` - Post to the announcement channel"
            ),
            false,
        );
    }

    embed = embed
        .field(
            "⏰ Automatic Features",
            "• Daily reminders at 8AM\n\
             • Weekly rankings every Sunday\n\
             • Auto-cleanup of past interviews",
            false,
        )
        .field(
            "💡 Tips",
            "• Date format: `YYYY-MM-DD`\n\
             • Time format: `HH:MM` (24-hour)\n\
             • Use quotes for multi-word descriptions\n\
             • Find IDs with `my_interviews`",
            false,
        );

    msg.channel_id
        .send_message(&ctx.http, CreateMessage::new().embed(embed))
        .await?;
    Ok(())
}

/// Guild administrator check. DMs and lookup failures count as
/// not-admin.
async fn is_admin(ctx: &Context, msg: &Message) -> bool {
    let Some(guild_id) = msg.guild_id else {
        return false;
    };
    let Ok(member) = guild_id.member(&ctx.http, msg.author.id).await else {
        return false;
    };
    member
        .permissions(&ctx.cache)
        .map(|p| p.administrator())
        .unwrap_or(false)
}

#[derive(Debug)]
struct ScheduleArgs {
    date: chrono::NaiveDate,
    time: Option<String>,
    category: String,
    description: String,
}

/// Parse `date [time] category description`, where the category and the
/// description may be double-quoted. The reply for each failure mode
/// mirrors the validation that tripped.
fn parse_schedule_args(args: &str) -> Result<ScheduleArgs, &'static str> {
    const USAGE: &str =
        "❌ Usage: `schedule <YYYY-MM-DD> [HH:MM] <category> <description>`";

    let Some((date_token, rest)) = next_arg(args) else {
        return Err(USAGE);
    };
    let Some(date) = parse_date(&date_token) else {
        return Err("❌ Invalid date format! Please use YYYY-MM-DD");
    };

    let mut rest = rest;
    let mut time = None;
    if let Some((token, after)) = next_arg(rest) {
        if looks_like_time(&token) {
            if !parse_time(&token) {
                return Err("❌ Invalid time format! Please use HH:MM (24-hour format)");
            }
            time = Some(token);
            rest = after;
        }
    }

    let Some((category, rest)) = next_arg(rest) else {
        return Err(USAGE);
    };
    let description = unquote(rest.trim());
    if category.is_empty() || description.is_empty() {
        return Err(USAGE);
    }

    Ok(ScheduleArgs {
        date,
        time,
        category,
        description: description.to_string(),
    })
}

/// Take the next argument: a bare token or a double-quoted span.
fn next_arg(input: &str) -> Option<(String, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    if let Some(quoted) = input.strip_prefix('"') {
        let end = quoted.find('"')?;
        return Some((quoted[..end].to_string(), &quoted[end + 1..]));
    }
    match input.split_once(char::is_whitespace) {
        Some((token, rest)) => Some((token.to_string(), rest)),
        None => Some((input.to_string(), "")),
    }
}

/// Strip one matching pair of surrounding double quotes, if present.
fn unquote(s: &str) -> &str {
    s.strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(s)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn schedule_args_with_time_and_quoted_description() {
        let parsed =
            parse_schedule_args(r#"2024-03-01 14:30 Technical "System Design""#).unwrap();
        assert_eq!(parsed.date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(parsed.time.as_deref(), Some("14:30"));
        assert_eq!(parsed.category, "Technical");
        assert_eq!(parsed.description, "System Design");
    }

    #[test]
    fn schedule_args_without_time() {
        let parsed = parse_schedule_args("2024-03-01 HR phone screen").unwrap();
        assert_eq!(parsed.time, None);
        assert_eq!(parsed.category, "HR");
        assert_eq!(parsed.description, "phone screen");
    }

    #[test]
    fn quoted_category_is_supported() {
        let parsed = parse_schedule_args(r#"2024-03-01 "Tech Round" final onsite"#).unwrap();
        assert_eq!(parsed.category, "Tech Round");
        assert_eq!(parsed.description, "final onsite");
    }

    #[test]
    fn bad_date_and_bad_time_give_distinct_errors() {
        let date_err = parse_schedule_args("2024-13-01 HR prep").unwrap_err();
        assert!(date_err.contains("date"));
        let time_err = parse_schedule_args("2024-03-01 25:00 HR prep").unwrap_err();
        assert!(time_err.contains("time"));
    }

    #[test]
    fn missing_parts_fall_back_to_usage() {
        assert!(parse_schedule_args("").unwrap_err().contains("Usage"));
        assert!(parse_schedule_args("2024-03-01").unwrap_err().contains("Usage"));
        assert!(parse_schedule_args("2024-03-01 HR").unwrap_err().contains("Usage"));
    }

    #[test]
    fn next_arg_handles_quotes_and_whitespace() {
        assert_eq!(
            next_arg(r#""two words" rest"#),
            Some(("two words".to_string(), " rest"))
        );
        assert_eq!(next_arg("  lone"), Some(("lone".to_string(), "")));
        assert_eq!(next_arg("   "), None);
    }

    #[test]
    fn unquote_only_strips_matching_pairs() {
        assert_eq!(unquote("\"quoted\""), "quoted");
        assert_eq!(unquote("\"open"), "\"open");
        assert_eq!(unquote("plain"), "plain");
    }
}
