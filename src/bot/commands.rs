// src/bot/commands.rs
//! Slash-command handlers keyed by command name

use futures::future::BoxFuture;
use std::collections::HashMap;

use super::BotContext;
use crate::app_log;
use crate::errors::PipelineError;
use crate::types::{ChatId, UserProfile};

/// Text sent back to the chat that issued a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markdown: bool,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
        }
    }
}

pub type Handler = for<'a> fn(&'a BotContext, ChatId, &'a str) -> BoxFuture<'a, Reply>;

const HELP_TEXT: &str = "Commands:\n\
/preferences keywords | location | min_score | HH:MM - set everything at once\n\
/keywords <comma-separated> - set job keywords\n\
/location <text> - set job location\n\
/score <0-100> - minimum match score\n\
/time <HH:MM> - daily notification time\n\
/jobs - search for jobs now\n\
/analyze - get resume improvement tips\n\
/pause - stop daily notifications\n\
/resume - restart daily notifications\n\
/status - show your settings\n\n\
Send your resume as a PDF to get started.";

pub struct CommandTable {
    handlers: HashMap<&'static str, Handler>,
}

impl Default for CommandTable {
    fn default() -> Self {
        let entries: [(&'static str, Handler); 12] = [
            ("start", start),
            ("help", help),
            ("preferences", preferences),
            ("keywords", keywords),
            ("location", location),
            ("score", score),
            ("time", time),
            ("jobs", jobs),
            ("analyze", analyze),
            ("pause", pause),
            ("resume", resume),
            ("status", status),
        ];
        Self {
            handlers: entries.into_iter().collect(),
        }
    }
}

impl CommandTable {
    /// Handle a text message. Plain text that is not a command gets no reply.
    pub async fn dispatch(&self, ctx: &BotContext, chat_id: ChatId, text: &str) -> Option<Reply> {
        let (name, args) = parse_command(text)?;
        let reply = match self.handlers.get(name.as_str()) {
            Some(handler) => {
                app_log!(debug, "Command /{} from {}", name, chat_id);
                handler(ctx, chat_id, args).await
            }
            None => Reply::plain("Unknown command. Use /help to see what I can do."),
        };
        Some(reply)
    }
}

/// Split `/name@bot args` into a lower-cased name and the trimmed arguments.
pub fn parse_command(text: &str) -> Option<(String, &str)> {
    let rest = text.trim().strip_prefix('/')?;
    let (head, args) = rest
        .split_once(char::is_whitespace)
        .unwrap_or((rest, ""));
    let name = head.split('@').next().unwrap_or(head);
    if name.is_empty() {
        return None;
    }
    Some((name.to_lowercase(), args.trim()))
}

fn start<'a>(ctx: &'a BotContext, chat_id: ChatId, _args: &'a str) -> BoxFuture<'a, Reply> {
    Box::pin(async move {
        ctx.store.register(chat_id).await;
        Reply::plain(format!(
            "👋 Welcome to the AI Job Match Bot!\n\n\
             1. Send me your resume as a PDF.\n\
             2. Set your preferences with /preferences keywords | location | min_score | HH:MM\n\
             3. Get matching jobs every day, or right now with /jobs.\n\n{}",
            HELP_TEXT
        ))
    })
}

fn help<'a>(_ctx: &'a BotContext, _chat_id: ChatId, _args: &'a str) -> BoxFuture<'a, Reply> {
    Box::pin(async move { Reply::plain(HELP_TEXT) })
}

fn preferences<'a>(ctx: &'a BotContext, chat_id: ChatId, args: &'a str) -> BoxFuture<'a, Reply> {
    Box::pin(async move {
        if args.is_empty() {
            return Reply::plain(
                "Set your preferences in one message:\n\
                 /preferences keywords | location | min_score | HH:MM\n\n\
                 Example: /preferences AI Engineer, ML Engineer | India | 75 | 09:00",
            );
        }
        match ctx.store.set_preferences(chat_id, args).await {
            Ok(update) => Reply::plain(format!(
                "✅ Preferences updated!\n\nKeywords: {}\nLocation: {}\nMinimum score: {}%\nNotification time: {}",
                update.keywords.join(", "),
                update.location,
                update.min_score,
                update.notification_time
            )),
            Err(e) => Reply::plain(format!("❌ {}", e)),
        }
    })
}

fn keywords<'a>(ctx: &'a BotContext, chat_id: ChatId, args: &'a str) -> BoxFuture<'a, Reply> {
    Box::pin(async move {
        match ctx.store.set_keywords(chat_id, args).await {
            Ok(keywords) => Reply::plain(format!("✅ Keywords updated: {}", keywords.join(", "))),
            Err(e) => Reply::plain(format!("❌ {}\nUsage: /keywords AI Engineer, Data Scientist", e)),
        }
    })
}

fn location<'a>(ctx: &'a BotContext, chat_id: ChatId, args: &'a str) -> BoxFuture<'a, Reply> {
    Box::pin(async move {
        match ctx.store.set_location(chat_id, args).await {
            Ok(location) => Reply::plain(format!("✅ Location updated: {}", location)),
            Err(e) => Reply::plain(format!("❌ {}\nUsage: /location Bangalore", e)),
        }
    })
}

fn score<'a>(ctx: &'a BotContext, chat_id: ChatId, args: &'a str) -> BoxFuture<'a, Reply> {
    Box::pin(async move {
        match ctx.store.set_score(chat_id, args).await {
            Ok(score) => Reply::plain(format!("✅ Minimum match score set to {}%", score)),
            Err(e) => Reply::plain(format!("❌ {}\nUsage: /score 75", e)),
        }
    })
}

fn time<'a>(ctx: &'a BotContext, chat_id: ChatId, args: &'a str) -> BoxFuture<'a, Reply> {
    Box::pin(async move {
        match ctx.store.set_time(chat_id, args).await {
            Ok(time) => Reply::plain(format!("✅ Daily notifications set for {}", time)),
            Err(e) => Reply::plain(format!("❌ {}\nUsage: /time 09:30", e)),
        }
    })
}

fn jobs<'a>(ctx: &'a BotContext, chat_id: ChatId, _args: &'a str) -> BoxFuture<'a, Reply> {
    Box::pin(async move {
        if ctx.store.resume_text(chat_id).await.is_none() {
            return Reply::plain("Please upload your resume (PDF) first.");
        }
        if ctx.store.profile(chat_id).await.is_some_and(|p| p.paused) {
            return Reply::plain("⏸️ Notifications are paused. Use /resume first.");
        }
        if ctx.scheduler.is_running(chat_id) {
            return Reply::plain("⏳ A job search is already running for you. Please wait.");
        }

        let scheduler = ctx.scheduler.clone();
        let notifier = ctx.notifier.clone();
        tokio::spawn(async move {
            match scheduler.run_user(chat_id).await {
                Ok(_) => {}
                Err(PipelineError::AlreadyRunning(_)) => {
                    notifier
                        .send_status(chat_id, "⏳ A job search is already running for you.")
                        .await;
                }
                Err(PipelineError::Paused(_)) => {
                    notifier
                        .send_status(chat_id, "⏸️ Notifications are paused. Use /resume first.")
                        .await;
                }
                Err(e) => {
                    app_log!(error, "On-demand run for {} failed: {}", chat_id, e);
                    notifier
                        .send_status(chat_id, "❌ Something went wrong while searching. Please try again later.")
                        .await;
                }
            }
        });

        Reply::plain("🔍 Searching for jobs matching your profile. This may take a minute...")
    })
}

fn analyze<'a>(ctx: &'a BotContext, chat_id: ChatId, _args: &'a str) -> BoxFuture<'a, Reply> {
    Box::pin(async move {
        let Some(profile) = ctx.store.profile(chat_id).await else {
            return Reply::plain("Please upload your resume (PDF) first.");
        };
        let Some(resume) = profile.resume.filter(|r| !r.trim().is_empty()) else {
            return Reply::plain("Please upload your resume (PDF) first.");
        };

        let scorer = ctx.scorer.clone();
        let notifier = ctx.notifier.clone();
        let keywords = profile.keywords;
        tokio::spawn(async move {
            let text = match scorer.review_resume(&resume, &keywords).await {
                Ok(review) => format!("📝 Resume analysis\n\n{}", review),
                Err(e) => {
                    app_log!(error, "Resume analysis for {} failed: {}", chat_id, e);
                    "❌ Could not analyze your resume right now. Please try again later.".to_string()
                }
            };
            notifier.send_status(chat_id, &text).await;
        });

        Reply::plain("🧠 Analyzing your resume...")
    })
}

fn pause<'a>(ctx: &'a BotContext, chat_id: ChatId, _args: &'a str) -> BoxFuture<'a, Reply> {
    Box::pin(async move {
        ctx.store.pause(chat_id).await;
        Reply::plain("⏸️ Daily notifications paused. Use /resume to turn them back on.")
    })
}

fn resume<'a>(ctx: &'a BotContext, chat_id: ChatId, _args: &'a str) -> BoxFuture<'a, Reply> {
    Box::pin(async move {
        ctx.store.resume(chat_id).await;
        Reply::plain("▶️ Daily notifications resumed.")
    })
}

fn status<'a>(ctx: &'a BotContext, chat_id: ChatId, _args: &'a str) -> BoxFuture<'a, Reply> {
    Box::pin(async move {
        match ctx.store.status(chat_id).await {
            Some(profile) => Reply::plain(status_text(&profile)),
            None => Reply::plain("No profile yet. Send /start to begin."),
        }
    })
}

fn status_text(profile: &UserProfile) -> String {
    format!(
        "📋 Your settings\n\nKeywords: {}\nLocation: {}\nMinimum score: {}%\nNotification time: {}\nNotifications: {}\nResume: {}",
        profile.keywords.join(", "),
        profile.location,
        profile.min_score,
        profile.notification_time,
        if profile.paused { "Paused" } else { "Active" },
        if profile.has_resume() { "Uploaded" } else { "Not uploaded" },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bot::testing::context;
    use crate::test_support::{FakeFiles, RecordingMessenger};
    use std::sync::Arc;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("/score 80"), Some(("score".to_string(), "80")));
        assert_eq!(
            parse_command("/Keywords@JobMatchBot  Rust, Go "),
            Some(("keywords".to_string(), "Rust, Go"))
        );
        assert_eq!(parse_command("/status"), Some(("status".to_string(), "")));
        assert_eq!(parse_command("hello"), None);
        assert_eq!(parse_command("/"), None);
    }

    #[tokio::test]
    async fn test_invalid_score_keeps_previous_value() {
        let ctx = context(Arc::new(RecordingMessenger::default()), FakeFiles::default());
        let table = CommandTable::default();
        let chat = ChatId(10);

        table.dispatch(&ctx, chat, "/score 85").await.unwrap();
        for bad in ["/score 101", "/score -1", "/score high", "/score"] {
            let reply = table.dispatch(&ctx, chat, bad).await.unwrap();
            assert!(reply.text.starts_with("❌"), "{bad} should be rejected");
        }

        assert_eq!(ctx.store.profile(chat).await.unwrap().min_score.value(), 85);
    }

    #[tokio::test]
    async fn test_time_stored_exactly() {
        let ctx = context(Arc::new(RecordingMessenger::default()), FakeFiles::default());
        let table = CommandTable::default();
        let chat = ChatId(11);

        let reply = table.dispatch(&ctx, chat, "/time 07:05").await.unwrap();
        assert_eq!(reply.text, "✅ Daily notifications set for 07:05");

        let reply = table.dispatch(&ctx, chat, "/time 7:5").await.unwrap();
        assert!(reply.text.starts_with("❌"));
        assert_eq!(
            ctx.store.profile(chat).await.unwrap().notification_time.to_string(),
            "07:05"
        );
    }

    #[tokio::test]
    async fn test_status_and_pause() {
        let ctx = context(Arc::new(RecordingMessenger::default()), FakeFiles::default());
        let table = CommandTable::default();
        let chat = ChatId(12);

        table.dispatch(&ctx, chat, "/start").await.unwrap();
        table
            .dispatch(&ctx, chat, "/preferences Rust, Go | Pune | 75 | 08:30")
            .await
            .unwrap();
        table.dispatch(&ctx, chat, "/pause").await.unwrap();

        let reply = table.dispatch(&ctx, chat, "/status").await.unwrap();
        assert!(reply.text.contains("Keywords: Rust, Go"));
        assert!(reply.text.contains("Location: Pune"));
        assert!(reply.text.contains("Minimum score: 75%"));
        assert!(reply.text.contains("Notification time: 08:30"));
        assert!(reply.text.contains("Notifications: Paused"));
        assert!(reply.text.contains("Resume: Not uploaded"));
    }

    #[tokio::test]
    async fn test_jobs_requires_resume() {
        let ctx = context(Arc::new(RecordingMessenger::default()), FakeFiles::default());
        let reply = CommandTable::default()
            .dispatch(&ctx, ChatId(13), "/jobs")
            .await
            .unwrap();
        assert!(reply.text.contains("upload your resume"));
        assert!(!ctx.scheduler.is_running(ChatId(13)));
    }

    #[tokio::test]
    async fn test_unknown_command_and_plain_text() {
        let ctx = context(Arc::new(RecordingMessenger::default()), FakeFiles::default());
        let table = CommandTable::default();
        let reply = table.dispatch(&ctx, ChatId(14), "/frobnicate").await.unwrap();
        assert!(reply.text.contains("/help"));
        assert!(table.dispatch(&ctx, ChatId(14), "hi there").await.is_none());
    }

    #[tokio::test]
    async fn test_jobs_refused_while_paused() {
        let messenger = Arc::new(RecordingMessenger::default());
        let ctx = context(messenger.clone(), FakeFiles::default());
        let table = CommandTable::default();
        let chat = ChatId(15);
        ctx.store.register(chat).await;
        ctx.store.set_resume(chat, "Rust developer").await;

        table.dispatch(&ctx, chat, "/pause").await.unwrap();
        let reply = table.dispatch(&ctx, chat, "/jobs").await.unwrap();

        assert!(reply.text.contains("paused"));
        assert!(!ctx.scheduler.is_running(chat));
        assert!(messenger.messages().is_empty());
    }
}
