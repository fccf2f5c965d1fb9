// src/notifier/mod.rs
//! Outbound delivery of match messages

pub mod format;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::errors::DeliveryError;
use crate::types::{ChatId, MatchResult};

/// A channel that can deliver a text message to a chat.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str, markdown: bool)
        -> Result<(), DeliveryError>;
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct Notifier {
    messenger: Arc<dyn Messenger>,
    interval: Duration,
}

impl Notifier {
    /// `interval` is waited between consecutive match messages.
    pub fn new(messenger: Arc<dyn Messenger>, interval: Duration) -> Self {
        Self { messenger, interval }
    }

    /// Send one message per match. Rejected sends are logged, not retried.
    pub async fn send(&self, chat_id: ChatId, matches: &[MatchResult]) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        for (i, result) in matches.iter().enumerate() {
            if i > 0 && !self.interval.is_zero() {
                tokio::time::sleep(self.interval).await;
            }

            let text = format::match_message(result);
            match self.messenger.send_text(chat_id, &text, true).await {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    error!("{}", e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Delivered {} of {} matches to {}",
            report.delivered,
            matches.len(),
            chat_id
        );
        report
    }

    /// Plain status text (progress, summaries, prompts).
    pub async fn send_status(&self, chat_id: ChatId, text: &str) {
        if let Err(e) = self.messenger.send_text(chat_id, text, false).await {
            error!("{}", e);
        }
    }

    pub fn messenger(&self) -> &Arc<dyn Messenger> {
        &self.messenger
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{posting, RecordingMessenger};
    use crate::types::JobSite;

    fn result(title: &str, key: &str, score: u8) -> MatchResult {
        MatchResult {
            job: posting(JobSite::LinkedIn, title, key),
            score,
            rationale: "Good fit".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sends_one_markdown_message_per_match() {
        let messenger = Arc::new(RecordingMessenger::default());
        let notifier = Notifier::new(messenger.clone(), Duration::ZERO);

        let report = notifier
            .send(ChatId(5), &[result("Rust Engineer", "1", 80), result("Go Engineer", "2", 75)])
            .await;

        assert_eq!(report, DeliveryReport { delivered: 2, failed: 0 });
        let sent = messenger.messages();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|m| m.markdown && m.chat_id == ChatId(5)));
        assert!(sent[0].text.contains("Rust Engineer"));
    }

    #[tokio::test]
    async fn test_blocked_chat_reports_failures() {
        let messenger = Arc::new(RecordingMessenger::blocking(ChatId(5)));
        let notifier = Notifier::new(messenger.clone(), Duration::ZERO);

        let report = notifier.send(ChatId(5), &[result("Rust Engineer", "1", 80)]).await;

        assert_eq!(report, DeliveryReport { delivered: 0, failed: 1 });
        assert!(messenger.messages().is_empty());
    }
}
