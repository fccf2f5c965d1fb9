// src/telegram/mod.rs
//! Telegram Bot API access through teloxide

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::time::Duration;
use teloxide::net::Download;
use teloxide::payloads::SendMessageSetters;
use teloxide::requests::Requester;
use teloxide::types::{FileMeta, ParseMode};
use teloxide::Bot;

use crate::app_log;
use crate::bot::FileFetcher;
use crate::errors::DeliveryError;
use crate::notifier::Messenger;
use crate::types::ChatId;

impl From<teloxide::types::ChatId> for ChatId {
    fn from(id: teloxide::types::ChatId) -> Self {
        ChatId(id.0)
    }
}

impl From<ChatId> for teloxide::types::ChatId {
    fn from(id: ChatId) -> Self {
        teloxide::types::ChatId(id.0)
    }
}

/// Outbound messages and file downloads for one bot token.
#[derive(Clone)]
pub struct TelegramClient {
    bot: Bot,
    poll_timeout: Duration,
}

impl TelegramClient {
    /// `poll_timeout` is the long-poll wait; the HTTP timeout is kept above it.
    pub fn new(api_url: &str, token: String, poll_timeout: Duration) -> Result<Self> {
        let client = teloxide::net::default_reqwest_settings()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build()
            .context("Failed to create Telegram HTTP client")?;
        let url = reqwest::Url::parse(api_url)
            .with_context(|| format!("Invalid Telegram API URL: {}", api_url))?;

        Ok(Self {
            bot: Bot::with_client(token, client).set_api_url(url),
            poll_timeout,
        })
    }

    pub fn bot(&self) -> Bot {
        self.bot.clone()
    }

    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        markdown: bool,
    ) -> Result<(), DeliveryError> {
        let mut request = self
            .bot
            .send_message(teloxide::types::ChatId::from(chat_id), text);
        if markdown {
            request = request.parse_mode(ParseMode::Markdown);
        }

        request.await.map_err(|e| DeliveryError {
            chat_id,
            reason: e.to_string(),
        })?;

        app_log!(trace, "Message sent to {}", chat_id);
        Ok(())
    }
}

#[async_trait]
impl FileFetcher for TelegramClient {
    async fn fetch_file(&self, meta: &FileMeta) -> Result<Vec<u8>> {
        let file = self
            .bot
            .get_file(meta.id.clone())
            .await
            .context("Telegram getFile failed")?;

        let mut bytes = Vec::new();
        self.bot
            .download_file(&file.path, &mut bytes)
            .await
            .context("Telegram file download failed")?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path, path_regex};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> TelegramClient {
        TelegramClient::new(&server.uri(), "123:abc".to_string(), Duration::from_secs(0)).unwrap()
    }

    #[tokio::test]
    async fn test_send_text_rejected_is_delivery_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex("(?i)^/bot123:abc/sendmessage$"))
            .and(body_partial_json(json!({ "chat_id": 7, "parse_mode": "Markdown" })))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "ok": false,
                "error_code": 403,
                "description": "Forbidden: bot was blocked by the user"
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .send_text(ChatId(7), "*hi*", true)
            .await
            .unwrap_err();
        assert_eq!(err.chat_id, ChatId(7));
        assert!(!err.reason.contains("123:abc"));
    }

    #[tokio::test]
    async fn test_download_resolves_file_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path_regex("(?i)^/bot123:abc/getfile$"))
            .and(body_partial_json(json!({ "file_id": "F1" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "result": {
                    "file_id": "F1",
                    "file_unique_id": "U1",
                    "file_size": 4,
                    "file_path": "documents/file_3.pdf"
                }
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/file/bot123:abc/documents/file_3.pdf"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF".to_vec()))
            .mount(&server)
            .await;

        let meta: FileMeta = serde_json::from_value(json!({
            "file_id": "F1",
            "file_unique_id": "U1",
            "file_size": 4
        }))
        .unwrap();
        let bytes = client(&server).fetch_file(&meta).await.unwrap();
        assert_eq!(bytes, b"%PDF");
    }

    #[test]
    fn test_chat_id_conversion() {
        let id: teloxide::types::ChatId = ChatId(-100123).into();
        assert_eq!(id.0, -100123);
        assert_eq!(ChatId::from(id), ChatId(-100123));
    }
}
