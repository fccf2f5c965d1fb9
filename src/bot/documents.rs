// src/bot/documents.rs
//! Resume uploads sent as Telegram documents

use anyhow::Result;
use async_trait::async_trait;
use teloxide::types::{Document, FileMeta};

use super::{BotContext, Reply};
use crate::app_log;
use crate::errors::ResumeError;
use crate::resume::{check_size, extract_resume_text};
use crate::types::ChatId;
use crate::utils::has_pdf_extension;

/// Downloads a file the user sent to the chat.
#[async_trait]
pub trait FileFetcher: Send + Sync {
    async fn fetch_file(&self, file: &FileMeta) -> Result<Vec<u8>>;
}

fn is_pdf(document: &Document) -> bool {
    document
        .mime_type
        .as_ref()
        .is_some_and(|mime| mime.essence_str() == "application/pdf")
        || document.file_name.as_deref().is_some_and(has_pdf_extension)
}

async fn load_resume(ctx: &BotContext, document: &Document) -> Result<String, ResumeError> {
    if !is_pdf(document) {
        return Err(ResumeError::NotPdf);
    }
    check_size(Some(u64::from(document.file.size)), ctx.max_resume_bytes)?;

    let bytes = ctx
        .files
        .fetch_file(&document.file)
        .await
        .map_err(|e| ResumeError::Download(format!("{:#}", e)))?;
    check_size(Some(bytes.len() as u64), ctx.max_resume_bytes)?;

    extract_resume_text(bytes).await
}

/// Store the text of an uploaded PDF resume as the user's current resume.
pub async fn handle_document(ctx: &BotContext, chat_id: ChatId, document: &Document) -> Reply {
    match load_resume(ctx, document).await {
        Ok(text) => {
            ctx.store.set_resume(chat_id, &text).await;
            app_log!(info, "Stored resume for {} ({} chars)", chat_id, text.chars().count());
            Reply::plain(
                "✅ Resume uploaded successfully!\n\n\
                 Now set your preferences:\n\
                 /preferences keywords | location | min_score | HH:MM\n\n\
                 Or run /jobs to search right away.",
            )
        }
        Err(e) => {
            app_log!(warn, "Resume upload from {} rejected: {}", chat_id, e);
            let hint = match e {
                ResumeError::NotPdf => "Please send your resume as a PDF file.",
                _ => "Please try another PDF.",
            };
            Reply::plain(format!("❌ {}\n{}", e, hint))
        }
    }
}
