// src/store/resume.rs
use std::collections::HashSet;

use super::{UserStore, SEEN_JOBS_LIMIT};
use crate::types::ChatId;

impl UserStore {
    /// Replace the user's resume with freshly extracted text.
    pub async fn set_resume(&self, chat_id: ChatId, text: &str) {
        let text = text.to_string();
        self.update(chat_id, move |p| p.resume = Some(text)).await;
    }

    pub async fn resume_text(&self, chat_id: ChatId) -> Option<String> {
        self.users
            .read()
            .await
            .get(&chat_id)
            .and_then(|p| p.resume.clone())
            .filter(|r| !r.trim().is_empty())
    }

    pub async fn seen_jobs(&self, chat_id: ChatId) -> HashSet<String> {
        self.users
            .read()
            .await
            .get(&chat_id)
            .map(|p| p.seen_jobs.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Append job ids to the user's ledger, keeping only the newest entries.
    pub async fn mark_seen(&self, chat_id: ChatId, job_ids: Vec<String>) {
        if job_ids.is_empty() {
            return;
        }
        self.update(chat_id, move |p| {
            for id in job_ids {
                if !p.seen_jobs.contains(&id) {
                    p.seen_jobs.push(id);
                }
            }
            if p.seen_jobs.len() > SEEN_JOBS_LIMIT {
                let excess = p.seen_jobs.len() - SEEN_JOBS_LIMIT;
                p.seen_jobs.drain(..excess);
            }
        })
        .await;
    }
}
