// src/scoring/mod.rs
//! Resume-to-job scoring through a hosted language model

pub mod groq;
pub mod parse;
pub mod prompts;

pub use groq::GroqClient;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tracing::warn;

use crate::errors::ScoringError;
use crate::types::{JobPosting, MatchResult};

#[async_trait]
pub trait Scorer: Send + Sync {
    async fn score(&self, resume_text: &str, job: &JobPosting) -> Result<MatchResult, ScoringError>;

    /// Free-text advice on improving the resume for the given keywords.
    async fn review_resume(
        &self,
        resume_text: &str,
        keywords: &[String],
    ) -> Result<String, ScoringError>;
}

/// Jobs that could not be scored, with the reason.
pub type ScoreFailures = Vec<(JobPosting, ScoringError)>;

/// Score every job with at most `concurrency` calls in flight. Results keep
/// the input order; a failed job is logged and returned separately.
pub async fn score_all(
    scorer: &dyn Scorer,
    resume_text: &str,
    jobs: Vec<JobPosting>,
    concurrency: usize,
) -> (Vec<MatchResult>, ScoreFailures) {
    let outcomes: Vec<(JobPosting, Result<MatchResult, ScoringError>)> = stream::iter(jobs)
        .map(|job| async move {
            let result = scorer.score(resume_text, &job).await;
            (job, result)
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let mut scored = Vec::new();
    let mut failed = Vec::new();
    for (job, result) in outcomes {
        match result {
            Ok(result) => scored.push(result),
            Err(e) => {
                warn!("Scoring error for '{}' ({}): {}", job.title, job.link, e);
                failed.push((job, e));
            }
        }
    }
    (scored, failed)
}
