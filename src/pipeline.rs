// src/pipeline.rs
//! One matching run for one user: fetch, filter, score, notify

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::app_log;
use crate::core::Settings;
use crate::errors::PipelineError;
use crate::notifier::{DeliveryReport, Notifier};
use crate::scoring::{score_all, Scorer};
use crate::sources::{fetch_all, JobSource};
use crate::store::UserStore;
use crate::types::{ChatId, JobPosting, MatchResult};

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    pub request_delay: Duration,
    pub source_timeout: Duration,
    pub scoring_concurrency: usize,
}

impl PipelineOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            request_delay: settings.request_delay(),
            source_timeout: settings.http_timeout(),
            scoring_concurrency: settings.scoring_concurrency,
        }
    }
}

/// Counters for a finished run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub fetched: usize,
    pub failed_sources: usize,
    pub candidates: usize,
    pub scored: usize,
    pub scoring_failures: usize,
    pub matched: usize,
    pub delivery: DeliveryReport,
}

pub struct MatchingPipeline {
    sources: Vec<Arc<dyn JobSource>>,
    scorer: Arc<dyn Scorer>,
    notifier: Notifier,
    store: Arc<UserStore>,
    options: PipelineOptions,
}

impl MatchingPipeline {
    pub fn new(
        sources: Vec<Arc<dyn JobSource>>,
        scorer: Arc<dyn Scorer>,
        notifier: Notifier,
        store: Arc<UserStore>,
        options: PipelineOptions,
    ) -> Self {
        Self {
            sources,
            scorer,
            notifier,
            store,
            options,
        }
    }

    /// Run fetch, filter, score and notify against a snapshot of the user's profile.
    pub async fn run_for_user(&self, chat_id: ChatId) -> Result<RunReport, PipelineError> {
        let span = info_span!("matching_run", run_id = %Uuid::new_v4(), chat_id = %chat_id);
        self.run(chat_id).instrument(span).await
    }

    async fn run(&self, chat_id: ChatId) -> Result<RunReport, PipelineError> {
        let profile = self
            .store
            .profile(chat_id)
            .await
            .ok_or(PipelineError::UnknownUser(chat_id))?;

        let Some(resume) = profile.resume.clone().filter(|r| !r.trim().is_empty()) else {
            self.notifier
                .send_status(chat_id, "Please upload your resume (PDF) first.")
                .await;
            return Err(PipelineError::MissingResume(chat_id));
        };

        app_log!(
            info,
            "Starting matching run for {} ({:?} in {})",
            chat_id,
            profile.keywords,
            profile.location
        );

        let mut report = RunReport::default();

        let outcome = fetch_all(
            &self.sources,
            &profile.keywords,
            &profile.location,
            self.options.request_delay,
            self.options.source_timeout,
        )
        .await;
        report.fetched = outcome.postings.len();
        report.failed_sources = outcome.failed.len();

        let seen = self.store.seen_jobs(chat_id).await;
        let candidates = filter_candidates(outcome.postings, &profile.keywords, &seen);
        report.candidates = candidates.len();

        let (scored, failures) = score_all(
            self.scorer.as_ref(),
            &resume,
            candidates,
            self.options.scoring_concurrency,
        )
        .await;
        report.scored = scored.len();
        report.scoring_failures = failures.len();

        // Failed jobs stay out of the ledger so the next run retries them.
        self.store
            .mark_seen(chat_id, scored.iter().map(|m| m.job.id()).collect())
            .await;

        let matches = select_matches(scored, |score| profile.min_score.admits(score));
        report.matched = matches.len();
        report.delivery = self.notifier.send(chat_id, &matches).await;

        self.notifier
            .send_status(chat_id, &summary(&report, profile.min_score.value()))
            .await;

        app_log!(
            info,
            "Run finished: fetched={} candidates={} scored={} matched={} delivered={}",
            report.fetched,
            report.candidates,
            report.scored,
            report.matched,
            report.delivery.delivered
        );
        Ok(report)
    }
}

/// Lower-cased keyword tokens of two characters or more.
fn keyword_tokens(keywords: &[String]) -> Vec<String> {
    keywords
        .iter()
        .flat_map(|k| k.split(|c: char| c.is_whitespace() || c == ','))
        .filter(|t| t.chars().count() >= 2)
        .map(str::to_lowercase)
        .collect()
}

/// Drop duplicates, already-seen postings and postings that mention none of the keywords.
pub fn filter_candidates(
    postings: Vec<JobPosting>,
    keywords: &[String],
    seen: &HashSet<String>,
) -> Vec<JobPosting> {
    let tokens = keyword_tokens(keywords);
    let mut batch = HashSet::new();

    postings
        .into_iter()
        .filter(|job| {
            let id = job.id();
            !seen.contains(&id) && batch.insert(id)
        })
        .filter(|job| {
            if tokens.is_empty() {
                return true;
            }
            let haystack = format!("{} {}", job.title, job.description).to_lowercase();
            tokens.iter().any(|t| haystack.contains(t.as_str()))
        })
        .collect()
}

/// Matches at or above the threshold, best first.
fn select_matches(scored: Vec<MatchResult>, admits: impl Fn(u8) -> bool) -> Vec<MatchResult> {
    let mut matches: Vec<MatchResult> = scored.into_iter().filter(|m| admits(m.score)).collect();
    matches.sort_by(|a, b| b.score.cmp(&a.score));
    matches
}

fn summary(report: &RunReport, min_score: u8) -> String {
    let mut text = if report.matched == 0 {
        format!(
            "No new jobs matched your minimum score of {}%. I'll keep looking!",
            min_score
        )
    } else {
        format!(
            "✅ Sent {} job match(es) out of {} new postings.",
            report.delivery.delivered, report.candidates
        )
    };
    if report.failed_sources > 0 {
        text.push_str(&format!(
            "\n⚠️ {} job source(s) could not be reached this time.",
            report.failed_sources
        ));
    }
    text
}
