// src/sources/mod.rs
//! Job board adapters and the multi-source fetch used by a matching run

pub mod html;
pub mod indeed;
pub mod linkedin;

pub use indeed::IndeedSource;
pub use linkedin::LinkedInSource;

use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use crate::core::Settings;
use crate::errors::SourceUnavailable;
use crate::types::{JobPosting, JobSite};

#[async_trait]
pub trait JobSource: Send + Sync {
    fn site(&self) -> JobSite;

    async fn fetch(
        &self,
        keywords: &[String],
        location: &str,
    ) -> Result<Vec<JobPosting>, SourceUnavailable>;
}

/// Boards are queried with the user's first keyword; commas become spaces.
pub(crate) fn primary_query(keywords: &[String]) -> String {
    keywords
        .first()
        .map(|k| k.replace(',', " ").split_whitespace().collect::<Vec<_>>().join(" "))
        .unwrap_or_default()
}

/// Both job boards configured from `settings`.
pub fn default_sources(settings: &Settings) -> Result<Vec<Arc<dyn JobSource>>> {
    let timeout = settings.http_timeout();
    let limit = settings.max_jobs_per_source;
    Ok(vec![
        Arc::new(LinkedInSource::new(&settings.linkedin_base_url, timeout, limit)?),
        Arc::new(IndeedSource::new(&settings.indeed_base_url, timeout, limit)?),
    ])
}

/// Postings gathered from every source that answered.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub postings: Vec<JobPosting>,
    pub failed: Vec<SourceUnavailable>,
}

/// Query sources one after another. A failing or slow source is logged and
/// skipped; the others still contribute.
pub async fn fetch_all(
    sources: &[Arc<dyn JobSource>],
    keywords: &[String],
    location: &str,
    delay: Duration,
    timeout: Duration,
) -> FetchOutcome {
    let mut outcome = FetchOutcome::default();

    for source in sources {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let site = source.site();
        let result = match tokio::time::timeout(timeout, source.fetch(keywords, location)).await {
            Ok(result) => result,
            Err(_) => Err(SourceUnavailable::new(
                site,
                format!("timed out after {}s", timeout.as_secs()),
            )),
        };

        match result {
            Ok(postings) => outcome.postings.extend(postings),
            Err(e) => {
                error!("{} scraping error: {}", site, e.reason);
                outcome.failed.push(e);
            }
        }
    }

    info!(
        "Fetched {} postings ({} sources failed)",
        outcome.postings.len(),
        outcome.failed.len()
    );
    outcome
}
