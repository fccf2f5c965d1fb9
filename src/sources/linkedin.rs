// src/sources/linkedin.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::info;

use super::html::{absolute_link, build_client, extract_cards, fetch_page, CardSelectors};
use super::{primary_query, JobSource};
use crate::errors::SourceUnavailable;
use crate::types::{JobPosting, JobSite};

const SELECTORS: CardSelectors<'static> = CardSelectors {
    card: ".base-card",
    title: &["h3.base-search-card__title", "h3"],
    company: &["h4.base-search-card__subtitle", "h4"],
    location: &[".job-search-card__location"],
    description: &[".job-search-card__snippet"],
    link: &["a.base-card__full-link", "a"],
};

/// Public LinkedIn job search page.
pub struct LinkedInSource {
    client: Client,
    base_url: String,
    limit: usize,
}

impl LinkedInSource {
    pub fn new(base_url: &str, timeout: Duration, limit: usize) -> Result<Self> {
        let client = build_client(timeout).context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limit,
        })
    }

    pub fn parse_listings(
        html: &str,
        base_url: &str,
        limit: usize,
    ) -> Result<Vec<JobPosting>, SourceUnavailable> {
        let cards = extract_cards(JobSite::LinkedIn, html, &SELECTORS, limit)?;
        Ok(cards
            .into_iter()
            .map(|card| JobPosting {
                title: card.title,
                company: card.company,
                location: card.location,
                description: card.description,
                link: absolute_link(base_url, &card.link),
                site: JobSite::LinkedIn,
            })
            .collect())
    }
}

#[async_trait]
impl JobSource for LinkedInSource {
    fn site(&self) -> JobSite {
        JobSite::LinkedIn
    }

    async fn fetch(
        &self,
        keywords: &[String],
        location: &str,
    ) -> Result<Vec<JobPosting>, SourceUnavailable> {
        let query = primary_query(keywords);
        let url = format!("{}/jobs/search/", self.base_url);
        let html = fetch_page(
            &self.client,
            JobSite::LinkedIn,
            &url,
            &[("keywords", query.as_str()), ("location", location)],
        )
        .await?;

        let postings = Self::parse_listings(&html, &self.base_url, self.limit)?;
        info!("LinkedIn returned {} postings for '{}'", postings.len(), query);
        Ok(postings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
<ul class="jobs-search__results-list">
  <li>
    <div class="base-card base-search-card job-search-card">
      <a class="base-card__full-link" href="https://in.linkedin.com/jobs/view/ai-engineer-at-acme-3812?refId=x&amp;trackingId=y">
        <span class="sr-only">AI Engineer</span>
      </a>
      <div class="base-search-card__info">
        <h3 class="base-search-card__title">
          AI Engineer
        </h3>
        <h4 class="base-search-card__subtitle"><a href="https://in.linkedin.com/company/acme">Acme Labs</a></h4>
        <div class="base-search-card__metadata">
          <span class="job-search-card__location">Bengaluru, Karnataka, India</span>
        </div>
      </div>
    </div>
  </li>
  <li>
    <div class="base-card base-search-card job-search-card">
      <a class="base-card__full-link" href="https://in.linkedin.com/jobs/view/ml-platform-engineer-3813"></a>
      <h3 class="base-search-card__title">ML Platform Engineer</h3>
      <h4 class="base-search-card__subtitle">Globex</h4>
      <span class="job-search-card__location">Remote</span>
    </div>
  </li>
</ul>
"#;

    #[test]
    fn test_parse_linkedin_cards() {
        let jobs = LinkedInSource::parse_listings(FIXTURE, "https://www.linkedin.com", 10).unwrap();
        assert_eq!(jobs.len(), 2);

        assert_eq!(jobs[0].title, "AI Engineer");
        assert_eq!(jobs[0].company, "Acme Labs");
        assert_eq!(jobs[0].location, "Bengaluru, Karnataka, India");
        assert_eq!(jobs[0].site, JobSite::LinkedIn);
        assert_eq!(
            jobs[0].id(),
            "li:https://in.linkedin.com/jobs/view/ai-engineer-at-acme-3812"
        );

        assert_eq!(jobs[1].company, "Globex");
        assert_eq!(jobs[1].location, "Remote");
    }

    #[test]
    fn test_limit_applies() {
        let jobs = LinkedInSource::parse_listings(FIXTURE, "https://www.linkedin.com", 1).unwrap();
        assert_eq!(jobs.len(), 1);
    }
}
