// src/sources/indeed.rs
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
    card: ".job_seen_beacon",
    title: &["h2 a span[title]", "h2 a", "h2"],
    company: &["[data-testid='company-name']", ".companyName"],
    location: &["[data-testid='text-location']", ".companyLocation"],
    description: &[".job-snippet", "[data-testid='jobsnippet_footer']"],
    link: &["h2 a", "a.jcs-JobTitle"],
};

pub struct IndeedSource {
    client: Client,
    base_url: String,
    limit: usize,
}

impl IndeedSource {
    pub fn new(base_url: &str, timeout: Duration, limit: usize) -> Result<Self> {
        let client = build_client(timeout).context("Failed to create HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            limit,
        })
    }

    /// Indeed links are relative (`/rc/clk?jk=...`) and resolved against `base_url`.
    pub fn parse_listings(
        html: &str,
        base_url: &str,
        limit: usize,
    ) -> Result<Vec<JobPosting>, SourceUnavailable> {
        let cards = extract_cards(JobSite::Indeed, html, &SELECTORS, limit)?;
        Ok(cards
            .into_iter()
            .map(|card| JobPosting {
                title: card.title,
                company: card.company,
                location: card.location,
                description: card.description,
                link: absolute_link(base_url, &card.link),
                site: JobSite::Indeed,
            })
            .collect())
    }
}

#[async_trait]
impl JobSource for IndeedSource {
    fn site(&self) -> JobSite {
        JobSite::Indeed
    }

    async fn fetch(
        &self,
        keywords: &[String],
        location: &str,
    ) -> Result<Vec<JobPosting>, SourceUnavailable> {
        let query = primary_query(keywords);
        let url = format!("{}/jobs", self.base_url);
        let html = fetch_page(
            &self.client,
            JobSite::Indeed,
            &url,
            &[("q", query.as_str()), ("l", location)],
        )
        .await?;

        let postings = Self::parse_listings(&html, &self.base_url, self.limit)?;
        info!("Indeed returned {} postings for '{}'", postings.len(), query);
        Ok(postings)
    }
}
