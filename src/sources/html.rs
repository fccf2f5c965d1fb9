// src/sources/html.rs
//! Helpers shared by the job board scrapers

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::SourceUnavailable;
use crate::types::JobSite;
use crate::utils::clean_text;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub fn build_client(timeout: Duration) -> reqwest::Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

/// GET `url` with query parameters and return the body of a 2xx response.
pub async fn fetch_page(
    client: &Client,
    site: JobSite,
    url: &str,
    query: &[(&str, &str)],
) -> Result<String, SourceUnavailable> {
    info!("Fetching {} listings: {}", site, url);

    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| SourceUnavailable::new(site, format!("request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        return Err(SourceUnavailable::new(site, format!("HTTP error: {status}")));
    }

    response
        .text()
        .await
        .map_err(|e| SourceUnavailable::new(site, format!("failed to read body: {e}")))
}

/// Card-level selectors for one job board.
pub struct CardSelectors<'a> {
    pub card: &'a str,
    pub title: &'a [&'a str],
    pub company: &'a [&'a str],
    pub location: &'a [&'a str],
    pub description: &'a [&'a str],
    pub link: &'a [&'a str],
}

/// Fields pulled out of one listing card; `link` may still be relative.
#[derive(Debug)]
pub struct RawCard {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub link: String,
}

/// Examine the first `limit` cards. Cards that lack a title or link are skipped;
/// if cards exist but none parse, the markup is treated as changed.
pub fn extract_cards(
    site: JobSite,
    html: &str,
    selectors: &CardSelectors<'_>,
    limit: usize,
) -> Result<Vec<RawCard>, SourceUnavailable> {
    let document = Html::parse_document(html);
    let card_selector = Selector::parse(selectors.card)
        .map_err(|e| SourceUnavailable::new(site, format!("bad card selector: {e}")))?;

    let mut found = 0;
    let mut cards = Vec::new();
    for element in document.select(&card_selector).take(limit) {
        found += 1;
        match parse_card(element, selectors) {
            Some(card) => cards.push(card),
            None => debug!("{} parsing error: card without title or link", site),
        }
    }

    if found > 0 && cards.is_empty() {
        return Err(SourceUnavailable::new(
            site,
            format!("{found} listing cards found but none matched the expected structure"),
        ));
    }
    Ok(cards)
}

fn parse_card(element: ElementRef<'_>, selectors: &CardSelectors<'_>) -> Option<RawCard> {
    let title = find_text(element, selectors.title)?;
    let link = find_attr(element, selectors.link, "href")?;
    Some(RawCard {
        title,
        company: find_text(element, selectors.company).unwrap_or_default(),
        location: find_text(element, selectors.location).unwrap_or_default(),
        description: find_text(element, selectors.description).unwrap_or_default(),
        link,
    })
}

fn find_text(element: ElementRef<'_>, selectors: &[&str]) -> Option<String> {
    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            if let Some(found) = element.select(&selector).next() {
                let text = clean_text(&found.text().collect::<Vec<_>>().join(" "));
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
    }
    None
}

fn find_attr(element: ElementRef<'_>, selectors: &[&str], attr: &str) -> Option<String> {
    for selector_str in selectors {
        if let Ok(selector) = Selector::parse(selector_str) {
            let value = element
                .select(&selector)
                .find_map(|found| found.value().attr(attr))
                .map(str::trim)
                .filter(|v| !v.is_empty());
            if let Some(value) = value {
                return Some(value.to_string());
            }
        }
    }
    None
}

/// Resolve a possibly relative `href` against the site root.
pub fn absolute_link(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href)
    }
}
