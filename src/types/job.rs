// src/types/job.rs
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobSite {
    LinkedIn,
    Indeed,
}

impl JobSite {
    fn id_prefix(self) -> &'static str {
        match self {
            JobSite::LinkedIn => "li",
            JobSite::Indeed => "indeed",
        }
    }
}

impl fmt::Display for JobSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobSite::LinkedIn => write!(f, "LinkedIn"),
            JobSite::Indeed => write!(f, "Indeed"),
        }
    }
}

/// A listing scraped from a job board for one matching run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPosting {
    pub title: String,
    pub company: String,
    pub location: String,
    pub description: String,
    pub link: String,
    pub site: JobSite,
}

impl JobPosting {
    /// Stable across runs: tracking parameters in the query string are ignored.
    /// Indeed identifies postings by the `jk` query parameter instead of the path.
    /// Indeed links without `jk` (sponsored `/pagead/clk` redirects) share one path,
    /// so those keep their full query.
    pub fn id(&self) -> String {
        let link = self.link.split('#').next().unwrap_or(&self.link);
        let (path, query) = link.split_once('?').unwrap_or((link, ""));

        if self.site == JobSite::Indeed {
            let job_key = query
                .split('&')
                .filter_map(|pair| pair.split_once('='))
                .find(|(key, _)| *key == "jk")
                .map(|(_, value)| value);
            return match job_key {
                Some(job_key) => format!("{}:{}", self.site.id_prefix(), job_key),
                None => format!("{}:{}", self.site.id_prefix(), link),
            };
        }

        format!("{}:{}", self.site.id_prefix(), path.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchResult {
    pub job: JobPosting,
    pub score: u8,
    pub rationale: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_id_ignores_tracking_params() {
        let job = JobPosting {
            title: "ML Engineer".to_string(),
            company: "Acme".to_string(),
            location: "Pune".to_string(),
            description: String::new(),
            link: "https://in.linkedin.com/jobs/view/ml-engineer-123?refId=abc&trackingId=x".to_string(),
            site: JobSite::LinkedIn,
        };
        assert_eq!(job.id(), "li:https://in.linkedin.com/jobs/view/ml-engineer-123");

        let mut other = job.clone();
        other.link = "https://in.linkedin.com/jobs/view/ml-engineer-123/?refId=zzz".to_string();
        assert_eq!(job.id(), other.id());
    }

    #[test]
    fn test_indeed_id_uses_job_key() {
        let job = JobPosting {
            title: "Data Engineer".to_string(),
            company: "Umbrella".to_string(),
            location: "Remote".to_string(),
            description: String::new(),
            link: "https://in.indeed.com/rc/clk?from=serp&jk=def456&vjs=3".to_string(),
            site: JobSite::Indeed,
        };
        assert_eq!(job.id(), "indeed:def456");
    }

    #[test]
    fn test_sponsored_indeed_links_stay_distinct() {
        let ad = |link: &str| JobPosting {
            title: "Backend Engineer".to_string(),
            company: "Globex".to_string(),
            location: "Remote".to_string(),
            description: String::new(),
            link: link.to_string(),
            site: JobSite::Indeed,
        };
        let first = ad("https://in.indeed.com/pagead/clk?mo=r&ad=AAA111#top");
        let second = ad("https://in.indeed.com/pagead/clk?mo=r&ad=BBB222");

        assert_ne!(first.id(), second.id());
        assert_eq!(first.id(), "indeed:https://in.indeed.com/pagead/clk?mo=r&ad=AAA111");
    }
}
