// src/test_support.rs
//! In-process fakes for the pipeline seams

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use teloxide::types::FileMeta;

use crate::bot::FileFetcher;
use crate::errors::{DeliveryError, ScoringError, SourceUnavailable};
use crate::notifier::{Messenger, Notifier};
use crate::pipeline::{MatchingPipeline, PipelineOptions};
use crate::scoring::Scorer;
use crate::sources::JobSource;
use crate::store::UserStore;
use crate::types::{ChatId, JobPosting, JobSite, MatchResult};

pub fn posting(site: JobSite, title: &str, key: &str) -> JobPosting {
    JobPosting {
        title: title.to_string(),
        company: format!("Company {key}"),
        location: "Remote".to_string(),
        description: format!("{title} role"),
        link: format!("https://jobs.example.com/view/{key}"),
        site,
    }
}

pub struct FakeSource {
    site: JobSite,
    postings: Vec<JobPosting>,
    fail: bool,
    delay: Duration,
}

impl FakeSource {
    pub fn with(site: JobSite, postings: Vec<JobPosting>) -> Self {
        Self {
            site,
            postings,
            fail: false,
            delay: Duration::ZERO,
        }
    }

    pub fn failing(site: JobSite) -> Self {
        Self {
            fail: true,
            ..Self::with(site, Vec::new())
        }
    }

    pub fn slow(site: JobSite, delay: Duration) -> Self {
        Self {
            delay,
            ..Self::with(site, Vec::new())
        }
    }
}

#[async_trait]
impl JobSource for FakeSource {
    fn site(&self) -> JobSite {
        self.site
    }

    async fn fetch(
        &self,
        _keywords: &[String],
        _location: &str,
    ) -> Result<Vec<JobPosting>, SourceUnavailable> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.fail {
            return Err(SourceUnavailable::new(self.site, "connection refused"));
        }
        Ok(self.postings.clone())
    }
}

/// Scores by job title; titles without an entry get a malformed response.
pub struct FakeScorer {
    scores: HashMap<String, u8>,
    delays: HashMap<String, Duration>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeScorer {
    pub fn new(scores: &[(&str, u8)]) -> Self {
        Self {
            scores: scores.iter().map(|(t, s)| (t.to_string(), *s)).collect(),
            delays: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Scoring a listing with one of these titles takes the given time.
    pub fn with_delays(mut self, delays: &[(&str, Duration)]) -> Self {
        self.delays = delays.iter().map(|(t, d)| (t.to_string(), *d)).collect();
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Scorer for FakeScorer {
    async fn score(&self, _resume_text: &str, job: &JobPosting) -> Result<MatchResult, ScoringError> {
        self.calls.lock().unwrap().push(job.title.clone());
        if let Some(delay) = self.delays.get(&job.title) {
            tokio::time::sleep(*delay).await;
        }
        match self.scores.get(&job.title) {
            Some(score) => Ok(MatchResult {
                job: job.clone(),
                score: *score,
                rationale: format!("Strengths: fits {}", job.title),
            }),
            None => Err(ScoringError::NonNumericScore("high".to_string())),
        }
    }

    async fn review_resume(
        &self,
        _resume_text: &str,
        keywords: &[String],
    ) -> Result<String, ScoringError> {
        Ok(format!("Improvements:\n- mention {}", keywords.join(", ")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SentMessage {
    pub chat_id: ChatId,
    pub text: String,
    pub markdown: bool,
}

/// Records outbound messages; chats in `blocked` reject every send.
#[derive(Default)]
pub struct RecordingMessenger {
    pub sent: Mutex<Vec<SentMessage>>,
    pub blocked: Vec<ChatId>,
}

impl RecordingMessenger {
    pub fn blocking(chat_id: ChatId) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            blocked: vec![chat_id],
        }
    }

    pub fn messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        markdown: bool,
    ) -> Result<(), DeliveryError> {
        if self.blocked.contains(&chat_id) {
            return Err(DeliveryError {
                chat_id,
                reason: "Forbidden: bot was blocked by the user".to_string(),
            });
        }
        self.sent.lock().unwrap().push(SentMessage {
            chat_id,
            text: text.to_string(),
            markdown,
        });
        Ok(())
    }
}

/// A pipeline with no delays, wired to the given fakes.
pub fn test_pipeline(
    store: Arc<UserStore>,
    sources: Vec<Arc<dyn JobSource>>,
    scorer: Arc<dyn Scorer>,
    messenger: Arc<dyn Messenger>,
) -> MatchingPipeline {
    MatchingPipeline::new(
        sources,
        scorer,
        Notifier::new(messenger, Duration::ZERO),
        store,
        PipelineOptions {
            request_delay: Duration::ZERO,
            source_timeout: Duration::from_secs(5),
            scoring_concurrency: 1,
        },
    )
}

/// Serves a fixed byte payload for any file id and counts downloads.
#[derive(Clone, Default)]
pub struct FakeFiles {
    payload: Vec<u8>,
    fail: bool,
    downloads: Arc<Mutex<usize>>,
}

impl FakeFiles {
    pub fn serving(payload: Vec<u8>) -> Self {
        Self {
            payload,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn downloads(&self) -> usize {
        *self.downloads.lock().unwrap()
    }
}

#[async_trait]
impl FileFetcher for FakeFiles {
    async fn fetch_file(&self, file: &FileMeta) -> anyhow::Result<Vec<u8>> {
        *self.downloads.lock().unwrap() += 1;
        if self.fail {
            anyhow::bail!("getFile failed for {:?}", file.id);
        }
        Ok(self.payload.clone())
    }
}

/// A one-page PDF with `text` drawn in a standard Type1 font.
pub fn resume_pdf(text: &str) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new("Tj", vec![Object::string_literal(text)]),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
    });
    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}
