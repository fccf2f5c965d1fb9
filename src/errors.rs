// src/errors.rs
use thiserror::Error;

use crate::types::{ChatId, JobSite};

/// Bad user input to a preference setter. The stored value is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a valid number.")]
    ScoreNotNumeric(String),

    #[error("Score must be between 0 and 100.")]
    ScoreOutOfRange(i64),

    #[error("Please enter time in HH:MM format.")]
    MalformedTime(String),

    #[error("Please provide at least one keyword.")]
    EmptyKeywords,

    #[error("Please provide a location.")]
    EmptyLocation,

    #[error("Invalid format. Please use: /preferences [keywords] | [location] | [score] | [time]")]
    MalformedPreferences,
}

/// A job board could not be reached or its markup no longer matches.
#[derive(Debug, Error)]
#[error("{site} unavailable: {reason}")]
pub struct SourceUnavailable {
    pub site: JobSite,
    pub reason: String,
}

impl SourceUnavailable {
    pub fn new(site: JobSite, reason: impl Into<String>) -> Self {
        Self {
            site,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Model returned empty content")]
    EmptyContent,

    #[error("Response has no score line")]
    MissingScore,

    #[error("Score is not numeric: {0}")]
    NonNumericScore(String),

    #[error("Score out of range: {0}")]
    ScoreOutOfRange(u32),

    #[error("Response has no rationale")]
    MissingRationale,
}

/// The messaging channel rejected an outbound message.
#[derive(Debug, Error)]
#[error("Delivery to chat {chat_id} failed: {reason}")]
pub struct DeliveryError {
    pub chat_id: ChatId,
    pub reason: String,
}

#[derive(Debug, Error)]
pub enum ResumeError {
    #[error("Only PDF resumes are supported")]
    NotPdf,

    #[error("Resume file is too large ({size} bytes, limit {limit})")]
    TooLarge { size: u64, limit: u64 },

    #[error("Failed to download resume: {0}")]
    Download(String),

    #[error("Failed to read PDF: {0}")]
    Extraction(String),

    #[error("No text could be extracted from the PDF")]
    Empty,
}

/// Failure of a whole matching run, caught at the pipeline boundary.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unknown user {0}")]
    UnknownUser(ChatId),

    #[error("User {0} has not uploaded a resume")]
    MissingResume(ChatId),

    #[error("A matching run is already in progress for {0}")]
    AlreadyRunning(ChatId),

    #[error("Notifications are paused for {0}")]
    Paused(ChatId),
}
