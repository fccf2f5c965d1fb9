// src/scoring/groq.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error};

use super::parse::parse_score_response;
use super::prompts::{match_prompt, review_prompt};
use super::Scorer;
use crate::errors::ScoringError;
use crate::types::{JobPosting, MatchResult};

const MATCH_TEMPERATURE: f32 = 0.2;
const REVIEW_TEMPERATURE: f32 = 0.3;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Client for Groq's OpenAI-compatible chat completion endpoint.
pub struct GroqClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GroqClient {
    pub fn new(base_url: &str, api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }

    /// Send a single user message and return the completion text.
    pub async fn complete(&self, prompt: &str, temperature: f32) -> Result<String, ScoringError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
        };

        debug!("Calling Groq chat completions with model {}", self.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            error!("Groq API error {}: {}", status, message);
            return Err(ScoringError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(ScoringError::EmptyContent)
    }
}

#[async_trait]
impl Scorer for GroqClient {
    async fn score(&self, resume_text: &str, job: &JobPosting) -> Result<MatchResult, ScoringError> {
        let reply = self
            .complete(&match_prompt(resume_text, job), MATCH_TEMPERATURE)
            .await?;
        let (score, rationale) = parse_score_response(&reply)?;
        Ok(MatchResult {
            job: job.clone(),
            score,
            rationale,
        })
    }

    async fn review_resume(
        &self,
        resume_text: &str,
        keywords: &[String],
    ) -> Result<String, ScoringError> {
        self.complete(&review_prompt(resume_text, keywords), REVIEW_TEMPERATURE)
            .await
    }
}
