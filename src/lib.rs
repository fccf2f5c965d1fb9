//! Telegram bot that scores scraped job postings against a user's resume
//! with a hosted language model and delivers matches on a daily schedule.

pub mod bot;
pub mod core;
pub mod errors;
pub mod logging;
pub mod notifier;
pub mod pipeline;
pub mod resume;
pub mod scheduler;
pub mod scoring;
pub mod sources;
pub mod store;
pub mod telegram;
pub mod types;
pub mod utils;
pub mod web;

pub use bot::BotContext;
pub use core::ConfigManager;
pub use pipeline::{MatchingPipeline, RunReport};
pub use scheduler::Scheduler;
pub use store::UserStore;
pub use types::{ChatId, JobPosting, MatchResult, UserProfile};

#[cfg(test)]
pub(crate) mod test_support;
