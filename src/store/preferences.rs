// src/store/preferences.rs
use super::UserStore;
use crate::errors::ValidationError;
use crate::types::profile::{parse_keywords, parse_location};
use crate::types::{ChatId, MinScore, NotificationTime, UserProfile};

/// Everything `/preferences` sets in one go.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceUpdate {
    pub keywords: Vec<String>,
    pub location: String,
    pub min_score: MinScore,
    pub notification_time: NotificationTime,
}

impl PreferenceUpdate {
    /// Parse `keywords | location | score | HH:MM`.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let parts: Vec<&str> = raw.split('|').map(str::trim).collect();
        let [keywords, location, score, time] = parts.as_slice() else {
            return Err(ValidationError::MalformedPreferences);
        };

        Ok(Self {
            keywords: parse_keywords(keywords)?,
            location: parse_location(location)?,
            min_score: MinScore::parse(score)?,
            notification_time: NotificationTime::parse(time)?,
        })
    }
}

impl UserStore {
    pub async fn set_keywords(
        &self,
        chat_id: ChatId,
        raw: &str,
    ) -> Result<Vec<String>, ValidationError> {
        let keywords = parse_keywords(raw)?;
        let stored = keywords.clone();
        self.update(chat_id, move |p| p.keywords = stored).await;
        Ok(keywords)
    }

    pub async fn set_location(&self, chat_id: ChatId, raw: &str) -> Result<String, ValidationError> {
        let location = parse_location(raw)?;
        let stored = location.clone();
        self.update(chat_id, move |p| p.location = stored).await;
        Ok(location)
    }

    pub async fn set_score(&self, chat_id: ChatId, raw: &str) -> Result<MinScore, ValidationError> {
        let score = MinScore::parse(raw)?;
        self.update(chat_id, |p| p.min_score = score).await;
        Ok(score)
    }

    pub async fn set_time(
        &self,
        chat_id: ChatId,
        raw: &str,
    ) -> Result<NotificationTime, ValidationError> {
        let time = NotificationTime::parse(raw)?;
        self.update(chat_id, |p| p.notification_time = time).await;
        Ok(time)
    }

    /// All four fields are validated before any of them is written.
    pub async fn set_preferences(
        &self,
        chat_id: ChatId,
        raw: &str,
    ) -> Result<PreferenceUpdate, ValidationError> {
        let update = PreferenceUpdate::parse(raw)?;
        let stored = update.clone();
        self.update(chat_id, move |p| {
            p.keywords = stored.keywords;
            p.location = stored.location;
            p.min_score = stored.min_score;
            p.notification_time = stored.notification_time;
        })
        .await;
        Ok(update)
    }

    pub async fn pause(&self, chat_id: ChatId) {
        self.update(chat_id, |p| p.paused = true).await;
    }

    pub async fn resume(&self, chat_id: ChatId) {
        self.update(chat_id, |p| p.paused = false).await;
    }

    /// Read-only snapshot of the user's settings.
    pub async fn status(&self, chat_id: ChatId) -> Option<UserProfile> {
        self.profile(chat_id).await
    }
}
