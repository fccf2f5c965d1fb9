// src/types/profile.rs
use chrono::{DateTime, Duration, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::ValidationError;

/// Telegram chat identifier; one chat is one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Match threshold in percent, always within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct MinScore(u8);

impl MinScore {
    pub fn new(value: i64) -> Result<Self, ValidationError> {
        if (0..=100).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(ValidationError::ScoreOutOfRange(value))
        }
    }

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        let value = trimmed
            .parse::<i64>()
            .map_err(|_| ValidationError::ScoreNotNumeric(trimmed.to_string()))?;
        Self::new(value)
    }

    pub fn value(self) -> u8 {
        self.0
    }

    pub fn admits(self, score: u8) -> bool {
        score >= self.0
    }
}

impl TryFrom<i64> for MinScore {
    type Error = ValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<MinScore> for u8 {
    fn from(score: MinScore) -> Self {
        score.0
    }
}

impl fmt::Display for MinScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Daily notification time. Only strict `HH:MM` is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NotificationTime {
    hour: u8,
    minute: u8,
}

impl NotificationTime {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let raw = raw.trim();
        let malformed = || ValidationError::MalformedTime(raw.to_string());

        let bytes = raw.as_bytes();
        if bytes.len() != 5 || bytes[2] != b':' {
            return Err(malformed());
        }
        let digits_ok = [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
        if !digits_ok {
            return Err(malformed());
        }

        let hour = (bytes[0] - b'0') * 10 + (bytes[1] - b'0');
        let minute = (bytes[3] - b'0') * 10 + (bytes[4] - b'0');
        Self::new(hour, minute).ok_or_else(malformed)
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    /// True when `time` is at or after this HH:MM and less than `window` past it.
    /// The window does not wrap past midnight.
    pub fn due_within(self, time: NaiveTime, window: Duration) -> bool {
        let Some(target) = NaiveTime::from_hms_opt(u32::from(self.hour), u32::from(self.minute), 0)
        else {
            return false;
        };
        let elapsed = time - target;
        elapsed >= Duration::zero() && elapsed < window
    }
}

impl fmt::Display for NotificationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for NotificationTime {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<NotificationTime> for String {
    fn from(time: NotificationTime) -> Self {
        time.to_string()
    }
}

/// Split a comma-separated keyword list, dropping blanks.
pub fn parse_keywords(raw: &str) -> Result<Vec<String>, ValidationError> {
    let keywords: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect();

    if keywords.is_empty() {
        Err(ValidationError::EmptyKeywords)
    } else {
        Ok(keywords)
    }
}

pub fn parse_location(raw: &str) -> Result<String, ValidationError> {
    let location = raw.trim();
    if location.is_empty() {
        Err(ValidationError::EmptyLocation)
    } else {
        Ok(location.to_string())
    }
}

/// Values given to a profile on first contact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDefaults {
    pub keywords: Vec<String>,
    pub location: String,
    pub min_score: MinScore,
    pub notification_time: NotificationTime,
}

impl Default for ProfileDefaults {
    fn default() -> Self {
        Self {
            keywords: vec!["AI Engineer".to_string()],
            location: "India".to_string(),
            min_score: MinScore(70),
            notification_time: NotificationTime { hour: 9, minute: 0 },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub chat_id: ChatId,
    pub keywords: Vec<String>,
    pub location: String,
    pub min_score: MinScore,
    pub notification_time: NotificationTime,
    pub paused: bool,
    pub resume: Option<String>,
    /// Most recent job ids already scored for this user, oldest first.
    #[serde(default)]
    pub seen_jobs: Vec<String>,
    pub last_activity: DateTime<Utc>,
}

impl UserProfile {
    pub fn new(chat_id: ChatId, defaults: &ProfileDefaults) -> Self {
        Self {
            chat_id,
            keywords: defaults.keywords.clone(),
            location: defaults.location.clone(),
            min_score: defaults.min_score,
            notification_time: defaults.notification_time,
            paused: false,
            resume: None,
            seen_jobs: Vec::new(),
            last_activity: Utc::now(),
        }
    }

    pub fn has_resume(&self) -> bool {
        self.resume.as_deref().is_some_and(|r| !r.trim().is_empty())
    }

    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }
}
