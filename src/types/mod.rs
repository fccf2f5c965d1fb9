pub mod job;
pub mod profile;

pub use job::{JobPosting, JobSite, MatchResult};
pub use profile::{ChatId, MinScore, NotificationTime, ProfileDefaults, UserProfile};
