// src/store/mod.rs
//! Bot-wide user state keyed by chat id, persisted as a JSON snapshot

mod preferences;
mod resume;

pub use preferences::PreferenceUpdate;

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::{Mutex, RwLock};

use crate::app_log;
use crate::core::FsOps;
use crate::types::{ChatId, ProfileDefaults, UserProfile};

/// Upper bound on remembered job ids per user.
pub const SEEN_JOBS_LIMIT: usize = 100;

pub struct UserStore {
    users: RwLock<HashMap<ChatId, UserProfile>>,
    path: Option<PathBuf>,
    defaults: ProfileDefaults,
    save_lock: Mutex<()>,
}

impl UserStore {
    /// A store that never touches the disk.
    pub fn in_memory(defaults: ProfileDefaults) -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
            path: None,
            defaults,
            save_lock: Mutex::new(()),
        }
    }

    /// Load the snapshot at `path`. A missing or unreadable snapshot starts empty.
    pub async fn open(path: &Path, defaults: ProfileDefaults) -> Self {
        let users = match Self::load_snapshot(path).await {
            Ok(users) => {
                app_log!(info, "Loaded {} users from {}", users.len(), path.display());
                users
            }
            Err(e) => {
                app_log!(error, "Error loading user data: {:#}", e);
                HashMap::new()
            }
        };

        Self {
            users: RwLock::new(users),
            path: Some(path.to_path_buf()),
            defaults,
            save_lock: Mutex::new(()),
        }
    }

    async fn load_snapshot(path: &Path) -> Result<HashMap<ChatId, UserProfile>> {
        match FsOps::read_optional(path).await? {
            Some(content) => serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse user data in {}", path.display())),
            None => Ok(HashMap::new()),
        }
    }

    /// Create a profile with defaults. Returns `true` if the user is new.
    pub async fn register(&self, chat_id: ChatId) -> bool {
        let created = {
            let mut users = self.users.write().await;
            if users.contains_key(&chat_id) {
                false
            } else {
                users.insert(chat_id, UserProfile::new(chat_id, &self.defaults));
                true
            }
        };

        if created {
            app_log!(info, "Registered new user {}", chat_id);
            self.persist().await;
        }
        created
    }

    pub async fn profile(&self, chat_id: ChatId) -> Option<UserProfile> {
        self.users.read().await.get(&chat_id).cloned()
    }

    pub async fn profiles(&self) -> Vec<UserProfile> {
        let mut profiles: Vec<UserProfile> = self.users.read().await.values().cloned().collect();
        profiles.sort_by_key(|p| p.chat_id);
        profiles
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    /// Apply `f` to the user's profile (creating it if needed), then persist.
    pub(crate) async fn update<T>(
        &self,
        chat_id: ChatId,
        f: impl FnOnce(&mut UserProfile) -> T,
    ) -> T {
        let result = {
            let mut users = self.users.write().await;
            let profile = users
                .entry(chat_id)
                .or_insert_with(|| UserProfile::new(chat_id, &self.defaults));
            let result = f(profile);
            profile.touch();
            result
        };
        self.persist().await;
        result
    }

    /// Failures are logged; the in-memory state stays authoritative.
    async fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };

        let _guard = self.save_lock.lock().await;
        let snapshot = {
            let users = self.users.read().await;
            serde_json::to_string_pretty(&*users)
        };

        let result = match snapshot {
            Ok(json) => FsOps::write_atomic(path, &json).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            app_log!(error, "Error saving user data: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_register_is_idempotent() {
        let store = UserStore::in_memory(ProfileDefaults::default());
        assert!(store.register(ChatId(7)).await);
        assert!(!store.register(ChatId(7)).await);
        assert_eq!(store.len().await, 1);

        let profile = store.profile(ChatId(7)).await.unwrap();
        assert_eq!(profile.keywords, vec!["AI Engineer".to_string()]);
        assert_eq!(profile.notification_time.to_string(), "09:00");
        assert!(!profile.paused);
        assert!(profile.resume.is_none());
    }

    #[tokio::test]
    async fn test_snapshot_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users_data.json");

        {
            let store = UserStore::open(&path, ProfileDefaults::default()).await;
            store.register(ChatId(42)).await;
            store.set_score(ChatId(42), "85").await.unwrap();
            store.set_resume(ChatId(42), "Rust developer").await;
            store.pause(ChatId(42)).await;
        }

        let reopened = UserStore::open(&path, ProfileDefaults::default()).await;
        let profile = reopened.profile(ChatId(42)).await.unwrap();
        assert_eq!(profile.min_score.value(), 85);
        assert_eq!(profile.resume.as_deref(), Some("Rust developer"));
        assert!(profile.paused);
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users_data.json");
        tokio::fs::write(&path, "not json").await.unwrap();

        let store = UserStore::open(&path, ProfileDefaults::default()).await;
        assert!(store.is_empty().await);
    }
}
