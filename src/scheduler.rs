// src/scheduler.rs
//! Daily notification scheduling with per-user run state

use chrono::{FixedOffset, Local, NaiveDate, NaiveDateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::watch;

use crate::app_log;
use crate::errors::PipelineError;
use crate::pipeline::{MatchingPipeline, RunReport};
use crate::store::UserStore;
use crate::types::ChatId;

/// How long after its notification time a user can still be picked up.
/// Covers ticks that land late because a previous run was still sending.
const CATCH_UP_MINUTES: i64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Due,
    Running,
}

#[derive(Debug, Default)]
struct Slot {
    state: RunState,
    last_fired: Option<NaiveDate>,
}

/// Source of the wall-clock time notification times are compared against.
#[derive(Debug, Clone, Copy)]
pub enum WallClock {
    Local,
    Fixed(FixedOffset),
}

impl WallClock {
    /// A fixed offset when configured, the host's local time otherwise.
    pub fn from_offset_minutes(minutes: Option<i32>) -> Self {
        minutes
            .and_then(|m| FixedOffset::east_opt(m * 60))
            .map_or(WallClock::Local, WallClock::Fixed)
    }

    pub fn now(self) -> NaiveDateTime {
        match self {
            WallClock::Local => Local::now().naive_local(),
            WallClock::Fixed(offset) => Utc::now().with_timezone(&offset).naive_local(),
        }
    }
}

pub struct Scheduler {
    store: Arc<UserStore>,
    pipeline: Arc<MatchingPipeline>,
    clock: WallClock,
    slots: Mutex<HashMap<ChatId, Slot>>,
}

/// Returns the user to Idle when dropped, whatever way the run ended.
struct RunGuard<'a> {
    scheduler: &'a Scheduler,
    chat_id: ChatId,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        self.scheduler.set_state(self.chat_id, RunState::Idle);
    }
}

impl Scheduler {
    pub fn new(store: Arc<UserStore>, pipeline: Arc<MatchingPipeline>, clock: WallClock) -> Self {
        Self {
            store,
            pipeline,
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    fn slots(&self) -> MutexGuard<'_, HashMap<ChatId, Slot>> {
        // The map stays consistent even if a holder panicked.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_state(&self, chat_id: ChatId, state: RunState) {
        self.slots().entry(chat_id).or_default().state = state;
    }

    pub fn state(&self, chat_id: ChatId) -> RunState {
        self.slots()
            .get(&chat_id)
            .map(|s| s.state)
            .unwrap_or_default()
    }

    pub fn is_running(&self, chat_id: ChatId) -> bool {
        self.state(chat_id) == RunState::Running
    }

    /// Move every unpaused, idle user whose notification time has passed within
    /// the catch-up window to Due. A user fires at most once per calendar day.
    pub async fn tick(&self, now: NaiveDateTime) -> Vec<ChatId> {
        let profiles = self.store.profiles().await;
        let today = now.date();
        let window = chrono::Duration::minutes(CATCH_UP_MINUTES);
        let mut slots = self.slots();
        let mut due = Vec::new();

        for profile in profiles {
            if profile.paused || !profile.notification_time.due_within(now.time(), window) {
                continue;
            }
            let slot = slots.entry(profile.chat_id).or_default();
            if slot.state != RunState::Idle || slot.last_fired == Some(today) {
                continue;
            }
            slot.state = RunState::Due;
            slot.last_fired = Some(today);
            due.push(profile.chat_id);
        }
        due
    }

    /// Idle or Due to Running. `None` if a run is already active.
    fn try_begin(&self, chat_id: ChatId) -> Option<RunGuard<'_>> {
        let mut slots = self.slots();
        let slot = slots.entry(chat_id).or_default();
        if slot.state == RunState::Running {
            return None;
        }
        slot.state = RunState::Running;
        Some(RunGuard {
            scheduler: self,
            chat_id,
        })
    }

    /// Run the pipeline for one user unless a run is already active or the user
    /// has paused notifications.
    pub async fn run_user(&self, chat_id: ChatId) -> Result<RunReport, PipelineError> {
        let Some(_guard) = self.try_begin(chat_id) else {
            return Err(PipelineError::AlreadyRunning(chat_id));
        };
        if self.store.profile(chat_id).await.is_some_and(|p| p.paused) {
            return Err(PipelineError::Paused(chat_id));
        }
        self.pipeline.run_for_user(chat_id).await
    }

    /// Tick at `now` and run every due user in turn. Failures are logged.
    pub async fn run_due(&self, now: NaiveDateTime) -> usize {
        let due = self.tick(now).await;
        let mut ran = 0;

        for chat_id in due {
            app_log!(info, "Sending daily jobs to {}", chat_id);
            match self.run_user(chat_id).await {
                Ok(_) => ran += 1,
                Err(PipelineError::Paused(_)) => {
                    app_log!(info, "Skipping {}: paused since the tick", chat_id)
                }
                Err(e) => app_log!(error, "Error in scheduled job for {}: {}", chat_id, e),
            }
        }
        ran
    }

    /// Tick every `interval` until `shutdown` flips to true.
    pub async fn run_loop(self: Arc<Self>, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        app_log!(info, "Scheduler started (every {}s)", interval.as_secs());

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_due(self.clock.now()).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }
        app_log!(info, "Scheduler stopped");
    }
}
