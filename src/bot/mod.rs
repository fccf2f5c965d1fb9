// src/bot/mod.rs
//! Inbound side of the bot: commands, resume uploads and the update loop

pub mod commands;
pub mod documents;
pub mod poller;

pub use commands::{CommandTable, Reply};
pub use documents::FileFetcher;
pub use poller::run_polling;

use std::sync::Arc;

use crate::notifier::Notifier;
use crate::scheduler::Scheduler;
use crate::scoring::Scorer;
use crate::store::UserStore;

/// Everything a handler needs, shared across tasks.
#[derive(Clone)]
pub struct BotContext {
    pub store: Arc<UserStore>,
    pub scheduler: Arc<Scheduler>,
    pub scorer: Arc<dyn Scorer>,
    pub notifier: Notifier,
    pub files: Arc<dyn FileFetcher>,
    pub max_resume_bytes: u64,
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::pipeline::MatchingPipeline;
    use crate::scheduler::WallClock;
    use crate::test_support::{test_pipeline, FakeFiles, FakeScorer, RecordingMessenger};
    use crate::types::ProfileDefaults;

    /// A context with no job sources, backed by in-memory fakes.
    pub fn context(
        messenger: Arc<RecordingMessenger>,
        files: FakeFiles,
    ) -> BotContext {
        let store = Arc::new(UserStore::in_memory(ProfileDefaults::default()));
        let scorer = Arc::new(FakeScorer::new(&[]));
        let pipeline: MatchingPipeline =
            test_pipeline(store.clone(), Vec::new(), scorer.clone(), messenger.clone());
        let scheduler = Arc::new(Scheduler::new(store.clone(), Arc::new(pipeline), WallClock::Local));

        BotContext {
            store,
            scheduler,
            scorer,
            notifier: Notifier::new(messenger, std::time::Duration::ZERO),
            files: Arc::new(files),
            max_resume_bytes: 64 * 1024,
        }
    }
}
