// src/core/mod.rs
//! Configuration and file system plumbing shared by the bot services

pub mod config_manager;
pub mod fs_ops;

pub use config_manager::{ConfigManager, Secrets, Settings};
pub use fs_ops::FsOps;
