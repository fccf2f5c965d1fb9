// src/core/config_manager.rs
//! Configuration loading: `config.yaml` for tunables, environment for secrets

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::types::ProfileDefaults;

const DEFAULT_GROQ_MODEL: &str = "llama3-70b-8192";
const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub environment: String,
    pub settings: Settings,
    pub secrets: Secrets,
    pub groq_model: String,
    pub port: u16,
    /// Where values came from. Loading runs before logging is set up, so these
    /// are reported later by [`ConfigManager::log_summary`].
    pub env_file: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
}

/// Tunables read from the `local` or `production` section of `config.yaml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub data_file: PathBuf,
    pub log_file: PathBuf,
    pub tick_interval_secs: u64,
    /// Fixed offset for wall-clock scheduling; local time when unset.
    pub utc_offset_minutes: Option<i32>,
    pub http_timeout_secs: u64,
    pub llm_timeout_secs: u64,
    pub poll_timeout_secs: u64,
    pub max_jobs_per_source: usize,
    pub request_delay_ms: u64,
    pub message_interval_ms: u64,
    pub scoring_concurrency: usize,
    pub max_resume_bytes: u64,
    pub groq_base_url: String,
    pub telegram_api_url: String,
    pub linkedin_base_url: String,
    pub indeed_base_url: String,
    pub defaults: ProfileDefaults,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_file: PathBuf::from("users_data.json"),
            log_file: PathBuf::from("/tmp/jobmatch-bot.log"),
            tick_interval_secs: 30,
            utc_offset_minutes: None,
            http_timeout_secs: 30,
            llm_timeout_secs: 60,
            poll_timeout_secs: 30,
            max_jobs_per_source: 10,
            request_delay_ms: 1500,
            message_interval_ms: 1000,
            scoring_concurrency: 1,
            max_resume_bytes: 10 * 1024 * 1024,
            groq_base_url: "https://api.groq.com/openai/v1".to_string(),
            telegram_api_url: "https://api.telegram.org".to_string(),
            linkedin_base_url: "https://www.linkedin.com".to_string(),
            indeed_base_url: "https://in.indeed.com".to_string(),
            defaults: ProfileDefaults::default(),
        }
    }
}

impl Settings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs(self.tick_interval_secs.max(1))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }

    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn message_interval(&self) -> Duration {
        Duration::from_millis(self.message_interval_ms)
    }
}

#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    local: Option<Settings>,
    #[serde(default)]
    production: Option<Settings>,
}

#[derive(Clone)]
pub struct Secrets {
    pub telegram_bot_token: String,
    pub groq_api_key: String,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("telegram_bot_token", &"<redacted>")
            .field("groq_api_key", &"<redacted>")
            .finish()
    }
}

impl ConfigManager {
    /// Load `.env`, then `config.yaml` (if present) and the process environment.
    pub fn load(config_path: &Path) -> Result<Self> {
        let env_file = dotenvy::dotenv().ok();
        let file_content = match std::fs::read_to_string(config_path) {
            Ok(content) => Some(content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", config_path.display()))
            }
        };

        let mut config = Self::from_sources(file_content.as_deref(), |key| std::env::var(key).ok())?;
        config.env_file = env_file;
        config.config_file = file_content.map(|_| config_path.to_path_buf());
        Ok(config)
    }

    /// Report where the configuration came from. Call once logging is initialized.
    pub fn log_summary(&self) {
        if let Some(path) = &self.env_file {
            info!("Loaded environment from {}", path.display());
        }
        match &self.config_file {
            Some(path) => info!("Loaded configuration from {}", path.display()),
            None => info!("No config file found, using built-in defaults"),
        }
        info!("Environment: {}", self.environment);
        info!("User data: {}", self.settings.data_file.display());
        info!("Model: {}", self.groq_model);
    }

    /// Build from raw YAML and an environment lookup.
    pub fn from_sources<F>(yaml: Option<&str>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = env("JOBBOT_ENV")
            .or_else(|| env("ENVIRONMENT"))
            .unwrap_or_else(|| "local".to_string());

        let settings = match yaml {
            Some(content) => {
                let file: ConfigFile =
                    serde_yaml::from_str(content).context("Failed to parse config.yaml")?;
                let section = match environment.as_str() {
                    "production" => file.production,
                    _ => file.local,
                };
                section.unwrap_or_default()
            }
            None => Settings::default(),
        };

        let required = |key: &str| {
            env(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| anyhow::anyhow!("{} environment variable not set", key))
        };

        let secrets = Secrets {
            telegram_bot_token: required("TELEGRAM_BOT_TOKEN")?,
            groq_api_key: required("GROQ_API_KEY")?,
        };

        let groq_model = env("GROQ_MODEL")
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string());

        let port = match env("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid port number"))?,
            None => DEFAULT_PORT,
        };

        if settings.scoring_concurrency == 0 {
            anyhow::bail!("scoring_concurrency must be at least 1");
        }

        Ok(Self {
            environment,
            settings,
            secrets,
            groq_model,
            port,
            env_file: None,
            config_file: None,
        })
    }

    pub async fn ensure_directories(&self) -> Result<()> {
        use crate::core::FsOps;

        if let Some(parent) = self.settings.data_file.parent() {
            FsOps::ensure_dir_exists(parent).await?;
        }
        Ok(())
    }
}
