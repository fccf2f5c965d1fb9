use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;

use job_matcher::app_log;
use job_matcher::bot::{run_polling, BotContext, CommandTable};
use job_matcher::logging::init_logging;
use job_matcher::notifier::Notifier;
use job_matcher::pipeline::{MatchingPipeline, PipelineOptions};
use job_matcher::scheduler::{Scheduler, WallClock};
use job_matcher::scoring::GroqClient;
use job_matcher::sources::default_sources;
use job_matcher::telegram::TelegramClient;
use job_matcher::web::start_health_server;
use job_matcher::{ChatId, ConfigManager, UserStore};

#[derive(Parser)]
#[command(name = "jobmatch-bot")]
#[command(about = "Telegram bot that scores job postings against your resume")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[arg(long, global = true, default_value = "config.yaml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Command {
    /// Run the bot, scheduler and health server (default)
    Serve,
    /// Validate configuration and exit
    CheckConfig,
    /// Run one matching pass for a user and exit
    RunOnce {
        #[arg(long)]
        chat_id: i64,
    },
}

struct Components {
    store: Arc<UserStore>,
    telegram: TelegramClient,
    scorer: Arc<GroqClient>,
    notifier: Notifier,
    scheduler: Arc<Scheduler>,
}

async fn build(config: &ConfigManager) -> Result<Components> {
    let settings = &config.settings;
    config.ensure_directories().await?;

    let store = Arc::new(UserStore::open(&settings.data_file, settings.defaults.clone()).await);
    let telegram = TelegramClient::new(
        &settings.telegram_api_url,
        config.secrets.telegram_bot_token.clone(),
        std::time::Duration::from_secs(settings.poll_timeout_secs),
    )?;
    let scorer = Arc::new(GroqClient::new(
        &settings.groq_base_url,
        config.secrets.groq_api_key.clone(),
        config.groq_model.clone(),
        settings.llm_timeout(),
    )?);
    let notifier = Notifier::new(Arc::new(telegram.clone()), settings.message_interval());

    let pipeline = Arc::new(MatchingPipeline::new(
        default_sources(settings)?,
        scorer.clone(),
        notifier.clone(),
        store.clone(),
        PipelineOptions::from_settings(settings),
    ));
    let scheduler = Arc::new(Scheduler::new(
        store.clone(),
        pipeline,
        WallClock::from_offset_minutes(settings.utc_offset_minutes),
    ));

    Ok(Components {
        store,
        telegram,
        scorer,
        notifier,
        scheduler,
    })
}

async fn serve(config: ConfigManager) -> Result<()> {
    let parts = build(&config).await?;
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let ctx = BotContext {
        store: parts.store.clone(),
        scheduler: parts.scheduler.clone(),
        scorer: parts.scorer,
        notifier: parts.notifier,
        files: Arc::new(parts.telegram.clone()),
        max_resume_bytes: config.settings.max_resume_bytes,
    };

    let health = tokio::spawn(start_health_server(
        parts.store.clone(),
        config.port,
        shutdown_rx.clone(),
    ));
    let scheduler = tokio::spawn(
        parts
            .scheduler
            .clone()
            .run_loop(config.settings.tick_interval(), shutdown_rx.clone()),
    );
    let poller = tokio::spawn(run_polling(
        ctx,
        parts.telegram,
        CommandTable::default(),
        shutdown_rx,
    ));

    app_log!(info, "🤖 Bot is running with {} users", parts.store.len().await);

    tokio::signal::ctrl_c().await?;
    app_log!(info, "Shutting down");
    let _ = shutdown_tx.send(true);

    let _ = poller.await;
    let _ = scheduler.await;
    match health.await {
        Ok(Err(e)) => app_log!(error, "Health server error: {:#}", e),
        Err(e) => app_log!(error, "Health server task failed: {}", e),
        Ok(Ok(())) => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ConfigManager::load(&cli.config)?;
    init_logging(&config.settings.log_file)?;
    config.log_summary();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::CheckConfig => {
            app_log!(info, "Configuration OK");
            app_log!(info, "{:#?}", config.settings);
            Ok(())
        }
        Command::RunOnce { chat_id } => {
            let parts = build(&config).await?;
            let report = parts.scheduler.run_user(ChatId(chat_id)).await?;
            app_log!(info, "Run complete: {:?}", report);
            Ok(())
        }
    }
}
