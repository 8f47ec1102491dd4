//! Herald bot binary
//!
//! # Usage
//!
//! ```bash
//! export TELEGRAM_BOT_TOKEN="123456:ABC..."
//! export OPENAI_API_KEY="sk-..."
//!
//! # Menu bot with the fact-of-the-day task
//! cargo run --bin herald-bot -- serve --heroes data/heroes.json
//!
//! # Static broadcast loop only
//! HERALD_BROADCAST_CHATS="-100123,579063567=Personal reminder" \
//!     cargo run --bin herald-bot -- broadcast
//! ```

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use herald_bot::bot::KeywordResponder;
use herald_bot::dialog::default_menu_table;
use herald_bot::platforms::{TelegramClient, TelegramConfig, TelegramPoller};
use herald_bot::{
    Broadcaster, Dispatcher, FactOfTheDay, HeraldConfig, HeroBot, HeroCatalog, SessionManager,
    StaticMessage,
};
use herald_llm::FallbackCompleter;
use herald_llm::providers::{OpenAIConfig, OpenAIProvider};
use herald_prompt::PromptCatalog;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "herald-bot", version)]
#[command(about = "Telegram hero FAQ bot with broadcasts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the menu bot and the fact-of-the-day task
    Serve {
        /// Hero catalog JSON (overrides HERALD_HEROES_PATH)
        #[arg(long)]
        heroes: Option<PathBuf>,

        /// Prompt templates JSON (overrides HERALD_PROMPTS_PATH)
        #[arg(long)]
        prompts: Option<PathBuf>,
    },
    /// Run the static broadcast loop only
    Broadcast,
}

#[tokio::main]
async fn main() -> ExitCode {
    herald_utils::init_tracing_with_default("warn,herald_bot=info");

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Serve { heroes, prompts } => serve(heroes, prompts).await,
        Commands::Broadcast => broadcast().await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("herald-bot stopped: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn serve(heroes: Option<PathBuf>, prompts: Option<PathBuf>) -> anyhow::Result<()> {
    let mut builder = HeraldConfig::builder().from_env()?;
    if let Some(path) = heroes {
        builder = builder.heroes_path(path);
    }
    if let Some(path) = prompts {
        builder = builder.prompts_path(path);
    }
    let config = builder.build()?;

    let telegram = Arc::new(TelegramClient::new(TelegramConfig::from_env()?)?);
    let openai = OpenAIConfig::from_env()?.with_timeout(config.completion_timeout.as_secs());
    let provider = Arc::new(
        OpenAIProvider::with_config(openai).context("failed to create completion provider")?,
    );
    let completer = FallbackCompleter::new(provider, config.fallback_settings());

    let heroes = Arc::new(HeroCatalog::load_or_empty(&config.heroes_path));
    let prompts = Arc::new(PromptCatalog::load_or_empty(&config.prompts_path));
    let dispatcher = Dispatcher::new(Arc::new(default_menu_table()?), heroes);
    let sessions = SessionManager::new()
        .with_ttl(config.session_ttl_secs)
        .with_history_limit(config.search_history_limit);

    let bot = Arc::new(
        HeroBot::new(telegram.clone(), dispatcher, completer.clone())
            .with_sessions(sessions)
            .with_prompts(prompts.clone())
            .with_keywords(KeywordResponder::with_defaults()?),
    );

    if config.facts.destinations.is_empty() {
        info!("HERALD_FACT_CHATS not set, fact of the day disabled");
    } else {
        let facts = Broadcaster::new(
            telegram.clone(),
            config.facts.destinations.clone(),
            Arc::new(FactOfTheDay::new(prompts, completer)),
            config.facts.schedule,
        );
        tokio::spawn(async move { facts.run().await });
    }

    let sweeper = bot.clone();
    let sweep_every = Duration::from_secs(config.session_ttl_secs.unsigned_abs());
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(sweep_every);
        loop {
            ticker.tick().await;
            let removed = sweeper.sessions().cleanup_expired();
            if removed > 0 {
                info!(removed, "Expired sessions removed");
            }
        }
    });

    let poller = TelegramPoller::new(telegram, bot);
    info!("Herald is running, press Ctrl-C to stop");
    tokio::select! {
        () = poller.run() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for Ctrl-C")?;
            info!("Shutting down");
        }
    }
    Ok(())
}

async fn broadcast() -> anyhow::Result<()> {
    let config = HeraldConfig::from_env()?;
    if config.broadcast.destinations.is_empty() {
        bail!("HERALD_BROADCAST_CHATS is not set");
    }

    let telegram = Arc::new(TelegramClient::new(TelegramConfig::from_env()?)?);
    let broadcaster = Broadcaster::new(
        telegram,
        config.broadcast.destinations.clone(),
        Arc::new(StaticMessage::new(config.broadcast_message.clone())),
        config.broadcast.schedule,
    );

    tokio::select! {
        () = broadcaster.run() => {}
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for Ctrl-C")?;
            info!("Shutting down");
        }
    }
    Ok(())
}
