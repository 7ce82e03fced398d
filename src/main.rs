use anyhow::Context as _;
use chrono::Utc;
use clap::{Parser, Subcommand};
use mochi_bot::AppState;
use mochi_bot::config::Config;
use mochi_bot::constants::DEFAULT_DATABASE_URL;
use mochi_bot::database::{self, maintenance};
use mochi_bot::handler::Handler;
use mochi_bot::services::prices::PriceClient;
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mochi_bot", about = "Mochi Discord gamification bot")]
struct Cli {
    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand)]
enum Cmd {
    /// Connect to Discord and run the bot (default).
    Run,
    /// Offline database maintenance.
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum DbAction {
    /// List every table's columns and row count.
    Verify,
    /// Dump the player tables to a JSON file.
    Backup { path: Option<PathBuf> },
    /// Create missing tables and add late columns.
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing `.env` is fine; the variables may come from the environment.
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,mochi_bot=debug")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command.unwrap_or(Cmd::Run) {
        Cmd::Run => run_bot().await,
        Cmd::Db { action } => run_db(action).await,
    }
}

async fn run_bot() -> anyhow::Result<()> {
    let config = Config::from_env().context("loading configuration")?;
    let pool = database::connect(&config.database_url, 5)
        .await
        .with_context(|| format!("opening database {}", config.database_url))?;
    database::create_schema(&pool).await?;
    let prices = PriceClient::new()?;

    let token = config.token.clone();
    let state = Arc::new(AppState::new(pool, config, prices));

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MEMBERS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::GUILD_MESSAGE_REACTIONS
        | GatewayIntents::GUILD_VOICE_STATES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::DIRECT_MESSAGE_REACTIONS
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&token, intents)
        .event_handler(Handler)
        .await
        .context("creating the Discord client")?;
    {
        let mut data = client.data.write().await;
        data.insert::<AppState>(state);
    }

    info!(target: "main", "starting gateway connection");
    if let Err(why) = client.start().await {
        error!(target: "main", error = %why, "client stopped");
        return Err(why.into());
    }
    Ok(())
}

async fn run_db(action: DbAction) -> anyhow::Result<()> {
    let url = std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
    let pool = database::connect(&url, 1)
        .await
        .with_context(|| format!("opening database {url}"))?;
    match action {
        DbAction::Verify => {
            for report in maintenance::verify(&pool).await? {
                if report.columns.is_empty() {
                    println!("✗ {}: missing", report.table);
                } else {
                    println!(
                        "✓ {} ({} rows): {}",
                        report.table,
                        report.rows,
                        report.columns.join(", ")
                    );
                }
            }
        }
        DbAction::Backup { path } => {
            let path = path.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "mochi_backup_{}.json",
                    Utc::now().format("%Y%m%d_%H%M%S")
                ))
            });
            let dump = maintenance::backup(&pool).await?;
            std::fs::write(&path, serde_json::to_string_pretty(&dump)?)
                .with_context(|| format!("writing {}", path.display()))?;
            println!("Backup written to {}", path.display());
        }
        DbAction::Migrate => {
            database::create_schema(&pool).await?;
            println!("Schema is up to date.");
        }
    }
    Ok(())
}
