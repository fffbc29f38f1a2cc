use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use jobwatch_client::{SlackClient, SlackConfig, SourceRegistry};
use jobwatch_core::filters::parse_keywords;
use jobwatch_core::platform::Platform;
use jobwatch_core::poller::{self, PollingDriver, TracingPollReporter};
use jobwatch_core::schedule::PollerConfig;
use jobwatch_db::{Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "jobwatch", version, about = "Freelance job watcher: admin commands")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one polling cycle (or keep polling with --watch)
    Poll {
        /// Platform to poll ("guru" or "freelancer")
        #[arg(short, long)]
        platform: Platform,

        /// Keep polling on JOBWATCH_POLL_INTERVAL_SECS until Ctrl+C
        #[arg(long, default_value_t = false)]
        watch: bool,
    },

    /// Fetch the source's category list and reconcile it into the store
    RefreshCategories {
        #[arg(short, long)]
        platform: Platform,
    },

    /// List stored categories; selected ones are marked [x]
    Categories {
        #[arg(short, long)]
        platform: Platform,

        /// Print JSON instead of a table
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Select or unselect one category by its external key
    Toggle {
        #[arg(short, long)]
        platform: Platform,

        /// Source-side key (URL slug on Guru, numeric id on Freelancer)
        #[arg(short, long)]
        key: String,
    },

    /// Show keywords, or replace them with --set
    Keywords {
        #[arg(short, long)]
        platform: Platform,

        /// Comma-separated keywords; an empty string clears them
        #[arg(long)]
        set: Option<String>,
    },

    /// Inspect or move the last-delivered-job watermark
    Watermark {
        #[command(subcommand)]
        action: WatermarkAction,
    },
}

#[derive(Subcommand)]
enum WatermarkAction {
    Show {
        #[arg(short, long)]
        platform: Platform,
    },
    Set {
        #[arg(short, long)]
        platform: Platform,

        /// Job id the next cycle treats as already delivered
        job_id: String,
    },
    /// Forget the watermark: the next cycle delivers every visible job
    Clear {
        #[arg(short, long)]
        platform: Platform,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("jobwatch=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = connect_db().await?;

    match cli.command {
        Commands::Poll { platform, watch } => cmd_poll(&db, platform, watch).await?,
        Commands::RefreshCategories { platform } => {
            let registry = SourceRegistry::from_env(&[platform]).await?;
            let count =
                poller::refresh_categories(registry.get(platform)?, &db.filter_repo()).await?;
            println!("{platform}: {count} categories stored");
        }
        Commands::Categories { platform, json } => cmd_categories(&db, platform, json).await?,
        Commands::Toggle { platform, key } => {
            let category = db.filter_repo().flip_selection(platform, &key).await?;
            let state = if category.selected {
                "selected"
            } else {
                "unselected"
            };
            println!("{platform}: {} ({}) {state}", category.name, category.external_key);
        }
        Commands::Keywords { platform, set } => {
            let repo = db.filter_repo();
            if let Some(raw) = set {
                repo.set_keywords(platform, &parse_keywords(&raw)).await?;
            }
            let keywords = repo.list_keywords(platform).await?;
            if keywords.is_empty() {
                println!("{platform}: no keywords, every job in the selected categories is delivered");
            } else {
                let values: Vec<&str> = keywords.iter().map(|k| k.value.as_str()).collect();
                println!("{platform}: {}", values.join(", "));
            }
        }
        Commands::Watermark { action } => cmd_watermark(&db, action).await?,
    }

    Ok(())
}

/// Connect to PostgreSQL using DATABASE_URL and apply pending migrations.
async fn connect_db() -> Result<Database> {
    let config = DatabaseConfig::from_env()?;
    let db = Database::connect(&config)
        .await
        .context("Failed to connect to database")?;
    db.migrate().await?;
    Ok(db)
}

async fn cmd_poll(db: &Database, platform: Platform, watch: bool) -> Result<()> {
    let registry = SourceRegistry::from_env(&[platform]).await?;
    let slack = SlackClient::new(SlackConfig::from_env()?)?;
    let driver = PollingDriver::new(
        registry.get(platform)?.clone(),
        db.watermark_repo(),
        db.filter_repo(),
        slack,
        PollerConfig::from_env()?,
    );

    if watch {
        let cancel = CancellationToken::new();
        let on_signal = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Shutdown signal received");
                on_signal.cancel();
            }
        });
        driver.run(cancel, &TracingPollReporter).await?;
        return Ok(());
    }

    let report = driver.run_cycle(&TracingPollReporter).await?;
    if !report.ran {
        println!("{platform}: no category selected, nothing polled");
        return Ok(());
    }
    println!(
        "{platform}: {} visible, {} new, {} delivered, {} suppressed, watermark {}",
        report.visible,
        report.new,
        report.delivered,
        report.suppressed,
        report.watermark.as_deref().unwrap_or("-"),
    );
    Ok(())
}

async fn cmd_categories(db: &Database, platform: Platform, json: bool) -> Result<()> {
    let categories = db.filter_repo().list_categories(platform).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&categories)?);
        return Ok(());
    }

    if categories.is_empty() {
        println!("No categories stored for {platform}. Run `jobwatch refresh-categories -p {}` first.", platform.as_str());
        return Ok(());
    }

    println!("{platform} categories:\n");
    for category in &categories {
        let mark = if category.selected { "x" } else { " " };
        println!("  [{mark}] {} ({})", category.name, category.external_key);
    }
    println!(
        "\nSelected: {} of {}",
        categories.iter().filter(|c| c.selected).count(),
        categories.len()
    );
    Ok(())
}

async fn cmd_watermark(db: &Database, action: WatermarkAction) -> Result<()> {
    let repo = db.watermark_repo();
    match action {
        WatermarkAction::Show { platform } => match repo.get(platform).await? {
            Some(watermark) => println!(
                "{platform}: {} (updated {})",
                watermark.last_job_id,
                watermark.updated_at.format("%Y-%m-%d %H:%M:%S UTC")
            ),
            None => println!("{platform}: no watermark, the next cycle delivers every visible job"),
        },
        WatermarkAction::Set { platform, job_id } => {
            repo.advance(platform, &job_id).await?;
            println!("{platform}: watermark set to {job_id}");
        }
        WatermarkAction::Clear { platform } => {
            repo.clear(platform).await?;
            println!("{platform}: watermark cleared");
        }
    }
    Ok(())
}
