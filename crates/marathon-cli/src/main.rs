mod crawl;
mod notify;

use clap::{Parser, Subcommand};
use marathon_core::AppConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "marathon-cli")]
#[command(about = "Marathon schedule crawler and notifier")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Crawl the race schedule and store every normalized race
    Crawl {
        /// Print the records and notification batch instead of storing them
        #[arg(long)]
        dry_run: bool,
        /// Listing page to crawl (defaults to `MARATHON_LISTING_URL`)
        #[arg(long)]
        url: Option<String>,
    },
    /// Import recipients and send the stored open-registration race list
    Notify {
        /// Print the message instead of sending it
        #[arg(long)]
        dry_run: bool,
    },
    /// Crawl, store and announce the fresh batch once, as the weekly job does
    Run,
    /// Manage notification recipients
    Recipients {
        #[command(subcommand)]
        command: RecipientsCommands,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum RecipientsCommands {
    /// Import recipients from the configured Google Sheet
    Import,
    /// List stored recipients
    List,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Apply pending migrations
    Migrate,
    /// Check database connectivity
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = marathon_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("marathon-cli: run with --help to list commands");
        return Ok(());
    };

    match command {
        Commands::Crawl { dry_run: true, url } => {
            crawl::run_crawl_dry_run(&config, url.as_deref()).await?;
        }
        Commands::Crawl { url, .. } => {
            let pool = connect(&config).await?;
            crawl::run_crawl(&pool, &config, url.as_deref()).await?;
        }
        Commands::Notify { dry_run } => {
            let pool = connect(&config).await?;
            notify::run_notify(&pool, &config, dry_run).await?;
        }
        Commands::Run => {
            let pool = connect(&config).await?;
            let outcome = crawl::run_crawl(&pool, &config, None).await?;
            notify::run_notify_batch(&pool, &config, &outcome.batch).await?;
        }
        Commands::Recipients { command } => {
            let pool = connect(&config).await?;
            match command {
                RecipientsCommands::Import => notify::run_recipients_import(&pool, &config).await?,
                RecipientsCommands::List => notify::run_recipients_list(&pool).await?,
            }
        }
        Commands::Db { command } => {
            let pool = connect(&config).await?;
            match command {
                DbCommands::Migrate => {
                    let applied = marathon_db::run_migrations(&pool).await?;
                    println!("applied {applied} migration(s)");
                }
                DbCommands::Ping => {
                    marathon_db::ping(&pool).await?;
                    println!("database ok");
                }
            }
        }
    }

    Ok(())
}

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = marathon_db::PoolConfig::from_app_config(config);
    let pool = marathon_db::connect_pool(&config.database_url, pool_config).await?;
    Ok(pool)
}
