use std::path::PathBuf;

use anyhow::Context;
use catalog_core::AppConfig;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "catalog-cli")]
#[command(about = "Product catalog administration")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,
    /// Upsert brands, categories, and price tables from the seed file
    Seed {
        /// Seed file to load (defaults to `CATALOG_SEED_PATH`)
        #[arg(long)]
        path: Option<PathBuf>,
        /// Validate the file and print what would be written
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(catalog_core::log_level_from_env()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Migrate => migrate().await,
        Commands::Seed { path, dry_run } => seed(path, dry_run).await,
    }
}

async fn connect(config: &AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = catalog_db::PoolConfig::from_app_config(config);
    catalog_db::connect_pool(&config.database_url, pool_config)
        .await
        .context("failed to connect to database")
}

async fn migrate() -> anyhow::Result<()> {
    let config = catalog_core::load_app_config()?;
    let pool = connect(&config).await?;
    let applied = catalog_db::run_migrations(&pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

/// A dry run only reads the seed file, so it never asks for `DATABASE_URL`.
async fn seed(path: Option<PathBuf>, dry_run: bool) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(catalog_core::seed_path_from_env);
    let seed = catalog_core::load_catalog_seed(&path)
        .with_context(|| format!("failed to load seed file {}", path.display()))?;
    tracing::debug!(path = %path.display(), "seed file loaded");

    let subcategories: usize = seed.categories.iter().map(|c| c.subcategories.len()).sum();
    if dry_run {
        println!(
            "dry run: {} brand(s), {} categor(ies) with {subcategories} subcategor(ies), {} price table(s)",
            seed.brands.len(),
            seed.categories.len(),
            seed.price_tables.len(),
        );
        return Ok(());
    }

    let config = catalog_core::load_app_config()?;
    let pool = connect(&config).await?;
    let report = catalog_db::seed_catalog(&pool, &seed).await?;
    println!(
        "seeded {} brand(s), {} categor(ies), {} subcategor(ies), {} price table(s)",
        report.brands, report.categories, report.subcategories, report.price_tables,
    );
    Ok(())
}
