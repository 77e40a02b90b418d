mod catalog;
mod export;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use storefeed_store::{CatalogStore, UploadHistory};
use tracing_subscriber::EnvFilter;

use crate::export::ExportCommands;

#[derive(Debug, Parser)]
#[command(name = "storefeed-cli")]
#[command(about = "Catalog sync, query, and export tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one supplier sync cycle and print the report
    Sync,
    /// Search the catalog
    Search {
        /// Substring of title, description, brand, or category
        #[arg(long)]
        text: Option<String>,

        /// Substring of category
        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        min_price: Option<Decimal>,

        #[arg(long)]
        max_price: Option<Decimal>,

        /// Print full records as JSON instead of a summary table
        #[arg(long)]
        json: bool,
    },
    /// Replace the catalog with a CSV file
    Import {
        file: PathBuf,

        /// Name recorded in the upload history
        #[arg(long, default_value = "cli")]
        user: String,
    },
    /// Render a downstream feed
    Export {
        #[command(subcommand)]
        command: ExportCommands,
    },
    /// Print low-stock and top-rated products
    Insights {
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = storefeed_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let store = CatalogStore::new(&config.catalog_path, config.normalization.clone());

    match cli.command {
        Commands::Sync => catalog::run_sync(&config, store).await,
        Commands::Search {
            text,
            category,
            min_price,
            max_price,
            json,
        } => {
            let filter = storefeed_store::SearchFilter {
                text,
                category,
                min_price,
                max_price,
            };
            catalog::run_search(&store, &filter, json).await
        }
        Commands::Import { file, user } => {
            let uploads = UploadHistory::new(&config.upload_history_path);
            catalog::run_import(&store, &uploads, &file, &user).await
        }
        Commands::Export { command } => export::run_export(&config, &store, command).await,
        Commands::Insights { json } => catalog::run_insights(&store, json).await,
    }
}
