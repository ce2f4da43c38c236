#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use coursemap_ingest::ingest_bytes;
use coursemap_query::compute_stats;
use coursemap_store::CourseStore;
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "coursemap")]
#[command(about = "Coursemap catalog operations CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a spreadsheet or JSON dataset and replace the store's record
    /// set with it.
    Ingest {
        #[arg(long)]
        db: PathBuf,
        file: PathBuf,
    },
    /// Print record and program counts for a store file.
    Stats {
        #[arg(long)]
        db: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::Ingest { db, file } => {
            let bytes =
                fs::read(&file).map_err(|e| format!("cannot read {}: {e}", file.display()))?;
            let outcome = ingest_bytes(&bytes).map_err(|e| e.to_string())?;
            let store = CourseStore::open(&db).map_err(|e| e.to_string())?;
            let imported = store
                .replace_all(&outcome.records)
                .await
                .map_err(|e| e.to_string())?;
            let summary = json!({
                "imported": imported,
                "preview": outcome.preview(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).map_err(|e| e.to_string())?
            );
            Ok(())
        }
        Commands::Stats { db } => {
            let store = CourseStore::open(&db).map_err(|e| e.to_string())?;
            let conn = store.connection().await;
            let stats = compute_stats(&conn).map_err(|e| e.to_string())?;
            println!(
                "{}",
                serde_json::to_string_pretty(&stats).map_err(|e| e.to_string())?
            );
            Ok(())
        }
    }
}
