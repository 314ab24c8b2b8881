use clap::{Parser, Subcommand};
use std::sync::Arc;

use drivewise_core::{AppConfig, ConfigLoader};
use drivewise_engine::ComplianceEngine;

#[derive(Parser)]
#[command(name = "drivewise")]
#[command(about = "Traffic-sign compliance scoring and leaderboard engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web API server
    Server {
        /// Server address, overriding the configured host and port
        #[arg(short, long)]
        addr: Option<String>,
        /// Configuration profile (loads config/Config.<profile>.toml)
        #[arg(short, long)]
        profile: Option<String>,
    },
    /// Recompute leaderboard rankings once and print the table
    Rank {
        /// Configuration profile (loads config/Config.<profile>.toml)
        #[arg(short, long)]
        profile: Option<String>,
        /// Number of entries to print
        #[arg(short, long, default_value_t = 10)]
        limit: i64,
    },
    /// Push vehicles and compliance records to the blockchain
    SyncBlockchain {
        /// Also update leaderboard rankings on the blockchain
        #[arg(long)]
        update_leaderboard: bool,
        /// Configuration profile (loads config/Config.<profile>.toml)
        #[arg(short, long)]
        profile: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    match cli.command {
        Commands::Server { addr, profile } => {
            run_server(addr.as_deref(), profile.as_deref()).await?;
        }
        Commands::Rank { profile, limit } => {
            run_rank(profile.as_deref(), limit).await?;
        }
        Commands::SyncBlockchain {
            update_leaderboard,
            profile,
        } => {
            run_sync_blockchain(update_leaderboard, profile.as_deref()).await?;
        }
    }

    Ok(())
}

fn load_config(profile: Option<&str>) -> anyhow::Result<AppConfig> {
    match profile {
        Some(profile) => ConfigLoader::load_with_profile(profile),
        None => ConfigLoader::load(),
    }
}

async fn build_engine(config: &AppConfig) -> anyhow::Result<ComplianceEngine> {
    let pool = drivewise_data::connect(&config.database).await?;
    drivewise_data::ensure_schema(&pool).await?;
    tracing::info!(url = %config.database.url, "database ready");

    let repos = drivewise_data::Repositories::new(pool);
    let blockchain = drivewise_blockchain::from_config(&config.blockchain);
    Ok(ComplianceEngine::new(
        repos,
        blockchain,
        config.scoring.token_policy(),
    ))
}

async fn run_server(addr: Option<&str>, profile: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(profile)?;
    let addr = addr.map_or_else(
        || format!("{}:{}", config.server.host, config.server.port),
        ToString::to_string,
    );

    let engine = Arc::new(build_engine(&config).await?);
    let server = drivewise_web_api::ApiServer::new(engine);
    server.serve(&addr).await
}

async fn run_rank(profile: Option<&str>, limit: i64) -> anyhow::Result<()> {
    let config = load_config(profile)?;
    let engine = build_engine(&config).await?;
    let view = engine.leaderboard(limit).await?;

    println!(
        "{} qualified vehicle(s), showing {}",
        view.total_qualified_vehicles,
        view.leaderboard.len()
    );
    println!(
        "{:<5} {:<15} {:<18} {:>6} {:>11} {:>8} {:>8}",
        "Rank", "Vehicle", "Owner", "Trips", "Violations", "Rate", "Tokens"
    );
    for entry in &view.leaderboard {
        println!(
            "{:<5} {:<15} {:<18} {:>6} {:>11} {:>7}% {:>8}",
            entry.rank,
            entry.vehicle_id,
            entry.owner_name,
            entry.total_trips,
            entry.total_violations,
            entry.compliance_rate,
            entry.total_tokens_earned,
        );
    }

    Ok(())
}

async fn run_sync_blockchain(update_leaderboard: bool, profile: Option<&str>) -> anyhow::Result<()> {
    let config = load_config(profile)?;
    let engine = build_engine(&config).await?;

    let summary = engine.sync_all_to_blockchain().await?;
    println!(
        "Synced {} vehicle(s) and {} record(s) to blockchain",
        summary.vehicles_synced, summary.records_synced
    );

    if update_leaderboard {
        engine.update_blockchain_leaderboard().await?;
        println!("Blockchain leaderboard updated");
    }

    Ok(())
}
