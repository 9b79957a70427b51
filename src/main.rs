//! Liquidation Stress Curve Runner
//!
//! Estimates expected daily liquidations as a function of price shock.
//! Features:
//! - Reads collected closing prices and liquidation events as JSON
//! - One-day and cumulative shock curves with bootstrap bands
//! - Effective sample size per shock, sparse shocks left empty
//! - Profile or TOML driven configuration

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use liqstress_core::{StressAnalysis, StressConfig, StressInput};

/// Environment variable names.
mod env {
    pub const STRESS_INPUT: &str = "STRESS_INPUT";
    pub const STRESS_OUTPUT: &str = "STRESS_OUTPUT";
    pub const STRESS_CONFIG: &str = "STRESS_CONFIG";
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing (stdout may carry the report, logs go to stderr)
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,liqstress_core=debug,liqstress_kernel=debug")
        }))
        .init();

    // STRESS_CONFIG (TOML file) wins over STRESS_PROFILE
    let analysis = StressAnalysis::new(load_config()?);
    analysis.config().log_config();

    let input_path = std::env::var(env::STRESS_INPUT)
        .map_err(|_| anyhow::anyhow!("Missing env var: {}", env::STRESS_INPUT))?;
    let input = load_input(&input_path)?;
    info!(
        prices = input.prices.len(),
        liquidations = input.liquidations.len(),
        chain = ?input.chain,
        asset = ?input.asset,
        "Input loaded"
    );

    let days = input.merged_days();
    info!(days = days.len(), "Daily observations prepared");

    let report = analysis
        .run_concurrent(&days)
        .await
        .context("Stress analysis failed")?;

    let json = serde_json::to_string_pretty(&report)?;
    match std::env::var(env::STRESS_OUTPUT) {
        Ok(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write report to {}", path))?;
            info!(path = %path, "Report written");
        }
        Err(_) => println!("{json}"),
    }

    Ok(())
}

fn load_config() -> Result<StressConfig> {
    match std::env::var(env::STRESS_CONFIG) {
        Ok(path) => StressConfig::from_file(&path),
        Err(_) => Ok(StressConfig::from_env()),
    }
}

fn load_input(path: impl AsRef<Path>) -> Result<StressInput> {
    let path = path.as_ref();
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read input {:?}", path))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse input {:?}", path))
}
