use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use risk_service::{RiskClient, RiskLevel, RiskRequest};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "risk_service")]
#[command(about = "Risk scoring service: risk = impact x probability")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Path to the config file (optional; defaults apply when missing)
        #[arg(short, long, default_value = "risk_service.toml")]
        config: PathBuf,
    },
    /// Initialize configuration file
    Init {
        /// Path to save the config file
        #[arg(short, long, default_value = "risk_service.toml")]
        config: PathBuf,
    },
    /// Compute a risk score locally without a running service
    Calculate {
        /// Asset identifier
        #[arg(short = 'a', long = "asset-id")]
        asset_id: String,
        /// Impact rating
        #[arg(short = 'i', long, allow_hyphen_values = true)]
        impact: i64,
        /// Probability rating
        #[arg(short = 'p', long, allow_hyphen_values = true)]
        probability: i64,
    },
    /// Call a running service
    Query {
        /// Base URL of the service
        #[arg(short = 'u', long = "url", default_value = "http://127.0.0.1:8080")]
        base_url: String,
        #[command(subcommand)]
        endpoint: Endpoint,
    },
}

#[derive(Subcommand)]
enum Endpoint {
    /// POST /api/risk/calculate/
    Calculate {
        #[arg(short = 'a', long = "asset-id")]
        asset_id: String,
        #[arg(short = 'i', long, allow_hyphen_values = true)]
        impact: i64,
        #[arg(short = 'p', long, allow_hyphen_values = true)]
        probability: i64,
    },
    /// GET /api/risk/overview/
    Overview,
    /// GET /api/risk/residual/
    Residual,
}

#[derive(Serialize)]
struct LocalCalculation {
    asset_id: String,
    risk: i64,
    level: RiskLevel,
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render JSON")?;
    println!("{rendered}");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { config } => {
            let config = risk_service::config::load_config(&config)?;
            risk_service::logging::init_logging(&config.logging);
            risk_service::server::serve(&config.server).await?;
        }

        Commands::Init { config } => {
            let default_config = risk_service::config::create_default_config();
            risk_service::config::save_config(&default_config, &config).with_context(|| {
                format!("Failed to write config file: {}", config.display())
            })?;
            println!("Configuration file created at: {}", config.display());
        }

        Commands::Calculate {
            asset_id,
            impact,
            probability,
        } => {
            let response = risk_service::risk::calculate(RiskRequest {
                asset_id,
                impact,
                probability,
            });
            print_json(&LocalCalculation {
                level: RiskLevel::from_score(response.risk),
                asset_id: response.asset_id,
                risk: response.risk,
            })?;
        }

        Commands::Query { base_url, endpoint } => {
            risk_service::logging::init_logging(&Default::default());
            let client = RiskClient::new(base_url)?;
            match endpoint {
                Endpoint::Calculate {
                    asset_id,
                    impact,
                    probability,
                } => {
                    let request = RiskRequest {
                        asset_id,
                        impact,
                        probability,
                    };
                    print_json(&client.calculate(&request).await?)?;
                }
                Endpoint::Overview => print_json(&client.overview().await?)?,
                Endpoint::Residual => print_json(&client.residual().await?)?,
            }
        }
    }

    Ok(())
}
