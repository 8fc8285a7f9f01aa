use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use contest_tracker::{
    config::ContestConfig,
    pipeline::Pipeline,
    sink::{FileSink, HttpSink},
    yahoo::YahooClient,
};
use log::info;
use serde_json::Value;
use std::env;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "contest-tracker")]
#[command(about = "Publishes contest portfolio returns for the dashboard")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the portfolios document and upload it to the storage gateway
    Publish {
        /// Storage gateway base URL (falls back to STORAGE_ENDPOINT)
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Build the portfolios document and write it under a local directory
    Export {
        /// Directory that stands in for the storage bucket
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = ContestConfig::b3_2025();
    let provider = YahooClient::new()?;

    match cli.command {
        Commands::Publish { endpoint } => {
            let endpoint = endpoint
                .or_else(|| env::var("STORAGE_ENDPOINT").ok())
                .ok_or_else(|| anyhow!("set STORAGE_ENDPOINT or pass --endpoint"))?;
            let pipeline = Pipeline::new(config, provider, HttpSink::new(endpoint)?);
            let response = pipeline.handle(Value::Null, Value::Null).await?;
            info!(
                "Invocation finished with status {}: {}",
                response.status_code, response.body
            );
        }
        Commands::Export { output } => {
            let root = output.unwrap_or_else(|| PathBuf::from("."));
            let pipeline = Pipeline::new(config, provider, FileSink::new(root));
            pipeline.publish().await?;
        }
    }

    Ok(())
}
