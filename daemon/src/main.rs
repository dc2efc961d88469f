//! ripd daemon: entry point for running one router node.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use ripd_node::{init_logging, LogFormat, NodeConfig, RouterNode, SummaryStrategy};

#[derive(Parser)]
#[command(name = "ripd", about = "Distance-vector router node", version)]
struct Cli {
    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long, env = "RIPD_CONFIG")]
    config: Option<PathBuf>,

    /// This router's address as its neighbors know it (e.g. 127.0.0.1:5000).
    #[arg(long, env = "RIPD_ADDRESS")]
    address: Option<String>,

    /// Network administered by this router (e.g. 10.0.1.0/24).
    #[arg(long, env = "RIPD_NETWORK")]
    network: Option<String>,

    /// Port the HTTP server listens on.
    #[arg(short, long, env = "RIPD_PORT")]
    port: Option<u16>,

    /// CSV file listing neighbors and link costs.
    #[arg(short, long, env = "RIPD_NEIGHBORS_FILE")]
    file: Option<PathBuf>,

    /// Seconds between periodic advertisements.
    #[arg(long, env = "RIPD_INTERVAL")]
    interval: Option<u64>,

    /// Route summarization before advertising: "pairwise", "lcp" or "none".
    #[arg(long, env = "RIPD_SUMMARIZATION")]
    summarization: Option<SummaryStrategy>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "RIPD_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "RIPD_LOG_FORMAT")]
    log_format: Option<LogFormat>,
}

impl Cli {
    /// Overlay the flags that were given on top of `config`.
    fn apply(self, mut config: NodeConfig) -> NodeConfig {
        if let Some(address) = self.address {
            config.address = address;
        }
        if let Some(network) = self.network {
            config.network = network;
        }
        if let Some(port) = self.port {
            config.listen_port = port;
        }
        if let Some(file) = self.file {
            config.neighbors_file = Some(file);
        }
        if let Some(interval) = self.interval {
            config.update_interval_secs = interval;
        }
        if let Some(summarization) = self.summarization {
            config.summarization = summarization;
        }
        if let Some(level) = self.log_level {
            config.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.log_format = format;
        }
        if config.address.is_empty() {
            config.address = format!("127.0.0.1:{}", config.listen_port);
        }
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let base = match &cli.config {
        Some(path) => NodeConfig::from_toml_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => NodeConfig::default(),
    };
    let config = cli.apply(base);

    init_logging(config.log_format, &config.log_level)?;
    tracing::info!(
        address = %config.address,
        network = %config.network,
        port = config.listen_port,
        "starting ripd"
    );

    let node = RouterNode::new(config).context("invalid router configuration")?;
    node.start().await?;

    tracing::info!("ripd exited cleanly");
    Ok(())
}
