//! CLI entry point for the labdeck dashboard backend.

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use labdeck_core::Settings;
use labdeck_scan::{run_discovery, DiscoveryEngine, NmapScanner};

use labdeck_api::state;

#[derive(Parser)]
#[command(name = "labdeck-api")]
#[command(about = "Homelab network dashboard backend")]
struct Cli {
    /// Bind address override (default from settings: 0.0.0.0:8700).
    #[arg(short, long)]
    bind: Option<String>,

    /// Run a single discovery sweep, print the hosts as JSON, and exit.
    #[arg(long)]
    once: bool,

    /// Subnet or target expression to sweep in --once mode.
    #[arg(short, long)]
    subnet: Option<String>,

    /// Ports probed per host in --once mode.
    #[arg(long, default_value_t = 100)]
    top_ports: u16,

    /// Config file prefix (default: labdeck).
    #[arg(short, long, default_value = "labdeck")]
    config: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).json().init();

    let cli = Cli::parse();
    let mut settings = Settings::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        settings.bind = bind;
    }

    if cli.once {
        let subnet = cli
            .subnet
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("--subnet is required in --once mode"))?;

        let engine = DiscoveryEngine::new(NmapScanner::new(&settings.nmap_path));
        let cache = state::discovery_cache(&settings);
        let hosts = run_discovery(&engine, &cache, subnet, cli.top_ports).await?;
        println!("{}", serde_json::to_string_pretty(&hosts)?);
        return Ok(());
    }

    labdeck_api::serve(settings).await
}
