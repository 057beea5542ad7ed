//! netinv - Entry Point
//!
//! Serves the topology inventory dashboard and its JSON API.

use netinv::{Config, DashboardServer};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment
    dotenvy::dotenv().ok();

    // Parse args
    let args: Vec<String> = std::env::args().collect();
    let json_logs = args.iter().any(|a| a == "--json-logs");
    let help_mode = args.iter().any(|a| a == "--help" || a == "-h");

    if help_mode {
        println!("netinv v{}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Usage: netinv [OPTIONS]");
        println!();
        println!("Options:");
        println!("  --json-logs   Emit logs as JSON");
        println!("  --help, -h    Show this help");
        println!();
        println!("Environment variables:");
        println!("  DATA_FILE              Topology file (default: devices.txt)");
        println!("  SECRET_KEY             Session signing secret");
        println!("  NETINV_BIND_ADDR       Bind address (default: 0.0.0.0)");
        println!("  NETINV_PORT            Port (default: 5000)");
        println!("  NETINV_LOG_REQUESTS    Log every request (default: true)");
        println!("  NETINV_SECURE_COOKIES  Mark session cookie Secure (default: false)");
        return Ok(());
    }

    let log_level = std::env::var("RUST_LOG")
        .map(|s| match s.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        })
        .unwrap_or(Level::INFO);

    if json_logs {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_ansi(false)
            .json()
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    } else {
        let subscriber = FmtSubscriber::builder()
            .with_max_level(log_level)
            .with_ansi(true)
            .finish();
        tracing::subscriber::set_global_default(subscriber)?;
    }

    info!("netinv v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env()?;
    DashboardServer::new(config).run().await?;

    Ok(())
}
