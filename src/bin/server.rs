use clap::Parser;
use fortytwo_monitor::api::{ApiServer, AppState};
use fortytwo_monitor::config::AppConfig;
use fortytwo_monitor::logging::{init_logging, ErrorLogger, LogContext};

#[derive(Parser)]
#[command(name = "fortytwo-monitor-server")]
#[command(about = "HTTP API for FortyTwo balance and activity checks")]
#[command(version)]
struct Args {
    /// Server port, overriding the configuration
    #[arg(long)]
    port: Option<u16>,

    /// Bind address, overriding the configuration
    #[arg(long)]
    host: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = AppConfig::load()?;
    init_logging(&config.logging)?;

    let state = AppState::from_config(&config).map_err(|e| {
        ErrorLogger::log_error(&e, Some(LogContext::new("server", "startup")));
        e
    })?;

    let host = args.host.unwrap_or_else(|| config.api.host.clone());
    let port = args.port.unwrap_or(config.api.port);
    let server = ApiServer::new(state, host, port);

    if let Err(e) = server.start().await {
        log::error!("Server failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}
