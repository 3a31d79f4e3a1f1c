use clap::Parser;
use fortytwo_monitor::api::{Cli, CliHandler, Commands};
use fortytwo_monitor::config::AppConfig;
use fortytwo_monitor::logging::{init_logging, ErrorLogger, LogContext};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Needs neither a valid configuration nor the network
    if cli.command == Commands::GenerateConfig {
        match AppConfig::generate_sample_config() {
            Ok(sample) => println!("{}", sample),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    let result = match CliHandler::from_config(&config) {
        Ok(mut handler) => handler.execute_command(&cli.command).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(output) => println!("{}", output),
        Err(e) => {
            ErrorLogger::log_error(&e, Some(LogContext::new("cli", "execute_command")));
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
