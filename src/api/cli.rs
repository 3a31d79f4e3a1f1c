use chrono::Utc;
use clap::{Parser, Subcommand};

use crate::api::report::ReportStyle;
use crate::config::AppConfig;
use crate::error::Result;
use crate::models::Address;
use crate::monitor::MonitorEngine;
use crate::store::WatchlistStore;

/// User id used when `--user` is not given
pub const DEFAULT_USER: &str = "local";

#[derive(Parser, Debug)]
#[command(name = "fortytwo-monitor")]
#[command(about = "Monad testnet balance and activity monitor for FortyTwo addresses")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Check every address on a watchlist
    Check {
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
    },
    /// Check a single address
    CheckAddress {
        address: String,
    },
    /// Add an address to a watchlist
    AddAddress {
        address: String,
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
    },
    /// Show a watchlist
    ListAddresses {
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
    },
    /// Forget all recorded balances
    ResetHistory,
    /// Print a sample configuration file
    GenerateConfig,
}

/// Runs CLI commands against the engine and watchlist, returning the rendered report
pub struct CliHandler {
    engine: MonitorEngine,
    watchlist: WatchlistStore,
    style: ReportStyle,
}

impl CliHandler {
    pub fn new(engine: MonitorEngine, watchlist: WatchlistStore, style: ReportStyle) -> Self {
        Self {
            engine,
            watchlist,
            style,
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let engine = MonitorEngine::from_config(config)?;
        let watchlist = WatchlistStore::load(&config.storage.watchlist_path, config.default_watchlist()?)?;
        Ok(Self::new(engine, watchlist, ReportStyle::from_config(config)))
    }

    pub async fn execute_command(&mut self, command: &Commands) -> Result<String> {
        match command {
            Commands::Check { user } => {
                let addresses = self.watchlist.addresses_for(user);
                let observations = self.engine.observe_all(&addresses).await?;
                Ok(self.style.observations(&observations, Utc::now()))
            }
            Commands::CheckAddress { address } => {
                let observation = self.engine.check_address(address).await?;
                Ok(self.style.observations(&[observation], Utc::now()))
            }
            Commands::AddAddress { address, user } => {
                let address = Address::parse(address)?;
                let outcome = self.watchlist.add_address(user, address.clone())?;
                Ok(self.style.add_outcome(&address, outcome))
            }
            Commands::ListAddresses { user } => Ok(self.style.watchlist(
                user,
                self.watchlist.list(user),
                self.watchlist.defaults(),
            )),
            Commands::ResetHistory => {
                self.engine.reset_history()?;
                Ok("Balance history cleared".to_string())
            }
            Commands::GenerateConfig => Ok(AppConfig::generate_sample_config()?),
        }
    }
}
