pub mod cli;
pub mod http;
pub mod report;

pub use cli::{Cli, CliHandler, Commands, DEFAULT_USER};
pub use http::{
    add_address, create_router, get_address, get_health, get_watchlist, get_watchlist_observations, reset_history,
    AddAddressRequest, AddAddressResponse, ApiError, ApiServer, AppState, ErrorResponse, HealthResponse,
    ResetResponse, WatchlistResponse,
};
pub use report::ReportStyle;
