//! CLI command handlers
//!
//! Each subcommand has its own module with handler functions.

pub mod config;
pub mod geocode;
pub mod here;
pub mod pick;
pub mod reverse;
pub mod serve;

use crate::coord::format_coordinates;
use crate::geo::GeocodeResult;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Geocoding tools for volunteer event scheduling
#[derive(Parser)]
#[command(name = "volunteer-geo")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve an address (or "lat, lng") to coordinates
    Geocode(geocode::GeocodeArgs),

    /// Resolve coordinates to an address
    Reverse(reverse::ReverseArgs),

    /// Resolve this machine's current location
    Here(here::HereArgs),

    /// Interactive location picker reading from stdin
    Pick(pick::PickArgs),

    /// Start web server (foreground)
    Serve(serve::ServeArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

/// Run the CLI
pub async fn run() -> crate::error::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Geocode(args) => geocode::run(args).await,
        Commands::Reverse(args) => reverse::run(args).await,
        Commands::Here(args) => here::run(args).await,
        Commands::Pick(args) => pick::run(args).await,
        Commands::Serve(args) => serve::run(args).await,
        Commands::Config(args) => config::run(args),
    }
}

/// Initialize logging to stderr so stdout stays clean for results
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Print a resolved location as text or JSON
pub(crate) fn print_result(result: &GeocodeResult, json: bool) -> crate::error::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("{}", result.address);
        println!("{}", format_coordinates(result.lat, result.lng));
    }
    Ok(())
}
