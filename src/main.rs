//! volunteer-geo CLI entry point
//!
//! Geocoding for volunteer events - CLI + web API

use volunteer_geo::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
