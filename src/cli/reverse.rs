//! Reverse command handler

use crate::cli::print_result;
use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::Result;
use crate::geo::{get_geocoder, GeocodeResult};
use clap::Args;

/// Reverse command arguments
#[derive(Args)]
pub struct ReverseArgs {
    /// Latitude (-90 to 90)
    #[arg(allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude (-180 to 180)
    #[arg(allow_negative_numbers = true)]
    pub lng: f64,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the reverse command
pub async fn run(args: ReverseArgs) -> Result<()> {
    let coords = Coordinates::new(args.lat, args.lng);
    coords.validate()?;

    let config = Config::load()?;
    let geocoder = get_geocoder(&config)?;

    match geocoder.reverse_geocode(coords.lat, coords.lng).await {
        Some(address) => print_result(
            &GeocodeResult {
                lat: coords.lat,
                lng: coords.lng,
                address,
            },
            args.json,
        ),
        None => {
            eprintln!("No address found for {}", coords.label());
            std::process::exit(1);
        }
    }
}
