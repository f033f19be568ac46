//! Geocode command handler
//!
//! Resolves an address, or a typed "lat, lng" pair, to a location.

use crate::cli::print_result;
use crate::config::Config;
use crate::constants::messages;
use crate::error::Result;
use crate::geo::get_geocoder;
use clap::Args;

/// Geocode command arguments
#[derive(Args)]
pub struct GeocodeArgs {
    /// Address or "lat, lng" (words are joined with spaces)
    #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
    pub address: Vec<String>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl GeocodeArgs {
    /// The full query text
    pub fn query(&self) -> String {
        self.address.join(" ")
    }
}

/// Run the geocode command
pub async fn run(args: GeocodeArgs) -> Result<()> {
    let config = Config::load()?;
    let geocoder = get_geocoder(&config)?;
    let query = args.query();

    match geocoder.geocode_address(&query).await {
        Some(result) => print_result(&result, args.json),
        None => {
            eprintln!("{}", messages::LOCATION_NOT_FOUND);
            std::process::exit(1);
        }
    }
}
