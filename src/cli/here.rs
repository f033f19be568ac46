//! Here command handler
//!
//! Resolves the current location the same way the picker's
//! "use current location" button does.

use crate::cli::print_result;
use crate::config::Config;
use crate::constants::messages;
use crate::error::Result;
use crate::geo::{get_device_locator, get_geocoder, LocationPicker};
use clap::Args;
use std::sync::Arc;

/// Here command arguments
#[derive(Args)]
pub struct HereArgs {
    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Run the here command
pub async fn run(args: HereArgs) -> Result<()> {
    let config = Config::load()?;
    let geocoder = Arc::new(get_geocoder(&config)?);
    let picker = LocationPicker::new(
        geocoder,
        get_device_locator()?,
        config.picker_settings(),
        |_| {},
    );

    match picker.use_current_location().await {
        Some(result) => print_result(&result, args.json),
        None => {
            let error = picker
                .state()
                .error
                .unwrap_or_else(|| messages::CURRENT_LOCATION_FAILED.to_string());
            eprintln!("{}", error);
            std::process::exit(1);
        }
    }
}
