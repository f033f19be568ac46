//! Pick command handler
//!
//! Drives the location picker from stdin. Each line replaces the address
//! text, so piped input only looks up the last line typed within the
//! debounce window.

use crate::config::Config;
use crate::coord::format_coordinates;
use crate::error::Result;
use crate::geo::{
    get_device_locator, get_geocoder, GeocodeResult, GeocodingClient, IpLocator, LocationPicker,
    PickerState,
};
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tracing::warn;

/// Pick command arguments
#[derive(Args)]
pub struct PickArgs {
    /// Override the pause before a typed address is looked up
    #[arg(long)]
    pub debounce_ms: Option<u64>,
}

type Picker = LocationPicker<GeocodingClient, IpLocator>;

/// A line of picker input
#[derive(Debug, PartialEq)]
enum Input<'a> {
    Quit,
    Here,
    Coords(&'a str, &'a str),
    Usage,
    Text(&'a str),
}

fn parse_input(line: &str) -> Input<'_> {
    let trimmed = line.trim();
    match trimmed {
        ":quit" | ":q" => Input::Quit,
        ":here" => Input::Here,
        _ if trimmed.starts_with(":coords") => {
            let args: Vec<&str> = trimmed[":coords".len()..]
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .collect();
            match args.as_slice() {
                [lat, lng] => Input::Coords(lat, lng),
                _ => Input::Usage,
            }
        }
        _ => Input::Text(line),
    }
}

/// Run the pick command
pub async fn run(args: PickArgs) -> Result<()> {
    let config = Config::load()?;
    let mut settings = config.picker_settings();
    if let Some(ms) = args.debounce_ms {
        settings.debounce = Duration::from_millis(ms);
    }

    let geocoder = Arc::new(get_geocoder(&config)?);
    let on_select = |result: GeocodeResult| {
        println!(
            "Selected: {} ({})",
            result.address,
            format_coordinates(result.lat, result.lng)
        );
    };
    let picker = LocationPicker::new(geocoder, get_device_locator()?, settings, on_select);

    eprintln!("Type an address or \"lat, lng\". Commands: :here, :coords LAT LNG, :quit");

    let mut updates = picker.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<JoinHandle<()>> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if !handle_line(&picker, &line, &mut pending).await {
                    break;
                }
            }
            Ok(()) = updates.changed() => {
                report_error(&updates.borrow_and_update());
            }
        }
    }

    if let Some(handle) = pending.take() {
        if let Err(e) = handle.await {
            warn!(error = %e, "pending lookup did not finish");
        }
    }
    if updates.has_changed().unwrap_or(false) {
        report_error(&updates.borrow_and_update());
    }

    Ok(())
}

/// Apply one line of input. Returns false when the user asked to quit.
async fn handle_line(picker: &Picker, line: &str, pending: &mut Option<JoinHandle<()>>) -> bool {
    match parse_input(line) {
        Input::Quit => return false,
        Input::Here => {
            picker.use_current_location().await;
        }
        Input::Coords(lat, lng) => {
            if let Err(e) = picker.submit_coordinates(lat, lng) {
                warn!(error = %e, "rejected manual coordinates");
            }
        }
        Input::Usage => eprintln!("Usage: :coords LAT LNG"),
        Input::Text(text) => *pending = picker.handle_address_change(text),
    }
    true
}

fn report_error(state: &PickerState) {
    if let Some(error) = &state.error {
        eprintln!("{}", error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_input(":q"), Input::Quit);
        assert_eq!(parse_input("  :here "), Input::Here);
        assert_eq!(parse_input(":coords 51.5 -0.12"), Input::Coords("51.5", "-0.12"));
        assert_eq!(parse_input(":coords 51.5, -0.12"), Input::Coords("51.5", "-0.12"));
        assert_eq!(parse_input(":coords 51.5"), Input::Usage);
    }

    #[test]
    fn test_text_is_kept_verbatim() {
        assert_eq!(parse_input(" 10 Downing St "), Input::Text(" 10 Downing St "));
        assert_eq!(parse_input(""), Input::Text(""));
    }
}
