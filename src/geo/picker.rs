//! Interactive location picker
//!
//! Binds free-text address entry, manual coordinate entry and "use my
//! current location" to the geocoding backend. Typed text is debounced: a
//! lookup only fires once the text has stayed unchanged for the debounce
//! window, so a burst of keystrokes costs one provider request.

use crate::config::defaults::{
    DEFAULT_DEBOUNCE_MS, DEFAULT_HIGH_ACCURACY, DEFAULT_LOCATION_TIMEOUT_MS,
};
use crate::constants::messages;
use crate::coord::{parse_coordinate_pair, Coordinates};
use crate::error::{Error, Result};
use crate::geo::device::{DeviceLocator, LocationError, PositionOptions};
use crate::geo::{GeoBackend, GeocodeResult};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Runtime settings for [`LocationPicker`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickerSettings {
    /// How long typed text must stay unchanged before it is looked up
    pub debounce: Duration,
    /// Timeout for the device position request
    pub location_timeout: Duration,
    pub high_accuracy: bool,
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            location_timeout: Duration::from_millis(DEFAULT_LOCATION_TIMEOUT_MS),
            high_accuracy: DEFAULT_HIGH_ACCURACY,
        }
    }
}

/// What the picker currently shows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PickerState {
    /// Text in the address field
    pub address: String,
    /// Last resolved position
    pub coordinates: Option<Coordinates>,
    pub is_loading: bool,
    /// User-facing error message
    pub error: Option<String>,
}

type SelectCallback = Box<dyn Fn(GeocodeResult) + Send + Sync>;

struct Inner<G, D> {
    backend: Arc<G>,
    device: D,
    settings: PickerSettings,
    state: watch::Sender<PickerState>,
    /// Bumped on every keystroke; a pending lookup only runs if it still
    /// holds the latest revision when its debounce window ends
    revision: AtomicU64,
    on_select: SelectCallback,
}

/// Location picker bound to a geocoding backend and a device locator
pub struct LocationPicker<G, D> {
    inner: Arc<Inner<G, D>>,
}

impl<G, D> Clone for LocationPicker<G, D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G, D> LocationPicker<G, D>
where
    G: GeoBackend + 'static,
    D: DeviceLocator + 'static,
{
    /// Create a picker. `on_select` runs once for every successful resolution.
    pub fn new<F>(backend: Arc<G>, device: D, settings: PickerSettings, on_select: F) -> Self
    where
        F: Fn(GeocodeResult) + Send + Sync + 'static,
    {
        let (state, _) = watch::channel(PickerState::default());
        Self {
            inner: Arc::new(Inner {
                backend,
                device,
                settings,
                state,
                revision: AtomicU64::new(0),
                on_select: Box::new(on_select),
            }),
        }
    }

    /// Pre-fill the picker, e.g. when editing an existing position
    pub fn with_initial(
        self,
        address: impl Into<String>,
        coordinates: Option<Coordinates>,
    ) -> Self {
        let address = address.into();
        self.inner.state.send_modify(|state| {
            state.address = address;
            state.coordinates = coordinates;
        });
        self
    }

    /// Snapshot of the current state
    pub fn state(&self) -> PickerState {
        self.inner.state.borrow().clone()
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<PickerState> {
        self.inner.state.subscribe()
    }

    /// Handle a change of the address text.
    ///
    /// The text is stored right away. A valid "lat, lng" pair resolves
    /// immediately without a lookup; blank text clears the position.
    /// Anything else schedules a debounced lookup, whose handle is returned.
    pub fn handle_address_change(&self, text: impl Into<String>) -> Option<JoinHandle<()>> {
        let text = text.into();
        let revision = self.inner.revision.fetch_add(1, Ordering::SeqCst) + 1;

        self.inner.state.send_modify(|state| {
            state.address = text.clone();
            state.error = None;
        });

        if let Some(coords) = parse_coordinate_pair(&text).filter(Coordinates::is_valid) {
            self.inner.resolve(
                GeocodeResult {
                    lat: coords.lat,
                    lng: coords.lng,
                    address: coords.label(),
                },
                false,
            );
            return None;
        }

        if text.trim().is_empty() {
            self.inner.state.send_modify(|state| state.coordinates = None);
            return None;
        }

        let inner = Arc::clone(&self.inner);
        Some(tokio::spawn(async move {
            inner.lookup_after_pause(revision, text).await;
        }))
    }

    /// Resolve the device's current position and label it.
    ///
    /// Device failures leave a message in the state and return `None`.
    pub async fn use_current_location(&self) -> Option<GeocodeResult> {
        let inner = &self.inner;
        inner.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });

        let options = PositionOptions {
            high_accuracy: inner.settings.high_accuracy,
            timeout: inner.settings.location_timeout,
            maximum_age: Duration::ZERO,
        };

        let position = tokio::time::timeout(options.timeout, inner.device.current_position(options))
            .await
            .unwrap_or(Err(LocationError::Timeout));

        let position = match position {
            Ok(position) => position,
            Err(e) => {
                inner.location_failed(&e);
                return None;
            }
        };

        let coords = Coordinates::new(position.latitude, position.longitude);
        if !coords.is_valid() {
            warn!(lat = coords.lat, lng = coords.lng, "device reported invalid position");
            inner.fail(messages::CURRENT_LOCATION_FAILED);
            return None;
        }

        let address = inner
            .backend
            .reverse_geocode(coords.lat, coords.lng)
            .await
            .unwrap_or_else(|| coords.label());

        let result = GeocodeResult {
            lat: coords.lat,
            lng: coords.lng,
            address,
        };
        inner.resolve(result.clone(), true);
        Some(result)
    }

    /// Accept manually entered latitude/longitude fields
    pub fn submit_coordinates(&self, lat: &str, lng: &str) -> Result<GeocodeResult> {
        let coords = lat
            .trim()
            .parse::<f64>()
            .ok()
            .zip(lng.trim().parse::<f64>().ok())
            .map(|(lat, lng)| Coordinates::new(lat, lng))
            .filter(Coordinates::is_valid);

        let Some(coords) = coords else {
            self.inner.fail(messages::INVALID_COORDINATES);
            return Err(Error::InvalidCoordinates(format!("{}, {}", lat, lng)));
        };

        let result = GeocodeResult {
            lat: coords.lat,
            lng: coords.lng,
            address: coords.label(),
        };
        self.inner.resolve(result.clone(), true);
        Ok(result)
    }
}

impl<G: GeoBackend, D> Inner<G, D> {
    async fn lookup_after_pause(&self, revision: u64, text: String) {
        tokio::time::sleep(self.settings.debounce).await;

        if self.revision.load(Ordering::SeqCst) != revision {
            debug!(text = %text, "text changed during debounce, skipping lookup");
            return;
        }

        self.state.send_modify(|state| state.is_loading = true);

        match self.backend.geocode_address(&text).await {
            Some(result) => self.resolve(result, true),
            None => {
                self.state.send_modify(|state| state.coordinates = None);
                self.fail(messages::LOCATION_NOT_FOUND);
            }
        }
    }

    /// Record a resolved location and notify the consumer
    fn resolve(&self, result: GeocodeResult, replace_address: bool) {
        self.state.send_modify(|state| {
            if replace_address {
                state.address = result.address.clone();
            }
            state.coordinates = Some(Coordinates::new(result.lat, result.lng));
            state.is_loading = false;
            state.error = None;
        });
        (self.on_select)(result);
    }

    fn fail(&self, message: &str) {
        self.state.send_modify(|state| {
            state.is_loading = false;
            state.error = Some(message.to_string());
        });
    }

    fn location_failed(&self, err: &LocationError) {
        warn!(error = %err, "current location unavailable");
        let message = match err {
            LocationError::Unsupported => messages::GEOLOCATION_UNSUPPORTED,
            e if e.is_device_error() => messages::DEVICE_LOCATION_FAILED,
            _ => messages::CURRENT_LOCATION_FAILED,
        };
        self.fail(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::client::{GeocoderSettings, GeocodingClient};
    use crate::geo::device::DevicePosition;
    use crate::geo::http::tests::{MockFetcher, MockReply};
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        forward: Option<GeocodeResult>,
        reverse: Option<String>,
        queries: Mutex<Vec<String>>,
        reverse_calls: Mutex<Vec<(f64, f64)>>,
    }

    impl GeoBackend for FakeBackend {
        async fn geocode_address(&self, address: &str) -> Option<GeocodeResult> {
            self.queries.lock().unwrap().push(address.to_string());
            self.forward.clone()
        }

        async fn reverse_geocode(&self, lat: f64, lng: f64) -> Option<String> {
            self.reverse_calls.lock().unwrap().push((lat, lng));
            self.reverse.clone()
        }
    }

    enum FakeDevice {
        At(f64, f64),
        Fails(LocationError),
        Hangs,
    }

    impl DeviceLocator for FakeDevice {
        async fn current_position(
            &self,
            _options: PositionOptions,
        ) -> std::result::Result<DevicePosition, LocationError> {
            match self {
                FakeDevice::At(latitude, longitude) => Ok(DevicePosition {
                    latitude: *latitude,
                    longitude: *longitude,
                }),
                FakeDevice::Fails(e) => Err(e.clone()),
                FakeDevice::Hangs => std::future::pending().await,
            }
        }
    }

    type Selections = Arc<Mutex<Vec<GeocodeResult>>>;

    fn picker<G: GeoBackend + 'static>(
        backend: Arc<G>,
        device: FakeDevice,
    ) -> (LocationPicker<G, FakeDevice>, Selections) {
        let selected: Selections = Arc::new(Mutex::new(Vec::new()));
        let sink = selected.clone();
        let picker = LocationPicker::new(backend, device, PickerSettings::default(), move |r| {
            sink.lock().unwrap().push(r)
        });
        (picker, selected)
    }

    fn paris() -> GeocodeResult {
        GeocodeResult {
            lat: 48.8566,
            lng: 2.3522,
            address: "Paris, Île-de-France, France".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_triggers_one_lookup() {
        let backend = Arc::new(FakeBackend {
            forward: Some(paris()),
            ..Default::default()
        });
        let (picker, selected) = picker(backend.clone(), FakeDevice::Hangs);

        let first = picker.handle_address_change("Pa").unwrap();
        assert_eq!(picker.state().address, "Pa");
        tokio::time::advance(Duration::from_millis(200)).await;
        let second = picker.handle_address_change("Par").unwrap();
        tokio::time::advance(Duration::from_millis(200)).await;
        let last = picker.handle_address_change("Paris").unwrap();

        first.await.unwrap();
        second.await.unwrap();
        last.await.unwrap();

        assert_eq!(*backend.queries.lock().unwrap(), vec!["Paris".to_string()]);
        assert_eq!(*selected.lock().unwrap(), vec![paris()]);

        let state = picker.state();
        assert_eq!(state.address, paris().address);
        assert_eq!(state.coordinates, Some(Coordinates::new(48.8566, 2.3522)));
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_waits_for_debounce_window() {
        let backend = Arc::new(FakeBackend {
            forward: Some(paris()),
            ..Default::default()
        });
        let (picker, _) = picker(backend.clone(), FakeDevice::Hangs);

        let handle = picker.handle_address_change("Paris").unwrap();
        tokio::time::advance(Duration::from_millis(499)).await;
        tokio::task::yield_now().await;
        assert!(backend.queries.lock().unwrap().is_empty());

        handle.await.unwrap();
        assert_eq!(backend.queries.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_sets_error() {
        let backend = Arc::new(FakeBackend::default());
        let (picker, selected) = picker(backend, FakeDevice::Hangs);

        picker.handle_address_change("Atlantis").unwrap().await.unwrap();

        let state = picker.state();
        assert_eq!(state.error.as_deref(), Some(messages::LOCATION_NOT_FOUND));
        assert!(state.coordinates.is_none());
        assert!(!state.is_loading);
        assert!(selected.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_coordinate_text_resolves_immediately() {
        let backend = Arc::new(FakeBackend::default());
        let (picker, selected) = picker(backend.clone(), FakeDevice::Hangs);

        assert!(picker.handle_address_change("37.7749,-122.4194").is_none());

        let selected = selected.lock().unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].address, "37.7749, -122.4194");
        assert_eq!(picker.state().address, "37.7749,-122.4194");
        assert!(backend.queries.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_text_clears_position() {
        let backend = Arc::new(FakeBackend::default());
        let (picker, selected) = picker(backend.clone(), FakeDevice::Hangs);
        let picker = picker.with_initial("Old place", Some(Coordinates::new(1.0, 2.0)));

        assert!(picker.handle_address_change("   ").is_none());
        assert!(picker.state().coordinates.is_none());
        assert!(selected.lock().unwrap().is_empty());
        assert!(backend.queries.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_location_is_reverse_geocoded() {
        let backend = Arc::new(FakeBackend {
            reverse: Some("Ferry Building, San Francisco".to_string()),
            ..Default::default()
        });
        let (picker, selected) = picker(backend.clone(), FakeDevice::At(37.7955, -122.3937));

        let result = picker.use_current_location().await.unwrap();
        assert_eq!(result.address, "Ferry Building, San Francisco");
        assert_eq!(*backend.reverse_calls.lock().unwrap(), vec![(37.7955, -122.3937)]);
        assert_eq!(*selected.lock().unwrap(), vec![result]);
        assert_eq!(picker.state().address, "Ferry Building, San Francisco");
        assert!(!picker.state().is_loading);
    }

    #[tokio::test(start_paused = true)]
    async fn test_current_location_without_label() {
        let backend = Arc::new(FakeBackend::default());
        let (picker, _) = picker(backend, FakeDevice::At(10.0, 20.5));

        let result = picker.use_current_location().await.unwrap();
        assert_eq!(result.address, "10, 20.5");
    }

    #[tokio::test(start_paused = true)]
    async fn test_permission_denied_message() {
        let backend = Arc::new(FakeBackend::default());
        let (picker, selected) =
            picker(backend.clone(), FakeDevice::Fails(LocationError::PermissionDenied));

        assert!(picker.use_current_location().await.is_none());
        assert_eq!(picker.state().error.as_deref(), Some(messages::DEVICE_LOCATION_FAILED));
        assert!(!picker.state().is_loading);
        assert!(selected.lock().unwrap().is_empty());
        assert!(backend.reverse_calls.lock().unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_network_failure_has_distinct_message() {
        let backend = Arc::new(FakeBackend::default());
        let (picker, _) = picker(
            backend,
            FakeDevice::Fails(LocationError::Network("connection refused".to_string())),
        );

        assert!(picker.use_current_location().await.is_none());
        assert_eq!(picker.state().error.as_deref(), Some(messages::CURRENT_LOCATION_FAILED));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsupported_device() {
        let backend = Arc::new(FakeBackend::default());
        let (picker, _) = picker(backend, FakeDevice::Fails(LocationError::Unsupported));

        assert!(picker.use_current_location().await.is_none());
        assert_eq!(picker.state().error.as_deref(), Some(messages::GEOLOCATION_UNSUPPORTED));
    }

    #[tokio::test(start_paused = true)]
    async fn test_device_timeout() {
        let backend = Arc::new(FakeBackend::default());
        let (picker, _) = picker(backend, FakeDevice::Hangs);

        let started = tokio::time::Instant::now();
        assert!(picker.use_current_location().await.is_none());
        assert!(started.elapsed() >= Duration::from_secs(10));
        assert_eq!(picker.state().error.as_deref(), Some(messages::DEVICE_LOCATION_FAILED));
    }

    #[tokio::test]
    async fn test_manual_coordinates() {
        let backend = Arc::new(FakeBackend::default());
        let (picker, selected) = picker(backend, FakeDevice::Hangs);

        let err = picker.submit_coordinates("95", "10").unwrap_err();
        assert!(matches!(err, Error::InvalidCoordinates(_)));
        assert!(picker.submit_coordinates("NaN", "10").is_err());
        assert!(picker.submit_coordinates("north", "10").is_err());
        assert_eq!(picker.state().error.as_deref(), Some(messages::INVALID_COORDINATES));
        assert!(selected.lock().unwrap().is_empty());

        let result = picker.submit_coordinates(" 51.5 ", "-0.12").unwrap();
        assert_eq!(result.address, "51.5, -0.12");
        assert_eq!(selected.lock().unwrap().len(), 1);
        assert!(picker.state().error.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_subscribers_see_resolution() {
        let backend = Arc::new(FakeBackend {
            forward: Some(paris()),
            ..Default::default()
        });
        let (picker, _) = picker(backend, FakeDevice::Hangs);
        let mut updates = picker.subscribe();

        picker.handle_address_change("Paris").unwrap().await.unwrap();

        assert!(updates.has_changed().unwrap());
        assert_eq!(
            updates.borrow_and_update().coordinates,
            Some(Coordinates::new(48.8566, 2.3522))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_picker_over_geocoding_client() {
        let mock = MockFetcher::scripted([MockReply::Json(
            r#"[{"lat": "48.8566", "lon": "2.3522", "display_name": "Paris, France"}]"#.to_string(),
        )]);
        let client = Arc::new(GeocodingClient::with_fetcher(mock, GeocoderSettings::default()));
        let (picker, selected) = picker(client.clone(), FakeDevice::Hangs);

        for text in ["P", "Pa", "Par", "Pari", "Paris"] {
            picker.handle_address_change(text);
            tokio::time::advance(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert_eq!(client.fetcher().call_count(), 1);
        assert_eq!(selected.lock().unwrap()[0].address, "Paris, France");
    }
}
