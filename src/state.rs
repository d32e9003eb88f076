use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::Error;

pub const POSTAL_CODE_PLACEHOLDER: &str = "Data not found";
pub const MAP_ZOOM: u8 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoRecord {
    pub ip: String,
    pub location: String,
    pub timezone: String,
    pub postal_code: Option<String>,
    pub city: String,
}

impl Default for GeoRecord {
    fn default() -> Self {
        Self {
            ip: String::from("102.89.46.56"),
            location: String::from("Lagos, Nigeria"),
            timezone: String::from("Africa/Lagos"),
            postal_code: Some(String::from("100001")),
            city: String::from("Lagos"),
        }
    }
}

impl GeoRecord {
    pub fn postal_code_or_placeholder(&self) -> &str {
        match self.postal_code.as_deref() {
            Some(code) if !code.is_empty() => code,
            _ => POSTAL_CODE_PLACEHOLDER,
        }
    }
}

/// Map centre in degrees. Construct through [`MapPosition::new`] to keep
/// both coordinates finite and on the globe.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapPosition {
    latitude: f64,
    longitude: f64,
}

impl Default for MapPosition {
    fn default() -> Self {
        Self {
            latitude: 6.45,
            longitude: 3.4,
        }
    }
}

impl MapPosition {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, Error> {
        let usable = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !usable {
            return Err(Error::Coordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackerState {
    pub search_input: String,
    pub geo_record: GeoRecord,
    pub position: MapPosition,
    pub details_visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetSearchInput(String),
    SetGeoRecord(GeoRecord),
    SetMapPosition(MapPosition),
    /// Forces the details panel closed. Not a toggle.
    HideDetails,
    ToggleDetails,
}

impl TrackerState {
    pub fn reduce(&mut self, action: Action) {
        match action {
            Action::SetSearchInput(value) => self.search_input = value,
            Action::SetGeoRecord(record) => self.geo_record = record,
            Action::SetMapPosition(position) => self.position = position,
            Action::HideDetails => self.details_visible = false,
            Action::ToggleDetails => self.details_visible = !self.details_visible,
        }
    }

    pub fn map_view(&self) -> MapView {
        MapView {
            center: self.position,
            zoom: MAP_ZOOM,
            label: self.geo_record.location.clone(),
        }
    }
}

/// What the map widget needs to render: a centre and a marker label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: MapPosition,
    pub zoom: u8,
    pub label: String,
}

/// Shared handle to the tracker state.
///
/// Every mutation goes through [`Store::dispatch`] or
/// [`Store::dispatch_all`]; subscribers are woken after each one.
#[derive(Clone)]
pub struct Store {
    tx: watch::Sender<TrackerState>,
}

impl Default for Store {
    fn default() -> Self {
        Self::new(TrackerState::default())
    }
}

impl Store {
    pub fn new(initial: TrackerState) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn dispatch(&self, action: Action) {
        debug!("dispatch {:?}", action);
        self.tx.send_modify(|state| state.reduce(action));
    }

    /// Applies the actions in order as a single change.
    pub fn dispatch_all(&self, actions: impl IntoIterator<Item = Action>) {
        self.tx.send_modify(|state| {
            for action in actions {
                debug!("dispatch {:?}", action);
                state.reduce(action);
            }
        });
    }

    pub fn snapshot(&self) -> TrackerState {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.tx.subscribe()
    }

    pub fn set_search_input(&self, value: impl Into<String>) {
        self.dispatch(Action::SetSearchInput(value.into()));
    }

    pub fn toggle_details(&self) {
        self.dispatch(Action::ToggleDetails);
    }
}
