//! Typed state passed between pages.
//!
//! The storage keys below are the serialized form; every read is validated so
//! a page either gets a complete payload or a [`HandoffError`], never partial
//! data.

use thiserror::Error;
use tracing::debug;

use crate::{
    models::{
        location::Coordinates,
        route::{RouteError, RouteResult},
    },
    services::storage::PageStorage,
    session::SessionId,
};

pub const AREA_KEY: &str = "area";
pub const DEPARTURE_KEY: &str = "departure";
pub const LATITUDE_KEY: &str = "latitude";
pub const LONGITUDE_KEY: &str = "longitude";
pub const RESULT_KEY: &str = "resultData";
/// Older pages wrote the route here; only read as a fallback.
pub const LEGACY_RESULT_KEY: &str = "routeData";

#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("`{0}` is missing from page storage")]
    Missing(&'static str),
    #[error("`{key}` holds an invalid value: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Written by the start page, read by the optimize page.
#[derive(Debug, Clone, PartialEq)]
pub struct DeparturePayload {
    pub area: String,
    pub departure: String,
    pub location: Coordinates,
}

impl DeparturePayload {
    pub fn to_entries(&self) -> [(&'static str, String); 4] {
        [
            (AREA_KEY, self.area.clone()),
            (DEPARTURE_KEY, self.departure.clone()),
            (LATITUDE_KEY, self.location.latitude.to_string()),
            (LONGITUDE_KEY, self.location.longitude.to_string()),
        ]
    }

    pub fn from_lookup<F>(mut lookup: F) -> Result<Self, HandoffError>
    where
        F: FnMut(&'static str) -> Option<String>,
    {
        let area = lookup(AREA_KEY).ok_or(HandoffError::Missing(AREA_KEY))?;
        if area.trim().is_empty() {
            return Err(HandoffError::Invalid {
                key: AREA_KEY,
                reason: "area is blank".into(),
            });
        }
        // The start page always writes departure, possibly empty.
        let departure = lookup(DEPARTURE_KEY).ok_or(HandoffError::Missing(DEPARTURE_KEY))?;
        let latitude = parse_coordinate(LATITUDE_KEY, lookup(LATITUDE_KEY))?;
        let longitude = parse_coordinate(LONGITUDE_KEY, lookup(LONGITUDE_KEY))?;

        let location = Coordinates::new(latitude, longitude);
        if !location.is_valid() {
            return Err(HandoffError::Invalid {
                key: LATITUDE_KEY,
                reason: format!("{location} is off the map"),
            });
        }

        Ok(Self {
            area,
            departure,
            location,
        })
    }
}

fn parse_coordinate(key: &'static str, raw: Option<String>) -> Result<f64, HandoffError> {
    let raw = raw.ok_or(HandoffError::Missing(key))?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(HandoffError::Missing(key));
    }
    trimmed.parse::<f64>().map_err(|err| HandoffError::Invalid {
        key,
        reason: err.to_string(),
    })
}

pub async fn store_departure(storage: &PageStorage, session: SessionId, payload: &DeparturePayload) {
    debug!(%session, area = %payload.area, "storing departure hand-off");
    storage.set_many(session, payload.to_entries()).await;
}

pub async fn load_departure(
    storage: &PageStorage,
    session: SessionId,
) -> Result<DeparturePayload, HandoffError> {
    let entries = storage.entries(session).await;
    DeparturePayload::from_lookup(|key| entries.get(key).cloned())
}

/// Stores the optimizer response exactly as received, replacing any earlier result.
pub async fn store_route(storage: &PageStorage, session: SessionId, raw: &str) {
    debug!(%session, bytes = raw.len(), "storing route result");
    storage.set(session, RESULT_KEY, raw).await;
}

pub async fn load_route(
    storage: &PageStorage,
    session: SessionId,
) -> Result<RouteResult, HandoffError> {
    let (key, raw) = match storage.get(session, RESULT_KEY).await {
        Some(raw) => (RESULT_KEY, raw),
        None => match storage.get(session, LEGACY_RESULT_KEY).await {
            Some(raw) => (LEGACY_RESULT_KEY, raw),
            None => return Err(HandoffError::Missing(RESULT_KEY)),
        },
    };
    RouteResult::decode(&raw).map_err(|err: RouteError| HandoffError::Invalid {
        key,
        reason: err.to_string(),
    })
}
