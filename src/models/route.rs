use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use thiserror::Error;

use crate::{models::location::Coordinates, services::backend::BackendError};

/// Itinerary returned by the optimizer. Stops are in visiting order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteResult {
    pub route: Vec<Stop>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub transportation_method: Option<String>,
    #[serde(default)]
    pub departure_time: Option<String>,
    #[serde(default)]
    pub arrival_time: Option<String>,
    #[serde(default)]
    pub stay_duration_minutes: u32,
    #[serde(default)]
    pub total_cost: f64,
}

impl Stop {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

#[derive(Debug, Error)]
pub enum RouteError {
    #[error("route is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("stop {index} ({name}) has invalid coordinates")]
    InvalidCoordinates { index: usize, name: String },
    #[error("stop {index} ({name}) has an invalid cost")]
    InvalidCost { index: usize, name: String },
}

impl RouteResult {
    /// Decodes and validates a raw optimizer response.
    pub fn decode(raw: &str) -> Result<Self, RouteError> {
        let result: RouteResult = serde_json::from_str(raw)?;
        result.validate()?;
        Ok(result)
    }

    pub fn validate(&self) -> Result<(), RouteError> {
        for (index, stop) in self.route.iter().enumerate() {
            if !stop.coordinates().is_valid() {
                return Err(RouteError::InvalidCoordinates {
                    index,
                    name: stop.name.clone(),
                });
            }
            if !stop.total_cost.is_finite() || stop.total_cost < 0.0 {
                return Err(RouteError::InvalidCost {
                    index,
                    name: stop.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.route.is_empty()
    }

    pub fn len(&self) -> usize {
        self.route.len()
    }
}

/// What a single optimize call produced.
#[derive(Debug)]
pub enum RouteOutcome {
    /// At least one stop; `raw` is the response body exactly as received.
    Planned { route: RouteResult, raw: String },
    /// The optimizer answered successfully but found no feasible itinerary.
    Empty,
    Failed(BackendError),
}

impl RouteOutcome {
    /// Classifies a successful (2xx) response body.
    pub fn from_body(raw: String) -> Self {
        match RouteResult::decode(&raw) {
            Ok(route) if route.is_empty() => RouteOutcome::Empty,
            Ok(route) => RouteOutcome::Planned { route, raw },
            Err(err) => RouteOutcome::Failed(BackendError::InvalidRoute(err)),
        }
    }
}
