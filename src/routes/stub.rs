//! Placeholder optimizer for local development. It performs no optimization.

use axum::{routing::post, Json, Router};
use serde_json::Value;
use tracing::debug;

use crate::models::route::{RouteResult, Stop};

pub fn router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/api/optimize", post(optimize))
}

async fn optimize(body: Option<Json<Value>>) -> Json<RouteResult> {
    debug!(json_body = body.is_some(), "stub optimizer called");
    Json(placeholder_route())
}

/// Fixed three-stop route through Tokyo.
pub fn placeholder_route() -> RouteResult {
    RouteResult {
        route: vec![
            stop("東京駅", 35.681236, 139.767125, "出発", "09:00", "09:00", 0, 0.0),
            stop("新宿", 35.689487, 139.691711, "電車", "09:00", "09:15", 60, 210.0),
            stop("渋谷", 35.658034, 139.701636, "電車", "10:15", "10:22", 90, 170.0),
        ],
    }
}

#[allow(clippy::too_many_arguments)]
fn stop(
    name: &str,
    lat: f64,
    lng: f64,
    transport: &str,
    departure: &str,
    arrival: &str,
    stay: u32,
    cost: f64,
) -> Stop {
    Stop {
        name: name.into(),
        lat,
        lng,
        transportation_method: Some(transport.into()),
        departure_time: Some(departure.into()),
        arrival_time: Some(arrival.into()),
        stay_duration_minutes: stay,
        total_cost: cost,
    }
}
