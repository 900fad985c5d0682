use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use chrono::{DateTime, NaiveDateTime};
use tracing::warn;

use crate::{
    error::AppError,
    handoff::{self, HandoffError},
    map::MapView,
    models::{location::TOKYO_STATION, route::RouteResult},
    routes::optimize::NO_FEASIBLE_ROUTE,
    session::BrowserSession,
    state::AppState,
};

pub const MISSING_RESULT: &str = "結果情報がありません";
pub const MALFORMED_RESULT: &str = "結果情報の形式が正しくありません";

pub fn router() -> Router<AppState> {
    Router::new().route("/result", get(result_page))
}

/// One line of the itinerary list.
#[derive(Debug, Clone, PartialEq)]
pub struct ItineraryEntry {
    /// 1-based.
    pub index: usize,
    pub name: String,
    pub detail_href: String,
    pub latitude: f64,
    pub longitude: f64,
    pub transport: String,
    pub departure: String,
    pub arrival: String,
    pub stay_minutes: u32,
    pub cost: String,
}

pub fn itinerary(route: &RouteResult) -> Vec<ItineraryEntry> {
    route
        .route
        .iter()
        .enumerate()
        .map(|(i, stop)| ItineraryEntry {
            index: i + 1,
            name: stop.name.clone(),
            detail_href: detail_href(&stop.name),
            latitude: stop.lat,
            longitude: stop.lng,
            transport: stop
                .transportation_method
                .clone()
                .unwrap_or_else(|| "-".into()),
            departure: format_clock(stop.departure_time.as_deref()),
            arrival: format_clock(stop.arrival_time.as_deref()),
            stay_minutes: stop.stay_duration_minutes,
            cost: format!("{}円", stop.total_cost.round() as i64),
        })
        .collect()
}

pub fn detail_href(name: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(name.as_bytes()).collect();
    format!("/destination?name={encoded}")
}

/// ISO timestamps become `MM/DD HH:MM`; anything else is shown as sent.
fn format_clock(raw: Option<&str>) -> String {
    let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
        return "-".into();
    };
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.format("%m/%d %H:%M").to_string();
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return ts.format("%m/%d %H:%M").to_string();
    }
    raw.to_string()
}

#[derive(Template)]
#[template(path = "result.html")]
struct ResultTemplate {
    entries: Vec<ItineraryEntry>,
    map_json: Option<String>,
    alert: Option<String>,
    notice: Option<String>,
}

impl ResultTemplate {
    fn blank() -> Self {
        Self {
            entries: Vec::new(),
            map_json: None,
            alert: None,
            notice: None,
        }
    }
}

async fn result_page(
    State(state): State<AppState>,
    session: BrowserSession,
) -> Result<Response, AppError> {
    let mut page = ResultTemplate::blank();

    match handoff::load_route(&state.storage, session.id).await {
        Ok(route) if route.is_empty() => page.notice = Some(NO_FEASIBLE_ROUTE.into()),
        Ok(route) => {
            let map = MapView::route(&state.config.tiles, TOKYO_STATION, &route.route);
            page.map_json = Some(map.to_script_json().map_err(anyhow::Error::from)?);
            page.entries = itinerary(&route);
        }
        Err(HandoffError::Missing(_)) => page.alert = Some(MISSING_RESULT.into()),
        Err(err) => {
            warn!(session = %session.id, error = %err, "stored route rejected");
            page.alert = Some(MALFORMED_RESULT.into());
        }
    }

    Ok((session.jar, AskamaTemplateResponse::into_response(page)).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_keep_route_order_and_link_to_details() {
        let route = RouteResult::decode(
            r#"{"route":[
                {"lat":35.681236,"lng":139.767125,"name":"東京駅","transportation_method":"電車",
                 "departure_time":"2025-03-01T09:00:00","arrival_time":"2025-03-01T09:00:00",
                 "stay_duration_minutes":30,"total_cost":0},
                {"lat":35.689487,"lng":139.691711,"name":"新宿","total_cost":210.4},
                {"lat":35.658034,"lng":139.701636,"name":"A&B 渋谷"}
            ]}"#,
        )
        .unwrap();

        let entries = itinerary(&route);
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["東京駅", "新宿", "A&B 渋谷"]);
        assert_eq!(
            entries.iter().map(|e| e.index).collect::<Vec<_>>(),
            [1, 2, 3]
        );

        assert_eq!(entries[0].departure, "03/01 09:00");
        assert_eq!(entries[0].transport, "電車");
        assert_eq!(entries[0].stay_minutes, 30);
        assert_eq!(entries[1].cost, "210円");
        assert_eq!(entries[1].arrival, "-");
        assert_eq!(
            entries[2].detail_href,
            "/destination?name=A%26B+%E6%B8%8B%E8%B0%B7"
        );
    }

    #[test]
    fn unknown_time_formats_pass_through() {
        assert_eq!(format_clock(Some("10:30")), "10:30");
        assert_eq!(format_clock(Some("2025-03-01T10:30:00+09:00")), "03/01 10:30");
        assert_eq!(format_clock(Some("  ")), "-");
    }
}
