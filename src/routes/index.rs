use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    geolocation::{self, GeoForm, GeoReport},
    handoff::{self, DeparturePayload},
    models::location::Coordinates,
    session::BrowserSession,
    state::AppState,
};

/// First entry of the area picker; choosing it means no area was picked.
pub const AREA_PLACEHOLDER: &str = "エリアを選択";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(start_page).post(proceed))
        .route("/location", post(capture_location))
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    area: String,
    departure: String,
    latitude: String,
    longitude: String,
    gps_info: Option<String>,
    alert: Option<String>,
    geo_timeout_ms: u128,
}

impl IndexTemplate {
    fn new(state: &AppState, area: String, departure: String) -> Self {
        Self {
            area,
            departure,
            latitude: String::new(),
            longitude: String::new(),
            gps_info: None,
            alert: None,
            geo_timeout_ms: state.config.geo.timeout.as_millis(),
        }
    }

    fn with_fix(mut self, coordinates: Coordinates, info: String) -> Self {
        self.latitude = coordinates.latitude.to_string();
        self.longitude = coordinates.longitude.to_string();
        self.gps_info = Some(info);
        self
    }

    fn with_alert(mut self, message: impl Into<String>) -> Self {
        self.alert = Some(message.into());
        self
    }
}

async fn start_page(State(state): State<AppState>) -> impl IntoResponse {
    AskamaTemplateResponse::into_response(IndexTemplate::new(&state, String::new(), String::new()))
}

#[derive(Deserialize)]
struct LocationForm {
    #[serde(default)]
    area: String,
    #[serde(default)]
    departure: String,
    #[serde(flatten)]
    geo: GeoForm,
}

/// Resolves what the browser reported and shows it. Nothing is stored until
/// the user proceeds.
async fn capture_location(
    State(state): State<AppState>,
    Form(form): Form<LocationForm>,
) -> Response {
    let report = GeoReport::from_form(&form.geo);
    debug!(?report, "geolocation report");
    let page = IndexTemplate::new(&state, form.area, form.departure);

    match geolocation::resolve(report, &state.config.geo) {
        Ok(fix) => {
            let info = if fix.is_fallback() {
                format!("{fix}（現在地を取得できなかったため既定の地点を使用します）")
            } else {
                fix.to_string()
            };
            AskamaTemplateResponse::into_response(page.with_fix(fix.coordinates(), info))
        }
        Err(err) => render_alert(page, StatusCode::OK, err.to_string()),
    }
}

#[derive(Deserialize)]
struct ProceedForm {
    #[serde(default)]
    area: String,
    #[serde(default)]
    departure: String,
    #[serde(default)]
    latitude: String,
    #[serde(default)]
    longitude: String,
}

impl ProceedForm {
    fn captured(&self) -> Option<Coordinates> {
        let latitude = self.latitude.trim().parse::<f64>().ok()?;
        let longitude = self.longitude.trim().parse::<f64>().ok()?;
        Some(Coordinates::new(latitude, longitude)).filter(Coordinates::is_valid)
    }
}

async fn proceed(
    State(state): State<AppState>,
    session: BrowserSession,
    Form(form): Form<ProceedForm>,
) -> Response {
    let area = form.area.trim().to_string();
    let departure = form.departure.trim().to_string();
    let captured = form.captured();
    let page = IndexTemplate::new(&state, area.clone(), departure.clone());
    let page = match captured {
        Some(coordinates) => page.with_fix(coordinates, coordinates.to_string()),
        None => page,
    };

    if area.is_empty() || area == AREA_PLACEHOLDER {
        return render_alert(page, StatusCode::BAD_REQUEST, "エリアを入力してください");
    }

    // Proceeding without a fix is handled like a denied permission.
    let location = match captured {
        Some(coordinates) => coordinates,
        None => {
            let report = GeoReport::Denied("現在地が取得されていません".into());
            match geolocation::resolve(report, &state.config.geo) {
                Ok(fix) => fix.coordinates(),
                Err(err) => {
                    return render_alert(page, StatusCode::BAD_REQUEST, err.to_string());
                }
            }
        }
    };

    let payload = DeparturePayload {
        area,
        departure,
        location,
    };
    handoff::store_departure(&state.storage, session.id, &payload).await;
    info!(session = %session.id, area = %payload.area, "departure confirmed");

    (session.jar, Redirect::to("/optimize")).into_response()
}

fn render_alert(page: IndexTemplate, status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        AskamaTemplateResponse::into_response(page.with_alert(message)),
    )
        .into_response()
}
