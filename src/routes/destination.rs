use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::warn;

use crate::{
    error::AppError, map::MapView, models::destination::DestinationDetail, state::AppState,
};

pub const DETAIL_FAILURE: &str = "データの取得に失敗しました。";

pub fn router() -> Router<AppState> {
    Router::new().route("/destination", get(destination_page))
}

#[derive(Deserialize)]
struct DestinationQuery {
    name: Option<String>,
}

#[derive(Template)]
#[template(path = "destination.html")]
struct DestinationTemplate {
    detail: Option<DestinationDetail>,
    map_json: Option<String>,
    failure: Option<String>,
}

impl DestinationTemplate {
    fn failed() -> Self {
        Self {
            detail: None,
            map_json: None,
            failure: Some(DETAIL_FAILURE.into()),
        }
    }
}

async fn destination_page(
    State(state): State<AppState>,
    Query(query): Query<DestinationQuery>,
) -> Result<Response, AppError> {
    let Some(name) = query
        .name
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
    else {
        return Ok(failure_page(StatusCode::BAD_REQUEST));
    };

    let detail = match state.backend.destination(&name).await {
        Ok(detail) => detail,
        Err(err) => {
            warn!(%name, error = %err, "destination lookup failed");
            return Ok(failure_page(StatusCode::BAD_GATEWAY));
        }
    };

    let map = MapView::single(
        &state.config.tiles,
        detail.coordinates(),
        detail.destination_name.clone(),
    );
    let page = DestinationTemplate {
        map_json: Some(map.to_script_json().map_err(anyhow::Error::from)?),
        detail: Some(detail),
        failure: None,
    };
    Ok(AskamaTemplateResponse::into_response(page))
}

fn failure_page(status: StatusCode) -> Response {
    (
        status,
        AskamaTemplateResponse::into_response(DestinationTemplate::failed()),
    )
        .into_response()
}
