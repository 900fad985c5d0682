use askama::Template;
use askama_axum::IntoResponse as AskamaTemplateResponse;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use tracing::{info, warn};

use crate::{
    handoff::{self, DeparturePayload},
    models::route::RouteOutcome,
    session::BrowserSession,
    state::AppState,
    validation::{self, FieldErrors, TripForm},
};

pub const NO_FEASIBLE_ROUTE: &str = "条件に合う旅程が見つかりませんでした。予算や日数を見直してください。";
pub const MISSING_DEPARTURE: &str = "出発地の情報がありません。最初のページからやり直してください。";

pub fn router() -> Router<AppState> {
    Router::new().route("/optimize", get(optimize_form).post(optimize_submit))
}

#[derive(Template)]
#[template(path = "optimize.html")]
struct OptimizeTemplate {
    form: TripForm,
    errors: FieldErrors,
    area: Option<String>,
    location: Option<String>,
    alert: Option<String>,
    notice: Option<String>,
}

impl OptimizeTemplate {
    fn new(form: TripForm, departure: Option<&DeparturePayload>) -> Self {
        Self {
            form,
            errors: FieldErrors::default(),
            area: departure.map(|d| d.area.clone()),
            location: departure.map(|d| d.location.to_string()),
            alert: None,
            notice: None,
        }
    }
}

async fn optimize_form(State(state): State<AppState>, session: BrowserSession) -> Response {
    let page = match handoff::load_departure(&state.storage, session.id).await {
        Ok(departure) => OptimizeTemplate::new(TripForm::default(), Some(&departure)),
        Err(err) => {
            warn!(session = %session.id, error = %err, "optimize page opened without departure");
            let mut page = OptimizeTemplate::new(TripForm::default(), None);
            page.alert = Some(MISSING_DEPARTURE.into());
            page
        }
    };
    (session.jar, AskamaTemplateResponse::into_response(page)).into_response()
}

async fn optimize_submit(
    State(state): State<AppState>,
    session: BrowserSession,
    Form(form): Form<TripForm>,
) -> Response {
    let departure = handoff::load_departure(&state.storage, session.id).await;
    let mut page = OptimizeTemplate::new(form.clone(), departure.as_ref().ok());

    let params = match validation::validate(&form) {
        Ok(params) => params,
        Err(errors) => {
            page.errors = errors;
            return render(session, StatusCode::BAD_REQUEST, page);
        }
    };

    let departure = match departure {
        Ok(departure) => departure,
        Err(err) => {
            warn!(session = %session.id, error = %err, "trip submitted without departure");
            page.alert = Some(MISSING_DEPARTURE.into());
            return render(session, StatusCode::BAD_REQUEST, page);
        }
    };

    let request = params.into_request(&departure);
    match state.backend.optimize(&request).await {
        RouteOutcome::Planned { route, raw } => {
            info!(session = %session.id, stops = route.len(), "itinerary planned");
            handoff::store_route(&state.storage, session.id, &raw).await;
            (session.jar, Redirect::to("/result")).into_response()
        }
        RouteOutcome::Empty => {
            info!(session = %session.id, "optimizer found no feasible itinerary");
            page.notice = Some(NO_FEASIBLE_ROUTE.into());
            render(session, StatusCode::OK, page)
        }
        RouteOutcome::Failed(err) => {
            page.alert = Some(format!("ルートの最適化に失敗しました: {err}"));
            render(session, StatusCode::BAD_GATEWAY, page)
        }
    }
}

fn render(session: BrowserSession, status: StatusCode, page: OptimizeTemplate) -> Response {
    (
        status,
        session.jar,
        AskamaTemplateResponse::into_response(page),
    )
        .into_response()
}
