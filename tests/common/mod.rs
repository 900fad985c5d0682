#![allow(dead_code)]

use std::{
    collections::HashMap,
    fmt,
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use anyhow::Context;
use axum::{
    body::{to_bytes, Body},
    extract::{Path, State},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, Key, PrivateCookieJar};
use serde_json::Value;
use tabi::{
    config::AppConfig,
    geolocation::{GeoPolicy, OnDenied},
    map::TileLayer,
    models::location::OSAKA_UMEDA,
    routes::{create_router, stub::placeholder_route},
    services::storage::PageStorage,
    session::SessionId,
    state::AppState,
};
use tokio::net::TcpListener;
use tower::ServiceExt;
use url::Url;

#[derive(Debug, Clone)]
pub enum OptimizeMode {
    Placeholder,
    Empty,
    Status(u16),
    Raw(String),
}

/// Stand-in for the optimizer and destination services.
#[derive(Clone)]
pub struct FakeBackend {
    pub addr: SocketAddr,
    mode: Arc<Mutex<OptimizeMode>>,
    requests: Arc<Mutex<Vec<Value>>>,
    destinations: Arc<Mutex<HashMap<String, Value>>>,
}

impl fmt::Debug for FakeBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeBackend").field("addr", &self.addr).finish()
    }
}

impl FakeBackend {
    pub async fn spawn() -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("bind fake backend")?;
        let backend = Self {
            addr: listener.local_addr()?,
            mode: Arc::new(Mutex::new(OptimizeMode::Placeholder)),
            requests: Arc::default(),
            destinations: Arc::default(),
        };

        let app = Router::new()
            .route("/api/optimize", post(fake_optimize))
            .route("/destinations/:name", get(fake_destination))
            .with_state(backend.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Ok(backend)
    }

    pub fn set_mode(&self, mode: OptimizeMode) {
        *self.mode.lock().expect("mode lock") = mode;
    }

    pub fn requests(&self) -> Vec<Value> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn add_destination(&self, name: &str, detail: Value) {
        self.destinations
            .lock()
            .expect("destinations lock")
            .insert(name.to_string(), detail);
    }

    pub fn optimize_url(&self) -> Url {
        Url::parse(&format!("http://{}/api/optimize", self.addr)).expect("optimize url")
    }

    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}", self.addr)).expect("base url")
    }
}

async fn fake_optimize(State(backend): State<FakeBackend>, Json(body): Json<Value>) -> Response {
    backend.requests.lock().expect("requests lock").push(body);
    let mode = backend.mode.lock().expect("mode lock").clone();
    match mode {
        OptimizeMode::Placeholder => Json(placeholder_route()).into_response(),
        OptimizeMode::Empty => Json(serde_json::json!({ "route": [] })).into_response(),
        OptimizeMode::Status(code) => (
            StatusCode::from_u16(code).expect("status code"),
            "optimizer exploded",
        )
            .into_response(),
        OptimizeMode::Raw(raw) => ([(header::CONTENT_TYPE, "application/json")], raw).into_response(),
    }
}

async fn fake_destination(
    State(backend): State<FakeBackend>,
    Path(name): Path<String>,
) -> Response {
    let found = backend
        .destinations
        .lock()
        .expect("destinations lock")
        .get(&name)
        .cloned();
    match found {
        Some(detail) => Json(detail).into_response(),
        None => (StatusCode::NOT_FOUND, "Destination not found").into_response(),
    }
}

pub fn test_config(optimizer_url: Url, destinations_url: Url) -> AppConfig {
    AppConfig {
        listen_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        optimizer_url,
        destinations_url,
        cookie_secret: "tabi-test-cookie-secret".into(),
        geo: GeoPolicy {
            on_denied: OnDenied::UseDefaultLocation,
            default_location: OSAKA_UMEDA,
            timeout: Duration::from_secs(10),
        },
        stub_optimizer: false,
        session_idle: Duration::from_secs(3600),
        tiles: TileLayer::default(),
    }
}

pub fn app_for(config: AppConfig) -> Router {
    create_router(AppState::new(config, PageStorage::new()))
}

/// Like [`app_for`], but hands back the state so tests can reach its storage.
pub fn app_with_state(config: AppConfig) -> (Router, AppState) {
    let state = AppState::new(config, PageStorage::new());
    (create_router(state.clone()), state)
}

/// Drives the router like a browser: keeps the session cookie between calls.
pub struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl fmt::Debug for Browser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Browser")
            .field("cookie", &self.cookie.is_some())
            .finish()
    }
}

impl Browser {
    pub fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    pub async fn get(&mut self, uri: &str) -> Page {
        let request = self.request("GET", uri).body(Body::empty()).expect("request");
        self.send(request).await
    }

    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> Page {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(fields)
            .finish();
        let request = self
            .request("POST", uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .expect("request");
        self.send(request).await
    }

    /// Decrypts the session cookie the app handed out, if any.
    pub fn session_id(&self, key: &Key) -> Option<SessionId> {
        let cookie = Cookie::parse_encoded(self.cookie.clone()?).ok()?;
        let cookie = PrivateCookieJar::new(key.clone()).decrypt(cookie)?;
        cookie.value().parse().ok()
    }

    fn request(&self, method: &str, uri: &str) -> axum::http::request::Builder {
        let builder = Request::builder().method(method).uri(uri);
        match &self.cookie {
            Some(cookie) => builder.header(header::COOKIE, cookie),
            None => builder,
        }
    }

    async fn send(&mut self, request: Request<Body>) -> Page {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
        {
            let pair = set_cookie.split(';').next().unwrap_or_default();
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        Page {
            status,
            location,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    pub status: StatusCode,
    pub location: Option<String>,
    pub body: String,
}

impl Page {
    /// The JSON island handed to the map script, if the page draws a map.
    pub fn map_view(&self) -> Option<Value> {
        let start_tag = r#"<script type="application/json" id="map-data">"#;
        let start = self.body.find(start_tag)? + start_tag.len();
        let end = start + self.body[start..].find("</script>")?;
        serde_json::from_str(&self.body[start..end]).ok()
    }

    /// Stop names of the itinerary list, in document order.
    pub fn entry_names(&self) -> Vec<String> {
        self.body
            .split("route-entry")
            .skip(1)
            .filter_map(|chunk| {
                let link = chunk.find("<a href=")?;
                let start = link + chunk[link..].find('>')? + 1;
                let end = start + chunk[start..].find("</a>")?;
                Some(chunk[start..end].to_string())
            })
            .collect()
    }

    /// Inputs flagged with an inline validation message.
    pub fn flagged_fields(&self) -> Vec<String> {
        self.body
            .split(r#"data-field=""#)
            .skip(1)
            .filter_map(|chunk| chunk.split('"').next().map(str::to_string))
            .collect()
    }

    pub fn alert(&self) -> Option<String> {
        let start = self.body.find("data-blocking-alert>")? + "data-blocking-alert>".len();
        let end = start + self.body[start..].find("</div>")?;
        Some(self.body[start..end].trim().to_string())
    }
}

pub fn kiyomizu() -> Value {
    serde_json::json!({
        "destination_id": 1,
        "destination_name": "清水寺",
        "destination_category": "寺院",
        "destination_fare": 500,
        "destination_staytime": 60,
        "destination_rating": 4.5,
        "destination_description": "清水の舞台で知られる寺院",
        "destination_address": "京都府京都市東山区清水1丁目294",
        "destination_latitude": 34.994856,
        "destination_longitude": 135.785046,
        "destination_area": "京都",
        "image_url": null
    })
}
