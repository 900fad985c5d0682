use std::{env, net::SocketAddr, str::FromStr, time::Duration};

use url::Url;

use crate::{
    error::AppError,
    geolocation::{GeoPolicy, OnDenied},
    map::TileLayer,
    models::location::{Coordinates, OSAKA_UMEDA},
};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub optimizer_url: Url,
    pub destinations_url: Url,
    pub cookie_secret: String,
    pub geo: GeoPolicy,
    /// Mount the placeholder `POST /api/optimize` on this app.
    pub stub_optimizer: bool,
    pub session_idle: Duration,
    pub tiles: TileLayer,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let listen_addr: SocketAddr = env::var("TABI_LISTEN_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|err| AppError::Config(format!("invalid TABI_LISTEN_ADDR: {err}")))?;

        let optimizer_url = url_var("TABI_OPTIMIZER_URL", "http://127.0.0.1:3000/api/optimize")?;
        let destinations_url = url_var("TABI_DESTINATIONS_URL", "http://localhost:8000")?;

        let cookie_secret = env::var("TABI_COOKIE_SECRET")
            .unwrap_or_else(|_| "change-me-tabi-cookie-secret-at-least-64-bytes-long".to_string());

        let on_denied = parsed_var("TABI_GEO_ON_DENIED", OnDenied::UseDefaultLocation)?;
        let default_location = Coordinates::new(
            parsed_var("TABI_DEFAULT_LATITUDE", OSAKA_UMEDA.latitude)?,
            parsed_var("TABI_DEFAULT_LONGITUDE", OSAKA_UMEDA.longitude)?,
        );
        if !default_location.is_valid() {
            return Err(AppError::Config(format!(
                "default location {default_location} is off the map"
            )));
        }
        let geo_timeout_ms: u64 = parsed_var("TABI_GEO_TIMEOUT_MS", 10_000)?;

        let stub_optimizer = parsed_var("TABI_STUB_OPTIMIZER", true)?;
        let session_idle_secs: u64 = parsed_var("TABI_SESSION_IDLE_SECS", 3600)?;

        let defaults = TileLayer::default();
        let tiles = TileLayer {
            url_template: env::var("TABI_TILE_URL").unwrap_or(defaults.url_template),
            attribution: env::var("TABI_TILE_ATTRIBUTION").unwrap_or(defaults.attribution),
        };

        Ok(Self {
            listen_addr,
            optimizer_url,
            destinations_url,
            cookie_secret,
            geo: GeoPolicy {
                on_denied,
                default_location,
                timeout: Duration::from_millis(geo_timeout_ms),
            },
            stub_optimizer,
            session_idle: Duration::from_secs(session_idle_secs),
            tiles,
        })
    }
}

fn url_var(name: &str, default: &str) -> Result<Url, AppError> {
    let raw = env::var(name).unwrap_or_else(|_| default.to_string());
    Url::parse(&raw).map_err(|err| AppError::Config(format!("invalid {name}: {err}")))
}

fn parsed_var<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|err| AppError::Config(format!("invalid {name}: {err}"))),
        Err(_) => Ok(default),
    }
}
