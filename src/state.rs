use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;
use sha2::{Digest, Sha512};

use crate::{
    config::AppConfig,
    services::{
        backend::{BackendClient, BackendClientParams},
        storage::PageStorage,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub backend: BackendClient,
    pub storage: PageStorage,
    pub cookie_key: Key,
}

impl AppState {
    pub fn new(config: AppConfig, storage: PageStorage) -> Self {
        let digest = Sha512::digest(config.cookie_secret.as_bytes());
        let cookie_key = Key::from(&digest[..]);
        let backend = BackendClient::new(BackendClientParams {
            optimize_url: config.optimizer_url.clone(),
            destinations_url: config.destinations_url.clone(),
        });
        Self {
            config,
            backend,
            storage,
            cookie_key,
        }
    }
}

impl FromRef<AppState> for Key {
    fn from_ref(state: &AppState) -> Self {
        state.cookie_key.clone()
    }
}
