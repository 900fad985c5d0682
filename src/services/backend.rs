use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::models::{
    destination::DestinationDetail,
    route::{RouteError, RouteOutcome},
    trip::TripRequest,
};

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server responded with status {status}")]
    Api { status: u16 },

    #[error("invalid route in response: {0}")]
    InvalidRoute(#[from] RouteError),

    #[error("undecodable response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("backend url `{0}` cannot carry a path")]
    OpaqueUrl(String),
}

#[derive(Debug, Clone)]
pub struct BackendClientParams {
    pub optimize_url: Url,
    pub destinations_url: Url,
}

/// Talks to the external optimizer and destination services.
#[derive(Debug, Clone)]
pub struct BackendClient {
    params: BackendClientParams,
    client: reqwest::Client,
}

impl BackendClient {
    pub fn new(params: BackendClientParams) -> Self {
        Self {
            params,
            client: reqwest::Client::new(),
        }
    }

    /// One POST, no retry. Never panics or errors; every failure ends up in
    /// [`RouteOutcome::Failed`].
    pub async fn optimize(&self, request: &TripRequest) -> RouteOutcome {
        match self.post_optimize(request).await {
            Ok(raw) => RouteOutcome::from_body(raw),
            Err(err) => {
                warn!(error = %err, "optimize request failed");
                RouteOutcome::Failed(err)
            }
        }
    }

    async fn post_optimize(&self, request: &TripRequest) -> Result<String, BackendError> {
        debug!(url = %self.params.optimize_url, area = %request.area, "posting trip request");
        let response = self
            .client
            .post(self.params.optimize_url.clone())
            .json(request)
            .send()
            .await?;

        Self::success_body(response).await
    }

    pub async fn destination(&self, name: &str) -> Result<DestinationDetail, BackendError> {
        let url = self.destination_url(name)?;
        debug!(%url, "fetching destination detail");
        let response = self.client.get(url).send().await?;
        let body = Self::success_body(response).await?;
        let detail = serde_json::from_str(&body)?;
        Ok(detail)
    }

    /// `<base>/destinations/<name>` with the name percent-encoded as one path segment.
    pub fn destination_url(&self, name: &str) -> Result<Url, BackendError> {
        let mut url = self.params.destinations_url.clone();
        url.path_segments_mut()
            .map_err(|_| BackendError::OpaqueUrl(self.params.destinations_url.to_string()))?
            .pop_if_empty()
            .push("destinations")
            .push(name);
        Ok(url)
    }

    async fn success_body(response: reqwest::Response) -> Result<String, BackendError> {
        let status = response.status();
        if status.is_success() {
            Ok(response.text().await?)
        } else {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %excerpt(&body), "backend returned an error");
            Err(BackendError::Api {
                status: status.as_u16(),
            })
        }
    }
}

/// Upstream error pages can be whole HTML documents; logs only keep the start.
fn excerpt(body: &str) -> &str {
    const LIMIT: usize = 200;
    match body.char_indices().nth(LIMIT) {
        Some((end, _)) => &body[..end],
        None => body,
    }
}
