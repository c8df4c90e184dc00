use crate::config::ConsoleConfig;
use crate::error::RemoteError;
use crate::protocol::{
    DeleteRequest, ErrorBody, Patch, ReorderRequest, Settings, UpdateRequest, PATCHES_PATH,
    REORDER_PATH, SETTINGS_PATH,
};
use crate::remote::PatchRemote;
use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

/// [`PatchRemote`] over the device's JSON HTTP API.
#[derive(Clone)]
pub struct HttpRemote {
    client: reqwest::Client,
    base_url: Url,
}

impl HttpRemote {
    pub fn new(config: &ConsoleConfig) -> Result<Self, RemoteError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: with_trailing_slash(&config.base_url),
        })
    }

    /// Endpoint paths resolve under the base URL's own path, so a device
    /// behind a prefix such as `http://proxy/metronome` keeps the prefix.
    fn url(&self, path: &str) -> Result<Url, RemoteError> {
        self.base_url
            .join(path.trim_start_matches('/'))
            .map_err(|e| RemoteError::Transport(format!("bad url {}{path}: {e}", self.base_url)))
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response, RemoteError> {
        let mut req = self.client.request(method.clone(), self.url(path)?);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await.map_err(|e| {
            tracing::debug!(%method, path, error = %e, "request failed");
            RemoteError::from(e)
        })?;

        let status = resp.status();
        tracing::debug!(%method, path, status = status.as_u16(), "response");
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(status_error(status, &body))
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, RemoteError> {
        let resp = self.send::<()>(Method::GET, path, None).await?;
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| RemoteError::Decode(format!("{e}: {text}")))
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<(), RemoteError> {
        self.send(method, path, Some(body)).await.map(|_| ())
    }
}

#[async_trait]
impl PatchRemote for HttpRemote {
    async fn list(&self) -> Result<Vec<Patch>, RemoteError> {
        self.get_json(PATCHES_PATH).await
    }

    async fn create(&self, patch: &Patch) -> Result<(), RemoteError> {
        self.send_json(Method::POST, PATCHES_PATH, patch).await
    }

    async fn update_at(&self, index: usize, patch: &Patch) -> Result<(), RemoteError> {
        let body = UpdateRequest {
            index,
            patch: patch.clone(),
        };
        self.send_json(Method::PUT, PATCHES_PATH, &body).await
    }

    async fn delete_at(&self, index: usize) -> Result<(), RemoteError> {
        self.send_json(Method::DELETE, PATCHES_PATH, &DeleteRequest { index })
            .await
    }

    async fn reorder(&self, patches: &[Patch]) -> Result<(), RemoteError> {
        let body = ReorderRequest {
            patches: patches.to_vec(),
        };
        self.send_json(Method::POST, REORDER_PATH, &body).await
    }

    async fn get_settings(&self) -> Result<Settings, RemoteError> {
        self.get_json(SETTINGS_PATH).await
    }

    async fn set_settings(&self, settings: &Settings) -> Result<(), RemoteError> {
        self.send_json(Method::POST, SETTINGS_PATH, settings).await
    }
}

fn with_trailing_slash(url: &Url) -> Url {
    let mut url = url.clone();
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}

fn status_error(status: StatusCode, body: &str) -> RemoteError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .ok()
        .or_else(|| {
            let trimmed = body.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        })
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        });
    RemoteError::Status {
        status: status.as_u16(),
        message,
    }
}
