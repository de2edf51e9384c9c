use crate::error::{ApiError, ApiResult};
use crate::models::upload::ErrorBody;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::RwLock;
use url::Url;

/// Header correlating an upload with the push channel of the same tab
pub const CONNECTION_ID_HEADER: &str = "X-Connection-Id";

/// Client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Multipart upload endpoint
    pub upload_url: Url,
    /// Base URL of the credentialed auth endpoints, if the deployment has them
    pub auth_url: Option<Url>,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// User agent sent with every request
    pub user_agent: String,
}

impl ClientConfig {
    /// Create a configuration for the given upload endpoint
    pub fn new(upload_url: &str) -> ApiResult<Self> {
        Ok(Self {
            upload_url: Url::parse(upload_url)?,
            auth_url: None,
            connect_timeout: Duration::from_secs(20),
            user_agent: format!("docqa-client/{}", env!("CARGO_PKG_VERSION")),
        })
    }

    /// Enable the credentialed auth endpoints
    pub fn with_auth_url(mut self, auth_url: Url) -> Self {
        self.auth_url = Some(auth_url);
        self
    }

    /// Override the connect timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

/// Per-request options
#[derive(Debug, Clone, Copy)]
pub struct RequestOptions {
    with_credential: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self {
            with_credential: true,
        }
    }

    /// Do not attach the bearer token
    pub fn no_credential(mut self) -> Self {
        self.with_credential = false;
        self
    }
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Document service API client
pub struct Client {
    http: reqwest::Client,
    config: ClientConfig,
    token: RwLock<Option<String>>,
}

impl Client {
    /// Create a new client
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            config,
            token: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Set the bearer token used for credentialed requests
    pub async fn set_token(&self, token: impl Into<String>) {
        *self.token.write().await = Some(token.into());
    }

    pub async fn clear_token(&self) {
        *self.token.write().await = None;
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub(crate) async fn authorize(
        &self,
        request: reqwest::RequestBuilder,
        options: RequestOptions,
    ) -> reqwest::RequestBuilder {
        if !options.with_credential {
            return request;
        }
        match self.token.read().await.as_deref() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// POST a JSON body and decode a JSON response
    pub(crate) async fn post<B, R>(
        &self,
        url: Url,
        body: &B,
        options: RequestOptions,
    ) -> ApiResult<R>
    where
        B: Serialize + ?Sized + Sync,
        R: DeserializeOwned,
    {
        tracing::debug!(target: "api", url = %url, "POST");
        let request = self.authorize(self.http.post(url).json(body), options).await;
        let response = request.send().await?;
        read_json(response).await
    }
}

/// Decode a JSON response, mapping non-2xx statuses to [`ApiError::Server`].
///
/// An empty 2xx body is decoded as `{}`.
pub(crate) async fn read_json<R>(response: reqwest::Response) -> ApiResult<R>
where
    R: DeserializeOwned,
{
    let status = response.status();
    let body = response.bytes().await?;

    if !status.is_success() {
        let message = serde_json::from_slice::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message)
            .filter(|m| !m.is_empty());
        tracing::warn!(target: "api", status = status.as_u16(), message = ?message, "Request failed");
        return Err(ApiError::server(status.as_u16(), message));
    }

    if body.iter().all(u8::is_ascii_whitespace) {
        return serde_json::from_str("{}").map_err(ApiError::from);
    }

    serde_json::from_slice(&body).map_err(ApiError::from)
}
