//! Shopkeep API client

pub mod auth;
pub mod error;
pub mod query;
pub mod upload;

use crate::config::ClientConfig;
use crate::session::Session;
use error::ClientError;
use query::Query;
use reqwest::{Client, ClientBuilder, Method, Response, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};
use url::Url;

const REQUEST_FAILED: &str = "Request failed";

/// Method, body and query of one call
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub query: Query,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    /// Attach a JSON body; a body serializing to `null` is not sent
    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }
}

/// API client bound to one base address and one session
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    session: Arc<Session>,
}

impl ApiClient {
    /// Create a new client builder
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Create a client from loaded configuration
    pub fn from_config(config: &ClientConfig, session: Arc<Session>) -> Result<Self, ClientError> {
        Self::builder()
            .base_url(config.api_base.as_str())
            .user_agent(config.user_agent.clone())
            .session(session)
            .build()
    }

    /// Get the base URL
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub const fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Issue a JSON request against `path`, resolved relative to the base URL
    ///
    /// A 204 response yields the value `T` deserializes from `null`, so it
    /// succeeds for `()`, `Option<_>` and `serde_json::Value`. A 401 response
    /// ends the session before the error is returned.
    pub async fn request<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, ClientError> {
        let mut url = self.base_url.join(path)?;
        options.query.apply(&mut url);

        debug!(method = %options.method, %url, "Sending request");

        let mut request = self
            .client
            .request(options.method, url)
            .header(header::CONTENT_TYPE, "application/json");

        // Read at build time; a later logout does not affect a request in flight
        if let Some(token) = self.session.token() {
            request = request.bearer_auth(token);
        }

        if let Some(body) = options.body.filter(|body| !body.is_null()) {
            request = request.body(serde_json::to_vec(&body)?);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            if status == StatusCode::UNAUTHORIZED {
                warn!("Request unauthorized, ending session");
                self.session.logout();
            }
            let message = error_message(response, REQUEST_FAILED).await;
            return Err(ClientError::from_status(status, message));
        }

        if status == StatusCode::NO_CONTENT {
            return Ok(serde_json::from_value(Value::Null)?);
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Query) -> Result<T, ClientError> {
        self.request(path, RequestOptions::new(Method::GET).query(query))
            .await
    }

    /// POST `body` as JSON; pass `&()` to send no body
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(path, RequestOptions::new(Method::POST).json(body)?)
            .await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(path, RequestOptions::new(Method::PUT).json(body)?)
            .await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(path, RequestOptions::new(Method::PATCH).json(body)?)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.request(path, RequestOptions::new(Method::DELETE)).await
    }
}

/// Pull a human-readable message out of an error response
async fn error_message(response: Response, fallback: &str) -> String {
    let detail = match response.bytes().await {
        Ok(bytes) => serde_json::from_slice::<Value>(&bytes)
            .ok()
            .and_then(|body| body.get("detail").and_then(detail_text)),
        Err(e) => {
            debug!("Failed to read error body: {}", e);
            None
        }
    };
    detail.unwrap_or_else(|| fallback.to_string())
}

fn detail_text(detail: &Value) -> Option<String> {
    match detail {
        Value::String(text) if !text.is_empty() => Some(text.clone()),
        // Validation errors carry structured details
        Value::Array(_) | Value::Object(_) => Some(detail.to_string()),
        _ => None,
    }
}

/// Builder for [`ApiClient`]
#[derive(Default)]
pub struct ApiClientBuilder {
    base_url: Option<String>,
    user_agent: Option<String>,
    session: Option<Arc<Session>>,
}

impl ApiClientBuilder {
    /// Set the base URL
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Set the user agent
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    /// Share an existing session; a fresh one without persistence is used otherwise
    #[must_use]
    pub fn session(mut self, session: Arc<Session>) -> Self {
        self.session = Some(session);
        self
    }

    /// Build the client
    pub fn build(self) -> Result<ApiClient, ClientError> {
        let base_url = self
            .base_url
            .ok_or_else(|| ClientError::Configuration("base_url is required".into()))?;
        let base_url = Url::parse(&base_url)
            .map_err(|e| ClientError::Configuration(format!("invalid base_url {base_url:?}: {e}")))?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(crate::config::default_user_agent);
        let client = ClientBuilder::new().user_agent(user_agent).build()?;

        Ok(ApiClient {
            client,
            base_url,
            session: self.session.unwrap_or_default(),
        })
    }
}
