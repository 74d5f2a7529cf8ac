//! HTTP wrapper for the JSON auth API with a fixed timeout and uniform error
//! handling. Every request reads the persisted token and attaches it as a
//! bearer credential; a `401 Unauthorized` answer deletes that token before the
//! error reaches the caller. The wrapper never touches the in-memory session:
//! reacting to an expired token is up to whoever observes the error.

use super::{
    config::{AppConfig, build_url_with_base},
    errors::{AppError, FieldError},
};
use crate::{
    APP_USER_AGENT,
    storage::{KeyValueStore, TOKEN_KEY},
};
use reqwest::{Client, Response, StatusCode, header};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::sync::Arc;
use tracing::{Instrument, debug, info_span, warn};

/// Maximum number of error body characters kept for diagnostics.
const MAX_ERROR_CHARS: usize = 200;

/// Uniform response envelope: `{success, data?, error?}`.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    #[serde(default = "default_success")]
    success: bool,
    data: Option<T>,
    error: Option<ApiErrorBody>,
    // some endpoints report failures as a bare top-level message
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    message: Option<String>,
    status_code: Option<u16>,
    #[serde(default)]
    errors: Vec<FieldError>,
}

const fn default_success() -> bool {
    true
}

pub struct ApiClient<S> {
    http: Client,
    base_url: String,
    store: Arc<S>,
}

impl<S: KeyValueStore> ApiClient<S> {
    /// Builds a client for the configured backend that reads its bearer token
    /// from `store`.
    ///
    /// # Errors
    /// Returns `AppError::Config` if the HTTP client cannot be initialized.
    pub fn new(config: &AppConfig, store: Arc<S>) -> Result<Self, AppError> {
        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|err| AppError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
            store,
        })
    }

    /// Store shared with the session coordinator.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Posts JSON and returns the envelope's `data` payload.
    ///
    /// # Errors
    /// Returns an `AppError` for transport failures, non-success statuses, or a
    /// response without the expected payload.
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        self.post_json_optional(path, body)
            .await?
            .ok_or_else(|| AppError::Parse("Response is missing its data payload.".to_string()))
    }

    /// Posts JSON and returns the envelope's `data` payload when present.
    ///
    /// # Errors
    /// Returns an `AppError` for transport failures or non-success statuses.
    pub async fn post_json_optional<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Option<T>, AppError> {
        let response = self.send(path, body).await?;
        handle_json_response(response).await
    }

    /// Posts JSON and discards any payload.
    ///
    /// # Errors
    /// Returns an `AppError` for transport failures or non-success statuses.
    pub async fn post_empty<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), AppError> {
        let response = self.send(path, body).await?;
        handle_empty_response(response).await
    }

    async fn send<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Response, AppError> {
        let url = build_url_with_base(&self.base_url, path);
        let payload = serde_json::to_vec(body)
            .map_err(|err| AppError::Serialization(format!("Failed to encode request: {err}")))?;

        let mut request = self
            .http
            .post(&url)
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload);

        let token = self.bearer_token().await;
        if let Some(token) = &token {
            request = request.bearer_auth(token.expose_secret());
        }

        let span = info_span!(
            "api.request",
            http.method = "POST",
            url = %url,
            authenticated = token.is_some()
        );
        let response = request
            .send()
            .instrument(span)
            .await
            .map_err(map_request_error)?;

        debug!("{} answered {}", url, response.status());

        if response.status() == StatusCode::UNAUTHORIZED {
            self.invalidate_token().await;
        }

        Ok(response)
    }

    /// Reads the persisted token; a failing store means the request goes out
    /// unauthenticated.
    async fn bearer_token(&self) -> Option<SecretString> {
        match self.store.get(TOKEN_KEY).await {
            Ok(Some(token)) if !token.trim().is_empty() => Some(SecretString::from(token)),
            Ok(_) => None,
            Err(err) => {
                warn!("Failed to read stored token: {}", err);
                None
            }
        }
    }

    async fn invalidate_token(&self) {
        debug!("received 401, deleting stored token");
        if let Err(err) = self.store.delete(TOKEN_KEY).await {
            warn!("Failed to delete stored token after 401: {}", err);
        }
    }
}

/// Maps transport errors into `AppError` variants with timeout detection.
fn map_request_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        AppError::Timeout("Request timed out. Please try again.".to_string())
    } else if err.is_builder() {
        AppError::Serialization(format!("Failed to build request: {err}"))
    } else {
        AppError::Network(format!("Unable to reach the server: {err}"))
    }
}

fn is_passthrough(status: StatusCode) -> bool {
    status.is_success() || status.is_redirection()
}

async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<Option<T>, AppError> {
    let status = response.status();
    if !is_passthrough(status) {
        return Err(error_from_response(response).await);
    }

    let body = response.text().await.map_err(map_request_error)?;
    if body.trim().is_empty() {
        return Ok(None);
    }

    let envelope: ApiEnvelope<T> = serde_json::from_str(&body)
        .map_err(|err| AppError::Parse(format!("Failed to decode response: {err}")))?;

    if envelope.success {
        Ok(envelope.data)
    } else {
        Err(error_from_envelope(status.as_u16(), envelope.error, envelope.message))
    }
}

async fn handle_empty_response(response: Response) -> Result<(), AppError> {
    if is_passthrough(response.status()) {
        Ok(())
    } else {
        Err(error_from_response(response).await)
    }
}

async fn error_from_response(response: Response) -> AppError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    match serde_json::from_str::<ApiEnvelope<serde_json::Value>>(&body) {
        Ok(envelope) => error_from_envelope(status, envelope.error, envelope.message),
        Err(_) => {
            debug!("non-JSON error body ({}): {}", status, sanitize_body(&body));
            AppError::Http {
                status,
                message: None,
                errors: Vec::new(),
            }
        }
    }
}

fn error_from_envelope(status: u16, error: Option<ApiErrorBody>, message: Option<String>) -> AppError {
    let error = error.unwrap_or_default();
    if let Some(reported) = error.status_code
        && reported != status
    {
        debug!("envelope status {} differs from HTTP status {}", reported, status);
    }

    AppError::Http {
        status,
        message: error
            .message
            .or(message)
            .map(|message| sanitize_body(&message))
            .filter(|message| !message.is_empty()),
        errors: error.errors,
    }
}

/// Trims and truncates bodies before they reach logs or messages.
fn sanitize_body(body: &str) -> String {
    body.trim().chars().take(MAX_ERROR_CHARS).collect()
}
