//! An HTTP client for Flipt's REST evaluation API.
use std::{sync::Arc, time::Duration};

use reqwest::{
    blocking::Client,
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    StatusCode, Url,
};
use serde::{de::DeserializeOwned, Deserialize};

use crate::{
    service::{
        BooleanEvaluationResponse, EvaluationRequest, EvaluationService, ServiceBuilder,
        VariantEvaluationResponse,
    },
    ServiceError,
};

const BOOLEAN_ENDPOINT: &str = "evaluate/v1/boolean";
const VARIANT_ENDPOINT: &str = "evaluate/v1/variant";

/// Configuration of the HTTP evaluation client.
///
/// The client itself is only built when the provider is initialized.
///
/// # Examples
/// ```
/// # use std::time::Duration;
/// # use flipt_provider::HttpClientConfig;
/// let config = HttpClientConfig::new("http://localhost:8080")
///     .client_token("secret")
///     .timeout(Duration::from_secs(5));
/// ```
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub(crate) base_url: String,
    pub(crate) client_token: Option<String>,
    pub(crate) timeout: Option<Duration>,
}

impl HttpClientConfig {
    /// Default base URL of a local Flipt server.
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8080";

    /// Create a configuration pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        HttpClientConfig {
            base_url: base_url.into(),
            client_token: None,
            timeout: None,
        }
    }

    /// Authenticate requests with a Flipt client token.
    pub fn client_token(mut self, client_token: impl Into<String>) -> Self {
        self.client_token = Some(client_token.into());
        self
    }

    /// Bound every request to `timeout`. Requests are unbounded by default.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        HttpClientConfig::new(HttpClientConfig::DEFAULT_BASE_URL)
    }
}

impl ServiceBuilder for HttpClientConfig {
    fn build(&self) -> Result<Arc<dyn EvaluationService + Send + Sync>, ServiceError> {
        Ok(Arc::new(HttpEvaluationService::new(self)?))
    }
}

/// [`EvaluationService`] backed by Flipt's REST API.
pub struct HttpEvaluationService {
    // Client holds a connection pool internally, so we're reusing the client between requests.
    client: Client,
    boolean_url: Url,
    variant_url: Url,
}

impl HttpEvaluationService {
    /// Build a client from `config`, validating the base URL.
    pub fn new(config: &HttpClientConfig) -> Result<Self, ServiceError> {
        // Url::join replaces the last path segment unless the base ends with a slash.
        let base_url = match config.base_url.ends_with('/') {
            true => Url::parse(&config.base_url),
            false => Url::parse(&format!("{}/", config.base_url)),
        };
        let base_url = base_url.map_err(ServiceError::InvalidBaseUrl)?;

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.client_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|err| ServiceError::Other(format!("invalid client token: {err}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(HttpEvaluationService {
            client: builder.build()?,
            boolean_url: base_url
                .join(BOOLEAN_ENDPOINT)
                .map_err(ServiceError::InvalidBaseUrl)?,
            variant_url: base_url
                .join(VARIANT_ENDPOINT)
                .map_err(ServiceError::InvalidBaseUrl)?,
        })
    }

    fn post<T: DeserializeOwned>(
        &self,
        url: &Url,
        request: &EvaluationRequest,
    ) -> Result<T, ServiceError> {
        log::trace!(target: "flipt", url:display, request:serde; "sending evaluation request");
        let response = self.client.post(url.clone()).json(request).send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_else(|err| {
                log::warn!(target: "flipt", error:display = err; "failed to read error response body");
                String::new()
            });
            log::warn!(target: "flipt", url:display, status:display; "received non-success response from Flipt");
            return Err(ServiceError::Status {
                status: status.as_u16(),
                message: error_message(status, body),
            });
        }

        Ok(response.json()?)
    }
}

impl EvaluationService for HttpEvaluationService {
    fn boolean(
        &self,
        request: &EvaluationRequest,
    ) -> Result<BooleanEvaluationResponse, ServiceError> {
        self.post(&self.boolean_url, request)
    }

    fn variant(
        &self,
        request: &EvaluationRequest,
    ) -> Result<VariantEvaluationResponse, ServiceError> {
        self.post(&self.variant_url, request)
    }
}

/// Error body returned by Flipt, e.g. `{"code": 5, "message": "flag not found"}`.
#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// The server's `message`, the raw body, or the status reason when the body is empty.
fn error_message(status: StatusCode, body: String) -> String {
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody { message }) => message,
        Err(_) => body,
    };
    if !message.trim().is_empty() {
        return message;
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_owned()
}
