//! Single-attempt request execution.

use http::header::{ACCEPT, CONTENT_TYPE, HeaderName, HeaderValue};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{ExecuteError, HttpClient, HttpRequest, TransportError};

const JSON_CONTENT_TYPE: &str = "application/json";

/// Body of an outbound API call.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Serialized as JSON when the request is built.
    Json(serde_json::Value),
    /// Sent exactly as given.
    Raw(Vec<u8>),
}

impl RequestBody {
    /// Captures any serializable value as a JSON body.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Encode`] if the value cannot be represented
    /// as JSON (for example, a map with non-string keys).
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, TransportError> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(TransportError::Encode)
    }

    fn encode(&self) -> Result<Vec<u8>, TransportError> {
        match self {
            Self::Json(value) => serde_json::to_vec(value).map_err(TransportError::Encode),
            Self::Raw(bytes) => Ok(bytes.clone()),
        }
    }
}

/// Description of one API call, reusable across retry attempts.
///
/// `headers` are overrides: they are applied after the default
/// `Content-Type` and `Accept` headers and replace them on a name clash.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// HTTP method
    pub method: http::Method,
    /// Absolute target URL
    pub url: url::Url,
    /// Header overrides
    pub headers: http::HeaderMap,
    /// Optional body
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    /// Creates a call with no header overrides and no body.
    #[must_use]
    pub fn new(method: http::Method, url: url::Url) -> Self {
        Self {
            method,
            url,
            headers: http::HeaderMap::new(),
            body: None,
        }
    }

    /// Adds a header override.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Encodes the call into a wire-level request.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Encode`] if a JSON body fails to serialize.
    pub fn to_http_request(&self) -> Result<HttpRequest, TransportError> {
        let mut request = HttpRequest::new(self.method.clone(), self.url.clone())
            .with_header(CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))
            .with_header(ACCEPT, HeaderValue::from_static(JSON_CONTENT_TYPE));

        for (name, value) in &self.headers {
            request.headers.insert(name, value.clone());
        }

        if let Some(body) = &self.body {
            request.body = Some(body.encode()?);
        }

        Ok(request)
    }
}

/// Performs exactly one round trip per call and decodes the outcome.
///
/// A 2xx body is decoded as the success shape `T`; any other status is
/// decoded as the error shape `E` and returned as
/// [`ExecuteError::RequestFailed`]. The executor neither retries nor
/// interprets the decoded values.
#[derive(Debug, Clone)]
pub struct Executor<H> {
    client: H,
}

impl<H: HttpClient> Executor<H> {
    /// Creates an executor over the given transport.
    #[must_use]
    pub const fn new(client: H) -> Self {
        Self { client }
    }

    /// Sends `call` once and decodes the response.
    ///
    /// # Errors
    ///
    /// - [`ExecuteError::RequestFailed`] for a non-2xx status whose body
    ///   decodes as `E`
    /// - [`ExecuteError::Transport`] for encode, network, body-read or
    ///   decode failures
    pub async fn execute<T, E>(&self, call: &ApiRequest) -> Result<T, ExecuteError<E>>
    where
        T: DeserializeOwned,
        E: DeserializeOwned,
    {
        let request = call.to_http_request()?;
        let response = self.client.request(request).await?;

        tracing::trace!(
            method = %call.method,
            url = %call.url,
            status = %response.status,
            bytes = response.body.len(),
            "Round trip complete"
        );

        let status = response.status;
        if response.is_success() {
            return serde_json::from_slice(&response.body)
                .map_err(|source| TransportError::Decode { status, source }.into());
        }

        match serde_json::from_slice(&response.body) {
            Ok(error) => Err(ExecuteError::RequestFailed { status, error }),
            Err(source) => Err(TransportError::Decode { status, source }.into()),
        }
    }
}
