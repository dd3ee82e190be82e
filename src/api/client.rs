//! The four remote operations and their HTTP implementation.

use std::future::Future;

use http::HeaderValue;
use http::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;
use uuid::Uuid;

use super::envelope::{DataEnvelope, ErrorEnvelope};
use super::{
    BuildError, CallbackHistoryList, CallbackRequestEvent, CallbackServiceEventConfirmation,
    ClientError, Event, EventList,
};
use crate::time::{Sleeper, TokioSleeper};
use crate::transport::{ApiRequest, Executor, HttpClient, RequestBody, Retrier, RetryPolicy};

/// Operations offered by the callback service.
///
/// Implemented over HTTP by [`CallbackClient`] and in-process by
/// [`MockCallbackClient`](crate::mock::MockCallbackClient).
///
/// Filters are pre-encoded query strings passed through untouched; an empty
/// filter selects everything.
pub trait CallbackApi: Send + Sync {
    /// Submits an event for asynchronous delivery.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] without sending anything if the
    /// request fails local checks.
    fn submit_event(
        &self,
        request: &CallbackRequestEvent,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<CallbackServiceEventConfirmation, ClientError>> + Send;

    /// Fetches one event by id.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the event is unknown or the request fails.
    fn fetch_event(
        &self,
        event_id: Uuid,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<Event, ClientError>> + Send;

    /// Lists events matching `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails.
    fn list_events(
        &self,
        filter: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<EventList, ClientError>> + Send;

    /// Lists the delivery attempts of one event.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the event is unknown or the request fails.
    fn fetch_callback_history(
        &self,
        event_id: Uuid,
        filter: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<CallbackHistoryList, ClientError>> + Send;
}

/// HTTP client for the callback service.
///
/// Every operation goes through the same pipeline: build an [`ApiRequest`]
/// carrying the service secret, then let the [`Retrier`] drive single
/// attempts on the [`Executor`]. Structured errors and transport failures
/// are both retried; validation errors and cancellation are not.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `S`: The sleeper used between retries (defaults to [`TokioSleeper`])
///
/// # Example
///
/// ```
/// use callback_client::api::CallbackClient;
/// use callback_client::transport::{ReqwestClient, RetryPolicy};
/// use url::Url;
///
/// let client = CallbackClient::new(
///     ReqwestClient::new(),
///     Url::parse("https://callbacks.example.com").unwrap(),
///     "service-secret",
/// )
/// .unwrap()
/// .with_retry_policy(RetryPolicy::new().with_max_attempts(5));
/// ```
#[derive(Debug, Clone)]
pub struct CallbackClient<H, S = TokioSleeper> {
    base_url: Url,
    authorization: HeaderValue,
    executor: Executor<H>,
    retrier: Retrier<S>,
}

impl<H: HttpClient> CallbackClient<H, TokioSleeper> {
    /// Creates a client for the service at `base_url`, authenticating with
    /// `secret`.
    ///
    /// # Errors
    ///
    /// - [`BuildError::InvalidBaseUrl`] if the URL is not http(s) or cannot
    ///   take path segments
    /// - [`BuildError::InvalidSecret`] if the secret cannot be sent as a
    ///   header value
    pub fn new(http: H, base_url: Url, secret: &str) -> Result<Self, BuildError> {
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(BuildError::InvalidBaseUrl(base_url.to_string()));
        }

        let mut authorization =
            HeaderValue::from_str(secret).map_err(|_| BuildError::InvalidSecret)?;
        authorization.set_sensitive(true);

        Ok(Self {
            base_url,
            authorization,
            executor: Executor::new(http),
            retrier: Retrier::new(RetryPolicy::default()),
        })
    }
}

impl<H, S> CallbackClient<H, S> {
    /// Sets the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retrier = self.retrier.with_policy(policy);
        self
    }

    /// Sets a custom sleeper for retry delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> CallbackClient<H, S2> {
        CallbackClient {
            base_url: self.base_url,
            authorization: self.authorization,
            executor: self.executor,
            retrier: self.retrier.with_sleeper(sleeper),
        }
    }

    /// Returns the service base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the configured retry policy.
    #[must_use]
    pub const fn retry_policy(&self) -> &RetryPolicy {
        self.retrier.policy()
    }

    /// Joins `segments` onto the base path and attaches `filter` as the raw
    /// query. An empty filter leaves the URL without a query.
    fn endpoint(&self, segments: &[&str], filter: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }

        let filter = filter.strip_prefix('?').unwrap_or(filter);
        url.set_query((!filter.is_empty()).then_some(filter));
        url
    }
}

impl<H: HttpClient, S: Sleeper> CallbackClient<H, S> {
    async fn call<T>(&self, request: ApiRequest, cancel: &CancellationToken) -> Result<T, ClientError>
    where
        T: DeserializeOwned + Send,
    {
        let request = request.with_header(AUTHORIZATION, self.authorization.clone());

        self.retrier
            .run(cancel, || async {
                self.executor
                    .execute::<T, ErrorEnvelope>(&request)
                    .await
                    .map_err(ClientError::from)
            })
            .await
    }
}

impl<H: HttpClient, S: Sleeper> CallbackApi for CallbackClient<H, S> {
    async fn submit_event(
        &self,
        request: &CallbackRequestEvent,
        cancel: &CancellationToken,
    ) -> Result<CallbackServiceEventConfirmation, ClientError> {
        request.validate()?;

        let url = self.endpoint(&["v1", "send_callback"], "");
        let call = ApiRequest::new(http::Method::POST, url).with_body(RequestBody::json(request)?);

        tracing::debug!(callback_url = %request.callback_url, "Submitting callback event");
        let envelope: DataEnvelope<CallbackServiceEventConfirmation> = self.call(call, cancel).await?;
        Ok(envelope.data)
    }

    async fn fetch_event(
        &self,
        event_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Event, ClientError> {
        let id = event_id.to_string();
        let url = self.endpoint(&["v1", "event", &id], "");

        let envelope: DataEnvelope<Event> = self
            .call(ApiRequest::new(http::Method::POST, url), cancel)
            .await?;
        Ok(envelope.data)
    }

    async fn list_events(
        &self,
        filter: &str,
        cancel: &CancellationToken,
    ) -> Result<EventList, ClientError> {
        let url = self.endpoint(&["v1", "events"], filter);
        self.call(ApiRequest::new(http::Method::GET, url), cancel).await
    }

    async fn fetch_callback_history(
        &self,
        event_id: Uuid,
        filter: &str,
        cancel: &CancellationToken,
    ) -> Result<CallbackHistoryList, ClientError> {
        let id = event_id.to_string();
        let url = self.endpoint(&["v1", "callback_history", &id], filter);
        self.call(ApiRequest::new(http::Method::GET, url), cancel).await
    }
}
