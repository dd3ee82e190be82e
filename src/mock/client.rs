//! `CallbackApi` implementation that delivers callbacks itself.

use http::HeaderValue;
use http::header::CONTENT_TYPE;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::store::{EventStore, Outcome};
use crate::api::{
    CallbackApi, CallbackHistoryList, CallbackRequestEvent, CallbackServiceEventConfirmation,
    ClientError, Event, EventList, MetaData, Service, ServiceError, Status,
};
use crate::receiver::{SIGNATURE_HEADER, TIMESTAMP_HEADER};
use crate::signature::SignedPayload;
use crate::time::{Clock, SystemClock};
use crate::transport::{HttpClient, HttpError, HttpRequest, HttpResponse, TransportError};

/// In-process stand-in for the callback service.
///
/// Submissions are delivered immediately, once, to the event's callback URL
/// through the injected [`HttpClient`], signed exactly as the real service
/// signs them. Every attempt is recorded and can be read back through the
/// query operations.
///
/// Filters are accepted but not applied.
///
/// # Type Parameters
///
/// - `H`: The HTTP client used for delivery
/// - `C`: The clock used for timestamps and signatures (defaults to [`SystemClock`])
#[derive(Debug)]
pub struct MockCallbackClient<H, C = SystemClock> {
    http: H,
    clock: C,
    service: Service,
    store: EventStore,
}

impl<H> MockCallbackClient<H, SystemClock> {
    /// Creates an empty backend owned by a fresh active service.
    #[must_use]
    pub fn new(http: H) -> Self {
        let clock = SystemClock;
        let now = clock.now();

        Self {
            http,
            clock,
            service: Service {
                id: Uuid::new_v4(),
                name: "mock".to_string(),
                status: Some(Status::Active),
                secret_token: String::new(),
                created_at: now,
                updated_at: now,
            },
            store: EventStore::default(),
        }
    }
}

impl<H, C> MockCallbackClient<H, C> {
    /// Replaces the clock.
    #[must_use]
    pub fn with_clock<C2>(self, clock: C2) -> MockCallbackClient<H, C2> {
        MockCallbackClient {
            http: self.http,
            clock,
            service: self.service,
            store: self.store,
        }
    }

    /// Returns the service that owns every stored event.
    #[must_use]
    pub const fn service(&self) -> &Service {
        &self.service
    }
}

impl<H: HttpClient, C: Clock> MockCallbackClient<H, C> {
    fn create_event(&self, request: &CallbackRequestEvent) -> Result<Event, ClientError> {
        let now = self.clock.now();

        Ok(Event {
            id: Uuid::new_v4(),
            service_id: request.service_id,
            service: self.service.clone(),
            payload: request.payload.clone(),
            callback_url: request.callback_url.clone(),
            webhook_secret: request.webhook_secret.clone(),
            method: request.delivery_method()?,
            status: Status::Active,
            max_retries: request.max_retries,
            retry_count: 0,
            next_retry_at: None,
            last_response_code: 0,
            reason_failed: String::new(),
            created_at: now,
            updated_at: now,
        })
    }

    fn delivery_request(&self, event: &Event) -> Result<HttpRequest, ClientError> {
        let url = url::Url::parse(&event.callback_url)
            .map_err(|e| TransportError::from(HttpError::InvalidUrl(e.to_string())))?;
        let body = serde_json::to_vec(&event.payload).map_err(TransportError::Encode)?;
        let signed = SignedPayload::new(&event.webhook_secret, &body, &self.clock);

        let mut request = HttpRequest::new(event.method.to_http(), url)
            .with_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .with_body(body);
        request
            .headers
            .insert(SIGNATURE_HEADER, hex_header(&signed.signature));
        request
            .headers
            .insert(TIMESTAMP_HEADER, HeaderValue::from(signed.timestamp));
        Ok(request)
    }

    fn settle(
        &self,
        event_id: Uuid,
        delivery: Result<HttpResponse, HttpError>,
    ) -> Result<CallbackServiceEventConfirmation, ClientError> {
        let now = self.clock.now();

        match delivery {
            Err(e) => {
                tracing::warn!(%event_id, "Callback delivery failed: {e}");
                self.store.record(
                    event_id,
                    Outcome::Unreachable {
                        reason: e.to_string(),
                    },
                    now,
                );
                Err(TransportError::from(e).into())
            }
            Ok(response) if response.status != http::StatusCode::OK => {
                let code = i64::from(response.status.as_u16());
                let reason = format!("webhook rejected by service with statuscode {code}");
                tracing::warn!(%event_id, "{reason}");
                self.store.record(
                    event_id,
                    Outcome::Rejected {
                        response_code: code,
                        reason: reason.clone(),
                    },
                    now,
                );
                Err(ClientError::Service {
                    status: response.status,
                    error: ServiceError::new(code, reason)
                        .with_description(response.body_text().unwrap_or_default()),
                })
            }
            Ok(response) => {
                tracing::info!(%event_id, "Callback delivered");
                self.store.record(
                    event_id,
                    Outcome::Delivered {
                        response_code: i64::from(response.status.as_u16()),
                    },
                    now,
                );
                Ok(CallbackServiceEventConfirmation {
                    acknowledgement_id: event_id,
                })
            }
        }
    }
}

impl<H: HttpClient, C: Clock> CallbackApi for MockCallbackClient<H, C> {
    async fn submit_event(
        &self,
        request: &CallbackRequestEvent,
        cancel: &CancellationToken,
    ) -> Result<CallbackServiceEventConfirmation, ClientError> {
        request.validate()?;
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        let event = self.create_event(request)?;
        let event_id = event.id;
        let outbound = self.delivery_request(&event)?;
        self.store.insert(event);

        let delivery = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::warn!(%event_id, "Callback delivery cancelled");
                self.store.record(
                    event_id,
                    Outcome::Unreachable {
                        reason: "delivery cancelled".to_string(),
                    },
                    self.clock.now(),
                );
                return Err(ClientError::Cancelled);
            }
            response = self.http.request(outbound) => response,
        };

        self.settle(event_id, delivery)
    }

    async fn fetch_event(
        &self,
        event_id: Uuid,
        cancel: &CancellationToken,
    ) -> Result<Event, ClientError> {
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        self.store
            .get(event_id)
            .ok_or_else(|| not_found(format!("event {event_id} not found")))
    }

    async fn list_events(
        &self,
        _filter: &str,
        cancel: &CancellationToken,
    ) -> Result<EventList, ClientError> {
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        let data = self.store.all();
        Ok(EventList {
            meta_data: MetaData {
                total: data.len() as u64,
                ..MetaData::default()
            },
            data,
        })
    }

    async fn fetch_callback_history(
        &self,
        event_id: Uuid,
        _filter: &str,
        cancel: &CancellationToken,
    ) -> Result<CallbackHistoryList, ClientError> {
        if cancel.is_cancelled() {
            return Err(ClientError::Cancelled);
        }

        let data = self.store.history(event_id).ok_or_else(|| {
            not_found(format!("callback history with eventID {event_id} not found"))
        })?;
        Ok(CallbackHistoryList {
            meta_data: MetaData {
                total: data.len() as u64,
                ..MetaData::default()
            },
            data,
        })
    }
}

fn not_found(message: String) -> ClientError {
    ClientError::Service {
        status: http::StatusCode::NOT_FOUND,
        error: ServiceError::new(404, message),
    }
}

// Hex digits are always legal header bytes.
fn hex_header(tag: &str) -> HeaderValue {
    HeaderValue::from_str(tag).unwrap_or_else(|_| HeaderValue::from_static(""))
}
