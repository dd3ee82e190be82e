//! Data types exchanged with the callback service.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use super::ValidationError;

/// Free-form event data delivered to the callback URL.
pub type Payload = serde_json::Map<String, serde_json::Value>;

/// Lifecycle state of a service, event or delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    Pending,
    Active,
    Inactive,
    Failed,
    Succeeded,
    Processing,
}

impl Status {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
            Self::Failed => "FAILED",
            Self::Succeeded => "SUCCEEDED",
            Self::Processing => "PROCESSING",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP method used when delivering a callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Method {
    #[default]
    Post,
    Get,
    Put,
    Patch,
    Delete,
}

impl Method {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Converts to the `http` crate representation.
    #[must_use]
    pub fn to_http(self) -> http::Method {
        match self {
            Self::Post => http::Method::POST,
            Self::Get => http::Method::GET,
            Self::Put => http::Method::PUT,
            Self::Patch => http::Method::PATCH,
            Self::Delete => http::Method::DELETE,
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = ValidationError;

    /// Parses a method name, ignoring ASCII case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [Self::Post, Self::Get, Self::Put, Self::Patch, Self::Delete]
            .into_iter()
            .find(|method| method.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ValidationError::InvalidMethod(s.to_string()))
    }
}

/// Summary of the service that owns an event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    /// Service identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Lifecycle status, when reported.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    /// Service credential. Usually omitted by the server.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub secret_token: String,
    /// When the service was registered.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// A callback delivery obligation and its current state.
///
/// Created with status [`Status::Active`] on submission. Each delivery
/// attempt moves it to [`Status::Succeeded`] or [`Status::Failed`] and
/// increments `retry_count`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier, equal to the acknowledgement id.
    pub id: Uuid,
    /// Owning service.
    #[serde(default)]
    pub service_id: Uuid,
    /// Embedded owner summary.
    #[serde(default)]
    pub service: Service,
    /// JSON object delivered to the callback URL.
    #[serde(default)]
    pub payload: Payload,
    /// Where the payload is delivered.
    #[serde(default)]
    pub callback_url: String,
    /// Key for the `X-MP-SIGNATURE` tag.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub webhook_secret: String,
    /// HTTP method used for delivery.
    #[serde(default)]
    pub method: Method,
    /// Current delivery state.
    pub status: Status,
    /// Delivery attempts the service may make.
    #[serde(default)]
    pub max_retries: i64,
    /// Attempts made so far.
    #[serde(default)]
    pub retry_count: i64,
    /// Scheduled time of the next attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_retry_at: Option<DateTime<Utc>>,
    /// Status code of the latest attempt, 0 if the receiver was unreachable.
    #[serde(default)]
    pub last_response_code: i64,
    /// Why the latest attempt failed.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason_failed: String,
    /// Submission time.
    pub created_at: DateTime<Utc>,
    /// Time of the latest state change.
    pub updated_at: DateTime<Utc>,
}

/// One recorded delivery attempt of an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallbackHistory {
    /// Attempt identifier.
    pub id: Uuid,
    /// Snapshot of the event at the time of the attempt.
    pub event: Event,
    /// Outcome of this attempt.
    pub status: Status,
    /// Receiver status code, or 0 when no response arrived.
    #[serde(default)]
    pub response_code: i64,
    /// Failure detail for unsuccessful attempts.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason_failed: String,
    /// When the attempt was made.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

/// Pagination and filter information returned with list responses.
///
/// Filter and paging parameters echoed by the server are kept verbatim in
/// `params`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetaData {
    /// Number of matching records across all pages.
    #[serde(default)]
    pub total: u64,
    /// Server-specific extras.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<serde_json::Value>,
    /// Echoed filter and paging parameters.
    #[serde(flatten)]
    pub params: serde_json::Map<String, serde_json::Value>,
}

/// A page of events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventList {
    /// Events on this page.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<Event>,
    /// Paging information.
    #[serde(default)]
    pub meta_data: MetaData,
}

/// A page of delivery attempts for one event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallbackHistoryList {
    /// Attempts on this page.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub data: Vec<CallbackHistory>,
    /// Paging information.
    #[serde(default)]
    pub meta_data: MetaData,
}

/// Acknowledgement returned when an event is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackServiceEventConfirmation {
    /// Id of the created event.
    pub acknowledgement_id: Uuid,
}

/// A request to deliver `payload` to `callback_url`.
///
/// `service_id` is never serialized: the service identifies the caller from
/// the `Authorization` header. It is still checked before submission.
///
/// # Example
///
/// ```
/// use callback_client::api::{CallbackRequestEvent, Method};
/// use uuid::Uuid;
///
/// let mut payload = serde_json::Map::new();
/// payload.insert("event".into(), "payment_success".into());
///
/// let request = CallbackRequestEvent::new(
///     Uuid::new_v4(),
///     payload,
///     "https://merchant.example.com/callback",
///     "whsec",
/// )
/// .with_method(Method::Put)
/// .with_max_retries(5);
///
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallbackRequestEvent {
    /// Submitting service. Checked locally, never sent.
    #[serde(skip)]
    pub service_id: Uuid,
    /// JSON object to deliver.
    #[serde(default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub payload: Payload,
    /// Absolute http(s) URL of the receiver.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub callback_url: String,
    /// Key the receiver uses to verify deliveries.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub webhook_secret: String,
    /// Delivery method name. Empty means POST.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    /// Retry limit for the service. 0 leaves it to the server.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub max_retries: i64,
}

impl CallbackRequestEvent {
    /// Creates a request with the default method and no retry limit.
    #[must_use]
    pub fn new(
        service_id: Uuid,
        payload: Payload,
        callback_url: impl Into<String>,
        webhook_secret: impl Into<String>,
    ) -> Self {
        Self {
            service_id,
            payload,
            callback_url: callback_url.into(),
            webhook_secret: webhook_secret.into(),
            method: String::new(),
            max_retries: 0,
        }
    }

    /// Sets the delivery method.
    #[must_use]
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method.to_string();
        self
    }

    /// Sets how many times the service may retry delivery.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: i64) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Returns the delivery method, defaulting to POST when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidMethod`] for an unknown method name.
    pub fn delivery_method(&self) -> Result<Method, ValidationError> {
        if self.method.is_empty() {
            Ok(Method::default())
        } else {
            self.method.parse()
        }
    }

    /// Checks the request before anything is sent.
    ///
    /// # Errors
    ///
    /// Returns the first failing rule, checked in field order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.service_id.is_nil() {
            return Err(ValidationError::MissingServiceId);
        }
        if self.payload.is_empty() {
            return Err(ValidationError::EmptyPayload);
        }
        validate_callback_url(&self.callback_url)?;
        if self.webhook_secret.is_empty() {
            return Err(ValidationError::MissingWebhookSecret);
        }
        self.delivery_method().map(|_| ())
    }
}

fn validate_callback_url(raw: &str) -> Result<(), ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::MissingCallbackUrl);
    }

    let invalid = |reason: &str| ValidationError::InvalidCallbackUrl {
        url: raw.to_string(),
        reason: reason.to_string(),
    };

    let url = url::Url::parse(raw).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(invalid("missing host"));
    }
    Ok(())
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_zero(value: &i64) -> bool {
    *value == 0
}

/// Treats an explicit `null` list as empty.
pub(super) fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}
