//! Tests for `MockCallbackClient`.

use super::MockCallbackClient;
use crate::api::{
    CallbackApi, CallbackRequestEvent, ClientError, Method, Payload, Status, ValidationError,
};
use crate::receiver::{SIGNATURE_HEADER, TIMESTAMP_HEADER, verify_request};
use crate::time::Clock;
use crate::transport::testing::ScriptedClient;
use crate::transport::{HttpError, HttpResponse, TransportError};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

const WEBHOOK_SECRET: &str = "test webhook secret key";
const CALLBACK_URL: &str = "https://merchant.example.com/v1/callback";

struct FixedClock(DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

fn fixed_time() -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap()
}

type TestBackend = MockCallbackClient<Arc<ScriptedClient>, FixedClock>;

fn backend(http: &Arc<ScriptedClient>) -> TestBackend {
    MockCallbackClient::new(http.clone()).with_clock(FixedClock(fixed_time()))
}

fn accepting() -> Arc<ScriptedClient> {
    Arc::new(ScriptedClient::always(http::StatusCode::OK, &json!({})))
}

fn request() -> CallbackRequestEvent {
    let mut payload = Payload::new();
    payload.insert("event".to_string(), json!("payment_success"));
    payload.insert("amount".to_string(), json!(1250));
    CallbackRequestEvent::new(Uuid::new_v4(), payload, CALLBACK_URL, WEBHOOK_SECRET)
}

mod delivery {
    use super::*;

    #[tokio::test]
    async fn delivers_signed_payload_to_callback_url() {
        let http = accepting();
        let request = request();

        backend(&http)
            .submit_event(&request, &CancellationToken::new())
            .await
            .unwrap();

        let sent = &http.captured_requests()[0];
        assert_eq!(sent.method, http::Method::POST);
        assert_eq!(sent.url.as_str(), CALLBACK_URL);
        assert_eq!(sent.header_str("content-type"), Some("application/json"));
        assert_eq!(sent.header_str(TIMESTAMP_HEADER), Some("1700000000"));
        assert!(sent.header_str(SIGNATURE_HEADER).is_some());

        let body = sent.body.as_deref().unwrap();
        assert_eq!(
            serde_json::from_slice::<serde_json::Value>(body).unwrap(),
            json!({"event": "payment_success", "amount": 1250})
        );
        assert_eq!(verify_request(WEBHOOK_SECRET, &sent.headers, body), Ok(body));
    }

    #[tokio::test]
    async fn uses_requested_method() {
        let http = accepting();

        backend(&http)
            .submit_event(&request().with_method(Method::Put), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(http.captured_requests()[0].method, http::Method::PUT);
    }

    #[tokio::test]
    async fn success_marks_event_succeeded() {
        let http = accepting();
        let backend = backend(&http);
        let cancel = CancellationToken::new();

        let ack = backend.submit_event(&request(), &cancel).await.unwrap();
        let event = backend.fetch_event(ack.acknowledgement_id, &cancel).await.unwrap();

        assert_eq!(event.id, ack.acknowledgement_id);
        assert_eq!(event.status, Status::Succeeded);
        assert_eq!(event.retry_count, 1);
        assert_eq!(event.last_response_code, 200);
        assert_eq!(event.created_at, fixed_time());
        assert_eq!(event.service.id, backend.service().id);
    }

    #[tokio::test]
    async fn success_is_recorded_in_history() {
        let http = accepting();
        let backend = backend(&http);
        let cancel = CancellationToken::new();

        let ack = backend.submit_event(&request(), &cancel).await.unwrap();
        let history = backend
            .fetch_callback_history(ack.acknowledgement_id, "", &cancel)
            .await
            .unwrap();

        assert_eq!(history.data.len(), 1);
        assert_eq!(history.meta_data.total, 1);
        assert_eq!(history.data[0].status, Status::Succeeded);
        assert_eq!(history.data[0].response_code, 200);
        assert_eq!(history.data[0].event.id, ack.acknowledgement_id);
    }

    #[tokio::test]
    async fn rejected_delivery_is_a_service_error() {
        let http = Arc::new(ScriptedClient::always(
            http::StatusCode::INTERNAL_SERVER_ERROR,
            &json!({"error": "down"}),
        ));
        let backend = backend(&http);
        let cancel = CancellationToken::new();

        let result = backend.submit_event(&request(), &cancel).await;

        let error = result.unwrap_err();
        assert_eq!(error.status(), Some(http::StatusCode::INTERNAL_SERVER_ERROR));
        let service_error = error.service_error().unwrap();
        assert_eq!(service_error.code, 500);
        assert_eq!(
            service_error.message,
            "webhook rejected by service with statuscode 500"
        );

        let events = backend.list_events("", &cancel).await.unwrap();
        let event = &events.data[0];
        assert_eq!(event.status, Status::Failed);
        assert_eq!(event.retry_count, 1);
        assert_eq!(event.last_response_code, 500);
        assert_eq!(event.reason_failed, service_error.message);

        let history = backend
            .fetch_callback_history(event.id, "", &cancel)
            .await
            .unwrap();
        assert_eq!(history.data[0].status, Status::Failed);
        assert_eq!(history.data[0].response_code, 500);
    }

    #[tokio::test]
    async fn unreachable_callback_is_a_transport_error() {
        let http = Arc::new(ScriptedClient::new(vec![Err(HttpError::Connection(
            "connection refused".into(),
        ))]));
        let backend = backend(&http);
        let cancel = CancellationToken::new();

        let result = backend.submit_event(&request(), &cancel).await;

        assert!(matches!(
            result,
            Err(ClientError::Transport(TransportError::Http(HttpError::Connection(_))))
        ));

        let events = backend.list_events("", &cancel).await.unwrap();
        assert_eq!(events.data[0].status, Status::Failed);
        assert_eq!(events.data[0].last_response_code, 0);
        assert!(events.data[0].reason_failed.contains("connection refused"));
    }

    #[tokio::test]
    async fn non_200_success_status_counts_as_rejection() {
        let http = Arc::new(ScriptedClient::new(vec![Ok(HttpResponse::new(
            http::StatusCode::ACCEPTED,
            http::HeaderMap::new(),
            Vec::new(),
        ))]));

        let result = backend(&http)
            .submit_event(&request(), &CancellationToken::new())
            .await;

        assert_eq!(
            result.unwrap_err().status(),
            Some(http::StatusCode::ACCEPTED)
        );
    }
}

mod cancellation {
    use super::*;
    use crate::transport::{HttpClient, HttpRequest};

    /// Receiver that never answers; cancels `token` once the request is sent.
    struct Hanging {
        token: CancellationToken,
    }

    impl HttpClient for Hanging {
        async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
            self.token.cancel();
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn cancelled_delivery_is_recorded_as_failed_attempt() {
        let cancel = CancellationToken::new();
        let backend = MockCallbackClient::new(Hanging {
            token: cancel.clone(),
        })
        .with_clock(FixedClock(fixed_time()));

        let result = backend.submit_event(&request(), &cancel).await;
        assert!(matches!(result, Err(ClientError::Cancelled)));

        let open = CancellationToken::new();
        let events = backend.list_events("", &open).await.unwrap();
        assert_eq!(events.data.len(), 1);
        let event = &events.data[0];
        assert_eq!(event.status, Status::Failed);
        assert_eq!(event.retry_count, 1);
        assert_eq!(event.reason_failed, "delivery cancelled");

        let history = backend
            .fetch_callback_history(event.id, "", &open)
            .await
            .unwrap();
        assert_eq!(history.data.len(), 1);
        assert_eq!(history.data[0].status, Status::Failed);
        assert_eq!(history.data[0].response_code, 0);
    }
}

mod preconditions {
    use super::*;

    #[tokio::test]
    async fn invalid_request_is_not_stored_or_sent() {
        let http = Arc::new(ScriptedClient::unreachable());
        let backend = backend(&http);
        let cancel = CancellationToken::new();
        let invalid = CallbackRequestEvent {
            webhook_secret: String::new(),
            ..request()
        };

        let result = backend.submit_event(&invalid, &cancel).await;

        assert!(matches!(
            result,
            Err(ClientError::Validation(ValidationError::MissingWebhookSecret))
        ));
        assert!(backend.list_events("", &cancel).await.unwrap().data.is_empty());
        assert_eq!(http.calls(), 0);
    }

    #[tokio::test]
    async fn cancelled_token_prevents_delivery() {
        let http = Arc::new(ScriptedClient::unreachable());
        let backend = backend(&http);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = backend.submit_event(&request(), &cancel).await;

        assert!(matches!(result, Err(ClientError::Cancelled)));
        assert_eq!(http.calls(), 0);
        assert!(matches!(
            backend.list_events("", &cancel).await,
            Err(ClientError::Cancelled)
        ));
    }
}

mod queries {
    use super::*;

    #[tokio::test]
    async fn empty_filter_lists_every_event() {
        let http = accepting();
        let backend = backend(&http);
        let cancel = CancellationToken::new();

        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(
                backend
                    .submit_event(&request(), &cancel)
                    .await
                    .unwrap()
                    .acknowledgement_id,
            );
        }

        let list = backend.list_events("", &cancel).await.unwrap();

        assert_eq!(list.meta_data.total, 3);
        let mut listed: Vec<Uuid> = list.data.iter().map(|e| e.id).collect();
        listed.sort();
        ids.sort();
        assert_eq!(listed, ids);
    }

    #[tokio::test]
    async fn unknown_event_is_not_found() {
        let http = Arc::new(ScriptedClient::unreachable());

        let result = backend(&http)
            .fetch_event(Uuid::new_v4(), &CancellationToken::new())
            .await;

        assert_eq!(
            result.unwrap_err().status(),
            Some(http::StatusCode::NOT_FOUND)
        );
    }

    #[tokio::test]
    async fn unknown_event_history_is_not_found() {
        let http = Arc::new(ScriptedClient::unreachable());
        let id = Uuid::new_v4();

        let result = backend(&http)
            .fetch_callback_history(id, "", &CancellationToken::new())
            .await;

        let error = result.unwrap_err();
        assert_eq!(error.status(), Some(http::StatusCode::NOT_FOUND));
        assert_eq!(
            error.service_error().unwrap().message,
            format!("callback history with eventID {id} not found")
        );
    }
}
