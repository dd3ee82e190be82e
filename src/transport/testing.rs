//! Test doubles shared by the transport, api and mock test suites.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{HttpClient, HttpError, HttpRequest, HttpResponse};

/// HTTP client that replays a scripted sequence of results and records
/// every request it receives.
///
/// Once the script runs out, the last entry is repeated.
#[derive(Debug)]
pub struct ScriptedClient {
    responses: Mutex<Vec<Result<HttpResponse, HttpError>>>,
    last: Mutex<Option<HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
    call_count: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(responses: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            last: Mutex::new(None),
            requests: Mutex::new(Vec::new()),
            call_count: AtomicUsize::new(0),
        }
    }

    /// Always answers with the given JSON body and status.
    pub fn always(status: http::StatusCode, body: &serde_json::Value) -> Self {
        Self::new(vec![Ok(HttpResponse::json(status, body))])
    }

    /// Fails the test if any request is made.
    pub fn unreachable() -> Self {
        Self::new(Vec::new())
    }

    pub fn calls(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn captured_requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl HttpClient for ScriptedClient {
    async fn request(&self, req: HttpRequest) -> Result<HttpResponse, HttpError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(req);

        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            let last = self.last.lock().unwrap();
            return Ok(last
                .clone()
                .expect("ScriptedClient received an unscripted request"));
        }

        let next = responses.remove(0);
        if let Ok(response) = &next {
            *self.last.lock().unwrap() = Some(response.clone());
        }
        next
    }
}

/// Builds a `{ok: false, error: {...}}` body as the service sends it.
pub fn error_body(code: i64, message: &str) -> serde_json::Value {
    serde_json::json!({
        "ok": false,
        "error": {
            "code": code,
            "message": message,
            "description": format!("{message} (description)"),
            "field_error": [],
        }
    })
}

/// Builds a `{ok: true, data: ...}` body.
pub fn success_body(data: serde_json::Value) -> serde_json::Value {
    serde_json::json!({ "ok": true, "data": data })
}
