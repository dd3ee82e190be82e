//! Transport layer: HTTP abstraction, single-attempt executor and retry loop.
//!
//! This module provides:
//! - Request/response value types and the [`HttpClient`] trait
//! - The production client [`ReqwestClient`]
//! - [`Executor`], which performs exactly one round trip and decodes either
//!   the success shape or the structured-error shape
//! - [`RetryPolicy`] and [`Retrier`], which repeat an operation under
//!   backoff with jitter until it succeeds, is exhausted or is cancelled

mod client;
mod error;
mod executor;
mod http;
mod retry;

#[cfg(test)]
pub(crate) mod testing;


pub use client::ReqwestClient;
pub use error::{ExecuteError, HttpError, TransportError};
pub use executor::{ApiRequest, Executor, RequestBody};
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use retry::{Cancelled, IsRetryable, Retrier, RetryPolicy};
