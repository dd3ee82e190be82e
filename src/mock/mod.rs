//! In-process callback service for tests and local development.
//!
//! [`MockCallbackClient`] implements [`CallbackApi`](crate::api::CallbackApi)
//! without a remote service: it stores events in memory and performs the
//! webhook delivery itself, so receivers can be exercised end to end.

mod client;
mod store;

#[cfg(test)]
mod client_tests;

pub use client::MockCallbackClient;
