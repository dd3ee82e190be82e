//! callback-client: client for a callback delivery service
//!
//! A library for submitting events to a webhook delivery service, querying
//! their delivery history, and authenticating the signed callbacks the
//! service sends back.

pub mod api;
pub mod config;
pub mod mock;
pub mod receiver;
pub mod signature;
pub mod time;
pub mod transport;
