//! Domain operations of the callback service.
//!
//! This module provides:
//! - Wire models ([`Event`], [`CallbackHistory`], [`CallbackRequestEvent`], ...)
//! - Response envelopes and the structured [`ServiceError`]
//! - The [`CallbackApi`] trait and its HTTP implementation [`CallbackClient`]

mod client;
mod envelope;
mod error;
mod models;


pub use client::{CallbackApi, CallbackClient};
pub use envelope::{DataEnvelope, ErrorEnvelope, FieldError, ServiceError};
pub use error::{BuildError, ClientError, ValidationError};
pub use models::{
    CallbackHistory, CallbackHistoryList, CallbackRequestEvent, CallbackServiceEventConfirmation,
    Event, EventList, MetaData, Method, Payload, Service, Status,
};
