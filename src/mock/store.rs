//! In-memory event table of the mock backend.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::api::{CallbackHistory, Event, Status};

/// One delivery attempt as stored; the parent event is attached on read.
#[derive(Debug, Clone)]
struct Attempt {
    id: Uuid,
    status: Status,
    response_code: i64,
    reason_failed: String,
    created_at: DateTime<Utc>,
}

#[derive(Debug)]
struct Record {
    event: Event,
    attempts: Vec<Attempt>,
}

/// Result of one delivery attempt, applied to an event by [`EventStore::record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Outcome {
    /// The callback URL answered 200.
    Delivered { response_code: i64 },
    /// The callback URL answered with another status.
    Rejected { response_code: i64, reason: String },
    /// No response was received.
    Unreachable { reason: String },
}

/// Events keyed by id, each with its append-only attempt log.
///
/// Every method takes the lock for the duration of a single call only.
#[derive(Debug, Default)]
pub(super) struct EventStore {
    records: Mutex<HashMap<Uuid, Record>>,
}

impl EventStore {
    pub(super) fn insert(&self, event: Event) {
        self.lock().insert(
            event.id,
            Record {
                event,
                attempts: Vec::new(),
            },
        );
    }

    /// Appends an attempt and updates the event's delivery state.
    ///
    /// Returns false if the event does not exist.
    pub(super) fn record(&self, id: Uuid, outcome: Outcome, at: DateTime<Utc>) -> bool {
        let mut records = self.lock();
        let Some(record) = records.get_mut(&id) else {
            return false;
        };

        let (status, response_code, reason_failed) = match outcome {
            Outcome::Delivered { response_code } => (Status::Succeeded, response_code, String::new()),
            Outcome::Rejected {
                response_code,
                reason,
            } => (Status::Failed, response_code, reason),
            Outcome::Unreachable { reason } => (Status::Failed, 0, reason),
        };

        let event = &mut record.event;
        event.status = status;
        event.retry_count += 1;
        event.updated_at = at;
        if response_code != 0 {
            event.last_response_code = response_code;
        }
        if !reason_failed.is_empty() {
            event.reason_failed.clone_from(&reason_failed);
        }

        record.attempts.push(Attempt {
            id: Uuid::new_v4(),
            status,
            response_code,
            reason_failed,
            created_at: at,
        });
        true
    }

    pub(super) fn get(&self, id: Uuid) -> Option<Event> {
        self.lock().get(&id).map(|r| r.event.clone())
    }

    /// Returns every event, oldest first.
    pub(super) fn all(&self) -> Vec<Event> {
        let mut events: Vec<Event> = self.lock().values().map(|r| r.event.clone()).collect();
        events.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        events
    }

    /// Returns the attempts of one event in the order they were made.
    pub(super) fn history(&self, id: Uuid) -> Option<Vec<CallbackHistory>> {
        let records = self.lock();
        let record = records.get(&id)?;

        Some(
            record
                .attempts
                .iter()
                .map(|attempt| CallbackHistory {
                    id: attempt.id,
                    event: record.event.clone(),
                    status: attempt.status,
                    response_code: attempt.response_code,
                    reason_failed: attempt.reason_failed.clone(),
                    created_at: attempt.created_at,
                    updated_at: attempt.created_at,
                })
                .collect(),
        )
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<Uuid, Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
