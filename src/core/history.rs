//! Committed transition history.
//!
//! Each instance keeps a bounded record of the transitions it committed.
//! Failed triggers never appear here.

use super::state::{Event, State};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::VecDeque;
use std::time::Duration;

/// Number of records an instance retains before dropping the oldest.
pub const HISTORY_LIMIT: usize = 64;

/// Record of a single committed transition.
#[derive(Clone, Debug, PartialEq)]
pub struct TransitionRecord<S: State, E: Event> {
    /// The state being transitioned from
    pub from: S,
    /// The state being transitioned to
    pub to: S,
    /// The event that fired the transition
    pub event: E,
    /// When the transition committed
    pub timestamp: DateTime<Utc>,
}

/// Serializable summary of a record, using state and event names.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RecordSummary {
    pub from: String,
    pub to: String,
    pub event: String,
    pub timestamp: DateTime<Utc>,
}

impl<S: State, E: Event> TransitionRecord<S, E> {
    pub fn summary(&self) -> RecordSummary {
        RecordSummary {
            from: self.from.name().to_string(),
            to: self.to.name().to_string(),
            event: self.event.name().to_string(),
            timestamp: self.timestamp,
        }
    }
}

/// Ordered, bounded history of committed transitions.
///
/// # Example
///
/// ```rust
/// use stepflow::core::{TransitionHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let mut history = TransitionHistory::new();
/// history.push(TransitionRecord {
///     from: "DEFAULT",
///     to: "NAME",
///     event: "create",
///     timestamp: Utc::now(),
/// });
///
/// assert_eq!(history.get_path(), vec![&"DEFAULT", &"NAME"]);
/// ```
#[derive(Clone, Debug)]
pub struct TransitionHistory<S: State, E: Event> {
    records: VecDeque<TransitionRecord<S, E>>,
    limit: usize,
}

impl<S: State, E: Event> Default for TransitionHistory<S, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State, E: Event> TransitionHistory<S, E> {
    /// Create a new empty history holding at most [`HISTORY_LIMIT`] records.
    pub fn new() -> Self {
        Self::with_limit(HISTORY_LIMIT)
    }

    /// Create a new empty history holding at most `limit` records.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            records: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Append a record, evicting the oldest one once the limit is reached.
    pub fn push(&mut self, record: TransitionRecord<S, E>) {
        if self.records.len() == self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Get the path of states traversed by the retained records.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.records.front() {
            path.push(&first.from);
        }
        for record in &self.records {
            path.push(&record.to);
        }
        path
    }

    /// Time between the first and last retained records.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }

    pub fn last(&self) -> Option<&TransitionRecord<S, E>> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over retained records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &TransitionRecord<S, E>> {
        self.records.iter()
    }
}
