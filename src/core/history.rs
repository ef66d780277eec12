//! Bounded transition history.
//!
//! Machines built from a definition with a non-zero history limit record every
//! completed transition here, for diagnostics. The oldest records are evicted
//! once the limit is reached.

use super::state::StateNumber;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// What caused a transition to run.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum TransitionCause {
    /// The init state's bootstrap process result, during creation.
    Bootstrap,
    /// A process callback returned the next state.
    Process,
    /// The embedding driver requested the transition directly.
    Request,
    /// A deferred request released by the last `resume`.
    Resume,
    /// Disposal moving the machine into its free state.
    Dispose,
}

/// Record of a single completed transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: StateNumber,
    pub to: StateNumber,
    pub cause: TransitionCause,
    pub timestamp: DateTime<Utc>,
}

/// Ordered, bounded history of transitions.
///
/// A history with limit `0` records nothing.
///
/// # Example
///
/// ```rust
/// use statewire::core::{TransitionCause, TransitionHistory, TransitionRecord};
/// use chrono::Utc;
///
/// let mut history = TransitionHistory::with_limit(2);
/// for (from, to) in [(1, 2), (2, 3), (3, 4)] {
///     history.record(TransitionRecord {
///         from,
///         to,
///         cause: TransitionCause::Request,
///         timestamp: Utc::now(),
///     });
/// }
///
/// assert_eq!(history.len(), 2);
/// assert_eq!(history.get_path(), vec![2, 3, 4]);
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransitionHistory {
    limit: usize,
    records: VecDeque<TransitionRecord>,
}

impl TransitionHistory {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            records: VecDeque::with_capacity(limit.min(64)),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn is_enabled(&self) -> bool {
        self.limit > 0
    }

    /// Append a record, evicting the oldest one when full.
    pub fn record(&mut self, record: TransitionRecord) {
        if !self.is_enabled() {
            return;
        }
        if self.records.len() == self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Records in the order they happened.
    pub fn transitions(&self) -> impl Iterator<Item = &TransitionRecord> {
        self.records.iter()
    }

    pub fn last(&self) -> Option<&TransitionRecord> {
        self.records.back()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// States traversed: the `from` of the oldest retained record, then the
    /// `to` of every record.
    pub fn get_path(&self) -> Vec<StateNumber> {
        let mut path = Vec::with_capacity(self.records.len() + 1);
        if let Some(first) = self.records.front() {
            path.push(first.from);
        }
        path.extend(self.records.iter().map(|r| r.to));
        path
    }

    /// Time between the oldest and newest retained record.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.records.front()?, self.records.back()?);
        last.timestamp
            .signed_duration_since(first.timestamp)
            .to_std()
            .ok()
    }
}
