//! Immutable machine definitions.

use super::state::{StateDefinition, StateNumber, NO_STATE};
use std::fmt;

/// Complete, validated description of a state machine: its state table plus
/// the designated init and free states.
///
/// The table is indexed by state number. Slot 0 holds the "invalid" sentinel,
/// so every number in `1..=max_state` resolves to a declared state.
///
/// Build one with
/// [`MachineDefinitionBuilder`](crate::builder::MachineDefinitionBuilder);
/// share it between machines behind an `Arc`.
pub struct MachineDefinition<C> {
    pub(crate) states: Vec<StateDefinition<C>>,
    pub(crate) init: StateNumber,
    pub(crate) free: StateNumber,
    pub(crate) history_limit: usize,
}

impl<C> MachineDefinition<C> {
    /// Highest valid state number.
    pub fn max_state(&self) -> StateNumber {
        self.states.len() - 1
    }

    pub fn init_state(&self) -> StateNumber {
        self.init
    }

    pub fn free_state(&self) -> StateNumber {
        self.free
    }

    /// Number of transitions each machine keeps in its history (0 = off).
    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    /// True for numbers in `1..=max_state`.
    pub fn is_valid(&self, number: StateNumber) -> bool {
        number != NO_STATE && number <= self.max_state()
    }

    pub fn state(&self, number: StateNumber) -> Option<&StateDefinition<C>> {
        if self.is_valid(number) {
            self.states.get(number)
        } else {
            None
        }
    }

    /// Declared states in number order, without the sentinel.
    pub fn states(&self) -> impl Iterator<Item = &StateDefinition<C>> {
        self.states.iter().skip(1)
    }

    /// Only called with numbers the engine already validated.
    pub(crate) fn slot(&self, number: StateNumber) -> &StateDefinition<C> {
        &self.states[number]
    }
}

impl<C> fmt::Debug for MachineDefinition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MachineDefinition")
            .field("states", &self.states().collect::<Vec<_>>())
            .field("init", &self.init)
            .field("free", &self.free)
            .field("history_limit", &self.history_limit)
            .finish()
    }
}
