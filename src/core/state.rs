//! State numbers and per-state definitions.
//!
//! A state is identified by a small positive number. Number `0` is reserved:
//! as a process result it means "stay", as an argument it means "no state".

use crate::engine::Engine;
use std::fmt;

/// Number identifying a state inside one machine definition.
///
/// Valid states are `1..=max_state`; `0` is the "no state" sentinel.
pub type StateNumber = usize;

/// The "no state" sentinel, also returned by process callbacks to stay put.
pub const NO_STATE: StateNumber = 0;

/// Name reported for state numbers that do not resolve to a state.
pub const UNKNOWN_STATE_NAME: &str = "unknown";

/// Callback run when a state is entered or exited.
pub type TransitionFn<C> = fn(&mut Engine<C>, &mut C);

/// Callback run when the driver processes a state.
///
/// Returns [`NO_STATE`] to stay in the current state, or the number of the
/// next state.
pub type ProcessFn<C> = fn(&mut Engine<C>, &mut C) -> StateNumber;

/// Immutable description of one state: its number, its name, and the
/// optional callbacks the engine runs for it.
///
/// Definitions are created through
/// [`MachineDefinitionBuilder`](crate::builder::MachineDefinitionBuilder)
/// and shared read-only by every machine built from the same definition.
pub struct StateDefinition<C> {
    pub(crate) number: StateNumber,
    pub(crate) name: &'static str,
    pub(crate) enter: Option<TransitionFn<C>>,
    pub(crate) process: Option<ProcessFn<C>>,
    pub(crate) exit: Option<TransitionFn<C>>,
}

impl<C> StateDefinition<C> {
    pub(crate) fn new(number: StateNumber, name: &'static str) -> Self {
        Self {
            number,
            name,
            enter: None,
            process: None,
            exit: None,
        }
    }

    /// Placeholder occupying slot 0 of the state table.
    pub(crate) fn sentinel() -> Self {
        Self::new(NO_STATE, UNKNOWN_STATE_NAME)
    }

    pub fn number(&self) -> StateNumber {
        self.number
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn has_enter(&self) -> bool {
        self.enter.is_some()
    }

    pub fn has_process(&self) -> bool {
        self.process.is_some()
    }

    pub fn has_exit(&self) -> bool {
        self.exit.is_some()
    }
}

// Manual impls: fn pointers are Copy for any C, derive would demand C: Clone.
impl<C> Clone for StateDefinition<C> {
    fn clone(&self) -> Self {
        Self {
            number: self.number,
            name: self.name,
            enter: self.enter,
            process: self.process,
            exit: self.exit,
        }
    }
}

impl<C> fmt::Debug for StateDefinition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateDefinition")
            .field("number", &self.number)
            .field("name", &self.name)
            .field("enter", &self.enter.is_some())
            .field("process", &self.process.is_some())
            .field("exit", &self.exit.is_some())
            .finish()
    }
}
