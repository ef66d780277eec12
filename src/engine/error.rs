//! Engine error types and the contract-violation path.

use crate::core::StateNumber;
use std::fmt;
use thiserror::Error;

/// Errors returned to the caller of a rejected request.
///
/// A rejected request never mutates the machine.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("State machine is dead, it can only be disposed")]
    Dead,

    #[error("State {state} is outside 1..={max_state}")]
    InvalidState {
        state: StateNumber,
        max_state: StateNumber,
    },

    #[error("State {state} is reserved: the init state is never re-entered and the free state is only entered by disposal")]
    ReservedState { state: StateNumber },

    #[error("Transition to {requested} rejected, a transition to {pending} is already deferred")]
    AlreadyDeferred {
        pending: StateNumber,
        requested: StateNumber,
    },

    #[error("Init state {state} is a bootstrap state and cannot be hooked")]
    InitStateHook { state: StateNumber },
}

impl MachineError {
    /// True when the error stems from misuse by the caller rather than from
    /// dynamic input such as an out-of-range state number.
    pub fn is_contract_violation(&self) -> bool {
        !matches!(self, MachineError::InvalidState { .. })
    }
}

/// Fail fast on a broken calling contract.
///
/// Continuing would run hooks out of order or enter a state twice, so the
/// violation is logged and the current operation panics.
#[cold]
#[track_caller]
pub(crate) fn contract_violation(detail: fmt::Arguments<'_>) -> ! {
    tracing::error!(%detail, "state machine contract violation");
    panic!("state machine contract violation: {detail}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_invalid_state_is_recoverable() {
        let invalid = MachineError::InvalidState {
            state: 9,
            max_state: 4,
        };
        assert!(!invalid.is_contract_violation());
        assert!(MachineError::Dead.is_contract_violation());
        assert!(MachineError::ReservedState { state: 1 }.is_contract_violation());
        assert!(MachineError::AlreadyDeferred {
            pending: 2,
            requested: 3
        }
        .is_contract_violation());
        assert!(MachineError::InitStateHook { state: 1 }.is_contract_violation());
    }

    #[test]
    fn messages_name_the_states() {
        let err = MachineError::AlreadyDeferred {
            pending: 2,
            requested: 3,
        };
        assert_eq!(
            err.to_string(),
            "Transition to 3 rejected, a transition to 2 is already deferred"
        );
    }

    #[test]
    #[should_panic(expected = "state machine contract violation: resume without pause")]
    fn contract_violation_panics_with_detail() {
        contract_violation(format_args!("resume without pause"));
    }
}
