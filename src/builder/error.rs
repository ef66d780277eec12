//! Build errors for machine definitions.

use crate::core::StateNumber;
use thiserror::Error;

/// Errors that can occur when building a machine definition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("No states declared. Add at least the init and free states")]
    NoStates,

    #[error("State number 0 is reserved for \"no state\"")]
    ReservedStateNumber,

    #[error("State {number} declared more than once")]
    DuplicateState { number: StateNumber },

    #[error("States must be numbered 1..={max} without gaps, state {missing} is missing")]
    MissingStateNumber {
        missing: StateNumber,
        max: StateNumber,
    },

    #[error("State {number} is referenced but never declared")]
    UndeclaredState { number: StateNumber },

    #[error("Init state not specified. Call .init(state) before .build()")]
    MissingInitState,

    #[error("Free state not specified. Call .free(state) before .build()")]
    MissingFreeState,

    #[error("State {number} cannot be both the init and the free state")]
    InitIsFree { number: StateNumber },

    #[error("Init state {number} must not have enter or exit callbacks")]
    InitHasTransitionCallbacks { number: StateNumber },

    #[error("Init state {number} needs a process callback to bootstrap the machine")]
    InitWithoutProcess { number: StateNumber },

    #[error("Free state {number} needs an enter callback to release resources")]
    FreeWithoutEnter { number: StateNumber },
}
