//! Core data types shared by the builder and the engine.
//!
//! - State numbers, per-state definitions and whole machine definitions
//! - Hook addressing: points, phases, events, handles, scopes
//! - Bounded transition history
//!
//! Nothing in this module runs callbacks; that is the engine's job.

mod definition;
mod history;
mod hook;
mod state;

pub use definition::MachineDefinition;
pub use history::{TransitionCause, TransitionHistory, TransitionRecord};
pub use hook::{HookEvent, HookHandle, HookId, HookPhase, HookPoint, HookScope};
pub use state::{
    ProcessFn, StateDefinition, StateNumber, TransitionFn, NO_STATE, UNKNOWN_STATE_NAME,
};
