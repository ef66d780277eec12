//! Statewire: an embeddable finite state machine engine
//!
//! Statewire drives the lifecycle of stateful components (connections,
//! listeners, sessions) through caller-supplied state tables, while letting
//! independent subsystems observe transitions through hooks attached at
//! runtime.
//!
//! # Core Concepts
//!
//! - **Definition**: an immutable, numbered state table with optional
//!   enter/process/exit callbacks, plus designated init and free states
//! - **Hooks**: observers attached before or after a state's enter, process
//!   or exit callback, fired in registration order
//! - **Pause/resume**: nested holds that defer at most one transition
//! - **Disposal**: every machine ends with exactly one transition into its
//!   free state, whose enter callback releases the caller's resources
//!
//! The engine is single-threaded and synchronous: every callback runs to
//! completion on the caller's stack before the triggering call returns.
//!
//! # Example
//!
//! ```rust
//! use statewire::builder::MachineDefinitionBuilder;
//! use statewire::engine::{Engine, Machine, ProcessResult};
//! use statewire::state_numbers;
//! use std::sync::Arc;
//!
//! state_numbers! {
//!     mod state {
//!         START = 1,
//!         RUNNING = 2,
//!         FREE = 3,
//!     }
//! }
//!
//! fn start(_: &mut Engine<u32>, _: &mut u32) -> usize {
//!     state::RUNNING
//! }
//! fn running(_: &mut Engine<u32>, _: &mut u32) -> usize {
//!     0
//! }
//! fn count(_: &mut Engine<u32>, counter: &mut u32) {
//!     *counter += 1;
//! }
//! fn release(_: &mut Engine<u32>, _: &mut u32) {}
//!
//! let definition = MachineDefinitionBuilder::<u32>::new()
//!     .state(state::START, "Start")
//!     .state(state::RUNNING, "Running")
//!     .state(state::FREE, "Free")
//!     .on_process(state::START, start)
//!     .on_process(state::RUNNING, running)
//!     .on_enter(state::RUNNING, count)
//!     .on_enter(state::FREE, release)
//!     .init(state::START)
//!     .free(state::FREE)
//!     .build()
//!     .unwrap();
//!
//! let mut machine = Machine::create(Arc::new(definition), 0);
//! assert_eq!(*machine.context(), 1);
//! assert_eq!(machine.process(), ProcessResult::NoChange);
//! assert_eq!(*machine.context(), 1);
//! machine.dispose();
//! ```

pub mod builder;
pub mod core;
pub mod engine;

// Re-export commonly used types
pub use self::builder::{BuildError, MachineDefinitionBuilder};
pub use self::core::{HookEvent, HookHandle, HookPhase, HookPoint, HookScope, StateNumber};
pub use self::engine::{Engine, Machine, MachineError, ProcessResult};
