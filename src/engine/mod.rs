//! The state machine engine.
//!
//! [`Machine`] is what the embedding driver holds: it owns the caller's
//! context and exposes the operations that can move the machine (`process`,
//! `transition`, `resume`, `dispose`). [`Engine`] is the bookkeeping part
//! handed to state callbacks and hooks; it can observe, register hooks and
//! pause, but never transition.
//!
//! # Ordering
//!
//! Within one transition, phases run strictly as pre-exit hooks, exit
//! callback, post-exit hooks, pre-enter hooks, enter callback, post-enter
//! hooks. Within one phase, hooks run in registration order.
//!
//! # Example
//!
//! ```rust
//! use statewire::builder::MachineDefinitionBuilder;
//! use statewire::core::{HookPhase, HookPoint, StateNumber};
//! use statewire::engine::{Engine, Machine, ProcessResult};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Conn {
//!     opened: u32,
//!     released: bool,
//! }
//!
//! fn start(_: &mut Engine<Conn>, _: &mut Conn) -> StateNumber {
//!     2
//! }
//! fn idle(_: &mut Engine<Conn>, _: &mut Conn) -> StateNumber {
//!     0
//! }
//! fn open(_: &mut Engine<Conn>, conn: &mut Conn) {
//!     conn.opened += 1;
//! }
//! fn release(_: &mut Engine<Conn>, conn: &mut Conn) {
//!     conn.released = true;
//! }
//!
//! let definition = MachineDefinitionBuilder::<Conn>::new()
//!     .state(1, "Start")
//!     .state(2, "Running")
//!     .state(3, "Free")
//!     .on_process(1, start)
//!     .on_process(2, idle)
//!     .on_enter(2, open)
//!     .on_enter(3, release)
//!     .init(1)
//!     .free(3)
//!     .build()
//!     .unwrap();
//!
//! let mut machine = Machine::create(Arc::new(definition), Conn::default());
//! assert_eq!(machine.current_state(), 2);
//! assert_eq!(machine.context().opened, 1);
//!
//! machine
//!     .register(3, HookPoint::Enter, HookPhase::Post, true, |_, event| {
//!         assert_eq!((event.from, event.to), (2, 3));
//!     })
//!     .unwrap();
//!
//! assert_eq!(machine.process(), ProcessResult::NoChange);
//! machine.dispose();
//! ```

mod error;
mod instance;
mod machine;
mod runtime;
mod transition;

pub use error::MachineError;
pub use instance::{Engine, Handler};
pub use machine::{Machine, ProcessResult};
pub use runtime::HookFn;
