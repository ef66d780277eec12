//! The machine instance driven by the embedding code.

use crate::core::{
    HookEvent, HookHandle, HookPhase, HookPoint, HookScope, MachineDefinition, StateNumber,
    TransitionCause, TransitionHistory, NO_STATE,
};
use crate::engine::error::{contract_violation, MachineError};
use crate::engine::instance::{Engine, Handler};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// Outcome of one [`Machine::process`] call.
#[must_use]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ProcessResult {
    /// The process callback asked to stay in the current state.
    NoChange,

    /// The process callback named a next state. The transition has run, or
    /// is deferred if the callback paused the machine.
    Transitioned(StateNumber),

    /// The process callback asked for the free state. The machine is now dead
    /// and must be disposed.
    Fatal,
}

/// A running state machine: the engine bookkeeping plus the caller's
/// context.
///
/// The embedding driver owns the machine and is the only party able to
/// request transitions. Callbacks and hooks only ever see the [`Engine`].
///
/// Dropping a machine disposes it, exactly as [`Machine::dispose`] does.
pub struct Machine<C> {
    pub(crate) engine: Engine<C>,
    pub(crate) context: C,
    disposed: bool,
}

impl<C> Machine<C> {
    /// Create a machine in the definition's init state and run the init
    /// state's process callback once, without hooks.
    ///
    /// If that callback names a state, the machine transitions into it before
    /// `create` returns. If it names the free state the machine starts out
    /// dead.
    ///
    /// # Panics
    ///
    /// If the bootstrap callback returns a number above `max_state`.
    pub fn create(definition: Arc<MachineDefinition<C>>, context: C) -> Self {
        let mut machine = Self {
            engine: Engine::new(definition),
            context,
            disposed: false,
        };
        machine.bootstrap();
        machine
    }

    fn bootstrap(&mut self) {
        let init = self.engine.definition.init_state();
        let Some(process) = self.engine.definition.slot(init).process else {
            return;
        };

        self.engine.enter_handler(Handler::Process);
        let next = process(&mut self.engine, &mut self.context);
        self.engine.leave_handler();

        trace!(init = self.engine.state_name(init), next, "bootstrap processed");
        let _ = self.follow(next, TransitionCause::Bootstrap);
    }

    /// Run the current state's process callback between its pre and post
    /// process hooks, then act on its result.
    ///
    /// # Panics
    ///
    /// Calling `process` on a dead or paused machine, while a deferred
    /// transition is pending, or from inside a handler is a contract
    /// violation, as is a callback result above `max_state` or naming the
    /// init state.
    pub fn process(&mut self) -> ProcessResult {
        if self.engine.dead {
            contract_violation(format_args!("process() on a dead machine"));
        }
        if self.engine.pause_count > 0 {
            contract_violation(format_args!("process() while paused"));
        }
        if let Some(pending) = self.engine.deferred {
            contract_violation(format_args!(
                "process() with a deferred transition to {pending} pending"
            ));
        }

        let current = self.engine.current;
        let process = self.engine.definition.slot(current).process;

        self.engine.enter_handler(Handler::Process);
        self.engine
            .run_hooks(current, HookPoint::Process, HookPhase::Pre, current, current);
        let next = match process {
            Some(process) => process(&mut self.engine, &mut self.context),
            None => NO_STATE,
        };
        self.engine
            .run_hooks(current, HookPoint::Process, HookPhase::Post, current, current);
        self.engine.leave_handler();

        self.follow(next, TransitionCause::Process)
    }

    /// Act on a process callback result.
    fn follow(&mut self, next: StateNumber, cause: TransitionCause) -> ProcessResult {
        let definition = &self.engine.definition;
        if next > definition.max_state() {
            contract_violation(format_args!(
                "process callback of '{}' returned {next}, outside 0..={}",
                self.engine.state_name(NO_STATE),
                definition.max_state()
            ));
        }

        if next == NO_STATE {
            return ProcessResult::NoChange;
        }
        if next == definition.free_state() {
            debug!(
                state = self.engine.state_name(NO_STATE),
                "machine requested its own teardown"
            );
            self.engine.dead = true;
            return ProcessResult::Fatal;
        }
        if next == definition.init_state() && cause != TransitionCause::Bootstrap {
            contract_violation(format_args!("process callback returned the init state"));
        }

        self.request(next, cause);
        ProcessResult::Transitioned(next)
    }

    /// Request a transition from outside the machine, e.g. from a timer or
    /// an I/O completion.
    ///
    /// A request for the current state is a successful no-op. While paused,
    /// the request is deferred until the last `resume`; only one request can
    /// be deferred at a time.
    ///
    /// # Panics
    ///
    /// If called while the machine is running callbacks.
    pub fn transition(&mut self, state: StateNumber) -> Result<(), MachineError> {
        if let Some(active) = self.engine.handler() {
            contract_violation(format_args!(
                "transition({state}) requested while {active:?} is running"
            ));
        }

        let result = self.check_request(state);
        if let Err(err) = &result {
            warn!(
                state,
                current = self.engine.state_name(NO_STATE),
                error = %err,
                "transition request rejected"
            );
            return result;
        }

        self.request(state, TransitionCause::Request);
        Ok(())
    }

    fn check_request(&self, state: StateNumber) -> Result<(), MachineError> {
        let definition = &self.engine.definition;
        if self.engine.dead {
            return Err(MachineError::Dead);
        }
        if !definition.is_valid(state) {
            return Err(MachineError::InvalidState {
                state,
                max_state: definition.max_state(),
            });
        }
        if state == self.engine.current {
            return Ok(());
        }
        if state == definition.init_state() || state == definition.free_state() {
            return Err(MachineError::ReservedState { state });
        }
        if let (true, Some(pending)) = (self.engine.is_paused(), self.engine.deferred) {
            return Err(MachineError::AlreadyDeferred {
                pending,
                requested: state,
            });
        }
        Ok(())
    }

    /// Run or defer a transition that already passed validation.
    fn request(&mut self, state: StateNumber, cause: TransitionCause) {
        if state == self.engine.current {
            return;
        }
        if self.engine.is_paused() {
            debug!(
                to = self.engine.state_name(state),
                pause_count = self.engine.pause_count,
                "transition deferred"
            );
            self.engine.deferred = Some(state);
            return;
        }
        self.run_transition(state, cause);
    }

    /// Hold transitions. Requests made while paused are deferred.
    pub fn pause(&mut self) {
        self.engine.pause();
    }

    /// Release one `pause`. When the last one is released, a deferred
    /// transition runs.
    ///
    /// # Panics
    ///
    /// Resuming a dead machine, or more often than it was paused, is a
    /// contract violation.
    pub fn resume(&mut self) {
        if self.engine.dead {
            contract_violation(format_args!("resume() on a dead machine"));
        }
        if self.engine.pause_count == 0 {
            contract_violation(format_args!("resume() without a matching pause()"));
        }

        self.engine.pause_count -= 1;
        trace!(pause_count = self.engine.pause_count, "transitions resumed");
        if self.engine.pause_count > 0 {
            return;
        }

        if let Some(state) = self.engine.deferred.take() {
            if state != self.engine.current {
                self.run_transition(state, TransitionCause::Resume);
            }
        }
    }

    /// Move the machine into its free state and release it.
    ///
    /// The free state's enter callback runs exactly once, whatever state the
    /// machine is in, even while paused. A machine that asked for its own
    /// teardown is handled the same way: callbacks and hooks see a live
    /// machine until the free transition completes.
    pub fn dispose(mut self) {
        self.teardown();
    }

    fn teardown(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;

        if let Some(active) = self.engine.handler() {
            warn!(?active, "machine released mid-sequence, skipping free state");
            return;
        }

        let free = self.engine.definition.free_state();
        if let Some(dropped) = self.engine.deferred.take() {
            debug!(
                dropped = self.engine.state_name(dropped),
                "deferred transition dropped by disposal"
            );
        }
        if self.engine.current != free {
            self.engine.dead = false;
            self.run_transition(free, TransitionCause::Dispose);
        }
        self.engine.dead = true;
    }

    /// Get the caller's context
    pub fn context(&self) -> &C {
        &self.context
    }

    /// Get the caller's context mutably
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }

    /// Get the engine bookkeeping
    pub fn engine(&self) -> &Engine<C> {
        &self.engine
    }

    /// Get the engine bookkeeping mutably, e.g. to register hooks
    pub fn engine_mut(&mut self) -> &mut Engine<C> {
        &mut self.engine
    }

    /// Get the shared definition this machine runs
    pub fn definition(&self) -> &MachineDefinition<C> {
        self.engine.definition()
    }

    /// See [`Engine::current_state`].
    pub fn current_state(&self) -> StateNumber {
        self.engine.current_state()
    }

    /// See [`Engine::state_name`].
    pub fn state_name(&self, number: StateNumber) -> &'static str {
        self.engine.state_name(number)
    }

    /// See [`Engine::is_dead`].
    pub fn is_dead(&self) -> bool {
        self.engine.is_dead()
    }

    /// See [`Engine::pause_count`].
    pub fn pause_count(&self) -> usize {
        self.engine.pause_count()
    }

    /// See [`Engine::deferred_state`].
    pub fn deferred_state(&self) -> Option<StateNumber> {
        self.engine.deferred_state()
    }

    /// See [`Engine::history`].
    pub fn history(&self) -> &TransitionHistory {
        self.engine.history()
    }

    /// See [`Engine::register`].
    pub fn register<F>(
        &mut self,
        state: StateNumber,
        point: HookPoint,
        phase: HookPhase,
        oneshot: bool,
        callback: F,
    ) -> Result<HookHandle, MachineError>
    where
        F: FnMut(&mut Engine<C>, &HookEvent) + 'static,
    {
        self.engine.register(state, point, phase, oneshot, callback)
    }

    /// See [`Engine::unregister`].
    pub fn unregister(&mut self, handle: HookHandle) -> bool {
        self.engine.unregister(handle)
    }

    /// See [`Engine::release_scope`].
    pub fn release_scope(&mut self, scope: &mut HookScope) -> usize {
        self.engine.release_scope(scope)
    }
}

impl<C> Drop for Machine<C> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            warn!(
                state = self.engine.state_name(NO_STATE),
                "machine dropped while unwinding, skipping free state"
            );
            self.disposed = true;
            return;
        }
        self.teardown();
    }
}

impl<C> fmt::Debug for Machine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Machine")
            .field("engine", &self.engine)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
