//! Machine bookkeeping shared with callbacks and hooks.

use crate::core::{
    HookEvent, HookHandle, HookId, HookPhase, HookPoint, HookScope, MachineDefinition,
    StateNumber, TransitionCause, TransitionHistory, NO_STATE, UNKNOWN_STATE_NAME,
};
use crate::engine::error::{contract_violation, MachineError};
use crate::engine::runtime::StateRuntime;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// The operation currently holding the reentrancy guard.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Handler {
    /// A process callback (including the bootstrap one) and its hooks.
    Process,
    /// The exit/enter sequence of a transition.
    Transition(TransitionCause),
}

/// Everything a machine tracks apart from the caller's context.
///
/// State callbacks and hooks receive `&mut Engine`. It allows introspection,
/// hook registration and pausing, but offers no way to start a transition:
/// transitions are requested by the embedding driver through
/// [`Machine`](crate::engine::Machine) only.
pub struct Engine<C> {
    pub(crate) definition: Arc<MachineDefinition<C>>,
    states: Vec<StateRuntime<C>>,
    pub(crate) current: StateNumber,
    handler: Option<Handler>,
    pub(crate) pause_count: usize,
    pub(crate) deferred: Option<StateNumber>,
    pub(crate) dead: bool,
    next_hook_id: u64,
    pub(crate) history: TransitionHistory,
}

impl<C> Engine<C> {
    pub(crate) fn new(definition: Arc<MachineDefinition<C>>) -> Self {
        let states = (0..=definition.max_state())
            .map(|_| StateRuntime::new())
            .collect();
        let history = TransitionHistory::with_limit(definition.history_limit());
        let current = definition.init_state();

        Self {
            definition,
            states,
            current,
            handler: None,
            pause_count: 0,
            deferred: None,
            dead: false,
            next_hook_id: 1,
            history,
        }
    }

    /// Get the shared definition
    pub fn definition(&self) -> &MachineDefinition<C> {
        &self.definition
    }

    /// Number of the current state.
    ///
    /// # Panics
    ///
    /// Asking a dead machine for its state is a contract violation.
    pub fn current_state(&self) -> StateNumber {
        if self.dead {
            contract_violation(format_args!("current_state() on a dead machine"));
        }
        self.current
    }

    /// Name of a state, for diagnostics.
    ///
    /// `0` resolves to the current state, or to the pending deferred target
    /// when there is no current state. Numbers that resolve to nothing yield
    /// [`UNKNOWN_STATE_NAME`].
    pub fn state_name(&self, number: StateNumber) -> &'static str {
        let number = match number {
            NO_STATE if self.current != NO_STATE => self.current,
            NO_STATE => self.deferred.unwrap_or(NO_STATE),
            number => number,
        };
        self.definition
            .state(number)
            .map_or(UNKNOWN_STATE_NAME, |state| state.name())
    }

    /// True once the machine asked for its own teardown or was disposed
    pub fn is_dead(&self) -> bool {
        self.dead
    }

    /// True while at least one `pause` is outstanding
    pub fn is_paused(&self) -> bool {
        self.pause_count > 0
    }

    /// Number of outstanding `pause` calls
    pub fn pause_count(&self) -> usize {
        self.pause_count
    }

    /// Target of the transition waiting for the last `resume`, if any.
    pub fn deferred_state(&self) -> Option<StateNumber> {
        self.deferred
    }

    /// The operation currently running callbacks, if any.
    pub fn handler(&self) -> Option<Handler> {
        self.handler
    }

    /// Get the transition history (empty unless a limit was configured)
    pub fn history(&self) -> &TransitionHistory {
        &self.history
    }

    /// Hold transitions. Every `pause` must be matched by one `resume` on the
    /// owning [`Machine`](crate::engine::Machine).
    pub fn pause(&mut self) {
        if self.dead {
            contract_violation(format_args!("pause() on a dead machine"));
        }
        self.pause_count += 1;
        trace!(pause_count = self.pause_count, "transitions paused");
    }

    /// Attach a hook to one `(state, point, phase)` bucket.
    ///
    /// Hooks run in registration order within their bucket. A `oneshot` hook
    /// is removed right after it first fires. A hook registered while its
    /// bucket is being dispatched first runs on the next dispatch.
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
        if self.dead {
            return Err(MachineError::Dead);
        }
        if !self.definition.is_valid(state) {
            return Err(MachineError::InvalidState {
                state,
                max_state: self.definition.max_state(),
            });
        }
        if state == self.definition.init_state() {
            return Err(MachineError::InitStateHook { state });
        }

        let id = HookId(self.next_hook_id);
        self.next_hook_id += 1;
        self.states[state].push(point, phase, id, oneshot, Box::new(callback));
        trace!(
            hook = %id,
            state = self.state_name(state),
            point = point.label(),
            phase = phase.label(),
            oneshot,
            "hook registered"
        );

        Ok(HookHandle {
            id,
            state,
            point,
            phase,
        })
    }

    /// Remove a hook. Returns `false` if it was already gone.
    ///
    /// Safe to call from inside any hook, including the one being removed.
    pub fn unregister(&mut self, handle: HookHandle) -> bool {
        let removed = self
            .states
            .get_mut(handle.state)
            .is_some_and(|runtime| runtime.remove(handle.point, handle.phase, handle.id));
        if removed {
            trace!(hook = %handle.id, "hook unregistered");
        }
        removed
    }

    /// Remove every hook tracked by `scope`, returning how many were still
    /// registered.
    pub fn release_scope(&mut self, scope: &mut HookScope) -> usize {
        let handles: Vec<_> = scope.drain().collect();
        handles
            .into_iter()
            .filter(|handle| self.unregister(*handle))
            .count()
    }

    /// Number of hooks currently attached to a bucket.
    pub fn hook_count(&self, state: StateNumber, point: HookPoint, phase: HookPhase) -> usize {
        self.states
            .get(state)
            .map_or(0, |runtime| runtime.len(point, phase))
    }

    pub(crate) fn enter_handler(&mut self, handler: Handler) {
        if let Some(active) = self.handler {
            contract_violation(format_args!(
                "{handler:?} requested while {active:?} is running"
            ));
        }
        self.handler = Some(handler);
    }

    pub(crate) fn leave_handler(&mut self) {
        self.handler = None;
    }

    /// Run the hooks of one bucket in registration order.
    pub(crate) fn run_hooks(
        &mut self,
        state: StateNumber,
        point: HookPoint,
        phase: HookPhase,
        from: StateNumber,
        to: StateNumber,
    ) {
        let event = HookEvent {
            point,
            phase,
            from,
            to,
        };
        let limit = HookId(self.next_hook_id);
        let mut last = None;

        while let Some((id, oneshot, mut callback)) =
            self.states[state].take_next(point, phase, last, limit)
        {
            last = Some(id);
            trace!(
                hook = %id,
                state = self.state_name(state),
                point = point.label(),
                phase = phase.label(),
                "running hook"
            );
            callback(self, &event);

            if oneshot {
                self.states[state].remove(point, phase, id);
            } else {
                drop(self.states[state].restore(point, phase, id, callback));
            }
        }
    }
}

impl<C> fmt::Debug for Engine<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("current", &self.state_name(self.current))
            .field("handler", &self.handler)
            .field("pause_count", &self.pause_count)
            .field("deferred", &self.deferred)
            .field("dead", &self.dead)
            .finish_non_exhaustive()
    }
}
