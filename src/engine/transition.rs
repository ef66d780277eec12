//! The transition sequence: exit hooks and callback, state swap, enter hooks
//! and callback.

use crate::core::{HookPhase, HookPoint, StateNumber, TransitionCause, TransitionRecord};
use crate::engine::instance::Handler;
use crate::engine::machine::Machine;
use chrono::Utc;
use tracing::debug;

impl<C> Machine<C> {
    /// Move from the current state to `target`, running, in order:
    /// pre-exit hooks, exit callback, post-exit hooks, the state swap,
    /// pre-enter hooks, enter callback, post-enter hooks.
    ///
    /// Callers have already validated `target` and ruled out self-transitions
    /// and deferral. The reentrancy guard is held for the whole sequence.
    pub(crate) fn run_transition(&mut self, target: StateNumber, cause: TransitionCause) {
        let from = self.engine.current;
        self.engine.enter_handler(Handler::Transition(cause));

        debug!(
            from = self.engine.state_name(from),
            to = self.engine.state_name(target),
            ?cause,
            "state transition"
        );

        let exit = self.engine.definition.slot(from).exit;
        let enter = self.engine.definition.slot(target).enter;

        self.engine
            .run_hooks(from, HookPoint::Exit, HookPhase::Pre, from, target);
        if let Some(exit) = exit {
            exit(&mut self.engine, &mut self.context);
        }
        self.engine
            .run_hooks(from, HookPoint::Exit, HookPhase::Post, from, target);

        self.engine.current = target;

        self.engine
            .run_hooks(target, HookPoint::Enter, HookPhase::Pre, from, target);
        if let Some(enter) = enter {
            enter(&mut self.engine, &mut self.context);
        }
        self.engine
            .run_hooks(target, HookPoint::Enter, HookPhase::Post, from, target);

        self.engine.leave_handler();
        self.engine.history.record(TransitionRecord {
            from,
            to: target,
            cause,
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use crate::builder::MachineDefinitionBuilder;
    use crate::core::{HookEvent, HookPhase, HookPoint, StateNumber, TransitionCause};
    use crate::engine::{Engine, Handler, Machine};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Ctx {
        log: Log,
    }

    fn to_a(_: &mut Engine<Ctx>, _: &mut Ctx) -> StateNumber {
        2
    }
    fn stay(_: &mut Engine<Ctx>, _: &mut Ctx) -> StateNumber {
        0
    }
    fn exit_a(_: &mut Engine<Ctx>, ctx: &mut Ctx) {
        ctx.log.borrow_mut().push("exit A".into());
    }
    fn enter_b(engine: &mut Engine<Ctx>, ctx: &mut Ctx) {
        assert_eq!(
            engine.handler(),
            Some(Handler::Transition(TransitionCause::Request))
        );
        ctx.log.borrow_mut().push("enter B".into());
    }
    fn release(_: &mut Engine<Ctx>, ctx: &mut Ctx) {
        ctx.log.borrow_mut().push("free".into());
    }

    fn machine() -> (Machine<Ctx>, Log) {
        let definition = MachineDefinitionBuilder::<Ctx>::new()
            .state(1, "Init")
            .state(2, "A")
            .state(3, "B")
            .state(4, "Free")
            .on_process(1, to_a)
            .on_process(2, stay)
            .on_exit(2, exit_a)
            .on_enter(3, enter_b)
            .on_enter(4, release)
            .init(1)
            .free(4)
            .history_limit(8)
            .build()
            .unwrap();
        let log = Log::default();
        let machine = Machine::create(Arc::new(definition), Ctx { log: log.clone() });
        (machine, log)
    }

    fn logging_hook(log: &Log, label: &'static str) -> impl FnMut(&mut Engine<Ctx>, &HookEvent) {
        let log = log.clone();
        move |_: &mut Engine<Ctx>, event: &HookEvent| {
            log.borrow_mut()
                .push(format!("{label} {}->{}", event.from, event.to))
        }
    }

    #[test]
    fn transition_runs_phases_in_order() {
        let (mut machine, log) = machine();
        machine
            .register(2, HookPoint::Exit, HookPhase::Pre, false, logging_hook(&log, "H1"))
            .unwrap();
        machine
            .register(2, HookPoint::Exit, HookPhase::Post, false, logging_hook(&log, "H2"))
            .unwrap();
        machine
            .register(3, HookPoint::Enter, HookPhase::Pre, false, logging_hook(&log, "H3"))
            .unwrap();
        machine
            .register(3, HookPoint::Enter, HookPhase::Post, false, logging_hook(&log, "H4"))
            .unwrap();

        machine.transition(3).unwrap();

        assert_eq!(
            *log.borrow(),
            vec!["H1 2->3", "exit A", "H2 2->3", "H3 2->3", "enter B", "H4 2->3"]
        );
        assert_eq!(machine.current_state(), 3);
        assert_eq!(machine.engine().handler(), None);
    }

    #[test]
    fn hooks_see_the_swapped_state_only_after_exit() {
        let (mut machine, _log) = machine();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let exit_seen = seen.clone();
        machine
            .register(2, HookPoint::Exit, HookPhase::Post, false, move |engine, _| {
                exit_seen.borrow_mut().push(engine.current_state())
            })
            .unwrap();
        let enter_seen = seen.clone();
        machine
            .register(3, HookPoint::Enter, HookPhase::Pre, false, move |engine, _| {
                enter_seen.borrow_mut().push(engine.current_state())
            })
            .unwrap();

        machine.transition(3).unwrap();

        assert_eq!(*seen.borrow(), vec![2, 3]);
    }

    #[test]
    fn history_records_cause() {
        let (mut machine, _log) = machine();
        machine.transition(3).unwrap();

        let causes: Vec<_> = machine.history().transitions().map(|r| r.cause).collect();
        assert_eq!(
            causes,
            vec![TransitionCause::Bootstrap, TransitionCause::Request]
        );
        assert_eq!(machine.history().get_path(), vec![1, 2, 3]);
    }
}
