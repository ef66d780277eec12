//! Property-based tests for the machine engine.
//!
//! These tests use proptest to drive machines through random sequences of
//! driver operations and compare them against a small reference model.

use proptest::prelude::*;
use statewire::builder::MachineDefinitionBuilder;
use statewire::core::{HookPhase, HookPoint, MachineDefinition, StateNumber};
use statewire::engine::{Engine, Machine, MachineError, ProcessResult};
use statewire::state_numbers;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

state_numbers! {
    mod st {
        INIT = 1,
        A = 2,
        B = 3,
        C = 4,
        FREE = 5,
    }
}

#[derive(Default)]
struct Counts {
    next: StateNumber,
    enters: usize,
}

fn bootstrap(_: &mut Engine<Counts>, _: &mut Counts) -> StateNumber {
    st::A
}
fn process_next(_: &mut Engine<Counts>, counts: &mut Counts) -> StateNumber {
    std::mem::take(&mut counts.next)
}
fn count_enter(_: &mut Engine<Counts>, counts: &mut Counts) {
    counts.enters += 1;
}
fn release(_: &mut Engine<Counts>, _: &mut Counts) {}

fn definition() -> Arc<MachineDefinition<Counts>> {
    let mut builder = MachineDefinitionBuilder::<Counts>::new()
        .state(st::INIT, "Init")
        .state(st::A, "A")
        .state(st::B, "B")
        .state(st::C, "C")
        .state(st::FREE, "Free")
        .on_process(st::INIT, bootstrap)
        .on_enter(st::FREE, release)
        .init(st::INIT)
        .free(st::FREE);
    for state in [st::A, st::B, st::C] {
        builder = builder
            .on_process(state, process_next)
            .on_enter(state, count_enter);
    }
    Arc::new(builder.build().unwrap())
}

#[derive(Debug, Clone)]
enum Op {
    Request(StateNumber),
    Pause,
    Resume,
    Process(StateNumber),
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..8usize).prop_map(Op::Request),
        Just(Op::Pause),
        Just(Op::Resume),
        prop::sample::select(vec![0, st::A, st::B, st::C]).prop_map(Op::Process),
    ]
}

/// Reference model of the driver-visible machine state.
struct Model {
    current: StateNumber,
    pause_count: usize,
    deferred: Option<StateNumber>,
    transitions: usize,
}

impl Model {
    fn request(&mut self, state: StateNumber) -> Result<(), MachineError> {
        if state == 0 || state > st::MAX {
            return Err(MachineError::InvalidState {
                state,
                max_state: st::MAX,
            });
        }
        if state == self.current {
            return Ok(());
        }
        if state == st::INIT || state == st::FREE {
            return Err(MachineError::ReservedState { state });
        }
        if self.pause_count > 0 {
            if let Some(pending) = self.deferred {
                return Err(MachineError::AlreadyDeferred {
                    pending,
                    requested: state,
                });
            }
            self.deferred = Some(state);
            return Ok(());
        }
        self.move_to(state);
        Ok(())
    }

    fn move_to(&mut self, state: StateNumber) {
        if state != self.current {
            self.current = state;
            self.transitions += 1;
        }
    }
}

proptest! {
    #[test]
    fn machine_matches_reference_model(ops in prop::collection::vec(arbitrary_op(), 0..40)) {
        let mut machine = Machine::create(definition(), Counts::default());
        let mut model = Model {
            current: st::A,
            pause_count: 0,
            deferred: None,
            transitions: 1,
        };

        for op in ops {
            match op {
                Op::Request(state) => {
                    let expected = model.request(state);
                    prop_assert_eq!(machine.transition(state), expected);
                }
                Op::Pause => {
                    machine.pause();
                    model.pause_count += 1;
                }
                Op::Resume => {
                    if model.pause_count == 0 {
                        continue;
                    }
                    machine.resume();
                    model.pause_count -= 1;
                    if model.pause_count == 0 {
                        if let Some(target) = model.deferred.take() {
                            model.move_to(target);
                        }
                    }
                }
                Op::Process(next) => {
                    if model.pause_count > 0 || model.deferred.is_some() {
                        continue;
                    }
                    machine.context_mut().next = next;
                    let expected = if next == 0 {
                        ProcessResult::NoChange
                    } else {
                        model.move_to(next);
                        ProcessResult::Transitioned(next)
                    };
                    prop_assert_eq!(machine.process(), expected);
                }
            }

            prop_assert_eq!(machine.current_state(), model.current);
            prop_assert_eq!(machine.pause_count(), model.pause_count);
            prop_assert_eq!(machine.deferred_state(), model.deferred);
            prop_assert!(machine.deferred_state().is_none() || machine.pause_count() > 0);
            prop_assert_eq!(machine.context().enters, model.transitions);
        }

        let released = Rc::new(Cell::new(0));
        let seen = released.clone();
        machine
            .register(st::FREE, HookPoint::Enter, HookPhase::Post, false, move |_, _| {
                seen.set(seen.get() + 1)
            })
            .unwrap();
        machine.dispose();
        prop_assert_eq!(released.get(), 1);
    }

    #[test]
    fn oneshot_hook_fires_at_most_once(round_trips in 0..6usize) {
        let mut machine = Machine::create(definition(), Counts::default());
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        machine
            .register(st::B, HookPoint::Exit, HookPhase::Pre, true, move |_, _| {
                counter.set(counter.get() + 1)
            })
            .unwrap();

        for _ in 0..round_trips {
            machine.transition(st::B).unwrap();
            machine.transition(st::C).unwrap();
        }

        prop_assert_eq!(fired.get(), round_trips.min(1));
        let remaining = machine
            .engine()
            .hook_count(st::B, HookPoint::Exit, HookPhase::Pre);
        prop_assert_eq!(remaining, usize::from(round_trips == 0));
    }

    #[test]
    fn hooks_fire_in_registration_order(count in 1..12usize) {
        let mut machine = Machine::create(definition(), Counts::default());
        let order = Rc::new(std::cell::RefCell::new(Vec::new()));
        for index in 0..count {
            let order = order.clone();
            machine
                .register(st::C, HookPoint::Enter, HookPhase::Pre, false, move |_, _| {
                    order.borrow_mut().push(index)
                })
                .unwrap();
        }

        machine.transition(st::C).unwrap();

        prop_assert_eq!(order.borrow().clone(), (0..count).collect::<Vec<_>>());
    }

    #[test]
    fn state_names_are_total(number in 0..64usize) {
        let machine = Machine::create(definition(), Counts::default());
        let name = machine.state_name(number);
        if number == 0 {
            prop_assert_eq!(name, "A");
        } else if number > st::MAX {
            prop_assert_eq!(name, "unknown");
        } else {
            prop_assert_ne!(name, "unknown");
        }
    }
}
