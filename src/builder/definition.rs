//! Builder for constructing machine definitions.

use crate::builder::error::BuildError;
use crate::core::{
    MachineDefinition, ProcessFn, StateDefinition, StateNumber, TransitionFn, NO_STATE,
};

/// Builder for machine definitions with a fluent API.
///
/// Callbacks may be attached in any order relative to `.state()`, but every
/// number they mention must be declared by the time `.build()` runs.
///
/// # Example
///
/// ```
/// use statewire::builder::MachineDefinitionBuilder;
/// use statewire::engine::Engine;
///
/// fn bootstrap(_: &mut Engine<u32>, _: &mut u32) -> usize {
///     2
/// }
/// fn count(_: &mut Engine<u32>, entered: &mut u32) {
///     *entered += 1;
/// }
/// fn release(_: &mut Engine<u32>, _: &mut u32) {}
///
/// let definition = MachineDefinitionBuilder::<u32>::new()
///     .state(1, "Start")
///     .state(2, "Running")
///     .state(3, "Free")
///     .on_process(1, bootstrap)
///     .on_enter(2, count)
///     .on_enter(3, release)
///     .init(1)
///     .free(3)
///     .build()
///     .unwrap();
///
/// assert_eq!(definition.max_state(), 3);
/// ```
pub struct MachineDefinitionBuilder<C> {
    states: Vec<StateDefinition<C>>,
    enter: Vec<(StateNumber, TransitionFn<C>)>,
    process: Vec<(StateNumber, ProcessFn<C>)>,
    exit: Vec<(StateNumber, TransitionFn<C>)>,
    init: Option<StateNumber>,
    free: Option<StateNumber>,
    history_limit: usize,
}

impl<C> MachineDefinitionBuilder<C> {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            enter: Vec::new(),
            process: Vec::new(),
            exit: Vec::new(),
            init: None,
            free: None,
            history_limit: 0,
        }
    }

    /// Declare a state.
    pub fn state(mut self, number: StateNumber, name: &'static str) -> Self {
        self.states.push(StateDefinition::new(number, name));
        self
    }

    /// Attach the callback run when `number` is entered.
    pub fn on_enter(mut self, number: StateNumber, callback: TransitionFn<C>) -> Self {
        self.enter.push((number, callback));
        self
    }

    /// Attach the callback run when the driver processes `number`.
    pub fn on_process(mut self, number: StateNumber, callback: ProcessFn<C>) -> Self {
        self.process.push((number, callback));
        self
    }

    /// Attach the callback run when `number` is exited.
    pub fn on_exit(mut self, number: StateNumber, callback: TransitionFn<C>) -> Self {
        self.exit.push((number, callback));
        self
    }

    /// Set the bootstrap state (required).
    pub fn init(mut self, number: StateNumber) -> Self {
        self.init = Some(number);
        self
    }

    /// Set the terminal state entered on disposal (required).
    pub fn free(mut self, number: StateNumber) -> Self {
        self.free = Some(number);
        self
    }

    /// Keep the last `limit` transitions of every machine (0 disables).
    pub fn history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Build the definition.
    /// Returns an error if the state table is incomplete or inconsistent.
    pub fn build(self) -> Result<MachineDefinition<C>, BuildError> {
        if self.states.is_empty() {
            return Err(BuildError::NoStates);
        }

        let max = self
            .states
            .iter()
            .map(StateDefinition::number)
            .max()
            .unwrap_or(NO_STATE);
        // More numbers than declarations means a gap; report it before
        // sizing the table from `max`.
        if max > self.states.len() {
            return Err(BuildError::MissingStateNumber {
                missing: first_gap(&self.states),
                max,
            });
        }
        let mut table: Vec<Option<StateDefinition<C>>> = (0..=max).map(|_| None).collect();

        for state in self.states {
            let number = state.number;
            if number == NO_STATE {
                return Err(BuildError::ReservedStateNumber);
            }
            if table[number].replace(state).is_some() {
                return Err(BuildError::DuplicateState { number });
            }
        }

        for (number, callback) in self.enter {
            slot(&mut table, number)?.enter = Some(callback);
        }
        for (number, callback) in self.process {
            slot(&mut table, number)?.process = Some(callback);
        }
        for (number, callback) in self.exit {
            slot(&mut table, number)?.exit = Some(callback);
        }

        let mut states = Vec::with_capacity(max + 1);
        states.push(StateDefinition::sentinel());
        for (number, state) in table.into_iter().enumerate().skip(1) {
            let state = state.ok_or(BuildError::MissingStateNumber {
                missing: number,
                max,
            })?;
            states.push(state);
        }

        let init = self.init.ok_or(BuildError::MissingInitState)?;
        let free = self.free.ok_or(BuildError::MissingFreeState)?;
        for number in [init, free] {
            if number == NO_STATE || number > max {
                return Err(BuildError::UndeclaredState { number });
            }
        }
        if init == free {
            return Err(BuildError::InitIsFree { number: init });
        }

        let bootstrap = &states[init];
        if bootstrap.has_enter() || bootstrap.has_exit() {
            return Err(BuildError::InitHasTransitionCallbacks { number: init });
        }
        if !bootstrap.has_process() {
            return Err(BuildError::InitWithoutProcess { number: init });
        }
        if !states[free].has_enter() {
            return Err(BuildError::FreeWithoutEnter { number: free });
        }

        Ok(MachineDefinition {
            states,
            init,
            free,
            history_limit: self.history_limit,
        })
    }
}

fn slot<C>(
    table: &mut [Option<StateDefinition<C>>],
    number: StateNumber,
) -> Result<&mut StateDefinition<C>, BuildError> {
    table
        .get_mut(number)
        .and_then(Option::as_mut)
        .ok_or(BuildError::UndeclaredState { number })
}

/// Lowest number in `1..` that no declared state uses.
fn first_gap<C>(states: &[StateDefinition<C>]) -> StateNumber {
    let mut numbers: Vec<_> = states
        .iter()
        .map(StateDefinition::number)
        .filter(|&number| number != NO_STATE)
        .collect();
    numbers.sort_unstable();
    numbers.dedup();
    numbers
        .iter()
        .zip(1..)
        .find(|(&number, expected)| number != *expected)
        .map_or(numbers.len() + 1, |(_, expected)| expected)
}

impl<C> Default for MachineDefinitionBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
