//! Synchronous component model and the tick scheduler that drives it.
//!
//! A component is a small `Copy` parameter struct. Its behaviour is a pure
//! update function taking the parameters, the current state and the inputs of
//! this tick and returning the next state and the outputs of this tick. The
//! scheduler is the only place that commits state, after the update has
//! returned, so everything a component reads during a tick is the value from
//! before the tick.

use crate::note::{note_clock, note_time};

pub type UpdateFn<T> = fn(
    T,
    <T as Synchronous>::State,
    <T as Synchronous>::Input,
) -> (<T as Synchronous>::State, <T as Synchronous>::Output);

pub trait Synchronous: Copy + Sized {
    type Input: Copy;
    type Output: Copy;
    type State: Copy;

    const INITIAL_STATE: Self::State;
    const UPDATE: UpdateFn<Self>;
}

/// Time base used to stamp notes.
///
/// The name becomes the top module of waveform dumps.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Clock {
    pub name: &'static str,
    /// Duration of one tick in VCD time units
    pub period: u64,
}

impl Clock {
    pub const fn new(name: &'static str, period: u64) -> Self {
        Clock { name, period }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Clock::new("clock", 1000 * 1000)
    }
}

/// Steps a single component one tick at a time.
///
/// Use this instead of [`simulate`] when the next input depends on the last
/// output, e.g. when looping the transmit line back into the receiver.
#[derive(Copy, Clone)]
pub struct Simulation<T: Synchronous> {
    dut: T,
    state: T::State,
    clock: Clock,
    tick: u64,
}

impl<T: Synchronous> Simulation<T> {
    pub fn new(dut: T) -> Self {
        Self::with_clock(dut, Clock::default())
    }

    pub fn with_clock(dut: T, clock: Clock) -> Self {
        Simulation {
            dut,
            state: T::INITIAL_STATE,
            clock,
            tick: 0,
        }
    }

    /// Evaluate one tick and commit the resulting state.
    pub fn step(&mut self, input: T::Input) -> T::Output {
        note_clock(self.clock.name);
        note_time(self.time());
        let (next_state, output) = (T::UPDATE)(self.dut, self.state, input);
        self.state = next_state;
        self.tick += 1;
        output
    }

    pub fn state(&self) -> T::State {
        self.state
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn time(&self) -> u64 {
        self.tick * self.clock.period
    }
}

/// Run `dut` over `inputs`, yielding one output per tick.
pub fn simulate<T, I>(dut: T, inputs: I) -> impl Iterator<Item = T::Output>
where
    T: Synchronous,
    I: IntoIterator<Item = T::Input>,
{
    simulate_with_clock(dut, inputs, Clock::default())
}

pub fn simulate_with_clock<T, I>(dut: T, inputs: I, clock: Clock) -> impl Iterator<Item = T::Output>
where
    T: Synchronous,
    I: IntoIterator<Item = T::Input>,
{
    let mut simulation = Simulation::with_clock(dut, clock);
    inputs.into_iter().map(move |input| simulation.step(input))
}
