use crate::note::note;
use crate::synchronous::Synchronous;

/// Turns a level request into a one tick pulse on its rising edge.
///
/// Sits in front of the transmit framer, so a start request held high for
/// several ticks only triggers one transmission.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct StartPulse {}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct StartPulseInput {
    /// Reset signal. Pull high to forget the previous level.
    pub reset: bool,
    /// Request level
    pub level: bool,
}

impl Synchronous for StartPulse {
    type Input = StartPulseInput;
    type Output = bool;
    /// Level seen on the previous tick
    type State = bool;

    const INITIAL_STATE: Self::State = false;
    const UPDATE: fn(Self, Self::State, Self::Input) -> (Self::State, Self::Output) = pulse_update;
}

pub fn pulse_update(_params: StartPulse, state: bool, input: StartPulseInput) -> (bool, bool) {
    let output = input.level && !state && !input.reset;
    note("state", state);
    note("input", input.level);
    note("output", output);
    (input.level && !input.reset, output)
}
