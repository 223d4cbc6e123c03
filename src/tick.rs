//! Oversampling sub-counter shared by both framers.

use crate::config::{END_OF_SYMBOL, MID_SYMBOL, OVERSAMPLE};
use crate::note::{note, Notable};
use crate::synchronous::Synchronous;

/// Position of the current tick inside one symbol period.
///
/// Wraps at [`OVERSAMPLE`]. Each framer keeps its own counter in its state.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct SymbolCounter(u8);

impl SymbolCounter {
    pub const fn new() -> Self {
        SymbolCounter(0)
    }

    pub const fn at(index: u8) -> Self {
        SymbolCounter(index % OVERSAMPLE)
    }

    pub const fn index(self) -> u8 {
        self.0
    }

    /// The tick at which the line is sampled.
    pub const fn is_mid_symbol(self) -> bool {
        self.0 == MID_SYMBOL
    }

    pub const fn is_end_of_symbol(self) -> bool {
        self.0 == END_OF_SYMBOL
    }

    pub const fn next(self) -> Self {
        SymbolCounter((self.0 + 1) % OVERSAMPLE)
    }
}

impl Notable for SymbolCounter {
    fn width(&self) -> u8 {
        3
    }
    fn bits(&self) -> u64 {
        self.0 as u64
    }
}

/// Symbol timer run by both framers on the counter held in their state.
///
/// `clear` holds the counter at sample 0, e.g. while a framer is idle.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct SymbolTimer {}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct SymbolTimerInput {
    /// Reset signal. Pull high to reset the counter.
    pub reset: bool,
    /// Restart the symbol on the next tick
    pub clear: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct SymbolTimerOutput {
    pub index: u8,
    pub mid_symbol: bool,
    pub end_of_symbol: bool,
}

impl Synchronous for SymbolTimer {
    type Input = SymbolTimerInput;
    type Output = SymbolTimerOutput;
    type State = SymbolCounter;

    const INITIAL_STATE: Self::State = SymbolCounter::new();
    const UPDATE: fn(Self, Self::State, Self::Input) -> (Self::State, Self::Output) =
        symbol_timer_update;
}

pub fn symbol_timer_update(
    _params: SymbolTimer,
    state: SymbolCounter,
    input: SymbolTimerInput,
) -> (SymbolCounter, SymbolTimerOutput) {
    let output = SymbolTimerOutput {
        index: state.index(),
        mid_symbol: state.is_mid_symbol(),
        end_of_symbol: state.is_end_of_symbol(),
    };
    let next_state = if input.reset || input.clear {
        SymbolCounter::new()
    } else {
        state.next()
    };
    note("counter", state);
    note("mid_symbol", output.mid_symbol);
    (next_state, output)
}
