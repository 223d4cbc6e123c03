use tracing::debug;

use crate::config::FrameFormat;
use crate::note::{note, note_pop_path, note_push_path, Notable};
use crate::synchronous::Synchronous;
use crate::tick::{symbol_timer_update, SymbolCounter, SymbolTimer, SymbolTimerInput};

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct UartReceiver {
    /// Payload bits per frame
    format: FrameFormat,
}

impl UartReceiver {
    pub const fn new(format: FrameFormat) -> Self {
        UartReceiver { format }
    }

    pub const fn format(&self) -> FrameFormat {
        self.format
    }
}

// tag::interface[]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct UartReceiverInput {
    /// Reset signal. Pull high to reset the state machine.
    pub reset: bool,
    /// Serial line, idles high
    pub rx: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct UartReceiverOutput {
    /// Last complete payload
    pub data: u8,
    /// High for one tick when `data` was just replaced by a new frame
    ///
    /// Frames with a bad stop bit never raise this.
    pub valid: bool,
    pub phase: UartReceiverPhase,
}
// end::interface[]

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum UartReceiverPhase {
    #[default]
    Idle,
    Start,
    Data,
    Stop,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct UartReceiverState {
    pub phase: UartReceiverPhase,
    /// Position inside the current symbol
    pub counter: SymbolCounter,
    /// Payload bit being received
    pub bit: u8,
    /// Payload bits received so far, shifted in from the top
    pub shift: u8,
    /// Last complete payload
    pub data: u8,
    pub valid: bool,
}

impl UartReceiverState {
    const fn default() -> Self {
        UartReceiverState {
            phase: UartReceiverPhase::Idle,
            counter: SymbolCounter::new(),
            bit: 0,
            shift: 0,
            data: 0,
            valid: false,
        }
    }
}

impl Notable for UartReceiverPhase {
    fn width(&self) -> u8 {
        2
    }
    fn bits(&self) -> u64 {
        *self as u64
    }
}

impl Synchronous for UartReceiver {
    type Input = UartReceiverInput;
    type Output = UartReceiverOutput;
    type State = UartReceiverState;

    const INITIAL_STATE: Self::State = UartReceiverState::default();
    const UPDATE: fn(Self, Self::State, Self::Input) -> (Self::State, Self::Output) =
        uart_receiver_update;
}

pub fn uart_receiver_update(
    params: UartReceiver,
    state: UartReceiverState,
    input: UartReceiverInput,
) -> (UartReceiverState, UartReceiverOutput) {
    note("reset", input.reset);
    note("rx", input.rx);

    let format = params.format;
    let output = UartReceiverOutput {
        data: state.data,
        valid: state.valid,
        phase: state.phase,
    };

    // Idle waits for the falling edge with the counter held at zero, so the
    // edge tick is sample 0 of the start symbol
    let clear = match state.phase {
        UartReceiverPhase::Idle => input.rx,
        UartReceiverPhase::Start => state.counter.is_mid_symbol() && input.rx,
        _ => false,
    };
    note_push_path("timer");
    let (counter, timer) = symbol_timer_update(
        SymbolTimer {},
        state.counter,
        SymbolTimerInput {
            reset: input.reset,
            clear,
        },
    );
    note_pop_path();

    let ticking = UartReceiverState {
        counter,
        valid: false,
        ..state
    };

    let next_state = if input.reset {
        UartReceiverState::default()
    } else {
        match state.phase {
            UartReceiverPhase::Idle => {
                if input.rx {
                    ticking
                } else {
                    UartReceiverState {
                        phase: UartReceiverPhase::Start,
                        ..ticking
                    }
                }
            }
            UartReceiverPhase::Start => {
                if timer.mid_symbol && input.rx {
                    debug!("receiver: false start");
                    UartReceiverState {
                        phase: UartReceiverPhase::Idle,
                        ..ticking
                    }
                } else if timer.end_of_symbol {
                    UartReceiverState {
                        phase: UartReceiverPhase::Data,
                        bit: 0,
                        ..ticking
                    }
                } else {
                    ticking
                }
            }
            UartReceiverPhase::Data => {
                if timer.mid_symbol {
                    // LSB first: after the last bit the first one sits at bit 0
                    let top = (input.rx as u8) << (format.width() - 1);
                    UartReceiverState {
                        shift: (state.shift >> 1) | top,
                        ..ticking
                    }
                } else if timer.end_of_symbol {
                    if state.bit + 1 == format.width() {
                        UartReceiverState {
                            phase: UartReceiverPhase::Stop,
                            bit: 0,
                            ..ticking
                        }
                    } else {
                        UartReceiverState {
                            bit: state.bit + 1,
                            ..ticking
                        }
                    }
                } else {
                    ticking
                }
            }
            UartReceiverPhase::Stop => {
                if timer.mid_symbol {
                    if input.rx {
                        let data = (state.shift as u16 & format.mask()) as u8;
                        debug!(data, "receiver: frame received");
                        UartReceiverState {
                            data,
                            valid: true,
                            ..ticking
                        }
                    } else {
                        debug!(shift = state.shift, "receiver: bad stop bit, frame dropped");
                        ticking
                    }
                } else if timer.end_of_symbol {
                    UartReceiverState {
                        phase: UartReceiverPhase::Idle,
                        ..ticking
                    }
                } else {
                    ticking
                }
            }
        }
    };

    note("phase", state.phase);
    note("valid", output.valid);
    note("data", output.data);

    (next_state, output)
}
