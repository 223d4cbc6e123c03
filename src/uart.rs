//! Oversampled serial framing.
//!
//! Frames are `[start = 0, payload LSB first, stop = 1]` with every symbol held
//! for [`OVERSAMPLE`](crate::config::OVERSAMPLE) ticks. The receiver samples
//! the line in the middle of each symbol.

mod uart_receiver;
mod uart_sender;

pub use uart_receiver::{
    uart_receiver_update, UartReceiver, UartReceiverInput, UartReceiverOutput, UartReceiverPhase,
    UartReceiverState,
};
pub use uart_sender::{
    uart_sender_update, UartSender, UartSenderInput, UartSenderOutput, UartSenderPhase,
    UartSenderState,
};

use crate::config::FrameFormat;
use crate::note::{note, note_pop_path, note_push_path};
use crate::synchronous::Synchronous;

/// Combines a UartReceiver and a UartSender sharing one frame format.
///
/// Carries raw payloads without any error correction.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Uart {
    receiver: UartReceiver,
    sender: UartSender,
}

impl Uart {
    pub const fn new(format: FrameFormat) -> Self {
        Uart {
            receiver: UartReceiver::new(format),
            sender: UartSender::new(format),
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct UartInput {
    /// Reset signal. Pull high to reset the state machine.
    pub reset: bool,
    /// Data input line
    pub rx: bool,
    /// Data to transmit
    pub data: u8,
    /// Pulse high to transmit data
    pub start: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct UartOutput {
    /// Last received payload
    pub received_data: u8,
    /// Set to true for one tick when new data was received
    pub valid: bool,
    /// Set to true when new data can be transmitted
    pub ready: bool,
    /// Data output line
    pub tx: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct UartState {
    pub receiver: UartReceiverState,
    pub sender: UartSenderState,
}

impl Synchronous for Uart {
    type Input = UartInput;
    type Output = UartOutput;
    type State = UartState;

    const INITIAL_STATE: Self::State = UartState {
        receiver: UartReceiver::INITIAL_STATE,
        sender: UartSender::INITIAL_STATE,
    };
    const UPDATE: fn(Self, Self::State, Self::Input) -> (Self::State, Self::Output) = uart_update;
}

pub fn uart_update(params: Uart, state: UartState, input: UartInput) -> (UartState, UartOutput) {
    note("input__rx", input.rx);
    note("input__start", input.start);

    note_push_path("receiver");
    let (receiver_state, receiver_output) = uart_receiver_update(
        params.receiver,
        state.receiver,
        UartReceiverInput {
            reset: input.reset,
            rx: input.rx,
        },
    );
    note_pop_path();
    note_push_path("sender");
    let (sender_state, sender_output) = uart_sender_update(
        params.sender,
        state.sender,
        UartSenderInput {
            reset: input.reset,
            data: input.data,
            start: input.start,
        },
    );
    note_pop_path();

    let next_state = UartState {
        receiver: receiver_state,
        sender: sender_state,
    };
    let output = UartOutput {
        received_data: receiver_output.data,
        valid: receiver_output.valid,
        ready: !sender_output.busy,
        tx: sender_output.tx,
    };

    note("output__valid", output.valid);
    note("output__tx", output.tx);

    (next_state, output)
}
