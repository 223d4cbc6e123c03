//! Hamming protected serial link.
//!
//! Transmit path: start request → [`StartPulse`] → [`HammingEncoder`] →
//! [`UartSender`] → `line_out`. Receive path: `line_in` → [`UartReceiver`] →
//! [`HammingDecoder`]. The two paths only share the tick, `reset` and
//! `enable`.
//!
//! Every sub-component is evaluated against the state from before the tick
//! and the combined next state is committed by the scheduler afterwards, so
//! the evaluation order below does not matter. Signals crossing between
//! components are registered outputs.

use crate::config::FrameFormat;
use crate::hamming::{
    hamming_decoder_update, hamming_encoder_update, Codeword, HammingDecoder,
    HammingDecoderInput, HammingDecoderOutput, HammingEncoder, HammingEncoderInput,
    HammingEncoderOutput, Nibble, Syndrome,
};
use crate::note::{note, note_pop_path, note_push_path};
use crate::start_pulse::{pulse_update, StartPulse, StartPulseInput};
use crate::synchronous::Synchronous;
use crate::uart::{
    uart_receiver_update, uart_sender_update, UartReceiver, UartReceiverInput,
    UartReceiverState, UartSender, UartSenderInput, UartSenderState,
};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Link {
    start_pulse: StartPulse,
    encoder: HammingEncoder,
    sender: UartSender,
    receiver: UartReceiver,
    decoder: HammingDecoder,
}

impl Link {
    pub const fn new() -> Self {
        Link {
            start_pulse: StartPulse {},
            encoder: HammingEncoder {},
            sender: UartSender::new(FrameFormat::CODEWORD),
            receiver: UartReceiver::new(FrameFormat::CODEWORD),
            decoder: HammingDecoder {},
        }
    }
}

impl Default for Link {
    fn default() -> Self {
        Link::new()
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LinkInput {
    /// Reset signal. Pull high to return every component to idle.
    pub reset: bool,
    /// Low freezes every component
    pub enable: bool,
    /// Serial line from the remote end, idles high
    pub line_in: bool,
    /// Level request, one transmission per rising edge
    pub start_request: bool,
    /// Nibble sampled on the tick the request edge is seen
    pub tx_payload: Nibble,
}

impl Default for LinkInput {
    fn default() -> Self {
        LinkInput {
            reset: false,
            enable: true,
            line_in: true,
            start_request: false,
            tx_payload: Nibble::ZERO,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct LinkOutput {
    /// Serial line driver
    pub line_out: bool,
    pub tx_busy: bool,
    /// One tick pulse, `rx_payload` holds a new codeword
    pub rx_frame_ready: bool,
    pub rx_payload: Codeword,
    pub decoded_data: Nibble,
    /// One tick pulse, `decoded_data` holds a new nibble
    pub decode_valid: bool,
    /// Diagnostic only
    pub syndrome: Syndrome,
    /// Diagnostic only
    pub fault: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LinkState {
    pub start_pulse: bool,
    pub encoder: HammingEncoderOutput,
    pub sender: UartSenderState,
    pub receiver: UartReceiverState,
    pub decoder: HammingDecoderOutput,
}

impl Synchronous for Link {
    type Input = LinkInput;
    type Output = LinkOutput;
    type State = LinkState;

    const INITIAL_STATE: Self::State = LinkState {
        start_pulse: StartPulse::INITIAL_STATE,
        encoder: HammingEncoder::INITIAL_STATE,
        sender: UartSender::INITIAL_STATE,
        receiver: UartReceiver::INITIAL_STATE,
        decoder: HammingDecoder::INITIAL_STATE,
    };
    const UPDATE: fn(Self, Self::State, Self::Input) -> (Self::State, Self::Output) = link_update;
}

pub fn link_update(params: Link, state: LinkState, input: LinkInput) -> (LinkState, LinkOutput) {
    note("input__enable", input.enable);
    note("input__start_request", input.start_request);
    note("input__line_in", input.line_in);
    let reset = input.reset;

    note_push_path("start_pulse");
    let (start_pulse_state, start) = pulse_update(
        params.start_pulse,
        state.start_pulse,
        StartPulseInput {
            reset,
            level: input.start_request,
        },
    );
    note_pop_path();

    note_push_path("encoder");
    let (encoder_state, encoder_output) = hamming_encoder_update(
        params.encoder,
        state.encoder,
        HammingEncoderInput {
            reset,
            enable: start,
            data: input.tx_payload,
        },
    );
    note_pop_path();

    note_push_path("sender");
    let (sender_state, sender_output) = uart_sender_update(
        params.sender,
        state.sender,
        UartSenderInput {
            reset,
            data: encoder_output.code.value(),
            start: encoder_output.valid,
        },
    );
    note_pop_path();

    note_push_path("receiver");
    let (receiver_state, receiver_output) = uart_receiver_update(
        params.receiver,
        state.receiver,
        UartReceiverInput {
            reset,
            rx: input.line_in,
        },
    );
    note_pop_path();

    let rx_payload = Codeword::truncate(receiver_output.data);

    note_push_path("decoder");
    let (decoder_state, decoder_output) = hamming_decoder_update(
        params.decoder,
        state.decoder,
        HammingDecoderInput {
            reset,
            strobe: receiver_output.valid,
            code: rx_payload,
        },
    );
    note_pop_path();

    let running = input.enable || reset;
    let next_state = if running {
        LinkState {
            start_pulse: start_pulse_state,
            encoder: encoder_state,
            sender: sender_state,
            receiver: receiver_state,
            decoder: decoder_state,
        }
    } else {
        state
    };

    // While frozen the held pulses must not repeat every tick
    let output = LinkOutput {
        line_out: sender_output.tx,
        tx_busy: sender_output.busy,
        rx_frame_ready: receiver_output.valid && running,
        rx_payload,
        decoded_data: decoder_output.data,
        decode_valid: decoder_output.valid && running,
        syndrome: decoder_output.syndrome,
        fault: decoder_output.fault,
    };

    note("output__line_out", output.line_out);
    note("output__tx_busy", output.tx_busy);
    note("output__decode_valid", output.decode_valid);

    (next_state, output)
}
