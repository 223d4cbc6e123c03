use crate::note::note;
use crate::synchronous::Synchronous;

use super::{decode, Codeword, Nibble, Syndrome};

/// Hamming(7,4) decoder with a one tick output latch.
///
/// Takes the whole codeword in parallel. The corrected data, the syndrome
/// and a `valid` pulse appear on the tick after `strobe`.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct HammingDecoder {}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct HammingDecoderInput {
    /// Reset signal. Pull high to clear the output latch.
    pub reset: bool,
    /// `code` holds a freshly received codeword
    pub strobe: bool,
    pub code: Codeword,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct HammingDecoderOutput {
    /// Corrected data bits
    pub data: Nibble,
    /// Diagnostic only
    pub syndrome: Syndrome,
    /// Set when the syndrome was non-zero
    pub fault: bool,
    /// High for exactly one tick per strobe
    pub valid: bool,
}

impl HammingDecoderOutput {
    pub(crate) const fn default() -> Self {
        HammingDecoderOutput {
            data: Nibble::ZERO,
            syndrome: Syndrome::NONE,
            fault: false,
            valid: false,
        }
    }
}

impl Synchronous for HammingDecoder {
    type Input = HammingDecoderInput;
    type Output = HammingDecoderOutput;
    type State = HammingDecoderOutput;

    const INITIAL_STATE: Self::State = HammingDecoderOutput::default();
    const UPDATE: fn(Self, Self::State, Self::Input) -> (Self::State, Self::Output) =
        hamming_decoder_update;
}

pub fn hamming_decoder_update(
    _params: HammingDecoder,
    state: HammingDecoderOutput,
    input: HammingDecoderInput,
) -> (HammingDecoderOutput, HammingDecoderOutput) {
    note("strobe", input.strobe);
    note("code", input.code);

    let next_state = if input.reset {
        HammingDecoderOutput::default()
    } else if input.strobe {
        let decoded = decode(input.code);
        HammingDecoderOutput {
            data: decoded.data,
            syndrome: decoded.syndrome,
            fault: decoded.fault(),
            valid: true,
        }
    } else {
        HammingDecoderOutput {
            valid: false,
            ..state
        }
    };

    note("data", state.data);
    note("syndrome", state.syndrome);
    note("valid", state.valid);

    (next_state, state)
}
