use crate::note::note;
use crate::synchronous::Synchronous;

use super::{encode, Codeword, Nibble};

/// Registered Hamming(7,4) encoder.
///
/// The codeword for the nibble presented together with `enable` becomes
/// visible on the following tick, together with a one tick `valid` pulse.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct HammingEncoder {}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct HammingEncoderInput {
    /// Reset signal. Pull high to clear the output register.
    pub reset: bool,
    /// Encode `data` on this tick
    pub enable: bool,
    pub data: Nibble,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct HammingEncoderOutput {
    /// Last encoded codeword
    pub code: Codeword,
    /// High for one tick after every enable
    pub valid: bool,
}

impl HammingEncoderOutput {
    pub(crate) const fn default() -> Self {
        HammingEncoderOutput {
            code: Codeword::ZERO,
            valid: false,
        }
    }
}

impl Synchronous for HammingEncoder {
    type Input = HammingEncoderInput;
    type Output = HammingEncoderOutput;
    type State = HammingEncoderOutput;

    const INITIAL_STATE: Self::State = HammingEncoderOutput::default();
    const UPDATE: fn(Self, Self::State, Self::Input) -> (Self::State, Self::Output) =
        hamming_encoder_update;
}

pub fn hamming_encoder_update(
    _params: HammingEncoder,
    state: HammingEncoderOutput,
    input: HammingEncoderInput,
) -> (HammingEncoderOutput, HammingEncoderOutput) {
    note("enable", input.enable);
    note("data", input.data);

    let next_state = if input.reset {
        HammingEncoderOutput::default()
    } else if input.enable {
        HammingEncoderOutput {
            code: encode(input.data),
            valid: true,
        }
    } else {
        HammingEncoderOutput {
            code: state.code,
            valid: false,
        }
    };

    note("code", state.code);
    note("valid", state.valid);

    (next_state, state)
}

#[cfg(test)]
mod test {
    use itertools::Itertools;

    use super::{HammingEncoder, HammingEncoderInput};
    use crate::hamming::{encode, Codeword, Nibble};
    use crate::synchronous::simulate;

    impl HammingEncoderInput {
        fn idle() -> Self {
            HammingEncoderInput::default()
        }

        fn encode(data: u8) -> Self {
            HammingEncoderInput {
                reset: false,
                enable: true,
                data: Nibble::truncate(data),
            }
        }
    }

    #[test]
    fn codeword_appears_one_tick_after_enable() {
        let input = vec![
            HammingEncoderInput::idle(),
            HammingEncoderInput::encode(0b0001),
            HammingEncoderInput::idle(),
            HammingEncoderInput::idle(),
        ];
        let outputs = simulate(HammingEncoder {}, input).collect_vec();
        assert!(!outputs[1].valid);
        assert!(outputs[2].valid);
        assert_eq!(outputs[2].code, encode(Nibble::truncate(0b0001)));
        assert!(!outputs[3].valid);
        // The code register holds its value after the pulse
        assert_eq!(outputs[3].code, outputs[2].code);
    }

    #[test]
    fn back_to_back_enables_stream_codewords() {
        let input = Nibble::all()
            .map(|data| HammingEncoderInput::encode(data.value()))
            .chain(std::iter::once(HammingEncoderInput::idle()));
        let outputs = simulate(HammingEncoder {}, input).skip(1).collect_vec();
        assert!(outputs.iter().all(|o| o.valid));
        let codes = outputs.iter().map(|o| o.code).collect_vec();
        assert_eq!(codes, Nibble::all().map(encode).collect_vec());
    }

    #[test]
    fn reset_clears_the_register() {
        let input = vec![
            HammingEncoderInput::encode(0b1111),
            HammingEncoderInput {
                reset: true,
                enable: true,
                data: Nibble::truncate(0b1111),
            },
            HammingEncoderInput::idle(),
        ];
        let outputs = simulate(HammingEncoder {}, input).collect_vec();
        assert!(outputs[1].valid);
        assert!(!outputs[2].valid);
        assert_eq!(outputs[2].code, Codeword::ZERO);
    }
}
