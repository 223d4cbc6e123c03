//! Oversampled asynchronous serial link protected by a Hamming(7,4) code.
//!
//! Every piece is a [`Synchronous`] component: a pure update function from
//! the current state and the inputs of one tick to the next state and the
//! outputs of that tick. [`Simulation`] is the tick scheduler that commits the
//! state once per step.
//!
//! - [`hamming`]: codec and its registered encoder/decoder components
//! - [`uart`]: oversampling transmit and receive framers
//! - [`start_pulse`]: rising edge filter for transmit requests
//! - [`link`]: the complete pipeline
//! - [`note`]: signal tracing and waveform dumps

pub mod config;
pub mod error;
pub mod hamming;
pub mod line;
pub mod link;
pub mod note;
pub mod start_pulse;
pub mod synchronous;
pub mod tick;
pub mod uart;

pub use config::FrameFormat;
pub use error::{LinkError, Result};
pub use hamming::{decode, encode, Codeword, Decoded, Nibble, Syndrome};
pub use link::{Link, LinkInput, LinkOutput};
pub use synchronous::{simulate, Clock, Simulation, Synchronous};

#[cfg(test)]
pub(crate) fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
