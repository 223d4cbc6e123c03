//! Link error types

use std::io;
use thiserror::Error;

/// Result type for link configuration and tracing operations
pub type Result<T> = std::result::Result<T, LinkError>;

/// Errors raised at the edges of the link.
///
/// The tick-level state machines never fail. Framing and transmission errors
/// are absorbed by the framers and the decoder; these variants only cover
/// building values and exporting traces.
#[derive(Error, Debug)]
pub enum LinkError {
    /// Frame payload width outside of the supported range
    #[error("Unsupported payload width {width}, expected 1..={max}")]
    UnsupportedWidth { width: u8, max: u8 },

    /// Value does not fit into the given number of bits
    #[error("Value 0x{value:02x} does not fit into {width} bits")]
    ValueOutOfRange { value: u8, width: u8 },

    /// Note database was never initialised on this thread
    #[error("No note database, call note_init_db first")]
    NoNoteDb,

    /// Writing a waveform dump failed
    #[error("Failed to write waveform: {0}")]
    Io(#[from] io::Error),
}
