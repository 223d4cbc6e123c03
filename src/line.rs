//! Tick level line waveforms for benches and tests.

use bitvec::prelude::*;

use crate::config::{FrameFormat, OVERSAMPLE};

/// `ticks` ticks of an idle (high) line.
pub fn idle(ticks: usize) -> Vec<bool> {
    vec![true; ticks]
}

/// One frame carrying `payload`, every symbol held for one symbol period.
pub fn frame_waveform(format: FrameFormat, payload: u8) -> Vec<bool> {
    let payload = payload.view_bits::<Lsb0>();
    std::iter::once(false)
        .chain(payload[..format.width() as usize].iter().by_vals())
        .chain(std::iter::once(true))
        .flat_map(|level| std::iter::repeat(level).take(OVERSAMPLE as usize))
        .collect()
}

/// Invert every tick of frame symbol `symbol` (0 is the start bit).
pub fn flip_symbol(waveform: &mut [bool], symbol: usize) {
    let period = OVERSAMPLE as usize;
    for level in &mut waveform[symbol * period..(symbol + 1) * period] {
        *level = !*level;
    }
}

/// Invert payload bit `bit` of a frame as it crosses the wire.
pub fn flip_payload_bit(waveform: &mut [bool], bit: usize) {
    flip_symbol(waveform, bit + 1)
}
