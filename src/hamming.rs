//! Hamming(7,4) single error correcting code.
//!
//! Codeword positions 1 to 7 hold `[c0, c1, d0, c2, d1, d2, d3]`. Position
//! `p` lives at bit `p - 1` of the integer value and is sent as payload bit
//! `p - 1`, so a non-zero syndrome names the bit to flip directly.
//!
//! Two or more flipped bits are not detected reliably. They decode to a
//! different nibble without any indication, which is inherent to the code.

mod decoder;
mod encoder;

use std::fmt;

use bitvec::prelude::*;

pub use decoder::{
    hamming_decoder_update, HammingDecoder, HammingDecoderInput, HammingDecoderOutput,
};
pub use encoder::{
    hamming_encoder_update, HammingEncoder, HammingEncoderInput, HammingEncoderOutput,
};

use crate::config::{CODEWORD_WIDTH, DATA_WIDTH};
use crate::error::{LinkError, Result};
use crate::note::Notable;

type CodeBits = BitArr!(for 7, in u8, Lsb0);

/// Bit index of every position inside a codeword.
const C0: usize = 0;
const C1: usize = 1;
const D0: usize = 2;
const C2: usize = 3;
const D1: usize = 4;
const D2: usize = 5;
const D3: usize = 6;

const DATA_POSITIONS: [usize; 4] = [D0, D1, D2, D3];

/// Four data bits, `d0` in bit 0.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Nibble(u8);

impl Nibble {
    pub const ZERO: Nibble = Nibble(0);

    pub fn new(value: u8) -> Result<Self> {
        if value >> DATA_WIDTH != 0 {
            return Err(LinkError::ValueOutOfRange {
                value,
                width: DATA_WIDTH,
            });
        }
        Ok(Nibble(value))
    }

    /// Keep only the low four bits of `value`.
    pub const fn truncate(value: u8) -> Self {
        Nibble(value & 0x0f)
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Every nibble, in ascending order.
    pub fn all() -> impl Iterator<Item = Nibble> {
        (0..1u8 << DATA_WIDTH).map(Nibble)
    }

    /// `[d0, d1, d2, d3]`
    pub fn bits(self) -> [bool; 4] {
        let bits = self.0.view_bits::<Lsb0>();
        [bits[0], bits[1], bits[2], bits[3]]
    }
}

impl TryFrom<u8> for Nibble {
    type Error = LinkError;

    fn try_from(value: u8) -> Result<Self> {
        Nibble::new(value)
    }
}

impl From<Nibble> for u8 {
    fn from(nibble: Nibble) -> u8 {
        nibble.0
    }
}

impl fmt::Binary for Nibble {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.0, f)
    }
}

/// Seven bit Hamming codeword.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Codeword(CodeBits);

impl Codeword {
    pub const ZERO: Codeword = Codeword(CodeBits::ZERO);

    pub fn new(value: u8) -> Result<Self> {
        if value >> CODEWORD_WIDTH != 0 {
            return Err(LinkError::ValueOutOfRange {
                value,
                width: CODEWORD_WIDTH,
            });
        }
        Ok(Codeword(CodeBits::new([value])))
    }

    /// Keep only the low seven bits of `value`.
    pub fn truncate(value: u8) -> Self {
        Codeword(CodeBits::new([value & 0x7f]))
    }

    /// Build a codeword from positions 1 to 7.
    pub fn from_positions(positions: [bool; 7]) -> Self {
        let mut bits = CodeBits::ZERO;
        for (index, bit) in positions.into_iter().enumerate() {
            bits.set(index, bit);
        }
        Codeword(bits)
    }

    pub fn value(self) -> u8 {
        self.0.into_inner()[0]
    }

    pub fn bit(self, index: usize) -> bool {
        debug_assert!(index < CODEWORD_WIDTH as usize, "codeword bit {} out of range", index);
        self.0[index]
    }

    /// The same codeword with bit `index` inverted.
    pub fn flip(self, index: usize) -> Self {
        debug_assert!(index < CODEWORD_WIDTH as usize, "codeword bit {} out of range", index);
        let mut bits = self.0;
        let flipped = !bits[index];
        bits.set(index, flipped);
        Codeword(bits)
    }

    /// Data bits at their fixed positions, without any correction.
    pub fn data(self) -> Nibble {
        let mut data = 0u8;
        for (index, position) in DATA_POSITIONS.into_iter().enumerate() {
            data.view_bits_mut::<Lsb0>().set(index, self.0[position]);
        }
        Nibble(data)
    }

    pub fn syndrome(self) -> Syndrome {
        let b = &self.0;
        let s0 = b[C0] ^ b[D0] ^ b[D1] ^ b[D3];
        let s1 = b[C1] ^ b[D0] ^ b[D2] ^ b[D3];
        let s2 = b[C2] ^ b[D1] ^ b[D2] ^ b[D3];
        Syndrome(s0 as u8 | (s1 as u8) << 1 | (s2 as u8) << 2)
    }
}

impl fmt::Debug for Codeword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Codeword({:#09b})", self.value())
    }
}

impl fmt::Binary for Codeword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Binary::fmt(&self.value(), f)
    }
}

impl TryFrom<u8> for Codeword {
    type Error = LinkError;

    fn try_from(value: u8) -> Result<Self> {
        Codeword::new(value)
    }
}

/// Three parity checks over a received codeword.
///
/// Zero means no error was detected. Otherwise the value is the position
/// (1 to 7) of the bit to invert.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct Syndrome(u8);

impl Syndrome {
    pub const NONE: Syndrome = Syndrome(0);

    pub const fn value(self) -> u8 {
        self.0
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Bit index the syndrome points at.
    pub const fn bit_index(self) -> Option<usize> {
        match self.0 {
            0 => None,
            position => Some(position as usize - 1),
        }
    }
}

/// Result of decoding one codeword.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct Decoded {
    pub data: Nibble,
    pub syndrome: Syndrome,
    /// Codeword after the single bit correction
    pub corrected: Codeword,
}

impl Decoded {
    pub const fn fault(&self) -> bool {
        !self.syndrome.is_zero()
    }
}

pub fn encode(data: Nibble) -> Codeword {
    let [d0, d1, d2, d3] = data.bits();
    let p0 = d0 ^ d1 ^ d3;
    let p1 = d0 ^ d2 ^ d3;
    let p2 = d1 ^ d2 ^ d3;
    Codeword::from_positions([p0, p1, d0, p2, d1, d2, d3])
}

pub fn decode(code: Codeword) -> Decoded {
    let syndrome = code.syndrome();
    let corrected = match syndrome.bit_index() {
        Some(index) => code.flip(index),
        None => code,
    };
    Decoded {
        data: corrected.data(),
        syndrome,
        corrected,
    }
}

impl Notable for Nibble {
    fn width(&self) -> u8 {
        DATA_WIDTH
    }
    fn bits(&self) -> u64 {
        self.0 as u64
    }
}

impl Notable for Codeword {
    fn width(&self) -> u8 {
        CODEWORD_WIDTH
    }
    fn bits(&self) -> u64 {
        self.value() as u64
    }
}

impl Notable for Syndrome {
    fn width(&self) -> u8 {
        3
    }
    fn bits(&self) -> u64 {
        self.0 as u64
    }
}
