//! Build-time link constants and the frame format.

use crate::error::{LinkError, Result};

/// Ticks per symbol.
pub const OVERSAMPLE: u8 = 8;
/// Sample index at which the line is read.
pub const MID_SYMBOL: u8 = OVERSAMPLE / 2;
/// Last sample index of a symbol.
pub const END_OF_SYMBOL: u8 = OVERSAMPLE - 1;

/// Data bits protected by one codeword.
pub const DATA_WIDTH: u8 = 4;
/// Bits in a Hamming(7,4) codeword.
pub const CODEWORD_WIDTH: u8 = 7;
/// Start and stop symbols wrapped around every payload.
pub const FRAME_OVERHEAD: u8 = 2;
/// Widest payload a frame register can hold.
pub const MAX_PAYLOAD_WIDTH: u8 = 8;

/// Number of payload bits carried by one frame.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct FrameFormat {
    width: u8,
}

impl FrameFormat {
    /// Raw codeword frames, as used by the Hamming link.
    pub const CODEWORD: FrameFormat = FrameFormat {
        width: CODEWORD_WIDTH,
    };
    /// Full byte frames.
    pub const BYTE: FrameFormat = FrameFormat {
        width: MAX_PAYLOAD_WIDTH,
    };

    pub fn new(width: u8) -> Result<Self> {
        if width == 0 || width > MAX_PAYLOAD_WIDTH {
            return Err(LinkError::UnsupportedWidth {
                width,
                max: MAX_PAYLOAD_WIDTH,
            });
        }
        Ok(FrameFormat { width })
    }

    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Symbols on the line for one frame, framing included.
    pub const fn symbols(&self) -> u8 {
        self.width + FRAME_OVERHEAD
    }

    /// Ticks the line is occupied by one frame.
    pub const fn ticks(&self) -> usize {
        self.symbols() as usize * OVERSAMPLE as usize
    }

    /// Mask selecting the payload bits.
    pub const fn mask(&self) -> u16 {
        (1u16 << self.width) - 1
    }
}

impl Default for FrameFormat {
    fn default() -> Self {
        FrameFormat::CODEWORD
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn codeword_frames_take_nine_symbols() {
        assert_eq!(FrameFormat::CODEWORD.symbols(), 9);
        assert_eq!(FrameFormat::CODEWORD.ticks(), 72);
        assert_eq!(FrameFormat::BYTE.mask(), 0xff);
    }

    #[test]
    fn rejects_widths_outside_the_frame_register() {
        assert!(matches!(
            FrameFormat::new(0),
            Err(LinkError::UnsupportedWidth { width: 0, .. })
        ));
        assert!(FrameFormat::new(9).is_err());
        assert_eq!(FrameFormat::new(7).unwrap(), FrameFormat::CODEWORD);
    }
}
