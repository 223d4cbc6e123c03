use tracing::debug;

use crate::config::FrameFormat;
use crate::note::{note, note_pop_path, note_push_path, Notable};
use crate::synchronous::Synchronous;
use crate::tick::{symbol_timer_update, SymbolCounter, SymbolTimer, SymbolTimerInput};

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct UartSender {
    /// Payload bits per frame
    format: FrameFormat,
}

impl UartSender {
    pub const fn new(format: FrameFormat) -> Self {
        UartSender { format }
    }

    pub const fn format(&self) -> FrameFormat {
        self.format
    }
}

// tag::interface[]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct UartSenderInput {
    /// Reset signal. Pull high to reset the state machine.
    pub reset: bool,
    /// Payload to send, captured on the tick `start` is seen
    pub data: u8,
    /// Pulse high for one tick to start a transmission
    ///
    /// Ignored while the sender is busy.
    pub start: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct UartSenderOutput {
    /// High while a frame is in flight
    pub busy: bool,
    /// Serial line, idles high
    pub tx: bool,
    pub phase: UartSenderPhase,
}
// end::interface[]

// tag::state[]
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum UartSenderPhase {
    #[default]
    Idle,
    /// Build the frame register and pull the line low
    Load,
    /// Shift the frame out, one symbol every `OVERSAMPLE` ticks
    Send,
    /// One tick of cleanup before accepting the next payload
    Done,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub struct UartSenderState {
    pub phase: UartSenderPhase,
    /// Payload captured from the input
    pub data: u8,
    /// Remaining frame, bit 0 is on the line
    pub frame: u16,
    /// Position inside the current symbol
    pub counter: SymbolCounter,
    /// Symbols already sent
    pub symbol: u8,
}
// end::state[]

impl UartSenderState {
    const fn default() -> Self {
        UartSenderState {
            phase: UartSenderPhase::Idle,
            data: 0,
            frame: 0,
            counter: SymbolCounter::new(),
            symbol: 0,
        }
    }
}

impl Notable for UartSenderPhase {
    fn width(&self) -> u8 {
        2
    }
    fn bits(&self) -> u64 {
        *self as u64
    }
}

impl Synchronous for UartSender {
    type Input = UartSenderInput;
    type Output = UartSenderOutput;
    type State = UartSenderState;

    const INITIAL_STATE: Self::State = UartSenderState::default();
    const UPDATE: fn(Self, Self::State, Self::Input) -> (Self::State, Self::Output) =
        uart_sender_update;
}

/// Frame register for `data`: start bit at bit 0, stop bit above the payload.
fn build_frame(format: FrameFormat, data: u8) -> u16 {
    let payload = data as u16 & format.mask();
    (1 << (format.width() + 1)) | (payload << 1)
}

// tag::update[]
pub fn uart_sender_update(
    params: UartSender,
    state: UartSenderState,
    input: UartSenderInput,
) -> (UartSenderState, UartSenderOutput) {
    note("input_data", input.data);
    note("input_start", input.start);

    let format = params.format;
    let output = match state.phase {
        UartSenderPhase::Idle => UartSenderOutput {
            busy: false,
            tx: true,
            phase: state.phase,
        },
        UartSenderPhase::Load => UartSenderOutput {
            busy: true,
            tx: false,
            phase: state.phase,
        },
        UartSenderPhase::Send => UartSenderOutput {
            busy: true,
            tx: state.frame & 1 == 1,
            phase: state.phase,
        },
        UartSenderPhase::Done => UartSenderOutput {
            busy: true,
            tx: true,
            phase: state.phase,
        },
    };

    // The timer only runs while a frame is on the line. The load tick is
    // sample 0 of the start symbol.
    let clear = matches!(state.phase, UartSenderPhase::Idle | UartSenderPhase::Done);
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

    let next_state = if input.reset {
        UartSenderState::default()
    } else {
        match state.phase {
            UartSenderPhase::Idle => {
                if input.start {
                    debug!(data = input.data, "sender: payload captured");
                    UartSenderState {
                        phase: UartSenderPhase::Load,
                        data: input.data,
                        ..state
                    }
                } else {
                    state
                }
            }
            UartSenderPhase::Load => UartSenderState {
                phase: UartSenderPhase::Send,
                data: state.data,
                frame: build_frame(format, state.data),
                counter,
                symbol: 0,
            },
            UartSenderPhase::Send => {
                if !timer.end_of_symbol {
                    UartSenderState { counter, ..state }
                } else if state.symbol + 1 == format.symbols() {
                    UartSenderState {
                        phase: UartSenderPhase::Done,
                        frame: 0,
                        counter,
                        symbol: 0,
                        ..state
                    }
                } else {
                    UartSenderState {
                        frame: (state.frame >> 1) | (1 << (format.width() + 1)),
                        counter,
                        symbol: state.symbol + 1,
                        ..state
                    }
                }
            }
            UartSenderPhase::Done => UartSenderState {
                data: state.data,
                ..UartSenderState::default()
            },
        }
    };

    if input.start && output.busy && !input.reset {
        debug!(data = input.data, "sender: busy, start request ignored");
    }

    note("phase", state.phase);
    note("output__tx", output.tx);
    note("output__busy", output.busy);

    (next_state, output)
}
// end::update[]

#[cfg(test)]
mod test {
    use itertools::{repeat_n, Itertools};

    use super::{UartSender, UartSenderInput, UartSenderOutput, UartSenderPhase};
    use crate::config::{FrameFormat, OVERSAMPLE};
    use crate::note::{note_init_db, note_take};
    use crate::synchronous::{simulate, Clock};

    impl UartSenderInput {
        fn new() -> Self {
            UartSenderInput {
                reset: false,
                data: 0,
                start: false,
            }
        }

        fn reset() -> Self {
            UartSenderInput {
                reset: true,
                data: 0,
                start: false,
            }
        }

        fn transmit(data: u8) -> Self {
            UartSenderInput {
                reset: false,
                data,
                start: true,
            }
        }
    }

    impl UartSender {
        fn test_reset(&self) -> impl Iterator<Item = UartSenderInput> {
            [UartSenderInput::reset(), UartSenderInput::new()].into_iter()
        }

        fn test_wait_one_transmission(&self) -> impl Iterator<Item = UartSenderInput> {
            repeat_n(UartSenderInput::new(), self.format().ticks() + 2)
        }

        fn test_transmission(&self, data: u8) -> impl Iterator<Item = UartSenderInput> + '_ {
            std::iter::once(UartSenderInput::transmit(data)).chain(self.test_wait_one_transmission())
        }
    }

    /// Line level in the middle of every symbol, starting from the load tick.
    fn mid_symbol_levels(results: &[UartSenderOutput], load: usize, symbols: usize) -> Vec<bool> {
        let period = OVERSAMPLE as usize;
        (0..symbols)
            .map(|symbol| results[load + symbol * period + period / 2].tx)
            .collect_vec()
    }

    fn test_uart_sender_at_width(width: u8, data: u8) {
        let format = FrameFormat::new(width).unwrap();
        let uart_sender = UartSender::new(format);
        let input = uart_sender
            .test_reset()
            .chain(uart_sender.test_transmission(data));

        note_init_db();
        let results = simulate(uart_sender, input).collect_vec();
        let db = note_take().unwrap();
        let mut vcd = Vec::new();
        db.dump_vcd(&mut vcd).unwrap();
        assert!(!vcd.is_empty());

        // Idle high, start seen on tick 2, line pulled low on the next tick
        assert!(results[1].tx);
        assert!(results[2].tx);
        assert!(!results[2].busy);
        let load = 3;
        assert_eq!(results[load].phase, UartSenderPhase::Load);
        assert!(!results[load].tx);
        // The load tick is sample 0 of the start symbol
        let period = Clock::default().period;
        assert_eq!(db.value_at("timer.counter", load as u64 * period), Some(0));
        assert_eq!(db.value_at("timer.mid_symbol", (load as u64 + 4) * period), Some(1));

        let mut expected = vec![false];
        expected.extend((0..width).map(|bit| data >> bit & 1 == 1));
        expected.push(true);
        assert_eq!(
            mid_symbol_levels(&results, load, format.symbols() as usize),
            expected
        );

        // Every symbol lasts exactly one symbol period
        let start_ticks = results[load..].iter().take_while(|o| !o.tx).count();
        assert_eq!(start_ticks, OVERSAMPLE as usize * (1 + (data & 1 == 0) as usize));

        // Busy through the frame and the done tick, ready right after
        let done = load + format.ticks();
        assert!(results[load..=done].iter().all(|o| o.busy));
        assert_eq!(results[done].phase, UartSenderPhase::Done);
        assert!(results[done].tx);
        assert!(!results[done + 1].busy);
    }

    #[test]
    fn test_uart_sender_codeword() {
        test_uart_sender_at_width(7, 0b101_0010);
    }

    #[test]
    fn test_uart_sender_byte() {
        test_uart_sender_at_width(8, 0b0101_0011);
    }

    #[test]
    fn test_uart_sender_narrow() {
        test_uart_sender_at_width(3, 0b110);
    }

    #[test]
    fn start_while_busy_is_ignored() {
        crate::init_tracing();
        let uart_sender = UartSender::new(FrameFormat::BYTE);
        let input = std::iter::once(UartSenderInput::transmit(0xa5))
            .chain(repeat_n(UartSenderInput::new(), 20))
            .chain(std::iter::once(UartSenderInput::transmit(0x3c)))
            .chain(repeat_n(UartSenderInput::new(), 100));
        let results = simulate(uart_sender, input).collect_vec();

        let levels = mid_symbol_levels(&results, 1, 10);
        let payload = levels[1..9]
            .iter()
            .rev()
            .fold(0u8, |acc, bit| acc << 1 | *bit as u8);
        assert_eq!(payload, 0xa5);
        // Exactly one frame: one busy run
        assert_eq!(busy_runs(&results), 1);
    }

    fn busy_runs(results: &[UartSenderOutput]) -> usize {
        results
            .iter()
            .dedup_by(|a, b| a.busy == b.busy)
            .filter(|o| o.busy)
            .count()
    }

    /// Start pulses at the given ticks, idle everywhere else.
    fn pulses(ticks: &[usize], data: u8, len: usize) -> Vec<UartSenderInput> {
        (0..len)
            .map(|tick| {
                if ticks.contains(&tick) {
                    UartSenderInput::transmit(data)
                } else {
                    UartSenderInput::new()
                }
            })
            .collect_vec()
    }

    #[test]
    fn start_on_load_and_done_ticks_is_ignored() {
        crate::init_tracing();
        let uart_sender = UartSender::new(FrameFormat::CODEWORD);
        let load = 1;
        let done = load + FrameFormat::CODEWORD.ticks();
        let mut input = pulses(&[load, done], 0b000_1111, done + 100);
        input[0] = UartSenderInput::transmit(0b101_0101);
        let results = simulate(uart_sender, input).collect_vec();

        assert_eq!(results[load].phase, UartSenderPhase::Load);
        assert_eq!(results[done].phase, UartSenderPhase::Done);
        assert_eq!(busy_runs(&results), 1);
        assert!(results[done + 1..].iter().all(|o| o.tx && !o.busy));

        let levels = mid_symbol_levels(&results, load, 9);
        let payload = levels[1..8]
            .iter()
            .rev()
            .fold(0u8, |acc, bit| acc << 1 | *bit as u8);
        assert_eq!(payload, 0b101_0101);
    }

    #[test]
    fn start_right_after_done_is_accepted() {
        let uart_sender = UartSender::new(FrameFormat::CODEWORD);
        let load = 1;
        let ready = load + FrameFormat::CODEWORD.ticks() + 1;
        let mut input = pulses(&[ready], 0b000_1111, ready + 100);
        input[0] = UartSenderInput::transmit(0b101_0101);
        let results = simulate(uart_sender, input).collect_vec();

        assert!(!results[ready].busy);
        assert_eq!(results[ready + 1].phase, UartSenderPhase::Load);
        assert_eq!(busy_runs(&results), 2);
    }

    #[test]
    fn reset_aborts_frame_and_releases_line() {
        let uart_sender = UartSender::new(FrameFormat::CODEWORD);
        let input = std::iter::once(UartSenderInput::transmit(0))
            .chain(repeat_n(UartSenderInput::new(), 10))
            .chain(std::iter::once(UartSenderInput::reset()))
            .chain(repeat_n(UartSenderInput::new(), 10));
        let results = simulate(uart_sender, input).collect_vec();
        assert!(results[11].busy);
        assert!(results[12..].iter().all(|o| o.tx && !o.busy));
    }
}
