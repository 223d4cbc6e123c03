//! Named signal tracing.
//!
//! Components call [`note`] from their update functions. Every note becomes a
//! `trace` level `tracing` event. When a note database was initialised on the
//! current thread with [`note_init_db`], notes are also recorded with the
//! current simulation time and can be exported as a Value Change Dump.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io::Write;

use itertools::Itertools;

use crate::error::{LinkError, Result};

thread_local! {
    static NOTE_DB: RefCell<Option<NoteDb>> = const { RefCell::new(None) };
    static NOTE_PATH: RefCell<Vec<&'static str>> = const { RefCell::new(Vec::new()) };
    static NOTE_TIME: Cell<u64> = const { Cell::new(0) };
    static NOTE_CLOCK: Cell<Option<&'static str>> = const { Cell::new(None) };
}

/// A value that can be recorded as a fixed width signal.
pub trait Notable {
    fn width(&self) -> u8;
    fn bits(&self) -> u64;
}

impl Notable for bool {
    fn width(&self) -> u8 {
        1
    }
    fn bits(&self) -> u64 {
        *self as u64
    }
}

macro_rules! notable_unsigned {
    ($($ty:ty),*) => {
        $(
            impl Notable for $ty {
                fn width(&self) -> u8 {
                    <$ty>::BITS as u8
                }
                fn bits(&self) -> u64 {
                    *self as u64
                }
            }
        )*
    };
}

notable_unsigned!(u8, u16, u32, u64);

#[derive(Clone, Debug, Default)]
struct Signal {
    width: u8,
    changes: Vec<(u64, u64)>,
}

/// Recorded value changes, keyed by the full dotted signal path.
#[derive(Clone, Debug, Default)]
pub struct NoteDb {
    clock: Option<&'static str>,
    signals: BTreeMap<String, Signal>,
}

impl NoteDb {
    fn record(&mut self, key: String, time: u64, width: u8, value: u64) {
        let signal = self.signals.entry(key).or_insert_with(|| Signal {
            width,
            changes: Vec::new(),
        });
        match signal.changes.last_mut() {
            Some((_, last)) if *last == value => {}
            Some((last_time, last)) if *last_time == time => *last = value,
            _ => signal.changes.push((time, value)),
        }
    }

    /// Names of all recorded signals.
    pub fn signals(&self) -> impl Iterator<Item = &str> {
        self.signals.keys().map(String::as_str)
    }

    /// Value of `key` as it was at `time`.
    pub fn value_at(&self, key: &str, time: u64) -> Option<u64> {
        let signal = self.signals.get(key)?;
        signal
            .changes
            .iter()
            .take_while(|(changed, _)| *changed <= time)
            .last()
            .map(|(_, value)| *value)
    }

    /// Write all recorded signals as a Value Change Dump.
    ///
    /// Signals are nested into modules along their dotted path, under a top
    /// module named after the clock that stamped them.
    pub fn dump_vcd(&self, writer: &mut impl Write) -> Result<()> {
        let mut vcd = vcd::Writer::new(writer);
        vcd.timescale(1, vcd::TimescaleUnit::PS)?;
        vcd.add_module(self.clock.unwrap_or("top"))?;

        let mut open: Vec<&str> = Vec::new();
        let mut ids = Vec::with_capacity(self.signals.len());
        for (key, signal) in &self.signals {
            let mut path: Vec<&str> = key.split('.').collect();
            let name = path.pop().unwrap_or(key.as_str());
            let common = open
                .iter()
                .zip(&path)
                .take_while(|(a, b)| a == b)
                .count();
            for _ in common..open.len() {
                vcd.upscope()?;
            }
            open.truncate(common);
            for scope in &path[common..] {
                vcd.add_module(scope)?;
                open.push(*scope);
            }
            ids.push(vcd.add_wire(signal.width as u32, name)?);
        }
        for _ in 0..open.len() {
            vcd.upscope()?;
        }
        vcd.upscope()?;
        vcd.enddefinitions()?;

        let changes = self
            .signals
            .values()
            .zip(ids)
            .flat_map(|(signal, id)| {
                signal
                    .changes
                    .iter()
                    .map(move |(time, value)| (*time, id, signal.width, *value))
            })
            .sorted_by_key(|(time, ..)| *time);
        for (time, group) in &changes.chunk_by(|(time, ..)| *time) {
            vcd.timestamp(time)?;
            for (_, id, width, value) in group {
                if width == 1 {
                    vcd.change_scalar(id, level(value & 1 == 1))?;
                } else {
                    let bits = (0..width).rev().map(|bit| level(value >> bit & 1 == 1));
                    vcd.change_vector(id, bits)?;
                }
            }
        }
        Ok(())
    }
}

fn level(bit: bool) -> vcd::Value {
    if bit {
        vcd::Value::V1
    } else {
        vcd::Value::V0
    }
}

/// Start recording notes on this thread, discarding earlier recordings.
pub fn note_init_db() {
    NOTE_DB.with(|db| *db.borrow_mut() = Some(NoteDb::default()));
    NOTE_TIME.with(|time| time.set(0));
    NOTE_CLOCK.with(|clock| clock.set(None));
}

/// Stop recording and hand out everything recorded since [`note_init_db`].
pub fn note_take() -> Result<NoteDb> {
    NOTE_DB
        .with(|db| db.borrow_mut().take())
        .ok_or(LinkError::NoNoteDb)
}

pub fn note_time(time: u64) {
    NOTE_TIME.with(|cell| cell.set(time));
}

/// Name the clock whose ticks stamp the following notes.
pub fn note_clock(name: &'static str) {
    NOTE_CLOCK.with(|cell| cell.set(Some(name)));
}

pub fn note_push_path(name: &'static str) {
    NOTE_PATH.with(|path| path.borrow_mut().push(name));
}

pub fn note_pop_path() {
    NOTE_PATH.with(|path| {
        path.borrow_mut().pop();
    });
}

pub fn note(key: &str, value: impl Notable) {
    let key = NOTE_PATH.with(|path| {
        path.borrow()
            .iter()
            .copied()
            .chain(std::iter::once(key))
            .join(".")
    });
    let time = NOTE_TIME.with(Cell::get);
    let bits = value.bits();
    tracing::trace!(target: "hamlink::note", time, key = %key, value = bits);
    NOTE_DB.with(|db| {
        if let Some(db) = db.borrow_mut().as_mut() {
            db.clock = NOTE_CLOCK.with(Cell::get).or(db.clock);
            db.record(key, time, value.width(), bits);
        }
    });
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn notes_are_recorded_under_their_path() {
        note_init_db();
        note_time(0);
        note_push_path("receiver");
        note("valid", false);
        note_pop_path();
        note("data", 0x42u8);
        note_time(10);
        note_push_path("receiver");
        note("valid", true);
        note_pop_path();

        let db = note_take().unwrap();
        assert_eq!(db.signals().collect_vec(), vec!["data", "receiver.valid"]);
        assert_eq!(db.value_at("receiver.valid", 5), Some(0));
        assert_eq!(db.value_at("receiver.valid", 10), Some(1));
        assert_eq!(db.value_at("data", 99), Some(0x42));
        assert!(note_take().is_err());
    }

    #[test]
    fn unchanged_values_are_not_repeated() {
        note_init_db();
        for time in 0..4 {
            note_time(time);
            note("line", true);
        }
        let db = note_take().unwrap();
        assert_eq!(db.signals["line"].changes, vec![(0, 1)]);
    }

    #[test]
    fn dumps_nested_scopes_and_vectors() {
        note_init_db();
        note_time(0);
        note_push_path("sender");
        note("tx", true);
        note_pop_path();
        note("payload", 0b101u8);
        note_time(8);
        note_push_path("sender");
        note("tx", false);
        note_pop_path();

        let mut vcd = Vec::new();
        note_take().unwrap().dump_vcd(&mut vcd).unwrap();
        let vcd = String::from_utf8(vcd).unwrap();
        assert!(vcd.contains("$scope module sender $end"));
        assert!(vcd.contains("$var wire 8 ! payload $end"));
        assert!(vcd.contains("$var wire 1 \" tx $end"));
        assert!(vcd.contains("#0\n"));
        assert!(vcd.contains("b00000101 !"));
        assert!(vcd.contains("#8\n0\"\n"));
    }

    #[test]
    fn top_scope_is_named_after_the_clock() {
        note_init_db();
        note("line", true);
        let mut vcd = Vec::new();
        note_take().unwrap().dump_vcd(&mut vcd).unwrap();
        assert!(String::from_utf8(vcd).unwrap().contains("$scope module top $end"));

        note_init_db();
        note_clock("sys_clk");
        note("line", true);
        let mut vcd = Vec::new();
        note_take().unwrap().dump_vcd(&mut vcd).unwrap();
        assert!(String::from_utf8(vcd).unwrap().contains("$scope module sys_clk $end"));
    }
}
