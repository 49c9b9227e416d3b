//! Process-wide `log` sink for unit tests that assert on emitted records.

use log::{Level, LevelFilter, Log, Metadata, Record};
use std::sync::{Mutex, Once};

struct Capture {
    records: Mutex<Vec<(Level, String)>>,
}

impl Log for Capture {
    fn enabled(&self, _: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static CAPTURE: Capture = Capture {
    records: Mutex::new(Vec::new()),
};
static INIT: Once = Once::new();

pub fn init() {
    INIT.call_once(|| {
        log::set_logger(&CAPTURE).unwrap();
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Records at `level` whose text contains `needle`. Tests run in parallel,
/// so callers should look for text unique to their own test.
pub fn find(level: Level, needle: &str) -> Vec<String> {
    CAPTURE
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|(l, msg)| *l == level && msg.contains(needle))
        .map(|(_, msg)| msg.clone())
        .collect()
}
