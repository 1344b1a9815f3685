//! Dynamic severity updates from an external configuration watcher
//!
//! The watcher collaborator delivers `(key, value)` change events on a
//! channel; this module owns parsing the value and applying it to the
//! facade's gate. A malformed value is reported and the previous level is
//! retained.

use crossbeam_channel::Receiver;
use std::thread;

use crate::core::gate::LevelGate;

/// Well-known configuration key carrying the logger severity.
pub const LEVEL_KEY: &str = "logger.level";

/// One change event from the external configuration watcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUpdate {
    pub key: String,
    pub value: String,
}

impl LevelUpdate {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Convenience constructor for the well-known severity key.
    pub fn level(value: impl Into<String>) -> Self {
        Self::new(LEVEL_KEY, value)
    }
}

/// Subscribe a gate to a feed of configuration change events.
///
/// The thread holds only a weak handle: it ends when the feed closes or
/// when every facade sharing the gate has been dropped, so the
/// subscription lives exactly as long as the facade.
pub(crate) fn spawn_watcher(
    gate: &LevelGate,
    feed: Receiver<LevelUpdate>,
) -> thread::JoinHandle<()> {
    let weak = gate.downgrade();
    thread::spawn(move || {
        for update in feed.iter() {
            if update.key != LEVEL_KEY {
                continue;
            }
            let Some(gate) = weak.upgrade() else {
                break;
            };
            if let Err(e) = gate.apply_text(&update.value) {
                eprintln!("[fanlog] {}", e);
            }
        }
    })
}
