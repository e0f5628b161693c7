//! Bounded-wait retrieval of a document's source text.
//!
//! `GetSource` is asynchronous on the engine side: the visitor fires exactly
//! once with the full text, or never. The waiting caller therefore polls the
//! engine's pump with a bounded deadline instead of blocking indefinitely;
//! this is the one place backpressure against a non-cooperating engine is
//! enforced.

use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use tracing::warn;

use super::{Engine, SourceVisitor};

/// Default deadline for a source retrieval.
pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_millis(5000);

/// How long to park between pump iterations while waiting.
const WAIT_SLICE: Duration = Duration::from_millis(10);

/// A completion cell shared between the engine (which owns the visitor) and
/// the waiting caller. Reference-counted so the engine may outlive the
/// waiter: a visitor firing after the deadline lands in a cell nobody reads,
/// which is fine.
pub struct SourceSink {
    slot: Mutex<Option<String>>,
    ready: Condvar,
}

impl SourceSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(None),
            ready: Condvar::new(),
        })
    }

    /// Build the visitor half. The returned closure stores the text and
    /// wakes the waiter; it holds its own reference to the cell.
    pub fn visitor(self: &Arc<Self>) -> SourceVisitor {
        let sink = Arc::clone(self);
        Box::new(move |text: String| {
            let mut slot = sink.slot.lock().unwrap();
            *slot = Some(text);
            sink.ready.notify_all();
        })
    }

    /// Whether the visitor has fired.
    pub fn is_complete(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }

    /// Take the text if the visitor has fired.
    pub fn take(&self) -> Option<String> {
        self.slot.lock().unwrap().take()
    }

    /// Wait for the visitor, driving the engine's pump between short parks,
    /// up to `timeout`. Returns `None` on deadline expiry.
    pub fn wait_with_pump(&self, engine: &dyn Engine, timeout: Duration) -> Option<String> {
        let deadline = Instant::now() + timeout;

        loop {
            {
                let mut slot = self.slot.lock().unwrap();
                if slot.is_some() {
                    return slot.take();
                }
                let now = Instant::now();
                if now >= deadline {
                    warn!(timeout_ms = timeout.as_millis() as u64, "source retrieval timed out");
                    return None;
                }
                let park = WAIT_SLICE.min(deadline - now);
                let (mut slot, _timed_out) = self.ready.wait_timeout(slot, park).unwrap();
                if slot.is_some() {
                    return slot.take();
                }
            }
            // Lock released before touching the engine.
            engine.pump();
        }
    }
}
