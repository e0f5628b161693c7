//! Unit tests for the bounded-wait source retrieval cell.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use osrbrowser::engine::{Engine, SourceSink};
use osrbrowser::types::frame::BufferSize;
use osrbrowser::types::tab::TabId;

/// Engine stub that counts pump iterations and can deliver the visitor's
/// text after a given number of pumps.
struct PumpCounter {
    pumps: AtomicUsize,
    deliver_after: Option<(usize, Arc<SourceSink>, &'static str)>,
}

impl Engine for PumpCounter {
    fn spawn_browser(&self, _tab: TabId, _url: &str, _size: BufferSize) {}

    fn pump(&self) {
        let n = self.pumps.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((after, sink, text)) = &self.deliver_after {
            if n == *after {
                sink.visitor()(text.to_string());
            }
        }
    }

    fn shutdown(&self) {}
}

#[test]
fn test_completed_before_wait_returns_immediately() {
    let sink = SourceSink::new();
    sink.visitor()("<html></html>".to_string());
    assert!(sink.is_complete());

    let engine = PumpCounter {
        pumps: AtomicUsize::new(0),
        deliver_after: None,
    };
    let got = sink.wait_with_pump(&engine, Duration::from_millis(1000));
    assert_eq!(got.as_deref(), Some("<html></html>"));
    assert_eq!(engine.pumps.load(Ordering::SeqCst), 0, "no pumping needed");
}

#[test]
fn test_wait_pumps_until_delivery() {
    let sink = SourceSink::new();
    let engine = PumpCounter {
        pumps: AtomicUsize::new(0),
        deliver_after: Some((3, Arc::clone(&sink), "late text")),
    };

    let got = sink.wait_with_pump(&engine, Duration::from_millis(2000));
    assert_eq!(got.as_deref(), Some("late text"));
    assert!(engine.pumps.load(Ordering::SeqCst) >= 3);
}

#[test]
fn test_wait_times_out_when_visitor_never_fires() {
    let sink = SourceSink::new();
    let engine = PumpCounter {
        pumps: AtomicUsize::new(0),
        deliver_after: None,
    };

    let start = Instant::now();
    let got = sink.wait_with_pump(&engine, Duration::from_millis(80));
    let elapsed = start.elapsed();

    assert!(got.is_none());
    assert!(elapsed >= Duration::from_millis(80), "waited the deadline out");
    assert!(elapsed < Duration::from_millis(2000), "did not block unboundedly");
    assert!(engine.pumps.load(Ordering::SeqCst) > 0, "kept driving the pump");
}

#[test]
fn test_take_consumes_once() {
    let sink = SourceSink::new();
    sink.visitor()("text".to_string());
    assert_eq!(sink.take().as_deref(), Some("text"));
    assert_eq!(sink.take(), None);
    assert!(!sink.is_complete());
}

#[test]
fn test_late_visitor_after_timeout_is_harmless() {
    let sink = SourceSink::new();
    let engine = PumpCounter {
        pumps: AtomicUsize::new(0),
        deliver_after: None,
    };
    assert!(sink.wait_with_pump(&engine, Duration::from_millis(20)).is_none());

    // The engine still holds its visitor and fires after the waiter gave
    // up; the cell just stores the text nobody reads.
    sink.visitor()("too late".to_string());
    assert!(sink.is_complete());
}
