//! End-to-end tests for the window controller against a scripted engine:
//! the full create → attach → paint pipeline, the close-during-attach race,
//! engine-unavailable degradation, synchronous re-entrancy, and shutdown
//! ordering.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use osrbrowser::controller::{BrowserController, ShellEvent, ShellNotifier};
use osrbrowser::engine::{
    Engine, EngineHandle, EngineObserver, KeyEvent, MouseEvent, NavigationState, SourceVisitor,
    WheelEvent,
};
use osrbrowser::types::frame::{BufferSize, DirtyRect};
use osrbrowser::types::tab::{SurfaceId, TabId};

// ─── Test doubles ───

/// Records every event the controller raises toward the GUI.
#[derive(Default)]
struct RecordingNotifier {
    events: Mutex<Vec<ShellEvent>>,
}

impl RecordingNotifier {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn events(&self) -> Vec<ShellEvent> {
        self.events.lock().unwrap().clone()
    }

    fn contains(&self, event: &ShellEvent) -> bool {
        self.events.lock().unwrap().contains(event)
    }
}

impl ShellNotifier for RecordingNotifier {
    fn notify(&self, event: ShellEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Per-tab handle that records calls and can synchronously re-enter the
/// observer, the way a real embedded engine does.
struct ScriptedHandle {
    tab: TabId,
    observer: Arc<dyn EngineObserver>,
    loads: AtomicUsize,
    closes: AtomicUsize,
    resizes: Mutex<Vec<BufferSize>>,
}

impl EngineHandle for ScriptedHandle {
    /// Re-enters the application synchronously mid-call: address change and
    /// load state fire before `load_url` returns, exactly like an engine
    /// that processes the navigation inline. Deadlocks here mean the caller
    /// held the registry lock across the call.
    fn load_url(&self, url: &str) {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.observer.on_address_change(self.tab, url);
        self.observer.on_load_state(
            self.tab,
            NavigationState {
                is_loading: true,
                can_go_back: true,
                can_go_forward: false,
            },
        );
    }

    fn go_back(&self) {}
    fn go_forward(&self) {}
    fn reload(&self) {}
    fn stop_loading(&self) {}

    /// A resize triggers an immediate synchronous repaint callback.
    fn resize(&self, size: BufferSize) {
        self.resizes.lock().unwrap().push(size);
        let pixels = vec![0x55u8; (size.width * 4 * size.height).max(0) as usize];
        self.observer.on_paint(self.tab, &pixels, size, &[]);
    }

    fn execute_script(&self, _code: &str, _origin_url: &str, _line_offset: i32) {}
    fn get_source(&self, visitor: SourceVisitor) {
        visitor("<html>scripted</html>".to_string());
    }
    fn navigation_state(&self) -> NavigationState {
        NavigationState::default()
    }
    fn send_mouse(&self, _event: MouseEvent) {}
    fn send_wheel(&self, _event: WheelEvent) {}
    fn send_key(&self, _event: KeyEvent) {}
    fn set_focus(&self, _focused: bool) {}
    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Engine backend whose browser construction completes either inline or
/// when the test decides (to stage the close-during-attach race).
struct ScriptedEngine {
    observer: Mutex<Option<Arc<dyn EngineObserver>>>,
    defer_spawns: bool,
    pending: Mutex<Vec<TabId>>,
    handles: Mutex<Vec<Arc<ScriptedHandle>>>,
    pumps: AtomicUsize,
    shutdowns: AtomicUsize,
}

impl ScriptedEngine {
    fn new(defer_spawns: bool) -> Arc<Self> {
        Arc::new(Self {
            observer: Mutex::new(None),
            defer_spawns,
            pending: Mutex::new(Vec::new()),
            handles: Mutex::new(Vec::new()),
            pumps: AtomicUsize::new(0),
            shutdowns: AtomicUsize::new(0),
        })
    }

    fn set_observer(&self, observer: Arc<dyn EngineObserver>) {
        *self.observer.lock().unwrap() = Some(observer);
    }

    fn finish_construction(&self, tab: TabId) -> Arc<ScriptedHandle> {
        let observer = self.observer.lock().unwrap().clone().expect("observer set");
        let handle = Arc::new(ScriptedHandle {
            tab,
            observer: Arc::clone(&observer),
            loads: AtomicUsize::new(0),
            closes: AtomicUsize::new(0),
            resizes: Mutex::new(Vec::new()),
        });
        self.handles.lock().unwrap().push(Arc::clone(&handle));
        observer.on_browser_created(tab, handle.clone());
        handle
    }

    /// Complete all deferred browser constructions.
    fn complete_pending(&self) -> Vec<Arc<ScriptedHandle>> {
        let pending: Vec<TabId> = std::mem::take(&mut *self.pending.lock().unwrap());
        pending.into_iter().map(|tab| self.finish_construction(tab)).collect()
    }

    fn handle_for(&self, tab: TabId) -> Option<Arc<ScriptedHandle>> {
        self.handles.lock().unwrap().iter().find(|h| h.tab == tab).cloned()
    }
}

impl Engine for ScriptedEngine {
    fn spawn_browser(&self, tab: TabId, _url: &str, _size: BufferSize) {
        if self.defer_spawns {
            self.pending.lock().unwrap().push(tab);
        } else {
            self.finish_construction(tab);
        }
    }

    fn pump(&self) {
        self.pumps.fetch_add(1, Ordering::SeqCst);
    }

    fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
    }
}

fn harness(defer_spawns: bool) -> (Arc<BrowserController>, Arc<ScriptedEngine>, Arc<RecordingNotifier>) {
    let notifier = RecordingNotifier::new();
    let controller = BrowserController::new(
        Arc::new(osrbrowser::managers::tab_registry::TabRegistry::new()),
        notifier.clone(),
    );
    let engine = ScriptedEngine::new(defer_spawns);
    engine.set_observer(controller.clone());
    controller.set_engine(engine.clone());
    (controller, engine, notifier)
}

// ─── Tests ───

#[test]
fn test_create_attach_paint_pipeline() {
    let (controller, engine, notifier) = harness(false);

    let id = controller.new_tab("https://example.com", SurfaceId(1));
    assert!(engine.handle_for(id).is_some(), "engine construction completed");

    // The engine paints a 100x100 frame with one dirty rect.
    let size = BufferSize::new(100, 100);
    let pixels = vec![0xBBu8; 100 * 4 * 100];
    let rect = DirtyRect::new(10, 10, 20, 20);
    controller.on_paint(id, &pixels, size, &[rect]);

    let (data, got_size, stride) = controller.registry().frame_snapshot(id).unwrap();
    assert_eq!(got_size, BufferSize::new(100, 100));
    assert_eq!(stride, 400);

    // Only the 20x20 block changed from the buffer's initial zeroed state.
    for y in 0..100usize {
        for x in 0..100usize {
            let inside = (10..30).contains(&x) && (10..30).contains(&y);
            let expected = if inside { 0xBB } else { 0x00 };
            let offset = y * stride + x * 4;
            assert!(
                data[offset..offset + 4].iter().all(|&b| b == expected),
                "pixel ({}, {})",
                x,
                y
            );
        }
    }

    assert!(notifier.contains(&ShellEvent::FrameReady(id)));
}

#[test]
fn test_close_during_attach_race() {
    let (controller, engine, _notifier) = harness(true);

    let id = controller.new_tab("https://example.com", SurfaceId(1));
    let keeper = controller.new_tab("https://keep.me", SurfaceId(2));

    // The first tab closes before its engine instance finishes construction.
    controller.close_tab(0).unwrap();
    let handles = engine.complete_pending();

    // The orphaned instance was asked to close; the surviving tab got its
    // handle; nobody saw an error.
    let orphan = handles.iter().find(|h| h.tab == id).unwrap();
    assert_eq!(orphan.closes.load(Ordering::SeqCst), 1);
    let kept = handles.iter().find(|h| h.tab == keeper).unwrap();
    assert_eq!(kept.closes.load(Ordering::SeqCst), 0);
    assert_eq!(controller.registry().len(), 1);
    assert_eq!(controller.registry().active_tab_id(), Some(keeper));
}

#[test]
fn test_navigation_controls_degrade_without_engine() {
    let (controller, _engine, _notifier) = harness(true);

    // Engine construction has not completed; every control is a no-op, not
    // a crash, and the registry stays consistent.
    controller.new_tab("https://example.com", SurfaceId(1));
    controller.go_back();
    controller.go_forward();
    controller.reload();
    controller.stop_loading();
    controller.navigate("https://elsewhere.example");
    controller.route_key(KeyEvent {
        virtual_key: 0x0D,
        character: Some('\r'),
        pressed: true,
        modifiers: Default::default(),
    });
    assert_eq!(controller.registry().len(), 1);

    // Source retrieval is the one path that reports the condition.
    assert!(controller.page_source(None).is_err());
}

#[test]
fn test_synchronous_reentry_does_not_deadlock() {
    let (controller, engine, notifier) = harness(false);

    let id = controller.new_tab("https://example.com", SurfaceId(1));
    // `load_url` re-enters on_address_change/on_load_state before returning.
    controller.navigate("https://reentrant.example");

    let handle = engine.handle_for(id).unwrap();
    assert_eq!(handle.loads.load(Ordering::SeqCst), 1);

    let (summaries, _) = controller.summaries();
    assert_eq!(summaries[0].url, "https://reentrant.example");
    assert!(summaries[0].is_loading);
    assert!(summaries[0].can_go_back, "nav state comes from the engine report");
    assert!(notifier.contains(&ShellEvent::NavigationChanged(id)));
}

#[test]
fn test_resize_triggers_synchronous_repaint() {
    let (controller, engine, _notifier) = harness(false);

    let id = controller.new_tab("https://example.com", SurfaceId(1));
    let size = BufferSize::new(64, 48);
    controller.resize(size);

    let handle = engine.handle_for(id).unwrap();
    assert_eq!(handle.resizes.lock().unwrap().as_slice(), &[size]);

    // The synchronous repaint callback landed in the tab's buffer.
    let (_, got_size, stride) = controller.registry().frame_snapshot(id).unwrap();
    assert_eq!(got_size, size);
    assert_eq!(stride, 64 * 4);
}

#[test]
fn test_paint_size_change_replaces_buffer() {
    let (controller, _engine, _notifier) = harness(false);
    let id = controller.new_tab("https://example.com", SurfaceId(1));

    let small = BufferSize::new(10, 10);
    controller.on_paint(id, &vec![0x11u8; 10 * 4 * 10], small, &[]);
    let big = BufferSize::new(30, 20);
    controller.on_paint(id, &vec![0x22u8; 30 * 4 * 20], big, &[]);

    let (data, got_size, stride) = controller.registry().frame_snapshot(id).unwrap();
    assert_eq!(got_size, big);
    assert_eq!(stride, 120);
    assert!(data.iter().all(|&b| b == 0x22));
}

#[test]
fn test_undisplayable_frame_is_skipped() {
    let (controller, _engine, notifier) = harness(false);
    let id = controller.new_tab("https://example.com", SurfaceId(1));

    // A frame over the dimension ceiling cannot be displayed; it is
    // dropped without panicking and without a FrameReady.
    let bogus = BufferSize::new(9000, 9000);
    controller.on_paint(id, &[0u8; 16], bogus, &[]);
    assert!(controller.registry().frame_snapshot(id).is_none());
    assert!(!notifier.contains(&ShellEvent::FrameReady(id)));
}

#[test]
fn test_page_source_round_trip() {
    let (controller, engine, _notifier) = harness(false);
    controller.new_tab("https://example.com", SurfaceId(1));

    let source = controller.page_source(None).unwrap();
    assert_eq!(source.as_deref(), Some("<html>scripted</html>"));
    // The visitor fired inline, so the waiter never had to pump.
    assert_eq!(engine.pumps.load(Ordering::SeqCst), 0);
}

#[test]
fn test_screenshot_before_first_paint_fails_cleanly() {
    let (controller, _engine, _notifier) = harness(false);
    controller.new_tab("https://example.com", SurfaceId(1));
    assert!(controller.screenshot_active().is_err());
}

#[test]
fn test_screenshot_after_paint_encodes_png() {
    let (controller, _engine, _notifier) = harness(false);
    let id = controller.new_tab("https://example.com", SurfaceId(1));

    let size = BufferSize::new(16, 8);
    controller.on_paint(id, &vec![0x7Fu8; 16 * 4 * 8], size, &[]);

    let shot = controller.screenshot_active().unwrap();
    assert_eq!((shot.width, shot.height), (16, 8));
    assert!(!shot.data_base64.is_empty());
}

#[test]
fn test_shutdown_closes_engines_before_clearing_registry() {
    let (controller, engine, _notifier) = harness(false);

    let a = controller.new_tab("https://a.example", SurfaceId(1));
    let b = controller.new_tab("https://b.example", SurfaceId(2));
    controller.shutdown();

    assert_eq!(engine.handle_for(a).unwrap().closes.load(Ordering::SeqCst), 1);
    assert_eq!(engine.handle_for(b).unwrap().closes.load(Ordering::SeqCst), 1);
    assert_eq!(engine.shutdowns.load(Ordering::SeqCst), 1);
    assert!(controller.registry().is_empty());
}

#[test]
fn test_tabs_changed_fires_once_per_activation() {
    let (controller, _engine, notifier) = harness(false);
    controller.new_tab("https://a.example", SurfaceId(1));
    controller.new_tab("https://b.example", SurfaceId(2));

    let before = notifier
        .events()
        .iter()
        .filter(|e| **e == ShellEvent::TabsChanged)
        .count();

    // Re-activating the already-active tab raises nothing.
    controller.activate(1).unwrap();
    // Switching raises exactly one TabsChanged.
    controller.activate(0).unwrap();

    let after = notifier
        .events()
        .iter()
        .filter(|e| **e == ShellEvent::TabsChanged)
        .count();
    assert_eq!(after, before + 1);
}

#[test]
fn test_activate_relative_wraps() {
    let (controller, _engine, _notifier) = harness(false);
    controller.new_tab("https://a.example", SurfaceId(1));
    controller.new_tab("https://b.example", SurfaceId(2));
    controller.new_tab("https://c.example", SurfaceId(3));
    controller.activate(2).unwrap();

    controller.activate_relative(1);
    assert_eq!(controller.registry().active_index(), Some(0));
    controller.activate_relative(-1);
    assert_eq!(controller.registry().active_index(), Some(2));
}
