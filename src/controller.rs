//! The window controller core.
//!
//! `BrowserController` bridges GUI-originated operations (navigation, tab
//! lifecycle, input, resize) and engine-originated callbacks (paint, load
//! state, address/title changes) through the [`TabRegistry`]. It is
//! toolkit-free: anything the GUI must react to is delivered as a
//! [`ShellEvent`] through the [`ShellNotifier`] the shell installs, which
//! keeps this whole layer testable without a window system.
//!
//! Every path in here follows the registry's two-phase discipline: extract
//! under the lock, release, then call into the engine.

use std::sync::{Arc, Mutex, OnceLock};
use std::time::Duration;

use tracing::{debug, warn};

use crate::engine::source_sink::DEFAULT_SOURCE_TIMEOUT;
use crate::engine::{
    Engine, EngineHandle, EngineObserver, KeyEvent, MouseEvent, NavigationState, SourceSink,
    WheelEvent,
};
use crate::managers::frame_buffer::FrameBufferManager;
use crate::managers::tab_registry::TabRegistry;
use crate::services::screenshot::{self, Screenshot};
use crate::types::errors::{ControllerError, ScreenshotError, TabError};
use crate::types::frame::{BufferSize, DirtyRect};
use crate::types::tab::{SurfaceId, TabId, TabSummary};

/// Events the controller raises toward the GUI thread. The shell forwards
/// them through the toolkit's event-loop proxy; tests record them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellEvent {
    /// A tab's frame buffer holds new pixels; repaint if it is the active tab.
    FrameReady(TabId),
    /// Tab set, order, or active selection changed; refresh the tab strip.
    TabsChanged,
    /// A tab's loading state or history availability changed; refresh the
    /// toolbar.
    NavigationChanged(TabId),
    /// A tab's title changed.
    TitleChanged(TabId),
}

/// Sink for [`ShellEvent`]s. Implementations must tolerate delivery from
/// the engine's callback thread.
pub trait ShellNotifier: Send + Sync {
    fn notify(&self, event: ShellEvent);
}

/// Orchestrates tab lifecycle and event routing. See module docs.
pub struct BrowserController {
    registry: Arc<TabRegistry>,
    frames: FrameBufferManager,
    notifier: Arc<dyn ShellNotifier>,
    engine: OnceLock<Arc<dyn Engine>>,
    /// Current content viewport size, applied to new and newly-activated
    /// tabs.
    viewport: Mutex<BufferSize>,
}

impl BrowserController {
    pub fn new(registry: Arc<TabRegistry>, notifier: Arc<dyn ShellNotifier>) -> Arc<Self> {
        Arc::new(Self {
            registry,
            frames: FrameBufferManager::new(),
            notifier,
            engine: OnceLock::new(),
            viewport: Mutex::new(BufferSize::new(1024, 768)),
        })
    }

    /// Install the engine backend. The controller is constructed first so
    /// the backend can take it as its observer; calling this twice is a
    /// programming error.
    pub fn set_engine(&self, engine: Arc<dyn Engine>) {
        if self.engine.set(engine).is_err() {
            warn!("engine backend installed twice; keeping the first");
        }
    }

    pub fn registry(&self) -> &Arc<TabRegistry> {
        &self.registry
    }

    fn engine(&self) -> Result<&Arc<dyn Engine>, ControllerError> {
        self.engine.get().ok_or(ControllerError::EngineUnavailable)
    }

    /// Resolve the active tab's engine handle under a fresh lock
    /// acquisition. Never cached by callers.
    fn active_engine(&self) -> Result<(TabId, Arc<dyn EngineHandle>), ControllerError> {
        self.registry
            .active_engine()
            .ok_or(ControllerError::EngineUnavailable)
    }

    // ─── Tab lifecycle ───

    /// Open a tab and begin asynchronous engine construction for it.
    pub fn new_tab(&self, url: &str, surface: SurfaceId) -> TabId {
        let size = *self.viewport.lock().unwrap();
        let (id, _index) = self.registry.create_tab(url, surface);
        match self.engine() {
            Ok(engine) => engine.spawn_browser(id, url, size),
            Err(_) => warn!(%id, "no engine backend; tab will stay engineless"),
        }
        self.notifier.notify(ShellEvent::TabsChanged);
        id
    }

    /// Close the tab at `index`. The engine close request is asynchronous
    /// ("close if possible") and is issued after the record is removed and
    /// the lock released, so no further routing can target the removed tab.
    pub fn close_tab(&self, index: usize) -> Result<(), TabError> {
        let handle = self.registry.close_tab(index)?;
        if let Some(handle) = handle {
            handle.close();
        }
        self.notifier.notify(ShellEvent::TabsChanged);
        Ok(())
    }

    pub fn close_active_tab(&self) -> Result<(), TabError> {
        match self.registry.active_index() {
            Some(index) => self.close_tab(index),
            None => Ok(()),
        }
    }

    /// Activate the tab at `index`; fires `TabsChanged` exactly once, and
    /// only on an actual change. The freshly active tab's viewport is
    /// brought up to date outside the lock.
    pub fn activate(&self, index: usize) -> Result<(), TabError> {
        let previous = self.registry.set_active(index)?;
        if previous == index {
            return Ok(());
        }

        let size = *self.viewport.lock().unwrap();
        if let Some((_, handle)) = self.registry.active_engine() {
            handle.resize(size);
        }

        self.notifier.notify(ShellEvent::TabsChanged);
        if let Some(id) = self.registry.active_tab_id() {
            self.notifier.notify(ShellEvent::FrameReady(id));
        }
        Ok(())
    }

    /// Cycle to the neighboring tab in display order.
    pub fn activate_relative(&self, offset: isize) {
        let count = self.registry.len();
        if count == 0 {
            return;
        }
        let current = self.registry.active_index().unwrap_or(0) as isize;
        let next = (current + offset).rem_euclid(count as isize) as usize;
        let _ = self.activate(next);
    }

    pub fn summaries(&self) -> (Vec<TabSummary>, Option<usize>) {
        self.registry.summaries()
    }

    // ─── Navigation (GUI -> engine) ───

    /// Navigate the active tab. Engine-unavailable degrades to a logged
    /// no-op; the UI stays responsive while a tab's engine instance is
    /// still initializing.
    pub fn navigate(&self, url: &str) {
        self.registry.with_active_tab(|tab| tab.url = url.to_string());
        match self.active_engine() {
            Ok((_, handle)) => handle.load_url(url),
            Err(_) => warn!(url, "navigate ignored: no engine attached"),
        }
    }

    pub fn go_back(&self) {
        match self.active_engine() {
            Ok((_, handle)) => handle.go_back(),
            Err(_) => warn!("back ignored: no engine attached"),
        }
    }

    pub fn go_forward(&self) {
        match self.active_engine() {
            Ok((_, handle)) => handle.go_forward(),
            Err(_) => warn!("forward ignored: no engine attached"),
        }
    }

    pub fn reload(&self) {
        match self.active_engine() {
            Ok((_, handle)) => handle.reload(),
            Err(_) => warn!("reload ignored: no engine attached"),
        }
    }

    pub fn stop_loading(&self) {
        match self.active_engine() {
            Ok((_, handle)) => handle.stop_loading(),
            Err(_) => warn!("stop ignored: no engine attached"),
        }
    }

    // ─── Input routing ───
    //
    // Each routing call re-resolves the active engine handle under a fresh
    // lock acquisition; the active tab may change between events.

    pub fn route_mouse(&self, event: MouseEvent) {
        if let Ok((_, handle)) = self.active_engine() {
            handle.send_mouse(event);
        }
    }

    pub fn route_wheel(&self, event: WheelEvent) {
        if let Ok((_, handle)) = self.active_engine() {
            handle.send_wheel(event);
        }
    }

    pub fn route_key(&self, event: KeyEvent) {
        if let Ok((_, handle)) = self.active_engine() {
            handle.send_key(event);
        }
    }

    pub fn route_focus(&self, focused: bool) {
        if let Ok((_, handle)) = self.active_engine() {
            handle.set_focus(focused);
        }
    }

    // ─── Viewport ───

    /// The GUI content area changed size. The handle is extracted under the
    /// lock and called after release; the engine may respond with an
    /// immediate synchronous repaint callback, which re-enters
    /// [`on_paint`](Self::on_paint) safely because nothing is held here.
    pub fn resize(&self, size: BufferSize) {
        if size.width <= 0 || size.height <= 0 {
            return;
        }
        *self.viewport.lock().unwrap() = size;
        if let Ok((_, handle)) = self.active_engine() {
            handle.resize(size);
        }
    }

    pub fn viewport(&self) -> BufferSize {
        *self.viewport.lock().unwrap()
    }

    // ─── Synchronous services ───

    /// Retrieve the active tab's document source, polling the engine pump
    /// with a bounded deadline. `None` on timeout.
    pub fn page_source(&self, timeout: Option<Duration>) -> Result<Option<String>, ControllerError> {
        let (_, handle) = self.active_engine()?;
        let engine = self.engine()?.clone();

        let sink = SourceSink::new();
        handle.get_source(sink.visitor());
        Ok(sink.wait_with_pump(&*engine, timeout.unwrap_or(DEFAULT_SOURCE_TIMEOUT)))
    }

    /// Encode the active tab's current frame as PNG. The pixels are cloned
    /// out under the lock; encoding happens after release.
    pub fn screenshot_active(&self) -> Result<Screenshot, ScreenshotError> {
        let id = self
            .registry
            .active_tab_id()
            .ok_or(ScreenshotError::NoFrame)?;
        let (data, size, stride) = self
            .registry
            .frame_snapshot(id)
            .ok_or(ScreenshotError::NoFrame)?;
        screenshot::encode_png(&data, size, stride)
    }

    // ─── Shutdown ───

    /// Window close: collect every engine handle under the lock, release,
    /// request each close (non-blocking), and only then clear the registry.
    /// This ordering prevents a late engine callback from referencing an
    /// erased record.
    pub fn shutdown(&self) {
        let handles = self.registry.collect_engine_handles();
        for handle in handles {
            handle.close();
        }
        self.registry.clear();
        if let Ok(engine) = self.engine() {
            engine.shutdown();
        }
    }
}

impl EngineObserver for BrowserController {
    /// Asynchronous completion of engine construction. Attaching to an
    /// already-closed tab is the expected race: the orphaned instance is
    /// asked to close and nothing else happens.
    fn on_browser_created(&self, tab: TabId, handle: Arc<dyn EngineHandle>) {
        if self.registry.attach_engine_handle(tab, Arc::clone(&handle)) {
            self.notifier.notify(ShellEvent::NavigationChanged(tab));
        } else {
            handle.close();
        }
    }

    /// Frame delivery on the engine's callback thread: copy into the tab's
    /// buffer (under the registry lock, pure data movement), then wake the
    /// GUI. Buffer-layer failures drop the frame; the next paint recovers.
    fn on_paint(&self, tab: TabId, pixels: &[u8], size: BufferSize, dirty: &[DirtyRect]) {
        match self
            .registry
            .apply_paint(tab, pixels, size, dirty, &self.frames)
        {
            Ok(true) => self.notifier.notify(ShellEvent::FrameReady(tab)),
            Ok(false) => {}
            Err(e) => warn!(%tab, error = %e, "dropping undisplayable frame"),
        }
    }

    fn on_load_state(&self, tab: TabId, state: NavigationState) {
        if self.registry.record_navigation_state(tab, state) {
            self.notifier.notify(ShellEvent::NavigationChanged(tab));
        } else {
            debug!(%tab, "load state for closed tab dropped");
        }
    }

    fn on_address_change(&self, tab: TabId, url: &str) {
        if self
            .registry
            .update_tab_by_id(tab, |t| t.url = url.to_string())
            .is_some()
        {
            self.notifier.notify(ShellEvent::NavigationChanged(tab));
        }
    }

    fn on_title_change(&self, tab: TabId, title: &str) {
        if self
            .registry
            .update_tab_by_id(tab, |t| t.title = title.to_string())
            .is_some()
        {
            self.notifier.notify(ShellEvent::TitleChanged(tab));
        }
    }
}
