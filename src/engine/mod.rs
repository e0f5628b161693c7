//! The embedded engine boundary.
//!
//! The browser engine is an external collaborator: it runs its own
//! callback thread(s), paints BGRA frames through [`EngineObserver::on_paint`],
//! and is driven by a periodic [`Engine::pump`] on the GUI thread. Everything
//! the container knows about it goes through the three traits in this module.
//!
//! Backends implement [`Engine`] (process-wide) and [`EngineHandle`]
//! (one per tab). The in-tree [`null::NullEngine`] is a development backend;
//! real engines slot in behind the same traits.

use std::sync::Arc;

use crate::types::frame::{BufferSize, DirtyRect};
use crate::types::tab::TabId;

pub mod null;
pub mod source_sink;

pub use source_sink::SourceSink;

/// Navigation state as reported by the engine. The engine is the sole
/// source of truth for navigability; nothing here is computed locally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationState {
    pub is_loading: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
}

/// Keyboard modifier state in the engine's expected encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    pub shift: bool,
    pub control: bool,
    pub alt: bool,
    pub meta: bool,
}

/// Pointer button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// A pointer event in buffer-local coordinates.
#[derive(Debug, Clone, Copy)]
pub struct MouseEvent {
    pub x: i32,
    pub y: i32,
    /// `None` for pure movement.
    pub button: Option<MouseButton>,
    pub pressed: bool,
    pub click_count: u8,
    pub modifiers: KeyModifiers,
}

/// A scroll event in buffer-local coordinates.
#[derive(Debug, Clone, Copy)]
pub struct WheelEvent {
    pub x: i32,
    pub y: i32,
    pub delta_x: i32,
    pub delta_y: i32,
    pub modifiers: KeyModifiers,
}

/// A key event carrying the fixed cross-platform virtual-key code
/// (see [`crate::platform::input`]) and the character it produced, if any.
#[derive(Debug, Clone, Copy)]
pub struct KeyEvent {
    pub virtual_key: u16,
    pub character: Option<char>,
    pub pressed: bool,
    pub modifiers: KeyModifiers,
}

/// Visitor invoked exactly once with the full document text, or never
/// (callers bound the wait, see [`SourceSink`]).
pub type SourceVisitor = Box<dyn FnOnce(String) + Send>;

/// Callbacks the container implements. Invoked on the engine's own
/// callback thread unless a backend documents otherwise; implementations
/// must not assume they run on the GUI thread.
pub trait EngineObserver: Send + Sync {
    /// Asynchronous completion of [`Engine::spawn_browser`]. The tab may
    /// already be closed by the time this fires; receivers treat that as an
    /// expected race, not an error.
    fn on_browser_created(&self, tab: TabId, handle: Arc<dyn EngineHandle>);

    /// A frame was painted. `pixels` is BGRA with a row stride of
    /// `size.width * 4`; `dirty` lists the regions that changed (empty means
    /// the whole frame should be taken).
    fn on_paint(&self, tab: TabId, pixels: &[u8], size: BufferSize, dirty: &[DirtyRect]);

    /// Loading started or finished, or history availability changed.
    fn on_load_state(&self, tab: TabId, state: NavigationState);

    /// The main frame's address changed (navigation, redirect).
    fn on_address_change(&self, tab: TabId, url: &str);

    /// The document title changed.
    fn on_title_change(&self, tab: TabId, title: &str);
}

/// One embedded browser instance, exclusively owned by a tab.
///
/// All methods are asynchronous requests into the engine; none block.
/// Callers must follow the registry's two-phase discipline: extract the
/// handle under the registry lock, release the lock, then call; the engine
/// may re-enter the application synchronously from any of these calls.
pub trait EngineHandle: Send + Sync {
    fn load_url(&self, url: &str);
    fn go_back(&self);
    fn go_forward(&self);
    fn reload(&self);
    fn stop_loading(&self);

    /// Viewport size changed. May trigger an immediate synchronous repaint
    /// callback.
    fn resize(&self, size: BufferSize);

    /// Fire-and-forget script execution; no return value is observable.
    fn execute_script(&self, code: &str, origin_url: &str, line_offset: i32);

    /// Request the document source. The visitor is invoked exactly once
    /// with the full text, or never.
    fn get_source(&self, visitor: SourceVisitor);

    /// Synchronous on-demand query of the engine's navigation state.
    fn navigation_state(&self) -> NavigationState;

    fn send_mouse(&self, event: MouseEvent);
    fn send_wheel(&self, event: WheelEvent);
    fn send_key(&self, event: KeyEvent);
    fn set_focus(&self, focused: bool);

    /// Asynchronous "close if possible". Never blocks on in-flight
    /// navigation; no further callbacks for this tab should be expected
    /// once the close completes.
    fn close(&self);
}

/// The process-wide engine backend.
pub trait Engine: Send + Sync {
    /// Begin constructing a browser instance for `tab`. Completion is
    /// delivered via [`EngineObserver::on_browser_created`]; the caller does
    /// not block.
    fn spawn_browser(&self, tab: TabId, url: &str, size: BufferSize);

    /// Run one iteration of the engine's internal message processing.
    /// Scheduled by the GUI thread every ~10 ms.
    fn pump(&self);

    /// Request shutdown of the whole backend. Called after every per-tab
    /// handle has been asked to close.
    fn shutdown(&self);
}
