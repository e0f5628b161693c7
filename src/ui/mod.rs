//! GUI layer.
//!
//! A `tao` window hosting two paint paths side by side:
//! - the content area, where the active tab's engine-rendered BGRA frame is
//!   blitted through a [`surface::PaintSurface`] backend, and
//! - the chat side panel, a `wry` webview docked at the right edge
//!   (Windows: WebView2, Linux: WebKitGTK, macOS: WKWebView).
//!
//! The controller raises [`ShellEvent`]s from any thread; the shell turns
//! them into `tao` user events and reacts on the GUI thread.

use crate::controller::ShellEvent;
use crate::types::ai::AIChatMessage;
use crate::types::errors::AIError;

pub mod chat_panel;
pub mod shell;
pub mod surface;

/// Events delivered through the `tao` event-loop proxy.
#[derive(Debug)]
pub enum UserEvent {
    /// Raised by the controller (possibly from the engine thread).
    Shell(ShellEvent),
    /// A chat completion finished on the assistant's runtime thread.
    ChatCompleted(Result<AIChatMessage, AIError>),
    /// Script the chat panel should evaluate (queued from its IPC handler).
    ChatScript(String),
}
