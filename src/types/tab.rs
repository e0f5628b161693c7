use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::engine::EngineHandle;
use crate::types::frame::PixelBuffer;

/// Identifier for a tab, stable for the tab's whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab-{}", self.0)
    }
}

/// Non-owning reference to the GUI-visible render surface of a tab.
/// The surface itself is owned by the window shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub u32);

/// One browser tab: the engine instance it owns, the frame it last painted,
/// and its navigation state as reported by the engine.
pub struct Tab {
    pub id: TabId,
    pub url: String,
    pub title: String,
    pub is_loading: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    /// Engine instance for this tab. `None` until asynchronous engine
    /// construction completes (the handle is attached later).
    pub engine: Option<Arc<dyn EngineHandle>>,
    /// Last painted frame. `None` before the first paint.
    pub frame: Option<PixelBuffer>,
    pub surface: SurfaceId,
}

impl Tab {
    pub fn new(id: TabId, url: &str, surface: SurfaceId) -> Self {
        Self {
            id,
            url: url.to_string(),
            title: "New Tab".to_string(),
            is_loading: false,
            can_go_back: false,
            can_go_forward: false,
            engine: None,
            frame: None,
            surface,
        }
    }

    pub fn summary(&self, active: bool) -> TabSummary {
        TabSummary {
            id: self.id,
            url: self.url.clone(),
            title: self.title.clone(),
            is_loading: self.is_loading,
            can_go_back: self.can_go_back,
            can_go_forward: self.can_go_forward,
            active,
        }
    }
}

impl fmt::Debug for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tab")
            .field("id", &self.id)
            .field("url", &self.url)
            .field("is_loading", &self.is_loading)
            .field("has_engine", &self.engine.is_some())
            .field("has_frame", &self.frame.is_some())
            .finish()
    }
}

/// Plain snapshot of a tab's UI-visible state, safe to hand to the GUI or
/// serialize for the chat panel without holding the registry lock.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabSummary {
    pub id: TabId,
    pub url: String,
    pub title: String,
    pub is_loading: bool,
    pub can_go_back: bool,
    pub can_go_forward: bool,
    pub active: bool,
}
