//! The per-tab state registry.
//!
//! Single source of truth for tab order, active-tab selection, and per-tab
//! mutable state, shared by the GUI event thread, the engine's callback
//! thread, and timer-driven pumps.
//!
//! Locking discipline: exactly one (non-reentrant) mutex guards the tab
//! sequence and every per-tab field. The lock is held only for value
//! extraction, frame copies, or structural mutation, NEVER across a call
//! into the engine or the GUI toolkit. The engine may re-enter the
//! application synchronously while we are calling into it, so the sanctioned
//! pattern everywhere is: lock, extract (e.g. clone the engine handle `Arc`),
//! unlock, then call out. Callers must also never cache an extracted handle
//! across an event-queue hop; the active tab may change concurrently, so
//! each routing call re-resolves under a fresh acquisition.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::engine::{EngineHandle, NavigationState};
use crate::managers::frame_buffer::{FrameBufferManager, FrameBufferManagerTrait};
use crate::types::errors::{FrameBufferError, TabError};
use crate::types::frame::{BufferSize, DirtyRect};
use crate::types::tab::{SurfaceId, Tab, TabId, TabSummary};

struct Inner {
    tabs: Vec<Tab>,
    /// Index of the active tab; `None` is the defined "no tab" sentinel and
    /// holds exactly when `tabs` is empty.
    active: Option<usize>,
    next_id: u64,
}

/// Ordered, mutex-guarded collection of tabs with atomic active-tab
/// semantics.
pub struct TabRegistry {
    inner: Mutex<Inner>,
}

impl TabRegistry {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                tabs: Vec::new(),
                active: None,
                next_id: 1,
            }),
        }
    }

    /// Append a new tab and make it active. Returns the fresh id and its
    /// index. Does not block on engine construction; the engine handle is
    /// attached later via [`attach_engine_handle`](Self::attach_engine_handle).
    pub fn create_tab(&self, url: &str, surface: SurfaceId) -> (TabId, usize) {
        let mut inner = self.inner.lock().unwrap();
        let id = TabId(inner.next_id);
        inner.next_id += 1;
        inner.tabs.push(Tab::new(id, url, surface));
        let index = inner.tabs.len() - 1;
        inner.active = Some(index);
        (id, index)
    }

    /// Attach the asynchronously constructed engine handle to its tab.
    ///
    /// Returns `false` if the tab no longer exists: the expected
    /// close-during-attach race. The caller is then responsible for closing
    /// the orphaned handle; no live tab is touched and nothing is reported
    /// as an error.
    pub fn attach_engine_handle(&self, id: TabId, handle: Arc<dyn EngineHandle>) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.tabs.iter_mut().find(|t| t.id == id) {
            Some(tab) => {
                tab.engine = Some(handle);
                true
            }
            None => {
                debug!(%id, "engine handle arrived after tab was closed");
                false
            }
        }
    }

    /// Remove the tab at `index` and return its engine handle (if any) so
    /// the caller can request close OUTSIDE the lock.
    ///
    /// If the removed tab was active, the active index shifts to the
    /// following tab, else the preceding one; when the registry becomes
    /// empty the active index enters the `None` sentinel.
    pub fn close_tab(&self, index: usize) -> Result<Option<Arc<dyn EngineHandle>>, TabError> {
        let mut inner = self.inner.lock().unwrap();
        if index >= inner.tabs.len() {
            return Err(TabError::IndexOutOfRange(index));
        }

        let tab = inner.tabs.remove(index);
        let handle = tab.engine;

        inner.active = if inner.tabs.is_empty() {
            None
        } else {
            match inner.active {
                Some(active) if active == index => {
                    // Prefer the following tab (now at the same index), else
                    // the preceding one.
                    Some(index.min(inner.tabs.len() - 1))
                }
                Some(active) if active > index => Some(active - 1),
                other => other,
            }
        };

        Ok(handle)
    }

    /// Make `index` the active tab. Returns the previous active index so
    /// the caller can fire a "tab changed" notification exactly once.
    pub fn set_active(&self, index: usize) -> Result<usize, TabError> {
        let mut inner = self.inner.lock().unwrap();
        if index >= inner.tabs.len() {
            return Err(TabError::IndexOutOfRange(index));
        }
        // `active` is always Some while tabs exist, and tabs exist here.
        let previous = inner.active.unwrap_or(index);
        inner.active = Some(index);
        Ok(previous)
    }

    pub fn active_index(&self) -> Option<usize> {
        self.inner.lock().unwrap().active
    }

    pub fn active_tab_id(&self) -> Option<TabId> {
        let inner = self.inner.lock().unwrap();
        inner.active.map(|i| inner.tabs[i].id)
    }

    /// Extract the active tab's engine handle under the lock. The returned
    /// clone is safe to call after release; it must not be cached across a
    /// suspension point.
    pub fn active_engine(&self) -> Option<(TabId, Arc<dyn EngineHandle>)> {
        let inner = self.inner.lock().unwrap();
        let index = inner.active?;
        let tab = &inner.tabs[index];
        tab.engine.clone().map(|handle| (tab.id, handle))
    }

    /// Run `f` against the active tab, holding the lock for the duration.
    /// `f` must only extract or mutate tab state; no engine or toolkit
    /// calls.
    pub fn with_active_tab<R>(&self, f: impl FnOnce(&mut Tab) -> R) -> Option<R> {
        let mut inner = self.inner.lock().unwrap();
        let index = inner.active?;
        Some(f(&mut inner.tabs[index]))
    }

    /// Run `f` against the tab at `index`, same contract as
    /// [`with_active_tab`](Self::with_active_tab).
    pub fn update_tab<R>(&self, index: usize, f: impl FnOnce(&mut Tab) -> R) -> Result<R, TabError> {
        let mut inner = self.inner.lock().unwrap();
        if index >= inner.tabs.len() {
            return Err(TabError::IndexOutOfRange(index));
        }
        Ok(f(&mut inner.tabs[index]))
    }

    /// Run `f` against the tab with `id`, if it still exists. Engine
    /// callbacks identify tabs by id because indices shift under close.
    pub fn update_tab_by_id<R>(&self, id: TabId, f: impl FnOnce(&mut Tab) -> R) -> Option<R> {
        let mut inner = self.inner.lock().unwrap();
        inner.tabs.iter_mut().find(|t| t.id == id).map(f)
    }

    /// Move the tab at `from` to display position `to`, keeping the active
    /// tab active.
    pub fn reorder_tab(&self, from: usize, to: usize) -> Result<(), TabError> {
        let mut inner = self.inner.lock().unwrap();
        if from >= inner.tabs.len() {
            return Err(TabError::IndexOutOfRange(from));
        }
        if to >= inner.tabs.len() {
            return Err(TabError::IndexOutOfRange(to));
        }

        let active_id = inner.active.map(|i| inner.tabs[i].id);
        let tab = inner.tabs.remove(from);
        inner.tabs.insert(to, tab);
        if let Some(id) = active_id {
            inner.active = inner.tabs.iter().position(|t| t.id == id);
        }
        Ok(())
    }

    /// Record an engine-reported navigation state change. Back/forward
    /// enablement is never computed locally; the engine's report is the
    /// only source.
    pub fn record_navigation_state(&self, id: TabId, state: NavigationState) -> bool {
        self.update_tab_by_id(id, |tab| {
            tab.is_loading = state.is_loading;
            tab.can_go_back = state.can_go_back;
            tab.can_go_forward = state.can_go_forward;
        })
        .is_some()
    }

    /// Copy an engine paint into the owning tab's frame buffer.
    ///
    /// When the paint size differs from the current buffer, the buffer is
    /// replaced with a fresh zero-initialized allocation (never resized in
    /// place); the paint's dirty rects are then applied as delivered;
    /// an empty rect list takes the whole frame.
    ///
    /// Returns `Ok(false)` when the tab is already gone (expected race with
    /// close), `Err` only for allocation/size failures, which the caller
    /// decides to recover from by skipping the frame.
    pub fn apply_paint(
        &self,
        id: TabId,
        pixels: &[u8],
        size: BufferSize,
        dirty: &[DirtyRect],
        frames: &FrameBufferManager,
    ) -> Result<bool, FrameBufferError> {
        let mut inner = self.inner.lock().unwrap();
        let Some(tab) = inner.tabs.iter_mut().find(|t| t.id == id) else {
            debug!(%id, "paint for closed tab dropped");
            return Ok(false);
        };

        if tab.frame.as_ref().map(|b| b.size()) != Some(size) {
            tab.frame = Some(frames.allocate(size)?);
        }
        if let Some(frame) = tab.frame.as_mut() {
            frames.copy_dirty(frame, pixels, size, dirty)?;
        }
        Ok(true)
    }

    /// Clone out the bytes of a tab's current frame: `(data, size, stride)`.
    /// The copy lets callers encode or blit without holding the lock.
    pub fn frame_snapshot(&self, id: TabId) -> Option<(Vec<u8>, BufferSize, usize)> {
        let inner = self.inner.lock().unwrap();
        let tab = inner.tabs.iter().find(|t| t.id == id)?;
        let frame = tab.frame.as_ref()?;
        Some((frame.data().to_vec(), frame.size(), frame.stride()))
    }

    /// Ordered UI snapshots of every tab plus the active index.
    pub fn summaries(&self) -> (Vec<TabSummary>, Option<usize>) {
        let inner = self.inner.lock().unwrap();
        let summaries = inner
            .tabs
            .iter()
            .enumerate()
            .map(|(i, tab)| tab.summary(inner.active == Some(i)))
            .collect();
        (summaries, inner.active)
    }

    /// Extract every tab's engine handle for shutdown. The registry itself
    /// is untouched; the caller closes the handles outside the lock and
    /// then calls [`clear`](Self::clear).
    pub fn collect_engine_handles(&self) -> Vec<Arc<dyn EngineHandle>> {
        let inner = self.inner.lock().unwrap();
        inner.tabs.iter().filter_map(|t| t.engine.clone()).collect()
    }

    /// Drop every tab record and enter the sentinel state. Only valid after
    /// engine shutdown has been requested for all handles, so no callback
    /// can reference an erased record.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().unwrap();
        let dropped = inner.tabs.len();
        inner.tabs.clear();
        inner.active = None;
        if dropped > 0 {
            debug!(dropped, "registry cleared");
        }
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().tabs.is_empty()
    }
}

impl Default for TabRegistry {
    fn default() -> Self {
        Self::new()
    }
}
