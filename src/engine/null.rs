//! Placeholder engine backend.
//!
//! `NullEngine` stands in for a real embedded engine during development and
//! in tests: it runs its own callback thread, keeps a synthetic history per
//! browser, and paints solid-color frames derived from the current URL. It
//! exercises the exact same observer pipeline a real backend would: frames
//! arrive on a non-GUI thread, browser creation completes asynchronously,
//! and close requests race against in-flight work.

use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use tracing::{debug, trace, warn};

use crate::types::frame::BufferSize;
use crate::types::tab::TabId;

use super::{
    Engine, EngineHandle, EngineObserver, KeyEvent, MouseEvent, NavigationState, SourceVisitor,
    WheelEvent,
};

enum Command {
    Spawn {
        tab: TabId,
        url: String,
        size: BufferSize,
    },
    Load {
        tab: TabId,
        url: String,
    },
    Back {
        tab: TabId,
    },
    Forward {
        tab: TabId,
    },
    Reload {
        tab: TabId,
    },
    Resize {
        tab: TabId,
        size: BufferSize,
    },
    Source {
        tab: TabId,
        visitor: SourceVisitor,
    },
    Close {
        tab: TabId,
    },
    Shutdown,
}

/// Synthetic per-browser page state, shared between the worker thread and
/// the tab's handle so `navigation_state` can answer synchronously.
struct PageState {
    history: Vec<String>,
    index: usize,
    size: BufferSize,
    loading: bool,
}

impl PageState {
    fn current_url(&self) -> &str {
        &self.history[self.index]
    }

    fn navigation(&self) -> NavigationState {
        NavigationState {
            is_loading: self.loading,
            can_go_back: self.index > 0,
            can_go_forward: self.index + 1 < self.history.len(),
        }
    }
}

/// In-process placeholder backend. See module docs.
pub struct NullEngine {
    tx: Sender<Command>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl NullEngine {
    pub fn new(observer: Arc<dyn EngineObserver>) -> Arc<Self> {
        let (tx, rx) = mpsc::channel();
        let worker_tx = tx.clone();
        let worker = std::thread::Builder::new()
            .name("null-engine".to_string())
            .spawn(move || run_worker(rx, worker_tx, observer))
            .expect("failed to spawn engine thread");

        Arc::new(Self {
            tx,
            worker: Mutex::new(Some(worker)),
        })
    }
}

impl Engine for NullEngine {
    fn spawn_browser(&self, tab: TabId, url: &str, size: BufferSize) {
        let _ = self.tx.send(Command::Spawn {
            tab,
            url: url.to_string(),
            size,
        });
    }

    fn pump(&self) {
        // The placeholder backend processes work on its own thread; there is
        // no external message loop to drive.
    }

    fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
        if let Some(worker) = self.worker.lock().unwrap().take() {
            if worker.join().is_err() {
                warn!("engine thread panicked during shutdown");
            }
        }
    }
}

/// Per-tab handle into the placeholder backend. Requests are forwarded to
/// the worker thread; only `navigation_state` answers in place.
struct NullHandle {
    tab: TabId,
    tx: Sender<Command>,
    state: Arc<Mutex<PageState>>,
}

impl EngineHandle for NullHandle {
    fn load_url(&self, url: &str) {
        let _ = self.tx.send(Command::Load {
            tab: self.tab,
            url: url.to_string(),
        });
    }

    fn go_back(&self) {
        let _ = self.tx.send(Command::Back { tab: self.tab });
    }

    fn go_forward(&self) {
        let _ = self.tx.send(Command::Forward { tab: self.tab });
    }

    fn reload(&self) {
        let _ = self.tx.send(Command::Reload { tab: self.tab });
    }

    fn stop_loading(&self) {
        // Synthetic loads complete within one worker iteration; nothing is
        // ever in flight long enough to stop.
        trace!(tab = %self.tab, "stop_loading ignored by placeholder backend");
    }

    fn resize(&self, size: BufferSize) {
        let _ = self.tx.send(Command::Resize {
            tab: self.tab,
            size,
        });
    }

    fn execute_script(&self, code: &str, origin_url: &str, _line_offset: i32) {
        debug!(
            tab = %self.tab,
            origin = origin_url,
            bytes = code.len(),
            "execute_script dropped by placeholder backend"
        );
    }

    fn get_source(&self, visitor: SourceVisitor) {
        let _ = self.tx.send(Command::Source {
            tab: self.tab,
            visitor,
        });
    }

    fn navigation_state(&self) -> NavigationState {
        self.state.lock().unwrap().navigation()
    }

    fn send_mouse(&self, event: MouseEvent) {
        trace!(tab = %self.tab, x = event.x, y = event.y, "mouse event dropped");
    }

    fn send_wheel(&self, event: WheelEvent) {
        trace!(tab = %self.tab, dy = event.delta_y, "wheel event dropped");
    }

    fn send_key(&self, event: KeyEvent) {
        trace!(tab = %self.tab, vk = event.virtual_key, "key event dropped");
    }

    fn set_focus(&self, focused: bool) {
        trace!(tab = %self.tab, focused, "focus change dropped");
    }

    fn close(&self) {
        let _ = self.tx.send(Command::Close { tab: self.tab });
    }
}

fn run_worker(rx: Receiver<Command>, tx: Sender<Command>, observer: Arc<dyn EngineObserver>) {
    let mut browsers: HashMap<TabId, Arc<Mutex<PageState>>> = HashMap::new();

    while let Ok(command) = rx.recv() {
        match command {
            Command::Spawn { tab, url, size } => {
                let state = Arc::new(Mutex::new(PageState {
                    history: vec![url],
                    index: 0,
                    size,
                    loading: false,
                }));
                browsers.insert(tab, Arc::clone(&state));
                let handle: Arc<dyn EngineHandle> = Arc::new(NullHandle {
                    tab,
                    tx: tx.clone(),
                    state: Arc::clone(&state),
                });
                debug!(%tab, "browser created");
                observer.on_browser_created(tab, handle);
                complete_load(&observer, tab, &state);
            }
            Command::Load { tab, url } => {
                if let Some(state) = browsers.get(&tab) {
                    {
                        let mut page = state.lock().unwrap();
                        let index = page.index;
                        page.history.truncate(index + 1);
                        page.history.push(url);
                        page.index += 1;
                    }
                    complete_load(&observer, tab, state);
                }
            }
            Command::Back { tab } => {
                if let Some(state) = browsers.get(&tab) {
                    let moved = {
                        let mut page = state.lock().unwrap();
                        if page.index > 0 {
                            page.index -= 1;
                            true
                        } else {
                            false
                        }
                    };
                    if moved {
                        complete_load(&observer, tab, state);
                    }
                }
            }
            Command::Forward { tab } => {
                if let Some(state) = browsers.get(&tab) {
                    let moved = {
                        let mut page = state.lock().unwrap();
                        if page.index + 1 < page.history.len() {
                            page.index += 1;
                            true
                        } else {
                            false
                        }
                    };
                    if moved {
                        complete_load(&observer, tab, state);
                    }
                }
            }
            Command::Reload { tab } => {
                if let Some(state) = browsers.get(&tab) {
                    complete_load(&observer, tab, state);
                }
            }
            Command::Resize { tab, size } => {
                if let Some(state) = browsers.get(&tab) {
                    state.lock().unwrap().size = size;
                    paint(&observer, tab, state);
                }
            }
            Command::Source { tab, visitor } => {
                if let Some(state) = browsers.get(&tab) {
                    let url = state.lock().unwrap().current_url().to_string();
                    visitor(page_html(&url));
                }
                // A closed tab's visitor is simply never invoked; the waiter
                // times out.
            }
            Command::Close { tab } => {
                if browsers.remove(&tab).is_some() {
                    debug!(%tab, "browser closed");
                }
            }
            Command::Shutdown => break,
        }
    }
}

/// Emit the load sequence a real engine produces: loading begins, address
/// and title settle, a frame is painted, loading ends.
fn complete_load(observer: &Arc<dyn EngineObserver>, tab: TabId, state: &Arc<Mutex<PageState>>) {
    let (url, nav) = {
        let mut page = state.lock().unwrap();
        page.loading = true;
        (page.current_url().to_string(), page.navigation())
    };
    observer.on_load_state(tab, nav);
    observer.on_address_change(tab, &url);
    observer.on_title_change(tab, &page_title(&url));
    paint(observer, tab, state);
    let nav = {
        let mut page = state.lock().unwrap();
        page.loading = false;
        page.navigation()
    };
    observer.on_load_state(tab, nav);
}

fn paint(observer: &Arc<dyn EngineObserver>, tab: TabId, state: &Arc<Mutex<PageState>>) {
    let (size, color) = {
        let page = state.lock().unwrap();
        (page.size, page_color(page.current_url()))
    };
    if size.width <= 0 || size.height <= 0 {
        return;
    }

    // Width-only stride, as a windowless engine reports it.
    let stride = size.width as usize * 4;
    let mut pixels = vec![0u8; stride * size.height as usize];
    for pixel in pixels.chunks_exact_mut(4) {
        pixel.copy_from_slice(&color);
    }
    observer.on_paint(tab, &pixels, size, &[]);
}

/// Stable BGRA fill color for a URL, so different pages are visually
/// distinguishable.
fn page_color(url: &str) -> [u8; 4] {
    let mut hash: u32 = 0x811c_9dc5;
    for byte in url.bytes() {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    [
        (hash & 0xff) as u8,
        ((hash >> 8) & 0xff) as u8,
        ((hash >> 16) & 0xff) as u8,
        0xff,
    ]
}

fn page_title(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap_or(url)
        .to_string()
}

fn page_html(url: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>{}</title></head><body><p>{}</p></body></html>",
        page_title(url),
        url
    )
}
