//! The window shell.
//!
//! Owns the `tao` event loop and window, the CPU paint surface for the
//! content area, the docked chat panel, and the ~10 ms timer that pumps the
//! engine's message processing. GUI events are translated and routed to the
//! active tab's engine through the controller; controller events arrive
//! back as user events and drive repaints and chrome refreshes.

use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use tao::dpi::LogicalSize;
use tao::event::{ElementState, Event, MouseScrollDelta, StartCause, WindowEvent};
use tao::event_loop::{ControlFlow, EventLoop, EventLoopBuilder, EventLoopProxy};
use tao::keyboard::Key;
use tao::window::WindowBuilder;
use tracing::{error, info, warn};

use crate::app::App;
use crate::controller::{BrowserController, ShellEvent, ShellNotifier};
use crate::engine::null::NullEngine;
use crate::engine::{Engine, KeyModifiers, MouseButton, MouseEvent, WheelEvent};
use crate::managers::shortcut_manager::ShortcutManagerTrait;
use crate::platform;
use crate::platform::input;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::frame::BufferSize;
use crate::types::tab::SurfaceId;

use super::chat_panel::ChatPanel;
use super::surface::{FrameRef, PaintSurface, SoftSurface};
use super::UserEvent;

/// Pixels scrolled per wheel line tick.
const LINE_SCROLL_PX: f64 = 40.0;

/// Forwards controller events into the `tao` event queue. Deliverable from
/// the engine's callback thread, hence the mutex around the proxy.
struct ProxyNotifier {
    proxy: Mutex<EventLoopProxy<UserEvent>>,
}

impl ShellNotifier for ProxyNotifier {
    fn notify(&self, event: ShellEvent) {
        let _ = self.proxy.lock().unwrap().send_event(UserEvent::Shell(event));
    }
}

/// Main entry point for the GUI.
pub fn run() {
    let mut app = App::new(None).expect("Failed to initialize application");
    app.startup();

    let settings = app.settings_engine.get_settings().clone();
    let registry = Arc::clone(&app.registry);
    let app = Arc::new(Mutex::new(app));

    let event_loop: EventLoop<UserEvent> = EventLoopBuilder::with_user_event().build();
    let proxy = event_loop.create_proxy();

    let notifier = Arc::new(ProxyNotifier {
        proxy: Mutex::new(proxy.clone()),
    });
    let controller = BrowserController::new(registry, notifier);

    let engine = NullEngine::new(controller.clone());
    controller.set_engine(engine.clone());

    let window = Rc::new(
        WindowBuilder::new()
            .with_title("osrbrowser")
            .with_inner_size(LogicalSize::new(1280.0, 800.0))
            .build(&event_loop)
            .expect("Failed to create window"),
    );

    let mut surface = SoftSurface::new(Rc::clone(&window)).expect("Failed to create paint surface");

    let logical = logical_size(&window);
    let mut chat = ChatPanel::new(
        &window,
        Arc::clone(&app),
        controller.clone(),
        proxy.clone(),
        settings.chat.panel_width,
        logical,
    )
    .expect("Failed to create chat panel");

    // First tab.
    let mut next_surface: u32 = 1;
    controller.resize(content_size(&window, &chat));
    controller.new_tab(&settings.general.homepage, SurfaceId(next_surface));
    next_surface += 1;

    let pump_interval = Duration::from_millis(settings.engine.pump_interval_ms.max(1));
    let source_timeout = Duration::from_millis(settings.engine.source_timeout_ms);
    let new_tab_url = settings.general.new_tab_url.clone();
    let mut next_pump = Instant::now() + pump_interval;
    let mut modifiers = KeyModifiers::default();
    let mut cursor = (0i32, 0i32);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::WaitUntil(next_pump);

        match event {
            Event::NewEvents(StartCause::ResumeTimeReached { .. }) => {
                engine.pump();
                next_pump = Instant::now() + pump_interval;
                *control_flow = ControlFlow::WaitUntil(next_pump);
            }

            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    controller.shutdown();
                    app.lock().unwrap().shutdown();
                    *control_flow = ControlFlow::Exit;
                }

                WindowEvent::Resized(_) => {
                    chat.reposition(logical_size(&window));
                    controller.resize(content_size(&window, &chat));
                    window.request_redraw();
                }

                WindowEvent::ModifiersChanged(state) => {
                    modifiers = input::modifiers(
                        state.shift_key(),
                        state.control_key(),
                        state.alt_key(),
                        state.super_key(),
                    );
                }

                WindowEvent::CursorMoved { position, .. } => {
                    cursor = (position.x as i32, position.y as i32);
                    controller.route_mouse(MouseEvent {
                        x: cursor.0,
                        y: cursor.1,
                        button: None,
                        pressed: false,
                        click_count: 0,
                        modifiers,
                    });
                }

                WindowEvent::MouseInput { state, button, .. } => {
                    let button = match button {
                        tao::event::MouseButton::Left => Some(MouseButton::Left),
                        tao::event::MouseButton::Middle => Some(MouseButton::Middle),
                        tao::event::MouseButton::Right => Some(MouseButton::Right),
                        _ => None,
                    };
                    if let Some(button) = button {
                        controller.route_mouse(MouseEvent {
                            x: cursor.0,
                            y: cursor.1,
                            button: Some(button),
                            pressed: state == ElementState::Pressed,
                            click_count: 1,
                            modifiers,
                        });
                    }
                }

                WindowEvent::MouseWheel { delta, .. } => {
                    let (dx, dy) = match delta {
                        MouseScrollDelta::LineDelta(x, y) => {
                            ((x as f64 * LINE_SCROLL_PX) as i32, (y as f64 * LINE_SCROLL_PX) as i32)
                        }
                        MouseScrollDelta::PixelDelta(pos) => (pos.x as i32, pos.y as i32),
                        _ => (0, 0),
                    };
                    controller.route_wheel(WheelEvent {
                        x: cursor.0,
                        y: cursor.1,
                        delta_x: dx,
                        delta_y: dy,
                        modifiers,
                    });
                }

                WindowEvent::Focused(focused) => {
                    controller.route_focus(focused);
                }

                WindowEvent::KeyboardInput { event, .. } => {
                    let Some(name) = key_name(&event.logical_key) else {
                        return;
                    };
                    let pressed = event.state == ElementState::Pressed;

                    // Bound combos are handled by the shell and never reach
                    // page content.
                    if pressed {
                        if let Some(combo) = input::combo_string(modifiers, &name) {
                            let action = app
                                .lock()
                                .unwrap()
                                .shortcut_manager
                                .action_for_combo(&combo)
                                .map(|a| a.to_string());
                            if let Some(action) = action {
                                run_action(
                                    &action,
                                    &controller,
                                    &mut chat,
                                    &window,
                                    &new_tab_url,
                                    source_timeout,
                                    &mut next_surface,
                                    control_flow,
                                    &app,
                                );
                                return;
                            }
                        }
                    }

                    if let Some(virtual_key) = input::virtual_key_code(&name) {
                        controller.route_key(crate::engine::KeyEvent {
                            virtual_key,
                            character: event.text.and_then(|t| t.chars().next()),
                            pressed,
                            modifiers,
                        });
                    }
                }

                _ => {}
            },

            Event::UserEvent(user_event) => match user_event {
                UserEvent::Shell(ShellEvent::FrameReady(id)) => {
                    if controller.registry().active_tab_id() == Some(id) {
                        window.request_redraw();
                    }
                }
                UserEvent::Shell(ShellEvent::TabsChanged) => {
                    refresh_chrome(&controller, &chat, &window);
                    window.request_redraw();
                }
                UserEvent::Shell(ShellEvent::NavigationChanged(_))
                | UserEvent::Shell(ShellEvent::TitleChanged(_)) => {
                    refresh_chrome(&controller, &chat, &window);
                }
                UserEvent::ChatCompleted(result) => {
                    chat.on_completion(&result);
                }
                UserEvent::ChatScript(script) => {
                    chat.evaluate(&script);
                }
            },

            Event::RedrawRequested(_) => {
                paint(&controller, &mut surface, &window, &chat);
            }

            _ => {}
        }
    });
}

/// Window title + chat panel header follow the active tab.
fn refresh_chrome(controller: &Arc<BrowserController>, chat: &ChatPanel, window: &tao::window::Window) {
    let (summaries, _) = controller.summaries();
    let active = summaries.iter().find(|t| t.active);
    match active {
        Some(tab) => {
            let spinner = if tab.is_loading { "⟳ " } else { "" };
            window.set_title(&format!("{}{} — osrbrowser", spinner, tab.title));
        }
        None => window.set_title("osrbrowser"),
    }
    chat.update_page(active);
}

/// Blit the active tab's frame (cloned out of the registry) into the
/// content area.
fn paint(
    controller: &Arc<BrowserController>,
    surface: &mut SoftSurface,
    window: &tao::window::Window,
    chat: &ChatPanel,
) {
    let inner = window.inner_size();
    let content = content_size(window, chat);

    let snapshot = controller
        .registry()
        .active_tab_id()
        .and_then(|id| controller.registry().frame_snapshot(id));

    let frame = snapshot.as_ref().map(|(data, size, stride)| FrameRef {
        pixels: data,
        size: *size,
        stride: *stride,
    });
    // Present over the full window; the chat webview child overlays the
    // right edge, so clipping the frame to the content width is enough.
    let frame = frame.filter(|_| content.width > 0);
    if let Err(e) = surface.present(inner.width, inner.height, frame) {
        error!(error = %e, "present failed");
    }
}

/// Physical size of the engine-rendered content area (window minus the
/// chat panel).
fn content_size(window: &tao::window::Window, chat: &ChatPanel) -> BufferSize {
    let inner = window.inner_size();
    let scale = window.scale_factor();
    let panel = (chat.occupied_width() as f64 * scale).round() as u32;
    BufferSize::new(
        inner.width.saturating_sub(panel) as i32,
        inner.height as i32,
    )
}

fn logical_size(window: &tao::window::Window) -> (u32, u32) {
    let logical: LogicalSize<f64> = window.inner_size().to_logical(window.scale_factor());
    (logical.width as u32, logical.height as u32)
}

/// Execute a shortcut action.
#[allow(clippy::too_many_arguments)]
fn run_action(
    action: &str,
    controller: &Arc<BrowserController>,
    chat: &mut ChatPanel,
    window: &Rc<tao::window::Window>,
    new_tab_url: &str,
    source_timeout: Duration,
    next_surface: &mut u32,
    control_flow: &mut ControlFlow,
    app: &Arc<Mutex<App>>,
) {
    match action {
        "new_tab" => {
            controller.new_tab(new_tab_url, SurfaceId(*next_surface));
            *next_surface += 1;
        }
        "close_tab" => {
            let _ = controller.close_active_tab();
        }
        "next_tab" => controller.activate_relative(1),
        "prev_tab" => controller.activate_relative(-1),
        "reload" => controller.reload(),
        "back" => controller.go_back(),
        "forward" => controller.go_forward(),
        "stop_loading" => controller.stop_loading(),
        "view_source" => match controller.page_source(Some(source_timeout)) {
            Ok(Some(source)) => info!(bytes = source.len(), "page source retrieved"),
            Ok(None) => warn!("page source request timed out"),
            Err(e) => warn!(error = %e, "page source unavailable"),
        },
        "screenshot" => match controller.screenshot_active() {
            Ok(shot) => save_screenshot(&shot),
            Err(e) => warn!(error = %e, "screenshot unavailable"),
        },
        "chat_panel" => {
            chat.toggle();
            controller.resize(content_size(window, chat));
            window.request_redraw();
        }
        "quit" => {
            controller.shutdown();
            app.lock().unwrap().shutdown();
            *control_flow = ControlFlow::Exit;
        }
        other => warn!(action = other, "unhandled shortcut action"),
    }
}

fn save_screenshot(shot: &crate::services::screenshot::Screenshot) {
    use base64::Engine as _;

    let dir = platform::get_data_dir().join("screenshots");
    if let Err(e) = std::fs::create_dir_all(&dir) {
        warn!(error = %e, "could not create screenshot directory");
        return;
    }
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    let path = dir.join(format!("capture-{}.png", stamp));
    match base64::engine::general_purpose::STANDARD.decode(&shot.data_base64) {
        Ok(bytes) => match std::fs::write(&path, bytes) {
            Ok(()) => info!(path = %path.display(), width = shot.width, height = shot.height, "screenshot saved"),
            Err(e) => warn!(error = %e, "could not write screenshot"),
        },
        Err(e) => warn!(error = %e, "screenshot payload corrupt"),
    }
}

/// Logical key name for a `tao` key, in the W3C `KeyboardEvent.key`
/// convention the input map expects.
fn key_name(key: &Key<'_>) -> Option<String> {
    let name = match key {
        Key::Character(c) => return Some((*c).to_string()),
        Key::Enter => "Enter",
        Key::Tab => "Tab",
        Key::Space => " ",
        Key::Escape => "Escape",
        Key::Backspace => "Backspace",
        Key::Delete => "Delete",
        Key::Insert => "Insert",
        Key::Home => "Home",
        Key::End => "End",
        Key::PageUp => "PageUp",
        Key::PageDown => "PageDown",
        Key::ArrowUp => "ArrowUp",
        Key::ArrowDown => "ArrowDown",
        Key::ArrowLeft => "ArrowLeft",
        Key::ArrowRight => "ArrowRight",
        Key::Shift => "Shift",
        Key::Control => "Control",
        Key::Alt => "Alt",
        Key::Super => "Super",
        Key::CapsLock => "CapsLock",
        Key::NumLock => "NumLock",
        Key::ScrollLock => "ScrollLock",
        Key::PrintScreen => "PrintScreen",
        Key::Pause => "Pause",
        Key::ContextMenu => "ContextMenu",
        Key::F1 => "F1",
        Key::F2 => "F2",
        Key::F3 => "F3",
        Key::F4 => "F4",
        Key::F5 => "F5",
        Key::F6 => "F6",
        Key::F7 => "F7",
        Key::F8 => "F8",
        Key::F9 => "F9",
        Key::F10 => "F10",
        Key::F11 => "F11",
        Key::F12 => "F12",
        _ => return None,
    };
    Some(name.to_string())
}
