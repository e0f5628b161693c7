//! The docked chat side panel.
//!
//! A `wry` webview child pinned to the window's right edge, rendering a
//! self-contained HTML chat UI. JS talks to us over
//! `window.ipc.postMessage` with small JSON commands; we answer by queuing
//! scripts through the event-loop proxy (the IPC handler runs while the
//! webview is borrowed, so evaluation happens back on the event loop).

use std::sync::{Arc, Mutex};

use tao::dpi::{LogicalPosition, LogicalSize};
use tao::event_loop::EventLoopProxy;
use tao::window::Window;
use tracing::{debug, warn};
use wry::WebViewBuilder;

use crate::app::App;
use crate::controller::BrowserController;
use crate::services::ai_assistant::AIAssistantTrait;
use crate::services::settings_engine::SettingsEngineTrait;
use crate::types::ai::{AIChatMessage, AIContext, AIProvider, AIProviderName};
use crate::types::tab::TabSummary;

use super::UserEvent;

const CHAT_HTML: &str = include_str!("../../resources/ui/chat_panel.html");

/// Default max_tokens requested per completion.
const MAX_COMPLETION_TOKENS: u32 = 1024;

pub struct ChatPanel {
    webview: wry::WebView,
    /// Logical width of the docked panel.
    width: u32,
    visible: bool,
}

impl ChatPanel {
    pub fn new(
        window: &Window,
        app: Arc<Mutex<App>>,
        controller: Arc<BrowserController>,
        proxy: EventLoopProxy<UserEvent>,
        width: u32,
        window_logical: (u32, u32),
    ) -> Result<Self, wry::Error> {
        let bounds = Self::bounds(width, window_logical);

        let builder = WebViewBuilder::new()
            .with_html(CHAT_HTML)
            .with_bounds(bounds)
            .with_ipc_handler(move |message: wry::http::Request<String>| {
                handle_ipc(message.body(), &app, &controller, &proxy);
            });

        #[cfg(target_os = "linux")]
        let webview = {
            use tao::platform::unix::WindowExtUnix;
            use wry::WebViewBuilderExtUnix;
            let vbox = window.default_vbox().expect("Failed to get GTK vbox");
            builder.build_gtk(vbox)?
        };

        #[cfg(not(target_os = "linux"))]
        let webview = builder.build_as_child(window)?;

        Ok(Self {
            webview,
            width,
            visible: true,
        })
    }

    fn bounds(width: u32, window_logical: (u32, u32)) -> wry::Rect {
        let (win_w, win_h) = window_logical;
        let x = win_w.saturating_sub(width);
        wry::Rect {
            position: LogicalPosition::new(x as f64, 0.0).into(),
            size: LogicalSize::new(width as f64, win_h as f64).into(),
        }
    }

    /// Logical width the panel currently takes from the window.
    pub fn occupied_width(&self) -> u32 {
        if self.visible {
            self.width
        } else {
            0
        }
    }

    pub fn toggle(&mut self) {
        self.visible = !self.visible;
        if let Err(e) = self.webview.set_visible(self.visible) {
            warn!(error = %e, "could not toggle chat panel visibility");
        }
    }

    /// Keep the panel pinned to the right edge after a window resize.
    pub fn reposition(&self, window_logical: (u32, u32)) {
        if let Err(e) = self.webview.set_bounds(Self::bounds(self.width, window_logical)) {
            warn!(error = %e, "could not reposition chat panel");
        }
    }

    pub fn evaluate(&self, script: &str) {
        if let Err(e) = self.webview.evaluate_script(script) {
            warn!(error = %e, "chat panel script failed");
        }
    }

    /// Mirror the active tab into the panel header.
    pub fn update_page(&self, active: Option<&TabSummary>) {
        let info = match active {
            Some(tab) => serde_json::json!({"url": tab.url, "title": tab.title}),
            None => serde_json::Value::Null,
        };
        self.evaluate(&format!("if(window.__chat_page)__chat_page({})", info));
    }

    /// A completion arrived (or failed) on the assistant's runtime thread
    /// and was forwarded here through the event loop.
    pub fn on_completion(&self, result: &Result<AIChatMessage, crate::types::errors::AIError>) {
        self.evaluate("if(window.__chat_pending)__chat_pending(false)");
        match result {
            Ok(message) => {
                if let Ok(json) = serde_json::to_string(message) {
                    self.evaluate(&format!("if(window.__chat_append)__chat_append({})", json));
                }
            }
            Err(e) => {
                let text = serde_json::json!(e.to_string());
                self.evaluate(&format!("if(window.__chat_error)__chat_error({})", text));
            }
        }
    }
}

/// Dispatch one IPC command from the panel's JS.
fn handle_ipc(
    message: &str,
    app: &Arc<Mutex<App>>,
    controller: &Arc<BrowserController>,
    proxy: &EventLoopProxy<UserEvent>,
) {
    let Ok(msg) = serde_json::from_str::<serde_json::Value>(message) else {
        warn!("malformed chat IPC message");
        return;
    };
    let Some(cmd) = msg.get("cmd").and_then(|v| v.as_str()) else {
        return;
    };
    debug!(cmd, "chat ipc");

    match cmd {
        "chat_ready" => {
            let app = app.lock().unwrap();
            let settings = app.settings_engine.get_settings();
            let state = serde_json::json!({
                "providers": app.ai_assistant.available_providers(),
                "active_provider": settings.chat.active_provider,
                "active_model": settings.chat.active_model,
                "history": app.ai_assistant.chat_history(),
            });
            let _ = proxy.send_event(UserEvent::ChatScript(format!(
                "if(window.__chat_init)__chat_init({})",
                state
            )));
        }

        "chat_send" => {
            let Some(text) = msg.get("text").and_then(|v| v.as_str()) else {
                return;
            };

            // A "/page " prefix asks for the document source as context.
            // Source retrieval is the one bounded-blocking path in the app;
            // the wait polls the engine pump with a deadline.
            let (text, want_source) = match text.strip_prefix("/page ") {
                Some(rest) => (rest, true),
                None => (text, false),
            };

            // Echo the user message and show the spinner right away.
            let echo = serde_json::json!({"role": "user", "content": text});
            let _ = proxy.send_event(UserEvent::ChatScript(format!(
                "if(window.__chat_append)__chat_append({});if(window.__chat_pending)__chat_pending(true)",
                echo
            )));

            let page_source = if want_source {
                controller.page_source(None).ok().flatten()
            } else {
                None
            };
            let context = controller
                .registry()
                .summaries()
                .0
                .into_iter()
                .find(|t| t.active)
                .map(|tab| AIContext {
                    page_url: Some(tab.url),
                    page_title: Some(tab.title),
                    page_source,
                });

            let done_proxy = proxy.clone();
            app.lock().unwrap().ai_assistant.send_message(
                text,
                context,
                Box::new(move |result| {
                    let _ = done_proxy.send_event(UserEvent::ChatCompleted(result));
                }),
            );
        }

        "set_provider" => {
            let provider = msg
                .get("provider")
                .and_then(|v| v.as_str())
                .and_then(AIProviderName::parse);
            let model = msg.get("model").and_then(|v| v.as_str());
            let (Some(name), Some(model)) = (provider, model) else {
                return;
            };

            let mut app = app.lock().unwrap();
            let Some(config) = app
                .ai_assistant
                .available_providers()
                .into_iter()
                .find(|p| p.name == name)
            else {
                return;
            };
            app.ai_assistant.set_provider(AIProvider {
                name,
                model: model.to_string(),
                api_endpoint: config.api_endpoint,
                max_tokens: MAX_COMPLETION_TOKENS,
            });
            let model = model.to_string();
            if let Err(e) = app.settings_engine.modify(&mut |s| {
                s.chat.active_provider = Some(name);
                s.chat.active_model = Some(model.clone());
            }) {
                warn!(error = %e, "could not persist provider selection");
            }
        }

        "set_api_key" => {
            let provider = msg
                .get("provider")
                .and_then(|v| v.as_str())
                .and_then(AIProviderName::parse);
            let key = msg.get("key").and_then(|v| v.as_str());
            if let (Some(provider), Some(key)) = (provider, key) {
                app.lock().unwrap().set_chat_api_key(provider, key);
            }
        }

        other => {
            debug!(cmd = other, "unknown chat ipc command ignored");
        }
    }
}
