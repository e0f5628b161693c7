use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ai::AIProviderName;

/// Top-level settings container.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BrowserSettings {
    pub general: GeneralSettings,
    pub engine: EngineSettings,
    pub chat: ChatSettings,
    pub appearance: AppearanceSettings,
}

/// General browsing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralSettings {
    pub homepage: String,
    pub new_tab_url: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            homepage: "https://example.com".to_string(),
            new_tab_url: "about:blank".to_string(),
        }
    }
}

/// Tuning for the embedded engine's message pump and paint cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineSettings {
    /// Period of the GUI-thread pump driving the engine's message loop.
    pub pump_interval_ms: u64,
    /// Windowless frame rate requested from the engine.
    pub frame_rate: u32,
    /// Deadline for synchronous source retrieval.
    pub source_timeout_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            pump_interval_ms: 10,
            frame_rate: 30,
            source_timeout_ms: 5000,
        }
    }
}

/// Chat panel settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatSettings {
    pub active_provider: Option<AIProviderName>,
    pub active_model: Option<String>,
    /// Width of the docked panel in logical pixels.
    pub panel_width: u32,
    /// Provider name -> sealed API key blob (see `services::secret_store`).
    /// Never plaintext.
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            active_provider: None,
            active_model: None,
            panel_width: 320,
            api_keys: HashMap::new(),
        }
    }
}

/// Appearance settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppearanceSettings {
    pub theme: ThemeMode,
    pub font_size: u32,
}

impl Default for AppearanceSettings {
    fn default() -> Self {
        Self {
            theme: ThemeMode::System,
            font_size: 14,
        }
    }
}

/// Theme mode selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum ThemeMode {
    Dark,
    Light,
    System,
}
