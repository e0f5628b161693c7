//! App core.
//!
//! Central struct holding the managers and services, managing application
//! lifecycle. The tab registry is shared (`Arc`) because the controller and
//! the engine's callback thread both reach it; everything else is owned
//! here and used from the GUI thread.

use std::sync::Arc;

use tracing::warn;

use crate::managers::shortcut_manager::ShortcutManager;
use crate::managers::tab_registry::TabRegistry;
use crate::platform;
use crate::services::ai_assistant::{AIAssistant, AIAssistantTrait};
use crate::services::secret_store::SecretStore;
use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::ai::AIProviderName;

/// Central application struct holding managers and services.
pub struct App {
    pub registry: Arc<TabRegistry>,
    pub shortcut_manager: ShortcutManager,
    pub settings_engine: SettingsEngine,
    pub secret_store: SecretStore,
    pub ai_assistant: AIAssistant,
}

impl App {
    /// Creates a new App, initializing all managers and services.
    ///
    /// If `config_dir_override` is `Some`, settings and the device key live
    /// there instead of the platform config directory (used by tests).
    pub fn new(
        config_dir_override: Option<std::path::PathBuf>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config_dir = config_dir_override.unwrap_or_else(platform::get_config_dir);

        let settings_path = config_dir.join("settings.json").to_string_lossy().to_string();
        let settings_engine = SettingsEngine::new(Some(settings_path));
        let secret_store = SecretStore::open_at(&config_dir)
            .map_err(|e| format!("SecretStore init failed: {}", e))?;
        let ai_assistant =
            AIAssistant::new().map_err(|e| format!("AIAssistant init failed: {}", e))?;

        Ok(Self {
            registry: Arc::new(TabRegistry::new()),
            shortcut_manager: ShortcutManager::new(),
            settings_engine,
            secret_store,
            ai_assistant,
        })
    }

    /// Startup sequence: load settings, unseal stored API keys, restore the
    /// active chat provider.
    pub fn startup(&mut self) {
        let _ = self.settings_engine.load();

        let settings = self.settings_engine.get_settings().clone();
        for (name, sealed) in &settings.chat.api_keys {
            let Some(provider) = AIProviderName::parse(name) else {
                warn!(provider = name.as_str(), "unknown provider in settings, skipping");
                continue;
            };
            match self.secret_store.open(sealed) {
                Ok(key) => self.ai_assistant.set_api_key(provider, &key),
                Err(e) => warn!(provider = name.as_str(), error = %e, "could not unseal API key"),
            }
        }

        if let (Some(name), Some(model)) =
            (settings.chat.active_provider, settings.chat.active_model.clone())
        {
            if let Some(config) = self
                .ai_assistant
                .available_providers()
                .into_iter()
                .find(|p| p.name == name)
            {
                self.ai_assistant.set_provider(crate::types::ai::AIProvider {
                    name,
                    model,
                    api_endpoint: config.api_endpoint,
                    max_tokens: 1024,
                });
            }
        }
    }

    /// Store an API key: in memory for the assistant, sealed on disk for
    /// the next run.
    pub fn set_chat_api_key(&mut self, provider: AIProviderName, key: &str) {
        self.ai_assistant.set_api_key(provider, key);
        match self.secret_store.seal(key) {
            Ok(sealed) => {
                let name = provider.as_str().to_string();
                if let Err(e) = self.settings_engine.modify(&mut |s| {
                    s.chat.api_keys.insert(name.clone(), sealed.clone());
                }) {
                    warn!(error = %e, "could not persist sealed API key");
                }
            }
            Err(e) => warn!(error = %e, "could not seal API key"),
        }
    }

    /// Shutdown sequence: persist settings. The registry is cleared by the
    /// controller (engine handles must be closed first).
    pub fn shutdown(&mut self) {
        if let Err(e) = self.settings_engine.save() {
            warn!(error = %e, "could not save settings on shutdown");
        }
    }
}
