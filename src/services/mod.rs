// Services.
// Services provide supporting functionality around the tab/frame core:
// chat assistant, settings, secret sealing, frame capture.

pub mod ai_assistant;
pub mod screenshot;
pub mod secret_store;
pub mod settings_engine;
