// State managers.
// Managers handle stateful operations: frame buffers, the tab registry,
// and keyboard shortcuts.

pub mod frame_buffer;
pub mod shortcut_manager;
pub mod tab_registry;
