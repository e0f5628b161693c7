//! Unit tests for the shortcut manager's registration, conflicts, and
//! reverse lookup.

use osrbrowser::managers::shortcut_manager::{ShortcutManager, ShortcutManagerTrait};

/// The expected binding for `action` on the current platform.
fn adapted(keys: &str) -> String {
    if cfg!(target_os = "macos") {
        keys.replace("Ctrl+", "Cmd+")
    } else {
        keys.to_string()
    }
}

#[test]
fn test_defaults_cover_controller_actions() {
    let mgr = ShortcutManager::new();
    for action in [
        "new_tab",
        "close_tab",
        "next_tab",
        "prev_tab",
        "reload",
        "back",
        "forward",
        "stop_loading",
        "view_source",
        "screenshot",
        "chat_panel",
        "quit",
    ] {
        assert!(
            mgr.get_shortcut(action).is_some(),
            "missing default binding for '{}'",
            action
        );
    }
}

#[test]
fn test_action_for_combo_reverse_lookup() {
    let mgr = ShortcutManager::new();
    assert_eq!(mgr.action_for_combo("Ctrl+T"), Some("new_tab"));
    assert_eq!(mgr.action_for_combo("Ctrl+W"), Some("close_tab"));
    assert_eq!(mgr.action_for_combo("Escape"), Some("stop_loading"));
    assert_eq!(mgr.action_for_combo("Ctrl+Shift+Q"), None);
}

#[test]
fn test_register_custom_shortcut() {
    let mut mgr = ShortcutManager::new();
    mgr.register_shortcut("dump_frame", "Ctrl+Shift+D").unwrap();
    assert_eq!(
        mgr.get_shortcut("dump_frame"),
        Some(adapted("Ctrl+Shift+D").as_str())
    );
    assert_eq!(mgr.action_for_combo("Ctrl+Shift+D"), Some("dump_frame"));
}

#[test]
fn test_register_conflicting_combo_fails() {
    let mut mgr = ShortcutManager::new();
    let result = mgr.register_shortcut("something_else", "Ctrl+T");
    assert!(result.is_err());
    // The original binding is untouched.
    assert_eq!(mgr.action_for_combo("Ctrl+T"), Some("new_tab"));
}

#[test]
fn test_rebinding_own_action_is_not_a_conflict() {
    let mut mgr = ShortcutManager::new();
    mgr.register_shortcut("new_tab", "Ctrl+T").unwrap();
}

#[test]
fn test_register_empty_keys_fails() {
    let mut mgr = ShortcutManager::new();
    assert!(mgr.register_shortcut("action", "").is_err());
}

#[test]
fn test_unregister_and_reset() {
    let mut mgr = ShortcutManager::new();
    mgr.unregister_shortcut("screenshot").unwrap();
    assert_eq!(mgr.get_shortcut("screenshot"), None);
    assert!(mgr.unregister_shortcut("screenshot").is_err());

    mgr.reset_to_defaults().unwrap();
    assert!(mgr.get_shortcut("screenshot").is_some());
}

#[test]
fn test_has_conflict_reports_owner() {
    let mgr = ShortcutManager::new();
    assert_eq!(mgr.has_conflict("Ctrl+R", None), Some("reload".to_string()));
    assert_eq!(mgr.has_conflict("Ctrl+R", Some("reload")), None);
    assert_eq!(mgr.has_conflict("Ctrl+Shift+Z", None), None);
}
