//! Toolkit-to-engine input translation.
//!
//! The embedded engine consumes a fixed, cross-platform virtual-key
//! encoding (Windows-style VK codes, the convention CEF-family engines use
//! on every OS). The shell hands us the toolkit's logical key name, the
//! string form of `tao`'s `Key`, and we produce the engine-side code, so
//! this table stays independent of any one toolkit's key type.

use crate::engine::KeyModifiers;

/// Engine virtual-key code for a toolkit logical key name.
///
/// Key names follow the W3C `KeyboardEvent.key` convention the toolkit
/// reports (`"ArrowUp"`, `"Backspace"`, `" "` for space, `"a"` for the A
/// key). Returns `None` for keys the engine has no code for.
pub fn virtual_key_code(key: &str) -> Option<u16> {
    let code = match key {
        "Backspace" => 0x08,
        "Tab" => 0x09,
        "Enter" => 0x0D,
        "Shift" => 0x10,
        "Control" => 0x11,
        "Alt" => 0x12,
        "Pause" => 0x13,
        "CapsLock" => 0x14,
        "Escape" => 0x1B,
        " " => 0x20,
        "PageUp" => 0x21,
        "PageDown" => 0x22,
        "End" => 0x23,
        "Home" => 0x24,
        "ArrowLeft" => 0x25,
        "ArrowUp" => 0x26,
        "ArrowRight" => 0x27,
        "ArrowDown" => 0x28,
        "PrintScreen" => 0x2C,
        "Insert" => 0x2D,
        "Delete" => 0x2E,
        "Meta" | "Super" => 0x5B,
        "ContextMenu" => 0x5D,
        "NumLock" => 0x90,
        "ScrollLock" => 0x91,
        ";" => 0xBA,
        "=" => 0xBB,
        "," => 0xBC,
        "-" => 0xBD,
        "." => 0xBE,
        "/" => 0xBF,
        "`" => 0xC0,
        "[" => 0xDB,
        "\\" => 0xDC,
        "]" => 0xDD,
        "'" => 0xDE,
        _ => {
            let mut chars = key.chars();
            match (chars.next(), chars.next()) {
                // Letters and digits map to their uppercase ASCII value.
                (Some(c), None) if c.is_ascii_alphabetic() => c.to_ascii_uppercase() as u16,
                (Some(c), None) if c.is_ascii_digit() => c as u16,
                _ => {
                    // Function keys F1..F24.
                    let n: u16 = key.strip_prefix('F')?.parse().ok()?;
                    if (1..=24).contains(&n) {
                        0x70 + n - 1
                    } else {
                        return None;
                    }
                }
            }
        }
    };
    Some(code)
}

/// Build the engine's modifier encoding from raw flag state.
pub fn modifiers(shift: bool, control: bool, alt: bool, meta: bool) -> KeyModifiers {
    KeyModifiers {
        shift,
        control,
        alt,
        meta,
    }
}

/// Render a pressed key as a shortcut combo string (`"Ctrl+Shift+T"`),
/// matching the notation of the shortcut table. Returns `None` for bare
/// modifier presses.
pub fn combo_string(mods: KeyModifiers, key: &str) -> Option<String> {
    if matches!(key, "Shift" | "Control" | "Alt" | "Meta" | "Super") {
        return None;
    }

    let mut combo = String::new();
    if mods.control {
        combo.push_str("Ctrl+");
    }
    if mods.meta {
        combo.push_str("Cmd+");
    }
    if mods.alt {
        combo.push_str("Alt+");
    }
    if mods.shift {
        combo.push_str("Shift+");
    }
    combo.push_str(&normalize_key_name(key));
    Some(combo)
}

/// Normalize a toolkit key name to the notation used in the shortcut table.
/// `"ArrowLeft"` becomes `"Left"`, `" "` becomes `"Space"`, single letters
/// are uppercased.
pub fn normalize_key_name(key: &str) -> String {
    match key {
        "ArrowUp" => "Up".to_string(),
        "ArrowDown" => "Down".to_string(),
        "ArrowLeft" => "Left".to_string(),
        "ArrowRight" => "Right".to_string(),
        " " => "Space".to_string(),
        _ => {
            if key.chars().count() == 1 {
                key.to_uppercase()
            } else {
                key.to_string()
            }
        }
    }
}
