//! Unit tests for the toolkit-to-engine input translation: virtual-key
//! codes, combo strings, and key-name normalization.

use osrbrowser::platform::input::{combo_string, modifiers, normalize_key_name, virtual_key_code};
use rstest::rstest;

#[rstest]
#[case("Backspace", 0x08)]
#[case("Tab", 0x09)]
#[case("Enter", 0x0D)]
#[case("Escape", 0x1B)]
#[case(" ", 0x20)]
#[case("PageUp", 0x21)]
#[case("PageDown", 0x22)]
#[case("End", 0x23)]
#[case("Home", 0x24)]
#[case("ArrowLeft", 0x25)]
#[case("ArrowUp", 0x26)]
#[case("ArrowRight", 0x27)]
#[case("ArrowDown", 0x28)]
#[case("Insert", 0x2D)]
#[case("Delete", 0x2E)]
fn test_named_keys(#[case] name: &str, #[case] expected: u16) {
    assert_eq!(virtual_key_code(name), Some(expected));
}

#[rstest]
#[case("a", 0x41)]
#[case("A", 0x41)]
#[case("z", 0x5A)]
#[case("0", 0x30)]
#[case("9", 0x39)]
fn test_letters_and_digits(#[case] name: &str, #[case] expected: u16) {
    assert_eq!(virtual_key_code(name), Some(expected));
}

#[rstest]
#[case("F1", 0x70)]
#[case("F12", 0x7B)]
#[case("F24", 0x87)]
fn test_function_keys(#[case] name: &str, #[case] expected: u16) {
    assert_eq!(virtual_key_code(name), Some(expected));
}

#[rstest]
#[case(";", 0xBA)]
#[case(",", 0xBC)]
#[case("-", 0xBD)]
#[case(".", 0xBE)]
#[case("/", 0xBF)]
#[case("[", 0xDB)]
#[case("]", 0xDD)]
fn test_punctuation(#[case] name: &str, #[case] expected: u16) {
    assert_eq!(virtual_key_code(name), Some(expected));
}

#[test]
fn test_unknown_keys_have_no_code() {
    assert_eq!(virtual_key_code("MediaPlayPause"), None);
    assert_eq!(virtual_key_code("F25"), None);
    assert_eq!(virtual_key_code(""), None);
    assert_eq!(virtual_key_code("ä"), None);
}

#[test]
fn test_combo_string_orders_modifiers() {
    let mods = modifiers(true, true, false, false);
    assert_eq!(combo_string(mods, "t").as_deref(), Some("Ctrl+Shift+T"));

    let mods = modifiers(false, true, false, false);
    assert_eq!(combo_string(mods, "ArrowLeft").as_deref(), Some("Ctrl+Left"));

    let mods = modifiers(false, false, true, false);
    assert_eq!(combo_string(mods, "ArrowLeft").as_deref(), Some("Alt+Left"));
}

#[test]
fn test_combo_string_without_modifiers() {
    let mods = modifiers(false, false, false, false);
    assert_eq!(combo_string(mods, "Escape").as_deref(), Some("Escape"));
    assert_eq!(combo_string(mods, "F12").as_deref(), Some("F12"));
}

#[test]
fn test_combo_string_rejects_bare_modifiers() {
    let mods = modifiers(true, false, false, false);
    assert_eq!(combo_string(mods, "Shift"), None);
    assert_eq!(combo_string(mods, "Control"), None);
}

#[rstest]
#[case("ArrowUp", "Up")]
#[case("ArrowDown", "Down")]
#[case(" ", "Space")]
#[case("t", "T")]
#[case("PageDown", "PageDown")]
fn test_normalize_key_name(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(normalize_key_name(raw), expected);
}
