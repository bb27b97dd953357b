//! egui keys to the keycodes stored in `key(...)` specifications
//!
//! Printable keys use their lowercase character code, special keys use the
//! scancode-derived values (`0x40000000 | scancode`) the input plugin expects.

use eframe::egui::Key;

const SCANCODE_MASK: i32 = 1 << 30;

const fn from_scancode(scancode: i32) -> i32 {
    scancode | SCANCODE_MASK
}

/// Keycode for `key`, `None` for keys the plugin cannot bind
pub fn keycode(key: Key) -> Option<i32> {
    let code = match key {
        Key::Escape => 27,
        Key::Enter => 13,
        Key::Tab => 9,
        Key::Backspace => 8,
        Key::Space => 32,
        Key::Delete => 127,

        Key::Quote => 39,
        Key::Plus => 43,
        Key::Comma => 44,
        Key::Minus => 45,
        Key::Period => 46,
        Key::Slash => 47,
        Key::Semicolon => 59,
        Key::Equals => 61,
        Key::OpenBracket => 91,
        Key::Backslash => 92,
        Key::CloseBracket => 93,
        Key::Backtick => 96,

        Key::F1 => from_scancode(58),
        Key::F2 => from_scancode(59),
        Key::F3 => from_scancode(60),
        Key::F4 => from_scancode(61),
        Key::F5 => from_scancode(62),
        Key::F6 => from_scancode(63),
        Key::F7 => from_scancode(64),
        Key::F8 => from_scancode(65),
        Key::F9 => from_scancode(66),
        Key::F10 => from_scancode(67),
        Key::F11 => from_scancode(68),
        Key::F12 => from_scancode(69),

        Key::Insert => from_scancode(73),
        Key::Home => from_scancode(74),
        Key::PageUp => from_scancode(75),
        Key::End => from_scancode(77),
        Key::PageDown => from_scancode(78),
        Key::ArrowRight => from_scancode(79),
        Key::ArrowLeft => from_scancode(80),
        Key::ArrowDown => from_scancode(81),
        Key::ArrowUp => from_scancode(82),

        other => return alphanumeric(other),
    };
    Some(code)
}

// letters and digits are named by their single character
fn alphanumeric(key: Key) -> Option<i32> {
    let mut chars = key.name().chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphanumeric() => Some(c.to_ascii_lowercase() as i32),
        _ => None,
    }
}
