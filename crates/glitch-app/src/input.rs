// ABOUTME: Keyboard to terminal input encoding.
// ABOUTME: Turns winit logical keys plus modifiers into the string the shell expects.

use glitch_core::keycodes;
use glitch_terminal::TermMode;
use winit::keyboard::{Key, ModifiersState, NamedKey};

fn code(code: u32) -> String {
    char::from_u32(code).map(String::from).unwrap_or_default()
}

/// Cursor keys switch to SS3 sequences in application cursor mode
fn cursor_key(letter: char, mode: TermMode) -> String {
    if mode.contains(TermMode::APP_CURSOR) {
        format!("\x1bO{letter}")
    } else {
        format!("\x1b[{letter}")
    }
}

/// Encode a pressed key, `None` for keys that send nothing
pub fn encode_key(key: &Key, modifiers: ModifiersState, mode: TermMode) -> Option<String> {
    let ctrl = modifiers.control_key();
    let alt = modifiers.alt_key();

    match key {
        Key::Character(s) => {
            let mut chars = s.chars();
            let single = match (chars.next(), chars.next()) {
                (Some(c), None) => Some(c),
                _ => None,
            };
            match single {
                // Ctrl+letter sends the control code
                Some(c) if ctrl && c.is_ascii_alphabetic() => {
                    let base = if c.is_ascii_lowercase() { b'a' } else { b'A' };
                    Some(code(u32::from(c as u8 - base + 1)))
                }
                // Alt+key sends ESC + key
                Some(_) if alt => Some(format!("{}{}", code(keycodes::ESCAPE), s.as_str())),
                _ => Some(s.to_string()),
            }
        }
        Key::Named(named) => match named {
            NamedKey::Enter => Some(code(keycodes::ENTER)),
            NamedKey::Tab => Some(code(keycodes::TAB)),
            NamedKey::Backspace => Some(code(keycodes::BACKSPACE)),
            NamedKey::Escape => Some(code(keycodes::ESCAPE)),
            NamedKey::Space => Some(" ".to_string()),
            NamedKey::ArrowUp => Some(cursor_key('A', mode)),
            NamedKey::ArrowDown => Some(cursor_key('B', mode)),
            NamedKey::ArrowRight => Some(cursor_key('C', mode)),
            NamedKey::ArrowLeft => Some(cursor_key('D', mode)),
            NamedKey::Home => Some("\x1b[H".to_string()),
            NamedKey::End => Some("\x1b[F".to_string()),
            NamedKey::PageUp => Some("\x1b[5~".to_string()),
            NamedKey::PageDown => Some("\x1b[6~".to_string()),
            NamedKey::Delete => Some("\x1b[3~".to_string()),
            NamedKey::Insert => Some("\x1b[2~".to_string()),
            _ => None,
        },
        _ => None,
    }
}
