//! Key token translation tables
//!
//! Named tokens use the stable lowercase names from the macro file format
//! ("enter", "f8", "kpplus", ...). Character tokens map onto physical keys
//! for a US layout, folding case and shifted symbols onto the unshifted
//! key; recorded shift presses around them restore the case on replay.

use rdev::Key;
use replica_core::KeyToken;

/// Stable name for a non-character key, if it has one.
pub fn key_name(key: Key) -> Option<&'static str> {
    let name = match key {
        Key::Return => "enter",
        Key::Space => "space",
        Key::Tab => "tab",
        Key::Escape => "escape",
        Key::Backspace => "backspace",
        Key::Delete => "delete",
        Key::Insert => "insert",
        Key::Home => "home",
        Key::End => "end",
        Key::PageUp => "pageup",
        Key::PageDown => "pagedown",
        Key::UpArrow => "up",
        Key::DownArrow => "down",
        Key::LeftArrow => "left",
        Key::RightArrow => "right",
        Key::CapsLock => "capslock",
        Key::F1 => "f1",
        Key::F2 => "f2",
        Key::F3 => "f3",
        Key::F4 => "f4",
        Key::F5 => "f5",
        Key::F6 => "f6",
        Key::F7 => "f7",
        Key::F8 => "f8",
        Key::F9 => "f9",
        Key::F10 => "f10",
        Key::F11 => "f11",
        Key::F12 => "f12",
        Key::ShiftLeft => "shift",
        Key::ShiftRight => "rightshift",
        Key::ControlLeft => "ctrl",
        Key::ControlRight => "rightctrl",
        Key::Alt => "alt",
        Key::AltGr => "altgr",
        Key::MetaLeft => "meta",
        Key::MetaRight => "rightmeta",
        Key::NumLock => "numlock",
        Key::PrintScreen => "printscreen",
        Key::ScrollLock => "scrolllock",
        Key::Pause => "pause",
        Key::Kp0 => "kp0",
        Key::Kp1 => "kp1",
        Key::Kp2 => "kp2",
        Key::Kp3 => "kp3",
        Key::Kp4 => "kp4",
        Key::Kp5 => "kp5",
        Key::Kp6 => "kp6",
        Key::Kp7 => "kp7",
        Key::Kp8 => "kp8",
        Key::Kp9 => "kp9",
        Key::KpReturn => "kpreturn",
        Key::KpPlus => "kpplus",
        Key::KpMinus => "kpminus",
        Key::KpMultiply => "kpmultiply",
        Key::KpDivide => "kpdivide",
        Key::KpDelete => "kpdelete",
        _ => return None,
    };
    Some(name)
}

/// Physical key for a stable name. Inverse of [`key_name`].
pub fn name_key(name: &str) -> Option<Key> {
    let key = match name {
        "enter" => Key::Return,
        "space" => Key::Space,
        "tab" => Key::Tab,
        "escape" => Key::Escape,
        "backspace" => Key::Backspace,
        "delete" => Key::Delete,
        "insert" => Key::Insert,
        "home" => Key::Home,
        "end" => Key::End,
        "pageup" => Key::PageUp,
        "pagedown" => Key::PageDown,
        "up" => Key::UpArrow,
        "down" => Key::DownArrow,
        "left" => Key::LeftArrow,
        "right" => Key::RightArrow,
        "capslock" => Key::CapsLock,
        "f1" => Key::F1,
        "f2" => Key::F2,
        "f3" => Key::F3,
        "f4" => Key::F4,
        "f5" => Key::F5,
        "f6" => Key::F6,
        "f7" => Key::F7,
        "f8" => Key::F8,
        "f9" => Key::F9,
        "f10" => Key::F10,
        "f11" => Key::F11,
        "f12" => Key::F12,
        "shift" => Key::ShiftLeft,
        "rightshift" => Key::ShiftRight,
        "ctrl" => Key::ControlLeft,
        "rightctrl" => Key::ControlRight,
        "alt" => Key::Alt,
        "altgr" => Key::AltGr,
        "meta" => Key::MetaLeft,
        "rightmeta" => Key::MetaRight,
        "numlock" => Key::NumLock,
        "printscreen" => Key::PrintScreen,
        "scrolllock" => Key::ScrollLock,
        "pause" => Key::Pause,
        "kp0" => Key::Kp0,
        "kp1" => Key::Kp1,
        "kp2" => Key::Kp2,
        "kp3" => Key::Kp3,
        "kp4" => Key::Kp4,
        "kp5" => Key::Kp5,
        "kp6" => Key::Kp6,
        "kp7" => Key::Kp7,
        "kp8" => Key::Kp8,
        "kp9" => Key::Kp9,
        "kpreturn" => Key::KpReturn,
        "kpplus" => Key::KpPlus,
        "kpminus" => Key::KpMinus,
        "kpmultiply" => Key::KpMultiply,
        "kpdivide" => Key::KpDivide,
        "kpdelete" => Key::KpDelete,
        _ => return None,
    };
    Some(key)
}

/// Physical key that produces a character on a US layout.
pub fn char_key(c: char) -> Option<Key> {
    let key = match c {
        'a' | 'A' => Key::KeyA,
        'b' | 'B' => Key::KeyB,
        'c' | 'C' => Key::KeyC,
        'd' | 'D' => Key::KeyD,
        'e' | 'E' => Key::KeyE,
        'f' | 'F' => Key::KeyF,
        'g' | 'G' => Key::KeyG,
        'h' | 'H' => Key::KeyH,
        'i' | 'I' => Key::KeyI,
        'j' | 'J' => Key::KeyJ,
        'k' | 'K' => Key::KeyK,
        'l' | 'L' => Key::KeyL,
        'm' | 'M' => Key::KeyM,
        'n' | 'N' => Key::KeyN,
        'o' | 'O' => Key::KeyO,
        'p' | 'P' => Key::KeyP,
        'q' | 'Q' => Key::KeyQ,
        'r' | 'R' => Key::KeyR,
        's' | 'S' => Key::KeyS,
        't' | 'T' => Key::KeyT,
        'u' | 'U' => Key::KeyU,
        'v' | 'V' => Key::KeyV,
        'w' | 'W' => Key::KeyW,
        'x' | 'X' => Key::KeyX,
        'y' | 'Y' => Key::KeyY,
        'z' | 'Z' => Key::KeyZ,
        '0' | ')' => Key::Num0,
        '1' | '!' => Key::Num1,
        '2' | '@' => Key::Num2,
        '3' | '#' => Key::Num3,
        '4' | '$' => Key::Num4,
        '5' | '%' => Key::Num5,
        '6' | '^' => Key::Num6,
        '7' | '&' => Key::Num7,
        '8' | '*' => Key::Num8,
        '9' | '(' => Key::Num9,
        '`' | '~' => Key::BackQuote,
        '-' | '_' => Key::Minus,
        '=' | '+' => Key::Equal,
        '[' | '{' => Key::LeftBracket,
        ']' | '}' => Key::RightBracket,
        '\\' | '|' => Key::BackSlash,
        ';' | ':' => Key::SemiColon,
        '\'' | '"' => Key::Quote,
        ',' | '<' => Key::Comma,
        '.' | '>' => Key::Dot,
        '/' | '?' => Key::Slash,
        ' ' => Key::Space,
        '\t' => Key::Tab,
        '\n' | '\r' => Key::Return,
        _ => return None,
    };
    Some(key)
}

/// Unshifted US-layout character for a physical key. Used when a release
/// arrives for a key whose press was never seen.
pub fn key_char(key: Key) -> Option<char> {
    let c = match key {
        Key::KeyA => 'a',
        Key::KeyB => 'b',
        Key::KeyC => 'c',
        Key::KeyD => 'd',
        Key::KeyE => 'e',
        Key::KeyF => 'f',
        Key::KeyG => 'g',
        Key::KeyH => 'h',
        Key::KeyI => 'i',
        Key::KeyJ => 'j',
        Key::KeyK => 'k',
        Key::KeyL => 'l',
        Key::KeyM => 'm',
        Key::KeyN => 'n',
        Key::KeyO => 'o',
        Key::KeyP => 'p',
        Key::KeyQ => 'q',
        Key::KeyR => 'r',
        Key::KeyS => 's',
        Key::KeyT => 't',
        Key::KeyU => 'u',
        Key::KeyV => 'v',
        Key::KeyW => 'w',
        Key::KeyX => 'x',
        Key::KeyY => 'y',
        Key::KeyZ => 'z',
        Key::Num0 => '0',
        Key::Num1 => '1',
        Key::Num2 => '2',
        Key::Num3 => '3',
        Key::Num4 => '4',
        Key::Num5 => '5',
        Key::Num6 => '6',
        Key::Num7 => '7',
        Key::Num8 => '8',
        Key::Num9 => '9',
        Key::BackQuote => '`',
        Key::Minus => '-',
        Key::Equal => '=',
        Key::LeftBracket => '[',
        Key::RightBracket => ']',
        Key::BackSlash => '\\',
        Key::SemiColon => ';',
        Key::Quote => '\'',
        Key::Comma => ',',
        Key::Dot => '.',
        Key::Slash => '/',
        _ => return None,
    };
    Some(c)
}

/// Physical key for any token, named or character.
pub fn token_key(token: &KeyToken) -> Option<Key> {
    match token {
        KeyToken::Char(c) => char_key(*c),
        KeyToken::Named(name) => name_key(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_keys_round_trip() {
        let names = [
            "enter", "space", "tab", "escape", "backspace", "delete", "insert", "home", "end",
            "pageup", "pagedown", "up", "down", "left", "right", "capslock", "f1", "f2", "f3",
            "f4", "f5", "f6", "f7", "f8", "f9", "f10", "f11", "f12", "shift", "rightshift",
            "ctrl", "rightctrl", "alt", "altgr", "meta", "rightmeta", "numlock", "printscreen",
            "scrolllock", "pause", "kp0", "kp1", "kp2", "kp3", "kp4", "kp5", "kp6", "kp7", "kp8",
            "kp9", "kpreturn", "kpplus", "kpminus", "kpmultiply", "kpdivide", "kpdelete",
        ];
        for name in names {
            let key = name_key(name).unwrap();
            assert_eq!(key_name(key), Some(name), "{name}");
        }
    }

    #[test]
    fn char_key_folds_case() {
        assert_eq!(char_key('a'), Some(Key::KeyA));
        assert_eq!(char_key('A'), Some(Key::KeyA));
    }

    #[test]
    fn char_key_unshifts_symbols() {
        assert_eq!(char_key('!'), Some(Key::Num1));
        assert_eq!(char_key('?'), Some(Key::Slash));
        assert_eq!(char_key('"'), Some(Key::Quote));
    }

    #[test]
    fn key_char_is_unshifted() {
        assert_eq!(key_char(Key::KeyQ), Some('q'));
        assert_eq!(key_char(Key::Num7), Some('7'));
        assert_eq!(key_char(Key::ShiftLeft), None);
    }

    #[test]
    fn token_key_resolves_both_forms() {
        assert_eq!(token_key(&KeyToken::Char('x')), Some(Key::KeyX));
        assert_eq!(token_key(&KeyToken::named("f8")), Some(Key::F8));
        assert_eq!(token_key(&KeyToken::named("hyperspace")), None);
    }

    #[test]
    fn unknown_inputs_map_to_none() {
        assert_eq!(name_key("power"), None);
        assert_eq!(char_key('é'), None);
        assert_eq!(key_name(Key::Unknown(0xDEAD)), None);
    }
}
