//! Event model for recorded input
//!
//! A recording is an ordered list of timestamped events; the list order IS
//! the timeline. Events serialize to the line format in `codec`.

use serde::{Deserialize, Serialize};

/// Single recorded input event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Seconds since recording start; non-decreasing across a log.
    pub t: f64,
    #[serde(flatten)]
    pub kind: EventKind,
}

impl Event {
    pub fn pointer_move(x: i32, y: i32, t: f64) -> Self {
        Self { t, kind: EventKind::PointerMove { x, y } }
    }

    pub fn pointer_button(x: i32, y: i32, button: Button, pressed: bool, t: f64) -> Self {
        Self { t, kind: EventKind::PointerButton { x, y, button, pressed } }
    }

    pub fn key_change(key: KeyToken, down: bool, t: f64) -> Self {
        Self { t, kind: EventKind::KeyChange { key, down } }
    }
}

/// Event payload - tagged union
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "e", rename_all = "snake_case")]
pub enum EventKind {
    /// Pointer moved to x, y
    PointerMove { x: i32, y: i32 },

    /// Pointer button pressed or released at x, y
    PointerButton { x: i32, y: i32, button: Button, pressed: bool },

    /// Key pressed (down = true) or released
    KeyChange { key: KeyToken, down: bool },
}

/// Pointer buttons that are recorded. Anything else is dropped at capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Button {
    Left,
    Right,
}

impl Button {
    pub fn as_str(&self) -> &'static str {
        match self {
            Button::Left => "left",
            Button::Right => "right",
        }
    }
}

impl std::fmt::Display for Button {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A key identity: the typed character when printable, otherwise a lowercase
/// symbolic name ("enter", "f8", ...). Invariant: never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum KeyToken {
    Char(char),
    Named(String),
}

impl KeyToken {
    /// Classify a non-empty token string: one character is a `Char`,
    /// anything longer a `Named`. Returns `None` for the empty string.
    pub fn from_str_token(s: &str) -> Option<Self> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (None, _) => None,
            (Some(c), None) => Some(KeyToken::Char(c)),
            _ => Some(KeyToken::Named(s.to_string())),
        }
    }

    pub fn named(name: impl Into<String>) -> Self {
        KeyToken::Named(name.into())
    }
}

impl std::fmt::Display for KeyToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyToken::Char(c) => write!(f, "{}", c),
            KeyToken::Named(n) => f.write_str(n),
        }
    }
}

/// A recorded macro - an ordered list of events.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroLog {
    pub events: Vec<Event>,
}

impl MacroLog {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Timestamp of the last event; 0.0 for an empty log.
    pub fn duration(&self) -> f64 {
        self.events.last().map_or(0.0, |e| e.t)
    }
}

impl FromIterator<Event> for MacroLog {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self { events: iter.into_iter().collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_classification() {
        assert_eq!(KeyToken::from_str_token("a"), Some(KeyToken::Char('a')));
        assert_eq!(
            KeyToken::from_str_token("enter"),
            Some(KeyToken::named("enter"))
        );
        assert_eq!(KeyToken::from_str_token(""), None);
    }

    #[test]
    fn duration_tracks_last_event() {
        let mut log = MacroLog::new();
        assert_eq!(log.duration(), 0.0);
        log.push(Event::pointer_move(1, 2, 0.5));
        log.push(Event::key_change(KeyToken::Char('x'), true, 1.25));
        assert_eq!(log.duration(), 1.25);
        assert_eq!(log.len(), 2);
    }
}
