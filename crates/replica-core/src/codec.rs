//! Macro file codec
//!
//! One event per line, fields comma separated:
//!   "mmove",386,495,0.125
//!   "mclick",386,495,"left",true,0.5
//!   "kdown","a",0.75
//!   "kup","enter",1.5
//!
//! Strings are double quoted (backslash escapes for quote, backslash and
//! control characters); numbers and booleans are bare literals. Decoding is
//! strict structured parsing against the four line schemas - macro files are
//! untrusted input and must never be evaluated.

use crate::error::{ParseError, ParseErrorKind};
use crate::events::{Button, Event, EventKind, KeyToken, MacroLog};
use std::fmt::Write;

const TAG_MOVE: &str = "mmove";
const TAG_CLICK: &str = "mclick";
const TAG_KEY_DOWN: &str = "kdown";
const TAG_KEY_UP: &str = "kup";

/// Render a log in the line format. `decode(encode(log)) == log` holds for
/// every log the capture session can produce.
pub fn encode(log: &MacroLog) -> String {
    let mut out = String::new();
    for event in &log.events {
        encode_event(&mut out, event);
        out.push('\n');
    }
    out
}

fn encode_event(out: &mut String, event: &Event) {
    match &event.kind {
        EventKind::PointerMove { x, y } => {
            let _ = write!(out, "\"{}\",{},{},{}", TAG_MOVE, x, y, event.t);
        }
        EventKind::PointerButton { x, y, button, pressed } => {
            let _ = write!(
                out,
                "\"{}\",{},{},\"{}\",{},{}",
                TAG_CLICK,
                x,
                y,
                button.as_str(),
                pressed,
                event.t
            );
        }
        EventKind::KeyChange { key, down } => {
            let tag = if *down { TAG_KEY_DOWN } else { TAG_KEY_UP };
            let _ = write!(out, "\"{}\",", tag);
            match key {
                KeyToken::Char(c) => {
                    let mut buf = [0u8; 4];
                    push_quoted(out, c.encode_utf8(&mut buf));
                }
                KeyToken::Named(name) => push_quoted(out, name),
            }
            let _ = write!(out, ",{}", event.t);
        }
    }
}

fn push_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

/// Parse macro text. Blank lines are skipped; zero valid lines is an empty
/// log, not an error. Any malformed line fails the whole decode with the
/// 1-based line number.
pub fn decode(text: &str) -> Result<MacroLog, ParseError> {
    let mut log = MacroLog::new();
    for (idx, raw) in text.lines().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        log.push(decode_line(raw, idx + 1)?);
    }
    Ok(log)
}

fn decode_line(raw: &str, line: usize) -> Result<Event, ParseError> {
    let fields = split_fields(raw, line)?;
    let tag = match fields.first() {
        Some(Field::Str(tag)) => tag.as_str(),
        _ => return Err(ParseError::new(line, ParseErrorKind::ExpectedString)),
    };

    match tag {
        TAG_MOVE => {
            expect_arity(&fields, 4, line)?;
            Ok(Event {
                kind: EventKind::PointerMove {
                    x: int_field(&fields[1], line)?,
                    y: int_field(&fields[2], line)?,
                },
                t: float_field(&fields[3], line)?,
            })
        }
        TAG_CLICK => {
            expect_arity(&fields, 6, line)?;
            Ok(Event {
                kind: EventKind::PointerButton {
                    x: int_field(&fields[1], line)?,
                    y: int_field(&fields[2], line)?,
                    button: button_field(&fields[3], line)?,
                    pressed: bool_field(&fields[4], line)?,
                },
                t: float_field(&fields[5], line)?,
            })
        }
        TAG_KEY_DOWN | TAG_KEY_UP => {
            expect_arity(&fields, 3, line)?;
            Ok(Event {
                kind: EventKind::KeyChange {
                    key: token_field(&fields[1], line)?,
                    down: tag == TAG_KEY_DOWN,
                },
                t: float_field(&fields[2], line)?,
            })
        }
        other => Err(ParseError::new(
            line,
            ParseErrorKind::UnknownTag(other.to_string()),
        )),
    }
}

/// One comma-separated field: quoted string or bare literal.
enum Field {
    Str(String),
    Bare(String),
}

fn split_fields(raw: &str, line: usize) -> Result<Vec<Field>, ParseError> {
    let mut fields = Vec::new();
    let mut chars = raw.chars().peekable();

    loop {
        while matches!(chars.peek(), Some(' ') | Some('\t')) {
            chars.next();
        }

        if chars.peek() == Some(&'"') {
            chars.next();
            let mut s = String::new();
            loop {
                match chars.next() {
                    None => {
                        return Err(ParseError::new(line, ParseErrorKind::UnterminatedString))
                    }
                    Some('\\') => match chars.next() {
                        None => {
                            return Err(ParseError::new(
                                line,
                                ParseErrorKind::UnterminatedString,
                            ))
                        }
                        Some('"') => s.push('"'),
                        Some('\\') => s.push('\\'),
                        Some('n') => s.push('\n'),
                        Some('r') => s.push('\r'),
                        Some('t') => s.push('\t'),
                        Some(other) => {
                            return Err(ParseError::new(line, ParseErrorKind::BadEscape(other)))
                        }
                    },
                    Some('"') => break,
                    Some(c) => s.push(c),
                }
            }
            fields.push(Field::Str(s));

            while matches!(chars.peek(), Some(' ') | Some('\t')) {
                chars.next();
            }
            match chars.next() {
                None => return Ok(fields),
                Some(',') => {}
                Some(c) => {
                    return Err(ParseError::new(line, ParseErrorKind::TrailingChars(c)))
                }
            }
        } else {
            let mut s = String::new();
            loop {
                match chars.peek() {
                    None => {
                        fields.push(Field::Bare(s.trim_end().to_string()));
                        return Ok(fields);
                    }
                    Some(',') => {
                        chars.next();
                        fields.push(Field::Bare(s.trim_end().to_string()));
                        break;
                    }
                    Some(&c) => {
                        s.push(c);
                        chars.next();
                    }
                }
            }
        }
    }
}

fn expect_arity(fields: &[Field], expected: usize, line: usize) -> Result<(), ParseError> {
    if fields.len() != expected {
        return Err(ParseError::new(
            line,
            ParseErrorKind::FieldCount { expected, found: fields.len() },
        ));
    }
    Ok(())
}

fn int_field(field: &Field, line: usize) -> Result<i32, ParseError> {
    match field {
        Field::Bare(s) => s
            .parse::<i32>()
            .map_err(|_| ParseError::new(line, ParseErrorKind::InvalidInt(s.clone()))),
        Field::Str(_) => Err(ParseError::new(line, ParseErrorKind::ExpectedLiteral)),
    }
}

fn float_field(field: &Field, line: usize) -> Result<f64, ParseError> {
    match field {
        Field::Bare(s) => {
            let value = s
                .parse::<f64>()
                .map_err(|_| ParseError::new(line, ParseErrorKind::InvalidNumber(s.clone())))?;
            if !value.is_finite() {
                return Err(ParseError::new(line, ParseErrorKind::InvalidNumber(s.clone())));
            }
            Ok(value)
        }
        Field::Str(_) => Err(ParseError::new(line, ParseErrorKind::ExpectedLiteral)),
    }
}

fn bool_field(field: &Field, line: usize) -> Result<bool, ParseError> {
    match field {
        Field::Bare(s) => match s.as_str() {
            "true" => Ok(true),
            "false" => Ok(false),
            _ => Err(ParseError::new(line, ParseErrorKind::InvalidBool(s.clone()))),
        },
        Field::Str(_) => Err(ParseError::new(line, ParseErrorKind::ExpectedLiteral)),
    }
}

fn button_field(field: &Field, line: usize) -> Result<Button, ParseError> {
    match field {
        Field::Str(s) => match s.as_str() {
            "left" => Ok(Button::Left),
            "right" => Ok(Button::Right),
            _ => Err(ParseError::new(line, ParseErrorKind::UnknownButton(s.clone()))),
        },
        Field::Bare(_) => Err(ParseError::new(line, ParseErrorKind::ExpectedString)),
    }
}

fn token_field(field: &Field, line: usize) -> Result<KeyToken, ParseError> {
    match field {
        Field::Str(s) => KeyToken::from_str_token(s)
            .ok_or_else(|| ParseError::new(line, ParseErrorKind::EmptyToken)),
        Field::Bare(_) => Err(ParseError::new(line, ParseErrorKind::ExpectedString)),
    }
}
