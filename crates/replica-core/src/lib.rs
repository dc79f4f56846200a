//! replica-core - input macro model and file format
//!
//! Platform-free building blocks of the capture/replay engine: the event
//! model, the `.macro` text codec and the error taxonomy. Everything that
//! touches an OS lives in `replica-recorder`.

pub mod codec;
pub mod error;
pub mod events;
pub mod session;

pub use error::{Error, ParseError, ParseErrorKind, Result};
pub use events::{Button, Event, EventKind, KeyToken, MacroLog};
pub use session::{PlaybackConfig, SessionState};

pub mod prelude {
    pub use crate::codec;
    pub use crate::error::{Error, ParseError, Result};
    pub use crate::events::{Button, Event, EventKind, KeyToken, MacroLog};
    pub use crate::session::{PlaybackConfig, SessionState};
}
