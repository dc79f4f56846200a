//! Synthetic input seam
//!
//! Playback drives this trait; `platform::RdevEmitter` is the real
//! implementation, tests collect calls instead of touching the OS.

use replica_core::{Button, KeyToken, Result};

/// Emits synthetic input events.
pub trait InputEmitter: Send + Sync {
    /// Move the pointer to absolute screen coordinates.
    fn pointer_move(&self, x: i32, y: i32) -> Result<()>;

    /// Press (`pressed = true`) or release a pointer button.
    fn button(&self, button: Button, pressed: bool) -> Result<()>;

    /// Press or release a key. Fails with `Error::UnresolvedKey` when the
    /// token has no entry in the key table.
    fn key(&self, key: &KeyToken, down: bool) -> Result<()>;
}
