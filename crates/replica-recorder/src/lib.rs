//! replica-recorder - capture, replay and storage for input macros
//!
//! Global mouse/keyboard capture, a cancellable timed replay scheduler and
//! the [`controller::SessionController`] state machine that ties them
//! together. The controller takes its hook installer, input emitter and
//! clock as trait objects, so everything above the OS layer runs under
//! test with fakes; [`platform`] provides the rdev-backed real ones.

pub mod controller;
pub mod emit;
pub mod hooks;
pub mod platform;
pub mod recorder;
pub mod replay;
pub mod storage;

pub use controller::{ControllerOptions, SessionController};
pub use emit::InputEmitter;
pub use hooks::{CaptureSink, HookGuard, HotkeySink, InputHooks};
pub use platform::{RdevEmitter, RdevHooks};
pub use recorder::{CaptureSession, Clock, SystemClock};
pub use replay::PlaybackHandle;

pub mod prelude {
    pub use crate::controller::{ControllerOptions, SessionController};
    pub use crate::emit::InputEmitter;
    pub use crate::hooks::{CaptureSink, HookGuard, HotkeySink, InputHooks};
    pub use crate::platform::{RdevEmitter, RdevHooks};
    pub use crate::recorder::{CaptureSession, Clock, SystemClock};
    pub use crate::replay::PlaybackHandle;
    pub use crate::storage;
}
