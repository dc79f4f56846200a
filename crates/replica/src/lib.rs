//! # replica
//!
//! Record mouse and keyboard activity into a plain-text macro file, replay
//! it with speed and repeat control, and toggle recording from anywhere
//! with a global hotkey.
//!
//! ## Features
//!
//! - **Recording**: global capture of pointer moves, clicks and keystrokes
//! - **Replay**: timing-faithful playback, scaled by speed, repeatable
//! - **Hotkey**: one key toggles recording without touching the terminal
//! - **Files**: human-readable `.macro` files, safe to hand-edit
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use replica::prelude::*;
//!
//! let controller = SessionController::new(RdevHooks::new()?, RdevEmitter, SystemClock);
//! controller.start_recording()?;
//! std::thread::sleep(std::time::Duration::from_secs(5));
//! let captured = controller.stop_recording()?;
//! println!("captured {captured} events");
//! controller.play()?;
//! # Ok::<(), replica::Error>(())
//! ```

// Re-export the event model and codec
pub use replica_core::*;

// Re-export the capture/replay machinery as a module
pub use replica_recorder as recorder;

// Re-export the types a front-end needs directly
pub use replica_recorder::{
    ControllerOptions, InputEmitter, InputHooks, RdevEmitter, RdevHooks, SessionController,
    SystemClock,
};

/// Prelude - import everything you need
pub mod prelude {
    pub use replica_core::prelude::*;

    pub use replica_recorder::{
        ControllerOptions, InputEmitter, InputHooks, RdevEmitter, RdevHooks, SessionController,
        SystemClock,
    };

    pub use replica_recorder::storage;
}
