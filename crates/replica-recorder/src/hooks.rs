//! Input hook seam
//!
//! The controller never talks to the OS directly; it installs hooks through
//! this trait. The real implementation is `platform::RdevHooks`; tests
//! inject fakes and drive the sinks by hand.

use replica_core::{EventKind, KeyToken, Result};

/// Receives one shaped observation per raw input event. Runs on the
/// platform's input delivery thread; must not block.
pub type CaptureSink = Box<dyn Fn(EventKind) + Send + Sync>;

/// Invoked on each press of the relay key, on the delivery thread.
pub type HotkeySink = Box<dyn Fn() + Send + Sync>;

/// Installer for global input hooks.
pub trait InputHooks: Send + Sync {
    /// Install the pointer and keyboard hooks. Observations flow into
    /// `sink` until the returned guard is uninstalled or dropped.
    fn install_capture(&self, sink: CaptureSink) -> Result<HookGuard>;

    /// Install the single-key relay hook for `key`.
    fn install_hotkey(&self, key: KeyToken, on_press: HotkeySink) -> Result<HookGuard>;
}

/// Uninstalls a hook when dropped; `uninstall` does it eagerly. After either,
/// the sink is never invoked again (modulo one in-flight delivery racing the
/// swap).
pub struct HookGuard(Option<Box<dyn FnOnce() + Send>>);

impl HookGuard {
    pub fn new(uninstall: impl FnOnce() + Send + 'static) -> Self {
        Self(Some(Box::new(uninstall)))
    }

    pub fn uninstall(mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}

impl Drop for HookGuard {
    fn drop(&mut self) {
        if let Some(f) = self.0.take() {
            f();
        }
    }
}

impl std::fmt::Debug for HookGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookGuard")
            .field("installed", &self.0.is_some())
            .finish()
    }
}
