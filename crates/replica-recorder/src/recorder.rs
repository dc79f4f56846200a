//! Capture session
//!
//! Hook callbacks stamp elapsed time and push events onto an unbounded
//! channel; nothing else happens on the delivery thread. The channel is
//! drained into a log once, when the session finishes.

use crate::hooks::{CaptureSink, HookGuard, InputHooks};
use crossbeam_channel::{unbounded, Receiver};
use replica_core::{Event, MacroLog, Result};
use std::sync::Arc;
use std::time::Instant;

/// Time source for event stamping. Injected so sessions run under test
/// with a scripted clock.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// The monotonic system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// One recording in progress: the installed hooks plus the channel their
/// observations arrive on.
pub struct CaptureSession {
    guard: HookGuard,
    events_rx: Receiver<Event>,
}

impl CaptureSession {
    /// Install the pointer and keyboard hooks and start stamping
    /// observations relative to now.
    pub fn begin(hooks: &dyn InputHooks, clock: Arc<dyn Clock>) -> Result<Self> {
        let (tx, events_rx) = unbounded();
        let start = clock.now();
        let sink: CaptureSink = Box::new(move |kind| {
            let t = clock.now().duration_since(start).as_secs_f64();
            let _ = tx.send(Event { t, kind });
        });
        let guard = hooks.install_capture(sink)?;
        Ok(Self { guard, events_rx })
    }

    /// Events captured so far (still queued in the channel).
    pub fn pending(&self) -> usize {
        self.events_rx.len()
    }

    /// Uninstall the hooks, then drain everything captured into a log.
    /// An observation racing the uninstall may still land in the channel and
    /// is drained here; nothing is appended after this returns.
    pub fn finish(self) -> MacroLog {
        self.guard.uninstall();
        let mut log = MacroLog::new();
        while let Ok(event) = self.events_rx.try_recv() {
            log.push(event);
        }
        log
    }
}
