//! Session controller
//!
//! The one object a front-end talks to. Owns the session state, the macro
//! log and the stored playback config; every transition is gated here.
//! Hooks, emitter and clock are injected, so the whole state machine runs
//! under test with fakes (see tests/controller.rs).

use crate::emit::InputEmitter;
use crate::hooks::{HookGuard, HotkeySink, InputHooks};
use crate::recorder::{CaptureSession, Clock};
use crate::replay::{self, PlaybackHandle};
use crate::storage;
use parking_lot::Mutex;
use replica_core::{Error, KeyToken, MacroLog, PlaybackConfig, Result, SessionState};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Construction-time options.
#[derive(Debug, Clone)]
pub struct ControllerOptions {
    /// Key the relay hook listens for.
    pub hotkey: KeyToken,
    /// Initially stored playback config.
    pub config: PlaybackConfig,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            hotkey: KeyToken::named("f8"),
            config: PlaybackConfig::default(),
        }
    }
}

/// The session controller. Clones share one session, so a front-end can
/// hand copies to callbacks and threads.
#[derive(Clone)]
pub struct SessionController {
    shared: Arc<Shared>,
}

struct Shared {
    hooks: Box<dyn InputHooks>,
    emitter: Arc<dyn InputEmitter>,
    clock: Arc<dyn Clock>,
    hotkey: KeyToken,
    inner: Mutex<Inner>,
}

struct Inner {
    state: SessionState,
    log: MacroLog,
    config: PlaybackConfig,
    capture: Option<CaptureSession>,
    playback: Option<ActivePlayback>,
    playback_seq: u64,
    relay: Option<HookGuard>,
}

struct ActivePlayback {
    handle: PlaybackHandle,
    seq: u64,
}

impl SessionController {
    pub fn new(
        hooks: impl InputHooks + 'static,
        emitter: impl InputEmitter + 'static,
        clock: impl Clock + 'static,
    ) -> Self {
        Self::with_options(hooks, emitter, clock, ControllerOptions::default())
    }

    pub fn with_options(
        hooks: impl InputHooks + 'static,
        emitter: impl InputEmitter + 'static,
        clock: impl Clock + 'static,
        options: ControllerOptions,
    ) -> Self {
        Self {
            shared: Arc::new(Shared {
                hooks: Box::new(hooks),
                emitter: Arc::new(emitter),
                clock: Arc::new(clock),
                hotkey: options.hotkey,
                inner: Mutex::new(Inner {
                    state: SessionState::Idle,
                    log: MacroLog::new(),
                    config: options.config,
                    capture: None,
                    playback: None,
                    playback_seq: 0,
                    relay: None,
                }),
            }),
        }
    }

    /// Begin recording. Idempotent while `Recording`; rejected while
    /// `Playing`. On success the previous log is discarded.
    pub fn start_recording(&self) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        match inner.state {
            SessionState::Recording => Ok(()),
            SessionState::Playing => Err(Error::IllegalState {
                action: "start recording",
                state: inner.state,
            }),
            SessionState::Idle => self.shared.start_locked(&mut inner),
        }
    }

    /// Stop recording and return the number of captured events. A no-op
    /// returning `Ok(0)` unless currently `Recording`.
    pub fn stop_recording(&self) -> Result<usize> {
        let mut inner = self.shared.inner.lock();
        if inner.state != SessionState::Recording {
            return Ok(0);
        }
        Ok(self.shared.stop_locked(&mut inner))
    }

    /// Start recording if `Idle`, stop if `Recording`, do nothing while
    /// `Playing`. Returns the resulting state. This is the operation the
    /// hotkey relay invokes.
    pub fn toggle_recording(&self) -> Result<SessionState> {
        self.shared.toggle()
    }

    /// Replay the current log with the stored config.
    pub fn play(&self) -> Result<()> {
        let config = self.shared.inner.lock().config;
        self.play_with(config)
    }

    /// Replay the current log once-off with an explicit config. Requires
    /// `Idle`; an empty log is a no-op. Returns as soon as the background
    /// playback is launched.
    pub fn play_with(&self, config: PlaybackConfig) -> Result<()> {
        config.validate()?;
        let mut inner = self.shared.inner.lock();
        match inner.state {
            SessionState::Recording | SessionState::Playing => {
                return Err(Error::IllegalState { action: "play", state: inner.state });
            }
            SessionState::Idle => {}
        }
        if inner.log.is_empty() {
            debug!("empty log, nothing to play");
            return Ok(());
        }

        inner.playback_seq += 1;
        let seq = inner.playback_seq;
        let snapshot = inner.log.clone();
        let weak = Arc::downgrade(&self.shared);
        let handle = replay::spawn(
            snapshot,
            config,
            Arc::clone(&self.shared.emitter),
            move || {
                if let Some(shared) = weak.upgrade() {
                    shared.playback_done(seq);
                }
            },
        );
        inner.playback = Some(ActivePlayback { handle, seq });
        inner.state = SessionState::Playing;
        info!(speed = config.speed, repeats = config.repeats, "playback started");
        Ok(())
    }

    /// Cancel an in-flight playback and wait for its thread to wind down.
    /// No-op unless `Playing`. The state stays `Playing` until the thread
    /// has exited, so no recording can start while stray emissions are
    /// still possible.
    pub fn stop_playback(&self) -> Result<()> {
        let active = {
            let mut inner = self.shared.inner.lock();
            if inner.state != SessionState::Playing {
                return Ok(());
            }
            match inner.playback.take() {
                Some(active) => active,
                // another stop is mid wind-down; it will publish Idle
                None => return Ok(()),
            }
        };
        active.handle.cancel();
        active.handle.join();
        let mut inner = self.shared.inner.lock();
        if inner.state == SessionState::Playing {
            inner.state = SessionState::Idle;
        }
        info!("playback cancelled");
        Ok(())
    }

    /// Replace the log with the contents of a macro file and return the
    /// event count. Requires `Idle`; on any error the log is unchanged.
    pub fn load_macro(&self, path: &Path) -> Result<usize> {
        let mut inner = self.shared.inner.lock();
        if inner.state != SessionState::Idle {
            return Err(Error::IllegalState { action: "load a macro", state: inner.state });
        }
        let log = storage::load(path)?;
        let count = log.len();
        inner.log = log;
        info!(events = count, path = %path.display(), "macro loaded");
        Ok(count)
    }

    /// Write the current log to a macro file. Requires `Idle`.
    pub fn save_macro(&self, path: &Path) -> Result<()> {
        let inner = self.shared.inner.lock();
        if inner.state != SessionState::Idle {
            return Err(Error::IllegalState { action: "save a macro", state: inner.state });
        }
        storage::save(path, &inner.log)?;
        info!(events = inner.log.len(), path = %path.display(), "macro saved");
        Ok(())
    }

    /// Validate and store playback preferences. On rejection the previous
    /// config stays in force.
    pub fn set_config(&self, speed: f64, repeats: u32) -> Result<()> {
        let config = PlaybackConfig::new(speed, repeats);
        config.validate()?;
        self.shared.inner.lock().config = config;
        Ok(())
    }

    pub fn config(&self) -> PlaybackConfig {
        self.shared.inner.lock().config
    }

    /// Install or remove the relay hook. Enabling twice keeps the single
    /// existing hook; disabling when disabled is a no-op.
    pub fn set_hotkey_enabled(&self, enabled: bool) -> Result<()> {
        let mut inner = self.shared.inner.lock();
        if enabled {
            if inner.relay.is_some() {
                return Ok(());
            }
            let weak = Arc::downgrade(&self.shared);
            let on_press: HotkeySink = Box::new(move || {
                if let Some(shared) = weak.upgrade() {
                    match shared.toggle() {
                        Ok(state) => debug!(%state, "hotkey toggled session"),
                        Err(err) => warn!(%err, "hotkey toggle failed"),
                    }
                }
            });
            let guard = self
                .shared
                .hooks
                .install_hotkey(self.shared.hotkey.clone(), on_press)?;
            inner.relay = Some(guard);
            debug!(key = %self.shared.hotkey, "hotkey relay enabled");
        } else if let Some(guard) = inner.relay.take() {
            guard.uninstall();
            debug!("hotkey relay disabled");
        }
        Ok(())
    }

    pub fn state(&self) -> SessionState {
        self.shared.inner.lock().state
    }

    /// Event count for front-ends: the live capture count while recording,
    /// otherwise the size of the owned log.
    pub fn log_len(&self) -> usize {
        let inner = self.shared.inner.lock();
        match (&inner.capture, inner.state) {
            (Some(capture), SessionState::Recording) => capture.pending(),
            _ => inner.log.len(),
        }
    }

    /// Copy of the owned log, for rendering or inspection.
    pub fn snapshot(&self) -> MacroLog {
        self.shared.inner.lock().log.clone()
    }
}

impl Shared {
    fn start_locked(&self, inner: &mut Inner) -> Result<()> {
        let session = CaptureSession::begin(self.hooks.as_ref(), Arc::clone(&self.clock))?;
        inner.log = MacroLog::new();
        inner.capture = Some(session);
        inner.state = SessionState::Recording;
        info!("recording started");
        Ok(())
    }

    fn stop_locked(&self, inner: &mut Inner) -> usize {
        inner.log = match inner.capture.take() {
            Some(session) => session.finish(),
            None => MacroLog::new(),
        };
        inner.state = SessionState::Idle;
        info!(events = inner.log.len(), "recording stopped");
        inner.log.len()
    }

    fn toggle(&self) -> Result<SessionState> {
        let mut inner = self.inner.lock();
        match inner.state {
            SessionState::Idle => self.start_locked(&mut inner)?,
            SessionState::Recording => {
                self.stop_locked(&mut inner);
            }
            SessionState::Playing => {}
        }
        Ok(inner.state)
    }

    /// Runs on the playback thread when it exits. The sequence number keeps
    /// a stale notification from clobbering a newer session.
    fn playback_done(&self, seq: u64) {
        let mut inner = self.inner.lock();
        let current = inner.playback.as_ref().map(|p| p.seq);
        if inner.state == SessionState::Playing && current == Some(seq) {
            inner.playback = None;
            inner.state = SessionState::Idle;
            debug!("playback finished");
        }
    }
}
