//! Timed replay
//!
//! Emits events in recorded order on a background thread, waiting the
//! recorded gap (divided by speed) after each event. The final event of a
//! repeat goes out with no injected delay before the next repeat starts.
//! Cancellation is a channel message observed between events and mid-wait.

use crate::emit::InputEmitter;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use replica_core::{Error, Event, EventKind, MacroLog, PlaybackConfig};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// Handle to an in-flight playback. Dropping it cancels the thread the same
/// way `cancel` does.
pub struct PlaybackHandle {
    cancel_tx: Sender<()>,
    thread: thread::JoinHandle<()>,
}

impl PlaybackHandle {
    /// Stop before the next emission, waking the thread if it is mid-wait.
    pub fn cancel(&self) {
        let _ = self.cancel_tx.try_send(());
    }

    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the playback thread to exit.
    pub fn join(self) {
        let _ = self.thread.join();
    }
}

/// Spawn a playback thread over a log snapshot. `on_done` runs on the
/// playback thread after the last emission, or after a cancel.
pub fn spawn(
    log: MacroLog,
    config: PlaybackConfig,
    emitter: Arc<dyn InputEmitter>,
    on_done: impl FnOnce() + Send + 'static,
) -> PlaybackHandle {
    let (cancel_tx, cancel_rx) = bounded(1);
    let thread = thread::spawn(move || {
        run(&log, config, emitter.as_ref(), &cancel_rx);
        on_done();
    });
    PlaybackHandle { cancel_tx, thread }
}

fn run(log: &MacroLog, config: PlaybackConfig, emitter: &dyn InputEmitter, cancel: &Receiver<()>) {
    debug!(
        events = log.len(),
        repeats = config.repeats,
        speed = config.speed,
        "replay started"
    );
    for _ in 0..config.repeats {
        for pair in log.events.windows(2) {
            emit(emitter, &pair[0]);
            let gap = (pair[1].t - pair[0].t) / config.speed;
            if wait_or_cancel(cancel, gap) {
                debug!("replay cancelled");
                return;
            }
        }
        if let Some(last) = log.events.last() {
            emit(emitter, last);
        }
        if cancelled(cancel) {
            debug!("replay cancelled");
            return;
        }
    }
    debug!("replay finished");
}

fn emit(emitter: &dyn InputEmitter, event: &Event) {
    let result = match &event.kind {
        EventKind::PointerMove { x, y } => emitter.pointer_move(*x, *y),
        EventKind::PointerButton { x, y, button, pressed } => emitter
            .pointer_move(*x, *y)
            .and_then(|_| emitter.button(*button, *pressed)),
        EventKind::KeyChange { key, down } => emitter.key(key, *down),
    };
    match result {
        Ok(()) => {}
        Err(Error::UnresolvedKey(token)) => debug!(%token, "skipping unmapped key token"),
        Err(err) => warn!(%err, "failed to emit event"),
    }
}

/// Sleep for `gap_secs`, returning early (true) on cancel. The f64 to u64
/// cast saturates: negatives and NaN wait nothing, oversized gaps pin to
/// u64::MAX microseconds.
fn wait_or_cancel(cancel: &Receiver<()>, gap_secs: f64) -> bool {
    let micros = (gap_secs * 1e6) as u64;
    if micros == 0 {
        return cancelled(cancel);
    }
    match cancel.recv_timeout(Duration::from_micros(micros)) {
        Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        Err(RecvTimeoutError::Timeout) => false,
    }
}

fn cancelled(cancel: &Receiver<()>) -> bool {
    !matches!(cancel.try_recv(), Err(TryRecvError::Empty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use replica_core::{Button, KeyToken, Result};
    use std::time::Instant;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Move(i32, i32),
        Button(Button, bool),
        Key(KeyToken, bool),
    }

    #[derive(Default)]
    struct Collecting {
        calls: Mutex<Vec<(Call, Instant)>>,
        reject_named_keys: bool,
    }

    impl Collecting {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().iter().map(|(c, _)| c.clone()).collect()
        }

        fn stamps(&self) -> Vec<Instant> {
            self.calls.lock().iter().map(|(_, at)| *at).collect()
        }

        fn record(&self, call: Call) {
            self.calls.lock().push((call, Instant::now()));
        }
    }

    impl InputEmitter for Collecting {
        fn pointer_move(&self, x: i32, y: i32) -> Result<()> {
            self.record(Call::Move(x, y));
            Ok(())
        }

        fn button(&self, button: Button, pressed: bool) -> Result<()> {
            self.record(Call::Button(button, pressed));
            Ok(())
        }

        fn key(&self, key: &KeyToken, down: bool) -> Result<()> {
            self.record(Call::Key(key.clone(), down));
            if self.reject_named_keys && matches!(key, KeyToken::Named(_)) {
                return Err(Error::UnresolvedKey(key.clone()));
            }
            Ok(())
        }
    }

    fn moves(ts: &[f64]) -> MacroLog {
        ts.iter()
            .enumerate()
            .map(|(i, &t)| Event::pointer_move(i as i32, i as i32, t))
            .collect()
    }

    fn idle_cancel() -> (Sender<()>, Receiver<()>) {
        bounded(1)
    }

    fn assert_gap(actual: Duration, expected_ms: u64) {
        let low = Duration::from_millis(expected_ms * 9 / 10);
        let high = Duration::from_millis(expected_ms + 150);
        assert!(
            actual >= low && actual <= high,
            "gap {:?} outside [{:?}, {:?}]",
            actual,
            low,
            high
        );
    }

    #[test]
    fn emits_in_order_with_recorded_gaps() {
        let log = moves(&[0.0, 0.1, 0.25]);
        let emitter = Collecting::default();
        let (_keep, cancel) = idle_cancel();

        run(&log, PlaybackConfig::default(), &emitter, &cancel);

        let stamps = emitter.stamps();
        assert_eq!(stamps.len(), 3);
        assert_gap(stamps[1] - stamps[0], 100);
        assert_gap(stamps[2] - stamps[1], 150);
    }

    #[test]
    fn double_speed_halves_gaps() {
        let log = moves(&[0.0, 0.1, 0.25]);
        let emitter = Collecting::default();
        let (_keep, cancel) = idle_cancel();

        run(&log, PlaybackConfig::new(2.0, 1), &emitter, &cancel);

        let stamps = emitter.stamps();
        assert_gap(stamps[1] - stamps[0], 50);
        assert_gap(stamps[2] - stamps[1], 75);
    }

    #[test]
    fn half_speed_doubles_gaps() {
        let log = moves(&[0.0, 0.1]);
        let emitter = Collecting::default();
        let (_keep, cancel) = idle_cancel();

        run(&log, PlaybackConfig::new(0.5, 1), &emitter, &cancel);

        let stamps = emitter.stamps();
        assert_gap(stamps[1] - stamps[0], 200);
    }

    #[test]
    fn repeats_replay_the_full_sequence() {
        let log = moves(&[0.0, 0.0, 0.0]);
        let emitter = Collecting::default();
        let (_keep, cancel) = idle_cancel();

        run(&log, PlaybackConfig::new(1.0, 3), &emitter, &cancel);

        let one_pass = vec![Call::Move(0, 0), Call::Move(1, 1), Call::Move(2, 2)];
        let expected: Vec<Call> = one_pass.iter().cloned().cycle().take(9).collect();
        assert_eq!(emitter.calls(), expected);
    }

    #[test]
    fn button_event_moves_then_clicks() {
        let log = MacroLog {
            events: vec![Event::pointer_button(30, 40, Button::Right, true, 0.0)],
        };
        let emitter = Collecting::default();
        let (_keep, cancel) = idle_cancel();

        run(&log, PlaybackConfig::default(), &emitter, &cancel);

        assert_eq!(
            emitter.calls(),
            vec![Call::Move(30, 40), Call::Button(Button::Right, true)]
        );
    }

    #[test]
    fn unresolved_key_is_skipped_not_fatal() {
        let log = MacroLog {
            events: vec![
                Event::key_change(KeyToken::named("nosuchkey"), true, 0.0),
                Event::pointer_move(9, 9, 0.0),
            ],
        };
        let emitter = Collecting { reject_named_keys: true, ..Default::default() };
        let (_keep, cancel) = idle_cancel();

        run(&log, PlaybackConfig::default(), &emitter, &cancel);

        assert_eq!(emitter.calls().last(), Some(&Call::Move(9, 9)));
    }

    #[test]
    fn negative_gap_emits_immediately() {
        let log = moves(&[0.5, 0.2]);
        let emitter = Collecting::default();
        let (_keep, cancel) = idle_cancel();

        let begun = Instant::now();
        run(&log, PlaybackConfig::default(), &emitter, &cancel);

        assert_eq!(emitter.calls().len(), 2);
        assert!(begun.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn empty_log_emits_nothing() {
        let emitter = Collecting::default();
        let (_keep, cancel) = idle_cancel();
        run(&MacroLog::new(), PlaybackConfig::new(1.0, 5), &emitter, &cancel);
        assert!(emitter.calls().is_empty());
    }

    #[test]
    fn cancel_wakes_a_long_wait() {
        let log = moves(&[0.0, 30.0]);
        let emitter = Arc::new(Collecting::default());
        let done = Arc::new(Mutex::new(false));
        let done_flag = Arc::clone(&done);

        let begun = Instant::now();
        let handle = spawn(log, PlaybackConfig::default(), emitter.clone(), move || {
            *done_flag.lock() = true;
        });
        thread::sleep(Duration::from_millis(50));
        handle.cancel();
        handle.join();

        assert!(begun.elapsed() < Duration::from_secs(2));
        assert_eq!(emitter.calls().len(), 1);
        assert!(*done.lock());
    }

    #[test]
    fn dropping_the_handle_cancels() {
        let log = moves(&[0.0, 30.0]);
        let emitter = Arc::new(Collecting::default());
        let (done_tx, done_rx) = bounded(1);

        let handle = spawn(log, PlaybackConfig::default(), emitter.clone(), move || {
            let _ = done_tx.send(());
        });
        thread::sleep(Duration::from_millis(50));
        drop(handle);

        assert!(done_rx.recv_timeout(Duration::from_secs(2)).is_ok());
    }
}
