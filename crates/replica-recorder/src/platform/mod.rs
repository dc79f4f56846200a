//! Platform input layer
//!
//! Uses rdev for global event capture and input injection on every OS.
//! rdev can install its hook only once per process and never tears it
//! down, so capture and hotkey sinks live in swap-in slots behind one
//! long-lived listener thread; installing or uninstalling a hook only
//! touches the slots.

pub mod keymap;

use crate::emit::InputEmitter;
use crate::hooks::{CaptureSink, HookGuard, HotkeySink, InputHooks};
use parking_lot::Mutex;
use replica_core::{Button, Error, EventKind, KeyToken, Result};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// How long a fresh listener gets to report a failed OS hook before we
/// declare it healthy. rdev only signals failure by returning.
const STARTUP_GRACE: Duration = Duration::from_millis(150);

type CaptureSlot = Arc<dyn Fn(EventKind) + Send + Sync>;

#[derive(Clone)]
struct HotkeyEntry {
    key: rdev::Key,
    on_press: Arc<dyn Fn() + Send + Sync>,
}

struct Registry {
    capture: Mutex<Option<CaptureSlot>>,
    hotkey: Mutex<Option<HotkeyEntry>>,
    failure: Mutex<Option<String>>,
}

impl Registry {
    fn new() -> Self {
        Self {
            capture: Mutex::new(None),
            hotkey: Mutex::new(None),
            failure: Mutex::new(None),
        }
    }
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();
static LISTENER: OnceLock<()> = OnceLock::new();

fn registry() -> &'static Registry {
    let reg = REGISTRY.get_or_init(Registry::new);
    LISTENER.get_or_init(|| {
        thread::spawn(move || listener_main(reg));
    });
    reg
}

fn listener_main(registry: &'static Registry) {
    let mut last_pos = (0, 0);
    let mut held: HashMap<rdev::Key, KeyToken> = HashMap::new();
    let mut swallow: Option<rdev::Key> = None;
    let result = rdev::listen(move |event| {
        handle_event(registry, &event, &mut last_pos, &mut held, &mut swallow)
    });
    if let Err(err) = result {
        warn!(?err, "global input listener failed");
        *registry.failure.lock() = Some(format!("{err:?}"));
    }
}

/// One callback invocation. The relay key is handled first and withheld
/// from capture on both edges, so a hotkey-stopped macro does not end with
/// the hotkey itself.
fn handle_event(
    registry: &Registry,
    event: &rdev::Event,
    last_pos: &mut (i32, i32),
    held: &mut HashMap<rdev::Key, KeyToken>,
    swallow: &mut Option<rdev::Key>,
) {
    match event.event_type {
        rdev::EventType::KeyPress(key) => {
            let relay = registry.hotkey.lock().clone();
            if let Some(entry) = relay {
                if entry.key == key {
                    *swallow = Some(key);
                    // invoked with no registry lock held
                    (entry.on_press)();
                    return;
                }
            }
        }
        rdev::EventType::KeyRelease(key) if *swallow == Some(key) => {
            *swallow = None;
            return;
        }
        _ => {}
    }

    let kind = observe(event, last_pos, held);
    let sink = registry.capture.lock().clone();
    if let (Some(kind), Some(sink)) = (kind, sink) {
        sink(kind);
    }
}

/// Translate a raw OS event into the recorded event model. Tracks the
/// pointer position so button events carry coordinates, and remembers the
/// token of each held key so releases reuse the press token.
fn observe(
    event: &rdev::Event,
    last_pos: &mut (i32, i32),
    held: &mut HashMap<rdev::Key, KeyToken>,
) -> Option<EventKind> {
    match event.event_type {
        rdev::EventType::MouseMove { x, y } => {
            *last_pos = (x as i32, y as i32);
            Some(EventKind::PointerMove { x: last_pos.0, y: last_pos.1 })
        }
        rdev::EventType::ButtonPress(button) => observe_button(button).map(|button| {
            EventKind::PointerButton { x: last_pos.0, y: last_pos.1, button, pressed: true }
        }),
        rdev::EventType::ButtonRelease(button) => observe_button(button).map(|button| {
            EventKind::PointerButton { x: last_pos.0, y: last_pos.1, button, pressed: false }
        }),
        rdev::EventType::KeyPress(key) => {
            match observe_key(key, event.name.as_deref()) {
                Some(token) => {
                    held.insert(key, token.clone());
                    Some(EventKind::KeyChange { key: token, down: true })
                }
                None => {
                    debug!(?key, "dropped key with no stable token");
                    None
                }
            }
        }
        rdev::EventType::KeyRelease(key) => {
            let token = held.remove(&key).or_else(|| observe_key(key, None))?;
            Some(EventKind::KeyChange { key: token, down: false })
        }
        // scroll is outside the event model
        rdev::EventType::Wheel { .. } => None,
    }
}

fn observe_button(button: rdev::Button) -> Option<Button> {
    match button {
        rdev::Button::Left => Some(Button::Left),
        rdev::Button::Right => Some(Button::Right),
        _ => None,
    }
}

/// Token for a key press: the typed character when the OS reports one,
/// otherwise the stable key name, otherwise the unshifted US character.
fn observe_key(key: rdev::Key, name: Option<&str>) -> Option<KeyToken> {
    if let Some(name) = name {
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if !c.is_control() && c != ' ' {
                return Some(KeyToken::Char(c));
            }
        }
    }
    keymap::key_name(key)
        .map(KeyToken::named)
        .or_else(|| keymap::key_char(key).map(KeyToken::Char))
}

/// Global hook installer backed by the shared rdev listener.
pub struct RdevHooks {
    registry: &'static Registry,
}

impl RdevHooks {
    /// Bring up the process-wide listener (first call only) and verify it
    /// survived hook installation.
    pub fn new() -> Result<Self> {
        let registry = registry();
        check_startup(registry)?;
        Ok(Self { registry })
    }
}

fn check_startup(registry: &'static Registry) -> Result<()> {
    let deadline = Instant::now() + STARTUP_GRACE;
    loop {
        listener_failure(registry)?;
        if Instant::now() >= deadline {
            return Ok(());
        }
        thread::sleep(Duration::from_millis(10));
    }
}

/// Error out if the listener thread has exited. A slot behind a dead
/// listener would accept sinks nothing ever invokes.
fn listener_failure(registry: &Registry) -> Result<()> {
    match registry.failure.lock().clone() {
        Some(msg) => Err(Error::HookInstall(msg)),
        None => Ok(()),
    }
}

impl InputHooks for RdevHooks {
    fn install_capture(&self, sink: CaptureSink) -> Result<HookGuard> {
        listener_failure(self.registry)?;
        *self.registry.capture.lock() = Some(Arc::from(sink));
        let registry = self.registry;
        Ok(HookGuard::new(move || {
            *registry.capture.lock() = None;
        }))
    }

    fn install_hotkey(&self, key: KeyToken, on_press: HotkeySink) -> Result<HookGuard> {
        listener_failure(self.registry)?;
        let rdev_key = keymap::token_key(&key).ok_or(Error::UnresolvedKey(key))?;
        *self.registry.hotkey.lock() = Some(HotkeyEntry {
            key: rdev_key,
            on_press: Arc::from(on_press),
        });
        let registry = self.registry;
        Ok(HookGuard::new(move || {
            *registry.hotkey.lock() = None;
        }))
    }
}

/// Input injection through rdev's simulate.
pub struct RdevEmitter;

impl InputEmitter for RdevEmitter {
    fn pointer_move(&self, x: i32, y: i32) -> Result<()> {
        simulate(&rdev::EventType::MouseMove { x: x as f64, y: y as f64 })
    }

    fn button(&self, button: Button, pressed: bool) -> Result<()> {
        let button = match button {
            Button::Left => rdev::Button::Left,
            Button::Right => rdev::Button::Right,
        };
        let event = if pressed {
            rdev::EventType::ButtonPress(button)
        } else {
            rdev::EventType::ButtonRelease(button)
        };
        simulate(&event)
    }

    fn key(&self, key: &KeyToken, down: bool) -> Result<()> {
        let rdev_key = keymap::token_key(key).ok_or_else(|| Error::UnresolvedKey(key.clone()))?;
        let event = if down {
            rdev::EventType::KeyPress(rdev_key)
        } else {
            rdev::EventType::KeyRelease(rdev_key)
        };
        simulate(&event)
    }
}

fn simulate(event: &rdev::EventType) -> Result<()> {
    rdev::simulate(event).map_err(|err| Error::Emit(format!("{err:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::SystemTime;

    fn raw(event_type: rdev::EventType, name: Option<&str>) -> rdev::Event {
        rdev::Event {
            event_type,
            time: SystemTime::now(),
            name: name.map(str::to_owned),
        }
    }

    struct Tracker {
        last_pos: (i32, i32),
        held: HashMap<rdev::Key, KeyToken>,
    }

    impl Tracker {
        fn new() -> Self {
            Self { last_pos: (0, 0), held: HashMap::new() }
        }

        fn see(&mut self, event: rdev::Event) -> Option<EventKind> {
            observe(&event, &mut self.last_pos, &mut self.held)
        }
    }

    #[test]
    fn move_maps_with_truncated_coordinates() {
        let mut tracker = Tracker::new();
        let kind = tracker.see(raw(rdev::EventType::MouseMove { x: 12.7, y: 34.2 }, None));
        assert_eq!(kind, Some(EventKind::PointerMove { x: 12, y: 34 }));
    }

    #[test]
    fn click_carries_the_last_pointer_position() {
        let mut tracker = Tracker::new();
        tracker.see(raw(rdev::EventType::MouseMove { x: 100.0, y: 200.0 }, None));
        let kind = tracker.see(raw(rdev::EventType::ButtonPress(rdev::Button::Left), None));
        assert_eq!(
            kind,
            Some(EventKind::PointerButton { x: 100, y: 200, button: Button::Left, pressed: true })
        );
    }

    #[test]
    fn middle_button_is_dropped() {
        let mut tracker = Tracker::new();
        assert_eq!(tracker.see(raw(rdev::EventType::ButtonPress(rdev::Button::Middle), None)), None);
    }

    #[test]
    fn wheel_is_dropped() {
        let mut tracker = Tracker::new();
        assert_eq!(
            tracker.see(raw(rdev::EventType::Wheel { delta_x: 0, delta_y: -1 }, None)),
            None
        );
    }

    #[test]
    fn key_press_prefers_the_typed_character() {
        let mut tracker = Tracker::new();
        let kind = tracker.see(raw(rdev::EventType::KeyPress(rdev::Key::KeyA), Some("A")));
        assert_eq!(kind, Some(EventKind::KeyChange { key: KeyToken::Char('A'), down: true }));
    }

    #[test]
    fn key_release_reuses_the_press_token() {
        let mut tracker = Tracker::new();
        tracker.see(raw(rdev::EventType::KeyPress(rdev::Key::KeyA), Some("A")));
        let kind = tracker.see(raw(rdev::EventType::KeyRelease(rdev::Key::KeyA), None));
        assert_eq!(kind, Some(EventKind::KeyChange { key: KeyToken::Char('A'), down: false }));
    }

    #[test]
    fn control_names_fall_back_to_key_names() {
        let mut tracker = Tracker::new();
        let kind = tracker.see(raw(rdev::EventType::KeyPress(rdev::Key::Return), Some("\r")));
        assert_eq!(kind, Some(EventKind::KeyChange { key: KeyToken::named("enter"), down: true }));
    }

    #[test]
    fn space_is_a_named_key() {
        let mut tracker = Tracker::new();
        let kind = tracker.see(raw(rdev::EventType::KeyPress(rdev::Key::Space), Some(" ")));
        assert_eq!(kind, Some(EventKind::KeyChange { key: KeyToken::named("space"), down: true }));
    }

    #[test]
    fn orphan_release_uses_the_unshifted_character() {
        let mut tracker = Tracker::new();
        let kind = tracker.see(raw(rdev::EventType::KeyRelease(rdev::Key::KeyQ), None));
        assert_eq!(kind, Some(EventKind::KeyChange { key: KeyToken::Char('q'), down: false }));
    }

    #[test]
    fn unknown_key_is_dropped() {
        let mut tracker = Tracker::new();
        assert_eq!(
            tracker.see(raw(rdev::EventType::KeyPress(rdev::Key::Unknown(0xBEEF)), None)),
            None
        );
    }

    #[test]
    fn relay_key_fires_and_is_withheld_from_capture() {
        let registry = Registry::new();
        let presses = Arc::new(AtomicUsize::new(0));
        let fired = Arc::clone(&presses);
        *registry.hotkey.lock() = Some(HotkeyEntry {
            key: rdev::Key::F8,
            on_press: Arc::new(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            }),
        });
        let captured: Arc<Mutex<Vec<EventKind>>> = Arc::new(Mutex::new(Vec::new()));
        let sink_log = Arc::clone(&captured);
        *registry.capture.lock() = Some(Arc::new(move |kind| {
            sink_log.lock().push(kind);
        }));

        let mut last_pos = (0, 0);
        let mut held = HashMap::new();
        let mut swallow = None;
        let mut feed = |event: rdev::Event| {
            handle_event(&registry, &event, &mut last_pos, &mut held, &mut swallow)
        };

        feed(raw(rdev::EventType::KeyPress(rdev::Key::F8), None));
        feed(raw(rdev::EventType::KeyRelease(rdev::Key::F8), None));
        feed(raw(rdev::EventType::KeyPress(rdev::Key::KeyA), Some("a")));
        feed(raw(rdev::EventType::KeyRelease(rdev::Key::KeyA), None));

        assert_eq!(presses.load(Ordering::SeqCst), 1);
        let events = captured.lock().clone();
        assert_eq!(
            events,
            vec![
                EventKind::KeyChange { key: KeyToken::Char('a'), down: true },
                EventKind::KeyChange { key: KeyToken::Char('a'), down: false },
            ]
        );
    }

    #[test]
    fn installs_are_rejected_after_the_listener_dies() {
        let registry: &'static Registry = Box::leak(Box::new(Registry::new()));
        *registry.failure.lock() = Some("capture permission revoked".into());
        let hooks = RdevHooks { registry };

        let err = hooks.install_capture(Box::new(|_| {})).unwrap_err();
        assert!(matches!(err, Error::HookInstall(_)));
        assert!(registry.capture.lock().is_none());

        let err = hooks
            .install_hotkey(KeyToken::named("f8"), Box::new(|| {}))
            .unwrap_err();
        assert!(matches!(err, Error::HookInstall(_)));
        assert!(registry.hotkey.lock().is_none());
    }

    #[test]
    fn non_relay_keys_pass_through_while_relay_installed() {
        let registry = Registry::new();
        *registry.hotkey.lock() = Some(HotkeyEntry {
            key: rdev::Key::F8,
            on_press: Arc::new(|| {}),
        });
        let captured: Arc<Mutex<Vec<EventKind>>> = Arc::new(Mutex::new(Vec::new()));
        let sink_log = Arc::clone(&captured);
        *registry.capture.lock() = Some(Arc::new(move |kind| {
            sink_log.lock().push(kind);
        }));

        let mut last_pos = (0, 0);
        let mut held = HashMap::new();
        let mut swallow = None;
        handle_event(
            &registry,
            &raw(rdev::EventType::KeyPress(rdev::Key::F9), None),
            &mut last_pos,
            &mut held,
            &mut swallow,
        );
        assert_eq!(
            captured.lock().clone(),
            vec![EventKind::KeyChange { key: KeyToken::named("f9"), down: true }]
        );
    }
}
