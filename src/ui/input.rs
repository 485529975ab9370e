/// Keyboard state tracker.
///
/// The loop needs two views of the keyboard each tick:
///   - held keys, for bound actions that repeat while down (walk, jump, hide)
///   - fresh presses, for menu navigation
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Without it, a key counts as released once no Press/Repeat event has
/// arrived for `HOLD_TIMEOUT`.
///
/// The gamepad feeds the same vocabulary through `merge_virtual()`, so the
/// rest of the loop never asks which device a key came from.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

/// Menu navigation auto-repeat: first repeat after the delay, then one per interval.
const REPEAT_DELAY: Duration = Duration::from_millis(199);
const REPEAT_INTERVAL: Duration = Duration::from_millis(69);

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Keys that went from released to held during the last drain.
    fresh_presses: Vec<KeyCode>,

    /// Keys held by a virtual device (gamepad) for this frame only.
    virtual_held: Vec<KeyCode>,

    /// Raw key events collected during drain.
    raw_events: Vec<KeyEvent>,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            virtual_held: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.virtual_held.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.record(key, Instant::now());
            }
        }

        let now = Instant::now();
        self.expire(now);
    }

    /// Fold gamepad state into this frame.
    /// Held keys last one frame; presses count as fresh presses.
    pub fn merge_virtual(&mut self, held: &[KeyCode], pressed: &[KeyCode]) {
        for &code in held {
            if !self.virtual_held.contains(&code) {
                self.virtual_held.push(code);
            }
        }
        for &code in pressed {
            if !self.fresh_presses.contains(&code) {
                self.fresh_presses.push(code);
            }
        }
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.is_held_at(code, Instant::now()) || self.virtual_held.contains(&code)
    }

    /// Convenience: is any of these keys held?
    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? (edge trigger)
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    /// Convenience: was any of these keys freshly pressed?
    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    /// Check if any raw event this frame has Ctrl+C.
    /// Raw mode swallows SIGINT, so this is the terminal's window-close.
    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && (k.code == KeyCode::Char('c') || k.code == KeyCode::Char('C'))
        })
    }

    // ── Internal ──

    fn record(&mut self, key: KeyEvent, now: Instant) {
        self.raw_events.push(key);
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            // Without enhancement, rely on timeout-based expiry instead
            KeyEventKind::Release => {}
            _ => {
                let was_held = self.is_held_at(key.code, now);
                self.last_active.insert(key.code, now);
                if !was_held {
                    self.fresh_presses.push(key.code);
                }
            }
        }
    }

    fn expire(&mut self, now: Instant) {
        if self.honor_release {
            return;
        }
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    fn is_held_at(&self, code: KeyCode, now: Instant) -> bool {
        self.last_active.get(&code)
            .map(|t| self.honor_release || now.saturating_duration_since(*t) < HOLD_TIMEOUT)
            .unwrap_or(false)
    }
}

// ── Auto-repeat ──

/// Turns a held key into a press now and then a steady stream of repeats,
/// independent of the terminal's own repeat rate.
#[derive(Debug, Default)]
pub struct KeyRepeat {
    /// Key being repeated and when it fires next.
    active: Option<(KeyCode, Instant)>,
}

impl KeyRepeat {
    pub fn new() -> Self {
        Self::default()
    }

    /// The first of `keys` that is down, if it should fire at `now`.
    pub fn poll(&mut self, kb: &InputState, keys: &[KeyCode], now: Instant) -> Option<KeyCode> {
        let Some(&key) = keys.iter().find(|&&k| kb.was_pressed(k) || kb.is_held(k)) else {
            self.active = None;
            return None;
        };

        match self.active {
            Some((k, next)) if k == key && !kb.was_pressed(key) => {
                if now < next {
                    return None;
                }
                self.active = Some((key, now + REPEAT_INTERVAL));
            }
            _ => self.active = Some((key, now + REPEAT_DELAY)),
        }
        Some(key)
    }
}
