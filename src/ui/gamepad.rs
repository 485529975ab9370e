/// Gamepad input tracker using gilrs.
///
/// The pad is translated into the keyboard's vocabulary so menus and key
/// bindings never need to know it exists. Button mapping is loaded from
/// config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Arrow keys (walk, jump, hide, menu)
///   A / Start             →  Enter
///   B                     →  Escape
///   Select                →  q (quit)

use crossterm::event::KeyCode;
#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Logical button identifiers (one per physical button).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,       // South
    B,       // East
    X,       // West
    Y,       // North
    L1,      // LeftTrigger
    R1,      // RightTrigger
    L2,      // LeftTrigger2
    R2,      // RightTrigger2
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH"  => Some(Btn::A),
            "B" | "EAST"   => Some(Btn::B),
            "X" | "WEST"   => Some(Btn::X),
            "Y" | "NORTH"  => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER"  => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "L2" | "LT" | "LEFTTRIGGER2"  => Some(Btn::L2),
            "R2" | "RT" | "RIGHTTRIGGER2" => Some(Btn::R2),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South     => Some(Btn::A),
            Button::East      => Some(Btn::B),
            Button::West      => Some(Btn::X),
            Button::North     => Some(Btn::Y),
            Button::LeftTrigger  => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::LeftTrigger2  => Some(Btn::L2),
            Button::RightTrigger2 => Some(Btn::R2),
            Button::Start     => Some(Btn::Start),
            Button::Select    => Some(Btn::Select),
            _ => None,
        }
    }
}

/// Per-button state: held (continuous) and just_pressed (edge).
#[derive(Clone, Copy, Debug, Default)]
struct BtnState {
    held: bool,
    just_pressed: bool,
}

impl BtnState {
    fn set(&mut self, held: bool) {
        if held && !self.held {
            self.just_pressed = true;
        }
        self.held = held;
    }
}

/// Arrow directions, in `ARROWS` order.
const ARROWS: [KeyCode; 4] = [KeyCode::Up, KeyCode::Down, KeyCode::Left, KeyCode::Right];
const UP: usize = 0;
const DOWN: usize = 1;
const LEFT: usize = 2;
const RIGHT: usize = 3;

/// Key-to-button mapping (loaded from config).
struct ActionMap {
    confirm: Vec<Btn>,
    cancel: Vec<Btn>,
    quit: Vec<Btn>,
}

impl ActionMap {
    /// The key each button group stands in for.
    fn keys(&self) -> [(KeyCode, &[Btn]); 3] {
        [
            (KeyCode::Enter, self.confirm.as_slice()),
            (KeyCode::Esc, self.cancel.as_slice()),
            (KeyCode::Char('q'), self.quit.as_slice()),
        ]
    }
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            confirm: vec![Btn::A, Btn::Start],
            cancel:  vec![Btn::B],
            quit:    vec![Btn::Select],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // All tracked buttons (indexed by Btn)
    buttons: [BtnState; 10],

    // D-pad and stick, indexed UP/DOWN/LEFT/RIGHT
    dpad: [BtnState; 4],
    stick: [BtnState; 4],
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[allow(unused_mut)]
        let mut state = GamepadState::disconnected();

        #[cfg(feature = "gamepad")]
        match Gilrs::new() {
            Ok(g) => {
                state.connected = g.gamepads().next().is_some();
                if state.connected {
                    log::info!("Gamepad connected");
                }
                state.gilrs = Some(g);
            }
            Err(e) => log::warn!("Gamepad support unavailable: {e}"),
        }

        state
    }

    fn disconnected() -> Self {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            buttons: [BtnState::default(); 10],
            dpad: [BtnState::default(); 4],
            stick: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected: false,
        }
    }

    /// Load button mapping from config. Unknown names are skipped; a list
    /// with no valid names keeps the default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn parse_list(names: &[String]) -> Vec<Btn> {
            names.iter().filter_map(|s| Btn::from_name(s)).collect()
        }
        let map = &mut self.action_map;
        let cf = parse_list(&cfg.confirm);
        if !cf.is_empty() { map.confirm = cf; }
        let ca = parse_list(&cfg.cancel);
        if !ca.is_empty() { map.cancel = ca; }
        let qt = parse_list(&cfg.quit);
        if !qt.is_empty() { map.quit = qt; }
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
    }

    /// Keys this pad is holding and keys it pressed this frame.
    /// A disconnected pad contributes nothing.
    pub fn virtual_keys(&self) -> (Vec<KeyCode>, Vec<KeyCode>) {
        let mut held = vec![];
        let mut pressed = vec![];
        if !self.connected {
            return (held, pressed);
        }

        for (i, &key) in ARROWS.iter().enumerate() {
            let (d, s) = (self.dpad[i], self.stick[i]);
            if d.held || s.held { held.push(key); }
            if d.just_pressed || s.just_pressed { pressed.push(key); }
        }

        for (key, btns) in self.action_map.keys() {
            let states = btns.iter().map(|&b| self.buttons[btn_index(b)]);
            let (mut h, mut p) = (false, false);
            for st in states {
                h |= st.held;
                p |= st.just_pressed;
            }
            if h { held.push(key); }
            if p { pressed.push(key); }
        }

        (held, pressed)
    }

    #[cfg(feature = "gamepad")]
    fn poll_gilrs(&mut self) {
        let gilrs = match &mut self.gilrs {
            Some(g) => g,
            None => return,
        };

        let events: Vec<_> = std::iter::from_fn(|| gilrs.next_event()).collect();

        for event in events {
            match event.event {
                EventType::ButtonPressed(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    self.update_axis(axis, value);
                }
                EventType::Connected => {
                    log::info!("Gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("Gamepad disconnected");
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }

        self.derive_stick();
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool) {
        // D-pad handled separately (not in Btn enum)
        let dir = match gilrs_btn {
            Button::DPadUp    => Some(UP),
            Button::DPadDown  => Some(DOWN),
            Button::DPadLeft  => Some(LEFT),
            Button::DPadRight => Some(RIGHT),
            _ => None,
        };
        if let Some(i) = dir {
            self.dpad[i].set(held);
            return;
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            self.buttons[btn_index(btn)].set(held);
        }
    }

    #[cfg(feature = "gamepad")]
    fn update_axis(&mut self, axis: Axis, value: f32) {
        match axis {
            Axis::LeftStickX => self.stick_x = value,
            Axis::LeftStickY => self.stick_y = value,
            _ => {}
        }
    }

    /// Derive digital stick directions from the analog position.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn derive_stick(&mut self) {
        self.stick[LEFT].set(self.stick_x < -STICK_DEADZONE);
        self.stick[RIGHT].set(self.stick_x > STICK_DEADZONE);
        self.stick[UP].set(self.stick_y > STICK_DEADZONE);
        self.stick[DOWN].set(self.stick_y < -STICK_DEADZONE);
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick) {
            b.just_pressed = false;
        }
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        self.buttons = [BtnState::default(); 10];
        self.dpad = [BtnState::default(); 4];
        self.stick = [BtnState::default(); 4];
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plugged_in() -> GamepadState {
        let mut gp = GamepadState::disconnected();
        gp.connected = true;
        gp
    }

    #[test]
    fn idle_pad_emits_nothing() {
        let gp = GamepadState::disconnected();
        let (held, pressed) = gp.virtual_keys();
        assert!(held.is_empty() && pressed.is_empty());
    }

    #[test]
    fn dpad_maps_to_arrows() {
        let mut gp = plugged_in();
        gp.dpad[LEFT].set(true);
        let (held, pressed) = gp.virtual_keys();
        assert_eq!(held, vec![KeyCode::Left]);
        assert_eq!(pressed, vec![KeyCode::Left]);

        gp.clear_just_pressed();
        let (held, pressed) = gp.virtual_keys();
        assert_eq!(held, vec![KeyCode::Left]);
        assert!(pressed.is_empty());
    }

    #[test]
    fn stick_past_deadzone_walks() {
        let mut gp = plugged_in();
        gp.stick_x = 0.8;
        gp.stick_y = -0.1;
        gp.derive_stick();
        assert_eq!(gp.virtual_keys().0, vec![KeyCode::Right]);
    }

    #[test]
    fn default_buttons_map_to_keys() {
        let mut gp = plugged_in();
        gp.buttons[btn_index(Btn::Start)].set(true);
        gp.buttons[btn_index(Btn::Select)].set(true);
        let (held, pressed) = gp.virtual_keys();
        assert_eq!(held, vec![KeyCode::Enter, KeyCode::Char('q')]);
        assert_eq!(pressed, vec![KeyCode::Enter, KeyCode::Char('q')]);
    }

    #[test]
    fn config_overrides_buttons() {
        let mut gp = GamepadState::disconnected();
        gp.load_button_config(&GamepadConfig {
            confirm: vec!["x".into(), "bogus".into()],
            cancel: vec!["bogus".into()],
            quit: vec![],
        });
        assert_eq!(gp.action_map.confirm, vec![Btn::X]);
        assert_eq!(gp.action_map.cancel, vec![Btn::B]);
        assert_eq!(gp.action_map.quit, vec![Btn::Select]);
    }

    #[test]
    fn release_all_clears_held() {
        let mut gp = plugged_in();
        gp.dpad[UP].set(true);
        gp.buttons[btn_index(Btn::A)].set(true);
        gp.release_all();
        assert!(gp.virtual_keys().0.is_empty());
    }

    #[test]
    fn unplugged_pad_is_ignored() {
        let mut gp = GamepadState::disconnected();
        gp.dpad[RIGHT].set(true);
        gp.buttons[btn_index(Btn::A)].set(true);
        let (held, pressed) = gp.virtual_keys();
        assert!(held.is_empty() && pressed.is_empty());
    }
}
