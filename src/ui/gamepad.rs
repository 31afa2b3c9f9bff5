/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick up    →  Jump (and fly up), Confirm
///   D-pad / Left Stick down  →  Descend (fly down)
///   D-pad / Left Stick ←/→   →  Previous / next level on the menu
///   A / B                    →  Jump
///   X                        →  Descend
///   Start / A                →  Confirm
///   Select                   →  Quit

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;

#[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
const STICK_DEADZONE: f32 = 0.25;

/// Face, shoulder and menu buttons that config.toml can name.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Btn {
    A,
    B,
    X,
    Y,
    L1,
    R1,
    L2,
    R2,
    Start,
    Select,
}

const BTN_COUNT: usize = 10;

/// Accepted spellings in config.toml, upper-cased.
const BTN_NAMES: &[(&str, Btn)] = &[
    ("A", Btn::A), ("SOUTH", Btn::A),
    ("B", Btn::B), ("EAST", Btn::B),
    ("X", Btn::X), ("WEST", Btn::X),
    ("Y", Btn::Y), ("NORTH", Btn::Y),
    ("L1", Btn::L1), ("LB", Btn::L1),
    ("R1", Btn::R1), ("RB", Btn::R1),
    ("L2", Btn::L2), ("LT", Btn::L2),
    ("R2", Btn::R2), ("RT", Btn::R2),
    ("START", Btn::Start),
    ("SELECT", Btn::Select), ("BACK", Btn::Select),
];

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        let key = s.trim().to_ascii_uppercase();
        BTN_NAMES.iter().find(|(name, _)| *name == key).map(|&(_, b)| b)
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        Some(match btn {
            Button::South => Btn::A,
            Button::East => Btn::B,
            Button::West => Btn::X,
            Button::North => Btn::Y,
            Button::LeftTrigger => Btn::L1,
            Button::RightTrigger => Btn::R1,
            Button::LeftTrigger2 => Btn::L2,
            Button::RightTrigger2 => Btn::R2,
            Button::Start => Btn::Start,
            Button::Select => Btn::Select,
            _ => return None,
        })
    }
}

/// Directions shared by the d-pad and the digitized left stick.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Dir {
    Up,
    Down,
    Left,
    Right,
}

/// Held level plus a "went down since the last update" edge.
/// A press and release inside one poll leaves `held == false` with the edge set.
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

/// Action-to-button mapping (loaded from config).
#[derive(Debug, PartialEq)]
struct ActionMap {
    jump: Vec<Btn>,
    descend: Vec<Btn>,
    confirm: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            jump:    vec![Btn::A, Btn::B],
            descend: vec![Btn::X],
            confirm: vec![Btn::Start, Btn::A],
            quit:    vec![Btn::Select],
        }
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: [BtnState; BTN_COUNT],
    dpad: [BtnState; 4],
    stick: [BtnState; 4],
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

impl GamepadState {
    pub fn new() -> Self {
        #[allow(unused_mut)]
        let mut gp = Self::detached();

        #[cfg(feature = "gamepad")]
        match Gilrs::new() {
            Ok(g) => {
                gp.connected = g.gamepads().next().is_some();
                gp.gilrs = Some(g);
            }
            Err(e) => log::warn!("gamepad support unavailable: {e}"),
        }

        gp
    }

    /// A tracker with no device backend: every query reads false until
    /// buttons are fed in.
    pub(crate) fn detached() -> Self {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: None,
            buttons: [BtnState::default(); BTN_COUNT],
            dpad: [BtnState::default(); 4],
            stick: [BtnState::default(); 4],
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected: false,
        }
    }

    /// Load button mapping from config. Empty or unrecognised lists keep the default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        fn apply(slot: &mut Vec<Btn>, names: &[String]) {
            let parsed: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if !parsed.is_empty() {
                *slot = parsed;
            }
        }
        let map = &mut self.action_map;
        apply(&mut map.jump, &cfg.jump);
        apply(&mut map.descend, &cfg.descend);
        apply(&mut map.confirm, &cfg.confirm);
        apply(&mut map.quit, &cfg.quit);
    }

    /// Start a new frame: drop last frame's edges, then read the device.
    pub fn update(&mut self) {
        for s in self.states_mut() {
            s.just_pressed = false;
        }

        #[cfg(feature = "gamepad")]
        self.poll_gilrs();
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
                    match axis {
                        Axis::LeftStickX => self.stick_x = value,
                        Axis::LeftStickY => self.stick_y = value,
                        _ => {}
                    }
                }
                EventType::Connected => {
                    log::info!("gamepad connected");
                    self.connected = true;
                }
                EventType::Disconnected => {
                    log::info!("gamepad disconnected");
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
        let dir = match gilrs_btn {
            Button::DPadUp => Dir::Up,
            Button::DPadDown => Dir::Down,
            Button::DPadLeft => Dir::Left,
            Button::DPadRight => Dir::Right,
            other => {
                if let Some(btn) = Btn::from_gilrs(other) {
                    self.press(btn, held);
                }
                return;
            }
        };
        self.dpad[dir as usize].set(held);
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    pub(crate) fn press(&mut self, btn: Btn, held: bool) {
        self.buttons[btn as usize].set(held);
    }

    /// Turn the analog stick into four digital directions.
    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn derive_stick(&mut self) {
        let (x, y) = (self.stick_x, self.stick_y);
        self.stick[Dir::Up as usize].set(y > STICK_DEADZONE);
        self.stick[Dir::Down as usize].set(y < -STICK_DEADZONE);
        self.stick[Dir::Left as usize].set(x < -STICK_DEADZONE);
        self.stick[Dir::Right as usize].set(x > STICK_DEADZONE);
    }

    // ── Action queries (config-driven) ──

    fn dir_held(&self, d: Dir) -> bool {
        self.dpad[d as usize].held || self.stick[d as usize].held
    }

    fn dir_pressed(&self, d: Dir) -> bool {
        self.dpad[d as usize].just_pressed || self.stick[d as usize].just_pressed
    }

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].held)
    }

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[b as usize].just_pressed)
    }

    pub fn jump_held(&self) -> bool {
        self.dir_held(Dir::Up) || self.any_held(&self.action_map.jump)
    }
    pub fn jump_pressed(&self) -> bool {
        self.dir_pressed(Dir::Up) || self.any_just_pressed(&self.action_map.jump)
    }
    pub fn descend_held(&self) -> bool {
        self.dir_held(Dir::Down) || self.any_held(&self.action_map.descend)
    }
    pub fn descend_pressed(&self) -> bool {
        self.dir_pressed(Dir::Down) || self.any_just_pressed(&self.action_map.descend)
    }

    pub fn confirm_pressed(&self) -> bool {
        self.dir_pressed(Dir::Up) || self.any_just_pressed(&self.action_map.confirm)
    }
    pub fn quit_pressed(&self) -> bool {
        self.any_just_pressed(&self.action_map.quit)
    }
    pub fn prev_pressed(&self) -> bool {
        self.dir_pressed(Dir::Left)
    }
    pub fn next_pressed(&self) -> bool {
        self.dir_pressed(Dir::Right)
    }

    // ── Internal ──

    fn states_mut(&mut self) -> impl Iterator<Item = &mut BtnState> {
        self.buttons.iter_mut().chain(&mut self.dpad).chain(&mut self.stick)
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for s in self.states_mut() {
            *s = BtnState::default();
        }
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn button_names_parse() {
        assert_eq!(Btn::from_name("a"), Some(Btn::A));
        assert_eq!(Btn::from_name("South"), Some(Btn::A));
        assert_eq!(Btn::from_name(" back "), Some(Btn::Select));
        assert_eq!(Btn::from_name("RT"), Some(Btn::R2));
        assert_eq!(Btn::from_name("Turbo"), None);
    }

    #[test]
    fn config_overrides_and_fallbacks() {
        let mut gp = GamepadState::detached();
        gp.load_button_config(&GamepadConfig {
            jump: vec!["Y".into()],
            descend: vec!["bogus".into()],
            confirm: vec![],
            quit: vec!["Start".into(), "Select".into()],
        });
        assert_eq!(gp.action_map.jump, vec![Btn::Y]);
        assert_eq!(gp.action_map.descend, vec![Btn::X]);
        assert_eq!(gp.action_map.confirm, vec![Btn::Start, Btn::A]);
        assert_eq!(gp.action_map.quit, vec![Btn::Start, Btn::Select]);
    }

    #[test]
    fn held_vs_pressed() {
        let mut gp = GamepadState::detached();
        gp.press(Btn::A, true);
        assert!(gp.jump_held());
        assert!(gp.jump_pressed());
        assert!(gp.confirm_pressed());

        gp.update();
        assert!(gp.jump_held());
        assert!(!gp.jump_pressed());
        assert!(!gp.confirm_pressed());

        gp.press(Btn::A, false);
        assert!(!gp.jump_held());
    }

    #[test]
    fn tap_within_one_poll_still_counts() {
        let mut gp = GamepadState::detached();
        gp.press(Btn::A, true);
        gp.press(Btn::A, false);
        assert!(!gp.jump_held());
        assert!(gp.jump_pressed());
        assert!(gp.confirm_pressed());

        gp.press(Btn::X, true);
        gp.press(Btn::X, false);
        assert!(!gp.descend_held());
        assert!(gp.descend_pressed());

        gp.update();
        assert!(!gp.jump_pressed());
        assert!(!gp.descend_pressed());
    }

    #[test]
    fn stick_directions_edge_once() {
        let mut gp = GamepadState::detached();
        gp.stick_x = 0.9;
        gp.derive_stick();
        assert!(gp.next_pressed());
        assert!(!gp.prev_pressed());

        gp.update();
        gp.derive_stick();
        assert!(!gp.next_pressed());

        gp.stick_y = -0.8;
        gp.derive_stick();
        assert!(gp.descend_held());
        assert!(gp.descend_pressed());
    }

    #[test]
    fn stick_up_jumps_and_confirms() {
        let mut gp = GamepadState::detached();
        gp.stick_y = 0.7;
        gp.derive_stick();
        assert!(gp.jump_held());
        assert!(gp.confirm_pressed());

        gp.update();
        gp.derive_stick();
        assert!(gp.jump_held());
        assert!(!gp.confirm_pressed());
    }

    #[test]
    fn release_all_clears_everything() {
        let mut gp = GamepadState::detached();
        gp.press(Btn::B, true);
        gp.stick_x = -1.0;
        gp.derive_stick();
        gp.release_all();
        assert!(!gp.jump_held());
        assert!(!gp.prev_pressed());
        assert_eq!(gp.stick_x, 0.0);
    }
}
