/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Movement
///   A                     →  Use held item
///   X                     →  Pick up
///   L2 / R2               →  Drop / Stow
///   R1                    →  Cycle backpack
///   Y                     →  Open / close chest
///   L1                    →  Flashlight on / off
///   Select                →  Backpack menu
///   Start                 →  Confirm / Restart

#[cfg(feature = "gamepad")]
use gilrs::{Axis, Button, EventType, Gilrs};

use crate::config::GamepadConfig;
use crate::sim::action::ActionSnapshot;

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

/// Action-to-button mapping (loaded from config).
#[derive(Debug, PartialEq)]
struct ActionMap {
    use_item: Vec<Btn>,
    pick_up: Vec<Btn>,
    drop: Vec<Btn>,
    stow: Vec<Btn>,
    cycle: Vec<Btn>,
    toggle_chest: Vec<Btn>,
    toggle_light: Vec<Btn>,
    menu: Vec<Btn>,
    confirm: Vec<Btn>,
    quit: Vec<Btn>,
}

impl Default for ActionMap {
    fn default() -> Self {
        ActionMap {
            use_item:     vec![Btn::A],
            pick_up:      vec![Btn::X],
            drop:         vec![Btn::L2],
            stow:         vec![Btn::R2],
            cycle:        vec![Btn::R1],
            toggle_chest: vec![Btn::Y],
            toggle_light: vec![Btn::L1],
            menu:         vec![Btn::Select],
            confirm:      vec![Btn::Start],
            quit:         vec![],
        }
    }
}

impl ActionMap {
    fn from_config(cfg: &GamepadConfig) -> Self {
        fn parse_into(slot: &mut Vec<Btn>, names: &[String]) {
            let btns: Vec<Btn> = names.iter().filter_map(|s| Btn::from_name(s)).collect();
            if !btns.is_empty() {
                *slot = btns;
            }
        }
        let mut map = ActionMap::default();
        parse_into(&mut map.use_item, &cfg.use_item);
        parse_into(&mut map.pick_up, &cfg.pick_up);
        parse_into(&mut map.drop, &cfg.drop);
        parse_into(&mut map.stow, &cfg.stow);
        parse_into(&mut map.cycle, &cfg.cycle);
        parse_into(&mut map.toggle_chest, &cfg.toggle_chest);
        parse_into(&mut map.toggle_light, &cfg.toggle_light);
        parse_into(&mut map.menu, &cfg.menu);
        parse_into(&mut map.confirm, &cfg.confirm);
        parse_into(&mut map.quit, &cfg.quit);
        map
    }
}

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    // All tracked buttons (indexed by Btn)
    buttons: [BtnState; 10],

    // D-pad
    dpad_up: BtnState,
    dpad_down: BtnState,
    dpad_left: BtnState,
    dpad_right: BtnState,

    // Stick
    stick_x: f32,
    stick_y: f32,

    action_map: ActionMap,

    pub connected: bool,
}

fn btn_index(btn: Btn) -> usize {
    btn as usize
}

impl GamepadState {
    pub fn new() -> Self {
        #[cfg(feature = "gamepad")]
        let (gilrs_opt, connected) = {
            match Gilrs::new() {
                Ok(g) => {
                    let has_pad = g.gamepads().next().is_some();
                    (Some(g), has_pad)
                }
                Err(_) => (None, false),
            }
        };
        #[cfg(not(feature = "gamepad"))]
        let connected = false;

        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: gilrs_opt,
            buttons: [BtnState::default(); 10],
            dpad_up: BtnState::default(),
            dpad_down: BtnState::default(),
            dpad_left: BtnState::default(),
            dpad_right: BtnState::default(),
            stick_x: 0.0,
            stick_y: 0.0,
            action_map: ActionMap::default(),
            connected,
        }
    }

    /// Load button mapping from config. Empty or unknown lists keep the default.
    pub fn load_button_config(&mut self, cfg: &GamepadConfig) {
        self.action_map = ActionMap::from_config(cfg);
    }

    pub fn update(&mut self) {
        self.clear_just_pressed();

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
                    self.set_button(btn, true, true);
                }
                EventType::ButtonReleased(btn, _) => {
                    self.connected = true;
                    self.set_button(btn, false, false);
                }
                EventType::AxisChanged(axis, value, _) => {
                    self.connected = true;
                    self.update_axis(axis, value);
                }
                EventType::Connected => { self.connected = true; }
                EventType::Disconnected => {
                    self.connected = false;
                    self.release_all();
                }
                _ => {}
            }
        }
    }

    #[cfg(feature = "gamepad")]
    fn set_button(&mut self, gilrs_btn: Button, held: bool, just_pressed: bool) {
        // D-pad handled separately (not in Btn enum)
        let pad = match gilrs_btn {
            Button::DPadUp    => Some(&mut self.dpad_up),
            Button::DPadDown  => Some(&mut self.dpad_down),
            Button::DPadLeft  => Some(&mut self.dpad_left),
            Button::DPadRight => Some(&mut self.dpad_right),
            _ => None,
        };
        if let Some(state) = pad {
            state.held = held;
            state.just_pressed |= just_pressed;
            return;
        }

        if let Some(btn) = Btn::from_gilrs(gilrs_btn) {
            let idx = btn_index(btn);
            self.buttons[idx].held = held;
            self.buttons[idx].just_pressed |= just_pressed;
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

    // ── Action queries (config-driven) ──

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].held)
    }

    fn any_just_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|&b| self.buttons[btn_index(b)].just_pressed)
    }

    /// Gamepad half of the action snapshot. The pad has no slot keys; the
    /// menu is driven by cycling.
    pub fn snapshot(&self) -> ActionSnapshot {
        let map = &self.action_map;
        ActionSnapshot {
            up: self.dpad_up.held || self.stick_y > STICK_DEADZONE,
            down: self.dpad_down.held || self.stick_y < -STICK_DEADZONE,
            left: self.dpad_left.held || self.stick_x < -STICK_DEADZONE,
            right: self.dpad_right.held || self.stick_x > STICK_DEADZONE,
            use_item: self.any_held(&map.use_item),
            cycle: self.any_held(&map.cycle),
            toggle_chest: self.any_held(&map.toggle_chest),
            toggle_light: self.any_held(&map.toggle_light),
            pick_up: self.any_just_pressed(&map.pick_up),
            drop: self.any_just_pressed(&map.drop),
            stow: self.any_just_pressed(&map.stow),
            toggle_menu: self.any_just_pressed(&map.menu),
            confirm: self.any_just_pressed(&map.confirm),
            quit: self.any_just_pressed(&map.quit),
            select: None,
            click: None,
        }
    }

    // ── Internal ──

    fn clear_just_pressed(&mut self) {
        for b in &mut self.buttons { b.just_pressed = false; }
        self.dpad_up.just_pressed = false;
        self.dpad_down.just_pressed = false;
        self.dpad_left.just_pressed = false;
        self.dpad_right.just_pressed = false;
    }

    #[cfg_attr(not(feature = "gamepad"), allow(dead_code))]
    fn release_all(&mut self) {
        for b in &mut self.buttons { *b = BtnState::default(); }
        self.dpad_up = BtnState::default();
        self.dpad_down = BtnState::default();
        self.dpad_left = BtnState::default();
        self.dpad_right = BtnState::default();
        self.stick_x = 0.0;
        self.stick_y = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_overrides_only_known_non_empty_lists() {
        let mut cfg = crate::config::GameConfig::default().gamepad;
        cfg.use_item = vec!["b".into()];
        cfg.pick_up = vec!["nonsense".into()];
        let map = ActionMap::from_config(&cfg);
        assert_eq!(map.use_item, vec![Btn::B]);
        assert_eq!(map.pick_up, vec![Btn::X]);
    }

    #[test]
    fn pressed_button_maps_to_edge_and_held() {
        let mut pad = GamepadState::new();
        pad.buttons[btn_index(Btn::A)] = BtnState { held: true, just_pressed: true };
        pad.buttons[btn_index(Btn::X)] = BtnState { held: true, just_pressed: true };
        pad.stick_x = -0.9;
        let a = pad.snapshot();
        assert!(a.use_item && a.pick_up && a.left);
        assert!(!a.right && !a.confirm);
    }
}
