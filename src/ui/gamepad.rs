/// Gamepad input tracker using gilrs.
///
/// Button mapping is loaded from config.toml via `load_button_config()`.
/// Default mapping:
///   D-pad / Left Stick    →  Movement
///   A / X                 →  Jump
///   Start                 →  Confirm / Restart
///
/// Built without the `gamepad` feature, this compiles to an inert stub.

use std::collections::HashMap;

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
    Start,
    Select,
}

impl Btn {
    fn from_name(s: &str) -> Option<Btn> {
        match s.to_uppercase().as_str() {
            "A" | "SOUTH" => Some(Btn::A),
            "B" | "EAST" => Some(Btn::B),
            "X" | "WEST" => Some(Btn::X),
            "Y" | "NORTH" => Some(Btn::Y),
            "L1" | "LB" | "LEFTTRIGGER" => Some(Btn::L1),
            "R1" | "RB" | "RIGHTTRIGGER" => Some(Btn::R1),
            "START" => Some(Btn::Start),
            "SELECT" | "BACK" => Some(Btn::Select),
            _ => None,
        }
    }

    #[cfg(feature = "gamepad")]
    fn from_gilrs(btn: Button) -> Option<Btn> {
        match btn {
            Button::South => Some(Btn::A),
            Button::East => Some(Btn::B),
            Button::West => Some(Btn::X),
            Button::North => Some(Btn::Y),
            Button::LeftTrigger => Some(Btn::L1),
            Button::RightTrigger => Some(Btn::R1),
            Button::Start => Some(Btn::Start),
            Button::Select => Some(Btn::Select),
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

pub struct GamepadState {
    #[cfg(feature = "gamepad")]
    gilrs: Option<Gilrs>,

    buttons: HashMap<Btn, BtnState>,
    stick_x: f32,
    stick_y: f32,
    dpad_left: bool,
    dpad_right: bool,
    dpad_up: bool,
    dpad_down: bool,

    jump_btns: Vec<Btn>,
    confirm_btns: Vec<Btn>,
    restart_btns: Vec<Btn>,
}

impl GamepadState {
    pub fn new() -> Self {
        GamepadState {
            #[cfg(feature = "gamepad")]
            gilrs: Gilrs::new().ok(),
            buttons: HashMap::new(),
            stick_x: 0.0,
            stick_y: 0.0,
            dpad_left: false,
            dpad_right: false,
            dpad_up: false,
            dpad_down: false,
            jump_btns: vec![Btn::A, Btn::X],
            confirm_btns: vec![Btn::Start],
            restart_btns: vec![Btn::Start],
        }
    }

    /// Apply button names from config, ignoring unknown names.
    pub fn load_button_config(&mut self, config: &GamepadConfig) {
        let parse = |names: &[String], fallback: &[Btn]| {
            let btns: Vec<Btn> = names.iter().filter_map(|n| Btn::from_name(n)).collect();
            if btns.is_empty() { fallback.to_vec() } else { btns }
        };
        self.jump_btns = parse(&config.jump, &[Btn::A, Btn::X]);
        self.confirm_btns = parse(&config.confirm, &[Btn::Start]);
        self.restart_btns = parse(&config.restart, &[Btn::Start]);
    }

    /// Drain pad events. Call once per frame before the simulation tick.
    #[cfg(feature = "gamepad")]
    pub fn update(&mut self) {
        for state in self.buttons.values_mut() {
            state.just_pressed = false;
        }
        let gilrs = match self.gilrs.as_mut() {
            Some(g) => g,
            None => return,
        };
        while let Some(ev) = gilrs.next_event() {
            match ev.event {
                EventType::ButtonPressed(button, _) => {
                    match button {
                        Button::DPadLeft => self.dpad_left = true,
                        Button::DPadRight => self.dpad_right = true,
                        Button::DPadUp => self.dpad_up = true,
                        Button::DPadDown => self.dpad_down = true,
                        _ => {
                            if let Some(btn) = Btn::from_gilrs(button) {
                                let state = self.buttons.entry(btn).or_default();
                                if !state.held {
                                    state.just_pressed = true;
                                }
                                state.held = true;
                            }
                        }
                    }
                }
                EventType::ButtonReleased(button, _) => {
                    match button {
                        Button::DPadLeft => self.dpad_left = false,
                        Button::DPadRight => self.dpad_right = false,
                        Button::DPadUp => self.dpad_up = false,
                        Button::DPadDown => self.dpad_down = false,
                        _ => {
                            if let Some(btn) = Btn::from_gilrs(button) {
                                self.buttons.entry(btn).or_default().held = false;
                            }
                        }
                    }
                }
                EventType::AxisChanged(axis, value, _) => match axis {
                    Axis::LeftStickX => self.stick_x = value,
                    Axis::LeftStickY => self.stick_y = value,
                    _ => {}
                },
                _ => {}
            }
        }
    }

    #[cfg(not(feature = "gamepad"))]
    pub fn update(&mut self) {}

    // ── Queries ──

    pub fn left_held(&self) -> bool {
        self.dpad_left || self.stick_x < -STICK_DEADZONE
    }

    pub fn right_held(&self) -> bool {
        self.dpad_right || self.stick_x > STICK_DEADZONE
    }

    pub fn up_held(&self) -> bool {
        self.dpad_up || self.stick_y > STICK_DEADZONE
    }

    pub fn down_held(&self) -> bool {
        self.dpad_down || self.stick_y < -STICK_DEADZONE
    }

    pub fn jump_held(&self) -> bool {
        self.any_held(&self.jump_btns)
    }

    pub fn confirm_pressed(&self) -> bool {
        self.any_pressed(&self.confirm_btns)
    }

    pub fn restart_pressed(&self) -> bool {
        self.any_pressed(&self.restart_btns)
    }

    // ── Internal ──

    fn any_held(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|b| self.buttons.get(b).map_or(false, |s| s.held))
    }

    fn any_pressed(&self, btns: &[Btn]) -> bool {
        btns.iter().any(|b| self.buttons.get(b).map_or(false, |s| s.just_pressed))
    }
}
