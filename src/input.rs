//! Input state polled by the core once per system step.
//!
//! The VCS wires all player-facing lines as inputs: two digital joysticks
//! (read through RIOT port A and TIA INPT4/INPT5), up to four paddles (TIA
//! INPT0–INPT3, analog charge timing), and the console switches (RIOT port
//! B). The host fills this structure; the core never initiates input reads.

use serde::{Deserialize, Serialize};

/// One digital joystick: four directions plus the fire button.
#[derive(Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Joystick {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub fire: bool,
}

/// Console front-panel switches. `true` = engaged (Reset/Select pressed,
/// color mode on, difficulty on "A"/pro).
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Switches {
    pub reset: bool,
    pub select: bool,
    pub color: bool,
    /// Left (0) and right (1) difficulty switches.
    pub difficulty: [bool; 2],
}

impl Default for Switches {
    fn default() -> Self {
        Switches {
            reset: false,
            select: false,
            color: true,
            difficulty: [false; 2],
        }
    }
}

/// Full input snapshot supplied by the host each step.
#[derive(Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputState {
    pub joysticks: [Joystick; 2],
    /// Paddle positions, 0 (full counter-clockwise) to 255. The TIA derives
    /// its INPT0–INPT3 charge time from these.
    pub paddles: [u8; 4],
    pub switches: Switches,
}

impl InputState {
    /// RIOT port A value (SWCHA): joystick directions, active low.
    /// Bits 7–4 = player 0 right/left/down/up, bits 3–0 = player 1.
    pub fn swcha(&self) -> u8 {
        let mut value = 0xFF;
        let bits = [
            (self.joysticks[0].right, 0x80),
            (self.joysticks[0].left, 0x40),
            (self.joysticks[0].down, 0x20),
            (self.joysticks[0].up, 0x10),
            (self.joysticks[1].right, 0x08),
            (self.joysticks[1].left, 0x04),
            (self.joysticks[1].down, 0x02),
            (self.joysticks[1].up, 0x01),
        ];
        for (pressed, mask) in bits {
            if pressed {
                value &= !mask;
            }
        }
        value
    }

    /// RIOT port B value (SWCHB): console switches. Reset (bit 0) and
    /// Select (bit 1) are active low; Color (bit 3) is high for color;
    /// difficulty switches (bits 6–7) are high for "A".
    pub fn swchb(&self) -> u8 {
        let mut value = 0b0011_0100; // unused bits read high-ish, B/W off
        if !self.switches.reset {
            value |= 0x01;
        }
        if !self.switches.select {
            value |= 0x02;
        }
        if self.switches.color {
            value |= 0x08;
        }
        if self.switches.difficulty[0] {
            value |= 0x40;
        }
        if self.switches.difficulty[1] {
            value |= 0x80;
        }
        value
    }

    /// TIA INPT4/INPT5 fire-button level for the given player: bit 7 clear
    /// while the button is held (active low).
    pub fn fire(&self, player: usize) -> bool {
        self.joysticks[player].fire
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swcha_idle_reads_all_high() {
        assert_eq!(InputState::default().swcha(), 0xFF);
    }

    #[test]
    fn swcha_directions_pull_low() {
        let mut input = InputState::default();
        input.joysticks[0].up = true;
        input.joysticks[1].right = true;
        assert_eq!(input.swcha(), 0xFF & !0x10 & !0x08);
    }

    #[test]
    fn swchb_reset_is_active_low() {
        let mut input = InputState::default();
        assert_eq!(input.swchb() & 0x01, 0x01);
        input.switches.reset = true;
        assert_eq!(input.swchb() & 0x01, 0x00);
    }

    #[test]
    fn swchb_difficulty_bits() {
        let mut input = InputState::default();
        input.switches.difficulty = [true, false];
        let value = input.swchb();
        assert_eq!(value & 0x40, 0x40);
        assert_eq!(value & 0x80, 0x00);
    }
}
