//! 6532 timer and port registers.
//!
//! The timer counts down once per `interval` CPU cycles (1, 8, 64 or 1024
//! depending on which of TIM1T/TIM8T/TIM64T/T1024T was written). On
//! underflow it wraps to $FF, raises the TIMINT flag and free-runs at one
//! decrement per cycle until INTIM is read, which restores the programmed
//! interval.

use serde::{Deserialize, Serialize};

use crate::input::InputState;

#[derive(Clone, Serialize, Deserialize)]
pub struct Riot {
    intim: u8,
    interval: u32,
    prescaler: u32,
    underflow: bool,
    swacnt: u8,
    swbcnt: u8,
    input: InputState,
}

impl Riot {
    pub fn new() -> Self {
        Riot {
            intim: 0,
            interval: 1024,
            prescaler: 1024,
            underflow: false,
            swacnt: 0,
            swbcnt: 0,
            input: InputState::default(),
        }
    }

    pub fn set_input(&mut self, input: InputState) {
        self.input = input;
    }

    /// Advance one CPU cycle.
    pub fn step_cycle(&mut self) {
        self.prescaler -= 1;
        if self.prescaler > 0 {
            return;
        }
        if self.intim == 0 {
            self.intim = 0xFF;
            self.underflow = true;
        } else {
            self.intim -= 1;
        }
        self.prescaler = if self.underflow { 1 } else { self.interval };
    }

    /// Register read, `addr` already reduced to the RIOT I/O page.
    pub fn read(&mut self, addr: u16) -> u8 {
        // A2 selects the timer block; within it A0 picks INTIM/TIMINT.
        if addr & 0x04 != 0 {
            if addr & 0x01 == 0 {
                // INTIM: reading ends free-run mode and re-arms the
                // programmed interval.
                if self.underflow {
                    self.underflow = false;
                    self.prescaler = self.interval;
                }
                self.intim
            } else {
                // TIMINT: underflow flag in bit 7.
                if self.underflow { 0x80 } else { 0x00 }
            }
        } else {
            match addr & 0x03 {
                0x00 => {
                    // Port A: input lines come from the joysticks, lines
                    // configured as outputs read their latch (high after
                    // reset, never driven on the console).
                    (self.input.swcha() & !self.swacnt) | self.swacnt
                }
                0x01 => self.swacnt,
                0x02 => self.input.swchb(),
                _ => self.swbcnt,
            }
        }
    }

    /// Register write, `addr` already reduced to the RIOT I/O page.
    pub fn write(&mut self, addr: u16, value: u8) {
        // A4 + A2 select the timer write registers ($294-$297).
        if addr & 0x14 == 0x14 {
            self.interval = match addr & 0x03 {
                0x00 => 1,
                0x01 => 8,
                0x02 => 64,
                _ => 1024,
            };
            self.intim = value;
            self.prescaler = self.interval;
            self.underflow = false;
        } else if addr & 0x04 == 0 {
            match addr & 0x03 {
                0x01 => self.swacnt = value,
                0x03 => self.swbcnt = value,
                // Port output registers: both ports are wired as inputs on
                // the console, writes have no observable effect.
                _ => {}
            }
        }
        // A2 set with A4 clear is the interrupt-enable block ($284-$287),
        // which the console never uses: ignore it so timer-page mirrors
        // cannot clobber the port direction registers.
    }
}

impl Default for Riot {
    fn default() -> Self {
        Riot::new()
    }
}
