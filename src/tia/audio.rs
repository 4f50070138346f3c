//! TIA audio: two independent tone channels built from small polynomial
//! counters, plus the ring buffer the core pushes mixed samples into.
//!
//! Each channel is clocked twice per scanline (color clock / 114, about
//! 31 440 Hz for NTSC) and produces a 4-bit level gated by its waveform
//! generator. The AUDC control value selects which combination of the 4-,
//! 5- and 9-bit polynomial counters and divide-by-N flip-flops drives the
//! output.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// One TIA sound channel (AUDC/AUDF/AUDV plus generator state).
#[derive(Clone, Serialize, Deserialize)]
pub struct AudioChannel {
    control: u8,
    freq: u8,
    volume: u8,
    divider: u8,
    poly4: u8,
    poly5: u8,
    poly9: u16,
    div_counter: u8,
    square: bool,
    output: bool,
}

impl AudioChannel {
    pub fn new() -> Self {
        AudioChannel {
            control: 0,
            freq: 0,
            volume: 0,
            divider: 0,
            // Polynomial counters must not start at zero or they lock up.
            poly4: 0x0F,
            poly5: 0x1F,
            poly9: 0x1FF,
            div_counter: 0,
            square: false,
            output: false,
        }
    }

    /// AUDC0/AUDC1: waveform select, low 4 bits.
    pub fn set_control(&mut self, value: u8) {
        self.control = value & 0x0F;
    }

    /// AUDF0/AUDF1: frequency divider, low 5 bits (divide by N+1).
    pub fn set_freq(&mut self, value: u8) {
        self.freq = value & 0x1F;
    }

    /// AUDV0/AUDV1: volume, low 4 bits.
    pub fn set_volume(&mut self, value: u8) {
        self.volume = value & 0x0F;
    }

    /// Advance the channel by one audio clock and return its output level
    /// (0-15).
    pub fn clock(&mut self) -> u8 {
        if self.divider == 0 {
            self.divider = self.freq;
            self.advance();
        } else {
            self.divider -= 1;
        }
        if self.output { self.volume } else { 0 }
    }

    fn clock_poly4(&mut self) -> bool {
        let feedback = ((self.poly4 >> 1) ^ self.poly4) & 1;
        self.poly4 = (self.poly4 >> 1) | (feedback << 3);
        self.poly4 & 1 != 0
    }

    fn clock_poly5(&mut self) -> bool {
        let feedback = ((self.poly5 >> 2) ^ self.poly5) & 1;
        self.poly5 = (self.poly5 >> 1) | (feedback << 4);
        self.poly5 & 1 != 0
    }

    fn clock_poly9(&mut self) -> bool {
        let feedback = ((self.poly9 >> 4) ^ self.poly9) & 1;
        self.poly9 = (self.poly9 >> 1) | (feedback << 8);
        self.poly9 & 1 != 0
    }

    /// One tick of the waveform generator proper, after the AUDF divider.
    fn advance(&mut self) {
        self.output = match self.control {
            // Constant level.
            0x0 | 0xB => true,
            // 4-bit polynomial noise.
            0x1 => self.clock_poly4(),
            // 4-bit polynomial clocked through a divide-by-15.
            0x2 => {
                self.div_counter = (self.div_counter + 1) % 15;
                if self.div_counter == 0 {
                    self.clock_poly4();
                }
                self.poly4 & 1 != 0
            }
            // 5-bit polynomial gates the 4-bit polynomial clock.
            0x3 => {
                if self.clock_poly5() {
                    self.clock_poly4();
                }
                self.poly4 & 1 != 0
            }
            // Pure tone, divide by 2.
            0x4 | 0x5 => {
                self.square = !self.square;
                self.square
            }
            // Divide by 31 (13 high, 18 low).
            0x6 | 0xA => {
                self.div_counter = (self.div_counter + 1) % 31;
                self.div_counter < 13
            }
            // 5-bit polynomial noise.
            0x7 | 0x9 => self.clock_poly5(),
            // 9-bit polynomial (white-ish noise).
            0x8 => self.clock_poly9(),
            // Low pure tone, divide by 6.
            0xC | 0xD => {
                self.div_counter = (self.div_counter + 1) % 3;
                if self.div_counter == 0 {
                    self.square = !self.square;
                }
                self.square
            }
            // Divide by 93 (31 * 3).
            0xE => {
                self.div_counter = (self.div_counter + 1) % 93;
                self.div_counter < 39
            }
            // 5-bit polynomial at one third rate.
            0xF => {
                self.div_counter = (self.div_counter + 1) % 3;
                if self.div_counter == 0 {
                    self.clock_poly5();
                }
                self.poly5 & 1 != 0
            }
            _ => unreachable!(),
        };
    }
}

impl Default for AudioChannel {
    fn default() -> Self {
        AudioChannel::new()
    }
}

/// Mix two channel levels (0-15 each) into a signed 16-bit PCM sample.
pub fn mix(ch0: u8, ch1: u8) -> i16 {
    // 0..=30 scaled to roughly +/-15k, centered.
    (((ch0 as i32 + ch1 as i32) << 10) - 15360) as i16
}

/// What to do when the host is not draining samples fast enough.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum OverflowPolicy {
    /// Discard the oldest sample to make room (default).
    DropOldest,
    /// Keep the buffer intact and surface an error from the console step.
    Fail,
}

/// Bounded FIFO of mixed PCM samples, produced by the TIA and drained by
/// the host. The core side never blocks.
#[derive(Clone)]
pub struct AudioRing {
    buf: VecDeque<i16>,
    capacity: usize,
    policy: OverflowPolicy,
    overflowed: bool,
    warned: bool,
}

impl AudioRing {
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        AudioRing {
            buf: VecDeque::with_capacity(capacity),
            capacity,
            policy,
            overflowed: false,
            warned: false,
        }
    }

    pub fn push(&mut self, sample: i16) {
        if self.buf.len() == self.capacity {
            match self.policy {
                OverflowPolicy::DropOldest => {
                    self.buf.pop_front();
                    if !self.warned {
                        log::warn!("audio ring full, dropping oldest samples");
                        self.warned = true;
                    }
                }
                OverflowPolicy::Fail => {
                    self.overflowed = true;
                    return;
                }
            }
        }
        self.buf.push_back(sample);
    }

    /// Move all buffered samples out, oldest first.
    pub fn drain(&mut self) -> Vec<i16> {
        self.warned = false;
        self.buf.drain(..).collect()
    }

    /// Returns and clears the overflow flag (only set under
    /// [`OverflowPolicy::Fail`]).
    pub fn take_overflow(&mut self) -> bool {
        std::mem::replace(&mut self.overflowed, false)
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

impl Default for AudioRing {
    fn default() -> Self {
        // Half a second of 31.4 kHz audio.
        AudioRing::new(16384, OverflowPolicy::DropOldest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_channel_outputs_zero() {
        let mut ch = AudioChannel::new();
        ch.set_control(0x4);
        ch.set_volume(0);
        for _ in 0..32 {
            assert_eq!(ch.clock(), 0);
        }
    }

    #[test]
    fn pure_tone_alternates_at_divider_rate() {
        let mut ch = AudioChannel::new();
        ch.set_control(0x4);
        ch.set_freq(0); // divide by 1: toggle every clock
        ch.set_volume(0x0F);
        let levels: Vec<u8> = (0..6).map(|_| ch.clock()).collect();
        assert_eq!(levels, vec![15, 0, 15, 0, 15, 0]);
    }

    #[test]
    fn freq_divider_stretches_the_period() {
        let mut ch = AudioChannel::new();
        ch.set_control(0x4);
        ch.set_freq(2); // divide by 3
        ch.set_volume(0x0F);
        let levels: Vec<u8> = (0..9).map(|_| ch.clock()).collect();
        assert_eq!(levels, vec![15, 15, 15, 0, 0, 0, 15, 15, 15]);
    }

    #[test]
    fn poly4_has_period_15() {
        let mut ch = AudioChannel::new();
        ch.set_control(0x1);
        ch.set_volume(0x0F);
        let first: Vec<u8> = (0..15).map(|_| ch.clock()).collect();
        let second: Vec<u8> = (0..15).map(|_| ch.clock()).collect();
        assert_eq!(first, second);
        assert!(first.iter().any(|&l| l == 0));
        assert!(first.iter().any(|&l| l == 15));
    }

    #[test]
    fn mix_is_centered() {
        assert_eq!(mix(0, 0), -15360);
        assert_eq!(mix(15, 15), 15360);
    }

    #[test]
    fn ring_drop_oldest_keeps_newest() {
        let mut ring = AudioRing::new(4, OverflowPolicy::DropOldest);
        for s in 0..6 {
            ring.push(s);
        }
        assert_eq!(ring.drain(), vec![2, 3, 4, 5]);
        assert!(!ring.take_overflow());
    }

    #[test]
    fn ring_fail_policy_sets_overflow() {
        let mut ring = AudioRing::new(2, OverflowPolicy::Fail);
        ring.push(1);
        ring.push(2);
        ring.push(3);
        assert!(ring.take_overflow());
        assert!(!ring.take_overflow());
        assert_eq!(ring.drain(), vec![1, 2]);
    }
}
