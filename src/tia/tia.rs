//! TIA register file, object counters and pixel pipeline.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::input::InputState;
use crate::tia::audio::{mix, AudioChannel, AudioRing};

/// Visible pixels per scanline.
pub const FRAME_WIDTH: usize = 160;
/// Visible scanlines kept in the frame buffer (NTSC lines 40-231).
pub const FRAME_HEIGHT: usize = 192;

/// Color clocks per scanline (68 horizontal blank + 160 visible).
const CLOCKS_PER_LINE: u16 = 228;
/// First scanline stored in the frame buffer.
const FIRST_VISIBLE_LINE: u16 = 40;
/// Scanline count at which a frame is forced if the game never strobes
/// VSYNC, so a crashed program cannot wedge `run_frame`.
const RUNAWAY_LINES: u16 = 400;

// Collision latch bits (15 of them, read back two per register).
const CX_M0_P1: u16 = 1 << 0;
const CX_M0_P0: u16 = 1 << 1;
const CX_M1_P0: u16 = 1 << 2;
const CX_M1_P1: u16 = 1 << 3;
const CX_P0_PF: u16 = 1 << 4;
const CX_P0_BL: u16 = 1 << 5;
const CX_P1_PF: u16 = 1 << 6;
const CX_P1_BL: u16 = 1 << 7;
const CX_M0_PF: u16 = 1 << 8;
const CX_M0_BL: u16 = 1 << 9;
const CX_M1_PF: u16 = 1 << 10;
const CX_M1_BL: u16 = 1 << 11;
const CX_BL_PF: u16 = 1 << 12;
const CX_P0_P1: u16 = 1 << 13;
const CX_M0_M1: u16 = 1 << 14;

fn default_ring() -> AudioRing {
    AudioRing::default()
}

#[derive(Clone, Serialize, Deserialize)]
pub struct Tia {
    hcount: u16,
    scanline: u16,
    vsync: bool,
    vblank: u8,
    frame_ready: bool,
    /// Completed visible rows not yet handed to the host. A WSYNC-stalled
    /// instruction can finish two lines in one step, so this is a queue.
    line_ready: VecDeque<u16>,
    wsync: bool,

    colup0: u8,
    colup1: u8,
    colupf: u8,
    colubk: u8,

    pf0: u8,
    pf1: u8,
    pf2: u8,
    ctrlpf: u8,

    grp0_new: u8,
    grp0_old: u8,
    grp1_new: u8,
    grp1_old: u8,
    refp0: bool,
    refp1: bool,
    nusiz0: u8,
    nusiz1: u8,
    vdelp0: bool,
    vdelp1: bool,

    enam0: bool,
    enam1: bool,
    enabl_new: bool,
    enabl_old: bool,
    vdelbl: bool,
    resmp0: bool,
    resmp1: bool,

    pos_p0: u8,
    pos_p1: u8,
    pos_m0: u8,
    pos_m1: u8,
    pos_bl: u8,
    hmp0: i8,
    hmp1: i8,
    hmm0: i8,
    hmm1: i8,
    hmbl: i8,

    collisions: u16,

    input: InputState,
    paddle_counter: [u32; 4],
    inpt45_latched: [bool; 2],

    pub audio: [AudioChannel; 2],
    #[serde(skip, default = "default_ring")]
    pub audio_ring: AudioRing,

    framebuffer: Vec<u8>,
}

impl Tia {
    pub fn new() -> Self {
        Tia {
            hcount: 0,
            scanline: 0,
            vsync: false,
            vblank: 0,
            frame_ready: false,
            line_ready: VecDeque::new(),
            wsync: false,
            colup0: 0,
            colup1: 0,
            colupf: 0,
            colubk: 0,
            pf0: 0,
            pf1: 0,
            pf2: 0,
            ctrlpf: 0,
            grp0_new: 0,
            grp0_old: 0,
            grp1_new: 0,
            grp1_old: 0,
            refp0: false,
            refp1: false,
            nusiz0: 0,
            nusiz1: 0,
            vdelp0: false,
            vdelp1: false,
            enam0: false,
            enam1: false,
            enabl_new: false,
            enabl_old: false,
            vdelbl: false,
            resmp0: false,
            resmp1: false,
            pos_p0: 0,
            pos_p1: 0,
            pos_m0: 0,
            pos_m1: 0,
            pos_bl: 0,
            hmp0: 0,
            hmp1: 0,
            hmm0: 0,
            hmm1: 0,
            hmbl: 0,
            collisions: 0,
            input: InputState::default(),
            paddle_counter: [0; 4],
            inpt45_latched: [false; 2],
            audio: [AudioChannel::new(), AudioChannel::new()],
            audio_ring: AudioRing::default(),
            framebuffer: vec![0; FRAME_WIDTH * FRAME_HEIGHT],
        }
    }

    pub fn set_input(&mut self, input: InputState) {
        self.input = input;
    }

    /// The CPU is halted after a WSYNC write until the line ends.
    pub fn wsync_pending(&self) -> bool {
        self.wsync
    }

    /// Completed frame flag, cleared on read.
    pub fn take_frame_ready(&mut self) -> bool {
        std::mem::replace(&mut self.frame_ready, false)
    }

    /// Oldest completed visible row not yet taken.
    pub fn take_line_ready(&mut self) -> Option<u16> {
        self.line_ready.pop_front()
    }

    pub fn frame_buffer(&self) -> &[u8] {
        &self.framebuffer
    }

    /// Advance one color clock.
    pub fn step_clock(&mut self) {
        if self.hcount >= 68 {
            self.render_pixel(self.hcount - 68);
        }
        // Two audio clocks per 228-clock line gives the canonical
        // 31.4 kHz sample rate.
        if self.hcount == 8 || self.hcount == 122 {
            let s0 = self.audio[0].clock();
            let s1 = self.audio[1].clock();
            self.audio_ring.push(mix(s0, s1));
        }
        if self.vblank & 0x40 != 0 {
            for player in 0..2 {
                if self.input.fire(player) {
                    self.inpt45_latched[player] = true;
                }
            }
        }
        self.hcount += 1;
        if self.hcount == CLOCKS_PER_LINE {
            self.hcount = 0;
            self.end_of_line();
        }
    }

    fn end_of_line(&mut self) {
        self.wsync = false;
        if (FIRST_VISIBLE_LINE..FIRST_VISIBLE_LINE + FRAME_HEIGHT as u16)
            .contains(&self.scanline)
        {
            self.line_ready.push_back(self.scanline - FIRST_VISIBLE_LINE);
        }
        self.scanline += 1;
        if self.vblank & 0x80 == 0 {
            for counter in &mut self.paddle_counter {
                *counter += 1;
            }
        }
        if self.scanline >= RUNAWAY_LINES {
            log::debug!("no VSYNC after {RUNAWAY_LINES} scanlines, forcing frame");
            self.frame_ready = true;
            self.scanline = 0;
        }
    }

    fn render_pixel(&mut self, x: u16) {
        let grp0 = if self.vdelp0 { self.grp0_old } else { self.grp0_new };
        let grp1 = if self.vdelp1 { self.grp1_old } else { self.grp1_new };
        let enabl = if self.vdelbl { self.enabl_old } else { self.enabl_new };

        let p0 = player_pixel(grp0, self.pos_p0, self.refp0, self.nusiz0, x);
        let p1 = player_pixel(grp1, self.pos_p1, self.refp1, self.nusiz1, x);
        let m0 = !self.resmp0 && self.enam0 && missile_pixel(self.pos_m0, self.nusiz0, x);
        let m1 = !self.resmp1 && self.enam1 && missile_pixel(self.pos_m1, self.nusiz1, x);
        let bl = enabl && ball_pixel(self.pos_bl, self.ctrlpf, x);
        let pf = self.playfield_pixel(x);

        self.latch_collisions(p0, p1, m0, m1, bl, pf);

        let row = self.scanline.wrapping_sub(FIRST_VISIBLE_LINE);
        if row >= FRAME_HEIGHT as u16 {
            return;
        }
        let color = if self.vblank & 0x02 != 0 {
            0
        } else {
            self.pixel_color(p0, p1, m0, m1, bl, pf, x)
        };
        self.framebuffer[row as usize * FRAME_WIDTH + x as usize] = color;
    }

    fn pixel_color(&self, p0: bool, p1: bool, m0: bool, m1: bool, bl: bool, pf: bool, x: u16) -> u8 {
        let score_mode = self.ctrlpf & 0x02 != 0;
        let pf_color = if score_mode && pf {
            if x < 80 { self.colup0 } else { self.colup1 }
        } else {
            self.colupf
        };
        if self.ctrlpf & 0x04 != 0 {
            // Playfield/ball above the players.
            if pf {
                pf_color
            } else if bl {
                self.colupf
            } else if p0 || m0 {
                self.colup0
            } else if p1 || m1 {
                self.colup1
            } else {
                self.colubk
            }
        } else if p0 || m0 {
            self.colup0
        } else if p1 || m1 {
            self.colup1
        } else if pf {
            pf_color
        } else if bl {
            self.colupf
        } else {
            self.colubk
        }
    }

    fn latch_collisions(&mut self, p0: bool, p1: bool, m0: bool, m1: bool, bl: bool, pf: bool) {
        let pairs = [
            (m0 && p1, CX_M0_P1),
            (m0 && p0, CX_M0_P0),
            (m1 && p0, CX_M1_P0),
            (m1 && p1, CX_M1_P1),
            (p0 && pf, CX_P0_PF),
            (p0 && bl, CX_P0_BL),
            (p1 && pf, CX_P1_PF),
            (p1 && bl, CX_P1_BL),
            (m0 && pf, CX_M0_PF),
            (m0 && bl, CX_M0_BL),
            (m1 && pf, CX_M1_PF),
            (m1 && bl, CX_M1_BL),
            (bl && pf, CX_BL_PF),
            (p0 && p1, CX_P0_P1),
            (m0 && m1, CX_M0_M1),
        ];
        for (hit, bit) in pairs {
            if hit {
                self.collisions |= bit;
            }
        }
    }

    fn playfield_pixel(&self, x: u16) -> bool {
        let index = if x < 80 {
            x / 4
        } else if self.ctrlpf & 0x01 != 0 {
            (159 - x) / 4
        } else {
            (x - 80) / 4
        };
        match index {
            0..=3 => self.pf0 & (0x10 << index) != 0,
            4..=11 => self.pf1 & (0x80 >> (index - 4)) != 0,
            _ => self.pf2 & (0x01 << (index - 12)) != 0,
        }
    }

    /// Position assigned by a RESxx strobe at the current color clock.
    fn strobe_position(&self, delay: u16, hblank_pos: u8) -> u8 {
        if self.hcount < 68 {
            hblank_pos
        } else {
            ((self.hcount - 68 + delay) % FRAME_WIDTH as u16) as u8
        }
    }

    pub fn write(&mut self, reg: u8, value: u8) {
        match reg & 0x3F {
            0x00 => {
                let on = value & 0x02 != 0;
                if on && !self.vsync && self.scanline >= 1 {
                    self.frame_ready = true;
                    self.scanline = 0;
                }
                self.vsync = on;
            }
            0x01 => {
                // Clearing the INPT4/5 latch releases held-low state;
                // setting the dump bit grounds the paddle capacitors.
                if value & 0x40 == 0 {
                    self.inpt45_latched = [false; 2];
                }
                if value & 0x80 != 0 {
                    self.paddle_counter = [0; 4];
                }
                self.vblank = value;
            }
            0x02 => self.wsync = true,
            0x03 => self.hcount = 0,
            0x04 => self.nusiz0 = value,
            0x05 => self.nusiz1 = value,
            0x06 => self.colup0 = value,
            0x07 => self.colup1 = value,
            0x08 => self.colupf = value,
            0x09 => self.colubk = value,
            0x0A => self.ctrlpf = value,
            0x0B => self.refp0 = value & 0x08 != 0,
            0x0C => self.refp1 = value & 0x08 != 0,
            0x0D => self.pf0 = value,
            0x0E => self.pf1 = value,
            0x0F => self.pf2 = value,
            0x10 => self.pos_p0 = self.strobe_position(5, 3),
            0x11 => self.pos_p1 = self.strobe_position(5, 3),
            0x12 => self.pos_m0 = self.strobe_position(4, 2),
            0x13 => self.pos_m1 = self.strobe_position(4, 2),
            0x14 => self.pos_bl = self.strobe_position(4, 2),
            0x15 => self.audio[0].set_control(value),
            0x16 => self.audio[1].set_control(value),
            0x17 => self.audio[0].set_freq(value),
            0x18 => self.audio[1].set_freq(value),
            0x19 => self.audio[0].set_volume(value),
            0x1A => self.audio[1].set_volume(value),
            0x1B => {
                self.grp0_new = value;
                self.grp1_old = self.grp1_new;
            }
            0x1C => {
                self.grp1_new = value;
                self.grp0_old = self.grp0_new;
                self.enabl_old = self.enabl_new;
            }
            0x1D => self.enam0 = value & 0x02 != 0,
            0x1E => self.enam1 = value & 0x02 != 0,
            0x1F => self.enabl_new = value & 0x02 != 0,
            0x20 => self.hmp0 = motion(value),
            0x21 => self.hmp1 = motion(value),
            0x22 => self.hmm0 = motion(value),
            0x23 => self.hmm1 = motion(value),
            0x24 => self.hmbl = motion(value),
            0x25 => self.vdelp0 = value & 0x01 != 0,
            0x26 => self.vdelp1 = value & 0x01 != 0,
            0x27 => self.vdelbl = value & 0x01 != 0,
            0x28 => {
                self.resmp0 = value & 0x02 != 0;
                if self.resmp0 {
                    self.pos_m0 = center_offset(self.pos_p0, self.nusiz0);
                }
            }
            0x29 => {
                self.resmp1 = value & 0x02 != 0;
                if self.resmp1 {
                    self.pos_m1 = center_offset(self.pos_p1, self.nusiz1);
                }
            }
            0x2A => {
                self.pos_p0 = apply_motion(self.pos_p0, self.hmp0);
                self.pos_p1 = apply_motion(self.pos_p1, self.hmp1);
                self.pos_m0 = apply_motion(self.pos_m0, self.hmm0);
                self.pos_m1 = apply_motion(self.pos_m1, self.hmm1);
                self.pos_bl = apply_motion(self.pos_bl, self.hmbl);
            }
            0x2B => {
                self.hmp0 = 0;
                self.hmp1 = 0;
                self.hmm0 = 0;
                self.hmm1 = 0;
                self.hmbl = 0;
            }
            0x2C => self.collisions = 0,
            // $2D-$3F have no registers behind them.
            _ => {}
        }
    }

    pub fn read(&self, reg: u8) -> u8 {
        let cx = |hi: u16, lo: u16| {
            let mut value = 0;
            if self.collisions & hi != 0 {
                value |= 0x80;
            }
            if self.collisions & lo != 0 {
                value |= 0x40;
            }
            value
        };
        match reg & 0x0F {
            0x0 => cx(CX_M0_P1, CX_M0_P0),
            0x1 => cx(CX_M1_P0, CX_M1_P1),
            0x2 => cx(CX_P0_PF, CX_P0_BL),
            0x3 => cx(CX_P1_PF, CX_P1_BL),
            0x4 => cx(CX_M0_PF, CX_M0_BL),
            0x5 => cx(CX_M1_PF, CX_M1_BL),
            0x6 => cx(CX_BL_PF, 0),
            0x7 => cx(CX_P0_P1, CX_M0_M1),
            0x8..=0xB => self.read_paddle((reg & 0x0F) as usize - 0x8),
            0xC => self.read_trigger(0),
            0xD => self.read_trigger(1),
            _ => 0,
        }
    }

    /// INPT0-3: paddle capacitor charged past threshold reads high. The
    /// charge time scales linearly with the paddle position, counted in
    /// scanlines since the last dump.
    fn read_paddle(&self, index: usize) -> u8 {
        if self.vblank & 0x80 != 0 {
            return 0;
        }
        let threshold = self.input.paddles[index] as u32 * 380 / 255;
        if self.paddle_counter[index] >= threshold {
            0x80
        } else {
            0
        }
    }

    /// INPT4/INPT5: fire buttons, active low, optionally latched by
    /// VBLANK bit 6.
    fn read_trigger(&self, player: usize) -> u8 {
        let low = if self.vblank & 0x40 != 0 {
            self.inpt45_latched[player]
        } else {
            self.input.fire(player)
        };
        if low { 0 } else { 0x80 }
    }
}

impl Default for Tia {
    fn default() -> Self {
        Tia::new()
    }
}

/// Decode an HMxx register: signed motion in the high nibble, positive
/// values move the object left.
fn motion(value: u8) -> i8 {
    (value as i8) >> 4
}

fn apply_motion(pos: u8, hm: i8) -> u8 {
    (pos as i16 - hm as i16).rem_euclid(FRAME_WIDTH as i16) as u8
}

/// Missile lock position while RESMPx is set: centered on the player.
fn center_offset(player_pos: u8, nusiz: u8) -> u8 {
    let scale = match nusiz & 0x07 {
        5 => 2,
        7 => 4,
        _ => 1,
    };
    ((player_pos as u16 + 4 * scale) % FRAME_WIDTH as u16) as u8
}

/// Copy offsets and pixel scale for a NUSIZ player-size field.
fn nusiz_copies(nusiz: u8) -> (&'static [u16], u16) {
    match nusiz & 0x07 {
        0 => (&[0], 1),
        1 => (&[0, 16], 1),
        2 => (&[0, 32], 1),
        3 => (&[0, 16, 32], 1),
        4 => (&[0, 64], 1),
        5 => (&[0], 2),
        6 => (&[0, 32, 64], 1),
        _ => (&[0], 4),
    }
}

fn player_pixel(grp: u8, pos: u8, reflect: bool, nusiz: u8, x: u16) -> bool {
    if grp == 0 {
        return false;
    }
    let offset = (x + FRAME_WIDTH as u16 - pos as u16) % FRAME_WIDTH as u16;
    let (copies, scale) = nusiz_copies(nusiz);
    for &copy in copies {
        if offset >= copy && offset < copy + 8 * scale {
            let bit = (offset - copy) / scale;
            let index = if reflect { bit } else { 7 - bit };
            return grp & (1 << index) != 0;
        }
    }
    false
}

fn missile_pixel(pos: u8, nusiz: u8, x: u16) -> bool {
    let offset = (x + FRAME_WIDTH as u16 - pos as u16) % FRAME_WIDTH as u16;
    let width = 1u16 << ((nusiz >> 4) & 0x03);
    // Missiles replicate with the player's copy pattern but not its scale.
    let (copies, _) = nusiz_copies(nusiz);
    copies.iter().any(|&copy| offset >= copy && offset < copy + width)
}

fn ball_pixel(pos: u8, ctrlpf: u8, x: u16) -> bool {
    let offset = (x + FRAME_WIDTH as u16 - pos as u16) % FRAME_WIDTH as u16;
    offset < 1 << ((ctrlpf >> 4) & 0x03)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_clocks(tia: &mut Tia, n: u32) {
        for _ in 0..n {
            tia.step_clock();
        }
    }

    /// Step to the start of the first visible scanline.
    fn run_to_visible(tia: &mut Tia) {
        run_clocks(tia, FIRST_VISIBLE_LINE as u32 * CLOCKS_PER_LINE as u32);
    }

    #[test]
    fn background_color_fills_a_line() {
        let mut tia = Tia::new();
        tia.write(0x09, 0x42); // COLUBK
        run_to_visible(&mut tia);
        run_clocks(&mut tia, CLOCKS_PER_LINE as u32);
        assert!(tia.frame_buffer()[..FRAME_WIDTH].iter().all(|&c| c == 0x42));
    }

    #[test]
    fn vblank_blanks_the_output() {
        let mut tia = Tia::new();
        tia.write(0x09, 0x42);
        tia.write(0x01, 0x02); // VBLANK on
        run_to_visible(&mut tia);
        run_clocks(&mut tia, CLOCKS_PER_LINE as u32);
        assert!(tia.frame_buffer()[..FRAME_WIDTH].iter().all(|&c| c == 0));
    }

    #[test]
    fn playfield_pf0_covers_first_sixteen_pixels() {
        let mut tia = Tia::new();
        tia.write(0x08, 0x1E); // COLUPF
        tia.write(0x0D, 0xF0); // PF0 all four bits
        run_to_visible(&mut tia);
        run_clocks(&mut tia, CLOCKS_PER_LINE as u32);
        let line = &tia.frame_buffer()[..FRAME_WIDTH];
        assert!(line[..16].iter().all(|&c| c == 0x1E));
        assert!(line[16..80].iter().all(|&c| c == 0));
        // Non-reflected: PF0 repeats at the start of the right half.
        assert!(line[80..96].iter().all(|&c| c == 0x1E));
    }

    #[test]
    fn reflected_playfield_mirrors_the_right_half() {
        let mut tia = Tia::new();
        tia.write(0x08, 0x1E);
        tia.write(0x0A, 0x01); // CTRLPF reflect
        tia.write(0x0D, 0xF0);
        run_to_visible(&mut tia);
        run_clocks(&mut tia, CLOCKS_PER_LINE as u32);
        let line = &tia.frame_buffer()[..FRAME_WIDTH];
        assert!(line[..16].iter().all(|&c| c == 0x1E));
        assert!(line[80..144].iter().all(|&c| c == 0));
        assert!(line[144..160].iter().all(|&c| c == 0x1E));
    }

    #[test]
    fn resp_during_hblank_parks_player_at_pixel_three() {
        let mut tia = Tia::new();
        tia.write(0x06, 0x44); // COLUP0
        tia.write(0x1B, 0xFF); // GRP0
        run_to_visible(&mut tia);
        tia.write(0x10, 0); // RESP0 strobe while hcount == 0
        run_clocks(&mut tia, CLOCKS_PER_LINE as u32);
        let line = &tia.frame_buffer()[..FRAME_WIDTH];
        assert_eq!(line[2], 0);
        assert!(line[3..11].iter().all(|&c| c == 0x44));
        assert_eq!(line[11], 0);
    }

    #[test]
    fn hmove_shifts_positions() {
        let mut tia = Tia::new();
        tia.write(0x06, 0x44);
        tia.write(0x1B, 0xFF);
        run_to_visible(&mut tia);
        tia.write(0x10, 0); // player at pixel 3
        tia.write(0x20, 0x70); // HMP0 = +7: move left, wraps to 156
        tia.write(0x2A, 0); // HMOVE
        run_clocks(&mut tia, CLOCKS_PER_LINE as u32);
        let line = &tia.frame_buffer()[..FRAME_WIDTH];
        assert_eq!(line[155], 0);
        assert_eq!(line[156], 0x44);
        // Sprite wraps across the right edge into pixels 0-3.
        assert_eq!(line[0], 0x44);
        assert_eq!(line[4], 0);
    }

    #[test]
    fn two_player_copies_with_nusiz() {
        let mut tia = Tia::new();
        tia.write(0x06, 0x44);
        tia.write(0x04, 0x01); // two copies, close
        tia.write(0x1B, 0x80); // single leading pixel
        run_to_visible(&mut tia);
        tia.write(0x10, 0);
        run_clocks(&mut tia, CLOCKS_PER_LINE as u32);
        let line = &tia.frame_buffer()[..FRAME_WIDTH];
        assert_eq!(line[3], 0x44);
        assert_eq!(line[19], 0x44);
        assert_eq!(line[35], 0);
    }

    #[test]
    fn player_collision_latches_and_clears() {
        let mut tia = Tia::new();
        tia.write(0x1B, 0xFF);
        tia.write(0x1C, 0xFF);
        run_to_visible(&mut tia);
        tia.write(0x10, 0);
        tia.write(0x11, 0); // both players parked at pixel 3
        run_clocks(&mut tia, CLOCKS_PER_LINE as u32);
        assert_eq!(tia.read(0x07) & 0x80, 0x80); // CXPPMM P0-P1
        // Latch is sticky across further lines.
        tia.write(0x1C, 0x00);
        run_clocks(&mut tia, CLOCKS_PER_LINE as u32);
        assert_eq!(tia.read(0x07) & 0x80, 0x80);
        tia.write(0x2C, 0); // CXCLR
        assert_eq!(tia.read(0x07), 0);
    }

    #[test]
    fn score_mode_splits_playfield_color() {
        let mut tia = Tia::new();
        tia.write(0x06, 0x44);
        tia.write(0x07, 0x88);
        tia.write(0x08, 0x1E);
        tia.write(0x0A, 0x02); // score mode
        tia.write(0x0D, 0xF0);
        run_to_visible(&mut tia);
        run_clocks(&mut tia, CLOCKS_PER_LINE as u32);
        let line = &tia.frame_buffer()[..FRAME_WIDTH];
        assert!(line[..16].iter().all(|&c| c == 0x44));
        assert!(line[80..96].iter().all(|&c| c == 0x88));
    }

    #[test]
    fn playfield_priority_covers_players() {
        let mut tia = Tia::new();
        tia.write(0x06, 0x44);
        tia.write(0x08, 0x1E);
        tia.write(0x0A, 0x04); // playfield priority
        tia.write(0x0D, 0xF0);
        tia.write(0x1B, 0xFF);
        run_to_visible(&mut tia);
        tia.write(0x10, 0); // player under the PF0 stripe
        run_clocks(&mut tia, CLOCKS_PER_LINE as u32);
        assert_eq!(tia.frame_buffer()[5], 0x1E);
    }

    #[test]
    fn completed_rows_queue_until_taken() {
        let mut tia = Tia::new();
        run_to_visible(&mut tia);
        run_clocks(&mut tia, 2 * CLOCKS_PER_LINE as u32);
        assert_eq!(tia.take_line_ready(), Some(0));
        assert_eq!(tia.take_line_ready(), Some(1));
        assert_eq!(tia.take_line_ready(), None);
    }

    #[test]
    fn wsync_clears_at_end_of_line() {
        let mut tia = Tia::new();
        tia.write(0x02, 0);
        assert!(tia.wsync_pending());
        run_clocks(&mut tia, CLOCKS_PER_LINE as u32);
        assert!(!tia.wsync_pending());
    }

    #[test]
    fn vsync_strobe_completes_the_frame() {
        let mut tia = Tia::new();
        run_clocks(&mut tia, 262 * CLOCKS_PER_LINE as u32);
        assert!(!tia.take_frame_ready());
        tia.write(0x00, 0x02);
        assert!(tia.take_frame_ready());
        assert!(!tia.take_frame_ready());
        // Releasing and re-strobing immediately must not produce another.
        tia.write(0x00, 0x00);
        tia.write(0x00, 0x02);
        assert!(!tia.take_frame_ready());
    }

    #[test]
    fn vdel_player_uses_old_register() {
        let mut tia = Tia::new();
        tia.write(0x06, 0x44);
        tia.write(0x25, 0x01); // VDELP0
        tia.write(0x1B, 0xFF); // new GRP0, old still 0
        run_to_visible(&mut tia);
        tia.write(0x10, 0);
        run_clocks(&mut tia, CLOCKS_PER_LINE as u32);
        assert_eq!(tia.frame_buffer()[3], 0);
        // GRP1 write copies GRP0 new -> old.
        tia.write(0x1C, 0x00);
        run_clocks(&mut tia, CLOCKS_PER_LINE as u32);
        assert_eq!(tia.frame_buffer()[FRAME_WIDTH + 3], 0x44);
    }

    #[test]
    fn paddle_dump_holds_inputs_low() {
        let mut tia = Tia::new();
        let mut input = InputState::default();
        input.paddles[0] = 0;
        tia.set_input(input);
        tia.write(0x01, 0x80); // dump on
        assert_eq!(tia.read(0x8), 0);
        tia.write(0x01, 0x00); // dump off: paddle at 0 charges instantly
        assert_eq!(tia.read(0x8) & 0x80, 0x80);
    }

    #[test]
    fn paddle_charge_takes_scanlines() {
        let mut tia = Tia::new();
        let mut input = InputState::default();
        input.paddles[1] = 255;
        tia.set_input(input);
        tia.write(0x01, 0x80);
        tia.write(0x01, 0x00);
        assert_eq!(tia.read(0x9), 0);
        run_clocks(&mut tia, 380 * CLOCKS_PER_LINE as u32);
        assert_eq!(tia.read(0x9) & 0x80, 0x80);
    }

    #[test]
    fn trigger_latch_holds_after_release() {
        let mut tia = Tia::new();
        let mut input = InputState::default();
        input.joysticks[0].fire = true;
        tia.set_input(input);
        tia.write(0x01, 0x40); // latch on
        tia.step_clock();
        tia.set_input(InputState::default());
        tia.step_clock();
        assert_eq!(tia.read(0xC), 0); // still held low
        tia.write(0x01, 0x00); // latch off releases
        assert_eq!(tia.read(0xC), 0x80);
    }

    #[test]
    fn audio_samples_accumulate_two_per_line() {
        let mut tia = Tia::new();
        run_clocks(&mut tia, 10 * CLOCKS_PER_LINE as u32);
        assert_eq!(tia.audio_ring.len(), 20);
    }
}
