//! 6507 core: fetch/decode/execute with per-cycle bus ticking.
//!
//! Every CPU cycle — opcode fetch, operand fetch, data access, internal
//! cycle — ticks the bus before the access happens, so TIA/RIOT register
//! reads and writes performed mid-instruction see chip state as of that
//! exact cycle. Documented cycle costs (including page-crossing and
//! branch-taken penalties) fall out of the access pattern.
//!
//! Undocumented opcodes follow the best-effort policy: the stable ones
//! (LAX, SAX, DCP, ISC, SLO, RLA, SRE, RRA, ANC, ALR, ARR, AXS, the NOP
//! variants, SBC $EB) behave like the real chip, KIL opcodes halt the CPU,
//! and the unstable remainder (XAA, AHX, TAS, LAS, SHX, SHY) execute as
//! NOPs with their documented length and cycle cost.

use serde::{Deserialize, Serialize};

use crate::{
    bus::Bus,
    cpu::flags::{
        FLAG_BREAK, FLAG_CARRY, FLAG_DECIMAL, FLAG_INTERRUPT_DISABLE, FLAG_NEGATIVE, FLAG_OVERFLOW,
        FLAG_UNUSED, FLAG_ZERO,
    },
};

/// Addressing mode of a memory-operand instruction.
#[derive(Clone, Copy, Debug)]
pub enum AddrMode {
    Immediate,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    Absolute,
    AbsoluteX,
    AbsoluteY,
    IndirectX,
    IndirectY,
}

/// CPU register file, captured for snapshots.
#[derive(Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Debug)]
pub struct CpuState {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    pub cycles: u64,
    pub halted: bool,
}

pub struct Cpu<B: Bus> {
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub sp: u8,
    pub pc: u16,
    pub status: u8,
    pub cycles: u64,
    pub bus: B,
    /// Set by a KIL opcode; only reset recovers.
    pub halted: bool,
}

impl<B: Bus> Cpu<B> {
    pub fn new(bus: B) -> Self {
        Cpu {
            a: 0,
            x: 0,
            y: 0,
            sp: 0xFD,
            pc: 0,
            status: FLAG_INTERRUPT_DISABLE | FLAG_UNUSED,
            cycles: 0,
            bus,
            halted: false,
        }
    }

    /// Reset to power-on state: registers cleared, PC loaded from the reset
    /// vector at $FFFC/$FFFD (decoded into the cartridge window).
    pub fn reset(&mut self) {
        let lo = self.bus.read(0xFFFC) as u16;
        let hi = self.bus.read(0xFFFD) as u16;
        self.pc = (hi << 8) | lo;

        self.sp = 0xFD;
        self.status = FLAG_INTERRUPT_DISABLE | FLAG_UNUSED;
        self.a = 0;
        self.x = 0;
        self.y = 0;
        self.halted = false;
        self.cycles = 7; // reset sequence cost
    }

    pub fn state(&self) -> CpuState {
        CpuState {
            a: self.a,
            x: self.x,
            y: self.y,
            sp: self.sp,
            pc: self.pc,
            status: self.status,
            cycles: self.cycles,
            halted: self.halted,
        }
    }

    pub fn restore_state(&mut self, state: &CpuState) {
        self.a = state.a;
        self.x = state.x;
        self.y = state.y;
        self.sp = state.sp;
        self.pc = state.pc;
        self.status = state.status;
        self.cycles = state.cycles;
        self.halted = state.halted;
    }

    /// Execute one instruction; returns the cycles it consumed. After the
    /// instruction, if the bus holds the CPU (WSYNC), burn cycles until it
    /// releases — each burned cycle still advances the chips.
    pub fn step(&mut self) -> u32 {
        if self.halted {
            return 0;
        }

        let start = self.cycles;
        let pc = self.pc;
        let opcode = self.fetch_byte();
        log::trace!(
            "{:04X}  {:02X}  A:{:02X} X:{:02X} Y:{:02X} P:{:02X} SP:{:02X} CYC:{}",
            pc,
            opcode,
            self.a,
            self.x,
            self.y,
            self.status,
            self.sp,
            start
        );
        self.execute_opcode(opcode);

        while self.bus.halt_pending() {
            self.tick();
        }

        (self.cycles - start) as u32
    }

    // -- cycle plumbing ------------------------------------------------------

    fn tick(&mut self) {
        self.cycles += 1;
        self.bus.tick(1);
    }

    fn read(&mut self, addr: u16) -> u8 {
        self.tick();
        self.bus.read(addr)
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.tick();
        self.bus.write(addr, data);
    }

    fn fetch_byte(&mut self) -> u8 {
        let byte = self.read(self.pc);
        self.pc = self.pc.wrapping_add(1);
        byte
    }

    fn fetch_word(&mut self) -> u16 {
        let lo = self.fetch_byte() as u16;
        let hi = self.fetch_byte() as u16;
        (hi << 8) | lo
    }

    /// Resolve the operand address for `mode`, consuming the documented
    /// cycles. `always_fixup` is true for write and read-modify-write
    /// instructions, which pay the indexed fix-up cycle whether or not the
    /// index crosses a page; pure reads pay it only on a crossing.
    fn operand_addr(&mut self, mode: AddrMode, always_fixup: bool) -> u16 {
        match mode {
            AddrMode::Immediate => {
                let addr = self.pc;
                self.pc = self.pc.wrapping_add(1);
                addr
            }
            AddrMode::ZeroPage => self.fetch_byte() as u16,
            AddrMode::ZeroPageX => {
                let base = self.fetch_byte();
                self.tick();
                base.wrapping_add(self.x) as u16
            }
            AddrMode::ZeroPageY => {
                let base = self.fetch_byte();
                self.tick();
                base.wrapping_add(self.y) as u16
            }
            AddrMode::Absolute => self.fetch_word(),
            AddrMode::AbsoluteX => {
                let base = self.fetch_word();
                let addr = base.wrapping_add(self.x as u16);
                if always_fixup || (base & 0xFF00) != (addr & 0xFF00) {
                    self.tick();
                }
                addr
            }
            AddrMode::AbsoluteY => {
                let base = self.fetch_word();
                let addr = base.wrapping_add(self.y as u16);
                if always_fixup || (base & 0xFF00) != (addr & 0xFF00) {
                    self.tick();
                }
                addr
            }
            AddrMode::IndirectX => {
                let zp = self.fetch_byte();
                self.tick();
                let ptr = zp.wrapping_add(self.x);
                let lo = self.read(ptr as u16) as u16;
                let hi = self.read(ptr.wrapping_add(1) as u16) as u16;
                (hi << 8) | lo
            }
            AddrMode::IndirectY => {
                let zp = self.fetch_byte();
                let lo = self.read(zp as u16) as u16;
                let hi = self.read(zp.wrapping_add(1) as u16) as u16;
                let base = (hi << 8) | lo;
                let addr = base.wrapping_add(self.y as u16);
                if always_fixup || (base & 0xFF00) != (addr & 0xFF00) {
                    self.tick();
                }
                addr
            }
        }
    }

    fn load(&mut self, mode: AddrMode) -> u8 {
        let addr = self.operand_addr(mode, false);
        self.read(addr)
    }

    /// Read-modify-write: read, one internal cycle, write back. Returns the
    /// written value for the undocumented combo opcodes.
    fn rmw(&mut self, mode: AddrMode, op: fn(&mut Self, u8) -> u8) -> u8 {
        let addr = self.operand_addr(mode, true);
        let value = self.read(addr);
        self.tick();
        let result = op(self, value);
        self.write(addr, result);
        result
    }

    fn push(&mut self, value: u8) {
        self.write(0x0100 | self.sp as u16, value);
        self.sp = self.sp.wrapping_sub(1);
    }

    fn pull(&mut self) -> u8 {
        self.sp = self.sp.wrapping_add(1);
        self.read(0x0100 | self.sp as u16)
    }

    // -- flags ---------------------------------------------------------------

    fn set_flag(&mut self, flag: u8, on: bool) {
        if on {
            self.status |= flag;
        } else {
            self.status &= !flag;
        }
    }

    fn set_zn(&mut self, value: u8) {
        self.set_flag(FLAG_ZERO, value == 0);
        self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
    }

    // -- dispatch ------------------------------------------------------------

    fn execute_opcode(&mut self, opcode: u8) {
        use AddrMode::*;
        match opcode {
            // KIL: the real chip wedges; only reset recovers.
            0x02 | 0x12 | 0x22 | 0x32 | 0x42 | 0x52 | 0x62 | 0x72 | 0x92 | 0xB2 | 0xD2 | 0xF2 => {
                self.halted = true;
            }

            // NOP family (official $EA plus the undocumented widths)
            0xEA | 0x1A | 0x3A | 0x5A | 0x7A | 0xDA | 0xFA => self.nop_implied(),
            0x80 | 0x82 | 0x89 | 0xC2 | 0xE2 => self.nop_read(Immediate),
            0x04 | 0x44 | 0x64 => self.nop_read(ZeroPage),
            0x14 | 0x34 | 0x54 | 0x74 | 0xD4 | 0xF4 => self.nop_read(ZeroPageX),
            0x0C => self.nop_read(Absolute),
            0x1C | 0x3C | 0x5C | 0x7C | 0xDC | 0xFC => self.nop_read(AbsoluteX),

            // Loads
            0xA9 => self.lda(Immediate),
            0xA5 => self.lda(ZeroPage),
            0xB5 => self.lda(ZeroPageX),
            0xAD => self.lda(Absolute),
            0xBD => self.lda(AbsoluteX),
            0xB9 => self.lda(AbsoluteY),
            0xA1 => self.lda(IndirectX),
            0xB1 => self.lda(IndirectY),
            0xA2 => self.ldx(Immediate),
            0xA6 => self.ldx(ZeroPage),
            0xB6 => self.ldx(ZeroPageY),
            0xAE => self.ldx(Absolute),
            0xBE => self.ldx(AbsoluteY),
            0xA0 => self.ldy(Immediate),
            0xA4 => self.ldy(ZeroPage),
            0xB4 => self.ldy(ZeroPageX),
            0xAC => self.ldy(Absolute),
            0xBC => self.ldy(AbsoluteX),
            0xA7 => self.lax(ZeroPage),
            0xB7 => self.lax(ZeroPageY),
            0xAF => self.lax(Absolute),
            0xBF => self.lax(AbsoluteY),
            0xA3 => self.lax(IndirectX),
            0xB3 => self.lax(IndirectY),
            0xAB => self.lax(Immediate),

            // Stores
            0x85 => self.sta(ZeroPage),
            0x95 => self.sta(ZeroPageX),
            0x8D => self.sta(Absolute),
            0x9D => self.sta(AbsoluteX),
            0x99 => self.sta(AbsoluteY),
            0x81 => self.sta(IndirectX),
            0x91 => self.sta(IndirectY),
            0x86 => self.stx(ZeroPage),
            0x96 => self.stx(ZeroPageY),
            0x8E => self.stx(Absolute),
            0x84 => self.sty(ZeroPage),
            0x94 => self.sty(ZeroPageX),
            0x8C => self.sty(Absolute),
            0x87 => self.sax(ZeroPage),
            0x97 => self.sax(ZeroPageY),
            0x8F => self.sax(Absolute),
            0x83 => self.sax(IndirectX),

            // Transfers
            0xAA => self.tax(),
            0xA8 => self.tay(),
            0xBA => self.tsx(),
            0x8A => self.txa(),
            0x9A => self.txs(),
            0x98 => self.tya(),

            // Arithmetic
            0x69 => self.adc(Immediate),
            0x65 => self.adc(ZeroPage),
            0x75 => self.adc(ZeroPageX),
            0x6D => self.adc(Absolute),
            0x7D => self.adc(AbsoluteX),
            0x79 => self.adc(AbsoluteY),
            0x61 => self.adc(IndirectX),
            0x71 => self.adc(IndirectY),
            0xE9 | 0xEB => self.sbc(Immediate),
            0xE5 => self.sbc(ZeroPage),
            0xF5 => self.sbc(ZeroPageX),
            0xED => self.sbc(Absolute),
            0xFD => self.sbc(AbsoluteX),
            0xF9 => self.sbc(AbsoluteY),
            0xE1 => self.sbc(IndirectX),
            0xF1 => self.sbc(IndirectY),

            // Logic
            0x29 => self.and(Immediate),
            0x25 => self.and(ZeroPage),
            0x35 => self.and(ZeroPageX),
            0x2D => self.and(Absolute),
            0x3D => self.and(AbsoluteX),
            0x39 => self.and(AbsoluteY),
            0x21 => self.and(IndirectX),
            0x31 => self.and(IndirectY),
            0x09 => self.ora(Immediate),
            0x05 => self.ora(ZeroPage),
            0x15 => self.ora(ZeroPageX),
            0x0D => self.ora(Absolute),
            0x1D => self.ora(AbsoluteX),
            0x19 => self.ora(AbsoluteY),
            0x01 => self.ora(IndirectX),
            0x11 => self.ora(IndirectY),
            0x49 => self.eor(Immediate),
            0x45 => self.eor(ZeroPage),
            0x55 => self.eor(ZeroPageX),
            0x4D => self.eor(Absolute),
            0x5D => self.eor(AbsoluteX),
            0x59 => self.eor(AbsoluteY),
            0x41 => self.eor(IndirectX),
            0x51 => self.eor(IndirectY),
            0x24 => self.bit(ZeroPage),
            0x2C => self.bit(Absolute),

            // Compares
            0xC9 => self.cmp(Immediate),
            0xC5 => self.cmp(ZeroPage),
            0xD5 => self.cmp(ZeroPageX),
            0xCD => self.cmp(Absolute),
            0xDD => self.cmp(AbsoluteX),
            0xD9 => self.cmp(AbsoluteY),
            0xC1 => self.cmp(IndirectX),
            0xD1 => self.cmp(IndirectY),
            0xE0 => self.cpx(Immediate),
            0xE4 => self.cpx(ZeroPage),
            0xEC => self.cpx(Absolute),
            0xC0 => self.cpy(Immediate),
            0xC4 => self.cpy(ZeroPage),
            0xCC => self.cpy(Absolute),

            // Increments / decrements
            0xE6 => self.inc(ZeroPage),
            0xF6 => self.inc(ZeroPageX),
            0xEE => self.inc(Absolute),
            0xFE => self.inc(AbsoluteX),
            0xC6 => self.dec(ZeroPage),
            0xD6 => self.dec(ZeroPageX),
            0xCE => self.dec(Absolute),
            0xDE => self.dec(AbsoluteX),
            0xE8 => self.inx(),
            0xC8 => self.iny(),
            0xCA => self.dex(),
            0x88 => self.dey(),

            // Shifts and rotates
            0x0A => self.asl_accumulator(),
            0x06 => self.asl(ZeroPage),
            0x16 => self.asl(ZeroPageX),
            0x0E => self.asl(Absolute),
            0x1E => self.asl(AbsoluteX),
            0x4A => self.lsr_accumulator(),
            0x46 => self.lsr(ZeroPage),
            0x56 => self.lsr(ZeroPageX),
            0x4E => self.lsr(Absolute),
            0x5E => self.lsr(AbsoluteX),
            0x2A => self.rol_accumulator(),
            0x26 => self.rol(ZeroPage),
            0x36 => self.rol(ZeroPageX),
            0x2E => self.rol(Absolute),
            0x3E => self.rol(AbsoluteX),
            0x6A => self.ror_accumulator(),
            0x66 => self.ror(ZeroPage),
            0x76 => self.ror(ZeroPageX),
            0x6E => self.ror(Absolute),
            0x7E => self.ror(AbsoluteX),

            // RMW + arithmetic combos (undocumented, stable)
            0x07 => self.slo(ZeroPage),
            0x17 => self.slo(ZeroPageX),
            0x0F => self.slo(Absolute),
            0x1F => self.slo(AbsoluteX),
            0x1B => self.slo(AbsoluteY),
            0x03 => self.slo(IndirectX),
            0x13 => self.slo(IndirectY),
            0x27 => self.rla(ZeroPage),
            0x37 => self.rla(ZeroPageX),
            0x2F => self.rla(Absolute),
            0x3F => self.rla(AbsoluteX),
            0x3B => self.rla(AbsoluteY),
            0x23 => self.rla(IndirectX),
            0x33 => self.rla(IndirectY),
            0x47 => self.sre(ZeroPage),
            0x57 => self.sre(ZeroPageX),
            0x4F => self.sre(Absolute),
            0x5F => self.sre(AbsoluteX),
            0x5B => self.sre(AbsoluteY),
            0x43 => self.sre(IndirectX),
            0x53 => self.sre(IndirectY),
            0x67 => self.rra(ZeroPage),
            0x77 => self.rra(ZeroPageX),
            0x6F => self.rra(Absolute),
            0x7F => self.rra(AbsoluteX),
            0x7B => self.rra(AbsoluteY),
            0x63 => self.rra(IndirectX),
            0x73 => self.rra(IndirectY),
            0xC7 => self.dcp(ZeroPage),
            0xD7 => self.dcp(ZeroPageX),
            0xCF => self.dcp(Absolute),
            0xDF => self.dcp(AbsoluteX),
            0xDB => self.dcp(AbsoluteY),
            0xC3 => self.dcp(IndirectX),
            0xD3 => self.dcp(IndirectY),
            0xE7 => self.isc(ZeroPage),
            0xF7 => self.isc(ZeroPageX),
            0xEF => self.isc(Absolute),
            0xFF => self.isc(AbsoluteX),
            0xFB => self.isc(AbsoluteY),
            0xE3 => self.isc(IndirectX),
            0xF3 => self.isc(IndirectY),

            // Immediate-mode combos (undocumented, stable)
            0x0B | 0x2B => self.anc(),
            0x4B => self.alr(),
            0x6B => self.arr(),
            0xCB => self.axs(),

            // Unstable on real silicon: run as NOPs of documented shape.
            0x8B => self.nop_read(Immediate),  // XAA
            0xBB => self.nop_read(AbsoluteY),  // LAS
            0x93 => self.nop_store(IndirectY), // AHX (zp),Y
            0x9F => self.nop_store(AbsoluteY), // AHX abs,Y
            0x9B => self.nop_store(AbsoluteY), // TAS
            0x9C => self.nop_store(AbsoluteX), // SHY
            0x9E => self.nop_store(AbsoluteY), // SHX

            // Flag operations
            0x18 => self.flag_op(FLAG_CARRY, false),
            0x38 => self.flag_op(FLAG_CARRY, true),
            0x58 => self.flag_op(FLAG_INTERRUPT_DISABLE, false),
            0x78 => self.flag_op(FLAG_INTERRUPT_DISABLE, true),
            0xB8 => self.flag_op(FLAG_OVERFLOW, false),
            0xD8 => self.flag_op(FLAG_DECIMAL, false),
            0xF8 => self.flag_op(FLAG_DECIMAL, true),

            // Branches
            0x10 => self.branch(self.status & FLAG_NEGATIVE == 0),
            0x30 => self.branch(self.status & FLAG_NEGATIVE != 0),
            0x50 => self.branch(self.status & FLAG_OVERFLOW == 0),
            0x70 => self.branch(self.status & FLAG_OVERFLOW != 0),
            0x90 => self.branch(self.status & FLAG_CARRY == 0),
            0xB0 => self.branch(self.status & FLAG_CARRY != 0),
            0xD0 => self.branch(self.status & FLAG_ZERO == 0),
            0xF0 => self.branch(self.status & FLAG_ZERO != 0),

            // Jumps and subroutines
            0x4C => self.jmp_absolute(),
            0x6C => self.jmp_indirect(),
            0x20 => self.jsr(),
            0x60 => self.rts(),
            0x40 => self.rti(),
            0x00 => self.brk(),

            // Stack
            0x48 => self.pha(),
            0x08 => self.php(),
            0x68 => self.pla(),
            0x28 => self.plp(),
        }
    }

    // -- loads / stores ------------------------------------------------------

    fn lda(&mut self, mode: AddrMode) {
        self.a = self.load(mode);
        self.set_zn(self.a);
    }

    fn ldx(&mut self, mode: AddrMode) {
        self.x = self.load(mode);
        self.set_zn(self.x);
    }

    fn ldy(&mut self, mode: AddrMode) {
        self.y = self.load(mode);
        self.set_zn(self.y);
    }

    fn lax(&mut self, mode: AddrMode) {
        let value = self.load(mode);
        self.a = value;
        self.x = value;
        self.set_zn(value);
    }

    fn sta(&mut self, mode: AddrMode) {
        let addr = self.operand_addr(mode, true);
        self.write(addr, self.a);
    }

    fn stx(&mut self, mode: AddrMode) {
        let addr = self.operand_addr(mode, true);
        self.write(addr, self.x);
    }

    fn sty(&mut self, mode: AddrMode) {
        let addr = self.operand_addr(mode, true);
        self.write(addr, self.y);
    }

    fn sax(&mut self, mode: AddrMode) {
        let addr = self.operand_addr(mode, true);
        let value = self.a & self.x;
        self.write(addr, value);
    }

    // -- transfers -----------------------------------------------------------

    fn tax(&mut self) {
        self.tick();
        self.x = self.a;
        self.set_zn(self.x);
    }

    fn tay(&mut self) {
        self.tick();
        self.y = self.a;
        self.set_zn(self.y);
    }

    fn tsx(&mut self) {
        self.tick();
        self.x = self.sp;
        self.set_zn(self.x);
    }

    fn txa(&mut self) {
        self.tick();
        self.a = self.x;
        self.set_zn(self.a);
    }

    fn txs(&mut self) {
        self.tick();
        self.sp = self.x;
    }

    fn tya(&mut self) {
        self.tick();
        self.a = self.y;
        self.set_zn(self.a);
    }

    // -- arithmetic ----------------------------------------------------------

    fn adc(&mut self, mode: AddrMode) {
        let value = self.load(mode);
        self.adc_value(value);
    }

    fn sbc(&mut self, mode: AddrMode) {
        let value = self.load(mode);
        self.sbc_value(value);
    }

    fn adc_value(&mut self, value: u8) {
        let carry_in = (self.status & FLAG_CARRY) as u16;
        let binary = self.a as u16 + value as u16 + carry_in;

        if self.status & FLAG_DECIMAL != 0 {
            // NMOS BCD: Z from the binary sum, N/V from the intermediate
            // result, C from the corrected high digit.
            let mut lo = (self.a & 0x0F) as u16 + (value & 0x0F) as u16 + carry_in;
            let mut hi = (self.a >> 4) as u16 + (value >> 4) as u16;
            if lo > 9 {
                lo += 6;
                hi += 1;
            }
            let interim = ((hi << 4) | (lo & 0x0F)) as u8;
            self.set_flag(FLAG_ZERO, binary as u8 == 0);
            self.set_flag(FLAG_NEGATIVE, interim & 0x80 != 0);
            self.set_flag(
                FLAG_OVERFLOW,
                (self.a ^ interim) & (value ^ interim) & 0x80 != 0,
            );
            if hi > 9 {
                hi += 6;
            }
            self.set_flag(FLAG_CARRY, hi > 15);
            self.a = ((hi as u8) << 4) | (lo as u8 & 0x0F);
        } else {
            let result = binary as u8;
            self.set_flag(FLAG_CARRY, binary > 0xFF);
            self.set_flag(
                FLAG_OVERFLOW,
                (self.a ^ result) & (value ^ result) & 0x80 != 0,
            );
            self.a = result;
            self.set_zn(result);
        }
    }

    fn sbc_value(&mut self, value: u8) {
        let borrow = 1 - (self.status & FLAG_CARRY) as i16;
        let binary = self.a as i16 - value as i16 - borrow;
        let result = binary as u8;

        // N, V, Z, C always come from the binary result, even in BCD mode.
        self.set_flag(FLAG_CARRY, binary >= 0);
        self.set_flag(
            FLAG_OVERFLOW,
            (self.a ^ value) & (self.a ^ result) & 0x80 != 0,
        );
        self.set_zn(result);

        if self.status & FLAG_DECIMAL != 0 {
            let mut lo = (self.a & 0x0F) as i16 - (value & 0x0F) as i16 - borrow;
            let mut hi = (self.a >> 4) as i16 - (value >> 4) as i16;
            if lo < 0 {
                lo -= 6;
                hi -= 1;
            }
            if hi < 0 {
                hi -= 6;
            }
            self.a = ((hi as u8) << 4) | (lo as u8 & 0x0F);
        } else {
            self.a = result;
        }
    }

    // -- logic ---------------------------------------------------------------

    fn and(&mut self, mode: AddrMode) {
        self.a &= self.load(mode);
        self.set_zn(self.a);
    }

    fn ora(&mut self, mode: AddrMode) {
        self.a |= self.load(mode);
        self.set_zn(self.a);
    }

    fn eor(&mut self, mode: AddrMode) {
        self.a ^= self.load(mode);
        self.set_zn(self.a);
    }

    fn bit(&mut self, mode: AddrMode) {
        let value = self.load(mode);
        self.set_flag(FLAG_ZERO, self.a & value == 0);
        self.set_flag(FLAG_NEGATIVE, value & 0x80 != 0);
        self.set_flag(FLAG_OVERFLOW, value & 0x40 != 0);
    }

    // -- compares ------------------------------------------------------------

    fn compare(&mut self, register: u8, value: u8) {
        let result = register.wrapping_sub(value);
        self.set_flag(FLAG_CARRY, register >= value);
        self.set_zn(result);
    }

    fn cmp(&mut self, mode: AddrMode) {
        let value = self.load(mode);
        self.compare(self.a, value);
    }

    fn cpx(&mut self, mode: AddrMode) {
        let value = self.load(mode);
        self.compare(self.x, value);
    }

    fn cpy(&mut self, mode: AddrMode) {
        let value = self.load(mode);
        self.compare(self.y, value);
    }

    // -- increments / decrements ---------------------------------------------

    fn inc(&mut self, mode: AddrMode) {
        self.rmw(mode, |cpu, v| {
            let r = v.wrapping_add(1);
            cpu.set_zn(r);
            r
        });
    }

    fn dec(&mut self, mode: AddrMode) {
        self.rmw(mode, |cpu, v| {
            let r = v.wrapping_sub(1);
            cpu.set_zn(r);
            r
        });
    }

    fn inx(&mut self) {
        self.tick();
        self.x = self.x.wrapping_add(1);
        self.set_zn(self.x);
    }

    fn iny(&mut self) {
        self.tick();
        self.y = self.y.wrapping_add(1);
        self.set_zn(self.y);
    }

    fn dex(&mut self) {
        self.tick();
        self.x = self.x.wrapping_sub(1);
        self.set_zn(self.x);
    }

    fn dey(&mut self) {
        self.tick();
        self.y = self.y.wrapping_sub(1);
        self.set_zn(self.y);
    }

    // -- shifts / rotates ----------------------------------------------------

    fn asl_value(&mut self, value: u8) -> u8 {
        self.set_flag(FLAG_CARRY, value & 0x80 != 0);
        let result = value << 1;
        self.set_zn(result);
        result
    }

    fn lsr_value(&mut self, value: u8) -> u8 {
        self.set_flag(FLAG_CARRY, value & 0x01 != 0);
        let result = value >> 1;
        self.set_zn(result);
        result
    }

    fn rol_value(&mut self, value: u8) -> u8 {
        let carry_in = self.status & FLAG_CARRY;
        self.set_flag(FLAG_CARRY, value & 0x80 != 0);
        let result = (value << 1) | carry_in;
        self.set_zn(result);
        result
    }

    fn ror_value(&mut self, value: u8) -> u8 {
        let carry_in = (self.status & FLAG_CARRY) << 7;
        self.set_flag(FLAG_CARRY, value & 0x01 != 0);
        let result = (value >> 1) | carry_in;
        self.set_zn(result);
        result
    }

    fn asl_accumulator(&mut self) {
        self.tick();
        self.a = self.asl_value(self.a);
    }

    fn lsr_accumulator(&mut self) {
        self.tick();
        self.a = self.lsr_value(self.a);
    }

    fn rol_accumulator(&mut self) {
        self.tick();
        self.a = self.rol_value(self.a);
    }

    fn ror_accumulator(&mut self) {
        self.tick();
        self.a = self.ror_value(self.a);
    }

    fn asl(&mut self, mode: AddrMode) {
        self.rmw(mode, Self::asl_value);
    }

    fn lsr(&mut self, mode: AddrMode) {
        self.rmw(mode, Self::lsr_value);
    }

    fn rol(&mut self, mode: AddrMode) {
        self.rmw(mode, Self::rol_value);
    }

    fn ror(&mut self, mode: AddrMode) {
        self.rmw(mode, Self::ror_value);
    }

    // -- undocumented RMW combos ---------------------------------------------

    fn slo(&mut self, mode: AddrMode) {
        let result = self.rmw(mode, Self::asl_value);
        self.a |= result;
        self.set_zn(self.a);
    }

    fn rla(&mut self, mode: AddrMode) {
        let result = self.rmw(mode, Self::rol_value);
        self.a &= result;
        self.set_zn(self.a);
    }

    fn sre(&mut self, mode: AddrMode) {
        let result = self.rmw(mode, Self::lsr_value);
        self.a ^= result;
        self.set_zn(self.a);
    }

    fn rra(&mut self, mode: AddrMode) {
        let result = self.rmw(mode, Self::ror_value);
        self.adc_value(result);
    }

    fn dcp(&mut self, mode: AddrMode) {
        let result = self.rmw(mode, |_, v| v.wrapping_sub(1));
        self.compare(self.a, result);
    }

    fn isc(&mut self, mode: AddrMode) {
        let result = self.rmw(mode, |_, v| v.wrapping_add(1));
        self.sbc_value(result);
    }

    // -- undocumented immediate combos ---------------------------------------

    fn anc(&mut self) {
        let value = self.load(AddrMode::Immediate);
        self.a &= value;
        self.set_zn(self.a);
        self.set_flag(FLAG_CARRY, self.a & 0x80 != 0);
    }

    fn alr(&mut self) {
        let value = self.load(AddrMode::Immediate);
        self.a &= value;
        self.a = self.lsr_value(self.a);
    }

    fn arr(&mut self) {
        let value = self.load(AddrMode::Immediate);
        let and = self.a & value;
        self.a = (and >> 1) | ((self.status & FLAG_CARRY) << 7);
        self.set_zn(self.a);
        self.set_flag(FLAG_CARRY, self.a & 0x40 != 0);
        self.set_flag(FLAG_OVERFLOW, ((self.a >> 6) ^ (self.a >> 5)) & 0x01 != 0);
    }

    fn axs(&mut self) {
        let value = self.load(AddrMode::Immediate);
        let base = self.a & self.x;
        self.set_flag(FLAG_CARRY, base >= value);
        self.x = base.wrapping_sub(value);
        self.set_zn(self.x);
    }

    // -- NOPs ----------------------------------------------------------------

    fn nop_implied(&mut self) {
        self.tick();
    }

    /// NOP that performs its addressing-mode read (side effects on the bus
    /// are real) and discards the value.
    fn nop_read(&mut self, mode: AddrMode) {
        let _ = self.load(mode);
    }

    /// Unstable store-class opcode run as a NOP: resolves the address and
    /// burns the store cycle without writing.
    fn nop_store(&mut self, mode: AddrMode) {
        let _ = self.operand_addr(mode, true);
        self.tick();
    }

    // -- flags / branches ----------------------------------------------------

    fn flag_op(&mut self, flag: u8, on: bool) {
        self.tick();
        self.set_flag(flag, on);
    }

    fn branch(&mut self, condition: bool) {
        let offset = self.fetch_byte() as i8;
        if condition {
            self.tick();
            let target = self.pc.wrapping_add(offset as u16);
            if (self.pc & 0xFF00) != (target & 0xFF00) {
                self.tick();
            }
            self.pc = target;
        }
    }

    // -- jumps / subroutines / interrupts ------------------------------------

    fn jmp_absolute(&mut self) {
        self.pc = self.fetch_word();
    }

    fn jmp_indirect(&mut self) {
        let ptr = self.fetch_word();
        let lo = self.read(ptr) as u16;
        // 6502 quirk: the pointer's high byte wraps within its page.
        let hi_addr = (ptr & 0xFF00) | ((ptr as u8).wrapping_add(1) as u16);
        let hi = self.read(hi_addr) as u16;
        self.pc = (hi << 8) | lo;
    }

    fn jsr(&mut self) {
        let lo = self.fetch_byte() as u16;
        self.tick();
        self.push((self.pc >> 8) as u8);
        self.push(self.pc as u8);
        let hi = self.read(self.pc) as u16;
        self.pc = (hi << 8) | lo;
    }

    fn rts(&mut self) {
        self.tick();
        self.tick();
        let lo = self.pull() as u16;
        let hi = self.pull() as u16;
        self.tick();
        self.pc = ((hi << 8) | lo).wrapping_add(1);
    }

    fn rti(&mut self) {
        self.tick();
        self.tick();
        let status = self.pull();
        self.status = (status | FLAG_UNUSED) & !FLAG_BREAK;
        let lo = self.pull() as u16;
        let hi = self.pull() as u16;
        self.pc = (hi << 8) | lo;
    }

    /// BRK pushes a return frame and reads the IRQ/BRK vector. The VCS has
    /// no interrupt sources, but software can still execute BRK; the vector
    /// decodes into the cartridge window like every high address.
    fn brk(&mut self) {
        let _ = self.fetch_byte(); // padding byte
        self.push((self.pc >> 8) as u8);
        self.push(self.pc as u8);
        self.push(self.status | FLAG_BREAK | FLAG_UNUSED);
        self.status |= FLAG_INTERRUPT_DISABLE;
        let lo = self.read(0xFFFE) as u16;
        let hi = self.read(0xFFFF) as u16;
        self.pc = (hi << 8) | lo;
    }

    // -- stack ---------------------------------------------------------------

    fn pha(&mut self) {
        self.tick();
        self.push(self.a);
    }

    fn php(&mut self) {
        self.tick();
        self.push(self.status | FLAG_BREAK | FLAG_UNUSED);
    }

    fn pla(&mut self) {
        self.tick();
        self.tick();
        self.a = self.pull();
        self.set_zn(self.a);
    }

    fn plp(&mut self) {
        self.tick();
        self.tick();
        let status = self.pull();
        self.status = (status | FLAG_UNUSED) & !FLAG_BREAK;
    }
}
