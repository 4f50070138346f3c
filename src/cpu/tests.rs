//! Instruction-level CPU tests against a flat test bus.

use crate::bus::Bus;
use crate::cpu::cpu::Cpu;
use crate::cpu::flags::*;

/// Flat 8K memory, mirroring the 6507's 13 address lines.
struct TestBus {
    mem: Vec<u8>,
}

impl TestBus {
    fn new() -> Self {
        TestBus { mem: vec![0; 0x2000] }
    }
}

impl Bus for TestBus {
    fn read(&mut self, addr: u16) -> u8 {
        self.mem[(addr & 0x1FFF) as usize]
    }

    fn write(&mut self, addr: u16, data: u8) {
        self.mem[(addr & 0x1FFF) as usize] = data;
    }

    fn tick(&mut self, _cycles: usize) {}
}

/// CPU with `program` at $F000 and the reset vector pointing there.
fn cpu_with(program: &[u8]) -> Cpu<TestBus> {
    let mut bus = TestBus::new();
    bus.mem[0x1FFC] = 0x00;
    bus.mem[0x1FFD] = 0xF0;
    bus.mem[0x1000..0x1000 + program.len()].copy_from_slice(program);
    let mut cpu = Cpu::new(bus);
    cpu.reset();
    cpu
}

fn mem(cpu: &Cpu<TestBus>, addr: u16) -> u8 {
    cpu.bus.mem[(addr & 0x1FFF) as usize]
}

#[test]
fn lda_immediate_sets_value_and_flags() {
    let mut cpu = cpu_with(&[0xA9, 0x42, 0xA9, 0x00, 0xA9, 0x80]);
    assert_eq!(cpu.step(), 2);
    assert_eq!(cpu.a, 0x42);
    assert_eq!(cpu.status & (FLAG_ZERO | FLAG_NEGATIVE), 0);
    cpu.step();
    assert_ne!(cpu.status & FLAG_ZERO, 0);
    cpu.step();
    assert_ne!(cpu.status & FLAG_NEGATIVE, 0);
}

#[test]
fn load_cycle_counts_by_mode() {
    // LDA $80; LDA $80,X; LDA $0180; LDA $0180,X (no cross)
    let mut cpu = cpu_with(&[0xA5, 0x80, 0xB5, 0x80, 0xAD, 0x80, 0x01, 0xBD, 0x80, 0x01]);
    assert_eq!(cpu.step(), 3);
    assert_eq!(cpu.step(), 4);
    assert_eq!(cpu.step(), 4);
    assert_eq!(cpu.step(), 4);
}

#[test]
fn indexed_read_pays_for_page_cross() {
    // LDX #$90; LDA $01F0,X crosses into $0280
    let mut cpu = cpu_with(&[0xA2, 0x90, 0xBD, 0xF0, 0x01]);
    cpu.step();
    assert_eq!(cpu.step(), 5);
}

#[test]
fn indirect_indexed_cycles() {
    // LDY #$01; LDA ($80),Y without and with page cross
    let mut cpu = cpu_with(&[0xA0, 0x01, 0xB1, 0x80, 0xB1, 0x82]);
    cpu.bus.mem[0x80] = 0x10;
    cpu.bus.mem[0x81] = 0x01; // $0110 + 1, same page
    cpu.bus.mem[0x82] = 0xFF;
    cpu.bus.mem[0x83] = 0x01; // $01FF + 1, crosses
    cpu.step();
    assert_eq!(cpu.step(), 5);
    assert_eq!(cpu.step(), 6);
}

#[test]
fn stores_always_pay_the_index_fixup() {
    // LDX #$01; STA $0180,X; LDY #$01; STA ($80),Y
    let mut cpu = cpu_with(&[0xA2, 0x01, 0x9D, 0x80, 0x01, 0xA0, 0x01, 0x91, 0x80]);
    cpu.bus.mem[0x80] = 0x00;
    cpu.bus.mem[0x81] = 0x01;
    cpu.step();
    assert_eq!(cpu.step(), 5);
    cpu.step();
    assert_eq!(cpu.step(), 6);
}

#[test]
fn rmw_cycle_counts() {
    // INC $80; INC $0180; INC $0180,X (X = 0)
    let mut cpu = cpu_with(&[0xE6, 0x80, 0xEE, 0x80, 0x01, 0xFE, 0x80, 0x01]);
    assert_eq!(cpu.step(), 5);
    assert_eq!(cpu.step(), 6);
    assert_eq!(cpu.step(), 7);
    assert_eq!(mem(&cpu, 0x0180), 2);
}

#[test]
fn branch_cycle_counts() {
    // BNE not taken (Z set), BEQ taken within the page
    let mut cpu = cpu_with(&[0xA9, 0x00, 0xD0, 0x02, 0xF0, 0x00]);
    cpu.step();
    assert_eq!(cpu.step(), 2); // not taken
    assert_eq!(cpu.step(), 3); // taken, same page
}

#[test]
fn branch_across_a_page_costs_four() {
    // LDA #$00; BEQ -5 lands at $EFFF
    let mut cpu = cpu_with(&[0xA9, 0x00, 0xF0, 0xFB]);
    cpu.step();
    assert_eq!(cpu.step(), 4);
    assert_eq!(cpu.pc, 0xEFFF);
}

#[test]
fn jsr_rts_round_trip() {
    // JSR $F005; two pad bytes; RTS at $F005
    let mut cpu = cpu_with(&[0x20, 0x05, 0xF0, 0xEA, 0xEA, 0x60]);
    assert_eq!(cpu.step(), 6);
    assert_eq!(cpu.pc, 0xF005);
    // Return address on the stack is the JSR's last byte.
    assert_eq!(mem(&cpu, 0x01FD), 0xF0);
    assert_eq!(mem(&cpu, 0x01FC), 0x02);
    assert_eq!(cpu.step(), 6);
    assert_eq!(cpu.pc, 0xF003);
}

#[test]
fn stack_push_pull_cycles() {
    let mut cpu = cpu_with(&[0xA9, 0x5A, 0x48, 0xA9, 0x00, 0x68]);
    cpu.step();
    assert_eq!(cpu.step(), 3); // PHA
    cpu.step();
    assert_eq!(cpu.step(), 4); // PLA
    assert_eq!(cpu.a, 0x5A);
}

#[test]
fn adc_binary_overflow_and_carry() {
    // CLC; LDA #$50; ADC #$50 -> $A0, overflow set, carry clear
    let mut cpu = cpu_with(&[0x18, 0xA9, 0x50, 0x69, 0x50]);
    cpu.step();
    cpu.step();
    cpu.step();
    assert_eq!(cpu.a, 0xA0);
    assert_ne!(cpu.status & FLAG_OVERFLOW, 0);
    assert_eq!(cpu.status & FLAG_CARRY, 0);
    assert_ne!(cpu.status & FLAG_NEGATIVE, 0);
}

#[test]
fn adc_decimal_mode() {
    // SED; CLC; LDA #$15; ADC #$27 -> $42
    let mut cpu = cpu_with(&[0xF8, 0x18, 0xA9, 0x15, 0x69, 0x27]);
    for _ in 0..4 {
        cpu.step();
    }
    assert_eq!(cpu.a, 0x42);
    assert_eq!(cpu.status & FLAG_CARRY, 0);
}

#[test]
fn adc_decimal_mode_carries() {
    // SED; SEC; LDA #$99; ADC #$00 -> $00 with carry out
    let mut cpu = cpu_with(&[0xF8, 0x38, 0xA9, 0x99, 0x69, 0x00]);
    for _ in 0..4 {
        cpu.step();
    }
    assert_eq!(cpu.a, 0x00);
    assert_ne!(cpu.status & FLAG_CARRY, 0);
}

#[test]
fn sbc_decimal_mode() {
    // SED; SEC; LDA #$42; SBC #$15 -> $27
    let mut cpu = cpu_with(&[0xF8, 0x38, 0xA9, 0x42, 0xE9, 0x15]);
    for _ in 0..4 {
        cpu.step();
    }
    assert_eq!(cpu.a, 0x27);
    assert_ne!(cpu.status & FLAG_CARRY, 0);
}

#[test]
fn jmp_indirect_wraps_within_the_page() {
    let mut cpu = cpu_with(&[0x6C, 0xFF, 0xF1]);
    cpu.bus.mem[0x11FF] = 0x34;
    cpu.bus.mem[0x1100] = 0x12; // high byte from $F100, not $F200
    assert_eq!(cpu.step(), 5);
    assert_eq!(cpu.pc, 0x1234);
}

#[test]
fn lax_loads_a_and_x() {
    // LAX $80
    let mut cpu = cpu_with(&[0xA7, 0x80]);
    cpu.bus.mem[0x80] = 0x3C;
    assert_eq!(cpu.step(), 3);
    assert_eq!(cpu.a, 0x3C);
    assert_eq!(cpu.x, 0x3C);
}

#[test]
fn dcp_decrements_and_compares() {
    // LDA #$40; DCP $80 with $41 in memory -> memory $40, Z set
    let mut cpu = cpu_with(&[0xA9, 0x40, 0xC7, 0x80]);
    cpu.bus.mem[0x80] = 0x41;
    cpu.step();
    assert_eq!(cpu.step(), 5);
    assert_eq!(mem(&cpu, 0x80), 0x40);
    assert_ne!(cpu.status & FLAG_ZERO, 0);
    assert_ne!(cpu.status & FLAG_CARRY, 0);
}

#[test]
fn illegal_nop_widths() {
    // NOP $80 (3 cycles), NOP $0180 (4 cycles)
    let mut cpu = cpu_with(&[0x04, 0x80, 0x0C, 0x80, 0x01]);
    assert_eq!(cpu.step(), 3);
    assert_eq!(cpu.pc, 0xF002);
    assert_eq!(cpu.step(), 4);
    assert_eq!(cpu.pc, 0xF005);
}

#[test]
fn unstable_opcode_behaves_as_nop() {
    // XAA #$FF must not corrupt A
    let mut cpu = cpu_with(&[0xA9, 0x21, 0x8B, 0xFF]);
    cpu.step();
    assert_eq!(cpu.step(), 2);
    assert_eq!(cpu.a, 0x21);
    assert_eq!(cpu.pc, 0xF004);
}

#[test]
fn kil_jams_the_cpu() {
    let mut cpu = cpu_with(&[0x02, 0xA9, 0x42]);
    cpu.step();
    assert!(cpu.halted);
    assert_eq!(cpu.step(), 0);
    assert_eq!(cpu.a, 0x00);
    cpu.reset();
    assert!(!cpu.halted);
}

#[test]
fn brk_pushes_frame_and_vectors() {
    let mut cpu = cpu_with(&[0x00, 0xEA]);
    cpu.bus.mem[0x1FFE] = 0x34;
    cpu.bus.mem[0x1FFF] = 0x12;
    assert_eq!(cpu.step(), 7);
    assert_eq!(cpu.pc, 0x1234);
    // Pushed status has B and U set; return address skips the pad byte.
    assert_eq!(
        mem(&cpu, 0x01FB) & (FLAG_BREAK | FLAG_UNUSED),
        FLAG_BREAK | FLAG_UNUSED
    );
    assert_eq!(mem(&cpu, 0x01FC), 0x02);
    assert_eq!(mem(&cpu, 0x01FD), 0xF0);
}
