//! 6507 CPU emulation for the VCS.
//!
//! Full instruction set including the stable undocumented opcodes. The 6507
//! is a 6502 with a 13-bit address bus and no IRQ/NMI pins wired on the
//! 2600, so only reset is modeled. Bus trait used for memory and I/O (TIA,
//! RIOT, cartridge); the bus is ticked once per CPU cycle as each cycle
//! happens, so chip registers see accesses at the exact cycle.

pub mod cpu;
pub mod flags;

#[cfg(test)]
mod tests;
