//! Halcyon: an Atari 2600 (VCS) emulator core written in Rust.
//!
//! Emulates the 1977 VCS chipset cycle-for-cycle: MOS 6507 CPU (a 6502 on a
//! 13-bit address bus), TIA video/audio chip, M6532 RIOT (RAM-I/O-Timer),
//! and cartridge bank switching. The core produces 160×192 frames of
//! chip-native color indices plus a 31.44 kHz mono sample stream, and
//! consumes a polled [`input::InputState`] once per step.
//!
//! ## Modules
//!
//! - **bus** – 13-bit address decode: TIA, RIOT RAM/timer/ports, cartridge;
//!   3 TIA color clocks per CPU cycle
//! - **cartridge** – raw-image loading; bank schemes 2K/4K, F8, F6, F4, EF,
//!   3F, with Superchip RAM detection
//! - **console** – whole-machine context: scheduler, frame/scanline events,
//!   snapshot and restore
//! - **cpu** – 6507: full instruction set including the stable undocumented
//!   opcodes, per-cycle bus ticking, reset only (no IRQ/NMI wiring on the VCS)
//! - **riot** – M6532 interval timer (1/8/64/1024 prescale) and input ports
//! - **tia** – scanline video (playfield, players, missiles, ball, collision
//!   latches) and two-channel polynomial audio
//!
//! Undocumented-opcode policy: best-effort. Stable illegals are emulated,
//! KIL opcodes halt the CPU, the unstable remainder run as NOPs with their
//! documented length and cycle cost. Execution never fails mid-run; all
//! errors ([`error::LoadError`], [`error::SnapshotError`],
//! [`error::EmuError`]) are raised at the API boundary.

pub mod bus;
pub mod cartridge;
pub mod console;
pub mod cpu;
pub mod error;
pub mod input;
pub mod riot;
pub mod snapshot;
pub mod tia;

pub use console::{Console, StepOutcome};
pub use error::{EmuError, LoadError, SnapshotError};
pub use input::InputState;
