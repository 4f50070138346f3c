//! The assembled machine: CPU, bus and the chips behind it, stepped as one
//! unit with the CPU as the clock master.

use crate::bus::{Bus, VcsBus};
use crate::cartridge::cartridge::Cartridge;
use crate::cpu::cpu::Cpu;
use crate::error::{EmuError, LoadError, SnapshotError};
use crate::input::InputState;
use crate::snapshot::{Snapshot, SNAPSHOT_VERSION};
use crate::tia::audio::{AudioRing, OverflowPolicy};

/// What one instruction step produced.
pub struct StepOutcome {
    /// CPU cycles consumed, including WSYNC-burned ones. Zero when the CPU
    /// is jammed by a KIL opcode.
    pub cycles: u32,
    /// Visible row completed during this step, if any.
    pub scanline: Option<u16>,
    /// True once per frame, when VSYNC marks it complete.
    pub frame_done: bool,
}

pub struct Console {
    cpu: Cpu<VcsBus>,
}

impl Console {
    /// Build a console around a ROM image and run the reset sequence.
    pub fn load(rom: &[u8]) -> Result<Self, LoadError> {
        let cart = Cartridge::load(rom)?;
        let mut cpu = Cpu::new(VcsBus::new(cart));
        cpu.reset();
        Ok(Console { cpu })
    }

    /// Replace the audio ring, choosing its capacity and overflow policy.
    pub fn configure_audio(&mut self, capacity: usize, policy: OverflowPolicy) {
        self.cpu.bus.tia.audio_ring = AudioRing::new(capacity, policy);
    }

    /// Latch host input; the chips see it from the next cycle on.
    pub fn set_input(&mut self, input: InputState) {
        self.cpu.bus.set_input(input);
    }

    /// Execute one CPU instruction (plus any WSYNC stall). A jammed CPU
    /// still advances the chips by one cycle so the picture keeps rolling.
    pub fn step(&mut self) -> Result<StepOutcome, EmuError> {
        let cycles = self.cpu.step();
        if cycles == 0 {
            self.cpu.bus.tick(1);
        }
        let tia = &mut self.cpu.bus.tia;
        if tia.audio_ring.take_overflow() {
            return Err(EmuError::ConsumerOverflow);
        }
        Ok(StepOutcome {
            cycles,
            scanline: tia.take_line_ready(),
            frame_done: tia.take_frame_ready(),
        })
    }

    /// Step until the current frame completes; returns CPU cycles run.
    pub fn run_frame(&mut self) -> Result<u64, EmuError> {
        let mut total = 0u64;
        loop {
            let outcome = self.step()?;
            total += outcome.cycles as u64;
            if outcome.frame_done {
                return Ok(total);
            }
        }
    }

    /// Power-cycle: clear RAM and chip state, re-run the reset sequence.
    /// The console Reset switch is game input, not this.
    pub fn reset(&mut self) {
        self.cpu.bus.ram = [0; 128];
        self.cpu.bus.tia = crate::tia::tia::Tia::new();
        self.cpu.bus.riot = crate::riot::riot::Riot::new();
        self.cpu.bus.cart.reset();
        self.cpu.reset();
    }

    /// Visible frame as TIA color indices, 160 x 192 row-major.
    pub fn frame_buffer(&self) -> &[u8] {
        self.cpu.bus.tia.frame_buffer()
    }

    /// Move all pending audio samples out of the ring.
    pub fn drain_audio(&mut self) -> Vec<i16> {
        self.cpu.bus.tia.audio_ring.drain()
    }

    pub fn cycles(&self) -> u64 {
        self.cpu.cycles
    }

    /// Serialize the full machine state. Only valid between steps, which
    /// is the only time the caller can reach this method.
    pub fn snapshot(&self) -> Result<Vec<u8>, SnapshotError> {
        Snapshot {
            version: SNAPSHOT_VERSION,
            cpu: self.cpu.state(),
            ram: self.cpu.bus.ram,
            tia: self.cpu.bus.tia.clone(),
            riot: self.cpu.bus.riot.clone(),
            mapper: self.cpu.bus.cart.state(),
        }
        .to_bytes()
    }

    /// Restore a snapshot taken from the same ROM. On any error the
    /// console is left untouched.
    pub fn restore(&mut self, bytes: &[u8]) -> Result<(), SnapshotError> {
        let snapshot = Snapshot::from_bytes(bytes)?;
        self.cpu.restore_state(&snapshot.cpu);
        self.cpu.bus.ram = snapshot.ram;
        // The audio ring is host configuration, not machine state: keep the
        // capacity and overflow policy chosen via `configure_audio`.
        let ring = std::mem::take(&mut self.cpu.bus.tia.audio_ring);
        self.cpu.bus.tia = snapshot.tia;
        self.cpu.bus.tia.audio_ring = ring;
        self.cpu.bus.riot = snapshot.riot;
        self.cpu.bus.cart.restore_state(&snapshot.mapper);
        Ok(())
    }
}
