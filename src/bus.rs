//! Memory bus and address decoding for the VCS.
//!
//! The 6507 exposes 13 address lines, so everything repeats every 8K.
//! Within one 8K image, A12 selects the cartridge and the TIA, RAM and
//! RIOT share the lower half, distinguished by A7 and A9 the way the
//! console's partial decoding wires them.

use crate::cartridge::cartridge::Cartridge;
use crate::input::InputState;
use crate::riot::riot::Riot;
use crate::tia::tia::Tia;

/// Memory-mapped I/O and clocking as seen by the CPU.
pub trait Bus {
    fn read(&mut self, addr: u16) -> u8;
    fn write(&mut self, addr: u16, data: u8);
    fn tick(&mut self, cycles: usize);
    /// True while the CPU must burn cycles (WSYNC asserted).
    fn halt_pending(&self) -> bool {
        false
    }
}

/// Main VCS bus: 128 bytes of RIOT RAM, TIA, RIOT I/O and the cartridge.
pub struct VcsBus {
    pub ram: [u8; 128],
    pub cart: Cartridge,
    pub tia: Tia,
    pub riot: Riot,
}

impl VcsBus {
    pub fn new(cart: Cartridge) -> Self {
        Self {
            ram: [0; 128],
            cart,
            tia: Tia::new(),
            riot: Riot::new(),
        }
    }

    pub fn set_input(&mut self, input: InputState) {
        self.tia.set_input(input);
        self.riot.set_input(input);
    }
}

impl Bus for VcsBus {
    fn read(&mut self, addr: u16) -> u8 {
        let addr = addr & 0x1FFF;
        if addr & 0x1000 != 0 {
            // Cartridge window (hot-spot reads switch banks).
            self.cart.read(addr)
        } else if addr & 0x0080 == 0 {
            // TIA: A12=0, A7=0.
            self.tia.read((addr & 0x0F) as u8)
        } else if addr & 0x0200 == 0 {
            // RIOT RAM: A12=0, A7=1, A9=0.
            self.ram[(addr & 0x7F) as usize]
        } else {
            // RIOT I/O and timer: A12=0, A7=1, A9=1.
            self.riot.read(addr & 0x1F)
        }
    }

    fn write(&mut self, addr: u16, data: u8) {
        let addr = addr & 0x1FFF;
        if addr & 0x1000 != 0 {
            self.cart.write(addr, data);
        } else if addr & 0x0080 == 0 {
            // Tigervision boards snoop writes in the TIA range.
            self.cart.notify_tia_write(addr, data);
            self.tia.write((addr & 0x3F) as u8, data);
        } else if addr & 0x0200 == 0 {
            self.ram[(addr & 0x7F) as usize] = data;
        } else {
            self.riot.write(addr & 0x1F, data);
        }
    }

    fn tick(&mut self, cycles: usize) {
        for _ in 0..cycles {
            // 3 color clocks per CPU cycle, RIOT runs at CPU rate.
            self.tia.step_clock();
            self.tia.step_clock();
            self.tia.step_clock();
            self.riot.step_cycle();
        }
    }

    fn halt_pending(&self) -> bool {
        self.tia.wsync_pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bus() -> VcsBus {
        let mut rom = vec![0; 0x1000];
        rom[0x10] = 0xEA;
        VcsBus::new(Cartridge::load(&rom).unwrap())
    }

    #[test]
    fn ram_is_mirrored_through_partial_decoding() {
        let mut bus = bus();
        bus.write(0x0080, 0x55);
        assert_eq!(bus.read(0x0080), 0x55);
        // Same cell through a classic mirror.
        assert_eq!(bus.read(0x0180), 0x55);
        bus.write(0x0180, 0x66);
        assert_eq!(bus.read(0x0080), 0x66);
    }

    #[test]
    fn upper_half_of_address_space_mirrors_the_lower() {
        let mut bus = bus();
        bus.write(0x0081, 0x42);
        assert_eq!(bus.read(0x2081), 0x42);
        assert_eq!(bus.read(0xE081), 0x42);
    }

    #[test]
    fn tia_and_riot_are_decoded_apart_from_ram() {
        let mut bus = bus();
        // COLUBK write must not land in RAM.
        bus.write(0x0009, 0x42);
        assert_eq!(bus.read(0x0089), 0x00);
        // Timer write then INTIM read round-trips through the RIOT.
        bus.write(0x0296, 0x10);
        assert_eq!(bus.read(0x0284), 0x10);
    }

    #[test]
    fn wsync_write_raises_halt_until_line_end() {
        let mut bus = bus();
        assert!(!bus.halt_pending());
        bus.write(0x0002, 0);
        assert!(bus.halt_pending());
        for _ in 0..76 {
            bus.tick(1);
        }
        assert!(!bus.halt_pending());
    }

    #[test]
    fn tick_advances_riot_timer() {
        let mut bus = bus();
        bus.write(0x0294, 100); // TIM1T
        bus.tick(10);
        assert_eq!(bus.read(0x0284), 90);
    }
}
