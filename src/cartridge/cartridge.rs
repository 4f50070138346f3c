//! ROM image, scheme detection and the bus-facing cartridge interface.

use std::fmt;

use crate::cartridge::mapper::{BankScheme, MapperState};
use crate::error::LoadError;

/// Superchip extension RAM size.
const SC_RAM_SIZE: usize = 128;

pub struct Cartridge {
    rom: Vec<u8>,
    scheme: BankScheme,
    bank: usize,
    /// Superchip RAM, empty when the cartridge has none.
    ram: Vec<u8>,
}

impl Cartridge {
    /// Load a ROM image, inferring the bank scheme from its size and a
    /// couple of content probes.
    pub fn load(data: &[u8]) -> Result<Self, LoadError> {
        if data.is_empty() {
            return Err(LoadError::Empty);
        }
        let scheme = match data.len() {
            0x0800 => BankScheme::Plain2K,
            0x1000 => BankScheme::Plain4K,
            0x2000 => {
                if probably_3f(data) {
                    BankScheme::ThreeF
                } else {
                    BankScheme::F8
                }
            }
            0x4000 => BankScheme::F6,
            0x8000 => BankScheme::F4,
            0x10000 => BankScheme::EF,
            len => return Err(LoadError::UnsupportedSize(len)),
        };
        let superchip = scheme.supports_superchip() && probably_superchip(data);
        log::info!(
            "cartridge: {} bytes, scheme {}{}",
            data.len(),
            scheme.name(),
            if superchip { " + Superchip RAM" } else { "" }
        );
        Ok(Cartridge {
            rom: data.to_vec(),
            scheme,
            bank: scheme.start_bank(),
            ram: if superchip { vec![0; SC_RAM_SIZE] } else { Vec::new() },
        })
    }

    pub fn scheme(&self) -> BankScheme {
        self.scheme
    }

    pub fn bank(&self) -> usize {
        self.bank
    }

    pub fn reset(&mut self) {
        self.bank = self.scheme.start_bank();
        self.ram.iter_mut().for_each(|b| *b = 0);
    }

    /// CPU read from the cartridge window ($1000-$1FFF). Hot spots switch
    /// banks on reads too, before the byte is fetched.
    pub fn read(&mut self, addr: u16) -> u8 {
        let offset = (addr & 0x0FFF) as usize;
        self.touch(offset as u16);
        if !self.ram.is_empty() {
            if offset < SC_RAM_SIZE {
                // Superchip write port: reading it returns the RAM cell
                // without storing anything.
                return self.ram[offset];
            }
            if offset < 2 * SC_RAM_SIZE {
                return self.ram[offset - SC_RAM_SIZE];
            }
        }
        match self.scheme {
            BankScheme::Plain2K => self.rom[offset & 0x07FF],
            BankScheme::Plain4K => self.rom[offset],
            BankScheme::ThreeF => {
                if offset < 0x0800 {
                    self.rom[self.bank * 0x0800 + offset]
                } else {
                    let fixed = self.rom.len() - 0x0800;
                    self.rom[fixed + (offset - 0x0800)]
                }
            }
            _ => self.rom[self.bank * 0x1000 + offset],
        }
    }

    /// CPU write into the cartridge window: hot spots and Superchip RAM.
    pub fn write(&mut self, addr: u16, value: u8) {
        let offset = (addr & 0x0FFF) as usize;
        self.touch(offset as u16);
        if !self.ram.is_empty() && offset < SC_RAM_SIZE {
            self.ram[offset] = value;
        }
    }

    /// Writes below $40 land in the TIA's address range but the Tigervision
    /// board also listens there: the written value selects the bank.
    pub fn notify_tia_write(&mut self, addr: u16, value: u8) {
        if self.scheme == BankScheme::ThreeF && addr & 0x3F == 0x3F {
            self.bank = value as usize % self.scheme.bank_count(self.rom.len());
        }
    }

    fn touch(&mut self, offset: u16) {
        if let Some(bank) = self.scheme.hotspot(offset) {
            self.bank = bank;
        }
    }

    pub fn state(&self) -> MapperState {
        MapperState {
            bank: self.bank,
            ram: self.ram.clone(),
        }
    }

    pub fn restore_state(&mut self, state: &MapperState) {
        self.bank = state.bank.min(self.scheme.bank_count(self.rom.len()) - 1);
        if self.ram.len() == state.ram.len() {
            self.ram.copy_from_slice(&state.ram);
        }
    }
}

impl fmt::Debug for Cartridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cartridge")
            .field("rom_len", &self.rom.len())
            .field("scheme", &self.scheme)
            .field("bank", &self.bank)
            .field("superchip", &!self.ram.is_empty())
            .finish()
    }
}

/// Tigervision probe: 8K images that bank through $3F contain repeated
/// `STA $3F` sequences.
fn probably_3f(data: &[u8]) -> bool {
    data.windows(2).filter(|w| w == &[0x85, 0x3F]).count() >= 2
}

/// Superchip probe (same heuristic Atari-community tooling uses): carts
/// with extension RAM ship ROMs whose first 256 bytes per 4K bank are a
/// single filler value, since $1000-$10FF must not hold code.
fn probably_superchip(data: &[u8]) -> bool {
    data.chunks(0x1000).all(|bank| {
        let filler = bank[0];
        bank[..bank.len().min(256)].iter().all(|&b| b == filler)
    })
}
