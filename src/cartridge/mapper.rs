//! Bank-switching schemes.
//!
//! The scheme set is closed: every supported cartridge format is a variant
//! here, picked at load time and fixed for the cartridge's lifetime.

use serde::{Deserialize, Serialize};

/// Supported bank-switching schemes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum BankScheme {
    /// 2K ROM mirrored twice into the 4K window.
    Plain2K,
    /// 4K ROM, no switching.
    Plain4K,
    /// Atari 8K: hot spots $1FF8/$1FF9.
    F8,
    /// Atari 16K: hot spots $1FF6-$1FF9.
    F6,
    /// Atari 32K: hot spots $1FF4-$1FFB.
    F4,
    /// 64K: hot spots $1FE0-$1FEF.
    EF,
    /// Tigervision 8K: write to $3F selects the lower 2K bank, upper 2K
    /// fixed to the last bank.
    ThreeF,
}

impl BankScheme {
    pub fn name(self) -> &'static str {
        match self {
            BankScheme::Plain2K => "2K",
            BankScheme::Plain4K => "4K",
            BankScheme::F8 => "F8",
            BankScheme::F6 => "F6",
            BankScheme::F4 => "F4",
            BankScheme::EF => "EF",
            BankScheme::ThreeF => "3F",
        }
    }

    /// Size of one switchable bank in bytes.
    pub fn bank_size(self) -> usize {
        match self {
            BankScheme::Plain2K => 0x800,
            BankScheme::ThreeF => 0x800,
            _ => 0x1000,
        }
    }

    pub fn bank_count(self, rom_len: usize) -> usize {
        rom_len / self.bank_size()
    }

    /// Bank selected at power-on.
    pub fn start_bank(self) -> usize {
        match self {
            BankScheme::F8 | BankScheme::EF => 1,
            _ => 0,
        }
    }

    /// Bank selected by touching `offset` (the low 12 bits of a cartridge
    /// address), if it is one of this scheme's hot spots.
    pub fn hotspot(self, offset: u16) -> Option<usize> {
        let range: std::ops::RangeInclusive<u16> = match self {
            BankScheme::F8 => 0xFF8..=0xFF9,
            BankScheme::F6 => 0xFF6..=0xFF9,
            BankScheme::F4 => 0xFF4..=0xFFB,
            BankScheme::EF => 0xFE0..=0xFEF,
            _ => return None,
        };
        if range.contains(&offset) {
            Some((offset - range.start()) as usize)
        } else {
            None
        }
    }

    /// Whether the scheme pages 4K banks and can carry Superchip RAM.
    pub fn supports_superchip(self) -> bool {
        matches!(
            self,
            BankScheme::Plain4K | BankScheme::F8 | BankScheme::F6 | BankScheme::F4 | BankScheme::EF
        )
    }
}

/// Snapshot of the mutable mapper state (selected bank and extension RAM).
#[derive(Clone, Serialize, Deserialize)]
pub struct MapperState {
    pub bank: usize,
    pub ram: Vec<u8>,
}
