//! Versioned save states.
//!
//! A snapshot captures everything mutable except the ROM image and the
//! audio ring: CPU registers, RIOT RAM, TIA, RIOT and mapper state. It is
//! serialized as a JSON blob with an explicit version so stale saves are
//! rejected instead of misread.

use serde::{Deserialize, Serialize};

use crate::cartridge::mapper::MapperState;
use crate::cpu::cpu::CpuState;
use crate::error::SnapshotError;
use crate::riot::riot::Riot;
use crate::tia::tia::Tia;

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    pub cpu: CpuState,
    #[serde(with = "serde_bytes_ram")]
    pub ram: [u8; 128],
    pub tia: Tia,
    pub riot: Riot,
    pub mapper: MapperState,
}

impl Snapshot {
    pub fn to_bytes(&self) -> Result<Vec<u8>, SnapshotError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse and validate; the caller applies the result only on success.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Snapshot = serde_json::from_slice(bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version {
                found: snapshot.version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }
}

/// RAM as a plain JSON array of 128 numbers.
mod serde_bytes_ram {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ram: &[u8; 128], ser: S) -> Result<S::Ok, S::Error> {
        ser.collect_seq(ram.iter())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<[u8; 128], D::Error> {
        let bytes: Vec<u8> = Vec::deserialize(de)?;
        bytes
            .try_into()
            .map_err(|_| D::Error::custom("RAM image must be 128 bytes"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::cpu::CpuState;

    fn sample() -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            cpu: CpuState {
                a: 1,
                x: 2,
                y: 3,
                sp: 0xFD,
                pc: 0xF000,
                status: 0x24,
                cycles: 1234,
                halted: false,
            },
            ram: [0xAA; 128],
            tia: Tia::new(),
            riot: Riot::new(),
            mapper: MapperState {
                bank: 1,
                ram: Vec::new(),
            },
        }
    }

    #[test]
    fn round_trip_preserves_state() {
        let bytes = sample().to_bytes().unwrap();
        let back = Snapshot::from_bytes(&bytes).unwrap();
        assert_eq!(back.cpu, sample().cpu);
        assert_eq!(back.ram, [0xAA; 128]);
        assert_eq!(back.mapper.bank, 1);
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let mut snapshot = sample();
        snapshot.version = 99;
        let bytes = snapshot.to_bytes().unwrap();
        match Snapshot::from_bytes(&bytes) {
            Err(SnapshotError::Version { found, expected }) => {
                assert_eq!(found, 99);
                assert_eq!(expected, SNAPSHOT_VERSION);
            }
            _ => panic!("expected version error"),
        }
    }

    #[test]
    fn garbage_is_corrupt() {
        assert!(matches!(
            Snapshot::from_bytes(b"not json"),
            Err(SnapshotError::Corrupt(_))
        ));
    }
}
