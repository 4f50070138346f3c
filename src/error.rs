//! Error taxonomy for the emulator core.
//!
//! Load-time errors surface before any stepping begins; runtime errors are
//! reserved for host misuse (incompatible snapshot, overflow under the
//! fail-fast audio policy) and never corrupt emulated state.

use thiserror::Error;

/// Cartridge image could not be mapped to a bank scheme.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Image size is not one of 2/4/8/16/32/64 KiB.
    #[error("unsupported cartridge size {0} bytes (expected 2/4/8/16/32/64 KiB)")]
    UnsupportedSize(usize),
    /// Image is empty.
    #[error("empty cartridge image")]
    Empty,
}

/// Snapshot restore failed; the console is left untouched.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot version {found} is incompatible (expected {expected})")]
    Version { found: u32, expected: u32 },
    #[error("corrupt snapshot: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Runtime errors raised by `Console::step` and friends.
#[derive(Debug, Error)]
pub enum EmuError {
    /// The audio consumer fell behind while `OverflowPolicy::Fail` is active.
    #[error("audio consumer too slow: sample ring overflowed")]
    ConsumerOverflow,
}
