//! Cartridge loading and bank switching.
//!
//! A cartridge is a ROM image plus a bank-switching scheme inferred from
//! its size (and a couple of content probes). The CPU only sees 4K of
//! address space at $1000-$1FFF; larger ROMs page banks in through
//! hot-spot addresses whose mere access (read or write) flips the bank.
//!
//! - **cartridge** – ROM image, loading and size/content detection
//! - **mapper** – the closed set of supported bank schemes

pub mod cartridge;
pub mod mapper;
