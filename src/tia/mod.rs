//! TIA (Television Interface Adaptor) emulation for the VCS.
//!
//! The TIA has no framebuffer of its own: it serializes one pixel per color
//! clock (3 per CPU cycle, 228 per scanline, 262 scanlines per NTSC frame)
//! from counters and register state. This implementation steps it one color
//! clock at a time and accumulates the visible window into a 160×192 frame
//! buffer of chip-native color indices.
//!
//! - **tia** – registers, pixel priority mux, collision latches, strobes
//! - **palette** – fixed 128-entry NTSC color/luma → RGB table
//! - **audio** – two polynomial-counter tone channels + output sample ring

pub mod audio;
pub mod palette;
pub mod tia;
