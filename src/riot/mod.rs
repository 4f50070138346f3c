//! RIOT (6532) emulation: interval timer and the two I/O ports that carry
//! the joystick directions and console switches. The chip's 128 bytes of
//! RAM live on the system bus, not here.

pub mod riot;
