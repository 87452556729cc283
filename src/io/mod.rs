//! Frame file I/O: raw 16-bit little-endian sensor dumps and binary PGM.

pub mod pgm;
pub mod raw;

pub use pgm::{read_pgm, write_pgm};
pub use raw::read_raw_frame;
