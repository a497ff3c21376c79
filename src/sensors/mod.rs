//! Component C: sensor frame parsers.
//!
//! Both parsers are byte-copy only -- the source buffers they're handed
//! come straight out of a BRAM region via the ring buffer and are not
//! guaranteed to land on a naturally-aligned address. Casting a raw
//! pointer to e.g. `*const f64` and dereferencing it would fault on the
//! target; every multi-byte field here is assembled with
//! `copy_from_slice`/`from_le_bytes`/`from_be_bytes` over an array that
//! was itself built byte-by-byte, never via a pointer cast into the
//! original buffer.

pub mod gps;
pub mod imu;

pub use gps::GpsRecord;
pub use imu::ImuRecord;
