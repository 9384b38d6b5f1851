//! CPU-feature-adaptive Camellia, CRC32, and SHA-1/SHA-2 primitives.
//!
//! This crate provides low-level cryptographic and checksum building
//! blocks with the same shape across every primitive: a context type
//! holds whatever state a multi-call computation needs, a closed
//! `*Backend` enum names the fixed set of implementations available for
//! it, and `adaptive()` picks the strongest one the running CPU supports
//! by probing [`cpu::features`] once and caching the result.
//!
//! # Module overview
//!
//! - [`error`] — the small set of caller-visible usage errors.
//! - [`cpu`] — the cached ISA feature probe every `adaptive()` reads from.
//! - [`primitives`] — byte-order load/store helpers and secret zeroization.
//! - [`tables`] — compile-time-generated S-boxes and CRC32 tables.
//! - [`hash`] — streaming SHA-1 and SHA-2 (224/256/384/512).
//! - [`camellia`] — the Camellia block cipher in ECB and CTR modes.
//! - [`crc32`] — CRC32 (polynomial 0xEDB88320) with three back-ends.
//! - [`dispatch`] — `make_*` convenience constructors for every context.
//!
//! # Design goals
//!
//! - No heap allocations in the hot path of any primitive.
//! - Every back-end for a given primitive is bit-exact with every other.
//! - Secret-bearing state zeroizes itself on drop.
//!
//! This crate is not a general-purpose cryptography library: it covers
//! exactly the algorithms named above, each with a portable fallback and
//! an AVX2-accelerated path.

pub mod camellia;
pub mod cpu;
pub mod crc32;
pub mod dispatch;
pub mod error;
pub mod hash;
pub mod primitives;
pub mod tables;
