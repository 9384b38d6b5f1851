//! Compile-time table generators.
//!
//! Every table here is a `const fn` evaluated at compile time into a
//! `static`, so there is no per-process initialization order to reason
//! about across back-ends — the tables simply exist, read-only, before
//! `main` runs. `const fn` cannot use iterators, so the generators below
//! use `while` loops over raw indices, the same shape as a hand-rolled
//! build-time table generator would use.

pub mod camellia_sbox;
pub mod crc32_tables;
pub mod sha_constants;
