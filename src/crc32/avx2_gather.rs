//! Slice-by-16 CRC32 with the sixteen per-depth table lookups issued as
//! AVX2 gathers instead of sixteen serial scalar reads.
//!
//! [`crate::tables::crc32_tables::SLICE_TABLES`] is laid out as sixteen
//! contiguous `[u32; 256]` rows, so the sixteen lookups for one 16-byte
//! block — each from a different depth, each at a different byte index —
//! collapse into two 8-lane gathers against the flattened `[u32; 4096]`
//! view: lane `i`'s index is simply `depth(i) * 256 + byte(i)`.

use crate::crc32::portable::step;
use crate::tables::crc32_tables::SLICE_TABLES;
#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

const DEPTH: usize = 16;

#[inline(always)]
fn flat_table() -> &'static [u32] {
    // SAFETY: `SLICE_TABLES` is `[[u32; 256]; 16]`, a single contiguous
    // allocation with no padding between rows, so reinterpreting it as
    // `[u32; 16 * 256]` is valid for the table's entire lifetime (`'static`).
    unsafe { core::slice::from_raw_parts(SLICE_TABLES.as_ptr().cast::<u32>(), DEPTH * 256) }
}

#[target_feature(enable = "avx2")]
unsafe fn gather8(table: &[u32], idx: &[u32; 8]) -> [u32; 8] {
    unsafe {
        let idx_vec = _mm256_loadu_si256(idx.as_ptr().cast());
        let gathered = _mm256_i32gather_epi32(table.as_ptr().cast(), idx_vec, 4);
        let mut out = [0u32; 8];
        _mm256_storeu_si256(out.as_mut_ptr().cast(), gathered);
        out
    }
}

#[target_feature(enable = "avx2")]
unsafe fn fold_block(crc: u32, block: &[u8; 16], table: &[u32]) -> u32 {
    unsafe {
        let crc_xor = crc ^ u32::from_le_bytes(block[0..4].try_into().unwrap());

        let mut idx = [0u32; 16];
        for (i, slot) in idx.iter_mut().enumerate().take(4) {
            let byte = (crc_xor >> (i * 8)) & 0xFF;
            *slot = (DEPTH - 1 - i) as u32 * 256 + byte;
        }
        for i in 4..16 {
            idx[i] = (DEPTH - 1 - i) as u32 * 256 + block[i] as u32;
        }

        let lo = gather8(table, idx[0..8].try_into().unwrap());
        let hi = gather8(table, idx[8..16].try_into().unwrap());

        lo.iter().chain(hi.iter()).fold(0u32, |acc, v| acc ^ v)
    }
}

/// Public-domain update: complements in, folds whole 16-byte blocks via
/// AVX2 gather, folds any <16-byte remainder with the portable path, then
/// complements out.
pub fn update(current: u32, data: &[u8]) -> u32 {
    debug_assert!(crate::cpu::features().avx2);

    let mut crc = !current;
    let table = flat_table();
    let mut chunks = data.chunks_exact(16);
    for block in &mut chunks {
        let b: &[u8; 16] = block.try_into().unwrap();
        // SAFETY: caller guarantees AVX2 is available (debug-checked above).
        crc = unsafe { fold_block(crc, b, table) };
    }
    crc = step(crc, chunks.remainder());
    !crc
}
