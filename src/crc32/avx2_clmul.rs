//! Barrett-reduction CRC32 via carryless multiply (PCLMULQDQ).
//!
//! Folds the running state as a single 128-bit carryless-multiply
//! accumulator instead of a byte-wise table walk: for each 16-byte input,
//! `state = (state_lo * k3) XOR (state_hi * k4) XOR next_block`, then a
//! final 128→96→64→32-bit reduction with `k4`/`k5` and a Barrett step
//! against the polynomial (`kP`) and its reciprocal (`kM`). Constants and
//! the fold/reduce sequence are the published Intel whitepaper derivation
//! ("Fast CRC Computation for Generic Polynomials Using PCLMULQDQ
//! Instruction"), not a from-scratch derivation.

use crate::crc32::portable;
use crate::tables::crc32_tables::clmul::{K3, K4, K5, MU, POLY};
#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

#[target_feature(enable = "avx2,pclmulqdq")]
unsafe fn fold_128(a: __m128i, k: __m128i) -> __m128i {
    unsafe {
        let lo = _mm_clmulepi64_si128(a, k, 0x00);
        let hi = _mm_clmulepi64_si128(a, k, 0x11);
        _mm_xor_si128(lo, hi)
    }
}

/// Reduces a fully-folded 128-bit state to the public (complemented-out)
/// 32-bit CRC.
#[target_feature(enable = "avx2,pclmulqdq")]
unsafe fn barrett_reduce(s128: __m128i) -> u32 {
    unsafe {
        let mask32 = _mm_set_epi32(0, 0, 0, -1);
        let k4_k5 = _mm_set_epi64x(K5 as i64, K4 as i64);
        let kp_km = _mm_set_epi64x(POLY as i64, MU as i64);

        let s96 = _mm_xor_si128(
            _mm_clmulepi64_si128(s128, k4_k5, 0x00),
            _mm_srli_si128(s128, 8),
        );
        let a = _mm_and_si128(s96, mask32);
        let s64 = _mm_xor_si128(
            _mm_clmulepi64_si128(a, k4_k5, 0x10),
            _mm_srli_si128(s96, 4),
        );

        let x = _mm_and_si128(s64, mask32);
        let t1 = _mm_clmulepi64_si128(x, kp_km, 0x00);
        let t1_lo = _mm_and_si128(t1, mask32);
        let t2 = _mm_clmulepi64_si128(t1_lo, kp_km, 0x10);
        let r = _mm_xor_si128(t2, s64);

        !(_mm_extract_epi32(r, 1) as u32)
    }
}

#[target_feature(enable = "avx2,pclmulqdq")]
unsafe fn process(current: u32, data: &[u8]) -> u32 {
    unsafe {
        let k3_k4 = _mm_set_epi64x(K4 as i64, K3 as i64);

        let mut chunks = data.chunks_exact(16);
        let first: &[u8; 16] = chunks.next().unwrap().try_into().unwrap();

        let mut state = _mm_xor_si128(
            _mm_set_epi32(0, 0, 0, !current as i32),
            _mm_loadu_si128(first.as_ptr().cast()),
        );

        for block in &mut chunks {
            let b: &[u8; 16] = block.try_into().unwrap();
            let next = _mm_loadu_si128(b.as_ptr().cast());
            state = _mm_xor_si128(fold_128(state, k3_k4), next);
        }

        let folded = barrett_reduce(state);
        portable::update(folded, chunks.remainder())
    }
}

/// Public-domain update. Falls straight through to the portable back-end
/// when `data` is under one 16-byte block, matching the reference's
/// "only engage the carryless-multiply path for `length >= 16`" gate.
pub fn update(current: u32, data: &[u8]) -> u32 {
    debug_assert!(crate::cpu::features().avx2 && crate::cpu::features().pclmulqdq);

    if data.len() < 16 {
        return portable::update(current, data);
    }
    // SAFETY: caller guarantees AVX2 + PCLMULQDQ (debug-checked above).
    unsafe { process(current, data) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supported() -> bool {
        crate::cpu::features().avx2 && crate::cpu::features().pclmulqdq
    }

    #[test]
    fn matches_portable_for_various_lengths() {
        if !supported() {
            return;
        }
        for len in [0, 1, 15, 16, 17, 31, 32, 100, 257, 1000] {
            let data: Vec<u8> = (0..len as u32).map(|i| (i * 31) as u8).collect();
            assert_eq!(
                update(0, &data),
                crate::crc32::portable::update(0, &data),
                "mismatch at len={len}"
            );
        }
    }

    #[test]
    fn known_vectors() {
        if !supported() {
            return;
        }
        assert_eq!(update(0, &[0u8; 16]), 0xD7D3_03E7);
    }
}
