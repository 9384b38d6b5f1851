//! Parallel back-ends for Camellia's round function.
//!
//! All three back-ends run the exact same round sequence on the exact same
//! subkeys; they differ only in how many blocks are processed per call and
//! how the S-box lookups for those blocks are issued. The AVX2 back-ends
//! replace a serial run of scalar table reads with one gather instruction
//! per byte position across the group of blocks being processed together,
//! reusing the identical `SBOX_GATHER_0..3` tables the portable back-end's
//! `SBOX0..3` are drawn from, so their output is bit-exact by construction
//! rather than by a separately-verified vector algorithm.

use crate::camellia::core::{fl, fl_inv};
use crate::camellia::key::{LargeKeys, SmallKeys};

/// Which F-function implementation a context uses.
///
/// Closed, three-variant choice rather than a trait object: the dispatcher
/// picks one at construction time from the CPU feature probe, and nothing
/// outside this crate adds a fourth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CamelliaBackend {
    /// One block per call, scalar byte-wise S-box lookups.
    Portable,
    /// Eight blocks per call, S-box lookups issued as AVX2 gathers.
    Avx2x8,
    /// Thirty-two blocks per call: four interleaved `Avx2x8` groups.
    Avx2x32Gather,
}

impl CamelliaBackend {
    /// Picks the widest back-end the current CPU supports.
    pub fn adaptive() -> Self {
        if crate::cpu::features().avx2 {
            CamelliaBackend::Avx2x32Gather
        } else {
            CamelliaBackend::Portable
        }
    }

    /// How many blocks a single call to this back-end's batch routine
    /// processes together.
    pub fn lane_count(self) -> usize {
        match self {
            CamelliaBackend::Portable => 1,
            CamelliaBackend::Avx2x8 => 8,
            CamelliaBackend::Avx2x32Gather => 32,
        }
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod simd {
    use super::*;
    use crate::tables::camellia_sbox::{SBOX_GATHER_0, SBOX_GATHER_1, SBOX_GATHER_2, SBOX_GATHER_3};
    #[cfg(target_arch = "x86")]
    use core::arch::x86::*;
    #[cfg(target_arch = "x86_64")]
    use core::arch::x86_64::*;

    #[inline(always)]
    unsafe fn gather8(table: &[u32; 256], idx: &[u32; 8]) -> [u32; 8] {
        unsafe {
            let idx_vec = _mm256_loadu_si256(idx.as_ptr().cast());
            let gathered = _mm256_i32gather_epi32(table.as_ptr().cast(), idx_vec, 4);
            let mut out = [0u32; 8];
            _mm256_storeu_si256(out.as_mut_ptr().cast(), gathered);
            out
        }
    }

    /// `F` applied to eight independent blocks under the same round key at
    /// once: each of the eight byte positions is gathered for all eight
    /// blocks in a single instruction instead of eight serial table reads.
    #[target_feature(enable = "avx2")]
    unsafe fn f_x8(x: &[u64; 8], k: u64) -> [u64; 8] {
        unsafe {
            let mut bytes = [[0u8; 8]; 8]; // bytes[block][position]
            for b in 0..8 {
                bytes[b] = (x[b] ^ k).to_be_bytes();
            }

            let wiring: [&[u32; 256]; 8] = [
                &SBOX_GATHER_0,
                &SBOX_GATHER_1,
                &SBOX_GATHER_2,
                &SBOX_GATHER_3,
                &SBOX_GATHER_1,
                &SBOX_GATHER_2,
                &SBOX_GATHER_3,
                &SBOX_GATHER_0,
            ];

            let mut t = [[0u8; 8]; 8]; // t[position][block]
            for (pos, table) in wiring.iter().enumerate() {
                let idx: [u32; 8] = core::array::from_fn(|b| bytes[b][pos] as u32);
                let gathered = gather8(table, &idx);
                for b in 0..8 {
                    t[pos][b] = gathered[b] as u8;
                }
            }

            core::array::from_fn(|b| {
                let t1 = t[0][b];
                let t2 = t[1][b];
                let t3 = t[2][b];
                let t4 = t[3][b];
                let t5 = t[4][b];
                let t6 = t[5][b];
                let t7 = t[6][b];
                let t8 = t[7][b];

                let y1 = t1 ^ t3 ^ t4 ^ t6 ^ t7 ^ t8;
                let y2 = t1 ^ t2 ^ t4 ^ t5 ^ t7 ^ t8;
                let y3 = t1 ^ t2 ^ t3 ^ t5 ^ t6 ^ t8;
                let y4 = t2 ^ t3 ^ t4 ^ t5 ^ t6 ^ t7;
                let y5 = t1 ^ t2 ^ t6 ^ t7 ^ t8;
                let y6 = t2 ^ t3 ^ t5 ^ t7 ^ t8;
                let y7 = t3 ^ t4 ^ t5 ^ t6 ^ t8;
                let y8 = t1 ^ t4 ^ t5 ^ t6 ^ t7;
                u64::from_be_bytes([y1, y2, y3, y4, y5, y6, y7, y8])
            })
        }
    }

    #[inline(always)]
    fn xor_in(dst: &mut [u64; 8], src: &[u64; 8]) {
        for b in 0..8 {
            dst[b] ^= src[b];
        }
    }

    #[inline(always)]
    fn fl_lanes(x: &mut [u64; 8], k: u64) {
        for v in x.iter_mut() {
            *v = fl(*v, k);
        }
    }

    #[inline(always)]
    fn fl_inv_lanes(x: &mut [u64; 8], k: u64) {
        for v in x.iter_mut() {
            *v = fl_inv(*v, k);
        }
    }

    /// The 18-round schedule over eight pre-whitened blocks at once.
    #[target_feature(enable = "avx2")]
    pub unsafe fn rounds_small_x8(
        mut l: [u64; 8],
        mut r: [u64; 8],
        kv: &SmallKeys,
    ) -> ([u64; 8], [u64; 8]) {
        unsafe {
            xor_in(&mut r, &f_x8(&l, kv.k[0]));
            xor_in(&mut l, &f_x8(&r, kv.k[1]));
            xor_in(&mut r, &f_x8(&l, kv.k[2]));
            xor_in(&mut l, &f_x8(&r, kv.k[3]));
            xor_in(&mut r, &f_x8(&l, kv.k[4]));
            xor_in(&mut l, &f_x8(&r, kv.k[5]));
            fl_lanes(&mut l, kv.kl[0]);
            fl_inv_lanes(&mut r, kv.kl[1]);
            xor_in(&mut r, &f_x8(&l, kv.k[6]));
            xor_in(&mut l, &f_x8(&r, kv.k[7]));
            xor_in(&mut r, &f_x8(&l, kv.k[8]));
            xor_in(&mut l, &f_x8(&r, kv.k[9]));
            xor_in(&mut r, &f_x8(&l, kv.k[10]));
            xor_in(&mut l, &f_x8(&r, kv.k[11]));
            fl_lanes(&mut l, kv.kl[2]);
            fl_inv_lanes(&mut r, kv.kl[3]);
            xor_in(&mut r, &f_x8(&l, kv.k[12]));
            xor_in(&mut l, &f_x8(&r, kv.k[13]));
            xor_in(&mut r, &f_x8(&l, kv.k[14]));
            xor_in(&mut l, &f_x8(&r, kv.k[15]));
            xor_in(&mut r, &f_x8(&l, kv.k[16]));
            xor_in(&mut l, &f_x8(&r, kv.k[17]));

            let mut out_l = [0u64; 8];
            let mut out_r = [0u64; 8];
            for b in 0..8 {
                out_l[b] = r[b] ^ kv.kw3;
                out_r[b] = l[b] ^ kv.kw4;
            }
            (out_l, out_r)
        }
    }

    /// The 24-round schedule over eight pre-whitened blocks at once.
    #[target_feature(enable = "avx2")]
    pub unsafe fn rounds_large_x8(
        mut l: [u64; 8],
        mut r: [u64; 8],
        kv: &LargeKeys,
    ) -> ([u64; 8], [u64; 8]) {
        unsafe {
            xor_in(&mut r, &f_x8(&l, kv.k[0]));
            xor_in(&mut l, &f_x8(&r, kv.k[1]));
            xor_in(&mut r, &f_x8(&l, kv.k[2]));
            xor_in(&mut l, &f_x8(&r, kv.k[3]));
            xor_in(&mut r, &f_x8(&l, kv.k[4]));
            xor_in(&mut l, &f_x8(&r, kv.k[5]));
            fl_lanes(&mut l, kv.kl[0]);
            fl_inv_lanes(&mut r, kv.kl[1]);
            xor_in(&mut r, &f_x8(&l, kv.k[6]));
            xor_in(&mut l, &f_x8(&r, kv.k[7]));
            xor_in(&mut r, &f_x8(&l, kv.k[8]));
            xor_in(&mut l, &f_x8(&r, kv.k[9]));
            xor_in(&mut r, &f_x8(&l, kv.k[10]));
            xor_in(&mut l, &f_x8(&r, kv.k[11]));
            fl_lanes(&mut l, kv.kl[2]);
            fl_inv_lanes(&mut r, kv.kl[3]);
            xor_in(&mut r, &f_x8(&l, kv.k[12]));
            xor_in(&mut l, &f_x8(&r, kv.k[13]));
            xor_in(&mut r, &f_x8(&l, kv.k[14]));
            xor_in(&mut l, &f_x8(&r, kv.k[15]));
            xor_in(&mut r, &f_x8(&l, kv.k[16]));
            xor_in(&mut l, &f_x8(&r, kv.k[17]));
            fl_lanes(&mut l, kv.kl[4]);
            fl_inv_lanes(&mut r, kv.kl[5]);
            xor_in(&mut r, &f_x8(&l, kv.k[18]));
            xor_in(&mut l, &f_x8(&r, kv.k[19]));
            xor_in(&mut r, &f_x8(&l, kv.k[20]));
            xor_in(&mut l, &f_x8(&r, kv.k[21]));
            xor_in(&mut r, &f_x8(&l, kv.k[22]));
            xor_in(&mut l, &f_x8(&r, kv.k[23]));

            let mut out_l = [0u64; 8];
            let mut out_r = [0u64; 8];
            for b in 0..8 {
                out_l[b] = r[b] ^ kv.kw3;
                out_r[b] = l[b] ^ kv.kw4;
            }
            (out_l, out_r)
        }
    }
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
pub(crate) use simd::{rounds_large_x8, rounds_small_x8};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adaptive_picks_portable_without_avx2() {
        if !crate::cpu::features().avx2 {
            assert_eq!(CamelliaBackend::adaptive(), CamelliaBackend::Portable);
        }
    }

    #[test]
    fn lane_counts_match_back_end_width() {
        assert_eq!(CamelliaBackend::Portable.lane_count(), 1);
        assert_eq!(CamelliaBackend::Avx2x8.lane_count(), 8);
        assert_eq!(CamelliaBackend::Avx2x32Gather.lane_count(), 32);
    }
}
