//! Shared arithmetic: the Feistel F-function, the FL/FL⁻¹ diffusion step,
//! and the 128-bit key-schedule rotate, all exactly as specified in
//! RFC 3713 §2.

use crate::tables::camellia_sbox::{SBOX0, SBOX1, SBOX2, SBOX3};

/// Camellia's F-function (RFC 3713 §2, `F`).
///
/// RFC 3713 names the four round tables `SBOX1..SBOX4`; this crate's
/// `SBOX0..3` are the same tables shifted down by one index (`SBOX0` here is
/// `SBOX1` there), so the byte-to-table wiring below reads `SBOX0, SBOX1,
/// SBOX2, SBOX3, SBOX1, SBOX2, SBOX3, SBOX0` for input bytes 0..8.
#[inline(always)]
pub fn f(x: u64, k: u64) -> u64 {
    let t = (x ^ k).to_be_bytes();

    let t1 = SBOX0[t[0] as usize];
    let t2 = SBOX1[t[1] as usize];
    let t3 = SBOX2[t[2] as usize];
    let t4 = SBOX3[t[3] as usize];
    let t5 = SBOX1[t[4] as usize];
    let t6 = SBOX2[t[5] as usize];
    let t7 = SBOX3[t[6] as usize];
    let t8 = SBOX0[t[7] as usize];

    let y1 = t1 ^ t3 ^ t4 ^ t6 ^ t7 ^ t8;
    let y2 = t1 ^ t2 ^ t4 ^ t5 ^ t7 ^ t8;
    let y3 = t1 ^ t2 ^ t3 ^ t5 ^ t6 ^ t8;
    let y4 = t2 ^ t3 ^ t4 ^ t5 ^ t6 ^ t7;
    let y5 = t1 ^ t2 ^ t6 ^ t7 ^ t8;
    let y6 = t2 ^ t3 ^ t5 ^ t7 ^ t8;
    let y7 = t3 ^ t4 ^ t5 ^ t6 ^ t8;
    let y8 = t1 ^ t4 ^ t5 ^ t6 ^ t7;

    u64::from_be_bytes([y1, y2, y3, y4, y5, y6, y7, y8])
}

/// `FL` (RFC 3713 §2). `k` is the 64-bit `kl` subkey for this step.
#[inline(always)]
pub fn fl(x: u64, k: u64) -> u64 {
    let x1 = (x >> 32) as u32;
    let x2 = x as u32;
    let k1 = (k >> 32) as u32;
    let k2 = k as u32;

    let x2 = x2 ^ (x1 & k1).rotate_left(1);
    let x1 = x1 ^ (x2 | k2);

    ((x1 as u64) << 32) | x2 as u64
}

/// `FL⁻¹` (RFC 3713 §2), the exact inverse of [`fl`].
#[inline(always)]
pub fn fl_inv(y: u64, k: u64) -> u64 {
    let y1 = (y >> 32) as u32;
    let y2 = y as u32;
    let k1 = (k >> 32) as u32;
    let k2 = k as u32;

    let y1 = y1 ^ (y2 | k2);
    let y2 = y2 ^ (y1 & k1).rotate_left(1);

    ((y1 as u64) << 32) | y2 as u64
}

/// Rotates the 128-bit big-endian value `(hi, lo)` left by `n` bits
/// (`0 <= n < 128`), as used throughout the key schedule to derive each
/// round subkey from `KL`/`KR`/`KA`/`KB`.
#[inline(always)]
pub fn rotl128(hi: u64, lo: u64, n: u32) -> (u64, u64) {
    if n == 0 {
        return (hi, lo);
    }
    let v = ((hi as u128) << 64) | lo as u128;
    let rotated = (v << n) | (v >> (128 - n));
    ((rotated >> 64) as u64, rotated as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fl_and_fl_inv_are_mutual_inverses() {
        let k = 0x0123_4567_89ab_cdefu64;
        for x in [0u64, 1, 0xFFFF_FFFF_FFFF_FFFF, 0xA5A5_5A5A_1234_5678] {
            assert_eq!(fl_inv(fl(x, k), k), x);
        }
    }

    #[test]
    fn rotl128_by_zero_is_identity() {
        assert_eq!(rotl128(0x1122_3344_5566_7788, 0x99aa_bbcc_ddee_ff00, 0), (
            0x1122_3344_5566_7788,
            0x99aa_bbcc_ddee_ff00
        ));
    }

    #[test]
    fn rotl128_by_64_swaps_halves() {
        let (hi, lo) = rotl128(0x1122_3344_5566_7788, 0x99aa_bbcc_ddee_ff00, 64);
        assert_eq!(hi, 0x99aa_bbcc_ddee_ff00);
        assert_eq!(lo, 0x1122_3344_5566_7788);
    }

    #[test]
    fn rotl128_matches_manual_bit_rotate() {
        // Bit 127 (MSB of hi) rotated left by 1 wraps around to bit 0 (LSB of lo).
        let (nh, nl) = rotl128(0x8000_0000_0000_0000, 0, 1);
        assert_eq!(nh, 0);
        assert_eq!(nl, 1);
    }
}
