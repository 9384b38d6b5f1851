//! Camellia in RFC 5528 CTR mode.
//!
//! The counter block is `nonce(4) || iv(8) || block_index(4, big-endian)`,
//! with the block index starting at 1. The prewhitening XOR (`kw1`/`kw2`)
//! is folded into a [`CtrContext`] once at construction instead of being
//! repeated per block: `l` never depends on the block index (it is always
//! `nonce || iv_lo`), and `r`'s high half is likewise index-independent, so
//! only `r`'s low 32 bits change from one block to the next.

use crate::camellia::backend::CamelliaBackend;
use crate::camellia::block::{rounds_large, rounds_small};
use crate::camellia::key::KeyVector;
use crate::primitives::store_u64_be;

const BLOCK: usize = 16;

fn whitening(key: &KeyVector) -> (u64, u64) {
    match key {
        KeyVector::Small(k) => (k.kw1, k.kw2),
        KeyVector::Large(k) => (k.kw1, k.kw2),
    }
}

/// Encrypts or decrypts a byte range of a CTR keystream (the same operation
/// either way — CTR mode XORs a keystream it derives only from position).
pub struct CtrContext {
    key: KeyVector,
    backend: CamelliaBackend,
    l0: u64,
    r_hi_pre: u32,
    kw2_lo: u32,
}

impl CtrContext {
    /// `iv` and `nonce` follow RFC 5528's 8-byte IV / 4-byte nonce layout.
    /// `key` must already be an encrypt-direction schedule: CTR keystream
    /// generation does not have a separate decrypt schedule.
    pub fn new(key: KeyVector, iv: [u8; 8], nonce: [u8; 4]) -> Self {
        Self::with_backend(key, iv, nonce, CamelliaBackend::adaptive())
    }

    pub fn with_backend(
        key: KeyVector,
        iv: [u8; 8],
        nonce: [u8; 4],
        backend: CamelliaBackend,
    ) -> Self {
        let (kw1, kw2) = whitening(&key);

        let nonce_word = u32::from_be_bytes(nonce);
        let iv_a = u32::from_be_bytes(iv[0..4].try_into().unwrap());
        let iv_b = u32::from_be_bytes(iv[4..8].try_into().unwrap());

        let l0 = (((nonce_word as u64) << 32) | iv_a as u64) ^ kw1;
        let r_hi_pre = iv_b ^ ((kw2 >> 32) as u32);
        let kw2_lo = kw2 as u32;

        Self {
            key,
            backend,
            l0,
            r_hi_pre,
            kw2_lo,
        }
    }

    fn r_for(&self, block_index: u32) -> u64 {
        ((self.r_hi_pre as u64) << 32) | ((block_index ^ self.kw2_lo) as u64)
    }

    fn keystream_block(&self, block_index: u32) -> [u8; BLOCK] {
        let r = self.r_for(block_index);
        let (out_l, out_r) = match &self.key {
            KeyVector::Small(k) => rounds_small(self.l0, r, k),
            KeyVector::Large(k) => rounds_large(self.l0, r, k),
        };
        let mut block = [0u8; BLOCK];
        store_u64_be(&mut block[0..8], out_l);
        store_u64_be(&mut block[8..16], out_r);
        block
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn keystream_batch_x8(&self, start_index: u32) -> [[u8; BLOCK]; 8] {
        debug_assert!(crate::cpu::features().avx2);

        let l = [self.l0; 8];
        let r: [u64; 8] = core::array::from_fn(|i| self.r_for(start_index.wrapping_add(i as u32)));

        let (out_l, out_r) = match &self.key {
            // SAFETY: only reached when `cpu::features().avx2` is true.
            KeyVector::Small(k) => unsafe { crate::camellia::backend::rounds_small_x8(l, r, k) },
            KeyVector::Large(k) => unsafe { crate::camellia::backend::rounds_large_x8(l, r, k) },
        };

        core::array::from_fn(|i| {
            let mut block = [0u8; BLOCK];
            store_u64_be(&mut block[0..8], out_l[i]);
            store_u64_be(&mut block[8..16], out_r[i]);
            block
        })
    }

    fn xor_range(dst: &mut [u8], src: &[u8], keystream: &[u8], src_off: usize, dst_off: usize, ks_off: usize, len: usize) {
        for i in 0..len {
            dst[dst_off + i] = src[src_off + i] ^ keystream[ks_off + i];
        }
    }

    /// XORs the keystream covering `[position, position + length)` into
    /// `dst`, reading plaintext/ciphertext from `src`. `dst` and `src` may
    /// alias exactly; `position` and `length` need not be block-aligned.
    /// Independent, non-overlapping calls produce the same bytes as one
    /// combined call, since every block's keystream is a pure function of
    /// its index.
    pub fn process_bytes(&self, dst: &mut [u8], src: &[u8], position: u64, length: u64) {
        let mut pos = position as usize;
        let mut remaining = length as usize;
        let mut src_off = 0usize;
        let mut dst_off = 0usize;

        let lead = pos % BLOCK;
        if lead != 0 && remaining > 0 {
            let block_index = (pos / BLOCK) as u32 + 1;
            let ks = self.keystream_block(block_index);
            let take = (BLOCK - lead).min(remaining);
            Self::xor_range(dst, src, &ks, src_off, dst_off, lead, take);
            pos += take;
            remaining -= take;
            src_off += take;
            dst_off += take;
        }

        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            if self.backend == CamelliaBackend::Avx2x32Gather {
                while remaining >= 32 * BLOCK {
                    let block_index = (pos / BLOCK) as u32 + 1;
                    for group in 0..4u32 {
                        let batch = self.keystream_batch_x8(block_index + group * 8);
                        for (i, ks) in batch.iter().enumerate() {
                            let off = (group as usize * 8 + i) * BLOCK;
                            Self::xor_range(dst, src, ks, src_off + off, dst_off + off, 0, BLOCK);
                        }
                    }
                    pos += 32 * BLOCK;
                    remaining -= 32 * BLOCK;
                    src_off += 32 * BLOCK;
                    dst_off += 32 * BLOCK;
                }
            }
            if matches!(
                self.backend,
                CamelliaBackend::Avx2x8 | CamelliaBackend::Avx2x32Gather
            ) {
                while remaining >= 8 * BLOCK {
                    let block_index = (pos / BLOCK) as u32 + 1;
                    let batch = self.keystream_batch_x8(block_index);
                    for (i, ks) in batch.iter().enumerate() {
                        let off = i * BLOCK;
                        Self::xor_range(dst, src, ks, src_off + off, dst_off + off, 0, BLOCK);
                    }
                    pos += 8 * BLOCK;
                    remaining -= 8 * BLOCK;
                    src_off += 8 * BLOCK;
                    dst_off += 8 * BLOCK;
                }
            }
        }

        while remaining >= BLOCK {
            let block_index = (pos / BLOCK) as u32 + 1;
            let ks = self.keystream_block(block_index);
            Self::xor_range(dst, src, &ks, src_off, dst_off, 0, BLOCK);
            pos += BLOCK;
            remaining -= BLOCK;
            src_off += BLOCK;
            dst_off += BLOCK;
        }

        if remaining > 0 {
            let block_index = (pos / BLOCK) as u32 + 1;
            let ks = self.keystream_block(block_index);
            Self::xor_range(dst, src, &ks, src_off, dst_off, 0, remaining);
        }
    }
}
