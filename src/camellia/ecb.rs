//! Camellia in ECB mode (RFC 3713 block semantics, no chaining).

use crate::camellia::backend::CamelliaBackend;
use crate::camellia::block::process_block;
use crate::camellia::key::KeyVector;
use crate::error::CryptoError;
use crate::primitives::{load_u64_be, store_u64_be};

const BLOCK: usize = 16;

/// Encrypts or decrypts independent 16-byte blocks, depending on which
/// direction `key` was generated for.
pub struct EcbContext {
    key: KeyVector,
    backend: CamelliaBackend,
}

impl EcbContext {
    pub fn new(key: KeyVector) -> Self {
        Self::with_backend(key, CamelliaBackend::adaptive())
    }

    pub fn with_backend(key: KeyVector, backend: CamelliaBackend) -> Self {
        Self { key, backend }
    }

    /// Processes `length` bytes of `src` into `dst`. `length` must be a
    /// multiple of 16; `dst` and `src` may alias exactly (in-place), but
    /// partial overlap is undefined.
    pub fn process_blocks(
        &self,
        dst: &mut [u8],
        src: &[u8],
        length: usize,
    ) -> Result<(), CryptoError> {
        if length % BLOCK != 0 {
            return Err(CryptoError::InvalidLength);
        }

        let mut blocks_left = length / BLOCK;
        let mut offset = 0;

        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        {
            if self.backend == CamelliaBackend::Avx2x32Gather {
                while blocks_left >= 32 {
                    for group in 0..4 {
                        self.process_x8(dst, src, offset + group * 8 * BLOCK);
                    }
                    offset += 32 * BLOCK;
                    blocks_left -= 32;
                }
            }
            if matches!(
                self.backend,
                CamelliaBackend::Avx2x8 | CamelliaBackend::Avx2x32Gather
            ) {
                while blocks_left >= 8 {
                    self.process_x8(dst, src, offset);
                    offset += 8 * BLOCK;
                    blocks_left -= 8;
                }
            }
        }

        while blocks_left > 0 {
            let mut block: [u8; BLOCK] = src[offset..offset + BLOCK].try_into().unwrap();
            process_block(&mut block, &self.key);
            dst[offset..offset + BLOCK].copy_from_slice(&block);
            offset += BLOCK;
            blocks_left -= 1;
        }

        Ok(())
    }

    #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
    fn process_x8(&self, dst: &mut [u8], src: &[u8], offset: usize) {
        debug_assert!(crate::cpu::features().avx2);

        let mut l = [0u64; 8];
        let mut r = [0u64; 8];
        for i in 0..8 {
            let base = offset + i * BLOCK;
            l[i] = load_u64_be(&src[base..base + 8]);
            r[i] = load_u64_be(&src[base + 8..base + 16]);
        }

        let (out_l, out_r) = match &self.key {
            KeyVector::Small(k) => {
                let mut pl = l;
                let mut pr = r;
                for i in 0..8 {
                    pl[i] ^= k.kw1;
                    pr[i] ^= k.kw2;
                }
                // SAFETY: only reached when `cpu::features().avx2` is true.
                unsafe { crate::camellia::backend::rounds_small_x8(pl, pr, k) }
            }
            KeyVector::Large(k) => {
                let mut pl = l;
                let mut pr = r;
                for i in 0..8 {
                    pl[i] ^= k.kw1;
                    pr[i] ^= k.kw2;
                }
                // SAFETY: only reached when `cpu::features().avx2` is true.
                unsafe { crate::camellia::backend::rounds_large_x8(pl, pr, k) }
            }
        };

        for i in 0..8 {
            let base = offset + i * BLOCK;
            store_u64_be(&mut dst[base..base + 8], out_l[i]);
            store_u64_be(&mut dst[base + 8..base + 16], out_r[i]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camellia::key::generate;

    const KEY_128: [u8; 16] = [
        0x01, 0x23, 0x45, 0x67, 0x89, 0xab, 0xcd, 0xef, 0xfe, 0xdc, 0xba, 0x98, 0x76, 0x54, 0x32,
        0x10,
    ];

    #[test]
    fn rejects_length_not_a_block_multiple() {
        let ctx = EcbContext::new(generate(&KEY_128, true));
        let src = [0u8; 17];
        let mut dst = [0u8; 17];
        assert_eq!(
            ctx.process_blocks(&mut dst, &src, 17),
            Err(CryptoError::InvalidLength)
        );
    }

    #[test]
    fn encrypt_then_decrypt_round_trips_many_blocks() {
        let plaintext: Vec<u8> = (0u16..(40 * 16) as u16).map(|i| i as u8).collect();
        let enc = EcbContext::new(generate(&KEY_128, true));
        let dec = EcbContext::new(generate(&KEY_128, false));

        let mut ciphertext = vec![0u8; plaintext.len()];
        enc.process_blocks(&mut ciphertext, &plaintext, plaintext.len())
            .unwrap();

        let mut recovered = vec![0u8; plaintext.len()];
        dec.process_blocks(&mut recovered, &ciphertext, ciphertext.len())
            .unwrap();

        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn in_place_processing_matches_separate_buffers() {
        let plaintext: Vec<u8> = (0u16..(9 * 16) as u16).map(|i| (i * 3) as u8).collect();
        let enc = EcbContext::new(generate(&KEY_128, true));

        let mut separate = vec![0u8; plaintext.len()];
        enc.process_blocks(&mut separate, &plaintext, plaintext.len())
            .unwrap();

        let mut in_place = plaintext.clone();
        let src_copy = in_place.clone();
        let len = in_place.len();
        enc.process_blocks(&mut in_place, &src_copy, len)
            .unwrap();

        assert_eq!(in_place, separate);
    }

    #[test]
    fn portable_and_avx2_backends_agree() {
        if !crate::cpu::features().avx2 {
            return;
        }
        let plaintext: Vec<u8> = (0u32..(50 * 16) as u32).map(|i| i as u8).collect();

        let portable = EcbContext::with_backend(generate(&KEY_128, true), CamelliaBackend::Portable);
        let mut out_portable = vec![0u8; plaintext.len()];
        portable
            .process_blocks(&mut out_portable, &plaintext, plaintext.len())
            .unwrap();

        for backend in [CamelliaBackend::Avx2x8, CamelliaBackend::Avx2x32Gather] {
            let ctx = EcbContext::with_backend(generate(&KEY_128, true), backend);
            let mut out = vec![0u8; plaintext.len()];
            ctx.process_blocks(&mut out, &plaintext, plaintext.len())
                .unwrap();
            assert_eq!(out, out_portable);
        }
    }
}
