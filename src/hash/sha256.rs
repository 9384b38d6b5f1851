//! SHA-256 / SHA-224 (FIPS 180-4 §6.2). The two digests share a compression
//! function and differ only in initial vector and output truncation.

use crate::hash::backend::HashBackend;
use crate::primitives::load_u32_be;
use crate::tables::sha_constants::{H224_INIT, H256_INIT, K256};

const CHUNK: usize = 64;

#[inline(always)]
fn small_sigma0(x: u32) -> u32 {
    x.rotate_right(7) ^ x.rotate_right(18) ^ (x >> 3)
}

#[inline(always)]
fn small_sigma1(x: u32) -> u32 {
    x.rotate_right(17) ^ x.rotate_right(19) ^ (x >> 10)
}

#[inline(always)]
fn big_sigma0(x: u32) -> u32 {
    x.rotate_right(2) ^ x.rotate_right(13) ^ x.rotate_right(22)
}

#[inline(always)]
fn big_sigma1(x: u32) -> u32 {
    x.rotate_right(6) ^ x.rotate_right(11) ^ x.rotate_right(25)
}

#[inline(always)]
fn ch(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (!x & z)
}

#[inline(always)]
fn maj(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (x & z) ^ (y & z)
}

fn expand_portable(w: &mut [u32; 64]) {
    for i in 16..64 {
        w[i] = small_sigma1(w[i - 2])
            .wrapping_add(w[i - 7])
            .wrapping_add(small_sigma0(w[i - 15]))
            .wrapping_add(w[i - 16]);
    }
}

/// AVX2-gated message-schedule expansion.
///
/// `T[k] = W[i+k-16] + sigma0(W[i+k-15]) + W[i+k-7]` never depends on the
/// current quad, so all four `T` values are safe to compute with one vector
/// add chain. The `sigma1(W[i+k-2])` term does depend on the quad: for
/// `k < 2` the operand is already resident, but for `k in {2, 3}` it needs
/// `W[i]`/`W[i+1]`, which this same quad just produced — so those two lanes
/// are finished with a short scalar fixup after the vector store.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod simd {
    use super::*;
    #[cfg(target_arch = "x86")]
    use core::arch::x86::*;
    #[cfg(target_arch = "x86_64")]
    use core::arch::x86_64::*;

    #[inline(always)]
    unsafe fn sigma0_vec(x: __m128i) -> __m128i {
        unsafe {
            let r7 = _mm_or_si128(_mm_srli_epi32(x, 7), _mm_slli_epi32(x, 25));
            let r18 = _mm_or_si128(_mm_srli_epi32(x, 18), _mm_slli_epi32(x, 14));
            let s3 = _mm_srli_epi32(x, 3);
            _mm_xor_si128(_mm_xor_si128(r7, r18), s3)
        }
    }

    #[target_feature(enable = "avx2")]
    pub unsafe fn expand(w: &mut [u32; 64]) {
        let mut i = 16;
        while i < 64 {
            unsafe {
                let w_m16 = _mm_loadu_si128(w[i - 16..].as_ptr().cast());
                let w_m15 = _mm_loadu_si128(w[i - 15..].as_ptr().cast());
                let w_m7 = _mm_loadu_si128(w[i - 7..].as_ptr().cast());

                let t = _mm_add_epi32(
                    _mm_add_epi32(w_m16, sigma0_vec(w_m15)),
                    w_m7,
                );
                let mut t_words = [0u32; 4];
                _mm_storeu_si128(t_words.as_mut_ptr().cast(), t);

                w[i] = t_words[0].wrapping_add(small_sigma1(w[i - 2]));
                w[i + 1] = t_words[1].wrapping_add(small_sigma1(w[i - 1]));
                w[i + 2] = t_words[2].wrapping_add(small_sigma1(w[i]));
                w[i + 3] = t_words[3].wrapping_add(small_sigma1(w[i + 1]));
            }
            i += 4;
        }
    }
}

fn compress(block: &[u8; CHUNK], state: &mut [u32; 8], backend: HashBackend) {
    let mut w = [0u32; 64];
    for (slot, chunk) in w.iter_mut().zip(block.chunks_exact(4)).take(16) {
        *slot = load_u32_be(chunk);
    }

    match backend {
        HashBackend::Portable => expand_portable(&mut w),
        #[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
        HashBackend::Simd => {
            if crate::cpu::features().avx2 {
                // SAFETY: AVX2 support checked above.
                unsafe { simd::expand(&mut w) };
            } else {
                expand_portable(&mut w);
            }
        }
        #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
        HashBackend::Simd => expand_portable(&mut w),
    }

    let [mut a, mut b, mut c, mut d, mut e, mut f, mut g, mut h] = *state;

    for i in 0..64 {
        let t1 = h
            .wrapping_add(big_sigma1(e))
            .wrapping_add(ch(e, f, g))
            .wrapping_add(K256[i])
            .wrapping_add(w[i]);
        let t2 = big_sigma0(a).wrapping_add(maj(a, b, c));

        h = g;
        g = f;
        f = e;
        e = d.wrapping_add(t1);
        d = c;
        c = b;
        b = a;
        a = t1.wrapping_add(t2);
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
    state[4] = state[4].wrapping_add(e);
    state[5] = state[5].wrapping_add(f);
    state[6] = state[6].wrapping_add(g);
    state[7] = state[7].wrapping_add(h);
}

macro_rules! sha256_family_context {
    ($name:ident, $init:expr, $digest_len:expr) => {
        #[doc = "Streaming context."]
        pub struct $name {
            state: [u32; 8],
            buffer: [u8; CHUNK],
            used: usize,
            wrote: u64,
            backend: HashBackend,
        }

        impl $name {
            /// Adaptive constructor: picks the best back-end the CPU supports.
            pub fn new() -> Self {
                Self::with_backend(HashBackend::adaptive())
            }

            pub fn new_portable() -> Self {
                Self::with_backend(HashBackend::Portable)
            }

            pub fn new_simd() -> Self {
                debug_assert!(
                    crate::cpu::features().avx2,
                    "SIMD back-end requested on a CPU without AVX2"
                );
                Self::with_backend(HashBackend::Simd)
            }

            fn with_backend(backend: HashBackend) -> Self {
                Self {
                    state: $init,
                    buffer: [0u8; CHUNK],
                    used: 0,
                    wrote: 0,
                    backend,
                }
            }

            /// Absorbs `data` into the running hash state.
            pub fn process_bytes(&mut self, data: &[u8]) {
                self.wrote = self.wrote.wrapping_add(data.len() as u64);
                self.absorb(data);
            }

            fn absorb(&mut self, mut data: &[u8]) {
                if self.used > 0 {
                    let want = CHUNK - self.used;
                    let take = want.min(data.len());
                    self.buffer[self.used..self.used + take].copy_from_slice(&data[..take]);
                    self.used += take;
                    data = &data[take..];

                    if self.used == CHUNK {
                        let block = self.buffer;
                        compress(&block, &mut self.state, self.backend);
                        self.used = 0;
                    } else {
                        return;
                    }
                }

                while data.len() >= CHUNK {
                    let block: &[u8; CHUNK] = data[..CHUNK].try_into().unwrap();
                    compress(block, &mut self.state, self.backend);
                    data = &data[CHUNK..];
                }

                self.buffer[..data.len()].copy_from_slice(data);
                self.used = data.len();
            }

            /// Pads, drains the final chunk(s), and returns the digest.
            /// Consumes the context, so it cannot be finalized twice.
            pub fn finalize(mut self) -> [u8; $digest_len] {
                let bit_len = self.wrote << 3;

                let mut pad = [0u8; CHUNK];
                pad[0] = 0x80;
                let pad_len = if self.used < 56 {
                    56 - self.used
                } else {
                    CHUNK + 56 - self.used
                };
                self.absorb(&pad[..pad_len]);

                let mut len_block = [0u8; 8];
                len_block.copy_from_slice(&bit_len.to_be_bytes());
                self.absorb(&len_block);

                debug_assert_eq!(self.used, 0);

                let mut full = [0u8; 32];
                for (chunk, word) in full.chunks_exact_mut(4).zip(&self.state) {
                    chunk.copy_from_slice(&word.to_be_bytes());
                }

                let mut out = [0u8; $digest_len];
                out.copy_from_slice(&full[..$digest_len]);
                out
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Drop for $name {
            fn drop(&mut self) {
                crate::primitives::zeroize::zeroize(&mut self.buffer);
            }
        }
    };
}

sha256_family_context!(Sha256Context, H256_INIT, 32);
sha256_family_context!(Sha224Context, H224_INIT, 28);

/// Computes the SHA-256 digest of `input` in one call.
pub fn sha256(input: &[u8]) -> [u8; 32] {
    let mut ctx = Sha256Context::new();
    ctx.process_bytes(input);
    ctx.finalize()
}

/// Computes the SHA-224 digest of `input` in one call.
pub fn sha224(input: &[u8]) -> [u8; 28] {
    let mut ctx = Sha224Context::new();
    ctx.process_bytes(input);
    ctx.finalize()
}
