//! SHA-512 / SHA-384 (FIPS 180-4 §6.4). Same skeleton as SHA-256, widened to
//! 64-bit words, 128-byte chunks, and a 128-bit length field.

use crate::hash::backend::HashBackend;
use crate::primitives::load_u64_be;
use crate::tables::sha_constants::{H384_INIT, H512_INIT, K512};

const CHUNK: usize = 128;

#[inline(always)]
fn small_sigma0(x: u64) -> u64 {
    x.rotate_right(1) ^ x.rotate_right(8) ^ (x >> 7)
}

#[inline(always)]
fn small_sigma1(x: u64) -> u64 {
    x.rotate_right(19) ^ x.rotate_right(61) ^ (x >> 6)
}

#[inline(always)]
fn big_sigma0(x: u64) -> u64 {
    x.rotate_right(28) ^ x.rotate_right(34) ^ x.rotate_right(39)
}

#[inline(always)]
fn big_sigma1(x: u64) -> u64 {
    x.rotate_right(14) ^ x.rotate_right(18) ^ x.rotate_right(41)
}

#[inline(always)]
fn ch(x: u64, y: u64, z: u64) -> u64 {
    (x & y) ^ (!x & z)
}

#[inline(always)]
fn maj(x: u64, y: u64, z: u64) -> u64 {
    (x & y) ^ (x & z) ^ (y & z)
}

fn expand_portable(w: &mut [u64; 80]) {
    for i in 16..80 {
        w[i] = small_sigma1(w[i - 2])
            .wrapping_add(w[i - 7])
            .wrapping_add(small_sigma0(w[i - 15]))
            .wrapping_add(w[i - 16]);
    }
}

/// AVX2-gated message-schedule expansion, the 64-bit sibling of the
/// SHA-256 technique: the `T[k] = W[i+k-16] + sigma0(W[i+k-15]) + W[i+k-7]`
/// term vectorizes over a 2-wide 64-bit lane pair cleanly (no cross-pair
/// dependency), and the `sigma1(W[i+k-2])` term is patched in with a
/// 2-step scalar carry since lane 1 of each pair needs lane 0's result.
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
            let r1 = _mm_or_si128(_mm_srli_epi64(x, 1), _mm_slli_epi64(x, 63));
            let r8 = _mm_or_si128(_mm_srli_epi64(x, 8), _mm_slli_epi64(x, 56));
            let s7 = _mm_srli_epi64(x, 7);
            _mm_xor_si128(_mm_xor_si128(r1, r8), s7)
        }
    }

    #[target_feature(enable = "avx2")]
    pub unsafe fn expand(w: &mut [u64; 80]) {
        let mut i = 16;
        while i < 80 {
            unsafe {
                let w_m16 = _mm_loadu_si128(w[i - 16..].as_ptr().cast());
                let w_m15 = _mm_loadu_si128(w[i - 15..].as_ptr().cast());
                let w_m7 = _mm_loadu_si128(w[i - 7..].as_ptr().cast());

                let t = _mm_add_epi64(_mm_add_epi64(w_m16, sigma0_vec(w_m15)), w_m7);
                let mut t_words = [0u64; 2];
                _mm_storeu_si128(t_words.as_mut_ptr().cast(), t);

                w[i] = t_words[0].wrapping_add(small_sigma1(w[i - 2]));
                w[i + 1] = t_words[1].wrapping_add(small_sigma1(w[i - 1]));
            }
            i += 2;
        }
    }
}

fn compress(block: &[u8; CHUNK], state: &mut [u64; 8], backend: HashBackend) {
    let mut w = [0u64; 80];
    for (slot, chunk) in w.iter_mut().zip(block.chunks_exact(8)).take(16) {
        *slot = load_u64_be(chunk);
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

    for i in 0..80 {
        let t1 = h
            .wrapping_add(big_sigma1(e))
            .wrapping_add(ch(e, f, g))
            .wrapping_add(K512[i])
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

macro_rules! sha512_family_context {
    ($name:ident, $init:expr, $digest_len:expr) => {
        #[doc = "Streaming context."]
        pub struct $name {
            state: [u64; 8],
            buffer: [u8; CHUNK],
            used: usize,
            wrote: u128,
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
                self.wrote = self.wrote.wrapping_add(data.len() as u128);
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
                let pad_len = if self.used < 112 {
                    112 - self.used
                } else {
                    CHUNK + 112 - self.used
                };
                self.absorb(&pad[..pad_len]);

                let mut len_block = [0u8; 16];
                len_block.copy_from_slice(&bit_len.to_be_bytes());
                self.absorb(&len_block);

                debug_assert_eq!(self.used, 0);

                let mut full = [0u8; 64];
                for (chunk, word) in full.chunks_exact_mut(8).zip(&self.state) {
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

sha512_family_context!(Sha512Context, H512_INIT, 64);
sha512_family_context!(Sha384Context, H384_INIT, 48);

/// Computes the SHA-512 digest of `input` in one call.
pub fn sha512(input: &[u8]) -> [u8; 64] {
    let mut ctx = Sha512Context::new();
    ctx.process_bytes(input);
    ctx.finalize()
}

/// Computes the SHA-384 digest of `input` in one call.
pub fn sha384(input: &[u8]) -> [u8; 48] {
    let mut ctx = Sha384Context::new();
    ctx.process_bytes(input);
    ctx.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hex(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }

    #[test]
    fn sha512_empty_vector() {
        assert_eq!(
            hex(&sha512(b"")),
            "cf83e1357eefb8bdf1542850d66d8007d620e4050b5715dc83f4a921d36ce9ce47d0d13c5d85f2b0ff8318d2877eec2f63b931bd47417a81a538327af927da3e"
        );
    }

    #[test]
    fn sha512_abc_vector() {
        assert_eq!(
            hex(&sha512(b"abc")),
            "ddaf35a193617abacc417349ae20413112e6fa4e89a97ea20a9eeee64b55d39a2192992a274fc1a836ba3c23a3feebbd454d4423643ce80e2a9ac94fa54ca49f"
        );
    }

    #[test]
    fn sha384_abc_vector() {
        assert_eq!(
            hex(&sha384(b"abc")),
            "cb00753f45a35e8bb5a03d699ac65007272c32ab0eded1631a8b605a43ff5bed8086072ba1e7cc2358baeca134c825a7"
        );
    }

    #[test]
    fn streaming_matches_one_shot() {
        let msg = vec![0x99u8; 600];
        let mut ctx = Sha512Context::new_portable();
        for chunk in msg.chunks(47) {
            ctx.process_bytes(chunk);
        }
        assert_eq!(ctx.finalize(), sha512(&msg));
    }

    #[test]
    fn portable_and_simd_agree() {
        let msg = vec![0x33u8; 2000];
        let mut portable = Sha512Context::new_portable();
        portable.process_bytes(&msg);

        let mut simd = if crate::cpu::features().avx2 {
            Sha512Context::new_simd()
        } else {
            Sha512Context::new_portable()
        };
        simd.process_bytes(&msg);

        assert_eq!(portable.finalize(), simd.finalize());
    }
}
