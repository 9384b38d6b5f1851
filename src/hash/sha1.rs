//! SHA-1 (FIPS 180-4 §6.1).

use crate::hash::backend::HashBackend;
use crate::primitives::load_u32_be;
use crate::tables::sha_constants::{H1_INIT, K1_0, K1_1, K1_2, K1_3};

const CHUNK: usize = 64;

#[inline(always)]
fn ch(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (!x & z)
}

#[inline(always)]
fn parity(x: u32, y: u32, z: u32) -> u32 {
    x ^ y ^ z
}

#[inline(always)]
fn maj(x: u32, y: u32, z: u32) -> u32 {
    (x & y) ^ (x & z) ^ (y & z)
}

fn expand_portable(w: &mut [u32; 80]) {
    for i in 16..80 {
        w[i] = (w[i - 3] ^ w[i - 8] ^ w[i - 14] ^ w[i - 16]).rotate_left(1);
    }
}

/// AVX2-gated message-schedule expansion.
///
/// Vectorizes the XOR term over 4-word quads using 128-bit integer ops; the
/// one lane per quad whose `W[i-3]` operand lands inside the same quad
/// (lane 3 depends on `W[i]`, written by lane 0 of the same store) is
/// patched up with a single scalar rotate after the vectorized quad is
/// stored.
#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
mod simd {
    use super::*;
    #[cfg(target_arch = "x86")]
    use core::arch::x86::*;
    #[cfg(target_arch = "x86_64")]
    use core::arch::x86_64::*;

    #[target_feature(enable = "avx2")]
    pub unsafe fn expand(w: &mut [u32; 80]) {
        let mut i = 16;
        while i < 80 {
            unsafe {
                let a = _mm_loadu_si128(w[i - 8..].as_ptr().cast());
                let b = _mm_loadu_si128(w[i - 14..].as_ptr().cast());
                let c = _mm_loadu_si128(w[i - 16..].as_ptr().cast());
                let mut t = _mm_xor_si128(_mm_xor_si128(a, b), c);

                // Lanes 0..3 still need W[i+k-3] XORed in; for k in 0..3 that
                // operand is already resident in memory (< i). Lane 3's
                // operand is W[i], produced by lane 0 below, so it is fixed
                // up afterward.
                let d = _mm_loadu_si128(w[i - 3..].as_ptr().cast());
                // d holds W[i-3..i+1); we only want lanes 0..3 of it as
                // W[i-3], W[i-2], W[i-1], W[i] — but W[i] isn't written yet,
                // so mask lane 3 out before combining.
                let mask = _mm_set_epi32(0, -1, -1, -1);
                let d_masked = _mm_and_si128(d, mask);
                t = _mm_xor_si128(t, d_masked);

                // rotate left by 1: (t << 1) | (t >> 31)
                let rotated = _mm_or_si128(_mm_slli_epi32(t, 1), _mm_srli_epi32(t, 31));
                let mut out = [0u32; 4];
                _mm_storeu_si128(out.as_mut_ptr().cast(), rotated);

                w[i] = out[0];
                w[i + 1] = out[1];
                w[i + 2] = out[2];
                // lane 3 depends on the freshly written w[i]; recompute in scalar.
                w[i + 3] = (w[i] ^ w[i - 5] ^ w[i - 11] ^ w[i - 13]).rotate_left(1);
            }
            i += 4;
        }
    }
}

fn compress(block: &[u8; CHUNK], state: &mut [u32; 5], backend: HashBackend) {
    let mut w = [0u32; 80];
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

    let [mut a, mut b, mut c, mut d, mut e] = *state;

    for (i, &wi) in w.iter().enumerate() {
        let (f, k) = match i {
            0..=19 => (ch(b, c, d), K1_0),
            20..=39 => (parity(b, c, d), K1_1),
            40..=59 => (maj(b, c, d), K1_2),
            _ => (parity(b, c, d), K1_3),
        };

        let t = a
            .rotate_left(5)
            .wrapping_add(f)
            .wrapping_add(e)
            .wrapping_add(k)
            .wrapping_add(wi);

        e = d;
        d = c;
        c = b.rotate_left(30);
        b = a;
        a = t;
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
    state[4] = state[4].wrapping_add(e);
}

/// Streaming SHA-1 context.
pub struct Sha1Context {
    state: [u32; 5],
    buffer: [u8; CHUNK],
    used: usize,
    wrote: u64,
    backend: HashBackend,
}

impl Sha1Context {
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
            "SIMD SHA-1 back-end requested on a CPU without AVX2"
        );
        Self::with_backend(HashBackend::Simd)
    }

    fn with_backend(backend: HashBackend) -> Self {
        Self {
            state: H1_INIT,
            buffer: [0u8; CHUNK],
            used: 0,
            wrote: 0,
            backend,
        }
    }

    /// Absorbs `data` into the running hash state.
    pub fn process_bytes(&mut self, mut data: &[u8]) {
        self.wrote = self.wrote.wrapping_add(data.len() as u64);

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

    /// Pads, drains the final chunk(s), and returns the 160-bit digest.
    /// Consumes the context, so it cannot be finalized twice.
    pub fn finalize(mut self) -> [u8; 20] {
        let bit_len = self.wrote << 3;

        let mut pad = [0u8; CHUNK];
        pad[0] = 0x80;
        let pad_len = if self.used < 56 {
            56 - self.used
        } else {
            CHUNK + 56 - self.used
        };
        self.process_bytes_raw(&pad[..pad_len]);

        let mut len_block = [0u8; 8];
        len_block.copy_from_slice(&bit_len.to_be_bytes());
        self.process_bytes_raw(&len_block);

        debug_assert_eq!(self.used, 0);

        let mut out = [0u8; 20];
        for (chunk, word) in out.chunks_exact_mut(4).zip(&self.state) {
            chunk.copy_from_slice(&word.to_be_bytes());
        }
        out
    }

    /// Like `process_bytes`, but does not perturb the byte counter — used
    /// internally by `finalize` once the counter has already been frozen.
    fn process_bytes_raw(&mut self, mut data: &[u8]) {
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
}

impl Default for Sha1Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Sha1Context {
    fn drop(&mut self) {
        crate::primitives::zeroize::zeroize(&mut self.buffer);
    }
}

/// Computes the SHA-1 digest of `input` in one call.
pub fn sha1(input: &[u8]) -> [u8; 20] {
    let mut ctx = Sha1Context::new();
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
    fn empty_vector() {
        assert_eq!(hex(&sha1(b"")), "da39a3ee5e6b4b0d3255bfef95601890afd80709");
    }

    #[test]
    fn abc_vector() {
        assert_eq!(hex(&sha1(b"abc")), "a9993e364706816aba3e25717850c26c9cd0d89d");
    }

    #[test]
    fn two_block_vector() {
        let msg = b"abcdbcdecdefdefgefghfghighijhijkijkljklmklmnlmnomnopnopq";
        assert_eq!(hex(&sha1(msg)), "84983e441c3bd26ebaae4aa1f95129e5e54670f1");
    }

    #[test]
    fn streaming_matches_one_shot() {
        let msg = vec![0x5au8; 300];
        let mut ctx = Sha1Context::new_portable();
        for chunk in msg.chunks(17) {
            ctx.process_bytes(chunk);
        }
        assert_eq!(ctx.finalize(), sha1(&msg));
    }

    #[test]
    fn portable_and_simd_agree() {
        let msg = vec![0x11u8; 1000];
        let mut portable = Sha1Context::new_portable();
        portable.process_bytes(&msg);

        let mut simd = if crate::cpu::features().avx2 {
            Sha1Context::new_simd()
        } else {
            Sha1Context::new_portable()
        };
        simd.process_bytes(&msg);

        assert_eq!(portable.finalize(), simd.finalize());
    }
}
