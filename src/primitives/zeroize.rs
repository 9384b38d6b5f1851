//! Secret zeroization.
//!
//! Overwrites key material and working state on context teardown using a
//! volatile write the compiler is not permitted to elide as a dead store,
//! rather than pulling in an external `zeroize` crate for a two-function
//! need.

use core::sync::atomic::{Ordering, compiler_fence};

/// Overwrites every byte of `buf` with zero using a volatile write per byte,
/// then inserts a compiler fence so the store cannot be reordered away from
/// the point the secret's last reader observed it.
#[inline]
pub fn zeroize(buf: &mut [u8]) {
    for byte in buf.iter_mut() {
        // SAFETY: `byte` is a valid, aligned, writable `u8` reference for the
        // lifetime of this call; `write_volatile` never reads through it.
        unsafe { core::ptr::write_volatile(byte, 0) };
    }
    compiler_fence(Ordering::SeqCst);
}

/// Overwrites a fixed-size word array (used for `u32`/`u64` key schedules
/// that are not naturally represented as byte slices).
#[inline]
pub fn zeroize_u64(words: &mut [u64]) {
    for word in words.iter_mut() {
        // SAFETY: same as `zeroize`, for a `u64` lane.
        unsafe { core::ptr::write_volatile(word, 0) };
    }
    compiler_fence(Ordering::SeqCst);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeroize_clears_buffer() {
        let mut buf = [0xAAu8; 32];
        zeroize(&mut buf);
        assert_eq!(buf, [0u8; 32]);
    }

    #[test]
    fn zeroize_u64_clears_words() {
        let mut words = [u64::MAX; 4];
        zeroize_u64(&mut words);
        assert_eq!(words, [0u64; 4]);
    }
}
