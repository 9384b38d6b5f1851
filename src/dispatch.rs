//! Single front door for constructing contexts.
//!
//! Every primitive already exposes `new`/`new_portable`/`new_simd` (or the
//! Camellia/CRC32 equivalents) directly on its own context type; these
//! `make_*` functions exist so callers who don't want to import three
//! module paths to hash a buffer and encrypt it can reach every context
//! from one place. They carry no logic beyond picking a back-end and
//! calling through — the dispatcher pattern is useful for discoverability,
//! not indirection.

use crate::camellia::{CamelliaBackend, CtrContext, EcbContext, generate};
use crate::crc32::{Crc32Backend, Crc32Context};
use crate::hash::{HashBackend, Sha1Context, Sha224Context, Sha256Context, Sha384Context, Sha512Context};

/// Builds the encrypt-direction key schedule and wraps it in an
/// [`EcbContext`], picking the strongest back-end the CPU supports.
pub fn make_ecb_encrypt_context(key: &[u8]) -> EcbContext {
    EcbContext::new(generate(key, true))
}

/// Like [`make_ecb_encrypt_context`], pinned to a specific back-end.
pub fn make_ecb_encrypt_context_with_backend(key: &[u8], backend: CamelliaBackend) -> EcbContext {
    EcbContext::with_backend(generate(key, true), backend)
}

/// Builds the decrypt-direction key schedule and wraps it in an
/// [`EcbContext`], picking the strongest back-end the CPU supports.
pub fn make_ecb_decrypt_context(key: &[u8]) -> EcbContext {
    EcbContext::new(generate(key, false))
}

/// Like [`make_ecb_decrypt_context`], pinned to a specific back-end.
pub fn make_ecb_decrypt_context_with_backend(key: &[u8], backend: CamelliaBackend) -> EcbContext {
    EcbContext::with_backend(generate(key, false), backend)
}

/// Builds a CTR keystream context, picking the strongest back-end the CPU
/// supports. CTR encryption and decryption share the same schedule, so
/// there is no separate decrypt variant.
pub fn make_ctr_context(key: &[u8], iv: [u8; 8], nonce: [u8; 4]) -> CtrContext {
    CtrContext::new(generate(key, true), iv, nonce)
}

/// Like [`make_ctr_context`], pinned to a specific back-end.
pub fn make_ctr_context_with_backend(
    key: &[u8],
    iv: [u8; 8],
    nonce: [u8; 4],
    backend: CamelliaBackend,
) -> CtrContext {
    CtrContext::with_backend(generate(key, true), iv, nonce, backend)
}

/// Starts a CRC32 computation, picking the strongest back-end the CPU
/// supports.
pub fn make_crc32_context() -> Crc32Context {
    Crc32Context::new()
}

/// Like [`make_crc32_context`], pinned to a specific back-end.
pub fn make_crc32_context_with_backend(backend: Crc32Backend) -> Crc32Context {
    Crc32Context::with_backend(backend)
}

/// Starts a SHA-1 computation, picking the strongest back-end the CPU
/// supports.
pub fn make_sha1_context() -> Sha1Context {
    Sha1Context::new()
}

/// Like [`make_sha1_context`], pinned to a specific back-end.
pub fn make_sha1_context_with_backend(backend: HashBackend) -> Sha1Context {
    match backend {
        HashBackend::Portable => Sha1Context::new_portable(),
        HashBackend::Simd => Sha1Context::new_simd(),
    }
}

/// Starts a SHA-224 computation, picking the strongest back-end the CPU
/// supports.
pub fn make_sha224_context() -> Sha224Context {
    Sha224Context::new()
}

/// Like [`make_sha224_context`], pinned to a specific back-end.
pub fn make_sha224_context_with_backend(backend: HashBackend) -> Sha224Context {
    match backend {
        HashBackend::Portable => Sha224Context::new_portable(),
        HashBackend::Simd => Sha224Context::new_simd(),
    }
}

/// Starts a SHA-256 computation, picking the strongest back-end the CPU
/// supports.
pub fn make_sha256_context() -> Sha256Context {
    Sha256Context::new()
}

/// Like [`make_sha256_context`], pinned to a specific back-end.
pub fn make_sha256_context_with_backend(backend: HashBackend) -> Sha256Context {
    match backend {
        HashBackend::Portable => Sha256Context::new_portable(),
        HashBackend::Simd => Sha256Context::new_simd(),
    }
}

/// Starts a SHA-384 computation, picking the strongest back-end the CPU
/// supports.
pub fn make_sha384_context() -> Sha384Context {
    Sha384Context::new()
}

/// Like [`make_sha384_context`], pinned to a specific back-end.
pub fn make_sha384_context_with_backend(backend: HashBackend) -> Sha384Context {
    match backend {
        HashBackend::Portable => Sha384Context::new_portable(),
        HashBackend::Simd => Sha384Context::new_simd(),
    }
}

/// Starts a SHA-512 computation, picking the strongest back-end the CPU
/// supports.
pub fn make_sha512_context() -> Sha512Context {
    Sha512Context::new()
}

/// Like [`make_sha512_context`], pinned to a specific back-end.
pub fn make_sha512_context_with_backend(backend: HashBackend) -> Sha512Context {
    match backend {
        HashBackend::Portable => Sha512Context::new_portable(),
        HashBackend::Simd => Sha512Context::new_simd(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecb_round_trips_through_the_factory() {
        let key = [0x5cu8; 16];
        let plaintext = [0x42u8; 32];

        let enc = make_ecb_encrypt_context(&key);
        let mut ciphertext = [0u8; 32];
        enc.process_blocks(&mut ciphertext, &plaintext, 32).unwrap();

        let dec = make_ecb_decrypt_context(&key);
        let mut recovered = [0u8; 32];
        dec.process_blocks(&mut recovered, &ciphertext, 32).unwrap();

        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn ctr_round_trips_through_the_factory() {
        let key = [0x7au8; 16];
        let iv = [1u8; 8];
        let nonce = [2u8; 4];
        let plaintext = b"dispatcher round trip test message".to_vec();

        let enc = make_ctr_context(&key, iv, nonce);
        let mut ciphertext = vec![0u8; plaintext.len()];
        enc.process_bytes(&mut ciphertext, &plaintext, 0, plaintext.len() as u64);

        let dec = make_ctr_context(&key, iv, nonce);
        let mut recovered = vec![0u8; plaintext.len()];
        dec.process_bytes(&mut recovered, &ciphertext, 0, ciphertext.len() as u64);

        assert_eq!(recovered, plaintext);
    }

    #[test]
    fn crc32_factory_matches_direct_checksum() {
        let mut ctx = make_crc32_context();
        ctx.update(b"factory parity");
        assert_eq!(ctx.current(), crate::crc32::checksum(b"factory parity"));
    }

    #[test]
    fn sha256_factory_matches_one_shot() {
        let mut ctx = make_sha256_context();
        ctx.process_bytes(b"abc");
        assert_eq!(ctx.finalize(), crate::hash::sha256::sha256(b"abc"));
    }
}
