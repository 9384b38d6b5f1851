//! Key schedule (RFC 3713 §3, Appendix A/B).
//!
//! Both key sizes share the same `KA`/`KB` derivation; only the set of
//! rotations applied to `KL`/`KR`/`KA`/`KB` to produce the round subkeys
//! differs. Encryption and decryption reuse the identical round function
//! ([`crate::camellia::block::process_block`]) by simply generating the
//! subkeys in reverse order, rather than writing a second round function.

use crate::camellia::core::{f, rotl128};
use crate::primitives::zeroize::zeroize_u64;

const SIGMA1: u64 = 0xA09E_667F_3BCC_908B;
const SIGMA2: u64 = 0xB67A_E858_4CAA_73B2;
const SIGMA3: u64 = 0xC6EF_372F_E94F_82BE;
const SIGMA4: u64 = 0x54FF_53A5_F1D3_6F1C;
const SIGMA5: u64 = 0x10E5_27FA_DE68_2D1D;
const SIGMA6: u64 = 0xB056_88C2_B3E6_C1FD;

/// Subkeys for a 128-bit Camellia key (18 rounds, RFC 3713 Appendix A).
#[derive(Clone)]
pub struct SmallKeys {
    pub kw1: u64,
    pub kw2: u64,
    pub k: [u64; 18],
    pub kl: [u64; 4],
    pub kw3: u64,
    pub kw4: u64,
}

/// Subkeys for a 192- or 256-bit Camellia key (24 rounds, RFC 3713 Appendix B).
#[derive(Clone)]
pub struct LargeKeys {
    pub kw1: u64,
    pub kw2: u64,
    pub k: [u64; 24],
    pub kl: [u64; 6],
    pub kw3: u64,
    pub kw4: u64,
}

/// The expanded round-key material for one direction (encrypt or decrypt)
/// of a given key size.
#[derive(Clone)]
pub enum KeyVector {
    Small(SmallKeys),
    Large(LargeKeys),
}

impl Drop for KeyVector {
    fn drop(&mut self) {
        match self {
            KeyVector::Small(k) => {
                zeroize_u64(core::slice::from_mut(&mut k.kw1));
                zeroize_u64(core::slice::from_mut(&mut k.kw2));
                zeroize_u64(&mut k.k);
                zeroize_u64(&mut k.kl);
                zeroize_u64(core::slice::from_mut(&mut k.kw3));
                zeroize_u64(core::slice::from_mut(&mut k.kw4));
            }
            KeyVector::Large(k) => {
                zeroize_u64(core::slice::from_mut(&mut k.kw1));
                zeroize_u64(core::slice::from_mut(&mut k.kw2));
                zeroize_u64(&mut k.k);
                zeroize_u64(&mut k.kl);
                zeroize_u64(core::slice::from_mut(&mut k.kw3));
                zeroize_u64(core::slice::from_mut(&mut k.kw4));
            }
        }
    }
}

fn load_be(bytes: &[u8]) -> u64 {
    u64::from_be_bytes(bytes[..8].try_into().unwrap())
}

/// Derives `KA` (and, for 192/256-bit keys, `KB`) from `KL`/`KR` per
/// RFC 3713 §3.
fn derive_ka_kb(kl: (u64, u64), kr: (u64, u64)) -> ((u64, u64), (u64, u64)) {
    let mut d1 = kl.0 ^ kr.0;
    let mut d2 = kl.1 ^ kr.1;
    d2 ^= f(d1, SIGMA1);
    d1 ^= f(d2, SIGMA2);
    d1 ^= kl.0;
    d2 ^= kl.1;
    d2 ^= f(d1, SIGMA3);
    d1 ^= f(d2, SIGMA4);
    let ka = (d1, d2);

    let mut d1 = ka.0 ^ kr.0;
    let mut d2 = ka.1 ^ kr.1;
    d2 ^= f(d1, SIGMA5);
    d1 ^= f(d2, SIGMA6);
    let kb = (d1, d2);

    (ka, kb)
}

/// Expands `key` (16, 24, or 32 bytes) into the round-key schedule used to
/// process blocks in the given direction.
///
/// # Panics
/// Panics if `key.len()` is not 16, 24, or 32.
pub fn generate(key: &[u8], encrypting: bool) -> KeyVector {
    match key.len() {
        16 => KeyVector::Small(generate_small(key, encrypting)),
        24 | 32 => KeyVector::Large(generate_large(key, encrypting)),
        _ => panic!("camellia key must be 16, 24, or 32 bytes"),
    }
}

fn generate_small(key: &[u8], encrypting: bool) -> SmallKeys {
    let kl = (load_be(&key[0..8]), load_be(&key[8..16]));
    let kr = (0u64, 0u64);
    let (ka, _kb) = derive_ka_kb(kl, kr);

    let r = |src: (u64, u64), n: u32| rotl128(src.0, src.1, n);

    let (kl0h, kl0l) = r(kl, 0);
    let (ka0h, ka0l) = r(ka, 0);
    let (kl15h, kl15l) = r(kl, 15);
    let (ka15h, ka15l) = r(ka, 15);
    let (ka30h, ka30l) = r(ka, 30);
    let (kl45h, kl45l) = r(kl, 45);
    let (ka45h, _ka45l) = r(ka, 45);
    let (_kl60h, kl60l) = r(kl, 60);
    let (ka60h, ka60l) = r(ka, 60);
    let (kl77h, kl77l) = r(kl, 77);
    let (kl94h, kl94l) = r(kl, 94);
    let (ka94h, ka94l) = r(ka, 94);
    let (kl111h, kl111l) = r(kl, 111);
    let (ka111h, ka111l) = r(ka, 111);

    let fwd = SmallKeys {
        kw1: kl0h,
        kw2: kl0l,
        k: [
            ka0h, ka0l, kl15h, kl15l, ka15h, ka15l, kl45h, kl45l, ka45h, kl60l, ka60h, ka60l,
            kl94h, kl94l, ka94h, ka94l, kl111h, kl111l,
        ],
        kl: [ka30h, ka30l, kl77h, kl77l],
        kw3: ka111h,
        kw4: ka111l,
    };

    if encrypting {
        fwd
    } else {
        SmallKeys {
            kw1: fwd.kw3,
            kw2: fwd.kw4,
            k: {
                let mut rev = fwd.k;
                rev.reverse();
                rev
            },
            kl: {
                let mut rev = fwd.kl;
                rev.reverse();
                rev
            },
            kw3: fwd.kw1,
            kw4: fwd.kw2,
        }
    }
}

fn generate_large(key: &[u8], encrypting: bool) -> LargeKeys {
    let kl = (load_be(&key[0..8]), load_be(&key[8..16]));
    let kr = if key.len() == 24 {
        let k2 = load_be(&key[16..24]);
        (k2, !k2)
    } else {
        (load_be(&key[16..24]), load_be(&key[24..32]))
    };
    let (ka, kb) = derive_ka_kb(kl, kr);

    let r = |src: (u64, u64), n: u32| rotl128(src.0, src.1, n);

    let (kl0h, kl0l) = r(kl, 0);
    let (kb0h, kb0l) = r(kb, 0);
    let (kr15h, kr15l) = r(kr, 15);
    let (ka15h, ka15l) = r(ka, 15);
    let (kr30h, kr30l) = r(kr, 30);
    let (kb30h, kb30l) = r(kb, 30);
    let (kl45h, kl45l) = r(kl, 45);
    let (ka45h, ka45l) = r(ka, 45);
    let (kl60h, kl60l) = r(kl, 60);
    let (kr60h, kr60l) = r(kr, 60);
    let (kb60h, kb60l) = r(kb, 60);
    let (kl77h, kl77l) = r(kl, 77);
    let (ka77h, ka77l) = r(ka, 77);
    let (kr94h, kr94l) = r(kr, 94);
    let (ka94h, ka94l) = r(ka, 94);
    let (kl111h, kl111l) = r(kl, 111);
    let (kb111h, kb111l) = r(kb, 111);

    let fwd = LargeKeys {
        kw1: kl0h,
        kw2: kl0l,
        k: [
            kb0h, kb0l, kr15h, kr15l, ka15h, ka15l, kb30h, kb30l, kl45h, kl45l, ka45h, ka45l,
            kr60h, kr60l, kb60h, kb60l, kl77h, kl77l, kr94h, kr94l, ka94h, ka94l, kl111h, kl111l,
        ],
        kl: [kr30h, kr30l, kl60h, kl60l, ka77h, ka77l],
        kw3: kb111h,
        kw4: kb111l,
    };

    if encrypting {
        fwd
    } else {
        LargeKeys {
            kw1: fwd.kw3,
            kw2: fwd.kw4,
            k: {
                let mut rev = fwd.k;
                rev.reverse();
                rev
            },
            kl: {
                let mut rev = fwd.kl;
                rev.reverse();
                rev
            },
            kw3: fwd.kw1,
            kw4: fwd.kw2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encrypt_and_decrypt_schedules_are_reverses_of_each_other() {
        let key = [0x11u8; 16];
        let enc = generate(&key, true);
        let dec = generate(&key, false);
        if let (KeyVector::Small(ref e), KeyVector::Small(ref d)) = (enc, dec) {
            assert_eq!(e.kw1, d.kw3);
            assert_eq!(e.kw2, d.kw4);
            assert_eq!(e.k[0], d.k[17]);
            assert_eq!(e.k[17], d.k[0]);
        } else {
            panic!("expected small key vectors");
        }
    }
}
