//! The 128-bit Feistel round function (RFC 3713 §2, `process_block`).
//!
//! The same round function processes both directions: callers pass an
//! encrypt-ordered or decrypt-ordered [`KeyVector`] and get the matching
//! transform for free.

use crate::camellia::core::{f, fl, fl_inv};
use crate::camellia::key::KeyVector;
use crate::primitives::{load_u64_be, store_u64_be};

fn process_small(l: u64, r: u64, kv: &crate::camellia::key::SmallKeys) -> (u64, u64) {
    rounds_small(l ^ kv.kw1, r ^ kv.kw2, kv)
}

/// The round sequence and postwhitening for the 18-round schedule, assuming
/// the caller already applied `kw1`/`kw2` prewhitening to `(l, r)`. CTR mode
/// precomputes that XOR once into its counter vector and calls this directly
/// for every block, instead of paying the XOR per block.
pub(crate) fn rounds_small(
    mut l: u64,
    mut r: u64,
    kv: &crate::camellia::key::SmallKeys,
) -> (u64, u64) {
    r ^= f(l, kv.k[0]);
    l ^= f(r, kv.k[1]);
    r ^= f(l, kv.k[2]);
    l ^= f(r, kv.k[3]);
    r ^= f(l, kv.k[4]);
    l ^= f(r, kv.k[5]);
    l = fl(l, kv.kl[0]);
    r = fl_inv(r, kv.kl[1]);
    r ^= f(l, kv.k[6]);
    l ^= f(r, kv.k[7]);
    r ^= f(l, kv.k[8]);
    l ^= f(r, kv.k[9]);
    r ^= f(l, kv.k[10]);
    l ^= f(r, kv.k[11]);
    l = fl(l, kv.kl[2]);
    r = fl_inv(r, kv.kl[3]);
    r ^= f(l, kv.k[12]);
    l ^= f(r, kv.k[13]);
    r ^= f(l, kv.k[14]);
    l ^= f(r, kv.k[15]);
    r ^= f(l, kv.k[16]);
    l ^= f(r, kv.k[17]);

    let out_l = r ^ kv.kw3;
    let out_r = l ^ kv.kw4;
    (out_l, out_r)
}

fn process_large(l: u64, r: u64, kv: &crate::camellia::key::LargeKeys) -> (u64, u64) {
    rounds_large(l ^ kv.kw1, r ^ kv.kw2, kv)
}

/// The 24-round sibling of [`rounds_small`].
pub(crate) fn rounds_large(
    mut l: u64,
    mut r: u64,
    kv: &crate::camellia::key::LargeKeys,
) -> (u64, u64) {
    r ^= f(l, kv.k[0]);
    l ^= f(r, kv.k[1]);
    r ^= f(l, kv.k[2]);
    l ^= f(r, kv.k[3]);
    r ^= f(l, kv.k[4]);
    l ^= f(r, kv.k[5]);
    l = fl(l, kv.kl[0]);
    r = fl_inv(r, kv.kl[1]);
    r ^= f(l, kv.k[6]);
    l ^= f(r, kv.k[7]);
    r ^= f(l, kv.k[8]);
    l ^= f(r, kv.k[9]);
    r ^= f(l, kv.k[10]);
    l ^= f(r, kv.k[11]);
    l = fl(l, kv.kl[2]);
    r = fl_inv(r, kv.kl[3]);
    r ^= f(l, kv.k[12]);
    l ^= f(r, kv.k[13]);
    r ^= f(l, kv.k[14]);
    l ^= f(r, kv.k[15]);
    r ^= f(l, kv.k[16]);
    l ^= f(r, kv.k[17]);
    l = fl(l, kv.kl[4]);
    r = fl_inv(r, kv.kl[5]);
    r ^= f(l, kv.k[18]);
    l ^= f(r, kv.k[19]);
    r ^= f(l, kv.k[20]);
    l ^= f(r, kv.k[21]);
    r ^= f(l, kv.k[22]);
    l ^= f(r, kv.k[23]);

    let out_l = r ^ kv.kw3;
    let out_r = l ^ kv.kw4;
    (out_l, out_r)
}

/// Encrypts or decrypts one 16-byte block in place, depending on whether
/// `kv` was generated with `encrypting = true` or `false`.
pub fn process_block(block: &mut [u8; 16], kv: &KeyVector) {
    let l = load_u64_be(&block[0..8]);
    let r = load_u64_be(&block[8..16]);

    let (out_l, out_r) = match kv {
        KeyVector::Small(k) => process_small(l, r, k),
        KeyVector::Large(k) => process_large(l, r, k),
    };

    store_u64_be(&mut block[0..8], out_l);
    store_u64_be(&mut block[8..16], out_r);
}
