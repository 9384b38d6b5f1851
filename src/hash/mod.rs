//! SHA-1 / SHA-2 streaming hash engine.
//!
//! Each digest size has its own context type (`Sha1Context`, `Sha224Context`,
//! `Sha256Context`, `Sha384Context`, `Sha512Context`) built around the same
//! Merkle–Damgård skeleton: a byte counter, a pending-chunk buffer, and a
//! compression step dispatched to a chosen back-end. `finalize` takes `self`
//! by value, so the "at most once" rule from the streaming contract is
//! enforced by the borrow checker rather than a runtime flag — once a
//! context is finalized there is no longer a context to misuse.

mod backend;
pub mod sha1;
pub mod sha256;
pub mod sha512;

pub use backend::HashBackend;
pub use sha1::Sha1Context;
pub use sha256::{Sha224Context, Sha256Context};
pub use sha512::{Sha384Context, Sha512Context};
