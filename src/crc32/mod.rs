//! CRC32 (polynomial 0xEDB88320, reflected IEEE 802.3) with three
//! interchangeable back-ends.
//!
//! [`Crc32Context`] wraps a running state plus a fixed back-end choice;
//! [`update`] on each back-end module is a free function of
//! `(current, data) -> next` so the context itself carries no unsafe code.

mod avx2_clmul;
mod avx2_gather;
pub(crate) mod portable;

/// Which implementation a [`Crc32Context`] folds bytes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crc32Backend {
    /// Byte-wise table lookups; the only option off x86.
    Portable,
    /// Slice-by-16 table lookups issued as AVX2 gathers.
    Avx2Gather,
    /// Barrett-reduction carryless multiply (PCLMULQDQ).
    Avx2Clmul,
}

impl Crc32Backend {
    /// Picks the strongest back-end the running CPU supports.
    pub fn adaptive() -> Self {
        let f = crate::cpu::features();
        if f.avx2 && f.pclmulqdq {
            Crc32Backend::Avx2Clmul
        } else if f.avx2 {
            Crc32Backend::Avx2Gather
        } else {
            Crc32Backend::Portable
        }
    }

    fn update(self, current: u32, data: &[u8]) -> u32 {
        match self {
            Crc32Backend::Portable => portable::update(current, data),
            Crc32Backend::Avx2Gather => avx2_gather::update(current, data),
            Crc32Backend::Avx2Clmul => avx2_clmul::update(current, data),
        }
    }
}

/// A running CRC32 computation over one or more calls to [`update`].
///
/// `state` is always the *public* domain value (not internally
/// complemented) so [`current`] is a plain field read.
#[derive(Debug, Clone)]
pub struct Crc32Context {
    state: u32,
    backend: Crc32Backend,
}

impl Crc32Context {
    /// Starts a new computation from the conventional initial value zero,
    /// using the strongest back-end the CPU supports.
    pub fn new() -> Self {
        Self::with_backend(Crc32Backend::adaptive())
    }

    /// Starts a new computation pinned to a specific back-end, bypassing
    /// CPU detection. Useful for cross-back-end agreement tests and
    /// benchmarks.
    pub fn with_backend(backend: Crc32Backend) -> Self {
        Self { state: 0, backend }
    }

    /// Folds `data` into the running state.
    pub fn update(&mut self, data: &[u8]) {
        self.state = self.backend.update(self.state, data);
    }

    /// Returns the CRC32 of everything folded in so far.
    pub fn current(&self) -> u32 {
        self.state
    }

    /// Resets the running state to `initial`, keeping the chosen back-end.
    pub fn reset(&mut self, initial: u32) {
        self.state = initial;
    }
}

impl Default for Crc32Context {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot CRC32 of `data` starting from zero, using the strongest
/// back-end the CPU supports.
pub fn checksum(data: &[u8]) -> u32 {
    let mut ctx = Crc32Context::new();
    ctx.update(data);
    ctx.current()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(checksum(&[]), 0);
        assert_eq!(checksum(&[0x00]), 0xD202_EF8D);
        assert_eq!(checksum(&[0u8; 16]), 0xD7D3_03E7);
    }

    #[test]
    fn streaming_matches_one_shot() {
        let data = b"the quick brown fox jumps over the lazy dog, twice over";
        let mut ctx = Crc32Context::new();
        for chunk in data.chunks(7) {
            ctx.update(chunk);
        }
        assert_eq!(ctx.current(), checksum(data));
    }

    #[test]
    fn reset_resumes_from_a_chosen_initial_value() {
        let mut ctx = Crc32Context::new();
        ctx.update(b"hello");
        let mid = ctx.current();

        let mut replay = Crc32Context::new();
        replay.reset(0);
        replay.update(b"hello");
        assert_eq!(replay.current(), mid);
    }

    #[test]
    fn all_back_ends_agree() {
        let data: Vec<u8> = (0..513u32).map(|i| (i * 17) as u8).collect();
        let portable = {
            let mut c = Crc32Context::with_backend(Crc32Backend::Portable);
            c.update(&data);
            c.current()
        };

        if crate::cpu::features().avx2 {
            let mut c = Crc32Context::with_backend(Crc32Backend::Avx2Gather);
            c.update(&data);
            assert_eq!(c.current(), portable);
        }
        if crate::cpu::features().avx2 && crate::cpu::features().pclmulqdq {
            let mut c = Crc32Context::with_backend(Crc32Backend::Avx2Clmul);
            c.update(&data);
            assert_eq!(c.current(), portable);
        }
    }
}
