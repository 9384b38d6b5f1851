//! Back-end selection shared by every hash context.

/// Which compression-function implementation a context uses.
///
/// This is a closed, two-variant choice rather than a trait object:
/// exactly two back-ends exist, the dispatcher picks one at construction
/// time, and nothing outside this crate ever adds a third.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashBackend {
    /// Portable scalar message schedule and compression loop.
    Portable,
    /// AVX2-accelerated message-schedule precompute; the compression loop
    /// itself stays scalar and only the word-expansion is vectorized.
    Simd,
}

impl HashBackend {
    /// Picks the best back-end the current CPU supports.
    pub fn adaptive() -> Self {
        if crate::cpu::features().avx2 {
            HashBackend::Simd
        } else {
            HashBackend::Portable
        }
    }
}
