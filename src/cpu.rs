//! CPU feature probe.
//!
//! Reports a fixed set of booleans describing the running CPU, cached after
//! the first query. Structurally this is the same per-target `#[cfg]`
//! dispatch idiom as an OS-abstraction layer (conditionally compiling a
//! platform-specific module per `target_os`), keyed on `target_arch` and
//! ISA extension bits instead of the operating system. On non-x86 targets
//! every flag is `false` and callers must fall back to the portable
//! back-ends.

use std::sync::OnceLock;

/// Snapshot of the ISA extensions the dispatcher cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CpuFeatures {
    pub sse2: bool,
    pub ssse3: bool,
    pub sse41: bool,
    pub sse42: bool,
    pub avx: bool,
    pub avx2: bool,
    pub bmi2: bool,
    pub pclmulqdq: bool,
    pub aesni: bool,
}

#[cfg(any(target_arch = "x86", target_arch = "x86_64"))]
fn probe() -> CpuFeatures {
    CpuFeatures {
        sse2: is_x86_feature_detected!("sse2"),
        ssse3: is_x86_feature_detected!("ssse3"),
        sse41: is_x86_feature_detected!("sse4.1"),
        sse42: is_x86_feature_detected!("sse4.2"),
        avx: is_x86_feature_detected!("avx"),
        avx2: is_x86_feature_detected!("avx2"),
        bmi2: is_x86_feature_detected!("bmi2"),
        pclmulqdq: is_x86_feature_detected!("pclmulqdq"),
        aesni: is_x86_feature_detected!("aes"),
    }
}

#[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
fn probe() -> CpuFeatures {
    CpuFeatures::default()
}

static FEATURES: OnceLock<CpuFeatures> = OnceLock::new();

/// Returns the cached CPU feature snapshot for this process, probing the
/// hardware on first call.
pub fn features() -> CpuFeatures {
    *FEATURES.get_or_init(probe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn features_is_stable_across_calls() {
        assert_eq!(features(), features());
    }

    #[test]
    #[cfg(not(any(target_arch = "x86", target_arch = "x86_64")))]
    fn non_x86_is_all_false() {
        assert_eq!(features(), CpuFeatures::default());
    }
}
