//! One-time CPU capability probe.

use crate::caps::Caps;

#[cfg(all(target_arch = "x86_64", feature = "std"))]
use crate::caps::x86;

#[cfg(all(target_arch = "aarch64", feature = "std"))]
use crate::caps::aarch64;

/// Capabilities of the running CPU.
///
/// The probe runs at most once per process; later calls return the cached
/// set. Without the `std` feature only compile-time target features are
/// reported.
#[inline]
#[must_use]
pub fn caps() -> Caps {
  #[cfg(feature = "std")]
  {
    static CAPS: std::sync::OnceLock<Caps> = std::sync::OnceLock::new();
    *CAPS.get_or_init(probe)
  }
  #[cfg(not(feature = "std"))]
  {
    compile_time_caps()
  }
}

/// Capabilities guaranteed by the compile target, without a runtime probe.
const fn compile_time_caps() -> Caps {
  let mut caps = Caps::NONE;
  #[cfg(all(target_arch = "x86_64", target_feature = "ssse3"))]
  {
    caps = caps.union(crate::caps::x86::SSSE3);
  }
  #[cfg(all(target_arch = "x86_64", target_feature = "sse4.1"))]
  {
    caps = caps.union(crate::caps::x86::SSE41);
  }
  #[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
  {
    caps = caps.union(crate::caps::x86::AVX2);
  }
  #[cfg(all(target_arch = "aarch64", target_feature = "neon"))]
  {
    caps = caps.union(crate::caps::aarch64::NEON);
  }
  caps
}

#[cfg(feature = "std")]
fn probe() -> Caps {
  // Miri has no CPUID; report only what the target guarantees.
  if cfg!(miri) {
    return compile_time_caps();
  }
  runtime_caps()
}

#[cfg(all(target_arch = "x86_64", feature = "std"))]
fn runtime_caps() -> Caps {
  let mut caps = compile_time_caps();
  if std::arch::is_x86_feature_detected!("ssse3") {
    caps = caps | x86::SSSE3;
  }
  if std::arch::is_x86_feature_detected!("sse4.1") {
    caps = caps | x86::SSE41;
  }
  if std::arch::is_x86_feature_detected!("avx2") {
    caps = caps | x86::AVX2;
  }
  caps
}

#[cfg(all(target_arch = "aarch64", feature = "std"))]
fn runtime_caps() -> Caps {
  let mut caps = compile_time_caps();
  if std::arch::is_aarch64_feature_detected!("neon") {
    caps = caps | aarch64::NEON;
  }
  caps
}

#[cfg(all(
  not(target_arch = "x86_64"),
  not(target_arch = "aarch64"),
  feature = "std"
))]
fn runtime_caps() -> Caps {
  compile_time_caps()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn probe_is_stable() {
    // Two reads of the cache must agree.
    assert_eq!(caps(), caps());
  }

  #[test]
  fn probe_covers_compile_time_features() {
    assert!(caps().has(compile_time_caps()));
  }

  #[cfg(target_arch = "x86_64")]
  #[test]
  fn avx2_implies_sse41() {
    use crate::caps::x86;
    let caps = caps();
    if caps.has(x86::AVX2) {
      // No real CPU reports AVX2 without the SSE4 generation.
      assert!(caps.has(x86::SSE41));
      assert!(caps.has(x86::SSSE3));
    }
  }
}
