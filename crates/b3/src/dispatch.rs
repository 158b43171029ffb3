//! Kernel selection.
//!
//! One capability probe per process (cached inside `platform::caps`), then
//! the widest kernel the CPU supports. There is no per-call or per-size
//! selection; every hasher in the process uses the same kernel.

use platform::Caps;

use crate::kernels::{self, Kernel, KernelId};

/// Widest usable kernel for the given capability set.
fn preferred(caps: Caps) -> KernelId {
  #[cfg(target_arch = "x86_64")]
  {
    if caps.has(kernels::required_caps(KernelId::X86Avx2)) {
      return KernelId::X86Avx2;
    }
    if caps.has(kernels::required_caps(KernelId::X86Sse41)) {
      return KernelId::X86Sse41;
    }
  }
  #[cfg(target_arch = "aarch64")]
  {
    if caps.has(kernels::required_caps(KernelId::Aarch64Neon)) {
      return KernelId::Aarch64Neon;
    }
  }
  let _ = caps;
  KernelId::Portable
}

/// The kernel every hasher in this process uses.
#[inline]
pub(crate) fn active_kernel() -> Kernel {
  kernels::kernel(preferred(platform::caps()))
}

/// Name of the selected kernel, for diagnostics.
#[must_use]
pub fn active_kernel_name() -> &'static str {
  active_kernel().name()
}
