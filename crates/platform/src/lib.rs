//! CPU capability detection for kernel dispatch.
//!
//! A [`Caps`] value is a bitset of instruction-set extensions the running CPU
//! supports. [`caps`] probes the CPU exactly once per process and caches the
//! result; dispatch code compares the cached set against each kernel's
//! required capabilities.
//!
//! ```ignore
//! if platform::caps().has(platform::x86::AVX2) {
//!   // Select the 8-lane kernel.
//! }
//! ```
//!
//! With the `std` feature the probe uses runtime detection
//! (`is_x86_feature_detected!` and friends). Without it, the set is fixed at
//! compile time from `cfg!(target_feature = ...)`.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

mod caps;
mod detect;

pub use caps::{aarch64, x86, Caps};
pub use detect::caps;
