//! CPU capability bitset.

use core::fmt;
use core::ops::{BitAnd, BitOr};

/// A set of CPU instruction-set capabilities.
///
/// One bit per feature, partitioned by architecture (x86_64 in the low half,
/// aarch64 in the high half) so a `Caps` value is unambiguous regardless of
/// the target it was produced on. All operations are `const` and branch-free.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Caps(u64);

impl Caps {
  /// The empty set. Every machine satisfies it.
  pub const NONE: Self = Self(0);

  #[inline(always)]
  const fn from_bit(bit: u32) -> Self {
    Self(1u64 << bit)
  }

  /// Does this set contain every capability in `required`?
  #[inline(always)]
  #[must_use]
  pub const fn has(self, required: Self) -> bool {
    self.0 & required.0 == required.0
  }

  /// Set union.
  #[inline(always)]
  #[must_use]
  pub const fn union(self, other: Self) -> Self {
    Self(self.0 | other.0)
  }

  /// Set intersection.
  #[inline(always)]
  #[must_use]
  pub const fn intersection(self, other: Self) -> Self {
    Self(self.0 & other.0)
  }

  /// True when no capability bits are set.
  #[inline(always)]
  #[must_use]
  pub const fn is_empty(self) -> bool {
    self.0 == 0
  }
}

impl BitOr for Caps {
  type Output = Self;

  #[inline(always)]
  fn bitor(self, rhs: Self) -> Self {
    self.union(rhs)
  }
}

impl BitAnd for Caps {
  type Output = Self;

  #[inline(always)]
  fn bitand(self, rhs: Self) -> Self {
    self.intersection(rhs)
  }
}

impl fmt::Debug for Caps {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Caps({:#018x})", self.0)
  }
}

/// x86_64 capabilities (bits 0..32).
pub mod x86 {
  use super::Caps;

  pub const SSSE3: Caps = Caps::from_bit(0);
  pub const SSE41: Caps = Caps::from_bit(1);
  pub const AVX2: Caps = Caps::from_bit(2);
}

/// aarch64 capabilities (bits 32..64).
pub mod aarch64 {
  use super::Caps;

  pub const NEON: Caps = Caps::from_bit(32);
}
