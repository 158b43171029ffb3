//! Error types for cryptographic operations.
//!
//! Minimal, zero-allocation error types. Individual crates may define
//! additional errors as needed.

use core::fmt;

/// A slice had the wrong length for the operation.
///
/// Returned when a runtime-sized buffer (a key, a digest) does not match the
/// fixed size an algorithm requires. Carries both sizes so callers can report
/// the mismatch without re-measuring.
///
/// # Examples
///
/// ```
/// use traits::InvalidLength;
///
/// fn key_from_slice(key: &[u8]) -> Result<[u8; 32], InvalidLength> {
///   if key.len() != 32 {
///     return Err(InvalidLength::new(32, key.len()));
///   }
///   let mut out = [0u8; 32];
///   out.copy_from_slice(key);
///   Ok(out)
/// }
///
/// assert!(key_from_slice(&[0u8; 16]).is_err());
/// assert!(key_from_slice(&[0u8; 32]).is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct InvalidLength {
  /// The length the operation requires.
  pub expected: usize,
  /// The length that was provided.
  pub actual: usize,
}

impl InvalidLength {
  /// Create a new length error.
  #[inline]
  #[must_use]
  pub const fn new(expected: usize, actual: usize) -> Self {
    Self { expected, actual }
  }
}

impl fmt::Display for InvalidLength {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "invalid length: expected {} bytes, got {}",
      self.expected, self.actual
    )
  }
}

impl core::error::Error for InvalidLength {}

#[cfg(test)]
mod tests {
  extern crate alloc;

  use alloc::{format, string::ToString};
  use core::hash::{Hash, Hasher};

  use super::*;

  // A minimal hasher for testing the Hash impl
  struct TestHasher(u64);

  impl Hasher for TestHasher {
    fn finish(&self) -> u64 {
      self.0
    }
    fn write(&mut self, bytes: &[u8]) {
      for &b in bytes {
        self.0 = self.0.wrapping_mul(31).wrapping_add(b as u64);
      }
    }
  }

  #[test]
  fn display_message() {
    assert_eq!(
      InvalidLength::new(32, 16).to_string(),
      "invalid length: expected 32 bytes, got 16"
    );
  }

  #[test]
  fn debug_impl() {
    let dbg = format!("{:?}", InvalidLength::new(32, 0));
    assert!(dbg.contains("InvalidLength"));
    assert!(dbg.contains("32"));
  }

  #[test]
  fn fields_accessible() {
    let e = InvalidLength::new(32, 31);
    assert_eq!(e.expected, 32);
    assert_eq!(e.actual, 31);
  }

  #[test]
  fn is_copy() {
    let e = InvalidLength::new(32, 16);
    let e2 = e; // Copy
    let e3 = e; // Still valid
    assert_eq!(e2, e3);
  }

  #[test]
  fn equality() {
    assert_eq!(InvalidLength::new(32, 16), InvalidLength::new(32, 16));
    assert_ne!(InvalidLength::new(32, 16), InvalidLength::new(32, 17));
  }

  #[test]
  fn hash_consistent() {
    fn hash_one<T: Hash>(t: &T) -> u64 {
      let mut h = TestHasher(0);
      t.hash(&mut h);
      h.finish()
    }

    let a = InvalidLength::new(32, 16);
    let b = InvalidLength::new(32, 16);
    assert_eq!(hash_one(&a), hash_one(&b));
  }

  #[test]
  fn result_err_path() {
    fn check(len: usize) -> Result<(), InvalidLength> {
      if len == 32 {
        Ok(())
      } else {
        Err(InvalidLength::new(32, len))
      }
    }
    assert!(check(32).is_ok());
    let err = check(0).unwrap_err();
    assert_eq!(err.actual, 0);
  }

  #[test]
  fn trait_bounds() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    fn assert_unpin<T: Unpin>() {}

    assert_send::<InvalidLength>();
    assert_sync::<InvalidLength>();
    assert_unpin::<InvalidLength>();
  }

  #[test]
  fn error_trait_impl() {
    use core::error::Error;

    fn assert_error<T: core::error::Error>() {}
    assert_error::<InvalidLength>();

    let err = InvalidLength::new(32, 16);
    assert!(err.source().is_none());
  }
}
