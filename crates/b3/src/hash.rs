//! The 32-byte digest value.

use core::fmt;

use traits::InvalidLength;

use crate::OUT_LEN;

const HEX_CHARS: &[u8; 16] = b"0123456789abcdef";

/// A BLAKE3 digest.
///
/// Equality comparison runs in constant time with respect to the digest
/// contents, so digests can safely double as MAC tags.
#[derive(Clone, Copy, Hash)]
pub struct Hash([u8; OUT_LEN]);

impl Hash {
  /// Wrap raw digest bytes.
  #[inline]
  #[must_use]
  pub const fn from_bytes(bytes: [u8; OUT_LEN]) -> Self {
    Self(bytes)
  }

  /// The raw digest bytes.
  #[inline]
  #[must_use]
  pub const fn as_bytes(&self) -> &[u8; OUT_LEN] {
    &self.0
  }

  /// Lowercase hex rendering, stack-allocated.
  #[must_use]
  pub fn to_hex(&self) -> HexDigest {
    let mut out = [0u8; OUT_LEN * 2];
    for (i, byte) in self.0.iter().enumerate() {
      out[i * 2] = HEX_CHARS[(byte >> 4) as usize];
      out[i * 2 + 1] = HEX_CHARS[(byte & 0x0f) as usize];
    }
    HexDigest(out)
  }
}

impl From<[u8; OUT_LEN]> for Hash {
  #[inline]
  fn from(bytes: [u8; OUT_LEN]) -> Self {
    Self(bytes)
  }
}

impl From<Hash> for [u8; OUT_LEN] {
  #[inline]
  fn from(hash: Hash) -> Self {
    hash.0
  }
}

impl TryFrom<&[u8]> for Hash {
  type Error = InvalidLength;

  fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
    if bytes.len() != OUT_LEN {
      return Err(InvalidLength::new(OUT_LEN, bytes.len()));
    }
    let mut out = [0u8; OUT_LEN];
    out.copy_from_slice(bytes);
    Ok(Self(out))
  }
}

impl PartialEq for Hash {
  #[inline]
  fn eq(&self, other: &Self) -> bool {
    constant_time_eq(&self.0, &other.0)
  }
}

impl PartialEq<[u8; OUT_LEN]> for Hash {
  #[inline]
  fn eq(&self, other: &[u8; OUT_LEN]) -> bool {
    constant_time_eq(&self.0, other)
  }
}

impl Eq for Hash {}

impl fmt::Display for Hash {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.to_hex().as_str())
  }
}

impl fmt::Debug for Hash {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Hash({})", self.to_hex().as_str())
  }
}

/// Bytewise equality without data-dependent branches.
///
/// The accumulator folds every byte pair before the single final compare.
/// `inline(never)` keeps the optimizer from specializing it per call site.
#[inline(never)]
fn constant_time_eq(a: &[u8; OUT_LEN], b: &[u8; OUT_LEN]) -> bool {
  let mut diff = 0u8;
  for (x, y) in a.iter().zip(b.iter()) {
    diff |= x ^ y;
  }
  diff == 0
}

/// Stack-allocated lowercase-hex rendering of a [`Hash`].
#[derive(Clone, Copy)]
pub struct HexDigest([u8; OUT_LEN * 2]);

impl HexDigest {
  /// The hex string.
  #[must_use]
  pub fn as_str(&self) -> &str {
    // Only ASCII hex digits are ever written.
    core::str::from_utf8(&self.0).unwrap_or("")
  }
}

impl core::ops::Deref for HexDigest {
  type Target = str;

  fn deref(&self) -> &str {
    self.as_str()
  }
}

impl AsRef<str> for HexDigest {
  fn as_ref(&self) -> &str {
    self.as_str()
  }
}

impl fmt::Display for HexDigest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl fmt::Debug for HexDigest {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(self.as_str(), f)
  }
}

#[cfg(test)]
mod tests {
  extern crate alloc;

  use alloc::format;

  use super::*;

  fn counting_hash() -> Hash {
    Hash::from_bytes(core::array::from_fn(|i| i as u8))
  }

  #[test]
  fn hex_rendering() {
    assert_eq!(
      counting_hash().to_hex().as_str(),
      "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f"
    );
    assert_eq!(Hash::from_bytes([0xff; OUT_LEN]).to_hex().len(), 64);
  }

  #[test]
  fn display_and_debug() {
    let hash = counting_hash();
    assert_eq!(format!("{hash}"), hash.to_hex().as_str());
    assert_eq!(format!("{hash:?}"), format!("Hash({})", hash.to_hex().as_str()));
  }

  #[test]
  fn equality() {
    let a = counting_hash();
    let b = counting_hash();
    let mut bytes = *a.as_bytes();
    bytes[31] ^= 1;
    let c = Hash::from_bytes(bytes);
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a, *b.as_bytes());
  }

  #[test]
  fn try_from_slice() {
    let bytes: [u8; OUT_LEN] = core::array::from_fn(|i| i as u8);
    let hash = Hash::try_from(&bytes[..]).unwrap();
    assert_eq!(hash, counting_hash());

    let err = Hash::try_from(&bytes[..31]).unwrap_err();
    assert_eq!(err.expected, OUT_LEN);
    assert_eq!(err.actual, 31);
    assert!(Hash::try_from([0u8; 33].as_slice()).is_err());
    assert!(Hash::try_from([0u8; 0].as_slice()).is_err());
  }

  #[test]
  fn array_conversions() {
    let hash = counting_hash();
    let bytes: [u8; OUT_LEN] = hash.into();
    assert_eq!(Hash::from(bytes), hash);
  }
}
