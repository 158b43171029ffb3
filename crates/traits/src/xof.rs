//! Extendable-output function (XOF) trait.

/// Extendable-output function producing an arbitrary number of bytes.
///
/// Squeezing is stateful: consecutive `squeeze` calls return consecutive
/// segments of a single output stream, so squeezing 64 bytes at once equals
/// squeezing 32 bytes twice.
///
/// This trait intentionally has no `std::io::Read` dependency; it is usable in
/// `no_std` environments.
pub trait Xof: Clone {
  /// Fill `out` with the next `out.len()` bytes of the output stream.
  fn squeeze(&mut self, out: &mut [u8]);
}
