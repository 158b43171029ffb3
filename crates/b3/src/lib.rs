//! BLAKE3: a Merkle-tree hash with SIMD batch kernels and an optional
//! multi-threaded driver for large inputs.
//!
//! Three modes share one engine:
//!
//! - [`Blake3::new`]: plain hashing
//! - [`Blake3::new_keyed`]: keyed hashing with a 32-byte key
//! - [`Blake3::new_derive_key`]: context-separated key derivation
//!
//! Output is extendable and seekable. [`Blake3::finalize`] returns the
//! 32-byte [`Hash`], [`Blake3::finalize_seek`] reads the output stream at an
//! arbitrary byte offset, and [`Blake3::finalize_xof`] returns a streaming
//! [`Blake3Xof`]. Finalization never consumes the hasher.
//!
//! The compression kernel is chosen once per process from the CPU's
//! capabilities (see [`active_kernel_name`]); all kernels are bit-identical.
//! With the `parallel` feature, [`Blake3::update_with_join`] hashes large
//! inputs on the rayon thread pool, again bit-identically.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
// Fixed-size arrays indexed with in-range constants throughout.
#![allow(clippy::indexing_slicing)]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

use zeroize::Zeroize;

mod dispatch;
mod hash;
mod kernels;
mod portable;

#[cfg(target_arch = "aarch64")]
mod aarch64;
#[cfg(target_arch = "x86_64")]
mod x86_64;

#[cfg(feature = "parallel")]
mod join;

#[cfg(test)]
mod kernel_tests;

pub use dispatch::active_kernel_name;
pub use hash::{Hash, HexDigest};
pub use traits::{Digest, InvalidLength, Xof};

use kernels::Kernel;

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Digest length in bytes.
pub const OUT_LEN: usize = 32;
/// Key length in bytes for keyed mode.
pub const KEY_LEN: usize = 32;
/// Compression block length in bytes.
pub const BLOCK_LEN: usize = 64;
/// Chunk length in bytes; one chunk is one leaf of the tree.
pub const CHUNK_LEN: usize = 1024;

// Domain flags for the compression function.
pub(crate) const CHUNK_START: u32 = 1 << 0;
pub(crate) const CHUNK_END: u32 = 1 << 1;
pub(crate) const PARENT: u32 = 1 << 2;
pub(crate) const ROOT: u32 = 1 << 3;
pub(crate) const KEYED_HASH: u32 = 1 << 4;
pub(crate) const DERIVE_KEY_CONTEXT: u32 = 1 << 5;
pub(crate) const DERIVE_KEY_MATERIAL: u32 = 1 << 6;

pub(crate) const IV: [u32; 8] = [
  0x6A09_E667,
  0xBB67_AE85,
  0x3C6E_F372,
  0xA54F_F53A,
  0x510E_527F,
  0x9B05_688C,
  0x1F83_D9AB,
  0x5BE0_CD19,
];

/// Message word order per round: each row is the fixed permutation applied
/// to the row above it.
pub(crate) const MSG_SCHEDULE: [[usize; 16]; 7] = [
  [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15],
  [2, 6, 3, 10, 7, 0, 4, 13, 1, 11, 12, 5, 9, 14, 15, 8],
  [3, 4, 10, 12, 13, 2, 7, 14, 6, 5, 9, 0, 11, 15, 8, 1],
  [10, 7, 12, 9, 14, 3, 13, 15, 4, 0, 11, 2, 5, 8, 1, 6],
  [12, 13, 9, 11, 15, 10, 14, 8, 7, 2, 5, 3, 0, 1, 6, 4],
  [9, 14, 11, 5, 8, 12, 15, 1, 13, 3, 0, 10, 2, 6, 4, 7],
  [11, 15, 5, 0, 1, 9, 8, 6, 14, 10, 2, 12, 3, 4, 7, 13],
];

/// CV stack depth. Each level doubles the input bound; 32 levels cover
/// 4 TiB, which is this implementation's input limit.
const MAX_DEPTH: usize = 32;
/// Widest batch any kernel processes per SIMD pass.
pub(crate) const MAX_SIMD_DEGREE: usize = 8;

// ─────────────────────────────────────────────────────────────────────────────
// Little-endian word helpers
// ─────────────────────────────────────────────────────────────────────────────

#[inline]
pub(crate) fn words8_from_le_bytes_32(bytes: &[u8; 32]) -> [u32; 8] {
  let mut words = [0u32; 8];
  for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
    *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
  }
  words
}

#[inline]
pub(crate) fn words16_from_le_bytes(bytes: &[u8]) -> [u32; 16] {
  debug_assert_eq!(bytes.len(), BLOCK_LEN);
  let mut words = [0u32; 16];
  for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
    *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
  }
  words
}

#[inline]
pub(crate) fn words8_to_le_bytes(words: &[u32; 8]) -> [u8; 32] {
  let mut bytes = [0u8; 32];
  for (chunk, word) in bytes.chunks_exact_mut(4).zip(words.iter()) {
    chunk.copy_from_slice(&word.to_le_bytes());
  }
  bytes
}

#[inline]
pub(crate) fn words16_to_le_bytes(words: &[u32; 16]) -> [u8; 64] {
  let mut bytes = [0u8; 64];
  for (chunk, word) in bytes.chunks_exact_mut(4).zip(words.iter()) {
    chunk.copy_from_slice(&word.to_le_bytes());
  }
  bytes
}

#[inline]
pub(crate) fn first_8_words(words: [u32; 16]) -> [u32; 8] {
  [
    words[0], words[1], words[2], words[3], words[4], words[5], words[6], words[7],
  ]
}

// ─────────────────────────────────────────────────────────────────────────────
// Chunk state
// ─────────────────────────────────────────────────────────────────────────────

/// Absorbs the bytes of one chunk and produces its chaining value.
///
/// The trailing block is always held back in the buffer and compressed only
/// once more input arrives, so `output` can still apply `CHUNK_END` to it.
/// The buffer is kept zero-padded past `block_len`.
#[derive(Clone, Copy)]
struct ChunkState {
  chaining_value: [u32; 8],
  chunk_counter: u64,
  block: [u8; BLOCK_LEN],
  block_len: u8,
  blocks_compressed: u8,
  flags: u32,
}

impl ChunkState {
  fn new(key_words: [u32; 8], chunk_counter: u64, flags: u32) -> Self {
    Self {
      chaining_value: key_words,
      chunk_counter,
      block: [0; BLOCK_LEN],
      block_len: 0,
      blocks_compressed: 0,
      flags,
    }
  }

  /// Bytes absorbed so far, compressed or buffered.
  fn len(&self) -> usize {
    BLOCK_LEN * self.blocks_compressed as usize + self.block_len as usize
  }

  fn start_flag(&self) -> u32 {
    if self.blocks_compressed == 0 {
      CHUNK_START
    } else {
      0
    }
  }

  fn compress_buffered_block(&mut self, kernel: Kernel) {
    debug_assert_eq!(self.block_len as usize, BLOCK_LEN);
    kernels::chunk_compress_blocks(
      kernel,
      &mut self.chaining_value,
      self.chunk_counter,
      self.flags,
      &mut self.blocks_compressed,
      &self.block,
    );
    self.block = [0; BLOCK_LEN];
    self.block_len = 0;
  }

  fn update(&mut self, kernel: Kernel, mut input: &[u8]) {
    debug_assert!(self.len() + input.len() <= CHUNK_LEN);

    if self.block_len as usize == BLOCK_LEN && !input.is_empty() {
      self.compress_buffered_block(kernel);
    }

    // Top up a partial buffered block first.
    if self.block_len != 0 {
      let want = BLOCK_LEN - self.block_len as usize;
      let take = want.min(input.len());
      self.block[self.block_len as usize..self.block_len as usize + take]
        .copy_from_slice(&input[..take]);
      self.block_len += take as u8;
      input = &input[take..];
      if input.is_empty() {
        return;
      }
      self.compress_buffered_block(kernel);
    }

    // Whole blocks straight from the caller, always leaving at least one
    // block's worth behind for the buffer.
    let mut full_blocks = input.len() / BLOCK_LEN;
    if full_blocks != 0 && input.len() % BLOCK_LEN == 0 {
      full_blocks -= 1;
    }
    if full_blocks != 0 {
      let split = full_blocks * BLOCK_LEN;
      kernels::chunk_compress_blocks(
        kernel,
        &mut self.chaining_value,
        self.chunk_counter,
        self.flags,
        &mut self.blocks_compressed,
        &input[..split],
      );
      input = &input[split..];
    }

    if !input.is_empty() {
      self.block[..input.len()].copy_from_slice(input);
      self.block_len = input.len() as u8;
    }
  }

  fn output(&self, kernel: Kernel) -> Output {
    Output {
      kernel,
      input_chaining_value: self.chaining_value,
      block_words: words16_from_le_bytes(&self.block),
      counter: self.chunk_counter,
      block_len: u32::from(self.block_len),
      flags: self.flags | self.start_flag() | CHUNK_END,
    }
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// Output
// ─────────────────────────────────────────────────────────────────────────────

/// A finalization point: the inputs of a node's last compression, with
/// `ROOT` applied lazily. The same state can yield the node's chaining value
/// (as an interior node) or any window of root output.
#[derive(Clone, Copy)]
struct Output {
  kernel: Kernel,
  input_chaining_value: [u32; 8],
  block_words: [u32; 16],
  counter: u64,
  block_len: u32,
  flags: u32,
}

impl Output {
  fn chaining_value(&self) -> [u32; 8] {
    first_8_words((self.kernel.compress)(
      &self.input_chaining_value,
      &self.block_words,
      self.counter,
      self.block_len,
      self.flags,
    ))
  }

  fn root_hash_words(&self) -> [u32; 8] {
    first_8_words((self.kernel.compress)(
      &self.input_chaining_value,
      &self.block_words,
      0,
      self.block_len,
      self.flags | ROOT,
    ))
  }

  /// Fill `out` with root output starting at byte `offset` of the stream.
  ///
  /// Output block `n` is the root compression with counter `n`, so a seek is
  /// a block counter plus an intra-block skip.
  fn root_bytes_at(&self, offset: u64, out: &mut [u8]) {
    let mut block_counter = offset / BLOCK_LEN as u64;
    let mut skip = (offset % BLOCK_LEN as u64) as usize;
    let mut rest = out;
    while !rest.is_empty() {
      let words = (self.kernel.compress)(
        &self.input_chaining_value,
        &self.block_words,
        block_counter,
        self.block_len,
        self.flags | ROOT,
      );
      let block = words16_to_le_bytes(&words);
      let take = (BLOCK_LEN - skip).min(rest.len());
      let (head, tail) = rest.split_at_mut(take);
      head.copy_from_slice(&block[skip..skip + take]);
      rest = tail;
      skip = 0;
      block_counter += 1;
    }
  }
}

fn parent_output(
  kernel: Kernel,
  left: [u32; 8],
  right: [u32; 8],
  key_words: [u32; 8],
  flags: u32,
) -> Output {
  let mut block_words = [0u32; 16];
  block_words[..8].copy_from_slice(&left);
  block_words[8..].copy_from_slice(&right);
  Output {
    kernel,
    input_chaining_value: key_words,
    block_words,
    counter: 0,
    block_len: BLOCK_LEN as u32,
    flags: flags | PARENT,
  }
}

fn single_chunk_output(
  kernel: Kernel,
  key_words: [u32; 8],
  chunk_counter: u64,
  flags: u32,
  input: &[u8],
) -> Output {
  debug_assert!(input.len() <= CHUNK_LEN);
  let mut state = ChunkState::new(key_words, chunk_counter, flags);
  state.update(kernel, input);
  state.output(kernel)
}

fn derive_context_key(context: &[u8]) -> [u32; 8] {
  let kernel = dispatch::active_kernel();
  if context.len() <= CHUNK_LEN {
    return single_chunk_output(kernel, IV, 0, DERIVE_KEY_CONTEXT, context).root_hash_words();
  }
  let mut hasher = Blake3::with_key_words(IV, DERIVE_KEY_CONTEXT);
  hasher.update(context);
  hasher.root_output().root_hash_words()
}

// ─────────────────────────────────────────────────────────────────────────────
// Hasher
// ─────────────────────────────────────────────────────────────────────────────

/// Incremental BLAKE3 hasher covering all three modes.
#[derive(Clone)]
pub struct Blake3 {
  kernel: Kernel,
  chunk_state: ChunkState,
  key_words: [u32; 8],
  cv_stack: [[u32; 8]; MAX_DEPTH],
  cv_stack_len: u8,
  flags: u32,
}

impl Blake3 {
  fn with_key_words(key_words: [u32; 8], flags: u32) -> Self {
    Self {
      kernel: dispatch::active_kernel(),
      chunk_state: ChunkState::new(key_words, 0, flags),
      key_words,
      cv_stack: [[0u32; 8]; MAX_DEPTH],
      cv_stack_len: 0,
      flags,
    }
  }

  /// Plain hash mode.
  #[must_use]
  pub fn new() -> Self {
    Self::with_key_words(IV, 0)
  }

  /// Keyed mode with a 32-byte key.
  #[must_use]
  pub fn new_keyed(key: &[u8; KEY_LEN]) -> Self {
    Self::with_key_words(words8_from_le_bytes_32(key), KEYED_HASH)
  }

  /// Keyed mode from a runtime-sized key slice.
  pub fn new_keyed_from_slice(key: &[u8]) -> Result<Self, InvalidLength> {
    if key.len() != KEY_LEN {
      return Err(InvalidLength::new(KEY_LEN, key.len()));
    }
    let mut key_bytes = [0u8; KEY_LEN];
    key_bytes.copy_from_slice(key);
    let hasher = Self::new_keyed(&key_bytes);
    key_bytes.zeroize();
    Ok(hasher)
  }

  /// Derive-key mode. The context string should be hardcoded, globally
  /// unique, and application-specific.
  #[must_use]
  pub fn new_derive_key(context: &str) -> Self {
    Self::new_derive_key_bytes(context.as_bytes())
  }

  /// Derive-key mode with a raw-byte context.
  #[must_use]
  pub fn new_derive_key_bytes(context: &[u8]) -> Self {
    Self::with_key_words(derive_context_key(context), DERIVE_KEY_MATERIAL)
  }

  /// Absorb more input. Empty input is a no-op.
  pub fn update(&mut self, mut input: &[u8]) {
    while !input.is_empty() {
      // A finished chunk only rolls over once a byte beyond it arrives, so
      // the input's final chunk always finalizes through the chunk state.
      if self.chunk_state.len() == CHUNK_LEN {
        let chunk_cv = self.chunk_state.output(self.kernel).chaining_value();
        let total_chunks = self.chunk_state.chunk_counter + 1;
        self.add_chunk_chaining_value(chunk_cv, total_chunks);
        self.chunk_state = ChunkState::new(self.key_words, total_chunks, self.flags);
      }

      if self.chunk_state.len() == 0 && self.kernel.simd_degree > 1 {
        if let Some(consumed) = self.batch_full_chunks(input) {
          input = &input[consumed..];
          continue;
        }
      }

      let want = CHUNK_LEN - self.chunk_state.len();
      let take = want.min(input.len());
      self.chunk_state.update(self.kernel, &input[..take]);
      input = &input[take..];
    }
  }

  /// Hash whole leading chunks through the wide kernel, committing their
  /// CVs in order. The input's last chunk is never batched; when the input
  /// ends exactly on a chunk boundary the trailing full chunk is held back
  /// for the chunk state.
  fn batch_full_chunks(&mut self, input: &[u8]) -> Option<usize> {
    debug_assert_eq!(self.chunk_state.len(), 0);
    let full_chunks = input.len() / CHUNK_LEN;
    let batchable = if input.len() % CHUNK_LEN == 0 {
      full_chunks.saturating_sub(1)
    } else {
      full_chunks
    };
    if batchable == 0 {
      return None;
    }

    let batch = batchable.min(self.kernel.simd_degree);
    let base = self.chunk_state.chunk_counter;
    let mut cvs = [[0u32; 8]; MAX_SIMD_DEGREE];
    // SAFETY: `input` holds at least `batch * CHUNK_LEN` bytes, `cvs` has
    // `MAX_SIMD_DEGREE >= batch` slots, and dispatch verified the kernel's
    // CPU requirements at selection time.
    unsafe {
      (self.kernel.hash_chunks)(
        input.as_ptr(),
        batch,
        &self.key_words,
        base,
        self.flags,
        cvs.as_mut_ptr(),
      );
    }
    for (i, cv) in cvs.iter().take(batch).enumerate() {
      self.add_chunk_chaining_value(*cv, base + i as u64 + 1);
    }
    cvs.zeroize();
    self.chunk_state.chunk_counter = base + batch as u64;
    Some(batch * CHUNK_LEN)
  }

  /// Push a finished chunk's CV, merging completed subtrees first.
  ///
  /// `total_chunks` counts every chunk absorbed so far; its trailing zero
  /// bits say how many sibling subtrees this CV completes.
  fn add_chunk_chaining_value(&mut self, mut new_cv: [u32; 8], mut total_chunks: u64) {
    while total_chunks & 1 == 0 {
      let left = self.pop_stack();
      new_cv = parent_output(self.kernel, left, new_cv, self.key_words, self.flags)
        .chaining_value();
      total_chunks >>= 1;
    }
    self.push_stack(new_cv);
  }

  fn push_stack(&mut self, cv: [u32; 8]) {
    debug_assert!((self.cv_stack_len as usize) < MAX_DEPTH);
    self.cv_stack[self.cv_stack_len as usize] = cv;
    self.cv_stack_len += 1;
  }

  fn pop_stack(&mut self) -> [u32; 8] {
    debug_assert!(self.cv_stack_len > 0);
    self.cv_stack_len -= 1;
    let cv = self.cv_stack[self.cv_stack_len as usize];
    // Popped slots are cleared so stale CVs never linger.
    self.cv_stack[self.cv_stack_len as usize] = [0u32; 8];
    cv
  }

  /// The root node: the active chunk's output folded under every stacked
  /// subtree CV, rightmost first.
  fn root_output(&self) -> Output {
    let mut output = self.chunk_state.output(self.kernel);
    let mut parents_remaining = self.cv_stack_len as usize;
    while parents_remaining > 0 {
      parents_remaining -= 1;
      output = parent_output(
        self.kernel,
        self.cv_stack[parents_remaining],
        output.chaining_value(),
        self.key_words,
        self.flags,
      );
    }
    output
  }

  /// The 32-byte digest. Non-destructive and repeatable.
  #[must_use]
  pub fn finalize(&self) -> Hash {
    Hash::from_bytes(words8_to_le_bytes(&self.root_output().root_hash_words()))
  }

  /// Fill `out` with root output; any length.
  pub fn finalize_into(&self, out: &mut [u8]) {
    self.root_output().root_bytes_at(0, out);
  }

  /// Fill `out` with root output starting at byte `offset`. Equal to
  /// slicing the full output stream at `offset`.
  pub fn finalize_seek(&self, offset: u64, out: &mut [u8]) {
    self.root_output().root_bytes_at(offset, out);
  }

  /// A streaming reader over the root output.
  #[must_use]
  pub fn finalize_xof(&self) -> Blake3Xof {
    Blake3Xof {
      output: self.root_output(),
      position: 0,
    }
  }

  /// Back to the initial state, keeping the mode and key.
  pub fn reset(&mut self) {
    *self = Self::with_key_words(self.key_words, self.flags);
  }

  /// Like [`update`](Self::update), but large inputs may be hashed on the
  /// rayon thread pool. The result is bit-identical to `update`.
  #[cfg(feature = "parallel")]
  pub fn update_with_join(&mut self, input: &[u8]) {
    join::update_with_join(self, input);
  }

  /// Alias for [`update`](Self::update); the `parallel` feature is off.
  #[cfg(not(feature = "parallel"))]
  pub fn update_with_join(&mut self, input: &[u8]) {
    self.update(input);
  }
}

impl Default for Blake3 {
  fn default() -> Self {
    Self::new()
  }
}

impl Drop for Blake3 {
  fn drop(&mut self) {
    self.key_words.zeroize();
    self.cv_stack.zeroize();
    self.chunk_state.chaining_value.zeroize();
    self.chunk_state.block.zeroize();
  }
}

impl Digest for Blake3 {
  const OUTPUT_SIZE: usize = OUT_LEN;
  type Output = Hash;

  fn new() -> Self {
    Self::with_key_words(IV, 0)
  }

  fn update(&mut self, data: &[u8]) {
    Blake3::update(self, data);
  }

  fn finalize(&self) -> Hash {
    Blake3::finalize(self)
  }

  fn reset(&mut self) {
    Blake3::reset(self);
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// XOF reader
// ─────────────────────────────────────────────────────────────────────────────

/// Streaming reader over a finalized hasher's root output.
///
/// Reads are position-based, so a clone continues from the same offset and
/// [`seek`](Self::seek) is free.
#[derive(Clone)]
pub struct Blake3Xof {
  output: Output,
  position: u64,
}

impl Blake3Xof {
  /// Current byte offset into the output stream.
  #[must_use]
  pub const fn position(&self) -> u64 {
    self.position
  }

  /// Jump to an absolute byte offset in the output stream.
  pub fn seek(&mut self, position: u64) {
    self.position = position;
  }

  /// Fill `out` with the next `out.len()` bytes of the stream.
  pub fn fill(&mut self, out: &mut [u8]) {
    self.output.root_bytes_at(self.position, out);
    self.position += out.len() as u64;
  }
}

impl Xof for Blake3Xof {
  fn squeeze(&mut self, out: &mut [u8]) {
    self.fill(out);
  }
}

impl Drop for Blake3Xof {
  fn drop(&mut self) {
    self.output.input_chaining_value.zeroize();
    self.output.block_words.zeroize();
  }
}

// ─────────────────────────────────────────────────────────────────────────────
// One-shot functions
// ─────────────────────────────────────────────────────────────────────────────

/// Hash `input` in plain mode.
///
/// Inputs of at most one chunk skip the tree machinery entirely.
#[must_use]
pub fn hash(input: &[u8]) -> Hash {
  if input.len() <= CHUNK_LEN {
    let kernel = dispatch::active_kernel();
    let words = single_chunk_output(kernel, IV, 0, 0, input).root_hash_words();
    return Hash::from_bytes(words8_to_le_bytes(&words));
  }
  let mut hasher = Blake3::new();
  hasher.update(input);
  hasher.finalize()
}

/// Hash `input` in plain mode and fill `out` with root output.
pub fn hash_into(input: &[u8], out: &mut [u8]) {
  if input.len() <= CHUNK_LEN {
    let kernel = dispatch::active_kernel();
    single_chunk_output(kernel, IV, 0, 0, input).root_bytes_at(0, out);
    return;
  }
  let mut hasher = Blake3::new();
  hasher.update(input);
  hasher.finalize_into(out);
}

/// Hash `input` in keyed mode.
#[must_use]
pub fn keyed_hash(key: &[u8; KEY_LEN], input: &[u8]) -> Hash {
  if input.len() <= CHUNK_LEN {
    let kernel = dispatch::active_kernel();
    let key_words = words8_from_le_bytes_32(key);
    let words = single_chunk_output(kernel, key_words, 0, KEYED_HASH, input).root_hash_words();
    return Hash::from_bytes(words8_to_le_bytes(&words));
  }
  let mut hasher = Blake3::new_keyed(key);
  hasher.update(input);
  hasher.finalize()
}

/// Derive a 32-byte key from a context string and key material.
#[must_use]
pub fn derive_key(context: &str, key_material: &[u8]) -> [u8; OUT_LEN] {
  let mut hasher = Blake3::new_derive_key(context);
  hasher.update(key_material);
  *hasher.finalize().as_bytes()
}

/// Hash `input` in plain mode and return a streaming XOF reader.
#[must_use]
pub fn xof(input: &[u8]) -> Blake3Xof {
  let mut hasher = Blake3::new();
  hasher.update(input);
  hasher.finalize_xof()
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  extern crate alloc;

  use alloc::vec;
  use alloc::vec::Vec;

  use super::*;

  const KEY: &[u8; KEY_LEN] = b"whats the Elvish word for friend";
  const CONTEXT: &str = "BLAKE3 2019-12-27 16:29:52 test vectors context";

  fn hex_to_bytes(hex: &str) -> Vec<u8> {
    assert_eq!(hex.len() % 2, 0);
    (0..hex.len() / 2)
      .map(|i| u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).unwrap())
      .collect()
  }

  fn test_input(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
  }

  #[test]
  fn official_empty_input_vectors() {
    assert_eq!(
      hash(b"").to_hex().as_str(),
      "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262"
    );

    let mut xof_out = [0u8; 131];
    Blake3::new().finalize_into(&mut xof_out);
    let expected = hex_to_bytes(
      "af1349b9f5f9a1a6a0404dea36dcc9499bcb25c9adc112b7cc9a93cae41f3262e00f03e7b69af26b7faaf09fcd333050338ddfe085b8cc869ca98b206c08243a26f5487789e8f660afe6c99ef9e0c52b92e7393024a80459cf91f476f9ffdbda7001c22e159b402631f277ca96f2defdf1078282314e763699a31c5363165421cce14d",
    );
    assert_eq!(xof_out.as_slice(), expected.as_slice());

    assert_eq!(
      keyed_hash(KEY, b"").to_hex().as_str(),
      "92b2b75604ed3c761f9d6f62392c8a9227ad0ea3f09573e783f1498a4ed60d26"
    );

    assert_eq!(
      derive_key(CONTEXT, b"").as_slice(),
      hex_to_bytes("2cc39783c223154fea8dfb7c1b1660f2ac2dcbd1c1de8277b0b0dd39b7e50d7d")
        .as_slice()
    );
  }

  #[test]
  fn known_answers_short_input() {
    assert_eq!(
      hash(b"BLAKE3").to_hex().as_str(),
      "f890484173e516bfd935ef3d22b912dc9738de38743993cfedf2c9473b3216a4"
    );

    let key: [u8; KEY_LEN] = core::array::from_fn(|i| i as u8);
    assert_eq!(
      keyed_hash(&key, b"BLAKE3").to_hex().as_str(),
      "52a1c5369af0590e26ccbb31d052485addcfe2599e858711579fb25aa878c6b8"
    );

    let context: [u8; 32] = core::array::from_fn(|i| i as u8);
    let mut hasher = Blake3::new_derive_key_bytes(&context);
    hasher.update(b"BLAKE3");
    assert_eq!(
      hasher.finalize().to_hex().as_str(),
      "aed725e67e41969964e90fc83f44e17efab90f159a375d3bd213714df2db5ea4"
    );
  }

  #[test]
  fn known_answer_large_input() {
    let input: Vec<u8> = (0..1 << 20).map(|i| i as u8).collect();
    assert_eq!(
      hash(&input).to_hex().as_str(),
      "64479cf7293960210547db8d982359e0c4ce054525ed7086cf93030828fc0533"
    );
  }

  #[test]
  fn matches_reference_across_lengths() {
    for &len in &[
      0usize, 1, 63, 64, 65, 127, 128, 129, 1023, 1024, 1025, 2047, 2048, 2049, 4096, 8192, 10240,
      31744,
    ] {
      let input = test_input(len);
      assert_eq!(
        hash(&input).as_bytes(),
        blake3::hash(&input).as_bytes(),
        "len {len}"
      );
      assert_eq!(
        keyed_hash(KEY, &input).as_bytes(),
        blake3::keyed_hash(KEY, &input).as_bytes(),
        "keyed len {len}"
      );
      assert_eq!(
        derive_key(CONTEXT, &input),
        blake3::derive_key(CONTEXT, &input),
        "derive len {len}"
      );
    }
  }

  #[test]
  fn oneshot_matches_streaming() {
    for &len in &[0usize, 1, 1023, 1024, 1025, 2048, 2049, 5000, 16384] {
      let input = test_input(len);
      let mut hasher = Blake3::new();
      for piece in input.chunks(197) {
        hasher.update(piece);
      }
      assert_eq!(hasher.finalize(), hash(&input), "len {len}");
    }
  }

  #[test]
  fn split_points_do_not_matter() {
    let input = test_input(4096);
    for &split in &[0usize, 1, 63, 64, 65, 1023, 1024, 1025, 4095, 4096] {
      let mut hasher = Blake3::new();
      hasher.update(&input[..split]);
      hasher.update(&input[split..]);
      assert_eq!(hasher.finalize(), hash(&input), "split {split}");
    }
  }

  #[test]
  fn finalize_is_idempotent_and_update_continues() {
    let input = test_input(3000);
    let mut hasher = Blake3::new();
    hasher.update(&input[..1500]);
    let early = hasher.finalize();
    assert_eq!(hasher.finalize(), early);
    hasher.update(&input[1500..]);
    assert_eq!(hasher.finalize(), hash(&input));
  }

  #[test]
  fn reset_equals_fresh() {
    let mut hasher = Blake3::new_keyed(KEY);
    hasher.update(&test_input(5000));
    hasher.reset();
    hasher.update(b"abc");
    assert_eq!(hasher.finalize(), keyed_hash(KEY, b"abc"));
  }

  #[test]
  fn xof_prefix_stability() {
    let hasher = xof(b"b3 xof input");
    let mut long = [0u8; 500];
    {
      let mut reader = hasher.clone();
      reader.fill(&mut long);
    }
    let mut split = [0u8; 500];
    {
      let mut reader = hasher;
      let (a, b) = split.split_at_mut(131);
      reader.squeeze(a);
      reader.squeeze(b);
    }
    assert_eq!(long, split);
    assert_eq!(&long[..32], hash(b"b3 xof input").as_bytes());
  }

  #[test]
  fn seek_matches_slice() {
    let input = test_input(2048);
    let mut hasher = Blake3::new();
    hasher.update(&input);

    let mut full = [0u8; 1024];
    hasher.finalize_into(&mut full);

    for &offset in &[0u64, 1, 63, 64, 65, 127, 500, 960] {
      let mut window = [0u8; 64];
      hasher.finalize_seek(offset, &mut window);
      assert_eq!(&window[..], &full[offset as usize..offset as usize + 64]);

      let mut reader = hasher.finalize_xof();
      reader.seek(offset);
      let mut squeezed = [0u8; 64];
      reader.squeeze(&mut squeezed);
      assert_eq!(squeezed, window);
    }
  }

  #[test]
  fn xof_matches_reference() {
    let input = test_input(3072);
    let mut ours = vec![0u8; 2000];
    hash_into(&input, &mut ours);
    let mut theirs = vec![0u8; 2000];
    blake3::Hasher::new()
      .update(&input)
      .finalize_xof()
      .fill(&mut theirs);
    assert_eq!(ours, theirs);
  }

  #[test]
  fn modes_are_pairwise_distinct() {
    let input = b"same input, different modes";
    let plain = hash(input);
    let keyed = keyed_hash(KEY, input);
    let derived = Hash::from_bytes(derive_key(CONTEXT, input));
    assert_ne!(plain, keyed);
    assert_ne!(plain, derived);
    assert_ne!(keyed, derived);
  }

  #[test]
  fn keyed_from_slice_checks_length() {
    for len in [0usize, 16, 31, 33, 64] {
      let key = vec![7u8; len];
      let err = Blake3::new_keyed_from_slice(&key).err().unwrap();
      assert_eq!(err.expected, KEY_LEN);
      assert_eq!(err.actual, len);
    }
    let mut hasher = Blake3::new_keyed_from_slice(KEY).unwrap();
    hasher.update(b"abc");
    assert_eq!(hasher.finalize(), keyed_hash(KEY, b"abc"));
  }

  #[test]
  fn update_with_join_matches_update() {
    for &len in &[
      64 * CHUNK_LEN - 1,
      64 * CHUNK_LEN,
      64 * CHUNK_LEN + 1,
      65 * CHUNK_LEN,
      200_000,
    ] {
      let input = test_input(len);
      let mut joined = Blake3::new();
      joined.update_with_join(&input);
      assert_eq!(joined.finalize(), hash(&input), "len {len}");

      let mut keyed = Blake3::new_keyed(KEY);
      keyed.update_with_join(&input);
      assert_eq!(keyed.finalize(), keyed_hash(KEY, &input), "keyed len {len}");
    }
  }

  #[test]
  fn update_with_join_after_partial_update() {
    let input = test_input(100_000);
    let mut hasher = Blake3::new();
    hasher.update(&input[..777]);
    hasher.update_with_join(&input[777..]);
    assert_eq!(hasher.finalize(), hash(&input));
  }

  #[test]
  fn digest_trait_is_the_same_hasher() {
    let input = test_input(2500);
    assert_eq!(<Blake3 as Digest>::digest(&input), hash(&input));
    assert_eq!(
      Blake3::digest_vectored(&[&input[..100], &input[100..]]),
      hash(&input)
    );
    assert_eq!(Blake3::OUTPUT_SIZE, OUT_LEN);
  }

  #[test]
  fn derive_key_long_context() {
    // A context longer than one chunk takes the tree path.
    let context = "x".repeat(5000);
    assert_eq!(
      derive_key(&context, b"material"),
      blake3::derive_key(&context, b"material")
    );
  }
}
