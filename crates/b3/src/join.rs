//! Parallel driver for large inputs.
//!
//! Whole chunks are batched onto the rayon pool in `simd_degree`-sized
//! groups. Each batch writes a disjoint slice of one chaining-value scratch
//! buffer, so the implicit join is the only synchronization. The merge into
//! the CV stack stays sequential and chunk-ordered, which keeps the result
//! bit-identical to `update` for any thread count.

use rayon::prelude::*;
use zeroize::Zeroize;

use crate::{Blake3, ChunkState, CHUNK_LEN};

/// Inputs below this stay on the calling thread.
const JOIN_THRESHOLD: usize = 64 * CHUNK_LEN;

pub(crate) fn update_with_join(hasher: &mut Blake3, input: &[u8]) {
  // Parallelism only pays off for bulk input landing on a chunk boundary
  // with a wide kernel behind it.
  if input.len() < JOIN_THRESHOLD
    || hasher.chunk_state.len() != 0
    || hasher.kernel.simd_degree <= 1
  {
    hasher.update(input);
    return;
  }

  let full_chunks = input.len() / CHUNK_LEN;
  // The input's last chunk, full or partial, finalizes through the chunk
  // state, never through a batch.
  let parallel_chunks = if input.len() % CHUNK_LEN == 0 {
    full_chunks - 1
  } else {
    full_chunks
  };

  let degree = hasher.kernel.simd_degree;
  let batched = parallel_chunks - parallel_chunks % degree;
  let base = hasher.chunk_state.chunk_counter;
  let kernel = hasher.kernel;
  let key_words = hasher.key_words;
  let flags = hasher.flags;

  let mut cvs = std::vec![[0u32; 8]; parallel_chunks];
  let (batched_cvs, leftover_cvs) = cvs.split_at_mut(batched);

  batched_cvs
    .par_chunks_mut(degree)
    .enumerate()
    .for_each(|(batch_index, out)| {
      let chunk_index = batch_index * degree;
      // SAFETY: every batch reads `degree` whole chunks inside `input` and
      // writes only the `degree` CV slots it was handed; the regions are
      // disjoint across batches, and dispatch verified the kernel's CPU
      // requirements at selection time.
      unsafe {
        (kernel.hash_chunks)(
          input.as_ptr().add(chunk_index * CHUNK_LEN),
          degree,
          &key_words,
          base + chunk_index as u64,
          flags,
          out.as_mut_ptr(),
        );
      }
    });

  if !leftover_cvs.is_empty() {
    // SAFETY: same bounds argument as above, for the final short batch.
    unsafe {
      (kernel.hash_chunks)(
        input.as_ptr().add(batched * CHUNK_LEN),
        leftover_cvs.len(),
        &key_words,
        base + batched as u64,
        flags,
        leftover_cvs.as_mut_ptr(),
      );
    }
  }

  // Sequential, in-order merge.
  for (i, cv) in cvs.iter().enumerate() {
    hasher.add_chunk_chaining_value(*cv, base + i as u64 + 1);
  }
  cvs.zeroize();

  hasher.chunk_state = ChunkState::new(key_words, base + parallel_chunks as u64, flags);
  hasher
    .chunk_state
    .update(kernel, &input[parallel_chunks * CHUNK_LEN..]);
}
