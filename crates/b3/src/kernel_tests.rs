//! Cross-kernel equivalence tests.
//!
//! Every kernel the running CPU can execute is driven through the same
//! inputs and compared against the portable kernel and the `blake3`
//! reference crate. Kernels are selected directly, bypassing dispatch, so a
//! CI machine with AVX2 exercises the SSE4.1 kernel too.

extern crate alloc;

use alloc::vec;
use alloc::vec::Vec;

use crate::kernels::{self, Kernel, KernelId};
use crate::{
  portable, words8_from_le_bytes_32, Blake3, CHUNK_LEN, IV, KEYED_HASH, KEY_LEN,
};

const KEY: &[u8; KEY_LEN] = b"whats the Elvish word for friend";
const CONTEXT: &str = "BLAKE3 2019-12-27 16:29:52 test vectors context";

const CASES: &[usize] = &[
  0, 1, 63, 64, 65, 127, 128, 1023, 1024, 1025, 2047, 2048, 2049, 3072, 4096, 8192, 10240, 31744,
];

fn test_input(len: usize) -> Vec<u8> {
  (0..len).map(|i| (i % 251) as u8).collect()
}

/// Kernels whose CPU requirements the running machine satisfies.
fn available_kernels() -> Vec<Kernel> {
  let caps = platform::caps();
  kernels::ALL
    .iter()
    .copied()
    .filter(|&id| caps.has(kernels::required_caps(id)))
    .map(kernels::kernel)
    .collect()
}

fn hasher_with_kernel(kernel: Kernel, key_words: [u32; 8], flags: u32) -> Blake3 {
  let mut hasher = Blake3::with_key_words(key_words, flags);
  hasher.kernel = kernel;
  hasher
}

#[test]
fn at_least_the_portable_kernel_is_available() {
  assert!(available_kernels()
    .iter()
    .any(|kernel| kernel.id == KernelId::Portable));
}

#[test]
fn kernels_match_reference_plain() {
  for kernel in available_kernels() {
    for &len in CASES {
      let input = test_input(len);
      let mut hasher = hasher_with_kernel(kernel, IV, 0);
      hasher.update(&input);
      assert_eq!(
        hasher.finalize().as_bytes(),
        blake3::hash(&input).as_bytes(),
        "{} len {len}",
        kernel.name()
      );
    }
  }
}

#[test]
fn kernels_match_reference_keyed() {
  let key_words = words8_from_le_bytes_32(KEY);
  for kernel in available_kernels() {
    for &len in CASES {
      let input = test_input(len);
      let mut hasher = hasher_with_kernel(kernel, key_words, KEYED_HASH);
      hasher.update(&input);
      assert_eq!(
        hasher.finalize().as_bytes(),
        blake3::keyed_hash(KEY, &input).as_bytes(),
        "{} keyed len {len}",
        kernel.name()
      );
    }
  }
}

#[test]
fn kernels_match_reference_derive() {
  // Derive the context key through the portable path once; the material
  // pass then runs per kernel.
  for kernel in available_kernels() {
    for &len in &[0usize, 64, 1024, 4096] {
      let input = test_input(len);
      let context_key = crate::derive_context_key(CONTEXT.as_bytes());
      let mut hasher = hasher_with_kernel(kernel, context_key, crate::DERIVE_KEY_MATERIAL);
      hasher.update(&input);
      assert_eq!(
        *hasher.finalize().as_bytes(),
        blake3::derive_key(CONTEXT, &input),
        "{} derive len {len}",
        kernel.name()
      );
    }
  }
}

#[test]
fn kernels_match_reference_xof_and_seek() {
  let input = test_input(3100);
  let mut reference = vec![0u8; 1500];
  blake3::Hasher::new()
    .update(&input)
    .finalize_xof()
    .fill(&mut reference);

  for kernel in available_kernels() {
    let mut hasher = hasher_with_kernel(kernel, IV, 0);
    hasher.update(&input);

    let mut ours = vec![0u8; 1500];
    hasher.finalize_into(&mut ours);
    assert_eq!(ours, reference, "{}", kernel.name());

    for &offset in &[0u64, 1, 64, 100, 1000, 1436] {
      let mut window = [0u8; 64];
      hasher.finalize_seek(offset, &mut window);
      assert_eq!(
        &window[..],
        &reference[offset as usize..offset as usize + 64],
        "{} offset {offset}",
        kernel.name()
      );
    }
  }
}

#[test]
fn compress_matches_portable() {
  let chaining_value: [u32; 8] = core::array::from_fn(|i| 0x9e37_79b9u32.wrapping_mul(i as u32 + 1));
  let block_words: [u32; 16] = core::array::from_fn(|i| 0x85eb_ca6bu32.wrapping_mul(i as u32 + 7));
  let cases = [
    (0u64, 64u32, 0u32),
    (1, 64, crate::CHUNK_START),
    (u64::from(u32::MAX) + 5, 64, crate::CHUNK_END | crate::ROOT),
    (42, 31, crate::PARENT),
  ];
  for kernel in available_kernels() {
    for &(counter, block_len, flags) in &cases {
      assert_eq!(
        (kernel.compress)(&chaining_value, &block_words, counter, block_len, flags),
        portable::compress(&chaining_value, &block_words, counter, block_len, flags),
        "{} counter {counter} flags {flags}",
        kernel.name()
      );
    }
  }
}

#[test]
fn batch_matches_single_chunk_hashing() {
  let key_words = words8_from_le_bytes_32(KEY);
  for kernel in available_kernels() {
    for &num_chunks in &[1usize, 2, 3, 4, 5, 7, 8, 9, 16, 17] {
      for &counter_base in &[0u64, 1, u64::from(u32::MAX)] {
        let input = test_input(num_chunks * CHUNK_LEN);
        let mut cvs = vec![[0u32; 8]; num_chunks];
        // SAFETY: `input` holds exactly `num_chunks` whole chunks, `cvs`
        // has one slot per chunk, and `available_kernels` only returns
        // kernels this CPU can execute.
        unsafe {
          (kernel.hash_chunks)(
            input.as_ptr(),
            num_chunks,
            &key_words,
            counter_base,
            KEYED_HASH,
            cvs.as_mut_ptr(),
          );
        }
        for (i, cv) in cvs.iter().enumerate() {
          let chunk = &input[i * CHUNK_LEN..(i + 1) * CHUNK_LEN];
          let expected = portable::hash_one_chunk(
            portable::compress,
            chunk,
            &key_words,
            counter_base + i as u64,
            KEYED_HASH,
          );
          assert_eq!(
            *cv,
            expected,
            "{} chunk {i} of {num_chunks}, base {counter_base}",
            kernel.name()
          );
        }
      }
    }
  }
}

#[test]
fn update_with_join_matches_per_kernel() {
  let input = test_input(70 * CHUNK_LEN + 123);
  let expected = blake3::hash(&input);
  for kernel in available_kernels() {
    let mut hasher = hasher_with_kernel(kernel, IV, 0);
    hasher.update_with_join(&input);
    assert_eq!(
      hasher.finalize().as_bytes(),
      expected.as_bytes(),
      "{}",
      kernel.name()
    );
  }
}
