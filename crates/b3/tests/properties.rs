//! Property tests against the `blake3` reference crate.

use proptest::prelude::*;

const KEY: &[u8; b3::KEY_LEN] = b"whats the Elvish word for friend";
const CONTEXT: &str = "BLAKE3 2019-12-27 16:29:52 test vectors context";

proptest! {
  #[test]
  fn matches_reference(input in proptest::collection::vec(any::<u8>(), 0..20_000)) {
    let ours = *b3::hash(&input).as_bytes();
    let theirs = *blake3::hash(&input).as_bytes();
    prop_assert_eq!(ours, theirs);
  }

  #[test]
  fn keyed_matches_reference(input in proptest::collection::vec(any::<u8>(), 0..20_000)) {
    let ours = *b3::keyed_hash(KEY, &input).as_bytes();
    let theirs = *blake3::keyed_hash(KEY, &input).as_bytes();
    prop_assert_eq!(ours, theirs);
  }

  #[test]
  fn derive_matches_reference(input in proptest::collection::vec(any::<u8>(), 0..20_000)) {
    prop_assert_eq!(b3::derive_key(CONTEXT, &input), blake3::derive_key(CONTEXT, &input));
  }

  #[test]
  fn split_point_is_irrelevant(
    input in proptest::collection::vec(any::<u8>(), 0..10_000),
    split_seed in any::<usize>(),
  ) {
    let split = if input.is_empty() { 0 } else { split_seed % (input.len() + 1) };
    let mut hasher = b3::Blake3::new();
    hasher.update(&input[..split]);
    hasher.update(&input[split..]);
    prop_assert_eq!(hasher.finalize(), b3::hash(&input));
  }

  #[test]
  fn xof_prefix_stability(
    input in proptest::collection::vec(any::<u8>(), 0..5_000),
    short_len in 1usize..200,
    long_len in 200usize..1_000,
  ) {
    let mut long = vec![0u8; long_len];
    b3::hash_into(&input, &mut long);
    let mut short = vec![0u8; short_len];
    b3::hash_into(&input, &mut short);
    prop_assert_eq!(&long[..short_len], &short[..]);
    let digest = *b3::hash(&input).as_bytes();
    prop_assert_eq!(&long[..32], &digest[..]);
  }

  #[test]
  fn seek_equals_slice(
    input in proptest::collection::vec(any::<u8>(), 0..5_000),
    offset in 0u64..2_000,
    len in 1usize..300,
  ) {
    let mut full = vec![0u8; offset as usize + len];
    b3::hash_into(&input, &mut full);

    let mut hasher = b3::Blake3::new();
    hasher.update(&input);
    let mut window = vec![0u8; len];
    hasher.finalize_seek(offset, &mut window);
    prop_assert_eq!(&window[..], &full[offset as usize..]);

    let mut reader = b3::xof(&input);
    reader.seek(offset);
    let mut squeezed = vec![0u8; len];
    reader.fill(&mut squeezed);
    prop_assert_eq!(squeezed, window);
  }

  #[test]
  fn join_matches_sequential(input in proptest::collection::vec(any::<u8>(), 60_000..90_000)) {
    let mut joined = b3::Blake3::new();
    joined.update_with_join(&input);
    prop_assert_eq!(joined.finalize(), b3::hash(&input));
  }
}
