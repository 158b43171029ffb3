//! 8-lane AVX2 batch compressor.
//!
//! Same transposed layout as the 4-lane kernel, with 256-bit vectors and an
//! 8x8 transpose built from 32-bit, 64-bit, and 128-bit interleaves.
#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use core::arch::x86_64::{
  __m256i, _mm256_add_epi32, _mm256_loadu_si256, _mm256_or_si256, _mm256_permute2x128_si256,
  _mm256_set1_epi32, _mm256_setr_epi32, _mm256_setr_epi8, _mm256_shuffle_epi8, _mm256_slli_epi32,
  _mm256_srli_epi32, _mm256_storeu_si256, _mm256_unpackhi_epi32, _mm256_unpackhi_epi64,
  _mm256_unpacklo_epi32, _mm256_unpacklo_epi64, _mm256_xor_si256, _mm_prefetch, _MM_HINT_T0,
};

use crate::{BLOCK_LEN, CHUNK_END, CHUNK_LEN, CHUNK_START, IV, MSG_SCHEDULE};

use super::sse41;

pub(crate) const DEGREE: usize = 8;

#[inline(always)]
unsafe fn loadu(src: *const u8) -> __m256i {
  _mm256_loadu_si256(src.cast())
}

#[inline(always)]
unsafe fn storeu(v: __m256i, dest: *mut u8) {
  _mm256_storeu_si256(dest.cast(), v);
}

#[inline(always)]
unsafe fn rot16(v: __m256i) -> __m256i {
  _mm256_shuffle_epi8(
    v,
    _mm256_setr_epi8(
      2, 3, 0, 1, 6, 7, 4, 5, 10, 11, 8, 9, 14, 15, 12, 13, 2, 3, 0, 1, 6, 7, 4, 5, 10, 11, 8, 9,
      14, 15, 12, 13,
    ),
  )
}

#[inline(always)]
unsafe fn rot12(v: __m256i) -> __m256i {
  _mm256_or_si256(_mm256_srli_epi32(v, 12), _mm256_slli_epi32(v, 20))
}

#[inline(always)]
unsafe fn rot8(v: __m256i) -> __m256i {
  _mm256_shuffle_epi8(
    v,
    _mm256_setr_epi8(
      1, 2, 3, 0, 5, 6, 7, 4, 9, 10, 11, 8, 13, 14, 15, 12, 1, 2, 3, 0, 5, 6, 7, 4, 9, 10, 11, 8,
      13, 14, 15, 12,
    ),
  )
}

#[inline(always)]
unsafe fn rot7(v: __m256i) -> __m256i {
  _mm256_or_si256(_mm256_srli_epi32(v, 7), _mm256_slli_epi32(v, 25))
}

#[inline(always)]
unsafe fn g8(
  v: &mut [__m256i; 16],
  a: usize,
  b: usize,
  c: usize,
  d: usize,
  mx: __m256i,
  my: __m256i,
) {
  v[a] = _mm256_add_epi32(_mm256_add_epi32(v[a], v[b]), mx);
  v[d] = rot16(_mm256_xor_si256(v[d], v[a]));
  v[c] = _mm256_add_epi32(v[c], v[d]);
  v[b] = rot12(_mm256_xor_si256(v[b], v[c]));
  v[a] = _mm256_add_epi32(_mm256_add_epi32(v[a], v[b]), my);
  v[d] = rot8(_mm256_xor_si256(v[d], v[a]));
  v[c] = _mm256_add_epi32(v[c], v[d]);
  v[b] = rot7(_mm256_xor_si256(v[b], v[c]));
}

#[inline(always)]
unsafe fn round8(v: &mut [__m256i; 16], m: &[__m256i; 16], r: usize) {
  let s = &MSG_SCHEDULE[r];
  g8(v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
  g8(v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
  g8(v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
  g8(v, 3, 7, 11, 15, m[s[6]], m[s[7]]);
  g8(v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
  g8(v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
  g8(v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
  g8(v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
}

#[inline(always)]
unsafe fn interleave128(a: __m256i, b: __m256i) -> (__m256i, __m256i) {
  (
    _mm256_permute2x128_si256(a, b, 0x20),
    _mm256_permute2x128_si256(a, b, 0x31),
  )
}

/// In-place 8x8 transpose of 32-bit words.
#[inline(always)]
unsafe fn transpose_vecs(vecs: &mut [__m256i; 8]) {
  // Interleave 32-bit words within 128-bit halves.
  let ab_0145 = _mm256_unpacklo_epi32(vecs[0], vecs[1]);
  let ab_2367 = _mm256_unpackhi_epi32(vecs[0], vecs[1]);
  let cd_0145 = _mm256_unpacklo_epi32(vecs[2], vecs[3]);
  let cd_2367 = _mm256_unpackhi_epi32(vecs[2], vecs[3]);
  let ef_0145 = _mm256_unpacklo_epi32(vecs[4], vecs[5]);
  let ef_2367 = _mm256_unpackhi_epi32(vecs[4], vecs[5]);
  let gh_0145 = _mm256_unpacklo_epi32(vecs[6], vecs[7]);
  let gh_2367 = _mm256_unpackhi_epi32(vecs[6], vecs[7]);

  // Interleave 64-bit pairs.
  let abcd_04 = _mm256_unpacklo_epi64(ab_0145, cd_0145);
  let abcd_15 = _mm256_unpackhi_epi64(ab_0145, cd_0145);
  let abcd_26 = _mm256_unpacklo_epi64(ab_2367, cd_2367);
  let abcd_37 = _mm256_unpackhi_epi64(ab_2367, cd_2367);
  let efgh_04 = _mm256_unpacklo_epi64(ef_0145, gh_0145);
  let efgh_15 = _mm256_unpackhi_epi64(ef_0145, gh_0145);
  let efgh_26 = _mm256_unpacklo_epi64(ef_2367, gh_2367);
  let efgh_37 = _mm256_unpackhi_epi64(ef_2367, gh_2367);

  // Interleave 128-bit halves.
  let (v0, v4) = interleave128(abcd_04, efgh_04);
  let (v1, v5) = interleave128(abcd_15, efgh_15);
  let (v2, v6) = interleave128(abcd_26, efgh_26);
  let (v3, v7) = interleave128(abcd_37, efgh_37);

  vecs[0] = v0;
  vecs[1] = v1;
  vecs[2] = v2;
  vecs[3] = v3;
  vecs[4] = v4;
  vecs[5] = v5;
  vecs[6] = v6;
  vecs[7] = v7;
}

/// Load one 64-byte block from each of eight lanes and transpose.
#[inline(always)]
unsafe fn load_msg_vecs(inputs: &[*const u8; DEGREE], block_offset: usize) -> [__m256i; 16] {
  let mut lo = [_mm256_set1_epi32(0); 8];
  let mut hi = [_mm256_set1_epi32(0); 8];
  for (lane, input) in inputs.iter().enumerate() {
    lo[lane] = loadu(input.add(block_offset));
    hi[lane] = loadu(input.add(block_offset + 32));
    _mm_prefetch::<_MM_HINT_T0>(input.add(block_offset + 256).cast());
  }
  transpose_vecs(&mut lo);
  transpose_vecs(&mut hi);
  [
    lo[0], lo[1], lo[2], lo[3], lo[4], lo[5], lo[6], lo[7], hi[0], hi[1], hi[2], hi[3], hi[4],
    hi[5], hi[6], hi[7],
  ]
}

/// Hash eight whole contiguous chunks into eight chaining values.
#[target_feature(enable = "avx2")]
unsafe fn hash8_chunks(
  input: *const u8,
  key: &[u32; 8],
  counter: u64,
  flags: u32,
  out: *mut [u32; 8],
) {
  let mut inputs = [input; DEGREE];
  for (lane, p) in inputs.iter_mut().enumerate() {
    *p = input.add(lane * CHUNK_LEN);
  }
  let counter_lo = _mm256_setr_epi32(
    counter as u32 as i32,
    (counter + 1) as u32 as i32,
    (counter + 2) as u32 as i32,
    (counter + 3) as u32 as i32,
    (counter + 4) as u32 as i32,
    (counter + 5) as u32 as i32,
    (counter + 6) as u32 as i32,
    (counter + 7) as u32 as i32,
  );
  let counter_hi = _mm256_setr_epi32(
    ((counter) >> 32) as u32 as i32,
    ((counter + 1) >> 32) as u32 as i32,
    ((counter + 2) >> 32) as u32 as i32,
    ((counter + 3) >> 32) as u32 as i32,
    ((counter + 4) >> 32) as u32 as i32,
    ((counter + 5) >> 32) as u32 as i32,
    ((counter + 6) >> 32) as u32 as i32,
    ((counter + 7) >> 32) as u32 as i32,
  );

  let mut h = [
    _mm256_set1_epi32(key[0] as i32),
    _mm256_set1_epi32(key[1] as i32),
    _mm256_set1_epi32(key[2] as i32),
    _mm256_set1_epi32(key[3] as i32),
    _mm256_set1_epi32(key[4] as i32),
    _mm256_set1_epi32(key[5] as i32),
    _mm256_set1_epi32(key[6] as i32),
    _mm256_set1_epi32(key[7] as i32),
  ];

  let blocks = CHUNK_LEN / BLOCK_LEN;
  for block in 0..blocks {
    let m = load_msg_vecs(&inputs, block * BLOCK_LEN);
    let mut block_flags = flags;
    if block == 0 {
      block_flags |= CHUNK_START;
    }
    if block == blocks - 1 {
      block_flags |= CHUNK_END;
    }
    let mut v = [
      h[0],
      h[1],
      h[2],
      h[3],
      h[4],
      h[5],
      h[6],
      h[7],
      _mm256_set1_epi32(IV[0] as i32),
      _mm256_set1_epi32(IV[1] as i32),
      _mm256_set1_epi32(IV[2] as i32),
      _mm256_set1_epi32(IV[3] as i32),
      counter_lo,
      counter_hi,
      _mm256_set1_epi32(BLOCK_LEN as i32),
      _mm256_set1_epi32(block_flags as i32),
    ];
    for r in 0..7 {
      round8(&mut v, &m, r);
    }
    for i in 0..8 {
      h[i] = _mm256_xor_si256(v[i], v[i + 8]);
    }
  }

  // Word-major back to lane-major: after the transpose, vector `lane` is
  // the whole 32-byte CV of chunk `lane`.
  transpose_vecs(&mut h);
  for (lane, cv) in h.iter().enumerate() {
    storeu(*cv, out.add(lane).cast::<u8>());
  }
}

/// Hash whole contiguous chunks, eight at a time, delegating the remainder
/// to the 4-lane kernel.
///
/// # Safety
///
/// `input` must point to `num_chunks * CHUNK_LEN` readable bytes, `out` to
/// `num_chunks` writable CV slots, and AVX2 (with the SSE4.1 baseline) must
/// be available.
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn hash_chunks(
  mut input: *const u8,
  mut num_chunks: usize,
  key: &[u32; 8],
  mut counter: u64,
  flags: u32,
  mut out: *mut [u32; 8],
) {
  while num_chunks >= DEGREE {
    hash8_chunks(input, key, counter, flags, out);
    input = input.add(DEGREE * CHUNK_LEN);
    out = out.add(DEGREE);
    counter += DEGREE as u64;
    num_chunks -= DEGREE;
  }
  if num_chunks > 0 {
    sse41::hash_chunks(input, num_chunks, key, counter, flags, out);
  }
}
