//! 4-lane SSE4.1 batch compressor.
//!
//! The state is held transposed: sixteen vectors, each carrying one state
//! word across four chunks. Message blocks are loaded lane-major and
//! transposed on the way in; chaining values are transposed back on the way
//! out.
#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use core::arch::x86_64::{
  __m128i, _mm_add_epi32, _mm_loadu_si128, _mm_or_si128, _mm_prefetch, _mm_set1_epi32,
  _mm_setr_epi32, _mm_shuffle_epi8, _mm_slli_epi32, _mm_srli_epi32, _mm_storeu_si128,
  _mm_unpackhi_epi32, _mm_unpackhi_epi64, _mm_unpacklo_epi32, _mm_unpacklo_epi64, _mm_xor_si128,
  _MM_HINT_T0,
};

use crate::{portable, BLOCK_LEN, CHUNK_END, CHUNK_LEN, CHUNK_START, IV, MSG_SCHEDULE};

pub(crate) const DEGREE: usize = 4;

#[inline(always)]
unsafe fn loadu(src: *const u8) -> __m128i {
  _mm_loadu_si128(src.cast())
}

#[inline(always)]
unsafe fn storeu(v: __m128i, dest: *mut u8) {
  _mm_storeu_si128(dest.cast(), v);
}

#[inline(always)]
unsafe fn rot16(v: __m128i) -> __m128i {
  _mm_shuffle_epi8(
    v,
    _mm_setr_epi32(0x0100_0302, 0x0504_0706, 0x0908_0b0a, 0x0d0c_0f0e),
  )
}

#[inline(always)]
unsafe fn rot12(v: __m128i) -> __m128i {
  _mm_or_si128(_mm_srli_epi32(v, 12), _mm_slli_epi32(v, 20))
}

#[inline(always)]
unsafe fn rot8(v: __m128i) -> __m128i {
  _mm_shuffle_epi8(
    v,
    _mm_setr_epi32(0x0003_0201, 0x0407_0605, 0x080b_0a09, 0x0c0f_0e0d),
  )
}

#[inline(always)]
unsafe fn rot7(v: __m128i) -> __m128i {
  _mm_or_si128(_mm_srli_epi32(v, 7), _mm_slli_epi32(v, 25))
}

#[inline(always)]
unsafe fn g4(
  v: &mut [__m128i; 16],
  a: usize,
  b: usize,
  c: usize,
  d: usize,
  mx: __m128i,
  my: __m128i,
) {
  v[a] = _mm_add_epi32(_mm_add_epi32(v[a], v[b]), mx);
  v[d] = rot16(_mm_xor_si128(v[d], v[a]));
  v[c] = _mm_add_epi32(v[c], v[d]);
  v[b] = rot12(_mm_xor_si128(v[b], v[c]));
  v[a] = _mm_add_epi32(_mm_add_epi32(v[a], v[b]), my);
  v[d] = rot8(_mm_xor_si128(v[d], v[a]));
  v[c] = _mm_add_epi32(v[c], v[d]);
  v[b] = rot7(_mm_xor_si128(v[b], v[c]));
}

#[inline(always)]
unsafe fn round4(v: &mut [__m128i; 16], m: &[__m128i; 16], r: usize) {
  let s = &MSG_SCHEDULE[r];
  g4(v, 0, 4, 8, 12, m[s[0]], m[s[1]]);
  g4(v, 1, 5, 9, 13, m[s[2]], m[s[3]]);
  g4(v, 2, 6, 10, 14, m[s[4]], m[s[5]]);
  g4(v, 3, 7, 11, 15, m[s[6]], m[s[7]]);
  g4(v, 0, 5, 10, 15, m[s[8]], m[s[9]]);
  g4(v, 1, 6, 11, 12, m[s[10]], m[s[11]]);
  g4(v, 2, 7, 8, 13, m[s[12]], m[s[13]]);
  g4(v, 3, 4, 9, 14, m[s[14]], m[s[15]]);
}

/// In-place 4x4 transpose: `vecs[i]` goes from lane-major to word-major.
#[inline(always)]
unsafe fn transpose_vecs(vecs: &mut [__m128i; 4]) {
  let ab_01 = _mm_unpacklo_epi32(vecs[0], vecs[1]);
  let ab_23 = _mm_unpackhi_epi32(vecs[0], vecs[1]);
  let cd_01 = _mm_unpacklo_epi32(vecs[2], vecs[3]);
  let cd_23 = _mm_unpackhi_epi32(vecs[2], vecs[3]);

  vecs[0] = _mm_unpacklo_epi64(ab_01, cd_01);
  vecs[1] = _mm_unpackhi_epi64(ab_01, cd_01);
  vecs[2] = _mm_unpacklo_epi64(ab_23, cd_23);
  vecs[3] = _mm_unpackhi_epi64(ab_23, cd_23);
}

/// Load one 64-byte block from each lane and transpose to word-major.
#[inline(always)]
unsafe fn load_msg_vecs(inputs: &[*const u8; DEGREE], block_offset: usize) -> [__m128i; 16] {
  let mut quarters = [[_mm_set1_epi32(0); 4]; 4];
  for (lane, input) in inputs.iter().enumerate() {
    for (quarter, q) in quarters.iter_mut().enumerate() {
      q[lane] = loadu(input.add(block_offset + quarter * 16));
    }
    _mm_prefetch::<_MM_HINT_T0>(input.add(block_offset + 256).cast());
  }
  for q in &mut quarters {
    transpose_vecs(q);
  }
  [
    quarters[0][0],
    quarters[0][1],
    quarters[0][2],
    quarters[0][3],
    quarters[1][0],
    quarters[1][1],
    quarters[1][2],
    quarters[1][3],
    quarters[2][0],
    quarters[2][1],
    quarters[2][2],
    quarters[2][3],
    quarters[3][0],
    quarters[3][1],
    quarters[3][2],
    quarters[3][3],
  ]
}

/// Hash four whole contiguous chunks into four chaining values.
#[target_feature(enable = "sse4.1,ssse3")]
unsafe fn hash4_chunks(
  input: *const u8,
  key: &[u32; 8],
  counter: u64,
  flags: u32,
  out: *mut [u32; 8],
) {
  let inputs = [
    input,
    input.add(CHUNK_LEN),
    input.add(2 * CHUNK_LEN),
    input.add(3 * CHUNK_LEN),
  ];
  let counter_lo = _mm_setr_epi32(
    counter as u32 as i32,
    (counter + 1) as u32 as i32,
    (counter + 2) as u32 as i32,
    (counter + 3) as u32 as i32,
  );
  let counter_hi = _mm_setr_epi32(
    ((counter) >> 32) as u32 as i32,
    ((counter + 1) >> 32) as u32 as i32,
    ((counter + 2) >> 32) as u32 as i32,
    ((counter + 3) >> 32) as u32 as i32,
  );

  let mut h = [
    _mm_set1_epi32(key[0] as i32),
    _mm_set1_epi32(key[1] as i32),
    _mm_set1_epi32(key[2] as i32),
    _mm_set1_epi32(key[3] as i32),
    _mm_set1_epi32(key[4] as i32),
    _mm_set1_epi32(key[5] as i32),
    _mm_set1_epi32(key[6] as i32),
    _mm_set1_epi32(key[7] as i32),
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
      _mm_set1_epi32(IV[0] as i32),
      _mm_set1_epi32(IV[1] as i32),
      _mm_set1_epi32(IV[2] as i32),
      _mm_set1_epi32(IV[3] as i32),
      counter_lo,
      counter_hi,
      _mm_set1_epi32(BLOCK_LEN as i32),
      _mm_set1_epi32(block_flags as i32),
    ];
    for r in 0..7 {
      round4(&mut v, &m, r);
    }
    // Only the low half survives between blocks.
    for i in 0..8 {
      h[i] = _mm_xor_si128(v[i], v[i + 8]);
    }
  }

  let mut lo = [h[0], h[1], h[2], h[3]];
  let mut hi = [h[4], h[5], h[6], h[7]];
  transpose_vecs(&mut lo);
  transpose_vecs(&mut hi);
  for lane in 0..DEGREE {
    let dest = out.add(lane).cast::<u8>();
    storeu(lo[lane], dest);
    storeu(hi[lane], dest.add(16));
  }
}

/// Hash whole contiguous chunks, four at a time, scalar for the remainder.
///
/// # Safety
///
/// `input` must point to `num_chunks * CHUNK_LEN` readable bytes, `out` to
/// `num_chunks` writable CV slots, and SSE4.1/SSSE3 must be available.
#[target_feature(enable = "sse4.1,ssse3")]
pub(crate) unsafe fn hash_chunks(
  mut input: *const u8,
  mut num_chunks: usize,
  key: &[u32; 8],
  mut counter: u64,
  flags: u32,
  mut out: *mut [u32; 8],
) {
  while num_chunks >= DEGREE {
    hash4_chunks(input, key, counter, flags, out);
    input = input.add(DEGREE * CHUNK_LEN);
    out = out.add(DEGREE);
    counter += DEGREE as u64;
    num_chunks -= DEGREE;
  }
  for i in 0..num_chunks {
    let chunk = core::slice::from_raw_parts(input.add(i * CHUNK_LEN), CHUNK_LEN);
    let cv = portable::hash_one_chunk(portable::compress, chunk, key, counter + i as u64, flags);
    out.add(i).write(cv);
  }
}
