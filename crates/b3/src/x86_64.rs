//! x86_64 vector kernels.
//!
//! This module holds the single-block SSE4.1 compressor; the 4-lane and
//! 8-lane batch compressors live in the `sse41` and `avx2` submodules.
//!
//! The single-block path keeps the state as four row vectors. Diagonal
//! rounds rotate rows 1..3 so the diagonals line up in columns, mix, and
//! rotate back. Message words are gathered per round from the flat schedule.
#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]
#![allow(clippy::many_single_char_names)]

pub(crate) mod avx2;
pub(crate) mod sse41;

use core::arch::x86_64::{
  __m128i, _mm_add_epi32, _mm_loadu_si128, _mm_or_si128, _mm_setr_epi32, _mm_shuffle_epi32,
  _mm_shuffle_epi8, _mm_slli_epi32, _mm_srli_epi32, _mm_storeu_si128, _mm_xor_si128,
};

use crate::{IV, MSG_SCHEDULE};

// pshufb masks for the byte-aligned rotations.
const ROT16_SHUFFLE: [i8; 16] = [2, 3, 0, 1, 6, 7, 4, 5, 10, 11, 8, 9, 14, 15, 12, 13];
const ROT8_SHUFFLE: [i8; 16] = [1, 2, 3, 0, 5, 6, 7, 4, 9, 10, 11, 8, 13, 14, 15, 12];

#[inline(always)]
unsafe fn rot16(v: __m128i, mask: __m128i) -> __m128i {
  _mm_shuffle_epi8(v, mask)
}

#[inline(always)]
unsafe fn rot12(v: __m128i) -> __m128i {
  _mm_or_si128(_mm_srli_epi32(v, 12), _mm_slli_epi32(v, 20))
}

#[inline(always)]
unsafe fn rot8(v: __m128i, mask: __m128i) -> __m128i {
  _mm_shuffle_epi8(v, mask)
}

#[inline(always)]
unsafe fn rot7(v: __m128i) -> __m128i {
  _mm_or_si128(_mm_srli_epi32(v, 7), _mm_slli_epi32(v, 25))
}

/// First half of the quarter-round on all four columns at once.
#[inline(always)]
unsafe fn g1(
  row0: &mut __m128i,
  row1: &mut __m128i,
  row2: &mut __m128i,
  row3: &mut __m128i,
  mx: __m128i,
  rot16_mask: __m128i,
) {
  *row0 = _mm_add_epi32(_mm_add_epi32(*row0, mx), *row1);
  *row3 = rot16(_mm_xor_si128(*row3, *row0), rot16_mask);
  *row2 = _mm_add_epi32(*row2, *row3);
  *row1 = rot12(_mm_xor_si128(*row1, *row2));
}

/// Second half of the quarter-round on all four columns at once.
#[inline(always)]
unsafe fn g2(
  row0: &mut __m128i,
  row1: &mut __m128i,
  row2: &mut __m128i,
  row3: &mut __m128i,
  my: __m128i,
  rot8_mask: __m128i,
) {
  *row0 = _mm_add_epi32(_mm_add_epi32(*row0, my), *row1);
  *row3 = rot8(_mm_xor_si128(*row3, *row0), rot8_mask);
  *row2 = _mm_add_epi32(*row2, *row3);
  *row1 = rot7(_mm_xor_si128(*row1, *row2));
}

/// Rotate rows 1..3 left by 1, 2, 3 lanes so each diagonal sits in a column.
#[inline(always)]
unsafe fn diagonalize(row1: &mut __m128i, row2: &mut __m128i, row3: &mut __m128i) {
  *row1 = _mm_shuffle_epi32(*row1, 0b00_11_10_01);
  *row2 = _mm_shuffle_epi32(*row2, 0b01_00_11_10);
  *row3 = _mm_shuffle_epi32(*row3, 0b10_01_00_11);
}

#[inline(always)]
unsafe fn undiagonalize(row1: &mut __m128i, row2: &mut __m128i, row3: &mut __m128i) {
  *row1 = _mm_shuffle_epi32(*row1, 0b10_01_00_11);
  *row2 = _mm_shuffle_epi32(*row2, 0b01_00_11_10);
  *row3 = _mm_shuffle_epi32(*row3, 0b00_11_10_01);
}

/// Gather four message words into one vector, lane 0 first.
#[inline(always)]
unsafe fn gather4(words: &[u32; 16], a: usize, b: usize, c: usize, d: usize) -> __m128i {
  _mm_setr_epi32(
    words[a] as i32,
    words[b] as i32,
    words[c] as i32,
    words[d] as i32,
  )
}

/// Single-block compression.
///
/// # Safety
///
/// The caller must ensure SSE4.1 and SSSE3 are available.
#[target_feature(enable = "sse4.1,ssse3")]
pub(crate) unsafe fn compress_sse41(
  chaining_value: &[u32; 8],
  block_words: &[u32; 16],
  counter: u64,
  block_len: u32,
  flags: u32,
) -> [u32; 16] {
  let rot16_mask = _mm_loadu_si128(ROT16_SHUFFLE.as_ptr().cast());
  let rot8_mask = _mm_loadu_si128(ROT8_SHUFFLE.as_ptr().cast());

  let cv_lo = _mm_loadu_si128(chaining_value.as_ptr().cast());
  let cv_hi = _mm_loadu_si128(chaining_value.as_ptr().add(4).cast());
  let mut row0 = cv_lo;
  let mut row1 = cv_hi;
  let mut row2 = _mm_loadu_si128(IV.as_ptr().cast());
  let mut row3 = _mm_setr_epi32(
    counter as u32 as i32,
    (counter >> 32) as u32 as i32,
    block_len as i32,
    flags as i32,
  );

  for schedule in &MSG_SCHEDULE {
    // Columns take the even/odd schedule pairs 0..8.
    let mx0 = gather4(
      block_words,
      schedule[0],
      schedule[2],
      schedule[4],
      schedule[6],
    );
    let my0 = gather4(
      block_words,
      schedule[1],
      schedule[3],
      schedule[5],
      schedule[7],
    );
    g1(&mut row0, &mut row1, &mut row2, &mut row3, mx0, rot16_mask);
    g2(&mut row0, &mut row1, &mut row2, &mut row3, my0, rot8_mask);

    // Diagonals take pairs 8..16.
    diagonalize(&mut row1, &mut row2, &mut row3);
    let mx1 = gather4(
      block_words,
      schedule[8],
      schedule[10],
      schedule[12],
      schedule[14],
    );
    let my1 = gather4(
      block_words,
      schedule[9],
      schedule[11],
      schedule[13],
      schedule[15],
    );
    g1(&mut row0, &mut row1, &mut row2, &mut row3, mx1, rot16_mask);
    g2(&mut row0, &mut row1, &mut row2, &mut row3, my1, rot8_mask);
    undiagonalize(&mut row1, &mut row2, &mut row3);
  }

  let mut out = [0u32; 16];
  _mm_storeu_si128(out.as_mut_ptr().cast(), _mm_xor_si128(row0, row2));
  _mm_storeu_si128(out.as_mut_ptr().add(4).cast(), _mm_xor_si128(row1, row3));
  _mm_storeu_si128(out.as_mut_ptr().add(8).cast(), _mm_xor_si128(row2, cv_lo));
  _mm_storeu_si128(out.as_mut_ptr().add(12).cast(), _mm_xor_si128(row3, cv_hi));
  out
}
