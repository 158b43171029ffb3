//! aarch64 NEON kernels: single-block compression and a 4-lane batch
//! compressor.
//!
//! Rotations use shift-right-insert (`vsri`-style via `vsli` on the shifted
//! value); the 16-bit rotation is a free `vrev32` on 16-bit lanes. The batch
//! kernel keeps the state transposed, like the x86 ones, with a `vtrn`-based
//! 4x4 transpose.
#![allow(unsafe_code)]
#![allow(unsafe_op_in_unsafe_fn)]

use core::arch::aarch64::{
  uint32x4_t, vaddq_u32, vcombine_u32, vdupq_n_u32, veorq_u32, vextq_u32, vget_high_u32,
  vget_low_u32, vld1q_u32, vld1q_u8, vreinterpretq_u16_u32, vreinterpretq_u32_u16,
  vreinterpretq_u32_u8, vrev32q_u16, vshrq_n_u32, vsliq_n_u32, vst1q_u32, vtrnq_u32,
};

use crate::{portable, BLOCK_LEN, CHUNK_END, CHUNK_LEN, CHUNK_START, IV, MSG_SCHEDULE};

pub(crate) const DEGREE: usize = 4;

#[inline(always)]
unsafe fn rot16(v: uint32x4_t) -> uint32x4_t {
  vreinterpretq_u32_u16(vrev32q_u16(vreinterpretq_u16_u32(v)))
}

#[inline(always)]
unsafe fn rot12(v: uint32x4_t) -> uint32x4_t {
  vsliq_n_u32(vshrq_n_u32(v, 12), v, 20)
}

#[inline(always)]
unsafe fn rot8(v: uint32x4_t) -> uint32x4_t {
  vsliq_n_u32(vshrq_n_u32(v, 8), v, 24)
}

#[inline(always)]
unsafe fn rot7(v: uint32x4_t) -> uint32x4_t {
  vsliq_n_u32(vshrq_n_u32(v, 7), v, 25)
}

/// Gather four message words into one vector, lane 0 first.
#[inline(always)]
unsafe fn gather4(words: &[u32; 16], a: usize, b: usize, c: usize, d: usize) -> uint32x4_t {
  let lanes = [words[a], words[b], words[c], words[d]];
  vld1q_u32(lanes.as_ptr())
}

#[inline(always)]
unsafe fn g1(
  row0: &mut uint32x4_t,
  row1: &mut uint32x4_t,
  row2: &mut uint32x4_t,
  row3: &mut uint32x4_t,
  mx: uint32x4_t,
) {
  *row0 = vaddq_u32(vaddq_u32(*row0, mx), *row1);
  *row3 = rot16(veorq_u32(*row3, *row0));
  *row2 = vaddq_u32(*row2, *row3);
  *row1 = rot12(veorq_u32(*row1, *row2));
}

#[inline(always)]
unsafe fn g2(
  row0: &mut uint32x4_t,
  row1: &mut uint32x4_t,
  row2: &mut uint32x4_t,
  row3: &mut uint32x4_t,
  my: uint32x4_t,
) {
  *row0 = vaddq_u32(vaddq_u32(*row0, my), *row1);
  *row3 = rot8(veorq_u32(*row3, *row0));
  *row2 = vaddq_u32(*row2, *row3);
  *row1 = rot7(veorq_u32(*row1, *row2));
}

/// Rotate rows 1..3 left by 1, 2, 3 lanes so each diagonal sits in a column.
#[inline(always)]
unsafe fn diagonalize(row1: &mut uint32x4_t, row2: &mut uint32x4_t, row3: &mut uint32x4_t) {
  *row1 = vextq_u32(*row1, *row1, 1);
  *row2 = vextq_u32(*row2, *row2, 2);
  *row3 = vextq_u32(*row3, *row3, 3);
}

#[inline(always)]
unsafe fn undiagonalize(row1: &mut uint32x4_t, row2: &mut uint32x4_t, row3: &mut uint32x4_t) {
  *row1 = vextq_u32(*row1, *row1, 3);
  *row2 = vextq_u32(*row2, *row2, 2);
  *row3 = vextq_u32(*row3, *row3, 1);
}

/// Single-block compression.
///
/// # Safety
///
/// The caller must ensure NEON is available.
#[target_feature(enable = "neon")]
pub(crate) unsafe fn compress_neon(
  chaining_value: &[u32; 8],
  block_words: &[u32; 16],
  counter: u64,
  block_len: u32,
  flags: u32,
) -> [u32; 16] {
  let cv_lo = vld1q_u32(chaining_value.as_ptr());
  let cv_hi = vld1q_u32(chaining_value.as_ptr().add(4));
  let mut row0 = cv_lo;
  let mut row1 = cv_hi;
  let mut row2 = vld1q_u32(IV.as_ptr());
  let tail = [counter as u32, (counter >> 32) as u32, block_len, flags];
  let mut row3 = vld1q_u32(tail.as_ptr());

  for schedule in &MSG_SCHEDULE {
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
    g1(&mut row0, &mut row1, &mut row2, &mut row3, mx0);
    g2(&mut row0, &mut row1, &mut row2, &mut row3, my0);

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
    g1(&mut row0, &mut row1, &mut row2, &mut row3, mx1);
    g2(&mut row0, &mut row1, &mut row2, &mut row3, my1);
    undiagonalize(&mut row1, &mut row2, &mut row3);
  }

  let mut out = [0u32; 16];
  vst1q_u32(out.as_mut_ptr(), veorq_u32(row0, row2));
  vst1q_u32(out.as_mut_ptr().add(4), veorq_u32(row1, row3));
  vst1q_u32(out.as_mut_ptr().add(8), veorq_u32(row2, cv_lo));
  vst1q_u32(out.as_mut_ptr().add(12), veorq_u32(row3, cv_hi));
  out
}

#[inline(always)]
unsafe fn g4(
  v: &mut [uint32x4_t; 16],
  a: usize,
  b: usize,
  c: usize,
  d: usize,
  mx: uint32x4_t,
  my: uint32x4_t,
) {
  v[a] = vaddq_u32(vaddq_u32(v[a], v[b]), mx);
  v[d] = rot16(veorq_u32(v[d], v[a]));
  v[c] = vaddq_u32(v[c], v[d]);
  v[b] = rot12(veorq_u32(v[b], v[c]));
  v[a] = vaddq_u32(vaddq_u32(v[a], v[b]), my);
  v[d] = rot8(veorq_u32(v[d], v[a]));
  v[c] = vaddq_u32(v[c], v[d]);
  v[b] = rot7(veorq_u32(v[b], v[c]));
}

#[inline(always)]
unsafe fn round4(v: &mut [uint32x4_t; 16], m: &[uint32x4_t; 16], r: usize) {
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

/// In-place 4x4 transpose: 2x2 sub-transposes, then 64-bit half swaps.
#[inline(always)]
unsafe fn transpose_vecs(vecs: &mut [uint32x4_t; 4]) {
  let trn01 = vtrnq_u32(vecs[0], vecs[1]);
  let trn23 = vtrnq_u32(vecs[2], vecs[3]);
  vecs[0] = vcombine_u32(vget_low_u32(trn01.0), vget_low_u32(trn23.0));
  vecs[1] = vcombine_u32(vget_low_u32(trn01.1), vget_low_u32(trn23.1));
  vecs[2] = vcombine_u32(vget_high_u32(trn01.0), vget_high_u32(trn23.0));
  vecs[3] = vcombine_u32(vget_high_u32(trn01.1), vget_high_u32(trn23.1));
}

/// Load one 64-byte block from each lane and transpose to word-major.
#[inline(always)]
unsafe fn load_msg_vecs(inputs: &[*const u8; DEGREE], block_offset: usize) -> [uint32x4_t; 16] {
  let mut quarters = [[vdupq_n_u32(0); 4]; 4];
  for (lane, input) in inputs.iter().enumerate() {
    for (quarter, q) in quarters.iter_mut().enumerate() {
      // Byte load, then reinterpret: the input has no alignment guarantee.
      q[lane] = vreinterpretq_u32_u8(vld1q_u8(input.add(block_offset + quarter * 16)));
    }
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
#[target_feature(enable = "neon")]
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
  let counter_lo_lanes = [
    counter as u32,
    (counter + 1) as u32,
    (counter + 2) as u32,
    (counter + 3) as u32,
  ];
  let counter_hi_lanes = [
    (counter >> 32) as u32,
    ((counter + 1) >> 32) as u32,
    ((counter + 2) >> 32) as u32,
    ((counter + 3) >> 32) as u32,
  ];
  let counter_lo = vld1q_u32(counter_lo_lanes.as_ptr());
  let counter_hi = vld1q_u32(counter_hi_lanes.as_ptr());

  let mut h = [
    vdupq_n_u32(key[0]),
    vdupq_n_u32(key[1]),
    vdupq_n_u32(key[2]),
    vdupq_n_u32(key[3]),
    vdupq_n_u32(key[4]),
    vdupq_n_u32(key[5]),
    vdupq_n_u32(key[6]),
    vdupq_n_u32(key[7]),
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
      vdupq_n_u32(IV[0]),
      vdupq_n_u32(IV[1]),
      vdupq_n_u32(IV[2]),
      vdupq_n_u32(IV[3]),
      counter_lo,
      counter_hi,
      vdupq_n_u32(BLOCK_LEN as u32),
      vdupq_n_u32(block_flags),
    ];
    for r in 0..7 {
      round4(&mut v, &m, r);
    }
    // Only the low half survives between blocks.
    for i in 0..8 {
      h[i] = veorq_u32(v[i], v[i + 8]);
    }
  }

  let mut lo = [h[0], h[1], h[2], h[3]];
  let mut hi = [h[4], h[5], h[6], h[7]];
  transpose_vecs(&mut lo);
  transpose_vecs(&mut hi);
  for lane in 0..DEGREE {
    let dest = out.add(lane).cast::<u32>();
    vst1q_u32(dest, lo[lane]);
    vst1q_u32(dest.add(4), hi[lane]);
  }
}

/// Hash whole contiguous chunks, four at a time, scalar for the remainder.
///
/// # Safety
///
/// `input` must point to `num_chunks * CHUNK_LEN` readable bytes, `out` to
/// `num_chunks` writable CV slots, and NEON must be available.
#[target_feature(enable = "neon")]
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
