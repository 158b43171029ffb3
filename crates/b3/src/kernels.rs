//! Kernel registry.
//!
//! A [`Kernel`] is a table of function pointers with one contract: every
//! kernel produces bit-identical output, and dispatch may only hand out a
//! kernel whose [`required_caps`] are present on the running CPU.

use platform::Caps;

use crate::portable;
use crate::{first_8_words, words16_from_le_bytes, BLOCK_LEN, CHUNK_START};

/// Single-block compression.
pub(crate) type CompressFn = fn(&[u32; 8], &[u32; 16], u64, u32, u32) -> [u32; 16];

/// Batch compressor over whole contiguous chunks.
///
/// `(input, num_chunks, key, counter, flags, out)`: reads
/// `num_chunks * CHUNK_LEN` bytes from `input` and writes one chaining value
/// per chunk to `out`, with per-chunk counters starting at `counter`.
/// Unsafe: raw-pointer contract plus the kernel's CPU requirements.
pub(crate) type HashChunksFn = unsafe fn(*const u8, usize, &[u32; 8], u64, u32, *mut [u32; 8]);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum KernelId {
  Portable,
  #[cfg(target_arch = "x86_64")]
  X86Sse41,
  #[cfg(target_arch = "x86_64")]
  X86Avx2,
  #[cfg(target_arch = "aarch64")]
  Aarch64Neon,
}

impl KernelId {
  pub(crate) const fn as_str(self) -> &'static str {
    match self {
      Self::Portable => "portable",
      #[cfg(target_arch = "x86_64")]
      Self::X86Sse41 => "x86_64/sse41",
      #[cfg(target_arch = "x86_64")]
      Self::X86Avx2 => "x86_64/avx2",
      #[cfg(target_arch = "aarch64")]
      Self::Aarch64Neon => "aarch64/neon",
    }
  }
}

/// Every kernel compiled into this build, portable first.
pub(crate) const ALL: &[KernelId] = &[
  KernelId::Portable,
  #[cfg(target_arch = "x86_64")]
  KernelId::X86Sse41,
  #[cfg(target_arch = "x86_64")]
  KernelId::X86Avx2,
  #[cfg(target_arch = "aarch64")]
  KernelId::Aarch64Neon,
];

#[derive(Clone, Copy)]
pub(crate) struct Kernel {
  pub id: KernelId,
  /// Single-block compression.
  pub compress: CompressFn,
  /// Batch compressor over whole chunks.
  pub hash_chunks: HashChunksFn,
  /// Chunks per SIMD pass of `hash_chunks`.
  pub simd_degree: usize,
}

impl Kernel {
  pub(crate) fn name(self) -> &'static str {
    self.id.as_str()
  }
}

pub(crate) fn kernel(id: KernelId) -> Kernel {
  match id {
    KernelId::Portable => Kernel {
      id,
      compress: portable::compress,
      hash_chunks: portable::hash_chunks,
      simd_degree: 1,
    },
    #[cfg(target_arch = "x86_64")]
    KernelId::X86Sse41 => Kernel {
      id,
      compress: compress_sse41,
      hash_chunks: hash_chunks_sse41,
      simd_degree: crate::x86_64::sse41::DEGREE,
    },
    // A single 64-byte block fills only four 128-bit rows, so the AVX2
    // kernel shares the SSE4.1 single-block path.
    #[cfg(target_arch = "x86_64")]
    KernelId::X86Avx2 => Kernel {
      id,
      compress: compress_sse41,
      hash_chunks: hash_chunks_avx2,
      simd_degree: crate::x86_64::avx2::DEGREE,
    },
    #[cfg(target_arch = "aarch64")]
    KernelId::Aarch64Neon => Kernel {
      id,
      compress: compress_neon,
      hash_chunks: hash_chunks_neon,
      simd_degree: crate::aarch64::DEGREE,
    },
  }
}

/// CPU capabilities a kernel needs before dispatch may select it.
pub(crate) fn required_caps(id: KernelId) -> Caps {
  match id {
    KernelId::Portable => Caps::NONE,
    #[cfg(target_arch = "x86_64")]
    KernelId::X86Sse41 => platform::x86::SSSE3 | platform::x86::SSE41,
    #[cfg(target_arch = "x86_64")]
    KernelId::X86Avx2 => platform::x86::SSSE3 | platform::x86::SSE41 | platform::x86::AVX2,
    #[cfg(target_arch = "aarch64")]
    KernelId::Aarch64Neon => platform::aarch64::NEON,
  }
}

/// Absorb whole 64-byte blocks of the active chunk into `chaining_value`.
///
/// The first block of a chunk takes `CHUNK_START`; `CHUNK_END` is applied
/// later, at output time, never here.
pub(crate) fn chunk_compress_blocks(
  kernel: Kernel,
  chaining_value: &mut [u32; 8],
  chunk_counter: u64,
  flags: u32,
  blocks_compressed: &mut u8,
  blocks: &[u8],
) {
  debug_assert_eq!(blocks.len() % BLOCK_LEN, 0);
  for block in blocks.chunks_exact(BLOCK_LEN) {
    let start_flag = if *blocks_compressed == 0 {
      CHUNK_START
    } else {
      0
    };
    let block_words = words16_from_le_bytes(block);
    *chaining_value = first_8_words((kernel.compress)(
      chaining_value,
      &block_words,
      chunk_counter,
      BLOCK_LEN as u32,
      flags | start_flag,
    ));
    *blocks_compressed += 1;
  }
}

// Safe fn-pointer fronts for the `#[target_feature]` kernels. Each is only
// reachable through a `Kernel` whose `required_caps` dispatch has verified.

#[cfg(target_arch = "x86_64")]
fn compress_sse41(
  chaining_value: &[u32; 8],
  block_words: &[u32; 16],
  counter: u64,
  block_len: u32,
  flags: u32,
) -> [u32; 16] {
  // SAFETY: see module note above; SSSE3 and SSE4.1 were verified.
  unsafe { crate::x86_64::compress_sse41(chaining_value, block_words, counter, block_len, flags) }
}

#[cfg(target_arch = "x86_64")]
unsafe fn hash_chunks_sse41(
  input: *const u8,
  num_chunks: usize,
  key: &[u32; 8],
  counter: u64,
  flags: u32,
  out: *mut [u32; 8],
) {
  // SAFETY: caller upholds the `HashChunksFn` contract; SSSE3 and SSE4.1
  // were verified.
  unsafe { crate::x86_64::sse41::hash_chunks(input, num_chunks, key, counter, flags, out) }
}

#[cfg(target_arch = "x86_64")]
unsafe fn hash_chunks_avx2(
  input: *const u8,
  num_chunks: usize,
  key: &[u32; 8],
  counter: u64,
  flags: u32,
  out: *mut [u32; 8],
) {
  // SAFETY: caller upholds the `HashChunksFn` contract; AVX2 was verified.
  unsafe { crate::x86_64::avx2::hash_chunks(input, num_chunks, key, counter, flags, out) }
}

#[cfg(target_arch = "aarch64")]
fn compress_neon(
  chaining_value: &[u32; 8],
  block_words: &[u32; 16],
  counter: u64,
  block_len: u32,
  flags: u32,
) -> [u32; 16] {
  // SAFETY: see module note above; NEON was verified.
  unsafe { crate::aarch64::compress_neon(chaining_value, block_words, counter, block_len, flags) }
}

#[cfg(target_arch = "aarch64")]
unsafe fn hash_chunks_neon(
  input: *const u8,
  num_chunks: usize,
  key: &[u32; 8],
  counter: u64,
  flags: u32,
  out: *mut [u32; 8],
) {
  // SAFETY: caller upholds the `HashChunksFn` contract; NEON was verified.
  unsafe { crate::aarch64::hash_chunks(input, num_chunks, key, counter, flags, out) }
}
