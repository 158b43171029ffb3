//! Core cryptographic traits for the b3 workspace.
//!
//! This crate provides the foundational traits that the hash implementations
//! conform to. It is `no_std` compatible and has zero dependencies.
//!
//! # Trait Hierarchy
//!
//! | Trait | Purpose | Examples |
//! |-------|---------|----------|
//! | [`Digest`] | Cryptographic hash functions | BLAKE3 (hash mode) |
//! | [`Xof`] | Extendable-output functions | BLAKE3 (XOF mode) |
//!
//! # Error Types
//!
//! - [`InvalidLength`] - Wrong-size key or digest buffer
//!
//! # Fallibility Discipline
//!
//! This crate denies `unwrap`, `expect`, and indexing in non-test code to ensure
//! all error paths are handled explicitly.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::indexing_slicing))]
#![no_std]

#[cfg(feature = "std")]
extern crate std;

mod digest;
pub mod error;
mod xof;

pub use digest::Digest;
pub use error::InvalidLength;
pub use xof::Xof;
