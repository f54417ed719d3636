//! Shared foundational types used across the Kronos STA toolchain.
//!
//! This crate provides core types including interned identifiers, the shared
//! analysis error enum, sequence hashing for path deduplication, and numeric
//! helpers shared by the delay engine and reporters.

#![warn(missing_docs)]

pub mod error;
pub mod hash;
pub mod ident;
pub mod numeric;

pub use error::{StaError, StaResult};
pub use hash::SeqHash;
pub use ident::{Ident, Interner};
pub use numeric::round6;
