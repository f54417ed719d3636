//! Liberty standard-cell library front-end for the Kronos STA toolchain.
//!
//! Parses the Liberty group/attribute syntax into a typed library model:
//! cells own pins, pins own timing arcs, and arcs own the characterized
//! lookup tables used by the delay engine. The model is built once per run
//! and is immutable (and freely shareable across threads) afterward.
//!
//! # Architecture
//!
//! - [`model`] — typed library schema ([`Library`], [`Cell`], [`Pin`],
//!   [`TimingArc`]) and arc selection
//! - [`table`] — [`LookupTable`] with 2-D bilinear interpolation
//! - [`lexer`] — byte-level tokenizer for Liberty source text
//! - [`parser`] — recursive-descent group parser building the model

#![warn(missing_docs)]

pub mod lexer;
pub mod model;
pub mod parser;
pub mod table;

pub use model::{
    ArcFilter, Cell, Library, Pin, PinDirection, TimingArc, TimingSense, TimingType, Transition,
};
pub use parser::parse_library;
pub use table::{LookupTable, TableKind};
