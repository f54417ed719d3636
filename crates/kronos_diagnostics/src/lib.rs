//! Diagnostic creation, severity management, and log rendering.
//!
//! This crate provides structured [`Diagnostic`] messages with severity
//! levels, category-prefixed codes, and optional input-file locations. The
//! thread-safe [`DiagnosticSink`] accumulates diagnostics across the analysis
//! pipeline (including the parallel delay workers), and [`LogRenderer`]
//! formats them for the run log.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::{Diagnostic, Location};
pub use renderer::LogRenderer;
pub use severity::Severity;
pub use sink::{DiagnosticSink, SeverityCounts};
