//! Static timing analysis engine for the Kronos toolchain.
//!
//! Consumes the typed library ([`kronos_liberty`]) and netlist
//! ([`kronos_netlist`]) models and produces per-path setup timing reports:
//! it builds a pin-annotated netlist graph, enumerates reg-reg, in-reg, and
//! reg-out paths, computes per-stage delays by table interpolation, checks
//! setup constraints, and renders text and CSV reports.
//!
//! # Architecture
//!
//! - [`graph`] — flat-array netlist graph and fanout index
//! - [`classify`] — pluggable sequential-cell classification
//! - [`paths`] — bounded-BFS path enumeration with dedup
//! - [`constraints`] / [`sdc`] — constraint model and SDC parser
//! - [`delay`] — NLDM delay engine (rayon-parallel per path)
//! - [`report`] — per-path text blocks and the CSV final report
//! - [`engine`] — the one-call pipeline

#![warn(missing_docs)]

pub mod classify;
pub mod constraints;
pub mod delay;
pub mod engine;
pub mod graph;
pub mod paths;
pub mod report;
pub mod sdc;

pub use classify::{Classifier, SubstringClassifier};
pub use constraints::{DelayBound, DerateBound, IoDelay, IoDelayKind, SdcConstraints, TimingDerate};
pub use delay::{CancelToken, CheckKind, DelayEngine, PathDelays, StageDelay, StageKind};
pub use engine::{run_sta, StaReport};
pub use graph::{Edge, EdgeId, FanoutIndex, NetlistGraph, Node, NodeId, NodeKind};
pub use paths::{PathClass, PathEnumerator, TimingPath};
pub use report::{ClockParams, PathSummary, TimingReporter};
pub use sdc::parse_sdc;
