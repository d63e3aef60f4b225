//! Top-level module for regex-driven string generation.
//!
//! This module groups:
//! - The compiled automaton (`Acceptor`) and its building blocks (`State`, `Transition`)
//! - The length oracle (`Completions`, `LengthTable`)
//! - Generation settings (`GeneratorConfig`)
//! - The high-level generation interface (`Generator`) and its enumeration API

/// Deterministic acceptor compiled from a pattern.
///
/// Supports membership checks and binary snapshots.
pub mod acceptor;

/// Pattern to acceptor compilation (parse, NFA, subset construction, trim).
///
/// Not exposed
mod builder;

/// Validated generation settings.
pub mod config;

/// Ordered enumeration of accepted strings (`matches`, `nth_match`, ...).
pub mod enumeration;

/// High-level interface for generating strings within a length window.
///
/// Handles uniform length and path selection, and the fallbacks used when
/// no accepted string fits the window.
pub mod generator;

/// Counting and reachability oracle over an acceptor.
pub mod oracle;

/// Acceptor states, character-range transitions and weighted sampling.
pub mod state;
