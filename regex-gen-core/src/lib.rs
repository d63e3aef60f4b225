//! Regex-driven random string generation library.
//!
//! This crate compiles a regular expression into a deterministic acceptor
//! and draws accepted strings from it, including:
//! - Preprocessing of `\Q ... \E` literal regions
//! - Per-length counts of accepted strings, kept in log space
//! - Uniform generation inside a length window, with predictable fallbacks
//!   when the window is infeasible
//! - Ordered enumeration of the accepted strings
//!
//! ```no_run
//! use rand::SeedableRng;
//! use regex_gen_core::Generator;
//!
//! let generator = Generator::new(r"minion_\d{3}\Q@gru.evil\E")?;
//! let mut rng = rand::rngs::StdRng::seed_from_u64(7);
//! let address = generator.generate(&mut rng);
//! assert!(generator.accepts(&address));
//! # Ok::<(), regex_gen_core::Error>(())
//! ```

/// Automaton, oracle and generator.
pub mod model;

/// Pattern text rewrites applied before compilation.
pub mod pattern;

mod error;

pub use error::{Error, Result};
pub use model::acceptor::Acceptor;
pub use model::config::GeneratorConfig;
pub use model::generator::Generator;
pub use model::oracle::MaxLength;
