/// Error type shared by pattern compilation, configuration and generation.
///
/// Infeasible length windows are not errors: the generator degrades to a
/// best-effort string instead (see [`crate::model::generator::Generator`]).
#[derive(Debug, thiserror::Error)]
pub enum Error {
	/// The pattern text is not a valid regular expression.
	#[error("invalid pattern: {0}")]
	PatternSyntax(#[from] regex_syntax::Error),

	/// The pattern parses but uses a construct that has no meaning for a
	/// whole-string acceptor (word boundaries, non UTF-8 byte classes, ...).
	#[error("unsupported pattern construct: {0}")]
	UnsupportedPattern(String),

	/// The automaton built from the pattern exceeds the state limit.
	#[error("pattern expands to more than {limit} automaton states")]
	PatternTooLarge { limit: usize },

	/// The per-length table needed for generation would exceed the cell limit.
	#[error("length table of {states} states by {lengths} lengths exceeds {limit} cells")]
	LengthTableTooLarge { states: usize, lengths: usize, limit: usize },

	/// The requested length window is inverted.
	#[error("minimum length {min} exceeds maximum length {max}")]
	InvalidWindow { min: usize, max: usize },

	/// A configuration value is out of range.
	#[error("invalid configuration: {0}")]
	InvalidConfig(String),

	/// An acceptor snapshot could not be encoded or decoded.
	#[error("acceptor snapshot error: {0}")]
	Snapshot(#[from] postcard::Error),

	/// A decoded acceptor violates the automaton invariants.
	#[error("malformed acceptor: {0}")]
	MalformedAcceptor(String),
}

pub type Result<T> = std::result::Result<T, Error>;
