use log::debug;
use serde::{Deserialize, Serialize};

use super::builder;
use super::state::{State, StateId, Transition};
use crate::error::{Error, Result};
use crate::pattern;

/// Deterministic finite-state acceptor over character ranges.
///
/// States live in a flat arena and refer to each other by [`StateId`], so
/// cyclic patterns (`a*`, `(ab)+`) need no shared ownership.
///
/// # Responsibilities
/// - Expose the graph (initial state, accepting flags, ordered transitions)
/// - Check string membership
/// - Snapshot to and from bytes (`postcard`)
///
/// # Invariants
/// - The arena is non-empty and `initial` indexes into it
/// - Each state's transitions are sorted, disjoint and target existing states
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Acceptor {
	states: Vec<State>,
	initial: StateId,
}

impl Acceptor {
	/// Preprocesses `pattern` and compiles it into an acceptor.
	///
	/// # Errors
	/// - [`Error::PatternSyntax`] if the text is not a valid regular expression
	/// - [`Error::UnsupportedPattern`] for constructs with no whole-string meaning
	/// - [`Error::PatternTooLarge`] if the automaton exceeds the state limits
	pub fn build(pattern: &str) -> Result<Self> {
		let preprocessed = pattern::preprocess(pattern);
		let acceptor = builder::compile(&preprocessed)?;
		debug!("compiled {:?} into {} states", pattern, acceptor.state_count());
		Ok(acceptor)
	}

	pub(crate) fn from_parts(states: Vec<State>, initial: StateId) -> Self {
		Self { states, initial }
	}

	pub fn initial_state(&self) -> StateId {
		self.initial
	}

	pub fn is_accepting(&self, id: StateId) -> bool {
		self.state(id).is_accepting()
	}

	pub fn transitions_from(&self, id: StateId) -> &[Transition] {
		self.state(id).transitions()
	}

	pub fn state(&self, id: StateId) -> &State {
		&self.states[id.index()]
	}

	pub fn states(&self) -> &[State] {
		&self.states
	}

	pub fn state_count(&self) -> usize {
		self.states.len()
	}

	/// Returns `true` if the whole of `text` is accepted.
	pub fn accepts(&self, text: &str) -> bool {
		let mut current = self.initial;
		for c in text.chars() {
			match self.state(current).next(c) {
				Some(next) => current = next,
				None => return false,
			}
		}
		self.is_accepting(current)
	}

	/// Encodes the acceptor with `postcard`.
	pub fn to_bytes(&self) -> Result<Vec<u8>> {
		Ok(postcard::to_stdvec(self)?)
	}

	/// Decodes an acceptor produced by [`Acceptor::to_bytes`].
	///
	/// # Errors
	/// - [`Error::Snapshot`] if the bytes are not a valid encoding
	/// - [`Error::MalformedAcceptor`] if the decoded graph breaks an invariant
	pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
		let acceptor: Self = postcard::from_bytes(bytes)?;
		acceptor.validate()?;
		Ok(acceptor)
	}

	fn validate(&self) -> Result<()> {
		let count = self.states.len();
		if self.initial.index() >= count {
			return Err(Error::MalformedAcceptor(format!(
				"initial state {} out of {} states",
				self.initial.index(),
				count
			)));
		}

		for (index, state) in self.states.iter().enumerate() {
			let mut previous: Option<&Transition> = None;
			for transition in state.transitions() {
				if transition.low() > transition.high() {
					return Err(Error::MalformedAcceptor(format!("state {index}: inverted range")));
				}
				if u32::from(transition.low()) < 0xD800 && u32::from(transition.high()) > 0xDFFF {
					return Err(Error::MalformedAcceptor(format!("state {index}: range spans surrogates")));
				}
				if transition.target().index() >= count {
					return Err(Error::MalformedAcceptor(format!("state {index}: dangling target")));
				}
				if previous.is_some_and(|p| p.high() >= transition.low()) {
					return Err(Error::MalformedAcceptor(format!("state {index}: overlapping or unsorted ranges")));
				}
				previous = Some(transition);
			}
		}

		Ok(())
	}
}
