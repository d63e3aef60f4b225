use rand::Rng;

use serde::{Deserialize, Serialize};

/// Exact string count, clamped at `u128::MAX` instead of wrapping.
///
/// Used for language sizes and ranking. Sampling works on logarithms
/// instead, see [`pick_weighted`].
pub type Count = u128;

/// Index of a state inside an [`Acceptor`](super::acceptor::Acceptor) arena.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StateId(u32);

impl StateId {
	/// Builds an id from an arena index.
	///
	/// Arena sizes are bounded by the builder limits, far below `u32::MAX`.
	pub(crate) fn from_index(index: usize) -> Self {
		Self(index as u32)
	}

	/// Position of the state in the arena.
	pub fn index(self) -> usize {
		self.0 as usize
	}
}

/// An outgoing edge labeled with a contiguous range of characters.
///
/// Every character in `low..=high` leads to the same `target`.
///
/// ## Invariants
/// - `low <= high`
/// - The range never spans the surrogate gap (`U+D800..=U+DFFF`), so every
///   code point inside it is a valid `char`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
	low: char,
	high: char,
	target: StateId,
}

impl Transition {
	pub(crate) fn new(low: char, high: char, target: StateId) -> Self {
		Self { low, high, target }
	}

	pub fn low(&self) -> char {
		self.low
	}

	pub fn high(&self) -> char {
		self.high
	}

	pub fn target(&self) -> StateId {
		self.target
	}

	/// Number of characters in the range.
	pub fn width(&self) -> u32 {
		u32::from(self.high) - u32::from(self.low) + 1
	}

	pub fn contains(&self, c: char) -> bool {
		self.low <= c && c <= self.high
	}

	/// Returns the character `offset` positions after `low`, if inside the range.
	pub(crate) fn nth_char(&self, offset: u32) -> Option<char> {
		if offset >= self.width() {
			return None;
		}
		char::from_u32(u32::from(self.low) + offset)
	}

	/// Picks a character uniformly inside the range.
	pub(crate) fn random_char<R: Rng + ?Sized>(&self, rng: &mut R) -> char {
		let code = rng.random_range(u32::from(self.low)..=u32::from(self.high));
		char::from_u32(code).unwrap_or(self.low)
	}
}

/// A single acceptor state.
///
/// Conceptually a node of the automaton graph: it knows whether input may
/// end here and where each character leads.
///
/// ## Invariants
/// - Transitions are sorted by `low` and pairwise disjoint
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct State {
	accepting: bool,
	transitions: Vec<Transition>,
}

impl State {
	pub(crate) fn new(accepting: bool, transitions: Vec<Transition>) -> Self {
		Self { accepting, transitions }
	}

	pub fn is_accepting(&self) -> bool {
		self.accepting
	}

	pub fn transitions(&self) -> &[Transition] {
		&self.transitions
	}

	/// Follows the transition labeled with `c`, if any.
	pub fn next(&self, c: char) -> Option<StateId> {
		let index = self.transitions.partition_point(|t| t.high < c);
		self.transitions
			.get(index)
			.filter(|t| t.contains(c))
			.map(Transition::target)
	}
}

/// Picks one candidate with probability proportional to `exp(weight)`.
///
/// Weights are natural logarithms, so ratios survive counts far beyond any
/// integer type. `f64::NEG_INFINITY` marks a candidate that must never be
/// picked.
///
/// This method performs:
/// - an O(n) scan for the largest weight, which is shifted to `0`
/// - a cumulative subtraction to select a bucket
///
/// Returns `None` if every weight is `-inf` (or there are no candidates).
pub(crate) fn pick_weighted<'a, T, R: Rng + ?Sized>(candidates: &'a [(T, f64)], rng: &mut R) -> Option<&'a T> {
	let peak = candidates
		.iter()
		.map(|(_, weight)| *weight)
		.fold(f64::NEG_INFINITY, f64::max);
	if peak == f64::NEG_INFINITY {
		return None;
	}

	let shifted: Vec<f64> = candidates.iter().map(|(_, weight)| (weight - peak).exp()).collect();
	let total: f64 = shifted.iter().sum();
	let mut r = rng.random::<f64>() * total;

	let mut fallback = None;
	for ((item, _), weight) in candidates.iter().zip(&shifted) {
		if *weight <= 0.0 {
			continue;
		}
		if r < *weight {
			return Some(item);
		}
		r -= weight;
		fallback = Some(item);
	}

	// Rounding left `r` past the last bucket.
	fallback
}
