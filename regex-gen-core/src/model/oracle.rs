use std::collections::VecDeque;

use log::debug;

use super::acceptor::Acceptor;
use super::state::{Count, State, StateId};

/// Upper bound on `states × lengths` cells of a [`LengthTable`].
pub const MAX_TABLE_CELLS: usize = 1 << 24;

/// Longest accepted completion from a state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaxLength {
	Finite(usize),
	/// A cycle is reachable on the way to acceptance.
	Unbounded,
}

/// Length-independent facts about every state of an [`Acceptor`].
///
/// Linear in the size of the acceptor, so it is computed as soon as a
/// generator is built.
///
/// # Responsibilities
/// - Shortest accepted completion (reverse breadth-first search)
/// - Longest accepted completion (reverse topological peeling)
/// - Exact number of accepted completions when finite
#[derive(Debug)]
pub struct Completions {
	min_lengths: Vec<Option<usize>>,
	max_lengths: Vec<Option<MaxLength>>,
	language_sizes: Vec<Count>,
}

impl Completions {
	pub fn build(acceptor: &Acceptor) -> Self {
		let states = acceptor.states();
		let min_lengths = shortest_completions(states);
		let (max_lengths, language_sizes) = longest_completions(states, &min_lengths);
		Self {
			min_lengths,
			max_lengths,
			language_sizes,
		}
	}

	/// Shortest accepted completion, `None` if acceptance is unreachable.
	pub fn min_length(&self, state: StateId) -> Option<usize> {
		self.min_lengths[state.index()]
	}

	/// Longest accepted completion, `None` if acceptance is unreachable.
	pub fn max_length(&self, state: StateId) -> Option<MaxLength> {
		self.max_lengths[state.index()]
	}

	/// Total number of accepted completions, `None` when unbounded.
	///
	/// Saturates at `Count::MAX`.
	pub fn language_size(&self, state: StateId) -> Option<Count> {
		match self.max_lengths[state.index()] {
			None => Some(0),
			Some(MaxLength::Unbounded) => None,
			Some(MaxLength::Finite(_)) => Some(self.language_sizes[state.index()]),
		}
	}
}

/// Per-length completion counts of an [`Acceptor`], kept as logarithms.
///
/// For every state `s` and length `ℓ` in `[0, length_limit]`, the table
/// holds `ln N(s, ℓ)` where `N(s, ℓ)` is the number of strings of exactly
/// `ℓ` characters accepted from `s`:
///
/// ```text
/// N(s, 0) = 1 if s is accepting, else 0
/// N(s, ℓ) = Σ over s ─[R]→ t of |R| · N(t, ℓ - 1)
/// ```
///
/// Logarithms keep the ratios between counts exact enough for sampling
/// long after the counts themselves overflow (`\w{22}` already exceeds
/// `u128`). A zero count is stored as `f64::NEG_INFINITY`, so whether a
/// length is reachable stays exact.
///
/// # Invariants
/// - Built once per acceptor and limit, never mutated afterwards
/// - `states × (length_limit + 1) <= MAX_TABLE_CELLS` when built through a
///   generator
#[derive(Debug)]
pub struct LengthTable {
	length_limit: usize,
	state_count: usize,
	/// Row-major by length: `log_counts[length * state_count + state]`.
	log_counts: Vec<f64>,
}

impl LengthTable {
	pub fn build(acceptor: &Acceptor, length_limit: usize) -> Self {
		let states = acceptor.states();
		let log_counts = completion_counts(states, length_limit);

		debug!("built length table for {} states up to length {}", states.len(), length_limit);

		Self {
			length_limit,
			state_count: states.len(),
			log_counts,
		}
	}

	/// Cells a table over `state_count` states up to `length_limit` needs,
	/// `None` on overflow.
	pub fn cells(state_count: usize, length_limit: usize) -> Option<usize> {
		state_count.checked_mul(length_limit.checked_add(1)?)
	}

	pub fn length_limit(&self) -> usize {
		self.length_limit
	}

	/// `ln` of the number of accepted strings of exactly `length` characters
	/// from `state`, `-inf` when there are none.
	///
	/// Lengths beyond the limit are not tabulated and report `-inf`.
	pub fn log_count(&self, state: StateId, length: usize) -> f64 {
		if length > self.length_limit {
			return f64::NEG_INFINITY;
		}
		self.log_counts[length * self.state_count + state.index()]
	}

	/// Returns `true` if some string of exactly `length` characters is
	/// accepted from `state`.
	pub fn reaches(&self, state: StateId, length: usize) -> bool {
		self.log_count(state, length) > f64::NEG_INFINITY
	}

	/// Number of accepted strings of exactly `length` characters from
	/// `state`, rounded and clamped at `Count::MAX`.
	pub fn count(&self, state: StateId, length: usize) -> Count {
		if !self.reaches(state, length) {
			return 0;
		}
		// Float to integer casts saturate.
		self.log_count(state, length).exp().round() as Count
	}
}

/// Shortest distance from every state to an accepting state.
///
/// One breadth-first search over reversed edges, seeded with all accepting
/// states at distance zero.
pub(crate) fn shortest_completions(states: &[State]) -> Vec<Option<usize>> {
	let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); states.len()];
	for (index, state) in states.iter().enumerate() {
		for transition in state.transitions() {
			predecessors[transition.target().index()].push(index);
		}
	}

	let mut distances: Vec<Option<usize>> = vec![None; states.len()];
	let mut queue = VecDeque::new();
	for (index, state) in states.iter().enumerate() {
		if state.is_accepting() {
			distances[index] = Some(0);
			queue.push_back((index, 0));
		}
	}

	while let Some((index, distance)) = queue.pop_front() {
		for &predecessor in &predecessors[index] {
			if distances[predecessor].is_none() {
				distances[predecessor] = Some(distance + 1);
				queue.push_back((predecessor, distance + 1));
			}
		}
	}

	distances
}

/// Longest completion and language size of every live state.
///
/// Live states whose live successors are all resolved get peeled off in
/// reverse topological order. Whatever is never peeled reaches a cycle
/// through live states and is unbounded.
fn longest_completions(states: &[State], min_lengths: &[Option<usize>]) -> (Vec<Option<MaxLength>>, Vec<Count>) {
	let live = |index: usize| min_lengths[index].is_some();

	let mut pending = vec![0usize; states.len()];
	let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); states.len()];
	for (index, state) in states.iter().enumerate().filter(|(index, _)| live(*index)) {
		for transition in state.transitions() {
			let target = transition.target().index();
			if live(target) {
				pending[index] += 1;
				predecessors[target].push(index);
			}
		}
	}

	let mut ready: Vec<usize> = (0..states.len())
		.filter(|&index| live(index) && pending[index] == 0)
		.collect();
	let mut max_lengths: Vec<Option<MaxLength>> = vec![None; states.len()];
	let mut sizes: Vec<Count> = vec![0; states.len()];

	while let Some(index) = ready.pop() {
		let state = &states[index];
		let mut longest = 0;
		let mut size: Count = if state.is_accepting() { 1 } else { 0 };

		for transition in state.transitions() {
			let target = transition.target().index();
			if let Some(MaxLength::Finite(length)) = max_lengths[target] {
				longest = longest.max(length + 1);
				size = size.saturating_add(Count::from(transition.width()).saturating_mul(sizes[target]));
			}
		}
		max_lengths[index] = Some(MaxLength::Finite(longest));
		sizes[index] = size;

		for &predecessor in &predecessors[index] {
			pending[predecessor] -= 1;
			if pending[predecessor] == 0 {
				ready.push(predecessor);
			}
		}
	}

	for (index, max_length) in max_lengths.iter_mut().enumerate() {
		if live(index) && max_length.is_none() {
			*max_length = Some(MaxLength::Unbounded);
		}
	}

	(max_lengths, sizes)
}

/// Bottom-up `ln` completion counts for lengths `0..=length_limit`.
fn completion_counts(states: &[State], length_limit: usize) -> Vec<f64> {
	let n = states.len();
	let mut log_counts: Vec<f64> = vec![f64::NEG_INFINITY; n * (length_limit + 1)];

	for (index, state) in states.iter().enumerate() {
		if state.is_accepting() {
			log_counts[index] = 0.0;
		}
	}

	for length in 1..=length_limit {
		let (shorter, current) = log_counts.split_at_mut(length * n);
		let previous = &shorter[(length - 1) * n..];
		for (index, state) in states.iter().enumerate() {
			current[index] = state.transitions().iter().fold(f64::NEG_INFINITY, |acc, transition| {
				let completions = previous[transition.target().index()];
				log_add(acc, f64::from(transition.width()).ln() + completions)
			});
		}
	}

	log_counts
}

/// `ln(exp(a) + exp(b))` without leaving log space.
fn log_add(a: f64, b: f64) -> f64 {
	let (high, low) = if a >= b { (a, b) } else { (b, a) };
	if low == f64::NEG_INFINITY {
		return high;
	}
	high + (low - high).exp().ln_1p()
}
