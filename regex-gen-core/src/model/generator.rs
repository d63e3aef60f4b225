use std::sync::OnceLock;

use log::{debug, trace};
use rand::Rng;

use crate::error::{Error, Result};
use crate::model::acceptor::Acceptor;
use crate::model::config::GeneratorConfig;
use crate::model::oracle::{Completions, LengthTable, MAX_TABLE_CELLS, MaxLength};
use crate::model::state::{StateId, Transition, pick_weighted};

/// Random string generator for a regular expression.
///
/// # Responsibilities
/// - Compile the pattern once into an [`Acceptor`]
/// - Build the [`LengthTable`] on first use and keep it for the lifetime
///   of the generator
/// - Draw strings whose length falls in a requested window, uniformly over
///   the accepted strings of the window
/// - Degrade to a best-effort string when no accepted string fits
///
/// # Length limit
/// Finite languages are tabulated up to their longest match. Languages
/// with unbounded repetition are tabulated up to `cap_length`, or up to
/// their shortest match if that is longer. No generated string exceeds
/// this limit.
///
/// The generator is immutable once built, so it can be shared between
/// threads; each caller supplies its own random number generator.
#[derive(Debug)]
pub struct Generator {
	acceptor: Acceptor,
	config: GeneratorConfig,
	completions: Completions,
	length_limit: usize,
	table: OnceLock<LengthTable>,
}

impl Generator {
	/// Creates a generator with the default configuration.
	///
	/// # Errors
	/// Any error of [`Acceptor::build`] or [`Generator::from_acceptor`].
	pub fn new(pattern: &str) -> Result<Self> {
		Self::with_config(pattern, GeneratorConfig::default())
	}

	/// Creates a generator with an explicit configuration.
	pub fn with_config(pattern: &str, config: GeneratorConfig) -> Result<Self> {
		let acceptor = Acceptor::build(pattern)?;
		Self::from_acceptor(acceptor, config)
	}

	/// Creates a generator over an already compiled acceptor, for instance
	/// one restored with [`Acceptor::from_bytes`].
	///
	/// # Errors
	/// Returns [`Error::LengthTableTooLarge`] if the length table would hold
	/// more than [`MAX_TABLE_CELLS`] cells.
	pub fn from_acceptor(acceptor: Acceptor, config: GeneratorConfig) -> Result<Self> {
		let completions = Completions::build(&acceptor);
		let initial = acceptor.initial_state();
		let length_limit = match completions.max_length(initial) {
			Some(MaxLength::Finite(longest)) => longest,
			Some(MaxLength::Unbounded) => completions
				.min_length(initial)
				.map_or(0, |shortest| shortest.max(config.cap_length())),
			None => 0,
		};

		let states = acceptor.state_count();
		match LengthTable::cells(states, length_limit) {
			Some(cells) if cells <= MAX_TABLE_CELLS => {}
			_ => {
				return Err(Error::LengthTableTooLarge {
					states,
					lengths: length_limit.saturating_add(1),
					limit: MAX_TABLE_CELLS,
				});
			}
		}

		Ok(Self {
			acceptor,
			config,
			completions,
			length_limit,
			table: OnceLock::new(),
		})
	}

	/// Returns `true` if `pattern` compiles.
	pub fn is_valid_pattern(pattern: &str) -> bool {
		Acceptor::build(pattern).is_ok()
	}

	pub fn acceptor(&self) -> &Acceptor {
		&self.acceptor
	}

	pub fn config(&self) -> &GeneratorConfig {
		&self.config
	}

	pub fn cap_length(&self) -> usize {
		self.config.cap_length()
	}

	/// Longest string this generator ever produces, see the
	/// [length limit](Generator#length-limit).
	pub fn length_limit(&self) -> usize {
		self.length_limit
	}

	pub(crate) fn completions(&self) -> &Completions {
		&self.completions
	}

	fn table(&self) -> &LengthTable {
		self.table
			.get_or_init(|| LengthTable::build(&self.acceptor, self.length_limit))
	}

	/// Returns `true` if the pattern matches the whole of `text`.
	pub fn accepts(&self, text: &str) -> bool {
		self.acceptor.accepts(text)
	}

	/// Length of the shortest accepted string, `None` for an empty language.
	pub fn min_match_length(&self) -> Option<usize> {
		self.completions.min_length(self.acceptor.initial_state())
	}

	/// Length of the longest accepted string, `None` for an empty language.
	pub fn max_match_length(&self) -> Option<MaxLength> {
		self.completions.max_length(self.acceptor.initial_state())
	}

	/// Returns `true` if the pattern accepts infinitely many strings.
	pub fn is_infinite(&self) -> bool {
		self.max_match_length() == Some(MaxLength::Unbounded)
	}

	/// Generates an accepted string of at most [`Generator::length_limit`]
	/// characters.
	pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
		self.sample(0, usize::MAX, rng)
	}

	/// Generates a string of at least `min` characters.
	///
	/// A `min` above [`Generator::length_limit`] cannot be honored; the
	/// usual fallbacks apply.
	pub fn generate_min<R: Rng + ?Sized>(&self, min: usize, rng: &mut R) -> String {
		self.sample(min, usize::MAX, rng)
	}

	/// Generates a string whose length lies in `min..=max`.
	///
	/// The upper bound is clamped to [`Generator::length_limit`]. Among the
	/// accepted strings whose length fits, each one is equally likely. When
	/// none fits, the result is still deterministic in kind:
	/// - empty language: `""`
	/// - every accepted string within the limit is shorter than `min`: one of
	///   the longest of them
	/// - every accepted string is longer than the clamped `max`: a prefix of
	///   a shortest accepted string, exactly `max` characters long
	///
	/// # Errors
	/// Returns [`Error::InvalidWindow`] if `min > max`.
	pub fn generate_between<R: Rng + ?Sized>(&self, min: usize, max: usize, rng: &mut R) -> Result<String> {
		if min > max {
			return Err(Error::InvalidWindow { min, max });
		}
		Ok(self.sample(min, max, rng))
	}

	fn sample<R: Rng + ?Sized>(&self, min: usize, max: usize, rng: &mut R) -> String {
		let initial = self.acceptor.initial_state();
		let effective_max = max.min(self.length_limit);

		let Some(shortest) = self.completions.min_length(initial) else {
			debug!("window {min}..={effective_max}: empty language");
			return String::new();
		};
		if shortest > effective_max {
			debug!("window {min}..={effective_max}: shortest match has {shortest} characters, truncating");
			return self.truncated_walk(effective_max, rng);
		}

		let table = self.table();
		let lengths: Vec<(usize, f64)> = (min..=effective_max)
			.map(|length| (length, table.log_count(initial, length)))
			.collect();

		if let Some(&length) = pick_weighted(&lengths, rng) {
			trace!("window {min}..={effective_max}: generating {length} characters");
			return self.walk(length, rng);
		}

		let length = (shortest..=effective_max)
			.rev()
			.find(|&length| table.reaches(initial, length))
			.unwrap_or(shortest);
		debug!("window {min}..={effective_max}: too short, falling back to {length} characters");
		self.walk(length, rng)
	}

	/// Walks exactly `length` transitions to an accepting state.
	///
	/// Each transition is weighted by the number of accepted completions it
	/// leaves for the remaining steps, which makes every accepted string of
	/// that length equally likely.
	fn walk<R: Rng + ?Sized>(&self, length: usize, rng: &mut R) -> String {
		let table = self.table();
		let mut state = self.acceptor.initial_state();
		let mut word = String::with_capacity(length);

		for remaining in (0..length).rev() {
			let candidates: Vec<(Transition, f64)> = self
				.acceptor
				.transitions_from(state)
				.iter()
				.map(|t| (*t, f64::from(t.width()).ln() + table.log_count(t.target(), remaining)))
				.collect();
			let Some(transition) = pick_weighted(&candidates, rng) else {
				break;
			};
			word.push(transition.random_char(rng));
			state = transition.target();
		}

		word
	}

	/// Walks `steps` transitions, always towards a shortest completion.
	fn truncated_walk<R: Rng + ?Sized>(&self, steps: usize, rng: &mut R) -> String {
		let mut state = self.acceptor.initial_state();
		let mut word = String::with_capacity(steps);

		for _ in 0..steps {
			let Some(next) = self.shortest_step(state, rng) else {
				break;
			};
			word.push(next.random_char(rng));
			state = next.target();
		}

		word
	}

	/// Picks among the transitions whose target is closest to acceptance,
	/// weighted by range width.
	fn shortest_step<R: Rng + ?Sized>(&self, state: StateId, rng: &mut R) -> Option<Transition> {
		let transitions = self.acceptor.transitions_from(state);
		let closest = transitions
			.iter()
			.filter_map(|t| self.completions.min_length(t.target()))
			.min()?;
		let candidates: Vec<(Transition, f64)> = transitions
			.iter()
			.filter(|t| self.completions.min_length(t.target()) == Some(closest))
			.map(|t| (*t, f64::from(t.width()).ln()))
			.collect();
		pick_weighted(&candidates, rng).copied()
	}
}
