//! Ordered enumeration of accepted strings.
//!
//! Strings come out depth first: a string precedes its extensions, and
//! siblings are visited by increasing character. For `a|ab|b` the order
//! is `a`, `ab`, `b`.

use crate::model::acceptor::Acceptor;
use crate::model::generator::Generator;
use crate::model::oracle::Completions;
use crate::model::state::{Count, StateId};

/// Position inside one state of the depth-first walk.
#[derive(Debug)]
struct Frame {
	state: StateId,
	transition: usize,
	offset: u32,
}

impl Frame {
	fn new(state: StateId) -> Self {
		Self { state, transition: 0, offset: 0 }
	}
}

/// Lazy iterator over accepted strings, see [`Generator::matches`].
#[derive(Debug)]
pub struct Matches<'a> {
	acceptor: &'a Acceptor,
	completions: &'a Completions,
	stack: Vec<Frame>,
	prefix: String,
	/// State entered by the last character, not yet pushed.
	pending: Option<StateId>,
	depth_limit: Option<usize>,
}

impl<'a> Matches<'a> {
	fn new(acceptor: &'a Acceptor, completions: &'a Completions, depth_limit: Option<usize>) -> Self {
		let initial = acceptor.initial_state();
		let pending = reachable(completions, depth_limit, initial, 0).then_some(initial);
		Self {
			acceptor,
			completions,
			stack: Vec::new(),
			prefix: String::new(),
			pending,
			depth_limit,
		}
	}
}

/// Whether `state`, entered after `depth` characters, can still reach
/// acceptance within the depth limit.
fn reachable(completions: &Completions, depth_limit: Option<usize>, state: StateId, depth: usize) -> bool {
	match (completions.min_length(state), depth_limit) {
		(None, _) => false,
		(Some(_), None) => true,
		(Some(shortest), Some(limit)) => depth + shortest <= limit,
	}
}

impl Iterator for Matches<'_> {
	type Item = String;

	fn next(&mut self) -> Option<String> {
		let Self { acceptor, completions, stack, prefix, pending, depth_limit } = self;
		let (acceptor, completions, depth_limit) = (*acceptor, *completions, *depth_limit);

		loop {
			if let Some(state) = pending.take() {
				stack.push(Frame::new(state));
				if acceptor.is_accepting(state) {
					return Some(prefix.clone());
				}
				continue;
			}

			let depth = stack.len();
			let frame = stack.last_mut()?;
			let transitions = acceptor.transitions_from(frame.state);

			let mut step = None;
			while let Some(transition) = transitions.get(frame.transition) {
				if !reachable(completions, depth_limit, transition.target(), depth) {
					frame.transition += 1;
					continue;
				}
				match transition.nth_char(frame.offset) {
					Some(c) => {
						frame.offset += 1;
						step = Some((c, transition.target()));
						break;
					}
					None => {
						frame.transition += 1;
						frame.offset = 0;
					}
				}
			}

			match step {
				Some((c, target)) => {
					prefix.push(c);
					*pending = Some(target);
				}
				None => {
					stack.pop();
					if !stack.is_empty() {
						prefix.pop();
					}
				}
			}
		}
	}
}

impl Generator {
	/// Iterates over accepted strings in depth-first order.
	///
	/// Finite languages are enumerated completely. For infinite languages,
	/// strings longer than [`Generator::length_limit`] are skipped, which
	/// keeps every branch of the walk finite.
	pub fn matches(&self) -> Matches<'_> {
		let depth_limit = self.is_infinite().then(|| self.length_limit());
		Matches::new(self.acceptor(), self.completions(), depth_limit)
	}

	/// First string of [`Generator::matches`], `None` for an empty language.
	pub fn first_match(&self) -> Option<String> {
		self.matches().next()
	}

	/// Number of accepted strings, `None` if infinite.
	///
	/// Saturates at `Count::MAX`.
	pub fn matched_strings_count(&self) -> Option<Count> {
		self.completions().language_size(self.acceptor().initial_state())
	}

	/// String at 0-based position `index` of [`Generator::matches`].
	///
	/// Skips whole subtrees using their language size instead of walking
	/// them. Returns `None` for infinite languages and out-of-range indexes.
	pub fn nth_match(&self, index: Count) -> Option<String> {
		let acceptor = self.acceptor();
		let completions = self.completions();
		let mut state = acceptor.initial_state();
		let mut remaining = index;
		if remaining >= completions.language_size(state)? {
			return None;
		}

		let mut word = String::new();
		loop {
			if acceptor.is_accepting(state) {
				if remaining == 0 {
					return Some(word);
				}
				remaining -= 1;
			}

			let mut step = None;
			for transition in acceptor.transitions_from(state) {
				let per_char = completions.language_size(transition.target())?;
				if per_char == 0 {
					continue;
				}
				let block = Count::from(transition.width()).saturating_mul(per_char);
				if remaining < block {
					let offset = u32::try_from(remaining / per_char).ok()?;
					remaining %= per_char;
					step = Some((transition.nth_char(offset)?, transition.target()));
					break;
				}
				remaining -= block;
			}

			let (c, target) = step?;
			word.push(c);
			state = target;
		}
	}
}

#[cfg(test)]
mod tests {
	use crate::model::config::GeneratorConfig;
	use crate::model::generator::Generator;

	fn all(pattern: &str) -> Vec<String> {
		Generator::new(pattern).unwrap().matches().collect()
	}

	#[test]
	fn prefixes_come_first() {
		assert_eq!(all("a|ab|b"), ["a", "ab", "b"]);
		assert_eq!(all("[0-2]x?"), ["0", "0x", "1", "1x", "2", "2x"]);
	}

	#[test]
	fn empty_string_is_enumerated() {
		assert_eq!(all("a?"), ["", "a"]);
	}

	#[test]
	fn empty_language_has_no_matches() {
		let generator = Generator::new(r"[^\s\S]").unwrap();
		assert_eq!(generator.first_match(), None);
		assert_eq!(generator.matched_strings_count(), Some(0));
		assert_eq!(generator.nth_match(0), None);
	}

	#[test]
	fn infinite_language_respects_cap() {
		let config = GeneratorConfig::default().with_cap_length(3).unwrap();
		let generator = Generator::with_config("a*b", config).unwrap();
		assert!(generator.is_infinite());
		assert_eq!(generator.matches().collect::<Vec<_>>(), ["aab", "ab", "b"]);
		assert_eq!(generator.matched_strings_count(), None);
		assert_eq!(generator.nth_match(0), None);
	}

	#[test]
	fn count_covers_range_widths() {
		let generator = Generator::new(r"[a-c]\d").unwrap();
		assert_eq!(generator.matched_strings_count(), Some(30));
		assert_eq!(generator.matches().count(), 30);
		assert_eq!(generator.first_match().as_deref(), Some("a0"));
	}

	#[test]
	fn nth_match_agrees_with_iteration() {
		let generator = Generator::new(r"(ab|a)c?|[x-z]{1,2}").unwrap();
		let listed: Vec<String> = generator.matches().collect();
		let count = generator.matched_strings_count().unwrap();
		assert_eq!(listed.len() as u128, count);
		for (index, expected) in listed.iter().enumerate() {
			assert_eq!(generator.nth_match(index as u128).as_ref(), Some(expected));
		}
		assert_eq!(generator.nth_match(count), None);
	}
}
