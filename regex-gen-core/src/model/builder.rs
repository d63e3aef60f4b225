//! Pattern compilation: `regex_syntax` HIR to a trimmed character-range DFA.
//!
//! ```text
//! pattern ──parse──> Hir ──lower──> Thompson NFA ──subset construction──> DFA ──trim──> Acceptor
//! ```
//!
//! The NFA works on `u32` code point ranges. Any range that covers the
//! surrogate gap is split in two, so that DFA ranges only ever hold valid
//! `char`s.
//!
//! Anchors (`^`, `$` and their multi-line forms) are zero-width edges of the
//! NFA. A DFA state is a set of [`Thread`]s: an NFA state plus what the next
//! character may be, narrowed by the end anchors passed so far. Start
//! anchors are checked against the character that entered the DFA state.
//! In CRLF mode `\r\n` is not treated as one line break, so `^` also holds
//! between `\r` and `\n`.

use std::collections::HashMap;

use regex_syntax::ParserBuilder;
use regex_syntax::hir::{self, Hir, HirKind};

use super::acceptor::Acceptor;
use super::oracle::shortest_completions;
use super::state::{State, StateId, Transition};
use crate::error::{Error, Result};

/// Upper bound on Thompson NFA states for a single pattern.
pub const MAX_NFA_STATES: usize = 1 << 16;

/// Upper bound on DFA states produced by subset construction.
pub const MAX_DFA_STATES: usize = 1 << 14;

const SURROGATE_START: u32 = 0xD800;
const SURROGATE_END: u32 = 0xDFFF;

/// Compiles an already preprocessed pattern.
pub(crate) fn compile(pattern: &str) -> Result<Acceptor> {
	let hir = ParserBuilder::new().build().parse(pattern)?;

	let mut nfa = Nfa::default();
	let fragment = nfa.lower(&hir)?;
	nfa.accept = fragment.end;

	let states = determinize(&nfa, fragment.start)?;
	Ok(trim(states))
}

const LINE_FEED: u32 = 0x0A;
const CARRIAGE_RETURN: u32 = 0x0D;

#[derive(Default)]
struct NfaState {
	epsilons: Vec<usize>,
	looks: Vec<(hir::Look, usize)>,
	ranges: Vec<(u32, u32, usize)>,
}

/// Characters allowed right after the current position, from the narrowest
/// to the widest. Passing two end anchors keeps the narrower set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
enum Follow {
	/// End of text only.
	Nothing,
	LineFeed,
	/// `\n` or `\r`.
	LineBreak,
	Any,
}

impl Follow {
	const ALL: [Follow; 4] = [Follow::Nothing, Follow::LineFeed, Follow::LineBreak, Follow::Any];

	fn allowed(self) -> &'static [(u32, u32)] {
		match self {
			Follow::Nothing => &[],
			Follow::LineFeed => &[(LINE_FEED, LINE_FEED)],
			Follow::LineBreak => &[(LINE_FEED, LINE_FEED), (CARRIAGE_RETURN, CARRIAGE_RETURN)],
			Follow::Any => &[(0, u32::MAX)],
		}
	}

	fn index(self) -> usize {
		self as usize
	}
}

/// What precedes the current position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Position {
	Start,
	AfterLineFeed,
	AfterCarriageReturn,
	Other,
}

impl Position {
	fn after(low: u32, high: u32) -> Self {
		match (low, high) {
			(LINE_FEED, LINE_FEED) => Position::AfterLineFeed,
			(CARRIAGE_RETURN, CARRIAGE_RETURN) => Position::AfterCarriageReturn,
			_ => Position::Other,
		}
	}

	fn satisfies(self, look: hir::Look) -> bool {
		match look {
			hir::Look::Start => self == Position::Start,
			hir::Look::StartLF => matches!(self, Position::Start | Position::AfterLineFeed),
			hir::Look::StartCRLF => self != Position::Other,
			_ => true,
		}
	}
}

/// NFA state reached with a constraint on the next character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
struct Thread {
	state: usize,
	follow: Follow,
}

impl Thread {
	fn new(state: usize) -> Self {
		Self { state, follow: Follow::Any }
	}

	/// Crosses `look`, `None` if it cannot hold at `position`.
	fn cross(self, look: hir::Look, position: Position, target: usize) -> Option<Thread> {
		if !position.satisfies(look) {
			return None;
		}
		let follow = match look {
			hir::Look::End => Follow::Nothing,
			hir::Look::EndLF => self.follow.min(Follow::LineFeed),
			hir::Look::EndCRLF => self.follow.min(Follow::LineBreak),
			_ => self.follow,
		};
		Some(Thread { state: target, follow })
	}
}

/// Sub-automaton with a single entry and a single exit.
#[derive(Clone, Copy)]
struct Fragment {
	start: usize,
	end: usize,
}

#[derive(Default)]
struct Nfa {
	states: Vec<NfaState>,
	accept: usize,
}

impl Nfa {
	fn add_state(&mut self) -> Result<usize> {
		if self.states.len() >= MAX_NFA_STATES {
			return Err(Error::PatternTooLarge { limit: MAX_NFA_STATES });
		}
		self.states.push(NfaState::default());
		Ok(self.states.len() - 1)
	}

	fn add_epsilon(&mut self, from: usize, to: usize) {
		self.states[from].epsilons.push(to);
	}

	fn add_look(&mut self, from: usize, look: hir::Look, to: usize) {
		self.states[from].looks.push((look, to));
	}

	fn add_range(&mut self, from: usize, low: u32, high: u32, to: usize) {
		let ranges = &mut self.states[from].ranges;
		if low < SURROGATE_START && high > SURROGATE_END {
			ranges.push((low, SURROGATE_START - 1, to));
			ranges.push((SURROGATE_END + 1, high, to));
		} else {
			ranges.push((low, high, to));
		}
	}

	fn empty(&mut self) -> Result<Fragment> {
		let state = self.add_state()?;
		Ok(Fragment { start: state, end: state })
	}

	fn lower(&mut self, hir: &Hir) -> Result<Fragment> {
		match hir.kind() {
			HirKind::Empty => self.empty(),
			HirKind::Literal(hir::Literal(bytes)) => {
				let text = std::str::from_utf8(bytes)
					.map_err(|_| Error::UnsupportedPattern("literal is not valid UTF-8".to_owned()))?;
				let start = self.add_state()?;
				let mut end = start;
				for c in text.chars() {
					let next = self.add_state()?;
					self.add_range(end, u32::from(c), u32::from(c), next);
					end = next;
				}
				Ok(Fragment { start, end })
			}
			HirKind::Class(hir::Class::Unicode(class)) => {
				let start = self.add_state()?;
				let end = self.add_state()?;
				for range in class.ranges() {
					self.add_range(start, u32::from(range.start()), u32::from(range.end()), end);
				}
				Ok(Fragment { start, end })
			}
			HirKind::Class(hir::Class::Bytes(class)) => {
				let start = self.add_state()?;
				let end = self.add_state()?;
				for range in class.ranges() {
					if !range.end().is_ascii() {
						return Err(Error::UnsupportedPattern("byte class outside ASCII".to_owned()));
					}
					self.add_range(start, u32::from(range.start()), u32::from(range.end()), end);
				}
				Ok(Fragment { start, end })
			}
			HirKind::Look(look) => match look {
				hir::Look::Start
				| hir::Look::End
				| hir::Look::StartLF
				| hir::Look::EndLF
				| hir::Look::StartCRLF
				| hir::Look::EndCRLF => {
					let start = self.add_state()?;
					let end = self.add_state()?;
					self.add_look(start, *look, end);
					Ok(Fragment { start, end })
				}
				other => Err(Error::UnsupportedPattern(format!("look-around assertion {other:?}"))),
			},
			HirKind::Capture(capture) => self.lower(&capture.sub),
			HirKind::Concat(children) => {
				let mut joined: Option<Fragment> = None;
				for child in children {
					let fragment = self.lower(child)?;
					joined = Some(match joined {
						None => fragment,
						Some(previous) => {
							self.add_epsilon(previous.end, fragment.start);
							Fragment { start: previous.start, end: fragment.end }
						}
					});
				}
				match joined {
					Some(fragment) => Ok(fragment),
					None => self.empty(),
				}
			}
			HirKind::Alternation(children) => {
				let start = self.add_state()?;
				let end = self.add_state()?;
				for child in children {
					let fragment = self.lower(child)?;
					self.add_epsilon(start, fragment.start);
					self.add_epsilon(fragment.end, end);
				}
				Ok(Fragment { start, end })
			}
			HirKind::Repetition(repetition) => self.lower_repetition(repetition),
		}
	}

	/// `sub{min,max}` becomes `min` mandatory copies followed by either a
	/// loop (unbounded) or `max - min` nested optional copies.
	fn lower_repetition(&mut self, repetition: &hir::Repetition) -> Result<Fragment> {
		let start = self.add_state()?;
		let mut end = start;

		for _ in 0..repetition.min {
			let copy = self.lower(&repetition.sub)?;
			self.add_epsilon(end, copy.start);
			end = copy.end;
		}

		let exit = self.add_state()?;
		match repetition.max {
			None => {
				let body = self.lower(&repetition.sub)?;
				self.add_epsilon(end, body.start);
				self.add_epsilon(body.end, body.start);
				self.add_epsilon(body.end, exit);
			}
			Some(max) => {
				for _ in repetition.min..max {
					let copy = self.lower(&repetition.sub)?;
					self.add_epsilon(end, exit);
					self.add_epsilon(end, copy.start);
					end = copy.end;
				}
			}
		}
		self.add_epsilon(end, exit);

		Ok(Fragment { start, end: exit })
	}

	/// Sorted closure of `seeds` over epsilon edges and the anchors that
	/// hold at `position`.
	fn closure(&self, seeds: &[usize], position: Position) -> Vec<Thread> {
		let mut seen = vec![false; self.states.len() * Follow::ALL.len()];
		let mut stack: Vec<Thread> = seeds.iter().map(|&state| Thread::new(state)).collect();
		let mut members = Vec::new();

		while let Some(thread) = stack.pop() {
			let slot = thread.state * Follow::ALL.len() + thread.follow.index();
			if seen[slot] {
				continue;
			}
			seen[slot] = true;
			members.push(thread);

			let state = &self.states[thread.state];
			stack.extend(state.epsilons.iter().map(|&target| Thread { state: target, ..thread }));
			stack.extend(
				state
					.looks
					.iter()
					.filter_map(|&(look, target)| thread.cross(look, position, target)),
			);
		}

		members.sort_unstable();
		members
	}
}

/// Interns NFA state sets as DFA state ids.
#[derive(Default)]
struct SetArena {
	ids: HashMap<Vec<Thread>, StateId>,
	sets: Vec<Vec<Thread>>,
}

impl SetArena {
	fn intern(&mut self, set: Vec<Thread>) -> Result<StateId> {
		if let Some(&id) = self.ids.get(&set) {
			return Ok(id);
		}
		if self.sets.len() >= MAX_DFA_STATES {
			return Err(Error::PatternTooLarge { limit: MAX_DFA_STATES });
		}
		let id = StateId::from_index(self.sets.len());
		self.sets.push(set.clone());
		self.ids.insert(set, id);
		Ok(id)
	}
}

/// Subset construction. The initial DFA state is always at index 0.
fn determinize(nfa: &Nfa, start: usize) -> Result<Vec<State>> {
	let mut arena = SetArena::default();
	arena.intern(nfa.closure(&[start], Position::Start))?;

	let mut states = Vec::new();
	let mut index = 0;
	while index < arena.sets.len() {
		let members = arena.sets[index].clone();
		let accepting = members.iter().any(|thread| thread.state == nfa.accept);

		let mut ranges: Vec<(u32, u32, usize)> = Vec::new();
		for thread in &members {
			for &(low, high, target) in &nfa.states[thread.state].ranges {
				for &(allowed_low, allowed_high) in thread.follow.allowed() {
					let (low, high) = (low.max(allowed_low), high.min(allowed_high));
					if low <= high {
						ranges.push((low, high, target));
					}
				}
			}
		}

		// Split the alphabet at every range boundary; each slice then maps to
		// exactly one set of NFA targets. Line breaks get slices of their own
		// because start anchors look at them.
		let mut bounds: Vec<u32> = ranges
			.iter()
			.flat_map(|&(low, high, _)| [low, high + 1])
			.chain([LINE_FEED, LINE_FEED + 1, CARRIAGE_RETURN, CARRIAGE_RETURN + 1])
			.collect();
		bounds.sort_unstable();
		bounds.dedup();

		let mut transitions: Vec<Transition> = Vec::new();
		for window in bounds.windows(2) {
			let (low, high) = (window[0], window[1] - 1);
			let targets: Vec<usize> = ranges
				.iter()
				.filter(|&&(range_low, range_high, _)| range_low <= low && high <= range_high)
				.map(|&(_, _, target)| target)
				.collect();
			if targets.is_empty() {
				continue;
			}
			let target = arena.intern(nfa.closure(&targets, Position::after(low, high)))?;

			let (Some(low_char), Some(high_char)) = (char::from_u32(low), char::from_u32(high)) else {
				continue;
			};
			match transitions.last_mut() {
				Some(last) if last.target() == target && u32::from(last.high()) + 1 == low => {
					*last = Transition::new(last.low(), high_char, target);
				}
				_ => transitions.push(Transition::new(low_char, high_char, target)),
			}
		}

		states.push(State::new(accepting, transitions));
		index += 1;
	}

	Ok(states)
}

/// Drops every state that cannot reach acceptance, except the initial one.
fn trim(states: Vec<State>) -> Acceptor {
	let live = shortest_completions(&states);

	let mut remap: Vec<Option<StateId>> = vec![None; states.len()];
	let mut next = 0;
	for (index, distance) in live.iter().enumerate() {
		if distance.is_some() || index == 0 {
			remap[index] = Some(StateId::from_index(next));
			next += 1;
		}
	}

	let trimmed = states
		.into_iter()
		.enumerate()
		.filter(|(index, _)| remap[*index].is_some())
		.map(|(_, state)| {
			let transitions = state
				.transitions()
				.iter()
				.filter(|t| live[t.target().index()].is_some())
				.filter_map(|t| remap[t.target().index()].map(|target| Transition::new(t.low(), t.high(), target)))
				.collect();
			State::new(state.is_accepting(), transitions)
		})
		.collect();

	Acceptor::from_parts(trimmed, StateId::from_index(0))
}
