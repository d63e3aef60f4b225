//! Pattern text preprocessing.
//!
//! Two rewrites run before the pattern reaches the regex parser:
//! - `\Q ... \E` literal regions are expanded into individually escaped
//!   characters ([`requote`]),
//! - the predefined classes `\d \D \s \S \w \W` are replaced by their ASCII
//!   bracket equivalents ([`expand_perl_classes`]).
//!
//! Both passes track backslash escapes left to right, so an escaped marker
//! (`\\Q`, `\\d`) is copied through untouched. Neither pass can fail.

use std::str::Chars;

/// ASCII replacements for the predefined character classes.
///
/// Spaces are written as `\x20` so that verbose mode (`(?x)`) cannot drop them.
const PERL_CLASSES: [(char, &str); 6] = [
	('d', "[0-9]"),
	('D', "[^0-9]"),
	('s', "[\\x20\\t\\n\\x0C\\r]"),
	('S', "[^\\x20\\t\\n\\x0C\\r]"),
	('w', "[a-zA-Z_0-9]"),
	('W', "[^a-zA-Z_0-9]"),
];

/// Runs every preprocessing pass, in order.
///
/// The result is deterministic: the same input always yields the same text.
pub fn preprocess(pattern: &str) -> String {
	expand_perl_classes(&requote(pattern))
}

/// Rewrites `\Q ... \E` regions into escaped literal characters.
///
/// - A region opens on an unescaped `\Q` and closes on the next unescaped
///   `\E`, or at end of input when no closing marker exists.
/// - Inside the region a backslash still escapes the following character
///   for the purpose of finding `\E`, but the text itself is kept verbatim:
///   `\Q\\\E` quotes two backslashes.
/// - Markers preceded by an odd number of backslashes are plain text.
///
/// Example: `minion_\d{3}\Q@gru.evil\E` becomes `minion_\d{3}@gru\.evil`.
pub fn requote(pattern: &str) -> String {
	let mut out = String::with_capacity(pattern.len());
	let mut chars = pattern.chars();

	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}
		match chars.next() {
			Some('Q') => quote_region(&mut chars, &mut out),
			Some(escaped) => {
				out.push('\\');
				out.push(escaped);
			}
			None => out.push('\\'),
		}
	}

	out
}

/// Consumes a literal region up to (and including) its closing `\E`.
fn quote_region(chars: &mut Chars<'_>, out: &mut String) {
	while let Some(c) = chars.next() {
		if c != '\\' {
			push_literal(c, out);
			continue;
		}
		match chars.next() {
			Some('E') => return,
			Some(escaped) => {
				push_literal('\\', out);
				push_literal(escaped, out);
			}
			None => push_literal('\\', out),
		}
	}
}

/// Appends `c` so that the regex parser reads it as that exact character.
fn push_literal(c: char, out: &mut String) {
	if regex_syntax::is_meta_character(c) {
		out.push('\\');
		out.push(c);
	} else if c.is_whitespace() {
		out.push_str(&format!("\\x{{{:X}}}", u32::from(c)));
	} else {
		out.push(c);
	}
}

/// Replaces `\d \D \s \S \w \W` with ASCII bracket classes.
///
/// Works inside bracket expressions as well: `[\d_]` becomes `[[0-9]_]`,
/// which the parser reads as a nested class union.
pub fn expand_perl_classes(pattern: &str) -> String {
	let mut out = String::with_capacity(pattern.len());
	let mut chars = pattern.chars();

	while let Some(c) = chars.next() {
		if c != '\\' {
			out.push(c);
			continue;
		}
		match chars.next() {
			Some(escaped) => match perl_class(escaped) {
				Some(class) => out.push_str(class),
				None => {
					out.push('\\');
					out.push(escaped);
				}
			},
			None => out.push('\\'),
		}
	}

	out
}

fn perl_class(name: char) -> Option<&'static str> {
	PERL_CLASSES
		.iter()
		.find(|(class, _)| *class == name)
		.map(|(_, replacement)| *replacement)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn requote_escapes_meta_characters() {
		assert_eq!(requote(r"\Q$\E\Q$\E\Q$\E"), r"\$\$\$");
		assert_eq!(requote(r"minion_\d{3}\Q@gru.evil\E"), r"minion_\d{3}@gru\.evil");
	}

	#[test]
	fn requote_leaves_escaped_markers() {
		assert_eq!(requote(r"\\Q\\E"), r"\\Q\\E");
		assert_eq!(requote(r"\\\\\\Q\\\\E"), r"\\\\\\Q\\\\E");
	}

	#[test]
	fn requote_keeps_backslashes_inside_region() {
		// Two escaped backslashes, then a region quoting two backslashes.
		assert_eq!(requote(r"\\\\\Q\\\E"), r"\\\\\\\\");
		assert_eq!(requote(r"\\\\Q\\\Q$\\\E\\Q\\E"), r"\\\\Q\\\$\\\\\\Q\\E");
	}

	#[test]
	fn requote_unterminated_region_runs_to_end() {
		assert_eq!(requote(r"a\Qb.c"), r"ab\.c");
		assert_eq!(requote(r"\Q\"), r"\\");
	}

	#[test]
	fn requote_protects_whitespace() {
		assert_eq!(requote(r"\Qa b\E"), r"a\x{20}b");
	}

	#[test]
	fn trailing_backslash_is_kept() {
		assert_eq!(requote("a\\"), "a\\");
		assert_eq!(expand_perl_classes("a\\"), "a\\");
	}

	#[test]
	fn perl_classes_expand_outside_and_inside_brackets() {
		assert_eq!(expand_perl_classes(r"\d{3}"), "[0-9]{3}");
		assert_eq!(expand_perl_classes(r"[\w-]"), r"[[a-zA-Z_0-9]-]");
		assert_eq!(expand_perl_classes(r"\S"), r"[^\x20\t\n\x0C\r]");
	}

	#[test]
	fn escaped_backslash_before_class_letter_is_literal() {
		assert_eq!(expand_perl_classes(r"\\d"), r"\\d");
		assert_eq!(preprocess(r"\Q\d\E"), r"\\d");
	}

	#[test]
	fn other_escapes_are_untouched() {
		assert_eq!(expand_perl_classes(r"\p{Greek}\.\n"), r"\p{Greek}\.\n");
	}

	#[test]
	fn preprocess_is_stable() {
		let pattern = r"\\\\Q\\\Q$\\\E\\Q\\E\d";
		assert_eq!(preprocess(pattern), preprocess(pattern));
	}
}
