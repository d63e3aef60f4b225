use std::collections::HashMap;

use rand::SeedableRng;
use rand::rngs::StdRng;
use regex::Regex;
use regex_gen_core::{Error, Generator, GeneratorConfig};

fn whole(pattern: &str) -> Regex {
	Regex::new(&format!("^(?:{pattern})$")).unwrap()
}

fn length(text: &str) -> usize {
	text.chars().count()
}

#[test]
fn infinite_pattern_is_capped() {
	let generator = Generator::new("a*").unwrap();
	let mut rng = StdRng::seed_from_u64(1);
	for _ in 0..100 {
		assert!(length(&generator.generate(&mut rng)) <= 50);
	}
}

#[test]
fn quoted_regions_generate_their_literal_text() {
	let cases = [
		(r"\Q$\E\Q$\E\Q$\E", "$$$"),
		(r"\\Q\\E", r"\Q\E"),
		(r"\\\\\Q\\\E", r"\\\\"),
		(r"\\\\\\Q\\\\E", r"\\\Q\\E"),
		(r"\\\\Q\\\Q$\\\E\\Q\\E", r"\\Q\$\\\Q\E"),
	];
	let mut rng = StdRng::seed_from_u64(2);
	for (pattern, expected) in cases {
		let generator = Generator::new(pattern).unwrap();
		assert_eq!(generator.generate(&mut rng), expected, "pattern {pattern:?}");
		assert_eq!(generator.matched_strings_count(), Some(1));
	}
}

#[test]
fn too_short_patterns_yield_their_longest_match() {
	let cases = [
		("a{0,2}", 2),
		("HI|BRO", 3),
		("a{0,2}[A-Z]", 3),
		("[A-Z]a{0,2}[A-Z]", 4),
		("AT|CAT|DOG|FLY", 3),
	];
	let mut rng = StdRng::seed_from_u64(3);
	for (pattern, longest) in cases {
		let generator = Generator::new(pattern).unwrap();
		let regex = whole(pattern);
		for _ in 0..100 {
			let word = generator.generate_min(5, &mut rng);
			assert!(regex.is_match(&word), "{word:?} does not match {pattern:?}");
			assert_eq!(length(&word), longest);
		}
	}
}

#[test]
fn long_patterns_are_truncated_to_the_window() {
	let cases = [
		(r"\d{10}", r"[0-9]{5}"),
		("1234567890", "12345"),
		("HELLO_THERE|THERE_HELLO", "HELLO|THERE"),
		(r"\d{3,5}\s{3,5}", r"[0-9]{3}(?:[0-9]{2}|[0-9]\s|\s{2})"),
	];
	let mut rng = StdRng::seed_from_u64(4);
	for (pattern, prefix) in cases {
		let generator = Generator::new(pattern).unwrap();
		let regex = whole(prefix);
		for _ in 0..100 {
			let word = generator.generate_between(0, 5, &mut rng).unwrap();
			assert!(regex.is_match(&word), "{word:?} from {pattern:?} does not match {prefix:?}");
		}
	}
}

#[test]
fn feasible_windows_never_overflow() {
	let mut rng = StdRng::seed_from_u64(5);
	for pattern in ["a*b", "a{1,}b", "(ab)*c", "a*b*c"] {
		let generator = Generator::new(pattern).unwrap();
		let regex = whole(pattern);
		for _ in 0..100 {
			let word = generator.generate_between(0, 5, &mut rng).unwrap();
			assert!(regex.is_match(&word), "{word:?} does not match {pattern:?}");
			assert!(length(&word) <= 5);
		}
	}
}

#[test]
fn feasible_windows_are_covered() {
	let cases = [
		("[A-Z]{5,9}", 4, 8),
		("[0-3]([a-c]|[e-g]{1,2})", 1, 3),
		("([a-z0-9]+)[@]([a-z0-9]+)[.]([a-z0-9]+)", 8, 24),
		(r"(\d+)", 4, 8),
		(r"(\w+)", 4, 8),
		("(.*)", 4, 8),
	];
	let mut rng = StdRng::seed_from_u64(6);
	for (pattern, min, max) in cases {
		let generator = Generator::new(pattern).unwrap();
		let regex = whole(pattern);
		for _ in 0..100 {
			let word = generator.generate_between(min, max, &mut rng).unwrap();
			assert!(regex.is_match(&word), "{word:?} does not match {pattern:?}");
			assert!((min..=max).contains(&length(&word)), "{word:?} outside {min}..={max}");
		}
		let word = generator.generate_min(min, &mut rng);
		assert!(regex.is_match(&word));
		assert!(length(&word) >= min);
	}
}

#[test]
fn negated_classes_stay_ascii_consistent() {
	let mut rng = StdRng::seed_from_u64(7);
	let digits = Generator::new(r"(\D+)").unwrap();
	let words = Generator::new(r"(\W+)").unwrap();
	for _ in 0..100 {
		let word = digits.generate_between(4, 8, &mut rng).unwrap();
		assert!((4..=8).contains(&length(&word)));
		assert!(word.chars().all(|c| !c.is_ascii_digit()));

		let word = words.generate_between(4, 8, &mut rng).unwrap();
		assert!((4..=8).contains(&length(&word)));
		assert!(word.chars().all(|c| !c.is_ascii_alphanumeric() && c != '_'));
	}
}

#[test]
fn simple_patterns_are_uniform() {
	let cases = [
		(r"a|\d", 1, 1, 11),
		("a|c", 1, 1, 2),
		("a*", 0, 10, 11),
		("a+", 5, 10, 6),
		("[a-ce-gr-ux-z]", 1, 1, 13),
		("123a*", 1, 10, 8),
		("123a*", 5, 10, 6),
	];
	let mut rng = StdRng::seed_from_u64(8);
	for (pattern, min, max, expected) in cases {
		let generator = Generator::new(pattern).unwrap();
		let regex = whole(pattern);
		let mut seen: HashMap<String, u32> = HashMap::new();
		for _ in 0..100_000 {
			let word = generator.generate_between(min, max, &mut rng).unwrap();
			assert!(regex.is_match(&word), "{word:?} does not match {pattern:?}");
			*seen.entry(word).or_default() += 1;
		}
		assert_eq!(seen.len(), expected, "pattern {pattern:?}");
		let most = *seen.values().max().unwrap();
		let least = *seen.values().min().unwrap();
		let ratio = f64::from(most) / f64::from(least);
		assert!(ratio < 1.1, "pattern {pattern:?}: ratio {ratio}");
	}
}

#[test]
fn same_seed_same_string() {
	for pattern in ["[0-9][a-zA-Z]", "[A-Z]{1,10}"] {
		let first = Generator::new(pattern).unwrap();
		let second = Generator::new(pattern).unwrap();
		let a = first.generate(&mut StdRng::seed_from_u64(9));
		let b = second.generate(&mut StdRng::seed_from_u64(9));
		assert_eq!(a, b);
	}
}

#[test]
fn raised_cap_reaches_longer_strings() {
	let config = GeneratorConfig::default().with_cap_length(120).unwrap();
	let generator = Generator::with_config("x+", config).unwrap();
	let mut rng = StdRng::seed_from_u64(10);
	assert!(generator.generate_min(100, &mut rng).len() >= 100);
	let word = generator.generate_between(100, 120, &mut rng).unwrap();
	assert!((100..=120).contains(&word.len()));
}

#[test]
fn long_unbounded_strings_keep_their_weight() {
	let generator = Generator::new(r"\w*").unwrap();
	let mut rng = StdRng::seed_from_u64(12);
	let mut near_cap = 0;
	for _ in 0..2000 {
		let word = generator.generate(&mut rng);
		assert!(length(&word) <= 50);
		if length(&word) >= 49 {
			near_cap += 1;
		}
	}
	assert!(near_cap >= 1900, "only {near_cap} strings of 49 characters or more");
}

#[test]
fn long_fixed_strings_spread_their_first_character() {
	let generator = Generator::new(r"\w{30}").unwrap();
	let regex = whole(r"\w{30}");
	let mut rng = StdRng::seed_from_u64(13);
	let samples = 6300;
	let mut first: HashMap<&str, u32> = HashMap::new();
	let mut digit_runs = 0;
	for _ in 0..samples {
		let word = generator.generate(&mut rng);
		assert!(regex.is_match(&word));
		let head = word.chars().next().unwrap();
		let class = match head {
			'0'..='9' => "digit",
			'A'..='Z' => "upper",
			'_' => "underscore",
			_ => "lower",
		};
		*first.entry(class).or_default() += 1;
		if word.chars().take(8).all(|c| c.is_ascii_digit()) {
			digit_runs += 1;
		}
	}
	assert_eq!(first.len(), 4, "{first:?}");
	let digits = f64::from(first["digit"]) / f64::from(samples);
	assert!((0.12..0.20).contains(&digits), "digit share {digits}");
	assert!(digit_runs < samples / 20);
}

#[test]
fn finite_patterns_reach_past_the_cap() {
	let mut rng = StdRng::seed_from_u64(14);
	let generator = Generator::new(r"\d{60}").unwrap();
	let regex = whole(r"[0-9]{60}");
	for _ in 0..20 {
		assert!(regex.is_match(&generator.generate(&mut rng)));
	}

	let generator = Generator::new("a{0,60}").unwrap();
	assert_eq!(generator.generate_min(70, &mut rng), "a".repeat(60));
}

#[test]
fn oversized_length_tables_are_refused() {
	assert!(matches!(Generator::new("[a-z]{5000}"), Err(Error::LengthTableTooLarge { .. })));

	let config = GeneratorConfig::default().with_cap_length(1 << 16).unwrap();
	assert!(matches!(
		Generator::with_config("[a-z]{300}x*", config),
		Err(Error::LengthTableTooLarge { lengths: 65537, .. })
	));
	assert!(Generator::with_config("[a-z]x*", config).is_ok());
}

#[test]
fn invalid_requests_are_errors() {
	assert!(matches!(Generator::new("(unclosed"), Err(Error::PatternSyntax(_))));
	let generator = Generator::new("a").unwrap();
	let mut rng = StdRng::seed_from_u64(11);
	assert!(matches!(
		generator.generate_between(3, 1, &mut rng),
		Err(Error::InvalidWindow { min: 3, max: 1 })
	));
}

#[test]
fn generator_is_shared_between_threads() {
	let generator = Generator::new(r"[a-f]{4}-\d{2}").unwrap();
	let regex = whole(r"[a-f]{4}-[0-9]{2}");
	std::thread::scope(|scope| {
		for seed in 0..4 {
			let generator = &generator;
			let regex = &regex;
			scope.spawn(move || {
				let mut rng = StdRng::seed_from_u64(seed);
				for _ in 0..100 {
					assert!(regex.is_match(&generator.generate(&mut rng)));
				}
			});
		}
	});
}
