use rand::SeedableRng;
use rand::rngs::StdRng;
use regex_gen_core::{Acceptor, Generator, GeneratorConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG=debug shows compilation and fallback decisions
    env_logger::init();

    // Fixed seed so that two runs print the same strings
    let mut rng = StdRng::seed_from_u64(2024);

    // Compile a pattern; `\Q...\E` quotes its content literally
    let email = Generator::new(r"[a-z]{3,8}_\d{3}\Q@gru.evil\E")?;
    for i in 0..5 {
        println!("Generated address {}: {}", i + 1, email.generate(&mut rng));
    }

    // Length windows are inclusive; unbounded patterns stop at the cap (50 by default)
    let words = Generator::new("[a-z]+")?;
    println!("Between 2 and 4: {}", words.generate_between(2, 4, &mut rng)?);
    println!("At least 10: {}", words.generate_min(10, &mut rng));

    // Raise the cap to reach longer strings
    let config = GeneratorConfig::default().with_cap_length(200)?;
    let long_words = Generator::with_config("[a-z]+", config)?;
    println!("At least 120: {} chars", long_words.generate_min(120, &mut rng).len());

    // An invalid cap is rejected
    match GeneratorConfig::default().with_cap_length(0) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{}", e),
    }

    // Infeasible windows never fail: they fall back to the closest strings
    let short = Generator::new("a{0,2}")?;
    println!("a{{0,2}} with min 5: {:?}", short.generate_min(5, &mut rng));
    let digits = Generator::new(r"\d{10}")?;
    println!("\\d{{10}} with max 5: {:?}", digits.generate_between(0, 5, &mut rng)?);

    // Finite patterns are not capped
    let serial = Generator::new(r"\d{60}")?;
    println!("Serial: {}", serial.generate(&mut rng));

    // A length table that would not fit in memory is refused up front
    match Generator::new("[a-z]{10000}") {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{}", e),
    }

    // An inverted window is an error
    match words.generate_between(5, 2, &mut rng) {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{}", e),
    }

    // Enumeration in depth-first order
    let small = Generator::new("(ab|cd)[0-2]?")?;
    println!("Count: {:?}", small.matched_strings_count());
    println!("First: {:?}", small.first_match());
    println!("Third: {:?}", small.nth_match(2));
    let all: Vec<String> = small.matches().collect();
    println!("All: {:?}", all);

    // Infinite languages are enumerated up to the cap
    println!("Infinite: {}", words.is_infinite());
    let first: Vec<String> = words.matches().take(3).collect();
    println!("First three: {:?}", first);

    // Compile once, snapshot, and rebuild a generator from bytes
    let bytes = Acceptor::build(r"v\d\.\d{1,2}")?.to_bytes()?;
    let restored = Generator::from_acceptor(Acceptor::from_bytes(&bytes)?, GeneratorConfig::default())?;
    println!("Restored ({} bytes): {}", bytes.len(), restored.generate(&mut rng));

    // Invalid patterns are reported
    match Generator::new("(unclosed") {
        Ok(_) => println!("Should not happen"),
        Err(e) => println!("{}", e),
    }

    Ok(())
}
