use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default upper bound on generated string length.
pub const DEFAULT_CAP_LENGTH: usize = 50;

/// Largest accepted cap.
///
/// For patterns with unbounded repetition the length table holds
/// `states × (cap + 1)` weights, so the cap is the main memory knob of a
/// generator.
pub const MAX_CAP_LENGTH: usize = 1 << 16;

/// Generation parameters fixed when a [`Generator`](super::generator::Generator) is built.
///
/// # Responsibilities
/// - Hold the cap on generated string length (`cap_length`)
/// - Reject out-of-range values on every path in, setters and
///   deserialization alike
///
/// # Invariants
/// - `1 <= cap_length <= MAX_CAP_LENGTH`
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(try_from = "RawGeneratorConfig")]
pub struct GeneratorConfig {
	cap_length: usize,
}

impl Default for GeneratorConfig {
	fn default() -> Self {
		Self { cap_length: DEFAULT_CAP_LENGTH }
	}
}

impl GeneratorConfig {
	/// Returns the cap on generated string length.
	pub fn cap_length(&self) -> usize {
		self.cap_length
	}

	/// Sets the cap on generated string length.
	///
	/// The cap bounds generation windows of patterns with unbounded
	/// repetition. Finite patterns always reach their longest match.
	///
	/// # Errors
	/// Returns [`Error::InvalidConfig`] if `cap_length` is `0` or above
	/// [`MAX_CAP_LENGTH`].
	pub fn set_cap_length(&mut self, cap_length: usize) -> Result<()> {
		if cap_length == 0 {
			return Err(Error::InvalidConfig("cap length must be at least 1".to_owned()));
		}
		if cap_length > MAX_CAP_LENGTH {
			return Err(Error::InvalidConfig(format!(
				"cap length must be at most {MAX_CAP_LENGTH}, got {cap_length}"
			)));
		}
		self.cap_length = cap_length;
		Ok(())
	}

	/// Builder-style form of [`GeneratorConfig::set_cap_length`].
	pub fn with_cap_length(mut self, cap_length: usize) -> Result<Self> {
		self.set_cap_length(cap_length)?;
		Ok(self)
	}
}

/// Unvalidated wire form of [`GeneratorConfig`].
#[derive(Deserialize)]
struct RawGeneratorConfig {
	cap_length: usize,
}

impl TryFrom<RawGeneratorConfig> for GeneratorConfig {
	type Error = Error;

	fn try_from(raw: RawGeneratorConfig) -> Result<Self> {
		GeneratorConfig::default().with_cap_length(raw.cap_length)
	}
}
