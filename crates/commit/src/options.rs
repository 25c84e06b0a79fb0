use serde::Deserialize;

use crate::error::OptionsError;

/// Tunables for a [`crate::TargetTree`]'s commits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CommitOptions {
	/// Maximum composite nesting before expansion is rejected.
	pub max_expansion_depth: usize,
	/// Number of conflicts sampled into the debug log.
	pub report_limit: usize,
}

impl Default for CommitOptions {
	fn default() -> Self {
		Self {
			max_expansion_depth: 64,
			report_limit: 5,
		}
	}
}

impl CommitOptions {
	/// Parses options from TOML; absent fields keep their defaults.
	pub fn from_toml_str(text: &str) -> Result<Self, OptionsError> {
		Ok(toml::from_str(text)?)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_toml_keeps_defaults() {
		let options = CommitOptions::from_toml_str("max_expansion_depth = 8\n").unwrap();
		assert_eq!(options.max_expansion_depth, 8);
		assert_eq!(options.report_limit, CommitOptions::default().report_limit);
	}

	#[test]
	fn unknown_fields_are_rejected() {
		assert!(matches!(
			CommitOptions::from_toml_str("depth = 8\n"),
			Err(OptionsError::Parse(_))
		));
	}
}
