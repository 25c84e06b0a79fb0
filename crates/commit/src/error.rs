use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::directive::DirectiveKind;
use crate::key::Key;
use crate::object::Object;
use crate::target::TargetId;

/// Failed access to a registry through a [`crate::Registries`] view.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
	/// The directive does not declare this registry key.
	#[error("registry {key:?} is not touched by this directive")]
	NotTouched { key: &'static str },
	/// The key is declared but no registry was built for it.
	#[error("registry {key:?} is missing from the config")]
	Missing { key: &'static str },
	/// The registry exists but holds a different type.
	#[error("registry {key:?} is not a {expected}")]
	TypeMismatch {
		key: &'static str,
		expected: &'static str,
	},
}

/// Failure raised by an action's `perform` or a group hook.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
	#[error(transparent)]
	Registry(#[from] RegistryError),
	#[error("{0}")]
	Failed(String),
}

impl ActionError {
	pub fn failed(message: impl Into<String>) -> Self {
		Self::Failed(message.into())
	}
}

/// One participant in a conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictParty {
	/// Target the action was declared on.
	pub target: TargetId,
	pub target_name: Arc<str>,
	pub directive: &'static str,
	pub object: Object,
}

/// A key claimed by more than one effective action of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
	pub group: &'static str,
	pub key: Key,
	pub parties: Vec<ConflictParty>,
}

impl fmt::Display for Conflict {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "group {} key {}:", self.group, self.key)?;
		for party in &self.parties {
			write!(
				f,
				" [{} on {} for {}]",
				party.directive, party.target_name, party.object
			)?;
		}
		Ok(())
	}
}

/// Every collision found during a commit.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{}", render(.conflicts))]
pub struct ConflictError {
	pub conflicts: Vec<Conflict>,
}

impl ConflictError {
	/// Returns true if some conflict involves `key`.
	pub fn involves(&self, key: &Key) -> bool {
		self.conflicts.iter().any(|c| &c.key == key)
	}
}

/// One header line, then one indented line per conflict.
fn render(conflicts: &[Conflict]) -> String {
	let mut out = format!("{} conflict(s)", conflicts.len());
	for conflict in conflicts {
		out.push_str("\n  ");
		out.push_str(&conflict.to_string());
	}
	out
}

/// The group dependency graph is not acyclic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("dependency cycle between groups: {}", .groups.join(", "))]
pub struct CycleError {
	/// Groups that could not be ordered, in discovery order.
	pub groups: Vec<&'static str>,
}

/// Composite expansion did not produce a well-formed action list.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpansionError {
	#[error("composite {directive} exceeded expansion depth {limit}")]
	TooDeep {
		directive: &'static str,
		limit: usize,
	},
	#[error("request for {directive} carries a constructor that is not a {expected}")]
	KindMismatch {
		directive: &'static str,
		expected: DirectiveKind,
	},
}

/// Failed to load [`crate::CommitOptions`].
#[derive(Debug, Error)]
pub enum OptionsError {
	#[error("failed to parse commit options: {0}")]
	Parse(#[from] toml::de::Error),
}

/// Reasons a commit aborts. No target config is replaced when any of these is returned.
#[derive(Debug, Error)]
pub enum CommitError {
	#[error(transparent)]
	Conflict(#[from] ConflictError),
	#[error(transparent)]
	Cycle(#[from] CycleError),
	#[error(transparent)]
	Expansion(#[from] ExpansionError),
	#[error("unknown target {0}")]
	UnknownTarget(TargetId),
	#[error("two different directives are named {name}")]
	DirectiveNameClash { name: &'static str },
	#[error("{directive} failed on {target}: {source}")]
	Perform {
		target: TargetId,
		directive: &'static str,
		#[source]
		source: ActionError,
	},
	#[error("{hook} hook of group {group} failed on {target}: {source}")]
	Hook {
		target: TargetId,
		group: &'static str,
		hook: &'static str,
		#[source]
		source: ActionError,
	},
}

impl CommitError {
	/// Returns the conflict report if this is a conflict.
	pub fn as_conflict(&self) -> Option<&ConflictError> {
		match self {
			Self::Conflict(c) => Some(c),
			_ => None,
		}
	}
}
