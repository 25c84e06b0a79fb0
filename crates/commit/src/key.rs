//! Identity keys for actions.
//!
//! Identifiers and discriminators share one namespace per group, so both are
//! expressed as [`Key`].

use std::fmt;
use std::sync::Arc;

/// A comparable, hashable identity value.
///
/// Keys are produced by [`crate::Action::identifier`] and
/// [`crate::Action::discriminators`]. Two actions in one group whose key sets
/// intersect collide unless one overrides the other.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
	Str(Arc<str>),
	Int(i64),
	Bool(bool),
	Tuple(Arc<[Key]>),
}

impl Key {
	/// Builds a tuple key from its parts.
	pub fn tuple<I, K>(parts: I) -> Self
	where
		I: IntoIterator<Item = K>,
		K: Into<Key>,
	{
		Self::Tuple(parts.into_iter().map(Into::into).collect())
	}

	/// Returns the string payload if this is a string key.
	pub fn as_str(&self) -> Option<&str> {
		match self {
			Self::Str(s) => Some(s),
			_ => None,
		}
	}
}

impl fmt::Display for Key {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Str(s) => write!(f, "{s:?}"),
			Self::Int(n) => write!(f, "{n}"),
			Self::Bool(b) => write!(f, "{b}"),
			Self::Tuple(parts) => {
				f.write_str("(")?;
				for (i, part) in parts.iter().enumerate() {
					if i > 0 {
						f.write_str(", ")?;
					}
					write!(f, "{part}")?;
				}
				f.write_str(")")
			}
		}
	}
}

impl From<&str> for Key {
	fn from(value: &str) -> Self {
		Self::Str(Arc::from(value))
	}
}

impl From<String> for Key {
	fn from(value: String) -> Self {
		Self::Str(Arc::from(value))
	}
}

impl From<Arc<str>> for Key {
	fn from(value: Arc<str>) -> Self {
		Self::Str(value)
	}
}

impl From<i64> for Key {
	fn from(value: i64) -> Self {
		Self::Int(value)
	}
}

impl From<i32> for Key {
	fn from(value: i32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<u32> for Key {
	fn from(value: u32) -> Self {
		Self::Int(i64::from(value))
	}
}

impl From<bool> for Key {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl<A: Into<Key>, B: Into<Key>> From<(A, B)> for Key {
	fn from((a, b): (A, B)) -> Self {
		Self::Tuple(Arc::from([a.into(), b.into()]))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn string_sources_agree() {
		assert_eq!(Key::from("f"), Key::from(String::from("f")));
		assert_eq!(Key::from("f").as_str(), Some("f"));
		assert_eq!(Key::from(3).as_str(), None);
	}

	#[test]
	fn tuple_display() {
		let key = Key::from(("model", 7));
		assert_eq!(key.to_string(), "(\"model\", 7)");
		assert_eq!(key, Key::tuple([Key::from("model"), Key::from(7)]));
	}
}
