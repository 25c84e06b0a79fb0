//! Key collision detection within one group on one target.

use indexmap::IndexMap;
use rustc_hash::FxBuildHasher;

use super::overrides::Candidate;
use crate::key::Key;

/// A key claimed by more than one effective candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Collision {
	pub(crate) key: Key,
	/// Instance indices in discovery order.
	pub(crate) instances: Vec<usize>,
}

/// Finds every key shared by two or more of `effective`.
///
/// Identifiers and discriminators share one namespace. Each key is indexed
/// once, so cost is linear in the total number of keys.
pub(crate) fn detect(effective: &[Candidate]) -> Vec<Collision> {
	let mut claims: IndexMap<&Key, Vec<usize>, FxBuildHasher> = IndexMap::default();
	for candidate in effective {
		for key in candidate.keys() {
			claims.entry(key).or_default().push(candidate.instance);
		}
	}

	claims
		.into_iter()
		.filter(|(_, instances)| instances.len() > 1)
		.map(|(key, instances)| Collision {
			key: key.clone(),
			instances,
		})
		.collect()
}
