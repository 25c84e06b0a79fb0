//! Override resolution along one target's ancestor chain.

use rustc_hash::FxHashMap as HashMap;

use crate::key::Key;

/// Keys an action claims within its group on one target.
#[derive(Debug, Clone)]
pub(crate) struct Candidate {
	/// Index into the commit's instance list.
	pub(crate) instance: usize,
	pub(crate) ordinal: usize,
	/// Inheritance depth of the level the action was declared on.
	pub(crate) depth: u32,
	pub(crate) identifier: Key,
	pub(crate) discriminators: Vec<Key>,
}

impl Candidate {
	/// Identifier followed by discriminators, without repeats.
	pub(crate) fn keys(&self) -> impl Iterator<Item = &Key> {
		std::iter::once(&self.identifier).chain(
			self.discriminators
				.iter()
				.enumerate()
				.filter(|&(i, k)| *k != self.identifier && !self.discriminators[..i].contains(k))
				.map(|(_, k)| k),
		)
	}
}

#[derive(Debug)]
pub(crate) struct Resolved {
	/// Effective candidates in discovery order.
	pub(crate) effective: Vec<Candidate>,
	/// `(winner, loser)` instance pairs dropped by an override.
	pub(crate) overridden: Vec<(usize, usize)>,
}

/// Folds candidates by identifier, most-derived level last.
///
/// A candidate declared deeper than every other holder of its identifier
/// replaces them; candidates on the same level are all kept so the conflict
/// detector sees them.
pub(crate) fn resolve(mut candidates: Vec<Candidate>) -> Resolved {
	candidates.sort_by_key(|c| (c.depth, c.ordinal));

	let mut holders: HashMap<&Key, (u32, Vec<usize>)> = HashMap::default();
	let mut overridden = Vec::new();
	for (pos, candidate) in candidates.iter().enumerate() {
		match holders.get_mut(&candidate.identifier) {
			Some((depth, positions)) if *depth < candidate.depth => {
				for loser in positions.drain(..) {
					overridden.push((candidate.instance, candidates[loser].instance));
				}
				*depth = candidate.depth;
				positions.push(pos);
			}
			Some((_, positions)) => positions.push(pos),
			None => {
				holders.insert(&candidate.identifier, (candidate.depth, vec![pos]));
			}
		}
	}

	let mut keep: Vec<usize> = holders
		.into_values()
		.flat_map(|(_, positions)| positions)
		.collect();
	keep.sort_unstable();
	let mut slots: Vec<Option<Candidate>> = candidates.into_iter().map(Some).collect();
	let mut effective: Vec<Candidate> = keep
		.into_iter()
		.filter_map(|pos| slots[pos].take())
		.collect();
	effective.sort_by_key(|c| c.ordinal);

	Resolved {
		effective,
		overridden,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn candidate(instance: usize, depth: u32, id: &str, discs: &[&str]) -> Candidate {
		Candidate {
			instance,
			ordinal: instance,
			depth,
			identifier: Key::from(id),
			discriminators: discs.iter().map(|d| Key::from(*d)).collect(),
		}
	}

	#[test]
	fn derived_level_wins() {
		let resolved = resolve(vec![candidate(0, 0, "hello", &[]), candidate(1, 1, "hello", &[])]);
		assert_eq!(
			resolved.effective.iter().map(|c| c.instance).collect::<Vec<_>>(),
			vec![1]
		);
		assert_eq!(resolved.overridden, vec![(1, 0)]);
	}

	#[test]
	fn same_level_is_kept_for_conflict_detection() {
		let resolved = resolve(vec![candidate(0, 1, "x", &[]), candidate(1, 1, "x", &[])]);
		assert_eq!(resolved.effective.len(), 2);
		assert!(resolved.overridden.is_empty());
	}

	#[test]
	fn override_drops_every_same_level_holder() {
		let resolved = resolve(vec![
			candidate(0, 0, "x", &[]),
			candidate(1, 0, "x", &[]),
			candidate(2, 0, "y", &[]),
			candidate(3, 2, "x", &[]),
		]);
		assert_eq!(
			resolved.effective.iter().map(|c| c.instance).collect::<Vec<_>>(),
			vec![2, 3]
		);
		assert_eq!(resolved.overridden, vec![(3, 0), (3, 1)]);
	}

	#[test]
	fn keys_skip_repeats() {
		let c = candidate(0, 0, "a", &["b", "a", "b", "c"]);
		let keys: Vec<_> = c.keys().filter_map(Key::as_str).collect();
		assert_eq!(keys, vec!["a", "b", "c"]);
	}
}
