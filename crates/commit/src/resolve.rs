//! Registry spec resolution across an ancestor chain.

use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashSet as HashSet;

use crate::directive::{Directive, RegistrySpec};

/// Merged registry specs, keyed by registry key in first-declaration order.
pub type RegistrySpecs = IndexMap<&'static str, RegistrySpec>;

/// Merges the registry specs visible from the last level of `levels`.
///
/// `levels` runs root first. Each level lists the directives declared there;
/// a directive's group owner contributes its registries at the same level so
/// that group hooks always find theirs. A more-derived level replaces an
/// ancestor's factory for the same key; within one level the first
/// declaration stays.
pub fn merge_specs<'a, L, D>(levels: L) -> RegistrySpecs
where
	L: IntoIterator<Item = D>,
	D: IntoIterator<Item = &'a Arc<Directive>>,
{
	let mut merged = RegistrySpecs::new();
	for level in levels {
		let mut seen: HashSet<&'static str> = HashSet::default();
		for directive in level {
			let mut current = Some(directive);
			while let Some(d) = current {
				for spec in d.registries() {
					merge_one(&mut merged, &mut seen, d.name(), spec);
				}
				current = d.group_owner();
			}
		}
	}
	merged
}

fn merge_one(
	merged: &mut RegistrySpecs,
	seen: &mut HashSet<&'static str>,
	directive: &'static str,
	spec: &RegistrySpec,
) {
	if seen.insert(spec.key()) {
		merged.insert(spec.key(), spec.clone());
		return;
	}
	if let Some(existing) = merged.get(spec.key())
		&& !existing.same_factory(spec)
	{
		tracing::warn!(
			key = spec.key(),
			directive,
			kept = existing.type_name(),
			ignored = spec.type_name(),
			"registry declared twice on one level; keeping the first factory"
		);
	}
}
