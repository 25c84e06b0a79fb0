//! Group indirection table and dependency ordering.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxBuildHasher, FxHashMap as HashMap};

use crate::directive::Directive;
use crate::error::{CommitError, CycleError};

/// Canonical group keys for every directive seen in one commit.
///
/// Groups are kept in discovery order, which is the tie-break for ordering.
pub(crate) struct GroupTable {
	directives: HashMap<&'static str, Arc<Directive>>,
	/// Group key → group keys it depends on.
	groups: IndexMap<&'static str, Vec<&'static str>, FxBuildHasher>,
}

impl GroupTable {
	pub(crate) fn new() -> Self {
		Self {
			directives: HashMap::default(),
			groups: IndexMap::default(),
		}
	}

	/// Records `directive`, its group owner chain, and its dependencies.
	pub(crate) fn learn(&mut self, directive: &Arc<Directive>) -> Result<(), CommitError> {
		if let Some(known) = self.directives.get(directive.name()) {
			if Arc::ptr_eq(known, directive) {
				return Ok(());
			}
			return Err(CommitError::DirectiveNameClash {
				name: directive.name(),
			});
		}
		self.directives
			.insert(directive.name(), Arc::clone(directive));

		let group = directive.group_key();
		self.groups.entry(group).or_default();
		if let Some(owner) = directive.group_owner() {
			self.learn(owner)?;
		}
		for dependency in directive.depends() {
			let target = dependency.group_key();
			let edges = self.groups.entry(group).or_default();
			if !edges.contains(&target) {
				edges.push(target);
			}
			self.learn(dependency)?;
		}
		Ok(())
	}

	/// The directive that owns `group`'s hooks.
	pub(crate) fn owner(&self, group: &str) -> Option<&Arc<Directive>> {
		self.directives.get(group)
	}

	pub(crate) fn len(&self) -> usize {
		self.groups.len()
	}

	/// Orders groups so each follows every group it depends on.
	///
	/// Among groups with no path between them, the earlier-discovered one
	/// comes first.
	pub(crate) fn order(&self) -> Result<Vec<&'static str>, CycleError> {
		let n = self.groups.len();
		let mut pending = vec![0usize; n];
		let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];

		for (idx, (_, deps)) in self.groups.iter().enumerate() {
			for dep in deps {
				if let Some(dep_idx) = self.groups.get_index_of(dep) {
					pending[idx] += 1;
					dependents[dep_idx].push(idx);
				}
			}
		}

		let mut ready: BinaryHeap<Reverse<usize>> = pending
			.iter()
			.enumerate()
			.filter(|&(_, &count)| count == 0)
			.map(|(idx, _)| Reverse(idx))
			.collect();

		let mut order = Vec::with_capacity(n);
		while let Some(Reverse(idx)) = ready.pop() {
			order.push(idx);
			for &next in &dependents[idx] {
				pending[next] -= 1;
				if pending[next] == 0 {
					ready.push(Reverse(next));
				}
			}
		}

		if order.len() < n {
			let groups = pending
				.iter()
				.enumerate()
				.filter(|&(_, &count)| count > 0)
				.filter_map(|(idx, _)| self.groups.get_index(idx).map(|(k, _)| *k))
				.collect();
			return Err(CycleError { groups });
		}

		Ok(order
			.into_iter()
			.filter_map(|idx| self.groups.get_index(idx).map(|(k, _)| *k))
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn table(directives: &[&Arc<Directive>]) -> GroupTable {
		let mut table = GroupTable::new();
		for d in directives {
			table.learn(d).unwrap();
		}
		table
	}

	#[test]
	fn dependencies_come_first() {
		let foo = Directive::action("foo").build();
		let bar = Directive::action("bar").depends_on(&foo).build();
		let baz = Directive::action("baz").build();

		assert_eq!(table(&[&bar, &baz, &foo]).order().unwrap(), vec!["foo", "bar", "baz"]);
	}

	#[test]
	fn unrelated_groups_keep_discovery_order() {
		let a = Directive::action("a").build();
		let b = Directive::action("b").build();
		let c = Directive::action("c").build();

		assert_eq!(table(&[&c, &a, &b]).order().unwrap(), vec!["c", "a", "b"]);
	}

	#[test]
	fn group_members_share_a_node() {
		let foo = Directive::action("foo").build();
		let bar = Directive::action("bar").group(&foo).build();
		let t = table(&[&bar]);

		assert_eq!(t.len(), 1);
		assert_eq!(t.order().unwrap(), vec!["foo"]);
		assert!(t.owner("foo").is_some_and(|o| Arc::ptr_eq(o, &foo)));
	}

	#[test]
	fn cycle_is_reported() {
		let foo = Directive::action("foo").build();
		let bar = Directive::action("bar").depends_on(&foo).build();
		// foo's group now depends on bar, which depends on foo.
		let looped = Directive::action("looped").group(&foo).depends_on(&bar).build();

		let err = table(&[&bar, &looped]).order().unwrap_err();
		assert_eq!(err.groups, vec!["bar", "foo"]);
	}

	#[test]
	fn name_clash_is_rejected() {
		let a = Directive::action("same").build();
		let b = Directive::action("same").build();
		let mut t = GroupTable::new();
		t.learn(&a).unwrap();
		t.learn(&a).unwrap();
		assert!(matches!(
			t.learn(&b),
			Err(CommitError::DirectiveNameClash { name: "same" })
		));
	}
}
