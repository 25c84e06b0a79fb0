//! The commit driver.
//!
//! # Mental Model
//!
//! 1. **Realize:** requests not yet realized on the closure of the requested
//!    targets and their ancestors are expanded in place and instantiated.
//!    The resulting actions are cached on their target, so no constructor
//!    runs twice and later commits see the same declarations.
//! 2. **Order:** every directive seen is folded into a `GroupTable`; groups
//!    are ordered by dependency, ties broken by discovery order.
//! 3. **Plan:** for each target, root first, fresh registries are built, keys
//!    are computed, overrides along the ancestor chain are applied, and
//!    collisions are collected. Any collision aborts before anything performs.
//! 4. **Replay:** each plan runs group hooks and `perform` in group order.
//! 5. **Publish:** only when every target replayed cleanly are the new
//!    configs stored on the tree.
//!
//! Every commit rebuilds its targets from all their declarations, so
//! committing one branch of the tree never disturbs another.

mod conflict;
mod expand;
mod group;
mod overrides;


use std::collections::BTreeSet;
use std::mem;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::{FxHashMap as HashMap, FxHashSet as HashSet};

use self::conflict::Collision;
pub(crate) use self::expand::Instance;
use self::group::GroupTable;
use self::overrides::Candidate;
use crate::config::Config;
use crate::directive::Directive;
use crate::error::{CommitError, Conflict, ConflictError, ConflictParty};
use crate::key::Key;
use crate::resolve::merge_specs;
use crate::target::{TargetId, TargetTree};

/// Result of a successful commit.
#[derive(Debug)]
pub struct CommitOutcome {
	configs: IndexMap<TargetId, Arc<Config>>,
	instantiated: usize,
	overrides: usize,
}

impl CommitOutcome {
	/// Config published for `target` by this commit.
	pub fn config(&self, target: TargetId) -> Option<&Arc<Config>> {
		self.configs.get(&target)
	}

	/// Every committed target, root first.
	pub fn configs(&self) -> impl Iterator<Item = (TargetId, &Arc<Config>)> + '_ {
		self.configs.iter().map(|(id, config)| (*id, config))
	}

	/// Number of actions instantiated by this commit. Actions cached by an
	/// earlier commit are reused and not counted.
	pub fn instantiated(&self) -> usize {
		self.instantiated
	}

	/// Number of actions dropped by an override, summed over targets.
	pub fn overrides(&self) -> usize {
		self.overrides
	}
}

struct GroupStep {
	group: &'static str,
	actions: Vec<usize>,
}

struct TargetPlan {
	target: TargetId,
	config: Config,
	steps: Vec<GroupStep>,
}

impl TargetTree {
	/// Resolves every declaration reachable from `targets` into fresh configs.
	///
	/// `targets` and all their ancestors are committed together. Either every
	/// one of them gets a new config or none does.
	pub fn commit(&mut self, targets: &[TargetId]) -> Result<CommitOutcome, CommitError> {
		let closure = self.closure(targets)?;
		tracing::debug!(requested = targets.len(), targets = closure.len(), "commit started");

		let instantiated = self.realize_pending(&closure)?;
		let (built, overrides) = self.build(&closure)?;

		let mut configs = IndexMap::with_capacity(built.len());
		for (target, config) in built {
			let config = Arc::new(config);
			self.nodes[target.index()].config = Some(Arc::clone(&config));
			configs.insert(target, config);
		}

		tracing::debug!(targets = configs.len(), instantiated, overrides, "commit finished");
		Ok(CommitOutcome {
			configs,
			instantiated,
			overrides,
		})
	}

	/// Instantiates requests still pending on `closure`, caching the actions on
	/// their targets. Returns how many actions were instantiated.
	///
	/// A request that fails to expand is dropped; requests declared after it
	/// stay pending.
	fn realize_pending(&mut self, closure: &[TargetId]) -> Result<usize, CommitError> {
		let limit = self.options.max_expansion_depth;
		let mut count = 0;
		for &id in closure {
			let node = &mut self.nodes[id.index()];
			let mut requests = mem::take(&mut node.pending).into_iter();
			while let Some(request) = requests.next() {
				let mut realized = Vec::new();
				if let Err(err) = expand::realize(id, request, limit, &mut realized) {
					node.pending.extend(requests);
					return Err(err.into());
				}
				count += realized.len();
				node.realized.append(&mut realized);
			}
		}
		Ok(count)
	}

	/// Plans and replays every target of `closure` without publishing.
	fn build(&self, closure: &[TargetId]) -> Result<(Vec<(TargetId, Config)>, usize), CommitError> {
		let instances: Vec<&Instance> = closure
			.iter()
			.flat_map(|id| &self.nodes[id.index()].realized)
			.collect();

		let mut table = GroupTable::new();
		for instance in &instances {
			table.learn(&instance.directive)?;
		}
		for &id in closure {
			for directive in &self.nodes[id.index()].directives {
				table.learn(directive)?;
			}
		}
		let order = table.order()?;
		tracing::debug!(groups = table.len(), actions = instances.len(), "groups ordered");

		let mut by_group: HashMap<&'static str, Vec<usize>> = HashMap::default();
		let mut by_level: HashMap<TargetId, Vec<usize>> = HashMap::default();
		for (idx, instance) in instances.iter().enumerate() {
			by_group
				.entry(instance.directive.group_key())
				.or_default()
				.push(idx);
			by_level.entry(instance.level).or_default().push(idx);
		}

		let mut plans = Vec::with_capacity(closure.len());
		let mut conflicts = Vec::new();
		let mut reported: HashSet<(&'static str, Key, Vec<usize>)> = HashSet::default();
		let mut dropped = 0;

		for &target in closure {
			let mut chain = self.ancestors(target)?;
			chain.reverse();
			let depth_of: HashMap<TargetId, u32> = chain
				.iter()
				.map(|&id| (id, self.nodes[id.index()].depth))
				.collect();

			let levels: Vec<Vec<&Arc<Directive>>> = chain
				.iter()
				.map(|id| {
					let declared = by_level.get(id).map(Vec::as_slice).unwrap_or_default();
					self.nodes[id.index()]
						.directives
						.iter()
						.chain(declared.iter().map(|&idx| &instances[idx].directive))
						.collect()
				})
				.collect();
			let present: HashSet<&'static str> = chain
				.iter()
				.flat_map(|id| &self.nodes[id.index()].directives)
				.map(|d| d.group_key())
				.collect();

			let mut config = Config::from_specs(merge_specs(levels).values());
			let mut steps = Vec::new();

			for &group in &order {
				let mut candidates = Vec::new();
				for &idx in by_group.get(group).map(Vec::as_slice).unwrap_or_default() {
					let instance = instances[idx];
					let Some(&depth) = depth_of.get(&instance.level) else {
						continue;
					};
					let view = config.view(instance.directive.registries());
					candidates.push(Candidate {
						instance: idx,
						ordinal: idx,
						depth,
						identifier: instance.action.identifier(&view),
						discriminators: instance.action.discriminators(&view),
					});
				}

				let resolved = overrides::resolve(candidates);
				for &(winner, loser) in &resolved.overridden {
					tracing::debug!(
						target_id = %target,
						group,
						winner_level = %instances[winner].level,
						loser_level = %instances[loser].level,
						object = %instances[loser].object,
						"action overridden"
					);
				}
				dropped += resolved.overridden.len();

				for collision in conflict::detect(&resolved.effective) {
					let fingerprint = (group, collision.key.clone(), collision.instances.clone());
					if reported.insert(fingerprint) {
						conflicts.push(self.describe(group, collision, &instances));
					}
				}

				let actions: Vec<usize> = resolved.effective.iter().map(|c| c.instance).collect();
				if !actions.is_empty() || present.contains(group) {
					steps.push(GroupStep { group, actions });
				}
			}

			plans.push(TargetPlan {
				target,
				config,
				steps,
			});
		}

		if !conflicts.is_empty() {
			let samples: Vec<_> = conflicts.iter().take(self.options.report_limit).collect();
			tracing::debug!(count = conflicts.len(), ?samples, "commit conflicts detected");
			return Err(ConflictError { conflicts }.into());
		}

		for plan in &mut plans {
			replay(plan, &table, &instances)?;
		}
		let built = plans
			.into_iter()
			.map(|plan| (plan.target, plan.config))
			.collect();
		Ok((built, dropped))
	}

	/// `targets` plus all their ancestors, root first.
	fn closure(&self, targets: &[TargetId]) -> Result<Vec<TargetId>, CommitError> {
		let mut ids = BTreeSet::new();
		for &target in targets {
			ids.extend(self.ancestors(target)?);
		}
		Ok(ids.into_iter().collect())
	}

	fn describe(
		&self,
		group: &'static str,
		collision: Collision,
		instances: &[&Instance],
	) -> Conflict {
		let parties = collision
			.instances
			.iter()
			.map(|&idx| {
				let instance = &instances[idx];
				ConflictParty {
					target: instance.level,
					target_name: Arc::clone(&self.nodes[instance.level.index()].name),
					directive: instance.directive.name(),
					object: instance.object.clone(),
				}
			})
			.collect();
		Conflict {
			group,
			key: collision.key,
			parties,
		}
	}
}

/// Runs one target's hooks and actions into its fresh registries.
fn replay(
	plan: &mut TargetPlan,
	table: &GroupTable,
	instances: &[&Instance],
) -> Result<(), CommitError> {
	for step in &plan.steps {
		let owner = table.owner(step.group);

		if let Some(owner) = owner
			&& let Some(hook) = owner.before()
		{
			hook(&mut plan.config.view(owner.registries())).map_err(|source| CommitError::Hook {
				target: plan.target,
				group: step.group,
				hook: "before",
				source,
			})?;
		}

		for &idx in &step.actions {
			let instance = &instances[idx];
			let mut view = plan.config.view(instance.directive.registries());
			instance
				.action
				.perform(&instance.object, &mut view)
				.map_err(|source| CommitError::Perform {
					target: plan.target,
					directive: instance.directive.name(),
					source,
				})?;
		}

		if let Some(owner) = owner
			&& let Some(hook) = owner.after()
		{
			hook(&mut plan.config.view(owner.registries())).map_err(|source| CommitError::Hook {
				target: plan.target,
				group: step.group,
				hook: "after",
				source,
			})?;
		}
	}
	Ok(())
}
