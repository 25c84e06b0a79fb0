//! The single-inheritance tree of configuration targets.

use std::fmt;
use std::sync::Arc;

use crate::action::Request;
use crate::commit::Instance;
use crate::config::Config;
use crate::directive::Directive;
use crate::error::CommitError;
use crate::object::Object;
use crate::options::CommitOptions;
use crate::resolve::{RegistrySpecs, merge_specs};

/// Dense handle to a target in a [`TargetTree`].
///
/// A parent is always allocated before its children, so ids order every
/// ancestor before its descendants. A tree holds at most `u32::MAX` targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TargetId(u32);

impl TargetId {
	pub fn as_u32(self) -> u32 {
		self.0
	}

	pub(crate) fn index(self) -> usize {
		self.0 as usize
	}
}

impl fmt::Display for TargetId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "target#{}", self.0)
	}
}

pub(crate) struct TargetNode {
	pub(crate) name: Arc<str>,
	pub(crate) parent: Option<TargetId>,
	pub(crate) depth: u32,
	pub(crate) directives: Vec<Arc<Directive>>,
	/// Declarations not yet instantiated.
	pub(crate) pending: Vec<Request>,
	/// Actions instantiated by an earlier commit, in declaration order.
	pub(crate) realized: Vec<Instance>,
	pub(crate) config: Option<Arc<Config>>,
}

/// Arena of targets, their declarations, and their committed configs.
///
/// A tree is not internally synchronized; hosts sharing one across threads
/// must serialize commits themselves.
#[derive(Default)]
pub struct TargetTree {
	pub(crate) nodes: Vec<TargetNode>,
	pub(crate) options: CommitOptions,
}

impl TargetTree {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_options(options: CommitOptions) -> Self {
		Self {
			nodes: Vec::new(),
			options,
		}
	}

	pub fn options(&self) -> &CommitOptions {
		&self.options
	}

	/// Adds a target without a parent.
	///
	/// # Panics
	///
	/// Panics if the tree already holds `u32::MAX` targets.
	pub fn add_root(&mut self, name: impl Into<Arc<str>>) -> TargetId {
		self.push(name.into(), None, 0)
	}

	/// Adds a target inheriting from `parent`.
	pub fn add_child(
		&mut self,
		parent: TargetId,
		name: impl Into<Arc<str>>,
	) -> Result<TargetId, CommitError> {
		let depth = self.node(parent)?.depth + 1;
		Ok(self.push(name.into(), Some(parent), depth))
	}

	fn push(&mut self, name: Arc<str>, parent: Option<TargetId>, depth: u32) -> TargetId {
		let Ok(raw) = u32::try_from(self.nodes.len()) else {
			panic!("target tree is full at {} targets", self.nodes.len());
		};
		let id = TargetId(raw);
		self.nodes.push(TargetNode {
			name,
			parent,
			depth,
			directives: Vec::new(),
			pending: Vec::new(),
			realized: Vec::new(),
			config: None,
		});
		id
	}

	/// Makes `directive` part of `target`'s configuration spec.
	///
	/// Its registries exist on `target` and every descendant, and its group
	/// hooks run there, whether or not any request of it is declared.
	pub fn register(
		&mut self,
		target: TargetId,
		directive: &Arc<Directive>,
	) -> Result<(), CommitError> {
		let node = self.node_mut(target)?;
		if !node.directives.iter().any(|d| Arc::ptr_eq(d, directive)) {
			node.directives.push(Arc::clone(directive));
		}
		Ok(())
	}

	/// Records a pending request on `target`. Nothing is instantiated.
	///
	/// The declaration stays on `target` for every later commit until it is
	/// retracted.
	pub fn declare(&mut self, target: TargetId, request: Request) -> Result<(), CommitError> {
		self.node_mut(target)?.pending.push(request);
		Ok(())
	}

	/// Withdraws the declarations on `target` for which `predicate` holds.
	///
	/// Instantiated composites are matched through the actions they expanded
	/// into. Returns how many entries were removed; the change shows up in the
	/// next commit covering `target`.
	pub fn retract<F>(&mut self, target: TargetId, mut predicate: F) -> Result<usize, CommitError>
	where
		F: FnMut(&Directive, &Object) -> bool,
	{
		let node = self.node_mut(target)?;
		let before = node.pending.len() + node.realized.len();
		node.pending.retain(|r| !predicate(&*r.directive, &r.object));
		node.realized.retain(|i| !predicate(&*i.directive, &i.object));
		Ok(before - node.pending.len() - node.realized.len())
	}

	pub fn name(&self, target: TargetId) -> Option<&str> {
		self.nodes.get(target.index()).map(|n| &*n.name)
	}

	pub fn parent(&self, target: TargetId) -> Option<TargetId> {
		self.nodes.get(target.index())?.parent
	}

	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Number of requests waiting for the next commit on `target` itself.
	pub fn pending_len(&self, target: TargetId) -> usize {
		self.nodes.get(target.index()).map_or(0, |n| n.pending.len())
	}

	/// Number of actions already instantiated on `target` itself.
	pub fn realized_len(&self, target: TargetId) -> usize {
		self.nodes.get(target.index()).map_or(0, |n| n.realized.len())
	}

	/// The config published by the last successful commit that covered `target`.
	pub fn config(&self, target: TargetId) -> Option<Arc<Config>> {
		self.nodes.get(target.index())?.config.clone()
	}

	/// `target` followed by its ancestors up to the root.
	pub fn ancestors(&self, target: TargetId) -> Result<Vec<TargetId>, CommitError> {
		self.node(target)?;
		let mut chain = Vec::new();
		let mut current = Some(target);
		while let Some(id) = current {
			chain.push(id);
			current = self.nodes[id.index()].parent;
		}
		Ok(chain)
	}

	/// Registry specs `target` would get from what is registered and declared now.
	///
	/// Pending composites are not expanded, so registries contributed only by
	/// their expansion are listed after the next commit.
	pub fn registry_specs(&self, target: TargetId) -> Result<RegistrySpecs, CommitError> {
		let mut chain = self.ancestors(target)?;
		chain.reverse();
		let levels: Vec<Vec<&Arc<Directive>>> = chain
			.iter()
			.map(|&id| {
				let node = &self.nodes[id.index()];
				node.directives
					.iter()
					.chain(node.pending.iter().map(Request::directive))
					.collect()
			})
			.collect();
		Ok(merge_specs(levels))
	}

	pub(crate) fn node(&self, target: TargetId) -> Result<&TargetNode, CommitError> {
		self.nodes
			.get(target.index())
			.ok_or(CommitError::UnknownTarget(target))
	}

	pub(crate) fn node_mut(&mut self, target: TargetId) -> Result<&mut TargetNode, CommitError> {
		self.nodes
			.get_mut(target.index())
			.ok_or(CommitError::UnknownTarget(target))
	}
}

impl fmt::Debug for TargetTree {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list()
			.entries(
				self.nodes
					.iter()
					.map(|n| (&n.name, n.parent, n.pending.len(), n.realized.len())),
			)
			.finish()
	}
}
