//! Static action-type descriptors.
//!
//! A [`Directive`] carries everything the commit engine needs to know about an
//! action type before any action of that type exists: the registries it
//! touches, the group it belongs to, the groups it depends on, and the group
//! hooks it owns.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::config::Registries;
use crate::error::ActionError;

/// Zero-argument constructor for a registry's initial value.
pub type Factory = Arc<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>;

/// Group lifecycle hook, invoked with the group owner's registries.
pub type Hook = Arc<dyn Fn(&mut Registries<'_>) -> Result<(), ActionError> + Send + Sync>;

/// Whether a directive performs itself or expands into further requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DirectiveKind {
	Action,
	Composite,
}

impl fmt::Display for DirectiveKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Self::Action => f.write_str("action"),
			Self::Composite => f.write_str("composite"),
		}
	}
}

/// A registry key together with the factory that builds its initial value.
#[derive(Clone)]
pub struct RegistrySpec {
	key: &'static str,
	type_name: &'static str,
	factory: Factory,
}

impl RegistrySpec {
	/// Declares `key` as starting from `make()`.
	pub fn new<T, F>(key: &'static str, make: F) -> Self
	where
		T: Any + Send + Sync,
		F: Fn() -> T + Send + Sync + 'static,
	{
		Self {
			key,
			type_name: type_name::<T>(),
			factory: Arc::new(move || Box::new(make()) as Box<dyn Any + Send + Sync>),
		}
	}

	/// Declares `key` as starting from `T::default()`.
	pub fn default_of<T: Any + Default + Send + Sync>(key: &'static str) -> Self {
		Self::new(key, T::default)
	}

	pub fn key(&self) -> &'static str {
		self.key
	}

	/// Name of the registry's value type, for diagnostics.
	pub fn type_name(&self) -> &'static str {
		self.type_name
	}

	pub(crate) fn build(&self) -> Box<dyn Any + Send + Sync> {
		(self.factory)()
	}

	/// Returns true if both specs share the same factory.
	pub(crate) fn same_factory(&self, other: &Self) -> bool {
		Arc::ptr_eq(&self.factory, &other.factory)
	}
}

impl fmt::Debug for RegistrySpec {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RegistrySpec")
			.field("key", &self.key)
			.field("type", &self.type_name)
			.finish()
	}
}

/// Static description of an action type.
///
/// Directive names are the identity used for grouping: within one commit two
/// distinct directives must not share a name.
pub struct Directive {
	name: &'static str,
	kind: DirectiveKind,
	registries: Vec<RegistrySpec>,
	group: Option<Arc<Directive>>,
	depends: Vec<Arc<Directive>>,
	before: Option<Hook>,
	after: Option<Hook>,
}

impl Directive {
	/// Starts describing a directive whose requests perform actions.
	pub fn action(name: &'static str) -> DirectiveBuilder {
		DirectiveBuilder::new(name, DirectiveKind::Action)
	}

	/// Starts describing a directive whose requests expand into further requests.
	pub fn composite(name: &'static str) -> DirectiveBuilder {
		DirectiveBuilder::new(name, DirectiveKind::Composite)
	}

	pub fn name(&self) -> &'static str {
		self.name
	}

	pub fn kind(&self) -> DirectiveKind {
		self.kind
	}

	/// Registries this directive reads or mutates.
	pub fn registries(&self) -> &[RegistrySpec] {
		&self.registries
	}

	/// The directive this one delegates group ownership to, if any.
	pub fn group_owner(&self) -> Option<&Arc<Directive>> {
		self.group.as_ref()
	}

	/// Canonical group key, following group ownership to its root.
	pub fn group_key(&self) -> &'static str {
		match &self.group {
			Some(owner) => owner.group_key(),
			None => self.name,
		}
	}

	pub fn depends(&self) -> &[Arc<Directive>] {
		&self.depends
	}

	pub fn before(&self) -> Option<&Hook> {
		self.before.as_ref()
	}

	pub fn after(&self) -> Option<&Hook> {
		self.after.as_ref()
	}
}

impl fmt::Debug for Directive {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Directive")
			.field("name", &self.name)
			.field("kind", &self.kind)
			.field("group", &self.group_key())
			.field("registries", &self.registries)
			.field(
				"depends",
				&self.depends.iter().map(|d| d.name).collect::<Vec<_>>(),
			)
			.field("before", &self.before.is_some())
			.field("after", &self.after.is_some())
			.finish()
	}
}

/// Builder for [`Directive`].
pub struct DirectiveBuilder {
	inner: Directive,
}

impl DirectiveBuilder {
	fn new(name: &'static str, kind: DirectiveKind) -> Self {
		Self {
			inner: Directive {
				name,
				kind,
				registries: Vec::new(),
				group: None,
				depends: Vec::new(),
				before: None,
				after: None,
			},
		}
	}

	/// Declares a touched registry.
	pub fn registry(mut self, spec: RegistrySpec) -> Self {
		self.inner.registries.push(spec);
		self
	}

	/// Declares a touched registry that starts as `T::default()`.
	pub fn registry_of<T: Any + Default + Send + Sync>(self, key: &'static str) -> Self {
		self.registry(RegistrySpec::default_of::<T>(key))
	}

	/// Places this directive in `owner`'s group.
	pub fn group(mut self, owner: &Arc<Directive>) -> Self {
		self.inner.group = Some(Arc::clone(owner));
		self
	}

	/// Requires `dependency`'s group to be performed first.
	pub fn depends_on(mut self, dependency: &Arc<Directive>) -> Self {
		self.inner.depends.push(Arc::clone(dependency));
		self
	}

	pub fn before<F>(mut self, hook: F) -> Self
	where
		F: Fn(&mut Registries<'_>) -> Result<(), ActionError> + Send + Sync + 'static,
	{
		self.inner.before = Some(Arc::new(hook));
		self
	}

	pub fn after<F>(mut self, hook: F) -> Self
	where
		F: Fn(&mut Registries<'_>) -> Result<(), ActionError> + Send + Sync + 'static,
	{
		self.inner.after = Some(Arc::new(hook));
		self
	}

	pub fn build(self) -> Arc<Directive> {
		Arc::new(self.inner)
	}
}
