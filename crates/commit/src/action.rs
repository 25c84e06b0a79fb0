//! Action instances and deferred requests.

use std::fmt;
use std::sync::Arc;

use crate::config::Registries;
use crate::directive::{Directive, DirectiveKind};
use crate::error::ActionError;
use crate::key::Key;
use crate::object::Object;

/// An instantiated unit of configuration.
///
/// An instance is created once and then kept on its target, so every later
/// commit covering that target or a descendant calls it again against fresh
/// registries. `identifier`, `discriminators` and `perform` must not depend on
/// other actions of the same group having run.
pub trait Action: Send {
	/// Identity key; equal identifiers within a group collide unless overridden.
	fn identifier(&self, registries: &Registries<'_>) -> Key;

	/// Additional keys sharing the identifier namespace of the group.
	fn discriminators(&self, _registries: &Registries<'_>) -> Vec<Key> {
		Vec::new()
	}

	/// Applies the action to the target's registries.
	fn perform(&self, object: &Object, registries: &mut Registries<'_>) -> Result<(), ActionError>;
}

/// A declaration that expands into further requests instead of performing.
pub trait Composite {
	/// Requests this composite stands for, in order. Called once, at commit time.
	fn actions(&self, object: &Object) -> Vec<Request>;
}

pub(crate) type MakeAction = Box<dyn FnOnce() -> Box<dyn Action> + Send>;
pub(crate) type MakeComposite = Box<dyn FnOnce() -> Box<dyn Composite> + Send>;

pub(crate) enum Constructor {
	Action(MakeAction),
	Composite(MakeComposite),
}

impl Constructor {
	pub(crate) fn kind(&self) -> DirectiveKind {
		match self {
			Self::Action(_) => DirectiveKind::Action,
			Self::Composite(_) => DirectiveKind::Composite,
		}
	}
}

/// A recorded, not yet instantiated declaration.
///
/// The constructor runs exactly once, inside a commit.
pub struct Request {
	pub(crate) directive: Arc<Directive>,
	pub(crate) constructor: Constructor,
	pub(crate) object: Object,
}

impl Request {
	/// Records an action request.
	pub fn action<A, F>(directive: &Arc<Directive>, make: F, object: Object) -> Self
	where
		A: Action + 'static,
		F: FnOnce() -> A + Send + 'static,
	{
		Self {
			directive: Arc::clone(directive),
			constructor: Constructor::Action(Box::new(move || Box::new(make()) as Box<dyn Action>)),
			object,
		}
	}

	/// Records a composite request.
	pub fn composite<C, F>(directive: &Arc<Directive>, make: F, object: Object) -> Self
	where
		C: Composite + 'static,
		F: FnOnce() -> C + Send + 'static,
	{
		Self {
			directive: Arc::clone(directive),
			constructor: Constructor::Composite(Box::new(move || {
				Box::new(make()) as Box<dyn Composite>
			})),
			object,
		}
	}

	pub fn directive(&self) -> &Arc<Directive> {
		&self.directive
	}

	pub fn object(&self) -> &Object {
		&self.object
	}
}

impl fmt::Debug for Request {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Request")
			.field("directive", &self.directive.name())
			.field("constructor", &self.constructor.kind())
			.field("object", &self.object)
			.finish()
	}
}
