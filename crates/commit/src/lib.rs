//! Commit engine for declared configuration actions.
//!
//! # Purpose
//!
//! Independently written extension points declare configuration actions
//! against targets in a single-inheritance [`TargetTree`]. Nothing happens at
//! declaration time. [`TargetTree::commit`] then realizes every pending
//! declaration, checks it for conflicts, orders it by dependency, resolves
//! overrides along each target's ancestor chain, and replays the result into
//! a fresh [`Config`] per target.
//!
//! # Key Types
//!
//! | Type | Role |
//! |------|------|
//! | [`Directive`] | Static description of an action type: registries, group, ordering, hooks. |
//! | [`Action`] / [`Composite`] | Instance behavior: keys and `perform`, or expansion. |
//! | [`Request`] | A recorded declaration whose constructor has not run yet. |
//! | [`TargetTree`] | Targets, their declarations, and their committed configs. |
//! | [`Config`] / [`Registries`] | Realized registries, and the view an action may touch. |
//!
//! # Invariants
//!
//! - Constructors run only inside a commit, at most once per request.
//! - Declarations stay on their target until retracted; every commit
//!   rebuilds its targets from all of them.
//! - A commit publishes a config for every target it covers, or for none.
//! - Two targets never share a registry instance.
//! - Within a group on one target, no key is claimed by two effective
//!   actions; a more-derived declaration of the same identifier overrides.
//!
//! # Concurrency
//!
//! Single-threaded and synchronous. Hosts that share a tree across threads
//! must serialize commits externally.

mod action;
mod commit;
mod config;
mod directive;
mod error;
mod key;
mod object;
mod options;
mod resolve;
mod target;

pub use action::{Action, Composite, Request};
pub use commit::CommitOutcome;
pub use config::{Config, Registries};
pub use directive::{Directive, DirectiveBuilder, DirectiveKind, Factory, Hook, RegistrySpec};
pub use error::{
	ActionError, CommitError, Conflict, ConflictError, ConflictParty, CycleError, ExpansionError,
	OptionsError, RegistryError,
};
pub use key::Key;
pub use object::Object;
pub use options::CommitOptions;
pub use resolve::{RegistrySpecs, merge_specs};
pub use target::{TargetId, TargetTree};
