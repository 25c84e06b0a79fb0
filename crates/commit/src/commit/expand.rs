//! Composite expansion and deferred instantiation.

use std::sync::Arc;

use crate::action::{Action, Constructor, Request};
use crate::directive::Directive;
use crate::error::ExpansionError;
use crate::object::Object;
use crate::target::TargetId;

/// An action realized from a request, kept on its target across commits.
pub(crate) struct Instance {
	/// Target the originating request was declared on.
	pub(crate) level: TargetId,
	pub(crate) directive: Arc<Directive>,
	pub(crate) action: Box<dyn Action>,
	pub(crate) object: Object,
}

/// Expands and instantiates `request` declared on `level`, appending to `out`.
///
/// Composite results replace the composite in place, so nested expansion
/// yields actions depth-first, left to right. On error `out` may hold the
/// part of the expansion realized before the failure.
pub(crate) fn realize(
	level: TargetId,
	request: Request,
	limit: usize,
	out: &mut Vec<Instance>,
) -> Result<(), ExpansionError> {
	realize_one(level, request, 0, limit, out)
}

fn realize_one(
	level: TargetId,
	request: Request,
	depth: usize,
	limit: usize,
	out: &mut Vec<Instance>,
) -> Result<(), ExpansionError> {
	let Request {
		directive,
		constructor,
		object,
	} = request;

	let expected = directive.kind();
	if constructor.kind() != expected {
		return Err(ExpansionError::KindMismatch {
			directive: directive.name(),
			expected,
		});
	}

	match constructor {
		Constructor::Action(make) => {
			out.push(Instance {
				level,
				action: make(),
				directive,
				object,
			});
		}
		Constructor::Composite(make) => {
			if depth >= limit {
				return Err(ExpansionError::TooDeep {
					directive: directive.name(),
					limit,
				});
			}
			let composite = make();
			for child in composite.actions(&object) {
				realize_one(level, child, depth + 1, limit, out)?;
			}
		}
	}
	Ok(())
}
