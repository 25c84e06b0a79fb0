use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// The object a request is attached to.
///
/// Actions receive it in [`crate::Action::perform`]; conflict reports name it
/// by its label.
#[derive(Clone)]
pub struct Object {
	label: Arc<str>,
	value: Option<Arc<dyn Any + Send + Sync>>,
}

impl Object {
	/// Creates an object that is only a label.
	pub fn new(label: impl Into<Arc<str>>) -> Self {
		Self {
			label: label.into(),
			value: None,
		}
	}

	/// Creates an object carrying a shared payload.
	pub fn with_value<T: Any + Send + Sync>(label: impl Into<Arc<str>>, value: T) -> Self {
		Self {
			label: label.into(),
			value: Some(Arc::new(value)),
		}
	}

	pub fn label(&self) -> &str {
		&self.label
	}

	/// Returns the payload if it is a `T`.
	pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
		self.value.as_deref()?.downcast_ref::<T>()
	}
}

impl PartialEq for Object {
	fn eq(&self, other: &Self) -> bool {
		let same_value = match (&self.value, &other.value) {
			(None, None) => true,
			(Some(a), Some(b)) => Arc::ptr_eq(a, b),
			_ => false,
		};
		same_value && self.label == other.label
	}
}

impl Eq for Object {}

impl fmt::Debug for Object {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_tuple("Object").field(&self.label).finish()
	}
}

impl fmt::Display for Object {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.label)
	}
}
