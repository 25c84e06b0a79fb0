//! Realized per-target registries.

use std::any::{Any, type_name};
use std::fmt;

use indexmap::IndexMap;

use crate::directive::RegistrySpec;
use crate::error::RegistryError;

type Slots = IndexMap<&'static str, Box<dyn Any + Send + Sync>>;

/// Mapping from registry key to the registry instance built for one target.
///
/// Every commit builds a new `Config`; a published one is never mutated.
#[derive(Default)]
pub struct Config {
	slots: Slots,
}

impl Config {
	/// Builds a fresh registry for every spec, in spec order.
	pub(crate) fn from_specs<'a>(specs: impl IntoIterator<Item = &'a RegistrySpec>) -> Self {
		Self {
			slots: specs
				.into_iter()
				.map(|spec| (spec.key(), spec.build()))
				.collect(),
		}
	}

	/// Returns the registry under `key` if it exists and is a `T`.
	pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
		self.slots.get(key)?.downcast_ref::<T>()
	}

	pub fn contains(&self, key: &str) -> bool {
		self.slots.contains_key(key)
	}

	/// Registry keys in declaration order.
	pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.slots.keys().copied()
	}

	pub fn len(&self) -> usize {
		self.slots.len()
	}

	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	/// Opens a view restricted to the registries in `touched`.
	pub(crate) fn view<'a>(&'a mut self, touched: &'a [RegistrySpec]) -> Registries<'a> {
		Registries {
			slots: &mut self.slots,
			touched,
		}
	}
}

impl fmt::Debug for Config {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Config")
			.field("keys", &self.slots.keys().collect::<Vec<_>>())
			.finish()
	}
}

/// The registries one directive is allowed to touch on one target.
pub struct Registries<'a> {
	slots: &'a mut Slots,
	touched: &'a [RegistrySpec],
}

impl Registries<'_> {
	pub fn get<T: Any>(&self, key: &'static str) -> Result<&T, RegistryError> {
		self.check(key)?;
		self.slots
			.get(key)
			.ok_or(RegistryError::Missing { key })?
			.downcast_ref::<T>()
			.ok_or(RegistryError::TypeMismatch {
				key,
				expected: type_name::<T>(),
			})
	}

	pub fn get_mut<T: Any>(&mut self, key: &'static str) -> Result<&mut T, RegistryError> {
		self.check(key)?;
		self.slots
			.get_mut(key)
			.ok_or(RegistryError::Missing { key })?
			.downcast_mut::<T>()
			.ok_or(RegistryError::TypeMismatch {
				key,
				expected: type_name::<T>(),
			})
	}

	/// Keys reachable through this view.
	pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
		self.touched.iter().map(RegistrySpec::key)
	}

	fn check(&self, key: &'static str) -> Result<(), RegistryError> {
		if self.touched.iter().any(|spec| spec.key() == key) {
			Ok(())
		} else {
			Err(RegistryError::NotTouched { key })
		}
	}
}
