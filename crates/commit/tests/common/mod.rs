#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use confit_commit::{
	Action, ActionError, Composite, Directive, Key, Object, Registries, Request, TargetId,
	TargetTree,
};

/// Registry shape used by most scenarios: `(message, object)` in perform order.
pub type Log = Vec<(String, Object)>;

/// Appends `(message, object)` to the `log` registry it was built for.
pub struct Message {
	pub registry: &'static str,
	pub message: String,
	pub others: Vec<String>,
}

impl Message {
	pub fn new(registry: &'static str, message: impl Into<String>) -> Self {
		Self {
			registry,
			message: message.into(),
			others: Vec::new(),
		}
	}

	pub fn with_others(mut self, others: &[&str]) -> Self {
		self.others = others.iter().map(|o| o.to_string()).collect();
		self
	}
}

impl Action for Message {
	fn identifier(&self, _registries: &Registries<'_>) -> Key {
		Key::from(self.message.as_str())
	}

	fn discriminators(&self, _registries: &Registries<'_>) -> Vec<Key> {
		self.others.iter().map(|o| Key::from(o.as_str())).collect()
	}

	fn perform(&self, object: &Object, registries: &mut Registries<'_>) -> Result<(), ActionError> {
		registries
			.get_mut::<Log>(self.registry)?
			.push((self.message.clone(), object.clone()));
		Ok(())
	}
}

/// Expands into one [`Message`] request per message, all on the same object.
pub struct Fanout {
	pub directive: Arc<Directive>,
	pub messages: Vec<String>,
}

impl Composite for Fanout {
	fn actions(&self, object: &Object) -> Vec<Request> {
		let registry = self
			.directive
			.registries()
			.first()
			.map_or("my", |spec| spec.key());
		self.messages
			.iter()
			.map(|message| {
				let message = message.clone();
				Request::action(
					&self.directive,
					move || Message::new(registry, message),
					object.clone(),
				)
			})
			.collect()
	}
}

pub fn log_directive(name: &'static str, registry: &'static str) -> Arc<Directive> {
	Directive::action(name).registry_of::<Log>(registry).build()
}

pub fn declare(
	tree: &mut TargetTree,
	target: TargetId,
	directive: &Arc<Directive>,
	message: &str,
	object: &Object,
) {
	let registry = directive.registries().first().map_or("my", |spec| spec.key());
	let message = message.to_string();
	tree.declare(
		target,
		Request::action(directive, move || Message::new(registry, message), object.clone()),
	)
	.unwrap();
}

pub fn declare_with_others(
	tree: &mut TargetTree,
	target: TargetId,
	directive: &Arc<Directive>,
	message: &str,
	others: &'static [&'static str],
	object: &Object,
) {
	let registry = directive.registries().first().map_or("my", |spec| spec.key());
	let message = message.to_string();
	tree.declare(
		target,
		Request::action(
			directive,
			move || Message::new(registry, message).with_others(others),
			object.clone(),
		),
	)
	.unwrap();
}

pub fn entry(message: &str, object: &Object) -> (String, Object) {
	(message.to_string(), object.clone())
}

pub fn counter() -> Arc<AtomicUsize> {
	Arc::new(AtomicUsize::new(0))
}

pub fn count(counter: &AtomicUsize) -> usize {
	counter.load(Ordering::SeqCst)
}
