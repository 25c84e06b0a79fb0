//! Property tests for override folding, composite expansion and action replay.

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;

use common::{Log, Message, declare, entry, log_directive};
use confit_commit::{Composite, Directive, Object, Request, TargetTree};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Shape {
	Leaf,
	Nest(Vec<Shape>),
}

fn shape() -> impl Strategy<Value = Shape> {
	Just(Shape::Leaf).prop_recursive(4, 32, 4, |inner| {
		prop::collection::vec(inner, 0..4).prop_map(Shape::Nest)
	})
}

/// A shape whose leaves carry their depth-first position as label.
#[derive(Clone)]
enum Plan {
	Leaf(String),
	Nest(Vec<Plan>),
}

fn label(shape: &Shape, leaves: &mut Vec<String>) -> Plan {
	match shape {
		Shape::Leaf => {
			let name = format!("leaf{}", leaves.len());
			leaves.push(name.clone());
			Plan::Leaf(name)
		}
		Shape::Nest(children) => Plan::Nest(children.iter().map(|c| label(c, leaves)).collect()),
	}
}

struct Nest {
	plans: Vec<Plan>,
	leaf: Arc<Directive>,
	nest: Arc<Directive>,
}

impl Composite for Nest {
	fn actions(&self, object: &Object) -> Vec<Request> {
		self.plans
			.iter()
			.map(|plan| request(plan, &self.leaf, &self.nest, object))
			.collect()
	}
}

fn request(plan: &Plan, leaf: &Arc<Directive>, nest: &Arc<Directive>, object: &Object) -> Request {
	match plan {
		Plan::Leaf(name) => {
			let name = name.clone();
			Request::action(leaf, move || Message::new("my", name), object.clone())
		}
		Plan::Nest(plans) => {
			let composite = Nest {
				plans: plans.clone(),
				leaf: Arc::clone(leaf),
				nest: Arc::clone(nest),
			};
			Request::composite(nest, move || composite, object.clone())
		}
	}
}

proptest! {
	#[test]
	fn disjoint_keys_perform_once_in_declaration_order(
		messages in prop::collection::btree_set("[a-z]{1,4}", 0..24),
	) {
		let foo = log_directive("foo", "my");
		let mut tree = TargetTree::new();
		let app = tree.add_root("app");
		tree.register(app, &foo).unwrap();
		let f = Object::new("f");
		// Reverse so declaration order differs from the set's sorted order.
		let declared: Vec<&String> = messages.iter().rev().collect();
		for message in &declared {
			declare(&mut tree, app, &foo, message, &f);
		}

		let outcome = tree.commit(&[app]).unwrap();

		prop_assert_eq!(outcome.instantiated(), declared.len());
		let config = tree.config(app).unwrap();
		let expected: Log = declared.iter().map(|m| entry(m, &f)).collect();
		prop_assert_eq!(config.get::<Log>("my"), Some(&expected));
	}

	#[test]
	fn composites_expand_depth_first_left_to_right(
		shapes in prop::collection::vec(shape(), 0..5),
	) {
		let leaf = log_directive("leaf", "my");
		let nest = Directive::composite("nest").build();
		let mut tree = TargetTree::new();
		let app = tree.add_root("app");
		tree.register(app, &leaf).unwrap();
		let f = Object::new("f");
		let mut leaves = Vec::new();
		for shape in &shapes {
			let plan = label(shape, &mut leaves);
			tree.declare(app, request(&plan, &leaf, &nest, &f)).unwrap();
		}

		let outcome = tree.commit(&[app]).unwrap();

		prop_assert_eq!(outcome.instantiated(), leaves.len());
		let config = tree.config(app).unwrap();
		let expected: Log = leaves.iter().map(|name| entry(name, &f)).collect();
		prop_assert_eq!(config.get::<Log>("my"), Some(&expected));
	}

	#[test]
	fn deepest_declaration_of_each_identifier_wins(
		depth in 1usize..5,
		raw in prop::collection::vec((0usize..5, 0u8..6), 0..20),
	) {
		let foo = log_directive("foo", "my");
		let mut tree = TargetTree::new();
		let mut chain = vec![tree.add_root("level0")];
		for level in 1..depth {
			let parent = chain[level - 1];
			chain.push(tree.add_child(parent, format!("level{level}")).unwrap());
		}
		tree.register(chain[0], &foo).unwrap();

		// One declaration per (level, key) so no level conflicts with itself.
		let mut decls: Vec<(usize, String)> = Vec::new();
		for (level, key) in raw {
			let decl = (level % depth, format!("k{key}"));
			if !decls.contains(&decl) {
				decls.push(decl);
			}
		}
		// Realization visits levels root first, then declaration order.
		decls.sort_by_key(|(level, _)| *level);
		let objects: Vec<Object> = (0..depth).map(|l| Object::new(format!("level{l}"))).collect();
		for (level, key) in &decls {
			declare(&mut tree, chain[*level], &foo, key, &objects[*level]);
		}

		let leaf = chain[depth - 1];
		tree.commit(&[leaf]).unwrap();

		let mut winners: BTreeMap<&str, usize> = BTreeMap::new();
		for (ordinal, (_, key)) in decls.iter().enumerate() {
			winners.insert(key.as_str(), ordinal);
		}
		let mut order: Vec<usize> = winners.into_values().collect();
		order.sort_unstable();
		let expected: Log = order
			.into_iter()
			.map(|ordinal| {
				let (level, key) = &decls[ordinal];
				entry(key, &objects[*level])
			})
			.collect();

		let config = tree.config(leaf).unwrap();
		prop_assert_eq!(config.get::<Log>("my"), Some(&expected));
	}
}
