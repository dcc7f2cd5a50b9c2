//! Conversion between JSON diffs and the [`node`](`crate::node`) model.
//!
//! Reserved keys are [`STATICS`], [`DYNAMICS`] and [`COMPONENTS`]. Keys that are a non-negative integer are slots,
//! any other key of a node is [metadata](`crate::node::Metadata`). Slot keys must be written canonically: `"01"` or
//! `"+1"` would collide with `"1"` and are rejected.

use crate::{
	error::DiffError,
	node::{Comprehension, ComponentId, Diff, Node, Slot, Statics, StaticsRef, Tree},
	path::{Path, Segment},
};
use core::{convert::TryFrom, str::FromStr};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use tracing::{error, instrument};

pub const STATICS: &str = "s";
pub const DYNAMICS: &str = "d";
pub const COMPONENTS: &str = "c";

/// Decodes a diff.
///
/// # Errors
///
/// Iff the value doesn't follow the wire format. Nothing is coerced: a slot value must be a string, a non-negative integer
/// (component reference) or an object.
#[instrument(skip(value))]
pub fn load_diff(value: Value) -> Result<Diff, DiffError> {
	Loader::default().diff(value)
}

impl TryFrom<Value> for Diff {
	type Error = DiffError;

	fn try_from(value: Value) -> Result<Self, Self::Error> {
		load_diff(value)
	}
}

impl FromStr for Diff {
	type Err = DiffError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		load_diff(serde_json::from_str(s)?)
	}
}

#[derive(Default)]
struct Loader {
	path: Path,
}

impl Loader {
	fn malformed<T>(&self, reason: impl Into<String>) -> Result<T, DiffError> {
		let reason = reason.into();
		error!(path = %self.path, "{}", reason);
		Err(DiffError::Malformed { path: self.path.to_string(), reason })
	}

	fn within<T>(&mut self, segment: Segment, f: impl FnOnce(&mut Self) -> Result<T, DiffError>) -> Result<T, DiffError> {
		self.path.push(segment);
		let result = f(self);
		self.path.pop();
		result
	}

	fn diff(&mut self, value: Value) -> Result<Diff, DiffError> {
		let mut object = match value {
			Value::Object(object) => object,
			other => return self.malformed(format!("expected an object but found {}", kind(&other))),
		};

		let components = match object.remove(COMPONENTS) {
			None | Some(Value::Null) => BTreeMap::new(),
			Some(Value::Object(components)) => self.components(components)?,
			Some(other) => return self.malformed(format!("expected components to be an object but found {}", kind(&other))),
		};

		if object.contains_key(DYNAMICS) {
			return self.malformed("the root can't be a comprehension");
		}

		Ok(Diff {
			root: self.node(object, false)?,
			components,
		})
	}

	fn components(&mut self, components: Map<String, Value>) -> Result<BTreeMap<ComponentId, Node>, DiffError> {
		components
			.into_iter()
			.map(|(id, value)| {
				let id = ComponentId::from(id);
				self.within(Segment::Component(id.clone()), |this| match value {
					Value::Object(object) if object.contains_key(DYNAMICS) => this.malformed("a component can't be a comprehension"),
					Value::Object(object) => Ok((id, this.node(object, true)?)),
					other => this.malformed(format!("expected a component object but found {}", kind(&other))),
				})
			})
			.collect()
	}

	fn node(&mut self, object: Map<String, Value>, component_root: bool) -> Result<Node, DiffError> {
		let mut node = Node::default();
		for (key, value) in object {
			if key == STATICS {
				node.statics = self.within(Segment::Key(key), |this| this.statics(value, component_root))?;
			} else if key == COMPONENTS {
				return self.malformed("components are only allowed at the root");
			} else if let Ok(index) = key.parse::<usize>() {
				if index.to_string() != key {
					return self.malformed(format!("slot key {:?} is not in canonical form", key));
				}
				let slot = self.within(Segment::Slot(index), |this| this.slot(value))?;
				node.slots.insert(index, slot);
			} else {
				node.metadata.insert(key, value);
			}
		}
		Ok(node)
	}

	fn statics(&mut self, value: Value, allow_ref: bool) -> Result<Option<Statics>, DiffError> {
		match value {
			Value::Null => Ok(None),
			Value::Array(fragments) => Ok(Some(Statics::Fragments(self.fragments(fragments)?.into()))),
			Value::Number(_) | Value::String(_) if !allow_ref => self.malformed("statics references are only allowed on component roots"),
			Value::Number(number) => match number.as_i64() {
				Some(id) if id >= 0 => Ok(Some(Statics::Ref(StaticsRef::Component(ComponentId::from(id.unsigned_abs()))))),
				Some(id) => Ok(Some(Statics::Ref(StaticsRef::Settled(ComponentId::from(id.unsigned_abs()))))),
				None => self.malformed(format!("expected an integer statics reference but found {}", number)),
			},
			Value::String(id) => Ok(Some(Statics::Ref(StaticsRef::Component(ComponentId::from(id))))),
			other => self.malformed(format!("expected statics but found {}", kind(&other))),
		}
	}

	fn fragments(&mut self, fragments: Vec<Value>) -> Result<Vec<String>, DiffError> {
		fragments
			.into_iter()
			.enumerate()
			.map(|(i, fragment)| match fragment {
				Value::String(fragment) => Ok(fragment),
				other => self.within(Segment::Index(i), |this| this.malformed(format!("expected a static fragment but found {}", kind(&other)))),
			})
			.collect()
	}

	fn slot(&mut self, value: Value) -> Result<Slot, DiffError> {
		match value {
			Value::String(text) => Ok(Slot::Text(text)),
			Value::Number(number) => match number.as_u64() {
				Some(id) => Ok(Slot::Component(ComponentId::from(id))),
				None => self.malformed(format!("expected a component reference but found {}", number)),
			},
			Value::Object(object) if object.contains_key(DYNAMICS) => Ok(Slot::Comprehension(Box::new(self.comprehension(object)?))),
			Value::Object(object) => Ok(Slot::Node(Box::new(self.node(object, false)?))),
			other => self.malformed(format!("expected text, a node or a comprehension but found {}", kind(&other))),
		}
	}

	fn comprehension(&mut self, object: Map<String, Value>) -> Result<Comprehension, DiffError> {
		let mut comprehension = Comprehension::default();
		for (key, value) in object {
			if key == STATICS {
				comprehension.statics = self.within(Segment::Key(key), |this| this.statics(value, false))?;
			} else if key == DYNAMICS {
				comprehension.dynamics = self.within(Segment::Key(key), |this| this.dynamics(value))?;
			} else {
				return self.malformed(format!("unexpected key {:?} in comprehension", key));
			}
		}
		Ok(comprehension)
	}

	fn dynamics(&mut self, value: Value) -> Result<Vec<Vec<Slot>>, DiffError> {
		let tuples = match value {
			Value::Array(tuples) => tuples,
			other => return self.malformed(format!("expected a list of tuples but found {}", kind(&other))),
		};
		tuples
			.into_iter()
			.enumerate()
			.map(|(i, tuple)| {
				self.within(Segment::Index(i), |this| match tuple {
					Value::Array(values) => values.into_iter().enumerate().map(|(j, value)| this.within(Segment::Index(j), |this| this.slot(value))).collect(),
					other => this.malformed(format!("expected a tuple but found {}", kind(&other))),
				})
			})
			.collect()
	}
}

fn kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "a boolean",
		Value::Number(_) => "a number",
		Value::String(_) => "a string",
		Value::Array(_) => "an array",
		Value::Object(_) => "an object",
	}
}

/// Encodes a settled tree in the wire format, components under [`COMPONENTS`] if there are any.
#[must_use]
pub fn store_tree(tree: &Tree) -> Value {
	let mut object = store_node(tree.root());
	let components = tree.components();
	if !components.is_empty() {
		let components = components.into_iter().map(|(id, node)| (id.to_string(), Value::Object(store_node(node)))).collect();
		object.insert(COMPONENTS.to_owned(), Value::Object(components));
	}
	Value::Object(object)
}

fn store_node(node: &Node) -> Map<String, Value> {
	let mut object = Map::new();
	if let Some(statics) = &node.statics {
		object.insert(STATICS.to_owned(), store_statics(statics));
	}
	for (index, slot) in &node.slots {
		object.insert(index.to_string(), store_slot(slot));
	}
	for (key, value) in &node.metadata {
		object.insert(key.clone(), value.clone());
	}
	object
}

fn store_statics(statics: &Statics) -> Value {
	match statics {
		Statics::Fragments(fragments) => fragments.iter().cloned().map(Value::String).collect(),
		Statics::Ref(StaticsRef::Component(id)) => store_id(id, false),
		Statics::Ref(StaticsRef::Settled(id)) => store_id(id, true),
	}
}

fn store_id(id: &ComponentId, negate: bool) -> Value {
	match id.as_str().parse::<i64>() {
		Ok(number) if negate => Value::from(-number),
		Ok(number) => Value::from(number),
		Err(_) => Value::String(id.to_string()),
	}
}

fn store_slot(slot: &Slot) -> Value {
	match slot {
		Slot::Text(text) => Value::String(text.clone()),
		Slot::Node(node) => Value::Object(store_node(node)),
		Slot::Comprehension(comprehension) => {
			let mut object = Map::new();
			if let Some(statics) = &comprehension.statics {
				object.insert(STATICS.to_owned(), store_statics(statics));
			}
			let dynamics = comprehension.dynamics.iter().map(|tuple| Value::Array(tuple.iter().map(store_slot).collect())).collect();
			object.insert(DYNAMICS.to_owned(), Value::Array(dynamics));
			Value::Object(object)
		}
		Slot::Component(id) => store_id(id, false),
	}
}
