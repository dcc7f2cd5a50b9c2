//! The rendered tree and the diffs that update it.
//!
//! Both share one shape: a root [`Node`] plus a map of independently addressable component [`Node`]s.
//! A [`Diff`] may carry [`Statics::Ref`]erences on its component roots, a settled [`Tree`] never does.

use crate::{intern::Interner, temp_set::TempSet};
use core::{
	cmp::Ordering,
	fmt::{self, Display, Formatter},
};
use hashbrown::HashMap;
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};

/// The literal text between dynamic values, shared between nodes with the same template.
pub type Fragments = Arc<[String]>;

/// Non-reserved keys of a node, like a page `title`. Merged by overwriting, never rendered.
pub type Metadata = BTreeMap<String, Value>;

/// Identifies a component for the lifetime of its view.
///
/// Numeric ids (the common case on the wire) order numerically and before any others.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ComponentId(Arc<str>);

impl ComponentId {
	#[must_use]
	pub fn as_str(&self) -> &str {
		&self.0
	}

	fn number(&self) -> Option<u64> {
		self.0.parse().ok()
	}
}

impl From<u64> for ComponentId {
	fn from(id: u64) -> Self {
		Self(id.to_string().into())
	}
}

impl From<&str> for ComponentId {
	fn from(id: &str) -> Self {
		Self(id.into())
	}
}

impl From<String> for ComponentId {
	fn from(id: String) -> Self {
		Self(id.into())
	}
}

impl Display for ComponentId {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl Ord for ComponentId {
	fn cmp(&self, other: &Self) -> Ordering {
		match (self.number(), other.number()) {
			(Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
			(Some(_), None) => Ordering::Less,
			(None, Some(_)) => Ordering::Greater,
			(None, None) => self.0.cmp(&other.0),
		}
	}
}

impl PartialOrd for ComponentId {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

/// A node's template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Statics {
	Fragments(Fragments),
	/// Only valid on a component root in a [`Diff`]. Replaced with the target's fragments while merging.
	Ref(StaticsRef),
}

/// Points at the component whose template a component shares.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StaticsRef {
	/// Looked up in the same diff first, then among the components already in the tree.
	Component(ComponentId),
	/// Only looked up among the components already in the tree.
	Settled(ComponentId),
}

impl StaticsRef {
	#[must_use]
	pub fn target(&self) -> &ComponentId {
		match self {
			StaticsRef::Component(id) | StaticsRef::Settled(id) => id,
		}
	}
}

impl Display for StaticsRef {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			StaticsRef::Component(id) => write!(f, "component {}", id),
			StaticsRef::Settled(id) => write!(f, "settled component {}", id),
		}
	}
}

impl Statics {
	/// Creates concrete statics from literal fragments.
	pub fn fragments<I>(fragments: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<String>,
	{
		Statics::Fragments(fragments.into_iter().map(Into::into).collect())
	}

	/// An empty fragment list announces nothing. References are never empty.
	#[must_use]
	pub fn is_empty(&self) -> bool {
		match self {
			Statics::Fragments(fragments) => fragments.is_empty(),
			Statics::Ref(_) => false,
		}
	}

	#[must_use]
	pub fn as_fragments(&self) -> Option<&Fragments> {
		match self {
			Statics::Fragments(fragments) => Some(fragments),
			Statics::Ref(_) => None,
		}
	}
}

/// One dynamic value.
#[derive(Clone, Debug, PartialEq)]
pub enum Slot {
	Text(String),
	Node(Box<Node>),
	Comprehension(Box<Comprehension>),
	/// Rendered from the tree's component map.
	Component(ComponentId),
}

impl From<&str> for Slot {
	fn from(text: &str) -> Self {
		Slot::Text(text.to_owned())
	}
}

impl From<String> for Slot {
	fn from(text: String) -> Self {
		Slot::Text(text)
	}
}

impl From<Node> for Slot {
	fn from(node: Node) -> Self {
		Slot::Node(Box::new(node))
	}
}

impl From<Comprehension> for Slot {
	fn from(comprehension: Comprehension) -> Self {
		Slot::Comprehension(Box::new(comprehension))
	}
}

impl From<ComponentId> for Slot {
	fn from(id: ComponentId) -> Self {
		Slot::Component(id)
	}
}

/// A template with numbered dynamic values.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Node {
	pub statics: Option<Statics>,
	pub slots: BTreeMap<usize, Slot>,
	pub metadata: Metadata,
}

impl Node {
	/// A node with concrete statics and no slots yet.
	pub fn new<I>(fragments: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<String>,
	{
		Self {
			statics: Some(Statics::fragments(fragments)),
			..Self::default()
		}
	}

	/// A node without statics, as found in diffs that only update values.
	#[must_use]
	pub fn patch() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn with_slot(mut self, index: usize, slot: impl Into<Slot>) -> Self {
		self.slots.insert(index, slot.into());
		self
	}

	#[must_use]
	pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
		self.metadata.insert(key.into(), value);
		self
	}

	#[must_use]
	pub fn with_statics(mut self, statics: Statics) -> Self {
		self.statics = Some(statics);
		self
	}

	/// Whether this node announces a template of its own, see [`is_new_fingerprint`](`crate::fingerprint::is_new_fingerprint`).
	#[must_use]
	pub fn has_new_fingerprint(&self) -> bool {
		self.statics.as_ref().map_or(false, |statics| !statics.is_empty())
	}

	#[must_use]
	pub fn fragments(&self) -> Option<&Fragments> {
		self.statics.as_ref().and_then(Statics::as_fragments)
	}
}

/// A repeated block: every tuple in `dynamics` is rendered against the same statics.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Comprehension {
	pub statics: Option<Statics>,
	pub dynamics: Vec<Vec<Slot>>,
}

impl Comprehension {
	pub fn new<I>(fragments: I) -> Self
	where
		I: IntoIterator,
		I::Item: Into<String>,
	{
		Self {
			statics: Some(Statics::fragments(fragments)),
			dynamics: Vec::new(),
		}
	}

	/// New tuples for an existing comprehension, keeping its statics.
	#[must_use]
	pub fn patch(dynamics: Vec<Vec<Slot>>) -> Self {
		Self { statics: None, dynamics }
	}

	#[must_use]
	pub fn with_tuple(mut self, tuple: Vec<Slot>) -> Self {
		self.dynamics.push(tuple);
		self
	}

	#[must_use]
	pub fn has_new_fingerprint(&self) -> bool {
		self.statics.as_ref().map_or(false, |statics| !statics.is_empty())
	}
}

/// An incremental update, or the mount payload a view starts from.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Diff {
	pub root: Node,
	pub components: BTreeMap<ComponentId, Node>,
}

impl Diff {
	/// Ids of the components this diff touches, in ascending order.
	pub fn component_ids(&self) -> impl '_ + Iterator<Item = &ComponentId> {
		self.components.keys()
	}

	/// Whether the diff leaves the root node alone and only updates components.
	#[must_use]
	pub fn is_component_only(&self) -> bool {
		!self.components.is_empty() && self.root.statics.is_none() && self.root.slots.is_empty() && self.root.metadata.is_empty()
	}
}

/// The settled rendering of a view.
///
/// Only changed through [`merge_diff`](`crate::merge::merge_diff`) and [`prune_components`](`crate::merge::prune_components`),
/// which keep every template concrete and component templates interned.
#[derive(Debug, Default)]
pub struct Tree {
	pub(crate) root: Node,
	pub(crate) components: HashMap<ComponentId, Node>,
	pub(crate) interner: Interner,
	pub(crate) visiting: TempSet<ComponentId>,
}

impl Tree {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn root(&self) -> &Node {
		&self.root
	}

	#[must_use]
	pub fn component(&self, id: &ComponentId) -> Option<&Node> {
		self.components.get(id)
	}

	/// All components in ascending id order.
	#[must_use]
	pub fn components(&self) -> BTreeMap<&ComponentId, &Node> {
		self.components.iter().collect()
	}

	#[must_use]
	pub fn component_count(&self) -> usize {
		self.components.len()
	}

	/// Number of distinct component templates currently held.
	#[must_use]
	pub fn interned_templates(&self) -> usize {
		self.interner.len()
	}
}
