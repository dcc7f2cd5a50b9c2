use crate::{
	error::{MergeError, RenderError},
	fingerprint,
	load::{self, store_tree},
	merge,
	node::{ComponentId, Diff, Node, Tree},
	render, DEFAULT_DEPTH_LIMIT,
};
use serde_json::Value;
use tracing::{debug_span, info};

/// The rendered state of one view.
///
/// Created from the view's mount diff, then updated with each further diff in the order the server sent them.
///
/// # Correct Use
///
/// Diffs carry no sequence numbers. Applying them out of order is not detected.
///
/// A failed [`merge_diff`](`Rendered::merge_diff`) leaves the tree as it was. Recovering, for example by requesting a
/// fresh mount, is up to the caller.
#[derive(Debug)]
pub struct Rendered {
	view_id: String,
	tree: Tree,
	depth_limit: usize,
}

impl Rendered {
	/// # Errors
	///
	/// Iff `mount` is malformed or its components' statics can't be resolved.
	pub fn new(view_id: impl Into<String>, mount: Value) -> Result<Self, MergeError> {
		Self::from_diff(view_id, load::load_diff(mount)?)
	}

	/// # Errors
	///
	/// Iff the components' statics can't be resolved.
	pub fn from_diff(view_id: impl Into<String>, mount: Diff) -> Result<Self, MergeError> {
		let view_id = view_id.into();
		let span = debug_span!("Mounting", %view_id);
		let _enter = span.enter();

		let mut tree = Tree::new();
		merge::merge_diff(&mut tree, mount)?;
		info!("Mounted with {} component(s).", tree.component_count());
		Ok(Self {
			view_id,
			tree,
			depth_limit: DEFAULT_DEPTH_LIMIT,
		})
	}

	/// Limits how deeply nodes, comprehensions and component references may nest when rendering.
	#[must_use]
	pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
		self.depth_limit = depth_limit;
		self
	}

	#[must_use]
	pub fn view_id(&self) -> &str {
		&self.view_id
	}

	/// Decodes and merges the next diff.
	///
	/// # Errors
	///
	/// Iff `diff` is malformed or a statics reference can't be resolved. The tree is unchanged then.
	pub fn merge_diff(&mut self, diff: Value) -> Result<(), MergeError> {
		self.merge(load::load_diff(diff)?)
	}

	/// Merges the next, already decoded diff.
	///
	/// # Errors
	///
	/// Iff a statics reference can't be resolved. The tree is unchanged then.
	pub fn merge(&mut self, diff: Diff) -> Result<(), MergeError> {
		let span = debug_span!("Merging", view_id = %self.view_id);
		let _enter = span.enter();
		merge::merge_diff(&mut self.tree, diff)
	}

	/// The current tree.
	#[must_use]
	pub fn get(&self) -> &Tree {
		&self.tree
	}

	/// The current tree in the wire format.
	#[must_use]
	pub fn to_value(&self) -> Value {
		store_tree(&self.tree)
	}

	/// # Errors
	///
	/// See [`render::render`].
	pub fn render(&self) -> Result<String, RenderError> {
		let span = debug_span!("Rendering", view_id = %self.view_id);
		let _enter = span.enter();
		render::render(&self.tree, self.depth_limit)
	}

	/// # Errors
	///
	/// See [`render::render_component`].
	pub fn component_to_string(&self, id: &ComponentId) -> Result<String, RenderError> {
		let span = debug_span!("Rendering", view_id = %self.view_id);
		let _enter = span.enter();
		render::render_component(&self.tree, id, self.depth_limit)
	}

	/// Drops components the server destroyed. Returns how many were present.
	pub fn prune_components<I>(&mut self, ids: I) -> usize
	where
		I: IntoIterator<Item = ComponentId>,
	{
		let span = debug_span!("Pruning", view_id = %self.view_id);
		let _enter = span.enter();
		merge::prune_components(&mut self.tree, ids)
	}

	#[must_use]
	pub fn component_count(&self) -> usize {
		self.tree.component_count()
	}

	/// See [`fingerprint::is_new_fingerprint`].
	#[must_use]
	#[allow(clippy::unused_self)] // Mirrors the client API, where this is a method of the rendered view.
	pub fn is_new_fingerprint(&self, diff: Option<&Node>) -> bool {
		fingerprint::is_new_fingerprint(diff)
	}
}
