//! Reconstructs text from a settled [`Tree`].
//!
//! A node with statics `[s0, s1, …, sn]` renders as `s0`, slot 0, `s1`, …, slot n-1, `sn`.
//! A comprehension renders each of its tuples against its own statics, back to back.
//! Component references render the referenced component.

use crate::{
	error::RenderError,
	load::DYNAMICS,
	node::{ComponentId, Comprehension, Fragments, Node, Slot, Statics, Tree},
	path::{Path, Segment},
};
use hashbrown::HashMap;
use tracing::{error, instrument, trace, trace_span};

/// Renders the whole tree.
///
/// # Errors
///
/// Iff a template is missing, unresolved or doesn't fit its values, a referenced component doesn't exist,
/// or the nesting exceeds `depth_limit`. Nothing is rendered partially.
#[instrument(skip(tree))]
pub fn render(tree: &Tree, depth_limit: usize) -> Result<String, RenderError> {
	let mut renderer = Renderer::new(&tree.components);
	renderer.node(tree.root(), depth_limit)?;
	Ok(renderer.output)
}

/// Renders a single component of the tree.
///
/// # Errors
///
/// As [`render`], and if there's no component with this `id`.
#[instrument(skip(tree))]
pub fn render_component(tree: &Tree, id: &ComponentId, depth_limit: usize) -> Result<String, RenderError> {
	let mut renderer = Renderer::new(&tree.components);
	renderer.component(id, depth_limit)?;
	Ok(renderer.output)
}

struct Renderer<'a> {
	components: &'a HashMap<ComponentId, Node>,
	output: String,
	path: Path,
}

impl<'a> Renderer<'a> {
	fn new(components: &'a HashMap<ComponentId, Node>) -> Self {
		Self {
			components,
			output: String::new(),
			path: Path::new(),
		}
	}

	fn within(&mut self, segment: Segment, f: impl FnOnce(&mut Self) -> Result<(), RenderError>) -> Result<(), RenderError> {
		self.path.push(segment);
		f(self)?;
		self.path.pop();
		Ok(())
	}

	fn check_depth(&self, depth_limit: usize) -> Result<(), RenderError> {
		if depth_limit == 0 {
			error!(path = %self.path, "Depth limit reached");
			return Err(RenderError::DepthLimit { path: self.path.to_string() });
		}
		Ok(())
	}

	fn fragments<'n>(&self, statics: Option<&'n Statics>) -> Result<&'n Fragments, RenderError> {
		match statics {
			Some(Statics::Fragments(fragments)) => Ok(fragments),
			Some(Statics::Ref(target)) => {
				error!(path = %self.path, "Unresolved statics reference to {}", target);
				Err(RenderError::UnresolvedStatics {
					path: self.path.to_string(),
					target: target.clone(),
				})
			}
			None => Err(RenderError::MissingStatics { path: self.path.to_string() }),
		}
	}

	fn check_arity(&self, fragments: &Fragments, dynamics: usize) -> Result<(), RenderError> {
		if fragments.len() == dynamics + 1 {
			Ok(())
		} else {
			Err(RenderError::ArityMismatch {
				path: self.path.to_string(),
				statics: fragments.len(),
				dynamics,
			})
		}
	}

	fn node(&mut self, node: &Node, depth_limit: usize) -> Result<(), RenderError> {
		self.check_depth(depth_limit)?;
		let fragments = self.fragments(node.statics.as_ref())?;
		self.check_arity(fragments, node.slots.len())?;

		self.output.push_str(&fragments[0]);
		for (index, fragment) in fragments[1..].iter().enumerate() {
			let slot = match node.slots.get(&index) {
				Some(slot) => slot,
				None => {
					return Err(RenderError::MissingSlot {
						path: self.path.to_string(),
						index,
					})
				}
			};
			self.within(Segment::Slot(index), |this| this.slot(slot, depth_limit - 1))?;
			self.output.push_str(fragment);
		}
		Ok(())
	}

	fn slot(&mut self, slot: &Slot, depth_limit: usize) -> Result<(), RenderError> {
		match slot {
			Slot::Text(text) => {
				self.output.push_str(text);
				Ok(())
			}
			Slot::Node(node) => self.node(node, depth_limit),
			Slot::Comprehension(comprehension) => self.comprehension(comprehension, depth_limit),
			Slot::Component(id) => self.component(id, depth_limit),
		}
	}

	fn comprehension(&mut self, comprehension: &Comprehension, depth_limit: usize) -> Result<(), RenderError> {
		self.check_depth(depth_limit)?;
		if comprehension.dynamics.is_empty() {
			trace!("Empty comprehension.");
			return Ok(());
		}

		let span = trace_span!("Rendering comprehension", tuples = comprehension.dynamics.len());
		let _enter = span.enter();

		let fragments = self.fragments(comprehension.statics.as_ref())?;
		self.within(Segment::Key(DYNAMICS.to_owned()), |this| {
			for (i, tuple) in comprehension.dynamics.iter().enumerate() {
				this.within(Segment::Index(i), |this| {
					this.check_arity(fragments, tuple.len())?;
					this.output.push_str(&fragments[0]);
					for (j, (value, fragment)) in tuple.iter().zip(fragments[1..].iter()).enumerate() {
						this.within(Segment::Index(j), |this| this.slot(value, depth_limit - 1))?;
						this.output.push_str(fragment);
					}
					Ok(())
				})?;
			}
			Ok(())
		})
	}

	fn component(&mut self, id: &ComponentId, depth_limit: usize) -> Result<(), RenderError> {
		self.check_depth(depth_limit)?;
		let components = self.components;
		let component = match components.get(id) {
			Some(component) => component,
			None => {
				error!(path = %self.path, "Missing component {}", id);
				return Err(RenderError::MissingComponent {
					path: self.path.to_string(),
					component: id.clone(),
				});
			}
		};

		let span = trace_span!("Rendering component", %id);
		let _enter = span.enter();
		self.within(Segment::Component(id.clone()), |this| this.node(component, depth_limit - 1))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::node::StaticsRef;

	#[test]
	fn unresolved_reference_is_reported() {
		let mut tree = Tree::new();
		tree.components.insert(
			ComponentId::from(1),
			Node::patch().with_statics(Statics::Ref(StaticsRef::Component(ComponentId::from(2)))),
		);
		tree.root = Node::new(["<div>", "</div>"]).with_slot(0, ComponentId::from(1));

		assert_eq!(
			render(&tree, 8),
			Err(RenderError::UnresolvedStatics {
				path: "0.c.1".to_owned(),
				target: StaticsRef::Component(ComponentId::from(2)),
			})
		);
	}
}
