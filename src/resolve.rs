//! Resolution of shared component templates.
//!
//! A component diff may announce its template as a [`StaticsRef`] to another component instead of sending fragments.
//! Chains of such references are followed to a component with concrete fragments, within the same diff or into the
//! components already in the tree. The referencing component then starts from a copy of its resolved target, so
//! nested templates the diff leaves out are shared as well, and keeps the concrete fragments from then on.
//!
//! Everything here works on a staging map. The tree is only touched once all components of a diff are resolved,
//! so a chain that ends in a missing component or a cycle fails the merge without changing anything.

use crate::{
	error::{MergeError, Unresolvable},
	merge::merge_node,
	node::{ComponentId, Node, Statics, StaticsRef},
};
use hashbrown::{HashMap, HashSet};
use std::collections::BTreeMap;
use tracing::{error, trace, trace_span};

/// A component diff ready to be applied.
#[derive(Debug)]
pub enum Staged {
	/// A complete component with a concrete template, replacing any previous one.
	Replace(Node),
	/// Values to merge into the component as it is.
	Patch(Node),
}

/// Resolves the statics of all `incoming` components against each other and the `settled` ones.
pub fn stage(
	settled: &HashMap<ComponentId, Node>,
	incoming: BTreeMap<ComponentId, Node>,
	visiting: &mut HashSet<ComponentId>,
) -> Result<BTreeMap<ComponentId, Staged>, MergeError> {
	let mut stager = Stager {
		settled,
		pending: incoming,
		staged: BTreeMap::new(),
		visiting,
	};
	while let Some(id) = stager.pending.keys().next().cloned() {
		let chain = stager.chain_from(id)?;
		for id in chain.iter().rev() {
			stager.settle(id)?;
		}
	}
	Ok(stager.staged)
}

struct Stager<'a> {
	settled: &'a HashMap<ComponentId, Node>,
	pending: BTreeMap<ComponentId, Node>,
	staged: BTreeMap<ComponentId, Staged>,
	visiting: &'a mut HashSet<ComponentId>,
}

impl Stager<'_> {
	/// Follows references between pending components, starting at `id`, up to the first one whose target is staged
	/// already, lies outside this diff or has no reference at all.
	///
	/// Staging the result back to front means every target is staged before the components that point at it.
	fn chain_from(&mut self, id: ComponentId) -> Result<Vec<ComponentId>, MergeError> {
		self.visiting.clear();
		self.visiting.insert(id.clone());
		let mut chain = vec![id];
		loop {
			let current = &chain[chain.len() - 1];
			let target = match self.pending.get(current).and_then(|diff| diff.statics.as_ref()) {
				Some(Statics::Ref(StaticsRef::Component(target))) => target,
				_ => return Ok(chain),
			};

			if self.visiting.contains(target) {
				let start = chain.iter().position(|visited| visited == target).unwrap_or(0);
				let mut cycle = chain[start..].to_vec();
				cycle.push(target.clone());
				return Err(unresolvable(current, Unresolvable::Cycle(cycle)));
			}
			if !self.pending.contains_key(target) {
				return Ok(chain);
			}

			let target = target.clone();
			self.visiting.insert(target.clone());
			chain.push(target);
		}
	}

	/// Stages `id` if it's still pending. The target of its reference must not be pending anymore.
	fn settle(&mut self, id: &ComponentId) -> Result<(), MergeError> {
		let diff = match self.pending.remove(id) {
			Some(diff) => diff,
			None => return Ok(()),
		};

		let span = trace_span!("Staging component", %id);
		let _enter = span.enter();

		let reference = match &diff.statics {
			Some(Statics::Ref(reference)) => Some(reference.clone()),
			_ => None,
		};

		let staged = if let Some(reference) = reference {
			let mut node = self.target(id, &reference)?;
			trace!("Sharing statics through {}.", reference);
			let mut diff = diff;
			diff.statics = None;
			merge_node(&mut node, diff);
			Staged::Replace(node)
		} else if diff.has_new_fingerprint() {
			Staged::Replace(diff)
		} else {
			Staged::Patch(diff)
		};

		self.staged.insert(id.clone(), staged);
		Ok(())
	}

	/// A copy of the component `reference` points at, with concrete statics.
	fn target(&self, id: &ComponentId, reference: &StaticsRef) -> Result<Node, MergeError> {
		let target = reference.target();
		let node = match reference {
			StaticsRef::Settled(_) => self.settled.get(target).cloned(),
			StaticsRef::Component(_) => self.staged_or_settled(target),
		};

		match node {
			Some(node) if node.fragments().map_or(false, |fragments| !fragments.is_empty()) => Ok(node),
			Some(_) => Err(unresolvable(id, Unresolvable::NoStatics(target.clone()))),
			None => Err(unresolvable(id, Unresolvable::Missing(target.clone()))),
		}
	}

	fn staged_or_settled(&self, id: &ComponentId) -> Option<Node> {
		match self.staged.get(id) {
			Some(Staged::Replace(node)) => Some(node.clone()),
			Some(Staged::Patch(diff)) => match self.settled.get(id) {
				Some(current) => {
					let mut node = current.clone();
					merge_node(&mut node, diff.clone());
					Some(node)
				}
				None => Some(diff.clone()),
			},
			None => self.settled.get(id).cloned(),
		}
	}
}

fn unresolvable(component: &ComponentId, cause: Unresolvable) -> MergeError {
	error!(%component, "Unresolvable statics: {}", cause);
	MergeError::UnresolvableStatics {
		component: component.clone(),
		cause,
	}
}
