//! Applies diffs to a [`Tree`].
//!
//! Per node, root included:
//!
//! - A node with a [new fingerprint](`crate::fingerprint`) replaces the current value wholesale.
//! - Text and component references replace the current value.
//! - Two nodes without a template change merge slot by slot. Slots the diff doesn't mention are kept.
//! - Values of different shapes are never merged, the incoming one wins.
//! - A comprehension's tuples are replaced as a whole. Its statics are kept unless the diff brings new ones.
//! - Metadata is overwritten key by key.

use crate::{
	error::{DiffError, MergeError},
	load::DYNAMICS,
	loggable,
	node::{ComponentId, Diff, Node, Slot, Statics, Tree},
	path::{Path, Segment},
	resolve::{self, Staged},
};
use hashbrown::hash_map::Entry;
use std::collections::btree_map;
use tracing::{debug, instrument, trace, trace_span, warn};

/// Merges `diff` into `tree`.
///
/// # Errors
///
/// Iff a component's statics reference can't be resolved, or `diff` has a statics reference anywhere but on a component
/// root. `tree` is unchanged in that case.
#[instrument(skip(tree, diff), fields(components = diff.components.len()))]
pub fn merge_diff(tree: &mut Tree, diff: Diff) -> Result<(), MergeError> {
	let mut path = Path::new();
	check_refs(&diff.root, false, &mut path)?;
	for (id, component) in &diff.components {
		path.push(Segment::Component(id.clone()));
		check_refs(component, true, &mut path)?;
		path.pop();
	}

	let Diff { root, components } = diff;
	let staged = resolve::stage(&tree.components, components, tree.visiting.temp())?;

	merge_node(&mut tree.root, root);

	for (id, staged) in staged {
		let span = trace_span!("Committing component", %id);
		let _enter = span.enter();
		commit(tree, id, staged);
	}

	tree.interner.collect();
	debug!(
		"Component count/interned templates/cached capacity: {}/{}/{}",
		tree.components.len(),
		tree.interner.len(),
		tree.interner.capacity()
	);
	debug!("Resolution scratch capacity: {}", tree.visiting.capacity());
	Ok(())
}

fn check_refs(node: &Node, component_root: bool, path: &mut Path) -> Result<(), DiffError> {
	if !component_root {
		check_statics(node.statics.as_ref(), path)?;
	}
	for (index, slot) in &node.slots {
		path.push(Segment::Slot(*index));
		check_slot_refs(slot, path)?;
		path.pop();
	}
	Ok(())
}

fn check_slot_refs(slot: &Slot, path: &mut Path) -> Result<(), DiffError> {
	match slot {
		Slot::Node(node) => check_refs(node, false, path),
		Slot::Comprehension(comprehension) => {
			check_statics(comprehension.statics.as_ref(), path)?;
			path.push(Segment::Key(DYNAMICS.to_owned()));
			for (i, tuple) in comprehension.dynamics.iter().enumerate() {
				for (j, value) in tuple.iter().enumerate() {
					path.push(Segment::Index(i));
					path.push(Segment::Index(j));
					check_slot_refs(value, path)?;
					path.pop();
					path.pop();
				}
			}
			path.pop();
			Ok(())
		}
		Slot::Text(_) | Slot::Component(_) => Ok(()),
	}
}

fn check_statics(statics: Option<&Statics>, path: &Path) -> Result<(), DiffError> {
	match statics {
		Some(Statics::Ref(reference)) => Err(DiffError::Malformed {
			path: path.to_string(),
			reason: format!("statics reference to {} outside of a component root", reference),
		}),
		_ => Ok(()),
	}
}

fn commit(tree: &mut Tree, id: ComponentId, staged: Staged) {
	match staged {
		Staged::Replace(mut node) => {
			if let Some(fragments) = node.fragments() {
				let shared = tree.interner.acquire(fragments);
				node.statics = Some(Statics::Fragments(shared));
			}
			if let Some(previous) = tree.components.insert(id, node) {
				trace!("Replaced previous template.");
				if let Some(fragments) = previous.fragments() {
					tree.interner.release(fragments);
				}
			}
		}
		Staged::Patch(diff) => match tree.components.entry(id) {
			Entry::Occupied(mut occupied) => merge_node(occupied.get_mut(), diff),
			Entry::Vacant(vacant) => {
				warn!("New component {} arrived without statics.", vacant.key());
				vacant.insert(diff);
			}
		},
	}
}

/// Merges `incoming` into `current`.
pub(crate) fn merge_node(current: &mut Node, incoming: Node) {
	if incoming.has_new_fingerprint() {
		trace!("New fingerprint. Replacing node.");
		*current = incoming;
		return;
	}

	let Node { statics: _, slots, metadata } = incoming;
	for (index, slot) in slots {
		let span = trace_span!("Merging slot", index);
		let _enter = span.enter();
		match current.slots.entry(index) {
			btree_map::Entry::Occupied(mut occupied) => merge_slot(occupied.get_mut(), slot),
			btree_map::Entry::Vacant(vacant) => {
				vacant.insert(slot);
			}
		}
	}
	current.metadata.extend(metadata);
}

fn merge_slot(current: &mut Slot, incoming: Slot) {
	match (current, incoming) {
		(Slot::Node(current), Slot::Node(incoming)) if !incoming.has_new_fingerprint() => merge_node(current, *incoming),
		(Slot::Comprehension(current), Slot::Comprehension(incoming)) if !incoming.has_new_fingerprint() => {
			trace!(from = current.dynamics.len(), to = incoming.dynamics.len(), "Replacing comprehension tuples.");
			current.dynamics = incoming.dynamics;
		}
		(current, Slot::Text(text)) => {
			trace!(text = loggable(&text), "Replacing with text.");
			*current = Slot::Text(text);
		}
		(current, incoming) => {
			trace!("Replacing value.");
			*current = incoming;
		}
	}
}

/// Removes components that were destroyed on the server and frees templates no other component uses.
///
/// Returns how many of the `ids` were present.
#[instrument(skip(tree, ids))]
pub fn prune_components<I>(tree: &mut Tree, ids: I) -> usize
where
	I: IntoIterator<Item = ComponentId>,
{
	let mut removed = 0;
	for id in ids {
		match tree.components.remove(&id) {
			Some(component) => {
				if let Some(fragments) = component.fragments() {
					tree.interner.release(fragments);
				}
				removed += 1;
			}
			None => debug!(%id, "Pruned component wasn't present."),
		}
	}
	tree.interner.collect();
	removed
}
