//! Error types of decoding, merging and rendering.
//!
//! All of them are local to a single call: a failed merge leaves its tree as it was, and no error here affects other views.

use crate::node::{ComponentId, StaticsRef};
use thiserror::Error;

/// A diff that doesn't follow the wire format.
#[derive(Debug, Error)]
pub enum DiffError {
	#[error("malformed diff at `{path}`: {reason}")]
	Malformed { path: String, reason: String },
	#[error("diff is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),
}

/// A failed [`merge_diff`](`crate::merge::merge_diff`). The tree is unchanged.
#[derive(Debug, Error)]
pub enum MergeError {
	#[error(transparent)]
	Diff(#[from] DiffError),
	#[error("statics of component {component} cannot be resolved: {cause}")]
	UnresolvableStatics { component: ComponentId, cause: Unresolvable },
}

/// Why a statics reference chain doesn't end in concrete fragments.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Unresolvable {
	#[error("component {0} does not exist")]
	Missing(ComponentId),
	#[error("component {0} has no statics to share")]
	NoStatics(ComponentId),
	#[error("reference cycle {}", format_chain(.0))]
	Cycle(Vec<ComponentId>),
}

fn format_chain(chain: &[ComponentId]) -> String {
	chain.iter().map(ToString::to_string).collect::<Vec<_>>().join(" -> ")
}

/// A tree that can't be turned into text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum RenderError {
	#[error("statics at `{path}` still reference {target}; the tree was not produced by a merge")]
	UnresolvedStatics { path: String, target: StaticsRef },
	#[error("node at `{path}` has no statics")]
	MissingStatics { path: String },
	#[error("node at `{path}` has {statics} static fragment(s) for {dynamics} dynamic value(s)")]
	ArityMismatch { path: String, statics: usize, dynamics: usize },
	#[error("node at `{path}` has no value for slot {index}")]
	MissingSlot { path: String, index: usize },
	#[error("component {component} referenced at `{path}` does not exist")]
	MissingComponent { path: String, component: ComponentId },
	#[error("depth limit reached at `{path}`")]
	DepthLimit { path: String },
}
