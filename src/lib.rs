//! Merges incremental rendered-template diffs into a persistent tree and stringifies it back to HTML.
//!
//! A server keeps a template tree per view and sends compact diffs of it: a template ("statics") is sent once, after
//! that only the dynamic values that changed. [`Rendered`] keeps the merged state of one view and reconstructs its text.
//! See the [`merge`] module for how diffs apply.

#![doc(html_root_url = "https://docs.rs/live-rendered/0.1.0")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod error;
pub mod fingerprint;
mod intern;
pub mod load;
pub mod merge;
pub mod node;
pub mod path;
mod rc_hash_map;
pub mod render;
mod rendered;
mod resolve;
mod temp_set;

pub use error::{DiffError, MergeError, RenderError, Unresolvable};
pub use fingerprint::is_new_fingerprint;
pub use node::{Comprehension, ComponentId, Diff, Fragments, Node, Slot, Statics, StaticsRef, Tree};
pub use rendered::Rendered;

/// How deeply nodes, comprehensions and component references may nest by default when rendering.
pub const DEFAULT_DEPTH_LIMIT: usize = 512;

/// Text values as they may appear in log events.
#[allow(clippy::non_ascii_literal)]
fn loggable(text: &str) -> &str {
	if cfg!(feature = "dangerous-logging") {
		text
	} else {
		"…"
	}
}
