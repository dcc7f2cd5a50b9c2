//! Whether a diff swaps a template.
//!
//! A diff node that carries non-empty statics announces a new fingerprint: whatever was rendered from the previous
//! template is replaced as a whole. DOM reconcilers use this to choose between replacing and patching.

use crate::{load::STATICS, node::Node};
use serde_json::Value;

/// `true` iff `diff` is present and carries non-empty statics.
#[must_use]
pub fn is_new_fingerprint(diff: Option<&Node>) -> bool {
	diff.map_or(false, Node::has_new_fingerprint)
}

/// As [`is_new_fingerprint`], on a diff that wasn't decoded yet.
#[must_use]
pub fn is_new_fingerprint_value(diff: Option<&Value>) -> bool {
	match diff.and_then(|diff| diff.get(STATICS)) {
		Some(Value::Array(fragments)) => !fragments.is_empty(),
		Some(Value::Number(_)) => true,
		Some(Value::String(id)) => !id.is_empty(),
		_ => false,
	}
}
