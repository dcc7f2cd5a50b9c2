//! Content-keyed table of component templates.
//!
//! Every component in a [`Tree`](`crate::node::Tree`) holds one count on its template.
//! Components with equal fragments hold the same allocation.

use crate::{
	node::Fragments,
	rc_hash_map::{CountSaturatedError, RcHashMap},
};
use std::sync::Arc;
use tracing::{trace, warn};

#[derive(Debug, Default)]
#[allow(clippy::len_without_is_empty)] // Only ever asked for its size in statistics.
pub struct Interner {
	templates: RcHashMap<Fragments, u32, Fragments>,
}

impl Interner {
	/// Counts a use of `fragments` and returns the shared allocation with the same content.
	pub fn acquire(&mut self, fragments: &Fragments) -> Fragments {
		match self.templates.increment_or_insert_with(Arc::clone(fragments), || Arc::clone(fragments)) {
			Ok(shared) => Arc::clone(shared),
			Err(CountSaturatedError) => {
				warn!("Template use count saturated. Leaving this use unshared.");
				Arc::clone(fragments)
			}
		}
	}

	/// Gives up one use of `fragments`. Returns whether that use was counted.
	///
	/// Empty templates announce nothing, so components holding one were never interned and are skipped.
	pub fn release(&mut self, fragments: &[String]) -> bool {
		if fragments.is_empty() {
			return false;
		}
		match self.templates.weak_decrement(fragments) {
			Ok(Some(_)) => true,
			Ok(None) => {
				warn!("Released a template that was never interned.");
				false
			}
			Err(CountSaturatedError) => {
				warn!("Released a template more often than it was acquired.");
				false
			}
		}
	}

	/// Frees templates no component uses anymore.
	pub fn collect(&mut self) -> usize {
		let freed = self.templates.prune_weak();
		trace!("Freed {} template(s).", freed);
		freed
	}

	pub fn len(&self) -> usize {
		self.templates.len()
	}

	pub fn capacity(&self) -> usize {
		self.templates.capacity()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fragments(fragments: &[&str]) -> Fragments {
		fragments.iter().map(|&fragment| fragment.to_owned()).collect()
	}

	#[test]
	fn equal_templates_share_one_allocation() {
		let mut interner = Interner::default();
		let first = interner.acquire(&fragments(&["<b>", "</b>"]));
		let second = interner.acquire(&fragments(&["<b>", "</b>"]));
		assert!(Arc::ptr_eq(&first, &second));
		assert_eq!(interner.len(), 1);

		assert!(interner.release(&first));
		assert_eq!(interner.collect(), 0);
		assert!(interner.release(&second));
		assert_eq!(interner.collect(), 1);
		assert_eq!(interner.len(), 0);
	}

	#[test]
	fn templates_that_were_never_acquired_are_not_released() {
		let mut interner = Interner::default();
		interner.acquire(&fragments(&["<i>", "</i>"]));

		assert!(!interner.release(&fragments(&[])));
		assert!(!interner.release(&fragments(&["<p>", "</p>"])));
		assert_eq!(interner.collect(), 0);
		assert_eq!(interner.len(), 1);
	}
}
