use core::hash::Hash;
use hashbrown::HashSet;

/// Scratch set whose allocation is kept between merges.
#[derive(Debug)]
pub struct TempSet<T>(HashSet<T>);
impl<T> Default for TempSet<T> {
	fn default() -> Self {
		Self(HashSet::new())
	}
}
impl<T: Eq + Hash> TempSet<T> {
	/// Borrows the set, empty.
	pub fn temp(&mut self) -> &mut HashSet<T> {
		// Cleared before each borrow, so nothing can leak between them even if a merge bailed out early.
		self.0.clear();
		&mut self.0
	}

	/// Retrieves the cache set's capacity without clearing it first.
	pub fn capacity(&self) -> usize {
		self.0.capacity()
	}
}
