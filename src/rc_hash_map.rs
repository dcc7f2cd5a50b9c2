use core::{borrow::Borrow, hash::Hash};
use hashbrown::{hash_map::Entry, HashMap};
use num_traits::{CheckedAdd, CheckedSub, One, Zero};

/// A [`HashMap`] with a use count per entry.
///
/// Entries whose count reaches zero stay in place (and can be revived by [`RcHashMap::increment_or_insert_with`])
/// until [`RcHashMap::prune_weak`] removes them.
#[derive(Debug)]
#[allow(clippy::len_without_is_empty)] // Sized for statistics only.
pub struct RcHashMap<K, C, V>(HashMap<K, (C, V)>);

impl<K, C, V> Default for RcHashMap<K, C, V> {
	fn default() -> Self {
		Self(HashMap::new())
	}
}

impl<K: Hash + Eq, C: CheckedAdd + CheckedSub + One + Zero, V> RcHashMap<K, C, V> {
	/// Counts one more use of `key`, inserting `value()` with a count of one if it's not present yet.
	///
	/// # Errors
	///
	/// Iff the count can't grow any further. The entry is unchanged then.
	pub fn increment_or_insert_with(&mut self, key: K, value: impl FnOnce() -> V) -> Result<&mut V, CountSaturatedError> {
		match self.0.entry(key) {
			Entry::Occupied(occupied) => {
				let (count, value) = occupied.into_mut();
				*count = count.checked_add(&C::one()).ok_or(CountSaturatedError)?;
				Ok(value)
			}
			Entry::Vacant(vacant) => Ok(&mut vacant.insert((C::one(), value())).1),
		}
	}

	/// Counts one use of `key` less without removing it. `Ok(None)` iff there is no such entry.
	///
	/// # Errors
	///
	/// Iff the count already is zero.
	pub fn weak_decrement<Q>(&mut self, key: &Q) -> Result<Option<&mut V>, CountSaturatedError>
	where
		K: Borrow<Q>,
		Q: ?Sized + Hash + Eq,
	{
		let (count, value) = match self.0.get_mut(key) {
			Some(entry) => entry,
			None => return Ok(None),
		};
		*count = count.checked_sub(&C::one()).ok_or(CountSaturatedError)?;
		Ok(Some(value))
	}

	/// Removes every entry with a count of zero. Returns how many were removed.
	pub fn prune_weak(&mut self) -> usize {
		let before = self.0.len();
		self.0.retain(|_, (count, _)| !count.is_zero());
		before - self.0.len()
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn capacity(&self) -> usize {
		self.0.capacity()
	}
}

/// A use count would over- or underflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountSaturatedError;
