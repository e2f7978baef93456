// Copyright 2024 Irreducible, Inc

/// An index mapping dense integer IDs to optional values.
///
/// Lookups are a bounds check and a load, which makes it suitable for per-wire tables consulted
/// on the hot path.
#[derive(Debug, Clone)]
pub struct SparseIndex<T> {
	entries: Vec<Option<T>>,
}

// Equality ignores how far the storage has grown.
impl<T: Clone + PartialEq> PartialEq for SparseIndex<T> {
	fn eq(&self, other: &Self) -> bool {
		self.iter().eq(other.iter())
	}
}

impl<T: Clone + Eq> Eq for SparseIndex<T> {}

impl<T> Default for SparseIndex<T> {
	fn default() -> Self {
		Self {
			entries: Vec::new(),
		}
	}
}

impl<T: Clone> SparseIndex<T> {
	pub fn new(id_bound: usize) -> Self {
		Self {
			entries: vec![None; id_bound],
		}
	}

	pub fn get(&self, id: usize) -> Option<&T> {
		self.entries.get(id)?.as_ref()
	}

	pub fn contains(&self, id: usize) -> bool {
		self.get(id).is_some()
	}

	pub fn set(&mut self, id: usize, val: T) {
		if self.entries.len() <= id {
			self.entries.resize(id + 1, None);
		}
		self.entries[id] = Some(val);
	}

	/// Iterates over the occupied entries in ascending ID order.
	pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> + '_ {
		self.entries
			.iter()
			.enumerate()
			.filter_map(|(id, entry)| entry.as_ref().map(|val| (id, val)))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_set_grows_and_get() {
		let mut index = SparseIndex::<u32>::new(2);
		index.set(5, 7);
		index.set(1, 3);

		assert_eq!(index.get(0), None);
		assert_eq!(index.get(1), Some(&3));
		assert_eq!(index.get(5), Some(&7));
		assert_eq!(index.get(100), None);
		assert!(index.contains(5));
		assert_eq!(index.iter().collect::<Vec<_>>(), vec![(1, &3), (5, &7)]);
	}

	#[test]
	fn test_eq_ignores_capacity() {
		let mut grown = SparseIndex::<u32>::new(10);
		let mut tight = SparseIndex::default();
		grown.set(3, 1);
		tight.set(3, 1);
		assert_eq!(grown, tight);

		tight.set(4, 1);
		assert_ne!(grown, tight);
	}
}
