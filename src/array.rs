use std::fmt;
use std::mem::{align_of, size_of};
use std::ptr::NonNull;
use std::slice;

use crate::memory::{grow_capacity, reallocate, AllocError};

/// Growable array of `Copy` elements whose storage goes through [`reallocate`].
///
/// Capacity runs 0, 8, 16, 32, ... and never shrinks except through [`DynArray::free`].
pub struct DynArray<T: Copy> {
	ptr: Option<NonNull<T>>,
	count: usize,
	capacity: usize,
}

impl<T: Copy> DynArray<T> {
	pub const fn new() -> Self {
		DynArray {
			ptr: None,
			count: 0,
			capacity: 0,
		}
	}

	pub fn len(&self) -> usize {
		self.count
	}

	pub fn is_empty(&self) -> bool {
		self.count == 0
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Makes sure the next `additional` pushes will not need to allocate.
	///
	/// Capacity still moves along 8, 16, 32, ... but is reached with a single
	/// reallocation. On failure count, capacity and contents are untouched.
	pub fn reserve(&mut self, additional: usize) -> Result<(), AllocError> {
		let overflow = AllocError { requested: usize::MAX, align: align_of::<T>() };

		let needed = self.count.checked_add(additional).ok_or(overflow)?;
		if needed <= self.capacity {
			return Ok(());
		}

		let mut new_capacity = grow_capacity(self.capacity);
		while new_capacity < needed {
			new_capacity = new_capacity.checked_mul(2).ok_or(overflow)?;
		}
		let new_size = size_of::<T>().checked_mul(new_capacity).ok_or(overflow)?;

		// SAFETY: `ptr` is either `None` or the block we got back last time, sized for
		// `capacity` elements of `T`.
		let ptr = unsafe {
			reallocate(
				self.ptr.map(NonNull::cast),
				size_of::<T>() * self.capacity,
				new_size,
				align_of::<T>(),
			)?
		};
		self.ptr = ptr.map(NonNull::cast);
		self.capacity = new_capacity;
		Ok(())
	}

	pub fn push(&mut self, value: T) -> Result<(), AllocError> {
		self.reserve(1)?;
		// SAFETY: reserve guarantees `count < capacity`.
		unsafe { self.base().add(self.count).write(value) };
		self.count += 1;
		Ok(())
	}

	pub fn get(&self, index: usize) -> Option<T> {
		self.as_slice().get(index).copied()
	}

	pub fn as_slice(&self) -> &[T] {
		// SAFETY: the first `count` elements were initialized by `push`.
		unsafe { slice::from_raw_parts(self.base(), self.count) }
	}

	pub fn iter(&self) -> slice::Iter<'_, T> {
		self.as_slice().iter()
	}

	/// Releases the backing storage. The array is empty with capacity 0 afterwards.
	pub fn free(&mut self) {
		// SAFETY: same block and size we allocated; a zero-sized request only frees.
		let released = unsafe {
			reallocate(
				self.ptr.take().map(NonNull::cast),
				size_of::<T>() * self.capacity,
				0,
				align_of::<T>(),
			)
		};
		debug_assert_eq!(released, Ok(None));
		self.count = 0;
		self.capacity = 0;
	}

	fn base(&self) -> *mut T {
		self.ptr.unwrap_or(NonNull::dangling()).as_ptr()
	}
}

impl<T: Copy> Default for DynArray<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: Copy> Drop for DynArray<T> {
	fn drop(&mut self) {
		self.free();
	}
}

impl<T: Copy + fmt::Debug> fmt::Debug for DynArray<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_list().entries(self.iter()).finish()
	}
}

impl<'a, T: Copy> IntoIterator for &'a DynArray<T> {
	type Item = &'a T;
	type IntoIter = slice::Iter<'a, T>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::value::Value;

	fn capacities<T: Copy>(mut array: DynArray<T>, value: T, pushes: usize) -> Vec<usize> {
		let mut seen = vec![];
		for _ in 0..pushes {
			array.push(value).unwrap();
			if seen.last() != Some(&array.capacity()) {
				seen.push(array.capacity());
			}
		}
		seen
	}

	#[test]
	fn capacity_doubles_from_eight_for_every_element_type() {
		let expected = vec![8, 16, 32, 64];
		assert_eq!(capacities(DynArray::<u8>::new(), 7, 64), expected);
		assert_eq!(capacities(DynArray::<u32>::new(), 7, 64), expected);
		assert_eq!(capacities(DynArray::<Value>::new(), Value(7.0), 64), expected);
	}

	#[test]
	fn count_never_exceeds_capacity() {
		let mut array = DynArray::new();
		assert_eq!(array.capacity(), 0);
		for i in 0..100u32 {
			array.push(i).unwrap();
			assert!(array.len() <= array.capacity());
		}
		assert_eq!(array.len(), 100);
		assert_eq!(array.get(42), Some(42));
		assert_eq!(array.get(100), None);
	}

	#[test]
	fn contents_survive_growth() {
		let mut array = DynArray::new();
		for i in 0..20u8 {
			array.push(i).unwrap();
		}
		assert_eq!(array.as_slice(), (0..20).collect::<Vec<u8>>().as_slice());
	}

	#[test]
	fn reserve_grows_along_the_doubling_sequence() {
		let mut array = DynArray::new();
		for i in 0..7u8 {
			array.push(i).unwrap();
		}
		array.reserve(2).unwrap();
		assert_eq!(array.capacity(), 16);
		array.reserve(30).unwrap();
		assert_eq!(array.capacity(), 64);
		assert_eq!(array.len(), 7);
		array.reserve(0).unwrap();
		assert_eq!(array.capacity(), 64);
	}

	#[test]
	fn unsatisfiable_growth_is_reported_and_changes_nothing() {
		// 8 * 2^60 bytes is a valid size computation but not a valid layout.
		let mut huge = DynArray::<[u8; 1 << 60]>::new();
		assert_eq!(
			huge.reserve(1),
			Err(AllocError { requested: 1 << 63, align: 1 })
		);
		assert_eq!((huge.len(), huge.capacity()), (0, 0));

		// 8 * 2^62 bytes does not even fit in a usize.
		let mut wider = DynArray::<[u8; 1 << 62]>::new();
		assert_eq!(
			wider.reserve(1),
			Err(AllocError { requested: usize::MAX, align: 1 })
		);
		assert_eq!((wider.len(), wider.capacity()), (0, 0));
	}

	#[test]
	fn failed_reserve_keeps_contents() {
		let mut array = DynArray::<u64>::new();
		array.push(1).unwrap();
		assert_eq!(
			array.reserve(usize::MAX),
			Err(AllocError { requested: usize::MAX, align: align_of::<u64>() })
		);

		// Fill to capacity, then ask for more than the address space holds.
		for i in 1..8 {
			array.push(i).unwrap();
		}
		assert_eq!(array.capacity(), 8);
		assert!(array.reserve(usize::MAX / 2).is_err());
		assert_eq!((array.len(), array.capacity()), (8, 8));
		assert_eq!(array.as_slice(), &[1, 1, 2, 3, 4, 5, 6, 7]);
	}

	#[test]
	fn free_resets_to_empty() {
		let mut array = DynArray::new();
		array.push(1.5f64).unwrap();
		array.free();
		assert!(array.is_empty());
		assert_eq!(array.capacity(), 0);
		assert_eq!(array.as_slice(), &[] as &[f64]);

		array.push(2.5).unwrap();
		assert_eq!(array.capacity(), 8);
		assert_eq!(array.get(0), Some(2.5));
	}
}
