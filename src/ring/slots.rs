//! Cursor arithmetic and storage validation shared by both ring flavours.

use super::RingError;
use std::cell::UnsafeCell;

pub(crate) fn validate<T>(storage: &[Option<T>], capacity: usize) -> Result<(), RingError> {
    if capacity == 0 {
        return Err(RingError::InvalidCapacity {
            capacity,
            reason: "must be greater than zero",
        });
    }
    if storage.len() != capacity {
        return Err(RingError::StorageMismatch {
            capacity,
            storage_len: storage.len(),
        });
    }
    Ok(())
}

#[inline(always)]
pub(crate) fn advance(cursor: usize, capacity: usize) -> usize {
    if cursor + 1 == capacity { 0 } else { cursor + 1 }
}

/// Counters in the SPSC ring run over `[0, 2 * capacity)` so that a full ring
/// (distance == capacity) never looks like an empty one (distance == 0).
#[inline(always)]
pub(crate) fn advance_mirrored(counter: usize, capacity: usize) -> usize {
    if counter + 1 == capacity * 2 { 0 } else { counter + 1 }
}

#[inline(always)]
pub(crate) fn mirrored_index(counter: usize, capacity: usize) -> usize {
    if counter >= capacity { counter - capacity } else { counter }
}

#[inline(always)]
pub(crate) fn mirrored_distance(write: usize, read: usize, capacity: usize) -> usize {
    if write >= read {
        write - read
    } else {
        write + capacity * 2 - read
    }
}

/// Reinterprets exclusively borrowed storage as a slice of cells so that the
/// producer and consumer can each touch their own slots through `&self`.
pub(crate) fn into_cells<T>(storage: &mut [Option<T>]) -> &[UnsafeCell<Option<T>>] {
    let len = storage.len();
    let ptr = storage.as_mut_ptr() as *const UnsafeCell<Option<T>>;
    // SAFETY: UnsafeCell<U> is repr(transparent) over U, and the unique borrow
    // of `storage` is held for as long as the returned slice lives.
    unsafe { std::slice::from_raw_parts(ptr, len) }
}
