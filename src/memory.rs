//! The reallocation primitive every growable buffer in the VM is built on.

use std::alloc::{self, Layout};
use std::ptr::NonNull;

use log::trace;
use thiserror::Error;

/// A non-zero request the allocator could not satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("out of memory: failed to allocate {requested} bytes (align {align})")]
pub struct AllocError {
    pub requested: usize,
    pub align: usize,
}

/// Start at 8 and double from there.
#[inline]
pub fn grow_capacity(capacity: usize) -> usize {
    if capacity < 8 {
        8
    } else {
        capacity * 2
    }
}

/// Allocates, grows, shrinks or frees a block.
///
/// - `pointer == None` with `old_size == 0` is a fresh allocation of `new_size` bytes.
/// - `new_size == 0` frees the block and returns `Ok(None)`. This never fails.
/// - Anything else resizes the block. The first `min(old_size, new_size)` bytes are
///   preserved, bytes past `old_size` are uninitialized.
///
/// A tracing collector would hook in here, before a growing request is served.
///
/// # Safety
///
/// `pointer` must be `None`, or a block returned by an earlier call with the same
/// `align` whose current size is `old_size`. After a successful call the old
/// pointer must not be used again.
pub unsafe fn reallocate(
    pointer: Option<NonNull<u8>>,
    old_size: usize,
    new_size: usize,
    align: usize,
) -> Result<Option<NonNull<u8>>, AllocError> {
    trace!("reallocate {:?}: {} -> {} bytes", pointer, old_size, new_size);

    let failed = AllocError {
        requested: new_size,
        align,
    };

    if new_size == 0 {
        if let Some(ptr) = pointer.filter(|_| old_size != 0) {
            // SAFETY: the caller guarantees `ptr` was allocated with exactly this layout.
            let layout = Layout::from_size_align_unchecked(old_size, align);
            alloc::dealloc(ptr.as_ptr(), layout);
        }
        return Ok(None);
    }

    let new_layout = Layout::from_size_align(new_size, align).map_err(|_| failed)?;
    let raw = match pointer {
        Some(ptr) if old_size != 0 => {
            // SAFETY: same layout the block was allocated with; `new_size` is non-zero and
            // was validated against `align` above.
            let old_layout = Layout::from_size_align_unchecked(old_size, align);
            alloc::realloc(ptr.as_ptr(), old_layout, new_size)
        }
        _ => alloc::alloc(new_layout),
    };

    NonNull::new(raw).map(Some).ok_or(failed)
}
