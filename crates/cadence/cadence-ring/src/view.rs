//! Role-independent view logic and cursor arithmetic.
//!
//! Readers and writers differ in only three things: which cursor they own,
//! how many items are available to them, and which condition they signal when
//! their cursor moves. Those are captured by [`Role`]; everything else
//! (sizes, ranges, consuming) is written once here against that trait.
//!
//! # Cursor arithmetic
//!
//! Both cursors live in `[0, capacity)`. A role's raw availability is a plain
//! wrapping subtraction of the cursors (`write - read` for a reader,
//! `read - write - 1` for a writer). When the subtracted cursor is logically
//! ahead, that subtraction underflows to a value near `usize::MAX`.
//! [`fold_back`] recovers the real count:
//!
//! ```text
//! threshold = usize::MAX - capacity + 1
//! raw >= threshold  →  raw - threshold      (same as raw + capacity, mod 2^N)
//! ```
//!
//! Example with `capacity = 4`, reader at 3, writer at 1:
//!
//! ```text
//! raw       = 1 - 3           = usize::MAX - 1
//! threshold = usize::MAX - 3
//! size      = raw - threshold = 2   (slots 3 and 0)
//! ```

use crate::shared::Shared;

/// The three primitives a role supplies to the shared view logic.
pub(crate) trait Role {
    type Item;

    fn shared(&self) -> &Shared<Self::Item>;

    /// This role's cursor.
    fn position(&self) -> usize;

    /// Raw available count, computed with wrapping subtraction.
    fn offset(&self) -> usize;

    /// Commits a new cursor value and wakes the other side.
    fn update(&self, pos: usize);
}

/// Folds an underflowed cursor difference back into `[0, capacity)`.
#[inline(always)]
pub(crate) fn fold_back(raw: usize, capacity: usize) -> usize {
    if capacity == 0 {
        return 0;
    }
    let threshold = usize::MAX - capacity + 1;
    if raw >= threshold { raw - threshold } else { raw }
}

/// Moves `pos` forward by `n`, wrapping at `capacity`.
#[inline(always)]
pub(crate) fn advance(pos: usize, n: usize, capacity: usize) -> usize {
    let next = pos + n;
    if next >= capacity { next - capacity } else { next }
}

#[inline(always)]
pub(crate) fn size<R: Role>(role: &R) -> usize {
    fold_back(role.offset(), role.shared().capacity())
}

#[inline(always)]
pub(crate) fn max_size<R: Role>(role: &R) -> usize {
    role.shared().capacity().saturating_sub(1)
}

#[inline(always)]
pub(crate) fn is_empty<R: Role>(role: &R) -> bool {
    let shared = role.shared();
    shared.write.load() == shared.read.load()
}

/// Advances the role's cursor by `n` items.
///
/// # Panics
/// If `n` exceeds [`size`]. With `n <= size < capacity` a single subtraction
/// in [`advance`] keeps the cursor inside `[0, capacity)`.
#[inline]
pub(crate) fn consume<R: Role>(role: &R, n: usize) {
    let available = size(role);
    assert!(
        n <= available,
        "consume({n}) exceeds the {available} items available"
    );
    let next = advance(role.position(), n, role.shared().capacity());
    role.update(next);
}

/// Start of the role's range. May be one past the last slot when empty.
#[inline(always)]
pub(crate) fn begin<R: Role>(role: &R) -> *mut R::Item {
    role.shared().base().wrapping_add(role.position())
}

/// `begin + size()`. Not clamped to the storage; see [`contiguous_len`].
#[inline(always)]
pub(crate) fn end<R: Role>(role: &R) -> *mut R::Item {
    begin(role).wrapping_add(size(role))
}

/// Length of the role's range that lies inside the physical storage.
#[inline(always)]
pub(crate) fn contiguous_len<R: Role>(role: &R) -> usize {
    let until_end = role.shared().capacity().saturating_sub(role.position());
    size(role).min(until_end)
}

/// The contiguous part of the role's range as a shared slice.
///
/// # Safety
/// The caller must ensure no role writes the returned slots for the lifetime
/// of the slice. For the reader's filled region this means holding
/// `read_pins` shared, so no reader can release the slots to the writer.
#[inline]
pub(crate) unsafe fn as_slice<R: Role>(role: &R) -> &[R::Item] {
    let len = contiguous_len(role);
    // SAFETY: `begin` is inside the storage (or one past an empty range) and
    // `len` stops at the physical end.
    unsafe { std::slice::from_raw_parts(begin(role), len) }
}

/// The contiguous part of the role's range as a mutable slice.
///
/// # Safety
/// Same contract as [`as_slice`]; additionally no other reference into the
/// range may exist, which the `&mut` role borrow provides for the single
/// writer.
#[inline]
pub(crate) unsafe fn as_mut_slice<R: Role>(role: &mut R) -> &mut [R::Item] {
    let len = contiguous_len(role);
    // SAFETY: see `as_slice`.
    unsafe { std::slice::from_raw_parts_mut(begin(role), len) }
}
