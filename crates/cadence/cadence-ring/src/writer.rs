//! Producer side of a ring.

use crate::error::RingError;
use crate::reader::Reader;
use crate::shared::Shared;
use crate::view::{self, Role};
use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

/// The writing role of a ring, bound to the write cursor.
///
/// Creating a writer allocates the ring. Readers are made from it with
/// [`make_reader`](Self::make_reader) and keep the storage alive after the
/// writer is dropped.
///
/// The writer's "size" is its free space: how many slots it may fill before
/// publishing them with [`consume`](Self::consume).
///
/// # Single-Producer Guarantee
/// Only one writer exists per ring and it is not `Clone`. It is `Send` but not
/// `Sync`, so at most one thread can publish.
///
/// # Example
/// ```
/// use cadence_ring::Writer;
///
/// let mut writer = Writer::<u32>::new(8).unwrap();
/// let mut reader = writer.make_reader();
///
/// writer.as_mut_slice()[..3].copy_from_slice(&[1, 2, 3]);
/// writer.consume(3);
///
/// reader.wait(3);
/// assert_eq!(*reader.as_slice(), [1, 2, 3]);
/// reader.consume(3);
/// assert_eq!(writer.size(), writer.max_size());
/// ```
pub struct Writer<T> {
    pub(crate) shared: Arc<Shared<T>>,
    _unsync: PhantomData<Cell<&'static ()>>,
}

impl<T> Role for Writer<T> {
    type Item = T;

    #[inline(always)]
    fn shared(&self) -> &Shared<T> {
        &self.shared
    }

    #[inline(always)]
    fn position(&self) -> usize {
        self.shared.write.load()
    }

    #[inline(always)]
    fn offset(&self) -> usize {
        self.shared
            .read
            .load()
            .wrapping_sub(self.shared.write.load())
            .wrapping_sub(1)
    }

    #[inline(always)]
    fn update(&self, pos: usize) {
        self.shared.write.publish(pos);
    }
}

impl<T: Copy + Default> Writer<T> {
    /// Allocates a ring of `capacity` slots.
    ///
    /// One slot is kept free to tell a full ring from an empty one, so the
    /// ring holds at most `capacity - 1` items.
    ///
    /// # Errors
    /// Returns [`RingError::Allocation`] if the storage cannot be allocated.
    pub fn new(capacity: usize) -> Result<Self, RingError> {
        Ok(Self::from_shared(Arc::new(Shared::new(capacity)?)))
    }
}

impl<T> Writer<T> {
    fn from_shared(shared: Arc<Shared<T>>) -> Self {
        Self {
            shared,
            _unsync: PhantomData,
        }
    }

    /// Makes a reader over the same ring.
    ///
    /// All readers share one read cursor; see the fan-out note on [`Reader`].
    pub fn make_reader(&self) -> Reader<T> {
        Reader::new(Arc::clone(&self.shared))
    }

    /// Number of free slots.
    #[inline]
    pub fn size(&self) -> usize {
        view::size(self)
    }

    /// Largest number of items the ring can hold (`capacity - 1`).
    #[inline]
    pub fn max_size(&self) -> usize {
        view::max_size(self)
    }

    /// True when nothing is published and unread. Does not take a lock.
    #[inline]
    pub fn is_empty(&self) -> bool {
        view::is_empty(self)
    }

    /// Pointer to the first writable slot.
    #[inline]
    pub fn begin(&mut self) -> *mut T {
        view::begin(&*self)
    }

    /// `begin() + size()`. Like [`Reader::end`], this may point past the
    /// storage when the free range wraps.
    #[inline]
    pub fn end(&mut self) -> *mut T {
        view::end(&*self)
    }

    #[inline]
    pub fn cbegin(&self) -> *const T {
        view::begin(self)
    }

    #[inline]
    pub fn cend(&self) -> *const T {
        view::end(self)
    }

    /// Writable slots up to the physical end of the storage.
    ///
    /// Fill a prefix, then publish it with [`consume`](Self::consume). When
    /// the free range wraps the slice stops at the last slot.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: reader slices end at the write cursor, which only this
        // writer moves, and `&mut self` keeps this the only reference into the
        // free region.
        unsafe { view::as_mut_slice(self) }
    }

    /// Publishes `n` written items and wakes blocked readers.
    ///
    /// # Panics
    /// If `n` exceeds [`size`](Self::size).
    #[inline]
    pub fn consume(&mut self, n: usize) {
        view::consume(&*self, n);
    }

    /// Blocks until at least `n` slots are free.
    ///
    /// Returns immediately if they already are. Never times out: waiting for
    /// more than [`max_size`](Self::max_size) slots blocks forever.
    pub fn wait(&self, n: usize) {
        self.shared.read.wait_until(|| self.size() >= n);
    }
}

/// A zero-capacity writer. It cannot hold items and exists to be replaced,
/// for example with `std::mem::replace` or `std::mem::take`.
impl<T> Default for Writer<T> {
    fn default() -> Self {
        Self::from_shared(Arc::new(Shared::empty()))
    }
}

impl<T> fmt::Debug for Writer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Writer")
            .field("shared", &self.shared)
            .field("free", &self.size())
            .finish()
    }
}

impl<T> PartialEq for Writer<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<T> Eq for Writer<T> {}

impl<T> PartialEq<Reader<T>> for Writer<T> {
    fn eq(&self, other: &Reader<T>) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}
