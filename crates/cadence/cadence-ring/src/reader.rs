//! Consumer side of a ring.

use crate::shared::Shared;
use crate::view::{self, Role};
use crate::writer::Writer;
use parking_lot::RwLockReadGuard;
use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

/// The reading role of a ring, bound to the read cursor.
///
/// Obtained only through [`Writer::make_reader`]. A reader sees the items the
/// writer has published and releases them back with [`consume`](Self::consume).
///
/// # Thread Safety
/// `Reader` is `Send` but not `Sync`: it can move to the consumer thread but
/// cannot be shared by reference between threads.
///
/// # Fan-out
/// Every reader made from one writer shares the single read cursor: what one
/// reader consumes is gone for all of them. Moving the cursor waits until no
/// [`ReadSlice`] of any reader is alive, so holding a slice from one reader
/// while consuming through another on the same thread deadlocks.
pub struct Reader<T> {
    pub(crate) shared: Arc<Shared<T>>,
    _unsync: PhantomData<Cell<&'static ()>>,
}

impl<T> Role for Reader<T> {
    type Item = T;

    #[inline(always)]
    fn shared(&self) -> &Shared<T> {
        &self.shared
    }

    #[inline(always)]
    fn position(&self) -> usize {
        self.shared.read.load()
    }

    #[inline(always)]
    fn offset(&self) -> usize {
        self.shared.write.load().wrapping_sub(self.shared.read.load())
    }

    #[inline(always)]
    fn update(&self, pos: usize) {
        self.shared.read.publish(pos);
    }
}

impl<T> Reader<T> {
    pub(crate) fn new(shared: Arc<Shared<T>>) -> Self {
        Self {
            shared,
            _unsync: PhantomData,
        }
    }

    /// Number of published items not yet consumed.
    #[inline]
    pub fn size(&self) -> usize {
        view::size(self)
    }

    /// Largest number of items the ring can hold (`capacity - 1`).
    #[inline]
    pub fn max_size(&self) -> usize {
        view::max_size(self)
    }

    /// True when the cursors are equal. Does not take a lock.
    #[inline]
    pub fn is_empty(&self) -> bool {
        view::is_empty(self)
    }

    /// Pointer to the first readable item.
    #[inline]
    pub fn begin(&self) -> *const T {
        view::begin(self)
    }

    /// `begin() + size()`.
    ///
    /// The range is linear: when the readable items wrap past the last slot,
    /// this points beyond the storage. Only [`as_slice`](Self::as_slice) is
    /// safe to dereference.
    #[inline]
    pub fn end(&self) -> *const T {
        view::end(self)
    }

    #[inline]
    pub fn cbegin(&self) -> *const T {
        self.begin()
    }

    #[inline]
    pub fn cend(&self) -> *const T {
        self.end()
    }

    /// Readable items up to the physical end of the storage.
    ///
    /// This is `size()` items long unless the readable range wraps, in which
    /// case it stops at the last slot; consume it and call again for the rest.
    /// The read cursor stays put until the returned slice is dropped.
    #[inline]
    pub fn as_slice(&self) -> ReadSlice<'_, T> {
        let pin = self.shared.read_pins.read_recursive();
        // SAFETY: `pin` keeps every reader from releasing these slots, and the
        // writer only writes past the write cursor, outside the filled region.
        let items = unsafe { view::as_slice(self) };
        ReadSlice { items, _pin: pin }
    }

    /// Releases `n` items back to the writer and wakes it.
    ///
    /// Blocks while any [`ReadSlice`] of this ring is alive.
    ///
    /// # Panics
    /// If `n` exceeds [`size`](Self::size).
    #[inline]
    pub fn consume(&mut self, n: usize) {
        let _exclusive = self.shared.read_pins.write();
        view::consume(&*self, n);
    }

    /// Consumes every item currently visible.
    pub fn clear(&mut self) {
        let _exclusive = self.shared.read_pins.write();
        view::consume(&*self, self.size());
    }

    /// Blocks until at least `n` items are readable.
    ///
    /// Returns immediately if they already are. Never times out: waiting for
    /// more than [`max_size`](Self::max_size) items blocks forever.
    pub fn wait(&self, n: usize) {
        self.shared.write.wait_until(|| self.size() >= n);
    }
}

/// Filled slots borrowed from a [`Reader`].
///
/// Derefs to `[T]`. While it is alive no reader of the ring can move the read
/// cursor, so the writer cannot reuse these slots.
pub struct ReadSlice<'a, T> {
    items: &'a [T],
    _pin: RwLockReadGuard<'a, ()>,
}

impl<T> Deref for ReadSlice<'_, T> {
    type Target = [T];

    #[inline(always)]
    fn deref(&self) -> &[T] {
        self.items
    }
}

impl<T: fmt::Debug> fmt::Debug for ReadSlice<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.items, f)
    }
}

impl<T> fmt::Debug for Reader<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reader")
            .field("shared", &self.shared)
            .field("size", &self.size())
            .finish()
    }
}

impl<T> PartialEq for Reader<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<T> Eq for Reader<T> {}

impl<T> PartialEq<Writer<T>> for Reader<T> {
    fn eq(&self, other: &Writer<T>) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

#[cfg(test)]
mod tests {
    use crate::Writer;
    use std::mem::size_of;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread;
    use std::time::Duration;

    fn publish(writer: &mut Writer<u32>, items: &[u32]) {
        writer.as_mut_slice()[..items.len()].copy_from_slice(items);
        writer.consume(items.len());
    }

    #[test]
    fn fresh_reader_is_empty() {
        let writer = Writer::<u32>::new(8).unwrap();
        let reader = writer.make_reader();
        assert!(reader.is_empty());
        assert_eq!(reader.size(), 0);
        assert_eq!(reader.max_size(), 7);
        assert!(reader.as_slice().is_empty());
        assert_eq!(reader.begin(), reader.end());
    }

    #[test]
    fn wait_returns_immediately_when_items_are_available() {
        let mut writer = Writer::<u32>::new(8).unwrap();
        let reader = writer.make_reader();
        publish(&mut writer, &[7, 8]);

        reader.wait(0);
        reader.wait(1);
        reader.wait(2);
        assert_eq!(reader.size(), 2);
    }

    #[test]
    fn wait_unblocks_only_once_enough_items_are_published() {
        let mut writer = Writer::<u32>::new(8).unwrap();
        let reader = writer.make_reader();
        let woke = Arc::new(AtomicBool::new(false));

        let handle = {
            let woke = Arc::clone(&woke);
            thread::spawn(move || {
                reader.wait(3);
                woke.store(true, Ordering::SeqCst);
                reader
            })
        };

        publish(&mut writer, &[1]);
        publish(&mut writer, &[2]);
        thread::sleep(Duration::from_millis(50));
        assert!(!woke.load(Ordering::SeqCst), "woke with only 2 of 3 items");

        publish(&mut writer, &[3]);
        let reader = handle.join().unwrap();
        assert!(woke.load(Ordering::SeqCst));
        assert_eq!(*reader.as_slice(), [1, 2, 3]);
    }

    #[test]
    fn clear_drains_everything_visible() {
        let mut writer = Writer::<u32>::new(8).unwrap();
        let mut reader = writer.make_reader();
        publish(&mut writer, &[1, 2, 3, 4]);

        reader.clear();
        assert!(reader.is_empty());
        assert_eq!(writer.size(), writer.max_size());
    }

    #[test]
    fn slice_stops_at_physical_end_when_range_wraps() {
        let mut writer = Writer::<u32>::new(4).unwrap();
        let mut reader = writer.make_reader();

        publish(&mut writer, &[1, 2, 3]);
        reader.consume(3);
        // Write cursor at 3: one slot before the end, then wrap to 0 and 1.
        publish(&mut writer, &[4]);
        publish(&mut writer, &[5, 6]);

        assert_eq!(reader.size(), 3);
        assert_eq!(*reader.as_slice(), [4]);
        let span = (reader.end() as usize - reader.begin() as usize) / size_of::<u32>();
        assert_eq!(span, 3);
        assert_eq!(reader.cbegin(), reader.begin());
        assert_eq!(reader.cend(), reader.end());

        reader.consume(1);
        assert_eq!(*reader.as_slice(), [5, 6]);
    }

    #[test]
    #[should_panic(expected = "exceeds")]
    fn consuming_more_than_available_panics() {
        let writer = Writer::<u32>::new(4).unwrap();
        let mut reader = writer.make_reader();
        reader.consume(1);
    }

    #[test]
    fn live_slice_holds_back_other_readers() {
        let mut writer = Writer::<u32>::new(4).unwrap();
        let a = writer.make_reader();
        let mut b = writer.make_reader();
        publish(&mut writer, &[1, 2, 3]);
        let released = Arc::new(AtomicBool::new(false));

        let slice = a.as_slice();
        let handle = {
            let released = Arc::clone(&released);
            thread::spawn(move || {
                b.consume(3);
                released.store(true, Ordering::SeqCst);
                b
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(!released.load(Ordering::SeqCst), "cursor moved under a live slice");
        assert_eq!(writer.size(), 0);
        assert!(writer.as_mut_slice().is_empty());
        assert_eq!(*slice, [1, 2, 3]);
        drop(slice);

        let b = handle.join().unwrap();
        assert!(released.load(Ordering::SeqCst));
        assert!(b.is_empty());
        assert!(a.is_empty());
        assert_eq!(writer.size(), 3);
    }

    #[test]
    fn slices_from_several_readers_coexist() {
        let mut writer = Writer::<u32>::new(8).unwrap();
        let a = writer.make_reader();
        let b = writer.make_reader();
        publish(&mut writer, &[5, 6]);

        let first = a.as_slice();
        let second = b.as_slice();
        assert_eq!(*first, *second);
        assert_eq!(format!("{second:?}"), "[5, 6]");
    }
}
