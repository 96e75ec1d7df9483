//! Shared state behind every reader and writer of one ring.
//!
//! A [`Shared`] owns the item storage and the two cursors. It is created once by
//! [`Writer::new`](crate::Writer::new), handed around as an `Arc`, and released
//! when the last role referencing it is dropped.
//!
//! # Layout
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Shared<T>                           │
//! │  ┌──────────────────────────────┐ ┌────────────────────────┐ │
//! │  │ read: Cursor                 │ │ write: Cursor          │ │
//! │  │  value (AtomicUsize)         │ │  value (AtomicUsize)   │ │
//! │  │  lock  (Mutex<()>)           │ │  lock  (Mutex<()>)     │ │
//! │  │  cond  (Condvar)             │ │  cond  (Condvar)       │ │
//! │  └──────────────────────────────┘ └────────────────────────┘ │
//! │  read_pins (RwLock<()>)                                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  storage: [T; capacity]   (slot capacity-1 acts as guard)    │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The locks guard the cursor *values* only. Item bytes are never locked: a
//! writer fills slots, then publishes the cursor under the lock, and a reader
//! observes the cursor before touching the slots behind it.
//!
//! `read_pins` is held shared by every live [`ReadSlice`](crate::ReadSlice) and
//! exclusively while a reader moves the read cursor, so filled slots cannot be
//! handed back to the writer while any reader still borrows them.

use crate::error::RingError;
use parking_lot::{Condvar, Mutex, RwLock};
use std::cell::UnsafeCell;
use std::fmt;
use std::mem::size_of;
use std::sync::atomic::{AtomicUsize, Ordering};

/// One cursor together with the mutex/condvar pair used to publish it.
pub(crate) struct Cursor {
    name: &'static str,
    value: AtomicUsize,
    lock: Mutex<()>,
    cond: Condvar,
}

impl Cursor {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            value: AtomicUsize::new(0),
            lock: Mutex::new(()),
            cond: Condvar::new(),
        }
    }

    /// Current cursor value. Readable without the lock.
    #[inline(always)]
    pub(crate) fn load(&self) -> usize {
        self.value.load(Ordering::Acquire)
    }

    /// Stores `pos` under the lock, then wakes every waiter on this cursor.
    ///
    /// The guard is dropped before notifying so woken threads do not
    /// immediately block on the mutex again.
    #[inline]
    pub(crate) fn publish(&self, pos: usize) {
        {
            let _guard = self.lock.lock();
            self.value.store(pos, Ordering::Release);
        }
        self.cond.notify_all();
    }

    /// Blocks the calling thread until `ready` returns true.
    ///
    /// The predicate is evaluated under this cursor's lock and re-checked on
    /// every wake, so spurious wakeups and a publish racing the first check
    /// are both harmless. There is no timeout.
    pub(crate) fn wait_until(&self, mut ready: impl FnMut() -> bool) {
        let mut guard = self.lock.lock();
        if ready() {
            return;
        }
        tracing::trace!(cursor = self.name, "blocking until cursor advances");
        self.cond.wait_while(&mut guard, |_| !ready());
    }
}

/// Storage and cursors shared by the roles of one ring.
///
/// Both cursors live in `[0, capacity)`.
pub(crate) struct Shared<T> {
    storage: Box<[UnsafeCell<T>]>,
    pub(crate) read: Cursor,
    pub(crate) write: Cursor,
    pub(crate) read_pins: RwLock<()>,
}

// SAFETY: The cursors are atomics published under their own mutex. The storage
// is written only through the free region `[write, read - 1)` of the single
// `Writer`, which needs `&mut Writer`, and read only through the filled region
// `[read, write)`. Only the writer moves `write` and only a reader holding
// `read_pins` exclusively moves `read`, and no `ReadSlice` can exist at that
// moment. So a shared slice never overlaps slots the writer may touch.
unsafe impl<T: Send> Sync for Shared<T> {}

impl<T: Copy + Default> Shared<T> {
    /// Allocates `capacity` default-initialised slots and zeroes both cursors.
    ///
    /// # Errors
    /// Returns [`RingError::Allocation`] if the storage size overflows or the
    /// allocator refuses the request. Nothing is left behind on failure.
    pub(crate) fn new(capacity: usize) -> Result<Self, RingError> {
        let item_size = size_of::<T>();
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|_| RingError::Allocation {
                capacity,
                item_size,
            })?;
        slots.extend((0..capacity).map(|_| UnsafeCell::new(T::default())));

        tracing::debug!(capacity, item_size, "allocated ring storage");
        Ok(Self::from_storage(slots.into_boxed_slice()))
    }
}

impl<T> Shared<T> {
    /// Zero-slot state backing a default-constructed writer.
    pub(crate) fn empty() -> Self {
        Self::from_storage(Vec::new().into_boxed_slice())
    }

    fn from_storage(storage: Box<[UnsafeCell<T>]>) -> Self {
        Self {
            storage,
            read: Cursor::new("read"),
            write: Cursor::new("write"),
            read_pins: RwLock::new(()),
        }
    }

    /// Number of slots, which is also the cursor modulus.
    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Pointer to slot 0.
    #[inline(always)]
    pub(crate) fn base(&self) -> *mut T {
        UnsafeCell::raw_get(self.storage.as_ptr())
    }
}

impl<T> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shared")
            .field("capacity", &self.capacity())
            .field("read", &self.read.load())
            .field("write", &self.write.load())
            .finish()
    }
}
