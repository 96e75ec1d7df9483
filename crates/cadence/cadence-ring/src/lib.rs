//! Single-producer, single-consumer circular buffer with blocking flow control.
//!
//! A [`Writer`] allocates the ring and hands out [`Reader`]s over the same
//! storage. Items move in ranges rather than one at a time:
//!
//! ```text
//!  Writer                                     Reader
//!  ──────                                     ──────
//!  wait(n)          (free space >= n)
//!  as_mut_slice()   fill a prefix
//!  consume(n)       publish ─────────────┐
//!                                        └──▶ wait(n)      (items >= n)
//!                                             as_slice()   read a prefix
//!                  ┌──────────── release ──── consume(n)
//!  wait(n) ◀───────┘
//! ```
//!
//! # Design
//! - One slot is always left free so that equal cursors mean "empty"; a ring
//!   of capacity `c` holds at most `c - 1` items.
//! - Each cursor is an atomic published under its own mutex, with a condition
//!   variable to wake the other side. Waits block the thread; they never spin
//!   and never time out.
//! - Item storage is not locked. Publishing the cursor after writing items
//!   (and observing it before reading them) is what makes the items visible.
//! - Storage is reference-counted and released when the last role drops.
//! - A [`ReadSlice`] pins the read cursor for as long as it is borrowed, so
//!   readers sharing one ring never see their slots recycled under them.
//!
//! # Contiguous ranges
//! `begin()`/`end()` describe a linear range of `size()` items starting at the
//! role's cursor. When that range wraps past the last slot, `end()` points
//! beyond the storage. The slice accessors stop at the physical end instead,
//! so a wrapped range is processed in two steps. Sizing the ring as a multiple
//! of the chunk size keeps every chunk in one piece.

mod error;
mod reader;
mod shared;
mod view;
mod writer;

pub use error::RingError;
pub use reader::{ReadSlice, Reader};
pub use writer::Writer;
