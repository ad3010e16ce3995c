#![doc(html_root_url = "https://docs.rs/safemap/0.1.0")]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! A concurrent map behind a single read-write lock.
//!
//! This crate provides the [`SafeMap`] type ‒ an ordinary hash map wrapped in a
//! [`RwLock`][parking_lot::RwLock] so it can be shared between threads and used without any
//! synchronization on the caller's side. Lookups take the lock in shared mode and can run in
//! parallel with each other; mutations take it exclusively. Every method is a single atomic
//! operation, including the compound [`get_or_insert_with`][SafeMap::get_or_insert_with], which
//! would otherwise need an external lock around a check-then-insert sequence.
//!
//! This is the boring end of the concurrent-map design space, on purpose. There's no sharding and
//! no lock-free cleverness, which means writes serialize and the map won't scale to heavy
//! write contention across many cores. In exchange the semantics are easy to reason about: all
//! operations are linearizable through the one lock. If a plain map shared between a handful of
//! threads is what you need, this is enough; if the map is your bottleneck, you want one of the
//! sharded or lock-free crates instead.
//!
//! # Examples
//!
//! ```rust
//! use safemap::SafeMap;
//! use crossbeam_utils::thread;
//!
//! let map = SafeMap::new();
//!
//! thread::scope(|s| {
//!     s.spawn(|_| {
//!         map.insert("hello", 1);
//!     });
//!     s.spawn(|_| {
//!         map.insert("world", 2);
//!     });
//! }).unwrap();
//! assert_eq!(Some(1), map.get("hello"));
//! assert_eq!(Some(2), map.get("world"));
//! ```

mod found_or_created;
pub mod map;

pub use crate::found_or_created::FoundOrCreated;
pub use crate::map::SafeMap;

#[cfg(doctest)]
mod tests {
    mod compile_fail;
}
