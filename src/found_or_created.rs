//! The [`FoundOrCreated`][crate::FoundOrCreated] enum.

use std::ops::{Deref, DerefMut};

/// Tells apart a value that was already in the map from one the lookup had to create.
///
/// This is what [`get_or_insert_with`][crate::SafeMap::get_or_insert_with] and its relatives
/// return. Mostly it can be treated as the value itself, because it dereferences to it; when the
/// distinction matters (for example to count cache misses), ask with
/// [`is_created`][FoundOrCreated::is_created].
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum FoundOrCreated<T> {
    /// The key was already bound and this is the stored value.
    Found(T),
    /// The key was vacant, so the value had to be created and inserted.
    Created(T),
}

impl<T> FoundOrCreated<T> {
    /// Extracts the value, dropping the found/created distinction.
    pub fn into_inner(self) -> T {
        match self {
            FoundOrCreated::Found(value) => value,
            FoundOrCreated::Created(value) => value,
        }
    }

    /// Transforms the value while keeping the found/created distinction.
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FoundOrCreated<U> {
        match self {
            FoundOrCreated::Found(value) => FoundOrCreated::Found(f(value)),
            FoundOrCreated::Created(value) => FoundOrCreated::Created(f(value)),
        }
    }

    /// Checks if the value had to be created by this call.
    pub fn is_created(&self) -> bool {
        match self {
            FoundOrCreated::Created(_) => true,
            FoundOrCreated::Found(_) => false,
        }
    }
}

impl<T> Deref for FoundOrCreated<T> {
    type Target = T;
    fn deref(&self) -> &T {
        match self {
            FoundOrCreated::Found(value) => value,
            FoundOrCreated::Created(value) => value,
        }
    }
}

impl<T> DerefMut for FoundOrCreated<T> {
    fn deref_mut(&mut self) -> &mut T {
        match self {
            FoundOrCreated::Found(value) => value,
            FoundOrCreated::Created(value) => value,
        }
    }
}
