//! Identity primitives shared by every domain entity.
use std::cmp::Ordering;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::hash::Hash;
use std::hash::Hasher;
use std::marker::PhantomData;

/// Unique identifier trait for domain entities (rooms, players).
pub trait Unique<T = Self> {
    fn id(&self) -> ID<T>;
}

/// Generic ID wrapper providing compile-time type safety over `uuid::Uuid`.
///
/// `ID<Player>` and `ID<Room>` are distinct types even though both wrap a
/// plain UUID, so a player id can never be passed where a room id is
/// expected.
pub struct ID<T> {
    inner: uuid::Uuid,
    marker: PhantomData<T>,
}

impl<T> ID<T> {
    pub fn inner(&self) -> uuid::Uuid {
        self.inner
    }
    /// Last 4 hex characters, uppercased — used to build public display ids
    /// that don't leak the full identifier.
    pub fn short(&self) -> String {
        let full = self.inner.simple().to_string();
        full[full.len() - 4..].to_uppercase()
    }
    /// Casts `ID<T>` to `ID<U>` while preserving the underlying UUID.
    pub fn cast<U>(self) -> ID<U> {
        ID {
            inner: self.inner,
            marker: PhantomData,
        }
    }
}

impl<T> From<ID<T>> for uuid::Uuid {
    fn from(id: ID<T>) -> Self {
        id.inner()
    }
}
impl<T> From<uuid::Uuid> for ID<T> {
    fn from(inner: uuid::Uuid) -> Self {
        Self {
            inner,
            marker: PhantomData,
        }
    }
}

impl<T> Default for ID<T> {
    fn default() -> Self {
        Self {
            inner: uuid::Uuid::now_v7(),
            marker: PhantomData,
        }
    }
}

impl<T> Copy for ID<T> {}
impl<T> Clone for ID<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Eq for ID<T> {}
impl<T> PartialEq for ID<T> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<T> Ord for ID<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.inner.cmp(&other.inner)
    }
}
impl<T> PartialOrd for ID<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Hash for ID<T> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.inner.hash(state);
    }
}

impl<T> Debug for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("ID").field(&self.inner).finish()
    }
}
impl<T> Display for ID<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.inner, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    struct Room;

    #[test]
    fn ids_are_unique_by_default() {
        let a: ID<Room> = ID::default();
        let b: ID<Room> = ID::default();
        assert_ne!(a, b);
    }

    #[test]
    fn short_is_four_uppercase_hex_chars() {
        let id: ID<Room> = ID::default();
        let short = id.short();
        assert_eq!(short.len(), 4);
        assert_eq!(short, short.to_uppercase());
    }

    #[test]
    fn cast_preserves_uuid() {
        struct Player;
        let id: ID<Room> = ID::default();
        let uuid = id.inner();
        let casted: ID<Player> = id.cast();
        assert_eq!(casted.inner(), uuid);
    }
}
