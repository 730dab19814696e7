//! Typed identifiers.
//!
//! Every persisted entity is keyed by a UUID; the marker parameter keeps an
//! employee id from being passed where an admin user id is expected.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use uuid::Uuid;

/// UUID tagged with the entity it identifies.
///
/// ```
/// use kernel::id::{EmployeeId, Id};
/// let id: EmployeeId = Id::new();
/// assert_eq!(id, EmployeeId::from_uuid(id.into_uuid()));
/// ```
pub struct Id<T> {
    value: Uuid,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Id<T> {
    /// Random v4 identifier.
    pub fn new() -> Self {
        Self::from_uuid(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self {
            value: uuid,
            _marker: PhantomData,
        }
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.value
    }

    pub fn into_uuid(self) -> Uuid {
        self.value
    }
}

// Manual impls so the marker type needs no bounds of its own.
impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<T> Eq for Id<T> {}

impl<T> std::hash::Hash for Id<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<T> Default for Id<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.value)
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<T> FromStr for Id<T> {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self::from_uuid)
    }
}

impl<T> From<Uuid> for Id<T> {
    fn from(uuid: Uuid) -> Self {
        Self::from_uuid(uuid)
    }
}

impl<T> From<Id<T>> for Uuid {
    fn from(id: Id<T>) -> Self {
        id.value
    }
}

/// Marker types, one per entity.
pub mod markers {
    /// Portal administrator account.
    pub struct AdminUser;

    /// Employee holding one or more NFC cards.
    pub struct Employee;

    /// A single recorded card tap.
    pub struct TapEvent;

    /// NFC reader device.
    pub struct Node;
}

pub type AdminUserId = Id<markers::AdminUser>;
pub type EmployeeId = Id<markers::Employee>;
pub type TapEventId = Id<markers::TapEvent>;
pub type NodeId = Id<markers::Node>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_from_uuid_round_trip() {
        let uuid = Uuid::new_v4();
        let id: EmployeeId = Id::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
        assert_eq!(Uuid::from(id), uuid);
    }

    #[test]
    fn test_parse_and_display() {
        let id: NodeId = "67e55044-10b1-426f-9247-bb680e5fe0c8".parse().unwrap();
        assert_eq!(id.to_string(), "67e55044-10b1-426f-9247-bb680e5fe0c8");
        assert!("not-a-uuid".parse::<NodeId>().is_err());
    }

    #[test]
    fn test_hashable_without_marker_bounds() {
        let a: TapEventId = Id::new();
        let b: TapEventId = Id::new();
        let set: HashSet<_> = [a, b, a].into_iter().collect();
        assert_eq!(set.len(), 2);
    }
}
