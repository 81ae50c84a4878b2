//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Blocks, rings, scenarios, and schedule entries each get their own
//! identifier type so a ring id can never be passed where a block id is
//! expected. All IDs use UUID v7 (time-ordered) for efficient indexing by the
//! storage collaborator.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a planning block (node in the adjacency graph).
    BlockId
}

define_id! {
    /// Unique identifier for a production ring mined against a block.
    RingId
}

define_id! {
    /// Unique identifier for a simulation scenario.
    ScenarioId
}

define_id! {
    /// Unique identifier for a simulated schedule entry.
    ScheduleEntryId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_values() {
        let a = BlockId::new();
        let b = BlockId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_serializes_as_bare_uuid() {
        let id = ScenarioId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{}\"", id.into_inner()));
        let restored: Result<ScenarioId, _> = serde_json::from_str(&json);
        assert_eq!(restored.ok(), Some(id));
    }

    #[test]
    fn id_display_matches_uuid() {
        let id = RingId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
