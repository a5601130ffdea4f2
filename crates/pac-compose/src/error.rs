//! Errors raised while assembling the controller graph.

use thiserror::Error;

use pac_core::{CoreError, EntityId, EntityKind, ErrorClass};
use pac_schema::LinkSlot;

/// Failure during composition. The graph is discarded on any of these.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CompositionError {
    /// A reference names an entity the host does not know.
    #[error("{feature}: referenced entity '{id}' does not exist")]
    UnresolvedReference {
        /// Feature field holding the reference.
        feature: &'static str,
        /// The identifier that failed to resolve.
        id: EntityId,
    },

    /// A reference resolved to an entity of the wrong kind.
    #[error("{feature}: referenced entity '{id}' is a {found}, expected a {expected}")]
    ReferenceKindMismatch {
        feature: &'static str,
        id: EntityId,
        expected: EntityKind,
        found: EntityKind,
    },

    /// Two entities in the graph share an identity, or a composed entity
    /// reuses the identity of an entity the host already owns.
    #[error("duplicate identity '{id}': used by {first} and {second}")]
    DuplicateIdentity {
        id: EntityId,
        /// The earlier owner of the identity.
        first: String,
        /// The owner that collided with it.
        second: String,
    },

    /// A link slot was filled twice.
    #[error("link slot '{slot}' is already occupied")]
    SlotOccupied { slot: LinkSlot },

    /// An entity of the wrong kind was offered to a link slot.
    #[error("link slot '{slot}' accepts a {expected}, got a {found}")]
    SlotKindMismatch {
        slot: LinkSlot,
        expected: EntityKind,
        found: EntityKind,
    },

    /// A supported capability reached composition without its companion.
    #[error("{feature}: '{companion}' is required if 'supported' is set to true")]
    MissingCompanion {
        feature: &'static str,
        companion: &'static str,
    },

    /// An identity in the configuration is not a valid identifier.
    #[error("{field}: {source}")]
    InvalidIdentity {
        /// Dotted path to the offending field.
        field: String,
        source: CoreError,
    },

    /// A sub-configuration could not be read into its entity shape.
    #[error("{field}: {reason}")]
    InvalidConfiguration { field: String, reason: String },
}

impl CompositionError {
    /// The diagnostic class of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::UnresolvedReference { .. } | Self::ReferenceKindMismatch { .. } => {
                ErrorClass::Reference
            }
            Self::DuplicateIdentity { .. }
            | Self::SlotOccupied { .. }
            | Self::SlotKindMismatch { .. }
            | Self::MissingCompanion { .. }
            | Self::InvalidIdentity { .. }
            | Self::InvalidConfiguration { .. } => ErrorClass::Composition,
        }
    }
}
