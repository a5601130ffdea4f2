//! # Entity Identity
//!
//! Every entity in a composed graph has an [`EntityId`] that is unique
//! within that graph. Identifiers follow the host's C-identifier grammar
//! (`[A-Za-z_][A-Za-z0-9_]*`) because the host emits them as symbol names.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Identifier of a controller, sub-entity or externally registered entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Build an identifier, enforcing the identifier grammar.
    pub fn new(id: impl Into<String>) -> Result<Self, CoreError> {
        let id = id.into();
        if is_identifier(&id) {
            Ok(Self(id))
        } else {
            Err(CoreError::InvalidIdentifier(id))
        }
    }

    /// Derive a child identifier of the form `<self>_<suffix>`.
    pub fn derive(&self, suffix: &str) -> Result<Self, CoreError> {
        Self::new(format!("{}_{}", self.0, suffix))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Returns true when `s` matches `[A-Za-z_][A-Za-z0-9_]*`.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl TryFrom<String> for EntityId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<EntityId> for String {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Every string in the identifier grammar is accepted.
        #[test]
        fn grammar_strings_are_accepted(s in "[A-Za-z_][A-Za-z0-9_]{0,30}") {
            prop_assert!(EntityId::new(s).is_ok());
        }

        /// A leading digit is always rejected.
        #[test]
        fn leading_digit_is_rejected(s in "[0-9][A-Za-z0-9_]{0,30}") {
            prop_assert!(EntityId::new(s).is_err());
        }
    }
}
