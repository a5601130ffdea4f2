//! # Cross-Reference Resolution
//!
//! Some features point at an entity the host already owns (for example a
//! room temperature sensor used as the controller's current temperature).
//! The composer looks those up through [`EntityResolver`]; [`EntityRegistry`]
//! is the in-memory implementation used by the CLI and by tests.
//!
//! Declarations are a list of `{id, kind, name}` records:
//!
//! ```yaml
//! - id: room_temp
//!   kind: sensor
//!   name: Room Temperature
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use pac_core::{EntityId, EntityKind};

use crate::entity::Entity;

/// Lookup of entities that exist outside the composed graph.
pub trait EntityResolver {
    /// Return the entity registered under `id`, if any.
    fn resolve_existing_entity(&self, id: &EntityId) -> Option<Entity>;
}

impl<T: EntityResolver + ?Sized> EntityResolver for &T {
    fn resolve_existing_entity(&self, id: &EntityId) -> Option<Entity> {
        (**self).resolve_existing_entity(id)
    }
}

/// Errors raised while building an [`EntityRegistry`].
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("entity declarations load error for '{path}': {reason}")]
    Load { path: String, reason: String },

    #[error("invalid entity declarations: {0}")]
    Parse(String),

    #[error("entity '{0}' is declared more than once")]
    Duplicate(EntityId),
}

/// One externally owned entity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityDeclaration {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Display name; defaults to the identifier.
    #[serde(default)]
    pub name: Option<String>,
}

impl From<EntityDeclaration> for Entity {
    fn from(decl: EntityDeclaration) -> Self {
        let name = decl.name.unwrap_or_else(|| decl.id.to_string());
        Entity::external(decl.id, decl.kind, name)
    }
}

/// In-memory entity registry keyed by identity.
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, Entity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity.
    ///
    /// # Errors
    ///
    /// Returns `ResolverError::Duplicate` if the identity is taken.
    pub fn register(&mut self, entity: Entity) -> Result<(), ResolverError> {
        if self.entities.contains_key(&entity.id) {
            return Err(ResolverError::Duplicate(entity.id));
        }
        self.entities.insert(entity.id.clone(), entity);
        Ok(())
    }

    /// Build a registry from declarations.
    pub fn from_declarations(
        declarations: impl IntoIterator<Item = EntityDeclaration>,
    ) -> Result<Self, ResolverError> {
        let mut registry = Self::new();
        for decl in declarations {
            registry.register(decl.into())?;
        }
        Ok(registry)
    }

    /// Parse a YAML declaration list.
    pub fn from_yaml_str(text: &str) -> Result<Self, ResolverError> {
        let declarations: Vec<EntityDeclaration> =
            serde_yaml::from_str(text).map_err(|e| ResolverError::Parse(e.to_string()))?;
        Self::from_declarations(declarations)
    }

    /// Parse a JSON declaration list.
    pub fn from_json_str(text: &str) -> Result<Self, ResolverError> {
        let declarations: Vec<EntityDeclaration> =
            serde_json::from_str(text).map_err(|e| ResolverError::Parse(e.to_string()))?;
        Self::from_declarations(declarations)
    }

    /// Load declarations from disk; `.json` is parsed as JSON, anything
    /// else as YAML.
    pub fn from_path(path: &Path) -> Result<Self, ResolverError> {
        let content = std::fs::read_to_string(path).map_err(|e| ResolverError::Load {
            path: path.display().to_string(),
            reason: format!("cannot read file: {e}"),
        })?;
        let registry = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_yaml_str(&content),
        }?;
        tracing::debug!(path = %path.display(), entities = registry.len(), "loaded entity declarations");
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, id: &EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }
}

impl EntityResolver for EntityRegistry {
    fn resolve_existing_entity(&self, id: &EntityId) -> Option<Entity> {
        self.entities.get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Origin;

    #[test]
    fn test_yaml_declarations() {
        let registry = EntityRegistry::from_yaml_str(
            "- id: room_temp\n  kind: sensor\n  name: Room Temperature\n- id: hall_light\n  kind: switch\n",
        )
        .unwrap();
        assert_eq!(registry.len(), 2);
        let room = registry
            .resolve_existing_entity(&EntityId::new("room_temp").unwrap())
            .unwrap();
        assert_eq!(room.kind, EntityKind::Sensor);
        assert_eq!(room.name, "Room Temperature");
        assert_eq!(room.origin, Origin::External);
        let hall = registry.get(&EntityId::new("hall_light").unwrap()).unwrap();
        assert_eq!(hall.name, "hall_light");
    }

    #[test]
    fn test_json_declarations() {
        let registry =
            EntityRegistry::from_json_str(r#"[{"id": "t1", "kind": "binary_sensor"}]"#).unwrap();
        assert_eq!(
            registry.get(&EntityId::new("t1").unwrap()).unwrap().kind,
            EntityKind::BinarySensor
        );
    }

    #[test]
    fn test_duplicate_declaration_rejected() {
        let err = EntityRegistry::from_yaml_str(
            "- {id: t1, kind: sensor}\n- {id: t1, kind: switch}\n",
        )
        .unwrap_err();
        assert!(matches!(err, ResolverError::Duplicate(id) if id.as_str() == "t1"));
    }

    #[test]
    fn test_invalid_declarations_rejected() {
        assert!(EntityRegistry::from_yaml_str("- {id: 'bad id', kind: sensor}\n").is_err());
        assert!(EntityRegistry::from_yaml_str("- {id: t1, kind: lamp}\n").is_err());
        assert!(EntityRegistry::from_yaml_str("- {id: t1, kind: sensor, room: 3}\n").is_err());
    }

    #[test]
    fn test_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entities.yaml");
        std::fs::write(&path, "- id: room_temp\n  kind: sensor\n").unwrap();
        let registry = EntityRegistry::from_path(&path).unwrap();
        assert_eq!(registry.len(), 1);

        let missing = dir.path().join("missing.json");
        assert!(matches!(
            EntityRegistry::from_path(&missing),
            Err(ResolverError::Load { .. })
        ));
    }

    #[test]
    fn test_unknown_id_resolves_to_none() {
        let registry = EntityRegistry::new();
        assert!(registry.is_empty());
        assert!(registry
            .resolve_existing_entity(&EntityId::new("nothing").unwrap())
            .is_none());
    }
}
