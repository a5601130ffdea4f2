//! # Entities
//!
//! Runtime objects linked under the controller. An [`Entity`] is either
//! composed from an inline sub-configuration or resolved from the host's
//! registry of existing entities; [`Origin`] records which.

use serde::{Deserialize, Serialize};

use pac_core::{EntityId, EntityKind};
use pac_schema::SensorSpec;

/// Where an entity came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Built by the composer from the configuration.
    Composed,
    /// Owned by the host and only referenced.
    External,
}

/// Measurement metadata of a numeric sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorClass {
    pub unit_of_measurement: String,
    pub accuracy_decimals: u32,
    pub device_class: String,
    pub state_class: String,
}

impl From<SensorSpec> for SensorClass {
    fn from(spec: SensorSpec) -> Self {
        Self {
            unit_of_measurement: spec.unit.to_string(),
            accuracy_decimals: u32::from(spec.accuracy_decimals),
            device_class: spec.device_class.to_string(),
            state_class: spec.state_class.to_string(),
        }
    }
}

/// Kind-specific configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum EntityDetail {
    /// Nothing beyond the common attributes (switches, external entities).
    Plain,
    /// Ordered option list of a selector.
    Selector { options: Vec<String> },
    /// Measurement metadata of a sensor.
    Sensor(SensorClass),
    /// Device class of a binary sensor.
    BinarySensor {
        #[serde(skip_serializing_if = "Option::is_none")]
        device_class: Option<String>,
    },
}

impl EntityDetail {
    fn is_plain(&self) -> bool {
        matches!(self, Self::Plain)
    }
}

/// A selector, switch or sensor owned by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub internal: bool,
    pub disabled_by_default: bool,
    pub origin: Origin,
    #[serde(skip_serializing_if = "EntityDetail::is_plain")]
    pub detail: EntityDetail,
}

impl Entity {
    /// An entity owned by the host.
    pub fn external(id: EntityId, kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            name: name.into(),
            icon: None,
            internal: false,
            disabled_by_default: false,
            origin: Origin::External,
            detail: EntityDetail::Plain,
        }
    }

    /// Selector options, if this is a selector.
    pub fn options(&self) -> Option<&[String]> {
        match &self.detail {
            EntityDetail::Selector { options } => Some(options),
            _ => None,
        }
    }

    /// Sensor metadata, if this is a numeric sensor built by the composer.
    pub fn sensor_class(&self) -> Option<&SensorClass> {
        match &self.detail {
            EntityDetail::Sensor(class) => Some(class),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_external_entity_serializes_without_detail() {
        let entity = Entity::external(
            EntityId::new("room_temp").unwrap(),
            EntityKind::Sensor,
            "Room Temperature",
        );
        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "room_temp",
                "kind": "sensor",
                "name": "Room Temperature",
                "internal": false,
                "disabled_by_default": false,
                "origin": "external"
            })
        );
        assert!(entity.options().is_none());
        assert!(entity.sensor_class().is_none());
    }

    #[test]
    fn test_selector_detail_serializes_options() {
        let entity = Entity {
            id: EntityId::new("ac_swing").unwrap(),
            kind: EntityKind::Selector,
            name: "Swing".into(),
            icon: Some("mdi:arrow-up-down".into()),
            internal: false,
            disabled_by_default: false,
            origin: Origin::Composed,
            detail: EntityDetail::Selector {
                options: vec!["auto".into(), "left".into()],
            },
        };
        let value = serde_json::to_value(&entity).unwrap();
        assert_eq!(value["detail"], json!({"options": ["auto", "left"]}));
        assert_eq!(value["icon"], "mdi:arrow-up-down");
        assert_eq!(entity.options().unwrap().len(), 2);
    }

    #[test]
    fn test_sensor_class_from_spec() {
        let class = SensorClass::from(SensorSpec {
            unit: "W",
            accuracy_decimals: 0,
            device_class: "power",
            state_class: "measurement",
        });
        assert_eq!(class.unit_of_measurement, "W");
        assert_eq!(class.device_class, "power");
    }
}
