//! # Entity Composer
//!
//! Walks a [`ValidatedConfig`] and builds the [`Controller`] graph in one
//! pass:
//!
//! 1. The controller, from the root fields.
//! 2. Features phase by phase (selectors, switches, sensors, parameters),
//!    each phase in merged-schema declaration order.
//!
//! Every entity is created exactly once and linked under its slot. Any
//! failure discards the partial graph.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use pac_core::{EntityId, EntityKind};
use pac_schema::registry::{DEFAULT_CONTROLLER_ICON, DEFAULT_CONTROLLER_ID, DEFAULT_CONTROLLER_NAME};
use pac_schema::{FeatureDescriptor, FeatureKind, Gate, LinkSlot, Phase, Target, ValidatedConfig};

use crate::controller::Controller;
use crate::entity::{Entity, EntityDetail, Origin, SensorClass};
use crate::error::CompositionError;
use crate::resolver::EntityResolver;

/// Operator-supplied entity attributes. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct EntityConfig {
    id: Option<EntityId>,
    name: Option<String>,
    icon: Option<String>,
    #[serde(default)]
    internal: bool,
    #[serde(default)]
    disabled_by_default: bool,
    unit_of_measurement: Option<String>,
    accuracy_decimals: Option<u32>,
    device_class: Option<String>,
    state_class: Option<String>,
}

/// Build the controller graph for a validated configuration.
///
/// # Errors
///
/// `CompositionError` with class `Reference` when a cross-reference does
/// not resolve to a sensor, or class `Composition` when the graph cannot
/// be assembled consistently.
pub fn compose(
    config: &ValidatedConfig,
    resolver: &dyn EntityResolver,
) -> Result<Controller, CompositionError> {
    let mut composer = Composer::new(config, resolver)?;
    for phase in Phase::all() {
        for feature in config.schema().in_phase(*phase) {
            composer.apply(feature)?;
        }
    }
    let controller = composer.controller;
    tracing::info!(
        id = %controller.id(),
        variant = %controller.variant(),
        links = controller.link_order().len(),
        "composed controller"
    );
    Ok(controller)
}

struct Composer<'a> {
    config: &'a ValidatedConfig,
    resolver: &'a dyn EntityResolver,
    controller: Controller,
    /// Identity owners, for duplicate detection.
    owners: HashMap<EntityId, String>,
}

impl<'a> Composer<'a> {
    fn new(
        config: &'a ValidatedConfig,
        resolver: &'a dyn EntityResolver,
    ) -> Result<Self, CompositionError> {
        let document = config.document();

        let id = match document.get("id").and_then(Value::as_str) {
            Some(raw) => identifier("id", raw)?,
            None => identifier("id", DEFAULT_CONTROLLER_ID)?,
        };
        let uart_id = document
            .get("uart_id")
            .and_then(Value::as_str)
            .map(|raw| identifier("uart_id", raw))
            .transpose()?;
        let name = string_or(document.get("name"), DEFAULT_CONTROLLER_NAME);
        let icon = string_or(document.get("icon"), DEFAULT_CONTROLLER_ICON);

        reject_host_identity(resolver, &id, "the controller")?;
        let mut owners = HashMap::new();
        owners.insert(id.clone(), "the controller".to_string());

        Ok(Self {
            config,
            resolver,
            controller: Controller::new(id, name, icon, config.variant(), uart_id),
            owners,
        })
    }

    fn apply(&mut self, feature: &'static FeatureDescriptor) -> Result<(), CompositionError> {
        let config = self.config;
        let Some(value) = config.document().get(feature.name) else {
            return Ok(());
        };

        match (feature.target, &feature.kind) {
            (Target::Parameter(slot), _) => {
                let offset = whole_number(value)
                    .and_then(|v| i8::try_from(v).ok())
                    .ok_or_else(|| CompositionError::InvalidConfiguration {
                        field: feature.name.to_string(),
                        reason: format!("expected a small integer, found {value}"),
                    })?;
                self.controller.set_parameter(slot, offset);
                Ok(())
            }
            (Target::Link(slot), FeatureKind::SensorReference) => {
                let entity = self.resolve_reference(feature, value)?;
                self.controller.attach(slot, entity)
            }
            (Target::Link(slot), kind) => {
                let Some(sub) = self.sub_configuration(feature, value)? else {
                    return Ok(());
                };
                let entity = self.build_entity(feature, kind, slot, sub)?;
                self.controller.attach(slot, entity)
            }
        }
    }

    /// The entity sub-configuration, or `None` when a capability is not
    /// supported.
    fn sub_configuration<'v>(
        &self,
        feature: &'static FeatureDescriptor,
        value: &'v Value,
    ) -> Result<Option<(&'v Value, String)>, CompositionError> {
        match feature.gate {
            Gate::Direct => Ok(Some((value, feature.name.to_string()))),
            Gate::Supported { companion } => {
                let supported = value
                    .get("supported")
                    .and_then(Value::as_bool)
                    .unwrap_or(false);
                if !supported {
                    if value.get(companion).is_some() {
                        tracing::debug!(
                            feature = feature.name,
                            "capability not supported; companion ignored"
                        );
                    }
                    return Ok(None);
                }
                match value.get(companion) {
                    Some(sub) => Ok(Some((sub, format!("{}.{companion}", feature.name)))),
                    None => Err(CompositionError::MissingCompanion {
                        feature: feature.name,
                        companion,
                    }),
                }
            }
        }
    }

    fn build_entity(
        &mut self,
        feature: &'static FeatureDescriptor,
        kind: &FeatureKind,
        slot: LinkSlot,
        (sub, field): (&Value, String),
    ) -> Result<Entity, CompositionError> {
        let overrides: EntityConfig =
            serde_json::from_value(integers_normalized(sub)).map_err(|e| {
                CompositionError::InvalidConfiguration {
                    field: field.clone(),
                    reason: e.to_string(),
                }
            })?;

        let id = match overrides.id {
            Some(id) => id,
            None => self
                .controller
                .id()
                .derive(feature.name)
                .map_err(|source| CompositionError::InvalidIdentity {
                    field: format!("{field}.id"),
                    source,
                })?,
        };
        self.claim(&id, feature.name)?;

        let detail = match kind {
            FeatureKind::Selector { options } => EntityDetail::Selector {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
            FeatureKind::Switch => EntityDetail::Plain,
            FeatureKind::Sensor(spec) => {
                let defaults = SensorClass::from(*spec);
                EntityDetail::Sensor(SensorClass {
                    unit_of_measurement: overrides
                        .unit_of_measurement
                        .unwrap_or(defaults.unit_of_measurement),
                    accuracy_decimals: overrides
                        .accuracy_decimals
                        .unwrap_or(defaults.accuracy_decimals),
                    device_class: overrides.device_class.unwrap_or(defaults.device_class),
                    state_class: overrides.state_class.unwrap_or(defaults.state_class),
                })
            }
            FeatureKind::BinarySensor { device_class } => EntityDetail::BinarySensor {
                device_class: overrides
                    .device_class
                    .or_else(|| device_class.map(str::to_string)),
            },
            FeatureKind::SensorReference | FeatureKind::Offset { .. } => {
                return Err(CompositionError::InvalidConfiguration {
                    field,
                    reason: "feature does not describe an inline entity".to_string(),
                });
            }
        };

        Ok(Entity {
            id,
            kind: slot.accepts(),
            name: overrides
                .name
                .unwrap_or_else(|| feature.default_name.to_string()),
            icon: overrides
                .icon
                .or_else(|| feature.default_icon.map(str::to_string)),
            internal: overrides.internal,
            disabled_by_default: overrides.disabled_by_default,
            origin: Origin::Composed,
            detail,
        })
    }

    fn resolve_reference(
        &mut self,
        feature: &'static FeatureDescriptor,
        value: &Value,
    ) -> Result<Entity, CompositionError> {
        let raw = value
            .as_str()
            .ok_or_else(|| CompositionError::InvalidConfiguration {
                field: feature.name.to_string(),
                reason: format!("expected an entity identifier, found {value}"),
            })?;
        let id = identifier(feature.name, raw)?;

        let entity = self.resolver.resolve_existing_entity(&id).ok_or_else(|| {
            CompositionError::UnresolvedReference {
                feature: feature.name,
                id: id.clone(),
            }
        })?;
        if entity.kind != EntityKind::Sensor {
            return Err(CompositionError::ReferenceKindMismatch {
                feature: feature.name,
                id,
                expected: EntityKind::Sensor,
                found: entity.kind,
            });
        }
        self.record(&id, feature.name)?;
        Ok(entity)
    }

    /// Record `owner` as the holder of a newly composed `id`.
    fn claim(&mut self, id: &EntityId, owner: &str) -> Result<(), CompositionError> {
        reject_host_identity(self.resolver, id, owner)?;
        self.record(id, owner)
    }

    /// Record `owner` as the holder of `id` within the graph.
    fn record(&mut self, id: &EntityId, owner: &str) -> Result<(), CompositionError> {
        if let Some(first) = self.owners.get(id) {
            return Err(CompositionError::DuplicateIdentity {
                id: id.clone(),
                first: first.clone(),
                second: owner.to_string(),
            });
        }
        self.owners.insert(id.clone(), owner.to_string());
        Ok(())
    }
}

/// A composed identity must not shadow an entity the host already owns.
fn reject_host_identity(
    resolver: &dyn EntityResolver,
    id: &EntityId,
    owner: &str,
) -> Result<(), CompositionError> {
    if resolver.resolve_existing_entity(id).is_some() {
        return Err(CompositionError::DuplicateIdentity {
            id: id.clone(),
            first: "an existing host entity".to_string(),
            second: owner.to_string(),
        });
    }
    Ok(())
}

/// Integer value of a number, accepting whole-number floats such as `5.0`,
/// which JSON Schema counts as integers.
fn whole_number(value: &Value) -> Option<i64> {
    if let Some(v) = value.as_i64() {
        return Some(v);
    }
    let f = value.as_f64()?;
    let in_range = f >= i64::MIN as f64 && f < i64::MAX as f64;
    (f.fract() == 0.0 && in_range).then_some(f as i64)
}

/// Copy of `value` with whole-number floats rewritten as integers, so that
/// integer-typed fields deserialize the way the validator accepted them.
fn integers_normalized(value: &Value) -> Value {
    match value {
        Value::Number(n) if n.is_f64() => match whole_number(value) {
            Some(i) => Value::from(i),
            None => Value::Number(n.clone()),
        },
        Value::Array(items) => Value::Array(items.iter().map(integers_normalized).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), integers_normalized(v)))
                .collect(),
        ),
        other => other.clone(),
    }
}

fn identifier(field: &str, raw: &str) -> Result<EntityId, CompositionError> {
    EntityId::new(raw).map_err(|source| CompositionError::InvalidIdentity {
        field: field.to_string(),
        source,
    })
}

fn string_or(value: Option<&Value>, default: &str) -> String {
    value
        .and_then(Value::as_str)
        .unwrap_or(default)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::EntityRegistry;
    use pac_core::ConfigDocument;
    use pac_schema::{validate_document, ParameterSlot, SchemaRegistry};
    use serde_json::json;

    fn validated(value: Value) -> ValidatedConfig {
        let document = ConfigDocument::from_value(value).unwrap();
        validate_document(&document, &SchemaRegistry::builtin()).unwrap()
    }

    fn compose_empty(value: Value) -> Result<Controller, CompositionError> {
        compose(&validated(value), &EntityRegistry::new())
    }

    #[test]
    fn test_controller_defaults() {
        let controller = compose_empty(json!({"variant": "wlan"})).unwrap();
        assert_eq!(controller.id().as_str(), "panasonic_ac");
        assert_eq!(controller.name(), "Panasonic AC");
        assert_eq!(controller.icon(), "mdi:air-conditioner");
        assert!(controller.uart_id().is_none());
        assert_eq!(controller.links().count(), 0);
    }

    #[test]
    fn test_controller_overrides() {
        let controller = compose_empty(json!({
            "variant": "cnt",
            "id": "bedroom",
            "name": "Bedroom",
            "icon": "mdi:fan",
            "uart_id": "uart_bus"
        }))
        .unwrap();
        assert_eq!(controller.id().as_str(), "bedroom");
        assert_eq!(controller.name(), "Bedroom");
        assert_eq!(controller.icon(), "mdi:fan");
        assert_eq!(controller.uart_id().unwrap().as_str(), "uart_bus");
    }

    #[test]
    fn test_entity_defaults_derive_from_controller() {
        let controller = compose_empty(json!({"variant": "cnt", "id": "ac", "eco_switch": {}})).unwrap();
        let eco = controller.link(LinkSlot::EcoSwitch).unwrap();
        assert_eq!(eco.id.as_str(), "ac_eco_switch");
        assert_eq!(eco.name, "Eco");
        assert_eq!(eco.icon, None);
        assert_eq!(eco.origin, Origin::Composed);
    }

    #[test]
    fn test_sensor_overrides_are_individual() {
        let controller = compose_empty(json!({
            "variant": "cnt",
            "current_power_consumption": {"accuracy_decimals": 2, "name": "Power"}
        }))
        .unwrap();
        let power = controller
            .link(LinkSlot::CurrentPowerConsumptionSensor)
            .unwrap();
        let class = power.sensor_class().unwrap();
        assert_eq!(class.accuracy_decimals, 2);
        assert_eq!(class.unit_of_measurement, "W");
        assert_eq!(class.device_class, "power");
        assert_eq!(power.name, "Power");
    }

    #[test]
    fn test_defrost_binary_sensor() {
        let controller = compose_empty(json!({"variant": "wlan", "defrost_sensor": {}})).unwrap();
        let defrost = controller.link(LinkSlot::DefrostSensor).unwrap();
        assert_eq!(defrost.kind, EntityKind::BinarySensor);
        assert_eq!(defrost.icon.as_deref(), Some("mdi:snowflake-melt"));
    }

    #[test]
    fn test_parameters_copied() {
        let controller = compose_empty(json!({
            "variant": "cnt",
            "outside_temperature_offset": -5,
            "current_temperature_offset": 5
        }))
        .unwrap();
        assert_eq!(
            controller.parameter(ParameterSlot::OutsideTemperatureOffset),
            Some(-5)
        );
        assert_eq!(
            controller.parameter(ParameterSlot::CurrentTemperatureOffset),
            Some(5)
        );
        assert_eq!(controller.links().count(), 0);
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let err = compose_empty(json!({
            "variant": "cnt",
            "eco_switch": {"id": "shared"},
            "mild_dry_switch": {"id": "shared"}
        }))
        .unwrap_err();
        match err {
            CompositionError::DuplicateIdentity { id, first, second } => {
                assert_eq!(id.as_str(), "shared");
                assert_eq!(first, "eco_switch");
                assert_eq!(second, "mild_dry_switch");
            }
            other => panic!("Expected DuplicateIdentity, got: {other}"),
        }
    }

    #[test]
    fn test_entity_cannot_reuse_controller_id() {
        let err = compose_empty(json!({"variant": "wlan", "nanoex_switch": {"id": "panasonic_ac"}}))
            .unwrap_err();
        assert!(matches!(err, CompositionError::DuplicateIdentity { .. }));
    }

    #[test]
    fn test_entity_cannot_reuse_host_id() {
        let registry = EntityRegistry::from_yaml_str("- {id: taken, kind: switch}\n").unwrap();
        let config = validated(json!({"variant": "wlan", "nanoex_switch": {"id": "taken"}}));
        let err = compose(&config, &registry).unwrap_err();
        assert!(matches!(err, CompositionError::DuplicateIdentity { .. }));
    }

    #[test]
    fn test_whole_number_floats_compose() {
        let controller = compose_empty(json!({
            "variant": "cnt",
            "current_temperature_offset": 5.0,
            "outside_temperature_offset": -5.0,
            "current_power_consumption": {"accuracy_decimals": 1.0}
        }))
        .unwrap();
        assert_eq!(
            controller.parameter(ParameterSlot::CurrentTemperatureOffset),
            Some(5)
        );
        assert_eq!(
            controller.parameter(ParameterSlot::OutsideTemperatureOffset),
            Some(-5)
        );
        let power = controller
            .link(LinkSlot::CurrentPowerConsumptionSensor)
            .unwrap();
        assert_eq!(power.sensor_class().unwrap().accuracy_decimals, 1);
    }

    #[test]
    fn test_whole_number() {
        assert_eq!(whole_number(&json!(3)), Some(3));
        assert_eq!(whole_number(&json!(-2.0)), Some(-2));
        assert_eq!(whole_number(&json!(2.5)), None);
        assert_eq!(whole_number(&json!("2")), None);
        assert_eq!(
            integers_normalized(&json!({"a": [1.0, 1.5], "b": "x"})),
            json!({"a": [1, 1.5], "b": "x"})
        );
    }

    #[test]
    fn test_controller_cannot_reuse_host_id() {
        let registry = EntityRegistry::from_yaml_str("- {id: panasonic_ac, kind: sensor}\n").unwrap();
        let config = validated(json!({
            "variant": "cnt",
            "current_temperature_sensor": "panasonic_ac"
        }));
        let err = compose(&config, &registry).unwrap_err();
        match err {
            CompositionError::DuplicateIdentity { id, second, .. } => {
                assert_eq!(id.as_str(), "panasonic_ac");
                assert_eq!(second, "the controller");
            }
            other => panic!("Expected DuplicateIdentity, got: {other}"),
        }
    }

    #[test]
    fn test_reference_identity_is_recorded() {
        let registry = EntityRegistry::from_yaml_str("- {id: room_temp, kind: sensor}\n").unwrap();
        let config = validated(json!({"variant": "cnt", "current_temperature_sensor": "room_temp"}));
        let resolver: &dyn EntityResolver = &registry;
        let mut composer = Composer::new(&config, resolver).unwrap();
        let feature = config.schema().feature("current_temperature_sensor").unwrap();
        composer.apply(feature).unwrap();
        let err = composer
            .record(&EntityId::new("room_temp").unwrap(), "eco_switch")
            .unwrap_err();
        assert!(matches!(err, CompositionError::DuplicateIdentity { .. }));
    }

    #[test]
    fn test_reference_must_be_sensor() {
        let registry = EntityRegistry::from_yaml_str("- {id: hall_light, kind: switch}\n").unwrap();
        let config = validated(json!({"variant": "cnt", "current_temperature_sensor": "hall_light"}));
        let err = compose(&config, &registry).unwrap_err();
        assert!(matches!(
            err,
            CompositionError::ReferenceKindMismatch {
                found: EntityKind::Switch,
                ..
            }
        ));
        assert_eq!(err.class(), pac_core::ErrorClass::Reference);
    }
}
