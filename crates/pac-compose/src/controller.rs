//! # Controller
//!
//! Root of the composed graph. Holds the controller's own identity and
//! display metadata, one optional entity per [`LinkSlot`], the scalar
//! parameters, and the climate traits derived from what was linked.
//!
//! Slots and parameters are applied with exhaustive matches. There is no
//! name-based dispatch, so a slot added to the enum without a field here
//! does not compile.

use serde::Serialize;

use pac_core::{EntityId, Variant};
use pac_schema::{LinkSlot, ParameterSlot};

use crate::entity::Entity;
use crate::error::CompositionError;
use crate::traits::ClimateTraits;

/// One optional entity per link slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Links {
    #[serde(skip_serializing_if = "Option::is_none")]
    horizontal_swing_select: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    vertical_swing_select: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    nanoex_switch: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    eco_switch: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    econavi_switch: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    mild_dry_switch: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    outside_temperature_sensor: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_temperature_sensor: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_power_consumption_sensor: Option<Entity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    defrost_sensor: Option<Entity>,
}

impl Links {
    fn slot(&self, slot: LinkSlot) -> &Option<Entity> {
        match slot {
            LinkSlot::HorizontalSwingSelect => &self.horizontal_swing_select,
            LinkSlot::VerticalSwingSelect => &self.vertical_swing_select,
            LinkSlot::NanoexSwitch => &self.nanoex_switch,
            LinkSlot::EcoSwitch => &self.eco_switch,
            LinkSlot::EconaviSwitch => &self.econavi_switch,
            LinkSlot::MildDrySwitch => &self.mild_dry_switch,
            LinkSlot::OutsideTemperatureSensor => &self.outside_temperature_sensor,
            LinkSlot::CurrentTemperatureSensor => &self.current_temperature_sensor,
            LinkSlot::CurrentPowerConsumptionSensor => &self.current_power_consumption_sensor,
            LinkSlot::DefrostSensor => &self.defrost_sensor,
        }
    }

    fn slot_mut(&mut self, slot: LinkSlot) -> &mut Option<Entity> {
        match slot {
            LinkSlot::HorizontalSwingSelect => &mut self.horizontal_swing_select,
            LinkSlot::VerticalSwingSelect => &mut self.vertical_swing_select,
            LinkSlot::NanoexSwitch => &mut self.nanoex_switch,
            LinkSlot::EcoSwitch => &mut self.eco_switch,
            LinkSlot::EconaviSwitch => &mut self.econavi_switch,
            LinkSlot::MildDrySwitch => &mut self.mild_dry_switch,
            LinkSlot::OutsideTemperatureSensor => &mut self.outside_temperature_sensor,
            LinkSlot::CurrentTemperatureSensor => &mut self.current_temperature_sensor,
            LinkSlot::CurrentPowerConsumptionSensor => &mut self.current_power_consumption_sensor,
            LinkSlot::DefrostSensor => &mut self.defrost_sensor,
        }
    }
}

/// Scalar parameters copied from the configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Parameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    outside_temperature_offset: Option<i8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_temperature_offset: Option<i8>,
}

/// The composed climate controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Controller {
    id: EntityId,
    name: String,
    icon: String,
    variant: Variant,
    #[serde(skip_serializing_if = "Option::is_none")]
    uart_id: Option<EntityId>,
    traits: ClimateTraits,
    links: Links,
    parameters: Parameters,
    link_order: Vec<LinkSlot>,
}

impl Controller {
    pub(crate) fn new(
        id: EntityId,
        name: String,
        icon: String,
        variant: Variant,
        uart_id: Option<EntityId>,
    ) -> Self {
        Self {
            id,
            name,
            icon,
            variant,
            uart_id,
            traits: ClimateTraits::default(),
            links: Links::default(),
            parameters: Parameters::default(),
            link_order: Vec::new(),
        }
    }

    pub fn id(&self) -> &EntityId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn icon(&self) -> &str {
        &self.icon
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn uart_id(&self) -> Option<&EntityId> {
        self.uart_id.as_ref()
    }

    pub fn traits(&self) -> &ClimateTraits {
        &self.traits
    }

    /// Link `entity` under `slot`.
    ///
    /// # Errors
    ///
    /// `SlotOccupied` if the slot already holds an entity, or
    /// `SlotKindMismatch` if the slot does not accept the entity's kind.
    pub(crate) fn attach(&mut self, slot: LinkSlot, entity: Entity) -> Result<(), CompositionError> {
        if entity.kind != slot.accepts() {
            return Err(CompositionError::SlotKindMismatch {
                slot,
                expected: slot.accepts(),
                found: entity.kind,
            });
        }
        let cell = self.links.slot_mut(slot);
        if cell.is_some() {
            return Err(CompositionError::SlotOccupied { slot });
        }
        tracing::debug!(%slot, id = %entity.id, origin = ?entity.origin, "linked entity");
        *cell = Some(entity);
        self.link_order.push(slot);
        self.traits.on_link(slot);
        Ok(())
    }

    /// Set a scalar parameter.
    pub(crate) fn set_parameter(&mut self, slot: ParameterSlot, value: i8) {
        let cell = match slot {
            ParameterSlot::OutsideTemperatureOffset => &mut self.parameters.outside_temperature_offset,
            ParameterSlot::CurrentTemperatureOffset => &mut self.parameters.current_temperature_offset,
        };
        *cell = Some(value);
    }

    /// Entity linked under `slot`, if any.
    pub fn link(&self, slot: LinkSlot) -> Option<&Entity> {
        self.links.slot(slot).as_ref()
    }

    /// Value of a scalar parameter, if configured.
    pub fn parameter(&self, slot: ParameterSlot) -> Option<i8> {
        match slot {
            ParameterSlot::OutsideTemperatureOffset => self.parameters.outside_temperature_offset,
            ParameterSlot::CurrentTemperatureOffset => self.parameters.current_temperature_offset,
        }
    }

    /// Linked entities in registration order.
    pub fn links(&self) -> impl Iterator<Item = (LinkSlot, &Entity)> + '_ {
        self.link_order
            .iter()
            .filter_map(|slot| self.link(*slot).map(|entity| (*slot, entity)))
    }

    /// Slots in the order they were linked.
    pub fn link_order(&self) -> &[LinkSlot] {
        &self.link_order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityDetail, Origin};
    use pac_core::EntityKind;

    fn controller() -> Controller {
        Controller::new(
            EntityId::new("ac").unwrap(),
            "AC".into(),
            "mdi:air-conditioner".into(),
            Variant::Cnt,
            None,
        )
    }

    fn switch(id: &str) -> Entity {
        Entity {
            id: EntityId::new(id).unwrap(),
            kind: EntityKind::Switch,
            name: id.into(),
            icon: None,
            internal: false,
            disabled_by_default: false,
            origin: Origin::Composed,
            detail: EntityDetail::Plain,
        }
    }

    #[test]
    fn test_attach_records_order() {
        let mut c = controller();
        c.attach(LinkSlot::EcoSwitch, switch("eco")).unwrap();
        c.attach(LinkSlot::NanoexSwitch, switch("nanoex")).unwrap();
        assert_eq!(c.link_order(), &[LinkSlot::EcoSwitch, LinkSlot::NanoexSwitch]);
        let ids: Vec<&str> = c.links().map(|(_, e)| e.id.as_str()).collect();
        assert_eq!(ids, ["eco", "nanoex"]);
        assert!(c.link(LinkSlot::MildDrySwitch).is_none());
    }

    #[test]
    fn test_attach_rejects_occupied_slot() {
        let mut c = controller();
        c.attach(LinkSlot::EcoSwitch, switch("eco")).unwrap();
        let err = c.attach(LinkSlot::EcoSwitch, switch("eco2")).unwrap_err();
        assert_eq!(err, CompositionError::SlotOccupied { slot: LinkSlot::EcoSwitch });
        assert_eq!(c.link(LinkSlot::EcoSwitch).unwrap().id.as_str(), "eco");
    }

    #[test]
    fn test_attach_rejects_wrong_kind() {
        let mut c = controller();
        let err = c
            .attach(LinkSlot::OutsideTemperatureSensor, switch("eco"))
            .unwrap_err();
        assert!(matches!(err, CompositionError::SlotKindMismatch { .. }));
        assert!(c.link_order().is_empty());
    }

    #[test]
    fn test_parameters() {
        let mut c = controller();
        assert_eq!(c.parameter(ParameterSlot::CurrentTemperatureOffset), None);
        c.set_parameter(ParameterSlot::CurrentTemperatureOffset, -3);
        assert_eq!(c.parameter(ParameterSlot::CurrentTemperatureOffset), Some(-3));
        assert_eq!(c.parameter(ParameterSlot::OutsideTemperatureOffset), None);
    }

    #[test]
    fn test_serialization_skips_empty_slots() {
        let mut c = controller();
        c.attach(LinkSlot::NanoexSwitch, switch("nanoex")).unwrap();
        let value = serde_json::to_value(&c).unwrap();
        let links = value["links"].as_object().unwrap();
        assert_eq!(links.len(), 1);
        assert!(links.contains_key("nanoex_switch"));
        assert_eq!(value["link_order"], serde_json::json!(["nanoex_switch"]));
        assert!(value.get("uart_id").is_none());
    }
}
