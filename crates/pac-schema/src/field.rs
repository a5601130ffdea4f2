//! # Feature Descriptors
//!
//! Typed description of one optional capability: its field name, value
//! domain, display defaults, and where the composed result lands on the
//! controller.
//!
//! The landing spot is a [`Target`], never a setter name. The controller
//! applies a `LinkSlot` or `ParameterSlot` with an exhaustive `match`, so a
//! feature whose wiring is missing fails to compile instead of failing a
//! runtime name lookup.

use serde::Serialize;

use pac_core::EntityKind;

// ─── Link and Parameter Slots ────────────────────────────────────────

/// Named entity slot on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkSlot {
    HorizontalSwingSelect,
    VerticalSwingSelect,
    NanoexSwitch,
    EcoSwitch,
    EconaviSwitch,
    MildDrySwitch,
    OutsideTemperatureSensor,
    CurrentTemperatureSensor,
    CurrentPowerConsumptionSensor,
    DefrostSensor,
}

impl LinkSlot {
    /// Returns all slots in controller declaration order.
    pub fn all() -> &'static [LinkSlot] {
        &[
            Self::HorizontalSwingSelect,
            Self::VerticalSwingSelect,
            Self::NanoexSwitch,
            Self::EcoSwitch,
            Self::EconaviSwitch,
            Self::MildDrySwitch,
            Self::OutsideTemperatureSensor,
            Self::CurrentTemperatureSensor,
            Self::CurrentPowerConsumptionSensor,
            Self::DefrostSensor,
        ]
    }

    /// Returns the snake_case slot name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::HorizontalSwingSelect => "horizontal_swing_select",
            Self::VerticalSwingSelect => "vertical_swing_select",
            Self::NanoexSwitch => "nanoex_switch",
            Self::EcoSwitch => "eco_switch",
            Self::EconaviSwitch => "econavi_switch",
            Self::MildDrySwitch => "mild_dry_switch",
            Self::OutsideTemperatureSensor => "outside_temperature_sensor",
            Self::CurrentTemperatureSensor => "current_temperature_sensor",
            Self::CurrentPowerConsumptionSensor => "current_power_consumption_sensor",
            Self::DefrostSensor => "defrost_sensor",
        }
    }

    /// The entity kind this slot accepts.
    pub fn accepts(&self) -> EntityKind {
        match self {
            Self::HorizontalSwingSelect | Self::VerticalSwingSelect => EntityKind::Selector,
            Self::NanoexSwitch | Self::EcoSwitch | Self::EconaviSwitch | Self::MildDrySwitch => {
                EntityKind::Switch
            }
            Self::OutsideTemperatureSensor
            | Self::CurrentTemperatureSensor
            | Self::CurrentPowerConsumptionSensor => EntityKind::Sensor,
            Self::DefrostSensor => EntityKind::BinarySensor,
        }
    }
}

impl std::fmt::Display for LinkSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named scalar parameter on the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterSlot {
    OutsideTemperatureOffset,
    CurrentTemperatureOffset,
}

impl ParameterSlot {
    /// Returns the snake_case parameter name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OutsideTemperatureOffset => "outside_temperature_offset",
            Self::CurrentTemperatureOffset => "current_temperature_offset",
        }
    }
}

impl std::fmt::Display for ParameterSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a feature's composed result is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// An entity linked under a named slot.
    Link(LinkSlot),
    /// A scalar copied onto the controller.
    Parameter(ParameterSlot),
}

// ─── Value Domains ───────────────────────────────────────────────────

/// Measurement defaults for a numeric sensor feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorSpec {
    pub unit: &'static str,
    pub accuracy_decimals: u8,
    pub device_class: &'static str,
    pub state_class: &'static str,
}

/// Value domain of a feature field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    /// Inline select entity with a fixed ordered option list.
    Selector { options: &'static [&'static str] },
    /// Inline switch entity.
    Switch,
    /// Inline numeric sensor entity.
    Sensor(SensorSpec),
    /// Inline binary sensor entity.
    BinarySensor { device_class: Option<&'static str> },
    /// Identifier of a sensor that already exists in the host registry.
    SensorReference,
    /// Integer adjustment within an inclusive range.
    Offset { min: i64, max: i64 },
}

impl FeatureKind {
    /// Kind of entity this domain produces or references, if any.
    pub fn entity_kind(&self) -> Option<EntityKind> {
        match self {
            Self::Selector { .. } => Some(EntityKind::Selector),
            Self::Switch => Some(EntityKind::Switch),
            Self::Sensor(_) | Self::SensorReference => Some(EntityKind::Sensor),
            Self::BinarySensor { .. } => Some(EntityKind::BinarySensor),
            Self::Offset { .. } => None,
        }
    }

    /// Composition phase for this domain.
    pub fn phase(&self) -> Phase {
        match self {
            Self::Selector { .. } => Phase::Selectors,
            Self::Switch => Phase::Switches,
            Self::Sensor(_) | Self::BinarySensor { .. } | Self::SensorReference => Phase::Sensors,
            Self::Offset { .. } => Phase::Parameters,
        }
    }
}

/// How presence of a feature is expressed in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// The field's value is the feature configuration itself.
    Direct,
    /// The field holds `supported: bool` plus a companion sub-configuration
    /// that is required once `supported` is true.
    Supported { companion: &'static str },
}

/// The order in which the composer visits features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Selectors,
    Switches,
    Sensors,
    Parameters,
}

impl Phase {
    /// All phases in composition order.
    pub fn all() -> &'static [Phase] {
        &[Self::Selectors, Self::Switches, Self::Sensors, Self::Parameters]
    }
}

// ─── Descriptor ──────────────────────────────────────────────────────

/// One optional capability of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureDescriptor {
    /// Field name in the configuration document.
    pub name: &'static str,
    /// Value domain.
    pub kind: FeatureKind,
    /// Presence gating.
    pub gate: Gate,
    /// Display name applied when the operator gives none.
    pub default_name: &'static str,
    /// Icon applied when the operator gives none.
    pub default_icon: Option<&'static str>,
    /// Where the result is attached.
    pub target: Target,
}

impl FeatureDescriptor {
    /// The companion key for capability-style features.
    pub fn companion(&self) -> Option<&'static str> {
        match self.gate {
            Gate::Supported { companion } => Some(companion),
            Gate::Direct => None,
        }
    }

    /// Whether this feature carries a `supported` flag.
    pub fn is_capability(&self) -> bool {
        matches!(self.gate, Gate::Supported { .. })
    }

    /// Composition phase of this feature.
    pub fn phase(&self) -> Phase {
        self.kind.phase()
    }
}
