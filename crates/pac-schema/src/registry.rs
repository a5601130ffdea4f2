//! # Schema Registry
//!
//! The single source of truth for which fields a configuration may contain.
//! Feature tables are `const` data: one table shared by every variant and
//! one table per variant for its exclusive features. Nothing here changes
//! at runtime, so a registry is `Copy` and can be shared across threads.
//!
//! ## Merge Policy
//!
//! A variant's schema is the common table followed by the variant's
//! exclusive table. When both declare the same field name, the exclusive
//! descriptor replaces the common one in place, keeping declaration order.

use pac_core::Variant;

use crate::field::{
    FeatureDescriptor, FeatureKind, Gate, LinkSlot, ParameterSlot, Phase, SensorSpec, Target,
};

// ─── Constants ───────────────────────────────────────────────────────

/// Options of the horizontal swing selector, in display order.
pub const HORIZONTAL_SWING_OPTIONS: &[&str] =
    &["auto", "left", "left_center", "center", "right_center", "right"];

/// Options of the vertical swing selector, in display order. `swing`
/// selects continuous movement.
pub const VERTICAL_SWING_OPTIONS: &[&str] = &[
    "swing",
    "auto",
    "up",
    "up_center",
    "center",
    "down_center",
    "down",
];

/// Inclusive lower bound of the temperature offsets.
pub const OFFSET_MIN: i64 = -5;
/// Inclusive upper bound of the temperature offsets.
pub const OFFSET_MAX: i64 = 5;

pub const DEFAULT_CONTROLLER_ID: &str = "panasonic_ac";
pub const DEFAULT_CONTROLLER_NAME: &str = "Panasonic AC";
pub const DEFAULT_CONTROLLER_ICON: &str = "mdi:air-conditioner";

/// Root fields describing the controller itself, accepted for every variant.
pub const ROOT_FIELDS: &[&str] = &["variant", "id", "name", "icon", "uart_id"];

const TEMPERATURE_SENSOR: SensorSpec = SensorSpec {
    unit: "°C",
    accuracy_decimals: 0,
    device_class: "temperature",
    state_class: "measurement",
};

const POWER_SENSOR: SensorSpec = SensorSpec {
    unit: "W",
    accuracy_decimals: 0,
    device_class: "power",
    state_class: "measurement",
};

// ─── Feature Tables ──────────────────────────────────────────────────

/// Features available on every variant.
pub const COMMON_FEATURES: &[FeatureDescriptor] = &[
    FeatureDescriptor {
        name: "horizontal_swing_select",
        kind: FeatureKind::Selector {
            options: HORIZONTAL_SWING_OPTIONS,
        },
        gate: Gate::Supported {
            companion: "selector",
        },
        default_name: "Horizontal Swing",
        default_icon: Some("mdi:arrow-left-right"),
        target: Target::Link(LinkSlot::HorizontalSwingSelect),
    },
    FeatureDescriptor {
        name: "vertical_swing_select",
        kind: FeatureKind::Selector {
            options: VERTICAL_SWING_OPTIONS,
        },
        gate: Gate::Supported {
            companion: "selector",
        },
        default_name: "Vertical Swing",
        default_icon: Some("mdi:arrow-up-down"),
        target: Target::Link(LinkSlot::VerticalSwingSelect),
    },
    FeatureDescriptor {
        name: "nanoex_switch",
        kind: FeatureKind::Switch,
        gate: Gate::Direct,
        default_name: "NanoeX",
        default_icon: Some("mdi:air-filter"),
        target: Target::Link(LinkSlot::NanoexSwitch),
    },
    FeatureDescriptor {
        name: "outside_temperature",
        kind: FeatureKind::Sensor(TEMPERATURE_SENSOR),
        gate: Gate::Direct,
        default_name: "Outside Temperature",
        default_icon: None,
        target: Target::Link(LinkSlot::OutsideTemperatureSensor),
    },
    FeatureDescriptor {
        name: "defrost_sensor",
        kind: FeatureKind::BinarySensor { device_class: None },
        gate: Gate::Direct,
        default_name: "Defrost",
        default_icon: Some("mdi:snowflake-melt"),
        target: Target::Link(LinkSlot::DefrostSensor),
    },
    FeatureDescriptor {
        name: "outside_temperature_offset",
        kind: FeatureKind::Offset {
            min: OFFSET_MIN,
            max: OFFSET_MAX,
        },
        gate: Gate::Direct,
        default_name: "Outside Temperature Offset",
        default_icon: None,
        target: Target::Parameter(ParameterSlot::OutsideTemperatureOffset),
    },
];

/// Features only the CN-CNT adapter exposes.
pub const CNT_FEATURES: &[FeatureDescriptor] = &[
    FeatureDescriptor {
        name: "eco_switch",
        kind: FeatureKind::Switch,
        gate: Gate::Direct,
        default_name: "Eco",
        default_icon: None,
        target: Target::Link(LinkSlot::EcoSwitch),
    },
    FeatureDescriptor {
        name: "econavi_switch",
        kind: FeatureKind::Switch,
        gate: Gate::Direct,
        default_name: "Econavi",
        default_icon: None,
        target: Target::Link(LinkSlot::EconaviSwitch),
    },
    FeatureDescriptor {
        name: "mild_dry_switch",
        kind: FeatureKind::Switch,
        gate: Gate::Direct,
        default_name: "Mild Dry",
        default_icon: None,
        target: Target::Link(LinkSlot::MildDrySwitch),
    },
    FeatureDescriptor {
        name: "current_temperature_sensor",
        kind: FeatureKind::SensorReference,
        gate: Gate::Direct,
        default_name: "Current Temperature",
        default_icon: None,
        target: Target::Link(LinkSlot::CurrentTemperatureSensor),
    },
    FeatureDescriptor {
        name: "current_power_consumption",
        kind: FeatureKind::Sensor(POWER_SENSOR),
        gate: Gate::Direct,
        default_name: "Current Power Consumption",
        default_icon: None,
        target: Target::Link(LinkSlot::CurrentPowerConsumptionSensor),
    },
    FeatureDescriptor {
        name: "current_temperature_offset",
        kind: FeatureKind::Offset {
            min: OFFSET_MIN,
            max: OFFSET_MAX,
        },
        gate: Gate::Direct,
        default_name: "Current Temperature Offset",
        default_icon: None,
        target: Target::Parameter(ParameterSlot::CurrentTemperatureOffset),
    },
];

/// Features only the CN-WLAN adapter exposes.
pub const WLAN_FEATURES: &[FeatureDescriptor] = &[];

// ─── Registry ────────────────────────────────────────────────────────

/// Lookup surface over the feature tables.
#[derive(Debug, Clone, Copy)]
pub struct SchemaRegistry {
    common: &'static [FeatureDescriptor],
    wlan: &'static [FeatureDescriptor],
    cnt: &'static [FeatureDescriptor],
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SchemaRegistry {
    /// The registry backed by the built-in feature tables.
    pub const fn builtin() -> Self {
        Self {
            common: COMMON_FEATURES,
            wlan: WLAN_FEATURES,
            cnt: CNT_FEATURES,
        }
    }

    /// A registry over custom tables.
    pub const fn with_tables(
        common: &'static [FeatureDescriptor],
        wlan: &'static [FeatureDescriptor],
        cnt: &'static [FeatureDescriptor],
    ) -> Self {
        Self { common, wlan, cnt }
    }

    /// Features shared by all variants.
    pub fn common_features(&self) -> &'static [FeatureDescriptor] {
        self.common
    }

    /// Features exclusive to one variant.
    pub fn exclusive_features(&self, variant: Variant) -> &'static [FeatureDescriptor] {
        match variant {
            Variant::Wlan => self.wlan,
            Variant::Cnt => self.cnt,
        }
    }

    /// The merged schema of a variant.
    pub fn merged_schema(&self, variant: Variant) -> MergedSchema {
        MergedSchema {
            variant,
            registry: *self,
            features: merge(self.common, self.exclusive_features(variant)),
        }
    }

    /// Resolve a discriminant value to its merged schema.
    ///
    /// Returns `None` if the discriminant does not name a declared variant.
    pub fn lookup_variant_schema(&self, discriminant: &str) -> Option<MergedSchema> {
        let variant: Variant = discriminant.parse().ok()?;
        Some(self.merged_schema(variant))
    }

    /// Find a feature by field name in any table.
    ///
    /// Common features are searched first, then variant tables in
    /// declaration order.
    pub fn lookup_feature_schema(&self, name: &str) -> Option<&'static FeatureDescriptor> {
        std::iter::once(self.common)
            .chain(Variant::all().iter().map(|v| self.exclusive_features(*v)))
            .flat_map(|table| table.iter())
            .find(|f| f.name == name)
    }

    /// Variants whose merged schema declares `name`.
    pub fn variants_declaring(&self, name: &str) -> Vec<Variant> {
        Variant::all()
            .iter()
            .copied()
            .filter(|v| self.merged_schema(*v).contains(name))
            .collect()
    }
}

/// Union of `common` and `exclusive`, with exclusive entries replacing
/// common ones of the same name in place.
fn merge(
    common: &'static [FeatureDescriptor],
    exclusive: &'static [FeatureDescriptor],
) -> Vec<&'static FeatureDescriptor> {
    let mut merged: Vec<&'static FeatureDescriptor> = common.iter().collect();
    for feature in exclusive {
        match merged.iter().position(|f| f.name == feature.name) {
            Some(idx) => merged[idx] = feature,
            None => merged.push(feature),
        }
    }
    merged
}

// ─── Merged Schema ───────────────────────────────────────────────────

/// The field set that applies to one configuration after dispatch.
#[derive(Debug, Clone)]
pub struct MergedSchema {
    variant: Variant,
    registry: SchemaRegistry,
    features: Vec<&'static FeatureDescriptor>,
}

impl MergedSchema {
    /// The variant this schema was merged for.
    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// The registry the schema was drawn from.
    pub fn registry(&self) -> &SchemaRegistry {
        &self.registry
    }

    /// All features in declaration order.
    pub fn features(&self) -> &[&'static FeatureDescriptor] {
        &self.features
    }

    /// Look up a feature by field name.
    pub fn feature(&self, name: &str) -> Option<&'static FeatureDescriptor> {
        self.features.iter().copied().find(|f| f.name == name)
    }

    /// Whether `name` is a root field or a feature of this schema.
    pub fn contains(&self, name: &str) -> bool {
        ROOT_FIELDS.contains(&name) || self.feature(name).is_some()
    }

    /// Features of one composition phase, in declaration order.
    pub fn in_phase(&self, phase: Phase) -> impl Iterator<Item = &'static FeatureDescriptor> + '_ {
        self.features.iter().copied().filter(move |f| f.phase() == phase)
    }

    /// Render this schema as a JSON Schema document.
    pub fn to_json_schema(&self) -> serde_json::Value {
        crate::render::render_merged_schema(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_cnt_schema_is_union() {
        let schema = SchemaRegistry::builtin().merged_schema(Variant::Cnt);
        assert_eq!(
            schema.features().len(),
            COMMON_FEATURES.len() + CNT_FEATURES.len()
        );
        assert!(schema.contains("eco_switch"));
        assert!(schema.contains("nanoex_switch"));
        assert!(schema.contains("current_temperature_offset"));
    }

    #[test]
    fn test_wlan_schema_is_common_only() {
        let schema = SchemaRegistry::builtin().merged_schema(Variant::Wlan);
        let names: Vec<&str> = schema.features().iter().map(|f| f.name).collect();
        let common: Vec<&str> = COMMON_FEATURES.iter().map(|f| f.name).collect();
        assert_eq!(names, common);
        assert!(!schema.contains("eco_switch"));
        assert!(!schema.contains("current_temperature_sensor"));
    }

    #[test]
    fn test_root_fields_are_always_declared() {
        for v in Variant::all() {
            let schema = SchemaRegistry::builtin().merged_schema(*v);
            for field in ROOT_FIELDS {
                assert!(schema.contains(field));
            }
        }
    }

    #[test]
    fn test_lookup_variant_schema() {
        let registry = SchemaRegistry::builtin();
        assert_eq!(
            registry.lookup_variant_schema("CNT").unwrap().variant(),
            Variant::Cnt
        );
        assert_eq!(
            registry.lookup_variant_schema("wlan").unwrap().variant(),
            Variant::Wlan
        );
        assert!(registry.lookup_variant_schema("cz-tacg1").is_none());
    }

    #[test]
    fn test_lookup_feature_schema() {
        let registry = SchemaRegistry::builtin();
        let nanoex = registry.lookup_feature_schema("nanoex_switch").unwrap();
        assert_eq!(nanoex.default_icon, Some("mdi:air-filter"));
        let mild = registry.lookup_feature_schema("mild_dry_switch").unwrap();
        assert_eq!(mild.target, Target::Link(LinkSlot::MildDrySwitch));
        assert!(registry.lookup_feature_schema("traits").is_none());
    }

    #[test]
    fn test_variants_declaring() {
        let registry = SchemaRegistry::builtin();
        assert_eq!(registry.variants_declaring("eco_switch"), vec![Variant::Cnt]);
        assert_eq!(
            registry.variants_declaring("vertical_swing_select"),
            vec![Variant::Wlan, Variant::Cnt]
        );
        assert!(registry.variants_declaring("bogus").is_empty());
    }

    #[test]
    fn test_swing_option_lists() {
        assert_eq!(HORIZONTAL_SWING_OPTIONS.len(), 6);
        assert_eq!(VERTICAL_SWING_OPTIONS.len(), 7);
        assert_eq!(VERTICAL_SWING_OPTIONS[0], "swing");
    }

    #[test]
    fn test_registry_consistency() {
        // Scalars target parameters, entities target links of the right kind,
        // and names and slots are unique per merged schema.
        for v in Variant::all() {
            let schema = SchemaRegistry::builtin().merged_schema(*v);
            let mut names = HashSet::new();
            let mut slots = HashSet::new();
            for f in schema.features() {
                assert!(names.insert(f.name), "Duplicate feature {}", f.name);
                assert!(!ROOT_FIELDS.contains(&f.name), "{} shadows a root field", f.name);
                match (f.kind.entity_kind(), f.target) {
                    (None, Target::Parameter(_)) => {}
                    (Some(kind), Target::Link(slot)) => {
                        assert_eq!(slot.accepts(), kind, "{} links the wrong kind", f.name);
                        assert!(slots.insert(slot), "Duplicate slot {slot}");
                    }
                    _ => panic!("{} has a target that does not match its kind", f.name),
                }
                if f.is_capability() {
                    assert!(f.kind.entity_kind().is_some());
                }
            }
        }
    }

    const MERGE_COMMON: &[FeatureDescriptor] = &[
        FeatureDescriptor {
            name: "alpha",
            kind: FeatureKind::Switch,
            gate: Gate::Direct,
            default_name: "Alpha",
            default_icon: None,
            target: Target::Link(LinkSlot::EcoSwitch),
        },
        FeatureDescriptor {
            name: "beta",
            kind: FeatureKind::Switch,
            gate: Gate::Direct,
            default_name: "Beta",
            default_icon: None,
            target: Target::Link(LinkSlot::EconaviSwitch),
        },
    ];

    const MERGE_EXCLUSIVE: &[FeatureDescriptor] = &[
        FeatureDescriptor {
            name: "gamma",
            kind: FeatureKind::Switch,
            gate: Gate::Direct,
            default_name: "Gamma",
            default_icon: None,
            target: Target::Link(LinkSlot::MildDrySwitch),
        },
        FeatureDescriptor {
            name: "alpha",
            kind: FeatureKind::Switch,
            gate: Gate::Direct,
            default_name: "Alpha (exclusive)",
            default_icon: Some("mdi:leaf"),
            target: Target::Link(LinkSlot::EcoSwitch),
        },
    ];

    #[test]
    fn test_exclusive_wins_on_collision_in_place() {
        let registry = SchemaRegistry::with_tables(MERGE_COMMON, &[], MERGE_EXCLUSIVE);
        let schema = registry.merged_schema(Variant::Cnt);
        let names: Vec<&str> = schema.features().iter().map(|f| f.name).collect();
        assert_eq!(names, ["alpha", "beta", "gamma"]);
        assert_eq!(schema.feature("alpha").unwrap().default_name, "Alpha (exclusive)");

        let wlan = registry.merged_schema(Variant::Wlan);
        assert_eq!(wlan.feature("alpha").unwrap().default_name, "Alpha");
    }

    #[test]
    fn test_in_phase_keeps_declaration_order() {
        let schema = SchemaRegistry::builtin().merged_schema(Variant::Cnt);
        let switches: Vec<&str> = schema.in_phase(Phase::Switches).map(|f| f.name).collect();
        assert_eq!(
            switches,
            ["nanoex_switch", "eco_switch", "econavi_switch", "mild_dry_switch"]
        );
        let sensors: Vec<&str> = schema.in_phase(Phase::Sensors).map(|f| f.name).collect();
        assert_eq!(
            sensors,
            [
                "outside_temperature",
                "defrost_sensor",
                "current_temperature_sensor",
                "current_power_consumption"
            ]
        );
    }
}
