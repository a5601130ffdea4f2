//! # Climate Traits
//!
//! What the controller advertises to the host's climate front end. Most of
//! it is fixed by the hardware; the swing modes grow as swing selectors are
//! linked.

use serde::Serialize;

use pac_schema::LinkSlot;

/// Lowest settable target temperature, in °C.
pub const MIN_TEMPERATURE: f32 = 16.0;
/// Highest settable target temperature, in °C.
pub const MAX_TEMPERATURE: f32 = 30.0;
/// Target temperature resolution, in °C.
pub const TEMPERATURE_STEP: f32 = 0.5;

/// Operating modes the unit accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimateMode {
    Off,
    HeatCool,
    Cool,
    Heat,
    FanOnly,
    Dry,
}

/// Louver swing modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwingMode {
    Off,
    Horizontal,
    Vertical,
    Both,
}

/// Capabilities advertised by the controller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClimateTraits {
    pub visual_min_temperature: f32,
    pub visual_max_temperature: f32,
    pub visual_temperature_step: f32,
    pub supports_action: bool,
    pub supports_current_temperature: bool,
    pub supports_two_point_target_temperature: bool,
    pub modes: Vec<ClimateMode>,
    pub custom_fan_modes: Vec<String>,
    pub custom_presets: Vec<String>,
    pub swing_modes: Vec<SwingMode>,
}

impl Default for ClimateTraits {
    fn default() -> Self {
        Self {
            visual_min_temperature: MIN_TEMPERATURE,
            visual_max_temperature: MAX_TEMPERATURE,
            visual_temperature_step: TEMPERATURE_STEP,
            supports_action: true,
            supports_current_temperature: true,
            supports_two_point_target_temperature: false,
            modes: vec![
                ClimateMode::Off,
                ClimateMode::HeatCool,
                ClimateMode::Cool,
                ClimateMode::Heat,
                ClimateMode::FanOnly,
                ClimateMode::Dry,
            ],
            custom_fan_modes: ["Automatic", "1", "2", "3", "4", "5"]
                .into_iter()
                .map(String::from)
                .collect(),
            custom_presets: ["Normal", "Powerful", "Quiet"]
                .into_iter()
                .map(String::from)
                .collect(),
            swing_modes: vec![SwingMode::Off],
        }
    }
}

impl ClimateTraits {
    /// Whether `mode` is advertised.
    pub fn supports_swing(&self, mode: SwingMode) -> bool {
        self.swing_modes.contains(&mode)
    }

    /// Update the swing modes after `slot` was linked.
    pub(crate) fn on_link(&mut self, slot: LinkSlot) {
        let mode = match slot {
            LinkSlot::HorizontalSwingSelect => SwingMode::Horizontal,
            LinkSlot::VerticalSwingSelect => SwingMode::Vertical,
            _ => return,
        };
        self.add_swing_mode(mode);
        if self.supports_swing(SwingMode::Horizontal) && self.supports_swing(SwingMode::Vertical) {
            self.add_swing_mode(SwingMode::Both);
        }
    }

    fn add_swing_mode(&mut self, mode: SwingMode) {
        if !self.supports_swing(mode) {
            self.swing_modes.push(mode);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let traits = ClimateTraits::default();
        assert_eq!(traits.visual_min_temperature, 16.0);
        assert_eq!(traits.visual_max_temperature, 30.0);
        assert_eq!(traits.visual_temperature_step, 0.5);
        assert!(traits.supports_action);
        assert!(traits.supports_current_temperature);
        assert!(!traits.supports_two_point_target_temperature);
        assert_eq!(traits.swing_modes, vec![SwingMode::Off]);
        assert_eq!(traits.custom_fan_modes.len(), 6);
        assert_eq!(traits.custom_fan_modes[0], "Automatic");
        assert_eq!(traits.custom_presets, vec!["Normal", "Powerful", "Quiet"]);
    }

    #[test]
    fn test_swing_modes_follow_links() {
        let mut traits = ClimateTraits::default();
        traits.on_link(LinkSlot::NanoexSwitch);
        assert_eq!(traits.swing_modes, vec![SwingMode::Off]);

        traits.on_link(LinkSlot::VerticalSwingSelect);
        assert_eq!(traits.swing_modes, vec![SwingMode::Off, SwingMode::Vertical]);

        traits.on_link(LinkSlot::HorizontalSwingSelect);
        assert_eq!(
            traits.swing_modes,
            vec![
                SwingMode::Off,
                SwingMode::Vertical,
                SwingMode::Horizontal,
                SwingMode::Both
            ]
        );

        traits.on_link(LinkSlot::HorizontalSwingSelect);
        assert_eq!(traits.swing_modes.len(), 4);
    }

    #[test]
    fn test_serde_names() {
        let value = serde_json::to_value(ClimateTraits::default()).unwrap();
        assert_eq!(value["modes"][1], "heat_cool");
        assert_eq!(value["swing_modes"][0], "off");
        assert_eq!(value["custom_presets"][1], "Powerful");
    }
}
