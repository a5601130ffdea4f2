//! # Entity Kinds
//!
//! The closed set of runtime objects the composer can produce or link.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CoreError;

/// Kind of a constructed or referenced entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// The root climate controller.
    Controller,
    /// A select entity with a fixed ordered option list.
    Selector,
    /// An on/off switch.
    Switch,
    /// A numeric sensor.
    Sensor,
    /// An on/off sensor.
    BinarySensor,
}

impl EntityKind {
    /// Returns the snake_case identifier for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Controller => "controller",
            Self::Selector => "selector",
            Self::Switch => "switch",
            Self::Sensor => "sensor",
            Self::BinarySensor => "binary_sensor",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "controller" => Ok(Self::Controller),
            "selector" => Ok(Self::Selector),
            "switch" => Ok(Self::Switch),
            "sensor" => Ok(Self::Sensor),
            "binary_sensor" => Ok(Self::BinarySensor),
            other => Err(CoreError::UnknownEntityKind(other.to_string())),
        }
    }
}
