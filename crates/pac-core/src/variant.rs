//! # Hardware Variants — Closed Tagged Union
//!
//! The integration talks to one of two adapter generations. The operator
//! picks one through the `variant` discriminant field; the chosen case
//! decides which optional features are legal.
//!
//! Adding a variant means adding a case here and a feature table in the
//! schema registry. There is no configuration-driven extension.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::CoreError;

/// Name of the root field that selects the variant.
pub const DISCRIMINANT_FIELD: &str = "variant";

/// Supported hardware variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Variant {
    /// DNSKP11 module on the CN-WLAN connector.
    Wlan,
    /// CZ-TACG1 module on the CN-CNT connector.
    Cnt,
}

impl Variant {
    /// Returns every variant in declaration order.
    pub fn all() -> &'static [Variant] {
        &[Self::Wlan, Self::Cnt]
    }

    /// Canonical lowercase name, as accepted in configuration documents.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wlan => "wlan",
            Self::Cnt => "cnt",
        }
    }

    /// The indoor-unit connector this variant attaches to.
    pub fn connector(&self) -> &'static str {
        match self {
            Self::Wlan => "CN-WLAN",
            Self::Cnt => "CN-CNT",
        }
    }

    /// Model designation of the adapter this variant replaces.
    pub fn adapter_model(&self) -> &'static str {
        match self {
            Self::Wlan => "DNSKP11",
            Self::Cnt => "CZ-TACG1",
        }
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Variant {
    type Err = CoreError;

    /// Parse a discriminant value. Matching ignores ASCII case, so `CNT`,
    /// `cnt` and `Cnt` all select [`Variant::Cnt`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|v| v.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownVariant(s.to_string()))
    }
}
