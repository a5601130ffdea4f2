//! # pac-compose — Controller Graph Composition
//!
//! Turns a validated configuration into the in-memory graph the host
//! runtime takes over: one [`Controller`] with its linked selectors,
//! switches and sensors, scalar parameters and climate traits.
//!
//! - [`compose`]: the single-pass composer.
//! - [`controller`] / [`entity`]: graph types, all `Serialize`.
//! - [`traits`]: climate capabilities, extended as swing selectors link.
//! - [`resolver`]: lookup of entities the host already owns.
//! - [`pipeline`]: typestate wrapper over validate → compose → hand off.
//!
//! ## Crate Policy
//!
//! - Accepts only `ValidatedConfig`; raw documents go through
//!   [`pipeline::Configuration`] or `pac_schema::validate_document` first.
//! - A failure never exposes a partial graph.

pub mod compose;
pub mod controller;
pub mod entity;
pub mod error;
pub mod pipeline;
pub mod resolver;
pub mod traits;

pub use compose::compose;
pub use controller::Controller;
pub use entity::{Entity, EntityDetail, Origin, SensorClass};
pub use error::CompositionError;
pub use pipeline::{compile, Configuration, PipelineError};
pub use resolver::{EntityDeclaration, EntityRegistry, EntityResolver, ResolverError};
pub use traits::{ClimateMode, ClimateTraits, SwingMode};
