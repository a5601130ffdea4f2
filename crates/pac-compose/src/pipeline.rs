//! # Compilation Pipeline Typestate
//!
//! A configuration moves through the pipeline as a `Configuration<S>`
//! whose stage `S` is a distinct type. Each transition consumes the
//! previous stage, so a document cannot be composed before it has been
//! validated and a graph cannot be handed off twice.
//!
//! ```text
//! Unvalidated ──validate()──▶ Validated ──compose()──▶ Composed ──hand_off()──▶ Controller
//! ```
//!
//! Calling `.compose()` on an unvalidated configuration does not compile:
//!
//! ```compile_fail
//! use pac_compose::pipeline::{Configuration, Unvalidated};
//! use pac_compose::resolver::EntityRegistry;
//! use pac_core::ConfigDocument;
//!
//! let document = ConfigDocument::from_json_str(r#"{"variant": "cnt"}"#).unwrap();
//! let configuration = Configuration::<Unvalidated>::new(document);
//! // ERROR: no method named `compose` found for `Configuration<Unvalidated>`
//! let _composed = configuration.compose(&EntityRegistry::new());
//! ```

use thiserror::Error;

use pac_core::{ConfigDocument, ErrorClass, Variant};
use pac_schema::{validate_document, SchemaRegistry, SchemaValidationError, ValidatedConfig};

use crate::compose::compose;
use crate::controller::Controller;
use crate::error::CompositionError;
use crate::resolver::EntityResolver;

// ─── Stage Types ─────────────────────────────────────────────────────

/// Stage: parsed, not yet checked.
#[derive(Debug, Clone)]
pub struct Unvalidated {
    document: ConfigDocument,
}

/// Stage: dispatched and validated.
#[derive(Debug, Clone)]
pub struct Validated {
    config: ValidatedConfig,
}

/// Stage: controller graph built.
#[derive(Debug, Clone)]
pub struct Composed {
    controller: Controller,
}

mod private {
    pub trait Sealed {}
    impl Sealed for super::Unvalidated {}
    impl Sealed for super::Validated {}
    impl Sealed for super::Composed {}
}

/// Marker trait for pipeline stages. Sealed.
pub trait Stage: private::Sealed + std::fmt::Debug {
    /// Stage name used in logs.
    fn name() -> &'static str;
}

impl Stage for Unvalidated {
    fn name() -> &'static str {
        "unvalidated"
    }
}
impl Stage for Validated {
    fn name() -> &'static str {
        "validated"
    }
}
impl Stage for Composed {
    fn name() -> &'static str {
        "composed"
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// A failed pipeline transition.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] SchemaValidationError),

    #[error(transparent)]
    Composition(#[from] CompositionError),
}

impl PipelineError {
    /// The diagnostic class of this error.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::Validation(e) => e.class(),
            Self::Composition(e) => e.class(),
        }
    }
}

// ─── Configuration ───────────────────────────────────────────────────

/// A configuration at pipeline stage `S`.
#[derive(Debug, Clone)]
pub struct Configuration<S: Stage> {
    stage: S,
}

impl<S: Stage> Configuration<S> {
    /// Name of the current stage.
    pub fn stage_name(&self) -> &'static str {
        S::name()
    }
}

impl Configuration<Unvalidated> {
    pub fn new(document: ConfigDocument) -> Self {
        Self {
            stage: Unvalidated { document },
        }
    }

    pub fn document(&self) -> &ConfigDocument {
        &self.stage.document
    }

    /// Dispatch on the variant and validate.
    pub fn validate(
        self,
        registry: &SchemaRegistry,
    ) -> Result<Configuration<Validated>, PipelineError> {
        let config = validate_document(&self.stage.document, registry)?;
        Ok(Configuration {
            stage: Validated { config },
        })
    }
}

impl Configuration<Validated> {
    pub fn variant(&self) -> Variant {
        self.stage.config.variant()
    }

    pub fn validated(&self) -> &ValidatedConfig {
        &self.stage.config
    }

    /// Build the controller graph.
    pub fn compose(
        self,
        resolver: &dyn EntityResolver,
    ) -> Result<Configuration<Composed>, PipelineError> {
        let controller = compose(&self.stage.config, resolver)?;
        Ok(Configuration {
            stage: Composed { controller },
        })
    }
}

impl Configuration<Composed> {
    pub fn controller(&self) -> &Controller {
        &self.stage.controller
    }

    /// Release the graph to the host.
    pub fn hand_off(self) -> Controller {
        tracing::debug!(id = %self.stage.controller.id(), "handing off controller");
        self.stage.controller
    }
}

/// Run every stage: validate, compose, hand off.
pub fn compile(
    document: ConfigDocument,
    registry: &SchemaRegistry,
    resolver: &dyn EntityResolver,
) -> Result<Controller, PipelineError> {
    Ok(Configuration::new(document)
        .validate(registry)?
        .compose(resolver)?
        .hand_off())
}
