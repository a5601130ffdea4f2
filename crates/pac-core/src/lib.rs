//! # pac-core — Foundational Types for the Panasonic AC Graph Compiler
//!
//! This crate is the leaf of the workspace. It defines the primitives every
//! other crate speaks in: which hardware variant is active, how entities are
//! identified and classified, the immutable configuration document an
//! operator supplies, and the error taxonomy diagnostics are sorted into.
//!
//! ## Key Design Principles
//!
//! 1. **Closed variant enum.** `Variant` has one case per supported adapter
//!    (CN-WLAN and CN-CNT). Every `match` on it is exhaustive, so adding a
//!    variant forces the registry and composer to handle it.
//!
//! 2. **Validated identifiers.** `EntityId` can only be built through a
//!    constructor that enforces the identifier grammar. No bare strings for
//!    identities.
//!
//! 3. **Read-only documents.** `ConfigDocument` exposes no mutating API. It
//!    is parsed once and borrowed by every later stage.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `pac-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod document;
pub mod error;
pub mod identity;
pub mod kind;
pub mod variant;

pub use document::ConfigDocument;
pub use error::{CoreError, DocumentError, ErrorClass};
pub use identity::EntityId;
pub use kind::EntityKind;
pub use variant::{Variant, DISCRIMINANT_FIELD};
