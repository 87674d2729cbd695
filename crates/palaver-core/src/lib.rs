//! Core types for Palaver: dialogue templates, choices, and static validation.
//!
//! This crate defines the immutable data model a dialogue session runs over.
//! A [`Template`] is a directed graph of named states connected by guarded
//! choices; it can be built programmatically or deserialized from a JSON
//! document, and [`validate`] checks at load time that the graph cannot
//! strand a player in a state with no path to a terminal.

/// Choice edges and their availability guards.
pub mod choice;
/// Error types used throughout the crate.
pub mod error;
/// The dialogue template graph: states and their display payloads.
pub mod template;
/// Static soft-lock and reachability analysis over a template.
pub mod validate;

/// Re-export choice types.
pub use choice::{Choice, Condition, DisplayPolicy, UnavailableDisplay};
/// Re-export error types.
pub use error::{CoreError, CoreResult};
/// Re-export template types.
pub use template::{State, StateKind, Template};
/// Re-export validation entry point and diagnostics.
pub use validate::{ValidateError, ValidateWarning, Validation, validate};
