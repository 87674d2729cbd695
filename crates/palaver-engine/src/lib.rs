//! Dialogue session engine for Palaver.
//!
//! A [`DialogueMachine`] is a live cursor over an immutable
//! [`palaver_core::Template`]: it tracks the current state, caches the
//! evaluated results of choice guards, and projects the visible choice list
//! the presentation layer renders. The authoritative machine re-evaluates
//! guards through a pluggable [`PredicateEvaluator`] and emits minimal
//! [`AvailabilityDelta`]s; read-mostly mirrors apply those deltas and echo
//! choice selections back to the host.
//!
//! Every machine is single-writer: all operations must be invoked serially
//! from one logical thread of control per instance. Nothing in this crate
//! blocks, suspends, or locks.

/// Error types used throughout the crate.
pub mod error;
/// The predicate-evaluation seam between the engine and the embedder.
pub mod eval;
/// The live dialogue cursor and availability cache.
pub mod machine;
/// Persisted session state and resume handling.
pub mod session;
/// Wire messages synchronizing availability between host and mirrors.
pub mod sync;

/// Re-export error types.
pub use error::{EngineError, EngineResult};
/// Re-export the evaluation seam.
pub use eval::{FlagEvaluator, PredicateError, PredicateEvaluator};
/// Re-export the dialogue cursor types.
pub use machine::{DialogueMachine, ESCAPE_CHOICE, Outcome, VisibleChoice};
/// Re-export the persisted session record.
pub use session::SessionRecord;
/// Re-export wire message types and the host boundary helper.
pub use sync::{AvailabilityDelta, SelectionOutcome, SyncMessage, handle_selection};
