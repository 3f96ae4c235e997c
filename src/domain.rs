//! Domain models for PRA conversion.
//!
//! This module contains the typed entities built from solver records: fault
//! trees and their gates, basic-event declarations, the event tree and the
//! encoded sequence logic, together with the identifier scheme that ties
//! their cross-references together.

mod config;
pub use config::Config;

/// Namespaced identifiers (`FT7`, `BE101`, `TOP`, ...).
pub mod id;
pub use id::{Identifier, Tag, namespace};

/// Fault trees and gates.
pub mod fault_tree;
pub use fault_tree::{FaultTree, Gate, GateKind};

/// Basic-event probability declarations.
pub mod model_data;
pub use model_data::{BasicEvent, ModelData, format_probability};

/// Event tree and initiating event.
pub mod event_tree;
pub use event_tree::{EventTree, InitiatingEvent};

/// Truncated-binary encoding of sequence cut-set terms.
pub mod sequence_logic;
pub use sequence_logic::{EncodedTerm, SequenceLogic, TermClass};

/// Assembly of the complete output document.
pub mod document;
pub use document::{BuildError, Conversion, Document};
