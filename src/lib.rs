//! PRA solver records to Open-PSA MEF
//!
//! Solver output is a flattened JSON record set describing one event tree,
//! its fault trees and basic events. This crate decodes it into a typed
//! domain model and renders that model as Open-PSA Model Exchange Format XML.

pub mod domain;
pub use domain::{
    BasicEvent, Config, Conversion, Document, EncodedTerm, EventTree, FaultTree, Gate, GateKind,
    Identifier, InitiatingEvent, ModelData, SequenceLogic, Tag,
};

/// Input decoding, XML emission and the on-disk sequence-logic store.
pub mod storage;
pub use storage::{SequenceStore, SolveInput};
