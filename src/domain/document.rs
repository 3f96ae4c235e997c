use std::collections::HashSet;

use crate::{
    domain::{
        event_tree::{self, EventTree, InitiatingEvent},
        fault_tree::{self, FaultTree},
        id::Identifier,
        model_data::{self, ModelData},
        sequence_logic::SequenceLogic,
    },
    storage::SolveInput,
};

/// A complete output document, in emission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// The initiating event.
    pub initiating_event: InitiatingEvent,
    /// The event tree.
    pub event_tree: EventTree,
    /// One fault tree per input record, in source order.
    pub fault_trees: Vec<FaultTree>,
    /// The basic-event declarations.
    pub model_data: ModelData,
}

/// The result of assembling a document.
///
/// The sequence logic is kept apart from the document because it is not part
/// of the XML output; it goes to the sequence store instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conversion {
    /// The document to serialize.
    pub document: Document,
    /// The encoded sequence logic to persist.
    pub sequence_logic: SequenceLogic,
}

impl Document {
    /// Builds every entity of the document from the decoded solver records.
    ///
    /// This performs no I/O.
    ///
    /// # Errors
    ///
    /// This method can fail if any builder rejects its records, or if two
    /// fault trees share an id.
    pub fn assemble(input: &SolveInput) -> Result<Conversion, BuildError> {
        let initiating_event = InitiatingEvent::from_header(&input.header);

        let (event_tree, sequence_logic) =
            event_tree::build(&input.header, &input.sysgatelist, &input.sequencelist)?;

        let mut seen = HashSet::with_capacity(input.faulttreelist.len());
        let mut fault_trees = Vec::with_capacity(input.faulttreelist.len());
        for record in &input.faulttreelist {
            let tree = FaultTree::build(record)?;
            if !seen.insert(tree.name().clone()) {
                return Err(BuildError::DuplicateFaultTree(tree.name().clone()));
            }
            fault_trees.push(tree);
        }

        let model_data = ModelData::build(&input.eventlist)?;

        tracing::info!(
            "Assembled event tree {} with {} fault trees and {} basic events",
            event_tree.name(),
            fault_trees.len(),
            model_data.len()
        );

        Ok(Conversion {
            document: Self {
                initiating_event,
                event_tree,
                fault_trees,
                model_data,
            },
            sequence_logic,
        })
    }

    /// Total number of gates across all fault trees.
    #[must_use]
    pub fn gate_count(&self) -> usize {
        self.fault_trees.iter().map(|tree| tree.gates().len()).sum()
    }
}

/// Errors that can occur while assembling a [`Document`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum BuildError {
    /// A fault tree could not be built.
    #[error(transparent)]
    FaultTree(#[from] fault_tree::Error),

    /// The model data could not be built.
    #[error(transparent)]
    ModelData(#[from] model_data::Error),

    /// The event tree could not be built.
    #[error(transparent)]
    EventTree(#[from] event_tree::Error),

    /// Two fault-tree records share an id.
    #[error("Duplicate fault tree {0}")]
    DuplicateFaultTree(Identifier),
}
