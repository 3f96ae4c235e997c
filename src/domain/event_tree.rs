use std::collections::HashSet;

use crate::{
    domain::{
        id::{Identifier, Tag, namespace},
        sequence_logic::{SequenceLogic, encode_logic},
    },
    storage::input::{Header, SequenceRecord, SysGateRecord},
};

/// The initiating event that starts the event tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitiatingEvent {
    name: Identifier,
    event_tree: String,
}

impl InitiatingEvent {
    /// Declares the initiating event named in the header.
    #[must_use]
    pub fn from_header(header: &Header) -> Self {
        Self {
            name: namespace(Tag::InitiatingEvent, &header.eventtree.initevent),
            event_tree: header.eventtree.name.clone(),
        }
    }

    /// The event's identifier, `INIT<initevent>`.
    #[must_use]
    pub const fn name(&self) -> &Identifier {
        &self.name
    }

    /// The name of the event tree it starts.
    #[must_use]
    pub fn event_tree(&self) -> &str {
        &self.event_tree
    }
}

/// An event tree: its functional events and the sequences through them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventTree {
    name: String,
    functional_events: Vec<Identifier>,
    sequences: Vec<Identifier>,
}

impl EventTree {
    /// The event tree's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Functional events, in source order.
    #[must_use]
    pub fn functional_events(&self) -> &[Identifier] {
        &self.functional_events
    }

    /// Sequences, in source order.
    #[must_use]
    pub fn sequences(&self) -> &[Identifier] {
        &self.sequences
    }

    /// Returns `true` if the tree has neither functional events nor sequences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functional_events.is_empty() && self.sequences.is_empty()
    }
}

/// Builds the event tree and the encoded logic of its sequences.
///
/// This is pure; persisting the logic is a separate step (see
/// [`crate::storage::sequence_store::persist_sequence_logic`]).
///
/// # Errors
///
/// Returns an error if two functional events or two sequences share an id.
pub fn build(
    header: &Header,
    functional_events: &[SysGateRecord],
    sequences: &[SequenceRecord],
) -> Result<(EventTree, SequenceLogic), Error> {
    let name = header.eventtree.name.clone();

    let functional_events = unique(
        functional_events
            .iter()
            .map(|record| namespace(Tag::FunctionalEvent, &record.id)),
    )?;

    let sequence_names = unique(
        sequences
            .iter()
            .map(|record| namespace(Tag::Sequence, &record.seqid)),
    )?;

    let logic = sequences
        .iter()
        .map(|record| encode_logic(&record.logiclist))
        .collect();
    let logic = SequenceLogic::new(&name, &header.sqcount, logic);

    tracing::debug!(
        "Built event tree {name} with {} functional events and {} sequences",
        functional_events.len(),
        sequence_names.len()
    );

    let event_tree = EventTree {
        name,
        functional_events,
        sequences: sequence_names,
    };

    Ok((event_tree, logic))
}

fn unique(ids: impl Iterator<Item = Identifier>) -> Result<Vec<Identifier>, Error> {
    let mut seen = HashSet::new();
    ids.map(|id| {
        if seen.insert(id.clone()) {
            Ok(id)
        } else {
            Err(Error::Duplicate(id))
        }
    })
    .collect()
}

/// Errors that can occur while building an event tree.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// Two functional events or two sequences share an id.
    #[error("Duplicate identifier {0} in event tree")]
    Duplicate(Identifier),
}
