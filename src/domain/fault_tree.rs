use std::{collections::HashSet, fmt};

use crate::{
    domain::id::{Identifier, Tag, namespace},
    storage::input::{FaultTreeRecord, GateRecord, Inputs},
};

/// The boolean or voting connective of a [`Gate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    /// True if any input is true.
    Or,
    /// True if all inputs are true.
    And,
    /// True if at least `k` inputs are true, from a `"k/n"` encoding.
    AtLeast(u32),
}

impl GateKind {
    /// Parses the solver's gate type string.
    ///
    /// `"or"` and `"and"` map directly. Anything containing a `/` is read as
    /// `"k/n"` and only `k` is kept; `n` is implied by the number of inputs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MalformedGateKind`] for any other string, or if `k`
    /// is not a positive integer.
    pub fn parse(gatetype: &str) -> Result<Self, Error> {
        match gatetype {
            "or" => Ok(Self::Or),
            "and" => Ok(Self::And),
            _ => gatetype
                .split_once('/')
                .and_then(|(k, _)| k.trim().parse::<u32>().ok())
                .filter(|k| *k > 0)
                .map(Self::AtLeast)
                .ok_or_else(|| Error::MalformedGateKind(gatetype.to_string())),
        }
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Or => f.write_str("or"),
            Self::And => f.write_str("and"),
            Self::AtLeast(k) => write!(f, "{k}"),
        }
    }
}

/// A gate of a fault tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    name: Identifier,
    kind: GateKind,
    gates: Vec<Identifier>,
    events: Vec<Identifier>,
    complemented_events: Vec<Identifier>,
}

impl Gate {
    /// Creates a gate with no inputs.
    #[must_use]
    pub const fn new(name: Identifier, kind: GateKind) -> Self {
        Self {
            name,
            kind,
            gates: Vec::new(),
            events: Vec::new(),
            complemented_events: Vec::new(),
        }
    }

    fn from_record(name: Identifier, record: &GateRecord) -> Result<Self, Error> {
        let kind = GateKind::parse(&record.gatetype)?;
        let mut gate = Self::new(name, kind);

        gate.gates = namespace_all(Tag::Gate, &record.gateinput);
        gate.events = namespace_all(Tag::BasicEvent, &record.eventinput);
        gate.complemented_events = namespace_all(Tag::BasicEvent, &record.compeventinput);

        if let Some(n) = declared_arity(&record.gatetype) {
            if n != gate.input_count() {
                tracing::warn!(
                    "Gate {} declares {} but has {} inputs",
                    gate.name,
                    record.gatetype,
                    gate.input_count()
                );
            }
        }

        Ok(gate)
    }

    /// The gate's identifier.
    #[must_use]
    pub const fn name(&self) -> &Identifier {
        &self.name
    }

    /// The gate's connective.
    #[must_use]
    pub const fn kind(&self) -> GateKind {
        self.kind
    }

    /// Referenced gates, in declaration order.
    #[must_use]
    pub fn gates(&self) -> &[Identifier] {
        &self.gates
    }

    /// Referenced basic events, in declaration order.
    #[must_use]
    pub fn events(&self) -> &[Identifier] {
        &self.events
    }

    /// Referenced complemented basic events, in declaration order.
    #[must_use]
    pub fn complemented_events(&self) -> &[Identifier] {
        &self.complemented_events
    }

    /// Total number of inputs of all three kinds.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.gates.len() + self.events.len() + self.complemented_events.len()
    }
}

fn namespace_all(tag: Tag, inputs: &Inputs) -> Vec<Identifier> {
    inputs.as_slice().iter().map(|id| namespace(tag, id)).collect()
}

fn declared_arity(gatetype: &str) -> Option<usize> {
    gatetype.split_once('/')?.1.trim().parse().ok()
}

/// A fault tree: a gate hierarchy rooted at `TOP`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaultTree {
    name: Identifier,
    gates: Vec<Gate>,
}

impl FaultTree {
    /// Builds a fault tree from a solver record.
    ///
    /// The first gate of the record becomes `TOP`; every other gate is named
    /// `G<gateid>`. A record without gates yields an empty tree.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - a gate has a malformed gate type
    /// - two gates of the tree end up with the same name
    pub fn build(record: &FaultTreeRecord) -> Result<Self, Error> {
        let name = namespace(Tag::FaultTree, &record.ftheader.ftid);
        let mut seen = HashSet::with_capacity(record.gatelist.len());
        let mut gates = Vec::with_capacity(record.gatelist.len());

        for (index, gate_record) in record.gatelist.iter().enumerate() {
            let gate_name = if index == 0 {
                Identifier::Top
            } else {
                namespace(Tag::Gate, &gate_record.gateid)
            };

            if !seen.insert(gate_name.clone()) {
                return Err(Error::DuplicateGate {
                    tree: name,
                    gate: gate_name,
                });
            }

            gates.push(Gate::from_record(gate_name, gate_record)?);
        }

        tracing::debug!("Built fault tree {name} with {} gates", gates.len());

        Ok(Self { name, gates })
    }

    /// The tree's identifier.
    #[must_use]
    pub const fn name(&self) -> &Identifier {
        &self.name
    }

    /// The gates, `TOP` first.
    #[must_use]
    pub fn gates(&self) -> &[Gate] {
        &self.gates
    }

    /// The top gate, if the tree has any gates.
    #[must_use]
    pub fn top(&self) -> Option<&Gate> {
        self.gates.first()
    }

    /// Returns `true` if the tree has no gates.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }
}

/// Errors that can occur while building a fault tree.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// The gate type is neither `or`, `and` nor a `k/n` voting encoding.
    #[error("Malformed gate kind '{0}': expected 'or', 'and' or 'k/n'")]
    MalformedGateKind(String),

    /// Two gates of the same tree map to the same name.
    #[error("Duplicate gate {gate} in fault tree {tree}")]
    DuplicateGate {
        /// The fault tree.
        tree: Identifier,
        /// The repeated gate name.
        gate: Identifier,
    },
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;
    use crate::storage::input::{FaultTreeHeader, RawId};

    fn ids(names: &[&str]) -> Vec<Identifier> {
        names.iter().map(|name| name.parse().unwrap()).collect()
    }

    fn gate_record(gateid: u64, gatetype: &str) -> GateRecord {
        GateRecord {
            gateid: RawId::from(gateid),
            gatetype: gatetype.to_string(),
            gateinput: Inputs::default(),
            eventinput: Inputs::default(),
            compeventinput: Inputs::default(),
        }
    }

    fn tree_record(ftid: u64, gates: Vec<GateRecord>) -> FaultTreeRecord {
        FaultTreeRecord {
            ftheader: FaultTreeHeader {
                ftid: RawId::from(ftid),
            },
            gatelist: gates,
        }
    }

    #[test_case("or", GateKind::Or)]
    #[test_case("and", GateKind::And)]
    #[test_case("2/3", GateKind::AtLeast(2))]
    #[test_case("1/4", GateKind::AtLeast(1))]
    #[test_case(" 3 / 5", GateKind::AtLeast(3))]
    fn parse_gate_kind(input: &str, expected: GateKind) {
        assert_eq!(GateKind::parse(input).unwrap(), expected);
    }

    #[test_case("nand"; "unknown connective")]
    #[test_case("OR"; "upper case")]
    #[test_case(""; "empty")]
    #[test_case("/3"; "missing threshold")]
    #[test_case("0/3"; "zero threshold")]
    #[test_case("two/3"; "non numeric threshold")]
    fn malformed_gate_kind_is_rejected(input: &str) {
        assert_eq!(
            GateKind::parse(input),
            Err(Error::MalformedGateKind(input.to_string()))
        );
    }

    #[test]
    fn gate_kind_displays_threshold() {
        assert_eq!(GateKind::AtLeast(2).to_string(), "2");
        assert_eq!(GateKind::Or.to_string(), "or");
    }

    #[test]
    fn single_gate_tree() {
        let mut gate = gate_record(12, "and");
        gate.eventinput = [101_u64, 102].into_iter().collect();

        let tree = FaultTree::build(&tree_record(7, vec![gate])).unwrap();

        assert_eq!(tree.name().to_string(), "FT7");
        assert_eq!(tree.gates().len(), 1);
        let top = tree.top().unwrap();
        assert_eq!(top.name(), &Identifier::Top);
        assert_eq!(top.kind(), GateKind::And);
        assert_eq!(top.events(), ids(&["BE101", "BE102"]).as_slice());
        assert!(top.gates().is_empty());
        assert!(top.complemented_events().is_empty());
    }

    #[test]
    fn first_gate_is_top_and_others_are_namespaced() {
        let mut top = gate_record(1, "or");
        top.gateinput = [2_u64, 3].into_iter().collect();
        let mut left = gate_record(2, "2/3");
        left.eventinput = [10_u64, 11].into_iter().collect();
        left.compeventinput = std::iter::once(12_u64).collect();
        let right = gate_record(3, "and");

        let tree = FaultTree::build(&tree_record(4, vec![top, left, right])).unwrap();

        let names: Vec<String> = tree.gates().iter().map(|g| g.name().to_string()).collect();
        assert_eq!(names, ["TOP", "G2", "G3"]);

        let top = &tree.gates()[0];
        assert_eq!(top.gates(), ids(&["G2", "G3"]).as_slice());

        let left = &tree.gates()[1];
        assert_eq!(left.kind(), GateKind::AtLeast(2));
        assert_eq!(left.events(), ids(&["BE10", "BE11"]).as_slice());
        assert_eq!(left.complemented_events(), ids(&["BE12"]).as_slice());
        assert_eq!(left.input_count(), 3);
    }

    #[test]
    fn top_gate_id_may_reappear_as_named_gate() {
        // the top gate's own id is not reserved; only names must be unique
        let tree =
            FaultTree::build(&tree_record(1, vec![gate_record(5, "or"), gate_record(5, "and")]))
                .unwrap();
        assert_eq!(tree.gates()[1].name().to_string(), "G5");
    }

    #[test]
    fn duplicate_gate_is_rejected() {
        let error = FaultTree::build(&tree_record(
            1,
            vec![gate_record(1, "or"), gate_record(2, "or"), gate_record(2, "and")],
        ))
        .unwrap_err();

        assert_eq!(
            error,
            Error::DuplicateGate {
                tree: namespace(Tag::FaultTree, 1),
                gate: namespace(Tag::Gate, 2),
            }
        );
    }

    #[test]
    fn empty_gatelist_yields_empty_tree() {
        let tree = FaultTree::build(&tree_record(9, Vec::new())).unwrap();
        assert_eq!(tree.name().to_string(), "FT9");
        assert!(tree.is_empty());
        assert!(tree.top().is_none());
    }

    #[test]
    fn malformed_gate_fails_the_tree() {
        let error = FaultTree::build(&tree_record(
            1,
            vec![gate_record(1, "or"), gate_record(2, "xor")],
        ))
        .unwrap_err();
        assert_eq!(error, Error::MalformedGateKind("xor".to_string()));
    }

    #[test]
    fn arity_mismatch_is_not_an_error() {
        let mut gate = gate_record(1, "2/5");
        gate.eventinput = [1_u64, 2, 3].into_iter().collect();
        let tree = FaultTree::build(&tree_record(1, vec![gate])).unwrap();
        assert_eq!(tree.gates()[0].kind(), GateKind::AtLeast(2));
    }
}
