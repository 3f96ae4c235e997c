//! Typed records of the solver's flattened JSON output.
//!
//! The solver nests everything under a single `saphiresolveinput` key. Fields
//! are decoded once at this boundary; builders only ever see these types.
//! Collections that are missing or `null` decode as empty, and numeric-looking
//! fields accept either JSON numbers or strings.

use std::{
    fmt,
    fs::File,
    io::{self, BufReader, Read},
    path::Path,
};

use serde::{Deserialize, Deserializer};

/// The complete record set describing one event tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SolveInput {
    /// Event-tree header.
    pub header: Header,
    /// Basic-event records.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub eventlist: Vec<EventRecord>,
    /// Fault-tree records.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub faulttreelist: Vec<FaultTreeRecord>,
    /// Functional-event records.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sysgatelist: Vec<SysGateRecord>,
    /// Sequence records.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sequencelist: Vec<SequenceRecord>,
}

#[derive(Deserialize)]
struct Envelope {
    saphiresolveinput: SolveInput,
}

/// Errors that can occur while loading a [`SolveInput`].
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// The input file does not exist.
    #[error("Input file not found: {0}")]
    NotFound(String),

    /// The input could not be read.
    #[error("Failed to read input: {0}")]
    Io(#[from] io::Error),

    /// The input is not valid JSON or does not match the record schema.
    #[error("Failed to decode solver records: {0}")]
    Json(#[from] serde_json::Error),
}

impl SolveInput {
    /// Decodes a record set from a reader yielding the solver's JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read, is not valid JSON, or
    /// lacks a required field.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        let envelope: Envelope = serde_json::from_reader(reader)?;
        Ok(envelope.saphiresolveinput)
    }

    /// Decodes a record set from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not valid JSON or lacks a required
    /// field.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let envelope: Envelope = serde_json::from_str(json)?;
        Ok(envelope.saphiresolveinput)
    }

    /// Loads a record set from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or decoded.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let file = File::open(path).map_err(|io_error| match io_error.kind() {
            io::ErrorKind::NotFound => LoadError::NotFound(path.display().to_string()),
            _ => LoadError::Io(io_error),
        })?;
        Self::from_reader(BufReader::new(file))
    }
}

/// The event-tree header.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Header {
    /// The owning event tree.
    pub eventtree: EventTreeHeader,
    /// Sequence count, used to key the persisted sequence logic.
    pub sqcount: RawId,
}

/// Name and initiating event of the event tree.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventTreeHeader {
    /// The event tree's name.
    pub name: String,
    /// The initiating event's raw id.
    pub initevent: RawId,
}

/// A basic-event record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EventRecord {
    /// Raw event id.
    pub id: RawId,
    /// Owning correction gate; `"0"` for primary events.
    pub corrgate: RawId,
    /// Display label.
    pub name: String,
    /// Probability, as the solver rendered it.
    pub value: RawId,
}

/// A fault-tree record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FaultTreeRecord {
    /// Fault-tree header.
    pub ftheader: FaultTreeHeader,
    /// Gates in declaration order; the first one is the top gate.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub gatelist: Vec<GateRecord>,
}

/// The header of a fault-tree record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FaultTreeHeader {
    /// Raw fault-tree id.
    pub ftid: RawId,
}

/// A gate record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GateRecord {
    /// Raw gate id.
    pub gateid: RawId,
    /// `or`, `and`, or a `k/n` voting encoding.
    pub gatetype: String,
    /// Referenced gates.
    #[serde(default)]
    pub gateinput: Inputs,
    /// Referenced basic events.
    #[serde(default)]
    pub eventinput: Inputs,
    /// Referenced complemented basic events.
    #[serde(default)]
    pub compeventinput: Inputs,
}

/// A functional-event record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SysGateRecord {
    /// Raw functional-event id.
    pub id: RawId,
}

/// A sequence record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SequenceRecord {
    /// Raw sequence id.
    pub seqid: RawId,
    /// Evaluated cut-set term identifiers, in order.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub logiclist: Vec<Term>,
}

/// A raw record identifier or numeric-looking value.
///
/// The solver emits these either as JSON numbers or as strings; both are
/// kept as they were written so that namespacing renders them verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    /// A JSON number.
    Number(serde_json::Number),
    /// A JSON string.
    Text(String),
}

impl RawId {
    /// Returns `true` if this is a JSON integer (not a string, not a float).
    #[must_use]
    pub fn is_integer(&self) -> bool {
        match self {
            Self::Number(n) => n.is_i64() || n.is_u64(),
            Self::Text(_) => false,
        }
    }
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<u64> for RawId {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for RawId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// The normalized inputs of a gate.
///
/// The solver encodes "no inputs" as a bare integer, a single input as a
/// scalar and several inputs as a list that may contain `null`s. All of these
/// decode to a plain list with the `null`s dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inputs(Vec<RawId>);

impl Inputs {
    /// Returns the inputs in declaration order.
    #[must_use]
    pub fn as_slice(&self) -> &[RawId] {
        &self.0
    }

    /// Returns the number of inputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no inputs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Into<RawId>> FromIterator<T> for Inputs {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InputsRepr {
    Many(Vec<Option<RawId>>),
    One(RawId),
}

impl<'de> Deserialize<'de> for Inputs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let inputs = match Option::<InputsRepr>::deserialize(deserializer)? {
            None => Vec::new(),
            Some(InputsRepr::One(id)) if id.is_integer() => Vec::new(),
            Some(InputsRepr::One(id)) => vec![id],
            Some(InputsRepr::Many(ids)) => ids.into_iter().flatten().collect(),
        };
        Ok(Self(inputs))
    }
}

/// A decimal cut-set term identifier from a sequence's logic list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "TermRepr")]
pub struct Term(pub u64);

#[derive(Deserialize)]
#[serde(untagged)]
enum TermRepr {
    Number(u64),
    Text(String),
}

impl TryFrom<TermRepr> for Term {
    type Error = std::num::ParseIntError;

    fn try_from(repr: TermRepr) -> Result<Self, Self::Error> {
        match repr {
            TermRepr::Number(n) => Ok(Self(n)),
            TermRepr::Text(s) => s.trim().parse().map(Self),
        }
    }
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<Vec<T>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn gate(json: &str) -> GateRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn missing_collections_default_to_empty() {
        let input = SolveInput::from_json(
            r#"{"saphiresolveinput": {
                "header": {"eventtree": {"name": "LOOP", "initevent": 1}, "sqcount": 4},
                "eventlist": null
            }}"#,
        )
        .unwrap();

        assert!(input.eventlist.is_empty());
        assert!(input.faulttreelist.is_empty());
        assert!(input.sysgatelist.is_empty());
        assert!(input.sequencelist.is_empty());
        assert_eq!(input.header.eventtree.name, "LOOP");
        assert_eq!(input.header.sqcount.to_string(), "4");
    }

    #[test]
    fn missing_header_is_an_error() {
        let error = SolveInput::from_json(r#"{"saphiresolveinput": {"eventlist": []}}"#)
            .unwrap_err();
        assert!(matches!(error, LoadError::Json(_)));
        assert!(error.to_string().contains("header"));
    }

    #[test]
    fn missing_envelope_is_an_error() {
        let error = SolveInput::from_json(r#"{"header": {}}"#).unwrap_err();
        assert!(matches!(error, LoadError::Json(_)));
    }

    #[test]
    fn raw_ids_keep_their_rendering() {
        let ids: Vec<RawId> = serde_json::from_str(r#"[55, "55", "007", 1.5]"#).unwrap();
        let rendered: Vec<String> = ids.iter().map(ToString::to_string).collect();
        assert_eq!(rendered, ["55", "55", "007", "1.5"]);
        assert!(ids[0].is_integer());
        assert!(!ids[1].is_integer());
        assert!(!ids[3].is_integer());
    }

    #[test]
    fn integer_inputs_mean_no_inputs() {
        let record = gate(r#"{"gateid": 1, "gatetype": "or", "gateinput": 0, "eventinput": 3}"#);
        assert!(record.gateinput.is_empty());
        assert!(record.eventinput.is_empty());
        assert!(record.compeventinput.is_empty());
    }

    #[test]
    fn scalar_input_becomes_single_element() {
        let record = gate(r#"{"gateid": 1, "gatetype": "or", "eventinput": "101"}"#);
        assert_eq!(record.eventinput.as_slice(), &[RawId::from("101")]);
    }

    #[test]
    fn list_inputs_skip_nulls() {
        let record = gate(
            r#"{"gateid": 1, "gatetype": "or", "gateinput": [2, null, "3"], "compeventinput": null}"#,
        );
        assert_eq!(
            record.gateinput.as_slice(),
            &[RawId::from(2), RawId::from("3")]
        );
        assert!(record.compeventinput.is_empty());
    }

    #[test]
    fn null_gatelist_is_empty() {
        let record: FaultTreeRecord =
            serde_json::from_str(r#"{"ftheader": {"ftid": 3}, "gatelist": null}"#).unwrap();
        assert!(record.gatelist.is_empty());
        assert_eq!(record.ftheader.ftid.to_string(), "3");
    }

    #[test]
    fn terms_accept_numbers_and_strings() {
        let record: SequenceRecord =
            serde_json::from_str(r#"{"seqid": 2, "logiclist": [65, "100001"]}"#).unwrap();
        assert_eq!(record.logiclist, vec![Term(65), Term(100_001)]);
    }

    #[test]
    fn non_numeric_term_is_an_error() {
        let result: Result<SequenceRecord, _> =
            serde_json::from_str(r#"{"seqid": 2, "logiclist": ["abc"]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"{"saphiresolveinput": {"header": {"eventtree": {"name": "ET", "initevent": "9"}, "sqcount": "2"}}}"#,
        )
        .unwrap();

        let input = SolveInput::load(file.path()).unwrap();
        assert_eq!(input.header.eventtree.initevent.to_string(), "9");
    }

    #[test]
    fn load_missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let error = SolveInput::load(&tmp.path().join("missing.json")).unwrap_err();
        assert!(matches!(error, LoadError::NotFound(_)));
    }
}
