//! Compact encoding of evaluated sequence cut-set logic.
//!
//! Each decimal cut-set term is folded onto its low-order 17 bits and tagged
//! with a single character describing what kind of term it is believed to be.
//! The fold is deliberately lossy: terms that agree on their low 17 bits
//! encode identically, so the encoding is only injective below 2^17.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::storage::input::Term;

/// Number of low-order bits kept from each term.
pub const PAYLOAD_BITS: u32 = 17;

const PAYLOAD_MASK: u64 = (1 << PAYLOAD_BITS) - 1;

/// The class a term is sorted into.
///
/// Classification is a heuristic carried over from the storage format: a
/// term whose decimal form has exactly six digits is assumed to be a
/// basic-event id. Any other six-digit identifier will be misclassified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermClass {
    /// Six-digit terms, tagged `f`.
    BasicEvent,
    /// Everything else, tagged `s`.
    Structural,
}

impl TermClass {
    /// Classifies a term by its decimal digit count.
    #[must_use]
    pub const fn of(value: u64) -> Self {
        if value >= 100_000 && value <= 999_999 {
            Self::BasicEvent
        } else {
            Self::Structural
        }
    }

    /// Returns the single-character tag of this class.
    #[must_use]
    pub const fn tag(self) -> char {
        match self {
            Self::BasicEvent => 'f',
            Self::Structural => 's',
        }
    }

    const fn from_tag(tag: char) -> Option<Self> {
        match tag {
            'f' => Some(Self::BasicEvent),
            's' => Some(Self::Structural),
            _ => None,
        }
    }
}

/// A single encoded cut-set term, e.g. `f20481` or `s65`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EncodedTerm {
    class: TermClass,
    payload: u32,
}

impl EncodedTerm {
    /// Encodes a decimal term.
    ///
    /// ```
    /// use pramef::EncodedTerm;
    ///
    /// assert_eq!(EncodedTerm::encode(65).to_string(), "s65");
    /// assert_eq!(EncodedTerm::encode(151_553).to_string(), "f20481");
    /// ```
    #[must_use]
    pub const fn encode(value: u64) -> Self {
        #[allow(clippy::cast_possible_truncation)]
        let payload = (value & PAYLOAD_MASK) as u32;
        Self {
            class: TermClass::of(value),
            payload,
        }
    }

    /// Returns the class this term was sorted into.
    #[must_use]
    pub const fn class(self) -> TermClass {
        self.class
    }

    /// Returns the low-order 17 bits of the source term.
    #[must_use]
    pub const fn payload(self) -> u32 {
        self.payload
    }
}

impl fmt::Display for EncodedTerm {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.class.tag(), self.payload)
    }
}

/// Errors that can occur while decoding an [`EncodedTerm`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The term does not start with `f` or `s`.
    #[error("Invalid term tag in '{0}': expected 'f' or 's'")]
    Tag(String),

    /// The payload is not a decimal number below 2^17.
    #[error("Invalid term payload in '{0}': expected an integer below 131072")]
    Payload(String),
}

impl FromStr for EncodedTerm {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let class = chars
            .next()
            .and_then(TermClass::from_tag)
            .ok_or_else(|| DecodeError::Tag(s.to_string()))?;

        let payload = chars
            .as_str()
            .parse::<u32>()
            .ok()
            .filter(|payload| u64::from(*payload) <= PAYLOAD_MASK)
            .ok_or_else(|| DecodeError::Payload(s.to_string()))?;

        Ok(Self { class, payload })
    }
}

impl TryFrom<String> for EncodedTerm {
    type Error = DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EncodedTerm> for String {
    fn from(term: EncodedTerm) -> Self {
        term.to_string()
    }
}

/// Encodes every term of one sequence's logic list, preserving order.
#[must_use]
pub fn encode_logic(terms: &[Term]) -> Vec<EncodedTerm> {
    terms.iter().map(|term| EncodedTerm::encode(term.0)).collect()
}

/// The encoded logic of every sequence of one event tree.
///
/// This is what gets persisted in the sequence store, under [`Self::key`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceLogic {
    key: String,
    sequences: Vec<Vec<EncodedTerm>>,
}

impl SequenceLogic {
    /// Creates the logic for the event tree `name` with `sqcount` sequences.
    #[must_use]
    pub fn new(name: &str, sqcount: impl fmt::Display, sequences: Vec<Vec<EncodedTerm>>) -> Self {
        Self {
            key: format!("{name}-{sqcount}"),
            sequences,
        }
    }

    /// The store key, `"<event-tree-name>-<sqcount>"`.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// One list of encoded terms per sequence, in declaration order.
    #[must_use]
    pub fn sequences(&self) -> &[Vec<EncodedTerm>] {
        &self.sequences
    }
}
