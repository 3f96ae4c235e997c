use std::{fmt, str::FromStr};

/// The kind of record an [`Identifier`] names.
///
/// Each tag has a short uppercase prefix. Because prefixes differ, two
/// identifiers with different tags can never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tag {
    /// Initiating event (`INIT`).
    InitiatingEvent,
    /// Functional event of the event tree (`FE`).
    FunctionalEvent,
    /// Fault tree (`FT`).
    FaultTree,
    /// Gate within a fault tree (`G`).
    Gate,
    /// Basic event (`BE`).
    BasicEvent,
    /// Event-tree sequence (`S`).
    Sequence,
}

impl Tag {
    /// All tags, longest prefixes first.
    ///
    /// No prefix is a prefix of another, so the first match when parsing is
    /// the only one, whatever the suffix.
    const ALL: [Self; 6] = [
        Self::InitiatingEvent,
        Self::FunctionalEvent,
        Self::FaultTree,
        Self::BasicEvent,
        Self::Gate,
        Self::Sequence,
    ];

    /// Returns the identifier prefix for this tag.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::InitiatingEvent => "INIT",
            Self::FunctionalEvent => "FE",
            Self::FaultTree => "FT",
            Self::Gate => "G",
            Self::BasicEvent => "BE",
            Self::Sequence => "S",
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A namespaced identifier for an entity of the output document.
///
/// Format:
/// `{PREFIX}{SUFFIX}`, where:
/// - `PREFIX` is the [`Tag`] prefix (e.g. `BE`, `FT`)
/// - `SUFFIX` is the decimal rendering of the raw record id (e.g. `4821`)
///
/// The top gate of every fault tree is the literal `TOP` instead.
///
/// Examples: `BE4821`, `FT7`, `G12`, `TOP`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Identifier {
    /// The top gate of a fault tree.
    Top,
    /// A tag followed by the raw id's rendering.
    Tagged(Tag, String),
}

/// Namespaces a raw record id under the given tag.
///
/// This is total: anything with a [`fmt::Display`] rendering is accepted and
/// no numeric validation is performed.
///
/// ```
/// use pramef::domain::{Tag, namespace};
///
/// assert_eq!(namespace(Tag::BasicEvent, 4821).to_string(), "BE4821");
/// assert_eq!(namespace(Tag::Sequence, "3").to_string(), "S3");
/// ```
pub fn namespace(tag: Tag, raw: impl fmt::Display) -> Identifier {
    Identifier::Tagged(tag, raw.to_string())
}

impl Identifier {
    /// Returns the tag of this identifier. `TOP` is a [`Tag::Gate`].
    #[must_use]
    pub const fn tag(&self) -> Tag {
        match self {
            Self::Top => Tag::Gate,
            Self::Tagged(tag, _) => *tag,
        }
    }

    /// Returns `true` if this is the `TOP` gate identifier.
    #[must_use]
    pub const fn is_top(&self) -> bool {
        matches!(self, Self::Top)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Top => f.write_str("TOP"),
            Self::Tagged(tag, suffix) => write!(f, "{tag}{suffix}"),
        }
    }
}

/// Errors that can occur while parsing an [`Identifier`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    /// The identifier does not start with a known prefix.
    #[error("Unknown identifier prefix in '{0}'")]
    UnknownPrefix(String),

    /// The identifier has a known prefix but nothing after it.
    #[error("Identifier '{0}' has no suffix")]
    EmptySuffix(String),
}

impl FromStr for Identifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "TOP" {
            return Ok(Self::Top);
        }

        let (tag, suffix) = Tag::ALL
            .into_iter()
            .find_map(|tag| s.strip_prefix(tag.prefix()).map(|rest| (tag, rest)))
            .ok_or_else(|| ParseError::UnknownPrefix(s.to_string()))?;

        if suffix.is_empty() {
            return Err(ParseError::EmptySuffix(s.to_string()));
        }

        Ok(Self::Tagged(tag, suffix.to_string()))
    }
}

impl TryFrom<&str> for Identifier {
    type Error = ParseError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::from_str(value)
    }
}
