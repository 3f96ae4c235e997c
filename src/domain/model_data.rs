use std::collections::HashSet;

use crate::{
    domain::id::{Identifier, Tag, namespace},
    storage::input::{EventRecord, RawId},
};

/// The zero probability as the solver writes it. It is passed through as-is.
pub const ZERO_LITERAL: &str = "0.00000E+00";

/// Labels of solver-internal logical constants. These are not physical events.
const SENTINEL_LABELS: [&str; 3] = ["<TRUE>", "<FALSE>", "<PASS>"];

/// A basic event with its probability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicEvent {
    name: Identifier,
    label: String,
    value: String,
}

impl BasicEvent {
    /// The event's identifier.
    #[must_use]
    pub const fn name(&self) -> &Identifier {
        &self.name
    }

    /// The event's display label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The formatted probability (see [`format_probability`]).
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// The basic-event declarations of a model.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelData {
    events: Vec<BasicEvent>,
}

impl ModelData {
    /// Builds the basic-event declarations from the flat event list.
    ///
    /// Events owned by a correction gate (`corrgate` other than zero) and
    /// events labelled `<TRUE>`, `<FALSE>` or `<PASS>` are skipped.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - an emitted event's value is not a finite number
    /// - two emitted events share an id
    pub fn build(records: &[EventRecord]) -> Result<Self, Error> {
        let mut seen = HashSet::new();
        let mut events = Vec::new();

        for record in records {
            if !is_primary(&record.corrgate) {
                tracing::debug!(
                    "Skipping event {} owned by correction gate {}",
                    record.id,
                    record.corrgate
                );
                continue;
            }
            if SENTINEL_LABELS.contains(&record.name.as_str()) {
                tracing::debug!("Skipping logical constant {} ({})", record.id, record.name);
                continue;
            }

            let name = namespace(Tag::BasicEvent, &record.id);
            if !seen.insert(name.clone()) {
                return Err(Error::DuplicateEvent(name));
            }

            let value = format_probability(&record.value.to_string())
                .map_err(|source| Error::Probability {
                    event: name.clone(),
                    source,
                })?;

            events.push(BasicEvent {
                name,
                label: record.name.clone(),
                value,
            });
        }

        tracing::debug!("Built {} basic events", events.len());

        Ok(Self { events })
    }

    /// The declarations, in source order.
    #[must_use]
    pub fn events(&self) -> &[BasicEvent] {
        &self.events
    }

    /// Returns the number of declarations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns `true` if there are no declarations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// An event is primary when its correction gate is numerically zero, however
/// it is spelled (`0`, `"00"`, `0.0`). Anything unparseable is a gate id.
fn is_primary(corrgate: &RawId) -> bool {
    corrgate
        .to_string()
        .trim()
        .parse::<f64>()
        .is_ok_and(|value| value == 0.0)
}

/// Formats a probability in fixed-precision scientific notation.
///
/// The result has one digit before the point, six after, an upper-case `E`
/// and a signed exponent of at least two digits. The solver's zero literal
/// [`ZERO_LITERAL`] is returned unchanged.
///
/// ```
/// use pramef::domain::format_probability;
///
/// assert_eq!(format_probability("1.23456e-5").unwrap(), "1.234560E-05");
/// assert_eq!(format_probability("0.00000E+00").unwrap(), "0.00000E+00");
/// ```
///
/// # Errors
///
/// Returns an error if the value is not a finite decimal number.
pub fn format_probability(raw: &str) -> Result<String, InvalidProbability> {
    if raw == ZERO_LITERAL {
        return Ok(raw.to_string());
    }

    let value: f64 = raw
        .trim()
        .parse()
        .ok()
        .filter(|value: &f64| value.is_finite())
        .ok_or_else(|| InvalidProbability(raw.to_string()))?;

    // `{:e}` renders the exponent without sign or padding, e.g. `1.234560e-5`
    let formatted = format!("{value:.6e}");
    let (mantissa, exponent) = formatted
        .split_once('e')
        .and_then(|(mantissa, exponent)| Some((mantissa, exponent.parse::<i32>().ok()?)))
        .ok_or_else(|| InvalidProbability(raw.to_string()))?;

    let sign = if exponent < 0 { '-' } else { '+' };
    Ok(format!("{mantissa}E{sign}{:02}", exponent.unsigned_abs()))
}

/// Error returned when a probability is not a finite decimal number.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("Invalid probability '{0}': expected a finite decimal number")]
pub struct InvalidProbability(String);

/// Errors that can occur while building model data.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// An event's value could not be formatted.
    #[error("Basic event {event}: {source}")]
    Probability {
        /// The offending event.
        event: Identifier,
        /// The formatting error.
        source: InvalidProbability,
    },

    /// Two emitted events share an id.
    #[error("Duplicate basic event {0}")]
    DuplicateEvent(Identifier),
}
