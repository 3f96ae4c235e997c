//! Open-PSA Model Exchange Format (MEF) emission.
//!
//! Each domain entity knows how to write itself as MEF elements through the
//! [`ToMef`] trait. [`write_document`] wraps a whole [`Document`] in the
//! `opsa-mef` root element.

use std::io::{self, Write};

use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::domain::{
    BasicEvent, Document, EventTree, FaultTree, Gate, GateKind, Identifier, InitiatingEvent,
    ModelData,
};

/// The root element of every output document.
pub const ROOT_TAG: &str = "opsa-mef";

/// Serialization of an entity as MEF XML elements.
pub trait ToMef {
    /// Writes this entity's element(s) to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying writer fails.
    fn write_mef<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()>;
}

/// Writes `<tag attrs.../>`.
fn empty<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    attributes: &[(&str, &str)],
) -> io::Result<()> {
    let mut start = BytesStart::new(tag);
    start.extend_attributes(attributes.iter().copied());
    writer.write_event(Event::Empty(start))
}

/// Writes `<tag attrs...>`, then the children, then `</tag>`.
fn element<W: Write>(
    writer: &mut Writer<W>,
    tag: &str,
    attributes: &[(&str, &str)],
    children: impl FnOnce(&mut Writer<W>) -> io::Result<()>,
) -> io::Result<()> {
    let mut start = BytesStart::new(tag);
    start.extend_attributes(attributes.iter().copied());
    writer.write_event(Event::Start(start))?;
    children(writer)?;
    writer.write_event(Event::End(BytesEnd::new(tag)))
}

fn reference<W: Write>(writer: &mut Writer<W>, tag: &str, id: &Identifier) -> io::Result<()> {
    empty(writer, tag, &[("name", id.to_string().as_str())])
}

const fn connective(kind: GateKind) -> &'static str {
    match kind {
        GateKind::Or => "or",
        GateKind::And => "and",
        GateKind::AtLeast(_) => "atleast",
    }
}

impl ToMef for InitiatingEvent {
    fn write_mef<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        empty(
            writer,
            "define-initiating-event",
            &[
                ("name", self.name().to_string().as_str()),
                ("event-tree", self.event_tree()),
            ],
        )
    }
}

impl ToMef for EventTree {
    fn write_mef<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        if self.is_empty() {
            return empty(writer, "define-event-tree", &[("name", self.name())]);
        }
        element(writer, "define-event-tree", &[("name", self.name())], |w| {
            for functional_event in self.functional_events() {
                reference(w, "define-functional-event", functional_event)?;
            }
            for sequence in self.sequences() {
                reference(w, "define-sequence", sequence)?;
            }
            Ok(())
        })
    }
}

impl ToMef for Gate {
    fn write_mef<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        let name = self.name().to_string();
        let min = match self.kind() {
            GateKind::AtLeast(k) => Some(k.to_string()),
            GateKind::Or | GateKind::And => None,
        };
        let attributes: Vec<(&str, &str)> =
            min.as_deref().map(|k| ("min", k)).into_iter().collect();
        let tag = connective(self.kind());

        element(writer, "define-gate", &[("name", name.as_str())], |w| {
            if self.input_count() == 0 {
                return empty(w, tag, &attributes);
            }
            element(w, tag, &attributes, |w| {
                for gate in self.gates() {
                    reference(w, "gate", gate)?;
                }
                for event in self.events() {
                    reference(w, "basic-event", event)?;
                }
                for event in self.complemented_events() {
                    element(w, "not", &[], |w| reference(w, "basic-event", event))?;
                }
                Ok(())
            })
        })
    }
}

impl ToMef for FaultTree {
    fn write_mef<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        let name = self.name().to_string();
        if self.is_empty() {
            return empty(writer, "define-fault-tree", &[("name", name.as_str())]);
        }
        element(writer, "define-fault-tree", &[("name", name.as_str())], |w| {
            self.gates().iter().try_for_each(|gate| gate.write_mef(w))
        })
    }
}

impl ToMef for BasicEvent {
    fn write_mef<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        let name = self.name().to_string();
        element(writer, "define-basic-event", &[("name", name.as_str())], |w| {
            element(w, "label", &[], |w| {
                w.write_event(Event::Text(BytesText::new(self.label())))
            })?;
            empty(w, "float", &[("value", self.value())])
        })
    }
}

impl ToMef for ModelData {
    fn write_mef<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        if self.is_empty() {
            return empty(writer, "model-data", &[]);
        }
        element(writer, "model-data", &[], |w| {
            self.events().iter().try_for_each(|event| event.write_mef(w))
        })
    }
}

impl ToMef for Document {
    fn write_mef<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        element(writer, ROOT_TAG, &[], |w| {
            self.initiating_event.write_mef(w)?;
            self.event_tree.write_mef(w)?;
            for fault_tree in &self.fault_trees {
                fault_tree.write_mef(w)?;
            }
            self.model_data.write_mef(w)
        })
    }
}

/// Writes `document` as a standalone XML file to `sink`.
///
/// `indent` is the number of spaces per nesting level; `0` writes everything
/// on one line.
///
/// # Errors
///
/// Returns an error if `sink` fails.
pub fn write_document<W: Write>(document: &Document, sink: W, indent: usize) -> io::Result<()> {
    let mut writer = if indent == 0 {
        Writer::new(sink)
    } else {
        Writer::new_with_indent(sink, b' ', indent)
    };
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    document.write_mef(&mut writer)?;
    writer.into_inner().flush()
}

/// Renders `document` to a string (see [`write_document`]).
///
/// # Errors
///
/// Returns an error if the rendered document is not valid UTF-8, which
/// cannot happen for documents built from decoded JSON.
pub fn to_xml_string(document: &Document, indent: usize) -> io::Result<String> {
    let mut buffer = Vec::new();
    write_document(document, &mut buffer, indent)?;
    String::from_utf8(buffer).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}
