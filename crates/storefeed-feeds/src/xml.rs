use std::fmt::Display;

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::FeedError;

fn xml_error(e: impl Display) -> FeedError {
    FeedError::Xml(e.to_string())
}

/// Thin wrapper over an indenting `quick_xml` writer into memory.
pub(crate) struct XmlDoc {
    writer: Writer<Vec<u8>>,
}

impl XmlDoc {
    pub(crate) fn new() -> Result<Self, FeedError> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;
        Ok(Self { writer })
    }

    pub(crate) fn open(
        &mut self,
        name: &str,
        attributes: &[(&str, &str)],
    ) -> Result<(), FeedError> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.writer
            .write_event(Event::Start(start))
            .map_err(xml_error)
    }

    pub(crate) fn close(&mut self, name: &str) -> Result<(), FeedError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)
    }

    /// Writes `<name>value</name>`, escaping `value`.
    pub(crate) fn text(&mut self, name: &str, value: &str) -> Result<(), FeedError> {
        self.open(name, &[])?;
        self.writer
            .write_event(Event::Text(BytesText::new(value)))
            .map_err(xml_error)?;
        self.close(name)
    }

    pub(crate) fn finish(self) -> Vec<u8> {
        let mut bytes = self.writer.into_inner();
        bytes.push(b'\n');
        bytes
    }
}
