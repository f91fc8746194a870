//! Event-driven tree construction on top of quick-xml.

use quick_xml::Reader;
use quick_xml::errors::IllFormedError;
use quick_xml::events::{BytesStart, Event};
use text_size::{TextRange, TextSize};

use super::errors::{ErrorCode, ParseError};
use crate::syntax::{ElementTree, XmlElement};

/// Builds an [`ElementTree`] from a single pass over reader events.
pub(super) struct TreeReader<'a> {
    text: &'a str,
    /// Open elements, innermost last.
    stack: Vec<XmlElement>,
    root: Option<XmlElement>,
}

impl<'a> TreeReader<'a> {
    pub(super) fn new(text: &'a str) -> Self {
        Self {
            text,
            stack: Vec::new(),
            root: None,
        }
    }

    pub(super) fn read(mut self) -> Result<ElementTree, ParseError> {
        let mut reader = Reader::from_str(self.text);
        // End tags are matched against the stack in `close_element`.
        reader.config_mut().check_end_names = false;

        loop {
            let start = offset(reader.buffer_position());
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let element = self.open_element(e, start)?;
                    self.stack.push(element);
                }
                Ok(Event::Empty(ref e)) => {
                    // Self-closing element - handle as start + end
                    let mut element = self.open_element(e, start)?;
                    element.range = TextRange::new(start, offset(reader.buffer_position()));
                    self.attach(element, start)?;
                }
                Ok(Event::End(ref e)) => {
                    let end = offset(reader.buffer_position());
                    let name = utf8(e.name().as_ref(), self.text, start)?.to_string();
                    self.close_element(&name, start, end)?;
                }
                Ok(Event::Text(ref e)) => {
                    let raw = utf8(&**e, self.text, start)?;
                    let content = quick_xml::escape::unescape(raw).map_err(|err| {
                        ParseError::new(ErrorCode::E0101, self.text, start, err.to_string())
                    })?;
                    self.append_text(&content, start)?;
                }
                Ok(Event::CData(ref e)) => {
                    let content = utf8(&**e, self.text, start)?.to_string();
                    self.append_text(&content, start)?;
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(quick_xml::Error::IllFormed(IllFormedError::UnmatchedEndTag(name))) => {
                    // quick-xml rejects an end tag at document level itself
                    return Err(ParseError::new(
                        ErrorCode::E0202,
                        self.text,
                        offset(reader.error_position()),
                        format!("end tag </{name}> has no matching start tag"),
                    ));
                }
                Err(err) => {
                    return Err(ParseError::new(
                        ErrorCode::E0101,
                        self.text,
                        offset(reader.error_position()),
                        err.to_string(),
                    ));
                }
            }
        }

        if let Some(open) = self.stack.last() {
            return Err(ParseError::new(
                ErrorCode::E0201,
                self.text,
                open.range.start(),
                format!("element <{}> is never closed", open.qualified_name()),
            ));
        }

        match self.root {
            Some(root) => Ok(ElementTree::new(root)),
            None => Err(ParseError::with_default_reason(
                ErrorCode::E0204,
                self.text,
                TextSize::of(self.text),
            )),
        }
    }

    fn open_element(&self, e: &BytesStart<'_>, start: TextSize) -> Result<XmlElement, ParseError> {
        let qname = e.name();
        let local_name = qname.local_name();
        let local = utf8(local_name.as_ref(), self.text, start)?;
        let prefix = qname
            .prefix()
            .map(|p| utf8(p.as_ref(), self.text, start).map(str::to_string))
            .transpose()?;

        let mut element = XmlElement::new(local, prefix, TextRange::empty(start));

        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|err| {
                ParseError::new(
                    ErrorCode::E0101,
                    self.text,
                    start,
                    format!("attribute error: {err}"),
                )
            })?;
            let key = utf8(attr.key.as_ref(), self.text, start)?.to_string();
            let value = attr
                .unescape_value()
                .map_err(|err| {
                    ParseError::new(
                        ErrorCode::E0101,
                        self.text,
                        start,
                        format!("attribute value error: {err}"),
                    )
                })?
                .to_string();
            element.attributes.insert(key, value);
        }

        Ok(element)
    }

    fn close_element(&mut self, name: &str, start: TextSize, end: TextSize) -> Result<(), ParseError> {
        let Some(mut element) = self.stack.pop() else {
            return Err(ParseError::new(
                ErrorCode::E0202,
                self.text,
                start,
                format!("end tag </{name}> has no matching start tag"),
            ));
        };

        let expected = element.qualified_name();
        if expected != name {
            return Err(ParseError::new(
                ErrorCode::E0202,
                self.text,
                start,
                format!("expected </{expected}>, found </{name}>"),
            ));
        }

        element.range = TextRange::new(element.range.start(), end);
        self.attach(element, start)
    }

    /// Hand a finished element to its parent, or install it as the root.
    fn attach(&mut self, element: XmlElement, start: TextSize) -> Result<(), ParseError> {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(element);
            return Ok(());
        }
        if self.root.is_some() {
            return Err(ParseError::new(
                ErrorCode::E0203,
                self.text,
                start,
                format!("second root element <{}>", element.qualified_name()),
            ));
        }
        self.root = Some(element);
        Ok(())
    }

    fn append_text(&mut self, content: &str, start: TextSize) -> Result<(), ParseError> {
        let content = content.trim();
        if content.is_empty() {
            return Ok(());
        }
        match self.stack.last_mut() {
            Some(open) => {
                if !open.text.is_empty() {
                    open.text.push(' ');
                }
                open.text.push_str(content);
                Ok(())
            }
            None => Err(ParseError::with_default_reason(ErrorCode::E0203, self.text, start)),
        }
    }
}

fn offset(position: u64) -> TextSize {
    TextSize::from(u32::try_from(position).unwrap_or(u32::MAX))
}

fn utf8<'b>(bytes: &'b [u8], text: &str, at: TextSize) -> Result<&'b str, ParseError> {
    std::str::from_utf8(bytes)
        .map_err(|err| ParseError::new(ErrorCode::E0101, text, at, format!("invalid UTF-8: {err}")))
}
