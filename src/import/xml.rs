//! Minimal XML element tree
//!
//! Job definitions carry nearly all of their information in attributes, so the
//! tree keeps element names, attributes and children and drops text content.

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use super::ImportError;

/// One XML element with its attributes and child elements
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    /// Local name (namespace prefix removed)
    pub name: String,
    /// Attributes in document order, keys as written
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Parse an XML document into its root element.
    ///
    /// # Arguments
    ///
    /// * `xml_content` - The XML document as a string.
    ///
    /// # Returns
    ///
    /// The root element, or an error when the document is not well formed,
    /// leaves elements unclosed or has no root element.
    pub fn parse(xml_content: &str) -> Result<Self, ImportError> {
        let mut reader = Reader::from_str(xml_content);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<XmlElement> = Vec::new();
        let mut root: Option<XmlElement> = None;

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) => stack.push(Self::from_start(&e)?),
                Ok(Event::Empty(e)) => {
                    let element = Self::from_start(&e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::End(_)) => {
                    let element = stack.pop().ok_or_else(|| {
                        ImportError::StructureError("Unexpected closing tag".to_string())
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => {
                    return Err(ImportError::ParseError(format!(
                        "XML parsing error at position {}: {}",
                        reader.buffer_position(),
                        e
                    )));
                }
            }
        }

        if let Some(open) = stack.last() {
            return Err(ImportError::StructureError(format!(
                "Unclosed element <{}>",
                open.name
            )));
        }

        root.ok_or_else(|| ImportError::StructureError("Document has no root element".to_string()))
    }

    fn from_start(start: &BytesStart<'_>) -> Result<Self, ImportError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| {
                ImportError::ParseError(format!("Invalid attribute on <{}>: {}", name, e))
            })?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| {
                    ImportError::ParseError(format!("Invalid value for {}: {}", key, e))
                })?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Value of an attribute.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of an attribute, or an empty string when absent.
    pub fn attr_or_empty(&self, key: &str) -> &str {
        self.attr(key).unwrap_or("")
    }

    /// Attribute holding the literal `true`.
    pub fn attr_flag(&self, key: &str) -> bool {
        self.attr(key) == Some("true")
    }

    /// Direct children with the given local name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// All descendants in document (pre-)order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Descendants with the given local name, in document order.
    pub fn descendants_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> {
        self.descendants().filter(move |e| e.name == name)
    }
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), ImportError> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    } else if root.is_none() {
        *root = Some(element);
    } else {
        return Err(ImportError::StructureError(format!(
            "Multiple root elements (second is <{}>)",
            element.name
        )));
    }
    Ok(())
}

/// Depth-first iterator over an element's descendants
pub struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}
