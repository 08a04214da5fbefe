//! A minimal owned XML element tree built from `quick_xml` events.
//!
//! KML lookups are all of the "first descendant named X, or nothing" form, so
//! the tree only keeps local names, attributes and concatenated text. Namespace
//! prefixes are dropped: `<kml:Placemark>` and `<Placemark>` are the same node.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Element>,
    text: String,
}

impl Element {
    fn from_start(start: &BytesStart) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        // Malformed attributes are skipped rather than failing the document.
        for attr in start.attributes().flatten() {
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Xml(e.into()))?
                .into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Text directly inside this element, excluding descendants.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Direct children with the given local name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All descendants with the given local name, in document order.
    pub fn descendants<'a>(&'a self, name: &str) -> Vec<&'a Element> {
        let mut found = Vec::new();
        self.collect_descendants(name, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, name: &str, found: &mut Vec<&'a Element>) {
        for child in &self.children {
            if child.name == name {
                found.push(child);
            }
            child.collect_descendants(name, found);
        }
    }

    /// First descendant with the given local name, in document order.
    pub fn find(&self, name: &str) -> Option<&Element> {
        self.children.iter().find_map(|child| {
            if child.name == name {
                Some(child)
            } else {
                child.find(name)
            }
        })
    }

    /// Trimmed text of the first descendant named `name`.
    pub fn find_text(&self, name: &str) -> Option<&str> {
        self.find(name).map(|e| e.text().trim())
    }
}

/// Parses an XML document into a synthetic root whose children are the
/// document's top-level elements.
pub fn parse_document(xml: &str) -> Result<Element> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Element> = vec![Element::default()];

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(Element::from_start(&start)?),
            Event::Empty(start) => {
                let element = Element::from_start(&start)?;
                push_child(&mut stack, element);
            }
            Event::End(_) => {
                // The reader checks that end tags match, so the stack never
                // pops the synthetic root here.
                if stack.len() > 1 {
                    if let Some(element) = stack.pop() {
                        push_child(&mut stack, element);
                    }
                }
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| Error::Xml(e.into()))?;
                append_text(&mut stack, &text);
            }
            Event::CData(data) => {
                let bytes = data.into_inner();
                append_text(&mut stack, &String::from_utf8_lossy(&bytes));
            }
            Event::Eof => break,
            _ => (),
        }
    }

    // Unclosed elements at EOF are folded into their parents.
    while stack.len() > 1 {
        if let Some(element) = stack.pop() {
            push_child(&mut stack, element);
        }
    }

    let root = stack.pop().unwrap_or_default();
    debug!(
        "Parsed XML document with {} top-level elements",
        root.children.len()
    );
    Ok(root)
}

fn push_child(stack: &mut [Element], element: Element) {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
    }
}

fn append_text(stack: &mut [Element], text: &str) {
    if let Some(current) = stack.last_mut() {
        current.text.push_str(text);
    }
}
