//! Minimal XML tree used for request and response entities.
use quick_xml::{
    Reader, Writer,
    events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event, attributes::AttrError},
};
use std::{fmt, str::Utf8Error};

/// An XML element.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct XmlNode {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<XmlContent>,
}

/// Content of an [`XmlNode`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum XmlContent {
    Element(XmlNode),
    Text(String),
    CData(String),
}

/// An XML document, a single root element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct XmlDocument {
    root: XmlNode,
}

impl XmlNode {
    /// Create new empty element.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: XmlNode) -> Self {
        self.children.push(XmlContent::Element(child));
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(XmlContent::Text(text.into()));
        self
    }

    pub fn push(&mut self, content: XmlContent) {
        self.children.push(content);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Returns the value of the first attribute with given name.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn children(&self) -> &[XmlContent] {
        &self.children
    }

    /// Returns an iterator over child elements.
    pub fn elements(&self) -> impl Iterator<Item = &XmlNode> {
        self.children.iter().filter_map(|content| match content {
            XmlContent::Element(node) => Some(node),
            _ => None,
        })
    }

    /// Returns the first child element with given name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.elements().find(|node| node.name == name)
    }

    /// Returns the concatenated text of all descendants.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for content in &self.children {
            match content {
                XmlContent::Element(node) => node.collect_text(out),
                XmlContent::Text(text) | XmlContent::CData(text) => out.push_str(text),
            }
        }
    }

    /// Serialize the element, without XML declaration.
    pub fn to_xml(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Vec::new());
        self.write(&mut writer)?;
        into_string(writer)
    }

    fn write(&self, writer: &mut Writer<Vec<u8>>) -> Result<(), XmlError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (name, value) in &self.attributes {
            start.push_attribute((name.as_str(), value.as_str()));
        }

        if self.children.is_empty() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }

        writer.write_event(Event::Start(start))?;
        for content in &self.children {
            match content {
                XmlContent::Element(node) => node.write(writer)?,
                XmlContent::Text(text) => writer.write_event(Event::Text(BytesText::new(text)))?,
                XmlContent::CData(text) => writer.write_event(Event::CData(BytesCData::new(text.as_str())))?,
            }
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }
}

fn into_string(writer: Writer<Vec<u8>>) -> Result<String, XmlError> {
    String::from_utf8(writer.into_inner()).map_err(|err| XmlError::Utf8(err.utf8_error()))
}

impl XmlDocument {
    pub fn new(root: XmlNode) -> Self {
        Self { root }
    }

    /// Parse a document from text.
    ///
    /// Whitespace only text is dropped. Comments, processing instructions and doctype are ignored.
    pub fn parse(text: &str) -> Result<Self, XmlError> {
        let mut reader = Reader::from_str(text);
        reader.trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root = None;

        loop {
            match reader.read_event()? {
                Event::Start(start) => stack.push(node_from(&start)?),
                Event::Empty(start) => {
                    let node = node_from(&start)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::End(_) => {
                    let node = stack.pop().ok_or(XmlError::Unbalanced)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::Text(text) => {
                    if let Some(parent) = stack.last_mut() {
                        parent.push(XmlContent::Text(text.unescape()?.into_owned()));
                    }
                }
                Event::CData(cdata) => {
                    if let Some(parent) = stack.last_mut() {
                        let text = std::str::from_utf8(&cdata)?.to_owned();
                        parent.push(XmlContent::CData(text));
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !stack.is_empty() {
            return Err(XmlError::Unbalanced);
        }

        root.map(Self::new).ok_or(XmlError::NoRoot)
    }

    pub fn root(&self) -> &XmlNode {
        &self.root
    }

    pub fn into_root(self) -> XmlNode {
        self.root
    }

    /// Serialize the document with an XML declaration.
    pub fn to_xml(&self) -> Result<String, XmlError> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        self.root.write(&mut writer)?;
        into_string(writer)
    }
}

impl std::str::FromStr for XmlDocument {
    type Err = XmlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<XmlNode> for XmlDocument {
    fn from(root: XmlNode) -> Self {
        Self::new(root)
    }
}

fn node_from(start: &BytesStart) -> Result<XmlNode, XmlError> {
    let mut node = XmlNode::new(std::str::from_utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr?;
        let name = std::str::from_utf8(attr.key.as_ref())?.to_owned();
        let value = attr.unescape_value()?.into_owned();
        node.attributes.push((name, value));
    }
    Ok(node)
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) -> Result<(), XmlError> {
    match stack.last_mut() {
        Some(parent) => parent.push(XmlContent::Element(node)),
        None if root.is_some() => return Err(XmlError::MultipleRoots),
        None => *root = Some(node),
    }
    Ok(())
}

// ===== Error =====

/// An error that can occur when parsing or serializing XML.
#[derive(Debug)]
pub enum XmlError {
    /// Malformed markup.
    Syntax(quick_xml::Error),
    /// Malformed attribute.
    Attribute(AttrError),
    /// Name or content is not valid UTF-8.
    Utf8(Utf8Error),
    /// Document has no root element.
    NoRoot,
    /// Document has more than one root element.
    MultipleRoots,
    /// Unclosed or unexpected closing tag.
    Unbalanced,
}

impl From<quick_xml::Error> for XmlError {
    fn from(v: quick_xml::Error) -> Self {
        Self::Syntax(v)
    }
}

impl From<AttrError> for XmlError {
    fn from(v: AttrError) -> Self {
        Self::Attribute(v)
    }
}

impl From<Utf8Error> for XmlError {
    fn from(v: Utf8Error) -> Self {
        Self::Utf8(v)
    }
}

impl std::error::Error for XmlError { }

impl fmt::Display for XmlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid xml: ")?;
        match self {
            Self::Syntax(err) => fmt::Display::fmt(err, f),
            Self::Attribute(err) => fmt::Display::fmt(err, f),
            Self::Utf8(err) => fmt::Display::fmt(err, f),
            Self::NoRoot => f.write_str("no root element"),
            Self::MultipleRoots => f.write_str("more than one root element"),
            Self::Unbalanced => f.write_str("unbalanced tags"),
        }
    }
}
