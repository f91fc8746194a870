use indexmap::IndexMap;
use text_size::TextRange;

/// A parsed document: exactly one root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTree {
    pub root: XmlElement,
}

impl ElementTree {
    pub fn new(root: XmlElement) -> Self {
        Self { root }
    }

    /// Pre-order iterator over every element, root included.
    pub fn descendants(&self) -> Descendants<'_> {
        self.root.descendants()
    }
}

/// One element of the tree.
///
/// `name` is the local name with any namespace prefix split off into
/// `prefix`. Attribute keys are stored exactly as written (`drools:packageName`)
/// in document order; [`XmlElement::attr`] matches on the local part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub prefix: Option<String>,
    pub attributes: IndexMap<String, String>,
    pub children: Vec<XmlElement>,
    /// Concatenated text and CDATA content, trimmed.
    pub text: String,
    /// Byte range from the start tag through the end tag.
    pub range: TextRange,
}

impl XmlElement {
    pub fn new(name: impl Into<String>, prefix: Option<String>, range: TextRange) -> Self {
        Self {
            name: name.into(),
            prefix,
            attributes: IndexMap::new(),
            children: Vec::new(),
            text: String::new(),
            range,
        }
    }

    /// The qualified name as written in the document.
    pub fn qualified_name(&self) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}:{}", self.name),
            None => self.name.clone(),
        }
    }

    /// Look up an attribute by local name, ignoring any namespace prefix.
    ///
    /// An unprefixed key wins over a prefixed one. Namespace declarations
    /// (`xmlns`, `xmlns:*`) never match.
    pub fn attr(&self, local: &str) -> Option<&str> {
        if let Some(value) = self.attributes.get(local) {
            return Some(value.as_str());
        }
        self.attributes
            .iter()
            .find(|(key, _)| {
                !key.starts_with("xmlns")
                    && key
                        .split_once(':')
                        .is_some_and(|(_, rest)| rest == local)
            })
            .map(|(_, value)| value.as_str())
    }

    /// Attribute value, with empty strings treated as absent.
    pub fn non_empty_attr(&self, local: &str) -> Option<&str> {
        self.attr(local).map(str::trim).filter(|v| !v.is_empty())
    }

    /// First direct child with the given local name.
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All direct children with the given local name, in document order.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first direct child with the given name, if non-empty.
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name)
            .map(|c| c.text.as_str())
            .filter(|t| !t.is_empty())
    }

    /// Pre-order iterator over this element and everything below it.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// First element in pre-order (self excluded) with the given local name.
    pub fn find_descendant(&self, name: &str) -> Option<&XmlElement> {
        self.descendants().skip(1).find(|e| e.name == name)
    }
}

/// Pre-order traversal over an element subtree.
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
