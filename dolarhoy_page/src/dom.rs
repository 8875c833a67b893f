//! Immutable element tree handed over by a renderer.
//!
//! A renderer produces a [`DomNode`] tree. [`Document`] flattens that tree
//! into a preorder arena so element ids follow document order and every
//! element knows its parent and the extent of its subtree. [`ElementRef`]
//! is the borrowed handle the extraction code walks with.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Error;

/// One node of a rendered page, as captured by a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DomNode {
    Element(ElementNode),
    Text { text: String },
}

/// An element with its computed visibility already resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub children: Vec<DomNode>,
}

fn default_visible() -> bool {
    true
}

impl DomNode {
    /// Builds a visible element with the given children.
    pub fn element(tag: &str, children: Vec<DomNode>) -> Self {
        Self::Element(ElementNode {
            tag: tag.to_string(),
            attributes: BTreeMap::new(),
            visible: true,
            children,
        })
    }

    /// Builds a text node.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Sets an attribute. No-op on text nodes.
    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        if let Self::Element(el) = &mut self {
            el.attributes.insert(name.to_string(), value.to_string());
        }
        self
    }

    /// Marks the element as not rendered. No-op on text nodes.
    pub fn hidden(mut self) -> Self {
        if let Self::Element(el) = &mut self {
            el.visible = false;
        }
        self
    }
}

/// One entry of a flat, preorder page capture.
///
/// Elements carry `tag`; text nodes carry `text`. `parent` indexes an earlier
/// entry of the same list and is `None` only for the root.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FlatNode {
    pub parent: Option<usize>,
    pub tag: Option<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub text: Option<String>,
}

impl DomNode {
    /// Rebuilds the tree from a preorder capture. The first entry is the root.
    pub fn from_preorder(nodes: Vec<FlatNode>) -> Result<Self, Error> {
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); nodes.len()];
        for (id, node) in nodes.iter().enumerate().skip(1) {
            match node.parent {
                Some(parent) if parent < id => children[parent].push(id),
                _ => {
                    return Err(Error::Evaluate(format!(
                        "snapshot node {} does not follow its parent",
                        id
                    )))
                }
            }
        }

        // Children always sit after their parent, so building back to front
        // finishes every subtree before it is attached.
        let mut built: Vec<Option<DomNode>> = (0..nodes.len()).map(|_| None).collect();
        for (id, node) in nodes.into_iter().enumerate().rev() {
            let node = match node.tag {
                Some(tag) => DomNode::Element(ElementNode {
                    tag,
                    attributes: node.attributes,
                    visible: node.visible,
                    children: children[id]
                        .iter()
                        .filter_map(|&child| built[child].take())
                        .collect(),
                }),
                None => DomNode::text(node.text.unwrap_or_default()),
            };
            built[id] = Some(node);
        }

        built
            .first_mut()
            .and_then(Option::take)
            .ok_or_else(|| Error::Evaluate("empty page snapshot".to_string()))
    }
}

enum Child {
    Element(usize),
    Text(String),
}

struct ElementData {
    tag: String,
    attributes: BTreeMap<String, String>,
    visible: bool,
    parent: Option<usize>,
    children: Vec<Child>,
    /// One past the last descendant id.
    end: usize,
}

/// Arena view over a rendered page.
pub struct Document {
    elements: Vec<ElementData>,
}

impl Document {
    pub fn new(root: &DomNode) -> Self {
        let mut doc = Self {
            elements: Vec::new(),
        };
        match root {
            DomNode::Element(el) => {
                doc.push(el, None);
            }
            DomNode::Text { text } => {
                doc.elements.push(ElementData {
                    tag: "#document".to_string(),
                    attributes: BTreeMap::new(),
                    visible: true,
                    parent: None,
                    children: vec![Child::Text(text.clone())],
                    end: 1,
                });
            }
        }
        doc
    }

    fn push(&mut self, node: &ElementNode, parent: Option<usize>) -> usize {
        let id = self.elements.len();
        self.elements.push(ElementData {
            tag: node.tag.to_ascii_lowercase(),
            attributes: node.attributes.clone(),
            visible: node.visible,
            parent,
            children: Vec::new(),
            end: id + 1,
        });

        let mut children = Vec::with_capacity(node.children.len());
        for child in &node.children {
            match child {
                DomNode::Element(el) => children.push(Child::Element(self.push(el, Some(id)))),
                DomNode::Text { text } => children.push(Child::Text(text.clone())),
            }
        }

        let end = self.elements.len();
        let data = &mut self.elements[id];
        data.children = children;
        data.end = end;
        id
    }

    pub fn root(&self) -> ElementRef<'_> {
        ElementRef { doc: self, id: 0 }
    }

    /// The `body` element, or the root when the snapshot has none.
    pub fn body(&self) -> ElementRef<'_> {
        self.elements
            .iter()
            .position(|el| el.tag == "body")
            .map(|id| ElementRef { doc: self, id })
            .unwrap_or_else(|| self.root())
    }

    /// Every element, in document order.
    pub fn elements(&self) -> impl Iterator<Item = ElementRef<'_>> + '_ {
        (0..self.elements.len()).map(move |id| ElementRef { doc: self, id })
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl From<&DomNode> for Document {
    fn from(root: &DomNode) -> Self {
        Self::new(root)
    }
}

/// Borrowed handle to one element of a [`Document`].
#[derive(Clone, Copy)]
pub struct ElementRef<'a> {
    doc: &'a Document,
    id: usize,
}

impl PartialEq for ElementRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for ElementRef<'_> {}

impl std::fmt::Debug for ElementRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElementRef")
            .field("id", &self.id)
            .field("tag", &self.tag())
            .finish()
    }
}

impl<'a> ElementRef<'a> {
    fn data(&self) -> &'a ElementData {
        &self.doc.elements[self.id]
    }

    /// Position in document order.
    pub fn id(&self) -> usize {
        self.id
    }

    /// Lowercased tag name.
    pub fn tag(&self) -> &'a str {
        &self.data().tag
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.data().attributes.get(name).map(String::as_str)
    }

    pub fn is_visible(&self) -> bool {
        self.data().visible
    }

    pub fn parent(&self) -> Option<ElementRef<'a>> {
        self.data().parent.map(|id| ElementRef { doc: self.doc, id })
    }

    /// Ancestors from the parent upwards.
    pub fn ancestors(&self) -> impl Iterator<Item = ElementRef<'a>> {
        std::iter::successors(self.parent(), |el| el.parent())
    }

    /// Element children in order.
    pub fn children(&self) -> impl Iterator<Item = ElementRef<'a>> {
        let doc = self.doc;
        self.data().children.iter().filter_map(move |child| match child {
            Child::Element(id) => Some(ElementRef { doc, id: *id }),
            Child::Text(_) => None,
        })
    }

    /// All descendant elements in document order, excluding `self`.
    pub fn descendants(&self) -> impl Iterator<Item = ElementRef<'a>> {
        let doc = self.doc;
        (self.id + 1..self.data().end).map(move |id| ElementRef { doc, id })
    }

    /// Concatenated text of every descendant text node.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.data().children {
            match child {
                Child::Text(text) => out.push_str(text),
                Child::Element(id) => ElementRef {
                    doc: self.doc,
                    id: *id,
                }
                .collect_text(out),
            }
        }
    }

    /// `self` or the nearest ancestor with the given tag.
    pub fn closest(&self, tag: &str) -> Option<ElementRef<'a>> {
        std::iter::once(*self)
            .chain(self.ancestors())
            .find(|el| el.tag().eq_ignore_ascii_case(tag))
    }

    /// True when `other` is `self` or lies inside it.
    pub fn contains(&self, other: &ElementRef<'_>) -> bool {
        std::ptr::eq(self.doc, other.doc) && other.id >= self.id && other.id < self.data().end
    }
}
