// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Represents an SVG document as an editable tree.

`svgtree` uses [`roxmltree`](https://github.com/RazrFalcon/roxmltree) for parsing,
but unlike it, the produced tree can be modified: elements can be appended,
attributes replaced and whole subtrees deep-copied from one document into another.
The tree is written back to XML using [`xmlwriter`](https://github.com/RazrFalcon/xmlwriter).

Unlike `usvg`, no SVG post-processing is performed.
Elements from any namespace are preserved and attribute values are kept verbatim.
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod parse;
mod writer;

pub use roxmltree;
pub use writer::{NamespaceMap, WriteOptions};
pub use xmlwriter::Indent;

/// The SVG namespace.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
/// The XLink namespace.
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
/// The XML namespace. Always bound to the `xml` prefix and never declared.
pub const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";
/// The Sodipodi namespace used by Inkscape.
pub const SODIPODI_NS: &str = "http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd";
/// The Inkscape namespace.
pub const INKSCAPE_NS: &str = "http://www.inkscape.org/namespaces/inkscape";

/// A list of all errors.
#[derive(Debug)]
pub enum Error {
    /// The document doesn't have a root element.
    NoRootElement,

    /// We do not allow documents with more than 1_000_000 nodes for security reasons.
    NodesLimitReached,

    /// Failed to parse an XML data.
    ParsingFailed(roxmltree::Error),
}

impl From<roxmltree::Error> for Error {
    fn from(e: roxmltree::Error) -> Self {
        Error::ParsingFailed(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::NoRootElement => {
                write!(f, "the document doesn't have a root element")
            }
            Error::NodesLimitReached => {
                write!(f, "the maximum number of nodes has been reached")
            }
            Error::ParsingFailed(ref e) => {
                write!(f, "XML data parsing failed cause {}", e)
            }
        }
    }
}

impl std::error::Error for Error {}

/// A namespace-qualified name.
///
/// Used both for elements and attributes.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct QName {
    /// Namespace URI.
    ///
    /// `None` for unqualified names.
    pub namespace: Option<String>,
    /// Local name.
    pub local: String,
}

impl QName {
    /// Creates a new name.
    pub fn new(namespace: Option<&str>, local: &str) -> Self {
        QName {
            namespace: namespace.map(ToString::to_string),
            local: local.to_string(),
        }
    }

    /// Creates a name in the SVG namespace.
    pub fn svg(local: &str) -> Self {
        QName::new(Some(SVG_NS), local)
    }

    /// Creates an unqualified name.
    ///
    /// Most SVG attributes, like `id` or `transform`, are unqualified.
    pub fn local(local: &str) -> Self {
        QName::new(None, local)
    }

    /// Checks that the name has the specified namespace and local name.
    #[inline]
    pub fn is(&self, namespace: Option<&str>, local: &str) -> bool {
        self.namespace.as_deref() == namespace && self.local == local
    }

    /// Checks that the name is an SVG element name.
    ///
    /// Documents without an `xmlns` declaration are common,
    /// so unqualified names are accepted too.
    #[inline]
    pub fn is_svg(&self, local: &str) -> bool {
        matches!(self.namespace.as_deref(), None | Some(SVG_NS)) && self.local == local
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.namespace {
            Some(ref ns) => write!(f, "{{{}}}{}", ns, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// An attribute.
#[derive(Clone, PartialEq, Debug)]
pub struct Attribute {
    /// Attribute's name.
    pub name: QName,
    /// Attribute's value.
    pub value: String,
}

impl Attribute {
    /// Creates a new unqualified attribute.
    pub fn new(name: &str, value: impl Into<String>) -> Self {
        Attribute {
            name: QName::local(name),
            value: value.into(),
        }
    }
}

/// A namespace declaration.
#[derive(Clone, PartialEq, Debug)]
pub struct Namespace {
    /// Namespace prefix.
    ///
    /// `None` for the default namespace.
    pub prefix: Option<String>,
    /// Namespace URI.
    pub uri: String,
}

/// A node ID inside a [`Document`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(usize);

#[derive(Clone)]
enum NodeKind {
    Root,
    Element {
        tag_name: QName,
        attributes: Vec<Attribute>,
    },
    Text(String),
}

struct NodeData {
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    children: Option<(NodeId, NodeId)>,
    kind: NodeKind,
}

/// An editable SVG tree container.
///
/// Contains only element and text nodes.
/// Comments and processing instructions are not preserved.
pub struct Document {
    nodes: Vec<NodeData>,
    root_element: NodeId,
    namespaces: Vec<Namespace>,
}

impl Document {
    /// Creates a document with a single, empty `svg` root element.
    ///
    /// The SVG namespace is declared as the default one.
    pub fn new() -> Self {
        let mut doc = Document::with_root_node();
        doc.namespaces.push(Namespace {
            prefix: None,
            uri: SVG_NS.to_string(),
        });
        doc.root_element = doc.append(
            NodeId(0),
            NodeKind::Element {
                tag_name: QName::svg("svg"),
                attributes: Vec::new(),
            },
        );
        doc
    }

    fn with_root_node() -> Self {
        Document {
            nodes: vec![NodeData {
                parent: None,
                prev_sibling: None,
                next_sibling: None,
                children: None,
                kind: NodeKind::Root,
            }],
            root_element: NodeId(0),
            namespaces: Vec::new(),
        }
    }

    /// Returns the root node.
    #[inline]
    pub fn root(&self) -> Node {
        self.get(NodeId(0))
    }

    /// Returns the root element.
    #[inline]
    pub fn root_element(&self) -> Node {
        self.get(self.root_element)
    }

    /// Returns an iterator over document's descendant nodes.
    ///
    /// Shorthand for `doc.root().descendants()`.
    #[inline]
    pub fn descendants(&self) -> Descendants {
        self.root().descendants()
    }

    /// Returns the first element in document order with the specified `id`.
    pub fn element_by_id(&self, id: &str) -> Option<Node> {
        self.descendants()
            .find(|n| n.is_element() && n.element_id() == id)
    }

    /// Returns a node by ID.
    ///
    /// # Panics
    ///
    /// When the ID doesn't belong to this document.
    #[inline]
    pub fn get(&self, id: NodeId) -> Node {
        Node {
            id,
            d: &self.nodes[id.0],
            doc: self,
        }
    }

    /// Returns namespaces declared on the root element.
    #[inline]
    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    /// Returns the total number of nodes, including the root one.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Appends a new element as the last child of `parent`.
    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag_name: QName,
        attributes: Vec<Attribute>,
    ) -> NodeId {
        self.append(parent, NodeKind::Element { tag_name, attributes })
    }

    /// Appends a new text node as the last child of `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> NodeId {
        self.append(parent, NodeKind::Text(text.into()))
    }

    /// Sets an attribute value.
    ///
    /// An existing attribute keeps its position, a new one is appended.
    /// Does nothing for non-element nodes.
    pub fn set_attribute(&mut self, node: NodeId, name: QName, value: impl Into<String>) {
        if let NodeKind::Element { ref mut attributes, .. } = self.nodes[node.0].kind {
            let value = value.into();
            match attributes.iter_mut().find(|a| a.name == name) {
                Some(attr) => attr.value = value,
                None => attributes.push(Attribute { name, value }),
            }
        }
    }

    /// Deep-copies `node` from another document and appends it to `parent`.
    ///
    /// New nodes are allocated for the whole subtree and attributes are duplicated,
    /// so the source document is left untouched.
    /// When `node` is a root node, its children are copied and `parent` is returned.
    pub fn copy_subtree(&mut self, parent: NodeId, node: Node) -> NodeId {
        let new_id = match node.d.kind {
            NodeKind::Root => parent,
            ref kind => self.append(parent, kind.clone()),
        };

        for child in node.children() {
            self.copy_subtree(new_id, child);
        }

        new_id
    }

    fn append(&mut self, parent_id: NodeId, kind: NodeKind) -> NodeId {
        let new_child_id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            parent: Some(parent_id),
            prev_sibling: None,
            next_sibling: None,
            children: None,
            kind,
        });

        let last_child_id = self.nodes[parent_id.0].children.map(|(_, id)| id);
        self.nodes[new_child_id.0].prev_sibling = last_child_id;

        if let Some(id) = last_child_id {
            self.nodes[id.0].next_sibling = Some(new_child_id);
        }

        self.nodes[parent_id.0].children = Some(
            if let Some((first_child_id, _)) = self.nodes[parent_id.0].children {
                (first_child_id, new_child_id)
            } else {
                (new_child_id, new_child_id)
            },
        );

        new_child_id
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new()
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        if !self.root().has_children() {
            return write!(f, "Document []");
        }

        macro_rules! writeln_indented {
            ($depth:expr, $f:expr, $fmt:expr) => {
                for _ in 0..$depth { write!($f, "    ")?; }
                writeln!($f, $fmt)?;
            };
            ($depth:expr, $f:expr, $fmt:expr, $($arg:tt)*) => {
                for _ in 0..$depth { write!($f, "    ")?; }
                writeln!($f, $fmt, $($arg)*)?;
            };
        }

        fn print_children(
            parent: Node,
            depth: usize,
            f: &mut std::fmt::Formatter,
        ) -> Result<(), std::fmt::Error> {
            for child in parent.children() {
                if let Some(tag_name) = child.tag_name() {
                    writeln_indented!(depth, f, "Element {{");
                    writeln_indented!(depth, f, "    tag_name: {}", tag_name);

                    if !child.attributes().is_empty() {
                        writeln_indented!(depth + 1, f, "attributes: [");
                        for attr in child.attributes() {
                            writeln_indented!(depth + 2, f, "{}={:?}", attr.name, attr.value);
                        }
                        writeln_indented!(depth + 1, f, "]");
                    }

                    if child.has_children() {
                        writeln_indented!(depth, f, "    children: [");
                        print_children(child, depth + 2, f)?;
                        writeln_indented!(depth, f, "    ]");
                    }

                    writeln_indented!(depth, f, "}}");
                } else {
                    writeln_indented!(depth, f, "{:?}", child);
                }
            }

            Ok(())
        }

        writeln!(f, "Document [")?;
        print_children(self.root(), 1, f)?;
        writeln!(f, "]")?;

        Ok(())
    }
}

/// A node handle.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    id: NodeId,
    doc: &'a Document,
    d: &'a NodeData,
}

impl Eq for Node<'_> {}

impl PartialEq for Node<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.doc, other.doc) && std::ptr::eq(self.d, other.d)
    }
}

impl<'a> Node<'a> {
    /// Returns node's ID.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Checks if the current node is an element.
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.d.kind, NodeKind::Element { .. })
    }

    /// Checks if the current node is a text.
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.d.kind, NodeKind::Text(_))
    }

    /// Returns element's tag name, unless the current node is not an element.
    #[inline]
    pub fn tag_name(&self) -> Option<&'a QName> {
        match self.d.kind {
            NodeKind::Element { ref tag_name, .. } => Some(tag_name),
            _ => None,
        }
    }

    /// Checks that the current node is an SVG element with the specified local name.
    #[inline]
    pub fn has_svg_tag_name(&self, local: &str) -> bool {
        self.tag_name().map_or(false, |n| n.is_svg(local))
    }

    /// Returns element's `id` attribute value.
    ///
    /// Returns an empty string otherwise.
    #[inline]
    pub fn element_id(&self) -> &'a str {
        self.attribute("id").unwrap_or("")
    }

    /// Returns an unqualified attribute value.
    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attribute_ns(None, name)
    }

    /// Returns a namespace-qualified attribute value.
    pub fn attribute_ns(&self, namespace: Option<&str>, local: &str) -> Option<&'a str> {
        self.attributes()
            .iter()
            .find(|a| a.name.is(namespace, local))
            .map(|a| a.value.as_str())
    }

    /// Returns a list of all element's attributes.
    #[inline]
    pub fn attributes(&self) -> &'a [Attribute] {
        match self.d.kind {
            NodeKind::Element { ref attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Returns node's text data.
    ///
    /// For text nodes returns its content. For elements returns the first child node text.
    pub fn text(&self) -> &'a str {
        match self.d.kind {
            NodeKind::Element { .. } => match self.first_child() {
                Some(child) => match child.d.kind {
                    NodeKind::Text(ref text) => text,
                    _ => "",
                },
                None => "",
            },
            NodeKind::Text(ref text) => text,
            NodeKind::Root => "",
        }
    }

    #[inline]
    fn gen_node(&self, id: NodeId) -> Node<'a> {
        self.doc.get(id)
    }

    /// Returns a parent node.
    #[inline]
    pub fn parent(&self) -> Option<Self> {
        self.d.parent.map(|id| self.gen_node(id))
    }

    /// Returns the previous sibling.
    #[inline]
    pub fn prev_sibling(&self) -> Option<Self> {
        self.d.prev_sibling.map(|id| self.gen_node(id))
    }

    /// Returns the next sibling.
    #[inline]
    pub fn next_sibling(&self) -> Option<Self> {
        self.d.next_sibling.map(|id| self.gen_node(id))
    }

    /// Returns the first child.
    #[inline]
    pub fn first_child(&self) -> Option<Self> {
        self.d.children.map(|(id, _)| self.gen_node(id))
    }

    /// Returns the last child.
    #[inline]
    pub fn last_child(&self) -> Option<Self> {
        self.d.children.map(|(_, id)| self.gen_node(id))
    }

    /// Checks if the node has child nodes.
    #[inline]
    pub fn has_children(&self) -> bool {
        self.d.children.is_some()
    }

    /// Returns an iterator over children nodes.
    #[inline]
    pub fn children(&self) -> Children<'a> {
        Children {
            front: self.first_child(),
            back: self.last_child(),
        }
    }

    /// Returns an iterator which traverses the subtree starting at this node.
    #[inline]
    pub fn traverse(&self) -> Traverse<'a> {
        Traverse {
            root: *self,
            edge: None,
        }
    }

    /// Returns an iterator over this node and its descendants.
    #[inline]
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants(self.traverse())
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self.d.kind {
            NodeKind::Root => write!(f, "Root"),
            NodeKind::Element {
                ref tag_name,
                ref attributes,
            } => write!(
                f,
                "Element {{ tag_name: {}, attributes: {:?} }}",
                tag_name, attributes
            ),
            NodeKind::Text(ref text) => write!(f, "Text({:?})", text),
        }
    }
}

/// An iterator over children nodes.
#[derive(Clone, Debug)]
pub struct Children<'a> {
    front: Option<Node<'a>>,
    back: Option<Node<'a>>,
}

impl<'a> Iterator for Children<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            let node = self.front.take();
            self.back = None;
            node
        } else {
            let node = self.front.take();
            self.front = node.as_ref().and_then(Node::next_sibling);
            node
        }
    }
}

impl<'a> DoubleEndedIterator for Children<'a> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.back == self.front {
            let node = self.back.take();
            self.front = None;
            node
        } else {
            let node = self.back.take();
            self.back = node.as_ref().and_then(Node::prev_sibling);
            node
        }
    }
}

/// Represents a tree edge.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Edge<'a> {
    /// An edge that opens a node.
    Open(Node<'a>),
    /// An edge that closes a node.
    Close(Node<'a>),
}

/// A depth-first tree traversal iterator.
#[derive(Clone, Debug)]
pub struct Traverse<'a> {
    root: Node<'a>,
    edge: Option<Edge<'a>>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = Edge<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.edge {
            Some(Edge::Open(node)) => {
                self.edge = Some(match node.first_child() {
                    Some(first_child) => Edge::Open(first_child),
                    None => Edge::Close(node),
                });
            }
            Some(Edge::Close(node)) => {
                if node == self.root {
                    self.edge = None;
                } else if let Some(next_sibling) = node.next_sibling() {
                    self.edge = Some(Edge::Open(next_sibling));
                } else {
                    self.edge = node.parent().map(Edge::Close);
                }
            }
            None => {
                self.edge = Some(Edge::Open(self.root));
            }
        }

        self.edge
    }
}

/// A descendants iterator.
#[derive(Clone, Debug)]
pub struct Descendants<'a>(Traverse<'a>);

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for edge in &mut self.0 {
            if let Edge::Open(node) = edge {
                return Some(node);
            }
        }

        None
    }
}
