// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::borrow::Cow;

use xmlwriter::{Indent, XmlWriter};

use crate::{Document, Namespace, Node, NodeKind, QName};
use crate::{INKSCAPE_NS, SODIPODI_NS, SVG_NS, XLINK_NS, XML_NS};

/// A mapping from a namespace URI to a preferred prefix.
///
/// Used only for namespaces that are not declared on the root element already.
/// An empty prefix stands for the default namespace.
#[derive(Clone, PartialEq, Debug)]
pub struct NamespaceMap(Vec<(String, String)>);

impl NamespaceMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        NamespaceMap(Vec::new())
    }

    /// Sets a preferred prefix for a namespace URI.
    pub fn insert(&mut self, uri: &str, prefix: &str) {
        match self.0.iter_mut().find(|(u, _)| u == uri) {
            Some(item) => item.1 = prefix.to_string(),
            None => self.0.push((uri.to_string(), prefix.to_string())),
        }
    }

    /// Returns a preferred prefix for a namespace URI.
    pub fn prefix(&self, uri: &str) -> Option<&str> {
        self.0.iter().find(|(u, _)| u == uri).map(|(_, p)| p.as_str())
    }
}

/// SVG, XLink, Sodipodi and Inkscape namespaces.
impl Default for NamespaceMap {
    fn default() -> Self {
        let mut map = NamespaceMap::new();
        map.insert(SVG_NS, "");
        map.insert(XLINK_NS, "xlink");
        map.insert(SODIPODI_NS, "sodipodi");
        map.insert(INKSCAPE_NS, "inkscape");
        map
    }
}

/// XML writing options.
#[derive(Clone, Debug)]
pub struct WriteOptions {
    /// Write the `<?xml ...?>` declaration.
    ///
    /// Default: true
    pub xml_declaration: bool,

    /// Prefixes for namespaces used in the tree, but not declared on the root element.
    ///
    /// Default: `NamespaceMap::default()`
    pub namespaces: NamespaceMap,

    /// Use single quote marks instead of double quote.
    ///
    /// Default: disabled
    pub use_single_quote: bool,

    /// Set XML nodes indention.
    ///
    /// Default: 4 spaces
    pub indent: Indent,

    /// Set XML attributes indention.
    ///
    /// Default: `None`
    pub attributes_indent: Indent,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            xml_declaration: true,
            namespaces: NamespaceMap::default(),
            use_single_quote: false,
            indent: Indent::Spaces(4),
            attributes_indent: Indent::None,
        }
    }
}

impl Document {
    /// Writes the document back to XML.
    pub fn to_string(&self, opt: &WriteOptions) -> String {
        convert(self, opt)
    }
}

fn convert(doc: &Document, opt: &WriteOptions) -> String {
    let scope = Scope::collect(doc, &opt.namespaces);

    let mut xml = XmlWriter::new(xmlwriter::Options {
        use_single_quote: opt.use_single_quote,
        indent: opt.indent,
        attributes_indent: opt.attributes_indent,
    });

    if opt.xml_declaration {
        xml.write_declaration();
    }

    write_element(
        doc.root_element(),
        Some(scope.declarations.as_slice()),
        &scope,
        false,
        &mut xml,
    );

    xml.end_document()
}

fn write_element(
    node: Node,
    declarations: Option<&[Namespace]>,
    scope: &Scope,
    in_text: bool,
    xml: &mut XmlWriter,
) {
    let tag_name = match node.tag_name() {
        Some(v) => v,
        None => return,
    };

    xml.start_element(&scope.element_name(tag_name));

    if let Some(declarations) = declarations {
        for ns in declarations {
            match ns.prefix {
                Some(ref prefix) => xml.write_attribute(&format!("xmlns:{}", prefix), &ns.uri),
                None => xml.write_attribute("xmlns", &ns.uri),
            }
        }
    }

    for attr in node.attributes() {
        xml.write_attribute(&scope.attribute_name(&attr.name), &escape(&attr.value));
    }

    let is_text_root = !in_text && tag_name.is_svg("text");
    if is_text_root {
        xml.set_preserve_whitespaces(true);
    }

    for child in node.children() {
        match child.d.kind {
            NodeKind::Element { .. } => {
                write_element(child, None, scope, in_text || is_text_root, xml);
            }
            NodeKind::Text(ref text) => xml.write_text(&escape(text)),
            NodeKind::Root => {}
        }
    }

    xml.end_element();

    if is_text_root {
        xml.set_preserve_whitespaces(false);
    }
}

fn escape(text: &str) -> Cow<str> {
    if !text.contains(|c: char| matches!(c, '&' | '<' | '>')) {
        return Cow::Borrowed(text);
    }

    let mut s = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => s.push_str("&amp;"),
            '<' => s.push_str("&lt;"),
            '>' => s.push_str("&gt;"),
            _ => s.push(c),
        }
    }

    Cow::Owned(s)
}

/// Namespace declarations of the root element.
struct Scope {
    declarations: Vec<Namespace>,
}

impl Scope {
    /// Starts with root declarations and declares every used, but unknown namespace.
    fn collect(doc: &Document, map: &NamespaceMap) -> Self {
        let mut scope = Scope {
            declarations: doc.namespaces().to_vec(),
        };

        for node in doc.root_element().descendants() {
            if let Some(tag_name) = node.tag_name() {
                if let Some(ref uri) = tag_name.namespace {
                    if scope.element_prefix(uri).is_none() {
                        scope.declare(uri, map, true);
                    }
                }
            }

            for attr in node.attributes() {
                if let Some(ref uri) = attr.name.namespace {
                    if uri != XML_NS && scope.attribute_prefix(uri).is_none() {
                        scope.declare(uri, map, false);
                    }
                }
            }
        }

        scope
    }

    fn declare(&mut self, uri: &str, map: &NamespaceMap, allow_default: bool) {
        let prefix = match map.prefix(uri) {
            Some("") if allow_default && !self.has_default() => None,
            Some(p) if !p.is_empty() && !self.has_prefix(p) => Some(p.to_string()),
            _ => Some(self.gen_prefix()),
        };

        log::debug!("Declaring namespace '{}' as {:?}.", uri, prefix);

        self.declarations.push(Namespace {
            prefix,
            uri: uri.to_string(),
        });
    }

    fn has_default(&self) -> bool {
        self.declarations.iter().any(|ns| ns.prefix.is_none())
    }

    fn has_prefix(&self, prefix: &str) -> bool {
        prefix == "xml"
            || prefix == "xmlns"
            || self
                .declarations
                .iter()
                .any(|ns| ns.prefix.as_deref() == Some(prefix))
    }

    fn gen_prefix(&self) -> String {
        let mut idx = 0;
        loop {
            let prefix = format!("ns{}", idx);
            if !self.has_prefix(&prefix) {
                return prefix;
            }
            idx += 1;
        }
    }

    /// Returns `Some("")` for the default namespace.
    fn element_prefix(&self, uri: &str) -> Option<&str> {
        if self
            .declarations
            .iter()
            .any(|ns| ns.prefix.is_none() && ns.uri == uri)
        {
            return Some("");
        }

        self.attribute_prefix(uri)
    }

    fn attribute_prefix(&self, uri: &str) -> Option<&str> {
        if uri == XML_NS {
            return Some("xml");
        }

        self.declarations
            .iter()
            .find(|ns| ns.uri == uri && ns.prefix.is_some())
            .and_then(|ns| ns.prefix.as_deref())
    }

    fn element_name<'a>(&self, name: &'a QName) -> Cow<'a, str> {
        let prefix = name
            .namespace
            .as_deref()
            .and_then(|uri| self.element_prefix(uri))
            .unwrap_or("");
        qualify(prefix, &name.local)
    }

    fn attribute_name<'a>(&self, name: &'a QName) -> Cow<'a, str> {
        let prefix = name
            .namespace
            .as_deref()
            .and_then(|uri| self.attribute_prefix(uri))
            .unwrap_or("");
        qualify(prefix, &name.local)
    }
}

fn qualify<'a>(prefix: &str, local: &'a str) -> Cow<'a, str> {
    if prefix.is_empty() {
        Cow::Borrowed(local)
    } else {
        Cow::Owned(format!("{}:{}", prefix, local))
    }
}

#[cfg(test)]
mod tests {
    use crate::{Attribute, Document, Indent, NamespaceMap, QName, WriteOptions, INKSCAPE_NS};

    fn compact() -> WriteOptions {
        WriteOptions {
            xml_declaration: false,
            use_single_quote: true,
            indent: Indent::None,
            ..WriteOptions::default()
        }
    }

    fn write(doc: &Document, opt: &WriteOptions) -> String {
        doc.to_string(opt).trim_end().to_string()
    }

    #[test]
    fn write_simple() {
        let doc = Document::parse_str(
            "<svg xmlns='http://www.w3.org/2000/svg' width='10mm'><rect x='1'/></svg>",
        )
        .unwrap();

        assert_eq!(
            write(&doc, &compact()),
            "<svg xmlns='http://www.w3.org/2000/svg' width='10mm'><rect x='1'/></svg>"
        );
    }

    #[test]
    fn write_declaration() {
        let doc = Document::new();
        let s = doc.to_string(&WriteOptions::default());
        assert!(s.starts_with("<?xml"));
    }

    #[test]
    fn write_keeps_root_prefixes() {
        let doc = Document::parse_str(
            "<svg xmlns='http://www.w3.org/2000/svg' xmlns:ik='http://www.inkscape.org/namespaces/inkscape'>\
             <g ik:label='L'/></svg>",
        )
        .unwrap();

        assert_eq!(
            write(&doc, &compact()),
            "<svg xmlns='http://www.w3.org/2000/svg' \
             xmlns:ik='http://www.inkscape.org/namespaces/inkscape'><g ik:label='L'/></svg>"
        );
    }

    #[test]
    fn write_declares_copied_namespaces() {
        let src = Document::parse_str(
            "<svg xmlns='http://www.w3.org/2000/svg' xmlns:inkscape='http://www.inkscape.org/namespaces/inkscape'>\
             <g inkscape:label='L'/></svg>",
        )
        .unwrap();

        let mut doc = Document::new();
        let root = doc.root_element().id();
        doc.copy_subtree(root, src.root_element().first_child().unwrap());

        assert_eq!(
            write(&doc, &compact()),
            "<svg xmlns='http://www.w3.org/2000/svg' \
             xmlns:inkscape='http://www.inkscape.org/namespaces/inkscape'><g inkscape:label='L'/></svg>"
        );
    }

    #[test]
    fn write_uses_custom_map() {
        let mut doc = Document::new();
        let root = doc.root_element().id();
        doc.append_element(
            root,
            QName::svg("g"),
            vec![Attribute {
                name: QName::new(Some(INKSCAPE_NS), "label"),
                value: "L".to_string(),
            }],
        );

        let mut opt = compact();
        opt.namespaces = NamespaceMap::new();
        opt.namespaces.insert(INKSCAPE_NS, "ink");
        assert_eq!(
            write(&doc, &opt),
            "<svg xmlns='http://www.w3.org/2000/svg' \
             xmlns:ink='http://www.inkscape.org/namespaces/inkscape'><g ink:label='L'/></svg>"
        );

        opt.namespaces = NamespaceMap::new();
        assert_eq!(
            write(&doc, &opt),
            "<svg xmlns='http://www.w3.org/2000/svg' \
             xmlns:ns0='http://www.inkscape.org/namespaces/inkscape'><g ns0:label='L'/></svg>"
        );
    }

    #[test]
    fn write_escapes() {
        let doc = Document::parse_str(
            "<svg xmlns='http://www.w3.org/2000/svg'><text data-a='a &amp; b'>1 &lt; 2</text></svg>",
        )
        .unwrap();

        assert_eq!(
            write(&doc, &compact()),
            "<svg xmlns='http://www.w3.org/2000/svg'><text data-a='a &amp; b'>1 &lt; 2</text></svg>"
        );
    }

    #[test]
    fn write_xml_namespace() {
        let doc = Document::parse_str(
            "<svg xmlns='http://www.w3.org/2000/svg'><text xml:space='preserve'>a</text></svg>",
        )
        .unwrap();

        assert_eq!(
            write(&doc, &compact()),
            "<svg xmlns='http://www.w3.org/2000/svg'><text xml:space='preserve'>a</text></svg>"
        );
    }
}
