// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use super::{Attribute, Document, Error, Namespace, NodeId, NodeKind, QName, XML_NS};

const NODES_LIMIT: usize = 1_000_000;

impl Document {
    /// Parses a [`Document`] from a string.
    pub fn parse_str(text: &str) -> Result<Document, Error> {
        let xml_opt = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };

        let xml = roxmltree::Document::parse_with_options(text, xml_opt)?;
        Document::parse_tree(&xml)
    }

    /// Parses a [`Document`] from a [`roxmltree::Document`].
    pub fn parse_tree(xml: &roxmltree::Document) -> Result<Document, Error> {
        parse(xml)
    }
}

fn parse(xml: &roxmltree::Document) -> Result<Document, Error> {
    let xml_root = xml
        .root()
        .children()
        .find(|n| n.is_element())
        .ok_or(Error::NoRootElement)?;

    let mut doc = Document::with_root_node();

    doc.namespaces = xml_root
        .namespaces()
        .filter(|ns| ns.uri() != XML_NS)
        .map(|ns| Namespace {
            prefix: ns.name().map(ToString::to_string),
            uri: ns.uri().to_string(),
        })
        .collect();

    doc.root_element = parse_xml_element(xml_root, NodeId(0), false, &mut doc)?;

    Ok(doc)
}

fn parse_xml_element(
    node: roxmltree::Node,
    parent_id: NodeId,
    in_text: bool,
    doc: &mut Document,
) -> Result<NodeId, Error> {
    if doc.nodes.len() >= NODES_LIMIT {
        return Err(Error::NodesLimitReached);
    }

    let tag_name = QName::new(node.tag_name().namespace(), node.tag_name().name());
    let attributes = node
        .attributes()
        .map(|attr| Attribute {
            name: QName::new(attr.namespace(), attr.name()),
            value: attr.value().to_string(),
        })
        .collect();

    // Whitespaces are significant only inside text content.
    let in_text = in_text || tag_name.is_svg("text");

    let node_id = doc.append(
        parent_id,
        NodeKind::Element {
            tag_name,
            attributes,
        },
    );

    for child in node.children() {
        match child.node_type() {
            roxmltree::NodeType::Element => {
                parse_xml_element(child, node_id, in_text, doc)?;
            }
            roxmltree::NodeType::Text => {
                let text = child.text().unwrap_or_default();
                if in_text || !text.trim().is_empty() {
                    doc.append(node_id, NodeKind::Text(text.to_string()));
                }
            }
            _ => {}
        }
    }

    Ok(node_id)
}
