// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::HashSet;

use svgtree::{Attribute, Document, Node, NodeId, QName};

use crate::Error;

/// Defines which source content is pasted.
#[derive(Clone, PartialEq, Debug)]
pub enum Selection {
    /// Children of the element with the specified ID, in a single wrapper.
    SingleGroup(String),

    /// Every top-level `g` element, each in its own wrapper.
    AllGroups,

    /// Every top-level element except structural ones, in a single wrapper.
    AllDrawable,
}

impl Default for Selection {
    fn default() -> Self {
        Selection::AllDrawable
    }
}

/// A top-level element class.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NodeClass {
    /// `defs`, `style`, `metadata` or `namedview`, in any namespace.
    Structural,
    /// An SVG `g` element.
    Group,
    /// Anything else.
    Drawable,
}

impl NodeClass {
    /// Classifies an element.
    ///
    /// Returns `None` for non-element nodes.
    pub fn classify(node: Node) -> Option<Self> {
        let tag_name = node.tag_name()?;
        let class = match tag_name.local.as_str() {
            "defs" | "style" | "metadata" | "namedview" => NodeClass::Structural,
            "g" if tag_name.is_svg("g") => NodeClass::Group,
            _ => NodeClass::Drawable,
        };

        Some(class)
    }
}

/// A merge result.
#[derive(Clone, PartialEq, Debug, Default)]
pub struct MergeReport {
    /// IDs of the appended wrappers, in document order.
    pub wrapper_ids: Vec<String>,

    /// The number of copied top-level elements.
    pub copied: usize,

    /// Set when the container size was increased.
    pub canvas_grown: bool,
}

struct Batch {
    id: String,
    nodes: Vec<NodeId>,
}

/// Copies selected `source` content into `container`.
///
/// Each batch of copied nodes is placed into a new `g` wrapper with the specified
/// `transform`, which is appended as the last child of the container root element.
/// For [`Selection::AllGroups`], `wrapper_id` is used as an ID prefix.
///
/// All lookups are done before the container is modified,
/// so on error it stays untouched. `source` is never modified.
pub fn merge(
    container: &mut Document,
    source: &Document,
    selection: &Selection,
    transform: &str,
    wrapper_id: &str,
) -> Result<MergeReport, Error> {
    let batches = collect(source, selection, wrapper_id)?;

    let mut taken: HashSet<String> = container
        .descendants()
        .filter_map(|n| n.attribute("id"))
        .map(ToString::to_string)
        .collect();

    // Wrappers must not clash with the copied IDs either.
    for batch in &batches {
        for node_id in &batch.nodes {
            let ids = source.get(*node_id).descendants().filter_map(|n| n.attribute("id"));
            taken.extend(ids.map(ToString::to_string));
        }
    }

    let root_id = container.root_element().id();
    let mut report = MergeReport::default();
    for batch in batches {
        let id = unique_id(batch.id, &mut taken);
        let wrapper = container.append_element(
            root_id,
            QName::svg("g"),
            vec![
                Attribute::new("id", id.as_str()),
                Attribute::new("transform", transform),
            ],
        );

        for node_id in &batch.nodes {
            container.copy_subtree(wrapper, source.get(*node_id));
        }

        log::info!("{} element(s) were pasted into '{}'.", batch.nodes.len(), id);
        report.copied += batch.nodes.len();
        report.wrapper_ids.push(id);
    }

    Ok(report)
}

fn collect(source: &Document, selection: &Selection, wrapper_id: &str) -> Result<Vec<Batch>, Error> {
    let root = source.root_element();
    let batches = match *selection {
        Selection::SingleGroup(ref id) => {
            let group = root
                .descendants()
                .skip(1)
                .find(|n| n.attribute("id") == Some(id.as_str()))
                .ok_or_else(|| Error::GroupNotFound(id.clone()))?;

            vec![Batch {
                id: wrapper_id.to_string(),
                nodes: group.children().filter(|n| n.is_element()).map(|n| n.id()).collect(),
            }]
        }
        Selection::AllGroups => {
            let batches: Vec<_> = root
                .children()
                .filter(|n| NodeClass::classify(*n) == Some(NodeClass::Group))
                .enumerate()
                .map(|(i, g)| {
                    let name = match g.attribute("id") {
                        Some(id) if !id.is_empty() => id.to_string(),
                        _ => format!("imported_group_{}", i + 1),
                    };

                    Batch {
                        id: format!("{}_{}", wrapper_id, name),
                        nodes: vec![g.id()],
                    }
                })
                .collect();

            if batches.is_empty() {
                return Err(Error::NoGroupsFound);
            }

            batches
        }
        Selection::AllDrawable => {
            let nodes: Vec<_> = root
                .children()
                .filter(|n| match NodeClass::classify(*n) {
                    Some(NodeClass::Group) | Some(NodeClass::Drawable) => true,
                    Some(NodeClass::Structural) | None => false,
                })
                .map(|n| n.id())
                .collect();

            if nodes.is_empty() {
                return Err(Error::NoDrawableContent);
            }

            vec![Batch {
                id: wrapper_id.to_string(),
                nodes,
            }]
        }
    };

    Ok(batches)
}

fn unique_id(base: String, taken: &mut HashSet<String>) -> String {
    let mut id = base.clone();
    let mut n = 2;
    while taken.contains(&id) {
        id = format!("{}_{}", base, n);
        n += 1;
    }

    taken.insert(id.clone());
    id
}
