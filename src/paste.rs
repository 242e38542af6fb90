// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use svgtree::{Document, QName};

use crate::merge::{merge, MergeReport, Selection};
use crate::metadata::{SizeMetadata, UnitPolicy};
use crate::transform::{self, format_num, TransformOp, TransformSpec, UnknownTransformPolicy};
use crate::Error;

/// A pasted content position inside the container, in millimeters.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug, Default)]
pub struct Placement {
    pub x_mm: f64,
    pub y_mm: f64,
}

/// Paste options.
#[derive(Clone, Debug)]
pub struct PasteOptions {
    /// Which source content to paste.
    ///
    /// Default: `Selection::AllDrawable`
    pub selection: Selection,

    /// Top-left position of the pasted content.
    ///
    /// Default: (0, 0)
    pub placement: Placement,

    /// Additional transforms applied after the dimension-compensating scale.
    ///
    /// Default: empty
    pub transforms: Vec<TransformSpec>,

    /// Default: `UnknownTransformPolicy::Fail`
    pub unknown_transforms: UnknownTransformPolicy,

    /// Accepted `width` units.
    ///
    /// Default: `UnitPolicy::Strict`
    pub units: UnitPolicy,

    /// Enlarge the container when the pasted content doesn't fit.
    ///
    /// The container is never shrunk.
    ///
    /// Default: disabled
    pub grow_canvas: bool,

    /// Wrapper element ID. Used as a prefix for `Selection::AllGroups`.
    ///
    /// Default: derived from `name` or the selection
    pub wrapper_id: Option<String>,

    /// Source name. Usually a file stem.
    ///
    /// Default: `None`, which is the same as `pasted`
    pub name: Option<String>,

    /// Number of digits after the decimal point in generated values.
    ///
    /// Default: 12
    pub precision: u8,

    /// Output XML options.
    pub write: svgtree::WriteOptions,
}

impl Default for PasteOptions {
    fn default() -> Self {
        PasteOptions {
            selection: Selection::default(),
            placement: Placement::default(),
            transforms: Vec::new(),
            unknown_transforms: UnknownTransformPolicy::default(),
            units: UnitPolicy::default(),
            grow_canvas: false,
            wrapper_id: None,
            name: None,
            precision: transform::DEFAULT_PRECISION,
            write: svgtree::WriteOptions::default(),
        }
    }
}

impl PasteOptions {
    fn wrapper_id(&self) -> String {
        if let Some(ref id) = self.wrapper_id {
            return id.clone();
        }

        match self.selection {
            Selection::SingleGroup(ref id) => format!("wrapper_for_{}", id),
            Selection::AllGroups => "wrapper_for".to_string(),
            Selection::AllDrawable => self.name.clone().unwrap_or_else(|| "pasted".to_string()),
        }
    }
}

/// Pastes `source` content into `container` keeping its physical size.
///
/// On error, `container` is left untouched.
pub fn paste(
    container: &mut Document,
    source: &Document,
    opt: &PasteOptions,
) -> Result<MergeReport, Error> {
    let dst_meta = SizeMetadata::extract(container, opt.units)?;
    let src_meta = SizeMetadata::extract(source, opt.units)?;

    let dst_ratio = dst_meta.units_per_mm();
    let composed = transform::compose(
        src_meta.units_per_mm(),
        dst_ratio,
        &opt.transforms,
        opt.unknown_transforms,
    )?;

    // Placement goes first, so it is not affected by the following scale.
    let placement = TransformOp::Translate(
        opt.placement.x_mm * dst_ratio,
        opt.placement.y_mm * dst_ratio,
    );
    let ts = format!(
        "{} {}",
        placement.to_svg_string(opt.precision),
        composed.to_svg_string(opt.precision)
    );
    log::info!("Pasted content transform is '{}'.", ts);

    let mut report = merge(container, source, &opt.selection, &ts, &opt.wrapper_id())?;

    if opt.grow_canvas {
        report.canvas_grown = grow_canvas(container, &dst_meta, &src_meta, opt);
    }

    Ok(report)
}

fn grow_canvas(
    container: &mut Document,
    dst: &SizeMetadata,
    src: &SizeMetadata,
    opt: &PasteOptions,
) -> bool {
    let root_id = container.root_element().id();
    let mut view_box = dst.view_box;
    let mut grown = false;

    let width = opt.placement.x_mm + src.width_mm;
    if width > dst.width_mm {
        view_box.w *= width / dst.width_mm;
        let value = format!("{}mm", format_num(width, opt.precision));
        log::info!("Container width is increased to {}.", value);
        container.set_attribute(root_id, QName::local("width"), value);
        grown = true;
    }

    match (dst.height_mm, src.height_mm) {
        (Some(dst_height), Some(src_height)) => {
            let height = opt.placement.y_mm + src_height;
            if height > dst_height {
                view_box.h *= height / dst_height;
                let value = format!("{}mm", format_num(height, opt.precision));
                log::info!("Container height is increased to {}.", value);
                container.set_attribute(root_id, QName::local("height"), value);
                grown = true;
            }
        }
        _ => {
            log::warn!("Container height cannot be grown since the height is not set.");
        }
    }

    if grown {
        let value = format!(
            "{} {} {} {}",
            format_num(view_box.x, opt.precision),
            format_num(view_box.y, opt.precision),
            format_num(view_box.w, opt.precision),
            format_num(view_box.h, opt.precision),
        );
        container.set_attribute(root_id, QName::local("viewBox"), value);
    }

    grown
}
