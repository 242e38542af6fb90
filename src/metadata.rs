// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use float_cmp::ApproxEqUlps;
use svgtree::Document;
use svgtypes::{Length, LengthUnit};

use crate::{Error, MalformedDocument};

/// Defines which `width` units are accepted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnitPolicy {
    /// Only millimeters.
    Strict,

    /// Any absolute unit: `mm`, `cm`, `in`, `pt`, `pc` and `px`.
    ///
    /// Pixels are converted using 96 DPI.
    Absolute,
}

impl Default for UnitPolicy {
    fn default() -> Self {
        UnitPolicy::Strict
    }
}

/// A root element `viewBox`.
#[allow(missing_docs)]
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ViewBox {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

/// Physical size of a document.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct SizeMetadata {
    /// Root element `width`, in millimeters. Always positive.
    pub width_mm: f64,

    /// Root element `height`, in millimeters.
    ///
    /// `None` when not set or cannot be converted.
    pub height_mm: Option<f64>,

    /// Root element `viewBox`.
    pub view_box: ViewBox,
}

impl SizeMetadata {
    /// Extracts size metadata from the root element of a document.
    pub fn extract(doc: &Document, policy: UnitPolicy) -> Result<Self, Error> {
        let root = doc.root_element();

        let width = root
            .attribute("width")
            .ok_or(MalformedDocument::MissingWidth)?;
        let view_box = root
            .attribute("viewBox")
            .ok_or(MalformedDocument::MissingViewBox)?;

        let width_mm = to_mm(width, policy)?;
        if width_mm.approx_eq_ulps(&0.0, 4) {
            return Err(MalformedDocument::ZeroWidth.into());
        } else if width_mm < 0.0 {
            return Err(MalformedDocument::InvalidWidth(width.to_string()).into());
        }

        let height_mm = root
            .attribute("height")
            .and_then(|v| to_mm(v, policy).ok())
            .filter(|v| *v > 0.0);

        let view_box = parse_view_box(view_box)?;

        let meta = SizeMetadata {
            width_mm,
            height_mm,
            view_box,
        };

        log::info!(
            "Document is {}mm wide, {} units per mm.",
            meta.width_mm,
            meta.units_per_mm()
        );

        Ok(meta)
    }

    /// Returns the number of `viewBox` units per millimeter.
    #[inline]
    pub fn units_per_mm(&self) -> f64 {
        self.view_box.w / self.width_mm
    }
}

fn to_mm(text: &str, policy: UnitPolicy) -> Result<f64, MalformedDocument> {
    let length =
        Length::from_str(text).map_err(|_| MalformedDocument::InvalidWidth(text.to_string()))?;

    let factor = match (length.unit, policy) {
        (LengthUnit::Mm, _) => 1.0,
        (LengthUnit::Cm, UnitPolicy::Absolute) => 10.0,
        (LengthUnit::In, UnitPolicy::Absolute) => 25.4,
        (LengthUnit::Pt, UnitPolicy::Absolute) => 25.4 / 72.0,
        (LengthUnit::Pc, UnitPolicy::Absolute) => 25.4 / 6.0,
        (LengthUnit::Px, UnitPolicy::Absolute) => 25.4 / 96.0,
        _ => return Err(MalformedDocument::UnsupportedUnit(text.to_string())),
    };

    Ok(length.number * factor)
}

fn parse_view_box(text: &str) -> Result<ViewBox, MalformedDocument> {
    // A non-positive size is rejected by the parser.
    let vb = svgtypes::ViewBox::from_str(text)
        .map_err(|_| MalformedDocument::InvalidViewBox(text.to_string()))?;

    Ok(ViewBox {
        x: vb.x,
        y: vb.y,
        w: vb.w,
        h: vb.h,
    })
}

#[rustfmt::skip]
#[cfg(test)]
mod tests {
    use super::*;

    fn doc(attrs: &str) -> Document {
        let text = format!("<svg xmlns='http://www.w3.org/2000/svg' {}/>", attrs);
        Document::parse_str(&text).unwrap()
    }

    fn extract(attrs: &str, policy: UnitPolicy) -> Result<SizeMetadata, Error> {
        SizeMetadata::extract(&doc(attrs), policy)
    }

    macro_rules! test_ratio {
        ($name:ident, $policy:expr, $attrs:expr, $ratio:expr) => (
            #[test]
            fn $name() {
                let meta = extract($attrs, $policy).unwrap();
                assert!((meta.units_per_mm() - $ratio).abs() < 1e-9, "{}", meta.units_per_mm());
            }
        )
    }

    test_ratio!(ratio_mm,       UnitPolicy::Strict,   "width='10mm' viewBox='0 0 100 10'", 10.0);
    test_ratio!(ratio_fraction, UnitPolicy::Strict,   "width='210mm' viewBox='0 0 744.09 1052.36'", 744.09 / 210.0);
    test_ratio!(ratio_offset,   UnitPolicy::Strict,   "width='5mm' viewBox='-10 -10 25 5'", 5.0);
    test_ratio!(ratio_commas,   UnitPolicy::Strict,   "width='4mm' viewBox='0,0,8,8'", 2.0);
    test_ratio!(ratio_cm,       UnitPolicy::Absolute, "width='1cm' viewBox='0 0 100 10'", 10.0);
    test_ratio!(ratio_in,       UnitPolicy::Absolute, "width='1in' viewBox='0 0 254 10'", 10.0);
    test_ratio!(ratio_px,       UnitPolicy::Absolute, "width='96px' viewBox='0 0 254 10'", 10.0);
    test_ratio!(ratio_pt,       UnitPolicy::Absolute, "width='72pt' viewBox='0 0 25.4 10'", 1.0);
    test_ratio!(ratio_pc,       UnitPolicy::Absolute, "width='6pc' viewBox='0 0 25.4 10'", 1.0);
    test_ratio!(ratio_abs_mm,   UnitPolicy::Absolute, "width='10mm' viewBox='0 0 100 10'", 10.0);

    macro_rules! test_err {
        ($name:ident, $policy:expr, $attrs:expr, $err:expr) => (
            #[test]
            fn $name() {
                match extract($attrs, $policy) {
                    Err(Error::MalformedDocument(e)) => assert_eq!(e, $err),
                    v => panic!("unexpected result: {:?}", v),
                }
            }
        )
    }

    test_err!(missing_width,    UnitPolicy::Strict,   "viewBox='0 0 1 1'",
              MalformedDocument::MissingWidth);
    test_err!(missing_view_box, UnitPolicy::Strict,   "width='1mm'",
              MalformedDocument::MissingViewBox);
    test_err!(missing_both,     UnitPolicy::Strict,   "",
              MalformedDocument::MissingWidth);
    test_err!(px_is_strict,     UnitPolicy::Strict,   "width='10px' viewBox='0 0 1 1'",
              MalformedDocument::UnsupportedUnit("10px".to_string()));
    test_err!(unitless,         UnitPolicy::Strict,   "width='10' viewBox='0 0 1 1'",
              MalformedDocument::UnsupportedUnit("10".to_string()));
    test_err!(unitless_abs,     UnitPolicy::Absolute, "width='10' viewBox='0 0 1 1'",
              MalformedDocument::UnsupportedUnit("10".to_string()));
    test_err!(percent_abs,      UnitPolicy::Absolute, "width='100%' viewBox='0 0 1 1'",
              MalformedDocument::UnsupportedUnit("100%".to_string()));
    test_err!(em_abs,           UnitPolicy::Absolute, "width='2em' viewBox='0 0 1 1'",
              MalformedDocument::UnsupportedUnit("2em".to_string()));
    test_err!(zero_width,       UnitPolicy::Strict,   "width='0mm' viewBox='0 0 1 1'",
              MalformedDocument::ZeroWidth);
    test_err!(negative_width,   UnitPolicy::Strict,   "width='-5mm' viewBox='0 0 1 1'",
              MalformedDocument::InvalidWidth("-5mm".to_string()));
    test_err!(garbage_width,    UnitPolicy::Strict,   "width='wide' viewBox='0 0 1 1'",
              MalformedDocument::InvalidWidth("wide".to_string()));
    test_err!(trailing_width,   UnitPolicy::Strict,   "width='5mmx' viewBox='0 0 1 1'",
              MalformedDocument::InvalidWidth("5mmx".to_string()));
    test_err!(short_view_box,   UnitPolicy::Strict,   "width='5mm' viewBox='0 0 10'",
              MalformedDocument::InvalidViewBox("0 0 10".to_string()));
    test_err!(zero_view_box,    UnitPolicy::Strict,   "width='5mm' viewBox='0 0 0 10'",
              MalformedDocument::InvalidViewBox("0 0 0 10".to_string()));
    test_err!(flat_view_box,    UnitPolicy::Strict,   "width='5mm' viewBox='0 0 10 0'",
              MalformedDocument::InvalidViewBox("0 0 10 0".to_string()));
    test_err!(negative_view_box, UnitPolicy::Strict,  "width='5mm' viewBox='0 0 -10 10'",
              MalformedDocument::InvalidViewBox("0 0 -10 10".to_string()));

    #[test]
    fn height_is_optional() {
        let meta = extract("width='10mm' viewBox='0 0 100 10'", UnitPolicy::Strict).unwrap();
        assert_eq!(meta.height_mm, None);

        let meta = extract("width='10mm' height='4mm' viewBox='0 0 100 40'", UnitPolicy::Strict).unwrap();
        assert_eq!(meta.height_mm, Some(4.0));

        // An unusable height is not an error.
        let meta = extract("width='10mm' height='100%' viewBox='0 0 100 40'", UnitPolicy::Strict).unwrap();
        assert_eq!(meta.height_mm, None);
    }

    #[test]
    fn view_box_fields() {
        let meta = extract("width='10mm' viewBox='1 2 30 40'", UnitPolicy::Strict).unwrap();
        assert_eq!(meta.view_box, ViewBox { x: 1.0, y: 2.0, w: 30.0, h: 40.0 });
    }

    #[test]
    fn extraction_is_idempotent() {
        let doc = doc("width='7.5mm' height='3mm' viewBox='0 0 33 11'");
        let a = SizeMetadata::extract(&doc, UnitPolicy::Strict).unwrap();
        let b = SizeMetadata::extract(&doc, UnitPolicy::Strict).unwrap();
        assert_eq!(a, b);
    }
}
