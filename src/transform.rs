// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::fmt::{self, Display, Write};

use float_cmp::ApproxEqUlps;

use crate::Error;

/// The default number of digits after the decimal point.
pub const DEFAULT_PRECISION: u8 = 12;

const MAX_PRECISION: u8 = 12;

const POW_VEC: &[f64] = &[
    1.0,
    10.0,
    100.0,
    1_000.0,
    10_000.0,
    100_000.0,
    1_000_000.0,
    10_000_000.0,
    100_000_000.0,
    1_000_000_000.0,
    10_000_000_000.0,
    100_000_000_000.0,
    1_000_000_000_000.0,
];

/// A single SVG transform function.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum TransformOp {
    /// `scale(f)`
    Scale(f64),
    /// `translate(dx dy)`, in `viewBox` units.
    Translate(f64, f64),
    /// `rotate(deg)`
    Rotate(f64),
}

impl TransformOp {
    /// Formats the operation using the specified number precision.
    pub fn to_svg_string(&self, precision: u8) -> String {
        let mut s = String::new();
        self.write_to(&mut s, precision);
        s
    }

    fn write_to(&self, buf: &mut String, precision: u8) {
        match *self {
            TransformOp::Scale(f) => {
                buf.push_str("scale(");
                write_num(f, buf, precision);
            }
            TransformOp::Translate(dx, dy) => {
                buf.push_str("translate(");
                write_num(dx, buf, precision);
                buf.push(' ');
                write_num(dy, buf, precision);
            }
            TransformOp::Rotate(deg) => {
                buf.push_str("rotate(");
                write_num(deg, buf, precision);
            }
        }

        buf.push(')');
    }
}

impl Display for TransformOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_svg_string(DEFAULT_PRECISION))
    }
}

pub(crate) fn format_num(num: f64, precision: u8) -> String {
    let mut s = String::new();
    write_num(num, &mut s, precision);
    s
}

fn write_num(num: f64, buf: &mut String, precision: u8) {
    // Writing into a `String` cannot fail.

    // `i64` saturates and `Display` never uses an exponent for `f64`.
    if !num.is_finite() || num.abs() >= 1e15 {
        let _ = write!(buf, "{}", num);
        return;
    }

    if num.fract().approx_eq_ulps(&0.0, 4) {
        let _ = write!(buf, "{}", num.trunc() as i64);
        return;
    }

    // Prevents numbers like 0.30000000000000004.
    let pow = POW_VEC[precision.min(MAX_PRECISION) as usize];
    let v = (num * pow).round() / pow;
    if v == 0.0 {
        // A non-zero value must not collapse into `0`.
        let _ = write!(buf, "{}", num);
    } else if v.fract().approx_eq_ulps(&0.0, 4) {
        let _ = write!(buf, "{}", v.trunc() as i64);
    } else {
        let _ = write!(buf, "{}", v);
    }
}

/// An ordered list of transform operations.
///
/// The first operation is always the dimension-compensating scale.
#[derive(Clone, PartialEq, Debug)]
pub struct ComposedTransform {
    ops: Vec<TransformOp>,
}

impl ComposedTransform {
    /// Returns operations in emission order.
    #[inline]
    pub fn ops(&self) -> &[TransformOp] {
        &self.ops
    }

    /// Returns the dimension-compensating scale factor.
    pub fn scale_factor(&self) -> f64 {
        match self.ops.first() {
            Some(TransformOp::Scale(f)) => *f,
            _ => 1.0,
        }
    }

    /// Formats the transform as an SVG `transform` attribute value.
    pub fn to_svg_string(&self, precision: u8) -> String {
        let mut s = String::new();
        for (i, op) in self.ops.iter().enumerate() {
            if i != 0 {
                s.push(' ');
            }

            op.write_to(&mut s, precision);
        }

        s
    }
}

impl Display for ComposedTransform {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_svg_string(DEFAULT_PRECISION))
    }
}

/// A user-requested transform.
///
/// Translation values are in millimeters.
#[derive(Clone, PartialEq, Debug)]
pub struct TransformSpec {
    /// Transform type: `translate`, `scale` or `rotate`.
    pub kind: String,
    /// Transform values.
    pub values: Vec<f64>,
}

impl TransformSpec {
    /// Creates a translation, in millimeters.
    pub fn translate(x_mm: f64, y_mm: f64) -> Self {
        TransformSpec {
            kind: "translate".to_string(),
            values: vec![x_mm, y_mm],
        }
    }

    /// Creates a scale.
    pub fn scale(factor: f64) -> Self {
        TransformSpec {
            kind: "scale".to_string(),
            values: vec![factor],
        }
    }

    /// Creates a rotation, in degrees.
    pub fn rotate(deg: f64) -> Self {
        TransformSpec {
            kind: "rotate".to_string(),
            values: vec![deg],
        }
    }
}

impl std::str::FromStr for TransformSpec {
    type Err = String;

    /// Parses a `TYPE=V[,V]` string, like `translate=10,5` or `rotate=45`.
    fn from_str(text: &str) -> Result<Self, String> {
        let mut iter = text.splitn(2, '=');
        let kind = iter.next().unwrap_or_default().trim();
        let values = iter
            .next()
            .ok_or_else(|| format!("'{}' must be in the TYPE=VALUE form", text))?;

        if kind.is_empty() {
            return Err(format!("'{}' doesn't have a transform type", text));
        }

        let values = values
            .split(',')
            .map(|v| {
                v.trim()
                    .parse::<f64>()
                    .map_err(|_| format!("'{}' is not a number", v.trim()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(TransformSpec {
            kind: kind.to_string(),
            values,
        })
    }
}

/// Defines what to do with an unknown transform type.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum UnknownTransformPolicy {
    /// Return [`Error::UnsupportedTransform`].
    Fail,
    /// Skip the transform with a warning.
    Skip,
}

impl Default for UnknownTransformPolicy {
    fn default() -> Self {
        UnknownTransformPolicy::Fail
    }
}

/// Composes a transform that pastes content from a source document into a
/// destination one without changing its physical size.
///
/// `source_ratio` and `destination_ratio` are units per millimeter.
/// The compensating `scale(source_ratio / destination_ratio)` is always emitted first,
/// then user transforms follow in their original order.
/// Translations are converted from millimeters into destination units.
pub fn compose(
    source_ratio: f64,
    destination_ratio: f64,
    user_ops: &[TransformSpec],
    policy: UnknownTransformPolicy,
) -> Result<ComposedTransform, Error> {
    let scale = source_ratio / destination_ratio;
    log::info!("Dimension scale factor is {}.", scale);

    let mut ops = Vec::with_capacity(user_ops.len() + 1);
    ops.push(TransformOp::Scale(scale));

    for spec in user_ops {
        let op = match spec.kind.as_str() {
            "translate" => match *spec.values.as_slice() {
                [x] => TransformOp::Translate(x * destination_ratio, 0.0),
                [x, y] => TransformOp::Translate(x * destination_ratio, y * destination_ratio),
                _ => return Err(invalid_value(spec)),
            },
            "scale" => match *spec.values.as_slice() {
                [f] => TransformOp::Scale(f),
                _ => return Err(invalid_value(spec)),
            },
            "rotate" => match *spec.values.as_slice() {
                [deg] => TransformOp::Rotate(deg),
                _ => return Err(invalid_value(spec)),
            },
            _ => match policy {
                UnknownTransformPolicy::Fail => {
                    return Err(Error::UnsupportedTransform(spec.kind.clone()));
                }
                UnknownTransformPolicy::Skip => {
                    log::warn!("Unsupported transform '{}' skipped.", spec.kind);
                    continue;
                }
            },
        };

        ops.push(op);
    }

    Ok(ComposedTransform { ops })
}

fn invalid_value(spec: &TransformSpec) -> Error {
    Error::InvalidTransformValue {
        kind: spec.kind.clone(),
        count: spec.values.len(),
    }
}
