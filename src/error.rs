// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;

/// A reason why a document size cannot be used.
#[derive(Clone, PartialEq, Debug)]
pub enum MalformedDocument {
    /// The root element doesn't have a `width` attribute.
    MissingWidth,

    /// The root element doesn't have a `viewBox` attribute.
    MissingViewBox,

    /// `width` is not a length or is negative.
    InvalidWidth(String),

    /// `viewBox` is not a list of four numbers with a positive size.
    InvalidViewBox(String),

    /// `width` uses a unit that cannot be converted into millimeters.
    UnsupportedUnit(String),

    /// `width` is zero.
    ZeroWidth,
}

impl std::fmt::Display for MalformedDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            MalformedDocument::MissingWidth => {
                write!(f, "the root element must have a 'width' attribute")
            }
            MalformedDocument::MissingViewBox => {
                write!(f, "the root element must have a 'viewBox' attribute")
            }
            MalformedDocument::InvalidWidth(ref value) => {
                write!(f, "'{}' is not a valid width", value)
            }
            MalformedDocument::InvalidViewBox(ref value) => {
                write!(f, "'{}' is not a valid viewBox", value)
            }
            MalformedDocument::UnsupportedUnit(ref value) => {
                write!(f, "the width '{}' must be in 'mm'", value)
            }
            MalformedDocument::ZeroWidth => {
                write!(f, "the physical width cannot be zero")
            }
        }
    }
}

/// List of all errors.
#[derive(Debug)]
pub enum Error {
    /// The root element size is missing or cannot be used.
    MalformedDocument(MalformedDocument),

    /// `SingleGroup` selection didn't find an element with the requested ID.
    GroupNotFound(String),

    /// `AllGroups` selection didn't find any top-level group.
    NoGroupsFound,

    /// `AllDrawable` selection didn't find any drawable top-level element.
    NoDrawableContent,

    /// An unknown transform type was requested.
    UnsupportedTransform(String),

    /// A known transform type has a wrong number of values.
    InvalidTransformValue {
        /// Transform type.
        kind: String,
        /// The number of values that were provided.
        count: usize,
    },

    /// Only UTF-8 content are supported.
    NotAnUtf8Str,

    /// Compressed SVG must use the GZip algorithm.
    MalformedGZip,

    /// Failed to parse an SVG data.
    ParsingFailed(svgtree::Error),

    /// Failed to read or write a file.
    Io {
        /// The file path.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },
}

impl From<svgtree::Error> for Error {
    fn from(e: svgtree::Error) -> Self {
        Error::ParsingFailed(e)
    }
}

impl From<MalformedDocument> for Error {
    fn from(e: MalformedDocument) -> Self {
        Error::MalformedDocument(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::MalformedDocument(ref e) => {
                write!(f, "malformed SVG document: {}", e)
            }
            Error::GroupNotFound(ref id) => {
                write!(f, "an element with id '{}' was not found", id)
            }
            Error::NoGroupsFound => {
                write!(f, "no top-level groups were found")
            }
            Error::NoDrawableContent => {
                write!(f, "no drawable elements were found")
            }
            Error::UnsupportedTransform(ref kind) => {
                write!(f, "'{}' is not a supported transform", kind)
            }
            Error::InvalidTransformValue { ref kind, count } => {
                write!(f, "'{}' transform cannot have {} value(s)", kind, count)
            }
            Error::NotAnUtf8Str => {
                write!(f, "provided data has not an UTF-8 encoding")
            }
            Error::MalformedGZip => {
                write!(f, "provided data has a malformed GZip content")
            }
            Error::ParsingFailed(ref e) => {
                write!(f, "SVG data parsing failed cause {}", e)
            }
            Error::Io { ref path, ref source } => {
                write!(f, "'{}': {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::ParsingFailed(ref e) => Some(e),
            Error::Io { ref source, .. } => Some(source),
            _ => None,
        }
    }
}
