// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`svgpaste` pastes the content of one SVG document into another one
while keeping its real-world size.

Both documents must have a `width` in millimeters and a `viewBox`.
Their ratio defines how many user units fit into one millimeter.
The pasted content is placed into a `g` wrapper with a transform that compensates
the difference between the two ratios, followed by an optional chain of
user-defined translations (in millimeters), scales and rotations.

## Example

```no_run
let opt = svgpaste::PasteOptions {
    selection: svgpaste::Selection::SingleGroup("logo".to_string()),
    placement: svgpaste::Placement { x_mm: 10.0, y_mm: 5.0 },
    ..svgpaste::PasteOptions::default()
};

svgpaste::merge_with_scaling("sheet.svg", "logo.svg", "out/sheet.svg", &opt).unwrap();
```

## Limitations

- Transforms already present on the pasted elements are kept as is.
- `defs` and `style` elements are not copied, so pasted content that references
  them may lose its styling.
- Only the root element size is taken into account. The content bounding box is not computed.
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

use std::io::Write;
use std::path::Path;

mod error;
mod merge;
mod metadata;
mod paste;
mod transform;

pub use crate::error::{Error, MalformedDocument};
pub use crate::merge::{merge, MergeReport, NodeClass, Selection};
pub use crate::metadata::{SizeMetadata, UnitPolicy, ViewBox};
pub use crate::paste::{paste, PasteOptions, Placement};
pub use crate::transform::{
    compose, ComposedTransform, TransformOp, TransformSpec, UnknownTransformPolicy,
    DEFAULT_PRECISION,
};

pub use svgtree;

/// Pastes `source_path` content into `container_path` and writes the result to `output_path`.
///
/// SVGZ input is supported. The output directory is created when needed.
/// The output file is written only on success.
///
/// When `opt.name` is not set, the source file stem is used.
pub fn merge_with_scaling<P1, P2, P3>(
    container_path: P1,
    source_path: P2,
    output_path: P3,
    opt: &PasteOptions,
) -> Result<MergeReport, Error>
where
    P1: AsRef<Path>,
    P2: AsRef<Path>,
    P3: AsRef<Path>,
{
    let source_path = source_path.as_ref();
    let output_path = output_path.as_ref();

    let mut container = load_file(container_path.as_ref())?;
    let source = load_file(source_path)?;

    let mut opt = opt.clone();
    if opt.name.is_none() {
        opt.name = source_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned());
    }

    let report = paste(&mut container, &source, &opt)?;

    let data = container.to_string(&opt.write);
    save_file(output_path, data.as_bytes())?;

    log::info!(
        "{} element(s) from '{}' were pasted into '{}'.",
        report.copied,
        source_path.display(),
        output_path.display()
    );

    Ok(report)
}

/// Parses a [`Document`](svgtree::Document) from an SVG or SVGZ data.
pub fn parse_data(data: &[u8]) -> Result<svgtree::Document, Error> {
    if data.starts_with(&[0x1f, 0x8b]) {
        let data = decompress_svgz(data)?;
        let text = std::str::from_utf8(&data).map_err(|_| Error::NotAnUtf8Str)?;
        parse_str(text)
    } else {
        let text = std::str::from_utf8(data).map_err(|_| Error::NotAnUtf8Str)?;
        parse_str(text)
    }
}

fn parse_str(text: &str) -> Result<svgtree::Document, Error> {
    let doc = svgtree::Document::parse_str(text)?;
    Ok(doc)
}

/// Decompresses an SVGZ file.
pub fn decompress_svgz(data: &[u8]) -> Result<Vec<u8>, Error> {
    use std::io::Read;

    let mut decoder = flate2::read::GzDecoder::new(data);
    let mut decoded = Vec::with_capacity(data.len() * 2);
    decoder
        .read_to_end(&mut decoded)
        .map_err(|_| Error::MalformedGZip)?;
    Ok(decoded)
}

fn load_file(path: &Path) -> Result<svgtree::Document, Error> {
    let data = std::fs::read(path).map_err(|e| io_error(path, e))?;
    parse_data(&data)
}

fn save_file(path: &Path, data: &[u8]) -> Result<(), Error> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

    // Written next to the output, so the rename never crosses a file system.
    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| io_error(dir, e))?;
    file.write_all(data).map_err(|e| io_error(file.path(), e))?;
    file.persist(path).map_err(|e| io_error(path, e.error))?;

    Ok(())
}

fn io_error(path: &Path, source: std::io::Error) -> Error {
    Error::Io {
        path: path.to_path_buf(),
        source,
    }
}
