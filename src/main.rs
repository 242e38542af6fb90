// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::PathBuf;
use std::process;

use pico_args::Arguments;

const HELP: &str = "\
svgpaste pastes one SVG into another while keeping its physical size.

USAGE:
  svgpaste [OPTIONS] <container-svg> <source-svg> <out-svg>

  svgpaste --group logo --x 10 --y 5 sheet.svg logo.svg out.svg
  svgpaste --all-groups --transform rotate=90 sheet.svg parts.svg out.svg

OPTIONS:
  -h, --help                    Prints help information
  -V, --version                 Prints version information

  --group ID                    Pastes children of the element with the specified ID
  --all-groups                  Pastes each top-level group into its own wrapper
                                [default: all top-level drawable elements]
  --x MM                        Sets the horizontal position in millimeters
                                [default: 0]
  --y MM                        Sets the vertical position in millimeters
                                [default: 0]
  --transform T=V               Appends a transform after the size-compensating scale.
                                Can be set multiple times; the order is kept
                                [possible values: translate=X_MM,Y_MM, scale=FACTOR,
                                rotate=DEGREES]
  --skip-unknown                Skips unknown transform types instead of failing
  --convert-units               Accepts cm, in, pt, pc and px widths
                                [default: mm only]
  --grow-canvas                 Enlarges the container when the pasted content
                                doesn't fit
  --wrapper-id ID               Sets the wrapper ID, or the ID prefix with --all-groups
                                [default: source file stem, 'wrapper_for_ID'
                                with --group, 'wrapper_for' with --all-groups]
  --precision N                 Sets the number of digits after the decimal point
                                in generated values
                                [default: 12] [possible values: 0..12]
  --indent INDENT               Sets the XML nodes indent
                                [values: none, 0, 1, 2, 3, 4, tabs] [default: 4]
  --attrs-indent INDENT         Sets the XML attributes indent
                                [values: none, 0, 1, 2, 3, 4, tabs] [default: none]

  --verbose                     Prints progress information
  --quiet                       Disables warnings

ARGS:
  <container-svg>               Container file
  <source-svg>                  File to paste
  <out-svg>                     Output file
";

#[derive(Debug)]
struct Args {
    group: Option<String>,
    all_groups: bool,
    x: f64,
    y: f64,
    transforms: Vec<svgpaste::TransformSpec>,
    skip_unknown: bool,
    convert_units: bool,
    grow_canvas: bool,
    wrapper_id: Option<String>,
    precision: u8,
    indent: svgpaste::svgtree::Indent,
    attrs_indent: svgpaste::svgtree::Indent,

    verbose: bool,
    quiet: bool,

    container: PathBuf,
    source: PathBuf,
    output: PathBuf,
}

fn collect_args() -> Result<Args, pico_args::Error> {
    let mut input = Arguments::from_env();

    if input.contains(["-h", "--help"]) {
        print!("{}", HELP);
        std::process::exit(0);
    }

    if input.contains(["-V", "--version"]) {
        println!("{}", env!("CARGO_PKG_VERSION"));
        std::process::exit(0);
    }

    Ok(Args {
        group:          input.opt_value_from_str("--group")?,
        all_groups:     input.contains("--all-groups"),
        x:              input.opt_value_from_fn("--x", parse_mm)?.unwrap_or(0.0),
        y:              input.opt_value_from_fn("--y", parse_mm)?.unwrap_or(0.0),
        transforms:     input.values_from_str("--transform")?,
        skip_unknown:   input.contains("--skip-unknown"),
        convert_units:  input.contains("--convert-units"),
        grow_canvas:    input.contains("--grow-canvas"),
        wrapper_id:     input.opt_value_from_str("--wrapper-id")?,
        precision:      input.opt_value_from_fn("--precision", parse_precision)?
                             .unwrap_or(svgpaste::DEFAULT_PRECISION),
        indent:         input.opt_value_from_fn("--indent", parse_indent)?
                             .unwrap_or(svgpaste::svgtree::Indent::Spaces(4)),
        attrs_indent:   input.opt_value_from_fn("--attrs-indent", parse_indent)?
                             .unwrap_or(svgpaste::svgtree::Indent::None),

        verbose:        input.contains("--verbose"),
        quiet:          input.contains("--quiet"),

        container:      input.free_from_str()?,
        source:         input.free_from_str()?,
        output:         input.free_from_str()?,
    })
}

fn parse_mm(s: &str) -> Result<f64, String> {
    let n: f64 = s.parse().map_err(|_| "invalid number")?;

    if n.is_finite() {
        Ok(n)
    } else {
        Err("MM must be a finite number".to_string())
    }
}

fn parse_precision(s: &str) -> Result<u8, String> {
    let n: u8 = s.parse().map_err(|_| "invalid number")?;

    if n <= 12 {
        Ok(n)
    } else {
        Err("precision out of bounds".to_string())
    }
}

fn parse_indent(s: &str) -> Result<svgpaste::svgtree::Indent, String> {
    use svgpaste::svgtree::Indent;

    let indent = match s {
        "none" => Indent::None,
        "0" => Indent::Spaces(0),
        "1" => Indent::Spaces(1),
        "2" => Indent::Spaces(2),
        "3" => Indent::Spaces(3),
        "4" => Indent::Spaces(4),
        "tabs" => Indent::Tabs,
        _ => return Err("invalid INDENT value".to_string()),
    };

    Ok(indent)
}

fn main() {
    let args = match collect_args() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {}.", e);
            process::exit(1);
        }
    };

    if !args.quiet {
        if let Ok(()) = log::set_logger(&LOGGER) {
            let level = if args.verbose {
                log::LevelFilter::Info
            } else {
                log::LevelFilter::Warn
            };
            log::set_max_level(level);
        }
    }

    if let Err(e) = process(args) {
        eprintln!("Error: {}.", e);
        std::process::exit(1);
    }
}

fn process(args: Args) -> Result<(), String> {
    let selection = match (args.group, args.all_groups) {
        (Some(_), true) => {
            return Err("--group and --all-groups cannot be set together".to_string());
        }
        (Some(id), false) => svgpaste::Selection::SingleGroup(id),
        (None, true) => svgpaste::Selection::AllGroups,
        (None, false) => svgpaste::Selection::AllDrawable,
    };

    let opt = svgpaste::PasteOptions {
        selection,
        placement: svgpaste::Placement {
            x_mm: args.x,
            y_mm: args.y,
        },
        transforms: args.transforms,
        unknown_transforms: if args.skip_unknown {
            svgpaste::UnknownTransformPolicy::Skip
        } else {
            svgpaste::UnknownTransformPolicy::Fail
        },
        units: if args.convert_units {
            svgpaste::UnitPolicy::Absolute
        } else {
            svgpaste::UnitPolicy::Strict
        },
        grow_canvas: args.grow_canvas,
        wrapper_id: args.wrapper_id,
        name: None,
        precision: args.precision,
        write: svgpaste::svgtree::WriteOptions {
            indent: args.indent,
            attributes_indent: args.attrs_indent,
            ..svgpaste::svgtree::WriteOptions::default()
        },
    };

    let report = svgpaste::merge_with_scaling(&args.container, &args.source, &args.output, &opt)
        .map_err(|e| e.to_string())?;

    log::info!(
        "Done. Wrappers: {}.",
        report.wrapper_ids.join(", ")
    );

    Ok(())
}

/// A simple stderr logger.
static LOGGER: SimpleLogger = SimpleLogger;
struct SimpleLogger;
impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            let target = if !record.target().is_empty() {
                record.target()
            } else {
                record.module_path().unwrap_or_default()
            };

            let line = record.line().unwrap_or(0);

            match record.level() {
                log::Level::Error => eprintln!("Error (in {}:{}): {}", target, line, record.args()),
                log::Level::Warn  => eprintln!("Warning (in {}:{}): {}", target, line, record.args()),
                log::Level::Info  => eprintln!("Info (in {}:{}): {}", target, line, record.args()),
                log::Level::Debug => eprintln!("Debug (in {}:{}): {}", target, line, record.args()),
                log::Level::Trace => eprintln!("Trace (in {}:{}): {}", target, line, record.args()),
            }
        }
    }

    fn flush(&self) {}
}
