use std::fmt;
use std::str::FromStr;

use pretty_assertions::assert_eq;
use svgpaste::svgtree::{Document, Indent, Node, WriteOptions, INKSCAPE_NS};
use svgpaste::*;

#[derive(Clone, Copy, PartialEq)]
struct MStr<'a>(&'a str);

impl<'a> fmt::Debug for MStr<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

const CONTAINER: &str = "\
<svg xmlns='http://www.w3.org/2000/svg' width='10mm' viewBox='0 0 100 10'>
    <rect id='frame' width='100' height='10'/>
</svg>";

const SOURCE: &str = "\
<svg xmlns='http://www.w3.org/2000/svg'
     xmlns:inkscape='http://www.inkscape.org/namespaces/inkscape'
     width='5mm' viewBox='0 0 25 5'>
    <metadata>rdf</metadata>
    <g id='g1' inkscape:label='Logo' inkscape:groupmode='layer'>
        <path id='p1' d='M 0 0 L 10 10' style='fill:none;stroke:#000'/>
    </g>
</svg>";

fn parse(text: &str) -> Document {
    Document::parse_str(text).unwrap()
}

fn compact() -> WriteOptions {
    WriteOptions {
        xml_declaration: false,
        use_single_quote: true,
        indent: Indent::None,
        ..WriteOptions::default()
    }
}

fn write(doc: &Document) -> String {
    doc.to_string(&compact()).trim_end().to_string()
}

fn transform_of(doc: &Document, id: &str) -> String {
    doc.element_by_id(id)
        .and_then(|n| n.attribute("transform"))
        .unwrap_or_default()
        .to_string()
}

fn assert_same_subtree(a: Node, b: Node) {
    assert_eq!(a.tag_name(), b.tag_name());
    assert_eq!(a.attributes(), b.attributes());
    assert_eq!(a.is_text(), b.is_text());
    if a.is_text() {
        assert_eq!(a.text(), b.text());
    }

    let a_children: Vec<_> = a.children().collect();
    let b_children: Vec<_> = b.children().collect();
    assert_eq!(a_children.len(), b_children.len());
    for (a, b) in a_children.into_iter().zip(b_children) {
        assert_same_subtree(a, b);
    }
}

#[test]
fn single_group_scenario() {
    let mut container = parse(CONTAINER);
    let source = parse(SOURCE);
    let opt = PasteOptions {
        selection: Selection::SingleGroup("g1".to_string()),
        ..PasteOptions::default()
    };

    let report = paste(&mut container, &source, &opt).unwrap();
    assert_eq!(report.wrapper_ids, ["wrapper_for_g1"]);
    assert_eq!(report.copied, 1);
    assert!(!report.canvas_grown);

    let wrapper = container.root_element().last_child().unwrap();
    assert_eq!(wrapper.element_id(), "wrapper_for_g1");
    assert_eq!(wrapper.attribute("transform"), Some("translate(0 0) scale(0.5)"));
    assert_eq!(wrapper.children().count(), 1);

    assert_eq!(
        MStr(&write(&container)),
        MStr("<svg xmlns='http://www.w3.org/2000/svg' width='10mm' viewBox='0 0 100 10'>\
              <rect id='frame' width='100' height='10'/>\
              <g id='wrapper_for_g1' transform='translate(0 0) scale(0.5)'>\
              <path id='p1' d='M 0 0 L 10 10' style='fill:none;stroke:#000'/>\
              </g>\
              </svg>")
    );
}

#[test]
fn chained_transforms_scenario() {
    let user = [
        TransformSpec::translate(10.0, 5.0),
        TransformSpec::scale(2.0),
        TransformSpec::rotate(45.0),
    ];
    let ts = compose(0.8, 2.0, &user, UnknownTransformPolicy::Fail).unwrap();
    assert_eq!(ts.to_string(), "scale(0.4) translate(20 10) scale(2) rotate(45)");
}

#[test]
fn chained_transforms_on_paste() {
    let mut container = parse(CONTAINER);
    let source = parse(SOURCE);
    let opt = PasteOptions {
        placement: Placement { x_mm: 1.0, y_mm: 2.0 },
        transforms: vec![
            TransformSpec::translate(1.0, 0.5),
            TransformSpec::rotate(90.0),
        ],
        name: Some("logo".to_string()),
        ..PasteOptions::default()
    };

    paste(&mut container, &source, &opt).unwrap();
    let ts = transform_of(&container, "logo");
    assert_eq!(ts, "translate(10 20) scale(0.5) translate(10 5) rotate(90)");

    // The emitted string is a valid SVG transform.
    let m = svgtypes::Transform::from_str(&ts).unwrap();
    assert!((m.e - 15.0).abs() < 1e-9);
    assert!((m.f - 22.5).abs() < 1e-9);
}

#[test]
fn scale_factor_is_first() {
    for &(src, dst) in &[(5.0, 10.0), (1.0, 3.0), (3.543307, 1.0), (7.0, 7.0)] {
        let ts = compose(src, dst, &[TransformSpec::rotate(1.0)], UnknownTransformPolicy::Fail)
            .unwrap();
        match ts.ops()[0] {
            TransformOp::Scale(f) => assert!((f - src / dst).abs() < 1e-9),
            op => panic!("unexpected first op: {:?}", op),
        }
    }
}

#[test]
fn translate_in_millimeters() {
    let ts = compose(1.0, 3.0, &[TransformSpec::translate(10.0, 5.0)], UnknownTransformPolicy::Fail)
        .unwrap();
    assert_eq!(ts.ops()[1], TransformOp::Translate(30.0, 15.0));
}

#[test]
fn extraction_is_idempotent() {
    let source = parse(SOURCE);
    let a = SizeMetadata::extract(&source, UnitPolicy::Strict).unwrap();
    let b = SizeMetadata::extract(&source, UnitPolicy::Strict).unwrap();
    assert_eq!(a, b);
    assert!((a.units_per_mm() - 5.0).abs() < 1e-9);
}

#[test]
fn structural_only_source() {
    let mut container = parse(CONTAINER);
    let before = write(&container);
    let source = parse(
        "<svg xmlns='http://www.w3.org/2000/svg' width='5mm' viewBox='0 0 25 5'>
            <defs><circle id='c'/></defs>
            <metadata/>
            <style>.a{}</style>
        </svg>",
    );

    match paste(&mut container, &source, &PasteOptions::default()) {
        Err(Error::NoDrawableContent) => {}
        v => panic!("unexpected result: {:?}", v),
    }
    assert_eq!(MStr(&write(&container)), MStr(&before));
}

#[test]
fn copied_nodes_keep_attributes() {
    let mut container = parse(CONTAINER);
    let source = parse(SOURCE);
    let opt = PasteOptions {
        selection: Selection::AllGroups,
        ..PasteOptions::default()
    };

    let report = paste(&mut container, &source, &opt).unwrap();
    assert_eq!(report.wrapper_ids, ["wrapper_for_g1"]);

    let wrapper = container.element_by_id("wrapper_for_g1").unwrap();
    let copy = wrapper.first_child().unwrap();
    let original = source.element_by_id("g1").unwrap();
    assert_same_subtree(copy, original);
    assert_eq!(copy.attribute_ns(Some(INKSCAPE_NS), "label"), Some("Logo"));
}

#[test]
fn copied_namespaces_are_declared() {
    let mut container = parse(
        "<svg xmlns='http://www.w3.org/2000/svg' width='10mm' viewBox='0 0 100 10'/>",
    );
    let source = parse(SOURCE);
    paste(&mut container, &source, &PasteOptions::default()).unwrap();

    let text = container.to_string(&WriteOptions::default());
    assert!(text.contains("xmlns:inkscape=\"http://www.inkscape.org/namespaces/inkscape\""));
    assert!(text.contains("inkscape:label=\"Logo\""));

    // The output can be parsed back.
    let doc = Document::parse_str(&text).unwrap();
    assert_eq!(
        doc.element_by_id("g1").and_then(|n| n.attribute_ns(Some(INKSCAPE_NS), "groupmode")),
        Some("layer")
    );
}

#[test]
fn source_is_reusable() {
    let source = parse(SOURCE);
    let before = write(&source);

    let mut a = parse(CONTAINER);
    let mut b = parse(CONTAINER);
    paste(&mut a, &source, &PasteOptions::default()).unwrap();
    paste(&mut b, &source, &PasteOptions::default()).unwrap();

    assert_eq!(MStr(&write(&source)), MStr(&before));
    assert_eq!(MStr(&write(&a)), MStr(&write(&b)));
}

#[test]
fn repeated_paste() {
    let mut container = parse(CONTAINER);
    let source = parse(SOURCE);
    let opt = PasteOptions {
        wrapper_id: Some("copy".to_string()),
        ..PasteOptions::default()
    };

    paste(&mut container, &source, &opt).unwrap();
    let report = paste(&mut container, &source, &opt).unwrap();
    assert_eq!(report.wrapper_ids, ["copy_2"]);

    let ids: Vec<_> = container
        .root_element()
        .children()
        .map(|n| n.element_id().to_string())
        .collect();
    assert_eq!(ids, ["frame", "copy", "copy_2"]);
}

#[test]
fn converted_units() {
    let mut container = parse(
        "<svg xmlns='http://www.w3.org/2000/svg' width='1in' viewBox='0 0 254 254'/>",
    );
    let source = parse(
        "<svg xmlns='http://www.w3.org/2000/svg' width='96px' viewBox='0 0 96 96'><rect/></svg>",
    );

    assert!(matches!(
        paste(&mut container, &source, &PasteOptions::default()),
        Err(Error::MalformedDocument(MalformedDocument::UnsupportedUnit(_)))
    ));

    let opt = PasteOptions {
        units: UnitPolicy::Absolute,
        ..PasteOptions::default()
    };
    paste(&mut container, &source, &opt).unwrap();

    // 96px == 1in, so the source covers the whole container.
    let ts = transform_of(&container, "pasted");
    let m = svgtypes::Transform::from_str(&ts).unwrap();
    assert!((m.a - 96.0 / 254.0).abs() < 1e-9);
}
