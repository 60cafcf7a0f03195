use floorsketch_core::shapes::Shape;
use floorsketch_core::{
    Compositor, DrawingKind, InputError, LayoutConfig, Point, RawRow, plan_from_rows,
};
use pretty_assertions::assert_eq;

fn rows(table: &[&[&str]]) -> Vec<RawRow> {
    table.iter().map(|r| RawRow::from_cells(r)).collect()
}

fn house() -> Vec<RawRow> {
    rows(&[
        &["ScaleDivisor", "", "Settings", "", "", "50"],
        &["CompassRotation", "", "Settings", "", "", "15"],
        &["Project", "", "MetaInformation", "", "", "Garden house"],
        &["W1", "L1", "Outline", "", "", "(0,0)", "(0,100)", "(100,100)", "(100,0)"],
        &["D1", "L1", "XDim", "5", "(W1-1)", "(W1-1)", "(W1-4)"],
        &["", "L1", "", "", "", "ignored"],
        &[
            "R1",
            "L1",
            "Room",
            "",
            "(W1-1)+(10,10)",
            "(W1-1)+(10,10)",
            "(W1-1)+(10,90)",
            "(W1-2)+(90,-10)",
            "(W1-4)+(-10,10)",
        ],
        &["S1", "L1", "Steps", "", "(R1-1)", "(10,10)", "(10,30)", "(40,30)", "(40,10)"],
        &["A1", "L1", "OpeningArc", "", "(R1-4)", "(R1-4)", "(R1-4)+(-20,0)", "(R1-4)+(0,20)"],
        &["T1", "L1", "Label", "", "(R1-1)+(40,40)", "Workshop", "64 m²"],
        &["W1", "L2", "Outline", "", "", "(0,0)", "(0,50)", "(50,50)", "(50,0)"],
    ])
}

#[test]
fn two_row_dimension_example() {
    let plan = plan_from_rows(rows(&[
        &["W1", "L1", "Outline", "", "", "(0,0)", "(0,100)", "(100,100)", "(100,0)"],
        &["D1", "L1", "XDim", "5", "(W1-1)", "(W1-1)", "(W1-4)"],
    ]))
    .unwrap();
    let d1 = &plan.parts()[1];
    assert_eq!(d1.kind, DrawingKind::XDim);
    assert_eq!(d1.points(), &[Point::new(0.0, 0.0), Point::new(100.0, 0.0)]);
    match Shape::from_part(d1, 50.0) {
        Some(Shape::Dimension(d)) => assert_eq!(d.text, "100"),
        other => panic!("unexpected shape {other:?}"),
    }
}

#[test]
fn reference_resolution_is_consistent() {
    let plan = plan_from_rows(house()).unwrap();
    let r1 = plan.resolver().find_part("R1", "L1").unwrap();
    let expected = r1.points()[0] + r1.reference.unwrap();
    assert_eq!(plan.resolver().resolve("(R1-1)", "L1", None).unwrap(), expected);
    assert_eq!(expected, Point::new(10.0, 10.0));
    // Payload points are stored relative to the row reference.
    assert_eq!(r1.points()[0], Point::new(0.0, 0.0));
    assert_eq!(r1.points()[2], Point::new(80.0, 80.0));
    let arc = plan.resolver().find_part("A1", "L1").unwrap();
    assert_eq!(arc.reference, Some(Point::new(90.0, 10.0)));
    assert_eq!(arc.absolute_points()[2], Point::new(90.0, 30.0));
}

#[test]
fn pages_follow_sorted_layers() {
    let plan = plan_from_rows(house()).unwrap();
    let compositor = Compositor::new(&plan, LayoutConfig::default()).unwrap();
    let pages = compositor.compose_all();
    assert_eq!(
        pages.iter().map(|p| p.layer.as_str()).collect::<Vec<_>>(),
        vec!["L1", "L2"]
    );
    let l1 = &pages[0].svg;
    for needle in [
        "class=\"outline\"",
        "class=\"room\"",
        "class=\"steps\"",
        "class=\"opening-arc\"",
        "class=\"dim-text\"",
        "class=\"dim-line\"",
        "Workshop (64 m²)",
        "Garden house",
        "rotate(15 0 0)",
    ] {
        assert!(l1.contains(needle), "missing {needle}");
    }
    let outline = l1.find("class=\"outline\"").unwrap();
    let room = l1.find("class=\"room\"").unwrap();
    let label = l1.find("Workshop").unwrap();
    let dim = l1.find("class=\"dim-text\"").unwrap();
    assert!(outline < room && room < label && label < dim);
    assert!(!pages[1].svg.contains("class=\"room\""));
}

#[test]
fn error_scenarios() {
    let err = plan_from_rows(rows(&[&["X", "L", "Bogus", "", "", "(0,0)"]])).unwrap_err();
    assert_eq!(err.root(), &InputError::UnknownKind("Bogus".into()));
    assert!(err.to_string().contains("Bogus"));

    let mut numbered = rows(&[
        &["", "L", "", "", "", "no type"],
        &["X", "L", "Room", "", "", "(Nope-1)"],
    ]);
    numbered[0].line = Some(6);
    numbered[1].line = Some(7);
    let err = plan_from_rows(numbered).unwrap_err();
    assert!(err.to_string().starts_with("line 7: row \"X\" in layer \"L\""), "{err}");

    let err = plan_from_rows(rows(&[&["X", "L", "Room", "", "", "(Nope-1)"]])).unwrap_err();
    assert!(matches!(err.root(), InputError::PartNotFound { identifier, .. } if identifier == "Nope"));

    let err = plan_from_rows(rows(&[&["X", "L", "Room", "abc", "", "(0,0)"]])).unwrap_err();
    assert_eq!(err.root(), &InputError::InvalidDimOffset("abc".into()));

    let plan = plan_from_rows(rows(&[
        &["ScaleDivisor", "", "Settings", "", "", "50"],
        &["PageSize", "", "Settings", "", "", "A5"],
        &["X", "L", "Room", "", "", "(0,0)"],
    ]))
    .unwrap();
    assert_eq!(
        Compositor::new(&plan, LayoutConfig::default()).err(),
        Some(InputError::UnsupportedPageSize("A5".into()))
    );
}
