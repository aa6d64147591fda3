//! Integration tests for outline simplification

use raggedblocks::control::LayoutDeadline;
use raggedblocks::geometry::{Point, Rect};
use raggedblocks::poly::{
    point_in_polygon, simplify_polygon, try_remove_antiknobs, try_remove_clockwise_corners, Path,
    Polygon,
};
use raggedblocks::poly::simplify::SimplifyConstraints;

fn l_shape() -> Path {
    // 20x20 square minus its 10x10 top-right corner.
    Path::new(vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 20.0),
        Point::new(20.0, 20.0),
        Point::new(20.0, 10.0),
        Point::new(10.0, 10.0),
        Point::new(10.0, 0.0),
    ])
}

#[test]
fn test_l_shape_simplifies_to_rectangle() {
    let simplified = simplify_polygon(
        &Polygon::new(vec![l_shape()]),
        None,
        &[],
        &LayoutDeadline::none(),
    )
    .unwrap();
    assert_eq!(simplified.paths.len(), 1);
    let path = &simplified.paths[0];
    assert_eq!(path.points.len(), 4);
    assert!(path.is_ccw());
    assert_eq!(
        path.bounding_box(),
        Some(Rect::from_xywh(0.0, 0.0, 20.0, 20.0))
    );
}

#[test]
fn test_simplification_only_adds_material() {
    // Every point inside the original stays inside the simplified path.
    let original = Polygon::new(vec![l_shape()]);
    let simplified =
        simplify_polygon(&original, None, &[], &LayoutDeadline::none()).unwrap();
    for x in 0..20 {
        for y in 0..20 {
            let p = Point::new(x as f32 + 0.5, y as f32 + 0.5);
            if point_in_polygon(p, &original, false) {
                assert!(
                    point_in_polygon(p, &simplified, false),
                    "{p} was inside but vanished"
                );
            }
        }
    }
}

#[test]
fn test_sibling_keeps_notch() {
    // A sibling outline occupies the corner notch: the fill is vetoed
    // and the L-shape must survive unchanged.
    let sibling = Polygon::new(vec![Path::of_rect(Rect::from_xywh(
        12.0, 2.0, 6.0, 6.0,
    ))]);
    let simplified = simplify_polygon(
        &Polygon::new(vec![l_shape()]),
        None,
        &[&sibling],
        &LayoutDeadline::none(),
    )
    .unwrap();
    assert_eq!(simplified.paths[0].points.len(), 6);
    // And the sibling's interior is still outside.
    assert!(!point_in_polygon(
        Point::new(15.0, 5.0),
        &simplified,
        false
    ));
}

#[test]
fn test_parent_limits_growth() {
    // keep_inside excludes the notch: nothing to do.
    let parent = Polygon::new(vec![l_shape()]);
    let simplified = simplify_polygon(
        &Polygon::new(vec![l_shape()]),
        Some(&parent),
        &[],
        &LayoutDeadline::none(),
    )
    .unwrap();
    assert_eq!(simplified.paths[0].points.len(), 6);
}

#[test]
fn test_east_antiknob_single_call() {
    // Slit entering from the east: one antiknob rewrite yields the full
    // rectangle with CCW winding preserved.
    let path = Path::new(vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 12.0),
        Point::new(16.0, 12.0),
        Point::new(16.0, 8.0),
        Point::new(6.0, 8.0),
        Point::new(6.0, 4.0),
        Point::new(16.0, 4.0),
        Point::new(16.0, 0.0),
    ]);
    let constraints = SimplifyConstraints::default();
    let rewritten = try_remove_antiknobs(&path, &constraints).expect("antiknob found");
    assert_eq!(rewritten.points.len(), 4);
    assert!(rewritten.is_ccw());
    assert_eq!(
        rewritten.bounding_box(),
        Some(Rect::from_xywh(0.0, 0.0, 16.0, 12.0))
    );
    assert!(try_remove_antiknobs(&rewritten, &constraints).is_none());
}

#[test]
fn test_unequal_flanks_retract_near_side() {
    // The slit's north flank is shorter: filling stops at its depth.
    let path = Path::new(vec![
        Point::new(0.0, 0.0),
        Point::new(0.0, 12.0),
        Point::new(16.0, 12.0),
        Point::new(16.0, 8.0),
        Point::new(6.0, 8.0),
        Point::new(6.0, 4.0),
        Point::new(12.0, 4.0),
        Point::new(12.0, 0.0),
    ]);
    let constraints = SimplifyConstraints::default();
    let rewritten = try_remove_antiknobs(&path, &constraints).expect("antiknob found");
    assert!(rewritten.is_ccw());
    // The fill reached x = 12 (the shorter flank), leaving a step.
    assert_eq!(rewritten.points.len(), 6);
    assert!(point_in_polygon(
        Point::new(9.0, 6.0),
        &Polygon::new(vec![rewritten.clone()]),
        false
    ));
    assert!(!point_in_polygon(
        Point::new(14.0, 6.0),
        &Polygon::new(vec![rewritten]),
        false
    ));
}

#[test]
fn test_cw_corner_removal_is_winding_safe() {
    let constraints = SimplifyConstraints::default();
    let rewritten =
        try_remove_clockwise_corners(&l_shape(), &constraints).expect("concave corner");
    assert!(rewritten.is_ccw());
    assert!(rewritten.is_rectilinear());
    assert_eq!(rewritten.points.len(), 4);
}

#[test]
fn test_simplify_respects_abort() {
    let deadline = LayoutDeadline::new(Some(std::time::Duration::ZERO), None);
    let err = simplify_polygon(
        &Polygon::new(vec![l_shape()]),
        None,
        &[],
        &deadline,
    )
    .unwrap_err();
    assert!(err.is_aborted());
}
