//! Point and rectangle queries against rectilinear paths
//!
//! Point containment casts a horizontal ray toward +infinity and counts
//! vertical-segment crossings. Where the ray grazes a horizontal segment
//! exactly (`y == p.y`, segment strictly to the right), the two adjoining
//! vertical segments decide: far ends on the same side of the ray mean a
//! cusp (subtract 2), opposite sides a half-crossing (subtract 1). Points
//! on an edge short-circuit through an explicit on-edge test so callers
//! pick inclusive or exclusive semantics.

use super::{Path, Polygon};
use crate::geometry::{Point, Rect};

/// Tolerance for the area-based rectangle tests.
pub const AREA_EPSILON: f32 = 1e-4;

/// True when `p` lies on any edge of the path.
pub fn point_on_path(p: Point, path: &Path) -> bool {
  path.edges().any(|(a, b)| {
    if a.y == b.y {
      p.y == a.y && p.x >= a.x.min(b.x) && p.x <= a.x.max(b.x)
    } else {
      p.x == a.x && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y)
    }
  })
}

/// Ray-crossing parity of a single path, ignoring the on-edge case.
fn crossings(p: Point, path: &Path) -> i32 {
  let pts = &path.points;
  let n = pts.len();
  if n < 4 {
    return 0;
  }
  let mut count = 0i32;
  for i in 0..n {
    let a = pts[i];
    let b = pts[(i + 1) % n];
    if a.x == b.x {
      // Vertical: count an inclusive hit; grazing corrections below.
      if a.x > p.x && p.y >= a.y.min(b.y) && p.y <= a.y.max(b.y) {
        count += 1;
      }
    } else if a.y == p.y && a.x.min(b.x) > p.x {
      // The ray runs along this horizontal segment. Both adjoining
      // vertical segments were counted; decide how much to give back.
      let far_in = pts[(i + n - 1) % n].y;
      let far_out = pts[(i + 2) % n].y;
      let same_side = (far_in - p.y).signum() == (far_out - p.y).signum();
      count -= if same_side { 2 } else { 1 };
    }
  }
  count
}

/// Point-in-path test for a rectilinear path.
///
/// `inclusive` decides the result for points exactly on an edge.
pub fn point_in_path(p: Point, path: &Path, inclusive: bool) -> bool {
  if point_on_path(p, path) {
    return inclusive;
  }
  crossings(p, path) % 2 != 0
}

/// Point-in-polygon: crossing parity summed over all paths (even-odd),
/// with on-edge resolving to `inclusive`.
pub fn point_in_polygon(p: Point, polygon: &Polygon, inclusive: bool) -> bool {
  if polygon.paths.iter().any(|path| point_on_path(p, path)) {
    return inclusive;
  }
  let total: i32 = polygon.paths.iter().map(|path| crossings(p, path)).sum();
  total % 2 != 0
}

/// Area of the intersection between `rect` and the interior of `path`.
///
/// Sweeps the path's horizontal segments: each is truncated to the
/// rectangle's x-extent and clamped to its y-extent, contributing
/// `±|interval| * |rect.bottom - y|` with the sign taken from the edge
/// direction (top edges positive under CCW winding).
pub fn rect_path_intersection_area(rect: Rect, path: &Path) -> f32 {
  let mut area = 0.0;
  for (a, b) in path.edges() {
    if a.y != b.y {
      continue;
    }
    let lo = a.x.min(b.x).max(rect.min_x());
    let hi = a.x.max(b.x).min(rect.max_x());
    if hi <= lo {
      continue;
    }
    let dir = if b.x > a.x { 1.0 } else { -1.0 };
    let y = a.y.clamp(rect.min_y(), rect.max_y());
    area += -dir * (hi - lo) * (rect.max_y() - y);
  }
  area
}

/// True when the rectangle overlaps the path's interior by more than
/// [`AREA_EPSILON`].
pub fn path_intersects_rect(path: &Path, rect: Rect) -> bool {
  rect_path_intersection_area(rect, path).abs() > AREA_EPSILON
}

/// True when the rectangle lies inside the polygon under even-odd
/// containment: each path must cover it fully or not at all, and the
/// number of covering paths must be odd.
pub fn polygon_contains_rect(polygon: &Polygon, rect: Rect) -> bool {
  let full = rect.area();
  if full <= AREA_EPSILON {
    // A degenerate rectangle is contained when its center is.
    return point_in_polygon(rect_center(rect), polygon, true);
  }
  let mut covering = 0usize;
  for path in &polygon.paths {
    let a = rect_path_intersection_area(rect, path);
    if a >= full - AREA_EPSILON {
      covering += 1;
    } else if a.abs() > AREA_EPSILON {
      return false;
    }
  }
  covering % 2 == 1
}

/// True when the rectangle overlaps the polygon's interior at all.
pub fn polygon_intersects_rect(polygon: &Polygon, rect: Rect) -> bool {
  let full = rect.area();
  if full <= AREA_EPSILON {
    return point_in_polygon(rect_center(rect), polygon, false);
  }
  let mut covering = 0usize;
  for path in &polygon.paths {
    let a = rect_path_intersection_area(rect, path);
    if a >= full - AREA_EPSILON {
      covering += 1;
    } else if a.abs() > AREA_EPSILON {
      return true;
    }
  }
  covering % 2 == 1
}

fn rect_center(rect: Rect) -> Point {
  Point::new(
    rect.min_x() + rect.width() / 2.0,
    rect.min_y() + rect.height() / 2.0,
  )
}

#[cfg(test)]
mod tests {
  use super::*;

  fn square() -> Path {
    Path::of_rect(Rect::from_xywh(1.0, 1.0, 8.0, 8.0))
  }

  #[test]
  fn test_point_in_square() {
    let path = square();
    assert!(point_in_path(Point::new(5.0, 5.0), &path, false));
    assert!(!point_in_path(Point::new(0.0, 5.0), &path, false));
    assert!(!point_in_path(Point::new(10.0, 5.0), &path, false));
  }

  #[test]
  fn test_point_on_edge_inclusive_exclusive() {
    let path = square();
    let on_edge = Point::new(1.0, 5.0);
    assert!(point_in_path(on_edge, &path, true));
    assert!(!point_in_path(on_edge, &path, false));
  }

  #[test]
  fn test_ray_grazes_top_edge() {
    // A point left of the square at the exact height of its top edge.
    let path = square();
    assert!(!point_in_path(Point::new(0.0, 1.0), &path, false));
    assert!(!point_in_path(Point::new(0.0, 9.0), &path, false));
  }

  #[test]
  fn test_ray_through_step() {
    // Staircase: the ray through the step's horizontal edge is a
    // half-crossing, so the point left of the shape stays outside and a
    // point inside stays inside.
    let path = Path::new(vec![
      Point::new(2.0, 0.0),
      Point::new(2.0, 4.0),
      Point::new(4.0, 4.0),
      Point::new(4.0, 8.0),
      Point::new(8.0, 8.0),
      Point::new(8.0, 0.0),
    ]);
    assert!(!point_in_path(Point::new(0.0, 4.0), &path, false));
    assert!(point_in_path(Point::new(3.0, 2.0), &path, false));
    assert!(point_in_path(Point::new(5.0, 6.0), &path, false));
    assert!(!point_in_path(Point::new(3.0, 6.0), &path, false));
  }

  #[test]
  fn test_polygon_with_hole() {
    let polygon = Polygon::new(vec![
      Path::of_rect(Rect::from_xywh(0.0, 0.0, 50.0, 50.0)),
      Path::of_rect(Rect::from_xywh(10.0, 10.0, 30.0, 30.0)),
    ]);
    assert!(point_in_polygon(Point::new(5.0, 25.0), &polygon, false));
    assert!(!point_in_polygon(Point::new(25.0, 25.0), &polygon, false));
    assert!(point_in_polygon(Point::new(45.0, 25.0), &polygon, false));
  }

  #[test]
  fn test_rect_path_area() {
    // Square 9x9 at origin, rect 3x3 centred at (4.5, 4.5): area 9.
    let path = Path::of_rect(Rect::from_xywh(0.0, 0.0, 9.0, 9.0));
    let rect = Rect::from_xywh(3.0, 3.0, 3.0, 3.0);
    let area = rect_path_intersection_area(rect, &path);
    assert!((area - 9.0).abs() < 1e-4, "area = {area}");
  }

  #[test]
  fn test_rect_path_area_partial() {
    let path = Path::of_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0));
    let rect = Rect::from_xywh(5.0, 5.0, 10.0, 10.0);
    let area = rect_path_intersection_area(rect, &path);
    assert!((area - 25.0).abs() < 1e-4, "area = {area}");
  }

  #[test]
  fn test_contains_and_intersects() {
    let polygon = Polygon::new(vec![
      Path::of_rect(Rect::from_xywh(0.0, 0.0, 50.0, 50.0)),
      Path::of_rect(Rect::from_xywh(10.0, 10.0, 30.0, 30.0)),
    ]);
    // Inside the ring band.
    assert!(polygon_contains_rect(
      &polygon,
      Rect::from_xywh(1.0, 1.0, 8.0, 8.0)
    ));
    // Fully inside the hole.
    let in_hole = Rect::from_xywh(20.0, 20.0, 5.0, 5.0);
    assert!(!polygon_contains_rect(&polygon, in_hole));
    assert!(!polygon_intersects_rect(&polygon, in_hole));
    // Straddling the hole boundary.
    let straddle = Rect::from_xywh(5.0, 20.0, 10.0, 5.0);
    assert!(!polygon_contains_rect(&polygon, straddle));
    assert!(polygon_intersects_rect(&polygon, straddle));
  }
}
