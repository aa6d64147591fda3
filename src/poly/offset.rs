//! Rectilinear path offsetting
//!
//! Every vertex of a rectilinear path joins one horizontal and one
//! vertical edge, so its bisector is a diagonal unit step: the sum of
//! the two adjacent edges' outward normals. Moving each vertex by
//! `d * (n_in + n_out)` offsets the whole path outward by `d` (inward
//! for negative `d`); concave corners get the opposite diagonal without
//! any special casing. For `|d|` smaller than half the shortest edge,
//! `offset_path(d, offset_path(-d, p)) == p`.

use super::Path;
use crate::geometry::Point;

/// Offsets a CCW rectilinear path by `d` (positive = outward).
pub fn offset_path(d: f32, path: &Path) -> Path {
  let pts = &path.points;
  let n = pts.len();
  if n < 4 {
    return path.clone();
  }
  let mut out = Vec::with_capacity(n);
  for i in 0..n {
    let prev = pts[(i + n - 1) % n];
    let cur = pts[i];
    let next = pts[(i + 1) % n];
    let n_in = outward_normal(direction(prev, cur));
    let n_out = outward_normal(direction(cur, next));
    out.push(Point::new(
      cur.x + d * (n_in.x + n_out.x),
      cur.y + d * (n_in.y + n_out.y),
    ));
  }
  Path::new(out)
}

/// Axis-unit direction of an edge.
fn direction(a: Point, b: Point) -> Point {
  Point::new((b.x - a.x).signum_or_zero(), (b.y - a.y).signum_or_zero())
}

/// Outward normal of a CCW edge under the y-down convention: rotate the
/// direction so a downward left edge points left, a rightward bottom
/// edge points down.
fn outward_normal(dir: Point) -> Point {
  Point::new(-dir.y, dir.x)
}

trait SignumOrZero {
  fn signum_or_zero(self) -> f32;
}

impl SignumOrZero for f32 {
  fn signum_or_zero(self) -> f32 {
    if self == 0.0 {
      0.0
    } else {
      self.signum()
    }
  }
}
