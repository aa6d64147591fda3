//! Outline simplification under inclusion/exclusion constraints
//!
//! Two local rewrites run to a fixed point on each path:
//!
//! - **Antiknob removal.** An antiknob is a slit of exterior cutting into
//!   the interior: three consecutive segments `(a, b, c)` with `a` and
//!   `c` antiparallel and both turns concave (west, north, then east is
//!   an east-facing antiknob). The slit is filled up to the
//!   depth of the shorter flank; equal flanks erase all four corner
//!   points at once.
//! - **Clockwise-corner removal.** Under CCW winding a CW turn is an
//!   interior concavity. The inside-out rectangle spanning the corner is
//!   filled by moving the middle vertex across the diagonal and deleting
//!   its neighbours.
//!
//! Either rewrite only applies when the filled rectangle is clear: it
//! must not intersect the path itself, must stay inside the optional
//! `keep_inside` polygon and must not intersect any `keep_outside` path.
//! When several paths are simplified together, each serves as part of the
//! others' keep-outside set, so sibling outlines never start overlapping.

use super::hittest::{path_intersects_rect, polygon_contains_rect};
use super::{Path, Polygon};
use crate::control::LayoutDeadline;
use crate::error::Result;
use crate::geometry::{Point, Rect};

/// Clearance constraints for a fill rewrite.
#[derive(Clone, Copy, Default)]
pub struct SimplifyConstraints<'a> {
  pub keep_inside: Option<&'a Polygon>,
  pub keep_outside: &'a [Path],
}

/// One pass of antiknob removal. Returns the rewritten path after the
/// first applicable fill, or `None` at a local fixed point.
pub fn try_remove_antiknobs(path: &Path, constraints: &SimplifyConstraints) -> Option<Path> {
  let pts = &path.points;
  let n = pts.len();
  if n < 6 {
    return None;
  }
  for i in 0..n {
    let a0 = pts[i];
    let a1 = pts[(i + 1) % n];
    let a2 = pts[(i + 2) % n];
    let a3 = pts[(i + 3) % n];
    let da = axis_dir(a0, a1);
    let db = axis_dir(a1, a2);
    let dc = axis_dir(a2, a3);
    if da.x != -dc.x || da.y != -dc.y {
      continue;
    }
    if cross(da, db) <= 0.0 || cross(db, dc) <= 0.0 {
      continue;
    }

    let len_a = manhattan(a0, a1);
    let len_c = manhattan(a2, a3);
    let depth = len_a.min(len_c);
    let q1 = Point::new(a1.x + dc.x * depth, a1.y + dc.y * depth);
    let q2 = Point::new(a2.x + dc.x * depth, a2.y + dc.y * depth);
    let new_area = rect_spanning(&[a1, a2, q2, q1]);
    if !fill_is_clear(path, new_area, constraints) {
      continue;
    }

    // Retract the flank nearer to the back face `b`; equal flanks drop
    // both corner points and the neighbours merge during normalization.
    let i1 = (i + 1) % n;
    let i2 = (i + 2) % n;
    let mut out = Vec::with_capacity(n);
    for (j, &p) in pts.iter().enumerate() {
      if j == i1 {
        if len_c < len_a {
          out.push(q1);
        }
      } else if j == i2 {
        if len_a < len_c {
          out.push(q2);
        }
      } else {
        out.push(p);
      }
    }
    let mut rewritten = Path::new(out);
    rewritten.normalize();
    rewritten.make_ccw();
    return Some(rewritten);
  }
  None
}

/// One pass of clockwise-corner removal. Returns the rewritten path
/// after the first applicable fill, or `None` at a local fixed point.
pub fn try_remove_clockwise_corners(
  path: &Path,
  constraints: &SimplifyConstraints,
) -> Option<Path> {
  let pts = &path.points;
  let n = pts.len();
  if n < 6 {
    return None;
  }
  for i in 0..n {
    let a = pts[(i + n - 1) % n];
    let b = pts[i];
    let c = pts[(i + 1) % n];
    let d_in = axis_dir(a, b);
    let d_out = axis_dir(b, c);
    if cross(d_in, d_out) <= 0.0 {
      continue;
    }

    // The inside-out rectangle spans the corner between b and its
    // diagonal opposite.
    let b2 = Point::new(a.x + c.x - b.x, a.y + c.y - b.y);
    let new_area = rect_spanning(&[b, b2]);
    if !fill_is_clear(path, new_area, constraints) {
      continue;
    }

    let prev = (i + n - 1) % n;
    let next = (i + 1) % n;
    let mut out = Vec::with_capacity(n);
    for (j, &p) in pts.iter().enumerate() {
      if j == prev || j == next {
        continue;
      }
      if j == i {
        out.push(b2);
      } else {
        out.push(p);
      }
    }
    let mut rewritten = Path::new(out);
    rewritten.normalize();
    rewritten.make_ccw();
    return Some(rewritten);
  }
  None
}

/// Simplifies every path of a polygon to a fixed point.
///
/// Each path's keep-outside set is the polygon's other paths plus every
/// path of the explicit `keep_outside` polygons; `keep_inside` is
/// typically the parent wrap's outline. The deadline is polled between
/// rewrite rounds and aborts with `Error::Aborted`.
pub fn simplify_polygon(
  polygon: &Polygon,
  keep_inside: Option<&Polygon>,
  keep_outside: &[&Polygon],
  deadline: &LayoutDeadline,
) -> Result<Polygon> {
  let mut paths: Vec<Path> = polygon.paths.clone();
  for idx in 0..paths.len() {
    let mut rounds = 0usize;
    loop {
      deadline.check()?;
      let mut outside: Vec<Path> = Vec::new();
      for (j, p) in paths.iter().enumerate() {
        if j != idx && !p.is_empty() {
          outside.push(p.clone());
        }
      }
      for poly in keep_outside {
        outside.extend(poly.paths.iter().filter(|p| !p.is_empty()).cloned());
      }
      let constraints = SimplifyConstraints {
        keep_inside,
        keep_outside: &outside,
      };
      if let Some(p) = try_remove_antiknobs(&paths[idx], &constraints) {
        paths[idx] = p;
        rounds += 1;
        continue;
      }
      if let Some(p) = try_remove_clockwise_corners(&paths[idx], &constraints) {
        paths[idx] = p;
        rounds += 1;
        continue;
      }
      break;
    }
    if rounds > 0 {
      log::trace!("simplified path {idx} in {rounds} rewrites");
    }
  }
  Ok(Polygon::new(paths))
}

fn fill_is_clear(path: &Path, new_area: Rect, constraints: &SimplifyConstraints) -> bool {
  if new_area.width() <= 0.0 || new_area.height() <= 0.0 {
    return false;
  }
  if path_intersects_rect(path, new_area) {
    return false;
  }
  if let Some(keep_inside) = constraints.keep_inside {
    if !polygon_contains_rect(keep_inside, new_area) {
      return false;
    }
  }
  constraints
    .keep_outside
    .iter()
    .all(|p| !path_intersects_rect(p, new_area))
}

fn axis_dir(a: Point, b: Point) -> Point {
  let dx = b.x - a.x;
  let dy = b.y - a.y;
  Point::new(
    if dx == 0.0 { 0.0 } else { dx.signum() },
    if dy == 0.0 { 0.0 } else { dy.signum() },
  )
}

fn cross(u: Point, v: Point) -> f32 {
  u.x * v.y - u.y * v.x
}

fn manhattan(a: Point, b: Point) -> f32 {
  (b.x - a.x).abs() + (b.y - a.y).abs()
}

fn rect_spanning(points: &[Point]) -> Rect {
  let mut min_x = f32::INFINITY;
  let mut min_y = f32::INFINITY;
  let mut max_x = f32::NEG_INFINITY;
  let mut max_y = f32::NEG_INFINITY;
  for p in points {
    min_x = min_x.min(p.x);
    min_y = min_y.min(p.y);
    max_x = max_x.max(p.x);
    max_y = max_y.max(p.y);
  }
  Rect::from_ltrb(min_x, min_y, max_x, max_y)
}
