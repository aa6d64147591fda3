//! Rectilinear polygon kernel
//!
//! Outlines around wraps are rectilinear polygons: lists of implicitly
//! closed paths whose edges are all axis-aligned. Winding follows the
//! y-grows-downward convention used throughout layout, so the raw signed
//! area test is inverted relative to textbook math axes: a path is CCW
//! when `sum((b.x - a.x) * (b.y + a.y)) > 0`. Every path this kernel
//! emits (from rectangle union, offsetting or simplification) is CCW;
//! holes are separate CCW paths and containment is even-odd.

pub mod hittest;
pub mod offset;
pub mod simplify;
pub mod union;

pub use hittest::{point_in_path, point_in_polygon, rect_path_intersection_area};
pub use offset::offset_path;
pub use simplify::{simplify_polygon, try_remove_antiknobs, try_remove_clockwise_corners};
pub use union::from_rectangles;

use crate::error::{GeometryError, Result};
use crate::geometry::{Point, Rect};

/// An implicitly closed rectilinear path.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
  pub points: Vec<Point>,
}

/// A list of paths; holes are additional CCW paths under even-odd.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
  pub paths: Vec<Path>,
}

/// Axis orientation of a rectilinear segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
  Horizontal,
  Vertical,
}

/// An axis-aligned segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RectiSegment {
  pub begin: Point,
  pub end: Point,
}

/// Builds a rectilinear segment, rejecting diagonals.
///
/// A diagonal here is always a caller bug: the kernel never produces
/// one, so the error is fatal rather than recoverable.
pub fn mk_recti_segment(begin: Point, end: Point) -> Result<RectiSegment> {
  if begin.y != end.y && begin.x != end.x {
    return Err(
      GeometryError::NotAxisAligned {
        x1: begin.x,
        y1: begin.y,
        x2: end.x,
        y2: end.y,
      }
      .into(),
    );
  }
  Ok(RectiSegment { begin, end })
}

impl RectiSegment {
  /// Horizontal wins for zero-length segments.
  pub fn orientation(&self) -> Orientation {
    if self.begin.y == self.end.y {
      Orientation::Horizontal
    } else {
      Orientation::Vertical
    }
  }

  pub fn length(&self) -> f32 {
    (self.end.x - self.begin.x).abs() + (self.end.y - self.begin.y).abs()
  }

  /// True when `p` lies on the segment, endpoints included.
  pub fn contains_point(&self, p: Point) -> bool {
    match self.orientation() {
      Orientation::Horizontal => {
        p.y == self.begin.y
          && p.x >= self.begin.x.min(self.end.x)
          && p.x <= self.begin.x.max(self.end.x)
      }
      Orientation::Vertical => {
        p.x == self.begin.x
          && p.y >= self.begin.y.min(self.end.y)
          && p.y <= self.begin.y.max(self.end.y)
      }
    }
  }
}

impl Path {
  pub fn new(points: Vec<Point>) -> Self {
    Self { points }
  }

  /// The CCW path of a rectangle: left-top, left-bottom, right-bottom,
  /// right-top.
  pub fn of_rect(rect: Rect) -> Self {
    Self {
      points: vec![
        Point::new(rect.min_x(), rect.min_y()),
        Point::new(rect.min_x(), rect.max_y()),
        Point::new(rect.max_x(), rect.max_y()),
        Point::new(rect.max_x(), rect.min_y()),
      ],
    }
  }

  pub fn is_empty(&self) -> bool {
    self.points.is_empty()
  }

  /// Consecutive point pairs, wrapping back to the first point.
  pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
    let n = self.points.len();
    (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
  }

  /// Signed winding sum; positive means CCW under the y-down convention.
  pub fn winding_sum(&self) -> f32 {
    self
      .edges()
      .map(|(a, b)| (b.x - a.x) * (b.y + a.y))
      .sum()
  }

  pub fn is_ccw(&self) -> bool {
    self.winding_sum() > 0.0
  }

  /// Reverses winding in place.
  pub fn reverse(&mut self) {
    self.points.reverse();
  }

  pub fn make_ccw(&mut self) {
    if !self.points.is_empty() && !self.is_ccw() {
      self.reverse();
    }
  }

  /// True when every edge is axis-aligned.
  pub fn is_rectilinear(&self) -> bool {
    self.edges().all(|(a, b)| a.x == b.x || a.y == b.y)
  }

  pub fn bounding_box(&self) -> Option<Rect> {
    let first = self.points.first()?;
    let mut min_x = first.x;
    let mut min_y = first.y;
    let mut max_x = first.x;
    let mut max_y = first.y;
    for p in &self.points[1..] {
      min_x = min_x.min(p.x);
      min_y = min_y.min(p.y);
      max_x = max_x.max(p.x);
      max_y = max_y.max(p.y);
    }
    Some(Rect::from_ltrb(min_x, min_y, max_x, max_y))
  }

  pub fn translate(&self, offset: Point) -> Path {
    Path {
      points: self.points.iter().map(|p| p.translate(offset)).collect(),
    }
  }

  /// Canonicalizes the point list: drops repeated points and the middle
  /// of any three collinear consecutive points (this also collapses
  /// zero-width folds left behind by simplification). A path that
  /// degenerates below four points becomes empty.
  pub fn normalize(&mut self) {
    loop {
      let mut changed = false;
      let mut out: Vec<Point> = Vec::with_capacity(self.points.len());
      let n = self.points.len();
      if n == 0 {
        return;
      }
      for i in 0..n {
        let prev = if out.is_empty() {
          self.points[(i + n - 1) % n]
        } else {
          out[out.len() - 1]
        };
        let cur = self.points[i];
        if cur == prev && n > 1 {
          changed = true;
          continue;
        }
        out.push(cur);
      }
      // Wrap-around duplicate
      if out.len() > 1 && out.first() == out.last() {
        out.pop();
        changed = true;
      }
      // Drop middles of collinear runs, including across the seam.
      let mut i = 0;
      while out.len() >= 3 && i < out.len() {
        let n2 = out.len();
        let a = out[(i + n2 - 1) % n2];
        let b = out[i];
        let c = out[(i + 1) % n2];
        let collinear = (a.x == b.x && b.x == c.x) || (a.y == b.y && b.y == c.y);
        if collinear {
          out.remove(i);
          changed = true;
          if i > 0 {
            i -= 1;
          }
        } else {
          i += 1;
        }
      }
      self.points = out;
      if !changed {
        break;
      }
    }
    if self.points.len() < 4 {
      self.points.clear();
    }
  }
}

impl Polygon {
  pub fn new(paths: Vec<Path>) -> Self {
    Self { paths }
  }

  pub fn of_rect(rect: Rect) -> Self {
    Self {
      paths: vec![Path::of_rect(rect)],
    }
  }

  pub fn is_empty(&self) -> bool {
    self.paths.iter().all(Path::is_empty)
  }

  pub fn bounding_box(&self) -> Option<Rect> {
    let mut acc: Option<Rect> = None;
    for path in &self.paths {
      if let Some(bb) = path.bounding_box() {
        acc = Some(match acc {
          Some(prev) => prev.union(bb),
          None => bb,
        });
      }
    }
    acc
  }

  pub fn translate(&self, offset: Point) -> Polygon {
    Polygon {
      paths: self.paths.iter().map(|p| p.translate(offset)).collect(),
    }
  }
}

/// Asserts two paths trace the same cycle, allowing a rotated start.
#[cfg(test)]
pub(crate) fn assert_cyclic_eq(actual: &Path, expected: &Path) {
  assert_eq!(actual.points.len(), expected.points.len(), "point counts");
  let n = expected.points.len();
  let ok =
    (0..n).any(|shift| (0..n).all(|i| actual.points[(i + shift) % n] == expected.points[i]));
  assert!(ok, "paths differ beyond rotation: {actual:?} vs {expected:?}");
}
