//! SVG emission
//!
//! Outline paths are serialized to SVG path data with optional rounded
//! corners: the radius is clamped to half the shorter of the two
//! segments meeting at each corner, and corners are emitted as `A` arcs
//! whose sweep flag follows the turn direction. Borders may disable
//! individual sides; a missing side breaks the outline into separate
//! open `M … L …` fragments with no arcs at the dangling ends.
//!
//! [`SvgDocument`] is the reference [`RenderTarget`]: it accumulates
//! elements and serializes to a standalone `<svg>` string.

use super::target::{RenderTarget, ShapeStyle};
use crate::geometry::{Point, Rect};
use crate::poly::Path;
use crate::style::{Border, Color, Font, Stroke};
use std::fmt::Write as _;

/// Which border flag gates an edge, derived from the edge direction
/// under CCW winding: down = left side, right = bottom, up = right,
/// left = top.
fn edge_enabled(a: Point, b: Point, border: &Border) -> bool {
  if a.x == b.x {
    if b.y > a.y {
      border.left
    } else {
      border.right
    }
  } else if b.x > a.x {
    border.bottom
  } else {
    border.top
  }
}

fn dir(a: Point, b: Point) -> Point {
  let dx = b.x - a.x;
  let dy = b.y - a.y;
  Point::new(
    if dx == 0.0 { 0.0 } else { dx.signum() },
    if dy == 0.0 { 0.0 } else { dy.signum() },
  )
}

fn edge_len(a: Point, b: Point) -> f32 {
  (b.x - a.x).abs() + (b.y - a.y).abs()
}

fn num(v: f32) -> String {
  format!("{v}")
}

/// Path data for a closed rectilinear path with rounded corners.
///
/// `radius` is clamped per corner to half the shorter adjoining segment;
/// zero radius produces plain `M`/`L`/`Z` data.
pub fn closed_path_data(path: &Path, radius: f32) -> String {
  let pts = &path.points;
  let n = pts.len();
  if n < 4 {
    return String::new();
  }
  let corner_radius = |j: usize| -> f32 {
    let prev = pts[(j + n - 1) % n];
    let cur = pts[j];
    let next = pts[(j + 1) % n];
    radius
      .min(edge_len(prev, cur) / 2.0)
      .min(edge_len(cur, next) / 2.0)
      .max(0.0)
  };

  let mut d = String::new();
  let r0 = corner_radius(0);
  let d0 = dir(pts[0], pts[1]);
  let start = Point::new(pts[0].x + d0.x * r0, pts[0].y + d0.y * r0);
  let _ = write!(d, "M {} {}", num(start.x), num(start.y));
  for j in 0..n {
    let corner = (j + 1) % n;
    let dj = dir(pts[j], pts[corner]);
    let r = corner_radius(corner);
    let line_end = Point::new(pts[corner].x - dj.x * r, pts[corner].y - dj.y * r);
    let _ = write!(d, " L {} {}", num(line_end.x), num(line_end.y));
    if r > 0.0 && corner != 0 {
      let dn = dir(pts[corner], pts[(corner + 1) % n]);
      let arc_end = Point::new(pts[corner].x + dn.x * r, pts[corner].y + dn.y * r);
      let sweep = if dj.x * dn.y - dj.y * dn.x > 0.0 { 1 } else { 0 };
      let _ = write!(
        d,
        " A {} {} 0 0 {} {} {}",
        num(r),
        num(r),
        sweep,
        num(arc_end.x),
        num(arc_end.y)
      );
    }
  }
  if r0 > 0.0 {
    let last = pts[n - 1];
    let dj = dir(last, pts[0]);
    let dn = dir(pts[0], pts[1]);
    let sweep = if dj.x * dn.y - dj.y * dn.x > 0.0 { 1 } else { 0 };
    let _ = write!(
      d,
      " A {} {} 0 0 {} {} {}",
      num(r0),
      num(r0),
      sweep,
      num(start.x),
      num(start.y)
    );
  }
  d.push_str(" Z");
  d
}

/// Path data fragments for a bordered outline.
///
/// With all four sides enabled this is one closed, possibly rounded,
/// path. Disabled sides split the outline into open fragments; dangling
/// ends are square.
pub fn border_path_data(path: &Path, border: &Border) -> Vec<String> {
  let pts = &path.points;
  let n = pts.len();
  if n < 4 {
    return Vec::new();
  }
  if border.all_sides() {
    return vec![closed_path_data(path, border.radius)];
  }

  let enabled: Vec<bool> = (0..n)
    .map(|j| edge_enabled(pts[j], pts[(j + 1) % n], border))
    .collect();
  if enabled.iter().all(|&e| !e) {
    return Vec::new();
  }

  // Maximal circular runs of enabled edges.
  let mut runs: Vec<Vec<usize>> = Vec::new();
  let start = (0..n)
    .find(|&j| !enabled[j])
    .expect("at least one side is disabled");
  let mut current: Vec<usize> = Vec::new();
  for step in 1..=n {
    let j = (start + step) % n;
    if enabled[j] {
      current.push(j);
    } else if !current.is_empty() {
      runs.push(std::mem::take(&mut current));
    }
  }
  if !current.is_empty() {
    runs.push(current);
  }

  runs
    .into_iter()
    .map(|run| {
      let mut d = String::new();
      let first = run[0];
      let _ = write!(d, "M {} {}", num(pts[first].x), num(pts[first].y));
      for (pos, &j) in run.iter().enumerate() {
        let corner = (j + 1) % n;
        let dj = dir(pts[j], pts[corner]);
        let is_last = pos == run.len() - 1;
        let r = if is_last {
          0.0
        } else {
          let next_end = pts[(corner + 1) % n];
          border
            .radius
            .min(edge_len(pts[j], pts[corner]) / 2.0)
            .min(edge_len(pts[corner], next_end) / 2.0)
            .max(0.0)
        };
        let line_end = Point::new(pts[corner].x - dj.x * r, pts[corner].y - dj.y * r);
        let _ = write!(d, " L {} {}", num(line_end.x), num(line_end.y));
        if r > 0.0 {
          let dn = dir(pts[corner], pts[(corner + 1) % n]);
          let arc_end = Point::new(pts[corner].x + dn.x * r, pts[corner].y + dn.y * r);
          let sweep = if dj.x * dn.y - dj.y * dn.x > 0.0 { 1 } else { 0 };
          let _ = write!(
            d,
            " A {} {} 0 0 {} {} {}",
            num(r),
            num(r),
            sweep,
            num(arc_end.x),
            num(arc_end.y)
          );
        }
      }
      d
    })
    .collect()
}

fn escape_xml(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      _ => out.push(ch),
    }
  }
  out
}

fn style_attrs(style: &ShapeStyle) -> String {
  let mut attrs = String::new();
  match style.fill {
    Some(color) => {
      let _ = write!(attrs, " fill=\"{}\"", color.to_css_string());
    }
    None => attrs.push_str(" fill=\"none\""),
  }
  if let Some(stroke) = style.stroke {
    let _ = write!(
      attrs,
      " stroke=\"{}\" stroke-width=\"{}\"",
      stroke.color.to_css_string(),
      num(stroke.width)
    );
  }
  attrs
}

/// A render target that accumulates SVG elements.
#[derive(Debug, Default)]
pub struct SvgDocument {
  elements: Vec<String>,
}

impl SvgDocument {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn is_empty(&self) -> bool {
    self.elements.is_empty()
  }

  pub fn element_count(&self) -> usize {
    self.elements.len()
  }

  /// Serializes to a standalone `<svg>` with the given viewport.
  pub fn to_svg_string(&self, viewport: Option<Rect>) -> String {
    let view = viewport.unwrap_or(Rect::from_xywh(0.0, 0.0, 0.0, 0.0));
    let mut out = String::new();
    let _ = write!(
      out,
      "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"{} {} {} {}\">",
      num(view.width()),
      num(view.height()),
      num(view.min_x()),
      num(view.min_y()),
      num(view.width()),
      num(view.height()),
    );
    for element in &self.elements {
      out.push_str(element);
    }
    out.push_str("</svg>");
    out
  }
}

impl RenderTarget for SvgDocument {
  fn rect(&mut self, rect: Rect, style: &ShapeStyle) {
    self.elements.push(format!(
      "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\"{}/>",
      num(rect.min_x()),
      num(rect.min_y()),
      num(rect.width()),
      num(rect.height()),
      style_attrs(style)
    ));
  }

  fn line(&mut self, from: Point, to: Point, stroke: &Stroke) {
    self.elements.push(format!(
      "<line x1=\"{}\" y1=\"{}\" x2=\"{}\" y2=\"{}\" stroke=\"{}\" stroke-width=\"{}\"/>",
      num(from.x),
      num(from.y),
      num(to.x),
      num(to.y),
      stroke.color.to_css_string(),
      num(stroke.width)
    ));
  }

  fn path(&mut self, d: &str, style: &ShapeStyle) {
    self.elements.push(format!(
      "<path d=\"{}\" fill-rule=\"evenodd\"{}/>",
      escape_xml(d),
      style_attrs(style)
    ));
  }

  fn text(&mut self, text: &str, origin: Point, font: &Font, color: Color) {
    self.elements.push(format!(
      "<text x=\"{}\" y=\"{}\" font-family=\"{}\" font-size=\"{}\" fill=\"{}\">{}</text>",
      num(origin.x),
      num(origin.y),
      escape_xml(&font.family),
      num(font.size),
      color.to_css_string(),
      escape_xml(text)
    ));
  }
}
