//! Render target abstraction
//!
//! The core never rasterizes. Everything a layout produces is replayed
//! onto a [`RenderTarget`], a minimal SVG-like surface: rectangles,
//! straight segments, path data strings and positioned text runs. The
//! crate ships [`crate::render::svg::SvgDocument`] as a reference
//! implementation; drivers bring their own.

use crate::geometry::{Point, Rect};
use crate::style::{Color, Font, Stroke};

/// Fill and stroke for a shape.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeStyle {
  pub fill: Option<Color>,
  pub stroke: Option<Stroke>,
}

impl ShapeStyle {
  pub fn filled(color: Color) -> Self {
    Self {
      fill: Some(color),
      stroke: None,
    }
  }

  pub fn stroked(stroke: Stroke) -> Self {
    Self {
      fill: None,
      stroke: Some(stroke),
    }
  }
}

/// Drawing surface consumed by renderables.
///
/// Path data strings use SVG conventions (`M`, `L`, `A`, `Z`); holes rely
/// on the even-odd fill rule.
pub trait RenderTarget {
  /// Axis-aligned rectangle.
  fn rect(&mut self, rect: Rect, style: &ShapeStyle);

  /// Straight stroked segment.
  fn line(&mut self, from: Point, to: Point, stroke: &Stroke);

  /// SVG path data.
  fn path(&mut self, d: &str, style: &ShapeStyle);

  /// A text run; `origin` is the left end of the baseline.
  fn text(&mut self, text: &str, origin: Point, font: &Font, color: Color);
}
