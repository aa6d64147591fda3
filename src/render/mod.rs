//! Renderable values and composition

pub mod svg;
pub mod target;

pub use svg::SvgDocument;
pub use target::{RenderTarget, ShapeStyle};

use crate::geometry::Rect;

/// Anything that can draw itself onto a render target and report its
/// extent.
pub trait Renderable {
  fn render(&self, target: &mut dyn RenderTarget);

  /// `None` for empty content.
  fn bounding_box(&self) -> Option<Rect>;
}

/// Composition of two renderables, drawn first-to-last.
pub struct Stacked {
  pub first: Box<dyn Renderable>,
  pub second: Box<dyn Renderable>,
}

/// Stacks two renderables top-to-bottom in draw order: `first` renders
/// before (beneath) `second`.
pub fn stack(first: Box<dyn Renderable>, second: Box<dyn Renderable>) -> Stacked {
  Stacked { first, second }
}

impl Renderable for Stacked {
  fn render(&self, target: &mut dyn RenderTarget) {
    self.first.render(target);
    self.second.render(target);
  }

  fn bounding_box(&self) -> Option<Rect> {
    match (self.first.bounding_box(), self.second.bounding_box()) {
      (Some(a), Some(b)) => Some(a.union(b)),
      (Some(a), None) => Some(a),
      (None, b) => b,
    }
  }
}
