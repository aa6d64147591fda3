//! Blocks: naive rectangular baseline
//!
//! Classical box nesting. The line walk is shared with L1P, but leading
//! never peels shared ancestors: every wrap's padding separates every
//! pair of lines beneath it, so successive baselines spread apart the
//! way conventional box layout does. Each wrap renders as one padded
//! bounding rectangle around everything it contains.

use super::lines::{build_lines, collect_fragments, stack_lines, Stack};
use super::pebble::grow;
use super::{LayoutResult, Scene, SceneItem, WrapOutline};
use crate::control::LayoutDeadline;
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::poly::Polygon;
use crate::reassoc::ReassocTree;
use rustc_hash::FxHashMap;

pub(crate) fn run(tree: &ReassocTree, deadline: &LayoutDeadline) -> Result<LayoutResult> {
  let mut build = build_lines(tree, true);
  stack_lines(&mut build.lines, 0.0, false, deadline)?;

  let fragments = collect_fragments(&build.lines);

  // Each wrap's rectangle is the union of its fragments inflated by the
  // cumulative padding at that wrap's layer.
  let mut wrap_rects: FxHashMap<u32, Rect> = FxHashMap::default();
  for line in &build.lines {
    for stack in &line.stacks {
      let Stack::Frag { rect, cells, .. } = stack else {
        continue;
      };
      for cell in cells {
        let padded = rect.inflate(cell.padding);
        wrap_rects
          .entry(cell.uid)
          .and_modify(|r| *r = r.union(padded))
          .or_insert(padded);
      }
    }
  }

  let mut scene = Scene::default();
  let mut outlines = Vec::new();
  let mut bounding: Option<Rect> = None;

  // Parents paint first: wrap_order is pre-order.
  for &uid in &build.wrap_order {
    let Some(&rect) = wrap_rects.get(&uid) else {
      continue;
    };
    grow(&mut bounding, rect);
    outlines.push(WrapOutline {
      uid,
      polygon: Polygon::of_rect(rect),
    });
    if let Some(style) = build.styles.get(&uid) {
      scene.items.push(SceneItem::Outline {
        polygon: Polygon::of_rect(rect),
        style: style.clone(),
      });
    }
  }

  for line in &build.lines {
    for stack in &line.stacks {
      if let Stack::Frag { text, rect, .. } = stack {
        grow(&mut bounding, *rect);
        if !text.is_empty() {
          scene.items.push(SceneItem::TextRun {
            text: text.clone(),
            origin: Point::new(rect.min_x(), line.origin.y),
          });
        }
      }
    }
  }

  Ok(LayoutResult::assemble(fragments, outlines, scene, bounding))
}
