//! L1P: pebble layout
//!
//! The baseline algorithm. Every fragment carries its own stack of
//! padded rectangles (its "pebble"): the text rectangle inflated by the
//! cumulative padding of each enclosing wrap. Lines stack with the
//! cell-peeling leading rule, and the scene paints each pebble outermost
//! first, so nested wraps show as nested rectangle stripes around every
//! fragment.

use super::lines::{build_lines, collect_fragments, stack_lines, Stack};
use super::{LayoutResult, PebbleSettings, Scene, SceneItem};
use crate::control::LayoutDeadline;
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::poly::Polygon;
use crate::reassoc::ReassocTree;

pub(crate) fn run(
  tree: &ReassocTree,
  settings: &PebbleSettings,
  deadline: &LayoutDeadline,
) -> Result<LayoutResult> {
  let mut build = build_lines(tree, settings.translate_wraps);
  stack_lines(&mut build.lines, settings.ideal_leading, true, deadline)?;

  let fragments = collect_fragments(&build.lines);
  let mut scene = Scene::default();
  let mut bounding: Option<Rect> = None;

  // Backgrounds first: per fragment, outermost cell to innermost.
  for line in &build.lines {
    for stack in &line.stacks {
      let Stack::Frag { rect, cells, .. } = stack else {
        continue;
      };
      grow(&mut bounding, rect.inflate(stack.full_padding()));
      for cell in cells.iter().rev() {
        let Some(style) = build.styles.get(&cell.uid) else {
          continue;
        };
        let padded = rect.inflate(cell.padding);
        if style.borders.is_empty() {
          if let Some(fill) = style.fill {
            scene.items.push(SceneItem::Fill {
              rect: padded,
              color: fill,
            });
          }
        } else {
          scene.items.push(SceneItem::Outline {
            polygon: Polygon::of_rect(padded),
            style: style.clone(),
          });
        }
      }
    }
  }

  // Text on top of every background stripe.
  for line in &build.lines {
    for stack in &line.stacks {
      if let Stack::Frag { text, rect, .. } = stack {
        if !text.is_empty() {
          scene.items.push(SceneItem::TextRun {
            text: text.clone(),
            origin: Point::new(rect.min_x(), line.origin.y),
          });
        }
      }
    }
  }

  Ok(LayoutResult::assemble(fragments, Vec::new(), scene, bounding))
}

pub(crate) fn grow(acc: &mut Option<Rect>, rect: Rect) {
  *acc = Some(match acc {
    Some(prev) => prev.union(rect),
    None => rect,
  });
}
