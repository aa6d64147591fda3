//! Shared line model for the cell-stack layouts
//!
//! L1P and Blocks both walk the reassociated tree into a vector of
//! lines. A line holds an origin, an advance vector (origin + advance is
//! the lead-out point the next horizontal join attaches to) and a region
//! of stacks. A stack is a spacer or a fragment rectangle together with
//! the cells pushed by every enclosing wrap, innermost first; each
//! cell's padding is cumulative from the fragment outward.
//!
//! Vertical stacking runs afterwards: each line is pushed down until its
//! padded fragments clear everything already placed. The `peel` flag
//! selects the leading rule: L1P peels shared wraps off both cell stacks
//! before inflating, Blocks lets every ancestor's padding separate.

use crate::control::LayoutDeadline;
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::layout::FragmentInfo;
use crate::reassoc::ReassocTree;
use crate::style::WrapStyle;
use rustc_hash::FxHashMap;

/// One wrap layer over a fragment; `padding` is cumulative from the
/// fragment up to and including this wrap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PebbleCell {
  pub uid: u32,
  pub padding: f32,
}

#[derive(Debug, Clone)]
pub(crate) enum Stack {
  Spacer { width: f32 },
  Frag {
    text: String,
    rect: Rect,
    cells: Vec<PebbleCell>,
  },
}

impl Stack {
  pub(crate) fn full_padding(&self) -> f32 {
    match self {
      Stack::Spacer { .. } => 0.0,
      Stack::Frag { cells, .. } => cells.last().map_or(0.0, |c| c.padding),
    }
  }
}

#[derive(Debug, Clone)]
pub(crate) struct Line {
  pub origin: Point,
  pub advance: Point,
  pub stacks: Vec<Stack>,
}

impl Line {
  fn lead_out(&self) -> Point {
    self.origin.translate(self.advance)
  }

  fn translate(&mut self, offset: Point) {
    self.origin = self.origin.translate(offset);
    for stack in &mut self.stacks {
      if let Stack::Frag { rect, .. } = stack {
        *rect = rect.translate(offset);
      }
    }
  }
}

/// Result of the line-building walk.
pub(crate) struct LineBuild {
  pub lines: Vec<Line>,
  pub styles: FxHashMap<u32, WrapStyle>,
  /// Wrap uids in pre-order: parents precede their children.
  pub wrap_order: Vec<u32>,
}

pub(crate) fn build_lines(tree: &ReassocTree, translate_wraps: bool) -> LineBuild {
  let mut builder = Builder {
    translate_wraps,
    next_uid: 1,
    styles: FxHashMap::default(),
    wrap_order: Vec::new(),
  };
  let lines = builder.walk(tree);
  LineBuild {
    lines,
    styles: builder.styles,
    wrap_order: builder.wrap_order,
  }
}

struct Builder {
  translate_wraps: bool,
  next_uid: u32,
  styles: FxHashMap<u32, WrapStyle>,
  wrap_order: Vec<u32>,
}

impl Builder {
  fn walk(&mut self, tree: &ReassocTree) -> Vec<Line> {
    match tree {
      ReassocTree::Atom { text, rect } => vec![Line {
        origin: Point::ZERO,
        advance: Point::new(rect.width(), 0.0),
        stacks: vec![Stack::Frag {
          text: text.clone(),
          rect: *rect,
          cells: Vec::new(),
        }],
      }],
      ReassocTree::Spacer { width } => vec![Line {
        origin: Point::ZERO,
        advance: Point::new(*width, 0.0),
        stacks: vec![Stack::Spacer { width: *width }],
      }],
      ReassocTree::JoinH(l, r) => {
        let mut left = self.walk(l);
        let mut right = self.walk(r);
        // Attach r's first line at the lead-out of l's last line.
        let last = left.last_mut().expect("walk never yields zero lines");
        let first = right.remove(0);
        let delta = Point::new(
          last.lead_out().x - first.origin.x,
          last.lead_out().y - first.origin.y,
        );
        let mut first = first;
        first.translate(delta);
        last.advance = Point::new(
          first.lead_out().x - last.origin.x,
          first.lead_out().y - last.origin.y,
        );
        last.stacks.extend(first.stacks);
        left.extend(right);
        left
      }
      ReassocTree::JoinV(l, r) => {
        let mut lines = self.walk(l);
        lines.extend(self.walk(r));
        lines
      }
      ReassocTree::Wrap {
        child,
        padding,
        style,
      } => {
        let uid = self.next_uid;
        self.next_uid += 1;
        if let Some(style) = style {
          self.styles.insert(uid, style.clone());
        }
        self.wrap_order.push(uid);
        let mut lines = self.walk(child);
        let p = *padding;
        for line in &mut lines {
          line.advance.x += 2.0 * p;
          if self.translate_wraps {
            for stack in &mut line.stacks {
              if let Stack::Frag { rect, .. } = stack {
                *rect = rect.translate(Point::new(p, 0.0));
              }
            }
          } else {
            line.origin.x -= p;
          }
          for stack in &mut line.stacks {
            if let Stack::Frag { cells, .. } = stack {
              let below = cells.last().map_or(0.0, |c| c.padding);
              cells.push(PebbleCell {
                uid,
                padding: below + p,
              });
            }
          }
        }
        lines
      }
    }
  }
}

/// Required padding pair from the cell stacks themselves: pop shared
/// wraps off both tops, then report the cumulative padding at each
/// side's first unshared cell.
pub(crate) fn space_between_cells(a: &[PebbleCell], b: &[PebbleCell]) -> (f32, f32) {
  (unshared(a, b), unshared(b, a))
}

fn unshared(own: &[PebbleCell], partner: &[PebbleCell]) -> f32 {
  for cell in own.iter().rev() {
    if !partner.iter().any(|p| p.uid == cell.uid) {
      return cell.padding;
    }
  }
  0.0
}

/// Stacks lines top to bottom.
///
/// The first line is placed so its tallest padded fragment starts at
/// y = 0. Every later line is placed at the maximum of its collision
/// candidates against all previously placed lines and the previous
/// line's baseline plus `ideal_leading`. A candidate exists only where
/// the mutually inflated rectangles overlap horizontally.
pub(crate) fn stack_lines(
  lines: &mut [Line],
  ideal_leading: f32,
  peel: bool,
  deadline: &LayoutDeadline,
) -> Result<()> {
  for k in 0..lines.len() {
    deadline.check()?;
    let dy = if k == 0 {
      let mut top = 0.0f32;
      for stack in &lines[0].stacks {
        if let Stack::Frag { rect, .. } = stack {
          top = top.max(stack.full_padding() - rect.min_y());
        }
      }
      top
    } else {
      let mut best = lines[k - 1].origin.y + ideal_leading;
      for j in 0..k {
        for a in &lines[j].stacks {
          let Stack::Frag {
            rect: ra,
            cells: ca,
            ..
          } = a
          else {
            continue;
          };
          for b in &lines[k].stacks {
            let Stack::Frag {
              rect: rb,
              cells: cb,
              ..
            } = b
            else {
              continue;
            };
            let (pa, pb) = if peel {
              space_between_cells(ca, cb)
            } else {
              (a.full_padding(), b.full_padding())
            };
            let ia = ra.inflate(pa);
            let ib = rb.inflate(pb);
            if ia.h_overlaps(ib) {
              best = best.max(ia.max_y() - ib.min_y());
            }
          }
        }
      }
      best
    };
    lines[k].translate(Point::new(0.0, dy));
  }
  Ok(())
}

/// Fragments in document order: lines top to bottom, stacks left to
/// right. Spacers do not appear.
pub(crate) fn collect_fragments(lines: &[Line]) -> Vec<FragmentInfo> {
  let mut fragments = Vec::new();
  for (line_no, line) in lines.iter().enumerate() {
    for stack in &line.stacks {
      if let Stack::Frag { text, rect, .. } = stack {
        fragments.push(FragmentInfo {
          text: text.clone(),
          rect: *rect,
          line_no,
        });
      }
    }
  }
  fragments
}
