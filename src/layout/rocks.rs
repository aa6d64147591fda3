//! L1S / L1S+: rocks layout
//!
//! The timetable-driven algorithm. Fragments live in a [`Backing`] and
//! are addressed by index from the moment they are appended; horizontal
//! joins and wraps move whole index ranges, and vertical stacking runs
//! leading queries against the backing's chunk buckets using
//! `Timetable::space_between` for the padding pair of every candidate.
//!
//! L1S+ continues where L1S stops: for every wrap it unions the final
//! padded fragment rectangles into a rectilinear outline, then (when
//! enabled) simplifies each outline while keeping it inside its parent's
//! outline and outside its siblings'.

use super::pebble::grow;
use super::{LayoutResult, RocksSettings, Scene, SceneItem, WrapOutline};
use crate::backing::{Backing, Region};
use crate::control::LayoutDeadline;
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::poly::{from_rectangles, simplify_polygon, Polygon};
use crate::reassoc::ReassocTree;
use crate::timetable::Timetable;

struct RocksLine {
  origin: Point,
  advance: Point,
  region: Region,
}

impl RocksLine {
  fn lead_out(&self) -> Point {
    self.origin.translate(self.advance)
  }
}

struct Walker<'a> {
  backing: Backing,
  timetable: &'a Timetable,
  texts: Vec<Option<String>>,
  translate_wraps: bool,
}

impl<'a> Walker<'a> {
  fn walk(&mut self, tree: &ReassocTree) -> Result<Vec<RocksLine>> {
    match tree {
      ReassocTree::Atom { text, rect } => {
        let col = self.backing.len();
        let full = self.timetable.full_padding(col);
        let index = self.backing.append_rect(*rect, full);
        self.texts.push(Some(text.clone()));
        Ok(vec![RocksLine {
          origin: Point::ZERO,
          advance: Point::new(rect.width(), 0.0),
          region: Region::single(index),
        }])
      }
      ReassocTree::Spacer { width } => {
        let index = self.backing.append_spacer(*width);
        self.texts.push(None);
        Ok(vec![RocksLine {
          origin: Point::ZERO,
          advance: Point::new(*width, 0.0),
          region: Region::single(index),
        }])
      }
      ReassocTree::JoinH(l, r) => {
        let mut left = self.walk(l)?;
        let mut right = self.walk(r)?;
        let first = right.remove(0);
        let last = left.last_mut().expect("walk never yields zero lines");
        let delta = Point::new(
          last.lead_out().x - first.origin.x,
          last.lead_out().y - first.origin.y,
        );
        if let Some(range) = first.region.range() {
          self.backing.translate_range(range, delta);
        }
        let first_lead_out = first.origin.translate(delta).translate(first.advance);
        last.advance = Point::new(
          first_lead_out.x - last.origin.x,
          first_lead_out.y - last.origin.y,
        );
        last.region = Region::join(last.region, first.region)?;
        left.extend(right);
        Ok(left)
      }
      ReassocTree::JoinV(l, r) => {
        let mut lines = self.walk(l)?;
        lines.extend(self.walk(r)?);
        Ok(lines)
      }
      ReassocTree::Wrap { child, padding, .. } => {
        let mut lines = self.walk(child)?;
        let p = *padding;
        for line in &mut lines {
          line.advance.x += 2.0 * p;
          if self.translate_wraps {
            if let Some(range) = line.region.range() {
              self.backing.translate_range(range, Point::new(p, 0.0));
            }
          } else {
            line.origin.x -= p;
          }
          line.region = line.region.widen();
        }
        Ok(lines)
      }
    }
  }
}

pub(crate) fn run(
  tree: &ReassocTree,
  settings: &RocksSettings,
  outline: Option<bool>,
  deadline: &LayoutDeadline,
) -> Result<LayoutResult> {
  let timetable = Timetable::build(tree);
  let mut walker = Walker {
    backing: Backing::new(),
    timetable: &timetable,
    texts: Vec::new(),
    translate_wraps: settings.translate_wraps,
  };
  let mut lines = walker.walk(tree)?;
  let mut backing = walker.backing;
  let texts = walker.texts;

  stack_rocks_lines(
    &mut lines,
    &mut backing,
    &timetable,
    settings.ideal_leading,
    deadline,
  )?;

  // Line number per column.
  let mut line_no = vec![0usize; backing.len()];
  for (k, line) in lines.iter().enumerate() {
    if let Some(range) = line.region.range() {
      for index in range.indices() {
        line_no[index] = k;
      }
    }
  }

  let mut fragments = Vec::new();
  for index in 0..backing.len() {
    if let (Some(text), Some(rect)) = (&texts[index], backing.rect(index)) {
      fragments.push(super::FragmentInfo {
        text: text.clone(),
        rect,
        line_no: line_no[index],
      });
    }
  }

  let mut bounding: Option<Rect> = None;
  for index in 0..backing.len() {
    if let Some(rect) = backing.rect(index) {
      grow(&mut bounding, rect.inflate(timetable.full_padding(index)));
    }
  }

  let mut scene = Scene::default();
  let mut outlines: Vec<WrapOutline> = Vec::new();

  match outline {
    None => {
      // Plain L1S: each fragment renders its stack of padded rects,
      // outermost first, like the pebble view but with final positions.
      for index in 0..backing.len() {
        let Some(rect) = backing.rect(index) else {
          continue;
        };
        let cells = timetable.column_cells(index);
        let mut last_uid = 0u32;
        for cell in cells.iter().rev() {
          if cell.uid == last_uid {
            continue;
          }
          last_uid = cell.uid;
          let Some(style) = timetable
            .wraps()
            .iter()
            .find(|w| w.uid == cell.uid)
            .and_then(|w| w.style.clone())
          else {
            continue;
          };
          scene.items.push(SceneItem::Outline {
            polygon: Polygon::of_rect(rect.inflate(cell.padding)),
            style,
          });
        }
      }
    }
    Some(simplify) => {
      // L1S+: union the padded rectangles beneath each wrap.
      let wraps = timetable.wraps();
      let mut polygons: Vec<Polygon> = Vec::with_capacity(wraps.len());
      for wrap in wraps {
        let mut rects = Vec::new();
        for col in wrap.begin..wrap.end {
          let (Some(rect), Some(padding)) =
            (backing.rect(col), timetable.padding_at(col, wrap.uid))
          else {
            continue;
          };
          rects.push(rect.inflate(padding));
        }
        polygons.push(from_rectangles(&rects));
      }

      if simplify {
        for i in 0..polygons.len() {
          let simplified = {
            let keep_inside = wraps[i].parent.map(|p| &polygons[p]);
            let siblings: Vec<&Polygon> = (0..polygons.len())
              .filter(|&j| j != i && wraps[j].parent == wraps[i].parent)
              .map(|j| &polygons[j])
              .collect();
            simplify_polygon(&polygons[i], keep_inside, &siblings, deadline)?
          };
          polygons[i] = simplified;
        }
      }

      for (wrap, polygon) in wraps.iter().zip(polygons.into_iter()) {
        if let Some(bb) = polygon.bounding_box() {
          grow(&mut bounding, bb);
        }
        if let Some(style) = &wrap.style {
          scene.items.push(SceneItem::Outline {
            polygon: polygon.clone(),
            style: style.clone(),
          });
        }
        outlines.push(WrapOutline {
          uid: wrap.uid,
          polygon,
        });
      }
    }
  }

  for line in &lines {
    let Some(range) = line.region.range() else {
      continue;
    };
    for index in range.indices() {
      if let (Some(text), Some(rect)) = (&texts[index], backing.rect(index)) {
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

/// Vertical stacking with the backing + timetable leading query.
///
/// For each fragment of the incoming line, chunks are scanned
/// bottom-most first; a chunk whose best possible candidate cannot beat
/// the current offset ends the scan early. Only fragments of already
/// placed lines participate.
fn stack_rocks_lines(
  lines: &mut [RocksLine],
  backing: &mut Backing,
  timetable: &Timetable,
  ideal_leading: f32,
  deadline: &LayoutDeadline,
) -> Result<()> {
  let mut placed_end = 0usize;
  let mut prev_y = 0.0f32;
  for k in 0..lines.len() {
    deadline.check()?;
    let Some(range) = lines[k].region.range() else {
      continue;
    };
    let dy = if k == 0 {
      let mut top = 0.0f32;
      for index in range.indices() {
        if let Some(rect) = backing.rect(index) {
          top = top.max(timetable.full_padding(index) - rect.min_y());
        }
      }
      top
    } else {
      let mut best = prev_y + ideal_leading;
      for b in range.indices() {
        let Some(rb) = backing.rect(b) else {
          continue;
        };
        let pb_full = timetable.full_padding(b);
        for (key, bucket) in backing.iter_chunks_desc() {
          let bound =
            Backing::chunk_bottom_bound(key) + backing.max_padding() - (rb.min_y() - pb_full);
          if bound <= best {
            break;
          }
          for &a in bucket {
            if a >= placed_end {
              continue;
            }
            let Some(ra) = backing.rect(a) else {
              continue;
            };
            let (pa, pb) = timetable.space_between(a, b);
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
    backing.translate_range(range, Point::new(0.0, dy));
    lines[k].origin.y += dy;
    prev_y = lines[k].origin.y;
    placed_end = placed_end.max(range.end);
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::layout::{layout, Algorithm, RocksPlusSettings};
  use crate::measure::MonospaceMeasurer;
  use crate::poly::point_in_polygon;
  use crate::tree::LayoutTree;

  fn l1s(ideal: f32) -> Algorithm {
    Algorithm::L1s(RocksSettings {
      translate_wraps: true,
      ideal_leading: ideal,
    })
  }

  fn l1s_plus(ideal: f32, simplify: bool) -> Algorithm {
    Algorithm::L1sPlus(RocksPlusSettings {
      translate_wraps: true,
      ideal_leading: ideal,
      enable_simplification: simplify,
    })
  }

  #[test]
  fn test_single_atom_matches_l1p() {
    let m = MonospaceMeasurer::new(5.0, 8.0, 2.0);
    let tree = LayoutTree::node(0.0, vec![LayoutTree::atom("ab")]);
    let result = layout(&tree, &m, &l1s(0.0), &LayoutDeadline::none()).unwrap();
    assert_eq!(result.fragments().len(), 1);
    assert_eq!(
      result.fragments()[0].rect,
      Rect::from_ltrb(0.0, 0.0, 10.0, 10.0)
    );
  }

  #[test]
  fn test_horizontal_pair_with_shared_wrap() {
    // Node(padding=2, [a, b]) with 10x10 atoms: a.left = 2 after the
    // wrap translate, b.left = 12, text top at 2.
    let m = MonospaceMeasurer::new(10.0, 10.0, 0.0);
    let tree = LayoutTree::node(
      2.0,
      vec![LayoutTree::atom("a"), LayoutTree::atom("b")],
    );
    let result = layout(&tree, &m, &l1s(0.0), &LayoutDeadline::none()).unwrap();
    let frags = result.fragments();
    assert_eq!(frags[0].rect.min_x(), 2.0);
    assert_eq!(frags[1].rect.min_x(), 12.0);
    assert_eq!(frags[0].rect.min_y(), 2.0);
    assert_eq!(frags[0].line_no, frags[1].line_no);
  }

  #[test]
  fn test_sibling_wraps_lead_by_padding() {
    let m = MonospaceMeasurer::new(10.0, 10.0, 0.0);
    let tree = LayoutTree::node(
      4.0,
      vec![
        LayoutTree::node(2.0, vec![LayoutTree::atom("x")]),
        LayoutTree::newline(),
        LayoutTree::node(2.0, vec![LayoutTree::atom("y")]),
      ],
    );
    let result = layout(&tree, &m, &l1s(0.0), &LayoutDeadline::none()).unwrap();
    let frags = result.fragments();
    assert_eq!(frags[1].rect.min_y() - frags[0].rect.max_y(), 4.0);
  }

  #[test]
  fn test_outline_contains_fragments() {
    let m = MonospaceMeasurer::new(10.0, 10.0, 0.0);
    let tree = LayoutTree::node(
      3.0,
      vec![
        LayoutTree::atom("alpha"),
        LayoutTree::newline(),
        LayoutTree::atom("bet"),
      ],
    );
    let result = layout(&tree, &m, &l1s_plus(4.0, true), &LayoutDeadline::none()).unwrap();
    let outlines = result.wrap_outlines();
    assert_eq!(outlines.len(), 1);
    let polygon = &outlines[0].polygon;
    for frag in result.fragments() {
      for (x, y) in [
        (frag.rect.min_x(), frag.rect.min_y()),
        (frag.rect.max_x(), frag.rect.max_y()),
      ] {
        assert!(
          point_in_polygon(Point::new(x, y), polygon, true),
          "fragment corner ({x}, {y}) escapes the outline"
        );
      }
    }
  }

  #[test]
  fn test_single_line_wrap_outline_is_rect() {
    let m = MonospaceMeasurer::new(10.0, 10.0, 0.0);
    let tree = LayoutTree::node(2.0, vec![LayoutTree::atom("ab")]);
    let result = layout(&tree, &m, &l1s_plus(0.0, false), &LayoutDeadline::none()).unwrap();
    let outlines = result.wrap_outlines();
    assert_eq!(outlines.len(), 1);
    assert_eq!(outlines[0].polygon.paths.len(), 1);
    assert_eq!(outlines[0].polygon.paths[0].points.len(), 4);
    assert_eq!(
      outlines[0].polygon.bounding_box().unwrap(),
      Rect::from_ltrb(0.0, 0.0, 24.0, 14.0)
    );
  }

  #[test]
  fn test_spacer_contributes_no_padding() {
    let m = MonospaceMeasurer::new(10.0, 10.0, 0.0);
    let tree = LayoutTree::node(
      5.0,
      vec![
        LayoutTree::atom("a"),
        LayoutTree::newline(),
        LayoutTree::spacer_width(30.0),
        LayoutTree::atom("b"),
      ],
    );
    let result = layout(&tree, &m, &l1s(0.0), &LayoutDeadline::none()).unwrap();
    let frags = result.fragments();
    assert_eq!(frags.len(), 2);
    // Spacer shifts b to the right on its line.
    assert!(frags[1].rect.min_x() >= 30.0);
  }
}
