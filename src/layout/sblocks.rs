//! S-Blocks: gadget-based horizontal sweep
//!
//! Instead of unioning rectangles after the fact, S-Blocks accounts for
//! wrap boundaries while sweeping each line. Entering a wrap injects
//! horizontal gadgets around its fragments: `BeginNode`/`EndNode` at
//! the wrap's ends, `EndLine`/`BeginLine` at line breaks inside it (the
//! begin-line gadget attaches to the next atom, skipping leading
//! spacers). The per-line x scan accumulates fragment widths plus
//! gadget widths, which yields each wrap's horizontal extent per line.
//!
//! Vertical gadgets then claim room above and below each line in a
//! per-line shelf: a gadget lands at the lowest offset clear of every
//! previously placed gadget it overlaps, so nested outlines stack
//! outward. Shelf occupancy plus text extents drive the leading between
//! lines; once every line has an absolute y, each wrap's outline is
//! emitted as horizontal draw commands joined by implicit risers: two
//! lines for a single-line wrap, two rectangles for non-overlapping
//! lines, a staircase in general.

use super::pebble::grow;
use super::{LayoutResult, SBlocksSettings, Scene, SceneItem, WrapOutline};
use crate::control::LayoutDeadline;
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::poly::{Path, Polygon};
use crate::reassoc::ReassocTree;
use crate::timetable::Timetable;
use rustc_hash::FxHashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HGadgetKind {
  BeginNode,
  EndNode,
  BeginLine,
  EndLine,
}

#[derive(Debug, Clone, Copy)]
struct HGadget {
  kind: HGadgetKind,
  wrap: usize,
  width: f32,
}

#[derive(Debug)]
struct Leaf {
  col: usize,
  text: Option<String>,
  rect: Rect,
  width: f32,
  before: Vec<HGadget>,
  after: Vec<HGadget>,
}

impl Leaf {
  fn is_frag(&self) -> bool {
    self.text.is_some()
  }
}

/// Horizontal edge of an outline, in perimeter order; `Close` ends one
/// path. Vertical risers are implied between consecutive edges.
#[derive(Debug, Clone, Copy)]
enum DrawCommand {
  HorzLine { y: f32, x1: f32, x2: f32 },
  Close,
}

#[derive(Debug, Default)]
struct Shelf {
  entries: Vec<ShelfEntry>,
}

#[derive(Debug, Clone, Copy)]
struct ShelfEntry {
  x1: f32,
  x2: f32,
  offset: f32,
  thickness: f32,
}

impl Shelf {
  /// Places a gadget over `[x1, x2]`, offset past every overlapping
  /// prior gadget. Returns the offset from the line's text edge.
  fn place(&mut self, x1: f32, x2: f32, thickness: f32) -> f32 {
    let mut offset = 0.0f32;
    for e in &self.entries {
      if x1 < e.x2 && e.x1 < x2 {
        offset = offset.max(e.offset + e.thickness);
      }
    }
    self.entries.push(ShelfEntry {
      x1,
      x2,
      offset,
      thickness,
    });
    offset
  }
}

pub(crate) fn run(
  tree: &ReassocTree,
  settings: &SBlocksSettings,
  deadline: &LayoutDeadline,
) -> Result<LayoutResult> {
  let timetable = Timetable::build(tree);
  let wraps = timetable.wraps();

  // 1. Flatten into lines of leaves, columns in document order.
  let mut lines: Vec<Vec<Leaf>> = vec![Vec::new()];
  flatten(tree, &mut lines, &mut 0);

  // 2. Coverage: for every wrap, the lines holding its fragments.
  let coverage: Vec<Vec<(usize, usize, usize)>> = wraps
    .iter()
    .map(|wrap| {
      let mut covered = Vec::new();
      for (li, line) in lines.iter().enumerate() {
        let mut first = None;
        let mut last = None;
        for (j, leaf) in line.iter().enumerate() {
          if leaf.is_frag() && leaf.col >= wrap.begin && leaf.col < wrap.end {
            first.get_or_insert(j);
            last = Some(j);
          }
        }
        if let (Some(f), Some(l)) = (first, last) {
          covered.push((li, f, l));
        }
      }
      covered
    })
    .collect();

  // Begin gadgets, outermost wrap first.
  for (wi, covered) in coverage.iter().enumerate() {
    for (pos, &(li, first, _)) in covered.iter().enumerate() {
      lines[li][first].before.push(HGadget {
        kind: if pos == 0 {
          HGadgetKind::BeginNode
        } else {
          HGadgetKind::BeginLine
        },
        wrap: wi,
        width: wraps[wi].padding,
      });
    }
  }
  // End gadgets, innermost wrap first.
  for wi in (0..wraps.len()).rev() {
    let covered = &coverage[wi];
    for (pos, &(li, _, last)) in covered.iter().enumerate() {
      lines[li][last].after.push(HGadget {
        kind: if pos == covered.len() - 1 {
          HGadgetKind::EndNode
        } else {
          HGadgetKind::EndLine
        },
        wrap: wi,
        width: wraps[wi].padding,
      });
    }
  }

  // 3. X scan: fragment positions and per-wrap horizontal extents.
  let mut exts: FxHashMap<(usize, usize), (f32, f32)> = FxHashMap::default();
  for (li, line) in lines.iter_mut().enumerate() {
    let mut x = 0.0f32;
    for leaf in line.iter_mut() {
      for g in &leaf.before {
        if matches!(g.kind, HGadgetKind::BeginNode | HGadgetKind::BeginLine) {
          exts.entry((g.wrap, li)).or_insert((x, x)).0 = x;
        }
        x += g.width;
      }
      leaf.rect = leaf.rect.translate(Point::new(x, 0.0));
      x += leaf.width;
      for g in &leaf.after {
        x += g.width;
        if matches!(g.kind, HGadgetKind::EndNode | HGadgetKind::EndLine) {
          exts.entry((g.wrap, li)).or_insert((x, x)).1 = x;
        }
      }
    }
  }

  // 4. Vertical gadgets: shelves above and below each line, innermost
  // wrap first so outer edges stack outside inner ones.
  let line_count = lines.len();
  let mut above: Vec<Shelf> = (0..line_count).map(|_| Shelf::default()).collect();
  let mut below: Vec<Shelf> = (0..line_count).map(|_| Shelf::default()).collect();
  let mut ty_off: FxHashMap<(usize, usize), f32> = FxHashMap::default();
  let mut by_off: FxHashMap<(usize, usize), f32> = FxHashMap::default();
  let runs: Vec<Vec<Vec<usize>>> = (0..wraps.len())
    .map(|wi| split_runs(&coverage[wi], &exts, wi))
    .collect();

  for wi in (0..wraps.len()).rev() {
    let p = wraps[wi].padding;
    for run in &runs[wi] {
      let s = run[0];
      let e = *run.last().expect("runs are non-empty");
      let (sx1, sx2) = exts[&(wi, s)];
      let o = above[s].place(sx1, sx2, p);
      bump(&mut ty_off, (wi, s), o);
      let (ex1, ex2) = exts[&(wi, e)];
      let o = below[e].place(ex1, ex2, p);
      bump(&mut by_off, (wi, e), o);
      for pair in run.windows(2) {
        let (i, j) = (pair[0], pair[1]);
        let a = exts[&(wi, i)];
        let b = exts[&(wi, j)];
        for (x1, x2) in interval_minus(a, b) {
          let o = below[i].place(x1, x2, p);
          bump(&mut by_off, (wi, i), o);
        }
        for (x1, x2) in interval_minus(b, a) {
          let o = above[j].place(x1, x2, p);
          bump(&mut ty_off, (wi, j), o);
        }
      }
    }
  }

  // 5. Vertical resolution: absolute y per line.
  let text_top: Vec<f32> = lines
    .iter()
    .map(|line| {
      line
        .iter()
        .filter(|l| l.is_frag())
        .map(|l| l.rect.min_y())
        .fold(0.0f32, f32::min)
    })
    .collect();
  let text_bottom: Vec<f32> = lines
    .iter()
    .map(|line| {
      line
        .iter()
        .filter(|l| l.is_frag())
        .map(|l| l.rect.max_y())
        .fold(0.0f32, f32::max)
    })
    .collect();

  let ys: Vec<f32> = {
    let top_items = |k: usize| -> Vec<(f32, f32, f32)> {
      let mut items: Vec<(f32, f32, f32)> = lines[k]
        .iter()
        .filter(|l| l.is_frag())
        .map(|l| (l.rect.min_x(), l.rect.max_x(), l.rect.min_y()))
        .collect();
      for e in &above[k].entries {
        items.push((e.x1, e.x2, text_top[k] - e.offset - e.thickness));
      }
      items
    };

    let mut ys = vec![0.0f32; line_count];
    for k in 0..line_count {
      deadline.check()?;
      if k == 0 {
        ys[0] = top_items(0)
          .iter()
          .map(|&(_, _, y)| -y)
          .fold(0.0f32, f32::max);
        continue;
      }
      let mut best = ys[k - 1] + settings.ideal_leading;
      let tops = top_items(k);
      for j in 0..k {
        let mut bottoms: Vec<(f32, f32, f32)> = lines[j]
          .iter()
          .filter(|l| l.is_frag())
          .map(|l| (l.rect.min_x(), l.rect.max_x(), l.rect.max_y()))
          .collect();
        if j == k - 1 {
          for e in &below[j].entries {
            bottoms.push((e.x1, e.x2, text_bottom[j] + e.offset + e.thickness));
          }
        }
        for &(bx1, bx2, by) in &bottoms {
          for &(tx1, tx2, ty) in &tops {
            if bx1 < tx2 && tx1 < bx2 {
              best = best.max(ys[j] + by - ty);
            }
          }
        }
      }
      ys[k] = best;
    }
    ys
  };

  for (li, line) in lines.iter_mut().enumerate() {
    for leaf in line.iter_mut() {
      leaf.rect = leaf.rect.translate(Point::new(0.0, ys[li]));
    }
  }

  // 6. Outline emission from draw commands, wrap by wrap.
  let mut outlines: Vec<WrapOutline> = Vec::new();
  let mut bounding: Option<Rect> = None;
  let mut scene = Scene::default();
  for (wi, wrap) in wraps.iter().enumerate() {
    let p = wrap.padding;
    let ty = |li: usize| ys[li] + text_top[li] - ty_off.get(&(wi, li)).copied().unwrap_or(0.0) - p;
    let by = |li: usize| {
      ys[li] + text_bottom[li] + by_off.get(&(wi, li)).copied().unwrap_or(0.0) + p
    };
    let mut commands: Vec<DrawCommand> = Vec::new();
    for run in &runs[wi] {
      let s = run[0];
      let e = *run.last().expect("runs are non-empty");
      let (sx1, sx2) = exts[&(wi, s)];
      commands.push(DrawCommand::HorzLine {
        y: ty(s),
        x1: sx1,
        x2: sx2,
      });
      let mut cur_x = sx2;
      for pair in run.windows(2) {
        let (i, j) = (pair[0], pair[1]);
        let xi2 = exts[&(wi, i)].1;
        let xj2 = exts[&(wi, j)].1;
        if xj2 != xi2 {
          let y = if xj2 < xi2 { by(i) } else { ty(j) };
          commands.push(DrawCommand::HorzLine {
            y,
            x1: cur_x,
            x2: xj2,
          });
          cur_x = xj2;
        }
      }
      let (ex1, _) = exts[&(wi, e)];
      commands.push(DrawCommand::HorzLine {
        y: by(e),
        x1: cur_x,
        x2: ex1,
      });
      cur_x = ex1;
      for pair in run.windows(2).rev() {
        let (i, j) = (pair[0], pair[1]);
        let xi1 = exts[&(wi, i)].0;
        let xj1 = exts[&(wi, j)].0;
        if xj1 != xi1 {
          let y = if xi1 < xj1 { by(i) } else { ty(j) };
          commands.push(DrawCommand::HorzLine {
            y,
            x1: cur_x,
            x2: xi1,
          });
          cur_x = xi1;
        }
      }
      commands.push(DrawCommand::Close);
    }
    let polygon = paths_from_commands(&commands);
    if let Some(bb) = polygon.bounding_box() {
      grow(&mut bounding, bb);
    }
    if let Some(style) = &wrap.style {
      if !polygon.is_empty() {
        scene.items.push(SceneItem::Outline {
          polygon: polygon.clone(),
          style: style.clone(),
        });
      }
    }
    outlines.push(WrapOutline {
      uid: wrap.uid,
      polygon,
    });
  }

  // 7. Fragments and text runs in document order.
  let mut fragments = Vec::new();
  for (li, line) in lines.iter().enumerate() {
    for leaf in line {
      let Some(text) = &leaf.text else { continue };
      grow(&mut bounding, leaf.rect);
      fragments.push(super::FragmentInfo {
        text: text.clone(),
        rect: leaf.rect,
        line_no: li,
      });
      if !text.is_empty() {
        scene.items.push(SceneItem::TextRun {
          text: text.clone(),
          origin: Point::new(leaf.rect.min_x(), ys[li]),
        });
      }
    }
  }

  Ok(LayoutResult::assemble(fragments, outlines, scene, bounding))
}

fn flatten(tree: &ReassocTree, lines: &mut Vec<Vec<Leaf>>, col: &mut usize) {
  match tree {
    ReassocTree::Atom { text, rect } => {
      let leaf = Leaf {
        col: *col,
        text: Some(text.clone()),
        rect: *rect,
        width: rect.width(),
        before: Vec::new(),
        after: Vec::new(),
      };
      *col += 1;
      lines.last_mut().expect("lines start non-empty").push(leaf);
    }
    ReassocTree::Spacer { width } => {
      let leaf = Leaf {
        col: *col,
        text: None,
        rect: Rect::from_xywh(0.0, 0.0, *width, 0.0),
        width: *width,
        before: Vec::new(),
        after: Vec::new(),
      };
      *col += 1;
      lines.last_mut().expect("lines start non-empty").push(leaf);
    }
    ReassocTree::JoinH(l, r) => {
      flatten(l, lines, col);
      flatten(r, lines, col);
    }
    ReassocTree::JoinV(l, r) => {
      flatten(l, lines, col);
      lines.push(Vec::new());
      flatten(r, lines, col);
    }
    ReassocTree::Wrap { child, .. } => flatten(child, lines, col),
  }
}

/// Splits a wrap's covered lines into maximal runs of consecutive lines
/// whose extents overlap; non-adjacent or non-overlapping neighbours
/// start a new (disjoint) outline piece.
fn split_runs(
  covered: &[(usize, usize, usize)],
  exts: &FxHashMap<(usize, usize), (f32, f32)>,
  wi: usize,
) -> Vec<Vec<usize>> {
  let mut runs: Vec<Vec<usize>> = Vec::new();
  for &(li, _, _) in covered {
    let continues = runs.last().and_then(|run| run.last()).is_some_and(|&prev| {
      if li != prev + 1 {
        return false;
      }
      let (a1, a2) = exts[&(wi, prev)];
      let (b1, b2) = exts[&(wi, li)];
      a1.max(b1) < a2.min(b2)
    });
    if continues {
      runs.last_mut().expect("runs non-empty here").push(li);
    } else {
      runs.push(vec![li]);
    }
  }
  runs
}

/// Parts of interval `a` not covered by `b` (0, 1 or 2 pieces).
fn interval_minus(a: (f32, f32), b: (f32, f32)) -> Vec<(f32, f32)> {
  let mut parts = Vec::new();
  if b.0 > a.0 {
    parts.push((a.0, b.0.min(a.1)));
  }
  if b.1 < a.1 {
    parts.push((b.1.max(a.0), a.1));
  }
  parts.retain(|&(x1, x2)| x2 > x1);
  parts
}

fn bump(map: &mut FxHashMap<(usize, usize), f32>, key: (usize, usize), offset: f32) {
  map
    .entry(key)
    .and_modify(|o| *o = o.max(offset))
    .or_insert(offset);
}

fn paths_from_commands(commands: &[DrawCommand]) -> Polygon {
  let mut paths = Vec::new();
  let mut points: Vec<Point> = Vec::new();
  for cmd in commands {
    match cmd {
      DrawCommand::HorzLine { y, x1, x2 } => {
        points.push(Point::new(*x1, *y));
        points.push(Point::new(*x2, *y));
      }
      DrawCommand::Close => {
        let mut path = Path::new(std::mem::take(&mut points));
        path.normalize();
        path.make_ccw();
        if !path.is_empty() {
          paths.push(path);
        }
      }
    }
  }
  Polygon::new(paths)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::layout::{layout, Algorithm};
  use crate::measure::MonospaceMeasurer;
  use crate::poly::point_in_polygon;
  use crate::tree::LayoutTree;

  fn sblocks(ideal: f32) -> Algorithm {
    Algorithm::SBlocks(SBlocksSettings { ideal_leading: ideal })
  }

  #[test]
  fn test_single_line_wrap_two_horizontals() {
    let m = MonospaceMeasurer::new(10.0, 10.0, 0.0);
    let tree = LayoutTree::node(2.0, vec![LayoutTree::atom("ab")]);
    let result = layout(&tree, &m, &sblocks(0.0), &LayoutDeadline::none()).unwrap();
    let outlines = result.wrap_outlines();
    assert_eq!(outlines.len(), 1);
    let polygon = &outlines[0].polygon;
    assert_eq!(polygon.paths.len(), 1);
    assert_eq!(polygon.paths[0].points.len(), 4);
    assert_eq!(
      polygon.bounding_box().unwrap(),
      Rect::from_ltrb(0.0, 0.0, 24.0, 14.0)
    );
    assert_eq!(result.fragments()[0].rect.min_x(), 2.0);
  }

  #[test]
  fn test_two_line_staircase() {
    let m = MonospaceMeasurer::new(10.0, 10.0, 0.0);
    let tree = LayoutTree::node(
      2.0,
      vec![
        LayoutTree::atom("long"),
        LayoutTree::newline(),
        LayoutTree::atom("s"),
      ],
    );
    let result = layout(&tree, &m, &sblocks(0.0), &LayoutDeadline::none()).unwrap();
    let outlines = result.wrap_outlines();
    assert_eq!(outlines[0].polygon.paths.len(), 1);
    // Staircase: more than four corners.
    assert!(outlines[0].polygon.paths[0].points.len() >= 6);
    // Every fragment corner stays inside.
    for frag in result.fragments() {
      for (x, y) in [
        (frag.rect.min_x(), frag.rect.min_y()),
        (frag.rect.max_x(), frag.rect.max_y()),
      ] {
        assert!(point_in_polygon(
          Point::new(x, y),
          &outlines[0].polygon,
          true
        ));
      }
    }
  }

  #[test]
  fn test_nested_wraps_stack_outward() {
    let m = MonospaceMeasurer::new(10.0, 10.0, 0.0);
    let tree = LayoutTree::node(
      2.0,
      vec![LayoutTree::node(3.0, vec![LayoutTree::atom("a")])],
    );
    let result = layout(&tree, &m, &sblocks(0.0), &LayoutDeadline::none()).unwrap();
    let outlines = result.wrap_outlines();
    assert_eq!(outlines.len(), 2);
    let outer = outlines[0].polygon.bounding_box().unwrap();
    let inner = outlines[1].polygon.bounding_box().unwrap();
    assert_eq!(outer, inner.inflate(2.0));
  }

  #[test]
  fn test_sibling_wraps_on_one_line_do_not_overlap() {
    let m = MonospaceMeasurer::new(10.0, 10.0, 0.0);
    let tree = LayoutTree::node(
      1.0,
      vec![
        LayoutTree::node(2.0, vec![LayoutTree::atom("a")]),
        LayoutTree::node(2.0, vec![LayoutTree::atom("b")]),
      ],
    );
    let result = layout(&tree, &m, &sblocks(0.0), &LayoutDeadline::none()).unwrap();
    let outlines = result.wrap_outlines();
    assert_eq!(outlines.len(), 3);
    let first = outlines[1].polygon.bounding_box().unwrap();
    let second = outlines[2].polygon.bounding_box().unwrap();
    assert!(first.max_x() <= second.min_x());
  }

  #[test]
  fn test_line_break_skips_leading_spacers() {
    let m = MonospaceMeasurer::new(10.0, 10.0, 0.0);
    let tree = LayoutTree::node(
      2.0,
      vec![
        LayoutTree::atom("a"),
        LayoutTree::newline(),
        LayoutTree::spacer_width(20.0),
        LayoutTree::atom("b"),
      ],
    );
    let result = layout(&tree, &m, &sblocks(0.0), &LayoutDeadline::none()).unwrap();
    let frags = result.fragments();
    // The wrap's second-line extent starts at the atom, after the spacer.
    let outline_bb = result.wrap_outlines()[0].polygon.bounding_box().unwrap();
    assert!(frags[1].rect.min_x() >= 20.0);
    assert_eq!(outline_bb.min_x(), 0.0);
  }
}
