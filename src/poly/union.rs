//! Union of axis-aligned rectangles into rectilinear paths
//!
//! Two sweeps produce the boundary segments: a top-to-bottom sweep over
//! y events emits the horizontal runs where coverage appears or
//! disappears, and a left-to-right sweep over x events emits the
//! vertical runs symmetrically. Comparing the merged coverage profile
//! before and after each event batch yields maximal runs directly, so
//! abutting collinear pieces never need a separate merge pass and two
//! rectangles that merely touch produce no interior boundary.
//!
//! Path reconstruction then walks the segment soup: pick the top-left
//! unused horizontal segment, alternately follow horizontal and vertical
//! segments consuming each one, and close the cycle. Every cycle becomes
//! one CCW path; disjoint rectangle groups and interior holes come out
//! as additional paths.

use super::{Path, Polygon};
use crate::geometry::{Point, Rect};
use rustc_hash::FxHashMap;

/// Unions rectangles into a rectilinear polygon.
///
/// Degenerate (zero-area) rectangles are ignored; an empty input yields
/// an empty polygon. All returned paths are CCW.
pub fn from_rectangles(rects: &[Rect]) -> Polygon {
  let rects: Vec<Rect> = rects
    .iter()
    .copied()
    .filter(|r| r.width() > 0.0 && r.height() > 0.0)
    .collect();
  if rects.is_empty() {
    return Polygon::default();
  }

  // Horizontal boundary runs from the y sweep.
  let h_events: Vec<Event> = rects
    .iter()
    .flat_map(|r| {
      [
        Event::enter(r.min_y(), r.min_x(), r.max_x()),
        Event::exit(r.max_y(), r.min_x(), r.max_x()),
      ]
    })
    .collect();
  // Vertical boundary runs from the x sweep.
  let v_events: Vec<Event> = rects
    .iter()
    .flat_map(|r| {
      [
        Event::enter(r.min_x(), r.min_y(), r.max_y()),
        Event::exit(r.max_x(), r.min_y(), r.max_y()),
      ]
    })
    .collect();

  let h_runs = boundary_runs(h_events);
  let v_runs = boundary_runs(v_events);

  let mut segs: Vec<Seg> = Vec::with_capacity(h_runs.len() + v_runs.len());
  for (y, x1, x2) in h_runs {
    segs.push(Seg {
      a: Point::new(x1, y),
      b: Point::new(x2, y),
      horizontal: true,
    });
  }
  for (x, y1, y2) in v_runs {
    segs.push(Seg {
      a: Point::new(x, y1),
      b: Point::new(x, y2),
      horizontal: false,
    });
  }
  reconstruct(segs)
}

#[derive(Debug, Clone, Copy)]
struct Event {
  at: f32,
  enter: bool,
  lo: f32,
  hi: f32,
}

impl Event {
  fn enter(at: f32, lo: f32, hi: f32) -> Self {
    Self {
      at,
      enter: true,
      lo,
      hi,
    }
  }

  fn exit(at: f32, lo: f32, hi: f32) -> Self {
    Self {
      at,
      enter: false,
      lo,
      hi,
    }
  }
}

/// Runs the sweep: returns `(at, lo, hi)` boundary runs where the merged
/// coverage profile changed across an event batch.
fn boundary_runs(mut events: Vec<Event>) -> Vec<(f32, f32, f32)> {
  events.sort_by(|a, b| a.at.partial_cmp(&b.at).unwrap_or(std::cmp::Ordering::Equal));
  let mut active: Vec<(f32, f32)> = Vec::new();
  let mut runs = Vec::new();
  let mut i = 0;
  while i < events.len() {
    let at = events[i].at;
    let before = merge_intervals(&active);
    while i < events.len() && events[i].at == at {
      let ev = events[i];
      if ev.enter {
        active.push((ev.lo, ev.hi));
      } else if let Some(pos) = active.iter().position(|&iv| iv == (ev.lo, ev.hi)) {
        active.swap_remove(pos);
      }
      i += 1;
    }
    let after = merge_intervals(&active);
    for (lo, hi) in subtract_intervals(&after, &before) {
      runs.push((at, lo, hi));
    }
    for (lo, hi) in subtract_intervals(&before, &after) {
      runs.push((at, lo, hi));
    }
  }
  runs
}

/// Sorted disjoint union of an interval multiset; touching intervals
/// merge.
fn merge_intervals(intervals: &[(f32, f32)]) -> Vec<(f32, f32)> {
  let mut sorted: Vec<(f32, f32)> = intervals.to_vec();
  sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));
  let mut merged: Vec<(f32, f32)> = Vec::with_capacity(sorted.len());
  for (lo, hi) in sorted {
    match merged.last_mut() {
      Some(last) if lo <= last.1 => last.1 = last.1.max(hi),
      _ => merged.push((lo, hi)),
    }
  }
  merged
}

/// Parts of `a` not covered by `b`; both inputs sorted and disjoint.
fn subtract_intervals(a: &[(f32, f32)], b: &[(f32, f32)]) -> Vec<(f32, f32)> {
  let mut out = Vec::new();
  for &(lo, hi) in a {
    let mut cursor = lo;
    for &(blo, bhi) in b {
      if bhi <= cursor {
        continue;
      }
      if blo >= hi {
        break;
      }
      if blo > cursor {
        out.push((cursor, blo.min(hi)));
      }
      cursor = cursor.max(bhi);
      if cursor >= hi {
        break;
      }
    }
    if cursor < hi {
      out.push((cursor, hi));
    }
  }
  out
}

#[derive(Debug, Clone, Copy)]
struct Seg {
  a: Point,
  b: Point,
  horizontal: bool,
}

impl Seg {
  fn other_end(&self, p: Point) -> Point {
    if p == self.a {
      self.b
    } else {
      self.a
    }
  }

  fn left(&self) -> Point {
    if self.a.x <= self.b.x {
      self.a
    } else {
      self.b
    }
  }
}

fn point_key(p: Point) -> (u32, u32) {
  ((p.x + 0.0).to_bits(), (p.y + 0.0).to_bits())
}

/// Stitches boundary segments into closed CCW paths.
fn reconstruct(segs: Vec<Seg>) -> Polygon {
  let mut by_endpoint: FxHashMap<(u32, u32), Vec<usize>> = FxHashMap::default();
  for (idx, seg) in segs.iter().enumerate() {
    by_endpoint.entry(point_key(seg.a)).or_default().push(idx);
    by_endpoint.entry(point_key(seg.b)).or_default().push(idx);
  }
  let mut used = vec![false; segs.len()];
  let mut paths = Vec::new();

  loop {
    // Top-left unused horizontal segment starts the next cycle.
    let start_idx = (0..segs.len())
      .filter(|&i| !used[i] && segs[i].horizontal)
      .min_by(|&i, &j| {
        let (si, sj) = (&segs[i], &segs[j]);
        si.a
          .y
          .partial_cmp(&sj.a.y)
          .unwrap_or(std::cmp::Ordering::Equal)
          .then(
            si.left()
              .x
              .partial_cmp(&sj.left().x)
              .unwrap_or(std::cmp::Ordering::Equal),
          )
      });
    let Some(start_idx) = start_idx else {
      break;
    };

    used[start_idx] = true;
    let start_point = segs[start_idx].left();
    let mut points = vec![start_point];
    let mut current = segs[start_idx].other_end(start_point);
    let mut want_horizontal = false;

    while current != start_point {
      points.push(current);
      let next = by_endpoint
        .get(&point_key(current))
        .into_iter()
        .flatten()
        .copied()
        .filter(|&i| !used[i] && segs[i].horizontal == want_horizontal)
        .filter(|&i| segs[i].a == current || segs[i].b == current)
        .min_by(|&i, &j| {
          let pi = segs[i].other_end(current);
          let pj = segs[j].other_end(current);
          pi.y
            .partial_cmp(&pj.y)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(pi.x.partial_cmp(&pj.x).unwrap_or(std::cmp::Ordering::Equal))
        });
      let Some(next) = next else {
        // Open chain: only reachable on malformed segment soups.
        debug_assert!(false, "unclosed boundary cycle");
        break;
      };
      used[next] = true;
      current = segs[next].other_end(current);
      want_horizontal = !want_horizontal;
    }

    let mut path = Path::new(points);
    path.normalize();
    path.make_ccw();
    if !path.is_empty() {
      paths.push(path);
    }
  }

  Polygon::new(paths)
}
