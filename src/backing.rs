//! Backing: chunked spatial store of placed rectangles
//!
//! The rocks layouts place every fragment into a backing and afterwards
//! refer to it only by integer index (insertion order, which equals both
//! document order and timetable column order). Rectangles move many times
//! while the layout walk ascends, so the store is an arena: handles stay
//! stable, `translate_range` moves a contiguous run in O(k), and no
//! caller holds a rectangle reference across a translation.
//!
//! For the leading query the store buckets rectangle indices into
//! horizontal chunks of fixed height keyed by the rectangle's bottom
//! edge. A rectangle's chunk is recomputed on every translate; a spatial
//! scan visits chunks bottom-up and can stop as soon as no remaining
//! chunk can beat the best candidate.

use crate::error::{RegionError, Result};
use crate::geometry::{Point, Rect};
use rustc_hash::FxHashMap;

/// Vertical extent of one chunk bucket in layout pixels.
pub const CHUNK_HEIGHT: f32 = 256.0;

/// A placed entry: a fragment rectangle or a spacer.
#[derive(Debug, Clone, PartialEq)]
pub enum Slot {
  Rect {
    rect: Rect,
    /// Full cumulative padding of the wrap stack over this fragment,
    /// used to bound spatial scans
    max_padding: f32,
  },
  Spacer { width: f32 },
}

/// An interval of contiguous backing indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
  pub begin: usize,
  pub end: usize,
}

impl Range {
  pub fn new(begin: usize, end: usize) -> Self {
    Self { begin, end }
  }

  pub fn len(&self) -> usize {
    self.end - self.begin
  }

  pub fn is_empty(&self) -> bool {
    self.begin == self.end
  }

  pub fn indices(&self) -> std::ops::Range<usize> {
    self.begin..self.end
  }
}

/// The spatial scope of a laid-out sub-tree: a contiguous index range
/// plus the number of wrap layers above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
  Empty,
  Span { range: Range, depth: usize },
}

impl Region {
  /// Region of a single freshly appended fragment.
  pub fn single(index: usize) -> Self {
    Region::Span {
      range: Range::new(index, index + 1),
      depth: 0,
    }
  }

  pub fn range(&self) -> Option<Range> {
    match self {
      Region::Empty => None,
      Region::Span { range, .. } => Some(*range),
    }
  }

  /// One more wrap layer above the fragments.
  pub fn widen(self) -> Self {
    match self {
      Region::Empty => Region::Empty,
      Region::Span { range, depth } => Region::Span {
        range,
        depth: depth + 1,
      },
    }
  }

  /// Composes two regions by adjacency. The left region's range must end
  /// exactly where the right one begins; the joined depth is the
  /// shallower of the two. Non-adjacent ranges are an invariant
  /// violation.
  pub fn join(a: Region, b: Region) -> Result<Region> {
    match (a, b) {
      (Region::Empty, r) | (r, Region::Empty) => Ok(r),
      (
        Region::Span {
          range: ra,
          depth: da,
        },
        Region::Span {
          range: rb,
          depth: db,
        },
      ) => {
        if ra.end != rb.begin {
          return Err(
            RegionError::NonAdjacentRanges {
              a_begin: ra.begin,
              a_end: ra.end,
              b_begin: rb.begin,
              b_end: rb.end,
            }
            .into(),
          );
        }
        Ok(Region::Span {
          range: Range::new(ra.begin, rb.end),
          depth: da.min(db),
        })
      }
    }
  }
}

/// Chunked arena of placed rectangles and spacers.
#[derive(Debug, Default)]
pub struct Backing {
  slots: Vec<Slot>,
  /// Parallel to `slots`: current chunk key (rect slots only)
  chunk_of: Vec<i64>,
  chunks: FxHashMap<i64, Vec<usize>>,
  max_padding: f32,
}

impl Backing {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.slots.len()
  }

  pub fn is_empty(&self) -> bool {
    self.slots.is_empty()
  }

  /// Largest `max_padding` seen across all appended rectangles.
  pub fn max_padding(&self) -> f32 {
    self.max_padding
  }

  pub fn append_rect(&mut self, rect: Rect, max_padding: f32) -> usize {
    let index = self.slots.len();
    let key = chunk_key(rect);
    self.slots.push(Slot::Rect { rect, max_padding });
    self.chunk_of.push(key);
    self.chunks.entry(key).or_default().push(index);
    self.max_padding = self.max_padding.max(max_padding);
    index
  }

  pub fn append_spacer(&mut self, width: f32) -> usize {
    let index = self.slots.len();
    self.slots.push(Slot::Spacer { width });
    self.chunk_of.push(0);
    index
  }

  pub fn slot(&self, index: usize) -> Option<&Slot> {
    self.slots.get(index)
  }

  /// Rectangle of a fragment slot, `None` for spacers.
  pub fn rect(&self, index: usize) -> Option<Rect> {
    match self.slots.get(index) {
      Some(Slot::Rect { rect, .. }) => Some(*rect),
      _ => None,
    }
  }

  /// Translates every slot in `range` by `v`, re-bucketing moved
  /// rectangles whose chunk changed.
  pub fn translate_range(&mut self, range: Range, v: Point) {
    for index in range.indices() {
      let Some(Slot::Rect { rect, .. }) = self.slots.get_mut(index) else {
        continue;
      };
      *rect = rect.translate(v);
      let new_key = chunk_key(*rect);
      let old_key = self.chunk_of[index];
      if new_key != old_key {
        if let Some(bucket) = self.chunks.get_mut(&old_key) {
          if let Some(pos) = bucket.iter().position(|&i| i == index) {
            bucket.swap_remove(pos);
          }
        }
        self.chunks.entry(new_key).or_default().push(index);
        self.chunk_of[index] = new_key;
      }
    }
  }

  /// Lazy walk over backing indices in a range.
  pub fn enumerate_indices(&self, range: Range) -> impl Iterator<Item = usize> {
    range.indices()
  }

  /// Chunks in descending key order (bottom-most first). Each item is
  /// the chunk key and the indices currently bucketed there.
  pub fn iter_chunks_desc(&self) -> impl Iterator<Item = (i64, &[usize])> + '_ {
    let mut keys: Vec<i64> = self.chunks.keys().copied().collect();
    keys.sort_unstable_by(|a, b| b.cmp(a));
    keys.into_iter().filter_map(move |key| {
      let bucket = self.chunks.get(&key)?;
      if bucket.is_empty() {
        None
      } else {
        Some((key, bucket.as_slice()))
      }
    })
  }

  /// Upper bound on the bottom edge of any rectangle in chunk `key`.
  pub fn chunk_bottom_bound(key: i64) -> f32 {
    (key + 1) as f32 * CHUNK_HEIGHT
  }
}

fn chunk_key(rect: Rect) -> i64 {
  (rect.max_y() / CHUNK_HEIGHT).floor() as i64
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_append_and_lookup() {
    let mut backing = Backing::new();
    let a = backing.append_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0), 2.0);
    let s = backing.append_spacer(4.0);
    let b = backing.append_rect(Rect::from_xywh(10.0, 0.0, 10.0, 10.0), 6.0);
    assert_eq!((a, s, b), (0, 1, 2));
    assert_eq!(backing.rect(0), Some(Rect::from_xywh(0.0, 0.0, 10.0, 10.0)));
    assert_eq!(backing.rect(1), None);
    assert_eq!(backing.max_padding(), 6.0);
  }

  #[test]
  fn test_translate_rebuckets() {
    let mut backing = Backing::new();
    backing.append_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0), 0.0);
    backing.translate_range(Range::new(0, 1), Point::new(0.0, CHUNK_HEIGHT * 3.0));
    assert_eq!(
      backing.rect(0),
      Some(Rect::from_xywh(0.0, CHUNK_HEIGHT * 3.0, 10.0, 10.0))
    );
    let chunks: Vec<i64> = backing.iter_chunks_desc().map(|(k, _)| k).collect();
    assert_eq!(chunks, vec![3]);
  }

  #[test]
  fn test_chunks_descend() {
    let mut backing = Backing::new();
    backing.append_rect(Rect::from_xywh(0.0, 0.0, 10.0, 10.0), 0.0);
    backing.append_rect(Rect::from_xywh(0.0, CHUNK_HEIGHT, 10.0, 10.0), 0.0);
    backing.append_rect(Rect::from_xywh(0.0, -CHUNK_HEIGHT, 10.0, 10.0), 0.0);
    let keys: Vec<i64> = backing.iter_chunks_desc().map(|(k, _)| k).collect();
    assert_eq!(keys, vec![1, 0, -1]);
  }

  #[test]
  fn test_region_join_adjacent() {
    let a = Region::Span {
      range: Range::new(0, 2),
      depth: 2,
    };
    let b = Region::Span {
      range: Range::new(2, 5),
      depth: 1,
    };
    let joined = Region::join(a, b).unwrap();
    assert_eq!(
      joined,
      Region::Span {
        range: Range::new(0, 5),
        depth: 1,
      }
    );
  }

  #[test]
  fn test_region_join_gap_is_fatal() {
    let a = Region::Span {
      range: Range::new(0, 2),
      depth: 0,
    };
    let b = Region::Span {
      range: Range::new(3, 4),
      depth: 0,
    };
    assert!(Region::join(a, b).is_err());
  }

  #[test]
  fn test_region_join_empty() {
    let r = Region::single(7);
    assert_eq!(Region::join(Region::Empty, r).unwrap(), r);
    assert_eq!(Region::join(r, Region::Empty).unwrap(), r);
  }

  #[test]
  fn test_widen() {
    let r = Region::single(0).widen().widen();
    assert_eq!(
      r,
      Region::Span {
        range: Range::new(0, 1),
        depth: 2,
      }
    );
  }
}
