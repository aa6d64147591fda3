//! Text-measurement oracle
//!
//! Layout never inspects glyphs. Every atom's extent comes from an
//! external [`TextMeasurer`], which reports a baseline-relative rectangle:
//! `left = 0`, `right >= 0`, `top <= 0 <= bottom`. The oracle must be
//! deterministic; the core consults it exactly once per atom per layout
//! call. [`CachingMeasurer`] memoizes results by text value so repeated
//! layouts of the same document skip the oracle entirely.

use crate::geometry::Rect;
use std::cell::RefCell;
use std::num::NonZeroUsize;

use lru::LruCache;

/// Oracle mapping a text fragment to its baseline-relative extent.
///
/// The returned rectangle satisfies `min_x() == 0`, `max_x() >= 0` and
/// `min_y() <= 0 <= max_y()` (y = 0 is the baseline).
pub trait TextMeasurer {
  fn measure(&self, text: &str) -> Rect;
}

/// Fixed-advance oracle for tests, demos and snapshot tooling.
///
/// Every `char` advances by `advance`; the vertical extent is
/// `[-ascent, descent]` regardless of content. An empty string measures
/// as a zero-width rectangle with the same vertical extent, which keeps
/// blank-row sentinels the height of a normal line.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMeasurer {
  pub advance: f32,
  pub ascent: f32,
  pub descent: f32,
}

impl MonospaceMeasurer {
  pub fn new(advance: f32, ascent: f32, descent: f32) -> Self {
    Self {
      advance,
      ascent,
      descent,
    }
  }
}

impl Default for MonospaceMeasurer {
  fn default() -> Self {
    Self {
      advance: 10.0,
      ascent: 12.0,
      descent: 4.0,
    }
  }
}

impl TextMeasurer for MonospaceMeasurer {
  fn measure(&self, text: &str) -> Rect {
    let chars = text.chars().count() as f32;
    Rect::from_ltrb(0.0, -self.ascent, chars * self.advance, self.descent)
  }
}

/// Memoizing wrapper over any oracle.
///
/// Measurements are cached by text value in an LRU map; the cap bounds
/// memory on adversarial documents while keeping the common
/// every-fragment-hits case O(1).
pub struct CachingMeasurer<M> {
  inner: M,
  cache: RefCell<LruCache<String, Rect>>,
}

impl<M: TextMeasurer> CachingMeasurer<M> {
  const DEFAULT_CAPACITY: usize = 4096;

  pub fn new(inner: M) -> Self {
    Self::with_capacity(inner, Self::DEFAULT_CAPACITY)
  }

  pub fn with_capacity(inner: M, capacity: usize) -> Self {
    let cap = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
    Self {
      inner,
      cache: RefCell::new(LruCache::new(cap)),
    }
  }
}

impl<M: TextMeasurer> TextMeasurer for CachingMeasurer<M> {
  fn measure(&self, text: &str) -> Rect {
    let mut cache = self.cache.borrow_mut();
    if let Some(rect) = cache.get(text) {
      return *rect;
    }
    let rect = self.inner.measure(text);
    cache.put(text.to_string(), rect);
    rect
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::Cell;

  #[test]
  fn test_monospace_measure() {
    let m = MonospaceMeasurer::new(10.0, 8.0, 2.0);
    let r = m.measure("ab");
    assert_eq!(r, Rect::from_ltrb(0.0, -8.0, 20.0, 2.0));
  }

  #[test]
  fn test_monospace_empty_text() {
    let m = MonospaceMeasurer::default();
    let r = m.measure("");
    assert_eq!(r.width(), 0.0);
    assert!(r.min_y() < 0.0 && r.max_y() > 0.0);
  }

  struct CountingMeasurer<'a> {
    calls: &'a Cell<usize>,
  }

  impl TextMeasurer for CountingMeasurer<'_> {
    fn measure(&self, text: &str) -> Rect {
      self.calls.set(self.calls.get() + 1);
      MonospaceMeasurer::default().measure(text)
    }
  }

  #[test]
  fn test_cache_hits_once_per_value() {
    let calls = Cell::new(0);
    let cached = CachingMeasurer::new(CountingMeasurer { calls: &calls });
    cached.measure("xyz");
    cached.measure("xyz");
    cached.measure("xyz");
    assert_eq!(calls.get(), 1);
    cached.measure("other");
    assert_eq!(calls.get(), 2);
  }
}
