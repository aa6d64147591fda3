//! Cooperative cancellation for long-running layout work
//!
//! The core is single-threaded and purely computational, but a driver may
//! run it on a background executor and want to bail out of a large
//! document. A [`LayoutDeadline`] is threaded through the two loops that
//! dominate wall-clock time (line stacking and the polygon-simplification
//! fixed point); each iteration polls [`LayoutDeadline::check`] and
//! returns [`Error::Aborted`](crate::Error::Aborted) when the deadline
//! has passed or the cancel callback fires. Partial state built before
//! the abort is dropped with the call frame.

use crate::error::{Error, Result};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Callback used to cooperatively cancel layout work.
pub type CancelCallback = dyn Fn() -> bool + Send + Sync;

/// Tracks layout start time and enforces an optional timeout or external
/// cancellation.
#[derive(Clone, Default)]
pub struct LayoutDeadline {
  inner: Option<DeadlineState>,
}

#[derive(Clone)]
struct DeadlineState {
  start: Instant,
  timeout: Option<Duration>,
  cancel: Option<Arc<CancelCallback>>,
}

impl LayoutDeadline {
  /// Creates a deadline tracker starting at the current instant.
  pub fn new(timeout: Option<Duration>, cancel: Option<Arc<CancelCallback>>) -> Self {
    Self {
      inner: Some(DeadlineState {
        start: Instant::now(),
        timeout,
        cancel,
      }),
    }
  }

  /// A disabled deadline that never triggers.
  pub fn none() -> Self {
    Self { inner: None }
  }

  /// Deadline driven only by an external cancel callback.
  pub fn cancelled_by(cancel: Arc<CancelCallback>) -> Self {
    Self::new(None, Some(cancel))
  }

  /// True once the timeout elapsed or the cancel callback returned true.
  pub fn expired(&self) -> bool {
    let Some(state) = &self.inner else {
      return false;
    };
    if let Some(timeout) = state.timeout {
      if state.start.elapsed() >= timeout {
        return true;
      }
    }
    match &state.cancel {
      Some(cancel) => cancel(),
      None => false,
    }
  }

  /// Checkpoint: returns `Err(Error::Aborted)` once expired.
  pub fn check(&self) -> Result<()> {
    if self.expired() {
      Err(Error::Aborted)
    } else {
      Ok(())
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::sync::atomic::{AtomicBool, Ordering};

  #[test]
  fn test_none_never_expires() {
    let deadline = LayoutDeadline::none();
    assert!(!deadline.expired());
    assert!(deadline.check().is_ok());
  }

  #[test]
  fn test_zero_timeout_expires() {
    let deadline = LayoutDeadline::new(Some(Duration::ZERO), None);
    assert!(deadline.expired());
    assert!(matches!(deadline.check(), Err(Error::Aborted)));
  }

  #[test]
  fn test_cancel_callback() {
    let flag = Arc::new(AtomicBool::new(false));
    let flag2 = flag.clone();
    let deadline = LayoutDeadline::cancelled_by(Arc::new(move || flag2.load(Ordering::Relaxed)));
    assert!(deadline.check().is_ok());
    flag.store(true, Ordering::Relaxed);
    assert!(matches!(deadline.check(), Err(Error::Aborted)));
  }
}
