//! Error types for raggedblocks
//!
//! Fatal errors are internal invariant violations: a malformed
//! reassociation token stream, a non-axis-aligned segment handed to the
//! polygon kernel, or a region join across non-adjacent backing ranges.
//! None of them is reachable from a valid input tree; they indicate a
//! caller or implementation bug and propagate to the driver unchanged.
//!
//! Cooperative cancellation is not an error in the usual sense but it
//! travels the same path: long loops poll a [`crate::control::LayoutDeadline`]
//! and return [`Error::Aborted`] from a checkpoint instead of unwinding.
//!
//! All enums use `thiserror` for the trait plumbing.

use thiserror::Error;

/// Result type alias for raggedblocks operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
  /// Reassociation token-stream invariant violation
  #[error("Reassociation error: {0}")]
  Reassoc(#[from] ReassocError),

  /// Polygon kernel invariant violation
  #[error("Geometry error: {0}")]
  Geometry(#[from] GeometryError),

  /// Backing region invariant violation
  #[error("Region error: {0}")]
  Region(#[from] RegionError),

  /// Cooperative cancellation; reported from a checkpoint, not thrown
  #[error("layout aborted")]
  Aborted,
}

impl Error {
  /// True when this outcome is the cooperative-cancellation sentinel.
  pub fn is_aborted(&self) -> bool {
    matches!(self, Error::Aborted)
  }
}

/// Errors raised while parsing the reassociation token stream.
///
/// Never produced for a valid input tree; the emitter inserts sentinel
/// atoms wherever two operators would otherwise be adjacent.
#[derive(Error, Debug, Clone)]
pub enum ReassocError {
  /// An operator token had no expression to its left
  #[error("operator at token {position} has no left operand")]
  MissingOperand { position: usize },

  /// Two expression tokens were adjacent, or the stream ended inside an
  /// operator
  #[error("malformed token stream at token {position}: {message}")]
  MalformedStream { position: usize, message: String },
}

/// Errors raised by the rectilinear polygon kernel.
#[derive(Error, Debug, Clone)]
pub enum GeometryError {
  /// A segment that is neither horizontal nor vertical was handed to
  /// `mk_recti_segment`
  #[error("segment ({x1}, {y1}) -> ({x2}, {y2}) is not axis-aligned")]
  NotAxisAligned { x1: f32, y1: f32, x2: f32, y2: f32 },
}

/// Errors raised by the backing's region algebra.
#[derive(Error, Debug, Clone)]
pub enum RegionError {
  /// `join_regions` was called on ranges that are not adjacent
  #[error("cannot join regions over [{a_begin}, {a_end}) and [{b_begin}, {b_end})")]
  NonAdjacentRanges {
    a_begin: usize,
    a_end: usize,
    b_begin: usize,
    b_end: usize,
  },

  /// A backing index outside the store was dereferenced
  #[error("backing index {index} out of bounds (len {len})")]
  IndexOutOfBounds { index: usize, len: usize },
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_error_display() {
    let err = Error::from(GeometryError::NotAxisAligned {
      x1: 0.0,
      y1: 0.0,
      x2: 1.0,
      y2: 1.0,
    });
    let msg = err.to_string();
    assert!(msg.contains("not axis-aligned"), "{msg}");
  }

  #[test]
  fn test_aborted_is_distinguished() {
    assert!(Error::Aborted.is_aborted());
    let other = Error::from(RegionError::NonAdjacentRanges {
      a_begin: 0,
      a_end: 2,
      b_begin: 3,
      b_end: 4,
    });
    assert!(!other.is_aborted());
  }
}
