//! JSON snapshots of layout results
//!
//! Serialize-only mirror of the result surface, for golden tests and
//! external diffing tools. The mirror structs keep the wire shape
//! decoupled from the in-memory types.

use crate::geometry::Rect;
use crate::layout::LayoutResult;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct SnapshotFile {
  fragments: Vec<FragmentSnapshot>,
  outlines: Vec<OutlineSnapshot>,
  bounding_box: Option<RectSnapshot>,
}

#[derive(Serialize)]
struct FragmentSnapshot {
  text: String,
  rect: RectSnapshot,
  line_no: usize,
}

#[derive(Serialize)]
struct OutlineSnapshot {
  uid: u32,
  paths: Vec<Vec<[f32; 2]>>,
}

#[derive(Serialize)]
struct RectSnapshot {
  x: f32,
  y: f32,
  width: f32,
  height: f32,
}

impl From<Rect> for RectSnapshot {
  fn from(rect: Rect) -> Self {
    Self {
      x: rect.x(),
      y: rect.y(),
      width: rect.width(),
      height: rect.height(),
    }
  }
}

/// Writes a pretty-printed JSON snapshot of a layout result.
pub fn write_snapshot(result: &LayoutResult, out: &mut dyn Write) -> std::io::Result<()> {
  let file = SnapshotFile {
    fragments: result
      .fragments_info()
      .map(|f| FragmentSnapshot {
        text: f.text.clone(),
        rect: f.rect.into(),
        line_no: f.line_no,
      })
      .collect(),
    outlines: result
      .wrap_outlines()
      .iter()
      .map(|o| OutlineSnapshot {
        uid: o.uid,
        paths: o
          .polygon
          .paths
          .iter()
          .map(|p| p.points.iter().map(|pt| [pt.x, pt.y]).collect())
          .collect(),
      })
      .collect(),
    bounding_box: result.bounding_box().map(RectSnapshot::from),
  };
  let json = serde_json::to_vec_pretty(&file)?;
  out.write_all(&json)
}

/// Snapshot as a string, for assertions in tests.
pub fn snapshot_string(result: &LayoutResult) -> String {
  let mut buf = Vec::new();
  write_snapshot(result, &mut buf).expect("writing to a Vec cannot fail");
  String::from_utf8(buf).expect("serde_json emits UTF-8")
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::control::LayoutDeadline;
  use crate::layout::{layout, Algorithm};
  use crate::measure::MonospaceMeasurer;
  use crate::tree::LayoutTree;

  #[test]
  fn test_snapshot_shape() {
    let result = layout(
      &LayoutTree::node(0.0, vec![LayoutTree::atom("hi")]),
      &MonospaceMeasurer::default(),
      &Algorithm::Blocks,
      &LayoutDeadline::none(),
    )
    .unwrap();
    let json = snapshot_string(&result);
    assert!(json.contains("\"fragments\""));
    assert!(json.contains("\"hi\""));
    assert!(json.contains("\"bounding_box\""));
  }
}
