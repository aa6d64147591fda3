//! Input layout tree
//!
//! The layout tree is what callers build: a rooted tree whose leaves are
//! text atoms, horizontal spacers and hard newlines, and whose interior
//! nodes carry uniform padding plus optional styling. Exactly one newline
//! between sibling groups produces one line break; N consecutive newlines
//! produce N blank rows.
//!
//! Before any algorithm runs, the tree is measured: every atom (and
//! text-bearing spacer) gets its baseline-relative rectangle from the
//! oracle. The measured tree is the input to reassociation.

use crate::geometry::Rect;
use crate::measure::TextMeasurer;
use crate::style::WrapStyle;

/// A node of the input layout tree.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutTree {
  /// A text fragment; leaf.
  Atom { text: String },
  /// Horizontal whitespace; leaf. Width is either explicit or measured
  /// from `text`.
  Spacer { text: Option<String>, width: Option<f32> },
  /// A hard break between siblings; leaf with no data.
  Newline,
  /// Interior node: ordered children, uniform non-negative padding and
  /// optional styling.
  Node {
    children: Vec<LayoutTree>,
    padding: f32,
    style: Option<WrapStyle>,
  },
}

impl LayoutTree {
  pub fn atom(text: impl Into<String>) -> Self {
    LayoutTree::Atom { text: text.into() }
  }

  pub fn spacer_text(text: impl Into<String>) -> Self {
    LayoutTree::Spacer {
      text: Some(text.into()),
      width: None,
    }
  }

  pub fn spacer_width(width: f32) -> Self {
    LayoutTree::Spacer {
      text: None,
      width: Some(width),
    }
  }

  pub fn newline() -> Self {
    LayoutTree::Newline
  }

  pub fn node(padding: f32, children: Vec<LayoutTree>) -> Self {
    LayoutTree::Node {
      children,
      padding,
      style: None,
    }
  }

  pub fn styled_node(padding: f32, style: WrapStyle, children: Vec<LayoutTree>) -> Self {
    LayoutTree::Node {
      children,
      padding,
      style: Some(style),
    }
  }

  /// Number of atoms in a left-to-right depth-first walk.
  pub fn atom_count(&self) -> usize {
    match self {
      LayoutTree::Atom { .. } => 1,
      LayoutTree::Spacer { .. } | LayoutTree::Newline => 0,
      LayoutTree::Node { children, .. } => children.iter().map(LayoutTree::atom_count).sum(),
    }
  }
}

/// Layout tree after measurement: atoms carry rectangles, spacers carry
/// resolved widths.
#[derive(Debug, Clone, PartialEq)]
pub enum MeasuredTree {
  Atom { text: String, rect: Rect },
  Spacer { width: f32 },
  Newline,
  Node {
    children: Vec<MeasuredTree>,
    padding: f32,
    style: Option<WrapStyle>,
  },
}

/// Applies the oracle to every atom and text spacer.
///
/// The oracle is consulted once per leaf; callers wanting cross-layout
/// memoization wrap it in [`crate::measure::CachingMeasurer`].
pub fn measure_tree(tree: &LayoutTree, measurer: &dyn TextMeasurer) -> MeasuredTree {
  match tree {
    LayoutTree::Atom { text } => MeasuredTree::Atom {
      text: text.clone(),
      rect: measurer.measure(text),
    },
    LayoutTree::Spacer { text, width } => {
      let width = match (text, width) {
        (_, Some(w)) => *w,
        (Some(t), None) => measurer.measure(t).width(),
        (None, None) => 0.0,
      };
      MeasuredTree::Spacer { width }
    }
    LayoutTree::Newline => MeasuredTree::Newline,
    LayoutTree::Node {
      children,
      padding,
      style,
    } => MeasuredTree::Node {
      children: children.iter().map(|c| measure_tree(c, measurer)).collect(),
      padding: padding.max(0.0),
      style: style.clone(),
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::measure::MonospaceMeasurer;

  #[test]
  fn test_measure_atoms_and_spacers() {
    let tree = LayoutTree::node(
      2.0,
      vec![
        LayoutTree::atom("ab"),
        LayoutTree::spacer_text(" "),
        LayoutTree::spacer_width(7.5),
      ],
    );
    let measured = measure_tree(&tree, &MonospaceMeasurer::new(10.0, 8.0, 2.0));
    let MeasuredTree::Node { children, .. } = measured else {
      panic!("expected node");
    };
    assert_eq!(
      children[0],
      MeasuredTree::Atom {
        text: "ab".to_string(),
        rect: Rect::from_ltrb(0.0, -8.0, 20.0, 2.0),
      }
    );
    assert_eq!(children[1], MeasuredTree::Spacer { width: 10.0 });
    assert_eq!(children[2], MeasuredTree::Spacer { width: 7.5 });
  }

  #[test]
  fn test_negative_padding_clamped() {
    let tree = LayoutTree::node(-3.0, vec![LayoutTree::atom("x")]);
    let MeasuredTree::Node { padding, .. } =
      measure_tree(&tree, &MonospaceMeasurer::default())
    else {
      panic!("expected node");
    };
    assert_eq!(padding, 0.0);
  }

  #[test]
  fn test_atom_count() {
    let tree = LayoutTree::node(
      0.0,
      vec![
        LayoutTree::atom("a"),
        LayoutTree::newline(),
        LayoutTree::node(1.0, vec![LayoutTree::atom("b"), LayoutTree::atom("c")]),
      ],
    );
    assert_eq!(tree.atom_count(), 3);
  }
}
