//! Reassociation: measured tree to binary join tree
//!
//! Newlines in the input are separators, not content. This pass rewrites
//! each node's child list into an expression over two binary operators:
//! an explicit newline (vertical join, precedence 1) and the implicit
//! adjacency between siblings (horizontal join, precedence 2). The ends
//! of a child list act as a sentinel operator of precedence 0. Parsing
//! the resulting token stream with a precedence climber yields a binary
//! tree in which no two operators were adjacent; wherever the source had
//! leading, trailing or doubled newlines, an empty atom is inserted so
//! blank rows survive as zero-width fragments.
//!
//! Each original interior node becomes exactly one [`ReassocTree::Wrap`].

use crate::error::{ReassocError, Result};
use crate::geometry::Rect;
use crate::style::WrapStyle;
use crate::tree::MeasuredTree;

/// Binary tree over horizontal joins, vertical joins and wraps.
#[derive(Debug, Clone, PartialEq)]
pub enum ReassocTree {
  Atom { text: String, rect: Rect },
  Spacer { width: f32 },
  JoinH(Box<ReassocTree>, Box<ReassocTree>),
  JoinV(Box<ReassocTree>, Box<ReassocTree>),
  Wrap {
    child: Box<ReassocTree>,
    padding: f32,
    style: Option<WrapStyle>,
  },
}

impl ReassocTree {
  fn empty(rect: Rect) -> Self {
    ReassocTree::Atom {
      text: String::new(),
      rect,
    }
  }

  /// True for the zero-width sentinel inserted around newlines.
  pub fn is_empty_atom(&self) -> bool {
    matches!(self, ReassocTree::Atom { text, .. } if text.is_empty())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
  /// Stream boundary
  End,
  /// Explicit newline separator
  Newline,
  /// Implicit sibling adjacency
  Adjacent,
}

impl Op {
  fn precedence(self) -> u8 {
    match self {
      Op::End => 0,
      Op::Newline => 1,
      Op::Adjacent => 2,
    }
  }
}

#[derive(Debug)]
enum Token {
  Expr(ReassocTree),
  Op(Op),
}

/// Converts a measured tree into its binary reassociated form.
///
/// `empty` is the rectangle of an empty atom (normally
/// `measurer.measure("")`); it gives blank rows their height.
pub fn reassociate(tree: &MeasuredTree, empty: Rect) -> Result<ReassocTree> {
  Ok(reassoc_node(tree, empty)?)
}

fn reassoc_node(tree: &MeasuredTree, empty: Rect) -> std::result::Result<ReassocTree, ReassocError> {
  match tree {
    MeasuredTree::Atom { text, rect } => Ok(ReassocTree::Atom {
      text: text.clone(),
      rect: *rect,
    }),
    MeasuredTree::Spacer { width } => Ok(ReassocTree::Spacer { width: *width }),
    // A bare newline only occurs via a degenerate root; it reads as an
    // empty row above and below the break.
    MeasuredTree::Newline => Ok(ReassocTree::JoinV(
      Box::new(ReassocTree::empty(empty)),
      Box::new(ReassocTree::empty(empty)),
    )),
    MeasuredTree::Node {
      children,
      padding,
      style,
    } => {
      let stream = emit_tokens(children, empty)?;
      let child = parse_stream(stream, empty)?;
      Ok(ReassocTree::Wrap {
        child: Box::new(child),
        padding: *padding,
        style: style.clone(),
      })
    }
  }
}

/// Emits the alternating expression/operator token stream for a child
/// list. A newline adjacent to another operator (or to a stream end) gets
/// an empty-atom sentinel spliced in so alternation always holds.
fn emit_tokens(
  children: &[MeasuredTree],
  empty: Rect,
) -> std::result::Result<Vec<Token>, ReassocError> {
  let mut tokens: Vec<Token> = Vec::with_capacity(children.len() * 2);
  for child in children {
    match child {
      MeasuredTree::Newline => {
        if !matches!(tokens.last(), Some(Token::Expr(_))) {
          tokens.push(Token::Expr(ReassocTree::empty(empty)));
        }
        tokens.push(Token::Op(Op::Newline));
      }
      other => {
        if matches!(tokens.last(), Some(Token::Expr(_))) {
          tokens.push(Token::Op(Op::Adjacent));
        }
        tokens.push(Token::Expr(reassoc_node(other, empty)?));
      }
    }
  }
  if !matches!(tokens.last(), Some(Token::Expr(_))) {
    tokens.push(Token::Expr(ReassocTree::empty(empty)));
  }
  Ok(tokens)
}

struct Parser {
  tokens: std::vec::IntoIter<Token>,
  lookahead: Option<Token>,
  position: usize,
}

impl Parser {
  fn next(&mut self) -> Option<Token> {
    self.position += 1;
    self.lookahead.take().or_else(|| self.tokens.next())
  }

  fn peek_op(&mut self) -> std::result::Result<Op, ReassocError> {
    if self.lookahead.is_none() {
      self.lookahead = self.tokens.next();
    }
    match &self.lookahead {
      None => Ok(Op::End),
      Some(Token::Op(op)) => Ok(*op),
      Some(Token::Expr(_)) => Err(ReassocError::MalformedStream {
        position: self.position,
        message: "expected operator, found expression".to_string(),
      }),
    }
  }

  fn expect_expr(&mut self) -> std::result::Result<ReassocTree, ReassocError> {
    match self.next() {
      Some(Token::Expr(expr)) => Ok(expr),
      Some(Token::Op(_)) => Err(ReassocError::MissingOperand {
        position: self.position,
      }),
      None => Err(ReassocError::MalformedStream {
        position: self.position,
        message: "stream ended where an expression was expected".to_string(),
      }),
    }
  }

  /// Precedence climbing: an operator pair `(op1, op2)` with
  /// `prec(op1) >= prec(op2)` ends the left operand, so equal precedence
  /// associates left.
  fn parse(&mut self, min_prec: u8) -> std::result::Result<ReassocTree, ReassocError> {
    let mut lhs = self.expect_expr()?;
    loop {
      let op = self.peek_op()?;
      if op.precedence() <= min_prec {
        return Ok(lhs);
      }
      self.next();
      let rhs = self.parse(op.precedence())?;
      lhs = match op {
        Op::Newline => ReassocTree::JoinV(Box::new(lhs), Box::new(rhs)),
        Op::Adjacent => ReassocTree::JoinH(Box::new(lhs), Box::new(rhs)),
        Op::End => unreachable!("End never exceeds min_prec"),
      };
    }
  }
}

fn parse_stream(
  tokens: Vec<Token>,
  empty: Rect,
) -> std::result::Result<ReassocTree, ReassocError> {
  if tokens.is_empty() {
    return Ok(ReassocTree::empty(empty));
  }
  let mut parser = Parser {
    tokens: tokens.into_iter(),
    lookahead: None,
    position: 0,
  };
  let expr = parser.parse(Op::End.precedence())?;
  match parser.peek_op()? {
    Op::End => Ok(expr),
    other => Err(ReassocError::MalformedStream {
      position: parser.position,
      message: format!("dangling operator {other:?} after expression"),
    }),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::measure::{MonospaceMeasurer, TextMeasurer};
  use crate::tree::{measure_tree, LayoutTree};

  fn build(tree: &LayoutTree) -> ReassocTree {
    let m = MonospaceMeasurer::new(10.0, 8.0, 2.0);
    let measured = measure_tree(tree, &m);
    reassociate(&measured, m.measure("")).unwrap()
  }

  fn atom_texts(tree: &ReassocTree, out: &mut Vec<String>) {
    match tree {
      ReassocTree::Atom { text, .. } => out.push(text.clone()),
      ReassocTree::Spacer { .. } => {}
      ReassocTree::JoinH(l, r) | ReassocTree::JoinV(l, r) => {
        atom_texts(l, out);
        atom_texts(r, out);
      }
      ReassocTree::Wrap { child, .. } => atom_texts(child, out),
    }
  }

  #[test]
  fn test_adjacent_binds_tighter_than_newline() {
    let t = build(&LayoutTree::node(
      0.0,
      vec![
        LayoutTree::atom("a"),
        LayoutTree::newline(),
        LayoutTree::atom("b"),
        LayoutTree::atom("c"),
      ],
    ));
    let ReassocTree::Wrap { child, .. } = t else {
      panic!("node becomes wrap");
    };
    let ReassocTree::JoinV(l, r) = *child else {
      panic!("newline is the outermost join");
    };
    assert!(matches!(*l, ReassocTree::Atom { .. }));
    assert!(matches!(*r, ReassocTree::JoinH(_, _)));
  }

  #[test]
  fn test_newline_left_associates() {
    let t = build(&LayoutTree::node(
      0.0,
      vec![
        LayoutTree::atom("a"),
        LayoutTree::newline(),
        LayoutTree::atom("b"),
        LayoutTree::newline(),
        LayoutTree::atom("c"),
      ],
    ));
    let ReassocTree::Wrap { child, .. } = t else {
      panic!()
    };
    let ReassocTree::JoinV(l, _) = *child else {
      panic!()
    };
    assert!(matches!(*l, ReassocTree::JoinV(_, _)));
  }

  #[test]
  fn test_double_newline_inserts_blank_row() {
    let t = build(&LayoutTree::node(
      0.0,
      vec![
        LayoutTree::atom("a"),
        LayoutTree::newline(),
        LayoutTree::newline(),
        LayoutTree::atom("b"),
      ],
    ));
    let mut texts = Vec::new();
    atom_texts(&t, &mut texts);
    assert_eq!(texts, vec!["a", "", "b"]);
  }

  #[test]
  fn test_trailing_newline_gets_sentinel() {
    let t = build(&LayoutTree::node(
      0.0,
      vec![LayoutTree::atom("a"), LayoutTree::newline()],
    ));
    let mut texts = Vec::new();
    atom_texts(&t, &mut texts);
    assert_eq!(texts, vec!["a", ""]);
  }

  #[test]
  fn test_empty_children_become_empty_atom() {
    let t = build(&LayoutTree::node(3.0, vec![]));
    let ReassocTree::Wrap { child, padding, .. } = t else {
      panic!()
    };
    assert_eq!(padding, 3.0);
    assert!(child.is_empty_atom());
  }

  #[test]
  fn test_nested_node_is_single_expression() {
    let t = build(&LayoutTree::node(
      0.0,
      vec![
        LayoutTree::atom("a"),
        LayoutTree::node(1.0, vec![LayoutTree::atom("b")]),
      ],
    ));
    let ReassocTree::Wrap { child, .. } = t else {
      panic!()
    };
    let ReassocTree::JoinH(_, r) = *child else {
      panic!("adjacency joins atom and sub-wrap");
    };
    assert!(matches!(*r, ReassocTree::Wrap { padding, .. } if padding == 1.0));
  }

  #[test]
  fn test_only_newlines() {
    let t = build(&LayoutTree::node(
      0.0,
      vec![LayoutTree::newline(), LayoutTree::newline()],
    ));
    let mut texts = Vec::new();
    atom_texts(&t, &mut texts);
    assert_eq!(texts, vec!["", "", ""]);
  }
}
