//! Layout algorithms
//!
//! Five algorithms transform a measured tree into positioned fragments
//! plus a renderable scene:
//!
//! - **L1P** (`pebble`): baseline cell-stack layout; every fragment
//!   carries its own stack of padded rectangles.
//! - **L1S** (`rocks`): backing + timetable layout; leading queries run
//!   against the chunked backing.
//! - **L1S+**: L1S plus per-wrap rectilinear outlines, optionally
//!   simplified inside the parent outline and outside sibling outlines.
//! - **Blocks** (`blocks`): naive rectangular nesting where every
//!   ancestor's padding separates lines.
//! - **S-Blocks** (`sblocks`): horizontal sweep with gadget-based
//!   outline construction.
//!
//! All of them produce the same [`LayoutResult`] surface: fragments in
//! document order, per-wrap outlines where the algorithm builds them, a
//! flat [`Scene`] display list and a bounding box.

pub mod blocks;
mod lines;
pub mod pebble;
pub mod rocks;
pub mod sblocks;

use crate::control::LayoutDeadline;
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::measure::TextMeasurer;
use crate::poly::Polygon;
use crate::reassoc::reassociate;
use crate::render::svg::{border_path_data, closed_path_data};
use crate::render::target::{RenderTarget, ShapeStyle};
use crate::render::Renderable;
use crate::style::{Color, Font, Stroke, WrapStyle};
use crate::tree::{measure_tree, LayoutTree};

/// A placed text fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentInfo {
  pub text: String,
  pub rect: Rect,
  pub line_no: usize,
}

/// The outline computed for one wrap (L1S+, S-Blocks, Blocks).
#[derive(Debug, Clone)]
pub struct WrapOutline {
  pub uid: u32,
  pub polygon: Polygon,
}

/// One paint operation of a layout's renderable scene.
#[derive(Debug, Clone)]
pub enum SceneItem {
  /// Solid rectangle
  Fill { rect: Rect, color: Color },
  /// A wrap outline: filled polygon plus optional stroked borders
  Outline { polygon: Polygon, style: WrapStyle },
  /// A text run anchored at the left end of its baseline
  TextRun { text: String, origin: Point },
}

/// Flat display list replayed onto a render target.
#[derive(Debug, Clone)]
pub struct Scene {
  pub items: Vec<SceneItem>,
  pub font: Font,
  pub text_color: Color,
}

impl Default for Scene {
  fn default() -> Self {
    Self {
      items: Vec::new(),
      font: Font::default(),
      text_color: Color::BLACK,
    }
  }
}

impl Scene {
  pub fn render(&self, target: &mut dyn RenderTarget) {
    for item in &self.items {
      match item {
        SceneItem::Fill { rect, color } => {
          target.rect(*rect, &ShapeStyle::filled(*color));
        }
        SceneItem::Outline { polygon, style } => {
          render_outline(polygon, style, target);
        }
        SceneItem::TextRun { text, origin } => {
          target.text(text, *origin, &self.font, self.text_color);
        }
      }
    }
  }
}

fn render_outline(polygon: &Polygon, style: &WrapStyle, target: &mut dyn RenderTarget) {
  let radius = style.borders.first().map_or(0.0, |b| b.radius);
  if let Some(fill) = style.fill {
    let mut d = String::new();
    for path in &polygon.paths {
      if path.is_empty() {
        continue;
      }
      if !d.is_empty() {
        d.push(' ');
      }
      d.push_str(&closed_path_data(path, radius));
    }
    if !d.is_empty() {
      target.path(&d, &ShapeStyle::filled(fill));
    }
  }
  for border in &style.borders {
    let style = ShapeStyle::stroked(Stroke {
      color: border.color,
      width: border.width,
    });
    for path in &polygon.paths {
      for fragment in border_path_data(path, border) {
        target.path(&fragment, &style);
      }
    }
  }
}

/// Output of any layout algorithm.
#[derive(Debug, Clone, Default)]
pub struct LayoutResult {
  fragments: Vec<FragmentInfo>,
  outlines: Vec<WrapOutline>,
  scene: Scene,
  bounding: Option<Rect>,
}

impl LayoutResult {
  pub(crate) fn assemble(
    fragments: Vec<FragmentInfo>,
    outlines: Vec<WrapOutline>,
    scene: Scene,
    bounding: Option<Rect>,
  ) -> Self {
    Self {
      fragments,
      outlines,
      scene,
      bounding,
    }
  }

  /// The empty result: no fragments, no bounding box.
  pub fn empty() -> Self {
    Self::default()
  }

  /// Fragments in document order; `line_no` is non-decreasing.
  pub fn fragments_info(&self) -> impl Iterator<Item = &FragmentInfo> + '_ {
    self.fragments.iter()
  }

  pub fn fragments(&self) -> &[FragmentInfo] {
    &self.fragments
  }

  /// Per-wrap outlines, pre-order (parents before children). Empty for
  /// algorithms that do not build outlines.
  pub fn wrap_outlines(&self) -> &[WrapOutline] {
    &self.outlines
  }

  pub fn bounding_box(&self) -> Option<Rect> {
    self.bounding
  }

  pub fn render_to(&self, target: &mut dyn RenderTarget) {
    self.scene.render(target);
  }
}

impl Renderable for LayoutResult {
  fn render(&self, target: &mut dyn RenderTarget) {
    self.scene.render(target);
  }

  fn bounding_box(&self) -> Option<Rect> {
    self.bounding
  }
}

/// Settings for the pebble (L1P) layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PebbleSettings {
  /// G2 wrap-origin convention: wraps shift their content right by the
  /// padding. `false` selects G1, which leaves content in place and
  /// moves the origin instead.
  pub translate_wraps: bool,
  /// Minimum baseline-to-baseline distance between lines
  pub ideal_leading: f32,
}

impl Default for PebbleSettings {
  fn default() -> Self {
    Self {
      translate_wraps: true,
      ideal_leading: 16.0,
    }
  }
}

/// Settings for the rocks (L1S) layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocksSettings {
  pub translate_wraps: bool,
  pub ideal_leading: f32,
}

impl Default for RocksSettings {
  fn default() -> Self {
    Self {
      translate_wraps: true,
      ideal_leading: 16.0,
    }
  }
}

/// Settings for the outlined rocks (L1S+) layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RocksPlusSettings {
  pub translate_wraps: bool,
  pub ideal_leading: f32,
  /// Run antiknob/clockwise-corner simplification on each outline
  pub enable_simplification: bool,
}

impl Default for RocksPlusSettings {
  fn default() -> Self {
    Self {
      translate_wraps: true,
      ideal_leading: 16.0,
      enable_simplification: true,
    }
  }
}

/// Settings for the S-Blocks layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SBlocksSettings {
  pub ideal_leading: f32,
}

impl Default for SBlocksSettings {
  fn default() -> Self {
    Self { ideal_leading: 16.0 }
  }
}

/// Algorithm selection: a closed enum owning the per-algorithm settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Algorithm {
  L1p(PebbleSettings),
  L1s(RocksSettings),
  L1sPlus(RocksPlusSettings),
  Blocks,
  SBlocks(SBlocksSettings),
}

impl Algorithm {
  /// Name the driver uses to select the algorithm.
  pub fn name(&self) -> &'static str {
    match self {
      Algorithm::L1p(_) => "L1P",
      Algorithm::L1s(_) => "L1S",
      Algorithm::L1sPlus(_) => "L1S+",
      Algorithm::Blocks => "Blocks",
      Algorithm::SBlocks(_) => "S-Blocks",
    }
  }

  /// Default-configured algorithm by name, `None` for unknown names.
  pub fn by_name(name: &str) -> Option<Algorithm> {
    match name {
      "L1P" => Some(Algorithm::L1p(PebbleSettings::default())),
      "L1S" => Some(Algorithm::L1s(RocksSettings::default())),
      "L1S+" => Some(Algorithm::L1sPlus(RocksPlusSettings::default())),
      "Blocks" => Some(Algorithm::Blocks),
      "S-Blocks" => Some(Algorithm::SBlocks(SBlocksSettings::default())),
      _ => None,
    }
  }
}

/// Value of one UI-facing setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingValue {
  Toggle(bool),
  Number(f32),
}

/// One row of the generic settings descriptor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SettingView {
  pub name: &'static str,
  pub description: &'static str,
  pub value: SettingValue,
}

const TRANSLATE_WRAPS: &str = "Translate wraps";
const IDEAL_LEADING: &str = "Ideal leading";
const ENABLE_SIMPLIFICATION: &str = "Simplify outlines";

impl Algorithm {
  /// Uniform settings descriptor so a UI can render controls without
  /// per-algorithm code.
  pub fn view_settings(&self) -> Vec<SettingView> {
    match self {
      Algorithm::L1p(s) => vec![
        toggle_view(TRANSLATE_WRAPS, s.translate_wraps),
        leading_view(s.ideal_leading),
      ],
      Algorithm::L1s(s) => vec![
        toggle_view(TRANSLATE_WRAPS, s.translate_wraps),
        leading_view(s.ideal_leading),
      ],
      Algorithm::L1sPlus(s) => vec![
        toggle_view(TRANSLATE_WRAPS, s.translate_wraps),
        leading_view(s.ideal_leading),
        SettingView {
          name: ENABLE_SIMPLIFICATION,
          description: "Remove antiknobs and clockwise corners from outlines",
          value: SettingValue::Toggle(s.enable_simplification),
        },
      ],
      Algorithm::Blocks => Vec::new(),
      Algorithm::SBlocks(s) => vec![leading_view(s.ideal_leading)],
    }
  }

  /// Clone-and-update: returns a copy with the named setting replaced.
  /// Unknown names and mismatched value kinds leave the copy unchanged.
  pub fn with_setting(&self, name: &str, value: SettingValue) -> Algorithm {
    let mut updated = *self;
    match (&mut updated, name, value) {
      (Algorithm::L1p(s), TRANSLATE_WRAPS, SettingValue::Toggle(v)) => s.translate_wraps = v,
      (Algorithm::L1p(s), IDEAL_LEADING, SettingValue::Number(v)) => s.ideal_leading = v,
      (Algorithm::L1s(s), TRANSLATE_WRAPS, SettingValue::Toggle(v)) => s.translate_wraps = v,
      (Algorithm::L1s(s), IDEAL_LEADING, SettingValue::Number(v)) => s.ideal_leading = v,
      (Algorithm::L1sPlus(s), TRANSLATE_WRAPS, SettingValue::Toggle(v)) => {
        s.translate_wraps = v
      }
      (Algorithm::L1sPlus(s), IDEAL_LEADING, SettingValue::Number(v)) => s.ideal_leading = v,
      (Algorithm::L1sPlus(s), ENABLE_SIMPLIFICATION, SettingValue::Toggle(v)) => {
        s.enable_simplification = v
      }
      (Algorithm::SBlocks(s), IDEAL_LEADING, SettingValue::Number(v)) => s.ideal_leading = v,
      _ => {}
    }
    updated
  }
}

fn toggle_view(name: &'static str, value: bool) -> SettingView {
  SettingView {
    name,
    description: "Wrap-origin convention: shift wrapped content by the padding",
    value: SettingValue::Toggle(value),
  }
}

fn leading_view(value: f32) -> SettingView {
  SettingView {
    name: IDEAL_LEADING,
    description: "Minimum baseline-to-baseline distance",
    value: SettingValue::Number(value),
  }
}

/// Runs a layout end to end: measure, reassociate, lay out.
///
/// Deterministic: identical input and settings produce identical output.
/// The deadline is polled at the line-stacking and simplification
/// checkpoints and surfaces as `Error::Aborted`.
pub fn layout(
  tree: &LayoutTree,
  measurer: &dyn TextMeasurer,
  algorithm: &Algorithm,
  deadline: &LayoutDeadline,
) -> Result<LayoutResult> {
  if !has_leaves(tree) {
    return Ok(LayoutResult::empty());
  }
  let measured = measure_tree(tree, measurer);
  let empty_rect = measurer.measure("");
  let reassoc = reassociate(&measured, empty_rect)?;
  log::debug!(
    "layout algorithm={} atoms={}",
    algorithm.name(),
    tree.atom_count()
  );
  match algorithm {
    Algorithm::L1p(settings) => pebble::run(&reassoc, settings, deadline),
    Algorithm::L1s(settings) => rocks::run(&reassoc, settings, None, deadline),
    Algorithm::L1sPlus(settings) => {
      let base = RocksSettings {
        translate_wraps: settings.translate_wraps,
        ideal_leading: settings.ideal_leading,
      };
      rocks::run(&reassoc, &base, Some(settings.enable_simplification), deadline)
    }
    Algorithm::Blocks => blocks::run(&reassoc, deadline),
    Algorithm::SBlocks(settings) => sblocks::run(&reassoc, settings, deadline),
  }
}

fn has_leaves(tree: &LayoutTree) -> bool {
  match tree {
    LayoutTree::Atom { .. } | LayoutTree::Spacer { .. } | LayoutTree::Newline => true,
    LayoutTree::Node { children, .. } => children.iter().any(has_leaves),
  }
}
