//! raggedblocks: layout for structured text with snug outlines
//!
//! A tree of text fragments with padded, styled interior nodes is laid
//! out into positioned fragments plus one rectilinear polygon per styled
//! node. Unlike classical box layout, ancestors deform around their
//! content: line structure stays intact and outlines hug the text,
//! producing ragged shapes instead of rigid nested boxes.
//!
//! The pipeline is pure and deterministic:
//!
//! ```text
//! LayoutTree -> measure -> reassociate -> { L1P | L1S | L1S+ | Blocks | S-Blocks }
//!            -> LayoutResult (fragments + renderable scene)
//! ```
//!
//! See [`layout::layout`] for the entry point and [`layout::Algorithm`]
//! for algorithm selection and settings.

pub mod backing;
pub mod control;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod measure;
pub mod poly;
pub mod reassoc;
pub mod render;
pub mod snapshot;
pub mod style;
pub mod timetable;
pub mod tree;

pub use control::LayoutDeadline;
pub use error::{Error, Result};
pub use geometry::{Point, Rect, Size};
pub use layout::{layout, Algorithm, FragmentInfo, LayoutResult, SettingValue, SettingView};
pub use measure::{CachingMeasurer, MonospaceMeasurer, TextMeasurer};
pub use render::{RenderTarget, Renderable, SvgDocument};
pub use style::{Border, Color, WrapStyle};
pub use tree::LayoutTree;
