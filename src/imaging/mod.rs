//! Pixel editing engine.
//!
//! | Concern | Where |
//! |---|---|
//! | **Crop geometry** | [`geometry`]: `Size`, `Alignment`, [`rectangle_for`] |
//! | **Pixel storage** | [`raster`]: RGBA8 buffer with signed bounds |
//! | **Filters** | [`modifiers`]: copy, negative, grayscale, Gaussian blur |
//! | **Parallel pass** | [`dispatch`]: disjoint index ranges over rayon |
//! | **Edit session** | [`editor`]: double-buffered crop + modify |
//! | **PNG / JPEG** | [`codec`]: decode with format allow-list, encode |
//!
//! The module is split into:
//! - **Geometry**: pure functions for crop rectangles (unit testable)
//! - **Modifiers**: the [`PixelModifier`] trait and its implementations
//! - **Editor**: [`ImageEditor`], which combines the two over a pair of buffers

pub mod codec;
pub mod dispatch;
pub mod editor;
pub mod geometry;
pub mod modifiers;
pub mod raster;

pub use codec::{CodecError, Decoded, MimeType, decode, encode, is_supported_mime};
pub use dispatch::Dispatch;
pub use editor::ImageEditor;
pub use geometry::{Alignment, Horizontal, Point, Rect, Size, Vertical, rectangle_for};
pub use modifiers::{
    CopyPixel, Filter, GaussianBlur, Grayscale, MAX_BLUR_SIGMA, Negative, PixelModifier,
};
pub use raster::Raster;
