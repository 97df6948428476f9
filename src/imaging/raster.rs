//! Owned RGBA pixel buffer with arbitrary integer bounds.
//!
//! `image::RgbaImage` always starts at `(0, 0)`. A cropped image keeps the
//! coordinates it had inside its parent, so [`Raster`] pairs an `RgbaImage`
//! with the [`Rect`] it covers. Pixel `(x, y)` lives at
//! `(x - bounds.min.x, y - bounds.min.y)` in the backing buffer.

use super::geometry::{Point, Rect};
use image::{DynamicImage, Rgba, RgbaImage};

/// Bytes per pixel in the backing buffer.
pub const CHANNELS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    bounds: Rect,
    pixels: RgbaImage,
}

impl Raster {
    /// Allocate a fully transparent black raster covering `bounds`.
    pub fn new(bounds: Rect) -> Self {
        let bounds = normalize(bounds);
        Self {
            bounds,
            pixels: RgbaImage::new(bounds.width() as u32, bounds.height() as u32),
        }
    }

    /// Wrap an image whose top-left pixel is `(0, 0)`.
    pub fn from_rgba(pixels: RgbaImage) -> Self {
        Self {
            bounds: Rect::from_size(pixels.width(), pixels.height()),
            pixels,
        }
    }

    /// Wrap an image whose top-left pixel sits at `origin`.
    pub fn from_rgba_at(origin: Point, pixels: RgbaImage) -> Self {
        let bounds = Rect::new(
            origin.x,
            origin.y,
            origin.x + pixels.width() as i32,
            origin.y + pixels.height() as i32,
        );
        Self { bounds, pixels }
    }

    /// Convert any decoded image to 8-bit RGBA. Already-RGBA8 images are
    /// moved, not copied.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::from_rgba(image.into_rgba8())
    }

    /// Build from raw row-major RGBA bytes. Returns `None` if the length does
    /// not match `bounds`.
    pub fn from_raw(bounds: Rect, data: Vec<u8>) -> Option<Self> {
        let bounds = normalize(bounds);
        let pixels = RgbaImage::from_raw(bounds.width() as u32, bounds.height() as u32, data)?;
        Some(Self { bounds, pixels })
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.bounds.contains(Point::new(x, y))
    }

    /// Pixel at `(x, y)`, or `None` outside the bounds.
    pub fn get(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        if !self.contains(x, y) {
            return None;
        }
        let (bx, by) = self.local(x, y);
        Some(*self.pixels.get_pixel(bx, by))
    }

    /// Pixel at `(x, y)`; transparent black outside the bounds.
    #[inline]
    pub fn pixel(&self, x: i32, y: i32) -> Rgba<u8> {
        self.get(x, y).unwrap_or(Rgba([0, 0, 0, 0]))
    }

    /// Write a pixel. Writes outside the bounds are ignored.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if !self.contains(x, y) {
            return;
        }
        let (bx, by) = self.local(x, y);
        self.pixels.put_pixel(bx, by, color);
    }

    /// Copy out the part of this raster covered by `rect`, keeping its
    /// coordinates. `rect` is clipped to the current bounds.
    pub fn sub_raster(&self, rect: Rect) -> Raster {
        let clipped = intersect(self.bounds, rect);
        if clipped.is_empty() {
            return Raster::new(Rect {
                min: clipped.min,
                max: clipped.min,
            });
        }
        let (bx, by) = self.local(clipped.min.x, clipped.min.y);
        let view = image::imageops::crop_imm(
            &self.pixels,
            bx,
            by,
            clipped.width() as u32,
            clipped.height() as u32,
        );
        Raster::from_rgba_at(clipped.min, view.to_image())
    }

    /// Row-major RGBA bytes, starting at `bounds.min`.
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    /// Mutable row-major RGBA bytes. Pixel `i` occupies `i * CHANNELS..`.
    pub(crate) fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn as_rgba(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_rgba(self) -> RgbaImage {
        self.pixels
    }

    #[inline]
    fn local(&self, x: i32, y: i32) -> (u32, u32) {
        (
            (x - self.bounds.min.x) as u32,
            (y - self.bounds.min.y) as u32,
        )
    }
}

fn normalize(bounds: Rect) -> Rect {
    if bounds.is_empty() {
        // Keep the origin but collapse to a zero-area rectangle so width and
        // height never go negative.
        Rect::new(
            bounds.min.x,
            bounds.min.y,
            bounds.max.x.max(bounds.min.x),
            bounds.max.y.max(bounds.min.y),
        )
    } else {
        bounds
    }
}

fn intersect(a: Rect, b: Rect) -> Rect {
    let min = Point::new(a.min.x.max(b.min.x), a.min.y.max(b.min.y));
    let max = Point::new(a.max.x.min(b.max.x), a.max.y.min(b.max.y));
    Rect {
        min,
        max: Point::new(max.x.max(min.x), max.y.max(min.y)),
    }
}
