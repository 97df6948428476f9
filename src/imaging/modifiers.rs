//! Per-pixel modifiers.
//!
//! A [`PixelModifier`] maps `(position, current colour, whole source image)`
//! to a new colour. The editor calls it once per destination pixel, from
//! several threads at once, so implementations must be `Sync` and must not
//! keep per-call state.
//!
//! | Modifier | Effect |
//! |---|---|
//! | [`CopyPixel`] | returns the colour unchanged |
//! | [`Negative`] | inverts R, G, B; alpha untouched |
//! | [`Grayscale`] | R = G = B = floor((R + G + B) / 3); alpha untouched |
//! | [`GaussianBlur`] | weighted average over a square window, all four channels |

use super::geometry::Point;
use super::raster::Raster;
use image::Rgba;
use std::f64::consts::PI;
use std::fmt;

/// Colour transform applied to every pixel of an image.
pub trait PixelModifier: Sync {
    /// Compute the new colour of the pixel at `position`.
    ///
    /// `color` is the source pixel at `position`; `source` is the full image
    /// the pass reads from, for modifiers that need neighbours.
    fn modify_pixel(&self, position: Point, color: Rgba<u8>, source: &Raster) -> Rgba<u8>;

    /// Short name used in logs and reports.
    fn name(&self) -> &'static str;
}

/// Identity modifier. Also used by the editor to materialise a crop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyPixel;

impl PixelModifier for CopyPixel {
    fn modify_pixel(&self, _: Point, color: Rgba<u8>, _: &Raster) -> Rgba<u8> {
        color
    }

    fn name(&self) -> &'static str {
        "copy"
    }
}

/// Colour inversion through a precomputed 256-entry table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Negative {
    table: [u8; 256],
}

impl Negative {
    pub fn new() -> Self {
        Self {
            table: std::array::from_fn(|v| 255 - v as u8),
        }
    }
}

impl Default for Negative {
    fn default() -> Self {
        Self::new()
    }
}

impl PixelModifier for Negative {
    fn modify_pixel(&self, _: Point, color: Rgba<u8>, _: &Raster) -> Rgba<u8> {
        let [r, g, b, a] = color.0;
        Rgba([
            self.table[r as usize],
            self.table[g as usize],
            self.table[b as usize],
            a,
        ])
    }

    fn name(&self) -> &'static str {
        "negative"
    }
}

/// Unweighted channel mean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Grayscale;

impl PixelModifier for Grayscale {
    fn modify_pixel(&self, _: Point, color: Rgba<u8>, _: &Raster) -> Rgba<u8> {
        let [r, g, b, a] = color.0;
        let intensity = ((u16::from(r) + u16::from(g) + u16::from(b)) / 3) as u8;
        Rgba([intensity, intensity, intensity, a])
    }

    fn name(&self) -> &'static str {
        "grayscale"
    }
}

/// Largest sigma a blur accepts. The window is `3 * sigma` wide on each
/// axis, so the per-pixel cost grows with its square.
pub const MAX_BLUR_SIGMA: f64 = 100.0;

/// Gaussian blur over a `size × size` window.
///
/// The 2D weight of a tap is the product of the 1D kernel along each axis,
/// applied in a single pass. Taps that fall outside the source image are
/// dropped from both the weighted sum and the total weight, so borders are
/// not darkened. Alpha is averaged like any other channel.
///
/// Channels are accumulated in the 16-bit range (`v * 257`) and the result
/// is divided by 256 with truncation.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianBlur {
    half_size: i32,
    kernel: Vec<f64>,
}

impl GaussianBlur {
    /// Build the normalised kernel for `sigma`.
    ///
    /// `sigma` is clamped to `[0, MAX_BLUR_SIGMA]`; NaN counts as 0. Any
    /// sigma whose window is a single tap yields the identity kernel `[1.0]`.
    pub fn new(sigma: f64) -> Self {
        let sigma = if sigma.is_nan() {
            0.0
        } else {
            sigma.clamp(0.0, MAX_BLUR_SIGMA)
        };
        let mut size = (3.0 * sigma + 0.5) as usize;
        if size % 2 == 0 {
            size += 1;
        }
        if size == 1 {
            return Self {
                half_size: 0,
                kernel: vec![1.0],
            };
        }
        let half_size = size / 2;

        let norm = sigma * (2.0 * PI).sqrt();
        let mut kernel: Vec<f64> = (0..size)
            .map(|i| {
                let x = i as f64 - half_size as f64;
                (-x * x / (2.0 * sigma * sigma)).exp() / norm
            })
            .collect();
        let sum: f64 = kernel.iter().sum();
        for k in &mut kernel {
            *k /= sum;
        }

        Self {
            half_size: half_size as i32,
            kernel,
        }
    }

    pub fn kernel(&self) -> &[f64] {
        &self.kernel
    }

    pub fn half_size(&self) -> i32 {
        self.half_size
    }
}

impl PixelModifier for GaussianBlur {
    fn modify_pixel(&self, position: Point, _: Rgba<u8>, source: &Raster) -> Rgba<u8> {
        let bounds = source.bounds();
        let min_x = position.x - self.half_size;
        let min_y = position.y - self.half_size;

        let mut acc = [0.0f64; 4];
        let mut weight = 0.0f64;

        for x in min_x..=position.x + self.half_size {
            if x < bounds.min.x || x >= bounds.max.x {
                continue;
            }
            let kx = self.kernel[(x - min_x) as usize];
            for y in min_y..=position.y + self.half_size {
                if y < bounds.min.y || y >= bounds.max.y {
                    continue;
                }
                let w = kx * self.kernel[(y - min_y) as usize];
                let px = source.pixel(x, y).0;
                for (sum, channel) in acc.iter_mut().zip(px) {
                    *sum += f64::from(u32::from(channel) * 257) * w;
                }
                weight += w;
            }
        }

        Rgba(acc.map(|sum| (sum / weight / 256.0) as u8))
    }

    fn name(&self) -> &'static str {
        "blur"
    }
}

/// The filters a user can ask for by name.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    Grayscale,
    Negative,
    Blur { sigma: f64 },
}

impl Filter {
    /// Instantiate the modifier for this filter.
    pub fn modifier(&self) -> Box<dyn PixelModifier> {
        match *self {
            Filter::Grayscale => Box::new(Grayscale),
            Filter::Negative => Box::new(Negative::new()),
            Filter::Blur { sigma } => Box::new(GaussianBlur::new(sigma)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Filter::Grayscale => "grayscale",
            Filter::Negative => "negative",
            Filter::Blur { .. } => "blur",
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Blur { sigma } => write!(f, "blur(sigma={sigma})"),
            other => f.write_str(other.name()),
        }
    }
}
