//! Pixel dispatch: run a [`PixelModifier`] over every destination pixel.
//!
//! The destination's linear pixel index space `[0, width * height)` is split
//! into contiguous ranges, one per worker, with the remainder going to the
//! last range. Each worker owns the slice of the destination buffer that
//! backs its range, so no locking is needed; the source is only read.
//!
//! [`Dispatch::Sequential`] walks the same ranges on the calling thread and
//! produces bit-identical output. Tests use it as the reference.

use super::geometry::{Point, Rect};
use super::modifiers::PixelModifier;
use super::raster::{CHANNELS, Raster};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// How a modifier pass is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dispatch {
    /// Fan out over the rayon pool, one range per pool thread.
    #[default]
    Parallel,
    /// Single-threaded loop over the same ranges.
    Sequential,
}

impl Dispatch {
    /// Number of ranges the pixel space is split into.
    pub fn worker_count(self) -> usize {
        match self {
            Dispatch::Parallel => rayon::current_num_threads().max(1),
            Dispatch::Sequential => 1,
        }
    }

    /// Fill `destination` by applying `modifier` to `source`.
    ///
    /// Only the pixels inside `destination.bounds()` are computed; `source`
    /// may be larger and neighbourhood modifiers may read beyond them.
    pub fn run(self, source: &Raster, destination: &mut Raster, modifier: &dyn PixelModifier) {
        match self {
            Dispatch::Parallel => run_parallel(source, destination, modifier, self.worker_count()),
            Dispatch::Sequential => run_sequential(source, destination, modifier, 1),
        }
    }
}

/// Split `[0, pixel_count)` into `workers` contiguous ranges. Every range has
/// `pixel_count / workers` pixels except the last, which also takes the
/// remainder.
pub fn partition(pixel_count: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let per_worker = pixel_count / workers;
    (0..workers)
        .map(|worker| {
            let start = per_worker * worker;
            let end = if worker == workers - 1 {
                pixel_count
            } else {
                start + per_worker
            };
            start..end
        })
        .collect()
}

/// Carve the destination buffer into one mutable slice per range.
fn split_ranges<'a>(samples: &'a mut [u8], ranges: &[Range<usize>]) -> Vec<&'a mut [u8]> {
    let mut rest = samples;
    let mut slices = Vec::with_capacity(ranges.len());
    for range in ranges {
        let (head, tail) = std::mem::take(&mut rest).split_at_mut(range.len() * CHANNELS);
        slices.push(head);
        rest = tail;
    }
    slices
}

pub(crate) fn run_parallel(
    source: &Raster,
    destination: &mut Raster,
    modifier: &dyn PixelModifier,
    workers: usize,
) {
    let bounds = destination.bounds();
    let ranges = partition(bounds.area(), workers);
    let slices = split_ranges(destination.samples_mut(), &ranges);

    ranges
        .into_par_iter()
        .zip(slices)
        .for_each(|(range, out)| fill_range(source, bounds, range, out, modifier));
}

pub(crate) fn run_sequential(
    source: &Raster,
    destination: &mut Raster,
    modifier: &dyn PixelModifier,
    workers: usize,
) {
    let bounds = destination.bounds();
    let ranges = partition(bounds.area(), workers);
    let slices = split_ranges(destination.samples_mut(), &ranges);

    for (range, out) in ranges.into_iter().zip(slices) {
        fill_range(source, bounds, range, out, modifier);
    }
}

/// Compute pixels `range` of a destination covering `bounds` into `out`,
/// which holds exactly those pixels.
fn fill_range(
    source: &Raster,
    bounds: Rect,
    range: Range<usize>,
    out: &mut [u8],
    modifier: &dyn PixelModifier,
) {
    let width = bounds.width() as usize;
    let start = range.start;
    for i in range {
        let position = Point::new(
            (i % width) as i32 + bounds.min.x,
            (i / width) as i32 + bounds.min.y,
        );
        let color = source.pixel(position.x, position.y);
        let new_color = modifier.modify_pixel(position, color, source);
        let offset = (i - start) * CHANNELS;
        out[offset..offset + CHANNELS].copy_from_slice(&new_color.0);
    }
}
