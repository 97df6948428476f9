//! Double-buffered image editor.
//!
//! [`ImageEditor`] owns two buffers:
//!
//! - **source**: read-only input of the next modifier pass. Starts as the
//!   decoded image.
//! - **destination**: output of the last pass, or nothing if no pass has run.
//!
//! A pass always reads `source` and writes a freshly allocated destination,
//! so parallel workers never read what another worker is writing. When a
//! second pass runs, the previous destination is promoted to source first.
//!
//! The editor also tracks the current logical bounds. A crop only shrinks
//! those bounds (and the destination, if one exists); `source` keeps its full
//! size, so a blur after a crop still samples pixels just outside the crop.
//!
//! ```text
//! decode ──► source ──crop──► bounds shrink
//!                   ──modify──► destination (bounds) ──modify──► source', destination'
//! ```

use super::codec::{self, CodecError, MimeType};
use super::dispatch::Dispatch;
use super::geometry::{Alignment, Rect, Size, rectangle_for};
use super::modifiers::{CopyPixel, PixelModifier};
use super::raster::Raster;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct ImageEditor {
    source: Raster,
    /// Output of the last modifier pass; `Some` iff pixels were modified.
    destination: Option<Raster>,
    /// Current logical bounds. Only shrinks, and only through a crop.
    bounds: Rect,
    cropped: bool,
    dispatch: Dispatch,
}

impl ImageEditor {
    /// Start editing `image`. Nothing is copied or allocated.
    pub fn new(image: Raster) -> Self {
        let bounds = image.bounds();
        Self {
            source: image,
            destination: None,
            bounds,
            cropped: false,
            dispatch: Dispatch::default(),
        }
    }

    /// Decode PNG or JPEG bytes and start editing them.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let decoded = codec::decode(bytes)?;
        Ok(Self::new(decoded.raster))
    }

    /// Select how modifier passes are executed.
    pub fn with_dispatch(mut self, dispatch: Dispatch) -> Self {
        self.dispatch = dispatch;
        self
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Current size of the edited image.
    pub fn size(&self) -> Size {
        Size::new(self.bounds.width(), self.bounds.height())
    }

    pub fn is_cropped(&self) -> bool {
        self.cropped
    }

    pub fn is_pixels_modified(&self) -> bool {
        self.destination.is_some()
    }

    /// Whether any edit changed the image.
    pub fn is_modified(&self) -> bool {
        self.cropped || self.is_pixels_modified()
    }

    /// Crop to `rect`.
    ///
    /// Does nothing if `rect` is empty, not fully inside the current bounds,
    /// or equal to them.
    pub fn crop_by_rectangle(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        if !rect.is_within(&self.bounds) || rect == self.bounds {
            debug!(%rect, bounds = %self.bounds, "crop ignored");
            return;
        }

        if let Some(destination) = &mut self.destination {
            *destination = destination.sub_raster(rect);
        }
        debug!(from = %self.bounds, to = %rect, "cropped");
        self.bounds = rect;
        self.cropped = true;
    }

    /// Crop to `size`, placed inside the current bounds by `alignment`.
    /// An empty size is a no-op, as is a size not smaller on both axes.
    pub fn crop_by_size_and_alignment(&mut self, size: Size, alignment: Alignment) {
        if size.is_empty() {
            return;
        }
        let rect = rectangle_for(self.bounds, size, alignment);
        self.crop_by_rectangle(rect);
    }

    /// Run `modifier` over every pixel of the current bounds. `None` is a
    /// no-op.
    ///
    /// If a previous pass produced a destination, it becomes the source of
    /// this pass.
    pub fn modify_pixels(&mut self, modifier: Option<&dyn PixelModifier>) {
        let Some(modifier) = modifier else {
            return;
        };

        let promoted = match self.destination.take() {
            Some(previous) => {
                self.source = previous;
                true
            }
            None => false,
        };

        debug!(
            modifier = modifier.name(),
            bounds = %self.bounds,
            workers = self.dispatch.worker_count(),
            promoted,
            "modifying pixels"
        );

        let mut destination = Raster::new(self.bounds);
        self.dispatch.run(&self.source, &mut destination, modifier);
        self.destination = Some(destination);
    }

    /// The image as edited so far.
    ///
    /// Unedited images are returned as the original source buffer. A crop
    /// that was never followed by a modifier pass is materialised with a copy
    /// pass first, so the result is always fully populated.
    pub fn edited_image(&mut self) -> &Raster {
        if self.cropped && self.destination.is_none() {
            self.modify_pixels(Some(&CopyPixel));
        }
        match &self.destination {
            Some(destination) => destination,
            None => &self.source,
        }
    }

    /// Consuming variant of [`edited_image`](Self::edited_image).
    pub fn into_edited_image(mut self) -> Raster {
        if self.cropped && self.destination.is_none() {
            self.modify_pixels(Some(&CopyPixel));
        }
        self.destination.unwrap_or(self.source)
    }

    /// Encode the edited image.
    pub fn encode(&mut self, mime: MimeType, jpeg_quality: u8) -> Result<Vec<u8>, CodecError> {
        codec::encode(self.edited_image(), mime, jpeg_quality)
    }

    /// Encode the edited image to a MIME string, rejecting anything other
    /// than `image/png` and `image/jpeg`.
    pub fn encode_as(&mut self, mime: &str, jpeg_quality: u8) -> Result<Vec<u8>, CodecError> {
        let mime: MimeType = mime.parse()?;
        self.encode(mime, jpeg_quality)
    }
}
