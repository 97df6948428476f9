//! # Image Editor
//!
//! Crop a PNG or JPEG image to a target size with directional alignment,
//! run one pixel filter over it (copy, negative, grayscale, Gaussian blur),
//! and encode the result.
//!
//! # Architecture: Decode → Edit → Encode
//!
//! ```text
//! 1. Decode   bytes   →  Raster          (PNG/JPEG only, format allow-listed)
//! 2. Edit     Raster  →  ImageEditor     (crop, then a filter pass)
//! 3. Encode   edited  →  bytes           (PNG or JPEG)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | The pixel engine: geometry, buffers, modifiers, parallel dispatch, editor, codecs |
//! | [`request`] | Turns loose string parameters into validated crop and filter settings |
//! | [`edit`] | Runs one complete edit and reports what happened |
//! | [`config`] | `image-editor.toml` loading, validation and defaults |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Double Buffering
//!
//! A filter pass reads one buffer and writes another. The destination is
//! split into disjoint pixel ranges, one per worker, so the pass needs no
//! locks and its output does not depend on the number of workers or their
//! scheduling. A second pass promotes the previous output to be its input.
//!
//! ## Crops Keep Their Coordinates
//!
//! A crop shrinks the logical bounds but leaves the decoded source intact.
//! Pixel `(x, y)` of a cropped image is pixel `(x, y)` of the original, which
//! lets a blur after a crop sample the pixels just outside it instead of
//! treating the crop edge as the image edge.
//!
//! ## Exact Blur Arithmetic
//!
//! The Gaussian blur weights each tap by the product of a 1D kernel along
//! both axes in one pass, accumulates in the 16-bit range and truncates back
//! to 8 bits. Out-of-image taps are dropped from both the sum and the
//! weight. Alpha is blurred like any colour channel.

pub mod config;
pub mod edit;
pub mod imaging;
pub mod output;
pub mod request;
