//! End-to-end edit of one image.
//!
//! ```text
//! bytes ──decode──► ImageEditor ──crop?──► ──filter?──► edited image ──encode──► bytes
//! ```
//!
//! Every step is single-shot: a decode or encode failure ends the edit and
//! is returned to the caller. A crop that does not fit the image is not an
//! error; it is skipped and noted in the log.

use crate::config::EditorConfig;
use crate::imaging::{CodecError, ImageEditor, MimeType, codec};
use crate::request::{EditParams, RequestError};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum EditError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Codec(#[from] CodecError),
    #[error("{0}")]
    Request(#[from] RequestError),
}

/// Summary of what an edit did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditReport {
    pub input_mime: &'static str,
    pub output_mime: &'static str,
    pub original_size: (u32, u32),
    pub edited_size: (u32, u32),
    pub cropped: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub output_bytes: usize,
}

/// Encoded result plus its report.
#[derive(Debug, Clone)]
pub struct EditOutcome {
    pub bytes: Vec<u8>,
    pub mime: MimeType,
    pub report: EditReport,
}

/// Decode `input`, apply `params` and encode the result.
///
/// The output type is `target` if given, otherwise the type of the input.
pub fn edit_image(
    input: &[u8],
    params: &EditParams,
    target: Option<MimeType>,
    config: &EditorConfig,
) -> Result<EditOutcome, EditError> {
    let decoded = codec::decode(input)?;
    let input_mime = decoded.mime;
    let original_size = (decoded.raster.width(), decoded.raster.height());
    info!(
        mime = %input_mime,
        width = original_size.0,
        height = original_size.1,
        "decoded image"
    );

    let mut editor = ImageEditor::new(decoded.raster).with_dispatch(config.processing.dispatch);

    if let Some(crop) = params.crop {
        editor.crop_by_size_and_alignment(crop.size, crop.alignment);
        if !editor.is_cropped() {
            debug!(requested = %crop.size, image = %editor.size(), "crop does not fit, skipped");
        }
    }

    if let Some(filter) = params.filter {
        info!(%filter, "applying filter");
        let modifier = filter.modifier();
        editor.modify_pixels(Some(modifier.as_ref()));
    }

    let cropped = editor.is_cropped();
    let mime = target.unwrap_or(input_mime);
    let edited = editor.into_edited_image();
    let edited_size = (edited.width(), edited.height());
    let bytes = codec::encode(&edited, mime, config.output.jpeg_quality)?;
    info!(mime = %mime, bytes = bytes.len(), "encoded image");

    let report = EditReport {
        input_mime: input_mime.as_str(),
        output_mime: mime.as_str(),
        original_size,
        edited_size,
        cropped,
        filter: params.filter.map(|f| f.to_string()),
        output_bytes: bytes.len(),
    };

    Ok(EditOutcome {
        bytes,
        mime,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{Alignment, Filter, Raster, Size};
    use crate::request::CropParams;
    use image::{Rgba, RgbaImage};

    fn png(w: u32, h: u32) -> Vec<u8> {
        let raster = Raster::from_rgba(RgbaImage::from_fn(w, h, |x, y| {
            Rgba([(x * 20) as u8, (y * 20) as u8, 90, 255])
        }));
        codec::encode(&raster, MimeType::Png, 75).unwrap()
    }

    fn crop(w: i32, h: i32) -> Option<CropParams> {
        Some(CropParams {
            size: Size::new(w, h),
            alignment: Alignment::default(),
        })
    }

    #[test]
    fn no_edits_reencodes_same_pixels() {
        let input = png(5, 4);
        let out = edit_image(&input, &EditParams::default(), None, &EditorConfig::default())
            .unwrap();
        assert_eq!(out.mime, MimeType::Png);
        assert!(!out.report.cropped);
        assert_eq!(out.report.edited_size, (5, 4));
        assert_eq!(
            codec::decode(&out.bytes).unwrap().raster,
            codec::decode(&input).unwrap().raster
        );
    }

    #[test]
    fn crop_and_grayscale() {
        let params = EditParams {
            crop: crop(3, 2),
            filter: Some(Filter::Grayscale),
        };
        let out = edit_image(&png(8, 8), &params, None, &EditorConfig::default()).unwrap();
        assert!(out.report.cropped);
        assert_eq!(out.report.edited_size, (3, 2));
        assert_eq!(out.report.filter.as_deref(), Some("grayscale"));

        let raster = codec::decode(&out.bytes).unwrap().raster;
        for px in raster.as_rgba().pixels() {
            assert_eq!(px.0[0], px.0[1]);
            assert_eq!(px.0[1], px.0[2]);
        }
    }

    #[test]
    fn oversized_crop_is_skipped() {
        let params = EditParams {
            crop: crop(50, 2),
            filter: None,
        };
        let out = edit_image(&png(8, 8), &params, None, &EditorConfig::default()).unwrap();
        assert!(!out.report.cropped);
        assert_eq!(out.report.edited_size, (8, 8));
    }

    #[test]
    fn converts_to_requested_type() {
        let out = edit_image(
            &png(6, 6),
            &EditParams {
                crop: None,
                filter: Some(Filter::Blur { sigma: 1.0 }),
            },
            Some(MimeType::Jpeg),
            &EditorConfig::default(),
        )
        .unwrap();
        assert_eq!(out.mime, MimeType::Jpeg);
        assert_eq!(out.report.input_mime, "image/png");
        assert_eq!(out.report.output_mime, "image/jpeg");
        assert_eq!(codec::decode(&out.bytes).unwrap().mime, MimeType::Jpeg);
    }

    #[test]
    fn rejects_unsupported_input() {
        let result = edit_image(
            b"GIF89a\x01\x00\x01\x00\x00\x00\x00;",
            &EditParams::default(),
            None,
            &EditorConfig::default(),
        );
        assert!(matches!(
            result,
            Err(EditError::Codec(CodecError::UnsupportedFormat(_)))
        ));
    }

    #[test]
    fn report_serializes_to_json() {
        let out = edit_image(&png(2, 2), &EditParams::default(), None, &EditorConfig::default())
            .unwrap();
        let json = serde_json::to_value(&out.report).unwrap();
        assert_eq!(json["output_mime"], "image/png");
        assert_eq!(json["edited_size"], serde_json::json!([2, 2]));
        assert!(json.get("filter").is_none());
    }
}
