//! Edit request parameters.
//!
//! An edit request arrives as loose string fields (form values, CLI flags).
//! [`RawEditParams::resolve`] turns them into [`EditParams`]:
//!
//! | Field | Accepted | Absent / invalid |
//! |---|---|---|
//! | `width`, `height` | non-negative integer | absent/empty → 0; otherwise [`RequestError::InvalidDimensions`] |
//! | `vertical` | `left`, `right`, `center` | `center` |
//! | `horizontal` | `top`, `bottom`, `center` | `center` |
//! | `filter` | `grayscale`, `negative`, `blure` (or `blur`) | absent/empty → none; otherwise [`RequestError::InvalidFilter`] |
//! | `blur_sigma` | positive float up to [`MAX_BLUR_SIGMA`] | absent/unparsable/non-positive → configured default sigma; too large → [`RequestError::InvalidSigma`] |
//!
//! A zero width or height means "no crop". Numbers are parsed as given;
//! surrounding whitespace makes them invalid.

use crate::imaging::{Alignment, Filter, Horizontal, MAX_BLUR_SIGMA, Size, Vertical};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

#[derive(Error, Debug, PartialEq)]
pub enum RequestError {
    #[error("Invalid dimensions: {0}")]
    InvalidDimensions(String),
    #[error("Invalid filter value: {0:?}")]
    InvalidFilter(String),
    #[error("Invalid blur sigma: {0}")]
    InvalidSigma(String),
}

/// Unvalidated edit fields, exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RawEditParams {
    pub width: Option<String>,
    pub height: Option<String>,
    pub vertical: Option<String>,
    pub horizontal: Option<String>,
    pub filter: Option<String>,
    #[serde(alias = "blure_sigma")]
    pub blur_sigma: Option<String>,
}

/// Crop target: a size and where to anchor it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropParams {
    pub size: Size,
    pub alignment: Alignment,
}

/// Validated edit parameters.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EditParams {
    /// `None` when no crop was requested.
    pub crop: Option<CropParams>,
    pub filter: Option<Filter>,
}

impl RawEditParams {
    /// Validate the raw fields. `default_sigma` is used for a blur with no
    /// usable sigma.
    pub fn resolve(&self, default_sigma: f64) -> Result<EditParams, RequestError> {
        let width = parse_dimension("width", self.width.as_deref())?;
        let height = parse_dimension("height", self.height.as_deref())?;
        let size = Size::from((width, height));

        let crop = (!size.is_empty()).then(|| CropParams {
            size,
            alignment: Alignment {
                vertical: parse_vertical(self.vertical.as_deref()),
                horizontal: parse_horizontal(self.horizontal.as_deref()),
            },
        });

        let filter = parse_filter(
            self.filter.as_deref(),
            self.blur_sigma.as_deref(),
            default_sigma,
        )?;

        Ok(EditParams { crop, filter })
    }
}

/// Parse a crop dimension. Absent or empty means 0.
pub fn parse_dimension(field: &str, value: Option<&str>) -> Result<u32, RequestError> {
    let value = value.unwrap_or("");
    if value.is_empty() {
        return Ok(0);
    }
    let num: i64 = value.parse().map_err(|_| {
        RequestError::InvalidDimensions(format!("{field} {value:?} is not a number"))
    })?;
    if num < 0 {
        return Err(RequestError::InvalidDimensions(format!(
            "{field} {value:?} is less than zero"
        )));
    }
    u32::try_from(num)
        .map_err(|_| RequestError::InvalidDimensions(format!("{field} {value:?} is too large")))
}

fn parse_vertical(token: Option<&str>) -> Vertical {
    let token = token.unwrap_or("");
    Vertical::from_token(token).unwrap_or_else(|| {
        if !token.is_empty() {
            warn!(token, "invalid vertical alignment, using center");
        }
        Vertical::Center
    })
}

fn parse_horizontal(token: Option<&str>) -> Horizontal {
    let token = token.unwrap_or("");
    Horizontal::from_token(token).unwrap_or_else(|| {
        if !token.is_empty() {
            warn!(token, "invalid horizontal alignment, using center");
        }
        Horizontal::Center
    })
}

/// Parse a blur sigma. Absent, unparsable, non-finite and non-positive
/// values all yield `default_sigma`. A sigma above [`MAX_BLUR_SIGMA`] is an
/// error.
pub fn parse_sigma(value: Option<&str>, default_sigma: f64) -> Result<f64, RequestError> {
    match value.and_then(|v| v.parse::<f64>().ok()) {
        Some(sigma) if sigma.is_finite() && sigma > MAX_BLUR_SIGMA => Err(
            RequestError::InvalidSigma(format!("{sigma} is larger than {MAX_BLUR_SIGMA}")),
        ),
        Some(sigma) if sigma.is_finite() && sigma > 0.0 => Ok(sigma),
        Some(sigma) => {
            warn!(sigma, default_sigma, "non-positive blur sigma, using default");
            Ok(default_sigma)
        }
        None => Ok(default_sigma),
    }
}

/// Map a filter name to a [`Filter`]. Absent or empty means no filter.
pub fn parse_filter(
    name: Option<&str>,
    sigma: Option<&str>,
    default_sigma: f64,
) -> Result<Option<Filter>, RequestError> {
    match name.unwrap_or("") {
        "" => Ok(None),
        "grayscale" => Ok(Some(Filter::Grayscale)),
        "negative" => Ok(Some(Filter::Negative)),
        "blure" | "blur" => Ok(Some(Filter::Blur {
            sigma: parse_sigma(sigma, default_sigma)?,
        })),
        other => Err(RequestError::InvalidFilter(other.to_string())),
    }
}
