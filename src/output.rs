//! CLI output formatting.
//!
//! Formatting functions return lines instead of printing, so tests can check
//! them without capturing stdout.
//!
//! ## Edit
//!
//! ```text
//! photo.jpg → photo-edited.png
//!     Format: image/jpeg → image/png
//!     Size: 1200x800 → 400x300 (cropped)
//!     Filter: blur(sigma=2)
//!     Output: 183224 bytes
//! ```
//!
//! ## Check
//!
//! ```text
//! photo.jpg
//!     Format: image/jpeg
//!     Size: 1200x800
//! ```

use crate::edit::EditReport;
use crate::imaging::Decoded;
use std::path::Path;

fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn dims((w, h): (u32, u32)) -> String {
    format!("{w}x{h}")
}

/// Lines describing a finished edit.
pub fn format_edit_report(report: &EditReport, input: &Path, output: &Path) -> Vec<String> {
    let mut lines = vec![format!("{} → {}", input.display(), output.display())];

    if report.input_mime == report.output_mime {
        lines.push(format!("{}Format: {}", indent(1), report.output_mime));
    } else {
        lines.push(format!(
            "{}Format: {} → {}",
            indent(1),
            report.input_mime,
            report.output_mime
        ));
    }

    let size = if report.cropped {
        format!(
            "{} → {} (cropped)",
            dims(report.original_size),
            dims(report.edited_size)
        )
    } else {
        dims(report.edited_size)
    };
    lines.push(format!("{}Size: {}", indent(1), size));

    if let Some(filter) = &report.filter {
        lines.push(format!("{}Filter: {}", indent(1), filter));
    }
    lines.push(format!("{}Output: {} bytes", indent(1), report.output_bytes));
    lines
}

/// Print an edit report to stdout.
pub fn print_edit_report(report: &EditReport, input: &Path, output: &Path) {
    for line in format_edit_report(report, input, output) {
        println!("{}", line);
    }
}

/// Lines describing a decoded (but not edited) image.
pub fn format_check_output(decoded: &Decoded, input: &Path) -> Vec<String> {
    vec![
        input.display().to_string(),
        format!("{}Format: {}", indent(1), decoded.mime),
        format!(
            "{}Size: {}",
            indent(1),
            dims((decoded.raster.width(), decoded.raster.height()))
        ),
    ]
}

/// Print check output to stdout.
pub fn print_check_output(decoded: &Decoded, input: &Path) {
    for line in format_check_output(decoded, input) {
        println!("{}", line);
    }
}
