//! Mark list codec between the edit buffer and `Vec<Mark>`.
//!
//! # Invariants
//! - `parse_marks("")` is empty, never a single empty-text mark.
//! - `parse_marks(&format_marks(marks)) == marks` for marks without `;`,
//!   without a leading space, and other than a lone empty-text mark.

use crate::model::account::Mark;

/// Separator between marks in the edit buffer.
pub const MARK_SEPARATOR: char = ';';
/// Separator written by [`format_marks`] for display.
pub const MARK_DISPLAY_SEPARATOR: &str = "; ";

/// Splits edit-buffer text into marks.
///
/// Segments are kept as typed. The single space that [`format_marks`] writes
/// after every separator is consumed, so `"a; b"` and `"a;b"` both yield
/// `["a", "b"]`. Empty segments between or after separators are kept.
pub fn parse_marks(text: &str) -> Vec<Mark> {
    if text.is_empty() {
        return Vec::new();
    }

    text.split(MARK_SEPARATOR)
        .enumerate()
        .map(|(index, segment)| {
            let segment = if index == 0 {
                segment
            } else {
                segment.strip_prefix(' ').unwrap_or(segment)
            };
            Mark::new(segment)
        })
        .collect()
}

/// Joins mark texts with `"; "` for the edit buffer.
pub fn format_marks(marks: &[Mark]) -> String {
    marks
        .iter()
        .map(|mark| mark.text.as_str())
        .collect::<Vec<_>>()
        .join(MARK_DISPLAY_SEPARATOR)
}
