//! Byte-offset/line-number conversion for diagnostics.
//!
//! Lines are 0-indexed here (matching [`crate::types::Definition`]'s
//! `start_line`/`end_line`), unlike editor-facing 1-indexed positions.

/// Convert a byte offset into a 0-indexed line number.
///
/// If `offset` exceeds `content.len()`, returns the line at the end of the
/// content.
pub fn byte_offset_to_line(content: &[u8], offset: usize) -> u32 {
    let offset = offset.min(content.len());
    content[..offset].iter().filter(|&&b| b == b'\n').count() as u32
}

/// Whether `content` ends with a newline byte.
pub fn ends_with_newline(content: &[u8]) -> bool {
    content.last() == Some(&b'\n')
}
