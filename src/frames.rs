//! Length-prefixed binary upload frames.
//!
//! One upload body carries several typed payloads as a flat concatenation of
//! frames: a 4-byte little-endian unsigned length immediately followed by
//! that many payload bytes. No padding, no count header, no terminator;
//! parsing runs until the cursor reaches the end of the body. For an
//! animation upload the order is: frame 0 = UTF-8 JSON scene text, frame 1 =
//! MP4 video, frame 2 = PNG thumbnail.

use bytes::Bytes;

use crate::error::{ApiError, ApiResult};

/// Leading bytes of an MP4 container produced by the editor's encoder
/// (`ftypmp42` box with `mp42isom` brands).
pub const VIDEO_MP4_HEADER: [u8; 24] = [
    0x00, 0x00, 0x00, 0x18, 0x66, 0x74, 0x79, 0x70, 0x6d, 0x70, 0x34, 0x32, 0x00, 0x00, 0x00,
    0x00, 0x6d, 0x70, 0x34, 0x32, 0x69, 0x73, 0x6f, 0x6d,
];

/// PNG file signature.
pub const IMAGE_PNG_HEADER: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Split a concatenated frame body into its payloads.
///
/// # Errors
///
/// Fails with [`ApiError::Protocol`] on a truncated length prefix or a
/// length that overruns the remaining bytes; never reads out of bounds.
pub fn parse_frames(body: &[u8]) -> ApiResult<Vec<Bytes>> {
    let mut frames = Vec::new();
    let mut cursor = 0usize;
    while cursor < body.len() {
        if body.len() - cursor < 4 {
            return Err(ApiError::Protocol(format!(
                "truncated frame length prefix at offset {cursor}"
            )));
        }
        let size = u32::from_le_bytes([
            body[cursor],
            body[cursor + 1],
            body[cursor + 2],
            body[cursor + 3],
        ]) as usize;
        let start = cursor + 4;
        let end = start
            .checked_add(size)
            .filter(|end| *end <= body.len())
            .ok_or_else(|| {
                ApiError::Protocol(format!(
                    "frame at offset {cursor} claims {size} bytes but only {} remain",
                    body.len() - start
                ))
            })?;
        frames.push(Bytes::copy_from_slice(&body[start..end]));
        cursor = end;
    }
    Ok(frames)
}

/// Concatenate payloads into a frame body. Inverse of [`parse_frames`].
#[must_use]
pub fn build_frames<B: AsRef<[u8]>>(frames: &[B]) -> Vec<u8> {
    let total = frames
        .iter()
        .map(|frame| 4 + frame.as_ref().len())
        .sum::<usize>();
    let mut body = Vec::with_capacity(total);
    for frame in frames {
        let payload = frame.as_ref();
        body.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        body.extend_from_slice(payload);
    }
    body
}

/// Check a payload's leading bytes against an expected magic sequence.
///
/// Format sniff only; nothing beyond the first `expected.len()` bytes is
/// examined.
///
/// # Errors
///
/// Fails with [`ApiError::Validation`] on any mismatch, including a payload
/// shorter than the magic itself.
pub fn expect_file_header(name: &str, buffer: &[u8], expected: &[u8]) -> ApiResult<()> {
    if buffer.len() < expected.len() || &buffer[..expected.len()] != expected {
        return Err(ApiError::Validation(format!(
            "file {name} was not the correct type"
        )));
    }
    Ok(())
}
