//! Shared constants used across the application.

/// Maximum accepted length for a post message, in characters.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Maximum accepted length for a thread title, in characters.
pub const MAX_TITLE_LENGTH: usize = 120;

/// Maximum accepted length of the raw `Authorization` header value.
pub const MAX_AUTHORIZATION_LENGTH: usize = 4096;

/// Upper bound for the `width` query parameter of an animation upload.
pub const MAX_VIDEO_WIDTH: u32 = 1920;

/// Upper bound for the `height` query parameter of an animation upload.
pub const MAX_VIDEO_HEIGHT: u32 = 1080;

pub const CONTENT_TYPE_APPLICATION_JSON: &str = "application/json";
pub const CONTENT_TYPE_VIDEO_MP4: &str = "video/mp4";
pub const CONTENT_TYPE_IMAGE_PNG: &str = "image/png";
