use alloc::{string::String, vec::Vec};

/// MIME type assumed when a file extension is missing or unrecognised.
pub const DEFAULT_IMAGE_MIME: &str = "image/jpeg";

/// Raw image bytes tagged with their content type.
///
/// Providers are responsible for the wire encoding (for example base64 inline data).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    mime_type: String,
    data: Vec<u8>,
}

impl Image {
    /// Wraps raw bytes with an explicit MIME type.
    pub fn new(mime_type: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    /// Wraps raw bytes, deriving the MIME type from a file extension.
    ///
    /// See [`Image::mime_for_extension`] for the recognised extensions.
    pub fn from_extension(extension: Option<&str>, data: impl Into<Vec<u8>>) -> Self {
        let mime = extension.map_or(DEFAULT_IMAGE_MIME, Self::mime_for_extension);
        Self::new(mime, data)
    }

    /// Maps a file extension (without the leading dot, any case) to an image MIME type.
    ///
    /// Unrecognised extensions fall back to [`DEFAULT_IMAGE_MIME`].
    #[must_use]
    pub fn mime_for_extension(extension: &str) -> &'static str {
        let extension = extension.trim_start_matches('.');
        if extension.eq_ignore_ascii_case("png") {
            "image/png"
        } else if extension.eq_ignore_ascii_case("gif") {
            "image/gif"
        } else if extension.eq_ignore_ascii_case("webp") {
            "image/webp"
        } else {
            // jpg, jpeg and everything we do not know
            DEFAULT_IMAGE_MIME
        }
    }

    /// Returns the MIME type.
    #[must_use]
    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    /// Returns the raw bytes.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the image, returning the MIME type and bytes.
    #[must_use]
    pub fn into_parts(self) -> (String, Vec<u8>) {
        (self.mime_type, self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognised_extensions() {
        assert_eq!(Image::mime_for_extension("jpg"), "image/jpeg");
        assert_eq!(Image::mime_for_extension("jpeg"), "image/jpeg");
        assert_eq!(Image::mime_for_extension("png"), "image/png");
        assert_eq!(Image::mime_for_extension("gif"), "image/gif");
        assert_eq!(Image::mime_for_extension("webp"), "image/webp");
    }

    #[test]
    fn extension_matching_ignores_case_and_dot() {
        assert_eq!(Image::mime_for_extension("PNG"), "image/png");
        assert_eq!(Image::mime_for_extension(".WebP"), "image/webp");
    }

    #[test]
    fn unknown_extension_defaults_to_jpeg() {
        assert_eq!(Image::mime_for_extension("bmp"), "image/jpeg");
        assert_eq!(Image::mime_for_extension(""), "image/jpeg");
        assert_eq!(Image::from_extension(None, [0u8]).mime_type(), "image/jpeg");
    }
}
