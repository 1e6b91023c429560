//! Image encoding: raw photo bytes → base64 [`EncodedImage`].
//!
//! VLM APIs accept images as base64 data-URIs embedded in the JSON request
//! body. The encoder is a pure transformation: no resizing, no validation of
//! content or size — whatever the camera produced is what the model sees.
//!
//! ## Media type
//! Historically this workflow tagged every upload `image/jpeg`, mislabelling
//! PNG photos. The encoder now sniffs the magic bytes with
//! [`image::guess_format`] and tags JPEG and PNG correctly, keeping
//! `image/jpeg` as the fallback for anything unrecognised so an odd camera
//! file still goes through rather than failing locally.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use tracing::debug;

/// A photo encoded for the multimodal request body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    /// Base64 of the raw image bytes.
    pub data: String,
    /// Media type tag sent to the provider.
    pub mime_type: &'static str,
}

impl EncodedImage {
    /// Render the `data:` URI the chat-completion API expects.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }
}

/// Sniff the media type from the image magic bytes.
///
/// Only JPEG and PNG are distinguished (the two formats the capture flow
/// accepts); everything else falls back to `image/jpeg`.
fn sniff_mime_type(bytes: &[u8]) -> &'static str {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Png) => "image/png",
        Ok(ImageFormat::Jpeg) => "image/jpeg",
        _ => "image/jpeg",
    }
}

/// Encode one photo as base64 ready for the request body.
pub fn encode_image(bytes: &[u8]) -> EncodedImage {
    let mime_type = sniff_mime_type(bytes);
    let data = STANDARD.encode(bytes);
    debug!("Encoded {} photo → {} bytes base64", mime_type, data.len());

    EncodedImage { data, mime_type }
}

/// Encode every photo in order.
pub fn encode_images(images: &[Vec<u8>]) -> Vec<EncodedImage> {
    images.iter().map(|b| encode_image(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
    const JPEG_MAGIC: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0];

    #[test]
    fn png_is_tagged_png() {
        let enc = encode_image(PNG_MAGIC);
        assert_eq!(enc.mime_type, "image/png");
        assert_eq!(STANDARD.decode(&enc.data).unwrap(), PNG_MAGIC);
    }

    #[test]
    fn jpeg_is_tagged_jpeg() {
        let enc = encode_image(JPEG_MAGIC);
        assert_eq!(enc.mime_type, "image/jpeg");
    }

    #[test]
    fn unknown_bytes_fall_back_to_jpeg() {
        let enc = encode_image(b"definitely not an image");
        assert_eq!(enc.mime_type, "image/jpeg");
    }

    #[test]
    fn data_uri_shape() {
        let enc = encode_image(PNG_MAGIC);
        let uri = enc.data_uri();
        assert!(uri.starts_with("data:image/png;base64,"));
        assert!(uri.ends_with(&enc.data));
    }

    #[test]
    fn encode_images_preserves_order() {
        let encoded = encode_images(&[PNG_MAGIC.to_vec(), JPEG_MAGIC.to_vec()]);
        assert_eq!(encoded.len(), 2);
        assert_eq!(encoded[0].mime_type, "image/png");
        assert_eq!(encoded[1].mime_type, "image/jpeg");
    }
}
