use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    #[error("Data URL is missing the ',' separator")]
    MissingSeparator,
    #[error("Data URL must be base64 encoded")]
    NotBase64,
    #[error("Image data is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    /// Declared media type, when the input was a data URL.
    pub mime_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Accepts `data:<mime>;base64,<payload>` or bare base64.
pub fn decode_data_url(input: &str) -> Result<DecodedImage, PayloadError> {
    let input = input.trim();
    let (mime_type, encoded) = match input.strip_prefix("data:") {
        Some(rest) => {
            let (header, encoded) = rest.split_once(',').ok_or(PayloadError::MissingSeparator)?;
            let mime = header
                .strip_suffix(";base64")
                .ok_or(PayloadError::NotBase64)?;
            (Some(mime.to_string()), encoded)
        }
        None => (None, input),
    };

    let bytes = STANDARD.decode(encoded.trim())?;
    Ok(DecodedImage { mime_type, bytes })
}

/// Identifies the image container from its magic bytes.
pub fn sniff_image_format(bytes: &[u8]) -> Option<image::ImageFormat> {
    image::guess_format(bytes).ok()
}

/// Hex SHA-256 of the raw image bytes.
pub fn image_digest(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_decode_data_url() {
        let encoded = STANDARD.encode(PNG_MAGIC);
        let decoded =
            decode_data_url(&format!("data:image/png;base64,{}", encoded)).expect("decodes");
        assert_eq!(decoded.mime_type.as_deref(), Some("image/png"));
        assert_eq!(decoded.bytes, PNG_MAGIC);
    }

    #[test]
    fn test_decode_bare_base64() {
        let decoded = decode_data_url(&STANDARD.encode(b"abc")).expect("decodes");
        assert_eq!(decoded.mime_type, None);
        assert_eq!(decoded.bytes, b"abc");
    }

    #[test]
    fn test_decode_rejects_malformed_input() {
        assert!(matches!(
            decode_data_url("data:image/png;base64"),
            Err(PayloadError::MissingSeparator)
        ));
        assert!(matches!(
            decode_data_url("data:text/plain,hello"),
            Err(PayloadError::NotBase64)
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Err(PayloadError::InvalidBase64(_))
        ));
    }

    #[test]
    fn test_sniff_image_format() {
        assert_eq!(sniff_image_format(PNG_MAGIC), Some(image::ImageFormat::Png));
        assert_eq!(sniff_image_format(b"\xff\xd8\xff\xe0"), Some(image::ImageFormat::Jpeg));
        assert_eq!(sniff_image_format(b"%PDF-1.7"), None);
    }

    #[test]
    fn test_image_digest() {
        assert_eq!(
            image_digest(b"abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
