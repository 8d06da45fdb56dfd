use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::{DirectorsChairError, Result};

/// Image types offered by the reference picker, keyed by file extension.
const IMAGE_TYPES: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
    ("bmp", "image/bmp"),
    ("svg", "image/svg+xml"),
];

/// Looks up the MIME type for a file name based on its extension.
pub fn image_mime_type(file_name: &str) -> Result<&'static str> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| DirectorsChairError::UnsupportedImage(file_name.to_string()))?;

    IMAGE_TYPES
        .iter()
        .find(|(known, _)| *known == extension)
        .map(|(_, mime)| *mime)
        .ok_or_else(|| DirectorsChairError::UnsupportedImage(file_name.to_string()))
}

/// Encodes raw bytes as a `data:` URL.
pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Encodes an in-memory image picked under `file_name`.
pub fn reference_image_from_bytes(file_name: &str, bytes: &[u8]) -> Result<String> {
    let mime = image_mime_type(file_name)?;
    Ok(encode_data_url(mime, bytes))
}

/// Reads an image from disk and encodes it for the reference slot.
pub fn load_reference_image(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let file_name = path.to_string_lossy();
    image_mime_type(&file_name)?;
    let bytes = std::fs::read(path)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "loaded reference image");
    reference_image_from_bytes(&file_name, &bytes)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn decode_data_url(url: &str) -> Option<(String, Vec<u8>)> {
        let rest = url.strip_prefix("data:")?;
        let (mime, payload) = rest.split_once(";base64,")?;
        let bytes = STANDARD.decode(payload).ok()?;
        Some((mime.to_string(), bytes))
    }

    #[test]
    fn encodes_known_image_types() {
        let url = reference_image_from_bytes("shot.PNG", b"\x89PNG").unwrap();
        assert_eq!(url, "data:image/png;base64,iVBORw==");
        assert_eq!(image_mime_type("a/b/c.jpeg").unwrap(), "image/jpeg");
    }

    #[test]
    fn rejects_files_outside_the_picker_filter() {
        let err = reference_image_from_bytes("notes.txt", b"hello").unwrap_err();
        assert!(matches!(err, DirectorsChairError::UnsupportedImage(name) if name == "notes.txt"));
        assert!(image_mime_type("no_extension").is_err());
    }

    #[test]
    fn loads_images_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".gif").tempfile().unwrap();
        file.write_all(b"GIF89a").unwrap();

        let url = load_reference_image(file.path()).unwrap();
        let (mime, bytes) = decode_data_url(&url).unwrap();
        assert_eq!(mime, "image/gif");
        assert_eq!(bytes, b"GIF89a");
    }

    #[test]
    fn unreadable_files_surface_an_error() {
        let err = load_reference_image("/missing/reference.png").unwrap_err();
        assert!(matches!(err, DirectorsChairError::Io(_)));
    }

    #[test]
    fn unsupported_files_are_rejected_before_reading() {
        let err = load_reference_image("/missing/reference.txt").unwrap_err();
        assert!(matches!(err, DirectorsChairError::UnsupportedImage(_)));
    }
}
