//! Client-side validation run before any write leaves the process.
//!
//! A violation blocks submission entirely; there is no partial submit. The
//! server re-validates everything, so these checks exist to fail fast and to
//! keep garbage out of write payloads, not to be authoritative.

use thiserror::Error;

/// Maximum accepted photo size: 5 MiB.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// A blocked-submission reason, surfaced verbatim to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Names take letters and spaces only (backend enforces `^[A-Za-z\s]+$`).
pub fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "is required"));
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphabetic() || c.is_whitespace())
    {
        return Err(ValidationError::new(
            field,
            "should contain only letters and spaces",
        ));
    }
    Ok(())
}

/// ID numbers follow the fixed `XXXX-XXXX` digit pattern.
pub fn validate_id_number(value: &str) -> Result<(), ValidationError> {
    let ok = value.len() == 9
        && value.as_bytes()[4] == b'-'
        && value
            .bytes()
            .enumerate()
            .all(|(i, b)| if i == 4 { b == b'-' } else { b.is_ascii_digit() });
    if ok {
        Ok(())
    } else {
        Err(ValidationError::new(
            "id_number",
            "must follow the format XXXX-XXXX (digits only)",
        ))
    }
}

/// Required-field check for select-style inputs.
pub fn validate_required(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::new(field, "is required"))
    } else {
        Ok(())
    }
}

/// Accepted photo formats, sniffed from content rather than trusted from a
/// filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoFormat {
    Jpeg,
    Png,
    Webp,
}

impl PhotoFormat {
    #[must_use]
    pub const fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }
}

/// Validate photo bytes before upload: recognized format and within the
/// size cap. Returns the sniffed format so the caller can name the object.
pub fn validate_photo(bytes: &[u8]) -> Result<PhotoFormat, ValidationError> {
    if bytes.len() > MAX_PHOTO_BYTES {
        return Err(ValidationError::new("photo", "must be 5 MB or smaller"));
    }
    PhotoFormat::sniff(bytes)
        .ok_or_else(|| ValidationError::new("photo", "must be a JPEG, PNG, or WebP image"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn id_number_requires_hyphen() {
        assert!(validate_id_number("2025001").is_err());
        assert!(validate_id_number("2025-0001").is_ok());
    }

    #[test]
    fn id_number_rejects_non_digits_and_bad_shape() {
        assert!(validate_id_number("20a5-0001").is_err());
        assert!(validate_id_number("2025-001").is_err());
        assert!(validate_id_number("2025_0001").is_err());
        assert!(validate_id_number("").is_err());
    }

    #[test]
    fn names_take_letters_and_spaces_only() {
        assert!(validate_name("first_name", "Ana Maria").is_ok());
        assert!(validate_name("first_name", "An4").is_err());
        assert!(validate_name("first_name", "O'Neil").is_err());
        assert!(validate_name("first_name", "   ").is_err());
    }

    #[test]
    fn photo_sniffing_recognizes_formats() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0, 0];
        assert_eq!(validate_photo(&jpeg), Ok(PhotoFormat::Jpeg));

        let png = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];
        assert_eq!(validate_photo(&png), Ok(PhotoFormat::Png));

        let mut webp = b"RIFF".to_vec();
        webp.extend_from_slice(&[0, 0, 0, 0]);
        webp.extend_from_slice(b"WEBP");
        assert_eq!(validate_photo(&webp), Ok(PhotoFormat::Webp));

        assert!(validate_photo(b"GIF89a").is_err());
    }

    #[test]
    fn photo_size_cap_enforced() {
        let mut big = vec![0xFF, 0xD8, 0xFF];
        big.resize(MAX_PHOTO_BYTES + 1, 0);
        let err = validate_photo(&big).expect_err("over the cap");
        assert_eq!(err.field, "photo");
    }
}
