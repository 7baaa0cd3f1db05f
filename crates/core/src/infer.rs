use thiserror::Error;

use crate::model::GENERIC_BINARY_MIME;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InferenceError {
    #[error("extension '{0}' is not in the type registry")]
    UnknownExtension(String),
    #[error("extension '{0}' maps back to the generic binary type")]
    GenericMapping(String),
}

pub fn infer_mime(extension: &str) -> Result<String, InferenceError> {
    let normalized = normalize_extension(extension);
    if normalized.is_empty() {
        return Err(InferenceError::UnknownExtension(normalized));
    }

    let mime = mime_guess::from_ext(&normalized)
        .first_raw()
        .ok_or_else(|| InferenceError::UnknownExtension(normalized.clone()))?;

    if mime == GENERIC_BINARY_MIME {
        return Err(InferenceError::GenericMapping(normalized));
    }

    Ok(mime.to_string())
}

// Membership-only check for the local pre-filter; extensions that map to
// the generic type still pass here.
pub fn known_extension(extension: &str) -> bool {
    let normalized = normalize_extension(extension);
    !normalized.is_empty() && mime_guess::from_ext(&normalized).first_raw().is_some()
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::{infer_mime, known_extension, InferenceError};

    #[test]
    fn uppercase_extension_normalizes() {
        assert_eq!(infer_mime("JPG").unwrap(), "image/jpeg");
    }

    #[test]
    fn leading_separator_is_tolerated() {
        assert_eq!(infer_mime(".mp4").unwrap(), "video/mp4");
    }

    #[test]
    fn generic_mapping_is_rejected() {
        assert_eq!(
            infer_mime("bin"),
            Err(InferenceError::GenericMapping("bin".to_string()))
        );
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert_eq!(
            infer_mime("xyz123"),
            Err(InferenceError::UnknownExtension("xyz123".to_string()))
        );
    }

    #[test]
    fn empty_extension_is_rejected() {
        assert!(matches!(
            infer_mime(""),
            Err(InferenceError::UnknownExtension(_))
        ));
    }

    #[test]
    fn membership_check_admits_generic_mappings() {
        assert!(known_extension("jpg"));
        assert!(known_extension("bin"));
        assert!(!known_extension("xyz123"));
        assert!(!known_extension(""));
    }
}
