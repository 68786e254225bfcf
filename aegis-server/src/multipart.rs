//! Multipart form parsing helpers
//!
//! Provides reusable abstractions for parsing multipart/form-data uploads,
//! reducing code duplication across the face endpoints.

use std::collections::HashMap;

use axum::extract::Multipart;

use crate::error::ApiError;
use crate::validation::{validate_content_type, validate_file_size};

/// Represents a file uploaded via multipart form
#[derive(Debug, Clone)]
pub struct FileField {
    /// File data bytes
    pub data: Vec<u8>,
    /// Content-Type from the multipart field (if provided)
    pub content_type: Option<String>,
    /// Original filename from the multipart field (if provided)
    pub file_name: Option<String>,
}

/// Parsed multipart form fields
///
/// Provides structured access to the photo and text fields of a
/// multipart/form-data request, with Content-Type and size validation
/// applied while streaming.
#[derive(Debug)]
pub struct MultipartFields {
    /// File field (named "file")
    file: Option<FileField>,
    /// Text fields indexed by name
    text_fields: HashMap<String, String>,
}

impl MultipartFields {
    /// Parse all fields from a multipart request
    ///
    /// # Arguments
    /// * `multipart` - The Axum multipart extractor
    /// * `validate_content_type_flag` - Whether to validate the file Content-Type header
    /// * `max_file_size` - Maximum allowed file size in bytes
    pub async fn parse(
        multipart: &mut Multipart,
        validate_content_type_flag: bool,
        max_file_size: usize,
    ) -> Result<Self, ApiError> {
        let mut file: Option<FileField> = None;
        let mut text_fields = HashMap::new();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Failed to parse multipart: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();

            if name == "file" {
                // Extract file metadata
                let content_type = field.content_type().map(|s| s.to_string());
                let file_name = field.file_name().map(|s| s.to_string());

                // Validate Content-Type if requested
                if validate_content_type_flag {
                    validate_content_type(content_type.as_deref())?;
                }

                // Read file data
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Failed to read file: {}", e)))?
                    .to_vec();

                // Validate file size
                validate_file_size(data.len(), max_file_size)?;

                file = Some(FileField {
                    data,
                    content_type,
                    file_name,
                });
            } else {
                // Text field
                let value = field.text().await.map_err(|e| {
                    ApiError::bad_request(format!("Failed to read field '{}': {}", name, e))
                })?;
                text_fields.insert(name, value);
            }
        }

        Ok(Self { file, text_fields })
    }

    /// Get the file field (required)
    ///
    /// Returns an error if no file was uploaded.
    pub fn require_file(&self) -> Result<&FileField, ApiError> {
        self.file.as_ref().ok_or_else(|| {
            ApiError::bad_request("No file provided. Use 'file' field in multipart form.")
        })
    }

    /// Get a text field value
    ///
    /// Returns `None` if the field is not present.
    pub fn get_text(&self, name: &str) -> Option<&str> {
        self.text_fields.get(name).map(|s| s.as_str())
    }

    /// Get a text field value (required)
    ///
    /// Returns an error if the field is missing or empty.
    pub fn require_text(&self, name: &str) -> Result<&str, ApiError> {
        match self.get_text(name) {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ApiError::bad_request(format!(
                "Missing required field '{}'",
                name
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_text() {
        let mut text_fields = HashMap::new();
        text_fields.insert("email".to_string(), "ada@example.com".to_string());

        let fields = MultipartFields {
            file: None,
            text_fields,
        };

        assert_eq!(fields.get_text("email"), Some("ada@example.com"));
        assert_eq!(fields.get_text("missing"), None);
    }

    #[test]
    fn test_require_text() {
        let mut text_fields = HashMap::new();
        text_fields.insert("email".to_string(), "ada@example.com".to_string());
        text_fields.insert("blank".to_string(), "   ".to_string());

        let fields = MultipartFields {
            file: None,
            text_fields,
        };

        assert_eq!(fields.require_text("email").unwrap(), "ada@example.com");
        assert!(fields.require_text("blank").is_err());
        assert!(fields.require_text("missing").is_err());
    }

    #[test]
    fn test_require_file_missing() {
        let fields = MultipartFields {
            file: None,
            text_fields: HashMap::new(),
        };

        assert!(fields.require_file().is_err());
    }
}
