//! Multipart upload payloads.

use std::path::PathBuf;

/// Contents of a single multipart part.
#[derive(Debug, Clone)]
pub enum UploadPayload {
    /// Plain text value.
    Text(String),
    /// In-memory file contents with the name reported to the server.
    Bytes {
        /// File name used in the part's disposition.
        file_name: String,
        /// Raw contents.
        data: Vec<u8>,
    },
    /// File read from disk at send time.
    File(PathBuf),
}

/// A named part of a multipart form.
#[derive(Debug, Clone)]
pub struct UploadPart {
    /// Form field name.
    pub name: String,
    /// Part contents.
    pub payload: UploadPayload,
}

/// A multipart form body, written in part order.
#[derive(Debug, Clone, Default)]
pub struct UploadForm {
    /// Parts in the order they will be written.
    pub parts: Vec<UploadPart>,
}

impl UploadForm {
    /// Creates an empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a text field.
    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(UploadPart {
            name: name.into(),
            payload: UploadPayload::Text(value.into()),
        });
        self
    }

    /// Appends an in-memory file.
    #[must_use]
    pub fn bytes(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        data: Vec<u8>,
    ) -> Self {
        self.parts.push(UploadPart {
            name: name.into(),
            payload: UploadPayload::Bytes {
                file_name: file_name.into(),
                data,
            },
        });
        self
    }

    /// Appends a file to be read from disk at send time.
    #[must_use]
    pub fn file(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.parts.push(UploadPart {
            name: name.into(),
            payload: UploadPayload::File(path.into()),
        });
        self
    }

    /// Returns `true` when the form has no parts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}
