//! # Upload forms
//!
//! Transport-neutral description of the multipart forms behind
//! `POST /knowledge/upload/` (new resource) and
//! `POST /knowledge/resources/{id}/versions/` (new version). The client
//! turns [`ResourceUpload::text_fields`] plus the file into a multipart
//! body.
//!
//! Blank optional fields are left out of the form entirely. Metadata is
//! sent as one JSON object field; pairs with a blank key are dropped, and
//! for new resources pairs with a blank value are dropped too.

use serde_json::{Map, Value};

use crate::error::{ValidationError, ValidationResult};

/// Which upload endpoint a form targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadKind {
    /// A brand-new resource
    NewResource,
    /// A new version of an existing resource
    NewVersion,
}

/// A file held in memory for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// File name sent with the part
    pub file_name: String,
    /// Raw contents
    pub bytes: Vec<u8>,
    /// Content type, if known
    pub mime_type: Option<String>,
}

impl FileUpload {
    /// Wrap file contents.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            mime_type: None,
        }
    }

    /// Set the content type.
    pub fn with_mime(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }
}

/// Fields of a resource or version upload.
///
/// # Examples
///
/// ```
/// use dkn_knowledge::upload::{FileUpload, ResourceUpload, UploadKind};
///
/// let form = ResourceUpload::default()
///     .title("Safety handbook")
///     .tags("safety, onboarding")
///     .metadata("department", "ops")
///     .metadata("  ", "dropped")
///     .file(FileUpload::new("handbook.pdf", b"%PDF".to_vec()));
///
/// assert!(form.validate(UploadKind::NewResource).is_ok());
/// let fields = form.text_fields(UploadKind::NewResource);
/// assert!(fields.contains(&("metadata", r#"{"department":"ops"}"#.to_string())));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceUpload {
    pub title: String,
    pub description: String,
    /// Comma-separated tags, sent verbatim
    pub tags: String,
    /// Metadata key/value pairs in entry order
    pub metadata: Vec<(String, String)>,
    pub notes: String,
    pub file: Option<FileUpload>,
}

impl ResourceUpload {
    /// Set the title.
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the comma-separated tags.
    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    /// Add one metadata pair.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }

    /// Set the version notes.
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Attach the file.
    pub fn file(mut self, file: FileUpload) -> Self {
        self.file = Some(file);
        self
    }

    /// Check the form before any request is sent.
    ///
    /// # Errors
    ///
    /// - [`ValidationError::MissingFile`] when no file is attached
    /// - [`ValidationError::MissingField`] for a new resource without title
    pub fn validate(&self, kind: UploadKind) -> ValidationResult<()> {
        if self.file.is_none() {
            return Err(ValidationError::MissingFile);
        }
        if kind == UploadKind::NewResource && self.title.trim().is_empty() {
            return Err(ValidationError::MissingField("title"));
        }
        Ok(())
    }

    /// Metadata object to send, or `None` when no pair survives filtering.
    pub fn metadata_object(&self, kind: UploadKind) -> Option<Map<String, Value>> {
        let mut object = Map::new();
        for (key, value) in &self.metadata {
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            let value = match kind {
                UploadKind::NewResource => {
                    let trimmed = value.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    trimmed
                }
                UploadKind::NewVersion => value.as_str(),
            };
            object.insert(key.to_string(), Value::String(value.to_string()));
        }
        (!object.is_empty()).then_some(object)
    }

    /// Non-file form fields, in the order they are appended.
    pub fn text_fields(&self, kind: UploadKind) -> Vec<(&'static str, String)> {
        let mut fields = Vec::new();

        match kind {
            UploadKind::NewResource => fields.push(("title", self.title.clone())),
            UploadKind::NewVersion if !self.title.is_empty() => {
                fields.push(("title", self.title.clone()))
            }
            UploadKind::NewVersion => {}
        }
        if !self.description.is_empty() {
            fields.push(("description", self.description.clone()));
        }
        if !self.tags.trim().is_empty() {
            fields.push(("tags", self.tags.clone()));
        }
        if let Some(metadata) = self.metadata_object(kind) {
            fields.push(("metadata", Value::Object(metadata).to_string()));
        }
        if !self.notes.is_empty() {
            fields.push(("notes", self.notes.clone()));
        }

        fields
    }
}
