use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// The single media type the intake accepts.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A file handed to the intake by drag-and-drop or the file picker.
/// Content is carried for analyzers that want it; the static analyzer ignores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub media_type: String,
    #[serde(skip)]
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.into(),
            content: Bytes::new(),
        }
    }

    pub fn with_content(mut self, content: impl Into<Bytes>) -> Self {
        self.content = content.into();
        self
    }

    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }
}

/// Picks the first PDF out of a multi-file drop.
pub fn first_pdf(files: Vec<UploadedFile>) -> Option<UploadedFile> {
    files.into_iter().find(UploadedFile::is_pdf)
}
