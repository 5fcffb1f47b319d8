/*!
 * Input and output documents.
 *
 * A `SourceDocument` is immutable for the lifetime of a request; the
 * pipeline only ever reads its bytes. An `OutputDocument` is the rebuilt
 * buffer handed back to the caller.
 */

use bytes::Bytes;
use std::fmt;
use std::str::FromStr;

use crate::errors::PipelineError;

/// MIME type of a WordprocessingML package
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Declared format of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    /// Zip-packaged WordprocessingML (.docx)
    WordProcessing,
    /// Portable Document Format
    Pdf,
    /// UTF-8 plain text
    PlainText,
}

impl DocumentFormat {
    /// Canonical MIME type for the format
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::WordProcessing => DOCX_MIME,
            Self::Pdf => "application/pdf",
            Self::PlainText => "text/plain",
        }
    }

    /// File extension without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::WordProcessing => "docx",
            Self::Pdf => "pdf",
            Self::PlainText => "txt",
        }
    }

    /// Resolve a format from a file name or bare extension
    pub fn from_extension(name: &str) -> Result<Self, PipelineError> {
        let extension = name.rsplit('.').next().unwrap_or(name).to_lowercase();
        match extension.as_str() {
            "docx" => Ok(Self::WordProcessing),
            "pdf" => Ok(Self::Pdf),
            "txt" | "text" => Ok(Self::PlainText),
            _ => Err(PipelineError::UnsupportedFormat(name.to_string())),
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.mime_type())
    }
}

impl FromStr for DocumentFormat {
    type Err = PipelineError;

    /// Accepts MIME types (parameters such as `; charset=utf-8` are ignored)
    /// and short tags.
    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let normalized = tag
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        match normalized.as_str() {
            DOCX_MIME | "docx" | "word" | "wordprocessing" => Ok(Self::WordProcessing),
            "application/pdf" | "pdf" => Ok(Self::Pdf),
            "text/plain" | "txt" | "text" | "plain" => Ok(Self::PlainText),
            _ => Err(PipelineError::UnsupportedFormat(tag.to_string())),
        }
    }
}

/// The uploaded document
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Raw bytes
    pub bytes: Bytes,
    /// Declared format
    pub format: DocumentFormat,
    /// Size in bytes
    pub size: usize,
}

impl SourceDocument {
    /// Wrap a buffer with an already-parsed format
    pub fn new(bytes: impl Into<Bytes>, format: DocumentFormat) -> Self {
        let bytes = bytes.into();
        let size = bytes.len();
        Self { bytes, format, size }
    }

    /// Wrap a buffer with a declared format tag.
    ///
    /// Unknown tags are rejected here, before any byte is inspected.
    pub fn with_tag(bytes: impl Into<Bytes>, tag: &str) -> Result<Self, PipelineError> {
        let format = tag.parse()?;
        Ok(Self::new(bytes, format))
    }
}

/// The rebuilt document
#[derive(Debug, Clone)]
pub struct OutputDocument {
    /// Rebuilt bytes
    pub bytes: Vec<u8>,
    /// Format of the rebuilt bytes
    pub format: DocumentFormat,
    /// Suggested file extension
    pub extension: String,
}

impl OutputDocument {
    /// Create an output document with the format's default extension
    pub fn new(bytes: Vec<u8>, format: DocumentFormat) -> Self {
        Self {
            bytes,
            format,
            extension: format.extension().to_string(),
        }
    }

    /// Suggest a file name next to `original_name`, e.g. `report.es.docx`
    pub fn suggested_file_name(&self, original_name: &str, target_language: &str) -> String {
        let stem = original_name
            .rsplit_once('.')
            .map(|(stem, _)| stem)
            .unwrap_or(original_name);
        format!("{}.{}.{}", stem, target_language, self.extension)
    }
}
