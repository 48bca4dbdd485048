//! Document intake from files or stdin.
//!
//! Only plain text is extracted; anything else is reported as an
//! unsupported format and the submission is blocked.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::error::QaError;

pub const TEXT_PLAIN: &str = "text/plain";

/// Details shown to the user about a loaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDetails {
    pub name: String,
    pub content_type: String,
    pub size: u64,
}

/// Guess a content type from the file extension
pub fn detect_content_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("txt") | Some("text") | Some("md") => TEXT_PLAIN,
        Some("pdf") => "application/pdf",
        Some("doc") | Some("docx") => "application/msword",
        Some("html") | Some("htm") => "text/html",
        _ => "application/octet-stream",
    }
}

/// Load a document's text, rejecting content types other than plain text
pub fn load_document(path: &Path) -> Result<(FileDetails, String)> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let details = FileDetails {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        content_type: detect_content_type(path).to_string(),
        size: metadata.len(),
    };

    if details.content_type != TEXT_PLAIN {
        return Err(QaError::UnsupportedFormat {
            content_type: details.content_type,
        }
        .into());
    }

    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let text = String::from_utf8(bytes)
        .with_context(|| format!("File is not valid UTF-8: {}", path.display()))?;

    info!(name = %details.name, size = details.size, "Loaded document");
    Ok((details, text))
}

/// Read a document from any reader (stdin in the CLI)
pub fn read_document<R: Read>(mut reader: R) -> Result<String> {
    let mut buffer = String::new();
    reader
        .read_to_string(&mut buffer)
        .context("Failed to read document from stdin")?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_content_type_detection() {
        assert_eq!(detect_content_type(Path::new("notes.txt")), TEXT_PLAIN);
        assert_eq!(detect_content_type(Path::new("README.MD")), TEXT_PLAIN);
        assert_eq!(detect_content_type(Path::new("report.pdf")), "application/pdf");
        assert_eq!(
            detect_content_type(Path::new("no_extension")),
            "application/octet-stream"
        );
    }

    #[test]
    fn test_load_plain_text() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("article.txt");
        std::fs::write(&path, "Rates rose 2%.").unwrap();

        let (details, text) = load_document(&path).unwrap();
        assert_eq!(details.name, "article.txt");
        assert_eq!(details.content_type, TEXT_PLAIN);
        assert_eq!(details.size, 14);
        assert_eq!(text, "Rates rose 2%.");
    }

    #[test]
    fn test_unsupported_format_blocked() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let err = load_document(&path).unwrap_err();
        let qa_err = err.downcast_ref::<QaError>().unwrap();
        assert!(matches!(qa_err, QaError::UnsupportedFormat { .. }));
        assert!(qa_err.is_warning());
    }

    #[test]
    fn test_read_document_from_reader() {
        let text = read_document("piped text".as_bytes()).unwrap();
        assert_eq!(text, "piped text");
    }
}
