//! Upload payload handling: bytes + MIME type, base64-encoded for the
//! provider's inline-data part.

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::path::Path;

/// Accepted upload formats.
const MIME_BY_EXTENSION: [(&str, &str); 7] = [
    ("pdf", "application/pdf"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("xml", "text/xml"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("xls", "application/vnd.ms-excel"),
];

/// MIME type for a lowercase file extension, if the format is accepted.
pub fn mime_for_extension(ext: &str) -> Option<&'static str> {
    MIME_BY_EXTENSION
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, m)| *m)
}

/// A document to extract from: raw bytes and their declared MIME type,
/// forwarded unmodified to the extraction client.
#[derive(Debug, Clone)]
pub struct DocumentPayload {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl DocumentPayload {
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
        }
    }

    /// Read a file, deriving the MIME type from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        let Some(mime) = mime_for_extension(&ext) else {
            bail!(
                "định dạng '.{ext}' không được hỗ trợ (chấp nhận: pdf, jpg, jpeg, png, xml, xlsx, xls)"
            );
        };
        let data =
            std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        if data.is_empty() {
            bail!("file rỗng: {}", path.display());
        }
        Ok(Self::new(data, mime))
    }

    /// Base64 content for the inline-data request part.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_table() {
        assert_eq!(mime_for_extension("pdf"), Some("application/pdf"));
        assert_eq!(mime_for_extension("jpeg"), Some("image/jpeg"));
        assert_eq!(mime_for_extension("docx"), None);
    }

    #[test]
    fn test_base64_round_trip() {
        let payload = DocumentPayload::new(vec![0xFF, 0x00, 0x41], "image/png");
        let encoded = payload.to_base64();
        assert_eq!(STANDARD.decode(&encoded).unwrap(), payload.data);
    }

    #[test]
    fn test_from_path_rejects_unknown_extension() {
        let path = std::env::temp_dir().join("dossier-payload-test.docx");
        std::fs::write(&path, b"x").unwrap();
        let err = DocumentPayload::from_path(&path).unwrap_err();
        assert!(err.to_string().contains("không được hỗ trợ"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_from_path_rejects_empty_file() {
        let path = std::env::temp_dir().join("dossier-payload-empty.pdf");
        std::fs::write(&path, b"").unwrap();
        assert!(DocumentPayload::from_path(&path).is_err());
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_from_path_reads_mime_case_insensitively() {
        let path = std::env::temp_dir().join("dossier-payload-test.PDF");
        std::fs::write(&path, b"%PDF-1.4").unwrap();
        let payload = DocumentPayload::from_path(&path).unwrap();
        assert_eq!(payload.mime_type, "application/pdf");
        std::fs::remove_file(&path).ok();
    }
}
