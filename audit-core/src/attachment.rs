//! File attachments embedded in evidence links as `data:` URIs

use anyhow::{Context, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use std::fs;
use std::path::Path;

use crate::models::{Evidence, EvidenceDraft};

/// An uploaded file, already encoded for storage in an evidence link
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    /// `data:<mime>;base64,<payload>`
    pub link: String,
}

impl Attachment {
    /// Encodes in-memory file content
    pub fn from_bytes(filename: impl Into<String>, bytes: &[u8]) -> Self {
        let filename = filename.into();
        let mime_type = mime_guess::from_path(&filename)
            .first_or_octet_stream()
            .to_string();
        Self {
            link: encode_data_uri(bytes, &mime_type),
            filename,
        }
    }

    /// Reads and encodes a file from disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("Failed to read attachment: {:?}", path))?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .with_context(|| format!("Attachment path has no file name: {:?}", path))?;

        log::debug!("Encoded attachment {} ({} bytes)", filename, bytes.len());
        Ok(Self::from_bytes(filename, &bytes))
    }

    pub fn apply_to(self, draft: &mut EvidenceDraft) {
        draft.link = self.link;
        draft.filename = Some(self.filename);
    }

    pub fn apply_to_evidence(self, evidence: &mut Evidence) {
        evidence.link = self.link;
        evidence.filename = Some(self.filename);
    }
}

pub fn encode_data_uri(bytes: &[u8], mime_type: &str) -> String {
    format!("data:{};base64,{}", mime_type, STANDARD.encode(bytes))
}

/// Splits a base64 `data:` URI into its MIME type and decoded bytes.
///
/// Returns `None` for plain URLs and for data URIs that are not base64.
pub fn decode_data_uri(link: &str) -> Option<(String, Vec<u8>)> {
    let rest = link.strip_prefix("data:")?;
    let (meta, payload) = rest.split_once(',')?;
    let mime_type = meta.strip_suffix(";base64")?;
    let bytes = STANDARD.decode(payload).ok()?;
    Some((mime_type.to_string(), bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_encode_data_uri() {
        assert_eq!(encode_data_uri(b"hello", "text/plain"), "data:text/plain;base64,aGVsbG8=");
    }

    #[test]
    fn test_from_bytes_guesses_mime() {
        let att = Attachment::from_bytes("laporan.pdf", b"%PDF");
        assert_eq!(att.filename, "laporan.pdf");
        assert!(att.link.starts_with("data:application/pdf;base64,"));

        let att = Attachment::from_bytes("blob", b"\x00\x01");
        assert!(att.link.starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn test_decode_data_uri() {
        let (mime, bytes) = decode_data_uri("data:text/plain;base64,aGVsbG8=").unwrap();
        assert_eq!(mime, "text/plain");
        assert_eq!(bytes, b"hello");

        assert_eq!(decode_data_uri("https://example.org/a.pdf"), None);
        assert_eq!(decode_data_uri("data:text/plain,hello"), None);
    }

    #[test]
    fn test_from_path_applies_to_draft() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        file.write_all(b"isi bukti")?;

        let att = Attachment::from_path(file.path())?;
        let mut draft = EvidenceDraft::new("Dokumen", "Bukti", "Umum");
        att.apply_to(&mut draft);

        assert!(draft.link.starts_with("data:"));
        let (_, bytes) = decode_data_uri(&draft.link).unwrap();
        assert_eq!(bytes, b"isi bukti");
        assert!(draft.filename.is_some());
        Ok(())
    }
}
