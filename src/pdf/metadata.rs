//! PDF metadata extraction

use std::path::Path;
use lopdf::{Document, Object};
use crate::error::{Error, Result};

/// PDF metadata
#[derive(Debug, Clone)]
pub struct PdfMetadata {
    /// Number of pages in the PDF
    pub page_count: usize,
    /// PDF header version, e.g. "1.5"
    pub version: String,
    /// Document title (if present)
    pub title: Option<String>,
    /// Document author (if present)
    pub author: Option<String>,
}

/// Decode a PDF text string: UTF-16BE with BOM, otherwise treated as Latin-1/ASCII
fn decode_text_string(bytes: &[u8]) -> String {
    if let Some(utf16) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = utf16
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        return String::from_utf16_lossy(&units);
    }
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

/// Look up a string entry of the document information dictionary
fn info_string(doc: &Document, key: &[u8]) -> Option<String> {
    let info = match doc.trailer.get(b"Info").ok()? {
        Object::Reference(id) => doc.get_object(*id).ok()?.as_dict().ok()?,
        Object::Dictionary(dict) => dict,
        _ => return None,
    };
    let value = info.get(key).ok()?.as_str().ok()?;
    let text = decode_text_string(value);
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

fn load_checked(path: &Path) -> Result<(Document, usize)> {
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }

    let doc = Document::load(path)?;
    // get_pages walks the whole tree, so nested Pages nodes are counted too
    let page_count = doc.get_pages().len();

    if page_count == 0 {
        return Err(Error::EmptyPdf(path.to_path_buf()));
    }
    Ok((doc, page_count))
}

/// Extract metadata from a PDF file
pub fn extract_metadata(path: &Path) -> Result<PdfMetadata> {
    let (doc, page_count) = load_checked(path)?;

    Ok(PdfMetadata {
        page_count,
        version: doc.version.clone(),
        title: info_string(&doc, b"Title"),
        author: info_string(&doc, b"Author"),
    })
}

/// Count the number of pages in a PDF file
pub fn count_pages(path: &Path) -> Result<usize> {
    load_checked(path).map(|(_, count)| count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pdf::merge::tests::sample_document;
    use lopdf::{dictionary, StringFormat};
    use tempfile::TempDir;

    #[test]
    fn test_count_pages_nonexistent_file() {
        let result = count_pages(Path::new("nonexistent.pdf"));
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_extract_metadata_nonexistent_file() {
        let result = extract_metadata(Path::new("nonexistent.pdf"));
        assert!(matches!(result.unwrap_err(), Error::FileNotFound(_)));
    }

    #[test]
    fn test_extract_metadata_reads_info_dictionary() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("info.pdf");

        let mut doc = sample_document(3, 612);
        let info_id = doc.add_object(dictionary! {
            "Title" => Object::String(b"Quarterly Receipts".to_vec(), StringFormat::Literal),
            "Author" => Object::String(
                vec![0xFE, 0xFF, 0x00, b'A', 0x00, b'n', 0x00, b'n'],
                StringFormat::Hexadecimal,
            ),
        });
        doc.trailer.set("Info", info_id);
        doc.save(&path).unwrap();

        let metadata = extract_metadata(&path).unwrap();
        assert_eq!(metadata.page_count, 3);
        assert_eq!(metadata.title.as_deref(), Some("Quarterly Receipts"));
        assert_eq!(metadata.author.as_deref(), Some("Ann"));
        assert_eq!(count_pages(&path).unwrap(), 3);
    }

    #[test]
    fn test_decode_text_string_latin1_fallback() {
        assert_eq!(decode_text_string(&[b'C', 0xE9]), "Cé");
    }
}
