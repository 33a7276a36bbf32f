//! PDF text decoding using lopdf and pdf-extract.

use lopdf::Document;
use tracing::{debug, trace};

use super::{DocumentDecoder, Result};
use crate::error::DecodeError;
use crate::models::config::PdfConfig;
use crate::models::rates::DocumentRef;

/// Decodes PDF invoices into text.
#[derive(Debug, Clone)]
pub struct PdfDecoder {
    max_file_size: u64,
}

impl PdfDecoder {
    /// Create a decoder with the default size limit.
    pub fn new() -> Self {
        Self::from_config(&PdfConfig::default())
    }

    pub fn from_config(config: &PdfConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
        }
    }

    /// Set the largest accepted document, in bytes.
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }

    /// Extract the text of an in-memory PDF.
    pub fn decode_bytes(&self, data: &[u8]) -> Result<String> {
        let mut doc = Document::load_mem(data).map_err(|e| DecodeError::Parse(e.to_string()))?;

        // pdf-extract cannot decrypt, so hand it a decrypted copy
        let decrypted;
        let raw: &[u8] = if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(DecodeError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            let mut buffer = Vec::new();
            doc.save_to(&mut buffer)
                .map_err(|e| DecodeError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            decrypted = buffer;
            &decrypted
        } else {
            data
        };

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(DecodeError::NoPages);
        }

        let text = pdf_extract::extract_text_from_mem(raw)
            .map_err(|e| DecodeError::TextExtraction(e.to_string()))?;

        trace!("Extracted {} chars from {} pages", text.len(), page_count);
        Ok(text)
    }
}

impl Default for PdfDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentDecoder for PdfDecoder {
    fn decode(&self, document: &DocumentRef) -> Result<String> {
        let size = std::fs::metadata(document.path())?.len();
        if size > self.max_file_size {
            return Err(DecodeError::TooLarge {
                size,
                limit: self.max_file_size,
            });
        }

        let data = std::fs::read(document.path())?;
        debug!("Decoding {} ({} bytes)", document.name, size);
        self.decode_bytes(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{InvoiceExtractor, RateExtractor};
    use lopdf::{dictionary, Object, Stream};

    /// One-page PDF with each of `lines` on its own text line.
    fn invoice_pdf(lines: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });

        let mut content = String::from("BT /F1 12 Tf 72 720 Td");
        for line in lines {
            content.push_str(&format!(" ({line}) Tj 0 -20 Td"));
        }
        content.push_str(" ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "Font" => dictionary! { "F1" => font_id },
            },
        });
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });
        if let Ok(Object::Dictionary(page)) = doc.get_object_mut(page_id) {
            page.set("Parent", pages_id);
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_decodes_invoice_text() {
        let pdf = invoice_pdf(&["1 USD = 0.9200 EUR", "Total 100.00 USD"]);

        let text = PdfDecoder::new().decode_bytes(&pdf).unwrap();
        let lines: Vec<&str> = text.lines().map(str::trim).collect();

        assert!(lines.contains(&"1 USD = 0.9200 EUR"), "got {text:?}");
        assert!(lines.contains(&"Total 100.00 USD"), "got {text:?}");
    }

    #[test]
    fn test_decoded_file_feeds_extractor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x.pdf");
        std::fs::write(&path, invoice_pdf(&["1 USD = 0.9200 EUR", "Total 100.00 USD"])).unwrap();

        let doc = DocumentRef::from_path(&path);
        let text = PdfDecoder::new().decode(&doc).unwrap();
        let result = RateExtractor::new().extract_from_text(&doc.name, &text).unwrap();

        assert_eq!(result.usd_to_eur.to_string(), "0.92");
        assert_eq!(result.eur_to_usd.to_string(), "1.086");
        assert_eq!(result.total_in_usd.to_string(), "100");
        assert_eq!(result.total_in_eur.to_string(), "92");
    }

    #[test]
    fn test_garbage_is_parse_error() {
        let err = PdfDecoder::new().decode_bytes(b"this is not a pdf").unwrap_err();
        assert!(matches!(err, DecodeError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let doc = DocumentRef::from_path(dir.path().join("gone.pdf"));

        let err = PdfDecoder::new().decode(&doc).unwrap_err();
        assert!(matches!(err, DecodeError::Io(_)));
    }

    #[test]
    fn test_size_limit() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.pdf");
        std::fs::write(&path, vec![b'%'; 2048]).unwrap();

        let decoder = PdfDecoder::new().with_max_file_size(1024);
        let err = decoder.decode(&DocumentRef::from_path(&path)).unwrap_err();
        assert!(matches!(err, DecodeError::TooLarge { size: 2048, limit: 1024 }));
    }
}
