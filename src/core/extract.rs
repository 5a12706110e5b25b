//! Per-format text extractors and the dispatch over [`DocumentFormat`].
//!
//! Extraction failures never reach the clause pipeline as errors: they are
//! logged and turned into a short diagnostic string which then flows through
//! segmentation like any other text.

use crate::domain::model::DocumentFormat;
use crate::domain::ports::TextExtractor;
use crate::utils::error::{EtlError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

pub const UNSUPPORTED_FORMAT_MESSAGE: &str = "Unsupported file format.";

const DOCX_BODY_PART: &str = "word/document.xml";

pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        // pdf-extract 遇到部分損毀的 PDF 會 panic
        let outcome =
            std::panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));

        match outcome {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(extraction_error(self.format(), e)),
            Err(_) => Err(extraction_error(self.format(), "parser panicked")),
        }
    }
}

/// Reads the body part of a DOCX (zip) package. Every paragraph becomes one
/// line, matching how word processors lay the text out.
pub struct DocxExtractor;

impl DocxExtractor {
    /// Converts WordprocessingML to plain text.
    ///
    /// Only `w:t` runs contribute text, so field codes (`w:instrText`) and
    /// tracked deletions (`w:delText`) stay out. Tabs and breaks count only
    /// inside a run; tab-stop definitions in paragraph properties do not.
    pub fn xml_to_text(xml: &str) -> Result<String> {
        let mut reader = Reader::from_str(xml);
        let mut text = String::new();
        let mut run_depth = 0usize;
        let mut in_text = false;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| extraction_error(DocumentFormat::Docx, e))?;

            match event {
                Event::Start(e) => match e.name().as_ref() {
                    b"w:r" => run_depth += 1,
                    b"w:t" => in_text = true,
                    name => push_run_mark(name, run_depth, &mut text),
                },
                // 空段落 <w:p/> 也要留下一個換行
                Event::Empty(e) => match e.name().as_ref() {
                    b"w:p" => text.push('\n'),
                    name => push_run_mark(name, run_depth, &mut text),
                },
                Event::Text(e) if in_text => {
                    let unescaped = e
                        .unescape()
                        .map_err(|e| extraction_error(DocumentFormat::Docx, e))?;
                    text.push_str(&unescaped);
                }
                Event::End(e) => match e.name().as_ref() {
                    b"w:r" => run_depth = run_depth.saturating_sub(1),
                    b"w:t" => in_text = false,
                    b"w:p" => text.push('\n'),
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(text)
    }
}

fn push_run_mark(name: &[u8], run_depth: usize, text: &mut String) {
    if run_depth == 0 {
        return;
    }
    match name {
        b"w:tab" => text.push('\t'),
        b"w:br" | b"w:cr" => text.push('\n'),
        _ => {}
    }
}

impl TextExtractor for DocxExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| extraction_error(self.format(), e))?;
        let mut part = archive
            .by_name(DOCX_BODY_PART)
            .map_err(|e| extraction_error(self.format(), format!("{}: {}", DOCX_BODY_PART, e)))?;

        let mut xml = String::new();
        part.read_to_string(&mut xml)
            .map_err(|e| extraction_error(self.format(), e))?;

        Self::xml_to_text(&xml)
    }
}

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Text
    }

    fn extract(&self, bytes: &[u8]) -> Result<String> {
        let text = String::from_utf8_lossy(bytes);
        // BOM 不屬於內容
        Ok(text.trim_start_matches('\u{feff}').to_string())
    }
}

pub fn extractor_for(format: DocumentFormat) -> Option<Box<dyn TextExtractor>> {
    match format {
        DocumentFormat::Pdf => Some(Box::new(PdfExtractor)),
        DocumentFormat::Docx => Some(Box::new(DocxExtractor)),
        DocumentFormat::Text => Some(Box::new(PlainTextExtractor)),
        DocumentFormat::Unknown => None,
    }
}

/// Best-effort text for `bytes`. Returns a diagnostic string instead of an
/// error when the format is unknown or the extractor fails.
pub fn extract_text(format: DocumentFormat, bytes: &[u8]) -> String {
    let Some(extractor) = extractor_for(format) else {
        tracing::warn!("⚠️ Unsupported document format, no text extracted");
        return UNSUPPORTED_FORMAT_MESSAGE.to_string();
    };

    match extractor.extract(bytes) {
        Ok(text) => {
            tracing::debug!("Extracted {} characters of {} text", text.len(), format);
            text
        }
        Err(e) => {
            tracing::warn!("⚠️ {} (Category: {:?})", e, e.category());
            format!("Error extracting {} text: {}", format, e)
        }
    }
}

fn extraction_error(format: DocumentFormat, message: impl std::fmt::Display) -> EtlError {
    EtlError::ExtractionError {
        format: format.to_string(),
        message: message.to_string(),
    }
}
