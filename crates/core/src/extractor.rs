use crate::chunking::split_paragraphs;
use crate::error::IngestError;
use crate::traits::TextExtractor;
use lopdf::Document;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

const DOCX_BODY_PART: &str = "word/document.xml";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
    PlainText,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Result<Self, IngestError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "docx" => Ok(Self::Docx),
            "txt" | "text" | "md" => Ok(Self::PlainText),
            _ => Err(IngestError::UnsupportedFormat(format!(
                "{} (expected .pdf, .docx, .txt or .md)",
                path.display()
            ))),
        }
    }
}

#[derive(Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract_paragraphs(&self, path: &Path) -> Result<Vec<String>, IngestError> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes)
            .map_err(|error| IngestError::Decode(format!("{}: {error}", path.display())))?;
        Ok(split_paragraphs(&text))
    }
}

#[derive(Default)]
pub struct LopdfExtractor;

impl TextExtractor for LopdfExtractor {
    fn extract_paragraphs(&self, path: &Path) -> Result<Vec<String>, IngestError> {
        let document =
            Document::load(path).map_err(|error| IngestError::PdfParse(error.to_string()))?;

        let mut text = String::new();
        for page_no in document.get_pages().keys() {
            let page_text = document
                .extract_text(&[*page_no])
                .map_err(|error| IngestError::PdfParse(error.to_string()))?;
            text.push_str(&page_text);
        }

        if text.trim().is_empty() {
            return Err(IngestError::PdfParse(format!(
                "pdf had no readable page text: {}",
                path.display()
            )));
        }

        Ok(split_paragraphs(&text))
    }
}

#[derive(Default)]
pub struct DocxExtractor;

impl TextExtractor for DocxExtractor {
    fn extract_paragraphs(&self, path: &Path) -> Result<Vec<String>, IngestError> {
        let mut archive = ZipArchive::new(File::open(path)?)
            .map_err(|error| IngestError::Docx(format!("{}: {error}", path.display())))?;
        let mut xml = String::new();
        archive
            .by_name(DOCX_BODY_PART)
            .map_err(|error| IngestError::Docx(format!("{}: {error}", path.display())))?
            .read_to_string(&mut xml)?;

        paragraphs_from_document_xml(&xml)
    }
}

pub fn paragraphs_from_document_xml(xml: &str) -> Result<Vec<String>, IngestError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|error| IngestError::Docx(error.to_string()))?;

        match event {
            Event::Start(tag) => match tag.name().as_ref() {
                b"w:p" => current.clear(),
                b"w:t" => in_text_run = true,
                _ => {}
            },
            Event::Empty(tag) => match tag.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" => current.push('\t'),
                b"w:br" | b"w:cr" => current.push('\n'),
                _ => {}
            },
            Event::Text(text) if in_text_run => {
                let unescaped = text
                    .unescape()
                    .map_err(|error| IngestError::Docx(error.to_string()))?;
                current.push_str(&unescaped);
            }
            Event::End(tag) => match tag.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs)
}

pub fn extract_paragraphs(path: &Path) -> Result<Vec<String>, IngestError> {
    match DocumentFormat::from_path(path)? {
        DocumentFormat::Pdf => LopdfExtractor.extract_paragraphs(path),
        DocumentFormat::Docx => DocxExtractor.extract_paragraphs(path),
        DocumentFormat::PlainText => PlainTextExtractor.extract_paragraphs(path),
    }
}
