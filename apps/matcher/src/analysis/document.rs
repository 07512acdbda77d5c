//! Resume text extraction. Each supported format is a black box behind `TextExtractor`.

use std::io::{Cursor, Read};
use std::sync::OnceLock;

use anyhow::{anyhow, Context, Result};
use regex::Regex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    Txt,
}

impl DocumentKind {
    /// Detects the format from the file extension, ignoring case.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let lower = filename.to_lowercase();
        if lower.ends_with(".pdf") {
            Some(Self::Pdf)
        } else if lower.ends_with(".docx") {
            Some(Self::Docx)
        } else if lower.ends_with(".txt") {
            Some(Self::Txt)
        } else {
            None
        }
    }
}

/// Turns uploaded bytes into plain text. Blocking; call from `spawn_blocking`.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, kind: DocumentKind, bytes: &[u8]) -> Result<String>;
}

/// PDF via `pdf-extract`, DOCX from the zip container's `word/document.xml`, TXT as UTF-8.
pub struct StandardTextExtractor;

impl TextExtractor for StandardTextExtractor {
    fn extract(&self, kind: DocumentKind, bytes: &[u8]) -> Result<String> {
        match kind {
            DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
                .map_err(|e| anyhow!("PDF extraction error: {e}")),
            DocumentKind::Docx => docx_to_text(bytes),
            DocumentKind::Txt => Ok(String::from_utf8_lossy(bytes).into_owned()),
        }
    }
}

fn docx_to_text(bytes: &[u8]) -> Result<String> {
    let mut archive =
        zip::ZipArchive::new(Cursor::new(bytes)).context("DOCX is not a valid zip container")?;
    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("DOCX is missing word/document.xml")?
        .read_to_string(&mut xml)
        .context("DOCX document.xml is not valid UTF-8")?;
    Ok(document_xml_to_text(&xml))
}

/// One line per `<w:p>` paragraph, built from its `<w:t>` runs.
fn document_xml_to_text(xml: &str) -> String {
    static TEXT_RUN: OnceLock<Regex> = OnceLock::new();
    let text_run = TEXT_RUN.get_or_init(|| {
        Regex::new(r"<w:t(?:\s[^>]*)?>([^<]*)</w:t>").expect("valid text-run regex")
    });

    let mut text = String::new();
    for paragraph in xml.split("</w:p>") {
        let line: String = text_run
            .captures_iter(paragraph)
            .filter_map(|c| c.get(1))
            .map(|m| unescape_xml(m.as_str()))
            .collect();
        if !line.is_empty() {
            text.push_str(&line);
            text.push('\n');
        }
    }
    text
}

fn unescape_xml(s: &str) -> String {
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
