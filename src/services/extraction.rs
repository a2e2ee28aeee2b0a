// Text Extraction Service
// Converts uploaded .txt / .pdf / .docx files into plain text for analysis

use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

pub const SUPPORTED_EXTENSIONS: &[&str] = &["pdf", "docx", "txt"];

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unsupported file type '{0}'. Use .pdf, .docx or .txt")]
    UnsupportedFormat(String),
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
    #[error("PDF extraction failed: {0}")]
    Pdf(String),
    #[error("DOCX extraction failed: {0}")]
    Docx(String),
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

pub fn is_supported(file_name: &str) -> bool {
    SUPPORTED_EXTENSIONS.contains(&extension_of(file_name).as_str())
}

/// Extract plain text from file contents, dispatching on the file extension.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let ext = extension_of(file_name);
    debug!(file = file_name, ext = %ext, bytes = bytes.len(), "extract.start");
    match ext.as_str() {
        "txt" => Ok(decode_txt(bytes)),
        "pdf" => extract_pdf(bytes),
        "docx" => extract_docx(bytes),
        _ => Err(ExtractError::UnsupportedFormat(ext)),
    }
}

/// Read a file from disk and extract its text.
pub fn extract_file(path: &Path) -> Result<String, ExtractError> {
    let file_name = path
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    // Reject early so unsupported files are never read.
    if !is_supported(&file_name) {
        return Err(ExtractError::UnsupportedFormat(extension_of(&file_name)));
    }
    let bytes = std::fs::read(path)?;
    extract_text(&file_name, &bytes)
}

fn decode_txt(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    text.strip_prefix('\u{feff}').unwrap_or(&text).to_string()
}

fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let raw = pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;
    Ok(tidy_lines(&raw, true))
}

fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    match docx_rs::read_docx(bytes) {
        Ok(docx) => Ok(tidy_lines(&docx_paragraphs(&docx).join("\n"), false)),
        Err(e) => {
            warn!(error = ?e, "docx.reader_failed, falling back to raw document.xml");
            let xml = read_document_xml(bytes)?;
            Ok(tidy_lines(&xml_paragraphs(&xml)?.join("\n"), false))
        }
    }
}

/// One line per body paragraph, table cell paragraphs included, in document order.
fn docx_paragraphs(docx: &docx_rs::Docx) -> Vec<String> {
    use docx_rs::DocumentChild;

    let mut out = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(paragraph) => out.push(paragraph_text(paragraph)),
            DocumentChild::Table(table) => table_paragraphs(table, &mut out),
            _ => {}
        }
    }
    out
}

fn table_paragraphs(table: &docx_rs::Table, out: &mut Vec<String>) {
    use docx_rs::{TableCellContent, TableChild, TableRowChild};

    for TableChild::TableRow(row) in &table.rows {
        for TableRowChild::TableCell(cell) in &row.cells {
            for content in &cell.children {
                match content {
                    TableCellContent::Paragraph(paragraph) => out.push(paragraph_text(paragraph)),
                    TableCellContent::Table(nested) => table_paragraphs(nested, out),
                    _ => {}
                }
            }
        }
    }
}

fn paragraph_text(paragraph: &docx_rs::Paragraph) -> String {
    let mut line = String::new();
    push_children_text(&paragraph.children, &mut line);
    line
}

fn push_children_text(children: &[docx_rs::ParagraphChild], line: &mut String) {
    use docx_rs::{InsertChild, ParagraphChild};

    for pc in children {
        match pc {
            ParagraphChild::Run(run) => push_run_text(run, line),
            ParagraphChild::Hyperlink(link) => push_children_text(&link.children, line),
            ParagraphChild::Insert(insert) => {
                for ic in &insert.children {
                    if let InsertChild::Run(run) = ic {
                        push_run_text(run, line);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run_text(run: &docx_rs::Run, line: &mut String) {
    use docx_rs::RunChild;

    for rc in &run.children {
        match rc {
            RunChild::Text(t) => line.push_str(&t.text),
            RunChild::Tab(_) => line.push('\t'),
            _ => {}
        }
    }
}

fn read_document_xml(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(bytes))
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    let mut entry = archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractError::Docx(e.to_string()))?;
    let mut xml = String::new();
    entry.read_to_string(&mut xml)?;
    Ok(xml)
}

/// Paragraph texts from raw WordprocessingML: the `w:t` runs of each `w:p`,
/// with `w:tab` as a tab. Entity and character references are decoded.
fn xml_paragraphs(xml: &str) -> Result<Vec<String>, ExtractError> {
    use quick_xml::events::Event;

    let mut reader = quick_xml::Reader::from_str(xml);
    let mut out = Vec::new();
    let mut line = String::new();
    let mut in_paragraph = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Start(e)) => match e.name().as_ref() {
                b"w:p" => {
                    in_paragraph = true;
                    line.clear();
                }
                b"w:t" => in_text = in_paragraph,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:p" => out.push(String::new()),
                b"w:tab" if in_paragraph => line.push('\t'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| ExtractError::Docx(e.to_string()))?;
                line.push_str(&text);
            }
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" if in_paragraph => {
                    in_paragraph = false;
                    out.push(std::mem::take(&mut line));
                }
                _ => {}
            },
            Ok(_) => {}
            Err(e) => {
                return Err(ExtractError::Docx(format!(
                    "document.xml at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
        }
    }
    Ok(out)
}

/// Normalize extracted text: non-breaking spaces become spaces, line endings
/// are unified and every line is trimmed. Blank lines are dropped unless
/// `keep_blank` is set.
pub fn tidy_lines(text: &str, keep_blank: bool) -> String {
    let s = text
        .replace('\u{00A0}', " ")
        .replace("\r\n", "\n")
        .replace('\r', "\n");

    s.lines()
        .map(str::trim)
        .filter(|ln| keep_blank || !ln.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}
