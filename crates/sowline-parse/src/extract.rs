//! Format sniffing and raw content extraction.
//!
//! Spreadsheets become a [`Grid`]; everything else becomes flat text. The
//! readers are synchronous and run on tokio's blocking pool, which also
//! contains any panic raised inside a third-party reader.

use crate::error::{ExtractError, ExtractResult};
use calamine::{open_workbook_auto_from_rs, Data, Reader};
use std::any::Any;
use std::io::Cursor;
use tracing::debug;

/// Document family derived from a caller-supplied MIME-like string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Spreadsheet,
    Pdf,
    Word,
    Text,
}

impl FileKind {
    /// Classify by case-sensitive substring checks, spreadsheets first.
    pub fn detect(file_type: &str) -> Self {
        let has = |needles: &[&str]| needles.iter().any(|n| file_type.contains(n));

        if has(&["spreadsheet", "excel", "xlsx", "xls"]) {
            FileKind::Spreadsheet
        } else if has(&["pdf"]) {
            FileKind::Pdf
        } else if has(&["word", "docx", "doc"]) {
            FileKind::Word
        } else {
            FileKind::Text
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileKind::Spreadsheet => "spreadsheet",
            FileKind::Pdf => "pdf",
            FileKind::Word => "word",
            FileKind::Text => "text",
        }
    }
}

/// MIME type for a file extension the parser understands.
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    match extension.to_lowercase().as_str() {
        "xlsx" => Some("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
        "xls" => Some("application/vnd.ms-excel"),
        "pdf" => Some("application/pdf"),
        "docx" => Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
        "doc" => Some("application/msword"),
        "txt" | "text" => Some("text/plain"),
        "md" | "markdown" => Some("text/markdown"),
        "csv" => Some("text/csv"),
        _ => None,
    }
}

/// First sheet of a workbook: a header row plus non-blank data rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grid {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Grid {
    /// Build a grid from raw cell text. Row 0 becomes the trimmed headers;
    /// rows where every cell is empty are dropped.
    pub fn from_rows(raw: Vec<Vec<String>>) -> Self {
        let mut raw = raw.into_iter();
        let headers = match raw.next() {
            Some(first) => first.iter().map(|h| h.trim().to_string()).collect(),
            None => return Self::default(),
        };
        let rows = raw
            .filter(|row| row.iter().any(|cell| !cell.is_empty()))
            .collect();

        Self { headers, rows }
    }

    /// Cell text, or `""` when the row is shorter than `column`.
    pub fn cell(row: &[String], column: usize) -> &str {
        row.get(column).map(String::as_str).unwrap_or("")
    }

    /// Tab-separated rendering used as AI input.
    pub fn to_tsv(&self) -> String {
        std::iter::once(self.headers.join("\t"))
            .chain(self.rows.iter().map(|row| row.join("\t")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Read the first sheet of an xlsx/xls/ods buffer.
pub fn read_grid(buffer: &[u8]) -> ExtractResult<Grid> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(buffer.to_vec()))
        .map_err(|e| ExtractError::Spreadsheet(e.to_string()))?;

    let range = match workbook.worksheet_range_at(0) {
        Some(range) => range.map_err(|e| ExtractError::Spreadsheet(e.to_string()))?,
        None => return Ok(Grid::default()),
    };

    let raw: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_text).collect())
        .collect();
    let grid = Grid::from_rows(raw);

    debug!(
        "Read spreadsheet: {} headers, {} data rows",
        grid.headers.len(),
        grid.rows.len()
    );
    Ok(grid)
}

/// Extract all text from a PDF buffer.
pub fn read_pdf_text(buffer: &[u8]) -> ExtractResult<String> {
    let text =
        pdf_extract::extract_text_from_mem(buffer).map_err(|e| ExtractError::Pdf(e.to_string()))?;
    debug!("Extracted {} characters from PDF", text.len());
    Ok(text)
}

/// Extract raw text from a .docx buffer. Tables come out one row per line
/// with tab-separated cells.
pub fn read_word_text(buffer: &[u8]) -> ExtractResult<String> {
    let docx = docx_rs::read_docx(buffer).map_err(|e| ExtractError::Word(e.to_string()))?;

    let mut text = String::new();
    for child in &docx.document.children {
        push_document_child(child, &mut text);
    }

    debug!("Extracted {} characters from Word document", text.len());
    Ok(text)
}

fn push_document_child(child: &docx_rs::DocumentChild, out: &mut String) {
    match child {
        docx_rs::DocumentChild::Paragraph(para) => {
            push_paragraph(para, out);
            out.push('\n');
        }
        docx_rs::DocumentChild::Table(table) => {
            for row in &table.rows {
                let docx_rs::TableChild::TableRow(tr) = row;
                let mut cells = Vec::with_capacity(tr.cells.len());
                for cell in &tr.cells {
                    let docx_rs::TableRowChild::TableCell(tc) = cell;
                    let mut cell_text = String::new();
                    for content in &tc.children {
                        if let docx_rs::TableCellContent::Paragraph(para) = content {
                            if !cell_text.is_empty() {
                                cell_text.push(' ');
                            }
                            push_paragraph(para, &mut cell_text);
                        }
                    }
                    cells.push(cell_text);
                }
                out.push_str(&cells.join("\t"));
                out.push('\n');
            }
        }
        _ => {}
    }
}

fn push_paragraph(para: &docx_rs::Paragraph, out: &mut String) {
    for child in &para.children {
        match child {
            docx_rs::ParagraphChild::Run(run) => push_run(run, out),
            docx_rs::ParagraphChild::Hyperlink(link) => {
                for link_child in &link.children {
                    if let docx_rs::ParagraphChild::Run(run) = link_child {
                        push_run(run, out);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run(run: &docx_rs::Run, out: &mut String) {
    for run_child in &run.children {
        match run_child {
            docx_rs::RunChild::Text(text) => out.push_str(&text.text),
            docx_rs::RunChild::Tab(_) => out.push('\t'),
            _ => {}
        }
    }
}

/// Flat text of a document, as fed to the AI parser. Spreadsheets are
/// rendered as tab-separated rows.
pub fn read_text(buffer: &[u8], kind: FileKind) -> ExtractResult<String> {
    match kind {
        FileKind::Spreadsheet => Ok(read_grid(buffer)?.to_tsv()),
        FileKind::Pdf => read_pdf_text(buffer),
        FileKind::Word => read_word_text(buffer),
        FileKind::Text => Ok(String::from_utf8_lossy(buffer).into_owned()),
    }
}

/// [`read_grid`] on the blocking pool.
pub async fn load_grid(buffer: &[u8]) -> ExtractResult<Grid> {
    let bytes = buffer.to_vec();
    run_blocking(move || read_grid(&bytes)).await
}

/// [`read_text`] on the blocking pool.
pub async fn load_text(buffer: &[u8], kind: FileKind) -> ExtractResult<String> {
    let bytes = buffer.to_vec();
    run_blocking(move || read_text(&bytes, kind)).await
}

async fn run_blocking<T, F>(task: F) -> ExtractResult<T>
where
    F: FnOnce() -> ExtractResult<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(task).await {
        Ok(result) => result,
        Err(e) if e.is_panic() => Err(ExtractError::Task(panic_message(e.into_panic()))),
        Err(e) => Err(ExtractError::Task(e.to_string())),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "reader panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{docx, pdf, xlsx};

    fn strings(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_detect_file_kind() {
        assert_eq!(
            FileKind::detect("application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"),
            FileKind::Spreadsheet
        );
        assert_eq!(FileKind::detect("application/vnd.ms-excel"), FileKind::Spreadsheet);
        assert_eq!(FileKind::detect("xls"), FileKind::Spreadsheet);
        assert_eq!(FileKind::detect("application/pdf"), FileKind::Pdf);
        assert_eq!(FileKind::detect("application/msword"), FileKind::Word);
        assert_eq!(
            FileKind::detect("application/vnd.openxmlformats-officedocument.wordprocessingml.document"),
            FileKind::Word
        );
        assert_eq!(FileKind::detect("text/plain"), FileKind::Text);
        assert_eq!(FileKind::detect("text/csv"), FileKind::Text);
    }

    #[test]
    fn test_detect_is_case_sensitive() {
        assert_eq!(FileKind::detect("application/PDF"), FileKind::Text);
        assert_eq!(FileKind::detect("XLSX"), FileKind::Text);
    }

    #[test]
    fn test_mime_for_extension_round_trips_through_detect() {
        assert_eq!(FileKind::detect(mime_for_extension("XLSX").unwrap()), FileKind::Spreadsheet);
        assert_eq!(FileKind::detect(mime_for_extension("xls").unwrap()), FileKind::Spreadsheet);
        assert_eq!(FileKind::detect(mime_for_extension("pdf").unwrap()), FileKind::Pdf);
        assert_eq!(FileKind::detect(mime_for_extension("docx").unwrap()), FileKind::Word);
        assert_eq!(FileKind::detect(mime_for_extension("doc").unwrap()), FileKind::Word);
        assert_eq!(FileKind::detect(mime_for_extension("txt").unwrap()), FileKind::Text);
        assert_eq!(mime_for_extension("png"), None);
    }

    #[test]
    fn test_grid_trims_headers_and_drops_blank_rows() {
        let grid = Grid::from_rows(strings(&[
            &[" Item ", "Budget  "],
            &["Cabinets", "12000"],
            &["", ""],
            &[],
            &["Paint", ""],
        ]));

        assert_eq!(grid.headers, vec!["Item", "Budget"]);
        assert_eq!(grid.rows.len(), 2);
        assert_eq!(grid.rows[1], vec!["Paint", ""]);
    }

    #[test]
    fn test_grid_to_tsv() {
        let grid = Grid::from_rows(strings(&[&["Item", "Budget"], &["Roof", "12000"]]));
        assert_eq!(grid.to_tsv(), "Item\tBudget\nRoof\t12000");
        assert_eq!(Grid::default().to_tsv(), "");
    }

    #[test]
    fn test_cell_out_of_range_is_empty() {
        let row = vec!["a".to_string()];
        assert_eq!(Grid::cell(&row, 0), "a");
        assert_eq!(Grid::cell(&row, 3), "");
    }

    #[test]
    fn test_read_grid_from_xlsx() {
        let buffer = xlsx(&[
            &["Item", "Category", "Budget"],
            &["Foundation Pour", "Demo/Foundation", "45000"],
            &["", "", ""],
            &["Cabinets", "Interior", "12000.5"],
        ]);

        let grid = read_grid(&buffer).unwrap();
        assert_eq!(grid.headers, vec!["Item", "Category", "Budget"]);
        assert_eq!(grid.rows.len(), 2);
        assert_eq!(grid.rows[0][0], "Foundation Pour");
        assert_eq!(grid.rows[0][2], "45000");
        assert_eq!(grid.rows[1][2], "12000.5");
    }

    #[test]
    fn test_read_grid_rejects_garbage() {
        let err = read_grid(b"definitely not a workbook").unwrap_err();
        assert!(matches!(err, ExtractError::Spreadsheet(_)));
    }

    #[test]
    fn test_read_text_plain_is_lossy_utf8() {
        let text = read_text(b"Roof \xF0 12000", FileKind::Text).unwrap();
        assert!(text.starts_with("Roof "));
        assert!(text.ends_with(" 12000"));
    }

    #[test]
    fn test_read_text_renders_spreadsheet_as_tsv() {
        let buffer = xlsx(&[&["Item", "Budget"], &["Roof", "12000"]]);
        let text = read_text(&buffer, FileKind::Spreadsheet).unwrap();
        assert_eq!(text, "Item\tBudget\nRoof\t12000");
    }

    #[test]
    fn test_read_word_text_flattens_tables_to_tab_lines() {
        let buffer = docx(
            &["Scope of work for 12 Elm St"],
            &[&["Item", "Budget"], &["Roofing", "12000"]],
        );

        let text = read_word_text(&buffer).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines.contains(&"Scope of work for 12 Elm St"));
        assert!(lines.contains(&"Item\tBudget"));
        assert!(lines.contains(&"Roofing\t12000"));
    }

    #[test]
    fn test_read_pdf_text_keeps_document_order() {
        let buffer = pdf(&["Scope of work", "Roofing 12000", "Kitchen Cabinets 8500"]);

        let text = read_pdf_text(&buffer).unwrap();
        let scope = text.find("Scope of work").unwrap();
        let roofing = text.find("Roofing 12000").unwrap();
        let cabinets = text.find("Kitchen Cabinets 8500").unwrap();
        assert!(scope < roofing && roofing < cabinets);
    }

    #[tokio::test]
    async fn test_load_text_reads_word_document() {
        let buffer = docx(&["Demo and haul-off"], &[&["Paint", "3000"]]);
        let text = load_text(&buffer, FileKind::Word).await.unwrap();
        assert!(text.contains("Demo and haul-off"));
        assert!(text.contains("Paint\t3000"));
    }

    #[tokio::test]
    async fn test_load_text_reports_unreadable_word_document() {
        let result = load_text(b"this is not a zip archive", FileKind::Word).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_run_blocking_contains_panics() {
        let result: ExtractResult<()> = run_blocking(|| panic!("reader exploded")).await;
        match result {
            Err(ExtractError::Task(message)) => assert!(message.contains("reader exploded")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
