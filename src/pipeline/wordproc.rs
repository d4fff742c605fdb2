//! DOCX parsing: word-processor bytes → intermediate block tree.
//!
//! The package is lowered to a flat list of [`Block`]s (headings,
//! paragraphs, and tables in document order) which
//! [`crate::pipeline::layout`] then flows onto pages.
//!
//! Formatting below the block level (bold runs, fonts, colours) is
//! deliberately dropped: the conversion has never promised layout fidelity,
//! only readable text in the right order.

use crate::error::ConvertError;
use crate::format::SourceFormat;
use docx_rs::{
    read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild, TableCellContent, TableChild,
    TableRowChild,
};
use tracing::debug;

/// One block of the intermediate visual tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A styled heading, level 1..=6.
    Heading { level: u8, text: String },
    /// A plain paragraph.
    Paragraph(String),
    /// A table as rows of cell strings.
    Table(Vec<Vec<String>>),
}

/// Parse DOCX bytes into blocks, in document order.
pub fn parse_blocks(bytes: &[u8]) -> Result<Vec<Block>, ConvertError> {
    let docx = read_docx(bytes).map_err(|e| ConvertError::DecodeFailed {
        format: SourceFormat::WordProcessor,
        detail: format!("{e:?}"),
    })?;

    let mut blocks = Vec::new();
    for child in &docx.document.children {
        match child {
            DocumentChild::Paragraph(p) => {
                let text = paragraph_text(p);
                if text.trim().is_empty() {
                    continue;
                }
                match heading_level(p) {
                    Some(level) => blocks.push(Block::Heading { level, text }),
                    None => blocks.push(Block::Paragraph(text)),
                }
            }
            DocumentChild::Table(t) => {
                let rows = table_rows(t);
                if !rows.is_empty() {
                    blocks.push(Block::Table(rows));
                }
            }
            _ => {}
        }
    }

    debug!("Parsed DOCX → {} blocks", blocks.len());
    Ok(blocks)
}

/// Concatenated run text of a paragraph.
fn paragraph_text(p: &Paragraph) -> String {
    let mut out = String::new();
    for child in &p.children {
        if let ParagraphChild::Run(run) = child {
            for rc in &run.children {
                match rc {
                    RunChild::Text(t) => out.push_str(&t.text),
                    RunChild::Tab(_) => out.push('\t'),
                    RunChild::Break(_) => out.push('\n'),
                    _ => {}
                }
            }
        }
    }
    out
}

/// Heading level from the paragraph style id ("Heading1".."Heading6").
fn heading_level(p: &Paragraph) -> Option<u8> {
    let style = p.property.style.as_ref()?.val.clone();
    let rest = style.strip_prefix("Heading")?;
    let level: u8 = rest.parse().ok()?;
    (1..=6).contains(&level).then_some(level)
}

fn table_rows(t: &docx_rs::Table) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    for row in &t.rows {
        let TableChild::TableRow(tr) = row;
        let mut cells = Vec::new();
        for cell in &tr.cells {
            let TableRowChild::TableCell(tc) = cell;
            let mut text = String::new();
            for content in &tc.children {
                if let TableCellContent::Paragraph(p) = content {
                    if !text.is_empty() {
                        text.push(' ');
                    }
                    text.push_str(&paragraph_text(p));
                }
            }
            cells.push(text);
        }
        rows.push(cells);
    }
    rows
}
