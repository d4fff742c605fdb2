//! XLSX reading: spreadsheet bytes → first-sheet string table.
//!
//! Only the first sheet is converted. Cells are rendered through calamine's
//! `Display` impl, so
//! numbers, dates, and formula results come out the way the sheet shows
//! them rather than as raw cached values.

use crate::error::ConvertError;
use crate::format::SourceFormat;
use calamine::{Reader, Xlsx};
use std::io::Cursor;
use tracing::debug;

/// The first worksheet rendered as a rectangular string grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetTable {
    /// Name of the sheet the rows came from.
    pub sheet_name: String,
    /// Rows of cell strings; rows are padded to a uniform width.
    pub rows: Vec<Vec<String>>,
}

fn decode_err(e: impl std::fmt::Display) -> ConvertError {
    ConvertError::DecodeFailed {
        format: SourceFormat::Spreadsheet,
        detail: e.to_string(),
    }
}

/// Read the workbook and render its first sheet.
pub fn first_sheet_table(bytes: &[u8]) -> Result<SheetTable, ConvertError> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes)).map_err(decode_err)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ConvertError::DecodeFailed {
            format: SourceFormat::Spreadsheet,
            detail: "workbook contains no sheets".into(),
        })?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(decode_err)?;

    let width = range.width();
    let mut rows: Vec<Vec<String>> = Vec::with_capacity(range.height());
    for row in range.rows() {
        let mut cells: Vec<String> = row.iter().map(|c| c.to_string()).collect();
        cells.resize(width, String::new());
        rows.push(cells);
    }

    debug!(
        "Read sheet '{}' → {} rows × {} cols",
        sheet_name,
        rows.len(),
        width
    );

    Ok(SheetTable { sheet_name, rows })
}
