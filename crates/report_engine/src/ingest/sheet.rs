use crate::errors::IngestError;
use calamine::{Data, Reader, open_workbook_auto};
use chrono::NaiveDate;
use shared::models::date_utils::parse_report_date;
use shared::models::text_utils::normalize_text;
use std::path::Path;

/// One typed cell of an uploaded sheet. Parsers never see calamine types:
/// everything is converted into this form right after reading, so the
/// parsing layer stays pure and testable without workbook files.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Bool(bool),
}

impl CellValue {
    /// Trimmed non-empty textual form. Numbers render without a trailing
    /// `.0` — identifier columns (INE) frequently arrive as floats from
    /// Excel.
    pub fn as_text(&self) -> Option<String> {
        match self {
            CellValue::Text(s) => {
                let t = s.trim();
                (!t.is_empty()).then(|| t.to_string())
            }
            CellValue::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    Some(format!("{}", *n as i64))
                } else {
                    Some(format!("{}", n))
                }
            }
            CellValue::Bool(b) => Some(b.to_string()),
            CellValue::Date(d) => Some(d.format("%d/%m/%Y").to_string()),
            CellValue::Empty => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().replace(',', ".").parse().ok(),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            CellValue::Date(d) => Some(*d),
            CellValue::Text(s) => parse_report_date(s),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

fn convert_cell(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => CellValue::Date(naive.date()),
            None => CellValue::Empty,
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => match parse_report_date(s) {
            Some(date) => CellValue::Date(date),
            None => CellValue::Text(s.clone()),
        },
    }
}

/// One sheet of an uploaded workbook: a trimmed header row plus data rows.
#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    /// Build a sheet from raw rows; the first row is the header.
    pub fn new(name: impl Into<String>, mut raw_rows: Vec<Vec<CellValue>>) -> Self {
        let header = if raw_rows.is_empty() {
            Vec::new()
        } else {
            raw_rows
                .remove(0)
                .iter()
                .map(|cell| cell.as_text().unwrap_or_default())
                .collect()
        };
        Self {
            name: name.into(),
            header,
            rows: raw_rows,
        }
    }

    /// Column index by exact (trimmed) header name.
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    /// Column index by accent-folded, case-insensitive header name.
    pub fn column_normalized(&self, name: &str) -> Option<usize> {
        let wanted = normalize_text(name);
        self.header.iter().position(|h| normalize_text(h) == wanted)
    }

    pub fn has_columns(&self, names: &[&str]) -> bool {
        names.iter().all(|n| self.column(n).is_some())
    }

    /// Cell of a data row by column index; ragged rows read as empty.
    pub fn cell<'a>(&self, row: &'a [CellValue], idx: usize) -> &'a CellValue {
        row.get(idx).unwrap_or(&CellValue::Empty)
    }
}

/// An uploaded workbook converted to the typed sheet abstraction.
#[derive(Debug, Clone)]
pub struct Workbook {
    pub name: String,
    pub sheets: Vec<Sheet>,
}

/// Display name of an uploaded file: the final path component.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

impl Workbook {
    pub fn new(name: impl Into<String>, sheets: Vec<Sheet>) -> Self {
        Self {
            name: name.into(),
            sheets,
        }
    }

    /// Read an `.xlsx`/`.xls`/`.ods` file from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, IngestError> {
        let path = path.as_ref();
        let name = display_name(path);
        let mut workbook = open_workbook_auto(path).map_err(|source| IngestError::Workbook {
            name: name.clone(),
            source,
        })?;
        let sheet_names = workbook.sheet_names().to_vec();
        let mut sheets = Vec::with_capacity(sheet_names.len());
        for sheet_name in sheet_names {
            let range = workbook
                .worksheet_range(&sheet_name)
                .map_err(|source| IngestError::Workbook {
                    name: name.clone(),
                    source,
                })?;
            let raw_rows: Vec<Vec<CellValue>> = range
                .rows()
                .map(|row| row.iter().map(convert_cell).collect())
                .collect();
            sheets.push(Sheet::new(sheet_name, raw_rows));
        }
        Ok(Self { name, sheets })
    }

    /// Sheet by trimmed name.
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name.trim() == name)
    }

    pub fn first_sheet(&self) -> Option<&Sheet> {
        self.sheets.first()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Build a sheet from string rows, the first being the header.
    pub fn sheet_of(name: &str, rows: &[&[&str]]) -> Sheet {
        let raw = rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| {
                        if cell.is_empty() {
                            CellValue::Empty
                        } else {
                            CellValue::Text(cell.to_string())
                        }
                    })
                    .collect()
            })
            .collect();
        Sheet::new(name, raw)
    }

    pub fn workbook_of(name: &str, sheets: Vec<Sheet>) -> Workbook {
        Workbook::new(name, sheets)
    }
}
