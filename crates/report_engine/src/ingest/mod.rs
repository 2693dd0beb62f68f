pub mod parsers;
pub mod sheet;

use parsers::{ParsedRecords, parse_citizens, parse_households, parse_productivity};
use shared::models::records::{CitizenRecord, HouseholdRecord, ProductivityRecord};
use sheet::Workbook;
use std::path::Path;

/// One analysis session's worth of ingested data: the three record sets
/// concatenated across uploads, plus the run diagnostics.
#[derive(Debug, Clone, Default)]
pub struct IngestResult {
    pub citizens: Vec<CitizenRecord>,
    pub households: Vec<HouseholdRecord>,
    pub productivity: Vec<ProductivityRecord>,
    /// Names of the uploaded files, in upload order (used for
    /// municipality inference).
    pub source_files: Vec<String>,
    /// Files recognized by none of the parsers; surfaced to the user,
    /// never fatal.
    pub unrecognized: Vec<String>,
    /// Productivity rows whose date cell existed but did not parse.
    pub invalid_dates: usize,
    /// Citizen rows dropped for missing identity fields.
    pub dropped_citizen_rows: usize,
}

impl IngestResult {
    /// The terminal "no data" state: nothing recognized at all.
    pub fn has_data(&self) -> bool {
        !self.citizens.is_empty() || !self.households.is_empty() || !self.productivity.is_empty()
    }
}

/// Ordered parser trial: Citizens, then Households, then Productivity.
/// First match wins.
fn route(workbook: &Workbook) -> Option<ParsedRecords> {
    parse_citizens(workbook)
        .or_else(|| parse_households(workbook))
        .or_else(|| parse_productivity(workbook))
}

/// Route each uploaded workbook to its parser and concatenate the results
/// per kind. Ordering across files is not significant beyond upload order.
pub fn ingest(workbooks: &[Workbook]) -> IngestResult {
    let mut result = IngestResult::default();
    for workbook in workbooks {
        result.source_files.push(workbook.name.clone());
        match route(workbook) {
            Some(ParsedRecords::Citizens {
                records,
                dropped_rows,
            }) => {
                if dropped_rows > 0 {
                    log::warn!(
                        "{}: {} linhas de cidadãos sem campos de identidade descartadas",
                        workbook.name,
                        dropped_rows
                    );
                }
                result.dropped_citizen_rows += dropped_rows;
                result.citizens.extend(records);
            }
            Some(ParsedRecords::Households(records)) => {
                log::debug!("{}: {} domicílios", workbook.name, records.len());
                result.households.extend(records);
            }
            Some(ParsedRecords::Productivity {
                records,
                invalid_dates,
            }) => {
                if invalid_dates > 0 {
                    log::warn!(
                        "{}: {} datas de produção ilegíveis",
                        workbook.name,
                        invalid_dates
                    );
                }
                result.invalid_dates += invalid_dates;
                result.productivity.extend(records);
            }
            None => {
                log::warn!("planilha não reconhecida: {}", workbook.name);
                result.unrecognized.push(workbook.name.clone());
            }
        }
    }
    result
}

/// Read and ingest a batch of spreadsheet files. A file calamine cannot
/// open is reported as unrecognized and the run continues with the rest;
/// no single upload aborts the batch.
pub fn ingest_paths<P: AsRef<Path>>(paths: &[P]) -> IngestResult {
    let mut workbooks = Vec::with_capacity(paths.len());
    let mut unreadable = Vec::new();
    for path in paths {
        match Workbook::open(path) {
            Ok(workbook) => workbooks.push(workbook),
            Err(err) => {
                log::warn!("{}", err);
                unreadable.push(sheet::display_name(path.as_ref()));
            }
        }
    }
    let mut result = ingest(&workbooks);
    for name in unreadable {
        result.source_files.push(name.clone());
        result.unrecognized.push(name);
    }
    result
}
