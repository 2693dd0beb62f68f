use crate::ingest::sheet::{Sheet, Workbook};
use shared::models::records::{CitizenRecord, HouseholdRecord, ProductivityRecord};

/// Sheet name the e-SUS citizen/household reports keep their row-level
/// data in.
const SHEET_DETALHADO: &str = "DETALHADO";

const CITIZEN_COLUMNS: [&str; 6] = [
    "STATUS DOCUMENTO",
    "TEMPO SEM ATUALIZAR",
    "UNIDADE DE SAÚDE",
    "NOME EQUIPE",
    "INE",
    "CIDADÃO",
];

const HOUSEHOLD_COLUMNS: [&str; 4] = [
    "Estabelecimento",
    "INE",
    "TEMPO SEM ATUALIZAR",
    "TEM FAMÍLIA VÍNCULADA?",
];

/// Records produced by one recognized upload, tagged by kind.
#[derive(Debug, Clone)]
pub enum ParsedRecords {
    Citizens {
        records: Vec<CitizenRecord>,
        dropped_rows: usize,
    },
    Households(Vec<HouseholdRecord>),
    Productivity {
        records: Vec<ProductivityRecord>,
        invalid_dates: usize,
    },
}

/// Citizens report: the `DETALHADO` sheet with the six identity/status
/// columns. `None` means "not this kind" — including a missing sheet or
/// missing required columns — so a mixed batch routes each file to the
/// right parser by trial.
pub fn parse_citizens(workbook: &Workbook) -> Option<ParsedRecords> {
    let sheet = workbook.sheet(SHEET_DETALHADO)?;
    if !sheet.has_columns(&CITIZEN_COLUMNS) {
        return None;
    }
    let status_i = sheet.column(CITIZEN_COLUMNS[0])?;
    let tempo_i = sheet.column(CITIZEN_COLUMNS[1])?;
    let unidade_i = sheet.column(CITIZEN_COLUMNS[2])?;
    let equipe_i = sheet.column(CITIZEN_COLUMNS[3])?;
    let ine_i = sheet.column(CITIZEN_COLUMNS[4])?;
    let cidadao_i = sheet.column(CITIZEN_COLUMNS[5])?;

    let mut records = Vec::new();
    let mut dropped_rows = 0usize;
    for row in &sheet.rows {
        let unidade = sheet.cell(row, unidade_i).as_text();
        let nome_equipe = sheet.cell(row, equipe_i).as_text();
        let ine = sheet.cell(row, ine_i).as_text();
        let cidadao = sheet.cell(row, cidadao_i).as_text();
        let (Some(unidade), Some(nome_equipe), Some(ine), Some(cidadao)) =
            (unidade, nome_equipe, ine, cidadao)
        else {
            dropped_rows += 1;
            continue;
        };
        let status = sheet
            .cell(row, status_i)
            .as_text()
            .unwrap_or_default()
            .to_uppercase();
        let tempo = sheet
            .cell(row, tempo_i)
            .as_text()
            .unwrap_or_default()
            .to_uppercase();
        records.push(CitizenRecord::new(
            status,
            tempo,
            unidade,
            nome_equipe,
            ine,
            cidadao,
        ));
    }
    Some(ParsedRecords::Citizens {
        records,
        dropped_rows,
    })
}

/// Households report: the `DETALHADO` sheet keyed by facility + INE.
pub fn parse_households(workbook: &Workbook) -> Option<ParsedRecords> {
    let sheet = workbook.sheet(SHEET_DETALHADO)?;
    if !sheet.has_columns(&HOUSEHOLD_COLUMNS) {
        return None;
    }
    let estab_i = sheet.column(HOUSEHOLD_COLUMNS[0])?;
    let ine_i = sheet.column(HOUSEHOLD_COLUMNS[1])?;
    let tempo_i = sheet.column(HOUSEHOLD_COLUMNS[2])?;
    let familia_i = sheet.column(HOUSEHOLD_COLUMNS[3])?;

    let mut records = Vec::new();
    for row in &sheet.rows {
        let (Some(estabelecimento), Some(ine)) = (
            sheet.cell(row, estab_i).as_text(),
            sheet.cell(row, ine_i).as_text(),
        ) else {
            continue;
        };
        let tempo = sheet
            .cell(row, tempo_i)
            .as_text()
            .unwrap_or_default()
            .to_uppercase();
        let familia = sheet
            .cell(row, familia_i)
            .as_text()
            .unwrap_or_default()
            .to_uppercase();
        records.push(HouseholdRecord::new(&estabelecimento, &ine, tempo, familia));
    }
    Some(ParsedRecords::Households(records))
}

/// Productivity report: free-form first sheet, accepted iff it carries an
/// `EQUIPE` column. Unparseable dates become `None` and are counted.
pub fn parse_productivity(workbook: &Workbook) -> Option<ParsedRecords> {
    let sheet = workbook.first_sheet()?;
    let equipe_i = sheet.column("EQUIPE")?;

    let estab_i = sheet.column("ESTABELECIMENTO");
    let prof_i = sheet.column("PROFISSIONAL");
    let cbo_i = sheet.column("DESCRIÇÃO DO CBO");
    let tipo_atend_i = sheet.column("TIPO DE ATENDIMENTO");
    let tipo_consulta_i = sheet.column_normalized("TIPO DE CONSULTA");
    let data_i = sheet.column("DATA");
    let total_i = sheet.column("TOTAL GERAL");

    let text_at = |sheet: &Sheet, row: &[_], idx: Option<usize>| -> Option<String> {
        idx.and_then(|i| sheet.cell(row, i).as_text())
    };

    let mut records = Vec::new();
    let mut invalid_dates = 0usize;
    for row in &sheet.rows {
        let data = match data_i {
            Some(i) => {
                let cell = sheet.cell(row, i);
                let parsed = cell.as_date();
                if parsed.is_none() && !cell.is_empty() {
                    invalid_dates += 1;
                }
                parsed
            }
            None => None,
        };
        records.push(ProductivityRecord {
            estabelecimento: text_at(sheet, row, estab_i),
            equipe: sheet.cell(row, equipe_i).as_text().unwrap_or_default(),
            profissional: text_at(sheet, row, prof_i),
            cbo: text_at(sheet, row, cbo_i),
            tipo_atendimento: text_at(sheet, row, tipo_atend_i),
            tipo_consulta: text_at(sheet, row, tipo_consulta_i),
            data,
            total: total_i
                .and_then(|i| sheet.cell(row, i).as_number())
                .unwrap_or(0.0),
        });
    }
    Some(ParsedRecords::Productivity {
        records,
        invalid_dates,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::sheet::test_support::{sheet_of, workbook_of};
    use chrono::NaiveDate;

    fn citizens_workbook() -> Workbook {
        workbook_of(
            "CONDE_cidadaos.xlsx",
            vec![sheet_of(
                SHEET_DETALHADO,
                &[
                    &[
                        "STATUS DOCUMENTO",
                        "TEMPO SEM ATUALIZAR",
                        "UNIDADE DE SAÚDE",
                        "NOME EQUIPE",
                        "INE",
                        "CIDADÃO",
                    ],
                    &["com cpf", "até 4 meses", "UBS A", "Equipe 1", "0001", "P1"],
                    &["SEM CPF", "MAIS DE 2 ANOS", "UBS A", "Equipe 1", "0001", "P2"],
                    &["COM CPF", "5 A 12 MESES", "", "Equipe 2", "0002", "P3"],
                ],
            )],
        )
    }

    #[test]
    fn test_parse_citizens_normalizes_and_drops_incomplete_rows() {
        let Some(ParsedRecords::Citizens {
            records,
            dropped_rows,
        }) = parse_citizens(&citizens_workbook())
        else {
            panic!("citizens workbook not recognized");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(dropped_rows, 1);
        assert_eq!(records[0].status_documento, "COM CPF");
        assert_eq!(records[0].tempo_sem_atualizar, "ATÉ 4 MESES");
        assert_eq!(records[0].equipe_completa, "Equipe 1 - 0001");
    }

    #[test]
    fn test_parse_citizens_rejects_missing_columns() {
        let wb = workbook_of(
            "outro.xlsx",
            vec![sheet_of(
                SHEET_DETALHADO,
                &[&["STATUS DOCUMENTO", "INE"], &["COM CPF", "0001"]],
            )],
        );
        assert!(parse_citizens(&wb).is_none());
    }

    #[test]
    fn test_parse_citizens_rejects_missing_sheet() {
        let wb = workbook_of(
            "outro.xlsx",
            vec![sheet_of("Planilha1", &[&["STATUS DOCUMENTO"], &["x"]])],
        );
        assert!(parse_citizens(&wb).is_none());
    }

    #[test]
    fn test_parse_households() {
        let wb = workbook_of(
            "CONDE_domicilios.xlsx",
            vec![sheet_of(
                SHEET_DETALHADO,
                &[
                    &[
                        "Estabelecimento",
                        "INE",
                        "TEMPO SEM ATUALIZAR",
                        "TEM FAMÍLIA VÍNCULADA?",
                    ],
                    &["UBS A", "0001", "ATÉ 4 MESES", "Sim"],
                    &["UBS B", "0002", "MAIS DE 2 ANOS", "Não"],
                    &["", "", "ATÉ 4 MESES", "Sim"],
                ],
            )],
        );
        let Some(ParsedRecords::Households(records)) = parse_households(&wb) else {
            panic!("households workbook not recognized");
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].estabelecimento_completo, "UBS A - 0001");
        assert_eq!(records[0].familia_vinculada, "SIM");
        assert_eq!(records[1].familia_vinculada, "NÃO");
    }

    #[test]
    fn test_parse_productivity_requires_team_column() {
        let wb = workbook_of(
            "producao.xlsx",
            vec![sheet_of(
                "Relatório",
                &[&["ESTABELECIMENTO", "PROFISSIONAL"], &["UBS A", "ANA"]],
            )],
        );
        assert!(parse_productivity(&wb).is_none());
    }

    #[test]
    fn test_parse_productivity_dates_and_totals() {
        let wb = workbook_of(
            "CONDE_producao.xlsx",
            vec![sheet_of(
                "Relatório",
                &[
                    &["ESTABELECIMENTO", "EQUIPE", "PROFISSIONAL", "DATA", "TOTAL GERAL"],
                    &["UBS A", "Equipe 1", "ANA", "05/03/2024", "12"],
                    &["UBS A", "Equipe 1", "BRUNO", "data inválida", "3"],
                    &["UBS B", "Equipe 2", "CARLA", "", "7"],
                ],
            )],
        );
        let Some(ParsedRecords::Productivity {
            records,
            invalid_dates,
        }) = parse_productivity(&wb)
        else {
            panic!("productivity workbook not recognized");
        };
        assert_eq!(records.len(), 3);
        assert_eq!(invalid_dates, 1);
        assert_eq!(records[0].data, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(records[1].data, None);
        assert_eq!(records[2].data, None);
        assert_eq!(records[0].total, 12.0);
    }

    #[test]
    fn test_parse_productivity_finds_accented_consultation_column() {
        let wb = workbook_of(
            "esb.xlsx",
            vec![sheet_of(
                "Folha1",
                &[
                    &["EQUIPE", "Tipo de Consulta"],
                    &["Equipe 1", "Consulta de retorno em odontologia"],
                ],
            )],
        );
        let Some(ParsedRecords::Productivity { records, .. }) = parse_productivity(&wb) else {
            panic!("productivity workbook not recognized");
        };
        assert_eq!(
            records[0].tipo_consulta.as_deref(),
            Some("Consulta de retorno em odontologia")
        );
    }
}
