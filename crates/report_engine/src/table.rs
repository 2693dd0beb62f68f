//! Flat tabular rendering of the analysis outputs, for JSON export and
//! terminal display. Column names match the panels of the management
//! report.

use crate::analysis::care_mix::{EsbPivot, ScorecardRow};
use crate::analysis::classifier::TeamCapacityStatus;
use crate::analysis::crosstab::Crosstab;
use crate::analysis::rankings::RankedEntry;
use crate::analysis::summary::{FacilityRollup, StaleTeam};
use serde::Serialize;

/// One table cell. Untagged so the export reads as plain JSON scalars.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Text(String),
    Int(u64),
    Float(f64),
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::Text(value.to_string())
    }
}

impl From<String> for Cell {
    fn from(value: String) -> Self {
        Cell::Text(value)
    }
}

impl From<u64> for Cell {
    fn from(value: u64) -> Self {
        Cell::Int(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

/// A named-column table, rows in presentation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl ReportTable {
    fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    /// The classified team table of the capacity panel.
    pub fn team_capacity(teams: &[TeamCapacityStatus]) -> Self {
        let mut table = Self::new(&[
            "Equipe",
            "Nº de Pessoas Vinculadas",
            "Tipo de Equipe",
            "Status",
            "Excedente",
            "% Acima do Limite",
            "Unidade de Saúde",
        ]);
        for team in teams {
            table.rows.push(vec![
                team.equipe.clone().into(),
                team.vinculados.into(),
                team.tipo.clone().into(),
                team.status.label().into(),
                team.excedente.into(),
                team.pct_acima_limite().into(),
                team.unidade.clone().into(),
            ]);
        }
        table
    }

    /// A crosstab as counts, with the group column named by the caller
    /// and a trailing `Total` column.
    pub fn from_crosstab(tab: &Crosstab, group_column: &str) -> Self {
        let mut columns = vec![group_column.to_string()];
        columns.extend(tab.categories.iter().cloned());
        columns.push("Total".to_string());
        let rows = tab
            .rows
            .iter()
            .map(|row| {
                let mut cells: Vec<Cell> = vec![row.group.clone().into()];
                cells.extend(row.counts.iter().map(|&c| Cell::Int(c)));
                cells.push(row.total.into());
                cells
            })
            .collect();
        Self { columns, rows }
    }

    /// A crosstab as row percentages.
    pub fn from_crosstab_percentages(tab: &Crosstab, group_column: &str) -> Self {
        let mut columns = vec![group_column.to_string()];
        columns.extend(tab.categories.iter().map(|c| format!("% {}", c)));
        let rows = tab
            .percentages()
            .iter()
            .map(|row| {
                let mut cells: Vec<Cell> = vec![row.group.clone().into()];
                cells.extend(row.values.iter().map(|&v| Cell::Float(v)));
                cells
            })
            .collect();
        Self { columns, rows }
    }

    /// A ranking as a two-column table.
    pub fn from_ranking(entries: &[RankedEntry], label_column: &str, value_column: &str) -> Self {
        let mut table = Self::new(&[label_column, value_column]);
        for entry in entries {
            table
                .rows
                .push(vec![entry.label.clone().into(), entry.value.into()]);
        }
        table
    }

    /// The per-facility rollup of the whole-municipality view.
    pub fn facility_rollup(rollups: &[FacilityRollup]) -> Self {
        let mut table = Self::new(&[
            "Unidade de Saúde",
            "Equipes",
            "Cidadãos",
            "Média por Equipe",
        ]);
        for rollup in rollups {
            table.rows.push(vec![
                rollup.unidade.clone().into(),
                rollup.equipes.into(),
                rollup.cidadaos.into(),
                rollup.media_por_equipe.into(),
            ]);
        }
        table
    }

    /// The stale-registration ranking.
    pub fn stale_teams(teams: &[StaleTeam]) -> Self {
        let mut table = Self::new(&[
            "Equipe",
            "Pessoas Vinculadas",
            "Cadastros Desatualizados",
            "% Desatualizados",
        ]);
        for team in teams {
            table.rows.push(vec![
                team.equipe.clone().into(),
                team.vinculados.into(),
                team.desatualizados.into(),
                team.pct_desatualizados.into(),
            ]);
        }
        table
    }

    /// The care-mix scorecard.
    pub fn scorecard(rows: &[ScorecardRow]) -> Self {
        let mut table = Self::new(&[
            "Unidade de Saúde",
            "% Cuidado Programado",
            "% Demanda Espontânea",
            "Índice de Eficiência",
        ]);
        for row in rows {
            table.rows.push(vec![
                row.unidade.clone().into(),
                row.pct_programado.into(),
                row.pct_espontanea.into(),
                row.indice_eficiencia.into(),
            ]);
        }
        table
    }

    /// The odontology pivot, `Total Geral` row last.
    pub fn esb_pivot(pivot: &EsbPivot) -> Self {
        let mut columns = vec!["Estabelecimento".to_string()];
        columns.extend(pivot.categories.iter().cloned());
        columns.push("Total".to_string());
        let mut rows: Vec<Vec<Cell>> = Vec::new();
        for row in pivot.rows.iter().chain(std::iter::once(&pivot.totals)) {
            let mut cells: Vec<Cell> = vec![row.group.clone().into()];
            cells.extend(row.counts.iter().map(|&c| Cell::Int(c)));
            cells.push(row.total.into());
            rows.push(cells);
        }
        Self { columns, rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::crosstab::crosstab;

    fn tab() -> Crosstab {
        crosstab(
            vec![
                ("UBS A".to_string(), "COM CPF".to_string()),
                ("UBS A".to_string(), "SEM CPF".to_string()),
            ],
            &["COM CPF", "SEM CPF"],
        )
    }

    #[test]
    fn test_crosstab_table_shape() {
        let table = ReportTable::from_crosstab(&tab(), "Unidade de Saúde");
        assert_eq!(
            table.columns,
            vec!["Unidade de Saúde", "COM CPF", "SEM CPF", "Total"]
        );
        assert_eq!(
            table.rows[0],
            vec![Cell::from("UBS A"), Cell::Int(1), Cell::Int(1), Cell::Int(2)]
        );
    }

    #[test]
    fn test_percentage_table_prefixes_columns() {
        let table = ReportTable::from_crosstab_percentages(&tab(), "Unidade de Saúde");
        assert_eq!(table.columns[1], "% COM CPF");
        assert_eq!(table.rows[0][1], Cell::Float(50.0));
    }

    #[test]
    fn test_cells_serialize_as_plain_scalars() {
        let table = ReportTable::from_ranking(
            &[RankedEntry {
                label: "ANA".into(),
                value: 4.0,
            }],
            "Profissional",
            "Atendimentos",
        );
        let json = serde_json::to_string(&table.rows[0]).unwrap();
        assert_eq!(json, r#"["ANA",4.0]"#);
    }
}
