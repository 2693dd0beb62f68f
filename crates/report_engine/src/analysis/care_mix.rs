use crate::analysis::crosstab::{Crosstab, CrosstabRow, crosstab, crosstab_observed};
use crate::analysis::rankings::safe_pct;
use serde::Serialize;
use shared::models::categories::{
    CATEGORIA_ATENDIMENTO, CareCategory, ORDEM_CONSULTA_ESB, TIPOS_CUIDADO_PROGRAMADO,
    TIPOS_DEMANDA_ESPONTANEA,
};
use shared::models::records::ProductivityRecord;

/// Management category of one encounter type, uppercased before lookup.
/// Types outside the mapping stay uncategorized.
pub fn categorize(tipo_atendimento: &str) -> Option<CareCategory> {
    CATEGORIA_ATENDIMENTO
        .get(tipo_atendimento.trim().to_uppercase().as_str())
        .copied()
}

/// Headline indicators of the care-mix panel. Percentages are over all
/// rows, categorized or not, so the two shares need not sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CareMixKpis {
    /// Encounter rows considered (row count, not summed totals).
    pub total: u64,
    pub pct_programado: f64,
    pub pct_espontanea: f64,
}

pub fn care_mix_kpis(records: &[ProductivityRecord]) -> CareMixKpis {
    let total = records.len() as u64;
    let count_of = |category: CareCategory| {
        records
            .iter()
            .filter(|r| {
                r.tipo_atendimento
                    .as_deref()
                    .and_then(categorize)
                    .is_some_and(|c| c == category)
            })
            .count() as u64
    };
    CareMixKpis {
        total,
        pct_programado: safe_pct(count_of(CareCategory::Programado) as f64, total as f64),
        pct_espontanea: safe_pct(count_of(CareCategory::Espontanea) as f64, total as f64),
    }
}

/// Care category by facility, in the fixed category order. Rows without a
/// facility or with an unmapped encounter type fall out.
pub fn category_by_facility(records: &[ProductivityRecord]) -> Crosstab {
    let order: Vec<&str> = CareCategory::ORDER.iter().map(|c| c.as_str()).collect();
    crosstab(
        records.iter().filter_map(|r| {
            let unidade = r.estabelecimento.clone()?;
            let category = r.tipo_atendimento.as_deref().and_then(categorize)?;
            Some((unidade, category.as_str().to_string()))
        }),
        &order,
    )
}

/// One facility of the care-mix scorecard. The efficiency index is the
/// programmed share over the spontaneous share; a facility with no
/// spontaneous demand scores 0 rather than infinity, which keeps it out
/// of the top instead of distorting the ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScorecardRow {
    pub unidade: String,
    pub pct_programado: f64,
    pub pct_espontanea: f64,
    pub indice_eficiencia: f64,
}

/// Scorecard over the per-facility category crosstab, descending by the
/// efficiency index, stable.
pub fn scorecard(records: &[ProductivityRecord]) -> Vec<ScorecardRow> {
    let tab = category_by_facility(records);
    let programado = CareCategory::Programado.as_str();
    let espontanea = CareCategory::Espontanea.as_str();
    let pi = tab.categories.iter().position(|c| c == programado);
    let ei = tab.categories.iter().position(|c| c == espontanea);

    let mut rows: Vec<ScorecardRow> = tab
        .rows
        .iter()
        .map(|row| {
            let count_at = |i: Option<usize>| i.map(|i| row.counts[i]).unwrap_or(0) as f64;
            let pct_programado = safe_pct(count_at(pi), row.total as f64);
            let pct_espontanea = safe_pct(count_at(ei), row.total as f64);
            let indice_eficiencia = if pct_espontanea == 0.0 {
                0.0
            } else {
                pct_programado / pct_espontanea
            };
            ScorecardRow {
                unidade: row.group.clone(),
                pct_programado,
                pct_espontanea,
                indice_eficiencia,
            }
        })
        .collect();
    rows.sort_by(|a, b| b.indice_eficiencia.total_cmp(&a.indice_eficiencia));
    rows
}

/// Spontaneous-demand pressure by facility: urgency and same-day rows
/// only, ranked on those two columns rather than on the total.
pub fn demand_pressure(records: &[ProductivityRecord], top: usize) -> Crosstab {
    crosstab(
        records.iter().filter_map(|r| {
            let unidade = r.estabelecimento.clone()?;
            let tipo = r.tipo_atendimento.clone()?;
            (categorize(&tipo) == Some(CareCategory::Espontanea)).then_some((unidade, tipo))
        }),
        &TIPOS_DEMANDA_ESPONTANEA,
    )
    .sorted_desc_by_columns(&TIPOS_DEMANDA_ESPONTANEA, top)
}

/// Programmed-care highlights by facility, total-ordered and truncated.
pub fn programmed_highlights(records: &[ProductivityRecord], top: usize) -> Crosstab {
    crosstab(
        records.iter().filter_map(|r| {
            let unidade = r.estabelecimento.clone()?;
            let tipo = r.tipo_atendimento.clone()?;
            (categorize(&tipo) == Some(CareCategory::Programado)).then_some((unidade, tipo))
        }),
        &TIPOS_CUIDADO_PROGRAMADO,
    )
    .top(top)
}

/// Facility by encounter type over every observed type, for the complete
/// distribution table.
pub fn encounter_table(records: &[ProductivityRecord]) -> Crosstab {
    let pairs: Vec<(String, String)> = records
        .iter()
        .filter_map(|r| {
            let unidade = r.estabelecimento.clone()?;
            let tipo = r.tipo_atendimento.clone()?;
            Some((unidade, tipo))
        })
        .collect();
    crosstab_observed(pairs)
}

/// Odontology pivot: facilities by the four fixed ESB consultation
/// categories, counting rows with an identified professional.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EsbPivot {
    pub categories: Vec<String>,
    /// Per-facility rows, alphabetical by facility.
    pub rows: Vec<CrosstabRow>,
    /// The `Total Geral` row.
    pub totals: CrosstabRow,
}

/// Build the ESB pivot, or `None` when no row carries a consultation
/// type (the source report then has no odontology detail at all).
pub fn esb_pivot(records: &[ProductivityRecord]) -> Option<EsbPivot> {
    if !records.iter().any(|r| r.tipo_consulta.is_some()) {
        return None;
    }
    let mut tab = crosstab(
        records.iter().filter_map(|r| {
            r.profissional.as_ref()?;
            let unidade = r.estabelecimento.clone()?;
            let consulta = r.tipo_consulta.clone()?;
            Some((unidade, consulta))
        }),
        &ORDEM_CONSULTA_ESB,
    );
    tab.rows.sort_by(|a, b| a.group.cmp(&b.group));

    let counts = tab.column_totals();
    let total = counts.iter().sum();
    Some(EsbPivot {
        categories: tab.categories,
        rows: tab.rows,
        totals: CrosstabRow {
            group: "Total Geral".to_string(),
            counts,
            total,
        },
    })
}
