use crate::analysis::rankings::{RankedEntry, safe_ratio, sum_by, top_n};
use serde::Serialize;
use shared::models::categories::CBO_FORA_DO_TOTAL;
use shared::models::records::ProductivityRecord;

/// Placeholder for professionals the report left blank.
pub const NAO_INFORMADO: &str = "Não Informado";

/// View-level filters of the consolidated production analysis, on top of
/// the context's date window.
#[derive(Debug, Clone, Default)]
pub struct ProductionFilter {
    pub unidade: Option<String>,
    pub equipe: Option<String>,
    pub cbo: Option<String>,
}

/// Apply the view filters, keeping record order.
pub fn filter_production<'a>(
    records: &'a [ProductivityRecord],
    filter: &ProductionFilter,
) -> Vec<&'a ProductivityRecord> {
    records
        .iter()
        .filter(|r| {
            filter
                .unidade
                .as_ref()
                .is_none_or(|u| r.estabelecimento.as_ref() == Some(u))
                && filter.equipe.as_ref().is_none_or(|e| &r.equipe == e)
                && filter.cbo.as_ref().is_none_or(|c| r.cbo.as_ref() == Some(c))
        })
        .collect()
}

/// Headline indicators of the production views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductionKpis {
    /// Sum of the row grand totals.
    pub total_atendimentos: f64,
    /// Distinct professionals with production.
    pub profissionais: u64,
    pub media_por_profissional: f64,
    pub top_profissional: Option<RankedEntry>,
    pub top_cargo: Option<RankedEntry>,
}

pub fn production_kpis(records: &[&ProductivityRecord]) -> ProductionKpis {
    let total_atendimentos: f64 = records.iter().map(|r| r.total).sum();
    let mut profissionais: Vec<&str> = records
        .iter()
        .filter_map(|r| r.profissional.as_deref())
        .collect();
    profissionais.sort_unstable();
    profissionais.dedup();
    let n_profissionais = profissionais.len() as u64;

    ProductionKpis {
        total_atendimentos,
        profissionais: n_profissionais,
        media_por_profissional: safe_ratio(total_atendimentos, n_profissionais as f64),
        top_profissional: top_professionals(records, 1).into_iter().next(),
        top_cargo: top_roles(records, 1).into_iter().next(),
    }
}

/// Count per encounter-type value, for the distribution views.
pub fn encounter_type_counts(records: &[&ProductivityRecord]) -> Vec<(String, u64)> {
    super::value_counts(records.iter().filter_map(|r| r.tipo_atendimento.clone()))
}

pub fn top_professionals(records: &[&ProductivityRecord], n: usize) -> Vec<RankedEntry> {
    top_n(
        sum_by(
            records
                .iter()
                .filter_map(|r| r.profissional.clone().map(|p| (p, r.total))),
        ),
        n,
    )
}

pub fn top_teams(records: &[&ProductivityRecord], n: usize) -> Vec<RankedEntry> {
    top_n(
        sum_by(records.iter().map(|r| (r.equipe.clone(), r.total))),
        n,
    )
}

pub fn top_roles(records: &[&ProductivityRecord], n: usize) -> Vec<RankedEntry> {
    top_n(
        sum_by(records.iter().filter_map(|r| r.cbo.clone().map(|c| (c, r.total)))),
        n,
    )
}

/// Production of one professional group within a role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleProduction {
    pub cargo: String,
    pub total: f64,
    /// Professionals of this role, descending by production.
    pub profissionais: Vec<RankedEntry>,
}

/// Production of one team, broken down by role.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamProduction {
    pub equipe: String,
    pub total: f64,
    pub cargos: Vec<RoleProduction>,
}

/// Production of one facility, broken down facility → team → role →
/// professional. `total_assistencial` excludes community-health-agent
/// occupations, which register visits rather than clinical encounters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityProduction {
    pub unidade: String,
    pub total: f64,
    pub total_assistencial: f64,
    pub equipes: Vec<TeamProduction>,
}

/// Hierarchical drill-down of production sums. Rows without a facility,
/// team or role are left out of the tree (they still count in the flat
/// KPIs); missing professionals group under a placeholder. Every level
/// is ordered descending by its sum, stable.
pub fn production_tree(records: &[&ProductivityRecord]) -> Vec<FacilityProduction> {
    let mut facilities: Vec<FacilityProduction> = Vec::new();
    for record in records {
        let (Some(unidade), Some(cargo)) = (&record.estabelecimento, &record.cbo) else {
            continue;
        };
        if record.equipe.is_empty() {
            continue;
        }
        let profissional = record
            .profissional
            .clone()
            .unwrap_or_else(|| NAO_INFORMADO.to_string());

        let fi = match facilities.iter().position(|f| &f.unidade == unidade) {
            Some(i) => i,
            None => {
                facilities.push(FacilityProduction {
                    unidade: unidade.clone(),
                    total: 0.0,
                    total_assistencial: 0.0,
                    equipes: Vec::new(),
                });
                facilities.len() - 1
            }
        };
        let facility = &mut facilities[fi];
        facility.total += record.total;
        if !CBO_FORA_DO_TOTAL.contains(&cargo.as_str()) {
            facility.total_assistencial += record.total;
        }

        let ti = match facility.equipes.iter().position(|t| t.equipe == record.equipe) {
            Some(i) => i,
            None => {
                facility.equipes.push(TeamProduction {
                    equipe: record.equipe.clone(),
                    total: 0.0,
                    cargos: Vec::new(),
                });
                facility.equipes.len() - 1
            }
        };
        let team = &mut facility.equipes[ti];
        team.total += record.total;

        let ri = match team.cargos.iter().position(|r| &r.cargo == cargo) {
            Some(i) => i,
            None => {
                team.cargos.push(RoleProduction {
                    cargo: cargo.clone(),
                    total: 0.0,
                    profissionais: Vec::new(),
                });
                team.cargos.len() - 1
            }
        };
        let role = &mut team.cargos[ri];
        role.total += record.total;

        match role
            .profissionais
            .iter_mut()
            .find(|p| p.label == profissional)
        {
            Some(p) => p.value += record.total,
            None => role.profissionais.push(RankedEntry {
                label: profissional,
                value: record.total,
            }),
        }
    }

    for facility in &mut facilities {
        for team in &mut facility.equipes {
            for role in &mut team.cargos {
                role.profissionais.sort_by(|a, b| b.value.total_cmp(&a.value));
            }
            team.cargos.sort_by(|a, b| b.total.total_cmp(&a.total));
        }
        facility.equipes.sort_by(|a, b| b.total.total_cmp(&a.total));
    }
    facilities.sort_by(|a, b| b.total.total_cmp(&a.total));
    facilities
}
