use crate::analysis::classifier::CapacityTier;
use crate::analysis::context::AnalysisContext;
use crate::analysis::crosstab::{Crosstab, crosstab, crosstab_observed};
use crate::analysis::rankings::{safe_pct, safe_ratio};
use crate::analysis::value_counts;
use serde::Serialize;
use std::collections::HashSet;

/// Headline indicators of the management panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewKpis {
    /// Distinct enrolled people.
    pub total_cidadaos: u64,
    /// Distinct teams (composite keys).
    pub total_equipes: u64,
    pub media_por_equipe: f64,
    /// Teams above their hard cap.
    pub equipes_criticas: u64,
    /// Critical teams as a share of all teams (0..1).
    pub taxa_criticas: f64,
}

pub fn overview(ctx: &AnalysisContext) -> OverviewKpis {
    let total_cidadaos = ctx
        .citizens()
        .iter()
        .map(|c| c.cidadao.as_str())
        .collect::<HashSet<_>>()
        .len() as u64;
    let total_equipes = ctx.teams().len() as u64;
    let equipes_criticas = ctx
        .teams()
        .iter()
        .filter(|t| t.status == CapacityTier::AboveHardLimit)
        .count() as u64;
    OverviewKpis {
        total_cidadaos,
        total_equipes,
        media_por_equipe: safe_ratio(total_cidadaos as f64, total_equipes as f64),
        equipes_criticas,
        taxa_criticas: safe_ratio(equipes_criticas as f64, total_equipes as f64),
    }
}

/// Count per document-status value, for the donut view.
pub fn document_status_counts(ctx: &AnalysisContext) -> Vec<(String, u64)> {
    value_counts(ctx.citizens().iter().map(|c| c.status_documento.clone()))
}

/// Count per recency tier, zero-filled in the fixed tier order.
pub fn recency_counts(ctx: &AnalysisContext) -> Vec<(String, u64)> {
    let observed = value_counts(
        ctx.citizens()
            .iter()
            .map(|c| c.tempo_sem_atualizar.clone()),
    );
    shared::models::categories::ORDEM_TEMPO
        .iter()
        .map(|tier| {
            let count = observed
                .iter()
                .find(|(value, _)| value == tier)
                .map(|(_, c)| *c)
                .unwrap_or(0);
            (tier.to_string(), count)
        })
        .collect()
}

/// Document-status crosstab over the active grouping dimension.
pub fn document_crosstab(ctx: &AnalysisContext) -> Crosstab {
    crosstab(
        ctx.citizens()
            .iter()
            .map(|c| (ctx.citizen_group_label(c), c.status_documento.clone())),
        &shared::models::categories::ORDEM_CPF,
    )
}

/// Recency crosstab over the active grouping dimension.
pub fn recency_crosstab(ctx: &AnalysisContext) -> Crosstab {
    crosstab(
        ctx.citizens()
            .iter()
            .map(|c| (ctx.citizen_group_label(c), c.tempo_sem_atualizar.clone())),
        &shared::models::categories::ORDEM_TEMPO,
    )
}

/// One team of the stale-registration ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaleTeam {
    pub equipe: String,
    pub vinculados: u64,
    pub desatualizados: u64,
    /// Stale registrations as a percentage of enrollment, 0-safe.
    pub pct_desatualizados: f64,
}

/// Row count of the stale-registration ranking view.
pub const STALE_RANKING_TOP: usize = 10;

/// Teams ranked by share of registrations stale for over a year,
/// descending, stable among ties, truncated to `top`.
pub fn stale_registrations(ctx: &AnalysisContext, top: usize) -> Vec<StaleTeam> {
    use shared::models::categories::TEMPO_DESATUALIZADO;
    let mut stale: Vec<StaleTeam> = ctx
        .teams()
        .iter()
        .map(|team| {
            let desatualizados = ctx
                .citizens()
                .iter()
                .filter(|c| {
                    c.equipe_completa == team.equipe_original
                        && TEMPO_DESATUALIZADO.contains(&c.tempo_sem_atualizar.as_str())
                })
                .count() as u64;
            StaleTeam {
                equipe: team.equipe.clone(),
                vinculados: team.vinculados,
                desatualizados,
                pct_desatualizados: safe_pct(desatualizados as f64, team.vinculados as f64),
            }
        })
        .collect();
    stale.sort_by(|a, b| b.pct_desatualizados.total_cmp(&a.pct_desatualizados));
    stale.truncate(top);
    stale
}

/// Per-facility rollup of the classified teams (whole-municipality view).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacilityRollup {
    pub unidade: String,
    pub equipes: u64,
    pub cidadaos: u64,
    pub media_por_equipe: f64,
}

/// Facilities summed over their teams, descending by enrolled citizens.
pub fn facility_rollup(ctx: &AnalysisContext) -> Vec<FacilityRollup> {
    let mut rollups: Vec<FacilityRollup> = Vec::new();
    for team in ctx.teams() {
        match rollups.iter_mut().find(|r| r.unidade == team.unidade) {
            Some(rollup) => {
                rollup.equipes += 1;
                rollup.cidadaos += team.vinculados;
            }
            None => rollups.push(FacilityRollup {
                unidade: team.unidade.clone(),
                equipes: 1,
                cidadaos: team.vinculados,
                media_por_equipe: 0.0,
            }),
        }
    }
    for rollup in &mut rollups {
        rollup.media_por_equipe = safe_ratio(rollup.cidadaos as f64, rollup.equipes as f64);
    }
    rollups.sort_by(|a, b| b.cidadaos.cmp(&a.cidadaos));
    rollups
}

/// Household recency crosstab by composite facility key, with an optional
/// family-linked pre-filter (`"SIM"` / `"NÃO"`).
pub fn household_recency_crosstab(ctx: &AnalysisContext, familia: Option<&str>) -> Crosstab {
    crosstab(
        ctx.households()
            .iter()
            .filter(|h| familia.is_none_or(|f| h.familia_vinculada == f))
            .map(|h| {
                (
                    h.estabelecimento_completo.clone(),
                    h.tempo_sem_atualizar.clone(),
                )
            }),
        &shared::models::categories::ORDEM_TEMPO,
    )
}

/// Family-linked distribution by composite facility key. The category set
/// is open (SIM/NÃO plus whatever else the report carries), so columns
/// follow the observed values.
pub fn household_family_crosstab(ctx: &AnalysisContext) -> Crosstab {
    let pairs: Vec<(String, String)> = ctx
        .households()
        .iter()
        .map(|h| {
            (
                h.estabelecimento_completo.clone(),
                h.familia_vinculada.clone(),
            )
        })
        .collect();
    crosstab_observed(pairs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::IngestResult;
    use shared::models::records::{CitizenRecord, HouseholdRecord};
    use shared::models::registry::MunicipalParameters;
    use std::collections::HashMap;

    fn params(parametro: u32, limite: u32) -> MunicipalParameters {
        MunicipalParameters {
            municipio: "TESTE".into(),
            uf: "PB".into(),
            parametro_esf: parametro,
            limite_esf: limite,
            eap_por_ine: HashMap::new(),
        }
    }

    fn citizen(unidade: &str, equipe: &str, ine: &str, id: &str, doc: &str, tempo: &str) -> CitizenRecord {
        CitizenRecord::new(
            doc.into(),
            tempo.into(),
            unidade.into(),
            equipe.into(),
            ine.into(),
            id.into(),
        )
    }

    fn ctx(citizens: Vec<CitizenRecord>, parametro: u32, limite: u32) -> AnalysisContext {
        let data = IngestResult {
            citizens,
            ..Default::default()
        };
        AnalysisContext::new(&data, params(parametro, limite), None, None)
    }

    #[test]
    fn test_overview_round_trip() {
        let context = ctx(
            vec![
                citizen("UBS A", "Equipe 1", "0001", "P1", "COM CPF", "ATÉ 4 MESES"),
                citizen("UBS A", "Equipe 1", "0001", "P2", "SEM CPF", "ATÉ 4 MESES"),
            ],
            2,
            3,
        );
        let kpis = overview(&context);
        assert_eq!(kpis.total_cidadaos, 2);
        assert_eq!(kpis.total_equipes, 1);
        assert_eq!(kpis.media_por_equipe, 2.0);
        assert_eq!(kpis.equipes_criticas, 0);

        let tab = document_crosstab(&context);
        assert_eq!(tab.rows[0].total, 2);
        let pct = tab.percentages();
        assert_eq!(pct[0].values, vec![50.0, 50.0]);
    }

    #[test]
    fn test_overview_with_no_data_is_zero_safe() {
        let kpis = overview(&ctx(vec![], 2000, 3000));
        assert_eq!(kpis.total_cidadaos, 0);
        assert_eq!(kpis.media_por_equipe, 0.0);
        assert_eq!(kpis.taxa_criticas, 0.0);
    }

    #[test]
    fn test_recency_counts_zero_fill_order() {
        let context = ctx(
            vec![citizen(
                "UBS A", "Equipe 1", "0001", "P1", "COM CPF", "MAIS DE 2 ANOS",
            )],
            2000,
            3000,
        );
        let counts = recency_counts(&context);
        assert_eq!(counts.len(), 4);
        assert_eq!(counts[0], ("ATÉ 4 MESES".to_string(), 0));
        assert_eq!(counts[3], ("MAIS DE 2 ANOS".to_string(), 1));
    }

    #[test]
    fn test_stale_registration_ranking() {
        let context = ctx(
            vec![
                citizen("UBS A", "Equipe 1", "0001", "P1", "COM CPF", "ATÉ 4 MESES"),
                citizen("UBS A", "Equipe 1", "0001", "P2", "COM CPF", "MAIS DE 2 ANOS"),
                citizen("UBS A", "Equipe 2", "0002", "P3", "COM CPF", "13 A 24 MESES"),
            ],
            2000,
            3000,
        );
        let stale = stale_registrations(&context, STALE_RANKING_TOP);
        // Equipe 2 is fully stale (100%), Equipe 1 half (50%).
        assert_eq!(stale[0].equipe, "ESF - UBS A - 0002");
        assert_eq!(stale[0].pct_desatualizados, 100.0);
        assert_eq!(stale[1].desatualizados, 1);
        assert_eq!(stale[1].pct_desatualizados, 50.0);
    }

    #[test]
    fn test_stale_ranking_keeps_ten_rows() {
        // 12 teams, each with one stale citizen; the view shows 10.
        let citizens: Vec<CitizenRecord> = (0..12)
            .map(|i| {
                citizen(
                    "UBS A",
                    &format!("Equipe {}", i),
                    &format!("{:04}", i),
                    &format!("P{}", i),
                    "COM CPF",
                    "MAIS DE 2 ANOS",
                )
            })
            .collect();
        let context = ctx(citizens, 2000, 3000);
        let stale = stale_registrations(&context, STALE_RANKING_TOP);
        assert_eq!(stale.len(), 10);
    }

    #[test]
    fn test_facility_rollup_descending() {
        let context = ctx(
            vec![
                citizen("UBS A", "Equipe 1", "0001", "P1", "COM CPF", "ATÉ 4 MESES"),
                citizen("UBS B", "Equipe 2", "0002", "P2", "COM CPF", "ATÉ 4 MESES"),
                citizen("UBS B", "Equipe 3", "0003", "P3", "COM CPF", "ATÉ 4 MESES"),
            ],
            2000,
            3000,
        );
        let rollup = facility_rollup(&context);
        assert_eq!(rollup[0].unidade, "UBS B");
        assert_eq!(rollup[0].equipes, 2);
        assert_eq!(rollup[0].cidadaos, 2);
        assert_eq!(rollup[0].media_por_equipe, 1.0);
    }

    #[test]
    fn test_household_crosstabs() {
        let data = IngestResult {
            households: vec![
                HouseholdRecord::new("UBS A", "0001", "ATÉ 4 MESES".into(), "SIM".into()),
                HouseholdRecord::new("UBS A", "0001", "MAIS DE 2 ANOS".into(), "NÃO".into()),
            ],
            ..Default::default()
        };
        let context = AnalysisContext::new(&data, params(2000, 3000), None, None);

        let all = household_recency_crosstab(&context, None);
        assert_eq!(all.rows[0].total, 2);

        let linked = household_recency_crosstab(&context, Some("SIM"));
        assert_eq!(linked.rows[0].total, 1);

        let family = household_family_crosstab(&context);
        assert_eq!(family.categories, vec!["SIM", "NÃO"]);
    }
}
