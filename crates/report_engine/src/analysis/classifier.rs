use serde::Serialize;
use shared::models::records::{CitizenRecord, ine_from_composite};
use shared::models::registry::MunicipalParameters;
use std::collections::HashMap;

/// Capacity status of a team against its two thresholds. Both checks are
/// strict: a team exactly at its target (or hard cap) stays in the lower
/// tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CapacityTier {
    WithinTarget,
    AboveTarget,
    AboveHardLimit,
}

impl CapacityTier {
    pub fn label(&self) -> &'static str {
        match self {
            CapacityTier::WithinTarget => "Dentro do Parâmetro",
            CapacityTier::AboveTarget => "Acima do Parâmetro",
            CapacityTier::AboveHardLimit => "ACIMA DO LIMITE MÁXIMO",
        }
    }

    /// Hard-limit check first, so a team above both thresholds is
    /// critical, not merely warned.
    fn classify(enrolled: u64, parametro: u32, limite: u32) -> Self {
        if enrolled > limite as u64 {
            CapacityTier::AboveHardLimit
        } else if enrolled > parametro as u64 {
            CapacityTier::AboveTarget
        } else {
            CapacityTier::WithinTarget
        }
    }
}

impl std::fmt::Display for CapacityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One classified team: enrollment count joined with its resolved
/// regulatory identity. Recomputed in full on every filter change and
/// consumed read-only by every downstream view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamCapacityStatus {
    pub unidade: String,
    /// Composite team key as ingested (`nome + " - " + INE`).
    pub equipe_original: String,
    pub ine: String,
    /// Resolved subtype: `"ESF"`, `"20"` or `"30"`.
    pub tipo: String,
    pub vinculados: u64,
    pub parametro: u32,
    pub limite: u32,
    pub status: CapacityTier,
    /// Display label, `"EAP <tipo> - <unidade> - <INE>"` for EAP teams,
    /// `"ESF - <unidade> - <INE>"` otherwise.
    pub equipe: String,
    /// People beyond the hard cap (0 when within it).
    pub excedente: u64,
}

impl TeamCapacityStatus {
    /// Excess over the hard cap as a percentage of the cap, 0-safe.
    pub fn pct_acima_limite(&self) -> f64 {
        if self.limite == 0 {
            0.0
        } else {
            self.excedente as f64 / self.limite as f64 * 100.0
        }
    }
}

fn display_label(tipo: &str, unidade: &str, ine: &str) -> String {
    if tipo == "20" || tipo == "30" {
        format!("EAP {} - {} - {}", tipo, unidade, ine)
    } else {
        format!("ESF - {} - {}", unidade, ine)
    }
}

/// Group citizens by (facility, composite team key), resolve each team's
/// regulatory parameters by its INE and classify enrollment against the
/// thresholds. Output is sorted descending by enrolled count with a
/// stable sort — every ranking view depends on this order.
pub fn classify_teams(
    citizens: &[CitizenRecord],
    params: &MunicipalParameters,
) -> Vec<TeamCapacityStatus> {
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    let mut groups: Vec<((String, String), u64)> = Vec::new();
    for citizen in citizens {
        let key = (citizen.unidade.clone(), citizen.equipe_completa.clone());
        match index.get(&key) {
            Some(&i) => groups[i].1 += 1,
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, 1));
            }
        }
    }

    let mut teams: Vec<TeamCapacityStatus> = groups
        .into_iter()
        .map(|((unidade, equipe_original), vinculados)| {
            let ine = ine_from_composite(&equipe_original).to_string();
            let team = params.resolve_team(&ine);
            let status = CapacityTier::classify(vinculados, team.parametro, team.limite_maximo);
            let equipe = display_label(&team.tipo, &unidade, &ine);
            let excedente = vinculados.saturating_sub(team.limite_maximo as u64);
            TeamCapacityStatus {
                unidade,
                equipe_original,
                ine,
                tipo: team.tipo,
                vinculados,
                parametro: team.parametro,
                limite: team.limite_maximo,
                status,
                equipe,
                excedente,
            }
        })
        .collect();

    teams.sort_by(|a, b| b.vinculados.cmp(&a.vinculados));
    teams
}

/// Mapping from composite team key to display label, used when a view
/// regroups citizen rows by team.
pub fn team_label_map(teams: &[TeamCapacityStatus]) -> HashMap<String, String> {
    teams
        .iter()
        .map(|t| (t.equipe_original.clone(), t.equipe.clone()))
        .collect()
}
