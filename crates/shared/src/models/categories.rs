use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// Fixed order of the document-status categories used by every
/// document crosstab.
pub const ORDEM_CPF: [&str; 2] = ["COM CPF", "SEM CPF"];

/// Fixed order of the registration-recency tiers, oldest last.
pub const ORDEM_TEMPO: [&str; 4] = [
    "ATÉ 4 MESES",
    "5 A 12 MESES",
    "13 A 24 MESES",
    "MAIS DE 2 ANOS",
];

/// Recency tiers counted as stale (more than one year without update).
pub const TEMPO_DESATUALIZADO: [&str; 2] = ["13 A 24 MESES", "MAIS DE 2 ANOS"];

/// Fixed ESB consultation-type categories of the odontology pivot.
/// The trailing space in the last entry matches the report column as
/// exported by e-SUS.
pub const ORDEM_CONSULTA_ESB: [&str; 4] = [
    "Consulta de manutenção em odontologia",
    "Consulta de retorno em odontologia",
    "Não informado",
    "Primeira consulta odontológica programática ",
];

/// Occupations excluded from a facility's assistance total (community
/// health agents register visits, not clinical encounters).
pub const CBO_FORA_DO_TOTAL: [&str; 2] = [
    "AGENTE COMUNITÁRIO DE SAÚDE",
    "TÉCNICO EM AGENTE COMUNITÁRIO DE SAÚDE",
];

/// Management category of an encounter type: programmed care versus
/// spontaneous demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CareCategory {
    Programado,
    Espontanea,
    Outros,
}

impl CareCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CareCategory::Programado => "Cuidado Programado",
            CareCategory::Espontanea => "Demanda Espontânea",
            CareCategory::Outros => "Outros",
        }
    }

    /// Fixed column order of the care-mix crosstabs.
    pub const ORDER: [CareCategory; 3] = [
        CareCategory::Programado,
        CareCategory::Espontanea,
        CareCategory::Outros,
    ];
}

impl std::fmt::Display for CareCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mapping from the encounter types of the productivity report to their
/// management category. Types absent from this map stay uncategorized.
pub static CATEGORIA_ATENDIMENTO: Lazy<HashMap<&'static str, CareCategory>> = Lazy::new(|| {
    let mut map = HashMap::new();
    map.insert("CONSULTA AGENDADA", CareCategory::Programado);
    map.insert(
        "CONSULTA AGENDADA PROGRAMADA / CUIDADO CONTINUADO",
        CareCategory::Programado,
    );
    map.insert("CONSULTA NO DIA", CareCategory::Espontanea);
    map.insert("ATENDIMENTO DE URGÊNCIA", CareCategory::Espontanea);
    map.insert("ESCUTA INICIAL / ORIENTAÇÃO", CareCategory::Outros);
    map
});

/// Encounter types that make up the spontaneous-demand pressure table,
/// most critical first.
pub const TIPOS_DEMANDA_ESPONTANEA: [&str; 2] = ["ATENDIMENTO DE URGÊNCIA", "CONSULTA NO DIA"];

/// Encounter types that make up the programmed-care highlight table.
pub const TIPOS_CUIDADO_PROGRAMADO: [&str; 2] = [
    "CONSULTA AGENDADA",
    "CONSULTA AGENDADA PROGRAMADA / CUIDADO CONTINUADO",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categoria_atendimento_covers_both_sides() {
        assert_eq!(
            CATEGORIA_ATENDIMENTO.get("CONSULTA AGENDADA"),
            Some(&CareCategory::Programado)
        );
        assert_eq!(
            CATEGORIA_ATENDIMENTO.get("ATENDIMENTO DE URGÊNCIA"),
            Some(&CareCategory::Espontanea)
        );
        assert_eq!(CATEGORIA_ATENDIMENTO.get("VISITA DOMICILIAR"), None);
    }

    #[test]
    fn test_care_category_labels() {
        assert_eq!(CareCategory::Programado.as_str(), "Cuidado Programado");
        assert_eq!(CareCategory::Espontanea.to_string(), "Demanda Espontânea");
    }

    #[test]
    fn test_stale_tiers_are_a_subset_of_the_order() {
        for tier in TEMPO_DESATUALIZADO {
            assert!(ORDEM_TEMPO.contains(&tier));
        }
    }
}
