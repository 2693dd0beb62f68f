use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Separator used to build composite team/facility keys
/// (`"EQUIPE SAÚDE 1 - 0001234"`).
pub const KEY_SEPARATOR: &str = " - ";

/// INE token of a composite key: the text after the last separator.
/// A key without a separator is returned whole — malformed keys are kept
/// as their own INE token rather than rejected, so they still flow through
/// team resolution (and fall back to the ESF defaults there).
pub fn ine_from_composite(composite: &str) -> &str {
    match composite.rsplit_once(KEY_SEPARATOR) {
        Some((_, ine)) => ine.trim(),
        None => composite.trim(),
    }
}

/// One enrolled person, as read from the citizens report.
/// Identity fields (facility, team, INE, person id) are guaranteed
/// non-empty; rows failing that are dropped at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CitizenRecord {
    pub status_documento: String,
    pub tempo_sem_atualizar: String,
    pub unidade: String,
    pub nome_equipe: String,
    pub ine: String,
    pub cidadao: String,
    /// Composite team key, `nome_equipe + " - " + ine`.
    pub equipe_completa: String,
}

impl CitizenRecord {
    pub fn new(
        status_documento: String,
        tempo_sem_atualizar: String,
        unidade: String,
        nome_equipe: String,
        ine: String,
        cidadao: String,
    ) -> Self {
        let equipe_completa = format!("{}{}{}", nome_equipe.trim(), KEY_SEPARATOR, ine.trim());
        Self {
            status_documento,
            tempo_sem_atualizar,
            unidade,
            nome_equipe,
            ine,
            cidadao,
            equipe_completa,
        }
    }
}

/// One household, as read from the households report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HouseholdRecord {
    /// Composite facility key, `estabelecimento + " - " + ine`.
    pub estabelecimento_completo: String,
    pub tempo_sem_atualizar: String,
    pub familia_vinculada: String,
}

impl HouseholdRecord {
    pub fn new(
        estabelecimento: &str,
        ine: &str,
        tempo_sem_atualizar: String,
        familia_vinculada: String,
    ) -> Self {
        Self {
            estabelecimento_completo: format!(
                "{}{}{}",
                estabelecimento.trim(),
                KEY_SEPARATOR,
                ine.trim()
            ),
            tempo_sem_atualizar,
            familia_vinculada,
        }
    }
}

/// One care encounter, as read from the productivity report. The report
/// is free-form; only the team column is mandatory for a file to be
/// accepted, so everything else is optional.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductivityRecord {
    pub estabelecimento: Option<String>,
    pub equipe: String,
    pub profissional: Option<String>,
    /// Occupation description (CBO).
    pub cbo: Option<String>,
    pub tipo_atendimento: Option<String>,
    pub tipo_consulta: Option<String>,
    /// `None` when the date cell is missing or unparseable; such rows are
    /// excluded from date-filtered views but kept everywhere else.
    pub data: Option<NaiveDate>,
    /// Grand total of the row (`TOTAL GERAL`), 0 when absent.
    pub total: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ine_from_composite() {
        assert_eq!(ine_from_composite("EQUIPE SAÚDE 1 - 0001234"), "0001234");
        assert_eq!(
            ine_from_composite("UBS CENTRO - ANEXO - 0009999"),
            "0009999"
        );
    }

    #[test]
    fn test_ine_fallback_without_separator() {
        assert_eq!(ine_from_composite("EQUIPEANTIGA0001"), "EQUIPEANTIGA0001");
        assert_eq!(ine_from_composite("  0001234  "), "0001234");
    }

    #[test]
    fn test_citizen_composite_key() {
        let c = CitizenRecord::new(
            "COM CPF".into(),
            "ATÉ 4 MESES".into(),
            "UBS A".into(),
            " Equipe 1 ".into(),
            "0001".into(),
            "ABC123".into(),
        );
        assert_eq!(c.equipe_completa, "Equipe 1 - 0001");
    }

    #[test]
    fn test_household_composite_key() {
        let h = HouseholdRecord::new(
            "UBS CENTRAL",
            "0005678",
            "MAIS DE 2 ANOS".into(),
            "SIM".into(),
        );
        assert_eq!(h.estabelecimento_completo, "UBS CENTRAL - 0005678");
    }
}
