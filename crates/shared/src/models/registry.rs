use crate::errors::{SharedError, SharedResult};
use crate::models::text_utils::{file_stem_token, normalize_text};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::Path;

/// Environment variable pointing at a replacement registry file. Without
/// it the compiled-in default table is used.
pub const REGISTRY_ENV_VAR: &str = "APS_PARAMETROS";

const DEFAULT_REGISTRY_JSON: &str = include_str!("../../data/parametros.json");

/// Capacity override for an EAP team, keyed by its INE in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EapOverride {
    /// Team subtype code, `"20"` or `"30"`.
    pub tipo: String,
    pub parametro: u32,
    pub limite_maximo: u32,
}

/// Resolved capacity parameters of one team: the EAP override when the
/// INE has one, the municipal ESF defaults otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamParams {
    pub tipo: String,
    pub parametro: u32,
    pub limite_maximo: u32,
}

/// Regulatory capacity parameters of one municipality.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MunicipalParameters {
    pub municipio: String,
    pub uf: String,
    pub parametro_esf: u32,
    pub limite_esf: u32,
    pub eap_por_ine: HashMap<String, EapOverride>,
}

impl MunicipalParameters {
    /// Registry key of this municipality, `"<MUNICÍPIO>-<UF>"`.
    pub fn key(&self) -> String {
        format!("{}-{}", self.municipio, self.uf)
    }

    /// Resolve the capacity parameters of a team by its INE. Teams without
    /// an EAP override are standard ESF teams on the municipal defaults;
    /// an empty override map is the common case, not an error.
    pub fn resolve_team(&self, ine: &str) -> TeamParams {
        match self.eap_por_ine.get(ine) {
            Some(eap) => TeamParams {
                tipo: eap.tipo.clone(),
                parametro: eap.parametro,
                limite_maximo: eap.limite_maximo,
            },
            None => TeamParams {
                tipo: "ESF".to_string(),
                parametro: self.parametro_esf,
                limite_maximo: self.limite_esf,
            },
        }
    }
}

/// Raw registry entry as stored in the JSON resource. The `municipio`
/// field still carries the combined `"<MUNICÍPIO>-<UF>"` key.
#[derive(Debug, Clone, Deserialize)]
struct RawEntry {
    municipio: String,
    parametro_esf: u32,
    limite_esf: u32,
    #[serde(default)]
    eap_por_ine: HashMap<String, EapOverride>,
}

/// Static lookup of regulatory parameters per municipality, loaded once at
/// startup and immutable afterwards. Entry order follows the source file,
/// which makes the first-municipality fallback deterministic.
#[derive(Debug, Clone)]
pub struct ParameterRegistry {
    entries: Vec<MunicipalParameters>,
}

impl ParameterRegistry {
    /// Load the compiled-in default table.
    pub fn load_default() -> SharedResult<Self> {
        Self::from_json_str(DEFAULT_REGISTRY_JSON)
    }

    /// Load from the file named by `APS_PARAMETROS`, falling back to the
    /// compiled-in default when the variable is unset.
    pub fn load_from_env_or_default() -> SharedResult<Self> {
        match env::var(REGISTRY_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load(path.trim()),
            _ => Self::load_default(),
        }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> SharedResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> SharedResult<Self> {
        let raw: Vec<RawEntry> = serde_json::from_str(json)?;
        let mut entries = Vec::with_capacity(raw.len());
        for entry in raw {
            // A key without a UF suffix is skipped, not fatal.
            let Some((municipio, uf)) = entry.municipio.rsplit_once('-') else {
                log::warn!(
                    "chave de município mal formatada ignorada: {}",
                    entry.municipio
                );
                continue;
            };
            let params = MunicipalParameters {
                municipio: municipio.trim().to_string(),
                uf: uf.trim().to_string(),
                parametro_esf: entry.parametro_esf,
                limite_esf: entry.limite_esf,
                eap_por_ine: entry.eap_por_ine,
            };
            validate_entry(&params)?;
            entries.push(params);
        }
        if entries.is_empty() {
            return Err(SharedError::InvalidRegistry(
                "nenhum município válido no registro".to_string(),
            ));
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Municipalities in registry order.
    pub fn municipalities(&self) -> impl Iterator<Item = &MunicipalParameters> {
        self.entries.iter()
    }

    /// First municipality in registry order; the deterministic fallback
    /// when a lookup misses.
    pub fn first(&self) -> &MunicipalParameters {
        // Load-time validation guarantees at least one entry.
        &self.entries[0]
    }

    /// Exact lookup by municipality name (without the UF suffix).
    pub fn lookup(&self, municipio: &str) -> SharedResult<&MunicipalParameters> {
        self.entries
            .iter()
            .find(|m| m.municipio == municipio)
            .ok_or_else(|| SharedError::MunicipalityNotFound(municipio.to_string()))
    }

    /// Lookup with the deterministic fallback: callers render something
    /// rather than abort when the municipality is unknown.
    pub fn lookup_or_first(&self, municipio: &str) -> &MunicipalParameters {
        match self.lookup(municipio) {
            Ok(params) => params,
            Err(_) => {
                log::warn!(
                    "município {} ausente do registro, usando {}",
                    municipio,
                    self.first().municipio
                );
                self.first()
            }
        }
    }

    /// Infer the active municipality from uploaded file names: the leading
    /// `_`-separated token of each name is matched, accent-folded, against
    /// the registry. First match wins, in upload order.
    pub fn infer_municipality(&self, file_names: &[String]) -> Option<&MunicipalParameters> {
        let by_token: HashMap<String, &MunicipalParameters> = self
            .entries
            .iter()
            .map(|m| (normalize_text(&m.municipio), m))
            .collect();
        file_names
            .iter()
            .filter_map(|name| file_stem_token(name))
            .find_map(|token| by_token.get(&token).copied())
    }
}

fn validate_entry(params: &MunicipalParameters) -> SharedResult<()> {
    if params.parametro_esf == 0 || params.limite_esf < params.parametro_esf {
        return Err(SharedError::InvalidRegistry(format!(
            "{}: parametro_esf={} limite_esf={}",
            params.key(),
            params.parametro_esf,
            params.limite_esf
        )));
    }
    for (ine, eap) in &params.eap_por_ine {
        if eap.tipo != "20" && eap.tipo != "30" {
            return Err(SharedError::InvalidRegistry(format!(
                "{}: INE {} com tipo EAP desconhecido {:?}",
                params.key(),
                ine,
                eap.tipo
            )));
        }
        if eap.parametro == 0 || eap.limite_maximo < eap.parametro {
            return Err(SharedError::InvalidRegistry(format!(
                "{}: INE {} com parametro={} limite_maximo={}",
                params.key(),
                ine,
                eap.parametro,
                eap.limite_maximo
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ParameterRegistry {
        ParameterRegistry::load_default().unwrap()
    }

    #[test]
    fn test_default_registry_loads_and_validates() {
        let reg = registry();
        assert!(reg.len() >= 30);
        assert_eq!(reg.first().municipio, "ALHANDRA");
        assert_eq!(reg.first().uf, "PB");
    }

    #[test]
    fn test_lookup_known_municipality() {
        let reg = registry();
        let santa_rita = reg.lookup("SANTA RITA").unwrap();
        assert_eq!(santa_rita.parametro_esf, 3000);
        assert_eq!(santa_rita.limite_esf, 4500);
        assert!(santa_rita.eap_por_ine.is_empty());
    }

    #[test]
    fn test_lookup_missing_falls_back_to_first() {
        let reg = registry();
        assert!(matches!(
            reg.lookup("ATLÂNTIDA"),
            Err(SharedError::MunicipalityNotFound(_))
        ));
        assert_eq!(reg.lookup_or_first("ATLÂNTIDA").municipio, "ALHANDRA");
    }

    #[test]
    fn test_resolve_team_default_is_esf() {
        let reg = registry();
        let m = reg.lookup("MACAÍBA").unwrap();
        let team = m.resolve_team("0000000");
        assert_eq!(team.tipo, "ESF");
        assert_eq!(team.parametro, 2750);
        assert_eq!(team.limite_maximo, 4125);
    }

    #[test]
    fn test_resolve_team_override_wins_even_when_lower() {
        let reg = registry();
        let m = reg.lookup("MACAÍBA").unwrap();
        let eap = m.resolve_team("0001234");
        assert_eq!(eap.tipo, "20");
        assert_eq!(eap.parametro, 1375);
        assert_eq!(eap.limite_maximo, 2063);
        assert!(eap.parametro < m.parametro_esf);
    }

    #[test]
    fn test_resolve_team_without_any_overrides() {
        let reg = registry();
        let m = reg.lookup("CONDE").unwrap();
        let team = m.resolve_team("0001234");
        assert_eq!(team.tipo, "ESF");
        assert_eq!(team.parametro, m.parametro_esf);
    }

    #[test]
    fn test_malformed_key_is_skipped() {
        let json = r#"[
            { "municipio": "SEMUF", "parametro_esf": 2000, "limite_esf": 3000 },
            { "municipio": "CONDE-PB", "parametro_esf": 2500, "limite_esf": 3750 }
        ]"#;
        let reg = ParameterRegistry::from_json_str(json).unwrap();
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.first().municipio, "CONDE");
    }

    #[test]
    fn test_invalid_thresholds_rejected() {
        let json = r#"[
            { "municipio": "CONDE-PB", "parametro_esf": 2500, "limite_esf": 2000 }
        ]"#;
        assert!(matches!(
            ParameterRegistry::from_json_str(json),
            Err(SharedError::InvalidRegistry(_))
        ));
    }

    #[test]
    fn test_empty_registry_rejected() {
        assert!(ParameterRegistry::from_json_str("[]").is_err());
    }

    #[test]
    fn test_infer_municipality_from_file_names() {
        let reg = registry();
        let files = vec![
            "relatorio_geral.xlsx".to_string(),
            "MACAÍBA_cidadaos_2024.xlsx".to_string(),
        ];
        let inferred = reg.infer_municipality(&files).unwrap();
        assert_eq!(inferred.municipio, "MACAÍBA");

        // Accent-folded match also works when the file name lost accents.
        let folded = vec!["MACAIBA_cidadaos.xlsx".to_string()];
        assert_eq!(reg.infer_municipality(&folded).unwrap().municipio, "MACAÍBA");

        assert!(reg.infer_municipality(&["outra_coisa.xlsx".to_string()]).is_none());
    }
}
