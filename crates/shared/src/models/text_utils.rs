use once_cell::sync::Lazy;
use regex::Regex;

/// Leading token of an uploaded file name, before the first `_` or `.`.
/// Reports exported by e-SUS are conventionally named
/// `<MUNICIPIO>_<relatorio>_<data>.xlsx`, so this token carries the
/// municipality name.
static FILE_STEM_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^_.]+)").expect("Invalid regex pattern for file name tokens")
});

/// Fold a single accented Latin character to its ASCII base character.
/// Covers the accent set that occurs in Brazilian municipality, facility
/// and report column names.
fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'Á' | 'À' | 'Â' | 'Ã' | 'Ä' => 'A',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'É' | 'È' | 'Ê' | 'Ë' => 'E',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'Í' | 'Ì' | 'Î' | 'Ï' => 'I',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'Ó' | 'Ò' | 'Ô' | 'Õ' | 'Ö' => 'O',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'Ú' | 'Ù' | 'Û' | 'Ü' => 'U',
        'ç' => 'c',
        'Ç' => 'C',
        'ñ' => 'n',
        'Ñ' => 'N',
        other => other,
    }
}

/// Canonical comparison form of a free-text field: accents folded to
/// ASCII, uppercased and trimmed.
///
/// # Example
/// ```rust
/// use shared::models::text_utils::normalize_text;
///
/// assert_eq!(normalize_text("  Viçosa do Ceará "), "VICOSA DO CEARA");
/// assert_eq!(normalize_text("SÃO JOSÉ DE UBÁ"), "SAO JOSE DE UBA");
/// ```
pub fn normalize_text(text: &str) -> String {
    text.trim()
        .chars()
        .map(fold_accent)
        .collect::<String>()
        .to_uppercase()
}

/// Extract the leading name token of an uploaded file, normalized for
/// municipality matching. Path components are stripped first.
pub fn file_stem_token(file_name: &str) -> Option<String> {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    FILE_STEM_TOKEN
        .captures(base)
        .and_then(|caps| caps.get(1))
        .map(|m| normalize_text(m.as_str()))
        .filter(|token| !token.is_empty())
}
