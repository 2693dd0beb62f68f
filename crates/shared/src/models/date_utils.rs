use chrono::{NaiveDate, NaiveDateTime};

/// Date formats accepted in productivity report cells. The e-SUS exports
/// are inconsistent between deployments: native Excel dates arrive already
/// typed, but re-saved files often carry text in Brazilian or ISO form.
const DATE_FORMATS: [&str; 3] = ["%d/%m/%Y", "%Y-%m-%d", "%d-%m-%Y"];
const DATETIME_FORMATS: [&str; 3] = ["%d/%m/%Y %H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Parse a report date from its textual form, trying each known format.
/// Returns `None` for anything unparseable; callers count those rows as a
/// diagnostic instead of failing.
pub fn parse_report_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(value, fmt) {
            return Some(date);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }
    None
}
