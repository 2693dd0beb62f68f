pub mod categories;
pub mod date_utils;
pub mod records;
pub mod registry;
pub mod text_utils;

pub use categories::*;
pub use records::{CitizenRecord, HouseholdRecord, ProductivityRecord, KEY_SEPARATOR, ine_from_composite};
pub use registry::{EapOverride, MunicipalParameters, ParameterRegistry, TeamParams};
pub use text_utils::{file_stem_token, normalize_text};
