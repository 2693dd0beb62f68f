pub mod analysis;
pub mod errors;
pub mod ingest;
pub mod table;

pub use errors::*;
