use thiserror::Error;

/// Errors of the ingestion layer. Batch ingestion recovers from these
/// per file (the file lands in the unrecognized list); the error type
/// surfaces only when a single workbook is opened directly.
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("falha ao ler a planilha {name}: {source}")]
    Workbook {
        name: String,
        #[source]
        source: calamine::Error,
    },
}
