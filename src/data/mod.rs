//! Data module - fire record extraction

mod extractor;

pub use extractor::{
    extract, DataExtractor, ExtractError, Extraction, FireRecord, RowDiagnostic, RowError,
    DEFAULT_MAX_ROWS,
};
