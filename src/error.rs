use thiserror::Error;

/// Errors raised while loading inputs or preparing a binding pass.
///
/// Per-row and per-feature mismatches are never errors; they degrade to
/// zero-valued output and show up in [`crate::types::MatchStats`].
#[derive(Debug, Error)]
pub enum RegionMapError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The collection is empty or no feature carries any properties.
    #[error("no administrative name field found in boundary data")]
    NoNameFieldFound,

    /// A manually supplied name field is not present on any feature.
    #[error("name field `{field}` is not present on any boundary feature")]
    UnknownNameField { field: String },

    #[error("name field `{field}` is missing on {missing} of {sampled} sampled features")]
    InconsistentNameField {
        field: String,
        missing: usize,
        sampled: usize,
    },

    #[error("invalid boundary data: {message}")]
    InvalidGeometry { message: String },
}

pub type Result<T> = std::result::Result<T, RegionMapError>;
