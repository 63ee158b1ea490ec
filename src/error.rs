use thiserror::Error;

/// Error taxonomy for the query layer.
///
/// "No matching rows / files" is deliberately NOT an error: queries return
/// empty collections in that case. Errors are reserved for requests that can
/// never succeed (missing or malformed parameters, unknown codes) and for
/// backend failures surfaced by the database or the filesystem.
#[derive(Error, Debug)]
pub enum Error {
    /// A parameter required by the requested operation was not supplied.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// A parameter was supplied but could not be interpreted.
    #[error("invalid parameter {name}: {value:?}")]
    InvalidParameter { name: &'static str, value: String },

    /// Element symbol not present in the periodic-table lookup.
    #[error("unknown element symbol: {0}")]
    UnknownElement(String),

    /// Reaction / process code with no MT mapping.
    #[error("unknown reaction code: {0}")]
    UnknownReaction(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("malformed parameter document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
