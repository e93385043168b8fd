use thiserror::Error;

#[derive(Error, Debug)]
pub enum RarityError {
    /// A feature has no traits, a weight is invalid, or weights don't sum to 1.
    #[error("malformed catalog: {0}")]
    MalformedCatalog(String),

    /// Requested more combinations than the universe holds.
    #[error("cannot generate {requested} combinations, possible count is {available}")]
    CapacityExceeded { requested: usize, available: usize },

    /// Requested count is neither non-negative nor the `-1` sentinel.
    #[error("invalid combination count {0}, expected a non-negative count or -1")]
    InvalidRequest(i64),

    /// Ran out of candidates before reaching the requested count.
    #[error("universe exhausted after {produced} of {requested} combinations")]
    UniverseExhausted { produced: usize, requested: usize },

    /// Attempted to remove a combination that is not in the universe.
    #[error("combination not found: {0}")]
    NotFound(String),

    /// The cross-product size does not fit in memory addressing.
    #[error("combination universe too large to enumerate")]
    UniverseTooLarge,

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// Table loading or preprocessing failure.
    #[error("table error: {0}")]
    Table(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Propagated I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RarityError>;
