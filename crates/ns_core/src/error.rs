use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// News retrieval or page scraping failed.
    #[error("Fetch unavailable: {0}")]
    FetchUnavailable(String),

    /// The text-analysis call for one article failed.
    #[error("Scoring unavailable: {0}")]
    ScoringUnavailable(String),

    /// Aggregate requested over zero scored articles.
    #[error("No scored articles to aggregate")]
    NoData,

    #[error("Narrative unavailable: {0}")]
    NarrativeUnavailable(String),

    #[error("Translation unavailable: {0}")]
    TranslationUnavailable(String),

    #[error("Audio unavailable: {0}")]
    AudioUnavailable(String),

    /// Broken internal invariant. The only non-recoverable kind.
    #[error("Internal invariant violated: {0}")]
    Invariant(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::InvalidUrl(e.to_string())
    }
}

impl Error {
    /// Everything except a broken invariant degrades a single field of a report.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Error::Invariant(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
