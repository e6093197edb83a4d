pub mod aggregate;
pub mod error;
pub mod models;
pub mod report;
pub mod types;

pub use aggregate::{aggregate, AggregateStats, Distribution};
pub use error::Error;
pub use models::{CompletionRequest, SentimentScorer, SpeechSynthesizer, TextModel, Translator};
pub use report::{
    AudioClip, Narrative, NarrativeOrigin, Report, ReportEntry, SpokenSummary,
    INSUFFICIENT_DATA_MESSAGE, NARRATIVE_UNAVAILABLE_MESSAGE,
};
pub use types::{
    Article, ProviderKind, ScoreOutcome, SentimentLabel, SentimentResult, SentimentScore,
    UnscoredReason, NEGATIVE_THRESHOLD, POSITIVE_THRESHOLD,
};

pub type Result<T> = std::result::Result<T, Error>;
