use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// Lexicon or theme catalog failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// A submission was missing a required field or carried an out-of-range score.
    #[error("invalid submission: {0}")]
    InvalidSubmission(String),

    #[error("unrecognised {kind}: {value}")]
    Parse { kind: &'static str, value: String },

    #[error("workflow needs at least one sample")]
    EmptySampleSet,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}
