use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("Jaccard similarity is undefined for two empty sets")]
    EmptyUnion,
    #[error("signature length mismatch (expected {expected}, got {got})")]
    SignatureLength { expected: usize, got: usize },
    #[error("invalid parameter: {0}")]
    InvalidParam(String),
    #[error("malformed row at line {line}: {reason}")]
    MalformedRow { line: u64, reason: String },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    SerializationFailed(#[from] std::boxed::Box<bincode::ErrorKind>),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid<S: Into<String>>(msg: S) -> Self {
        Error::InvalidParam(msg.into())
    }
}
