use thiserror::Error;

/// Errors that can be returned while streaming or transforming a dataset.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The streaming source could not be opened. Reported unchanged from
    /// the source and never retried.
    #[error("failed to load dataset from {locator:?}: {source}")]
    SourceUnavailable {
        locator: String,
        source: anyhow::Error,
    },

    /// The stream has no more records. This is the normal way for an
    /// evaluation loop to end.
    #[error("no more records in the stream")]
    Exhausted,

    /// The output of a transform didn't match what the caller asked for.
    #[error("contract mismatch: {0}")]
    ContractMismatch(String),

    /// An upstream item lacked the fields the dataset needs.
    #[error("malformed record in {dataset}: {reason}")]
    MalformedRecord { dataset: String, reason: String },

    #[error("preprocessing failed: {0}")]
    Preprocess(anyhow::Error),

    #[error("failed reading from stream: {0}")]
    Stream(anyhow::Error),
}

impl DatasetError {
    pub(crate) fn malformed(dataset: &str, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            dataset: dataset.to_owned(),
            reason: reason.into(),
        }
    }

    /// Whether this error marks the regular end of a stream.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted)
    }
}
