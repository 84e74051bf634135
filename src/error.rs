/// Errors raised by scale construction, scale comparison and holiday loading.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A scale was configured with values it cannot work with: a
    /// non-positive frequency, a special anchor or target, a period the
    /// grid does not support, or an unparsable instant/zone/config.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// Two scales (or iterators) of different kinds were differenced.
    #[error("scale type mismatch: {left} vs {right}")]
    TypeMismatch { left: String, right: String },

    /// A holiday source contained a line that is not a `YYYYMMDD` date.
    #[error("cannot read a valid date from '{content}' (line {line})")]
    Load { line: usize, content: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Error::Configuration(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
