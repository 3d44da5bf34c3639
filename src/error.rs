//! Error types: domain errors for fetch and export, plus the boxed
//! error used for top-level plumbing.

use std::fmt::{Display, Formatter};
use thiserror::Error;

pub type DynError = Box<dyn std::error::Error + Send + Sync + 'static>;
pub type Result<T> = std::result::Result<T, DynError>;

/// Failure of the remote fetch. The `Display` text is what the error
/// alert shows to the user.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not parse user list: {0}")]
    Parse(String),

    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("fetch cancelled")]
    Cancelled,
}

/// Failure while serializing or saving an export.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("pdf: {0}")]
    Pdf(String),

    #[error("export payload is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub trait Context<T> {
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

#[derive(Debug)]
pub struct WithContextError {
    pub context: String,
    pub source: DynError,
}

impl Display for WithContextError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.context, self.source)
    }
}

impl std::error::Error for WithContextError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&*self.source)
    }
}

impl<T, E> Context<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_ctx<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            Box::new(WithContextError {
                context: f(),
                source: e.into(),
            }) as DynError
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn context_prefixes_message_and_keeps_source() {
        let res: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = res.with_ctx(|| "open settings.conf".to_string()).unwrap_err();
        assert_eq!(err.to_string(), "open settings.conf: gone");
        assert!(err.source().is_some());
    }

    #[test]
    fn status_error_message_is_user_facing() {
        let err = FetchError::Status {
            status: 503,
            message: "maintenance".into(),
        };
        assert_eq!(err.to_string(), "server returned 503: maintenance");
    }
}
