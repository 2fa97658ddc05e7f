use std::io;

use thiserror::Error;

/// Failures surfaced by the invoice service and store.
///
/// Logo problems never appear here: an unreadable asset degrades to
/// "no logo" inside the renderer instead of failing the operation.
#[derive(Debug, Error)]
pub enum InvoiceError {
    /// Input rejected before any side effect took place.
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invoice {0} already exists")]
    AlreadyExists(String),

    #[error("invoice {0} not found")]
    NotFound(String),

    /// Sink or artifact I/O failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl InvoiceError {
    pub fn validation(msg: impl Into<String>) -> Self {
        InvoiceError::Validation(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, InvoiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_invoice() {
        let err = InvoiceError::NotFound("INV-202608-000001".to_string());
        assert_eq!(err.to_string(), "invoice INV-202608-000001 not found");
    }

    #[test]
    fn io_errors_convert_transparently() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "sink closed");
        let err: InvoiceError = io_err.into();
        assert!(matches!(err, InvoiceError::Io(_)));
        assert_eq!(err.to_string(), "sink closed");
    }
}
