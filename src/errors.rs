use thiserror::Error;

/// Errors raised by the hooks, the document store and their setup.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or invalid settings
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Any failure reported by the database layer
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Reading or writing file content
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serializing a document snapshot
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Blocking, user-facing: the region forbids deleting non-draft documents.
    #[error("Deletion is not permitted for country {region}")]
    DeletionNotPermitted { region: String },

    /// A document failed validation before insert
    #[error("Invalid document: {message}")]
    InvalidDocument { message: String },

    #[error("{doctype} {name} already exists")]
    DuplicateDocument { doctype: String, name: String },

    #[error("{doctype} {name} not found")]
    DocumentNotFound { doctype: String, name: String },

    /// A lifecycle step was requested from the wrong docstatus
    #[error("Cannot {action} {doctype} {name} with docstatus {docstatus}")]
    InvalidDocStatus {
        action: &'static str,
        doctype: String,
        name: String,
        docstatus: i32,
    },

    /// The payload could not be encoded as a QR code
    #[error("QR encoding error: {0}")]
    QrEncode(String),

    /// PNG encoding of a QR code
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

impl From<qrcode::types::QrError> for Error {
    fn from(value: qrcode::types::QrError) -> Self {
        Self::QrEncode(value.to_string())
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
