use thiserror::Error;

/// Problems with the shape or content of a source file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Unsupported file extension: .{0}")]
    UnsupportedExtension(String),

    #[error("missing required column(s): {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("'{0}' is not a churn label (expected Yes or No)")]
    InvalidChurn(String),

    #[error("row {row}, column {column}: {reason}")]
    InvalidCell {
        row: usize,
        column: &'static str,
        reason: String,
    },
}
