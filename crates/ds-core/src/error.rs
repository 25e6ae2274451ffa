use thiserror::Error;

pub type DsResult<T> = Result<T, DsError>;

#[derive(Error, Debug)]
pub enum DsError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Configuration error: {what}")]
    Config { what: String },

    #[error("Invariant violated: {what}")]
    Invariant { what: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
