use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Value for {what} must be positive (received {value})")]
    NonPositive { what: &'static str, value: f64 },

    #[error("Unknown unit: {unit}")]
    UnknownUnit { unit: String },
}
