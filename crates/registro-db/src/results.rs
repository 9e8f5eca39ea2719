use serde::Deserialize;
use thiserror::Error as ThisError;

/// Postgres error code for a column that does not exist
pub const UNDEFINED_COLUMN: &str = "42703";

/// Store errors
#[derive(Debug, Clone, ThisError)]
pub enum StoreError {
    #[error("Not found")]
    NotFound,
    #[error("backend responded with {status}: {message}")]
    Backend {
        status: u16,
        code: Option<String>,
        message: String,
    },
    #[error("invalid value {value:?} for {table}.{column}")]
    InvalidValue {
        table: &'static str,
        column: &'static str,
        value: String,
    },
}

impl StoreError {
    /// Decode an error response body. Falls back to the raw
    /// body when it is not a structured error.
    pub fn from_response(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(err) => {
                let mut message = err.message.unwrap_or_else(|| body.to_string());
                if let Some(details) = err.details.filter(|d| !d.is_empty()) {
                    message = format!("{} ({})", message, details);
                }
                StoreError::Backend { status, code: err.code, message }
            },
            Err(_) => StoreError::Backend {
                status,
                code: None,
                message: body.trim().to_string(),
            },
        }
    }

    /// Is this the backend complaining about an unknown column?
    pub fn is_undefined_column(&self) -> bool {
        match self {
            StoreError::Backend { code: Some(code), .. } => code == UNDEFINED_COLUMN,
            StoreError::Backend { code: None, message, .. } => {
                message.contains("column") && message.contains("does not exist")
            },
            _ => false,
        }
    }

    pub fn invalid(table: &'static str, column: &'static str, value: impl ToString) -> Self {
        StoreError::InvalidValue { table, column, value: value.to_string() }
    }
}

/// Error payload returned by the REST backend
#[derive(Debug, Clone, Default, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    #[allow(dead_code)]
    hint: Option<String>,
}
