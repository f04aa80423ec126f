use thiserror::Error;

#[derive(Error, Debug)]
pub enum EcoError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Missing field '{field}' for {context}")]
    MissingField { field: String, context: String },

    #[error("Unknown {kind} type: '{tag}'")]
    UnknownType { kind: String, tag: String },

    #[error("Duplicate {kind} type: '{tag}'")]
    DuplicateType { kind: String, tag: String },

    #[error("Region ({row}, {col}) is outside the {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, EcoError>;

impl EcoError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        EcoError::InvalidParameter(msg.into())
    }

    pub fn unknown_type(kind: &str, tag: &str) -> Self {
        EcoError::UnknownType {
            kind: kind.to_string(),
            tag: tag.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_out_of_bounds_message() {
        let err = EcoError::OutOfBounds {
            row: 7,
            col: 2,
            rows: 5,
            cols: 5,
        };
        assert_eq!(err.to_string(), "Region (7, 2) is outside the 5x5 grid");
    }

    #[test]
    fn test_json_error_converts() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{nope");
        let err: EcoError = parse.unwrap_err().into();
        assert!(matches!(err, EcoError::JsonError(_)));
    }
}
