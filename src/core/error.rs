use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Unknown {kind} label: {value:?}")]
    UnknownLabel { kind: &'static str, value: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl EngineError {
    pub fn unknown(kind: &'static str, value: impl Into<String>) -> Self {
        Self::UnknownLabel {
            kind,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
