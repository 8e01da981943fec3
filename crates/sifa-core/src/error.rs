use thiserror::Error;

/// All errors that can occur in sifa-core.
#[derive(Debug, Error)]
pub enum SifaError {
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unknown provider: {0} (expected LOCAL, EXTERNAL, CIMA, RXNORM or HYBRID)")]
    InvalidProvider(String),

    #[error("Unknown form profile: {0} (expected dual or single)")]
    InvalidProfile(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Process exit codes used by the `sifa` binary.
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArgs = 3,
    NetworkError = 6,
}

pub type Result<T> = std::result::Result<T, SifaError>;
