//! Top-level client errors.

/// Errors that abort client startup or a whole command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to parse config: {0}")]
    Config(#[from] toml::de::Error),

    #[error("unable to write config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("unable to parse data file: {0}")]
    Data(#[from] serde_json::Error),
}
