use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Git error: {0}")]
    Git(String),

    #[error("Docker error: {0}")]
    Docker(String),

    #[error("{0}")]
    ToolNotFound(String),

    #[error("Selection error: {0}")]
    Selection(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn code(&self) -> &'static str {
        match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::Git(_) => "GIT_ERROR",
            Error::Docker(_) => "DOCKER_ERROR",
            Error::ToolNotFound(_) => "TOOL_NOT_FOUND",
            Error::Selection(_) => "SELECTION_ERROR",
            Error::Io(_) => "IO_ERROR",
            Error::Yaml(_) => "YAML_ERROR",
            Error::Other(_) => "ERROR",
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Error::Config(message.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    pub fn git(message: impl Into<String>) -> Self {
        Error::Git(message.into())
    }

    pub fn docker(message: impl Into<String>) -> Self {
        Error::Docker(message.into())
    }

    pub fn tool_not_found(message: impl Into<String>) -> Self {
        Error::ToolNotFound(message.into())
    }

    pub fn selection(message: impl Into<String>) -> Self {
        Error::Selection(message.into())
    }

    pub fn other(message: impl Into<String>) -> Self {
        Error::Other(message.into())
    }
}
