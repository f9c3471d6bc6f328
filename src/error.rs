use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum PortError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("`{program}` exited with {}", describe_status(.status))]
    Command {
        program: String,
        status: Option<i32>,
        output: String,
    },
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl PortError {
    /// Captured output of a failed external command, if any.
    pub fn command_output(&self) -> Option<&str> {
        match self {
            PortError::Command { output, .. } => Some(output.as_str()),
            _ => None,
        }
    }
}

fn describe_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("status {code}"),
        None => "no status (terminated by signal)".to_string(),
    }
}

pub type Result<T> = std::result::Result<T, PortError>;
