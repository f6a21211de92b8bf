use std::fmt;

/// Fatal at startup: the process logs the cause and exits non-zero rather
/// than entering the scheduler loop.
#[derive(Debug)]
pub enum ConfigError {
    InvalidDockerBridge,
    CannotBindDebugListener { addr: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidDockerBridge => write!(f, "docker enabled but docker.bridge is empty"),
            ConfigError::CannotBindDebugListener { addr, reason } => {
                write!(f, "cannot bind debug listener on {addr}: {reason}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
