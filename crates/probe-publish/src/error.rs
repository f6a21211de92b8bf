use probe_wire::WireError;
use std::fmt;

/// A publish attempt against one target failed. Non-fatal: the aggregate
/// `Publisher::publish` call logs this and moves on to the next target.
#[derive(Debug)]
pub enum PublisherError {
    Encode(WireError),
    TargetUnreachable { target: String, reason: String },
    Closed,
}

impl fmt::Display for PublisherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PublisherError::Encode(e) => write!(f, "failed to encode report: {e}"),
            PublisherError::TargetUnreachable { target, reason } => {
                write!(f, "target {target} unreachable: {reason}")
            }
            PublisherError::Closed => write!(f, "publisher is closed"),
        }
    }
}

impl std::error::Error for PublisherError {}

impl From<WireError> for PublisherError {
    fn from(e: WireError) -> Self {
        PublisherError::Encode(e)
    }
}
