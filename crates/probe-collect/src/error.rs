use std::fmt;

/// A reporter failed to produce its contribution this cycle. Non-fatal: the
/// scheduler logs it and drops that reporter's contribution for the cycle,
/// everything else merges normally.
#[derive(Debug)]
pub enum ReporterError {
    CollaboratorUnavailable { reporter: &'static str, reason: String },
    Malformed { reporter: &'static str, reason: String },
}

impl fmt::Display for ReporterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReporterError::CollaboratorUnavailable { reporter, reason } => {
                write!(f, "{reporter}: upstream collaborator unavailable: {reason}")
            }
            ReporterError::Malformed { reporter, reason } => {
                write!(f, "{reporter}: malformed input: {reason}")
            }
        }
    }
}

impl std::error::Error for ReporterError {}

/// A tagger failed to enrich the report. Non-fatal, same propagation policy
/// as `ReporterError`.
#[derive(Debug)]
pub enum TaggerError {
    LookupFailed { tagger: &'static str, reason: String },
}

impl fmt::Display for TaggerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaggerError::LookupFailed { tagger, reason } => {
                write!(f, "{tagger}: lookup failed: {reason}")
            }
        }
    }
}

impl std::error::Error for TaggerError {}

/// Registry-internal failures. Stream errors are expected and handled by the
/// registry's own backoff loop rather than surfaced here; this type is for
/// failures a caller of `WalkX`/`Stop` needs to see.
#[derive(Debug)]
pub enum RegistryError {
    AlreadyStopped,
    SubscribeFailed(String),
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::AlreadyStopped => write!(f, "registry already stopped"),
            RegistryError::SubscribeFailed(reason) => write!(f, "subscribe failed: {reason}"),
        }
    }
}

impl std::error::Error for RegistryError {}
