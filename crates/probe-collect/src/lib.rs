//! Collection: reporters that observe one piece of the host (processes,
//! containers, the orchestrator API, ...) and turn what they see into a
//! partial [`Report`], taggers that enrich a merged report with
//! cross-reporter metadata, and the registries that keep a live,
//! background-refreshed view of an external watch API between spy ticks.
//!
//! Everything that actually talks to the kernel, the Docker API or the
//! Kubernetes API is pushed behind a collaborator trait in [`collaborators`]
//! — this crate only knows how to turn their output into graph shapes.

pub mod collaborators;
pub mod error;
pub mod registry;
pub mod reporters;
pub mod taggers;

pub use error::{RegistryError, ReporterError, TaggerError};
pub use reporters::Reporter;
pub use taggers::Tagger;

use probe_types::Report;

/// Run every reporter, merging their contributions into one report. A
/// reporter that fails logs a warning and is skipped rather than aborting
/// the whole cycle — one broken collaborator shouldn't blank out the rest
/// of the topology.
pub fn collect(reporters: &[Box<dyn Reporter>]) -> Report {
    let mut report = Report::new();
    for reporter in reporters {
        match reporter.report() {
            Ok(partial) => report = report.merge(&partial),
            Err(err) => {
                tracing::warn!(reporter = reporter.name(), error = %err, "reporter failed, skipping");
            }
        }
    }
    report
}

/// Run every tagger in order over a report, short-circuiting on the first
/// failure. Unlike reporters, a failing tagger aborts the cycle: taggers
/// attach identity-critical metadata (`host_id`, container ownership) that
/// downstream renderers assume is present whenever it's expected at all.
pub fn tag(report: Report, taggers: &[Box<dyn Tagger>]) -> Result<Report, TaggerError> {
    let mut report = report;
    for tagger in taggers {
        report = tagger.tag(report)?;
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use probe_types::{Node, NodeId};

    struct OkReporter;
    impl Reporter for OkReporter {
        fn name(&self) -> &'static str {
            "ok"
        }
        fn report(&self) -> Result<Report, ReporterError> {
            let mut r = Report::new();
            r.host.add_node(NodeId::raw("h1"), Node::new());
            Ok(r)
        }
    }

    struct FailingReporter;
    impl Reporter for FailingReporter {
        fn name(&self) -> &'static str {
            "failing"
        }
        fn report(&self) -> Result<Report, ReporterError> {
            Err(ReporterError::CollaboratorUnavailable {
                reporter: "failing",
                reason: "no collaborator".to_string(),
            })
        }
    }

    #[test]
    fn collect_skips_failing_reporters() {
        let reporters: Vec<Box<dyn Reporter>> = vec![Box::new(OkReporter), Box::new(FailingReporter)];
        let report = collect(&reporters);
        assert_eq!(report.host.nodes.len(), 1);
    }

    #[test]
    fn tag_short_circuits_on_failure() {
        struct FailingTagger;
        impl Tagger for FailingTagger {
            fn name(&self) -> &'static str {
                "failing"
            }
            fn tag(&self, _report: Report) -> Result<Report, TaggerError> {
                Err(TaggerError::LookupFailed {
                    tagger: "failing",
                    reason: "boom".to_string(),
                })
            }
        }

        let taggers: Vec<Box<dyn Tagger>> = vec![Box::new(FailingTagger)];
        assert!(tag(Report::new(), &taggers).is_err());
    }
}
