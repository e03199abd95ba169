//! Per-target outcomes and run summaries.

use std::fmt;

use crate::kind::ResourceKind;
use crate::request::ScaleRequest;

/// Result of one read-check-write cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScaleResult {
    /// The new scale value was written.
    Success,
    /// The current value did not match the requested precondition.
    PreconditionMismatch {
        /// Value read from the cluster.
        observed: i32,
        /// Value the caller required.
        expected: u32,
    },
    /// The resource does not exist.
    NotFound,
    /// The cluster client failed to read or write the resource.
    ClientError(String),
}

impl ScaleResult {
    /// Whether the mutation was applied.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// What happened to one [`ScaleRequest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaleOutcome {
    /// The attempted request.
    pub request: ScaleRequest,
    /// How it ended.
    pub result: ScaleResult,
}

impl fmt::Display for ScaleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.request;
        match &self.result {
            ScaleResult::Success => write!(
                f,
                "Successfully scaled {} {} to {} replicas",
                r.kind, r.name, r.target
            ),
            ScaleResult::PreconditionMismatch { observed, expected } => write!(
                f,
                "Error scaling {} {} in namespace {}: current {} {observed} doesn't match expected {expected}",
                r.kind,
                r.name,
                r.namespace,
                r.kind.scale_field()
            ),
            ScaleResult::NotFound => write!(
                f,
                "Error scaling {} {} in namespace {}: {} not found",
                r.kind, r.name, r.namespace, r.kind
            ),
            ScaleResult::ClientError(detail) => write!(
                f,
                "Error scaling {} {} in namespace {}: {detail}",
                r.kind, r.name, r.namespace
            ),
        }
    }
}

/// One reported event of a fan-out run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    /// A target was attempted.
    Scaled(ScaleOutcome),
    /// A manifest document named a kind that cannot be scaled.
    UnsupportedKind {
        /// Kind as written in the manifest.
        kind: String,
        /// Resource name from the manifest.
        name: String,
        /// Resource namespace from the manifest.
        namespace: String,
    },
    /// A namespace had no resources of the requested kind. Not an error.
    NoResources {
        /// Requested kind.
        kind: ResourceKind,
        /// Namespace that was listed.
        namespace: String,
    },
    /// Listing a namespace failed; the run moved on to the next one.
    ListFailed {
        /// Requested kind.
        kind: ResourceKind,
        /// Namespace that could not be listed.
        namespace: String,
        /// Client error text.
        detail: String,
    },
}

impl Report {
    /// Whether this entry counts as a failure.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        match self {
            Self::Scaled(outcome) => !outcome.result.is_success(),
            Self::UnsupportedKind { .. } | Self::ListFailed { .. } => true,
            Self::NoResources { .. } => false,
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scaled(outcome) => fmt::Display::fmt(outcome, f),
            Self::UnsupportedKind {
                kind,
                name,
                namespace,
            } => write!(
                f,
                "Error scaling {kind} {name} in namespace {namespace}: unsupported resource type: {kind}"
            ),
            Self::NoResources { kind, namespace } => {
                write!(f, "No {kind}s found in namespace {namespace}")
            }
            Self::ListFailed {
                kind,
                namespace,
                detail,
            } => write!(f, "Error listing {kind}s in namespace {namespace}: {detail}"),
        }
    }
}

/// Everything reported during one invocation, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Reported entries in processing order.
    pub reports: Vec<Report>,
}

impl RunSummary {
    /// Append an entry.
    pub fn push(&mut self, report: Report) {
        self.reports.push(report);
    }

    /// Outcomes of attempted mutations only.
    pub fn outcomes(&self) -> impl Iterator<Item = &ScaleOutcome> {
        self.reports.iter().filter_map(|report| match report {
            Report::Scaled(outcome) => Some(outcome),
            _ => None,
        })
    }

    /// Number of targets scaled successfully.
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.outcomes().filter(|o| o.result.is_success()).count()
    }

    /// Number of entries that count as failures.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.reports.iter().filter(|r| r.is_failure()).count()
    }

    /// Whether any entry failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.reports.iter().any(Report::is_failure)
    }
}

/// How per-target failures affect the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Report failures but still exit successfully.
    #[default]
    Ignore,
    /// Exit with failure when any target failed.
    FailOnError,
}

impl FailurePolicy {
    /// Whether the run should end with a failing exit status.
    #[must_use]
    pub fn should_fail(self, summary: &RunSummary) -> bool {
        match self {
            Self::Ignore => false,
            Self::FailOnError => summary.has_failures(),
        }
    }
}
