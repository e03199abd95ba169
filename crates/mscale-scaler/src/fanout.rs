//! Expansion of one scaling request into many targets.
//!
//! Three modes are supported, each processing targets strictly in input
//! order and one at a time:
//!
//! - **names**: every namespace × every name, namespace-major
//! - **all**: every resource a namespace listing returns
//! - **manifests**: every document of a decoded manifest stream
//!
//! A failing target never stops the rest of the batch.

use std::fmt;

use mscale_core::{NamespaceSet, Report, ResourceKind, RunSummary, ScaleRequest};
use tracing::{debug, info, warn};

use crate::cluster::ClusterClient;
use crate::manifest::ManifestDocument;
use crate::scaler::scale_one;
use crate::workload::list_all;

/// A target about to be processed.
///
/// The kind is kept as text so manifest documents with an unsupported kind
/// are announced like any other target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attempt<'a> {
    /// Kind, canonical or as written in the manifest.
    pub kind: &'a str,
    /// Resource name.
    pub name: &'a str,
    /// Namespace.
    pub namespace: &'a str,
    /// Desired scale value.
    pub target: u32,
}

impl<'a> From<&'a ScaleRequest> for Attempt<'a> {
    fn from(request: &'a ScaleRequest) -> Self {
        Self {
            kind: request.kind.canonical(),
            name: &request.name,
            namespace: &request.namespace,
            target: request.target,
        }
    }
}

impl fmt::Display for Attempt<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Scaling {} {} in namespace {} to {} replicas...",
            self.kind, self.name, self.namespace, self.target
        )
    }
}

/// Receives progress while a fan-out runs.
pub trait ReportSink {
    /// Called right before a target is attempted.
    fn attempting(&mut self, _attempt: &Attempt<'_>) {}

    /// Called for every reported entry, in order.
    fn report(&mut self, _report: &Report) {}
}

/// A sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct Silent;

impl ReportSink for Silent {}

/// Drives one fan-out over a shared client.
pub struct FanOut<'a, C: ?Sized> {
    client: &'a C,
    target: u32,
    precondition: Option<u32>,
    sink: &'a mut dyn ReportSink,
    summary: RunSummary,
}

impl<'a, C: ClusterClient + ?Sized> FanOut<'a, C> {
    /// Prepare a fan-out that sets every target to `target`.
    pub fn new(
        client: &'a C,
        target: u32,
        precondition: Option<u32>,
        sink: &'a mut dyn ReportSink,
    ) -> Self {
        Self {
            client,
            target,
            precondition,
            sink,
            summary: RunSummary::default(),
        }
    }

    /// Scale each named resource in each namespace.
    pub async fn scale_named(
        mut self,
        kind: ResourceKind,
        names: &[String],
        namespaces: &NamespaceSet,
    ) -> RunSummary {
        for namespace in namespaces.iter() {
            for name in names {
                self.scale(kind, name, namespace).await;
            }
        }
        self.summary
    }

    /// Scale every resource of `kind` found in each namespace.
    ///
    /// A namespace that cannot be listed is reported and skipped.
    pub async fn scale_all(mut self, kind: ResourceKind, namespaces: &NamespaceSet) -> RunSummary {
        for namespace in namespaces.iter() {
            let names = match list_all(self.client, kind, namespace).await {
                Ok(names) => names,
                Err(e) => {
                    warn!(%kind, namespace, error = %e, "Failed to list resources");
                    self.record(Report::ListFailed {
                        kind,
                        namespace: namespace.to_string(),
                        detail: e.to_string(),
                    });
                    continue;
                }
            };

            if names.is_empty() {
                info!(%kind, namespace, "No resources to scale");
                self.record(Report::NoResources {
                    kind,
                    namespace: namespace.to_string(),
                });
                continue;
            }

            debug!(%kind, namespace, count = names.len(), "Listed resources");
            for name in &names {
                self.scale(kind, name, namespace).await;
            }
        }
        self.summary
    }

    /// Scale the resource each manifest document describes.
    ///
    /// Documents without a kind are skipped; documents with an unknown kind
    /// are reported as unsupported.
    pub async fn scale_manifests<I>(mut self, documents: I) -> RunSummary
    where
        I: IntoIterator<Item = ManifestDocument>,
    {
        for document in documents {
            if document.kind.is_empty() {
                debug!(name = %document.name, "Skipping manifest document without kind");
                continue;
            }

            match ResourceKind::resolve(&document.kind) {
                Ok(kind) => self.scale(kind, &document.name, &document.namespace).await,
                Err(e) => {
                    warn!(kind = %document.kind, name = %document.name, error = %e, "Skipping manifest document");
                    self.sink.attempting(&Attempt {
                        kind: &document.kind,
                        name: &document.name,
                        namespace: &document.namespace,
                        target: self.target,
                    });
                    self.record(Report::UnsupportedKind {
                        kind: document.kind,
                        name: document.name,
                        namespace: document.namespace,
                    });
                }
            }
        }
        self.summary
    }

    async fn scale(&mut self, kind: ResourceKind, name: &str, namespace: &str) {
        let request =
            ScaleRequest::new(kind, name, namespace, self.target).with_precondition(self.precondition);

        self.sink.attempting(&Attempt::from(&request));
        let outcome = scale_one(self.client, request).await;
        self.record(Report::Scaled(outcome));
    }

    fn record(&mut self, report: Report) {
        self.sink.report(&report);
        self.summary.push(report);
    }
}
