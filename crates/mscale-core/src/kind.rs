//! Registry of scalable resource kinds.
//!
//! Every kind has a canonical identifier and a set of aliases. Lookup is
//! case-insensitive so that both CLI tokens (`sts`) and manifest kinds
//! (`StatefulSet`) resolve to the same variant.

use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// A workload kind whose desired instance count can be changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    /// `apps/v1` Deployment, scaled through `spec.replicas`.
    Deployment,
    /// `apps/v1` StatefulSet, scaled through `spec.replicas`.
    StatefulSet,
    /// `apps/v1` ReplicaSet, scaled through `spec.replicas`.
    ReplicaSet,
    /// `v1` ReplicationController, scaled through `spec.replicas`.
    ReplicationController,
    /// `batch/v1` Job, scaled through `spec.parallelism`.
    Job,
    /// `batch/v1` CronJob, scaled through `spec.jobTemplate.spec.parallelism`.
    CronJob,
    /// `autoscaling/v1` HorizontalPodAutoscaler.
    ///
    /// The current value is `spec.minReplicas`; scaling pins both
    /// `minReplicas` and `maxReplicas` to the target.
    HorizontalPodAutoscaler,
}

impl ResourceKind {
    /// Every supported kind, in registry order.
    pub const ALL: [Self; 7] = [
        Self::Deployment,
        Self::StatefulSet,
        Self::ReplicaSet,
        Self::ReplicationController,
        Self::Job,
        Self::CronJob,
        Self::HorizontalPodAutoscaler,
    ];

    /// Resolve a resource type identifier or alias, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::UnsupportedKind`] if the identifier matches no kind.
    pub fn resolve(identifier: &str) -> Result<Self> {
        let needle = identifier.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.canonical() == needle || kind.aliases().contains(&needle.as_str()))
            .ok_or_else(|| CoreError::UnsupportedKind(identifier.to_string()))
    }

    /// The canonical lowercase identifier.
    #[must_use]
    pub const fn canonical(self) -> &'static str {
        match self {
            Self::Deployment => "deployment",
            Self::StatefulSet => "statefulset",
            Self::ReplicaSet => "replicaset",
            Self::ReplicationController => "replicationcontroller",
            Self::Job => "job",
            Self::CronJob => "cronjob",
            Self::HorizontalPodAutoscaler => "horizontalpodautoscaler",
        }
    }

    /// Accepted aliases besides the canonical identifier.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::Deployment => &["deploy", "deployments"],
            Self::StatefulSet => &["sts", "statefulsets"],
            Self::ReplicaSet => &["rs", "replicasets"],
            Self::ReplicationController => &["rc", "replicationcontrollers"],
            Self::Job => &["jobs"],
            Self::CronJob => &["cj", "cronjobs"],
            Self::HorizontalPodAutoscaler => &["hpa", "horizontalpodautoscalers"],
        }
    }

    /// Name of the field holding the comparable scale value.
    #[must_use]
    pub const fn scale_field(self) -> &'static str {
        match self {
            Self::Deployment
            | Self::StatefulSet
            | Self::ReplicaSet
            | Self::ReplicationController => "replicas",
            Self::Job | Self::CronJob => "parallelism",
            Self::HorizontalPodAutoscaler => "min replicas",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.canonical())
    }
}

impl FromStr for ResourceKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::resolve(s)
    }
}
