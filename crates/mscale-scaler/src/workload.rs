//! Kind-specific scale field mapping.
//!
//! Most kinds keep their desired instance count in `spec.replicas`, but jobs
//! use `parallelism`, cron jobs nest it under the job template, and an
//! autoscaler is scaled by collapsing its min/max range onto one value. The
//! [`Workload`] enum owns that mapping so the rest of the crate can treat every
//! kind the same way.

use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::ReplicationController;
use kube::api::ObjectMeta;
use kube::{Resource, ResourceExt};
use mscale_core::ResourceKind;
use tracing::debug;

use crate::cluster::ClusterClient;
use crate::{Result, ScaleError};

/// Value the API server assumes when an optional scale field is unset.
pub const DEFAULT_SCALE: i32 = 1;

/// A typed scalable object as returned by the cluster.
#[derive(Debug, Clone, PartialEq)]
pub enum Workload {
    /// An `apps/v1` Deployment.
    Deployment(Deployment),
    /// An `apps/v1` StatefulSet.
    StatefulSet(StatefulSet),
    /// An `apps/v1` ReplicaSet.
    ReplicaSet(ReplicaSet),
    /// A `v1` ReplicationController.
    ReplicationController(ReplicationController),
    /// A `batch/v1` Job.
    Job(Job),
    /// A `batch/v1` CronJob.
    CronJob(CronJob),
    /// An `autoscaling/v1` HorizontalPodAutoscaler.
    HorizontalPodAutoscaler(HorizontalPodAutoscaler),
}

impl Workload {
    /// Create an empty object of `kind` with only name and namespace set.
    #[must_use]
    pub fn new(kind: ResourceKind, namespace: &str, name: &str) -> Self {
        let metadata = ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        };

        match kind {
            ResourceKind::Deployment => Self::Deployment(Deployment {
                metadata,
                ..Default::default()
            }),
            ResourceKind::StatefulSet => Self::StatefulSet(StatefulSet {
                metadata,
                ..Default::default()
            }),
            ResourceKind::ReplicaSet => Self::ReplicaSet(ReplicaSet {
                metadata,
                ..Default::default()
            }),
            ResourceKind::ReplicationController => {
                Self::ReplicationController(ReplicationController {
                    metadata,
                    ..Default::default()
                })
            }
            ResourceKind::Job => Self::Job(Job {
                metadata,
                ..Default::default()
            }),
            ResourceKind::CronJob => Self::CronJob(CronJob {
                metadata,
                ..Default::default()
            }),
            ResourceKind::HorizontalPodAutoscaler => {
                Self::HorizontalPodAutoscaler(HorizontalPodAutoscaler {
                    metadata,
                    ..Default::default()
                })
            }
        }
    }

    /// Same as [`Workload::new`] with the scale value already set.
    #[must_use]
    pub fn with_scale(kind: ResourceKind, namespace: &str, name: &str, scale: i32) -> Self {
        let mut workload = Self::new(kind, namespace, name);
        workload.set_scale(scale);
        workload
    }

    /// The registry kind of this object.
    #[must_use]
    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Deployment(_) => ResourceKind::Deployment,
            Self::StatefulSet(_) => ResourceKind::StatefulSet,
            Self::ReplicaSet(_) => ResourceKind::ReplicaSet,
            Self::ReplicationController(_) => ResourceKind::ReplicationController,
            Self::Job(_) => ResourceKind::Job,
            Self::CronJob(_) => ResourceKind::CronJob,
            Self::HorizontalPodAutoscaler(_) => ResourceKind::HorizontalPodAutoscaler,
        }
    }

    /// The object's name, or its generate-name if unnamed.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            Self::Deployment(o) => o.name_any(),
            Self::StatefulSet(o) => o.name_any(),
            Self::ReplicaSet(o) => o.name_any(),
            Self::ReplicationController(o) => o.name_any(),
            Self::Job(o) => o.name_any(),
            Self::CronJob(o) => o.name_any(),
            Self::HorizontalPodAutoscaler(o) => o.name_any(),
        }
    }

    /// The object's namespace, if set.
    #[must_use]
    pub fn namespace(&self) -> Option<String> {
        match self {
            Self::Deployment(o) => o.namespace(),
            Self::StatefulSet(o) => o.namespace(),
            Self::ReplicaSet(o) => o.namespace(),
            Self::ReplicationController(o) => o.namespace(),
            Self::Job(o) => o.namespace(),
            Self::CronJob(o) => o.namespace(),
            Self::HorizontalPodAutoscaler(o) => o.namespace(),
        }
    }

    /// Version the object was read at, if it came from a cluster.
    #[must_use]
    pub fn resource_version(&self) -> Option<String> {
        self.meta().resource_version.clone()
    }

    /// Stamp the version a subsequent update is conditional on.
    pub fn set_resource_version(&mut self, version: Option<String>) {
        self.meta_mut().resource_version = version;
    }

    fn meta(&self) -> &ObjectMeta {
        match self {
            Self::Deployment(o) => o.meta(),
            Self::StatefulSet(o) => o.meta(),
            Self::ReplicaSet(o) => o.meta(),
            Self::ReplicationController(o) => o.meta(),
            Self::Job(o) => o.meta(),
            Self::CronJob(o) => o.meta(),
            Self::HorizontalPodAutoscaler(o) => o.meta(),
        }
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        match self {
            Self::Deployment(o) => o.meta_mut(),
            Self::StatefulSet(o) => o.meta_mut(),
            Self::ReplicaSet(o) => o.meta_mut(),
            Self::ReplicationController(o) => o.meta_mut(),
            Self::Job(o) => o.meta_mut(),
            Self::CronJob(o) => o.meta_mut(),
            Self::HorizontalPodAutoscaler(o) => o.meta_mut(),
        }
    }

    /// The value a precondition is compared against.
    ///
    /// For autoscalers this is `minReplicas`, not `maxReplicas`.
    #[must_use]
    pub fn scale_value(&self) -> i32 {
        let value = match self {
            Self::Deployment(o) => o.spec.as_ref().and_then(|s| s.replicas),
            Self::StatefulSet(o) => o.spec.as_ref().and_then(|s| s.replicas),
            Self::ReplicaSet(o) => o.spec.as_ref().and_then(|s| s.replicas),
            Self::ReplicationController(o) => o.spec.as_ref().and_then(|s| s.replicas),
            Self::Job(o) => o.spec.as_ref().and_then(|s| s.parallelism),
            Self::CronJob(o) => o
                .spec
                .as_ref()
                .and_then(|s| s.job_template.spec.as_ref())
                .and_then(|s| s.parallelism),
            Self::HorizontalPodAutoscaler(o) => o.spec.as_ref().and_then(|s| s.min_replicas),
        };
        value.unwrap_or(DEFAULT_SCALE)
    }

    /// Write `target` into the kind's scale field(s).
    pub fn set_scale(&mut self, target: i32) {
        match self {
            Self::Deployment(o) => {
                o.spec.get_or_insert_with(Default::default).replicas = Some(target);
            }
            Self::StatefulSet(o) => {
                o.spec.get_or_insert_with(Default::default).replicas = Some(target);
            }
            Self::ReplicaSet(o) => {
                o.spec.get_or_insert_with(Default::default).replicas = Some(target);
            }
            Self::ReplicationController(o) => {
                o.spec.get_or_insert_with(Default::default).replicas = Some(target);
            }
            Self::Job(o) => {
                o.spec.get_or_insert_with(Default::default).parallelism = Some(target);
            }
            Self::CronJob(o) => {
                o.spec
                    .get_or_insert_with(Default::default)
                    .job_template
                    .spec
                    .get_or_insert_with(Default::default)
                    .parallelism = Some(target);
            }
            Self::HorizontalPodAutoscaler(o) => {
                let spec = o.spec.get_or_insert_with(Default::default);
                spec.min_replicas = Some(target);
                spec.max_replicas = target;
            }
        }
    }
}

/// Read a resource so its scale value can be checked and then written.
///
/// Returns `Ok(None)` if the resource does not exist.
///
/// # Errors
///
/// Passes through any error from the cluster client.
pub async fn fetch_workload<C: ClusterClient + ?Sized>(
    client: &C,
    kind: ResourceKind,
    namespace: &str,
    name: &str,
) -> Result<Option<Workload>> {
    client.get(kind, namespace, name).await
}

/// Set the scale value of a previously read resource and write it back.
///
/// The object keeps the resource version it was read at, so a change made
/// since then is rejected by the server instead of being overwritten.
///
/// # Errors
///
/// Returns [`ScaleError::InvalidCount`] if `target` does not fit in the API
/// field, or any error from the cluster client.
pub async fn apply_scale<C: ClusterClient + ?Sized>(
    client: &C,
    namespace: &str,
    mut workload: Workload,
    target: u32,
) -> Result<()> {
    let value = i32::try_from(target).map_err(|_| ScaleError::InvalidCount(target))?;

    workload.set_scale(value);
    client.update(namespace, &workload).await?;

    debug!(kind = %workload.kind(), namespace, name = %workload.name(), target, "Updated scale field");
    Ok(())
}

/// Names of every resource of `kind` in `namespace`, in listing order.
///
/// # Errors
///
/// Passes through any error from the cluster client.
pub async fn list_all<C: ClusterClient + ?Sized>(
    client: &C,
    kind: ResourceKind,
    namespace: &str,
) -> Result<Vec<String>> {
    client.list(kind, namespace).await
}
