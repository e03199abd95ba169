//! Cluster client abstraction.
//!
//! This module provides the [`ClusterClient`] trait used by the scaler and its
//! Kubernetes-backed implementation, [`KubeCluster`].

use std::fmt::Debug;

use async_trait::async_trait;
use k8s_openapi::api::apps::v1::{Deployment, ReplicaSet, StatefulSet};
use k8s_openapi::api::autoscaling::v1::HorizontalPodAutoscaler;
use k8s_openapi::api::batch::v1::{CronJob, Job};
use k8s_openapi::api::core::v1::ReplicationController;
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, ListParams, ObjectList, PostParams};
use kube::config::KubeConfigOptions;
use kube::{Client, Config, Resource, ResourceExt};
use mscale_core::ResourceKind;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use crate::kubeconfig::KubeconfigSource;
use crate::workload::Workload;
use crate::Result;

/// Typed read/list/update access to scalable workloads.
///
/// Calls are issued one at a time by the scaler; implementations hold only
/// connection state.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// Fetch a resource, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails for any reason other than 404.
    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Workload>>;

    /// Write a modified resource back.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected.
    async fn update(&self, namespace: &str, workload: &Workload) -> Result<()>;

    /// List the names of all resources of `kind` in `namespace`.
    ///
    /// # Errors
    ///
    /// Returns an error if listing fails.
    async fn list(&self, kind: ResourceKind, namespace: &str) -> Result<Vec<String>>;
}

/// [`ClusterClient`] backed by the Kubernetes API.
#[derive(Clone)]
pub struct KubeCluster {
    client: Client,
}

impl KubeCluster {
    /// Connect using a resolved kubeconfig.
    ///
    /// # Errors
    ///
    /// Returns an error if the kubeconfig cannot be loaded or the client
    /// cannot be built from it.
    pub async fn connect(source: &KubeconfigSource) -> Result<Self> {
        let kubeconfig = source.load()?;
        let options = KubeConfigOptions {
            context: source.context.clone(),
            ..Default::default()
        };
        let config = Config::from_custom_kubeconfig(kubeconfig, &options).await?;

        info!(cluster_url = %config.cluster_url, "Connecting to Kubernetes cluster");

        let client = Client::try_from(config)?;
        Ok(Self::with_client(client))
    }

    /// Wrap an already configured client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    fn api<K>(&self, namespace: &str) -> Api<K>
    where
        K: Resource<Scope = NamespaceResourceScope>,
        <K as Resource>::DynamicType: Default,
    {
        Api::namespaced(self.client.clone(), namespace)
    }

    async fn get_typed<K>(&self, namespace: &str, name: &str) -> Result<Option<K>>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        Ok(self.api::<K>(namespace).get_opt(name).await?)
    }

    async fn replace_typed<K>(&self, namespace: &str, object: &K) -> Result<()>
    where
        K: Resource<Scope = NamespaceResourceScope>
            + Clone
            + DeserializeOwned
            + Serialize
            + Debug,
        <K as Resource>::DynamicType: Default,
    {
        let name = object.name_any();
        self.api::<K>(namespace)
            .replace(&name, &PostParams::default(), object)
            .await?;
        Ok(())
    }

    async fn list_typed<K>(&self, namespace: &str) -> Result<Vec<String>>
    where
        K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
        <K as Resource>::DynamicType: Default,
    {
        let list: ObjectList<K> = self.api::<K>(namespace).list(&ListParams::default()).await?;
        Ok(list.items.iter().map(ResourceExt::name_any).collect())
    }
}

#[async_trait]
impl ClusterClient for KubeCluster {
    async fn get(
        &self,
        kind: ResourceKind,
        namespace: &str,
        name: &str,
    ) -> Result<Option<Workload>> {
        debug!(%kind, namespace, name, "Fetching resource");

        let workload = match kind {
            ResourceKind::Deployment => self
                .get_typed::<Deployment>(namespace, name)
                .await?
                .map(Workload::Deployment),
            ResourceKind::StatefulSet => self
                .get_typed::<StatefulSet>(namespace, name)
                .await?
                .map(Workload::StatefulSet),
            ResourceKind::ReplicaSet => self
                .get_typed::<ReplicaSet>(namespace, name)
                .await?
                .map(Workload::ReplicaSet),
            ResourceKind::ReplicationController => self
                .get_typed::<ReplicationController>(namespace, name)
                .await?
                .map(Workload::ReplicationController),
            ResourceKind::Job => self
                .get_typed::<Job>(namespace, name)
                .await?
                .map(Workload::Job),
            ResourceKind::CronJob => self
                .get_typed::<CronJob>(namespace, name)
                .await?
                .map(Workload::CronJob),
            ResourceKind::HorizontalPodAutoscaler => self
                .get_typed::<HorizontalPodAutoscaler>(namespace, name)
                .await?
                .map(Workload::HorizontalPodAutoscaler),
        };

        Ok(workload)
    }

    async fn update(&self, namespace: &str, workload: &Workload) -> Result<()> {
        match workload {
            Workload::Deployment(o) => self.replace_typed(namespace, o).await,
            Workload::StatefulSet(o) => self.replace_typed(namespace, o).await,
            Workload::ReplicaSet(o) => self.replace_typed(namespace, o).await,
            Workload::ReplicationController(o) => self.replace_typed(namespace, o).await,
            Workload::Job(o) => self.replace_typed(namespace, o).await,
            Workload::CronJob(o) => self.replace_typed(namespace, o).await,
            Workload::HorizontalPodAutoscaler(o) => self.replace_typed(namespace, o).await,
        }
    }

    async fn list(&self, kind: ResourceKind, namespace: &str) -> Result<Vec<String>> {
        debug!(%kind, namespace, "Listing resources");

        match kind {
            ResourceKind::Deployment => self.list_typed::<Deployment>(namespace).await,
            ResourceKind::StatefulSet => self.list_typed::<StatefulSet>(namespace).await,
            ResourceKind::ReplicaSet => self.list_typed::<ReplicaSet>(namespace).await,
            ResourceKind::ReplicationController => {
                self.list_typed::<ReplicationController>(namespace).await
            }
            ResourceKind::Job => self.list_typed::<Job>(namespace).await,
            ResourceKind::CronJob => self.list_typed::<CronJob>(namespace).await,
            ResourceKind::HorizontalPodAutoscaler => {
                self.list_typed::<HorizontalPodAutoscaler>(namespace).await
            }
        }
    }
}

/// An in-memory cluster for testing without a real Kubernetes API.
#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    use super::*;
    use crate::ScaleError;
    use parking_lot::Mutex;
    use std::collections::HashSet;

    /// A mock cluster that stores workloads in memory and counts calls.
    #[derive(Default)]
    pub struct MockCluster {
        state: Mutex<MockState>,
    }

    #[derive(Default)]
    struct MockState {
        // (namespace, object) in insertion order, which is also listing order.
        workloads: Vec<(String, Workload)>,
        get_calls: usize,
        update_calls: usize,
        listed: Vec<String>,
        failing_lists: HashSet<(ResourceKind, String)>,
        failing_updates: HashSet<String>,
        revision: u64,
    }

    impl MockState {
        fn next_revision(&mut self) -> Option<String> {
            self.revision += 1;
            Some(self.revision.to_string())
        }

        fn position(&self, kind: ResourceKind, namespace: &str, name: &str) -> Option<usize> {
            self.workloads
                .iter()
                .position(|(ns, w)| ns == namespace && w.kind() == kind && w.name() == name)
        }
    }

    impl MockCluster {
        /// Create an empty mock cluster.
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        /// Add a workload, using its metadata namespace (or `default`).
        #[must_use]
        pub fn with(self, workload: Workload) -> Self {
            self.insert(workload);
            self
        }

        /// Add a workload, using its metadata namespace (or `default`).
        pub fn insert(&self, mut workload: Workload) {
            let namespace = workload
                .namespace()
                .unwrap_or_else(|| mscale_core::DEFAULT_NAMESPACE.to_string());
            let mut state = self.state.lock();
            workload.set_resource_version(state.next_revision());
            state.workloads.push((namespace, workload));
        }

        /// Change a stored resource behind the client's back, as another
        /// writer would.
        pub fn set_scale_externally(
            &self,
            kind: ResourceKind,
            namespace: &str,
            name: &str,
            scale: i32,
        ) {
            let mut state = self.state.lock();
            let version = state.next_revision();
            if let Some(index) = state.position(kind, namespace, name) {
                let workload = &mut state.workloads[index].1;
                workload.set_scale(scale);
                workload.set_resource_version(version);
            }
        }

        /// Make every list of `kind` in `namespace` fail.
        pub fn fail_list(&self, kind: ResourceKind, namespace: &str) {
            self.state
                .lock()
                .failing_lists
                .insert((kind, namespace.to_string()));
        }

        /// Make every update of a resource called `name` fail.
        pub fn fail_update(&self, name: &str) {
            self.state.lock().failing_updates.insert(name.to_string());
        }

        /// Current scale value of a stored resource.
        #[must_use]
        pub fn scale_of(&self, kind: ResourceKind, namespace: &str, name: &str) -> Option<i32> {
            self.workload(kind, namespace, name).map(|w| w.scale_value())
        }

        /// A copy of a stored resource.
        #[must_use]
        pub fn workload(&self, kind: ResourceKind, namespace: &str, name: &str) -> Option<Workload> {
            let state = self.state.lock();
            state
                .position(kind, namespace, name)
                .map(|i| state.workloads[i].1.clone())
        }

        /// Number of `get` calls made so far.
        #[must_use]
        pub fn get_calls(&self) -> usize {
            self.state.lock().get_calls
        }

        /// Number of `update` calls made so far.
        #[must_use]
        pub fn update_calls(&self) -> usize {
            self.state.lock().update_calls
        }

        /// Namespaces passed to `list`, in call order.
        #[must_use]
        pub fn listed_namespaces(&self) -> Vec<String> {
            self.state.lock().listed.clone()
        }
    }

    #[async_trait]
    impl ClusterClient for MockCluster {
        async fn get(
            &self,
            kind: ResourceKind,
            namespace: &str,
            name: &str,
        ) -> Result<Option<Workload>> {
            let mut state = self.state.lock();
            state.get_calls += 1;
            Ok(state
                .position(kind, namespace, name)
                .map(|i| state.workloads[i].1.clone()))
        }

        async fn update(&self, namespace: &str, workload: &Workload) -> Result<()> {
            let mut state = self.state.lock();
            state.update_calls += 1;

            let name = workload.name();
            if state.failing_updates.contains(&name) {
                return Err(ScaleError::Cluster(format!(
                    "update of {name} rejected"
                )));
            }

            let index = state
                .position(workload.kind(), namespace, &name)
                .ok_or_else(|| ScaleError::Cluster(format!("{name} not found")))?;

            let stored = state.workloads[index].1.resource_version();
            if let Some(submitted) = workload.resource_version() {
                if stored.as_deref() != Some(submitted.as_str()) {
                    return Err(ScaleError::Cluster(format!(
                        "conflict: {name} has been modified"
                    )));
                }
            }

            let mut updated = workload.clone();
            updated.set_resource_version(state.next_revision());
            state.workloads[index].1 = updated;
            Ok(())
        }

        async fn list(&self, kind: ResourceKind, namespace: &str) -> Result<Vec<String>> {
            let mut state = self.state.lock();
            state.listed.push(namespace.to_string());

            if state.failing_lists.contains(&(kind, namespace.to_string())) {
                return Err(ScaleError::Cluster(format!(
                    "listing {kind}s in {namespace} is forbidden"
                )));
            }

            Ok(state
                .workloads
                .iter()
                .filter(|(ns, w)| ns == namespace && w.kind() == kind)
                .map(|(_, w)| w.name())
                .collect())
        }
    }
}
