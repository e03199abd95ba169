//! Scaling orchestration for kubectl-mscale.
//!
//! This crate applies one replica/parallelism change across many Kubernetes
//! workloads. It handles:
//!
//! - Kind-specific scale field mapping (replicas, parallelism, autoscaler bounds)
//! - The read-check-write cycle for a single resource
//! - Fan-out over names × namespaces, over every listed resource, or over a manifest
//! - Kubeconfig resolution and client construction
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     invocation::run                      │
//! │            (file │ all │ names mode selection)           │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                         FanOut                           │
//! │   ┌────────────┐   ┌────────────┐   ┌────────────────┐   │
//! │   │ scale_named│   │ scale_all  │   │ scale_manifests│   │
//! │   └────────────┘   └────────────┘   └────────────────┘   │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │        scale_one  →  Workload field mapping              │
//! └──────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │           ClusterClient (KubeCluster / MockCluster)      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use mscale_core::ResourceKind;
//! use mscale_scaler::{run, KubeCluster, KubeconfigSource, ScaleConfig, Silent};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = KubeconfigSource::new(None, None);
//! let cluster = KubeCluster::connect(&source).await?;
//!
//! let config = ScaleConfig::new(ResourceKind::Deployment, 3);
//! let summary = run(&cluster, &config, &mut Silent).await?;
//! println!("{} scaled, {} failed", summary.succeeded(), summary.failed());
//! # Ok(())
//! # }
//! ```
//!
//! # Testing
//!
//! For testing without a real cluster, enable the `test-utils` feature and
//! use the in-memory cluster:
//!
//! ```ignore
//! use mscale_core::{ResourceKind, ScaleRequest};
//! use mscale_scaler::{scale_one, MockCluster, Workload};
//!
//! # async fn example() {
//! let cluster = MockCluster::new()
//!     .with(Workload::with_scale(ResourceKind::Deployment, "default", "web", 2));
//!
//! let request = ScaleRequest::new(ResourceKind::Deployment, "web", "default", 4);
//! let outcome = scale_one(&cluster, request).await;
//! assert!(outcome.result.is_success());
//! assert_eq!(cluster.update_calls(), 1);
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod cluster;
pub mod error;
pub mod fanout;
pub mod invocation;
pub mod kubeconfig;
pub mod manifest;
pub mod scaler;
pub mod types;
pub mod workload;

pub use cluster::{ClusterClient, KubeCluster};
pub use error::{Result, ScaleError};
pub use fanout::{Attempt, FanOut, ReportSink, Silent};
pub use invocation::run;
pub use kubeconfig::KubeconfigSource;
pub use manifest::{ManifestDocument, ManifestStream};
pub use scaler::scale_one;
pub use types::{Mode, ScaleConfig, NO_PRECONDITION};
pub use workload::{apply_scale, fetch_workload, list_all, Workload};

#[cfg(any(test, feature = "test-utils"))]
pub use cluster::mock::MockCluster;
