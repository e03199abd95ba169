//! Error types for the scaler crate.

use std::path::PathBuf;

use kube::config::KubeconfigError;
use thiserror::Error;

/// Errors that can occur while talking to the cluster or setting up a run.
#[derive(Error, Debug)]
pub enum ScaleError {
    /// Kubernetes API error.
    #[error("Kubernetes API error: {0}")]
    KubeApi(#[from] kube::Error),

    /// Kubeconfig could not be read or applied.
    #[error("error building kubeconfig: {0}")]
    Kubeconfig(#[from] KubeconfigError),

    /// Request validation failed before reaching the cluster.
    #[error(transparent)]
    Core(#[from] mscale_core::CoreError),

    /// The manifest file could not be opened.
    #[error("error opening file {}: {source}", path.display())]
    ManifestOpen {
        /// Path given on the command line.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A scale value does not fit the API's 32-bit field.
    #[error("scale value {0} is out of range")]
    InvalidCount(u32),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The cluster rejected or failed a request.
    #[error("cluster request failed: {0}")]
    Cluster(String),
}

/// A specialized Result type for scaler operations.
pub type Result<T> = std::result::Result<T, ScaleError>;
