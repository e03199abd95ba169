//! Kubeconfig resolution.
//!
//! An explicit path wins. Otherwise discovery is left to
//! [`Kubeconfig::read`], which merges every file listed in `KUBECONFIG` and
//! falls back to `$HOME/.kube/config`.

use std::path::PathBuf;

use kube::config::Kubeconfig;
use tracing::debug;

use crate::Result;

/// Where to read cluster credentials from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KubeconfigSource {
    /// File given on the command line, if any.
    pub path: Option<PathBuf>,
    /// Context to use instead of the file's current context.
    pub context: Option<String>,
}

impl KubeconfigSource {
    /// Use `path` if given, otherwise the standard discovery rules.
    #[must_use]
    pub fn new(path: Option<PathBuf>, context: Option<String>) -> Self {
        Self { path, context }
    }

    /// Read the kubeconfig.
    ///
    /// # Errors
    ///
    /// Returns an error if no kubeconfig can be found, read or parsed.
    pub fn load(&self) -> Result<Kubeconfig> {
        let kubeconfig = match &self.path {
            Some(path) => {
                debug!(path = %path.display(), "Reading kubeconfig");
                Kubeconfig::read_from(path)?
            }
            None => {
                debug!("Discovering kubeconfig from environment");
                Kubeconfig::read()?
            }
        };
        Ok(kubeconfig)
    }
}
