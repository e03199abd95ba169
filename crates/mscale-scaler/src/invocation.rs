//! Invocation entry point.

use std::fs::File;
use std::io::BufReader;

use mscale_core::{parse_resource_names, RunSummary};
use tracing::info;

use crate::cluster::ClusterClient;
use crate::fanout::{FanOut, ReportSink};
use crate::manifest::ManifestStream;
use crate::types::{Mode, ScaleConfig};
use crate::{Result, ScaleError};

/// Run one scaling invocation against `client`.
///
/// Per-target failures are part of the returned summary; the caller decides
/// what they mean for the exit status.
///
/// # Errors
///
/// Returns an error only for invocation-level problems: the manifest file
/// cannot be opened, or a resource token is malformed. In both cases no
/// resource has been touched.
pub async fn run<C: ClusterClient + ?Sized>(
    client: &C,
    config: &ScaleConfig,
    sink: &mut dyn ReportSink,
) -> Result<RunSummary> {
    match config.mode() {
        Mode::File(path) => {
            let file = File::open(path).map_err(|source| ScaleError::ManifestOpen {
                path: path.to_path_buf(),
                source,
            })?;
            info!(path = %path.display(), target = config.target, "Scaling resources from manifest");

            let documents = ManifestStream::from_reader(BufReader::new(file));
            Ok(FanOut::new(client, config.target, config.precondition, sink)
                .scale_manifests(documents)
                .await)
        }
        Mode::All => {
            info!(kind = %config.kind, namespaces = ?config.namespaces, target = config.target, "Scaling all resources");
            Ok(FanOut::new(client, config.target, config.precondition, sink)
                .scale_all(config.kind, &config.namespaces)
                .await)
        }
        Mode::Names(tokens) => {
            let names = parse_resource_names(tokens)?;
            info!(kind = %config.kind, ?names, target = config.target, "Scaling named resources");
            Ok(FanOut::new(client, config.target, config.precondition, sink)
                .scale_named(config.kind, &names, &config.namespaces)
                .await)
        }
    }
}
