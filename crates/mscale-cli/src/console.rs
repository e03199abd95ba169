//! Plain-text progress output.

use std::io::Write;

use mscale_core::Report;
use mscale_scaler::{Attempt, ReportSink};
use tracing::warn;

/// Writes one line per attempt and one line per report.
pub struct ConsoleReporter<W> {
    out: W,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, args: std::fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{args}") {
            warn!(error = %e, "Failed to write progress line");
        }
    }
}

impl<W: Write> ReportSink for ConsoleReporter<W> {
    fn attempting(&mut self, attempt: &Attempt<'_>) {
        self.line(format_args!("{attempt}"));
    }

    fn report(&mut self, report: &Report) {
        self.line(format_args!("{report}"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mscale_core::{NamespaceSet, ResourceKind};
    use mscale_scaler::{run, MockCluster, ScaleConfig, Workload};

    fn output(reporter: ConsoleReporter<Vec<u8>>) -> Vec<String> {
        String::from_utf8(reporter.into_inner())
            .unwrap()
            .lines()
            .map(ToString::to_string)
            .collect()
    }

    #[tokio::test]
    async fn prints_attempt_then_result() {
        let cluster = MockCluster::new().with(Workload::with_scale(
            ResourceKind::Deployment,
            "staging",
            "web",
            1,
        ));
        let mut config = ScaleConfig::new(ResourceKind::Deployment, 3);
        config.names = vec!["web".to_string()];
        config.namespaces = NamespaceSet::parse("staging");
        let mut reporter = ConsoleReporter::new(Vec::new());

        run(&cluster, &config, &mut reporter).await.unwrap();

        let lines = output(reporter);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Scaling "));
        assert!(lines[0].contains("web in namespace staging to 3 replicas"));
        assert!(lines[1].starts_with("Successfully scaled"));
    }

    #[tokio::test]
    async fn empty_namespace_prints_single_notice() {
        let cluster = MockCluster::new();
        let config = ScaleConfig::new(ResourceKind::StatefulSet, 2);
        let mut reporter = ConsoleReporter::new(Vec::new());

        run(&cluster, &config, &mut reporter).await.unwrap();

        let lines = output(reporter);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("No "));
        assert!(lines[0].ends_with("found in namespace default"));
    }
}
