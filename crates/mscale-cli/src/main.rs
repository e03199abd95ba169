//! kubectl-mscale - scale workloads across multiple namespaces.
//!
//! This is the entry point for the `kubectl-mscale` binary, usable directly
//! or as `kubectl mscale` once on the `PATH`.

mod console;

use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Args as ClapArgs, Parser, Subcommand};
use mscale_core::{FailurePolicy, NamespaceSet, ResourceKind};
use mscale_scaler::{run, KubeCluster, KubeconfigSource, ScaleConfig, NO_PRECONDITION};
use tracing::info;

use console::ConsoleReporter;

const EXAMPLES: &str = "\
Examples:
  # Scale a deployment in multiple namespaces
  kubectl mscale deployment nginx --replicas=3 -n default,staging,production

  # Scale all statefulsets in multiple namespaces
  kubectl mscale sts --all --replicas=2 -n ns1,ns2

  # Scale only if the current size matches
  kubectl mscale deploy web --replicas=5 --current-replicas=3 -n prod

  # Scale the resources described in a manifest
  kubectl mscale deployment -f manifests.yaml --replicas=1";

/// Scale Kubernetes resources across multiple namespaces.
#[derive(Parser, Debug)]
#[command(name = "kubectl-mscale")]
#[command(author, version, about, long_about = None, after_help = EXAMPLES)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Path to the kubeconfig file; defaults to `KUBECONFIG`, then `~/.kube/config`.
    #[arg(long, global = true)]
    kubeconfig: Option<PathBuf>,

    /// Kubeconfig context to use instead of the current one.
    #[arg(long, global = true)]
    context: Option<String>,

    /// Exit with a failure status when any target could not be scaled.
    #[arg(long, global = true, default_value = "false")]
    fail_on_error: bool,

    /// Enable debug logging.
    #[arg(long, global = true, default_value = "false")]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scale deployments across multiple namespaces.
    #[command(name = "deployment", visible_aliases = ["deploy", "deployments"])]
    Deployment(ScaleArgs),

    /// Scale statefulsets across multiple namespaces.
    #[command(name = "statefulset", visible_aliases = ["sts", "statefulsets"])]
    StatefulSet(ScaleArgs),

    /// Scale replicasets across multiple namespaces.
    #[command(name = "replicaset", visible_aliases = ["rs", "replicasets"])]
    ReplicaSet(ScaleArgs),

    /// Scale replication controllers across multiple namespaces.
    #[command(
        name = "replicationcontroller",
        visible_aliases = ["rc", "replicationcontrollers"]
    )]
    ReplicationController(ScaleArgs),

    /// Set job parallelism across multiple namespaces.
    #[command(name = "job", visible_aliases = ["jobs"])]
    Job(ScaleArgs),

    /// Set cronjob parallelism across multiple namespaces.
    #[command(name = "cronjob", visible_aliases = ["cj", "cronjobs"])]
    CronJob(ScaleArgs),

    /// Pin autoscaler replica bounds across multiple namespaces.
    #[command(
        name = "horizontalpodautoscaler",
        visible_aliases = ["hpa", "horizontalpodautoscalers"]
    )]
    HorizontalPodAutoscaler(ScaleArgs),
}

impl Command {
    fn kind(&self) -> ResourceKind {
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

    fn args(&self) -> &ScaleArgs {
        match self {
            Self::Deployment(args)
            | Self::StatefulSet(args)
            | Self::ReplicaSet(args)
            | Self::ReplicationController(args)
            | Self::Job(args)
            | Self::CronJob(args)
            | Self::HorizontalPodAutoscaler(args) => args,
        }
    }
}

#[derive(ClapArgs, Debug)]
struct ScaleArgs {
    /// Resource names, optionally prefixed with `kind/`.
    names: Vec<String>,

    /// Number of replicas (parallelism for jobs and cronjobs).
    #[arg(long)]
    replicas: u32,

    /// Comma-separated list of namespaces.
    #[arg(short = 'n', long = "namespace", value_delimiter = ',')]
    namespaces: Vec<String>,

    /// Manifest file whose documents name the resources to scale.
    #[arg(short = 'f', long)]
    filename: Option<PathBuf>,

    /// Precondition for the current size; negative means none.
    #[arg(long, default_value_t = NO_PRECONDITION, allow_negative_numbers = true)]
    current_replicas: i64,

    /// Scale all resources of the kind in the given namespaces.
    #[arg(long, default_value = "false")]
    all: bool,
}

impl Args {
    fn scale_config(&self) -> anyhow::Result<ScaleConfig> {
        let scale = self.command.args();
        let mut config = ScaleConfig::new(self.command.kind(), scale.replicas);
        config.precondition = ScaleConfig::precondition_from_flag(scale.current_replicas)?;
        config.namespaces = NamespaceSet::new(&scale.namespaces);
        config.filename.clone_from(&scale.filename);
        config.names.clone_from(&scale.names);
        config.all = scale.all;
        config.failure_policy = if self.fail_on_error {
            FailurePolicy::FailOnError
        } else {
            FailurePolicy::Ignore
        };
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse arguments
    let args = Args::parse();

    // Initialize logging
    if args.debug {
        tracing_subscriber::fmt()
            .with_env_filter("mscale_cli=debug,mscale_scaler=debug,warn")
            .with_writer(std::io::stderr)
            .init();
    }

    let config = args.scale_config()?;

    // Connect
    let source = KubeconfigSource::new(args.kubeconfig.clone(), args.context.clone());
    let cluster = KubeCluster::connect(&source)
        .await
        .context("error creating Kubernetes client")?;

    let mut console = ConsoleReporter::new(io::stdout());
    let summary = run(&cluster, &config, &mut console).await?;
    info!(
        succeeded = summary.succeeded(),
        failed = summary.failed(),
        "Run finished"
    );

    if config.failure_policy.should_fail(&summary) {
        bail!("{} target(s) could not be scaled", summary.failed());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use mscale_scaler::Mode;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("kubectl-mscale").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn cli_is_well_formed() {
        Args::command().debug_assert();
    }

    #[test]
    fn subcommand_aliases_match_kind_registry() {
        let command = Args::command();
        for kind in ResourceKind::ALL {
            let sub = command
                .find_subcommand(kind.canonical())
                .unwrap_or_else(|| panic!("missing subcommand {kind}"));
            for alias in kind.aliases() {
                assert!(
                    sub.get_all_aliases().any(|a| a == *alias),
                    "{kind} lacks alias {alias}"
                );
            }
        }
    }

    #[test]
    fn names_and_namespaces() {
        let args = parse(&["sts", "db", "cache", "--replicas", "2", "-n", "a,b"]);
        let config = args.scale_config().unwrap();

        assert_eq!(config.kind, ResourceKind::StatefulSet);
        assert_eq!(config.target, 2);
        assert_eq!(config.namespaces, NamespaceSet::parse("a,b"));
        assert_eq!(
            config.mode(),
            Mode::Names(&["db".to_string(), "cache".to_string()])
        );
        assert_eq!(config.precondition, None);
        assert_eq!(config.failure_policy, FailurePolicy::Ignore);
    }

    #[test]
    fn namespace_defaults_to_default() {
        let config = parse(&["deploy", "web", "--replicas=1"]).scale_config().unwrap();
        assert_eq!(config.namespaces, NamespaceSet::default());
    }

    #[test]
    fn replicas_is_required() {
        let err = Args::try_parse_from(["kubectl-mscale", "deployment", "web"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn negative_replicas_rejected() {
        assert!(Args::try_parse_from(["kubectl-mscale", "job", "etl", "--replicas", "-1"]).is_err());
    }

    #[test]
    fn current_replicas_precondition() {
        let config = parse(&["rc", "legacy", "--replicas", "3", "--current-replicas", "2"])
            .scale_config()
            .unwrap();
        assert_eq!(config.precondition, Some(2));

        let config = parse(&["rc", "legacy", "--replicas", "3", "--current-replicas", "-1"])
            .scale_config()
            .unwrap();
        assert_eq!(config.precondition, None);
    }

    #[test]
    fn file_mode_and_global_flags() {
        let args = parse(&[
            "hpa",
            "-f",
            "manifests.yaml",
            "--replicas",
            "4",
            "--fail-on-error",
            "--context",
            "staging",
        ]);
        let config = args.scale_config().unwrap();

        assert_eq!(config.kind, ResourceKind::HorizontalPodAutoscaler);
        assert_eq!(
            config.mode(),
            Mode::File(std::path::Path::new("manifests.yaml"))
        );
        assert_eq!(config.failure_policy, FailurePolicy::FailOnError);
        assert_eq!(args.context.as_deref(), Some("staging"));
    }

    #[test]
    fn all_flag() {
        let config = parse(&["cj", "--all", "--replicas", "0", "-n", "batch"])
            .scale_config()
            .unwrap();
        assert_eq!(config.mode(), Mode::All);
        assert_eq!(config.target, 0);
    }
}
