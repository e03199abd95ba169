//! Single-resource read-check-write cycle.

use mscale_core::{ScaleOutcome, ScaleRequest, ScaleResult};
use tracing::{info, warn};

use crate::cluster::ClusterClient;
use crate::workload::{apply_scale, fetch_workload};

/// Scale one resource.
///
/// Reads the current value, checks the precondition if one is set, then
/// writes the target back on the object that was read. A change made in
/// between makes the write fail with a conflict. Every failure is captured
/// in the returned outcome and nothing is retried.
pub async fn scale_one<C: ClusterClient + ?Sized>(client: &C, request: ScaleRequest) -> ScaleOutcome {
    let kind = request.kind;
    let namespace = request.namespace.as_str();
    let name = request.name.as_str();

    let result = match fetch_workload(client, kind, namespace, name).await {
        Err(e) => ScaleResult::ClientError(e.to_string()),
        Ok(None) => ScaleResult::NotFound,
        Ok(Some(workload)) => match request.precondition {
            Some(expected) if i64::from(workload.scale_value()) != i64::from(expected) => {
                ScaleResult::PreconditionMismatch {
                    observed: workload.scale_value(),
                    expected,
                }
            }
            _ => match apply_scale(client, namespace, workload, request.target).await {
                Ok(()) => ScaleResult::Success,
                Err(e) => ScaleResult::ClientError(e.to_string()),
            },
        },
    };

    if result.is_success() {
        info!(%kind, namespace, name, target = request.target, "Scaled resource");
    } else {
        warn!(%kind, namespace, name, result = ?result, "Resource not scaled");
    }

    ScaleOutcome { request, result }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::mock::MockCluster;
    use crate::workload::Workload;
    use mscale_core::ResourceKind;

    fn deployment_cluster(replicas: i32) -> MockCluster {
        MockCluster::new().with(Workload::with_scale(
            ResourceKind::Deployment,
            "default",
            "test-deployment",
            replicas,
        ))
    }

    fn request(target: u32, precondition: Option<u32>) -> ScaleRequest {
        ScaleRequest::new(ResourceKind::Deployment, "test-deployment", "default", target)
            .with_precondition(precondition)
    }

    #[tokio::test]
    async fn scales_when_precondition_matches() {
        let cluster = deployment_cluster(3);

        let outcome = scale_one(&cluster, request(5, Some(3))).await;

        assert_eq!(outcome.result, ScaleResult::Success);
        assert_eq!(cluster.get_calls(), 1);
        assert_eq!(cluster.update_calls(), 1);
        assert_eq!(
            cluster.scale_of(ResourceKind::Deployment, "default", "test-deployment"),
            Some(5)
        );
    }

    #[tokio::test]
    async fn mismatch_skips_update() {
        let cluster = deployment_cluster(3);

        let outcome = scale_one(&cluster, request(5, Some(2))).await;

        assert_eq!(
            outcome.result,
            ScaleResult::PreconditionMismatch {
                observed: 3,
                expected: 2
            }
        );
        assert_eq!(cluster.update_calls(), 0);
        assert_eq!(
            cluster.scale_of(ResourceKind::Deployment, "default", "test-deployment"),
            Some(3)
        );
    }

    #[tokio::test]
    async fn missing_resource() {
        let cluster = MockCluster::new();

        let outcome = scale_one(&cluster, request(5, None)).await;

        assert_eq!(outcome.result, ScaleResult::NotFound);
        assert_eq!(cluster.update_calls(), 0);
    }

    #[tokio::test]
    async fn change_after_precondition_check_is_not_overwritten() {
        let cluster = deployment_cluster(2);
        let stale = fetch_workload(&cluster, ResourceKind::Deployment, "default", "test-deployment")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stale.scale_value(), 2);
        cluster.set_scale_externally(ResourceKind::Deployment, "default", "test-deployment", 7);

        let result = apply_scale(&cluster, "default", stale, 4).await;

        assert!(result.is_err());
        assert_eq!(
            cluster.scale_of(ResourceKind::Deployment, "default", "test-deployment"),
            Some(7)
        );
    }

    #[tokio::test]
    async fn update_failure_is_client_error() {
        let cluster = deployment_cluster(1);
        cluster.fail_update("test-deployment");

        let outcome = scale_one(&cluster, request(2, None)).await;

        assert!(matches!(outcome.result, ScaleResult::ClientError(_)));
        assert_eq!(cluster.update_calls(), 1);
    }

    #[tokio::test]
    async fn repeated_scale_is_idempotent() {
        let cluster = deployment_cluster(1);

        let first = scale_one(&cluster, request(4, None)).await;
        let second = scale_one(&cluster, request(4, None)).await;

        assert!(first.result.is_success());
        assert!(second.result.is_success());
        assert_eq!(
            cluster.scale_of(ResourceKind::Deployment, "default", "test-deployment"),
            Some(4)
        );
    }

    #[tokio::test]
    async fn hpa_precondition_reads_min_replicas() {
        let mut hpa = Workload::new(ResourceKind::HorizontalPodAutoscaler, "default", "api");
        if let Workload::HorizontalPodAutoscaler(o) = &mut hpa {
            let spec = o.spec.get_or_insert_with(Default::default);
            spec.min_replicas = Some(2);
            spec.max_replicas = 8;
        }
        let cluster = MockCluster::new().with(hpa);

        let request = ScaleRequest::new(ResourceKind::HorizontalPodAutoscaler, "api", "default", 3)
            .with_precondition(Some(2));
        let outcome = scale_one(&cluster, request).await;
        assert!(outcome.result.is_success());

        let Some(Workload::HorizontalPodAutoscaler(o)) =
            cluster.workload(ResourceKind::HorizontalPodAutoscaler, "default", "api")
        else {
            panic!("autoscaler missing");
        };
        let spec = o.spec.unwrap();
        assert_eq!(spec.min_replicas, Some(3));
        assert_eq!(spec.max_replicas, 3);
    }

    #[tokio::test]
    async fn cronjob_scales_job_template() {
        let cluster = MockCluster::new().with(Workload::with_scale(
            ResourceKind::CronJob,
            "batch",
            "nightly",
            1,
        ));

        let request = ScaleRequest::new(ResourceKind::CronJob, "nightly", "batch", 0)
            .with_precondition(Some(1));
        let outcome = scale_one(&cluster, request).await;

        assert!(outcome.result.is_success());
        assert_eq!(cluster.scale_of(ResourceKind::CronJob, "batch", "nightly"), Some(0));
    }
}
