use crate::error::{AnalysisError, Result};
use std::time::Duration;
use tower::{Service, ServiceBuilder, ServiceExt};
use tracing::warn;

/// Calls `service` once with a time budget. Elapsed budgets surface as
/// `AnalysisError::Timeout`; errors raised by the service are passed through.
pub async fn call_with_timeout<S, Req>(
    service: S,
    request: Req,
    operation: &str,
    budget: Duration,
) -> Result<S::Response>
where
    S: Service<Req, Error = AnalysisError>,
{
    let result = ServiceBuilder::new()
        .timeout(budget)
        .service(service)
        .oneshot(request)
        .await;

    result.map_err(|e| {
        let error = AnalysisError::from_boxed(e, operation, budget);
        if matches!(error, AnalysisError::Timeout { .. }) {
            warn!("{} exceeded its {}ms budget", operation, budget.as_millis());
        }
        error
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    struct SlowEcho {
        delay: Duration,
    }

    impl Service<u32> for SlowEcho {
        type Response = u32;
        type Error = AnalysisError;
        type Future = Pin<Box<dyn Future<Output = Result<u32>> + Send>>;

        fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<()>> {
            Poll::Ready(Ok(()))
        }

        fn call(&mut self, req: u32) -> Self::Future {
            let delay = self.delay;
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                if req == 0 {
                    Err(AnalysisError::CapabilityUnavailable("zero".into()))
                } else {
                    Ok(req * 2)
                }
            })
        }
    }

    #[tokio::test]
    async fn test_completes_within_budget() {
        let service = SlowEcho {
            delay: Duration::from_millis(1),
        };
        let value = call_with_timeout(service, 21, "echo", Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn test_timeout_is_reported() {
        let service = SlowEcho {
            delay: Duration::from_millis(200),
        };
        let err = call_with_timeout(service, 1, "echo", Duration::from_millis(10))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Timeout { .. }));
    }

    #[tokio::test]
    async fn test_service_errors_pass_through() {
        let service = SlowEcho {
            delay: Duration::from_millis(1),
        };
        let err = call_with_timeout(service, 0, "echo", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, AnalysisError::CapabilityUnavailable(_)));
    }
}
