use crate::error::Result;
use async_trait::async_trait;
use tracing::{debug, warn};

/// One way of producing `O` from `I`. Strategies are tried in order by a
/// [`FallbackChain`]; an `Err` hands over to the next one.
#[async_trait]
pub trait AnalysisStrategy<I: Sync, O: Send>: Send + Sync {
    fn name(&self) -> &'static str;
    async fn attempt(&self, input: &I) -> Result<O>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct StrategyAttempt {
    pub strategy: &'static str,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChainOutcome<O> {
    pub output: O,
    /// `None` when every strategy failed and the default was used.
    pub strategy: Option<&'static str>,
    pub attempts: Vec<StrategyAttempt>,
}

impl<O> ChainOutcome<O> {
    pub fn used_default(&self) -> bool {
        self.strategy.is_none()
    }
}

pub struct FallbackChain<I: Sync, O: Send> {
    strategies: Vec<Box<dyn AnalysisStrategy<I, O>>>,
}

impl<I: Sync, O: Send> FallbackChain<I, O> {
    pub fn new() -> Self {
        Self {
            strategies: Vec::new(),
        }
    }

    pub fn then(mut self, strategy: Box<dyn AnalysisStrategy<I, O>>) -> Self {
        self.strategies.push(strategy);
        self
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    /// Returns the first successful strategy's output, or `default()` once
    /// the chain is exhausted.
    pub async fn run_or_else<F>(&self, input: &I, default: F) -> ChainOutcome<O>
    where
        F: FnOnce() -> O,
    {
        let mut attempts = Vec::with_capacity(self.strategies.len());

        for strategy in &self.strategies {
            match strategy.attempt(input).await {
                Ok(output) => {
                    debug!("Strategy '{}' succeeded", strategy.name());
                    attempts.push(StrategyAttempt {
                        strategy: strategy.name(),
                        error: None,
                    });
                    return ChainOutcome {
                        output,
                        strategy: Some(strategy.name()),
                        attempts,
                    };
                }
                Err(e) => {
                    debug!("Strategy '{}' failed: {}", strategy.name(), e);
                    attempts.push(StrategyAttempt {
                        strategy: strategy.name(),
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        warn!(
            "All {} strategies failed, using default result",
            self.strategies.len()
        );
        ChainOutcome {
            output: default(),
            strategy: None,
            attempts,
        }
    }
}

impl<I: Sync, O: Send> Default for FallbackChain<I, O> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    struct Fixed(&'static str, Option<u32>);

    #[async_trait]
    impl AnalysisStrategy<u32, u32> for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }

        async fn attempt(&self, input: &u32) -> Result<u32> {
            self.1
                .map(|v| v + input)
                .ok_or_else(|| AnalysisError::CapabilityUnavailable(self.0.to_string()))
        }
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let chain = FallbackChain::new()
            .then(Box::new(Fixed("vision", None)))
            .then(Box::new(Fixed("heuristic", Some(10))))
            .then(Box::new(Fixed("never", Some(99))));

        let outcome = chain.run_or_else(&1, || 0).await;
        assert_eq!(outcome.output, 11);
        assert_eq!(outcome.strategy, Some("heuristic"));
        assert_eq!(outcome.attempts.len(), 2);
        assert!(outcome.attempts[0].error.is_some());
    }

    #[tokio::test]
    async fn test_default_when_exhausted() {
        let chain = FallbackChain::new()
            .then(Box::new(Fixed("a", None)))
            .then(Box::new(Fixed("b", None)));

        let outcome = chain.run_or_else(&1, || 7).await;
        assert_eq!(outcome.output, 7);
        assert!(outcome.used_default());
        assert_eq!(chain.names(), vec!["a", "b"]);
    }
}
