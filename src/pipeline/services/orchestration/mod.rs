pub mod capability;
pub mod metrics;
pub mod strategy;

pub use capability::call_with_timeout;
pub use metrics::{
    AnalysisHistory, AnalysisKind, AnalysisObserver, AnalysisRecord, HistoryConfig,
    MetricsCollector, MetricsSummary, PerformanceMonitor, PerformanceStats,
};
pub use strategy::{AnalysisStrategy, ChainOutcome, FallbackChain, StrategyAttempt};
