use chrono::{DateTime, Duration as ChronoDuration, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    Facial,
    Clothing,
    Harmony,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub kind: AnalysisKind,
    pub timestamp: DateTime<Utc>,
    pub duration_us: u64,
    pub confidence: f32,
    pub method: String,
    pub used_fallback: bool,
}

impl AnalysisRecord {
    pub fn new(
        kind: AnalysisKind,
        confidence: f32,
        method: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            timestamp: Utc::now(),
            duration_us: duration.as_micros() as u64,
            confidence,
            method: method.into(),
            used_fallback: false,
        }
    }

    pub fn with_fallback(mut self, used_fallback: bool) -> Self {
        self.used_fallback = used_fallback;
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Observer pattern for analysis metrics
pub trait AnalysisObserver: Send + Sync {
    fn on_analysis(&mut self, record: &AnalysisRecord);
}

/// Fans records out to every registered observer
pub struct MetricsCollector {
    observers: Vec<Box<dyn AnalysisObserver>>,
}

impl MetricsCollector {
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn add_observer(mut self, observer: Box<dyn AnalysisObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn notify(&mut self, record: &AnalysisRecord) {
        for observer in &mut self.observers {
            observer.on_analysis(record);
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    pub capacity: usize,
    pub max_age_secs: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            max_age_secs: 3600,
        }
    }
}

impl HistoryConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.capacity == 0 {
            return Err("History capacity must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSummary {
    pub total: usize,
    pub per_kind: IndexMap<AnalysisKind, usize>,
    pub average_confidence: f32,
    pub average_duration_us: f32,
    pub fallback_rate: f32,
}

/// Bounded, age-pruned record of recent analyses. Clones share the buffer.
#[derive(Clone)]
pub struct AnalysisHistory {
    entries: Arc<Mutex<VecDeque<AnalysisRecord>>>,
    config: HistoryConfig,
}

impl AnalysisHistory {
    pub fn new(config: HistoryConfig) -> Self {
        Self {
            entries: Arc::new(Mutex::new(VecDeque::with_capacity(config.capacity.min(1000)))),
            config,
        }
    }

    pub fn record(&self, record: AnalysisRecord) {
        let mut entries = lock(&self.entries);
        entries.push_back(record);
        while entries.len() > self.config.capacity {
            entries.pop_front();
        }
    }

    /// Drops records older than the configured age. Scheduling is up to the
    /// host. Returns how many were removed.
    pub fn prune(&self, now: DateTime<Utc>) -> usize {
        let max_age = ChronoDuration::seconds(self.config.max_age_secs as i64);
        let mut entries = lock(&self.entries);
        let before = entries.len();
        entries.retain(|r| now.signed_duration_since(r.timestamp) <= max_age);
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn recent(&self, n: usize) -> Vec<AnalysisRecord> {
        let entries = lock(&self.entries);
        entries.iter().rev().take(n).cloned().collect()
    }

    pub fn summary(&self) -> MetricsSummary {
        let entries = lock(&self.entries);
        let total = entries.len();
        let mut per_kind = IndexMap::new();
        for kind in [
            AnalysisKind::Facial,
            AnalysisKind::Clothing,
            AnalysisKind::Harmony,
        ] {
            per_kind.insert(kind, entries.iter().filter(|r| r.kind == kind).count());
        }

        if total == 0 {
            return MetricsSummary {
                total,
                per_kind,
                average_confidence: 0.0,
                average_duration_us: 0.0,
                fallback_rate: 0.0,
            };
        }

        let n = total as f32;
        MetricsSummary {
            total,
            per_kind,
            average_confidence: entries.iter().map(|r| r.confidence).sum::<f32>() / n,
            average_duration_us: entries.iter().map(|r| r.duration_us as f32).sum::<f32>() / n,
            fallback_rate: entries.iter().filter(|r| r.used_fallback).count() as f32 / n,
        }
    }
}

impl AnalysisObserver for AnalysisHistory {
    fn on_analysis(&mut self, record: &AnalysisRecord) {
        self.record(record.clone());
    }
}

/// EWMA timing per analysis kind
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PerformanceStats {
    pub total_analyses: usize,
    pub avg_facial_us: f32,
    pub avg_clothing_us: f32,
    pub avg_harmony_us: f32,
    pub max_facial_us: u64,
    pub max_clothing_us: u64,
    pub max_harmony_us: u64,
}

pub struct PerformanceMonitor {
    stats: Arc<Mutex<PerformanceStats>>,
}

impl PerformanceMonitor {
    pub fn new() -> Self {
        Self {
            stats: Arc::new(Mutex::new(PerformanceStats::default())),
        }
    }

    pub fn get_stats(&self) -> PerformanceStats {
        lock(&self.stats).clone()
    }

    pub fn get_stats_shared(&self) -> Arc<Mutex<PerformanceStats>> {
        Arc::clone(&self.stats)
    }

    fn update_ewma(current: f32, new_value: u64, alpha: f32) -> f32 {
        if current == 0.0 {
            return new_value as f32;
        }
        current * (1.0 - alpha) + new_value as f32 * alpha
    }
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisObserver for PerformanceMonitor {
    fn on_analysis(&mut self, record: &AnalysisRecord) {
        const ALPHA: f32 = 0.1;
        let mut stats = lock(&self.stats);
        stats.total_analyses += 1;
        let d = record.duration_us;

        match record.kind {
            AnalysisKind::Facial => {
                stats.avg_facial_us = Self::update_ewma(stats.avg_facial_us, d, ALPHA);
                stats.max_facial_us = stats.max_facial_us.max(d);
            }
            AnalysisKind::Clothing => {
                stats.avg_clothing_us = Self::update_ewma(stats.avg_clothing_us, d, ALPHA);
                stats.max_clothing_us = stats.max_clothing_us.max(d);
            }
            AnalysisKind::Harmony => {
                stats.avg_harmony_us = Self::update_ewma(stats.avg_harmony_us, d, ALPHA);
                stats.max_harmony_us = stats.max_harmony_us.max(d);
            }
        }
        tracing::debug!(
            "PerformanceMonitor: {:?} took {}us (total analyses {})",
            record.kind,
            d,
            stats.total_analyses
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(kind: AnalysisKind, confidence: f32) -> AnalysisRecord {
        AnalysisRecord::new(kind, confidence, "test", Duration::from_micros(100))
    }

    #[test]
    fn test_history_is_bounded() {
        let history = AnalysisHistory::new(HistoryConfig {
            capacity: 3,
            max_age_secs: 60,
        });
        for i in 0..5 {
            history.record(record(AnalysisKind::Harmony, i as f32 / 10.0));
        }
        assert_eq!(history.len(), 3);
        assert_eq!(history.recent(1)[0].confidence, 0.4);
    }

    #[test]
    fn test_prune_by_age() {
        let history = AnalysisHistory::new(HistoryConfig {
            capacity: 10,
            max_age_secs: 60,
        });
        let now = Utc::now();
        history.record(record(AnalysisKind::Facial, 0.5).at(now - ChronoDuration::seconds(120)));
        history.record(record(AnalysisKind::Facial, 0.5).at(now - ChronoDuration::seconds(10)));

        assert_eq!(history.prune(now), 1);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_summary() {
        let history = AnalysisHistory::new(HistoryConfig::default());
        history.record(record(AnalysisKind::Clothing, 0.8));
        history.record(record(AnalysisKind::Clothing, 0.4).with_fallback(true));
        history.record(record(AnalysisKind::Facial, 0.6));

        let summary = history.summary();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.per_kind[&AnalysisKind::Clothing], 2);
        assert_eq!(summary.per_kind[&AnalysisKind::Harmony], 0);
        assert!((summary.average_confidence - 0.6).abs() < 1e-6);
        assert!((summary.fallback_rate - 1.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn test_collector_fans_out_to_shared_history() {
        let history = AnalysisHistory::new(HistoryConfig::default());
        let monitor = PerformanceMonitor::new();
        let stats = monitor.get_stats_shared();

        let mut collector = MetricsCollector::new()
            .add_observer(Box::new(history.clone()))
            .add_observer(Box::new(monitor));
        collector.notify(&record(AnalysisKind::Facial, 0.9));

        assert_eq!(history.len(), 1);
        let stats = stats.lock().unwrap();
        assert_eq!(stats.total_analyses, 1);
        assert_eq!(stats.max_facial_us, 100);
    }
}
