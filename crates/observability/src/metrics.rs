//! Broadcast 指标收集模块
//!
//! 基于投递结果、冷却等待与轮次结果收集和统计运行指标。

use std::collections::HashMap;

use contracts::{DeliveryRecord, RoundResult, SendOutcome};
use metrics::{counter, gauge, histogram};

/// 记录单次投递结果
pub fn record_delivery(outcome: SendOutcome) {
    counter!(
        "group_broadcaster_deliveries_total",
        "outcome" => outcome.as_str()
    )
    .increment(1);
}

/// 记录一次 provider 强制冷却
pub fn record_cooldown(wait_secs: u64) {
    counter!("group_broadcaster_cooldowns_total").increment(1);
    histogram!("group_broadcaster_cooldown_seconds").record(wait_secs as f64);
}

/// 记录目录解析结果
pub fn record_catalog_resolved(destinations: usize) {
    gauge!("group_broadcaster_catalog_size").set(destinations as f64);
}

/// 记录目录解析失败
pub fn record_catalog_failure(fatal: bool) {
    let kind = if fatal { "fatal" } else { "transient" };
    counter!("group_broadcaster_catalog_failures_total", "kind" => kind).increment(1);
}

/// 记录一轮完成
pub fn record_round_completed(result: &RoundResult) {
    counter!("group_broadcaster_rounds_total").increment(1);
    gauge!("group_broadcaster_last_round_sent").set(result.sent as f64);
    gauge!("group_broadcaster_last_round_failed").set(result.failed as f64);
}

/// 广播指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct BroadcastMetricsAggregator {
    /// 各结果计数
    pub outcome_counts: HashMap<SendOutcome, u64>,

    /// 冷却后重试次数
    pub retries: u64,

    /// 完成的轮次
    pub rounds: u64,

    /// 目录解析失败的轮次
    pub catalog_failures: u64,

    /// 冷却时长统计 (秒)
    pub cooldown_stats: RunningStats,

    /// 每轮成功数统计
    pub sent_per_round: RunningStats,
}

impl BroadcastMetricsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_delivery(&mut self, record: &DeliveryRecord) {
        *self.outcome_counts.entry(record.outcome).or_insert(0) += 1;
        if record.retried {
            self.retries += 1;
        }
    }

    pub fn update_cooldown(&mut self, wait_secs: u64) {
        self.cooldown_stats.push(wait_secs as f64);
    }

    pub fn update_round(&mut self, result: &RoundResult) {
        self.rounds += 1;
        if result.catalog_failed {
            self.catalog_failures += 1;
        }
        self.sent_per_round.push(result.sent as f64);
    }

    fn count(&self, outcome: SendOutcome) -> u64 {
        self.outcome_counts.get(&outcome).copied().unwrap_or(0)
    }

    /// 生成摘要报告
    pub fn summary(&self) -> MetricsSummary {
        let attempted: u64 = self
            .outcome_counts
            .iter()
            .filter(|(outcome, _)| **outcome != SendOutcome::SkippedExcluded)
            .map(|(_, count)| *count)
            .sum();
        let sent = self.count(SendOutcome::Sent);

        MetricsSummary {
            rounds: self.rounds,
            sent,
            excluded: self.count(SendOutcome::SkippedExcluded),
            failed_permission: self.count(SendOutcome::FailedPermission),
            failed_banned: self.count(SendOutcome::FailedBanned),
            failed_rate_limited: self.count(SendOutcome::FailedRateLimited),
            failed_other: self.count(SendOutcome::FailedOther),
            retries: self.retries,
            catalog_failures: self.catalog_failures,
            success_rate: if attempted > 0 {
                sent as f64 / attempted as f64 * 100.0
            } else {
                0.0
            },
            cooldown_secs: StatsSummary::from(&self.cooldown_stats),
            sent_per_round: StatsSummary::from(&self.sent_per_round),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct MetricsSummary {
    pub rounds: u64,
    pub sent: u64,
    pub excluded: u64,
    pub failed_permission: u64,
    pub failed_banned: u64,
    pub failed_rate_limited: u64,
    pub failed_other: u64,
    pub retries: u64,
    pub catalog_failures: u64,
    pub success_rate: f64,
    pub cooldown_secs: StatsSummary,
    pub sent_per_round: StatsSummary,
}

impl std::fmt::Display for MetricsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Broadcast Metrics Summary ===")?;
        writeln!(f, "Rounds: {}", self.rounds)?;
        writeln!(f, "Sent: {} ({:.2}% of attempts)", self.sent, self.success_rate)?;
        writeln!(f, "Excluded: {}", self.excluded)?;
        writeln!(
            f,
            "Failed: permission={}, banned={}, rate_limited={}, other={}",
            self.failed_permission, self.failed_banned, self.failed_rate_limited, self.failed_other
        )?;
        writeln!(f, "Cooldown retries: {}", self.retries)?;
        if self.catalog_failures > 0 {
            writeln!(f, "Rounds skipped on catalog failure: {}", self.catalog_failures)?;
        }
        writeln!(f, "Cooldown (s): {}", self.cooldown_secs)?;
        writeln!(f, "Sent per round: {}", self.sent_per_round)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
