// ==========================================
// 防护对象阈值报表 - 对象报告实体
// ==========================================
// ObjectReport: 每个防护对象一条, 每次运行新建
// 评估后不可变, 不落库
// ==========================================

use crate::domain::types::{Measure, MetricKey, Protocol};
use serde::Serialize;
use std::collections::BTreeSet;

// ==========================================
// ProtocolMetricSet - 单协议指标
// ==========================================
// activation_* 为 0 表示未配置
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProtocolMetricSet {
    pub activation_mbps: f64,
    pub activation_pps: f64,
    pub max_mbps: f64,
    pub max_pps: f64,
}

impl ProtocolMetricSet {
    pub fn activation(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Mbps => self.activation_mbps,
            Measure::Pps => self.activation_pps,
        }
    }

    pub fn max(&self, measure: Measure) -> f64 {
        match measure {
            Measure::Mbps => self.max_mbps,
            Measure::Pps => self.max_pps,
        }
    }
}

// ==========================================
// ProtocolMetrics - 四个协议类别, 类型层面保证齐全
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ProtocolMetrics([ProtocolMetricSet; 4]);

impl ProtocolMetrics {
    pub fn get(&self, protocol: Protocol) -> &ProtocolMetricSet {
        &self.0[protocol.index()]
    }

    pub fn get_mut(&mut self, protocol: Protocol) -> &mut ProtocolMetricSet {
        &mut self.0[protocol.index()]
    }

    /// 按固定顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = (Protocol, &ProtocolMetricSet)> {
        Protocol::ALL.into_iter().zip(self.0.iter())
    }
}

// ==========================================
// ObjectReport - 对象报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectReport {
    name: String,
    metrics: ProtocolMetrics,
    // None = 尚未评估
    violating_metrics: Option<BTreeSet<MetricKey>>,
}

impl ObjectReport {
    /// 构造未评估的报告 (仅由 RecordNormalizer 调用)
    pub(crate) fn new(name: String, metrics: ProtocolMetrics) -> Self {
        Self {
            name,
            metrics,
            violating_metrics: None,
        }
    }

    /// 写入评估结果, 消费自身 (仅由 ViolationEvaluator 调用)
    pub(crate) fn with_violations(self, violations: BTreeSet<MetricKey>) -> Self {
        Self {
            violating_metrics: Some(violations),
            ..self
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &ProtocolMetrics {
        &self.metrics
    }

    pub fn is_evaluated(&self) -> bool {
        self.violating_metrics.is_some()
    }

    /// 违规指标集合; 未评估时为空
    pub fn violating_metrics(&self) -> impl Iterator<Item = MetricKey> + '_ {
        self.violating_metrics.iter().flat_map(|set| set.iter().copied())
    }

    /// 是否存在违规 (行高亮依据)
    pub fn is_violating(&self) -> bool {
        self.violating_metrics
            .as_ref()
            .is_some_and(|set| !set.is_empty())
    }
}
