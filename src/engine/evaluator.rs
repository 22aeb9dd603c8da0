// ==========================================
// 防护对象阈值报表 - 违规评估器
// ==========================================
// 规则: 对每个 (协议, 度量) 独立判断
//   activation != 0 且 activation < fraction × max → 违规
// - activation == 0 视为未配置, 不参与判断
// - max == 0 时不可能违规
// - 相等不算违规 (严格小于)
// ==========================================

use crate::domain::report::ObjectReport;
use crate::domain::types::{Measure, MetricKey, Protocol};
use crate::engine::error::{EngineError, EngineResult};
use std::collections::BTreeSet;
use std::fmt;

/// 默认阈值比例 (80%)
pub const DEFAULT_THRESHOLD_FRACTION: f64 = 0.8;

// ==========================================
// ThresholdFraction - 已校验的阈值比例 (0, 1]
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ThresholdFraction(f64);

impl ThresholdFraction {
    pub fn new(value: f64) -> EngineResult<Self> {
        // NaN 在两个比较上均为 false, 会落入错误分支
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(EngineError::InvalidFraction(value))
        }
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// 百分比整数 (用于邮件正文 / 表头说明)
    pub fn percentage(self) -> u32 {
        (self.0 * 100.0).round() as u32
    }
}

impl Default for ThresholdFraction {
    fn default() -> Self {
        Self(DEFAULT_THRESHOLD_FRACTION)
    }
}

impl fmt::Display for ThresholdFraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ==========================================
// ViolationEvaluator
// ==========================================
// 无状态, 相同输入恒得相同输出
#[derive(Debug, Clone, Copy, Default)]
pub struct ViolationEvaluator {
    fraction: ThresholdFraction,
}

impl ViolationEvaluator {
    pub fn new(fraction: ThresholdFraction) -> Self {
        Self { fraction }
    }

    /// 以原始比例值构造, 校验 (0, 1]
    pub fn with_fraction(fraction: f64) -> EngineResult<Self> {
        Ok(Self::new(ThresholdFraction::new(fraction)?))
    }

    pub fn fraction(&self) -> ThresholdFraction {
        self.fraction
    }

    /// 评估单个对象, 返回写入 violating_metrics 的同一实体
    pub fn evaluate(&self, report: ObjectReport) -> ObjectReport {
        let violations = self.find_violations(&report);
        report.with_violations(violations)
    }

    /// 计算违规指标集合 (不修改报告)
    pub fn find_violations(&self, report: &ObjectReport) -> BTreeSet<MetricKey> {
        let f = self.fraction.value();
        let mut violations = BTreeSet::new();

        for protocol in Protocol::ALL {
            let set = report.metrics().get(protocol);
            for measure in Measure::ALL {
                let activation = set.activation(measure);
                if activation == 0.0 {
                    continue;
                }
                if activation < f * set.max(measure) {
                    violations.insert(MetricKey::new(protocol, measure));
                }
            }
        }

        violations
    }
}
