// ==========================================
// 防护对象阈值报表 - 记录归一化器
// ==========================================
// 输入: RawThresholdPayload + RawMaxima (同一对象)
// 输出: ObjectReport (violating_metrics 未设置)
// 规则:
// - 缺失 / null / 空串 → 0
// - 数值字符串可接受, 其余形态一律 MalformedRecord
// - 最大值: bps 取最大后 /1024/1024 向上取整, pps 向上取整
// ==========================================

use crate::domain::raw::{RawMaxima, RawSample, RawSeries, RawThresholdPayload};
use crate::domain::report::{ObjectReport, ProtocolMetrics};
use crate::domain::types::{Measure, Protocol};
use crate::engine::error::{EngineError, EngineResult};
use serde_json::Value;

const BYTES_PER_MEGABIT: f64 = 1024.0 * 1024.0;
const THRESHOLDS_FIELD: &str = "flowDetectorThresholdsHostDetails";
/// 无名对象在错误与跳过列表中的占位名
pub const UNNAMED_OBJECT: &str = "<unnamed>";

// ==========================================
// RecordNormalizer
// ==========================================
#[derive(Debug, Clone, Copy, Default)]
pub struct RecordNormalizer;

impl RecordNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// 校验对象名; 空白名称在拉取前即可判为格式错误
    pub fn check_name<'a>(&self, name: &'a str) -> EngineResult<&'a str> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::malformed(UNNAMED_OBJECT, "name", "对象名为空"));
        }
        Ok(name)
    }

    /// 归一化单个对象
    ///
    /// # 参数
    /// - name: 对象名 (非空)
    /// - thresholds: 阈值载荷
    /// - maxima: 流量最大值载荷
    ///
    /// # 返回
    /// - Ok(ObjectReport): 四个协议齐全, 缺失值为 0
    /// - Err(MalformedRecord): 指明对象与字段
    pub fn normalize(
        &self,
        name: &str,
        thresholds: &RawThresholdPayload,
        maxima: &RawMaxima,
    ) -> EngineResult<ObjectReport> {
        let name = self.check_name(name)?;

        let details = match thresholds {
            RawThresholdPayload::Details(details) => details,
            RawThresholdPayload::Unrecognized(value) => {
                return Err(EngineError::malformed(
                    name,
                    THRESHOLDS_FIELD,
                    format!("阈值明细不是对象: {}", value),
                ));
            }
        };

        let mut metrics = ProtocolMetrics::default();
        for protocol in Protocol::ALL {
            let set = metrics.get_mut(protocol);

            let (field, value) = details.field(protocol, Measure::Mbps);
            set.activation_mbps = parse_threshold(name, field, value)?;
            let (field, value) = details.field(protocol, Measure::Pps);
            set.activation_pps = parse_threshold(name, field, value)?;

            match maxima.get(protocol) {
                None => {}
                Some(RawSeries::Samples(series)) => {
                    let bps = max_sample(name, protocol, "bps", &series.bps)?;
                    set.max_mbps = (bps / BYTES_PER_MEGABIT).ceil();
                    set.max_pps = max_sample(name, protocol, "pps", &series.pps)?.ceil();
                }
                Some(RawSeries::Unrecognized(value)) => {
                    return Err(EngineError::malformed(
                        name,
                        format!("{}.incoming", protocol),
                        format!("流量序列形态无法识别: {}", value),
                    ));
                }
            }
        }

        Ok(ObjectReport::new(name.to_string(), metrics))
    }
}

fn parse_threshold(object: &str, field: &str, value: Option<&Value>) -> EngineResult<f64> {
    match value {
        None => Ok(0.0),
        Some(v) => parse_non_negative(object, field, v),
    }
}

/// 取样本最大值, 无样本为 0
fn max_sample(
    object: &str,
    protocol: Protocol,
    series: &str,
    samples: &[RawSample],
) -> EngineResult<f64> {
    let mut max = 0.0_f64;
    for (idx, sample) in samples.iter().enumerate() {
        let field = format!("{}.{}[{}]", protocol, series, idx);
        let value = sample
            .value()
            .ok_or_else(|| EngineError::malformed(object, &field, "样本缺少 row.value"))?;
        max = max.max(parse_non_negative(object, &field, value)?);
    }
    Ok(max)
}

fn parse_non_negative(object: &str, field: &str, value: &Value) -> EngineResult<f64> {
    let parsed = match value {
        Value::Null => return Ok(0.0),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Ok(0.0);
            }
            trimmed.parse::<f64>().ok()
        }
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() && v >= 0.0 => Ok(v),
        Some(v) => Err(EngineError::malformed(
            object,
            field,
            format!("数值必须为非负有限数, 实际 {}", v),
        )),
        None => Err(EngineError::malformed(
            object,
            field,
            format!("无法解析为数值: {}", value),
        )),
    }
}
