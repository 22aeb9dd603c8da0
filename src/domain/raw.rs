// ==========================================
// 防护对象阈值报表 - 控制器原始载荷
// ==========================================
// 归一化边界: 字段一律可缺省, 数值保持原始 JSON 形态
// 形态无法识别的载荷以 Unrecognized 变体原样携带
// 类型/取值校验只在 RecordNormalizer 一处进行
// ==========================================

use crate::domain::types::{Measure, Protocol};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

// ==========================================
// RawThresholds - flowDetectorThresholdsHostDetails
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawThresholds {
    pub tcp_mbps: Option<Value>,
    pub tcp_pps: Option<Value>,
    pub udp_mbps: Option<Value>,
    pub udp_pps: Option<Value>,
    pub icmp_mbps: Option<Value>,
    pub icmp_pps: Option<Value>,
    pub total_mbps: Option<Value>,
    pub total_pps: Option<Value>,
}

impl RawThresholds {
    /// 取出指定字段, 同时返回控制器侧字段名 (用于错误定位)
    pub fn field(&self, protocol: Protocol, measure: Measure) -> (&'static str, Option<&Value>) {
        let (name, value) = match (protocol, measure) {
            (Protocol::Tcp, Measure::Mbps) => ("tcpMbps", &self.tcp_mbps),
            (Protocol::Tcp, Measure::Pps) => ("tcpPps", &self.tcp_pps),
            (Protocol::Udp, Measure::Mbps) => ("udpMbps", &self.udp_mbps),
            (Protocol::Udp, Measure::Pps) => ("udpPps", &self.udp_pps),
            (Protocol::Icmp, Measure::Mbps) => ("icmpMbps", &self.icmp_mbps),
            (Protocol::Icmp, Measure::Pps) => ("icmpPps", &self.icmp_pps),
            (Protocol::Total, Measure::Mbps) => ("totalMbps", &self.total_mbps),
            (Protocol::Total, Measure::Pps) => ("totalPps", &self.total_pps),
        };
        (name, value.as_ref())
    }

    pub fn set(&mut self, protocol: Protocol, measure: Measure, value: Value) {
        let slot = match (protocol, measure) {
            (Protocol::Tcp, Measure::Mbps) => &mut self.tcp_mbps,
            (Protocol::Tcp, Measure::Pps) => &mut self.tcp_pps,
            (Protocol::Udp, Measure::Mbps) => &mut self.udp_mbps,
            (Protocol::Udp, Measure::Pps) => &mut self.udp_pps,
            (Protocol::Icmp, Measure::Mbps) => &mut self.icmp_mbps,
            (Protocol::Icmp, Measure::Pps) => &mut self.icmp_pps,
            (Protocol::Total, Measure::Mbps) => &mut self.total_mbps,
            (Protocol::Total, Measure::Pps) => &mut self.total_pps,
        };
        *slot = Some(value);
    }
}

// ==========================================
// RawThresholdPayload - 阈值载荷 (带形态标记)
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RawThresholdPayload {
    /// 对象形态 (字段可缺省); 控制器未返回明细时为全空
    Details(RawThresholds),
    /// 非对象形态, 原样保留供归一化器报错
    Unrecognized(Value),
}

impl RawThresholdPayload {
    pub fn from_value(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => RawThresholdPayload::Details(RawThresholds::default()),
            Some(value @ Value::Object(_)) => match serde_json::from_value(value.clone()) {
                Ok(details) => RawThresholdPayload::Details(details),
                Err(_) => RawThresholdPayload::Unrecognized(value),
            },
            Some(other) => RawThresholdPayload::Unrecognized(other),
        }
    }
}

impl Default for RawThresholdPayload {
    fn default() -> Self {
        RawThresholdPayload::Details(RawThresholds::default())
    }
}

impl From<RawThresholds> for RawThresholdPayload {
    fn from(details: RawThresholds) -> Self {
        RawThresholdPayload::Details(details)
    }
}

// ==========================================
// RawSample - {"row": {"value": ...}}
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSample {
    pub row: Option<RawSampleRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawSampleRow {
    pub value: Option<Value>,
}

impl RawSample {
    pub fn new(value: Value) -> Self {
        Self {
            row: Some(RawSampleRow { value: Some(value) }),
        }
    }

    pub fn value(&self) -> Option<&Value> {
        self.row.as_ref().and_then(|r| r.value.as_ref())
    }
}

// ==========================================
// RawTrafficSeries - dataMap.incoming
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTrafficSeries {
    #[serde(deserialize_with = "null_as_empty")]
    pub bps: Vec<RawSample>,
    #[serde(deserialize_with = "null_as_empty")]
    pub pps: Vec<RawSample>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<RawSample>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<RawSample>>::deserialize(deserializer)?.unwrap_or_default())
}

// ==========================================
// RawSeries - 单协议流量载荷 (带形态标记)
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub enum RawSeries {
    Samples(RawTrafficSeries),
    Unrecognized(Value),
}

impl RawSeries {
    /// 解析 dataMap.incoming; 缺失 / null 视为无流量
    pub fn from_value(value: Option<Value>) -> Self {
        match value {
            None | Some(Value::Null) => RawSeries::Samples(RawTrafficSeries::default()),
            Some(value) => match serde_json::from_value(value.clone()) {
                Ok(series) => RawSeries::Samples(series),
                Err(_) => RawSeries::Unrecognized(value),
            },
        }
    }
}

// ==========================================
// RawMaxima - 单对象四个协议的流量载荷
// ==========================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawMaxima {
    series: [Option<RawSeries>; 4],
}

impl RawMaxima {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, protocol: Protocol, series: RawSeries) {
        self.series[protocol.index()] = Some(series);
    }

    pub fn with(mut self, protocol: Protocol, series: RawTrafficSeries) -> Self {
        self.insert(protocol, RawSeries::Samples(series));
        self
    }

    /// 缺失协议视为无流量
    pub fn get(&self, protocol: Protocol) -> Option<&RawSeries> {
        self.series[protocol.index()].as_ref()
    }
}
