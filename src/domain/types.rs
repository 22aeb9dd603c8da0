// ==========================================
// 防护对象阈值报表 - 领域类型定义
// ==========================================
// 协议类别 / 度量单位 / 指标键
// 顺序固定: TCP → UDP → ICMP → Total, Mbps → PPS
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 协议类别 (Protocol)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    Tcp,
    Udp,
    Icmp,
    Total,
}

impl Protocol {
    /// 报表固定顺序
    pub const ALL: [Protocol; 4] = [Protocol::Tcp, Protocol::Udp, Protocol::Icmp, Protocol::Total];

    /// 在固定顺序中的下标
    pub fn index(self) -> usize {
        match self {
            Protocol::Tcp => 0,
            Protocol::Udp => 1,
            Protocol::Icmp => 2,
            Protocol::Total => 3,
        }
    }

    /// 控制器接口路径段 (tcp/udp/icmp/total)
    pub fn api_name(self) -> &'static str {
        match self {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
            Protocol::Icmp => "icmp",
            Protocol::Total => "total",
        }
    }

    /// 表头显示名
    pub fn label(self) -> &'static str {
        match self {
            Protocol::Tcp => "TCP",
            Protocol::Udp => "UDP",
            Protocol::Icmp => "ICMP",
            Protocol::Total => "Total",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.api_name())
    }
}

// ==========================================
// 度量单位 (Measure)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Measure {
    Mbps, // 带宽
    Pps,  // 包速率
}

impl Measure {
    pub const ALL: [Measure; 2] = [Measure::Mbps, Measure::Pps];

    pub fn label(self) -> &'static str {
        match self {
            Measure::Mbps => "Mbps",
            Measure::Pps => "PPS",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Measure::Mbps => write!(f, "mbps"),
            Measure::Pps => write!(f, "pps"),
        }
    }
}

// ==========================================
// 指标键 (协议, 度量)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MetricKey {
    pub protocol: Protocol,
    pub measure: Measure,
}

impl MetricKey {
    pub fn new(protocol: Protocol, measure: Measure) -> Self {
        Self { protocol, measure }
    }

    /// 全部 8 个指标键, 按报表列顺序
    pub fn all() -> impl Iterator<Item = MetricKey> {
        Protocol::ALL
            .into_iter()
            .flat_map(|p| Measure::ALL.into_iter().map(move |m| MetricKey::new(p, m)))
    }
}

impl fmt::Display for MetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.protocol, self.measure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_key_order() {
        let keys: Vec<String> = MetricKey::all().map(|k| k.to_string()).collect();
        assert_eq!(
            keys,
            vec![
                "tcp/mbps", "tcp/pps", "udp/mbps", "udp/pps", "icmp/mbps", "icmp/pps",
                "total/mbps", "total/pps"
            ]
        );
    }

    #[test]
    fn test_protocol_index_matches_order() {
        for (i, p) in Protocol::ALL.iter().enumerate() {
            assert_eq!(p.index(), i);
        }
    }
}
