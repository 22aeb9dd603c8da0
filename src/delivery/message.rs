// ==========================================
// 防护对象阈值报表 - 邮件正文模板
// ==========================================
// 占位符:
//   {date_time} {total_objects} {violating_objects}
//   {days_lookback} {threshold_percentage}
// ==========================================

/// 正文模板参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BodyContext {
    pub date_time: String,
    pub total_objects: usize,
    pub violating_objects: usize,
    pub days_lookback: u32,
    pub threshold_percentage: u32,
}

/// 按占位符替换; 未知占位符原样保留
pub fn render_body(template: &str, ctx: &BodyContext) -> String {
    [
        ("{date_time}", ctx.date_time.clone()),
        ("{total_objects}", ctx.total_objects.to_string()),
        ("{violating_objects}", ctx.violating_objects.to_string()),
        ("{days_lookback}", ctx.days_lookback.to_string()),
        ("{threshold_percentage}", ctx.threshold_percentage.to_string()),
    ]
    .iter()
    .fold(template.to_string(), |acc, (key, value)| acc.replace(key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_body() {
        let ctx = BodyContext {
            date_time: "2025-03-09 14:05:07".to_string(),
            total_objects: 25,
            violating_objects: 3,
            days_lookback: 7,
            threshold_percentage: 80,
        };
        let body = render_body(
            "{total_objects} objects, {violating_objects} flagged, last {days_lookback} days, {threshold_percentage}% ({date_time}) {unknown}",
            &ctx,
        );
        assert_eq!(
            body,
            "25 objects, 3 flagged, last 7 days, 80% (2025-03-09 14:05:07) {unknown}"
        );
    }
}
