//! 终止事件负载
//!
//! 服务端在 `DONE` 之后附带的 JSON。除 `success` 外的字段都可能缺失或为空对象。

use crate::error::JobError;
use crate::models::schedule::ScheduleResult;
use serde::{Deserialize, Serialize};

/// 终止事件的原始负载
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerminalPayload {
    pub success: bool,
    #[serde(default)]
    pub schedule: Option<ScheduleResult>,
    #[serde(default)]
    pub scheduling_report: Vec<SchedulingNote>,
    #[serde(default)]
    pub failures: Vec<ProfessorFailure>,
    #[serde(default)]
    pub prof_report: Vec<String>,
    #[serde(default)]
    pub chart_data: Option<ChartData>,
    #[serde(default)]
    pub balance_report: Option<BalanceReport>,
    #[serde(default)]
    pub stats_dashboard: Option<StatsDashboard>,
    #[serde(default)]
    pub message: Option<String>,
}

/// 科目排考 / 监考说明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulingNote {
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub reason: String,
}

/// 教师约束冲突
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessorFailure {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub reason: String,
}

/// 工作量柱状图数据
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartData {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub datasets: Vec<ChartDataset>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartDataset {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub data: Vec<f64>,
}

/// 目标分布与实际分布的对比
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceReport {
    #[serde(default)]
    pub details: Vec<BalanceDetail>,
    #[serde(default)]
    pub balance_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceDetail {
    pub pattern: String,
    #[serde(default)]
    pub target_count: i64,
    #[serde(default)]
    pub actual_count: i64,
    #[serde(default)]
    pub deviation: i64,
}

/// 统计面板
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsDashboard {
    #[serde(default)]
    pub total_duties: u64,
    #[serde(default)]
    pub total_large_duties: u64,
    #[serde(default)]
    pub total_other_duties: u64,
    #[serde(default)]
    pub avg_duties_per_prof: f64,
    #[serde(default)]
    pub busiest_day: BusiestDay,
    #[serde(default)]
    pub most_burdened_profs: Vec<ProfessorLoad>,
    #[serde(default)]
    pub least_burdened_profs: Vec<ProfessorLoad>,
    #[serde(default)]
    pub shortage_reports: Vec<String>,
    #[serde(default)]
    pub unscheduled_subjects_report: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BusiestDay {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub duties: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfessorLoad {
    pub name: String,
    #[serde(default)]
    pub workload: f64,
}

/// 成功生成后的完整报告
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationReport {
    pub schedule: ScheduleResult,
    pub scheduling_report: Vec<SchedulingNote>,
    pub failures: Vec<ProfessorFailure>,
    pub prof_report: Vec<String>,
    pub chart_data: Option<ChartData>,
    pub balance_report: Option<BalanceReport>,
    pub stats_dashboard: Option<StatsDashboard>,
}

impl TerminalPayload {
    /// 解析 `DONE` 之后的文本
    pub fn parse(raw: &str) -> Result<Self, JobError> {
        serde_json::from_str(raw).map_err(|e| JobError::MalformedPayload(e.to_string()))
    }

    /// 转换为生成报告；`success: false` 时返回远端给出的原始消息
    pub fn into_report(self) -> Result<GenerationReport, JobError> {
        if !self.success {
            return Err(JobError::RemoteFailure(self.message.unwrap_or_default()));
        }
        let schedule = self.schedule.ok_or_else(|| {
            JobError::MalformedPayload("success=true 但缺少 schedule 字段".to_string())
        })?;
        Ok(GenerationReport {
            schedule,
            scheduling_report: self.scheduling_report,
            failures: self.failures,
            prof_report: self.prof_report,
            chart_data: self.chart_data,
            balance_report: self.balance_report,
            stats_dashboard: self.stats_dashboard,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_payload_keeps_message() {
        let payload = TerminalPayload::parse(r#"{"success": false, "message": "فشل إنشاء أي حل."}"#).unwrap();
        assert_eq!(
            payload.into_report(),
            Err(JobError::RemoteFailure("فشل إنشاء أي حل.".to_string()))
        );
    }

    #[test]
    fn test_empty_optional_blocks_parse() {
        let raw = r#"{"success": true, "schedule": {}, "chart_data": {}, "balance_report": {}, "stats_dashboard": {}}"#;
        let report = TerminalPayload::parse(raw).unwrap().into_report().unwrap();
        assert!(report.schedule.is_empty());
        assert_eq!(report.balance_report, Some(BalanceReport::default()));
        assert_eq!(report.stats_dashboard.unwrap().busiest_day.date, None);
    }

    #[test]
    fn test_success_without_schedule_is_malformed() {
        let payload = TerminalPayload::parse(r#"{"success": true}"#).unwrap();
        assert!(matches!(payload.into_report(), Err(JobError::MalformedPayload(_))));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            TerminalPayload::parse("{not json"),
            Err(JobError::MalformedPayload(_))
        ));
    }
}
