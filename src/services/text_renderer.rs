//! 文本渲染 - 业务能力层
//!
//! 把快照、网格、报告和分配方案转换成终端文本。全部是纯函数，
//! 输出由调用方决定写到哪里。

use crate::models::report::{BalanceReport, ChartData, StatsDashboard};
use crate::models::GenerationReport;
use crate::services::fair_distribution::DistributionPlan;
use crate::services::result_assembler::{ExamCell, GuardEntry, ScheduleView};
use crate::workflow::{GenerationJob, JobStatus};
use std::fmt::Write;

const RULE: &str = "────────────────────────────────────────";
const BAR_WIDTH: usize = 30;

/// 空结果时的提示
pub const EMPTY_SCHEDULE_MESSAGE: &str = "لم يتم إنشاء أي امتحانات في الجدول.";

/// 进度条
pub fn render_progress(percent: u8) -> String {
    let percent = percent.min(100) as usize;
    let filled = percent * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        percent
    )
}

/// 增量日志输出
///
/// 记住已经输出到第几行、上次的进度，每次只返回新增的内容
#[derive(Debug, Default)]
pub struct LiveLogPrinter {
    printed_lines: usize,
    last_progress: Option<u8>,
}

impl LiveLogPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 根据任务当前状态生成需要新输出的行
    pub fn render_update(&mut self, job: &GenerationJob) -> Vec<String> {
        let mut out = Vec::new();

        if job.status() == JobStatus::Streaming && self.last_progress != Some(job.progress_percent())
        {
            self.last_progress = Some(job.progress_percent());
            out.push(render_progress(job.progress_percent()));
        }

        let lines = job.log_lines();
        if lines.len() > self.printed_lines {
            out.extend(lines[self.printed_lines..].iter().cloned());
            self.printed_lines = lines.len();
        }
        out
    }
}

fn render_guard(entry: &GuardEntry) -> String {
    match entry {
        GuardEntry::Named(name) => name.clone(),
        GuardEntry::Shortage(text) => format!("⚠ {}", text),
    }
}

fn render_cell(out: &mut String, cell: &ExamCell) {
    let _ = write!(out, "    {}", cell.subject);
    if cell.guards_incomplete {
        out.push_str("  [حراسة ناقصة]");
    }
    out.push('\n');
    let _ = writeln!(out, "    أستاذ المادة: {}", cell.professor);
    for group in &cell.hall_groups {
        let guards: Vec<String> = group.guards.iter().map(render_guard).collect();
        let _ = writeln!(
            out,
            "    {}: {} -> {}",
            group.tier.title(),
            group.hall_names.join(", "),
            guards.join("، ")
        );
    }
}

/// 渲染排班网格
///
/// 每个年级一段，按 时间段 → 日期 列出有考试的单元格
pub fn render_schedule(view: &ScheduleView) -> String {
    if view.is_empty() {
        return format!("{}\n", EMPTY_SCHEDULE_MESSAGE);
    }

    let mut out = String::new();
    for table in &view.levels {
        let _ = writeln!(out, "{}\nجدول امتحانات: {}\n{}", RULE, table.level, RULE);
        for row in &table.rows {
            for (column, cell) in view.columns.iter().zip(&row.cells) {
                let Some(cell) = cell else { continue };
                let _ = write!(out, "  [{}", row.time);
                match column.weekday {
                    Some(day) => {
                        let _ = write!(out, " | {} {}]", day, column.date);
                    }
                    None => {
                        let _ = write!(out, " | {}]", column.date);
                    }
                }
                out.push('\n');
                render_cell(&mut out, cell);
            }
        }
    }
    out
}

fn render_balance(out: &mut String, balance: &BalanceReport) {
    if balance.details.is_empty() {
        return;
    }
    let _ = writeln!(out, "\nتقرير توازن توزيع الحراسة");
    for detail in &balance.details {
        let _ = writeln!(
            out,
            "  {:<24} الهدف {:>3} | الفعلي {:>3} | الانحراف {:+}",
            detail.pattern, detail.target_count, detail.actual_count, detail.deviation
        );
    }
    let _ = writeln!(out, "  مؤشر التوازن: {}%", balance.balance_score);
}

fn render_stats(out: &mut String, stats: &StatsDashboard) {
    let _ = writeln!(out, "\nلوحة المعلومات الإحصائية");
    let _ = writeln!(
        out,
        "  إجمالي الحصص الموزعة: {} (كبيرة {} / أخرى {})",
        stats.total_duties, stats.total_large_duties, stats.total_other_duties
    );
    let _ = writeln!(out, "  متوسط الحصص لكل أستاذ: {:.1}", stats.avg_duties_per_prof);
    let _ = writeln!(
        out,
        "  اليوم الأكثر ازدحاماً: {} ({} حصص حراسة)",
        stats.busiest_day.date.as_deref().unwrap_or("N/A"),
        stats.busiest_day.duties
    );
    if !stats.most_burdened_profs.is_empty() {
        let _ = writeln!(out, "  الأكثر حراسة (حسب العبء):");
        for prof in &stats.most_burdened_profs {
            let _ = writeln!(out, "    {}: {:.1} نقطة", prof.name, prof.workload);
        }
    }
    if !stats.least_burdened_profs.is_empty() {
        let _ = writeln!(out, "  الأقل حراسة (حسب العبء):");
        for prof in &stats.least_burdened_profs {
            let _ = writeln!(out, "    {}: {:.1} نقطة", prof.name, prof.workload);
        }
    }
    if !stats.unscheduled_subjects_report.is_empty() {
        let _ = writeln!(
            out,
            "  مواد لم تتم جدولتها ({})",
            stats.unscheduled_subjects_report.len()
        );
        for item in &stats.unscheduled_subjects_report {
            let _ = writeln!(out, "    - {}", item);
        }
    }
    if !stats.shortage_reports.is_empty() {
        let _ = writeln!(out, "  نقص في الحراسة ({})", stats.shortage_reports.len());
        for item in &stats.shortage_reports {
            let _ = writeln!(out, "    - {}", item);
        }
    }
}

fn render_chart(out: &mut String, chart: &ChartData) {
    if chart.labels.is_empty() || chart.datasets.is_empty() {
        return;
    }
    let _ = writeln!(out, "\nرسم بياني لتوزيع عبء الحراسة");
    let max = chart
        .datasets
        .iter()
        .flat_map(|d| d.data.iter().copied())
        .fold(0.0_f64, f64::max);

    for dataset in &chart.datasets {
        let _ = writeln!(out, "  {}", dataset.label);
        for (label, value) in chart.labels.iter().zip(&dataset.data) {
            let width = if max > 0.0 {
                ((value / max) * BAR_WIDTH as f64).round() as usize
            } else {
                0
            };
            let _ = writeln!(out, "    {:<20} {} {:.1}", label, "▇".repeat(width), value);
        }
    }
}

/// 渲染生成报告（不含网格）
///
/// 缺失或为空的部分不输出
pub fn render_report(report: &GenerationReport) -> String {
    let mut out = String::new();

    if !report.scheduling_report.is_empty() {
        let _ = writeln!(out, "\nتقرير جدولة المواد وملاحظات الحراسة");
        for note in &report.scheduling_report {
            match &note.level {
                Some(level) if !level.is_empty() => {
                    let _ = writeln!(out, "  • {} ({}) -> {}", note.subject, level, note.reason);
                }
                _ => {
                    let _ = writeln!(out, "  • {} -> {}", note.subject, note.reason);
                }
            }
        }
    }

    if !report.failures.is_empty() {
        let _ = writeln!(out, "\nتقرير أخطاء قيود الأساتذة");
        for failure in &report.failures {
            let _ = writeln!(out, "  • الأستاذ: {} ({})", failure.name, failure.reason);
        }
    }

    if !report.prof_report.is_empty() {
        let _ = writeln!(out, "\nتقرير إجمالي حصص الحراسة للأساتذة");
        for line in &report.prof_report {
            let _ = writeln!(out, "  {}", line);
        }
    }

    if let Some(balance) = &report.balance_report {
        render_balance(&mut out, balance);
    }
    if let Some(stats) = report.stats_dashboard.as_ref().filter(|s| s.total_duties > 0) {
        render_stats(&mut out, stats);
    }
    if let Some(chart) = &report.chart_data {
        render_chart(&mut out, chart);
    }
    out
}

/// 渲染分配方案表
pub fn render_plans(plans: &[DistributionPlan]) -> String {
    if plans.is_empty() {
        return "لا توجد نتائج لعرضها.\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>12} | {:>14} | {:>14} | {:>16}",
        "عدد الأساتذة", "حراسات (كبيرة)", "حراسات (أخرى)", "نقاط العبء للفرد"
    );
    let _ = writeln!(out, "{}", RULE);
    for plan in plans {
        let _ = writeln!(
            out,
            "{:>12} | {:>14} | {:>14} | {:>16.2}",
            plan.count, plan.large_duties, plan.other_duties, plan.workload
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExamSlot, Hall, HallTier, ScheduleResult, SHORTAGE_MARKER};
    use crate::services::result_assembler::assemble;

    #[test]
    fn test_progress_bar_bounds() {
        assert!(render_progress(0).ends_with("  0%"));
        assert!(render_progress(250).ends_with("100%"));
        assert_eq!(render_progress(50).matches('█').count(), BAR_WIDTH / 2);
    }

    #[test]
    fn test_schedule_marks_shortage_and_incomplete() {
        let mut result = ScheduleResult::default();
        result.0.entry("2024-06-02".to_string()).or_default().insert(
            "08:00-10:00".to_string(),
            vec![ExamSlot {
                subject: "Math".to_string(),
                professor: "Dr. A".to_string(),
                level: Some("L1".to_string()),
                halls: vec![Hall::new("Amphi", HallTier::Medium)],
                guards: vec!["P1".to_string(), SHORTAGE_MARKER.to_string()],
                guards_incomplete: true,
                ..Default::default()
            }],
        );

        let text = render_schedule(&assemble(&result));
        assert!(text.contains("جدول امتحانات: L1"));
        assert!(text.contains("الأحد 2024-06-02"));
        assert!(text.contains(&format!("⚠ {}", SHORTAGE_MARKER)));
        assert!(text.contains("[حراسة ناقصة]"));
    }

    #[test]
    fn test_empty_schedule_message() {
        let text = render_schedule(&ScheduleView::default());
        assert!(text.contains(EMPTY_SCHEDULE_MESSAGE));
    }

    #[test]
    fn test_report_skips_empty_blocks() {
        let report = GenerationReport {
            schedule: ScheduleResult::default(),
            scheduling_report: Vec::new(),
            failures: Vec::new(),
            prof_report: Vec::new(),
            chart_data: Some(ChartData::default()),
            balance_report: Some(BalanceReport::default()),
            stats_dashboard: Some(StatsDashboard::default()),
        };
        assert!(render_report(&report).is_empty());
    }

    #[test]
    fn test_plans_table() {
        let text = render_plans(&[DistributionPlan {
            large_duties: 5,
            other_duties: 5,
            count: 1,
            workload: 15.0,
        }]);
        assert!(text.contains("15.00"));
        assert!(render_plans(&[]).contains("لا توجد نتائج"));
    }
}
