//! 会话 - 编排层
//!
//! 持有当前任务、最近一次成功的排班结果和暂存的教师搭档，
//! 生命周期与一次程序运行相同。

use crate::error::{AppResult, ValidationError};
use crate::models::{GenerationReport, GenerationSettings, ScheduleResult};
use crate::services::{assemble, ScheduleView};
use crate::workflow::{GenerationJob, JobMonitor};
use tracing::info;

/// 会话上下文
pub struct Session {
    monitor: JobMonitor,
    last_schedule: Option<ScheduleResult>,
    last_report: Option<GenerationReport>,
    partnerships: Vec<[String; 2]>,
}

impl Session {
    pub fn new(monitor: JobMonitor) -> Self {
        Self {
            monitor,
            last_schedule: None,
            last_report: None,
            partnerships: Vec::new(),
        }
    }

    pub fn monitor(&self) -> &JobMonitor {
        &self.monitor
    }

    pub fn last_schedule(&self) -> Option<&ScheduleResult> {
        self.last_schedule.as_ref()
    }

    pub fn last_report(&self) -> Option<&GenerationReport> {
        self.last_report.as_ref()
    }

    pub fn partnerships(&self) -> &[[String; 2]] {
        &self.partnerships
    }

    /// 用设置文件中的搭档初始化暂存列表
    pub fn load_partnerships(&mut self, settings: &GenerationSettings) -> Result<(), ValidationError> {
        self.partnerships.clear();
        for [first, second] in &settings.professor_partnerships {
            self.add_partnership(first, second)?;
        }
        Ok(())
    }

    /// 添加一对搭档
    ///
    /// 同一个人、空名字或重复（不分先后）的搭档会被拒绝
    pub fn add_partnership(&mut self, first: &str, second: &str) -> Result<(), ValidationError> {
        let (first, second) = (first.trim(), second.trim());
        if first.is_empty() || second.is_empty() {
            return Err(ValidationError::BadPartnership("教师姓名不能为空".to_string()));
        }
        if first == second {
            return Err(ValidationError::BadPartnership(format!(
                "不能与自己搭档: {}",
                first
            )));
        }
        let exists = self.partnerships.iter().any(|[a, b]| {
            (a == first && b == second) || (a == second && b == first)
        });
        if exists {
            return Err(ValidationError::BadPartnership(format!(
                "搭档已存在: {} / {}",
                first, second
            )));
        }

        self.partnerships
            .push([first.to_string(), second.to_string()]);
        Ok(())
    }

    /// 按下标移除搭档
    pub fn remove_partnership(&mut self, index: usize) -> Option<[String; 2]> {
        (index < self.partnerships.len()).then(|| self.partnerships.remove(index))
    }

    /// 把暂存的搭档写入将要提交的设置
    pub fn prepare(&self, mut settings: GenerationSettings) -> GenerationSettings {
        settings.professor_partnerships = self.partnerships.clone();
        settings
    }

    /// 提交并等待任务结束
    ///
    /// 成功时记录排班结果和报告并返回组装好的网格；
    /// 失败时保留上一次的成功结果。
    pub async fn generate<F>(&mut self, settings: GenerationSettings, on_update: F) -> AppResult<ScheduleView>
    where
        F: FnMut(&GenerationJob),
    {
        let settings = self.prepare(settings);
        self.monitor.submit(&settings).await?;
        let report = self.monitor.run_to_completion(on_update).await?;

        let view = assemble(&report.schedule);
        info!(
            "📊 排班结果: {} 个年级, {} 个考试日, 缺员 {} 位",
            view.levels.len(),
            view.columns.len(),
            report.schedule.total_missing_guards()
        );
        self.last_schedule = Some(report.schedule.clone());
        self.last_report = Some(report);
        Ok(view)
    }
}
