//! 生成任务状态机 - 流程层
//!
//! ```text
//! Idle ──submit──▶ Submitting ──Progress/LogLine──▶ Streaming
//!                      │                               │
//!                      ├──Terminal─────────────────────┼──▶ Done / Failed
//!                      └──TransportError───────────────┴──▶ Failed
//! Done | Failed ──submit──▶ Submitting
//! ```
//!
//! 每个事件只被消费一次；进入终态后连接立即关闭，之后的事件全部丢弃。

use crate::error::JobError;
use crate::infrastructure::{EventStream, StreamEvent};
use crate::models::{GenerationReport, TerminalPayload};
use tracing::{debug, warn};

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Idle,
    Submitting,
    Streaming,
    Done,
    Failed,
}

impl JobStatus {
    /// 是否还在接收事件
    pub fn is_active(self) -> bool {
        matches!(self, JobStatus::Submitting | JobStatus::Streaming)
    }
}

/// 任务结果
#[derive(Debug, Clone, PartialEq)]
pub enum JobOutcome {
    Completed(Box<GenerationReport>),
    Failed(JobError),
}

/// 给渲染器用的只读快照
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    pub status: JobStatus,
    pub progress_percent: u8,
    pub log_lines: Vec<String>,
    pub has_live_connection: bool,
    pub outcome: Option<JobOutcome>,
}

/// 一次排班生成任务
pub struct GenerationJob {
    status: JobStatus,
    progress_percent: u8,
    log_lines: Vec<String>,
    connection: Option<EventStream>,
    outcome: Option<JobOutcome>,
}

impl GenerationJob {
    /// 创建空闲任务
    pub fn new() -> Self {
        Self {
            status: JobStatus::Idle,
            progress_percent: 0,
            log_lines: Vec::new(),
            connection: None,
            outcome: None,
        }
    }

    pub fn status(&self) -> JobStatus {
        self.status
    }

    pub fn progress_percent(&self) -> u8 {
        self.progress_percent
    }

    pub fn log_lines(&self) -> &[String] {
        &self.log_lines
    }

    pub fn outcome(&self) -> Option<&JobOutcome> {
        self.outcome.as_ref()
    }

    pub fn has_live_connection(&self) -> bool {
        self.connection.is_some()
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            status: self.status,
            progress_percent: self.progress_percent,
            log_lines: self.log_lines.clone(),
            has_live_connection: self.has_live_connection(),
            outcome: self.outcome.clone(),
        }
    }

    /// 开始新一轮提交：先关闭旧连接，再清空进度、日志和结果
    pub fn begin(&mut self) {
        self.close_connection();
        self.status = JobStatus::Submitting;
        self.progress_percent = 0;
        self.log_lines.clear();
        self.outcome = None;
    }

    /// 挂上新打开的事件流
    ///
    /// 任务已不在活动状态时直接丢弃该连接
    pub fn attach(&mut self, stream: EventStream) {
        if !self.status.is_active() {
            debug!("任务已结束，丢弃新连接");
            return;
        }
        self.close_connection();
        self.connection = Some(stream);
    }

    pub(crate) fn connection_mut(&mut self) -> Option<&mut EventStream> {
        self.connection.as_mut()
    }

    /// 应用一条事件
    ///
    /// # 返回
    /// 本次事件使任务进入终态时返回 true
    pub fn apply(&mut self, event: StreamEvent) -> bool {
        if !self.status.is_active() {
            debug!("任务状态为 {:?}，丢弃事件: {:?}", self.status, event);
            return false;
        }

        match event {
            StreamEvent::Progress(percent) => {
                self.progress_percent = percent.min(100);
                self.status = JobStatus::Streaming;
                false
            }
            StreamEvent::LogLine(text) => {
                self.log_lines.push(text);
                self.status = JobStatus::Streaming;
                false
            }
            StreamEvent::Terminal(payload) => {
                self.close_connection();
                match resolve_terminal(payload) {
                    Ok(report) => {
                        self.status = JobStatus::Done;
                        self.outcome = Some(JobOutcome::Completed(Box::new(report)));
                    }
                    Err(e) => {
                        warn!("⚠️ {}", e);
                        self.status = JobStatus::Failed;
                        self.outcome = Some(JobOutcome::Failed(e));
                    }
                }
                true
            }
            StreamEvent::TransportError(reason) => {
                self.fail(JobError::Transport(reason));
                true
            }
        }
    }

    /// 直接把任务置为失败并关闭连接
    ///
    /// 传输错误会在日志末尾追加一条诊断
    pub fn fail(&mut self, error: JobError) {
        self.close_connection();
        if let JobError::Transport(_) = &error {
            self.log_lines.push(error.to_string());
        }
        warn!("⚠️ {}", error);
        self.status = JobStatus::Failed;
        self.outcome = Some(JobOutcome::Failed(error));
    }

    fn close_connection(&mut self) {
        if self.connection.take().is_some() {
            debug!("已关闭事件流连接");
        }
    }
}

impl Default for GenerationJob {
    fn default() -> Self {
        Self::new()
    }
}

fn resolve_terminal(payload: Option<String>) -> Result<GenerationReport, JobError> {
    let raw = payload.ok_or(JobError::EmptyTerminalPayload)?;
    TerminalPayload::parse(&raw)?.into_report()
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream::{self, StreamExt};

    fn live_job() -> GenerationJob {
        let mut job = GenerationJob::new();
        job.begin();
        job.attach(stream::pending::<StreamEvent>().boxed());
        job
    }

    #[test]
    fn test_progress_and_log_are_separate() {
        let mut job = live_job();
        assert!(!job.apply(StreamEvent::LogLine("first".to_string())));
        assert!(!job.apply(StreamEvent::Progress(40)));
        assert!(!job.apply(StreamEvent::LogLine("second".to_string())));

        assert_eq!(job.status(), JobStatus::Streaming);
        assert_eq!(job.progress_percent(), 40);
        assert_eq!(job.log_lines(), ["first".to_string(), "second".to_string()]);
    }

    #[test]
    fn test_terminal_while_submitting() {
        let mut job = live_job();
        assert_eq!(job.status(), JobStatus::Submitting);
        assert!(job.apply(StreamEvent::Terminal(Some(
            r#"{"success": true, "schedule": {}}"#.to_string()
        ))));
        assert_eq!(job.status(), JobStatus::Done);
        assert!(!job.has_live_connection());
    }

    #[test]
    fn test_terminal_failures() {
        let mut job = live_job();
        job.apply(StreamEvent::Terminal(None));
        assert_eq!(
            job.outcome(),
            Some(&JobOutcome::Failed(JobError::EmptyTerminalPayload))
        );

        let mut job = live_job();
        job.apply(StreamEvent::Terminal(Some("{oops".to_string())));
        assert!(matches!(
            job.outcome(),
            Some(JobOutcome::Failed(JobError::MalformedPayload(_)))
        ));
    }

    #[test]
    fn test_transport_error_appends_diagnostic() {
        let mut job = live_job();
        job.apply(StreamEvent::LogLine("working".to_string()));
        assert!(job.apply(StreamEvent::TransportError("reset".to_string())));

        assert_eq!(job.status(), JobStatus::Failed);
        assert!(!job.has_live_connection());
        assert_eq!(job.log_lines().len(), 2);
        assert!(job.log_lines()[1].contains("reset"));
    }

    #[test]
    fn test_events_after_terminal_are_discarded() {
        let mut job = live_job();
        job.apply(StreamEvent::TransportError("gone".to_string()));
        let before = job.snapshot();

        assert!(!job.apply(StreamEvent::LogLine("late".to_string())));
        assert!(!job.apply(StreamEvent::Progress(99)));
        assert_eq!(job.snapshot(), before);
    }

    #[test]
    fn test_begin_resets_previous_run() {
        let mut job = live_job();
        job.apply(StreamEvent::Progress(70));
        job.apply(StreamEvent::LogLine("old".to_string()));

        job.begin();
        assert_eq!(job.status(), JobStatus::Submitting);
        assert_eq!(job.progress_percent(), 0);
        assert!(job.log_lines().is_empty());
        assert!(!job.has_live_connection());
    }
}
