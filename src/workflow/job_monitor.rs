//! 任务监控 - 流程层
//!
//! 负责提交任务、持有唯一的事件流连接，并把事件逐条喂给状态机。

use crate::clients::JobBackend;
use crate::error::{AppResult, JobError};
use crate::infrastructure::StreamEvent;
use crate::models::{GenerationReport, GenerationSettings};
use crate::workflow::generation_job::{GenerationJob, JobOutcome, JobSnapshot, JobStatus};
use futures::StreamExt;
use std::sync::Arc;
use tracing::{debug, info};

/// 流结束但没有收到终止事件时的原因
const STREAM_ENDED: &str = "事件流在任务完成前结束";

/// 任务监控器
///
/// 同一时刻最多只有一个任务、一条连接
pub struct JobMonitor {
    backend: Arc<dyn JobBackend>,
    job: GenerationJob,
}

impl JobMonitor {
    /// 创建新的监控器
    pub fn new(backend: Arc<dyn JobBackend>) -> Self {
        Self {
            backend,
            job: GenerationJob::new(),
        }
    }

    pub fn snapshot(&self) -> JobSnapshot {
        self.job.snapshot()
    }

    /// 提交排班任务
    ///
    /// 本地校验失败时不发出任何请求。否则先关闭旧连接、重置进度和日志，
    /// 再同时发出提交请求和事件流请求。提交被拒绝时不再等待事件流建立。
    ///
    /// # 参数
    /// - `settings`: 完整的排班设置
    pub async fn submit(&mut self, settings: &GenerationSettings) -> AppResult<()> {
        settings.validate_for_submission()?;

        self.job.begin();
        info!("🚀 提交排班任务: {} 个考试日", settings.exam_schedule.len());

        // 任一请求失败即返回，另一个尚未完成的请求随之取消
        let joined = tokio::try_join!(
            self.backend.submit_job(settings),
            self.backend.open_event_stream()
        );

        match joined {
            Ok((_, stream)) => {
                debug!("事件流已连接");
                self.job.attach(stream);
                Ok(())
            }
            Err(e) => {
                self.job.fail(e.clone());
                Err(e.into())
            }
        }
    }

    /// 读取并应用下一条事件
    ///
    /// # 返回
    /// 没有活动连接时返回 None，否则返回应用后的状态
    pub async fn next_event(&mut self) -> Option<JobStatus> {
        let connection = self.job.connection_mut()?;
        let event = connection
            .next()
            .await
            .unwrap_or_else(|| StreamEvent::TransportError(STREAM_ENDED.to_string()));
        self.job.apply(event);
        Some(self.job.status())
    }

    /// 一直消费事件直到任务结束
    ///
    /// 每应用一条事件调用一次 `on_update`，供渲染器增量输出。
    pub async fn run_to_completion<F>(&mut self, mut on_update: F) -> Result<GenerationReport, JobError>
    where
        F: FnMut(&GenerationJob),
    {
        while self.next_event().await.is_some() {
            on_update(&self.job);
        }

        match self.job.outcome() {
            Some(JobOutcome::Completed(report)) => {
                info!("✅ 排班任务完成");
                Ok(report.as_ref().clone())
            }
            Some(JobOutcome::Failed(e)) => Err(e.clone()),
            None => Err(JobError::Transport(STREAM_ENDED.to_string())),
        }
    }
}
