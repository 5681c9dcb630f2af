//! 远端能力接口
//!
//! 任务监控、设置同步、导出各自只依赖需要的那一个接口，
//! 测试时用内存实现替换 HTTP 客户端。

use crate::error::{AppResult, JobError};
use crate::infrastructure::EventStream;
use crate::models::{Catalog, GenerationSettings, ScheduleResult};
use futures::future::BoxFuture;

/// 排班任务接口
pub trait JobBackend: Send + Sync {
    /// 提交任务，成功时返回服务端的提示信息
    fn submit_job<'a>(
        &'a self,
        settings: &'a GenerationSettings,
    ) -> BoxFuture<'a, Result<String, JobError>>;

    /// 打开事件流连接
    fn open_event_stream(&self) -> BoxFuture<'_, Result<EventStream, JobError>>;
}

/// 设置存储接口
pub trait SettingsStore: Send + Sync {
    /// 读取已保存的设置，服务端返回空对象时为 `None`
    fn fetch_settings(&self) -> BoxFuture<'_, AppResult<Option<GenerationSettings>>>;

    /// 保存设置，返回服务端的提示信息
    fn save_settings<'a>(&'a self, settings: &'a GenerationSettings)
        -> BoxFuture<'a, AppResult<String>>;
}

/// 导出接口：只负责取回文件字节
pub trait ExportBackend: Send + Sync {
    fn export_document<'a>(
        &'a self,
        endpoint: &'static str,
        schedule: &'a ScheduleResult,
    ) -> BoxFuture<'a, AppResult<Vec<u8>>>;
}

/// 实体目录接口
pub trait CatalogSource: Send + Sync {
    fn fetch_catalog(&self) -> BoxFuture<'_, AppResult<Catalog>>;
}
