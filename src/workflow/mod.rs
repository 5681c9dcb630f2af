//! 流程层（Workflow Layer）
//!
//! 定义"一次排班生成"的完整流程：提交 → 接收事件 → 终态。
//!
//! - `generation_job` - 任务状态机，纯同步，可单独测试
//! - `job_monitor` - 持有连接并驱动状态机

pub mod generation_job;
pub mod job_monitor;

pub use generation_job::{GenerationJob, JobOutcome, JobSnapshot, JobStatus};
pub use job_monitor::JobMonitor;
