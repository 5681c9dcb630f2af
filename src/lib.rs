//! # Guard Schedule Client
//!
//! 监考排班任务的客户端：提交任务、接收事件流、渲染结果、导出文件
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 事件流解码，只暴露 `StreamEvent`
//! - `clients/` - 排班服务器的 HTTP 客户端及其接口
//!
//! ### ② 业务能力层（Services）
//! - `ResultAssembler` - 排班结果 → 网格
//! - `FairDistribution` - 公平分配计算器
//! - `SettingsSynchronizer` - 设置读写
//! - `ExportService` - 导出文件
//! - `TextRenderer` - 终端文本输出
//!
//! ### ③ 流程层（Workflow）
//! - `GenerationJob` - 任务状态机
//! - `JobMonitor` - 提交任务并驱动状态机
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/session` - 当前任务与最近结果
//! - `orchestrator/app` - 子命令入口

pub mod cli;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{JobBackend, SchedulerClient};
pub use config::Config;
pub use error::{AppError, AppResult, JobError, ValidationError};
pub use infrastructure::StreamEvent;
pub use models::{GenerationSettings, ScheduleResult};
pub use orchestrator::{App, Session};
pub use services::{assemble, distribute, DistributionPlan};
pub use workflow::{GenerationJob, JobMonitor, JobStatus};
