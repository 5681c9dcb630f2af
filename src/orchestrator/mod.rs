//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行）
//! - 持有服务器客户端和各个服务
//! - 每个子命令一个方法
//!
//! ### `session` - 会话
//! - 持有当前任务和唯一的事件流连接
//! - 记录最近一次成功的排班结果，供导出使用
//! - 暂存教师搭档，提交时写入设置
//!
//! ## 层次关系
//!
//! ```text
//! app (子命令)
//!     ↓
//! session (当前任务 + 最近结果)
//!     ↓
//! workflow::JobMonitor (一次生成任务)
//!     ↓
//! services (能力层：assemble / distribute / export / settings)
//!     ↓
//! clients + infrastructure (HTTP 与事件流)
//! ```

pub mod app;
pub mod session;

pub use app::{print_distribution, App};
pub use session::Session;
