//! 业务能力层（Services）
//!
//! 每个服务只描述"我能做什么"，不关心调用顺序。

pub mod export_service;
pub mod fair_distribution;
pub mod result_assembler;
pub mod settings_sync;
pub mod text_renderer;

pub use export_service::{ExportKind, ExportService};
pub use fair_distribution::{autofill, distribute, DistributionInput, DistributionPlan};
pub use result_assembler::{assemble, ScheduleView};
pub use settings_sync::SettingsSynchronizer;
pub use text_renderer::LiveLogPrinter;
