//! 导出服务 - 业务能力层
//!
//! 向服务端请求导出文件并写入输出目录，不解析文件内容

use crate::clients::ExportBackend;
use crate::error::{AppError, AppResult, ValidationError};
use crate::models::ScheduleResult;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::fs;
use tracing::info;

/// 导出类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ExportKind {
    /// 按考试的表格
    ExamsSheet,
    /// 按教师的表格
    ProfessorsSheet,
    /// 按考试的文档
    ExamsDocument,
    /// 按教师的文档
    ProfessorsDocument,
    /// 匿名的教师文档
    AnonymousDocument,
}

impl ExportKind {
    pub const ALL: [ExportKind; 5] = [
        ExportKind::ExamsSheet,
        ExportKind::ProfessorsSheet,
        ExportKind::ExamsDocument,
        ExportKind::ProfessorsDocument,
        ExportKind::AnonymousDocument,
    ];

    pub fn endpoint(self) -> &'static str {
        match self {
            ExportKind::ExamsSheet => "api/export-schedule",
            ExportKind::ProfessorsSheet => "api/export-prof-schedules",
            ExportKind::ExamsDocument => "api/export/word/all-exams",
            ExportKind::ProfessorsDocument => "api/export/word/all-profs",
            ExportKind::AnonymousDocument => "api/export/word/all-profs-anonymous",
        }
    }

    pub fn file_name(self) -> &'static str {
        match self {
            ExportKind::ExamsSheet => "exam_schedules.xlsx",
            ExportKind::ProfessorsSheet => "guard_schedules_by_professor.xlsx",
            ExportKind::ExamsDocument => "exam_schedules.docx",
            ExportKind::ProfessorsDocument => "guard_schedules_by_professor.docx",
            ExportKind::AnonymousDocument => "guard_schedules_anonymous.docx",
        }
    }
}

/// 导出服务
pub struct ExportService {
    backend: Arc<dyn ExportBackend>,
    output_dir: PathBuf,
}

impl ExportService {
    pub fn new(backend: Arc<dyn ExportBackend>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            output_dir: output_dir.into(),
        }
    }

    /// 导出一个文件
    ///
    /// # 参数
    /// - `kind`: 导出类型
    /// - `schedule`: 最近一次成功生成的排班结果
    ///
    /// # 返回
    /// 写入的文件路径
    pub async fn export(
        &self,
        kind: ExportKind,
        schedule: Option<&ScheduleResult>,
    ) -> AppResult<PathBuf> {
        let schedule = schedule.ok_or(ValidationError::NoScheduleToExport)?;

        let bytes = self.backend.export_document(kind.endpoint(), schedule).await?;

        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| AppError::file_write_failed(self.output_dir.display().to_string(), e))?;
        let path = self.output_dir.join(kind.file_name());
        fs::write(&path, &bytes)
            .await
            .map_err(|e| AppError::file_write_failed(path.display().to_string(), e))?;

        info!("📄 已导出 {} ({} 字节)", path.display(), bytes.len());
        Ok(path)
    }
}
