//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：校验配置、初始化日志文件、创建服务器客户端
//! 2. **命令执行**：每个子命令对应一个方法
//! 3. **输出**：把渲染好的文本打印到标准输出，运行日志写入文件
//!
//! 不做任何排班计算，只做调度。

use crate::clients::{CatalogSource, SchedulerClient};
use crate::config::Config;
use crate::models::{self, Catalog, GenerationSettings, ScheduleResult};
use crate::orchestrator::session::Session;
use crate::services::text_renderer::{render_plans, render_report, render_schedule};
use crate::services::{
    autofill, distribute, DistributionInput, ExportKind, ExportService, LiveLogPrinter,
    SettingsSynchronizer,
};
use crate::utils::logging::{
    append_lines, init_log_file, log_startup, print_job_summary, truncate_text,
};
use crate::workflow::JobMonitor;
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    client: Arc<SchedulerClient>,
    session: Session,
    settings_sync: SettingsSynchronizer,
    exporter: ExportService,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        let config = config.validated()?;

        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        let client = Arc::new(SchedulerClient::new(&config)?);
        let session = Session::new(JobMonitor::new(client.clone()));
        let settings_sync = SettingsSynchronizer::new(client.clone());
        let exporter = ExportService::new(client.clone(), &config.output_dir);

        Ok(Self {
            config,
            client,
            session,
            settings_sync,
            exporter,
        })
    }

    /// 生成排班表
    ///
    /// # 参数
    /// - `settings_path`: 设置文件
    /// - `exports`: 成功后要导出的文件类型
    /// - `save_schedule`: 成功后把排班结果另存为 JSON
    pub async fn generate(
        &mut self,
        settings_path: &Path,
        exports: &[ExportKind],
        save_schedule: Option<&Path>,
    ) -> Result<()> {
        let settings = models::load_settings(settings_path).await?;
        self.session.load_partnerships(&settings)?;
        let staged = self.session.prepare(settings.clone());

        let background_save = if self.config.sequenced_settings_save {
            self.settings_sync
                .save(&staged)
                .await
                .context("提交前保存设置失败")?;
            None
        } else {
            Some(self.settings_sync.save_in_background(staged))
        };

        let mut printer = LiveLogPrinter::new();
        let outcome = self
            .session
            .generate(settings, |job| {
                for line in printer.render_update(job) {
                    debug!("{}", truncate_text(&line, 120));
                    println!("{}", line);
                }
            })
            .await;

        let snapshot = self.session.monitor().snapshot();
        append_lines(&self.config.output_log_file, &snapshot.log_lines)?;
        print_job_summary(&snapshot, &self.config.output_log_file);

        if let Some(handle) = background_save {
            if let Err(e) = handle.await {
                warn!("⚠️ 后台保存任务异常结束: {}", e);
            }
        }

        let view = outcome?;
        println!("{}", render_schedule(&view));
        if let Some(report) = self.session.last_report() {
            print!("{}", render_report(report));
        }

        if let Some(path) = save_schedule {
            if let Some(schedule) = self.session.last_schedule() {
                models::save_json(path, schedule).await?;
                info!("💾 排班结果已保存至: {}", path.display());
            }
        }

        for kind in exports {
            if let Err(e) = self.exporter.export(*kind, self.session.last_schedule()).await {
                error!("❌ 导出 {:?} 失败: {}", kind, e);
            }
        }
        Ok(())
    }

    /// 读取服务端设置并写入文件
    pub async fn pull_settings(&self, out: &Path) -> Result<()> {
        match self.settings_sync.load().await? {
            Some(settings) => {
                models::save_json(out, &settings).await?;
                info!("✓ 设置已写入: {}", out.display());
            }
            None => warn!("⚠️ 服务端没有已保存的设置，未写入文件"),
        }
        Ok(())
    }

    /// 把设置文件保存到服务端
    pub async fn push_settings(&self, path: &Path) -> Result<()> {
        let settings = models::load_settings(path).await?;
        let message = self.settings_sync.save(&settings).await?;
        println!("{}", message);
        Ok(())
    }

    /// 根据设置和实体目录自动推算并计算分配方案
    ///
    /// # 参数
    /// - `settings_path`: 设置文件
    /// - `catalog_path`: 离线实体目录；为空时从服务端获取
    /// - `large_weight`: 覆盖设置中的大考场权重
    pub async fn autofill(
        &self,
        settings_path: &Path,
        catalog_path: Option<&Path>,
        large_weight: Option<f64>,
    ) -> Result<()> {
        let settings: GenerationSettings = models::load_settings(settings_path).await?;
        let catalog: Catalog = match catalog_path {
            Some(path) => models::load_catalog(path).await?,
            None => self.client.fetch_catalog().await?,
        };

        let mut input = autofill(&catalog, &settings)?;
        if let Some(weight) = large_weight {
            input.large_weight = weight;
        }
        info!(
            "🧮 自动填充: {} 名教师, 大考场 {} 单位, 其它 {} 单位",
            input.total_workers, input.large_units, input.other_units
        );
        print_distribution(&input)
    }

    /// 导出之前保存的排班结果
    pub async fn export_saved(&self, schedule_path: &Path, kinds: &[ExportKind]) -> Result<()> {
        let schedule: ScheduleResult = models::load_schedule(schedule_path).await?;
        for kind in kinds {
            let path = self
                .exporter
                .export(*kind, Some(&schedule))
                .await
                .with_context(|| format!("导出 {:?} 失败", kind))?;
            println!("{}", path.display());
        }
        Ok(())
    }
}

/// 计算并打印分配方案（不需要服务器）
pub fn print_distribution(input: &DistributionInput) -> Result<()> {
    let plans = distribute(input)?;
    print!("{}", render_plans(&plans));
    Ok(())
}
