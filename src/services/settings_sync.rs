//! 设置同步服务 - 业务能力层
//!
//! 只负责把设置对象原样读写到服务端，不关心任务流程

use crate::clients::SettingsStore;
use crate::error::AppResult;
use crate::models::GenerationSettings;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// 设置同步服务
pub struct SettingsSynchronizer {
    store: Arc<dyn SettingsStore>,
}

impl SettingsSynchronizer {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self { store }
    }

    /// 读取已保存的设置
    ///
    /// # 返回
    /// 服务端没有保存过设置时返回 None
    pub async fn load(&self) -> AppResult<Option<GenerationSettings>> {
        let settings = self.store.fetch_settings().await?;
        match &settings {
            Some(s) => info!("✓ 已读取服务端设置: {} 个考试日", s.exam_schedule.len()),
            None => info!("服务端尚未保存任何设置"),
        }
        Ok(settings)
    }

    /// 保存设置并等待完成
    pub async fn save(&self, settings: &GenerationSettings) -> AppResult<String> {
        let message = self.store.save_settings(settings).await?;
        info!("💾 设置已保存: {}", message);
        Ok(message)
    }

    /// 后台保存，立即返回
    ///
    /// 失败只记录警告，不影响调用方
    pub fn save_in_background(&self, settings: GenerationSettings) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);
        tokio::spawn(async move {
            match store.save_settings(&settings).await {
                Ok(message) => info!("💾 设置已在后台保存: {}", message),
                Err(e) => warn!("⚠️ 后台保存设置失败: {}", e),
            }
        })
    }
}
