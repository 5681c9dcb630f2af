use crate::models::catalog::Catalog;
use crate::models::schedule::ScheduleResult;
use crate::models::settings::GenerationSettings;
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;

/// 按扩展名解析 JSON 或 TOML 文件
async fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        anyhow::bail!("文件不存在: {}", path.display());
    }

    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取文件: {}", path.display()))?;

    let is_toml = path.extension().and_then(|s| s.to_str()) == Some("toml");
    let value = if is_toml {
        toml::from_str(&content).with_context(|| format!("无法解析TOML文件: {}", path.display()))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("无法解析JSON文件: {}", path.display()))?
    };

    Ok(value)
}

/// 加载并校验排班设置文件
pub async fn load_settings(path: &Path) -> Result<GenerationSettings> {
    let settings: GenerationSettings = load_file(path).await?;
    settings
        .validate()
        .with_context(|| format!("设置文件校验失败: {}", path.display()))?;

    tracing::info!(
        "已加载设置: 考试日 [{}], 策略 {:?}",
        settings.exam_dates().join(", "),
        settings.balancing_strategy
    );
    Ok(settings)
}

/// 加载之前保存的排班结果（用于单独导出）
pub async fn load_schedule(path: &Path) -> Result<ScheduleResult> {
    load_file(path).await
}

/// 加载离线的实体目录
pub async fn load_catalog(path: &Path) -> Result<Catalog> {
    load_file(path).await
}

/// 保存为格式化 JSON
pub async fn save_json<T: serde::Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("无法创建目录: {}", parent.display()))?;
        }
    }
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)
        .await
        .with_context(|| format!("无法写入文件: {}", path.display()))?;
    Ok(())
}
