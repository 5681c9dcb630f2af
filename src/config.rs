use crate::error::ConfigError;

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 排班服务器地址
    pub scheduler_base_url: String,
    /// 本地设置文件（JSON 或 TOML）
    pub settings_file: String,
    /// 导出文件存放目录
    pub output_dir: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
    /// 普通请求超时（秒），事件流不受此限制
    pub request_timeout_secs: u64,
    /// 先保存设置并等待完成，再提交任务
    pub sequenced_settings_save: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheduler_base_url: "http://127.0.0.1:5000".to_string(),
            settings_file: "settings.json".to_string(),
            output_dir: "exports".to_string(),
            verbose_logging: false,
            output_log_file: "generation_log.txt".to_string(),
            request_timeout_secs: 30,
            sequenced_settings_save: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            scheduler_base_url: std::env::var("SCHEDULER_BASE_URL").unwrap_or(default.scheduler_base_url),
            settings_file: std::env::var("SETTINGS_FILE").unwrap_or(default.settings_file),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.request_timeout_secs),
            sequenced_settings_save: std::env::var("SEQUENCED_SETTINGS_SAVE").ok().and_then(|v| v.parse().ok()).unwrap_or(default.sequenced_settings_save),
        }
    }

    /// 检查服务器地址，去掉结尾的 `/`
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        let url = self.scheduler_base_url.trim().trim_end_matches('/').to_string();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::BadBaseUrl(self.scheduler_base_url));
        }
        self.scheduler_base_url = url;
        Ok(self)
    }

    /// 拼接接口地址
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.scheduler_base_url, path.trim_start_matches('/'))
    }
}
