use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 输入校验错误（本地，不产生任何网络请求）
    #[error("校验错误: {0}")]
    Validation(#[from] ValidationError),
    /// 生成任务错误
    #[error("任务错误: {0}")]
    Job(#[from] JobError),
    /// API 调用错误
    #[error("API错误: {0}")]
    Api(#[from] ApiError),
    /// 文件操作错误
    #[error("文件错误: {0}")]
    File(#[from] FileError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 本地预检错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// 考试日程为空
    #[error("请先设置考试日程")]
    EmptyExamSchedule,
    /// 时间段格式错误
    #[error("日期 {date} 的时间段格式错误: '{time}' (应为 HH:MM-HH:MM)")]
    BadTimeRange { date: String, time: String },
    /// 数值超出允许范围
    #[error("字段 {field} 的值 {value} 超出范围: {expected}")]
    OutOfRange {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
    /// 字段取值不被识别
    #[error("字段 {field} 的取值 '{value}' 无法识别")]
    UnknownValue { field: &'static str, value: String },
    /// 教师人数必须大于零
    #[error("教师人数必须大于零")]
    NoWorkers,
    /// 大考场权重必须为正数
    #[error("大考场权重必须为有限正数 (当前: {0})")]
    BadWeight(f64),
    /// 监考单位总数超出计数范围
    #[error("监考单位总数过大，请检查各类考场的监考人数设置")]
    TooManyUnits,
    /// 教师搭档配置错误
    #[error("教师搭档无效: {0}")]
    BadPartnership(String),
    /// 尚无可导出的排班结果
    #[error("请先生成排班表再导出")]
    NoScheduleToExport,
}

/// 生成任务在协议层面的失败
///
/// 全部为当前任务的终止错误，不会自动重试
#[derive(Debug, Clone, PartialEq, Error)]
pub enum JobError {
    /// 服务端拒绝了任务提交请求
    #[error("服务器拒绝启动排班任务: {0}")]
    SubmissionRejected(String),
    /// 事件流连接中断或无法建立
    #[error("与服务器的连接已断开: {0}")]
    Transport(String),
    /// 终止事件的负载无法解析
    #[error("无法解析服务器的最终响应: {0}")]
    MalformedPayload(String),
    /// 终止事件没有携带负载
    #[error("任务已结束，但未收到任何数据")]
    EmptyTerminalPayload,
    /// 远端计算本身失败
    #[error("排班生成失败: {0}")]
    RemoteFailure(String),
}

/// API 调用错误
#[derive(Debug, Error)]
pub enum ApiError {
    /// 网络请求失败
    #[error("API请求失败 ({endpoint}): {source}")]
    RequestFailed {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    /// API 返回错误状态码
    #[error("API返回错误响应 ({endpoint}): status={status}, body={body}")]
    BadStatus {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// JSON 解析失败
    #[error("JSON解析失败 ({endpoint}): {source}")]
    JsonParseFailed {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    /// 导出接口失败
    #[error("导出失败 ({endpoint}): status={status}")]
    ExportFailed { endpoint: String, status: u16 },
}

/// 文件操作错误
#[derive(Debug, Error)]
pub enum FileError {
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 服务器地址无效
    #[error("服务器地址无效: {0}")]
    BadBaseUrl(String),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建API请求失败错误
    pub fn api_request_failed(endpoint: impl Into<String>, source: reqwest::Error) -> Self {
        AppError::Api(ApiError::RequestFailed {
            endpoint: endpoint.into(),
            source,
        })
    }

    /// 创建文件写入错误
    pub fn file_write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        AppError::File(FileError::WriteFailed {
            path: path.into(),
            source,
        })
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_converts_into_app_error() {
        let err: AppError = ValidationError::EmptyExamSchedule.into();
        assert!(matches!(
            err,
            AppError::Validation(ValidationError::EmptyExamSchedule)
        ));
        assert!(err.to_string().contains("考试日程"));
    }

    #[test]
    fn test_remote_failure_keeps_message_verbatim() {
        let err = JobError::RemoteFailure("لا توجد أيام امتحانات محددة.".to_string());
        assert!(err.to_string().contains("لا توجد أيام امتحانات محددة."));
    }
}
