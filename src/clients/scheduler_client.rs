/// 排班服务器 API 客户端
///
/// 封装所有与排班服务器相关的 HTTP 调用
use crate::clients::backend::{CatalogSource, ExportBackend, JobBackend, SettingsStore};
use crate::config::Config;
use crate::error::{ApiError, AppError, AppResult, JobError};
use crate::infrastructure::{decode_event_stream, EventStream};
use crate::models::{
    Catalog, GenerationSettings, HallRecord, ProfessorRecord, ScheduleResult, SubjectRecord,
};
use futures::future::BoxFuture;
use futures::FutureExt;
use reqwest::{header, Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::time::Duration;
use tracing::{debug, info};

const SUBMIT_ENDPOINT: &str = "api/generate-guard-schedule";
const STREAM_ENDPOINT: &str = "stream-logs";
const SETTINGS_ENDPOINT: &str = "api/settings";

/// 服务端的简单应答 `{success, message}`
#[derive(Debug, Default, Deserialize)]
struct AckResponse {
    #[serde(default)]
    message: Option<String>,
}

/// 排班服务器客户端
pub struct SchedulerClient {
    config: Config,
    /// 普通请求，带超时
    http: Client,
    /// 事件流请求，不设总超时
    stream_http: Client,
}

impl SchedulerClient {
    /// 创建新的客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed(&config.scheduler_base_url, e))?;
        let stream_http = Client::builder()
            .connect_timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::api_request_failed(&config.scheduler_base_url, e))?;

        Ok(Self {
            config: config.clone(),
            http,
            stream_http,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = self.config.endpoint(path);
        debug!("GET {}", url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(&url, e))?;
        let body = checked_text(&url, response).await?;
        serde_json::from_str(&body).map_err(|source| {
            AppError::Api(ApiError::JsonParseFailed {
                endpoint: url.clone(),
                source,
            })
        })
    }
}

/// 读取响应体，非 2xx 时返回 `BadStatus`
async fn checked_text(url: &str, response: Response) -> AppResult<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| AppError::api_request_failed(url, e))?;
    if !status.is_success() {
        return Err(AppError::Api(ApiError::BadStatus {
            endpoint: url.to_string(),
            status: status.as_u16(),
            body,
        }));
    }
    Ok(body)
}

fn ack_message(body: &str) -> String {
    serde_json::from_str::<AckResponse>(body)
        .ok()
        .and_then(|ack| ack.message)
        .unwrap_or_default()
}

impl JobBackend for SchedulerClient {
    fn submit_job<'a>(
        &'a self,
        settings: &'a GenerationSettings,
    ) -> BoxFuture<'a, Result<String, JobError>> {
        async move {
            let url = self.config.endpoint(SUBMIT_ENDPOINT);
            debug!("POST {}", url);
            let response = self
                .http
                .post(&url)
                .json(settings)
                .send()
                .await
                .map_err(|e| JobError::SubmissionRejected(e.to_string()))?;

            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            if !status.is_success() {
                return Err(JobError::SubmissionRejected(format!(
                    "HTTP {}: {}",
                    status.as_u16(),
                    body
                )));
            }

            let message = ack_message(&body);
            info!("✓ 排班任务已提交: {}", message);
            Ok(message)
        }
        .boxed()
    }

    fn open_event_stream(&self) -> BoxFuture<'_, Result<EventStream, JobError>> {
        async move {
            let url = self.config.endpoint(STREAM_ENDPOINT);
            debug!("GET {} (event-stream)", url);
            let response = self
                .stream_http
                .get(&url)
                .header(header::ACCEPT, "text/event-stream")
                .send()
                .await
                .map_err(|e| JobError::Transport(e.to_string()))?;

            if !response.status().is_success() {
                return Err(JobError::Transport(format!(
                    "HTTP {}",
                    response.status().as_u16()
                )));
            }

            Ok(decode_event_stream(response.bytes_stream()))
        }
        .boxed()
    }
}

impl SettingsStore for SchedulerClient {
    fn fetch_settings(&self) -> BoxFuture<'_, AppResult<Option<GenerationSettings>>> {
        async move {
            let value: JsonValue = self.get_json(SETTINGS_ENDPOINT).await?;
            if value.as_object().map_or(true, |obj| obj.is_empty()) {
                return Ok(None);
            }
            let settings = serde_json::from_value(value).map_err(|source| {
                AppError::Api(ApiError::JsonParseFailed {
                    endpoint: self.config.endpoint(SETTINGS_ENDPOINT),
                    source,
                })
            })?;
            Ok(Some(settings))
        }
        .boxed()
    }

    fn save_settings<'a>(
        &'a self,
        settings: &'a GenerationSettings,
    ) -> BoxFuture<'a, AppResult<String>> {
        async move {
            let url = self.config.endpoint(SETTINGS_ENDPOINT);
            debug!("POST {}", url);
            let response = self
                .http
                .post(&url)
                .json(settings)
                .send()
                .await
                .map_err(|e| AppError::api_request_failed(&url, e))?;
            let body = checked_text(&url, response).await?;
            Ok(ack_message(&body))
        }
        .boxed()
    }
}

impl ExportBackend for SchedulerClient {
    fn export_document<'a>(
        &'a self,
        endpoint: &'static str,
        schedule: &'a ScheduleResult,
    ) -> BoxFuture<'a, AppResult<Vec<u8>>> {
        async move {
            let url = self.config.endpoint(endpoint);
            debug!("POST {} (export)", url);
            let response = self
                .http
                .post(&url)
                .json(schedule)
                .send()
                .await
                .map_err(|e| AppError::api_request_failed(&url, e))?;

            if !response.status().is_success() {
                return Err(AppError::Api(ApiError::ExportFailed {
                    endpoint: url,
                    status: response.status().as_u16(),
                }));
            }

            let bytes = response
                .bytes()
                .await
                .map_err(|e| AppError::api_request_failed(&url, e))?;
            Ok(bytes.to_vec())
        }
        .boxed()
    }
}

impl CatalogSource for SchedulerClient {
    fn fetch_catalog(&self) -> BoxFuture<'_, AppResult<Catalog>> {
        async move {
            let professors: Vec<ProfessorRecord> = self.get_json("api/professors").await?;
            let halls: Vec<HallRecord> = self.get_json("api/halls").await?;
            let subjects: Vec<SubjectRecord> = self.get_json("api/subjects").await?;
            Ok(Catalog {
                professors,
                halls,
                subjects,
            })
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ack_message() {
        assert_eq!(
            ack_message(r#"{"success": true, "message": "تم حفظ الإعدادات بنجاح."}"#),
            "تم حفظ الإعدادات بنجاح."
        );
        assert_eq!(ack_message("<html>"), "");
    }

    #[test]
    fn test_client_builds_from_default_config() {
        assert!(SchedulerClient::new(&Config::default()).is_ok());
    }
}
