//! 事件流 - 基础设施层
//!
//! 把服务端 `text/event-stream` 的字节流切分成消息，并把每条消息归类为
//! [`StreamEvent`]。不认识任务状态，也不持有连接以外的任何东西。

use futures::stream::{self, BoxStream, Stream, StreamExt};
use std::collections::VecDeque;
use std::fmt;
use tracing::warn;

/// 进度消息前缀
pub const PROGRESS_PREFIX: &str = "PROGRESS:";
/// 终止消息前缀，后面紧跟 JSON 负载
pub const TERMINAL_PREFIX: &str = "DONE";

/// 事件流上的一条事件
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// 进度百分比 0–100
    Progress(u8),
    /// 普通诊断文本
    LogLine(String),
    /// 任务结束，携带原始负载文本（可能缺失）
    Terminal(Option<String>),
    /// 连接中断或无法建立
    TransportError(String),
}

/// 已建立的事件流连接；drop 即关闭
pub type EventStream = BoxStream<'static, StreamEvent>;

/// 将一条消息的 data 归类
///
/// 无法解析的进度消息会被丢弃，不会进入日志。
pub fn classify(data: &str) -> Option<StreamEvent> {
    if let Some(rest) = data.strip_prefix(PROGRESS_PREFIX) {
        return match parse_percent(rest) {
            Some(percent) => Some(StreamEvent::Progress(percent)),
            None => {
                warn!("⚠️ 无法解析进度消息: {}", data);
                None
            }
        };
    }

    if let Some(rest) = data.strip_prefix(TERMINAL_PREFIX) {
        let payload = rest.trim();
        return Some(StreamEvent::Terminal(
            (!payload.is_empty()).then(|| payload.to_string()),
        ));
    }

    Some(StreamEvent::LogLine(data.to_string()))
}

fn parse_percent(raw: &str) -> Option<u8> {
    let raw = raw.trim();
    let value = match raw.parse::<i64>() {
        Ok(v) => v as f64,
        Err(_) => raw.parse::<f64>().ok().filter(|v| v.is_finite())?,
    };
    Some(value.round().clamp(0.0, 100.0) as u8)
}

/// SSE 帧解码器
///
/// - `data:` 行累积，多行以 `\n` 连接，空行派发
/// - `:` 开头为注释，其它字段忽略
/// - 支持 CRLF，字节块可以在任意位置（包括 UTF-8 字符中间）断开
/// - 流结束时未以空行结尾的消息被丢弃
#[derive(Debug, Default)]
pub struct SseDecoder {
    partial: Vec<u8>,
    data_lines: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// 输入一个字节块，返回其中完成的消息
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        self.partial.extend_from_slice(chunk);

        let mut messages = Vec::new();
        while let Some(pos) = self.partial.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.partial.drain(..=pos).collect();
            let line = String::from_utf8_lossy(&line[..line.len() - 1]);
            let line = line.trim_end_matches('\r');
            if let Some(message) = self.process_line(line) {
                messages.push(message);
            }
        }
        messages
    }

    fn process_line(&mut self, line: &str) -> Option<String> {
        if line.is_empty() {
            if self.data_lines.is_empty() {
                return None;
            }
            let message = self.data_lines.join("\n");
            self.data_lines.clear();
            return Some(message);
        }

        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data_lines.push(value.to_string());
        }
        None
    }
}

struct DecodeState<S> {
    chunks: std::pin::Pin<Box<S>>,
    decoder: SseDecoder,
    pending: VecDeque<StreamEvent>,
    finished: bool,
}

/// 把原始字节流包装成 [`EventStream`]
///
/// 传输层错误变成一条 `TransportError` 事件，随后流结束。
pub fn decode_event_stream<S, B, E>(chunks: S) -> EventStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    let state = DecodeState {
        chunks: Box::pin(chunks),
        decoder: SseDecoder::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(event) = st.pending.pop_front() {
                return Some((event, st));
            }
            if st.finished {
                return None;
            }
            match st.chunks.next().await {
                Some(Ok(chunk)) => {
                    for data in st.decoder.feed(chunk.as_ref()) {
                        if let Some(event) = classify(&data) {
                            st.pending.push_back(event);
                        }
                    }
                }
                Some(Err(e)) => {
                    st.finished = true;
                    st.pending.push_back(StreamEvent::TransportError(e.to_string()));
                }
                None => st.finished = true,
            }
        }
    })
    .boxed()
}
