//! 网络调用的统一结果

use serde::Serialize;
use serde_json::{json, Value};

/// OMR 响应中单独展示的汇总字段
pub const QUALITY_SUMMARY_FIELD: &str = "quality_summary";

/// 一次网络调用的结果（已拿到 HTTP 状态码）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OperationResult {
    /// 状态码在 2xx 范围内为 true
    pub succeeded: bool,
    pub status_code: u16,
    /// 响应体 JSON，无法解析时为 `{"raw": <文本>}`
    pub payload: Value,
}

impl OperationResult {
    /// 从状态码和原始响应文本构建
    pub fn from_response(status_code: u16, body: &str) -> Self {
        Self {
            succeeded: (200..300).contains(&status_code),
            status_code,
            payload: parse_payload(body),
        }
    }

    /// 响应中的 quality_summary 字段（仅用于展示）
    pub fn quality_summary(&self) -> Option<&Value> {
        self.payload
            .get(QUALITY_SUMMARY_FIELD)
            .filter(|v| !v.is_null())
    }
}

/// 尝试把响应文本解析成 JSON，失败时把原文包起来
pub fn parse_payload(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| json!({ "raw": raw }))
}
