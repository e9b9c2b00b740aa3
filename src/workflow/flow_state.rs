//! 流程状态
//!
//! 每个流程（健康检查、OMR 提交）各自拥有一个状态：
//! `Idle → InFlight → Settled`，Settled 之后可以再次触发

use std::fmt::Display;

use serde_json::Value;

use crate::error::{AppError, FailureKind, ValidationError};
use crate::models::OperationResult;

/// 流程种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    /// 连通性探测
    Health,
    /// OMR 提交
    Submission,
}

impl Display for FlowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlowKind::Health => write!(f, "健康检查"),
            FlowKind::Submission => write!(f, "OMR提交"),
        }
    }
}

/// 未拿到 HTTP 响应的失败
///
/// 只保留类别和描述，便于在状态里克隆和比较
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowFailure {
    pub kind: FailureKind,
    pub message: String,
}

impl From<&AppError> for FlowFailure {
    fn from(err: &AppError) -> Self {
        Self {
            kind: err.category(),
            message: err.detail(),
        }
    }
}

impl From<AppError> for FlowFailure {
    fn from(err: AppError) -> Self {
        Self::from(&err)
    }
}

/// 流程的最终结果
#[derive(Debug, Clone, PartialEq)]
pub enum FlowOutcome {
    /// 拿到了 HTTP 响应（2xx 或非 2xx）
    Completed(OperationResult),
    /// 校验、权限、传输或图片错误
    Failed(FlowFailure),
}

/// 结果分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeCategory {
    Success,
    /// 拿到响应但状态码不是 2xx
    Backend,
    Validation,
    Permission,
    Transport,
    Image,
    Other,
}

impl FlowOutcome {
    pub fn failed(err: &AppError) -> Self {
        FlowOutcome::Failed(err.into())
    }

    pub fn category(&self) -> OutcomeCategory {
        match self {
            FlowOutcome::Completed(result) if result.succeeded => OutcomeCategory::Success,
            FlowOutcome::Completed(_) => OutcomeCategory::Backend,
            FlowOutcome::Failed(failure) => match failure.kind {
                FailureKind::Validation(_) => OutcomeCategory::Validation,
                FailureKind::Permission => OutcomeCategory::Permission,
                FailureKind::Transport => OutcomeCategory::Transport,
                FailureKind::Image => OutcomeCategory::Image,
                FailureKind::Other => OutcomeCategory::Other,
            },
        }
    }

    pub fn is_success(&self) -> bool {
        self.category() == OutcomeCategory::Success
    }

    /// 拿到的 HTTP 结果（传输失败等情况下为 None）
    pub fn operation_result(&self) -> Option<&OperationResult> {
        match self {
            FlowOutcome::Completed(result) => Some(result),
            FlowOutcome::Failed(_) => None,
        }
    }
}

/// 单个流程的状态
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FlowState {
    #[default]
    Idle,
    InFlight,
    Settled(FlowOutcome),
}

impl FlowState {
    pub fn is_in_flight(&self) -> bool {
        matches!(self, FlowState::InFlight)
    }

    pub fn outcome(&self) -> Option<&FlowOutcome> {
        match self {
            FlowState::Settled(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// 展示色调
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
}

/// 面向展示层的结果卡片
#[derive(Debug, Clone, PartialEq)]
pub struct ResultView {
    pub tone: Tone,
    pub title: String,
    pub detail: String,
    /// 完整响应体
    pub payload: Option<Value>,
    /// 响应中的 quality_summary，单独展示，不做解读
    pub quality_summary: Option<Value>,
}

impl ResultView {
    pub fn from_outcome(kind: FlowKind, outcome: &FlowOutcome) -> Self {
        match outcome {
            FlowOutcome::Completed(result) => {
                let (tone, title, detail) = match (kind, result.succeeded) {
                    (FlowKind::Health, true) => (
                        Tone::Success,
                        "连接成功",
                        format!("后端返回 {}", result.status_code),
                    ),
                    (FlowKind::Health, false) => (
                        Tone::Error,
                        "后端可达但返回错误",
                        format!("HTTP {}", result.status_code),
                    ),
                    (FlowKind::Submission, true) => (
                        Tone::Success,
                        "OMR 识别完成",
                        format!("后端返回 {}", result.status_code),
                    ),
                    (FlowKind::Submission, false) => (
                        Tone::Error,
                        "OMR 识别出错",
                        format!("HTTP {}", result.status_code),
                    ),
                };
                let quality_summary = match kind {
                    FlowKind::Submission => result.quality_summary().cloned(),
                    FlowKind::Health => None,
                };
                Self {
                    tone,
                    title: title.to_string(),
                    detail,
                    payload: Some(result.payload.clone()),
                    quality_summary,
                }
            }
            FlowOutcome::Failed(failure) => {
                let title = match (failure.kind, kind) {
                    (FailureKind::Validation(ValidationError::MissingPhoto), _) => "缺少照片",
                    (FailureKind::Validation(ValidationError::EmptyBaseUrl), _) => "无效的地址",
                    (FailureKind::Permission, _) => "相机权限被拒绝",
                    (FailureKind::Transport, FlowKind::Health) => "无法连接",
                    (FailureKind::Transport, FlowKind::Submission) => "无法发送照片",
                    (FailureKind::Image, _) => "照片处理失败",
                    (FailureKind::Other, _) => "发生错误",
                };
                Self {
                    tone: Tone::Error,
                    title: title.to_string(),
                    detail: failure.message.clone(),
                    payload: None,
                    quality_summary: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PermissionError;
    use serde_json::json;

    #[test]
    fn test_categories() {
        let ok = FlowOutcome::Completed(OperationResult::from_response(200, r#"{"status":"ok"}"#));
        assert_eq!(ok.category(), OutcomeCategory::Success);
        assert!(ok.is_success());

        let backend = FlowOutcome::Completed(OperationResult::from_response(500, "not json"));
        assert_eq!(backend.category(), OutcomeCategory::Backend);
        assert_eq!(
            backend.operation_result().map(|r| &r.payload),
            Some(&json!({"raw": "not json"}))
        );

        let invalid = FlowOutcome::failed(&ValidationError::EmptyBaseUrl.into());
        assert_eq!(invalid.category(), OutcomeCategory::Validation);
        assert!(invalid.operation_result().is_none());
    }

    #[test]
    fn test_submission_view_surfaces_quality_summary() {
        let outcome = FlowOutcome::Completed(OperationResult::from_response(
            200,
            r#"{"quality_summary":{"marked_options":12},"questions":[]}"#,
        ));
        let view = ResultView::from_outcome(FlowKind::Submission, &outcome);
        assert_eq!(view.tone, Tone::Success);
        assert_eq!(view.detail, "后端返回 200");
        assert_eq!(view.quality_summary, Some(json!({"marked_options": 12})));
        assert!(view.payload.is_some());

        // 健康检查不单独展示汇总
        let view = ResultView::from_outcome(FlowKind::Health, &outcome);
        assert_eq!(view.quality_summary, None);
    }

    #[test]
    fn test_failure_views() {
        let view = ResultView::from_outcome(
            FlowKind::Submission,
            &FlowOutcome::failed(&ValidationError::MissingPhoto.into()),
        );
        assert_eq!(view.title, "缺少照片");
        assert_eq!(view.tone, Tone::Error);

        let view = ResultView::from_outcome(
            FlowKind::Health,
            &FlowOutcome::failed(&ValidationError::EmptyBaseUrl.into()),
        );
        assert_eq!(view.title, "无效的地址");

        let view = ResultView::from_outcome(
            FlowKind::Submission,
            &FlowOutcome::failed(&PermissionError::CameraDenied.into()),
        );
        assert_eq!(view.title, "相机权限被拒绝");
        assert!(view.payload.is_none());

        let view = ResultView::from_outcome(
            FlowKind::Health,
            &FlowOutcome::Completed(OperationResult::from_response(503, "down")),
        );
        assert_eq!(view.title, "后端可达但返回错误");
        assert_eq!(view.detail, "HTTP 503");
        assert_eq!(view.payload, Some(json!({"raw": "down"})));
    }
}
