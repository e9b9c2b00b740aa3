//! # OMR LAN Check
//!
//! 手机端诊断客户端的核心：检查后端连通性，拍摄答题卡照片、
//! 规范化方向后提交给后端 OMR 接口识别
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有平台资源，只暴露能力
//! - `HttpTransport` - 发请求、取响应文本
//! - `PhotoSource` - 相机权限 + 拍照
//! - `ImageTransform` - 旋转并重新编码
//!
//! ### ② 业务能力层（Clients / Services）
//! - `HealthClient` - 连通性探测
//! - `OmrClient` - multipart 照片提交
//! - `OrientationNormalizer` - EXIF 方向规范化
//!
//! ### ③ 流程层（Workflow）
//! - `FlowController` - 健康检查、OMR 提交两个独立流程的状态机
//!
//! ### ④ 编排层（Orchestration）
//! - `App` - 组装真实实现，执行一次诊断会话

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::{BackendEndpoints, Config};
pub use error::{AppError, AppResult};
pub use models::{CapturedPhoto, OperationResult, SubmissionRequest};
pub use orchestrator::{App, SessionReport};
pub use workflow::{FlowController, FlowOutcome, FlowState, ResultView, TriggerOutcome};
