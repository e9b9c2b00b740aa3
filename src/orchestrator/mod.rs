//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 组装真实的基础设施（reqwest 传输、文件照片源、JPEG 变换器），
//! 创建 FlowController，并执行一次完整的诊断会话。
//!
//! ## 层次关系
//!
//! ```text
//! orchestrator::App (一次诊断会话)
//!     ↓
//! workflow::FlowController (两个独立流程 + 当前照片)
//!     ↓
//! clients / services (探测、提交、方向规范化)
//!     ↓
//! infrastructure (HttpTransport / PhotoSource / ImageTransform)
//! ```

pub mod app;

pub use app::{App, SessionReport};
