pub mod health_client;
pub mod omr_client;

pub use health_client::HealthClient;
pub use omr_client::OmrClient;

/// 所有请求都声明期望 JSON 响应
pub const ACCEPT_JSON: &str = "application/json";
