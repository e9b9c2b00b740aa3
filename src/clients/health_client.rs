/// 后端连通性探测客户端
///
/// 对健康检查地址发一次 GET，把结果统一成 OperationResult
use std::sync::Arc;

use tracing::debug;

use super::ACCEPT_JSON;
use crate::error::AppResult;
use crate::infrastructure::HttpTransport;
use crate::models::OperationResult;

/// 连通性探测客户端
pub struct HealthClient {
    transport: Arc<dyn HttpTransport>,
}

impl HealthClient {
    /// 创建新的探测客户端
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// 探测后端是否可达
    ///
    /// # 参数
    /// - `url`: 健康检查地址，调用方保证非空
    ///
    /// # 返回
    /// 拿到任意状态码都返回 `Ok`；只有传输失败才返回错误
    pub async fn probe(&self, url: &str) -> AppResult<OperationResult> {
        let response = self.transport.get(url, ACCEPT_JSON).await?;
        let result = OperationResult::from_response(response.status, &response.body);
        debug!("健康检查结果: {}", result.payload);
        Ok(result)
    }
}
