/// OMR 提交客户端
///
/// 把正向照片和处理参数打包成 multipart 请求发给后端
use std::sync::Arc;

use tracing::{debug, info};

use super::ACCEPT_JSON;
use crate::error::{AppError, AppResult};
use crate::infrastructure::HttpTransport;
use crate::models::{MultipartForm, OperationResult, PhotoUri, SubmissionRequest};

/// 照片字段名
pub const PHOTO_FIELD: &str = "photo";
/// 照片文件名
pub const PHOTO_FILE_NAME: &str = "photo.jpg";
/// 照片 MIME 类型
pub const PHOTO_MIME: &str = "image/jpeg";

/// OMR 提交客户端
pub struct OmrClient {
    transport: Arc<dyn HttpTransport>,
}

impl OmrClient {
    /// 创建新的提交客户端
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// 提交照片进行 OMR 识别
    ///
    /// # 参数
    /// - `endpoint_url`: 提交地址，调用方保证非空
    /// - `photo`: 已规范化方向的照片
    /// - `request`: 元数据路径和处理参数
    ///
    /// # 返回
    /// 每次调用只发一个请求，不重试
    pub async fn submit(
        &self,
        endpoint_url: &str,
        photo: &PhotoUri,
        request: &SubmissionRequest,
    ) -> AppResult<OperationResult> {
        let bytes = tokio::fs::read(photo.as_path())
            .await
            .map_err(|e| AppError::image_read_failed(photo.to_string(), e))?;

        info!("📤 正在发送照片 ({} 字节) 到 {}", bytes.len(), endpoint_url);
        let form = build_form(bytes, request);

        let response = self
            .transport
            .post_multipart(endpoint_url, ACCEPT_JSON, form)
            .await?;

        let result = OperationResult::from_response(response.status, &response.body);
        debug!("OMR 提交结果: HTTP {}", result.status_code);
        Ok(result)
    }
}

/// 构建 multipart 表单：照片在前，文本字段按请求顺序排列
pub fn build_form(photo_bytes: Vec<u8>, request: &SubmissionRequest) -> MultipartForm {
    let form = MultipartForm::new().file(PHOTO_FIELD, PHOTO_FILE_NAME, PHOTO_MIME, photo_bytes);

    request
        .text_fields()
        .into_iter()
        .fold(form, |form, (name, value)| {
            debug!("表单字段 {} = {}", name, value);
            form.text(name, value)
        })
}
