//! HTTP 传输 - 基础设施层
//!
//! 只负责"把请求发出去、把响应文本拿回来"，不解析业务含义

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{FormPart, MultipartForm};

/// 原始 HTTP 响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

/// HTTP 传输能力
///
/// 传输失败（拿不到状态码）时返回 [`AppError::Transport`]，
/// 任何状态码都算成功拿到响应
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// 发送 GET 请求
    async fn get(&self, url: &str, accept: &str) -> AppResult<RawResponse>;

    /// 发送 multipart/form-data POST 请求
    ///
    /// Content-Type（含 boundary）由实现自动设置，调用方不能覆盖
    async fn post_multipart(
        &self,
        url: &str,
        accept: &str,
        form: MultipartForm,
    ) -> AppResult<RawResponse>;
}

/// 基于 reqwest 的传输实现
///
/// 不设置超时，沿用 reqwest 默认行为
#[derive(Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    async fn read_response(url: &str, response: reqwest::Response) -> AppResult<RawResponse> {
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::body_read_failed(url, e))?;
        debug!("响应 {} -> HTTP {} ({} 字节)", url, status, body.len());
        Ok(RawResponse { status, body })
    }
}

/// 转换为 reqwest 的表单
fn to_reqwest_form(form: MultipartForm) -> AppResult<Form> {
    let mut out = Form::new();
    for part in form.into_parts() {
        out = match part {
            FormPart::Text { name, value } => out.text(name, value),
            FormPart::File {
                name,
                file_name,
                mime,
                bytes,
            } => {
                let part = Part::bytes(bytes)
                    .file_name(file_name)
                    .mime_str(&mime)
                    .map_err(|e| AppError::Other(format!("无效的 MIME 类型 {}: {}", mime, e)))?;
                out.part(name, part)
            }
        };
    }
    Ok(out)
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str, accept: &str) -> AppResult<RawResponse> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, accept)
            .send()
            .await
            .map_err(|e| AppError::request_failed(url, e))?;
        Self::read_response(url, response).await
    }

    async fn post_multipart(
        &self,
        url: &str,
        accept: &str,
        form: MultipartForm,
    ) -> AppResult<RawResponse> {
        debug!("POST {} (multipart, {} 个字段)", url, form.parts().len());
        let form = to_reqwest_form(form)?;
        let response = self
            .client
            .post(url)
            .header(reqwest::header::ACCEPT, accept)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AppError::request_failed(url, e))?;
        Self::read_response(url, response).await
    }
}
