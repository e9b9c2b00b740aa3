//! 程序配置
//!
//! 环境变量覆盖 + 内置默认值，以及后端地址的纯函数推导

use std::path::PathBuf;

use crate::models::SubmissionRequest;

/// 默认后端地址（本机回环）
pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000/api/v1";
/// 默认答题卡模板元数据路径（后端侧路径）
pub const DEFAULT_METADATA_PATH: &str = "data/output/template_basica_omr_v1.json";

const HEALTH_SUFFIX: &str = "/health";
const SUBMISSION_SUFFIX: &str = "/omr/read-photo";

/// 提交参数方案
///
/// 后端接口的参数集合经历过演变，两种方案都有效
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParamSchema {
    /// 阈值对：marked_threshold / unmarked_threshold / px_per_mm
    Thresholds,
    /// 模式开关：px_per_mm / robust_mode / save_debug_artifacts
    Robust,
}

impl ParamSchema {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "thresholds" | "a" => Some(Self::Thresholds),
            "robust" | "b" => Some(Self::Robust),
            _ => None,
        }
    }

    /// 按方案构建默认的提交请求
    pub fn build_request(self, metadata_path: impl Into<String>) -> SubmissionRequest {
        match self {
            Self::Thresholds => SubmissionRequest::thresholds(metadata_path),
            Self::Robust => SubmissionRequest::robust(metadata_path),
        }
    }
}

/// 程序配置文件
#[derive(Clone, Debug)]
pub struct Config {
    /// 后端基础地址（未经规范化的原始值）
    pub api_base_url: String,
    /// 答题卡元数据路径
    pub metadata_path: String,
    /// 提交参数方案
    pub param_schema: ParamSchema,
    /// 文件照片源使用的图片路径
    pub photo_path: Option<String>,
    /// 旋转后重新编码的图片存放目录
    pub normalized_dir: PathBuf,
    /// JPEG 重新编码质量 (1..=100)
    pub jpeg_quality: u8,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            metadata_path: DEFAULT_METADATA_PATH.to_string(),
            param_schema: ParamSchema::Thresholds,
            photo_path: None,
            normalized_dir: std::env::temp_dir().join("omr-lan-check"),
            jpeg_quality: 95,
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_base_url: resolve_base_url(std::env::var("OMR_API_BASE_URL").ok().as_deref()),
            metadata_path: resolve_metadata_default(std::env::var("OMR_METADATA_PATH").ok().as_deref()),
            param_schema: std::env::var("OMR_PARAM_SCHEMA").ok().and_then(|v| ParamSchema::parse(&v)).unwrap_or(default.param_schema),
            photo_path: std::env::var("OMR_PHOTO_PATH").ok().filter(|v| !v.trim().is_empty()),
            normalized_dir: std::env::var("OMR_NORMALIZED_DIR").ok().map(PathBuf::from).unwrap_or(default.normalized_dir),
            jpeg_quality: std::env::var("OMR_JPEG_QUALITY").ok().and_then(|v| v.parse().ok()).filter(|q| (1..=100).contains(q)).unwrap_or(default.jpeg_quality),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
        }
    }

    /// 当前配置对应的后端地址集合
    pub fn endpoints(&self) -> BackendEndpoints {
        BackendEndpoints::from_base(&self.api_base_url)
    }

    /// 当前配置对应的默认提交请求
    pub fn submission_request(&self) -> SubmissionRequest {
        self.param_schema.build_request(self.metadata_path.clone())
    }
}

/// 后端地址集合
///
/// 每次用户修改基础地址时整体重算，不持久化
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BackendEndpoints {
    /// 规范化后的基础地址，为空表示无效
    pub base_url: String,
    pub health_url: String,
    pub submission_url: String,
}

impl BackendEndpoints {
    /// 从用户输入的原始地址推导全部地址
    ///
    /// 与 [`resolve_base_url`] 不同，这里不回退到默认值：
    /// 用户清空输入框就意味着地址无效
    pub fn from_base(raw: &str) -> Self {
        let base_url = normalize_base_url(raw);
        Self {
            health_url: build_health_url(&base_url),
            submission_url: build_submission_url(&base_url),
            base_url,
        }
    }

    pub fn is_valid(&self) -> bool {
        !self.base_url.is_empty()
    }
}

/// 去掉首尾空白和末尾的所有斜杠
fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

/// 解析后端基础地址：覆盖值非空则用覆盖值，否则用内置默认值
pub fn resolve_base_url(override_value: Option<&str>) -> String {
    let configured = normalize_base_url(override_value.unwrap_or_default());
    if configured.is_empty() {
        DEFAULT_API_BASE_URL.to_string()
    } else {
        configured
    }
}

/// 健康检查地址，基础地址为空时返回空串
pub fn build_health_url(base: &str) -> String {
    let base = normalize_base_url(base);
    if base.is_empty() {
        return String::new();
    }
    format!("{}{}", base, HEALTH_SUFFIX)
}

/// OMR 提交地址，基础地址为空时返回空串
pub fn build_submission_url(base: &str) -> String {
    let base = normalize_base_url(base);
    if base.is_empty() {
        return String::new();
    }
    format!("{}{}", base, SUBMISSION_SUFFIX)
}

/// 解析默认的元数据路径
pub fn resolve_metadata_default(override_value: Option<&str>) -> String {
    let configured = override_value.unwrap_or_default().trim();
    if configured.is_empty() {
        DEFAULT_METADATA_PATH.to_string()
    } else {
        configured.to_string()
    }
}
