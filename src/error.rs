use std::fmt;

/// 应用程序错误类型
#[derive(Debug)]
pub enum AppError {
    /// 客户端校验错误（未发出任何网络请求）
    Validation(ValidationError),
    /// 平台权限错误
    Permission(PermissionError),
    /// 网络传输错误（没有拿到 HTTP 状态码）
    Transport(TransportError),
    /// 图片处理错误
    Image(ImageError),
    /// 其他错误（用于包装第三方库错误）
    Other(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Validation(e) => write!(f, "校验错误: {}", e),
            AppError::Permission(e) => write!(f, "权限错误: {}", e),
            AppError::Transport(e) => write!(f, "网络错误: {}", e),
            AppError::Image(e) => write!(f, "图片错误: {}", e),
            AppError::Other(msg) => write!(f, "错误: {}", msg),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Validation(e) => Some(e),
            AppError::Permission(e) => Some(e),
            AppError::Transport(e) => Some(e),
            AppError::Image(e) => Some(e),
            AppError::Other(_) => None,
        }
    }
}

/// 客户端校验错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    /// 后端基础地址为空或无效
    EmptyBaseUrl,
    /// 提交前尚未拍照
    MissingPhoto,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::EmptyBaseUrl => write!(f, "必须填写有效的后端基础地址"),
            ValidationError::MissingPhoto => write!(f, "发送前必须先拍一张照片"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// 平台权限错误
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionError {
    /// 相机权限被拒绝
    CameraDenied,
}

impl fmt::Display for PermissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PermissionError::CameraDenied => write!(f, "必须允许使用相机才能拍照"),
        }
    }
}

impl std::error::Error for PermissionError {}

/// 网络传输错误
#[derive(Debug)]
pub enum TransportError {
    /// 请求发送失败（DNS、连接被拒、超时等）
    RequestFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 读取响应体失败
    BodyReadFailed {
        url: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::RequestFailed { url, source } => {
                write!(f, "请求失败 ({}): {}", url, source)
            }
            TransportError::BodyReadFailed { url, source } => {
                write!(f, "读取响应失败 ({}): {}", url, source)
            }
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::RequestFailed { source, .. }
            | TransportError::BodyReadFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 图片处理错误
#[derive(Debug)]
pub enum ImageError {
    /// 读取图片文件失败
    ReadFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 图片解码失败
    DecodeFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 图片编码或写入失败
    EncodeFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// EXIF 读取失败
    ExifFailed {
        path: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageError::ReadFailed { path, source } => {
                write!(f, "读取图片失败 ({}): {}", path, source)
            }
            ImageError::DecodeFailed { path, source } => {
                write!(f, "解码图片失败 ({}): {}", path, source)
            }
            ImageError::EncodeFailed { path, source } => {
                write!(f, "编码图片失败 ({}): {}", path, source)
            }
            ImageError::ExifFailed { path, source } => {
                write!(f, "读取EXIF失败 ({}): {}", path, source)
            }
        }
    }
}

impl std::error::Error for ImageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImageError::ReadFailed { source, .. }
            | ImageError::DecodeFailed { source, .. }
            | ImageError::EncodeFailed { source, .. }
            | ImageError::ExifFailed { source, .. } => {
                Some(source.as_ref() as &(dyn std::error::Error + 'static))
            }
        }
    }
}

/// 可展示的失败类别
///
/// 流程状态里只保存类别和文字描述，方便克隆和比较
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation(ValidationError),
    Permission,
    Transport,
    Image,
    Other,
}

// ========== 从常见错误类型转换 ==========

impl From<ValidationError> for AppError {
    fn from(err: ValidationError) -> Self {
        AppError::Validation(err)
    }
}

impl From<PermissionError> for AppError {
    fn from(err: PermissionError) -> Self {
        AppError::Permission(err)
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Other(format!("后台任务执行失败: {}", err))
    }
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建请求发送失败错误
    pub fn request_failed(url: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Transport(TransportError::RequestFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建响应读取失败错误
    pub fn body_read_failed(url: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Transport(TransportError::BodyReadFailed {
            url: url.into(),
            source: Box::new(source),
        })
    }

    /// 创建图片读取错误
    pub fn image_read_failed(path: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Image(ImageError::ReadFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建图片解码错误
    pub fn image_decode_failed(path: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Image(ImageError::DecodeFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建图片编码错误
    pub fn image_encode_failed(path: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Image(ImageError::EncodeFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 创建 EXIF 读取错误
    pub fn exif_failed(path: impl Into<String>, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        AppError::Image(ImageError::ExifFailed {
            path: path.into(),
            source: Box::new(source),
        })
    }

    /// 错误所属的展示类别
    pub fn category(&self) -> FailureKind {
        match self {
            AppError::Validation(e) => FailureKind::Validation(*e),
            AppError::Permission(_) => FailureKind::Permission,
            AppError::Transport(_) => FailureKind::Transport,
            AppError::Image(_) => FailureKind::Image,
            AppError::Other(_) => FailureKind::Other,
        }
    }

    /// 面向用户的简短描述（不带类别前缀）
    pub fn detail(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::Permission(e) => e.to_string(),
            AppError::Transport(e) => e.to_string(),
            AppError::Image(e) => e.to_string(),
            AppError::Other(msg) => msg.clone(),
        }
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_mapping() {
        assert_eq!(
            AppError::from(ValidationError::MissingPhoto).category(),
            FailureKind::Validation(ValidationError::MissingPhoto)
        );
        assert_eq!(AppError::from(PermissionError::CameraDenied).category(), FailureKind::Permission);
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(AppError::request_failed("http://x", io).category(), FailureKind::Transport);
    }

    #[test]
    fn test_transport_detail_keeps_underlying_message() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
        let err = AppError::request_failed("http://10.0.0.1/health", io);
        let detail = err.detail();
        assert!(detail.contains("http://10.0.0.1/health"));
        assert!(detail.contains("connection refused"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
