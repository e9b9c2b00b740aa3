//! 照片源 - 基础设施层
//!
//! 抽象"请求相机权限 + 拍一张照片"的平台能力

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{CapturedAsset, PhotoUri};

/// 相机权限状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// 照片源能力
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// 请求相机权限
    async fn request_permission(&self) -> PermissionStatus;

    /// 拍一张照片
    ///
    /// 用户取消时返回 `Ok(None)`
    async fn capture(&self) -> AppResult<Option<CapturedAsset>>;
}

/// 以本地文件代替相机的照片源
///
/// 文件不存在时视为没有相机权限；未配置路径时视为用户取消
pub struct FilePhotoSource {
    path: Option<PathBuf>,
}

impl FilePhotoSource {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

#[async_trait]
impl PhotoSource for FilePhotoSource {
    async fn request_permission(&self) -> PermissionStatus {
        match &self.path {
            Some(path) if !path.is_file() => PermissionStatus::Denied,
            _ => PermissionStatus::Granted,
        }
    }

    async fn capture(&self) -> AppResult<Option<CapturedAsset>> {
        let Some(path) = self.path.clone() else {
            return Ok(None);
        };

        let orientation = {
            let path = path.clone();
            tokio::task::spawn_blocking(move || read_exif_orientation(&path)).await??
        };
        debug!("采集照片 {} (EXIF Orientation: {:?})", path.display(), orientation);

        Ok(Some(CapturedAsset::new(PhotoUri::new(path), orientation)))
    }
}

/// 读取图片的 EXIF Orientation 标签
///
/// 没有 EXIF 数据或没有该标签时返回 None；文件无法打开时返回错误
pub fn read_exif_orientation(path: &Path) -> AppResult<Option<u32>> {
    let file = File::open(path).map_err(|e| AppError::image_read_failed(path.display().to_string(), e))?;
    let mut bufreader = BufReader::new(file);
    let mut exif_reader = exif::Reader::new();
    exif_reader.continue_on_error(true);

    let exif = match exif_reader.read_from_container(&mut bufreader) {
        Ok(exif) => exif,
        // 其他字段损坏时保留已解析的字段，Orientation 仍然可用
        Err(exif::Error::PartialResult(partial)) => {
            let (exif, errors) = partial.into_inner();
            debug!("EXIF 部分字段无法解析 ({}): {:?}", path.display(), errors);
            exif
        }
        Err(exif::Error::NotFound(_)) | Err(exif::Error::InvalidFormat(_)) => return Ok(None),
        Err(e) => return Err(AppError::exif_failed(path.display().to_string(), e)),
    };

    Ok(exif
        .get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0)))
}
