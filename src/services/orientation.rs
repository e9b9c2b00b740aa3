//! 方向规范化服务 - 业务能力层
//!
//! 根据 EXIF Orientation 标签把照片转成正向，
//! 后端 OMR 流水线假设输入是正向图片，自身不做旋转纠正

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::AppResult;
use crate::infrastructure::ImageTransform;
use crate::models::{CapturedAsset, CapturedPhoto, Rotation};

/// 默认 JPEG 重新编码质量（约 0.95）
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// EXIF Orientation → 顺时针纠正角度
///
/// | 标签 | 旋转 |
/// |---|---|
/// | 1 / 缺失 | 0° |
/// | 3 | 180° |
/// | 6 | 90° |
/// | 8 | 270° |
/// | 其他 | 0° |
///
/// 镜像方向（2、4、5、7）按正向处理
pub fn orientation_rotation(tag: Option<u32>) -> Rotation {
    match tag {
        Some(3) => Rotation::Cw180,
        Some(6) => Rotation::Cw90,
        Some(8) => Rotation::Cw270,
        _ => Rotation::None,
    }
}

/// 方向规范化服务
pub struct OrientationNormalizer {
    transform: Arc<dyn ImageTransform>,
    quality: u8,
}

impl OrientationNormalizer {
    pub fn new(transform: Arc<dyn ImageTransform>) -> Self {
        Self::with_quality(transform, DEFAULT_JPEG_QUALITY)
    }

    pub fn with_quality(transform: Arc<dyn ImageTransform>, quality: u8) -> Self {
        Self { transform, quality }
    }

    /// 规范化一张采集到的照片
    ///
    /// 不需要旋转时直接返回原句柄，避免无谓的有损重新编码
    pub async fn normalize(&self, asset: &CapturedAsset) -> AppResult<CapturedPhoto> {
        let rotation = orientation_rotation(asset.exif_orientation);

        if rotation.is_noop() {
            debug!("照片方向正常 (Orientation: {})，无需旋转", asset.orientation_tag());
            return Ok(CapturedPhoto {
                source_uri: asset.uri.clone(),
                orientation_tag: asset.orientation_tag(),
                normalized_uri: asset.uri.clone(),
            });
        }

        info!(
            "🔄 照片 Orientation={}，旋转 {}° 后重新编码",
            asset.orientation_tag(),
            rotation.degrees()
        );
        let normalized_uri = self
            .transform
            .rotate(&asset.uri, rotation, self.quality)
            .await?;

        Ok(CapturedPhoto {
            source_uri: asset.uri.clone(),
            orientation_tag: asset.orientation_tag(),
            normalized_uri,
        })
    }

    /// 释放不再使用的照片
    ///
    /// 只删除重新编码生成的文件，原始采集文件不动；删除失败只记日志
    pub async fn discard(&self, photo: &CapturedPhoto) {
        if !photo.was_reencoded() {
            return;
        }
        if let Err(e) = self.transform.discard(&photo.normalized_uri).await {
            warn!("⚠️ 无法删除旧照片: {}", e);
        }
    }
}
