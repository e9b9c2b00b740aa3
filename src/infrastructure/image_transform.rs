//! 图片变换 - 基础设施层
//!
//! 只暴露"旋转并重新编码"能力

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use tracing::debug;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{PhotoUri, Rotation};

/// 图片变换能力
#[async_trait]
pub trait ImageTransform: Send + Sync {
    /// 按顺时针角度旋转图片，以 JPEG 重新编码，返回新图片句柄
    ///
    /// `quality` 为 1..=100 的有损压缩质量
    async fn rotate(&self, uri: &PhotoUri, rotation: Rotation, quality: u8) -> AppResult<PhotoUri>;

    /// 删除由 [`ImageTransform::rotate`] 生成、已不再使用的图片
    async fn discard(&self, uri: &PhotoUri) -> AppResult<()>;
}

/// 基于 image crate 的 JPEG 重新编码实现
///
/// 解码和编码是 CPU 密集操作，放到 blocking 线程执行。
/// `output_dir` 只存放当前照片（以及进行中的提交仍在读取的那一张），
/// 被替换的照片由流程控制器通过 `discard` 删除
pub struct JpegImageTransform {
    output_dir: PathBuf,
}

impl JpegImageTransform {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl ImageTransform for JpegImageTransform {
    async fn rotate(&self, uri: &PhotoUri, rotation: Rotation, quality: u8) -> AppResult<PhotoUri> {
        let source = uri.as_path().to_path_buf();
        let target = self.output_dir.join(format!("{}.jpg", Uuid::new_v4()));
        let output_dir = self.output_dir.clone();

        debug!(
            "旋转图片 {} -> {} ({}°, 质量 {})",
            source.display(),
            target.display(),
            rotation.degrees(),
            quality
        );

        let written = tokio::task::spawn_blocking(move || {
            std::fs::create_dir_all(&output_dir)
                .map_err(|e| AppError::image_encode_failed(output_dir.display().to_string(), e))?;
            rotate_and_encode(&source, &target, rotation, quality)?;
            Ok::<_, AppError>(target)
        })
        .await??;

        Ok(PhotoUri::new(written))
    }

    async fn discard(&self, uri: &PhotoUri) -> AppResult<()> {
        match tokio::fs::remove_file(uri.as_path()).await {
            Ok(()) => {
                debug!("已删除旧照片 {}", uri);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::image_encode_failed(uri.to_string(), e)),
        }
    }
}

/// 同步执行：解码、旋转、JPEG 编码写入目标文件
fn rotate_and_encode(source: &Path, target: &Path, rotation: Rotation, quality: u8) -> AppResult<()> {
    let img = image::open(source)
        .map_err(|e| AppError::image_decode_failed(source.display().to_string(), e))?;

    let rotated = match rotation {
        Rotation::None => img,
        Rotation::Cw90 => img.rotate90(),
        Rotation::Cw180 => img.rotate180(),
        Rotation::Cw270 => img.rotate270(),
    };

    let file = File::create(target)
        .map_err(|e| AppError::image_encode_failed(target.display().to_string(), e))?;
    let mut writer = BufWriter::new(file);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100));

    // JPEG 不支持透明通道
    DynamicImage::ImageRgb8(rotated.to_rgb8())
        .write_with_encoder(encoder)
        .map_err(|e| AppError::image_encode_failed(target.display().to_string(), e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;

    fn write_png(path: &Path, width: u32, height: u32) {
        let img = image::RgbImage::from_fn(width, height, |x, _| {
            if x == 0 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 255])
            }
        });
        img.save(path).unwrap();
    }

    #[tokio::test]
    async fn test_rotate_90_swaps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("wide.png");
        write_png(&source, 8, 4);

        let transform = JpegImageTransform::new(dir.path().join("out"));
        let out = transform
            .rotate(&PhotoUri::new(&source), Rotation::Cw90, 95)
            .await
            .unwrap();

        assert_ne!(out.as_path(), source.as_path());
        assert_eq!(out.as_path().extension().and_then(|e| e.to_str()), Some("jpg"));
        let rotated = image::open(out.as_path()).unwrap();
        assert_eq!(rotated.dimensions(), (4, 8));
    }

    #[tokio::test]
    async fn test_rotate_180_keeps_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("wide.png");
        write_png(&source, 8, 4);

        let transform = JpegImageTransform::new(dir.path());
        let out = transform
            .rotate(&PhotoUri::new(&source), Rotation::Cw180, 95)
            .await
            .unwrap();
        assert_eq!(image::open(out.as_path()).unwrap().dimensions(), (8, 4));
    }

    #[tokio::test]
    async fn test_discard_removes_written_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("wide.png");
        write_png(&source, 8, 4);

        let transform = JpegImageTransform::new(dir.path().join("out"));
        let out = transform
            .rotate(&PhotoUri::new(&source), Rotation::Cw90, 95)
            .await
            .unwrap();
        assert!(out.as_path().exists());

        transform.discard(&out).await.unwrap();
        assert!(!out.as_path().exists());
        // 已经不存在时不算错误
        transform.discard(&out).await.unwrap();
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_undecodable_source_is_image_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("broken.jpg");
        std::fs::write(&source, b"not an image").unwrap();

        let transform = JpegImageTransform::new(dir.path());
        let err = transform
            .rotate(&PhotoUri::new(&source), Rotation::Cw270, 95)
            .await
            .unwrap_err();
        assert_eq!(err.category(), crate::error::FailureKind::Image);
    }
}
