//! 照片模型
//!
//! 一次拍照得到的原始图片，以及方向规范化之后的结果

use std::fmt::Display;
use std::path::{Path, PathBuf};

/// 图片句柄
///
/// 对调用方而言是不透明的，目前实现为本地文件路径
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhotoUri(PathBuf);

impl PhotoUri {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }
}

impl Display for PhotoUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// 照片源返回的原始采集结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedAsset {
    /// 原始图片句柄
    pub uri: PhotoUri,
    /// EXIF Orientation 标签，缺失时为 None
    pub exif_orientation: Option<u32>,
}

impl CapturedAsset {
    pub fn new(uri: PhotoUri, exif_orientation: Option<u32>) -> Self {
        Self {
            uri,
            exif_orientation,
        }
    }

    /// 方向标签，缺失时视为 1（正向）
    pub fn orientation_tag(&self) -> u32 {
        self.exif_orientation.unwrap_or(1)
    }
}

/// 当前有效的照片
///
/// 同一时刻只有一张，下一次拍照会整体替换
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedPhoto {
    pub source_uri: PhotoUri,
    pub orientation_tag: u32,
    /// 正向图片句柄，无需旋转时与 source_uri 相同
    pub normalized_uri: PhotoUri,
}

impl CapturedPhoto {
    /// 是否经过了重新编码
    pub fn was_reencoded(&self) -> bool {
        self.source_uri != self.normalized_uri
    }
}

/// 顺时针纠正旋转角度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotation {
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    pub fn degrees(self) -> u16 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }

    pub fn is_noop(self) -> bool {
        self == Rotation::None
    }
}
