//! 基础设施层
//!
//! 持有平台资源（HTTP 连接、相机、图片编码器），只暴露窄能力接口

pub mod http_transport;
pub mod image_transform;
pub mod photo_source;

pub use http_transport::{HttpTransport, RawResponse, ReqwestTransport};
pub use image_transform::{ImageTransform, JpegImageTransform};
pub use photo_source::{FilePhotoSource, PermissionStatus, PhotoSource};
