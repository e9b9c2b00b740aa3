//! 测试用的假实现：传输、照片源、图片变换

#![allow(dead_code)]

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use omr_lan_check::error::{AppError, AppResult};
use omr_lan_check::infrastructure::{
    HttpTransport, ImageTransform, PermissionStatus, PhotoSource, RawResponse,
};
use omr_lan_check::models::{CapturedAsset, FormPart, MultipartForm, PhotoUri, Rotation};
use omr_lan_check::{Config, FlowController};
use tokio::sync::Notify;

/// 假 HTTP 传输：记录每次调用，可延迟或被闸门挡住
pub struct FakeTransport {
    status: u16,
    body: String,
    fail: bool,
    delay: Duration,
    gate: Option<Arc<Notify>>,
    get_calls: AtomicUsize,
    post_calls: AtomicUsize,
    active: AtomicUsize,
    max_active: AtomicUsize,
    urls: Mutex<Vec<String>>,
    forms: Mutex<Vec<MultipartForm>>,
}

impl FakeTransport {
    pub fn responding(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            fail: false,
            delay: Duration::ZERO,
            gate: None,
            get_calls: AtomicUsize::new(0),
            post_calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            max_active: AtomicUsize::new(0),
            urls: Mutex::new(Vec::new()),
            forms: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::responding(0, "")
        }
    }

    pub fn with_delay(mut self, millis: u64) -> Self {
        self.delay = Duration::from_millis(millis);
        self
    }

    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn post_calls(&self) -> usize {
        self.post_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.get_calls() + self.post_calls()
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().unwrap().clone()
    }

    pub fn forms(&self) -> Vec<MultipartForm> {
        self.forms.lock().unwrap().clone()
    }

    async fn respond(&self, url: &str) -> AppResult<RawResponse> {
        self.urls.lock().unwrap().push(url.to_string());
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.fail {
            return Err(AppError::request_failed(
                url,
                std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused"),
            ));
        }
        Ok(RawResponse {
            status: self.status,
            body: self.body.clone(),
        })
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn get(&self, url: &str, accept: &str) -> AppResult<RawResponse> {
        assert_eq!(accept, "application/json");
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.respond(url).await
    }

    async fn post_multipart(
        &self,
        url: &str,
        accept: &str,
        form: MultipartForm,
    ) -> AppResult<RawResponse> {
        assert_eq!(accept, "application/json");
        self.post_calls.fetch_add(1, Ordering::SeqCst);
        self.forms.lock().unwrap().push(form);
        self.respond(url).await
    }
}

/// 假照片源：可以切换权限和下一张照片
pub struct FakePhotoSource {
    permission: Mutex<PermissionStatus>,
    next: Mutex<Option<CapturedAsset>>,
    captures: AtomicUsize,
}

impl FakePhotoSource {
    pub fn new(next: Option<CapturedAsset>) -> Self {
        Self {
            permission: Mutex::new(PermissionStatus::Granted),
            next: Mutex::new(next),
            captures: AtomicUsize::new(0),
        }
    }

    pub fn set_permission(&self, status: PermissionStatus) {
        *self.permission.lock().unwrap() = status;
    }

    pub fn set_next(&self, asset: Option<CapturedAsset>) {
        *self.next.lock().unwrap() = asset;
    }

    pub fn captures(&self) -> usize {
        self.captures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PhotoSource for FakePhotoSource {
    async fn request_permission(&self) -> PermissionStatus {
        *self.permission.lock().unwrap()
    }

    async fn capture(&self) -> AppResult<Option<CapturedAsset>> {
        self.captures.fetch_add(1, Ordering::SeqCst);
        Ok(self.next.lock().unwrap().clone())
    }
}

/// 假图片变换：只记录调用，返回带后缀的新句柄
#[derive(Default)]
pub struct RecordingTransform {
    calls: Mutex<Vec<Rotation>>,
    discarded: Mutex<Vec<PhotoUri>>,
}

impl RecordingTransform {
    pub fn calls(&self) -> Vec<Rotation> {
        self.calls.lock().unwrap().clone()
    }

    pub fn discarded(&self) -> Vec<PhotoUri> {
        self.discarded.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageTransform for RecordingTransform {
    async fn rotate(&self, uri: &PhotoUri, rotation: Rotation, _quality: u8) -> AppResult<PhotoUri> {
        self.calls.lock().unwrap().push(rotation);
        Ok(PhotoUri::new(format!("{}.rotated", uri)))
    }

    async fn discard(&self, uri: &PhotoUri) -> AppResult<()> {
        self.discarded.lock().unwrap().push(uri.clone());
        Ok(())
    }
}

/// 测试环境
pub struct Harness {
    pub transport: Arc<FakeTransport>,
    pub source: Arc<FakePhotoSource>,
    pub transform: Arc<RecordingTransform>,
    pub controller: Arc<FlowController>,
}

impl Harness {
    pub fn new(transport: FakeTransport, next: Option<CapturedAsset>) -> Self {
        let transport = Arc::new(transport);
        let source = Arc::new(FakePhotoSource::new(next));
        let transform = Arc::new(RecordingTransform::default());
        let config = Config {
            api_base_url: "http://192.168.1.10:8000/api/v1/".to_string(),
            ..Config::default()
        };
        let controller = Arc::new(FlowController::new(
            transport.clone(),
            source.clone(),
            transform.clone(),
            &config,
        ));
        Self {
            transport,
            source,
            transform,
            controller,
        }
    }
}

/// 写一个假的照片文件
pub fn write_photo(dir: &Path, name: &str, bytes: &[u8]) -> CapturedAsset {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    CapturedAsset::new(PhotoUri::new(path), None)
}

/// 写一张需要旋转的照片（Orientation=6），连同假变换器会返回的旋转后文件
pub fn write_rotated_photo(dir: &Path, name: &str, bytes: &[u8]) -> CapturedAsset {
    let path = dir.join(name);
    std::fs::write(&path, b"raw").unwrap();
    std::fs::write(format!("{}.rotated", path.display()), bytes).unwrap();
    CapturedAsset::new(PhotoUri::new(path), Some(6))
}

/// 假变换器为该照片生成的句柄
pub fn rotated_uri(asset: &CapturedAsset) -> PhotoUri {
    PhotoUri::new(format!("{}.rotated", asset.uri))
}

/// 取出表单中的照片内容
pub fn photo_bytes(form: &MultipartForm) -> Vec<u8> {
    form.parts()
        .iter()
        .find_map(|part| match part {
            FormPart::File { name, bytes, .. } if name == "photo" => Some(bytes.clone()),
            _ => None,
        })
        .expect("表单中没有照片")
}
