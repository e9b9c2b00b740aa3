//! 流程控制器 - 流程层
//!
//! 持有全部可变状态（后端地址、元数据路径、处理参数、当前照片、两个流程状态），
//! 通过 watch 通道暴露给展示层订阅。
//!
//! 两个流程互相独立、可以同时进行；同一流程在 InFlight 期间再次触发直接忽略。
//! 不支持取消：已发出的请求总会跑完并落到 Settled。

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::clients::{HealthClient, OmrClient};
use crate::config::{BackendEndpoints, Config};
use crate::error::{AppError, AppResult, PermissionError, ValidationError};
use crate::infrastructure::{HttpTransport, ImageTransform, PermissionStatus, PhotoSource};
use crate::models::{CapturedPhoto, ParamValue, PhotoUri, SubmissionRequest};
use crate::services::OrientationNormalizer;
use crate::workflow::flow_state::{FlowKind, FlowOutcome, FlowState, ResultView};

/// 一次触发的结果
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    /// 同一流程已在进行中，本次触发被忽略
    Rejected,
    /// 流程已结束（包括校验失败直接结束）
    Settled(FlowOutcome),
}

/// 流程控制器
pub struct FlowController {
    health_client: HealthClient,
    omr_client: OmrClient,
    photo_source: Arc<dyn PhotoSource>,
    normalizer: OrientationNormalizer,
    endpoints: watch::Sender<BackendEndpoints>,
    request: Mutex<SubmissionRequest>,
    photo: watch::Sender<Option<CapturedPhoto>>,
    /// 进行中的提交正在使用的照片，替换时不能删除
    submitting_photo: Mutex<Option<PhotoUri>>,
    health: watch::Sender<FlowState>,
    submission: watch::Sender<FlowState>,
}

impl FlowController {
    /// 创建新的流程控制器
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        photo_source: Arc<dyn PhotoSource>,
        transform: Arc<dyn ImageTransform>,
        config: &Config,
    ) -> Self {
        Self {
            health_client: HealthClient::new(transport.clone()),
            omr_client: OmrClient::new(transport),
            photo_source,
            normalizer: OrientationNormalizer::with_quality(transform, config.jpeg_quality),
            endpoints: watch::Sender::new(config.endpoints()),
            request: Mutex::new(config.submission_request()),
            photo: watch::Sender::new(None),
            submitting_photo: Mutex::new(None),
            health: watch::Sender::new(FlowState::Idle),
            submission: watch::Sender::new(FlowState::Idle),
        }
    }

    // ========== 输入编辑 ==========

    /// 用户修改后端基础地址，立即重算全部地址
    pub fn set_base_url(&self, raw: &str) {
        let endpoints = BackendEndpoints::from_base(raw);
        info!("后端地址更新: {}", endpoints.base_url);
        self.endpoints.send_replace(endpoints);
    }

    pub fn set_metadata_path(&self, metadata_path: impl Into<String>) {
        self.lock_request().metadata_reference = metadata_path.into();
    }

    pub fn set_parameter(&self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.lock_request().set_param(name, value);
    }

    pub fn remove_parameter(&self, name: &str) -> Option<ParamValue> {
        self.lock_request().remove_param(name)
    }

    /// 整体替换提交请求（切换参数方案时使用）
    pub fn set_request(&self, request: SubmissionRequest) {
        *self.lock_request() = request;
    }

    // ========== 状态读取与订阅 ==========

    pub fn endpoints(&self) -> BackendEndpoints {
        self.endpoints.borrow().clone()
    }

    pub fn request(&self) -> SubmissionRequest {
        self.lock_request().clone()
    }

    pub fn current_photo(&self) -> Option<CapturedPhoto> {
        self.photo.borrow().clone()
    }

    pub fn health_state(&self) -> FlowState {
        self.health.borrow().clone()
    }

    pub fn submission_state(&self) -> FlowState {
        self.submission.borrow().clone()
    }

    /// 当前健康检查结果卡片
    pub fn health_view(&self) -> Option<ResultView> {
        self.health
            .borrow()
            .outcome()
            .map(|outcome| ResultView::from_outcome(FlowKind::Health, outcome))
    }

    /// 当前提交结果卡片
    pub fn submission_view(&self) -> Option<ResultView> {
        self.submission
            .borrow()
            .outcome()
            .map(|outcome| ResultView::from_outcome(FlowKind::Submission, outcome))
    }

    pub fn subscribe_endpoints(&self) -> watch::Receiver<BackendEndpoints> {
        self.endpoints.subscribe()
    }

    pub fn subscribe_photo(&self) -> watch::Receiver<Option<CapturedPhoto>> {
        self.photo.subscribe()
    }

    pub fn subscribe_health(&self) -> watch::Receiver<FlowState> {
        self.health.subscribe()
    }

    pub fn subscribe_submission(&self) -> watch::Receiver<FlowState> {
        self.submission.subscribe()
    }

    // ========== 触发动作 ==========

    /// 触发健康检查
    pub async fn run_health_check(&self) -> TriggerOutcome {
        let url = self.endpoints.borrow().health_url.clone();
        let checked = if url.is_empty() {
            Err(ValidationError::EmptyBaseUrl)
        } else {
            Ok(url)
        };

        let url = match begin(&self.health, FlowKind::Health, checked) {
            Ok(url) => url,
            Err(outcome) => return outcome,
        };

        info!("🔍 正在检查后端连通性: {}", url);
        let outcome = match self.health_client.probe(&url).await {
            Ok(result) => FlowOutcome::Completed(result),
            Err(e) => {
                warn!("⚠️ 健康检查失败: {}", e);
                FlowOutcome::failed(&e)
            }
        };

        settle(&self.health, FlowKind::Health, outcome)
    }

    /// 触发 OMR 提交
    ///
    /// 使用触发时刻的照片句柄和参数；之后再拍照不影响本次提交
    pub async fn run_submission(&self) -> TriggerOutcome {
        let url = self.endpoints.borrow().submission_url.clone();
        let checked = match (url.is_empty(), self.current_photo()) {
            (true, _) => Err(ValidationError::EmptyBaseUrl),
            (false, None) => Err(ValidationError::MissingPhoto),
            (false, Some(photo)) => Ok(photo),
        };

        let photo = match begin(&self.submission, FlowKind::Submission, checked) {
            Ok(photo) => photo,
            Err(outcome) => return outcome,
        };
        let request = self.request();
        *lock(&self.submitting_photo) = Some(photo.normalized_uri.clone());

        let outcome = match self
            .omr_client
            .submit(&url, &photo.normalized_uri, &request)
            .await
        {
            Ok(result) => FlowOutcome::Completed(result),
            Err(e) => {
                warn!("⚠️ 照片发送失败: {}", e);
                FlowOutcome::failed(&e)
            }
        };

        *lock(&self.submitting_photo) = None;
        let settled = settle(&self.submission, FlowKind::Submission, outcome);

        // 提交期间照片已被替换，这张不再有人使用
        if self.current_photo().as_ref() != Some(&photo) {
            self.normalizer.discard(&photo).await;
        }
        settled
    }

    /// 拍照并规范化方向
    ///
    /// # 返回
    /// - `Ok(Some(photo))`: 新照片已替换旧照片，提交结果被清空（提交进行中除外）
    /// - `Ok(None)`: 用户取消，状态不变
    /// - `Err(_)`: 权限被拒或图片处理失败；提交流程未在进行中时会记录该错误
    pub async fn acquire_photo(&self) -> AppResult<Option<CapturedPhoto>> {
        match self.capture_and_normalize().await {
            Ok(Some(photo)) => {
                info!(
                    "📷 已获取照片: {} (Orientation: {})",
                    photo.normalized_uri, photo.orientation_tag
                );
                let previous = self.photo.send_replace(Some(photo.clone()));
                self.submission.send_if_modified(|state| match state {
                    FlowState::Settled(_) => {
                        *state = FlowState::Idle;
                        true
                    }
                    FlowState::Idle | FlowState::InFlight => false,
                });
                if let Some(previous) = previous {
                    self.release_photo(previous).await;
                }
                Ok(Some(photo))
            }
            Ok(None) => {
                info!("拍照已取消");
                Ok(None)
            }
            Err(e) => {
                warn!("⚠️ 拍照失败: {}", e);
                let outcome = FlowOutcome::failed(&e);
                self.submission.send_if_modified(|state| {
                    if state.is_in_flight() {
                        return false;
                    }
                    *state = FlowState::Settled(outcome);
                    true
                });
                Err(e)
            }
        }
    }

    /// 删除被替换的照片；进行中的提交仍在使用时留给提交结束后处理
    async fn release_photo(&self, previous: CapturedPhoto) {
        let in_use = lock(&self.submitting_photo).as_ref() == Some(&previous.normalized_uri);
        if in_use {
            debug!("照片 {} 仍被进行中的提交使用，暂不删除", previous.normalized_uri);
            return;
        }
        self.normalizer.discard(&previous).await;
    }

    async fn capture_and_normalize(&self) -> AppResult<Option<CapturedPhoto>> {
        if self.photo_source.request_permission().await == PermissionStatus::Denied {
            return Err(AppError::from(PermissionError::CameraDenied));
        }

        let Some(asset) = self.photo_source.capture().await? else {
            return Ok(None);
        };

        self.normalizer.normalize(&asset).await.map(Some)
    }

    fn lock_request(&self) -> MutexGuard<'_, SubmissionRequest> {
        lock(&self.request)
    }
}

/// 锁内只做赋值，不会 panic，中毒时直接取回数据
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 原子地检查并进入 InFlight
///
/// 返回 `Err` 表示不需要发请求：要么已在进行中，要么校验失败直接结束
fn begin<T>(
    state: &watch::Sender<FlowState>,
    kind: FlowKind,
    checked: Result<T, ValidationError>,
) -> Result<T, TriggerOutcome> {
    let validation = checked.as_ref().err().copied();
    let changed = state.send_if_modified(|current| {
        if current.is_in_flight() {
            return false;
        }
        *current = match validation {
            Some(err) => FlowState::Settled(FlowOutcome::failed(&AppError::from(err))),
            None => FlowState::InFlight,
        };
        true
    });

    if !changed {
        info!("{} 进行中，忽略重复触发", kind);
        return Err(TriggerOutcome::Rejected);
    }

    checked.map_err(|err| {
        warn!("⚠️ {} 校验失败: {}", kind, err);
        TriggerOutcome::Settled(FlowOutcome::failed(&AppError::from(err)))
    })
}

/// 结束流程并记录结果
fn settle(state: &watch::Sender<FlowState>, kind: FlowKind, outcome: FlowOutcome) -> TriggerOutcome {
    match outcome.operation_result() {
        Some(result) if result.succeeded => info!("✓ {} 完成: HTTP {}", kind, result.status_code),
        Some(result) => warn!("⚠️ {} 后端返回错误: HTTP {}", kind, result.status_code),
        None => {}
    }
    state.send_replace(FlowState::Settled(outcome.clone()));
    TriggerOutcome::Settled(outcome)
}
