//! 诊断会话 - 编排层
//!
//! 一次会话：检查后端连通性；配置了照片时同时拍照、规范化方向并提交 OMR

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::infrastructure::{FilePhotoSource, JpegImageTransform, ReqwestTransport};
use crate::utils::logging::{log_result_view, log_startup, print_final_stats};
use crate::workflow::{FlowController, FlowKind, ResultView, Tone, TriggerOutcome};

/// 会话结果
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub health: Option<ResultView>,
    pub submission: Option<ResultView>,
}

impl SessionReport {
    /// 执行过的流程数量
    pub fn total(&self) -> usize {
        self.health.iter().chain(self.submission.iter()).count()
    }

    /// 成功的流程数量
    pub fn succeeded(&self) -> usize {
        self.health
            .iter()
            .chain(self.submission.iter())
            .filter(|view| view.tone == Tone::Success)
            .count()
    }
}

/// 应用主结构
pub struct App {
    config: Config,
    controller: Arc<FlowController>,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        tokio::fs::create_dir_all(&config.normalized_dir)
            .await
            .with_context(|| format!("无法创建目录: {}", config.normalized_dir.display()))?;

        let controller = FlowController::new(
            Arc::new(ReqwestTransport::new()),
            Arc::new(FilePhotoSource::new(config.photo_path.as_ref().map(PathBuf::from))),
            Arc::new(JpegImageTransform::new(config.normalized_dir.clone())),
            &config,
        );

        Ok(Self::with_controller(config, Arc::new(controller)))
    }

    /// 使用已组装好的控制器创建应用
    pub fn with_controller(config: Config, controller: Arc<FlowController>) -> Self {
        Self { config, controller }
    }

    pub fn controller(&self) -> &Arc<FlowController> {
        &self.controller
    }

    /// 运行一次诊断会话
    pub async fn run(&self) -> Result<SessionReport> {
        log_startup(&self.config, &self.controller.endpoints());

        let wants_photo = self.config.photo_path.is_some();
        let (health, submission) = tokio::join!(
            self.controller.run_health_check(),
            self.capture_and_submit(wants_photo)
        );

        let report = SessionReport {
            health: settled_view(FlowKind::Health, health),
            submission: submission.and_then(|outcome| settled_view(FlowKind::Submission, outcome)),
        };

        if let Some(view) = &report.health {
            log_result_view(FlowKind::Health, view, self.config.verbose_logging);
        }
        match &report.submission {
            Some(view) => log_result_view(FlowKind::Submission, view, self.config.verbose_logging),
            None if wants_photo => {
                // 拍照失败或取消时没有提交，展示拍照阶段记录的结果
                if let Some(view) = self.controller.submission_view() {
                    log_result_view(FlowKind::Submission, &view, self.config.verbose_logging);
                }
            }
            None => info!("未配置 OMR_PHOTO_PATH，跳过照片提交"),
        }

        print_final_stats(report.succeeded(), report.total());
        Ok(report)
    }

    /// 拍照并提交；拍照失败或取消时返回 None
    async fn capture_and_submit(&self, wants_photo: bool) -> Option<TriggerOutcome> {
        if !wants_photo {
            return None;
        }

        match self.controller.acquire_photo().await {
            Ok(Some(_)) => Some(self.controller.run_submission().await),
            Ok(None) => None,
            Err(e) => {
                warn!("⚠️ 无法获取照片，跳过提交: {}", e);
                None
            }
        }
    }
}

fn settled_view(kind: FlowKind, outcome: TriggerOutcome) -> Option<ResultView> {
    match outcome {
        TriggerOutcome::Settled(outcome) => Some(ResultView::from_outcome(kind, &outcome)),
        TriggerOutcome::Rejected => None,
    }
}
