// ==========================================
// 防护对象阈值报表 - 报表管道
// ==========================================
// 流程: 登录 → 列对象 → 并发拉取 → 归一化 → 评估 → 构建 → 渲染 → 写文件 → 投递
// 约束:
// - 拉取并发受 max_concurrency 限制, 结果保持请求顺序
// - 任一拉取失败即中止, 不写出文件
// - 投递失败不删除已写出的文件
// ==========================================

use crate::config::{ConfigResult, MalformedPolicy, ReportConfig};
use crate::controller::{ControllerClient, FetchError, Session};
use crate::delivery::{render_body, Attachment, BodyContext, DeliveryDispatcher, Recipients};
use crate::domain::raw::{RawMaxima, RawThresholdPayload};
use crate::domain::report::ObjectReport;
use crate::engine::{EngineError, RecordNormalizer, ViolationEvaluator};
use crate::pipeline::error::{PipelineError, PipelineResult, Stage};
use crate::report::{HighlightScheme, RenderError, ReportBuilder};
use chrono::{DateTime, Local};
use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

const BODY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ==========================================
// RunSummary - 单次运行结果
// ==========================================

/// 被跳过的对象 (格式错误)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedObject {
    pub object: String,
    pub reason: String,
}

/// 投递结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "lowercase")]
pub enum DeliveryStatus {
    Disabled,
    Sent,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub run_id: String,
    pub output_path: PathBuf,
    /// 控制器列出的对象总数 (含跳过的)
    pub total_objects: usize,
    /// 报表中的行数
    pub reported_objects: usize,
    pub violating_objects: usize,
    pub skipped: Vec<SkippedObject>,
    pub delivery: DeliveryStatus,
}

impl RunSummary {
    pub fn delivery_failed(&self) -> bool {
        matches!(self.delivery, DeliveryStatus::Failed(_))
    }
}

/// 单个对象的原始载荷
#[derive(Debug)]
struct FetchedObject {
    name: String,
    thresholds: RawThresholdPayload,
    maxima: RawMaxima,
}

// ==========================================
// ReportPipeline
// ==========================================

pub struct ReportPipeline {
    config: Arc<ReportConfig>,
    normalizer: RecordNormalizer,
    evaluator: ViolationEvaluator,
    builder: ReportBuilder,
    scheme: HighlightScheme,
}

impl ReportPipeline {
    /// 创建管道; 阈值比例无效时返回 ConfigError
    pub fn new(config: Arc<ReportConfig>) -> ConfigResult<Self> {
        let evaluator = ViolationEvaluator::new(config.threshold_fraction()?);
        Ok(Self {
            normalizer: RecordNormalizer::new(),
            evaluator,
            builder: ReportBuilder::new(config.report.lookback_days),
            scheme: HighlightScheme::default(),
            config,
        })
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// 执行一次完整报表运行
    ///
    /// # 参数
    /// - client: 控制器客户端
    /// - dispatcher: 投递器; None 或邮件未启用时跳过投递
    pub async fn run(
        &self,
        client: &dyn ControllerClient,
        dispatcher: Option<&dyn DeliveryDispatcher>,
    ) -> PipelineResult<RunSummary> {
        let run_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("report_run", run_id = %run_id);
        self.execute(run_id, client, dispatcher)
            .instrument(span)
            .await
    }

    async fn execute(
        &self,
        run_id: String,
        client: &dyn ControllerClient,
        dispatcher: Option<&dyn DeliveryDispatcher>,
    ) -> PipelineResult<RunSummary> {
        info!(
            lookback_days = self.config.report.lookback_days,
            fraction = %self.evaluator.fraction(),
            format = %self.config.report.format,
            "开始生成防护对象阈值报表"
        );

        // ==========================================
        // 步骤1: 登录 + 列对象
        // ==========================================
        let session = client.authenticate().await?;
        info!(controller = %session.controller_url, "控制器登录成功");

        let listed = client.list_objects(&session).await?;
        let total_objects = listed.len();
        info!(objects = total_objects, "获取防护对象列表");

        // 无名对象无法拉取, 直接按格式错误处理
        let mut skipped = Vec::new();
        let mut names = Vec::with_capacity(listed.len());
        for name in listed {
            match self.normalizer.check_name(&name) {
                Ok(_) => names.push(name),
                Err(err) => self.reject(err, &name, &mut skipped)?,
            }
        }

        // ==========================================
        // 步骤2: 并发拉取 (保持请求顺序)
        // ==========================================
        let fetched = self.fetch_all(client, &session, &names).await?;

        // ==========================================
        // 步骤3: 归一化 + 评估
        // ==========================================
        let reports = self.evaluate_all(fetched, &mut skipped)?;
        let violating_objects = reports.iter().filter(|r| r.is_violating()).count();
        debug!(
            stage = %Stage::Evaluate,
            evaluated = reports.len(),
            violating = violating_objects,
            "评估完成"
        );

        // ==========================================
        // 步骤4: 构建 + 渲染 + 写文件
        // ==========================================
        let now = Local::now();
        let artifact = self.builder.build(&reports);
        let renderer = self.config.report.format.renderer(self.scheme);
        let bytes = renderer.render(&artifact)?;
        let output_path = self.config.output_path(&now, renderer.extension());
        write_artifact(&output_path, &bytes).await?;

        info!(
            path = %output_path.display(),
            rows = artifact.row_count(),
            highlighted = artifact.highlighted_count(),
            skipped = skipped.len(),
            "报表已写出"
        );

        // ==========================================
        // 步骤5: 投递
        // ==========================================
        let delivery = match dispatcher {
            Some(dispatcher) if self.config.email.enabled => {
                let filename = output_path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let attachment = Attachment {
                    bytes: &bytes,
                    filename: &filename,
                    content_type: renderer.content_type(),
                };
                self.deliver(dispatcher, attachment, &now, total_objects, violating_objects)
                    .await
            }
            _ => {
                debug!(stage = %Stage::Deliver, "邮件投递未启用");
                DeliveryStatus::Disabled
            }
        };

        Ok(RunSummary {
            run_id,
            output_path,
            total_objects,
            reported_objects: reports.len(),
            violating_objects,
            skipped,
            delivery,
        })
    }

    async fn fetch_all(
        &self,
        client: &dyn ControllerClient,
        session: &Session,
        names: &[String],
    ) -> PipelineResult<Vec<FetchedObject>> {
        let lookback_days = self.config.report.lookback_days;
        let width = self.config.controller.max_concurrency.max(1);

        let fetched = stream::iter(names)
            .map(|name| async move {
                let (thresholds, maxima) = futures::try_join!(
                    client.get_thresholds(session, name),
                    client.get_max_traffic(session, name, lookback_days),
                )?;
                debug!(object = %name, "对象数据拉取完成");
                Ok::<_, FetchError>(FetchedObject {
                    name: name.clone(),
                    thresholds,
                    maxima,
                })
            })
            .buffered(width)
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| {
                warn!(stage = %Stage::Fetch, object = %e.object(), error = %e, "拉取失败, 中止运行");
                e
            })?;

        Ok(fetched)
    }

    fn evaluate_all(
        &self,
        fetched: Vec<FetchedObject>,
        skipped: &mut Vec<SkippedObject>,
    ) -> PipelineResult<Vec<ObjectReport>> {
        let mut reports = Vec::with_capacity(fetched.len());
        let mut seen = HashSet::new();

        for object in fetched {
            let normalized = if seen.insert(object.name.trim().to_string()) {
                self.normalizer
                    .normalize(&object.name, &object.thresholds, &object.maxima)
            } else {
                Err(EngineError::malformed(&object.name, "name", "对象名重复"))
            };

            match normalized {
                Ok(report) => reports.push(self.evaluator.evaluate(report)),
                Err(err) => self.reject(err, &object.name, skipped)?,
            }
        }

        Ok(reports)
    }

    /// 按 MalformedPolicy 处理格式错误: 跳过并记录, 或中止
    fn reject(
        &self,
        err: EngineError,
        name: &str,
        skipped: &mut Vec<SkippedObject>,
    ) -> PipelineResult<()> {
        match self.config.report.on_malformed {
            MalformedPolicy::Skip => {
                warn!(stage = %Stage::Normalize, error = %err, "跳过格式错误的对象");
                skipped.push(SkippedObject {
                    object: err.object().unwrap_or(name).to_string(),
                    reason: err.to_string(),
                });
                Ok(())
            }
            MalformedPolicy::Abort => Err(PipelineError::Normalize(err)),
        }
    }

    async fn deliver(
        &self,
        dispatcher: &dyn DeliveryDispatcher,
        attachment: Attachment<'_>,
        now: &DateTime<Local>,
        total_objects: usize,
        violating_objects: usize,
    ) -> DeliveryStatus {
        let email = &self.config.email;
        let body = render_body(
            &email.body_template,
            &BodyContext {
                date_time: now.format(BODY_DATE_FORMAT).to_string(),
                total_objects,
                violating_objects,
                days_lookback: self.config.report.lookback_days,
                threshold_percentage: self.evaluator.fraction().percentage(),
            },
        );
        let recipients = Recipients::new(email.to.clone(), email.cc.clone());

        match dispatcher
            .send(attachment, &recipients, &email.subject, &body)
            .await
        {
            Ok(()) => {
                info!(recipients = recipients.all().count(), "报表邮件已发送");
                DeliveryStatus::Sent
            }
            Err(err) => {
                warn!(stage = %Stage::Deliver, error = %err, "报表邮件发送失败, 文件已保留");
                DeliveryStatus::Failed(err.to_string())
            }
        }
    }
}

async fn write_artifact(path: &Path, bytes: &[u8]) -> Result<(), RenderError> {
    let write_err = |source| RenderError::Write {
        path: path.display().to_string(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }
    tokio::fs::write(path, bytes).await.map_err(write_err)
}
