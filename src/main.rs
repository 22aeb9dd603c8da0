// ==========================================
// 防护对象阈值报表 - 命令行入口
// ==========================================
// 退出码:
// - 0: 成功
// - 1: 配置错误 / 管道失败
// - 3: 报表已写出, 但邮件投递失败
// ==========================================

use anyhow::Context;
use clap::Parser;
use po_threshold_report::config::ReportConfig;
use po_threshold_report::delivery::{DeliveryDispatcher, SmtpDispatcher};
use po_threshold_report::{logging, HttpControllerClient, ReportFormat, ReportPipeline};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

const EXIT_DELIVERY_FAILED: u8 = 3;

/// Protected-object flow-detector threshold report
#[derive(Debug, Parser)]
#[command(name = "po-threshold-report", version, about)]
struct Cli {
    /// 配置文件路径 (默认: <config_dir>/po-threshold-report/config.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 不发送邮件 (覆盖配置)
    #[arg(long)]
    no_email: bool,

    /// 输出目录 (覆盖配置)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// 输出格式: xlsx | csv (覆盖配置)
    #[arg(short, long)]
    format: Option<ReportFormat>,

    /// 仅加载并校验配置, 不执行报表
    #[arg(long)]
    check_config: bool,

    /// 以 JSON 行输出日志
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.log_json);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", po_threshold_report::APP_NAME, po_threshold_report::VERSION);
    tracing::info!("==================================================");

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %format!("{e:#}"), "报表运行失败");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let path = match cli.config {
        Some(path) => path,
        None => ReportConfig::default_path()?,
    };
    tracing::info!(path = %path.display(), "加载配置");

    let mut config = ReportConfig::load(&path)
        .with_context(|| format!("配置加载失败: {}", path.display()))?;
    if cli.no_email {
        config.email.enabled = false;
    }
    if let Some(dir) = cli.output_dir {
        config.report.output_dir = dir;
    }
    if let Some(format) = cli.format {
        config.report.format = format;
    }

    if cli.check_config {
        tracing::info!("配置校验通过");
        return Ok(ExitCode::SUCCESS);
    }

    let config = Arc::new(config);
    let pipeline = ReportPipeline::new(config.clone())?;
    let client = HttpControllerClient::new(&config.controller)?;

    let dispatcher = if config.email.enabled {
        let smtp = SmtpDispatcher::new(&config.email).context("SMTP 配置无效")?;
        // 预检失败只告警, 报表照常生成
        match smtp.check_connection().await {
            Ok(true) => tracing::info!("SMTP 连接测试成功"),
            Ok(false) => tracing::warn!("SMTP 连接测试未通过, 报表将照常生成"),
            Err(e) => tracing::warn!(error = %e, "SMTP 连接测试失败, 报表将照常生成"),
        }
        Some(smtp)
    } else {
        None
    };

    let summary = pipeline
        .run(
            &client,
            dispatcher.as_ref().map(|d| d as &dyn DeliveryDispatcher),
        )
        .await?;

    tracing::info!(
        path = %summary.output_path.display(),
        total = summary.total_objects,
        reported = summary.reported_objects,
        violating = summary.violating_objects,
        skipped = summary.skipped.len(),
        delivery = ?summary.delivery,
        "报表运行完成"
    );
    println!("{}", summary.output_path.display());

    if summary.delivery_failed() {
        return Ok(ExitCode::from(EXIT_DELIVERY_FAILED));
    }
    Ok(ExitCode::SUCCESS)
}
