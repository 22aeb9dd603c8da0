// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供 Mock 控制器客户端、Mock 投递器、测试配置与载荷构造,
//       以及本地 HTTP 桩控制器 (StubController)
// ==========================================

#![allow(dead_code)]

use async_trait::async_trait;
use po_threshold_report::config::ReportConfig;
use po_threshold_report::controller::{AuthError, ControllerClient, FetchError, Session};
use po_threshold_report::delivery::{
    Attachment, DeliveryDispatcher, DeliveryError, DeliveryResult, Recipients,
};
use po_threshold_report::domain::{
    Measure, Protocol, RawMaxima, RawSample, RawThresholdPayload, RawThresholds,
    RawTrafficSeries,
};
use serde_json::{json, Value};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const BYTES_PER_MEGABIT: f64 = 1024.0 * 1024.0;

// ==========================================
// 载荷构造
// ==========================================

/// 只配置 TCP 阈值 (其余为 0)
pub fn tcp_thresholds(mbps: Value, pps: Value) -> RawThresholdPayload {
    let mut raw = RawThresholds::default();
    raw.set(Protocol::Tcp, Measure::Mbps, mbps);
    raw.set(Protocol::Tcp, Measure::Pps, pps);
    RawThresholdPayload::Details(raw)
}

/// 只有 TCP 流量; bps 以 Mbps 给出再换算为字节
pub fn tcp_maxima(max_mbps: f64, max_pps: f64) -> RawMaxima {
    RawMaxima::new().with(
        Protocol::Tcp,
        RawTrafficSeries {
            bps: vec![
                RawSample::new(json!(max_mbps * BYTES_PER_MEGABIT / 2.0)),
                RawSample::new(json!(max_mbps * BYTES_PER_MEGABIT)),
            ],
            pps: vec![RawSample::new(json!(max_pps))],
        },
    )
}

// ==========================================
// ObjectFixture - 单对象的 Mock 响应
// ==========================================
#[derive(Debug, Clone)]
pub struct ObjectFixture {
    pub name: String,
    pub thresholds: RawThresholdPayload,
    pub maxima: RawMaxima,
    pub delay: Duration,
    pub failure: Option<FetchError>,
}

impl ObjectFixture {
    pub fn new(name: &str, thresholds: RawThresholdPayload, maxima: RawMaxima) -> Self {
        Self {
            name: name.to_string(),
            thresholds,
            maxima,
            delay: Duration::ZERO,
            failure: None,
        }
    }

    /// 标准对象: TCP 阈值 / 最大值
    pub fn tcp(name: &str, activation_mbps: f64, max_mbps: f64) -> Self {
        Self::new(
            name,
            tcp_thresholds(json!(activation_mbps), json!(0)),
            tcp_maxima(max_mbps, 0.0),
        )
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn failing(mut self, failure: FetchError) -> Self {
        self.failure = Some(failure);
        self
    }
}

// ==========================================
// MockControllerClient
// ==========================================
#[derive(Debug, Default)]
pub struct MockControllerClient {
    pub objects: Vec<ObjectFixture>,
    pub auth_error: Option<AuthError>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    pub threshold_calls: AtomicUsize,
}

impl MockControllerClient {
    pub fn new(objects: Vec<ObjectFixture>) -> Self {
        Self {
            objects,
            ..Default::default()
        }
    }

    pub fn with_auth_error(mut self, err: AuthError) -> Self {
        self.auth_error = Some(err);
        self
    }

    fn fixture(&self, object_id: &str) -> Result<&ObjectFixture, FetchError> {
        self.objects
            .iter()
            .find(|o| o.name == object_id)
            .ok_or_else(|| FetchError::ObjectNotFound {
                object: object_id.to_string(),
            })
    }

    async fn simulate(&self, fixture: &ObjectFixture) -> Result<(), FetchError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        if !fixture.delay.is_zero() {
            tokio::time::sleep(fixture.delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match &fixture.failure {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ControllerClient for MockControllerClient {
    async fn authenticate(&self) -> Result<Session, AuthError> {
        match &self.auth_error {
            Some(err) => Err(err.clone()),
            None => Ok(Session::new("https://cc.test")),
        }
    }

    async fn list_objects(&self, _session: &Session) -> Result<Vec<String>, FetchError> {
        Ok(self.objects.iter().map(|o| o.name.clone()).collect())
    }

    async fn get_thresholds(
        &self,
        _session: &Session,
        object_id: &str,
    ) -> Result<RawThresholdPayload, FetchError> {
        self.threshold_calls.fetch_add(1, Ordering::SeqCst);
        let fixture = self.fixture(object_id)?;
        self.simulate(fixture).await?;
        Ok(fixture.thresholds.clone())
    }

    async fn get_max_traffic(
        &self,
        _session: &Session,
        object_id: &str,
        _lookback_days: u32,
    ) -> Result<RawMaxima, FetchError> {
        let fixture = self.fixture(object_id)?;
        self.simulate(fixture).await?;
        Ok(fixture.maxima.clone())
    }
}

// ==========================================
// MockDispatcher
// ==========================================
#[derive(Debug, Clone, PartialEq)]
pub struct SentMail {
    pub filename: String,
    pub content_type: String,
    pub size: usize,
    pub to: Vec<String>,
    pub cc: Vec<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct MockDispatcher {
    pub sent: Mutex<Vec<SentMail>>,
    pub fail_with: Option<String>,
}

impl MockDispatcher {
    pub fn failing(message: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail_with: Some(message.to_string()),
        }
    }

    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DeliveryDispatcher for MockDispatcher {
    async fn send(
        &self,
        attachment: Attachment<'_>,
        recipients: &Recipients,
        subject: &str,
        body: &str,
    ) -> DeliveryResult<()> {
        if let Some(message) = &self.fail_with {
            return Err(DeliveryError::Send(message.clone()));
        }
        self.sent.lock().unwrap().push(SentMail {
            filename: attachment.filename.to_string(),
            content_type: attachment.content_type.to_string(),
            size: attachment.bytes.len(),
            to: recipients.to.clone(),
            cc: recipients.cc.clone(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

// ==========================================
// 测试配置
// ==========================================

/// 输出到指定目录的最小可用配置 (邮件关闭)
pub fn test_config(output_dir: &Path) -> ReportConfig {
    let mut config = ReportConfig::default();
    config.controller.primary_url = "https://cc.test".to_string();
    config.controller.max_concurrency = 4;
    config.report.output_dir = output_dir.to_path_buf();
    config
}

/// 开启邮件的配置
pub fn test_config_with_email(output_dir: &Path) -> ReportConfig {
    let mut config = test_config(output_dir);
    config.email.enabled = true;
    config.email.smtp_server = "smtp.test".to_string();
    config.email.from = "reports@example.com".to_string();
    config.email.to = vec!["soc@example.com".to_string()];
    config.email.cc = vec!["noc@example.com".to_string()];
    config
}

/// 目录中的文件列表
pub fn list_files(dir: &Path) -> Vec<std::path::PathBuf> {
    let mut files: Vec<_> = std::fs::read_dir(dir)
        .map(|entries| entries.filter_map(|e| e.ok()).map(|e| e.path()).collect())
        .unwrap_or_default();
    files.sort();
    files
}

// ==========================================
// StubController - 本地 HTTP 桩控制器
// ==========================================
// 每个连接处理一个请求 (Connection: close);
// 应答由测试提供的闭包按 (路径, 请求体, 该路径已命中次数) 决定

#[derive(Debug, Clone)]
pub struct StubReply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl StubReply {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: body.to_string(),
            delay: Duration::ZERO,
        }
    }

    pub fn ok(body: Value) -> Self {
        Self::json(200, body)
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub body: String,
}

impl RecordedRequest {
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).unwrap_or(Value::Null)
    }
}

type StubHandler = dyn Fn(&str, &str, usize) -> StubReply + Send + Sync;

pub struct StubController {
    pub base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubController {
    pub async fn start<F>(handler: F) -> Self
    where
        F: Fn(&str, &str, usize) -> StubReply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("stub should bind");
        let addr = listener.local_addr().expect("stub address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let handler: Arc<StubHandler> = Arc::new(handler);

        let log = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let handler = handler.clone();
                let log = log.clone();
                tokio::spawn(async move {
                    let _ = serve_connection(stream, handler, log).await;
                });
            }
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// 路径以 prefix 开头的请求数
    pub fn hits(&self, prefix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.path.starts_with(prefix))
            .count()
    }
}

async fn serve_connection(
    mut stream: TcpStream,
    handler: Arc<StubHandler>,
    log: Arc<Mutex<Vec<RecordedRequest>>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        if let Some(pos) = find_subslice(&buf, b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let path = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or("/")
        .to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    let hits = {
        let mut log = log.lock().unwrap();
        let hits = log.iter().filter(|r| r.path == path).count();
        log.push(RecordedRequest {
            path: path.clone(),
            body: body.clone(),
        });
        hits
    };

    let reply = (handler.as_ref())(&path, &body, hits);
    if !reply.delay.is_zero() {
        tokio::time::sleep(reply.delay).await;
    }

    let response = format!(
        "HTTP/1.1 {} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );
    stream.write_all(response.as_bytes()).await?;
    stream.shutdown().await
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
