//! Test helpers for integration tests
//!
//! Provides fake Satori hosts and a bot harness wired the same way the
//! binary wires it, minus the network where the scenario does not need it.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use waifu_cache::{MemoryCache, SharedCache};
use waifu_common::{RedisConfig, SatoriConfig, WaifuConfig};
use waifu_core::{HostError, MemberListSource, MemberPage, MemberSnapshot};
use waifu_gateway::{CommandParser, Dispatcher, SatoriClient};
use waifu_service::{ServiceContext, ServiceContextBuilder};

use crate::fixtures::requester;

// ============================================================================
// Member list fakes
// ============================================================================

/// Serves a fixed member list in pages, optionally failing at one page
pub struct FakeHost {
    members: Vec<MemberSnapshot>,
    page_size: usize,
    fail_at: Option<usize>,
    calls: AtomicUsize,
}

impl FakeHost {
    pub fn new(members: Vec<MemberSnapshot>) -> Self {
        Self {
            members,
            page_size: usize::MAX,
            fail_at: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Split the listing into pages of `size`
    pub fn paged(mut self, size: usize) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Fail when page `index` (zero-based) is requested
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// A host whose member list always fails
    pub fn down() -> Self {
        Self::new(Vec::new()).failing_at(0)
    }

    /// Number of member-list calls served so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MemberListSource for FakeHost {
    async fn guild_member_list(
        &self,
        _guild_id: &str,
        next: Option<&str>,
    ) -> Result<MemberPage, HostError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let index = next
            .map_or(Ok(0), str::parse::<usize>)
            .map_err(|_| HostError::Decode(format!("bad page token {next:?}")))?;
        if self.fail_at == Some(index) {
            return Err(HostError::Request("connection reset".to_string()));
        }

        let start = index.saturating_mul(self.page_size).min(self.members.len());
        let end = start.saturating_add(self.page_size).min(self.members.len());
        let next = (end < self.members.len()).then(|| (index + 1).to_string());
        Ok(MemberPage {
            data: self.members[start..end].to_vec(),
            next,
        })
    }
}

// ============================================================================
// Bot harness
// ============================================================================

/// Satori settings pointing at `endpoint`
pub fn satori_config(endpoint: &str) -> SatoriConfig {
    SatoriConfig {
        endpoint: endpoint.to_string(),
        token: Some("secret".to_string()),
        timeout_secs: 5,
        reconnect_delay_ms: 50,
    }
}

/// Service context over an in-memory cache with a fixed seed
pub fn test_context(config: WaifuConfig, seed: u64) -> ServiceContext {
    test_context_with_cache(Arc::new(MemoryCache::new()), config, seed)
}

pub fn test_context_with_cache(cache: SharedCache, config: WaifuConfig, seed: u64) -> ServiceContext {
    ServiceContextBuilder::new()
        .cache(cache)
        .config(config)
        .seed(seed)
        .build()
        .expect("Failed to build service context")
}

/// Dispatcher plus the parser it was built with, for driving commands
/// without a live event stream
pub struct TestBot {
    pub dispatcher: Dispatcher,
    parser: CommandParser,
}

impl TestBot {
    pub fn new(config: WaifuConfig, seed: u64) -> Self {
        Self::with_context(test_context(config.clone(), seed), &config)
    }

    pub fn with_context(ctx: ServiceContext, config: &WaifuConfig) -> Self {
        // Unroutable; replies are rendered but never sent
        let client = SatoriClient::new(&satori_config("http://127.0.0.1:9"))
            .expect("Failed to build Satori client");
        let parser = CommandParser::new(&config.command_prefix, config.force_marry);
        Self {
            dispatcher: Dispatcher::new(ctx, client, parser.clone()),
            parser,
        }
    }

    pub fn context(&self) -> &ServiceContext {
        self.dispatcher.context()
    }

    /// Send `content` as `user_id` and return the rendered reply, if any
    pub async fn say(&self, user_id: &str, content: &str, host: &dyn MemberListSource) -> Option<String> {
        let command = self.parser.parse(content)?;
        self.dispatcher
            .execute(&requester(user_id), command, Some("m1"), host)
            .await
    }
}

// ============================================================================
// Fake Satori HTTP API
// ============================================================================

/// A request received by [`FakeHttpHost`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    /// Header names are lowercased
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

type Responder = Arc<dyn Fn(&RecordedRequest) -> (u16, Value) + Send + Sync>;

/// Minimal HTTP/1.1 server that records requests and answers with JSON
pub struct FakeHttpHost {
    pub addr: SocketAddr,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    _handle: JoinHandle<()>,
}

impl FakeHttpHost {
    pub async fn start<F>(respond: F) -> Result<Self>
    where
        F: Fn(&RecordedRequest) -> (u16, Value) + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let requests = Arc::new(Mutex::new(Vec::new()));
        let respond: Responder = Arc::new(respond);

        let recorded = requests.clone();
        let handle = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let recorded = recorded.clone();
                let respond = respond.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve_http(socket, &recorded, &respond).await {
                        eprintln!("fake host connection failed: {e}");
                    }
                });
            }
        });

        Ok(Self {
            addr,
            requests,
            _handle: handle,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }
}

async fn serve_http(
    mut socket: TcpStream,
    recorded: &Mutex<Vec<RecordedRequest>>,
    respond: &Responder,
) -> Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            bail!("connection closed before headers");
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let path = lines
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .unwrap_or_default()
        .to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|line| {
            let (name, value) = line.split_once(':')?;
            Some((name.trim().to_ascii_lowercase(), value.trim().to_string()))
        })
        .collect();
    let content_length = headers
        .iter()
        .find(|(name, _)| name == "content-length")
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            bail!("connection closed mid-body");
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let body_bytes = &buf[header_end..header_end + content_length];
    let body = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(body_bytes)?
    };

    let request = RecordedRequest {
        path,
        headers,
        body,
    };
    let (status, payload) = respond(&request);
    recorded.lock().push(request);

    let payload = payload.to_string();
    let response = format!(
        "HTTP/1.1 {status} Fake\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{payload}",
        payload.len()
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await?;
    Ok(())
}

// ============================================================================
// Fake Satori event WebSocket
// ============================================================================

/// Event WebSocket that answers IDENTIFY with READY, pushes the scripted
/// event bodies, then closes the connection
pub struct FakeEventHost {
    pub addr: SocketAddr,
    identifies: Arc<Mutex<Vec<Value>>>,
    _handle: JoinHandle<()>,
}

impl FakeEventHost {
    pub async fn start(events: Vec<Value>) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let identifies = Arc::new(Mutex::new(Vec::new()));

        let recorded = identifies.clone();
        let handle = tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                if let Err(e) = serve_events(socket, &recorded, &events).await {
                    eprintln!("fake event host session failed: {e}");
                }
            }
        });

        Ok(Self {
            addr,
            identifies,
            _handle: handle,
        })
    }

    pub fn endpoint(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// IDENTIFY bodies received, one per connection
    pub fn identifies(&self) -> Vec<Value> {
        self.identifies.lock().clone()
    }
}

async fn serve_events(
    socket: TcpStream,
    identifies: &Mutex<Vec<Value>>,
    events: &[Value],
) -> Result<()> {
    let mut ws = tokio_tungstenite::accept_async(socket).await?;

    let identify = loop {
        match ws.next().await {
            Some(Ok(WsMessage::Text(text))) => {
                let signal: Value = serde_json::from_str(&text)?;
                if signal["op"] == 3 {
                    break signal["body"].clone();
                }
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(e.into()),
            None => bail!("client left before IDENTIFY"),
        }
    };
    identifies.lock().push(identify);

    let ready = json!({ "op": 4, "body": { "logins": [{ "platform": "qq", "self_id": "bot" }] } });
    ws.send(WsMessage::Text(ready.to_string())).await?;

    for body in events {
        let frame = json!({ "op": 0, "body": body });
        ws.send(WsMessage::Text(frame.to_string())).await?;
    }

    ws.close(None).await?;
    // Drain until the client acknowledges the close
    while let Some(Ok(_)) = ws.next().await {}
    Ok(())
}

/// Wait until `check` holds, polling every few milliseconds
pub async fn eventually<F: Fn() -> bool>(check: F, within: Duration) -> bool {
    let deadline = tokio::time::Instant::now() + within;
    while tokio::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

// ============================================================================
// Environment
// ============================================================================

/// Redis settings from the environment, if a test server is available
pub fn redis_config() -> Option<RedisConfig> {
    dotenvy::dotenv().ok();

    match std::env::var("REDIS_URL") {
        Ok(url) => Some(RedisConfig {
            url,
            max_connections: 4,
        }),
        Err(_) => {
            eprintln!("Skipping test: REDIS_URL not set");
            None
        }
    }
}
