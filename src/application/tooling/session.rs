use super::error::ToolSessionError;
use crate::config::ToolServerConfig;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tracing::{debug, warn};

const PROTOCOL_VERSION: &str = "2025-06-18";

/// One tool advertised by the server.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Option<Value>,
}

/// A scoped connection to the tool-provider subprocess. The session lives
/// for exactly one query submission: `open` spawns and initializes the
/// server, `shutdown` kills and reaps it. Callers own the lifecycle and
/// must call `shutdown` on every path.
#[derive(Clone)]
pub struct ToolSession {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    command: String,
    child: AsyncMutex<Option<Child>>,
    writer: AsyncMutex<Option<BufWriter<ChildStdin>>>,
    pending: AsyncMutex<HashMap<String, oneshot::Sender<Result<Value, ToolSessionError>>>>,
    id_counter: AtomicU64,
    tools: AsyncMutex<Vec<ToolDescriptor>>,
}

impl ToolSession {
    /// Spawn the configured server, run the initialize handshake, and load
    /// the tool catalogue. On handshake failure the child is reaped before
    /// the error is returned.
    pub async fn open(config: &ToolServerConfig) -> Result<Self, ToolSessionError> {
        let mut command = Command::new(&config.command);
        command
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true);
        if !config.args.is_empty() {
            command.args(&config.args);
        }
        for (key, value) in &config.env {
            command.env(key, value);
        }
        if let Some(dir) = &config.workdir {
            command.current_dir(shellexpand::tilde(dir).as_ref());
        }

        let mut child = command.spawn().map_err(|source| ToolSessionError::Spawn {
            command: config.command.clone(),
            source,
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| transport("failed to capture server stdin"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| transport("failed to capture server stdout"))?;

        let session = Self {
            inner: Arc::new(SessionInner {
                command: config.command.clone(),
                child: AsyncMutex::new(Some(child)),
                writer: AsyncMutex::new(Some(BufWriter::new(stdin))),
                pending: AsyncMutex::new(HashMap::new()),
                id_counter: AtomicU64::new(1),
                tools: AsyncMutex::new(Vec::new()),
            }),
        };

        let reader = Arc::clone(&session.inner);
        tokio::spawn(async move {
            reader.reader_loop(stdout).await;
        });

        match session.inner.initialize_sequence().await {
            Ok(()) => Ok(session),
            Err(err) => {
                session.shutdown().await;
                Err(err)
            }
        }
    }

    /// Tear down the subprocess and fail any in-flight requests. Safe to
    /// call more than once.
    pub async fn shutdown(&self) {
        self.inner.reset().await;
    }
}

#[async_trait::async_trait]
impl super::interface::ToolInterface for ToolSession {
    /// Tools currently advertised by the server.
    async fn tools(&self) -> Vec<ToolDescriptor> {
        self.inner.tools.lock().await.clone()
    }

    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolSessionError> {
        self.inner.call_tool(tool, arguments).await
    }
}

impl SessionInner {
    async fn initialize_sequence(self: &Arc<Self>) -> Result<(), ToolSessionError> {
        let params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "clientInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            },
            "capabilities": {}
        });
        self.send_request("initialize", params).await?;
        self.send_notification("notifications/initialized", json!({}))
            .await?;
        self.refresh_tools().await?;
        Ok(())
    }

    async fn call_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolSessionError> {
        let params = json!({
            "name": tool,
            "arguments": match arguments {
                Value::Null => Value::Object(Default::default()),
                other => other,
            }
        });
        self.send_request("tools/call", params).await
    }

    async fn refresh_tools(&self) -> Result<(), ToolSessionError> {
        let result = self.send_request("tools/list", json!({})).await?;
        let mut catalogue = Vec::new();
        if let Some(array) = result.get("tools").and_then(Value::as_array) {
            for tool in array {
                if let Some(name) = tool.get("name").and_then(Value::as_str) {
                    catalogue.push(ToolDescriptor {
                        name: name.to_string(),
                        description: tool
                            .get("description")
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        input_schema: tool.get("inputSchema").cloned(),
                    });
                }
            }
        }
        debug!(tools = catalogue.len(), "loaded tool catalogue");
        *self.tools.lock().await = catalogue;
        Ok(())
    }

    async fn reader_loop(self: Arc<Self>, stdout: ChildStdout) {
        let mut lines = BufReader::new(stdout).lines();
        while let Ok(item) = lines.next_line().await {
            let raw = match item {
                Some(raw) => raw,
                None => break,
            };
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<Value>(trimmed) {
                Ok(value) => {
                    if let Err(err) = self.process_inbound_message(value).await {
                        warn!(command = %self.command, %err, "failed to process tool server message");
                    }
                }
                Err(source) => {
                    warn!(command = %self.command, line = trimmed, %source, "tool server emitted non-JSON line");
                }
            }
        }
        self.reset().await;
    }

    async fn process_inbound_message(&self, value: Value) -> Result<(), ToolSessionError> {
        if let Some(id) = value.get("id").cloned() {
            if value.get("method").is_some() {
                self.handle_server_request(id, value).await
            } else {
                self.handle_response(id, value).await;
                Ok(())
            }
        } else if value.get("method").is_some() {
            self.handle_notification(value).await;
            Ok(())
        } else {
            Ok(())
        }
    }

    async fn handle_response(&self, id: Value, value: Value) {
        let key = match response_key(&id) {
            Some(key) => key,
            None => return,
        };
        let responder = self.pending.lock().await.remove(&key);
        let Some(sender) = responder else {
            debug!(command = %self.command, response_id = key, "response for unknown request");
            return;
        };

        if let Some(error) = value.get("error") {
            let code = error.get("code").and_then(Value::as_i64).unwrap_or(-32000);
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            let _ = sender.send(Err(ToolSessionError::Rpc { code, message }));
        } else {
            let _ = sender.send(Ok(value));
        }
    }

    async fn handle_server_request(&self, id: Value, value: Value) -> Result<(), ToolSessionError> {
        let method = value
            .get("method")
            .and_then(Value::as_str)
            .unwrap_or_default();
        match method {
            "ping" => self.send_response(id, json!({})).await,
            other => {
                warn!(command = %self.command, method = other, "server sent unsupported request");
                let error = json!({
                    "code": -32601,
                    "message": format!("client does not implement method '{other}'"),
                });
                self.send_error(id, error).await
            }
        }
    }

    async fn handle_notification(&self, value: Value) {
        if let Some(method) = value.get("method").and_then(Value::as_str) {
            debug!(command = %self.command, method, "notification from tool server");
            if method == "notifications/tools/list_changed" {
                if let Err(err) = self.refresh_tools().await {
                    warn!(command = %self.command, %err, "failed to refresh tool catalogue");
                }
            }
        }
    }

    async fn send_request(&self, method: &str, params: Value) -> Result<Value, ToolSessionError> {
        let id = format!("req-{}", self.id_counter.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params
        });
        self.write_message(&payload).await?;

        match rx.await {
            Ok(Ok(value)) => Ok(value.get("result").cloned().unwrap_or(Value::Null)),
            Ok(Err(err)) => Err(err),
            Err(_) => Err(ToolSessionError::Cancelled),
        }
    }

    async fn send_notification(&self, method: &str, params: Value) -> Result<(), ToolSessionError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params
        });
        self.write_message(&payload).await
    }

    async fn send_response(&self, id: Value, result: Value) -> Result<(), ToolSessionError> {
        self.write_message(&json!({ "jsonrpc": "2.0", "id": id, "result": result }))
            .await
    }

    async fn send_error(&self, id: Value, error: Value) -> Result<(), ToolSessionError> {
        self.write_message(&json!({ "jsonrpc": "2.0", "id": id, "error": error }))
            .await
    }

    async fn write_message(&self, message: &Value) -> Result<(), ToolSessionError> {
        let encoded = serde_json::to_string(message)
            .map_err(|source| ToolSessionError::InvalidJson { source })?;

        let mut writer = self.writer.lock().await;
        let stream = writer
            .as_mut()
            .ok_or_else(|| transport("writer not available"))?;
        stream
            .write_all(encoded.as_bytes())
            .await
            .map_err(|source| transport(source.to_string()))?;
        stream
            .write_all(b"\n")
            .await
            .map_err(|source| transport(source.to_string()))?;
        stream
            .flush()
            .await
            .map_err(|source| transport(source.to_string()))?;
        Ok(())
    }

    async fn reset(&self) {
        self.writer.lock().await.take();

        if let Some(mut child) = self.child.lock().await.take() {
            if let Err(err) = child.kill().await {
                debug!(command = %self.command, %err, "tool server already exited");
            }
            let _ = child.wait().await;
        }

        let mut pending = self.pending.lock().await;
        for (_, sender) in pending.drain() {
            let _ = sender.send(Err(ToolSessionError::Terminated));
        }
        drop(pending);

        self.tools.lock().await.clear();
    }
}

fn transport(message: impl Into<String>) -> ToolSessionError {
    ToolSessionError::Transport {
        message: message.into(),
    }
}

fn response_key(id: &Value) -> Option<String> {
    match id {
        Value::String(value) => Some(value.clone()),
        Value::Number(num) => Some(num.to_string()),
        _ => None,
    }
}
