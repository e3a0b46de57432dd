use std::any::Any;
use std::io::{self, BufRead, Write};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use serde_json::{json, Value};

use crate::config::{ServerConfig, ServerInfo};
use crate::protocol::{parse_request, JsonRpcRequest, JsonRpcResponse, RpcError, JSONRPC_VERSION};
use crate::tool::{Tool, ToolDescriptor, ToolRegistry};
use crate::tools::{memory_tools, MemoryContext};

pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Debug, Default, Clone, Copy)]
struct Lifecycle {
    initialized: bool,
    running: bool,
}

/// Routes JSON-RPC requests to lifecycle handlers and registered tools.
pub struct McpServer {
    info: ServerInfo,
    registry: RwLock<ToolRegistry>,
    lifecycle: Mutex<Lifecycle>,
}

impl McpServer {
    pub fn new(info: ServerInfo) -> Self {
        Self {
            info,
            registry: RwLock::new(ToolRegistry::new()),
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Server with the memory tool family registered against the configured
    /// data directory.
    pub fn from_config(config: &ServerConfig) -> Self {
        let server = Self::new(config.server_info.clone());
        let ctx = MemoryContext::open(config.layout());
        for tool in memory_tools(&ctx) {
            server.register(tool);
        }
        tracing::info!(tools = server.registry.read().len(), "registered tools");
        server
    }

    pub fn register(&self, tool: Arc<dyn Tool>) {
        let name = tool.name();
        if self.registry.write().register(tool).is_some() {
            tracing::debug!(tool = name, "replaced tool");
        } else {
            tracing::debug!(tool = name, "registered tool");
        }
    }

    pub fn unregister(&self, name: &str) -> bool {
        self.registry.write().unregister(name)
    }

    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        self.registry.read().descriptors()
    }

    pub fn is_initialized(&self) -> bool {
        self.lifecycle.lock().initialized
    }

    pub fn is_running(&self) -> bool {
        self.lifecycle.lock().running
    }

    /// Handles one framed line: decode, dispatch, and wrap in an envelope.
    pub fn handle_line(&self, line: &str) -> JsonRpcResponse {
        match parse_request(line) {
            Ok(request) => self.handle_request(request),
            Err((id, err)) => {
                tracing::warn!(code = err.code.code(), error = %err, "rejected message");
                JsonRpcResponse::error(id, err)
            }
        }
    }

    pub fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone().unwrap_or(Value::Null);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.dispatch(&request)))
            .unwrap_or_else(|payload| {
                let message = panic_message(payload.as_ref());
                tracing::error!(method = %request.method, %message, "request handler panicked");
                Err(RpcError::internal(message))
            });

        match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => JsonRpcResponse::error(id, err),
        }
    }

    fn dispatch(&self, request: &JsonRpcRequest) -> Result<Value, RpcError> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Err(RpcError::invalid_request("invalid jsonrpc version"));
        }
        tracing::debug!(method = %request.method, "handling request");

        match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "tools/list" => Ok(json!({ "tools": self.list_tools() })),
            "tools/call" => self.handle_tools_call(&request.params),
            "shutdown" => Ok(self.handle_shutdown()),
            other => Err(RpcError::method_not_found(format!("Unknown method: {other}"))),
        }
    }

    fn handle_initialize(&self) -> Value {
        self.lifecycle.lock().initialized = true;
        tracing::info!("mcp server initialized");
        json!({
            "protocolVersion": MCP_PROTOCOL_VERSION,
            "capabilities": {
                "tools": {}
            },
            "serverInfo": self.info
        })
    }

    fn handle_shutdown(&self) -> Value {
        self.lifecycle.lock().running = false;
        tracing::info!("mcp server shutting down");
        json!({})
    }

    fn handle_tools_call(&self, params: &Value) -> Result<Value, RpcError> {
        let name = params
            .get("name")
            .and_then(Value::as_str)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| RpcError::invalid_params("Missing tool name"))?;
        let tool = self
            .registry
            .read()
            .get(name)
            .ok_or_else(|| RpcError::method_not_found(format!("Tool not found: {name}")))?;
        let arguments = match params.get("arguments") {
            None | Some(Value::Null) => json!({}),
            Some(arguments) => arguments.clone(),
        };

        let start = Instant::now();
        let result = tool.execute(arguments).map_err(|err| {
            tracing::error!(tool = name, error = %err, "tool execution failed");
            RpcError::internal(err.to_string())
        })?;
        tracing::debug!(
            tool = name,
            latency_ms = start.elapsed().as_secs_f64() * 1000.0,
            "tool call finished"
        );

        let text = serde_json::to_string(&result).map_err(|err| RpcError::internal(err.to_string()))?;
        Ok(json!({
            "content": [
                {"type": "text", "text": text}
            ]
        }))
    }

    pub fn serve_stdio(&self) -> io::Result<()> {
        let stdin = io::stdin();
        let reader = io::BufReader::new(stdin.lock());
        self.serve(reader, io::stdout())
    }

    /// Blocking read-dispatch-write loop over newline-delimited messages.
    ///
    /// Returns `Ok` at end of stream or after `shutdown`. Request-level
    /// failures become error responses; I/O failures end the loop.
    pub fn serve<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> io::Result<()> {
        self.lifecycle.lock().running = true;
        tracing::info!("mcp server starting");

        let outcome = self.read_loop(&mut reader, &mut writer);
        self.lifecycle.lock().running = false;
        match &outcome {
            Ok(()) => tracing::info!("mcp server stopped"),
            Err(err) => tracing::error!(error = %err, "mcp server loop failed"),
        }
        outcome
    }

    fn read_loop<R: BufRead, W: Write>(&self, reader: &mut R, writer: &mut W) -> io::Result<()> {
        let mut line = String::new();
        while self.is_running() {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let response = self.handle_line(trimmed);
            write_response(writer, &response)?;
        }
        Ok(())
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new(ServerInfo::default())
    }
}

fn write_response<W: Write>(writer: &mut W, response: &JsonRpcResponse) -> io::Result<()> {
    let serialized = serde_json::to_string(response)?;
    writeln!(writer, "{serialized}")?;
    writer.flush()
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "request handler panicked".to_string())
}
