//! MCP Server implementation
//!
//! Line-delimited JSON-RPC over stdio. The server only decodes requests,
//! hands them to the dispatcher and encodes the answer.

use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::error::Result;
use crate::mcp::types::*;

/// MCP Server wrapping a dispatcher
pub struct McpServer {
    config: Config,

    dispatcher: Dispatcher,

    /// Whether the client sent `notifications/initialized`
    initialized: bool,
}

impl McpServer {
    /// Create a new MCP server
    pub fn new(config: Config, dispatcher: Dispatcher) -> Self {
        Self {
            config,
            dispatcher,
            initialized: false,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the server on stdio
    pub async fn run_stdio(&mut self) -> Result<()> {
        let stdin = BufReader::new(tokio::io::stdin());
        let stdout = tokio::io::stdout();
        self.serve(stdin, stdout).await
    }

    /// Serve requests from `reader` until EOF, writing responses to `writer`
    pub async fn serve<R, W>(&mut self, mut reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        info!(
            name = %self.config.server_name,
            version = %self.config.server_version,
            "Starting stdio server"
        );

        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).await? == 0 {
                break;
            }

            let response = match std::str::from_utf8(&buf) {
                Ok(line) if line.trim().is_empty() => continue,
                Ok(line) => self.handle_message(line),
                Err(e) => {
                    warn!(error = %e, "Received a line that is not UTF-8");
                    Some(JsonRpcResponse::error(
                        None,
                        JsonRpcError::parse_error(format!("Invalid UTF-8: {}", e)),
                    ))
                }
            };

            if let Some(response) = response {
                let mut response_str = serde_json::to_string(&response)?;
                response_str.push('\n');
                writer.write_all(response_str.as_bytes()).await?;
                writer.flush().await?;
            }
        }

        info!("Input closed, server stopped normally");
        Ok(())
    }

    /// Handle an incoming JSON-RPC message; `None` for notifications
    pub fn handle_message(&mut self, message: &str) -> Option<JsonRpcResponse> {
        let value: Value = match serde_json::from_str(message) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Failed to parse message");
                return Some(JsonRpcResponse::error(
                    None,
                    JsonRpcError::parse_error(e.to_string()),
                ));
            }
        };

        let id = value
            .get("id")
            .and_then(|id| serde_json::from_value::<RequestId>(id.clone()).ok());
        let request: JsonRpcRequest = match serde_json::from_value(value) {
            Ok(req) => req,
            Err(e) => {
                warn!(error = %e, "Invalid request");
                return Some(JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_request(e.to_string()),
                ));
            }
        };

        debug!(method = %request.method, id = ?request.id, "Received message");

        if request.is_notification() {
            self.handle_notification(&request);
            return None;
        }

        let id = request.id.clone();
        let outcome = match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(),
            methods::PING => Ok(serde_json::json!({})),
            methods::LIST_TOOLS => self.handle_list_tools(),
            methods::CALL_TOOL => self.handle_call_tool(&request),
            methods::LIST_PROMPTS => self.handle_list_prompts(),
            methods::GET_PROMPT => self.handle_get_prompt(&request),
            other => Err(JsonRpcError::method_not_found(other)),
        };

        Some(match outcome {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(error) => JsonRpcResponse::error(id, error),
        })
    }

    fn handle_notification(&mut self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            methods::INITIALIZED => {
                self.initialized = true;
                info!("Client initialized");
            }
            other => debug!(method = other, "Ignoring notification"),
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self) -> std::result::Result<Value, JsonRpcError> {
        let prompts = self
            .config
            .enable_prompts
            .then(PromptsCapability::default);

        info!(tools = true, prompts = prompts.is_some(), "Advertising capabilities");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            server_info: ServerInfo {
                name: self.config.server_name.clone(),
                version: self.config.server_version.clone(),
            },
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability::default()),
                prompts,
            },
        };

        to_value(result)
    }

    /// Handle list tools request
    fn handle_list_tools(&self) -> std::result::Result<Value, JsonRpcError> {
        let result = ListToolsResult {
            tools: self.dispatcher.registry().tools().map(Tool::from).collect(),
        };

        to_value(result)
    }

    /// Handle call tool request; dispatch failures become error results
    fn handle_call_tool(&self, request: &JsonRpcRequest) -> std::result::Result<Value, JsonRpcError> {
        let result: CallToolResult = match parse_params::<CallToolParams>(request) {
            Ok(params) => self
                .dispatcher
                .call_tool(&params.name, &params.arguments)
                .into(),
            Err(message) => CallToolResult::error(message),
        };

        to_value(result)
    }

    fn handle_list_prompts(&self) -> std::result::Result<Value, JsonRpcError> {
        let result = ListPromptsResult {
            prompts: self.dispatcher.registry().prompts().map(Prompt::from).collect(),
        };

        to_value(result)
    }

    fn handle_get_prompt(&self, request: &JsonRpcRequest) -> std::result::Result<Value, JsonRpcError> {
        let params: GetPromptParams =
            parse_params(request).map_err(JsonRpcError::invalid_params)?;

        let messages = self
            .dispatcher
            .get_prompt(&params.name, &params.arguments)
            .map_err(|e| {
                warn!(prompt = %params.name, error = %e, "Prompt rendering failed");
                JsonRpcError::from(e)
            })?;

        let description = self
            .dispatcher
            .registry()
            .get_prompt(&params.name)
            .map(|e| e.declaration.description.clone());

        to_value(GetPromptResult {
            description,
            messages: messages.into_iter().map(PromptMessageContent::from).collect(),
        })
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(
    request: &JsonRpcRequest,
) -> std::result::Result<T, String> {
    match request.params.as_ref() {
        Some(p) => serde_json::from_value(p.clone()).map_err(|e| format!("Invalid parameters: {}", e)),
        None => Err("Missing parameters".to_string()),
    }
}

fn to_value<T: serde::Serialize>(value: T) -> std::result::Result<Value, JsonRpcError> {
    serde_json::to_value(value).map_err(|e| JsonRpcError::internal_error(e.to_string()))
}
