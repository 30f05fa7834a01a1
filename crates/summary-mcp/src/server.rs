use std::io::{self, BufRead, Read, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{json, Value};
use summary_storage::{SummaryQuery, SummaryStore};
use thiserror::Error;

use crate::config::ServerConfig;
use crate::error::ToolError;
use crate::protocol::{
    JsonRpcRequest, JsonRpcResponse, ToolCallResult, INVALID_PARAMS, INVALID_REQUEST,
    JSONRPC_VERSION, METHOD_NOT_FOUND, PARSE_ERROR,
};

const DEFAULT_MCP_PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "summary-always";

/// Largest `Content-Length` body the stdio loop will buffer.
pub const MAX_FRAME_BYTES: u64 = 4 * 1024 * 1024;

pub const TOOL_ADD_SUMMARY: &str = "add_summary";
pub const TOOL_SHOW_SUMMARIES: &str = "show_summaries";
pub const TOOL_SAVE_SUMMARIES: &str = "save_summaries";
pub const TOOL_SUMMARY_STATS: &str = "summary_stats";
pub const TOOL_CLEAR_SUMMARIES: &str = "clear_summaries";

pub struct McpServer {
    store: Mutex<SummaryStore>,
}

impl McpServer {
    pub fn new() -> Self {
        Self::with_config(&ServerConfig::from_env())
    }

    pub fn with_config(config: &ServerConfig) -> Self {
        Self::with_store(SummaryStore::new().with_default_dir(config.storage_dir.clone()))
    }

    pub fn with_store(store: SummaryStore) -> Self {
        Self {
            store: Mutex::new(store),
        }
    }

    /// Directory `save_summaries` writes to when no `customPath` is given.
    pub fn default_storage_dir(&self) -> Option<PathBuf> {
        self.store.lock().resolve_dir(None).ok()
    }

    pub fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.jsonrpc != JSONRPC_VERSION {
            return Some(JsonRpcResponse::error(
                request.id.unwrap_or(Value::Null),
                INVALID_REQUEST,
                "invalid jsonrpc version",
            ));
        }

        let id = match request.id {
            Some(id) => id,
            None => {
                tracing::debug!(method = %request.method, "notification received");
                return None;
            }
        };

        let response = match request.method.as_str() {
            "initialize" => {
                let protocol_version = request
                    .params
                    .get("protocolVersion")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_MCP_PROTOCOL_VERSION);
                JsonRpcResponse::success(
                    id,
                    json!({
                        "protocolVersion": protocol_version,
                        "serverInfo": {"name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION")},
                        "capabilities": {
                            "tools": {
                                "listChanged": false
                            }
                        }
                    }),
                )
            }
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => JsonRpcResponse::success(id, tools_list_result()),
            "tools/call" => self.handle_tools_call(id, request.params),
            _ => JsonRpcResponse::error(id, METHOD_NOT_FOUND, "method not found"),
        };

        Some(response)
    }

    fn handle_tools_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let parsed: ToolsCallParams = match serde_json::from_value(params) {
            Ok(v) => v,
            Err(err) => {
                return JsonRpcResponse::error(id, INVALID_PARAMS, format!("invalid params: {err}"));
            }
        };

        let outcome = match parsed.name.as_str() {
            TOOL_ADD_SUMMARY => self.exec_add_summary(parsed.arguments),
            TOOL_SHOW_SUMMARIES => self.exec_show_summaries(parsed.arguments),
            TOOL_SAVE_SUMMARIES => self.exec_save_summaries(parsed.arguments),
            TOOL_SUMMARY_STATS => self.exec_summary_stats(),
            TOOL_CLEAR_SUMMARIES => self.exec_clear_summaries(),
            other => Err(ToolError::UnknownOperation(other.to_string())),
        };

        let result = match outcome {
            Ok(payload) => {
                tracing::debug!(tool = %parsed.name, "tool call succeeded");
                ToolCallResult::success(payload)
            }
            Err(err) => {
                tracing::warn!(tool = %parsed.name, kind = err.kind(), error = %err, "tool call failed");
                ToolCallResult::failure(json!({
                    "error": err.to_string(),
                    "status": "failed",
                    "kind": err.kind()
                }))
            }
        };
        JsonRpcResponse::success(id, result.into_value())
    }

    fn exec_add_summary(&self, arguments: Option<Value>) -> Result<Value, ToolError> {
        let args: AddSummaryInput = parse_args(arguments)?;
        let content = match args.content {
            Value::String(text) => text,
            _ => {
                return Err(ToolError::InvalidArgument(
                    "content must be a non-empty string".to_string(),
                ))
            }
        };
        let keywords = args.keywords.unwrap_or_default();

        let mut store = self.store.lock();
        let added = store.add(&content, keywords.as_slice())?;
        let stats = store.stats();

        Ok(json!({
            "status": "success",
            "action": TOOL_ADD_SUMMARY,
            "message": format!("stored {}", added.id),
            "id": added.id,
            "summary": added.refined_content,
            "formattedSummary": added.formatted_summary,
            "stats": stats
        }))
    }

    fn exec_show_summaries(&self, arguments: Option<Value>) -> Result<Value, ToolError> {
        let args: ShowSummariesInput = parse_args_optional(arguments)?;
        let limit = args
            .limit
            .map(|v| usize::try_from(v).unwrap_or(usize::MAX));
        let query = SummaryQuery {
            filter_keywords: args.filter_keywords.unwrap_or_default(),
            limit,
        };

        let summaries = self.store.lock().query(&query);
        Ok(json!({
            "status": "success",
            "action": TOOL_SHOW_SUMMARIES,
            "message": format!("found {} summaries", summaries.len()),
            "total": summaries.len(),
            "summaries": summaries
        }))
    }

    fn exec_save_summaries(&self, arguments: Option<Value>) -> Result<Value, ToolError> {
        let args: SaveSummariesInput = parse_args_optional(arguments)?;

        let report = self
            .store
            .lock()
            .persist(args.custom_path.as_deref().map(Path::new))?;
        Ok(json!({
            "status": "success",
            "action": TOOL_SAVE_SUMMARIES,
            "message": format!("saved {} summaries", report.saved_count),
            "filePath": report.file_path.display().to_string(),
            "savedCount": report.saved_count,
            "summaries": report.summaries,
            "mode": report.outcome.as_str()
        }))
    }

    fn exec_summary_stats(&self) -> Result<Value, ToolError> {
        let stats = self.store.lock().stats();
        Ok(json!({
            "status": "success",
            "action": TOOL_SUMMARY_STATS,
            "total": stats.total,
            "latestDayStamp": stats.latest_day_stamp,
            "keywordCounts": stats.keyword_counts
        }))
    }

    fn exec_clear_summaries(&self) -> Result<Value, ToolError> {
        let cleared = self.store.lock().clear();
        Ok(json!({
            "status": "success",
            "action": TOOL_CLEAR_SUMMARIES,
            "message": format!("cleared {cleared} summaries"),
            "cleared": cleared
        }))
    }

    pub fn serve_stdio(&self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(io::BufReader::new(stdin.lock()), stdout.lock())
    }

    /// Request loop over any byte stream.
    ///
    /// Accepts line-delimited JSON and `Content-Length` framed messages and
    /// answers each request in the framing it arrived with.
    pub fn serve<R: BufRead, W: Write>(&self, mut reader: R, mut writer: W) -> io::Result<()> {
        let mut line = String::new();

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }

            let trimmed = line.trim_end_matches(['\r', '\n']).trim_start();
            if trimmed.is_empty() {
                continue;
            }

            let (payload, frame) = if starts_frame_header(trimmed) {
                match read_frame(&mut reader, trimmed) {
                    Ok(body) => (body, StdioFrame::ContentLength),
                    Err(err) => {
                        tracing::warn!(error = %err, "rejected stdio frame");
                        let response =
                            JsonRpcResponse::error(Value::Null, PARSE_ERROR, err.to_string());
                        write_response(&mut writer, &response, StdioFrame::ContentLength)?;
                        continue;
                    }
                }
            } else {
                (trimmed.as_bytes().to_vec(), StdioFrame::LineDelimited)
            };

            let request: JsonRpcRequest = match serde_json::from_slice(&payload) {
                Ok(v) => v,
                Err(err) => {
                    tracing::warn!(error = %err, "unparseable request");
                    let response =
                        JsonRpcResponse::error(Value::Null, PARSE_ERROR, format!("parse error: {err}"));
                    write_response(&mut writer, &response, frame)?;
                    continue;
                }
            };

            if let Some(response) = self.handle_request(request) {
                write_response(&mut writer, &response, frame)?;
            }
        }

        tracing::info!("stdin closed, shutting down");
        Ok(())
    }
}

impl Default for McpServer {
    fn default() -> Self {
        Self::new()
    }
}

fn tools_list_result() -> Value {
    json!({
        "tools": [
            {
                "name": TOOL_ADD_SUMMARY,
                "description": "Record a one-sentence summary of something worth keeping from the conversation. \
                    Keep content short and focused on what the user asked for; use at most five specific keywords \
                    (project names, technologies, people).",
                "inputSchema": {
                    "type": "object",
                    "required": ["content"],
                    "properties": {
                        "content": {"type": "string", "description": "Summary text; longer than 200 characters is truncated."},
                        "keywords": {"type": "array", "items": {"type": "string"}, "description": "Topic keywords; a leading # is optional."}
                    }
                }
            },
            {
                "name": TOOL_SHOW_SUMMARIES,
                "description": "Show recorded summaries, one per line as `YYYYMMDD #kw1 #kw2 content`.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "filterKeywords": {"type": "array", "items": {"type": "string"}, "description": "Only summaries with a keyword containing one of these terms."},
                        "limit": {"type": "integer", "minimum": 1, "description": "Show only the latest N summaries."}
                    }
                }
            },
            {
                "name": TOOL_SAVE_SUMMARIES,
                "description": "Append every recorded summary to today's YYYYMMDD.md file under a timestamped header.",
                "inputSchema": {
                    "type": "object",
                    "properties": {
                        "customPath": {"type": "string", "description": "Target directory; defaults to SUMMARY_STORAGE_PATH or the home directory."}
                    }
                }
            },
            {
                "name": TOOL_SUMMARY_STATS,
                "description": "Count recorded summaries and keyword usage.",
                "inputSchema": {"type": "object", "properties": {}}
            },
            {
                "name": TOOL_CLEAR_SUMMARIES,
                "description": "Forget every recorded summary and restart id numbering.",
                "inputSchema": {"type": "object", "properties": {}}
            }
        ]
    })
}

#[derive(Clone, Copy)]
enum StdioFrame {
    LineDelimited,
    ContentLength,
}

fn write_response<W: Write>(
    writer: &mut W,
    response: &JsonRpcResponse,
    frame: StdioFrame,
) -> io::Result<()> {
    match frame {
        StdioFrame::LineDelimited => {
            let serialized = serde_json::to_string(response)?;
            writeln!(writer, "{serialized}")?;
        }
        StdioFrame::ContentLength => {
            let serialized = serde_json::to_vec(response)?;
            write!(writer, "Content-Length: {}\r\n\r\n", serialized.len())?;
            writer.write_all(&serialized)?;
        }
    }
    writer.flush()
}

#[derive(Debug, Error)]
enum FrameError {
    #[error("invalid stdio frame: {0}")]
    Header(io::Error),
    #[error("stdio frame of {0} bytes exceeds the {max} byte limit", max = MAX_FRAME_BYTES)]
    TooLarge(u64),
    #[error("invalid stdio frame body: {0}")]
    Body(io::Error),
}

fn starts_frame_header(line: &str) -> bool {
    ["content-length:", "content-type:"].iter().any(|prefix| {
        line.get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// Reads the rest of a framed message once its first header line is known.
///
/// Oversized bodies are drained so the next message starts on a clean boundary.
fn read_frame<R: BufRead>(reader: &mut R, first_header: &str) -> Result<Vec<u8>, FrameError> {
    let declared = frame_length(reader, first_header).map_err(FrameError::Header)?;
    let mut body_reader = reader.by_ref().take(declared);

    if declared > MAX_FRAME_BYTES {
        io::copy(&mut body_reader, &mut io::sink()).map_err(FrameError::Body)?;
        return Err(FrameError::TooLarge(declared));
    }

    let mut body = Vec::new();
    body_reader.read_to_end(&mut body).map_err(FrameError::Body)?;
    if u64::try_from(body.len()).is_ok_and(|got| got < declared) {
        return Err(FrameError::Body(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("expected {declared} bytes, got {}", body.len()),
        )));
    }
    Ok(body)
}

fn frame_length<R: BufRead>(reader: &mut R, first_header: &str) -> io::Result<u64> {
    let mut declared = content_length_value(first_header);
    let mut header = String::new();
    loop {
        header.clear();
        if reader.read_line(&mut header)? == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "stream ended inside frame headers",
            ));
        }
        let line = header.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            break;
        }
        declared = content_length_value(line).or(declared);
    }
    declared.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "missing content-length header"))
}

fn content_length_value(header: &str) -> Option<u64> {
    header
        .split_once(':')
        .filter(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse().ok())
}

fn parse_args<T: for<'de> Deserialize<'de>>(arguments: Option<Value>) -> Result<T, ToolError> {
    match arguments {
        Some(v) if !v.is_null() => serde_json::from_value(v)
            .map_err(|err| ToolError::InvalidArgument(format!("invalid tool arguments: {err}"))),
        _ => Err(ToolError::InvalidArgument(
            "missing tool arguments".to_string(),
        )),
    }
}

fn parse_args_optional<T: for<'de> Deserialize<'de> + Default>(
    arguments: Option<Value>,
) -> Result<T, ToolError> {
    match arguments {
        Some(v) if !v.is_null() => serde_json::from_value(v)
            .map_err(|err| ToolError::InvalidArgument(format!("invalid tool arguments: {err}"))),
        _ => Ok(T::default()),
    }
}

#[derive(Debug, Deserialize)]
struct ToolsCallParams {
    name: String,
    arguments: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct AddSummaryInput {
    #[serde(default)]
    content: Value,
    keywords: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShowSummariesInput {
    filter_keywords: Option<Vec<String>>,
    limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveSummariesInput {
    custom_path: Option<String>,
}
