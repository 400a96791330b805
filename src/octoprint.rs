//! OctoPrint client: printer state and the spool plugin commands.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::time::Duration;

use crate::upstream::{http_client, ClientError, ClientResult, PrinterApi};

/// Plugin endpoint exposing `get_current_spool` / `set_spool`.
pub const SPOOL_PLUGIN_PATH: &str = "/api/plugin/spoolman_api";

/// Status shown on the selection page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrinterStatus {
    Ready,
    Printing,
    Error,
    Unknown,
    /// OctoPrint's own state text, when no flag decides the status.
    Other(String),
}

impl PrinterStatus {
    /// Printing wins over ready, ready over error, otherwise the raw text.
    pub fn from_state(state: &PrinterState) -> Self {
        let flags = &state.flags;
        if flags.printing {
            PrinterStatus::Printing
        } else if flags.ready {
            PrinterStatus::Ready
        } else if flags.error {
            PrinterStatus::Error
        } else if state.text.trim().is_empty() {
            PrinterStatus::Unknown
        } else {
            PrinterStatus::Other(state.text.clone())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            PrinterStatus::Ready => "Ready",
            PrinterStatus::Printing => "Printing",
            PrinterStatus::Error => "Error",
            PrinterStatus::Unknown => "Unknown",
            PrinterStatus::Other(text) => text,
        }
    }
}

impl fmt::Display for PrinterStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for PrinterStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrinterFlags {
    #[serde(default)]
    pub operational: bool,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub printing: bool,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub ready: bool,
}

/// The `state` object of `GET /api/printer`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrinterState {
    #[serde(default)]
    pub text: String,
    pub flags: PrinterFlags,
}

#[derive(Debug, Deserialize)]
struct PrinterResponse {
    state: PrinterState,
}

#[derive(Debug, Serialize)]
struct PluginCommand<'a> {
    command: &'a str,
    tool: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    spool_id: Option<&'a str>,
}

#[derive(Debug, Default, Deserialize)]
struct PluginResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    spool_id: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

impl PluginResponse {
    /// The plugin reports ids as strings or bare numbers; null and "" mean no spool.
    fn spool_id(&self) -> ClientResult<Option<String>> {
        match &self.spool_id {
            None | Some(serde_json::Value::Null) => Ok(None),
            Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
            Some(serde_json::Value::String(s)) => Ok(Some(s.trim().to_string())),
            Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
            Some(other) => Err(ClientError::UpstreamProtocolError(format!(
                "unexpected spool_id value: {}",
                other
            ))),
        }
    }

    fn rejection(self, fallback: &str) -> ClientError {
        match self.error {
            Some(msg) if !msg.is_empty() => ClientError::UpstreamRejected(msg),
            _ => ClientError::UpstreamRejected(fallback.to_string()),
        }
    }
}

/// Client for one printer's OctoPrint instance.
#[derive(Debug, Clone)]
pub struct OctoPrintClient {
    base_url: String,
    api_key: String,
    http: reqwest::Client,
}

impl OctoPrintClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> ClientResult<Self> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http: http_client(timeout)?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.base_url, path))
            .header("X-Api-Key", &self.api_key)
            .header("Content-Type", "application/json")
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ClientResult<T> {
        let response = request.send().await.map_err(ClientError::from_transport)?;
        let status = response.status();
        let body = response.bytes().await.map_err(ClientError::from_transport)?;
        if status.is_client_error() || status.is_server_error() {
            return Err(ClientError::UpstreamRejected(format!(
                "HTTP {}: {}",
                status.as_u16(),
                String::from_utf8_lossy(&body).trim()
            )));
        }
        serde_json::from_slice(&body).map_err(|e| ClientError::UpstreamProtocolError(e.to_string()))
    }

    async fn plugin_command(&self, command: PluginCommand<'_>) -> ClientResult<PluginResponse> {
        let request = self.request(Method::POST, SPOOL_PLUGIN_PATH).json(&command);
        self.send(request).await
    }

    /// Raw printer state as reported by OctoPrint.
    pub async fn printer_state(&self) -> ClientResult<PrinterState> {
        let response: PrinterResponse = self.send(self.request(Method::GET, "/api/printer")).await?;
        Ok(response.state)
    }
}

#[async_trait]
impl PrinterApi for OctoPrintClient {
    async fn get_state(&self) -> ClientResult<PrinterStatus> {
        let state = self.printer_state().await?;
        Ok(PrinterStatus::from_state(&state))
    }

    async fn get_current_spool(&self, tool: u32) -> ClientResult<Option<String>> {
        let response = self
            .plugin_command(PluginCommand { command: "get_current_spool", tool, spool_id: None })
            .await?;
        if !response.success {
            return Err(response.rejection("failed to get current spool"));
        }
        response.spool_id()
    }

    async fn set_active_spool(&self, spool_id: &str, tool: u32) -> ClientResult<()> {
        let response = self
            .plugin_command(PluginCommand { command: "set_spool", tool, spool_id: Some(spool_id) })
            .await?;
        if !response.success {
            return Err(response.rejection("failed to set spool"));
        }
        tracing::debug!("OctoPrint at {} accepted spool {} on tool {}", self.base_url, spool_id, tool);
        Ok(())
    }
}
