use async_trait::async_trait;
use serde_json::{Value, json};

use crate::error::{Result, ServerError};
use crate::upstream::{DocsFetcher, FetchOutcome};

/// Upstream tool invoked to resolve library names
const RESOLVE_TOOL: &str = "resolve-library-id";
/// Upstream tool invoked to fetch documentation
const DOCS_TOOL: &str = "get-library-docs";

/// Talks to the documentation provider's HTTP endpoint using JSON-RPC 2.0
/// `tools/call` envelopes.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpFetcher {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
        }
    }

    /// Send a single tool call and unwrap the JSON-RPC envelope.
    async fn call_tool(&self, tool_name: &str, arguments: Value) -> Result<Value> {
        let request = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "tools/call",
            "params": {
                "name": tool_name,
                "arguments": arguments,
            },
        });

        tracing::debug!("Calling upstream tool {} at {}", tool_name, self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header(
                "User-Agent",
                format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            )
            .json(&request)
            .send()
            .await
            .map_err(|e| ServerError::Upstream(format!("Upstream request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ServerError::Upstream(format!(
                "Upstream returned HTTP {} - {}",
                response.status(),
                response
                    .status()
                    .canonical_reason()
                    .unwrap_or("Unknown error")
            )));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| ServerError::Upstream(format!("Failed to parse upstream response: {e}")))?;

        if let Some(error) = envelope.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown upstream error");
            return Err(ServerError::Upstream(format!(
                "Upstream error: {message}"
            )));
        }

        envelope
            .get("result")
            .cloned()
            .ok_or_else(|| ServerError::Upstream("Upstream response missing result".to_string()))
    }
}

#[async_trait]
impl DocsFetcher for HttpFetcher {
    async fn resolve(&self, library_name: &str) -> Result<Value> {
        self.call_tool(RESOLVE_TOOL, json!({ "libraryName": library_name }))
            .await
    }

    async fn fetch(&self, library_id: &str, topic: &str, tokens: u32) -> Result<FetchOutcome> {
        let raw = self
            .call_tool(
                DOCS_TOOL,
                json!({
                    "context7CompatibleLibraryID": library_id,
                    "topic": topic,
                    "tokens": tokens,
                }),
            )
            .await?;

        // Success payloads carry their text in the first content block.
        let text = raw
            .get("content")
            .and_then(|c| c.get(0))
            .and_then(|block| block.get("text"))
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(FetchOutcome { text, raw })
    }

    fn source_label(&self) -> &str {
        "Context7"
    }
}
