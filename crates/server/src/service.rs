//! MCP request handling: initialize, tools/list, tools/call.
//!
//! Speaks JSON-RPC with the `rmcp` model types; the transport loop in `main` feeds one
//! decoded client message at a time. Tool failures are reported as tool results with
//! `is_error` set, never as process failures.

use crate::tools;
use rmcp::model::{
    CallToolResult, ClientJsonRpcMessage, ClientRequest, Content, ErrorCode, ErrorData,
    Implementation, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    JsonRpcVersion2_0, ListToolsResult, RequestId, ServerCapabilities, ServerJsonRpcMessage,
    ServerResult,
};
use serde_json::Value;
use specscope_explorer::error::{ExplorerError, Result};
use specscope_explorer::explorer::Explorer;
use specscope_explorer::format;
use std::sync::Arc;

const INSTRUCTIONS: &str = "Explore OpenAPI/Swagger API schemas: save schema URLs under \
short names, then list, search, and inspect their endpoints and models.";

pub struct ExplorerService {
    explorer: Arc<Explorer>,
}

impl ExplorerService {
    #[must_use]
    pub fn new(explorer: Arc<Explorer>) -> Self {
        Self { explorer }
    }

    /// Handle one decoded client message. Notifications produce no reply.
    pub async fn handle_message(
        &self,
        message: ClientJsonRpcMessage,
    ) -> Option<ServerJsonRpcMessage> {
        match message {
            ClientJsonRpcMessage::Request(JsonRpcRequest { id, request, .. }) => {
                Some(self.handle_request(id, request).await)
            }
            _ => None,
        }
    }

    async fn handle_request(&self, id: RequestId, request: ClientRequest) -> ServerJsonRpcMessage {
        match request {
            ClientRequest::InitializeRequest(req) => response(
                id,
                ServerResult::InitializeResult(InitializeResult {
                    protocol_version: req.params.protocol_version,
                    capabilities: ServerCapabilities::builder().enable_tools().build(),
                    server_info: Implementation::from_build_env(),
                    instructions: Some(INSTRUCTIONS.to_string()),
                }),
            ),
            ClientRequest::ListToolsRequest(_) => response(
                id,
                ServerResult::ListToolsResult(ListToolsResult {
                    tools: tools::catalog(),
                    ..Default::default()
                }),
            ),
            ClientRequest::CallToolRequest(req) => {
                let name = req.params.name.to_string();
                let args = req
                    .params
                    .arguments
                    .map_or_else(|| Value::Object(serde_json::Map::new()), Value::Object);

                match self.dispatch(&name, args).await {
                    Some(Ok(text)) => response(
                        id,
                        ServerResult::CallToolResult(CallToolResult::success(vec![Content::text(
                            text,
                        )])),
                    ),
                    Some(Err(e)) => {
                        tracing::warn!("Tool '{name}' failed: {e}");
                        response(id, ServerResult::CallToolResult(tool_error(&e)))
                    }
                    None => error_response(
                        id,
                        ErrorCode::INVALID_PARAMS,
                        format!("unknown tool: {name}"),
                    ),
                }
            }
            _ => error_response(
                id,
                ErrorCode::METHOD_NOT_FOUND,
                "method not supported".to_string(),
            ),
        }
    }

    /// Route one tool call. `None` means the tool name is unknown.
    pub async fn dispatch(&self, name: &str, args: Value) -> Option<Result<String>> {
        Some(match name {
            "add_api" => self.add_api(args),
            "remove_api" => self.remove_api(args),
            "list_saved_apis" => self.list_saved_apis(),
            "get_api_info" => self.get_api_info(args).await,
            "list_endpoints" => self.list_endpoints(args).await,
            "search_endpoints" => self.search_endpoints(args).await,
            "get_endpoint_details" => self.get_endpoint_details(args).await,
            "list_models" => self.list_models(args).await,
            "get_model_schema" => self.get_model_schema(args).await,
            _ => return None,
        })
    }

    fn add_api(&self, args: Value) -> Result<String> {
        let args: tools::AddApiArgs = parse_args(args)?;
        self.explorer
            .registry()
            .add_api(&args.name, &args.url, args.description, args.headers)
    }

    fn remove_api(&self, args: Value) -> Result<String> {
        let args: tools::RemoveApiArgs = parse_args(args)?;
        self.explorer.registry().remove_api(&args.name)
    }

    fn list_saved_apis(&self) -> Result<String> {
        Ok(format::saved_apis_text(&self.explorer.registry().list_apis()))
    }

    async fn get_api_info(&self, args: Value) -> Result<String> {
        let args: tools::ApiArgs = parse_args(args)?;
        let info = self.explorer.api_info(&args.api).await?;
        Ok(info.format_display())
    }

    async fn list_endpoints(&self, args: Value) -> Result<String> {
        let args: tools::ListEndpointsArgs = parse_args(args)?;
        let filter = args.filter()?;
        let params = args.pagination()?;
        let page = self
            .explorer
            .list_endpoints_page(&args.api, &filter, params)
            .await?;
        Ok(format::endpoint_page(&page, &filter.format_display()))
    }

    async fn search_endpoints(&self, args: Value) -> Result<String> {
        let args: tools::SearchEndpointsArgs = parse_args(args)?;
        let filter = args.list.filter()?;
        let params = args.list.pagination()?;
        let page = self
            .explorer
            .search_endpoints_page(&args.list.api, &args.query, &filter, params)
            .await?;
        Ok(format::search_page(&page, &args.query, &filter.format_display()))
    }

    async fn get_endpoint_details(&self, args: Value) -> Result<String> {
        let args: tools::EndpointDetailsArgs = parse_args(args)?;
        let details = self
            .explorer
            .endpoint_details(&args.api, &args.path, &args.method, args.include_responses)
            .await?;
        format::endpoint_details_text(&details)
    }

    async fn list_models(&self, args: Value) -> Result<String> {
        let args: tools::ListModelsArgs = parse_args(args)?;
        let filter = args.filter()?;
        let params = args.pagination()?;
        let page = self
            .explorer
            .list_models_page(&args.api, &filter, params)
            .await?;
        Ok(format::model_page(&page, args.include_details, &filter.format_display()))
    }

    async fn get_model_schema(&self, args: Value) -> Result<String> {
        let args: tools::ModelSchemaArgs = parse_args(args)?;
        let model = self.explorer.model_schema(&args.api, &args.model_name).await?;
        format::model_schema_text(&model)
    }
}

fn parse_args<T: serde::de::DeserializeOwned>(args: Value) -> Result<T> {
    serde_json::from_value(args)
        .map_err(|e| ExplorerError::Validation(format!("Invalid arguments: {e}")))
}

fn tool_error(e: &ExplorerError) -> CallToolResult {
    CallToolResult {
        content: vec![Content::text(format!("Error: {e}"))],
        structured_content: None,
        is_error: Some(true),
        meta: None,
    }
}

fn response(id: RequestId, result: ServerResult) -> ServerJsonRpcMessage {
    ServerJsonRpcMessage::Response(JsonRpcResponse {
        jsonrpc: JsonRpcVersion2_0,
        id,
        result,
    })
}

fn error_response(id: RequestId, code: ErrorCode, message: String) -> ServerJsonRpcMessage {
    ServerJsonRpcMessage::Error(JsonRpcError {
        jsonrpc: JsonRpcVersion2_0,
        id,
        error: ErrorData::new(code, message, None),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use specscope_explorer::cache::{DEFAULT_HTTP_TIMEOUT, SchemaCache};
    use specscope_explorer::registry::ApiRegistry;

    fn service(dir: &tempfile::TempDir) -> ExplorerService {
        let registry = Arc::new(ApiRegistry::load(dir.path().join("apis.json")));
        let cache = Arc::new(SchemaCache::new(DEFAULT_HTTP_TIMEOUT));
        ExplorerService::new(Arc::new(Explorer::new(registry, cache)))
    }

    #[tokio::test]
    async fn registry_tools_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);

        let added = svc
            .dispatch(
                "add_api",
                json!({ "name": "petstore", "url": "https://petstore.example/openapi.json" }),
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            added,
            "Added API 'petstore' with URL https://petstore.example/openapi.json"
        );

        let listed = svc
            .dispatch("list_saved_apis", json!({}))
            .await
            .unwrap()
            .unwrap();
        assert!(listed.contains("- petstore: https://petstore.example/openapi.json"));

        let removed = svc
            .dispatch("remove_api", json!({ "name": "petstore" }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(removed, "Removed API 'petstore'");
    }

    #[tokio::test]
    async fn unknown_tool_is_not_dispatched() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);
        assert!(svc.dispatch("fetch_the_moon", json!({})).await.is_none());
    }

    #[tokio::test]
    async fn missing_required_argument_is_a_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);

        let err = svc
            .dispatch("get_api_info", json!({}))
            .await
            .unwrap()
            .unwrap_err();
        assert!(err.to_string().starts_with("Validation error: Invalid arguments:"));
    }

    #[tokio::test]
    async fn parameter_validation_happens_before_any_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);

        // An unreachable URL with an invalid page size must fail on the page size.
        let err = svc
            .dispatch(
                "list_endpoints",
                json!({ "api": "https://unreachable.invalid/openapi.json", "page_size": 150 }),
            )
            .await
            .unwrap()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation error: page_size cannot exceed 100"
        );
    }

    #[tokio::test]
    async fn errors_render_as_flagged_tool_results() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);

        let reply = svc
            .handle_message(
                serde_json::from_value(json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "method": "tools/call",
                    "params": { "name": "remove_api", "arguments": { "name": "ghost" } }
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        let rendered = serde_json::to_value(&reply).unwrap();
        assert_eq!(rendered["result"]["isError"], json!(true));
        assert_eq!(
            rendered["result"]["content"][0]["text"],
            json!("Error: API 'ghost' not found")
        );
    }

    #[tokio::test]
    async fn tools_list_reply_carries_the_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let svc = service(&dir);

        let reply = svc
            .handle_message(
                serde_json::from_value(json!({
                    "jsonrpc": "2.0",
                    "id": 2,
                    "method": "tools/list"
                }))
                .unwrap(),
            )
            .await
            .unwrap();

        let rendered = serde_json::to_value(&reply).unwrap();
        let names: Vec<&str> = rendered["result"]["tools"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["name"].as_str().unwrap())
            .collect();
        assert!(names.contains(&"list_endpoints"));
        assert_eq!(names.len(), 9);
    }
}
