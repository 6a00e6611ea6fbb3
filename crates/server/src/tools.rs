//! Tool catalog and argument types for the MCP surface.
//!
//! Input schemas are assembled from small composable builder functions so the shared
//! argument groups (api selector, pagination, filters) are declared once and reused
//! across tools.

use rmcp::model::{JsonObject, Tool};
use serde::Deserialize;
use serde_json::{Value, json};
use specscope_explorer::error::Result;
use specscope_explorer::page::{DEFAULT_PAGE_SIZE, EndpointFilter, MAX_PAGE_SIZE, ModelFilter, PaginationParams};
use std::collections::HashMap;
use std::sync::Arc;

fn prop(name: &'static str, schema: Value) -> (&'static str, Value) {
    (name, schema)
}

fn string(description: &str) -> Value {
    json!({ "type": "string", "description": description })
}

fn boolean(description: &str) -> Value {
    json!({ "type": "boolean", "description": description })
}

fn integer(description: &str, minimum: u64, maximum: Option<u64>) -> Value {
    let mut schema = json!({
        "type": "integer",
        "description": description,
        "minimum": minimum,
    });
    if let Some(max) = maximum {
        schema["maximum"] = json!(max);
    }
    schema
}

fn string_array(description: &str) -> Value {
    json!({
        "type": "array",
        "items": { "type": "string" },
        "description": description,
    })
}

fn object_schema(properties: Vec<(&str, Value)>, required: &[&str]) -> Arc<JsonObject> {
    let mut props = serde_json::Map::new();
    for (name, schema) in properties {
        props.insert(name.to_string(), schema);
    }
    let schema = json!({
        "type": "object",
        "properties": props,
        "required": required,
    });
    Arc::new(schema.as_object().cloned().unwrap_or_default())
}

fn api_prop() -> (&'static str, Value) {
    prop("api", string("Saved API name or absolute schema URL"))
}

fn pagination_props() -> Vec<(&'static str, Value)> {
    vec![
        prop("page", integer("1-based page number", 1, None)),
        prop(
            "page_size",
            integer(
                "Items per page",
                1,
                Some(MAX_PAGE_SIZE as u64),
            ),
        ),
    ]
}

fn endpoint_filter_props() -> Vec<(&'static str, Value)> {
    vec![
        prop("methods", string_array("Only these HTTP methods (GET, POST, ...)")),
        prop("tags_include", string_array("Only endpoints with at least one of these tags")),
        prop("tags_exclude", string_array("Drop endpoints with any of these tags")),
        prop("has_authentication", boolean("Only endpoints that do (or do not) require authentication")),
        prop("deprecated", boolean("Only deprecated (or non-deprecated) endpoints")),
    ]
}

fn model_filter_props() -> Vec<(&'static str, Value)> {
    vec![
        prop("types", string_array("Only these schema types (object, array, ...)")),
        prop("min_properties", integer("Minimum property count", 0, None)),
        prop("max_properties", integer("Maximum property count", 0, None)),
        prop("has_required_fields", boolean("Only models with (or without) required fields")),
        prop("tags_include", string_array("Only models with at least one of these tags")),
        prop("tags_exclude", string_array("Drop models with any of these tags")),
    ]
}

/// The full tool surface, in a stable order.
#[must_use]
pub fn catalog() -> Vec<Tool> {
    let mut list_endpoints_props = vec![api_prop()];
    list_endpoints_props.extend(pagination_props());
    list_endpoints_props.extend(endpoint_filter_props());

    let mut search_props = vec![
        api_prop(),
        prop("query", string("Case-insensitive substring matched against path, summary, description, and tags")),
    ];
    search_props.extend(pagination_props());
    search_props.extend(endpoint_filter_props());

    let mut list_models_props = vec![api_prop()];
    list_models_props.extend(pagination_props());
    list_models_props.extend(model_filter_props());
    list_models_props.push(prop(
        "include_details",
        boolean("Include descriptions and property counts in the listing"),
    ));

    vec![
        Tool::new(
            "add_api",
            "Save an API schema URL under a short name for later lookups",
            object_schema(
                vec![
                    prop("name", string("Short name for this API")),
                    prop("url", string("Absolute URL of the OpenAPI/Swagger document")),
                    prop("description", string("Optional description")),
                    prop(
                        "headers",
                        json!({
                            "type": "object",
                            "additionalProperties": { "type": "string" },
                            "description": "HTTP headers sent when fetching the schema",
                        }),
                    ),
                ],
                &["name", "url"],
            ),
        ),
        Tool::new(
            "remove_api",
            "Remove a saved API registration",
            object_schema(
                vec![prop("name", string("Name of the saved API to remove"))],
                &["name"],
            ),
        ),
        Tool::new(
            "list_saved_apis",
            "List all saved API registrations",
            object_schema(vec![], &[]),
        ),
        Tool::new(
            "get_api_info",
            "General information about an API: title, version, base URL, tags",
            object_schema(vec![api_prop()], &["api"]),
        ),
        Tool::new(
            "list_endpoints",
            "List the endpoints of an API, with optional filters and pagination",
            object_schema(list_endpoints_props, &["api"]),
        ),
        Tool::new(
            "search_endpoints",
            "Search endpoints by free text, with optional filters and pagination",
            object_schema(search_props, &["api", "query"]),
        ),
        Tool::new(
            "get_endpoint_details",
            "Full details for a single endpoint, including its raw schema",
            object_schema(
                vec![
                    api_prop(),
                    prop("path", string("Endpoint path, e.g. /pets/{petId}")),
                    prop("method", string("HTTP method, e.g. GET")),
                    prop(
                        "include_responses",
                        boolean("Include the responses section (default true)"),
                    ),
                ],
                &["api", "path", "method"],
            ),
        ),
        Tool::new(
            "list_models",
            "List the schema models of an API, with optional filters and pagination",
            object_schema(list_models_props, &["api"]),
        ),
        Tool::new(
            "get_model_schema",
            "The raw schema fragment for a single named model",
            object_schema(
                vec![api_prop(), prop("model_name", string("Model name under components.schemas"))],
                &["api", "model_name"],
            ),
        ),
    ]
}

#[derive(Debug, Deserialize)]
pub struct AddApiArgs {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub headers: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
pub struct RemoveApiArgs {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ApiArgs {
    pub api: String,
}

#[derive(Debug, Deserialize)]
pub struct ListEndpointsArgs {
    pub api: String,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub methods: Option<Vec<String>>,
    #[serde(default)]
    pub tags_include: Option<Vec<String>>,
    #[serde(default)]
    pub tags_exclude: Option<Vec<String>>,
    #[serde(default)]
    pub has_authentication: Option<bool>,
    #[serde(default)]
    pub deprecated: Option<bool>,
}

impl ListEndpointsArgs {
    /// # Errors
    ///
    /// Fails with a validation error for out-of-range page or page size.
    pub fn pagination(&self) -> Result<PaginationParams> {
        pagination(self.page, self.page_size)
    }

    /// # Errors
    ///
    /// Fails with a validation error for unknown HTTP method names.
    pub fn filter(&self) -> Result<EndpointFilter> {
        EndpointFilter::new(
            self.methods.clone(),
            self.tags_include.clone(),
            self.tags_exclude.clone(),
            self.has_authentication,
            self.deprecated,
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchEndpointsArgs {
    pub query: String,
    #[serde(flatten)]
    pub list: ListEndpointsArgs,
}

#[derive(Debug, Deserialize)]
pub struct EndpointDetailsArgs {
    pub api: String,
    pub path: String,
    pub method: String,
    #[serde(default = "default_true")]
    pub include_responses: bool,
}

#[derive(Debug, Deserialize)]
pub struct ListModelsArgs {
    pub api: String,
    #[serde(default)]
    pub page: Option<usize>,
    #[serde(default)]
    pub page_size: Option<usize>,
    #[serde(default)]
    pub types: Option<Vec<String>>,
    #[serde(default)]
    pub min_properties: Option<usize>,
    #[serde(default)]
    pub max_properties: Option<usize>,
    #[serde(default)]
    pub has_required_fields: Option<bool>,
    #[serde(default)]
    pub tags_include: Option<Vec<String>>,
    #[serde(default)]
    pub tags_exclude: Option<Vec<String>>,
    #[serde(default)]
    pub include_details: bool,
}

impl ListModelsArgs {
    /// # Errors
    ///
    /// Fails with a validation error for out-of-range page or page size.
    pub fn pagination(&self) -> Result<PaginationParams> {
        pagination(self.page, self.page_size)
    }

    /// # Errors
    ///
    /// Fails with a validation error when `max_properties < min_properties`.
    pub fn filter(&self) -> Result<ModelFilter> {
        ModelFilter::new(
            self.types.clone(),
            self.min_properties,
            self.max_properties,
            self.has_required_fields,
            self.tags_include.clone(),
            self.tags_exclude.clone(),
        )
    }
}

#[derive(Debug, Deserialize)]
pub struct ModelSchemaArgs {
    pub api: String,
    pub model_name: String,
}

fn pagination(page: Option<usize>, page_size: Option<usize>) -> Result<PaginationParams> {
    PaginationParams::new(page.unwrap_or(1), page_size.unwrap_or(DEFAULT_PAGE_SIZE))
}

const fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_exposes_the_full_surface() {
        let tools = catalog();
        let names: Vec<&str> = tools.iter().map(|t| t.name.as_ref()).collect();
        assert_eq!(
            names,
            vec![
                "add_api",
                "remove_api",
                "list_saved_apis",
                "get_api_info",
                "list_endpoints",
                "search_endpoints",
                "get_endpoint_details",
                "list_models",
                "get_model_schema",
            ]
        );
        for tool in &tools {
            assert_eq!(
                tool.input_schema.get("type").and_then(|v| v.as_str()),
                Some("object")
            );
        }
    }

    #[test]
    fn search_args_flatten_list_fields() {
        let args: SearchEndpointsArgs = serde_json::from_value(json!({
            "api": "petstore",
            "query": "user",
            "page": 2,
            "methods": ["GET"],
        }))
        .unwrap();
        assert_eq!(args.list.api, "petstore");
        assert_eq!(args.query, "user");
        assert_eq!(args.list.pagination().unwrap().page(), 2);
        assert!(args.list.filter().is_ok());
    }

    #[test]
    fn include_responses_defaults_to_true() {
        let args: EndpointDetailsArgs = serde_json::from_value(json!({
            "api": "petstore",
            "path": "/pets",
            "method": "GET",
        }))
        .unwrap();
        assert!(args.include_responses);
    }

    #[test]
    fn oversized_page_size_is_rejected_at_parse_time() {
        let args: ListEndpointsArgs = serde_json::from_value(json!({
            "api": "petstore",
            "page_size": 150,
        }))
        .unwrap();
        assert!(args.pagination().is_err());
    }
}
