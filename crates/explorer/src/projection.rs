//! Projections over a raw OpenAPI/Swagger document.
//!
//! Pure functions of a parsed `serde_json::Value` tree: no I/O, no mutation of the
//! document. Every accessor tolerates missing or oddly-typed fields and falls back to an
//! empty default, so partially-conformant documents project without runtime errors.

use crate::error::{ExplorerError, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

/// The seven operation keys recognized under a path item. Anything else (`parameters`,
/// `$ref`, vendor extensions) is skipped.
const HTTP_METHODS: [&str; 7] = ["get", "post", "put", "delete", "patch", "head", "options"];

pub(crate) fn is_http_method(key: &str) -> bool {
    HTTP_METHODS.iter().any(|m| key.eq_ignore_ascii_case(m))
}

/// A single `(path, method)` operation, flattened for listing and filtering.
///
/// Derived, never persisted: recomputed from the cached document on every listing call.
#[derive(Debug, Clone, Serialize)]
pub struct Endpoint {
    pub path: String,
    /// Always upper-cased.
    pub method: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub operation_id: Option<String>,
    pub deprecated: bool,
    /// True iff the operation declares a non-empty `security` array OR the document
    /// declares a non-empty top-level `security` array. An operation opting out of
    /// global auth with an explicit `security: []` still reads as authenticated when
    /// global security exists; this mirrors the original behavior and is intentional.
    pub has_authentication: bool,
}

impl Endpoint {
    /// One display line: `{METHOD} {path}` plus optional summary, tags, and flags.
    #[must_use]
    pub fn display_line(&self) -> String {
        let mut line = format!("{} {}", self.method, self.path);
        if let Some(summary) = &self.summary {
            line.push_str(&format!(" - {summary}"));
        }
        if !self.tags.is_empty() {
            line.push_str(&format!(" [Tags: {}]", self.tags.join(", ")));
        }
        if self.deprecated {
            line.push_str(" [DEPRECATED]");
        }
        if self.has_authentication {
            line.push_str(" [AUTH]");
        }
        line
    }

    /// Case-insensitive substring match against the space-joined concatenation of path,
    /// summary, description, and tags (in that order). No tokenization, no fuzzing.
    #[must_use]
    pub fn matches_query(&self, query: &str) -> bool {
        let haystack = [
            self.path.as_str(),
            self.summary.as_deref().unwrap_or(""),
            self.description.as_deref().unwrap_or(""),
            &self.tags.join(" "),
        ]
        .join(" ")
        .to_lowercase();
        haystack.contains(&query.to_lowercase())
    }
}

/// A named schema under `components.schemas`, flattened for listing and filtering.
#[derive(Debug, Clone, Serialize)]
pub struct Model {
    pub name: String,
    /// Schema `type`, defaulting to `"object"`.
    pub model_type: String,
    /// Raw property fragments, passed through unmodified.
    pub properties: Map<String, Value>,
    pub required: Vec<String>,
    pub description: Option<String>,
    /// From `x-tags` when present, else `tags`, else empty.
    pub tags: Vec<String>,
}

impl Model {
    #[must_use]
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }

    #[must_use]
    pub fn required_count(&self) -> usize {
        self.required.len()
    }

    /// One display line: `- {name} ({type})`, optionally with description and counts.
    #[must_use]
    pub fn display_line(&self, detailed: bool) -> String {
        let mut line = format!("- {} ({})", self.name, self.model_type);
        if detailed {
            if let Some(description) = &self.description {
                line.push_str(&format!(" - {description}"));
            }
            line.push_str(&format!(" [{} properties", self.property_count()));
            if !self.required.is_empty() {
                line.push_str(&format!(", {} required", self.required_count()));
            }
            line.push(']');
        }
        line
    }
}

/// General information about an API document.
#[derive(Debug, Clone, Serialize)]
pub struct ApiInfo {
    pub title: String,
    pub version: String,
    pub description: String,
    pub base_url: String,
    pub tags: Vec<String>,
}

impl ApiInfo {
    #[must_use]
    pub fn format_display(&self) -> String {
        let mut out = format!("API: {} (v{})\n", self.title, self.version);
        out.push_str(&format!("Description: {}\n", self.description));
        out.push_str(&format!("Base URL: {}\n", self.base_url));
        if !self.tags.is_empty() {
            out.push_str(&format!("Tags: {}\n", self.tags.join(", ")));
        }
        out
    }
}

/// Full details for one operation. Parameters, request body, responses, and security
/// are the raw document fragments, passed through unmodified.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointDetails {
    pub path: String,
    pub method: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub operation_id: Option<String>,
    pub parameters: Value,
    pub request_body: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responses: Option<Value>,
    pub security: Value,
}

/// A named model and its raw schema fragment.
#[derive(Debug, Clone, Serialize)]
pub struct ModelSchema {
    pub name: String,
    pub schema: Value,
}

/// Flatten `doc.paths` into one [`Endpoint`] per `(path, verb)` pair, in encounter
/// order. A missing `paths` mapping yields an empty collection, not an error.
#[must_use]
pub fn project_endpoints(doc: &Value) -> Vec<Endpoint> {
    let global_security = non_empty_array(doc, "security");
    let mut endpoints = Vec::new();

    let Some(paths) = doc.get("paths").and_then(Value::as_object) else {
        return endpoints;
    };

    for (path, path_item) in paths {
        let Some(item) = path_item.as_object() else {
            continue;
        };
        for (key, operation) in item {
            if !is_http_method(key) {
                continue;
            }
            endpoints.push(Endpoint {
                path: path.clone(),
                method: key.to_ascii_uppercase(),
                summary: str_field(operation, "summary"),
                description: str_field(operation, "description"),
                tags: string_list(operation, "tags"),
                operation_id: str_field(operation, "operationId"),
                deprecated: operation
                    .get("deprecated")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                has_authentication: non_empty_array(operation, "security") || global_security,
            });
        }
    }

    endpoints
}

/// Flatten `doc.components.schemas` into one [`Model`] per entry. Missing `components`
/// or `components.schemas` yields an empty collection.
#[must_use]
pub fn project_models(doc: &Value) -> Vec<Model> {
    let Some(schemas) = doc
        .get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    schemas
        .iter()
        .map(|(name, fragment)| {
            // `x-tags` takes priority over a plain `tags` field.
            let tags = if fragment.get("x-tags").is_some() {
                string_list(fragment, "x-tags")
            } else {
                string_list(fragment, "tags")
            };
            Model {
                name: name.clone(),
                model_type: str_field(fragment, "type").unwrap_or_else(|| "object".to_string()),
                properties: fragment
                    .get("properties")
                    .and_then(Value::as_object)
                    .cloned()
                    .unwrap_or_default(),
                required: string_list(fragment, "required"),
                description: str_field(fragment, "description"),
                tags,
            }
        })
        .collect()
}

/// Derive [`ApiInfo`] from the document. `resolved_url` is the URL the document was
/// fetched from; relative server URLs are resolved against it.
#[must_use]
pub fn api_info(doc: &Value, resolved_url: &str) -> ApiInfo {
    let info = doc.get("info").cloned().unwrap_or(Value::Null);

    // Tag entries lacking a `name` are dropped rather than surfaced as holes.
    let tags = doc
        .get("tags")
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(|t| t.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    ApiInfo {
        title: str_field(&info, "title").unwrap_or_else(|| "Unknown".to_string()),
        version: str_field(&info, "version").unwrap_or_else(|| "Unknown".to_string()),
        description: str_field(&info, "description").unwrap_or_default(),
        base_url: base_url(doc, resolved_url),
        tags,
    }
}

fn base_url(doc: &Value, resolved_url: &str) -> String {
    // OpenAPI 3.x: first server entry wins.
    if let Some(server_url) = doc
        .get("servers")
        .and_then(Value::as_array)
        .and_then(|servers| servers.first())
        .and_then(|server| server.get("url"))
        .and_then(Value::as_str)
    {
        return resolve_server_url(server_url, resolved_url);
    }

    // Swagger 2.0: compose from schemes/host/basePath.
    if let Some(host) = doc.get("host").and_then(Value::as_str) {
        let scheme = doc
            .get("schemes")
            .and_then(Value::as_array)
            .and_then(|schemes| schemes.first())
            .and_then(Value::as_str)
            .unwrap_or("https");
        let base_path = doc.get("basePath").and_then(Value::as_str).unwrap_or("");
        return format!("{scheme}://{host}{base_path}");
    }

    String::new()
}

fn resolve_server_url(server_url: &str, resolved_url: &str) -> String {
    if server_url.starts_with("http://") || server_url.starts_with("https://") {
        return server_url.to_string();
    }
    // OpenAPI allows relative server URLs (e.g. "/api/v3"); resolve them against the
    // URL the document was fetched from so common specs just work.
    match Url::parse(resolved_url).and_then(|base| base.join(server_url)) {
        Ok(joined) => joined.to_string(),
        Err(_) => server_url.to_string(),
    }
}

/// Look up one operation and return its details.
///
/// # Errors
///
/// Returns [`ExplorerError::NotFound`] when the path is absent from `doc.paths`, or when
/// the lower-cased method is absent from that path item.
pub fn endpoint_details(
    doc: &Value,
    path: &str,
    method: &str,
    include_responses: bool,
) -> Result<EndpointDetails> {
    let Some(path_item) = doc
        .get("paths")
        .and_then(Value::as_object)
        .and_then(|paths| paths.get(path))
    else {
        return Err(ExplorerError::NotFound(format!("Path '{path}' not found")));
    };

    let method_lower = method.to_ascii_lowercase();
    let Some(operation) = path_item.get(&method_lower) else {
        return Err(ExplorerError::NotFound(format!(
            "Method '{method}' not found for path '{path}'"
        )));
    };

    Ok(EndpointDetails {
        path: path.to_string(),
        method: method.to_ascii_uppercase(),
        summary: str_field(operation, "summary"),
        description: str_field(operation, "description"),
        tags: string_list(operation, "tags"),
        operation_id: str_field(operation, "operationId"),
        parameters: operation
            .get("parameters")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())),
        request_body: operation.get("requestBody").cloned(),
        responses: include_responses
            .then(|| operation.get("responses").cloned().unwrap_or_else(empty_object)),
        security: operation
            .get("security")
            .cloned()
            .unwrap_or_else(|| Value::Array(Vec::new())),
    })
}

/// Look up one named model and return its raw schema fragment.
///
/// # Errors
///
/// Returns [`ExplorerError::NotFound`] when the name is absent from
/// `components.schemas`.
pub fn model_schema(doc: &Value, name: &str) -> Result<ModelSchema> {
    doc.get("components")
        .and_then(|c| c.get("schemas"))
        .and_then(|schemas| schemas.get(name))
        .map(|schema| ModelSchema {
            name: name.to_string(),
            schema: schema.clone(),
        })
        .ok_or_else(|| ExplorerError::NotFound(format!("Model '{name}' not found")))
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(Value::as_str).map(str::to_string)
}

fn string_list(value: &Value, key: &str) -> Vec<String> {
    value
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn non_empty_array(value: &Value, key: &str) -> bool {
    value
        .get(key)
        .and_then(Value::as_array)
        .is_some_and(|items| !items.is_empty())
}
