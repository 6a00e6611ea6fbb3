//! Plain-text rendering of projected collections and pages.
//!
//! Every tool response is text; these functions own the exact wording, and the tests
//! below pin it. Structure is always: header, item lines, optional applied-filters
//! block, navigation footer.

use crate::error::Result;
use crate::page::Paginated;
use crate::projection::{Endpoint, EndpointDetails, Model, ModelSchema};
use crate::registry::ApiEntry;

/// Render one page of endpoints, with an `Applied Filters:` block when `filters` is
/// non-empty (as produced by `EndpointFilter::format_display`).
#[must_use]
pub fn endpoint_page(page: &Paginated<Endpoint>, filters: &str) -> String {
    if page.total_count == 0 {
        return "No endpoints found".to_string();
    }
    let header = format!("Found {} endpoints:", page.total_count);
    render_page(header, page, Endpoint::display_line, filters)
}

/// Render one page of search hits for `query`.
#[must_use]
pub fn search_page(page: &Paginated<Endpoint>, query: &str, filters: &str) -> String {
    if page.total_count == 0 {
        return format!("No endpoints found matching '{query}'");
    }
    let header = format!("Found {} endpoints matching '{query}':", page.total_count);
    render_page(header, page, Endpoint::display_line, filters)
}

/// Render one page of models; `detailed` adds descriptions and property counts.
#[must_use]
pub fn model_page(page: &Paginated<Model>, detailed: bool, filters: &str) -> String {
    if page.total_count == 0 {
        return "No models found".to_string();
    }
    let header = format!("Found {} models:", page.total_count);
    render_page(header, page, |m| m.display_line(detailed), filters)
}

fn render_page<T>(
    header: String,
    page: &Paginated<T>,
    line: impl Fn(&T) -> String,
    filters: &str,
) -> String {
    let mut out = header;
    out.push('\n');
    for item in &page.items {
        out.push('\n');
        out.push_str(&line(item));
    }
    if !filters.is_empty() {
        out.push_str("\n\n");
        out.push_str(filters);
    }
    out.push_str("\n\n");
    out.push_str(&page.format_navigation());
    out
}

/// Render full operation details: a human header followed by the raw schema dump.
///
/// # Errors
///
/// Propagates serialization failures from the raw fragment dump.
pub fn endpoint_details_text(details: &EndpointDetails) -> Result<String> {
    let mut out = format!("{} {}\n", details.method, details.path);
    if let Some(summary) = &details.summary {
        out.push_str(&format!("Summary: {summary}\n"));
    }
    if let Some(description) = &details.description {
        out.push_str(&format!("Description: {description}\n"));
    }
    if !details.tags.is_empty() {
        out.push_str(&format!("Tags: {}\n", details.tags.join(", ")));
    }
    out.push_str("\nFull schema:\n");
    out.push_str(&serde_json::to_string_pretty(details)?);
    Ok(out)
}

/// Render one model's raw schema fragment.
///
/// # Errors
///
/// Propagates serialization failures from the raw fragment dump.
pub fn model_schema_text(model: &ModelSchema) -> Result<String> {
    Ok(format!(
        "Model: {}\n\nSchema:\n{}",
        model.name,
        serde_json::to_string_pretty(&model.schema)?
    ))
}

/// Render the saved-API listing, one line per entry.
#[must_use]
pub fn saved_apis_text(entries: &[ApiEntry]) -> String {
    if entries.is_empty() {
        return "No saved APIs".to_string();
    }
    let mut out = "Saved APIs:".to_string();
    for entry in entries {
        out.push_str(&format!("\n- {}: {}", entry.name, entry.url));
        if let Some(description) = &entry.description {
            out.push_str(&format!(" - {description}"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{PaginationParams, Paginated};
    use serde_json::json;
    use std::collections::HashMap;

    fn endpoint(method: &str, path: &str, summary: Option<&str>) -> Endpoint {
        Endpoint {
            path: path.to_string(),
            method: method.to_string(),
            summary: summary.map(str::to_string),
            description: None,
            tags: Vec::new(),
            operation_id: None,
            deprecated: false,
            has_authentication: false,
        }
    }

    #[test]
    fn endpoint_page_text() {
        let page = Paginated::slice(
            vec![
                endpoint("GET", "/pets", Some("List pets")),
                endpoint("POST", "/pets", None),
            ],
            PaginationParams::default(),
        );
        assert_eq!(
            endpoint_page(&page, ""),
            "Found 2 endpoints:\n\n\
             GET /pets - List pets\n\
             POST /pets\n\n\
             Results: 1-2 of 2"
        );
    }

    #[test]
    fn endpoint_page_includes_applied_filters() {
        let page = Paginated::slice(
            vec![endpoint("GET", "/pets", None)],
            PaginationParams::default(),
        );
        let text = endpoint_page(&page, "Applied Filters:\n- Methods: GET");
        assert_eq!(
            text,
            "Found 1 endpoints:\n\n\
             GET /pets\n\n\
             Applied Filters:\n\
             - Methods: GET\n\n\
             Results: 1-1 of 1"
        );
    }

    #[test]
    fn empty_pages_short_circuit() {
        let empty: Paginated<Endpoint> =
            Paginated::slice(Vec::new(), PaginationParams::default());
        assert_eq!(endpoint_page(&empty, ""), "No endpoints found");
        assert_eq!(
            search_page(&empty, "user", ""),
            "No endpoints found matching 'user'"
        );

        let no_models: Paginated<Model> =
            Paginated::slice(Vec::new(), PaginationParams::default());
        assert_eq!(model_page(&no_models, false, ""), "No models found");
    }

    #[test]
    fn search_page_names_the_query() {
        let page = Paginated::slice(
            vec![endpoint("GET", "/users", Some("Find a User"))],
            PaginationParams::default(),
        );
        assert_eq!(
            search_page(&page, "user", ""),
            "Found 1 endpoints matching 'user':\n\n\
             GET /users - Find a User\n\n\
             Results: 1-1 of 1"
        );
    }

    #[test]
    fn model_page_detailed_lines() {
        let mut properties = serde_json::Map::new();
        properties.insert("id".to_string(), json!({}));
        properties.insert("name".to_string(), json!({}));
        let model = Model {
            name: "Pet".to_string(),
            model_type: "object".to_string(),
            properties,
            required: vec!["id".to_string()],
            description: Some("A pet".to_string()),
            tags: Vec::new(),
        };
        let page = Paginated::slice(vec![model], PaginationParams::default());
        assert_eq!(
            model_page(&page, true, ""),
            "Found 1 models:\n\n\
             - Pet (object) - A pet [2 properties, 1 required]\n\n\
             Results: 1-1 of 1"
        );
    }

    #[test]
    fn endpoint_details_text_layout() {
        let details = EndpointDetails {
            path: "/pets".to_string(),
            method: "GET".to_string(),
            summary: Some("List pets".to_string()),
            description: None,
            tags: vec!["pets".to_string()],
            operation_id: Some("listPets".to_string()),
            parameters: json!([]),
            request_body: None,
            responses: None,
            security: json!([]),
        };
        let text = endpoint_details_text(&details).unwrap();
        assert!(text.starts_with("GET /pets\nSummary: List pets\nTags: pets\n\nFull schema:\n"));
        assert!(text.contains("\"operation_id\": \"listPets\""));
        // Responses were excluded, so the dump must not mention them.
        assert!(!text.contains("\"responses\""));
    }

    #[test]
    fn model_schema_text_layout() {
        let model = ModelSchema {
            name: "Pet".to_string(),
            schema: json!({ "type": "object" }),
        };
        assert_eq!(
            model_schema_text(&model).unwrap(),
            "Model: Pet\n\nSchema:\n{\n  \"type\": \"object\"\n}"
        );
    }

    #[test]
    fn saved_apis_listing() {
        assert_eq!(saved_apis_text(&[]), "No saved APIs");

        let entries = vec![
            ApiEntry {
                name: "petstore".to_string(),
                url: "https://petstore3.swagger.io/api/v3/openapi.json".to_string(),
                description: Some("Demo API".to_string()),
                headers: HashMap::new(),
            },
            ApiEntry {
                name: "zoo".to_string(),
                url: "https://zoo.example/openapi.json".to_string(),
                description: None,
                headers: HashMap::new(),
            },
        ];
        assert_eq!(
            saved_apis_text(&entries),
            "Saved APIs:\n\
             - petstore: https://petstore3.swagger.io/api/v3/openapi.json - Demo API\n\
             - zoo: https://zoo.example/openapi.json"
        );
    }
}
