//! Declarative filtering and pagination over projected collections.
//!
//! Operates only on already-projected, in-memory collections; nothing here touches the
//! document or the network. Every list tool runs filter-then-paginate, in that order, so
//! `total_count` and the navigation metadata always describe the filtered population.

use crate::error::{ExplorerError, Result};
use crate::projection::{Endpoint, Model, is_http_method};

/// Hard ceiling on `page_size`; larger values are rejected, not clamped.
pub const MAX_PAGE_SIZE: usize = 100;

/// Page size used when the caller does not specify one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// 1-based pagination parameters, validated on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationParams {
    page: usize,
    page_size: usize,
}

impl Default for PaginationParams {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationParams {
    /// # Errors
    ///
    /// Returns [`ExplorerError::Validation`] when `page < 1` or `page_size` is outside
    /// `1..=100`.
    pub fn new(page: usize, page_size: usize) -> Result<Self> {
        if page < 1 {
            return Err(ExplorerError::Validation(
                "page must be >= 1".to_string(),
            ));
        }
        if page_size < 1 {
            return Err(ExplorerError::Validation(
                "page_size must be >= 1".to_string(),
            ));
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(ExplorerError::Validation(format!(
                "page_size cannot exceed {MAX_PAGE_SIZE}"
            )));
        }
        Ok(Self { page, page_size })
    }

    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub fn offset(&self) -> usize {
        (self.page - 1) * self.page_size
    }
}

/// One page of an already-filtered collection, with navigation metadata.
#[derive(Debug, Clone)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    /// Pre-slice, post-filter count.
    pub total_count: usize,
    pub page: usize,
    pub page_size: usize,
    pub total_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
}

impl<T> Paginated<T> {
    /// Slice a filtered collection into one page. The offset is clamped to the
    /// collection bounds, so an out-of-range page yields an empty page, never an error.
    #[must_use]
    pub fn slice(items: Vec<T>, params: PaginationParams) -> Self {
        let total_count = items.len();
        let total_pages = total_count.div_ceil(params.page_size());
        let offset = params.offset().min(total_count);
        let end = (offset + params.page_size()).min(total_count);
        let items: Vec<T> = items
            .into_iter()
            .skip(offset)
            .take(end - offset)
            .collect();

        Self {
            items,
            total_count,
            page: params.page(),
            page_size: params.page_size(),
            total_pages,
            has_next: params.page() < total_pages,
            has_previous: params.page() > 1,
        }
    }

    /// Navigation text: the 1-based inclusive item range, plus page position and
    /// Previous/Next hints when more than one page exists.
    #[must_use]
    pub fn format_navigation(&self) -> String {
        let start = (self.page - 1) * self.page_size + 1;
        let end = (self.page * self.page_size).min(self.total_count);

        let mut out = format!("Results: {start}-{end} of {}", self.total_count);
        if self.total_pages > 1 {
            out.push_str(&format!(" (Page {} of {})", self.page, self.total_pages));
            out.push_str("\n\nNavigation:");
            if self.has_previous {
                out.push_str(&format!("\n- Previous: Page {}", self.page - 1));
            }
            if self.has_next {
                out.push_str(&format!("\n- Next: Page {}", self.page + 1));
            }
            out.push_str("\n- Use 'page' parameter to navigate");
        }
        out
    }
}

/// AND-combination of independent endpoint predicates; absent fields are vacuously true.
#[derive(Debug, Clone, Default)]
pub struct EndpointFilter {
    methods: Option<Vec<String>>,
    tags_include: Option<Vec<String>>,
    tags_exclude: Option<Vec<String>>,
    has_authentication: Option<bool>,
    deprecated: Option<bool>,
}

impl EndpointFilter {
    /// # Errors
    ///
    /// Returns [`ExplorerError::Validation`] when any entry in `methods` is not one of
    /// the seven standard HTTP verbs; a single invalid entry rejects the whole filter.
    pub fn new(
        methods: Option<Vec<String>>,
        tags_include: Option<Vec<String>>,
        tags_exclude: Option<Vec<String>>,
        has_authentication: Option<bool>,
        deprecated: Option<bool>,
    ) -> Result<Self> {
        let methods = match methods {
            Some(methods) => Some(normalize_methods(methods)?),
            None => None,
        };
        Ok(Self {
            methods,
            tags_include,
            tags_exclude,
            has_authentication,
            deprecated,
        })
    }

    #[must_use]
    pub fn matches(&self, endpoint: &Endpoint) -> bool {
        if let Some(methods) = &self.methods {
            if !methods.iter().any(|m| *m == endpoint.method) {
                return false;
            }
        }
        if let Some(include) = &self.tags_include {
            if !include.iter().any(|t| endpoint.tags.contains(t)) {
                return false;
            }
        }
        if let Some(exclude) = &self.tags_exclude {
            if exclude.iter().any(|t| endpoint.tags.contains(t)) {
                return false;
            }
        }
        if let Some(has_authentication) = self.has_authentication {
            if endpoint.has_authentication != has_authentication {
                return false;
            }
        }
        if let Some(deprecated) = self.deprecated {
            if endpoint.deprecated != deprecated {
                return false;
            }
        }
        true
    }

    #[must_use]
    pub fn apply(&self, endpoints: Vec<Endpoint>) -> Vec<Endpoint> {
        endpoints.into_iter().filter(|e| self.matches(e)).collect()
    }

    /// Applied-filters block for display; empty string when no predicate is set.
    #[must_use]
    pub fn format_display(&self) -> String {
        let mut filters = Vec::new();
        if let Some(methods) = &self.methods {
            filters.push(format!("Methods: {}", methods.join(", ")));
        }
        if let Some(include) = &self.tags_include {
            filters.push(format!("Tags Include: [{}]", include.join(", ")));
        }
        if let Some(exclude) = &self.tags_exclude {
            filters.push(format!("Tags Exclude: [{}]", exclude.join(", ")));
        }
        if let Some(has_authentication) = self.has_authentication {
            filters.push(format!("Has Authentication: {has_authentication}"));
        }
        if let Some(deprecated) = self.deprecated {
            filters.push(format!("Deprecated: {deprecated}"));
        }
        render_filters(&filters)
    }
}

/// AND-combination of independent model predicates; absent fields are vacuously true.
#[derive(Debug, Clone, Default)]
pub struct ModelFilter {
    types: Option<Vec<String>>,
    min_properties: Option<usize>,
    max_properties: Option<usize>,
    has_required_fields: Option<bool>,
    tags_include: Option<Vec<String>>,
    tags_exclude: Option<Vec<String>>,
}

impl ModelFilter {
    /// # Errors
    ///
    /// Returns [`ExplorerError::Validation`] when `max_properties < min_properties`.
    pub fn new(
        types: Option<Vec<String>>,
        min_properties: Option<usize>,
        max_properties: Option<usize>,
        has_required_fields: Option<bool>,
        tags_include: Option<Vec<String>>,
        tags_exclude: Option<Vec<String>>,
    ) -> Result<Self> {
        if let (Some(min), Some(max)) = (min_properties, max_properties) {
            if max < min {
                return Err(ExplorerError::Validation(
                    "max_properties cannot be less than min_properties".to_string(),
                ));
            }
        }
        Ok(Self {
            types,
            min_properties,
            max_properties,
            has_required_fields,
            tags_include,
            tags_exclude,
        })
    }

    #[must_use]
    pub fn matches(&self, model: &Model) -> bool {
        if let Some(types) = &self.types {
            if !types.iter().any(|t| *t == model.model_type) {
                return false;
            }
        }
        if let Some(min) = self.min_properties {
            if model.property_count() < min {
                return false;
            }
        }
        if let Some(max) = self.max_properties {
            if model.property_count() > max {
                return false;
            }
        }
        if let Some(has_required_fields) = self.has_required_fields {
            if (model.required_count() > 0) != has_required_fields {
                return false;
            }
        }
        if let Some(include) = &self.tags_include {
            if !include.iter().any(|t| model.tags.contains(t)) {
                return false;
            }
        }
        if let Some(exclude) = &self.tags_exclude {
            if exclude.iter().any(|t| model.tags.contains(t)) {
                return false;
            }
        }
        true
    }

    #[must_use]
    pub fn apply(&self, models: Vec<Model>) -> Vec<Model> {
        models.into_iter().filter(|m| self.matches(m)).collect()
    }

    /// Applied-filters block for display; empty string when no predicate is set.
    #[must_use]
    pub fn format_display(&self) -> String {
        let mut filters = Vec::new();
        if let Some(types) = &self.types {
            filters.push(format!("Types: {}", types.join(", ")));
        }
        if let Some(min) = self.min_properties {
            filters.push(format!("Min Properties: {min}"));
        }
        if let Some(max) = self.max_properties {
            filters.push(format!("Max Properties: {max}"));
        }
        if let Some(has_required_fields) = self.has_required_fields {
            filters.push(format!("Has Required Fields: {has_required_fields}"));
        }
        if let Some(include) = &self.tags_include {
            filters.push(format!("Tags Include: [{}]", include.join(", ")));
        }
        if let Some(exclude) = &self.tags_exclude {
            filters.push(format!("Tags Exclude: [{}]", exclude.join(", ")));
        }
        render_filters(&filters)
    }
}

fn render_filters(filters: &[String]) -> String {
    if filters.is_empty() {
        return String::new();
    }
    let lines: Vec<String> = filters.iter().map(|f| format!("- {f}")).collect();
    format!("Applied Filters:\n{}", lines.join("\n"))
}

fn normalize_methods(methods: Vec<String>) -> Result<Vec<String>> {
    let invalid: Vec<String> = methods
        .iter()
        .filter(|m| !is_http_method(m))
        .cloned()
        .collect();
    if !invalid.is_empty() {
        return Err(ExplorerError::Validation(format!(
            "Invalid HTTP methods: [{}]",
            invalid.join(", ")
        )));
    }
    Ok(methods
        .into_iter()
        .map(|m| m.to_ascii_uppercase())
        .collect())
}

/// Free-text search over endpoints: a special-case filter applied before pagination.
#[must_use]
pub fn search_endpoints(endpoints: Vec<Endpoint>, query: &str) -> Vec<Endpoint> {
    endpoints
        .into_iter()
        .filter(|e| e.matches_query(query))
        .collect()
}
