//! OpenAPI schema exploration core.
//!
//! This crate implements everything behind the `specscope` tool surface except the MCP
//! wiring itself:
//! - fetching and memoizing remote OpenAPI/Swagger documents ([`cache`])
//! - named API registrations with JSON persistence ([`registry`])
//! - projecting a raw document into flat endpoint/model collections ([`projection`])
//! - declarative filtering and pagination over those collections ([`page`])
//! - the text rendering the tools return ([`format`])
//!
//! Documents are kept as raw `serde_json::Value` trees on purpose: the explorer must
//! tolerate arbitrary, partially-conformant documents, so every projection reads with
//! defaulting accessors instead of a typed OpenAPI model.

pub mod cache;
pub mod error;
pub mod explorer;
pub mod format;
pub mod page;
pub mod projection;
pub mod registry;
