//! Export functionality
//!
//! Renders an extracted corpus into its auxiliary outputs:
//! - SQL script with provenance comments
//! - transform document grouped by job
//! - context-variable mapping document
//! - plain-text summary report
//!
//! Structured outputs derive `serde::Serialize`; encoding them is left to the
//! caller.

pub mod context;
pub mod sql_script;
pub mod summary;
pub mod transforms;

pub use context::ContextMappingDocument;
pub use sql_script::render_sql_script;
pub use summary::render_summary;
pub use transforms::{TransformDocument, TransformListing};
