//! SQL deduplication

use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::models::sql::SqlExtraction;

/// Compute SHA256 hash of content
pub fn compute_hash(content: &[u8]) -> String {
    format!("{:x}", Sha256::digest(content))
}

/// Keep the first extraction of every distinct cleaned statement.
///
/// Order is preserved, so with extractions listed in job discovery order the
/// copy retained is the one from the earliest job.
pub fn deduplicate(extractions: impl IntoIterator<Item = SqlExtraction>) -> Vec<SqlExtraction> {
    let mut seen = HashSet::new();
    extractions
        .into_iter()
        .filter(|sql| seen.insert(compute_hash(sql.cleaned_sql.as_bytes())))
        .collect()
}
