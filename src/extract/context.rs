//! Context variable classification
//!
//! Variables are classified by name (and for some categories by declared
//! type) against an ordered category table. The first classification of a
//! name is cached and reused for the rest of the corpus.

use std::collections::HashMap;

use crate::models::context::{ContextCategory, ContextClassification, ContextVariable};
use crate::models::job::ContextParameter;

/// Name prefixes of environment-specific variables
pub const ENVIRONMENT_PREFIXES: &[&str] = &["dev_", "test_", "prod_", "qa_", "staging_"];

/// How the target reference of a category is built
#[derive(Debug, Clone, Copy)]
enum Reference {
    /// Fixed target expression
    Fixed(&'static str),
    /// `var('<prefix><lower name>')`
    Var(&'static str),
}

impl Reference {
    fn render(&self, lower_name: &str) -> String {
        match self {
            Reference::Fixed(expr) => expr.to_string(),
            Reference::Var(prefix) => format!("var('{}{}')", prefix, lower_name),
        }
    }
}

struct CategoryRule {
    category: ContextCategory,
    /// Substrings searched for in the lower-cased name
    patterns: &'static [&'static str],
    reference: Reference,
    validation: &'static str,
    /// Declared types (without `id_` prefix) that select the category
    /// regardless of the name
    required_types: &'static [&'static str],
}

static CATEGORY_RULES: &[CategoryRule] = &[
    CategoryRule {
        category: ContextCategory::Schema,
        patterns: &["schema", "database", "dataset", "catalog"],
        reference: Reference::Fixed("target.dataset"),
        validation: "Must be a valid database/schema identifier",
        required_types: &[],
    },
    CategoryRule {
        category: ContextCategory::DateFilter,
        patterns: &["date", "start_date", "end_date", "process_date", "run_date"],
        reference: Reference::Var(""),
        validation: "Must be a valid date format (YYYY-MM-DD)",
        required_types: &["Date"],
    },
    CategoryRule {
        category: ContextCategory::Timestamp,
        patterns: &["timestamp", "created_at", "updated_at", "modified"],
        reference: Reference::Var(""),
        validation: "Must be a valid timestamp format",
        required_types: &[],
    },
    CategoryRule {
        category: ContextCategory::FilePath,
        patterns: &["path", "file", "dir", "folder", "location"],
        reference: Reference::Var("external_"),
        validation: "Must be a valid file path",
        required_types: &[],
    },
    CategoryRule {
        category: ContextCategory::CloudStorage,
        patterns: &["s3", "bucket", "gcs", "azure", "blob"],
        reference: Reference::Var("cloud_"),
        validation: "Must be a valid cloud storage path",
        required_types: &[],
    },
    CategoryRule {
        category: ContextCategory::Environment,
        patterns: &["env", "environment", "stage", "tier"],
        reference: Reference::Fixed("target.name"),
        validation: "Must match defined environments (dev, test, prod)",
        required_types: &[],
    },
    CategoryRule {
        category: ContextCategory::Batch,
        patterns: &["batch", "job_id", "run_id", "execution"],
        reference: Reference::Var("batch_"),
        validation: "Must be a valid batch identifier",
        required_types: &[],
    },
    CategoryRule {
        category: ContextCategory::Threshold,
        patterns: &["threshold", "limit", "max", "min", "count"],
        reference: Reference::Var(""),
        validation: "Must be a numeric value",
        required_types: &["Integer", "Long", "Double"],
    },
];

impl CategoryRule {
    fn matches(&self, lower_name: &str, base_type: &str) -> bool {
        self.required_types.contains(&base_type)
            || self.patterns.iter().any(|p| lower_name.contains(p))
    }
}

/// Classify a name without consulting any cache.
fn classify_uncached(name: &str, declared_type: &str) -> ContextClassification {
    let lower = name.to_lowercase();
    let base_type = declared_type.strip_prefix("id_").unwrap_or(declared_type);

    if let Some(rule) = CATEGORY_RULES.iter().find(|r| r.matches(&lower, base_type)) {
        return ContextClassification {
            category: rule.category,
            reference: rule.reference.render(&lower),
            validation: rule.validation.to_string(),
        };
    }

    if let Some(clean) = ENVIRONMENT_PREFIXES
        .iter()
        .find_map(|prefix| lower.strip_prefix(prefix))
    {
        return ContextClassification {
            category: ContextCategory::EnvironmentSpecific,
            reference: format!(
                "var('{{{{'dev' if target.name == 'dev' else 'prod'}}}}_{}')",
                clean
            ),
            validation: "Must be defined for each target environment".to_string(),
        };
    }

    ContextClassification {
        category: ContextCategory::Generic,
        reference: format!("var('{}')", lower),
        validation: "No specific validation rules".to_string(),
    }
}

/// Classifier with a per-name cache spanning the whole corpus.
#[derive(Debug, Default)]
pub struct ContextClassifier {
    cache: HashMap<String, ContextClassification>,
}

impl ContextClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify a variable.
    ///
    /// The first classification of a name wins: later calls with the same
    /// name return it even when `declared_type` differs.
    pub fn classify(&mut self, name: &str, declared_type: &str) -> ContextClassification {
        self.cache
            .entry(name.to_string())
            .or_insert_with(|| classify_uncached(name, declared_type))
            .clone()
    }

    /// Classify a context parameter into a [`ContextVariable`].
    pub fn variable(&mut self, param: &ContextParameter) -> ContextVariable {
        let classification = self.classify(&param.name, &param.declared_type);
        ContextVariable {
            name: param.name.clone(),
            declared_type: param.declared_type.clone(),
            default_value: param.value.clone(),
            category: classification.category,
            reference: classification.reference,
            validation: classification.validation,
        }
    }

    /// Number of distinct names classified so far
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}
