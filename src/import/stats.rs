//! Corpus size and token statistics
//!
//! A pure measurement pass used for reporting; it has no effect on extraction.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

use super::ImportError;
use super::loader::JobSource;

/// Counts tokens in a text
///
/// Any `Fn(&str) -> usize` closure is a tokenizer.
pub trait Tokenizer {
    fn count_tokens(&self, text: &str) -> usize;
}

impl<F> Tokenizer for F
where
    F: Fn(&str) -> usize,
{
    fn count_tokens(&self, text: &str) -> usize {
        self(text)
    }
}

/// Counts whitespace-separated words
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

/// Size and token count of one file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStats {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub size_kb: f64,
    pub tokens: usize,
}

/// Aggregate size and token statistics over a set of files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusStats {
    pub label: String,
    pub file_count: usize,
    pub files: Vec<FileStats>,
    pub total_size_bytes: u64,
    pub total_tokens: usize,
    pub total_size_kb: f64,
    pub total_size_mb: f64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl CorpusStats {
    /// Measure every job document of a source.
    ///
    /// Documents that cannot be read are logged and left out of the totals
    /// but still counted in `file_count`.
    pub fn from_source<S, T>(label: &str, source: &S, tokenizer: &T) -> Result<Self, ImportError>
    where
        S: JobSource + ?Sized,
        T: Tokenizer + ?Sized,
    {
        let paths = source.list_jobs()?;
        let file_count = paths.len();
        let texts = paths.into_iter().filter_map(|path| match source.read_job(&path) {
            Ok(text) => Some((path, text)),
            Err(e) => {
                warn!("Error calculating stats for {}: {}", path.display(), e);
                None
            }
        });
        let mut stats = Self::from_texts(label, texts, tokenizer);
        stats.file_count = file_count;
        Ok(stats)
    }

    /// Measure in-memory texts, e.g. rendered outputs.
    pub fn from_texts<I, P, T>(label: &str, texts: I, tokenizer: &T) -> Self
    where
        I: IntoIterator<Item = (P, String)>,
        P: AsRef<Path>,
        T: Tokenizer + ?Sized,
    {
        let files: Vec<FileStats> = texts
            .into_iter()
            .map(|(path, text)| {
                let path = path.as_ref();
                let size_bytes = text.len() as u64;
                FileStats {
                    name: path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                    path: path.to_path_buf(),
                    size_bytes,
                    size_kb: round2(size_bytes as f64 / 1024.0),
                    tokens: tokenizer.count_tokens(&text),
                }
            })
            .collect();

        let total_size_bytes = files.iter().map(|f| f.size_bytes).sum();
        let total_tokens = files.iter().map(|f| f.tokens).sum();

        Self {
            label: label.to_string(),
            file_count: files.len(),
            files,
            total_size_bytes,
            total_tokens,
            total_size_kb: round2(total_size_bytes as f64 / 1024.0),
            total_size_mb: round2(total_size_bytes as f64 / (1024.0 * 1024.0)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::loader::InMemorySource;

    #[test]
    fn test_whitespace_tokenizer() {
        assert_eq!(WhitespaceTokenizer.count_tokens("SELECT *\n  FROM t"), 4);
        assert_eq!(WhitespaceTokenizer.count_tokens(""), 0);
    }

    #[test]
    fn test_closure_tokenizer() {
        let chars = |text: &str| text.chars().count();
        let stats = CorpusStats::from_texts("Destination", [("out/a.sql", "abcd".to_string())], &chars);
        assert_eq!(stats.total_tokens, 4);
        assert_eq!(stats.files[0].name, "a.sql");
    }

    #[test]
    fn test_stats_from_source() {
        let source = InMemorySource::new()
            .with_job("a.item", "x".repeat(2048))
            .with_job("b.item", "one two");
        let stats = CorpusStats::from_source("Source", &source, &WhitespaceTokenizer).unwrap();

        assert_eq!(stats.file_count, 2);
        assert_eq!(stats.total_size_bytes, 2055);
        assert_eq!(stats.total_tokens, 3);
        assert_eq!(stats.files[0].size_kb, 2.0);
        assert_eq!(stats.total_size_mb, 0.0);
    }
}
