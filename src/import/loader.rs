//! Job discovery and loading
//!
//! Loads job documents from a [`JobSource`], isolating per-job failures: a
//! document that cannot be read or parsed is logged and skipped, never
//! aborting the batch.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::ImportError;
use super::job::JobImporter;
use crate::models::job::JobDocument;

/// Default job definition file extension
pub const DEFAULT_JOB_EXTENSION: &str = "item";

/// Storage holding job definition documents
pub trait JobSource {
    /// Paths of every job document, in sorted order.
    fn list_jobs(&self) -> Result<Vec<PathBuf>, ImportError>;

    /// Read one job document as text.
    fn read_job(&self, path: &Path) -> Result<String, ImportError>;
}

/// Job documents found recursively under a directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extensions: Vec<String>,
}

impl DirectorySource {
    /// Source matching the default `.item` extension
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_extensions(root, [DEFAULT_JOB_EXTENSION])
    }

    /// Source matching any of the given extensions (with or without leading dot)
    pub fn with_extensions<I, E>(root: impl Into<PathBuf>, extensions: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: AsRef<str>,
    {
        Self {
            root: root.into(),
            extensions: extensions
                .into_iter()
                .map(|e| e.as_ref().trim_start_matches('.').to_string())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn matches(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e == ext))
    }
}

impl JobSource for DirectorySource {
    fn list_jobs(&self) -> Result<Vec<PathBuf>, ImportError> {
        if !self.root.is_dir() {
            return Err(ImportError::IoError(format!(
                "Directory not found: {}",
                self.root.display()
            )));
        }

        let mut paths: Vec<PathBuf> = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    warn!("Error accessing path: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file() && self.matches(entry.path()))
            .map(|entry| entry.into_path())
            .collect();

        paths.sort();
        Ok(paths)
    }

    fn read_job(&self, path: &Path) -> Result<String, ImportError> {
        fs::read_to_string(path)
            .map_err(|e| ImportError::IoError(format!("{}: {}", path.display(), e)))
    }
}

/// Job documents held in memory, keyed by path
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    files: BTreeMap<PathBuf, String>,
}

impl InMemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document, replacing any previous document at the same path.
    pub fn insert(&mut self, path: impl Into<PathBuf>, content: impl Into<String>) {
        self.files.insert(path.into(), content.into());
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_job(mut self, path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        self.insert(path, content);
        self
    }
}

impl JobSource for InMemorySource {
    fn list_jobs(&self) -> Result<Vec<PathBuf>, ImportError> {
        Ok(self.files.keys().cloned().collect())
    }

    fn read_job(&self, path: &Path) -> Result<String, ImportError> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| ImportError::IoError(format!("No such job: {}", path.display())))
    }
}

impl<S: JobSource + ?Sized> JobSource for &S {
    fn list_jobs(&self) -> Result<Vec<PathBuf>, ImportError> {
        (**self).list_jobs()
    }

    fn read_job(&self, path: &Path) -> Result<String, ImportError> {
        (**self).read_job(path)
    }
}

/// A job that could not be loaded
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Result of loading a corpus
#[derive(Debug, Default)]
pub struct LoadResult {
    /// Loaded jobs in discovery order
    pub jobs: Vec<JobDocument>,
    /// Jobs skipped because they could not be read or parsed
    pub failures: Vec<LoadFailure>,
}

/// Job name derived from a document path (the file stem)
pub fn job_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// `name`, or the first `<name>_<n>` (n >= 2) not in `taken`
fn unique_name(name: &str, taken: &HashSet<String>) -> String {
    if !taken.contains(name) {
        return name.to_string();
    }
    (2..)
        .map(|n| format!("{}_{}", name, n))
        .find(|candidate| !taken.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

/// Loads job documents from a source
pub struct JobLoader<S: JobSource> {
    source: S,
    importer: JobImporter,
}

impl<S: JobSource> JobLoader<S> {
    /// Create a new loader over the given source
    pub fn new(source: S) -> Self {
        Self {
            source,
            importer: JobImporter::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Load every job of the source.
    ///
    /// Only a failure to list the source is an error. Per-job failures are
    /// logged and reported in [`LoadResult::failures`]. A job whose name is
    /// already taken by an earlier job is kept under the first free
    /// `<name>_<n>` name, starting at 2.
    pub fn load(&self) -> Result<LoadResult, ImportError> {
        let paths = self.source.list_jobs()?;
        info!("Discovered {} job definitions", paths.len());

        let mut result = LoadResult::default();
        let mut names: HashSet<String> = HashSet::new();

        for path in paths {
            let stem = job_name(&path);
            let name = unique_name(&stem, &names);
            match self.load_job(&path, &name) {
                Ok(job) => {
                    if name != stem {
                        warn!(
                            "Job name {} already used, loading {} as {}",
                            stem,
                            path.display(),
                            name
                        );
                    } else {
                        debug!("Loaded job {} from {}", name, path.display());
                    }
                    names.insert(name);
                    result.jobs.push(job);
                }
                Err(e) => {
                    warn!("Skipping job {}: {:#}", path.display(), e);
                    result.failures.push(LoadFailure {
                        path,
                        error: format!("{:#}", e),
                    });
                }
            }
        }

        info!(
            "Loaded {} jobs ({} skipped)",
            result.jobs.len(),
            result.failures.len()
        );
        Ok(result)
    }

    fn load_job(&self, path: &Path, name: &str) -> Result<JobDocument> {
        let content = self
            .source
            .read_job(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        self.importer
            .import(name, &content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_name_is_file_stem() {
        assert_eq!(job_name(Path::new("jobs/Load_Orders_0.1.item")), "Load_Orders_0.1");
    }

    #[test]
    fn test_extension_matching_ignores_leading_dot() {
        let source = DirectorySource::with_extensions("/tmp", [".item", "xml"]);
        assert!(source.matches(Path::new("a/b.item")));
        assert!(source.matches(Path::new("a/b.xml")));
        assert!(!source.matches(Path::new("a/b.properties")));
    }

    #[test]
    fn test_duplicate_job_names_are_kept_apart() {
        let source = InMemorySource::new()
            .with_job("a/Load.item", r#"<ProcessType><node componentName="tJava" uniqueName="first"/></ProcessType>"#)
            .with_job("b/Load.item", r#"<ProcessType><node componentName="tJava" uniqueName="second"/></ProcessType>"#)
            .with_job("c/Load.item", "<ProcessType/>")
            .with_job("d/Other.item", "<ProcessType/>");
        let result = JobLoader::new(source).load().unwrap();

        let names: Vec<&str> = result.jobs.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["Load", "Load_2", "Load_3", "Other"]);
        assert_eq!(result.jobs[0].nodes[0].unique_name, "first");
        assert_eq!(result.jobs[1].nodes[0].unique_name, "second");
    }

    #[test]
    fn test_unique_name_skips_taken_suffixes() {
        let taken: HashSet<String> = ["Load", "Load_2"].iter().map(|s| s.to_string()).collect();
        assert_eq!(unique_name("Load", &taken), "Load_3");
        assert_eq!(unique_name("Other", &taken), "Other");
    }

    #[test]
    fn test_malformed_job_is_skipped() {
        let source = InMemorySource::new()
            .with_job("Broken.item", "<ProcessType><node>")
            .with_job("Good.item", "<ProcessType/>");
        let result = JobLoader::new(source).load().unwrap();

        assert_eq!(result.jobs.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert!(result.failures[0].error.contains("Broken.item"));
    }
}
