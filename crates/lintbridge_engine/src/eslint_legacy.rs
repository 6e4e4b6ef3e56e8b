//! ESLint adapter, first generation.
//!
//! The engine is invoked once over the whole path list, reads the files
//! itself and answers with one report keyed by file path.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::adapter::source_name;
use crate::eslint::{
    EslintFileReport, EslintReport, entry_for, normalize_messages, reports_path,
};
use crate::{
    BatchEntry, EngineAdapter, EngineBackend, EngineError, EngineKind, EngineOutput, EngineRequest,
    ExecutionShape, Severity,
};

/// Maps a first-generation ESLint severity to the canonical level.
///
/// Only `1` (warning) and `2` (error) are emitted by this generation; there is
/// no informational level.
pub fn severity(value: u64) -> Severity {
    match value {
        1 => Severity::Warn,
        _ => Severity::Error,
    }
}

/// Adapter for the first ESLint generation.
pub struct EslintLegacyAdapter {
    backend: Arc<dyn EngineBackend>,
}

impl EslintLegacyAdapter {
    const ENGINE: &'static str = "ESLint (legacy)";

    pub fn new(backend: Arc<dyn EngineBackend>) -> Self {
        Self { backend }
    }

    /// Converts one report entry, attributing it to `path`.
    fn convert(&self, entry: EslintFileReport, path: &Path) -> Result<EngineOutput, EngineError> {
        let source = source_name(path);
        let (diagnostics, problems, errors, _warnings) =
            normalize_messages(Self::ENGINE, &source, entry.messages, severity)?;

        // Warnings still produce problems but never prevent a clean result.
        let clean = entry.error_count.unwrap_or(errors) == 0;

        Ok(EngineOutput::new(path, diagnostics, problems, clean))
    }
}

impl EngineAdapter for EslintLegacyAdapter {
    fn kind(&self) -> EngineKind {
        EngineKind::EslintLegacy
    }

    fn shape(&self) -> ExecutionShape {
        ExecutionShape::Batch
    }

    fn lint(
        &self,
        path: &Path,
        source: Option<&str>,
        options: &Value,
    ) -> Result<EngineOutput, EngineError> {
        let paths = [path.to_path_buf()];
        let request = EngineRequest::new(self.kind(), &paths, options).with_source(source);
        let report = EslintReport::parse(Self::ENGINE, self.backend.invoke(&request)?)?;

        match entry_for(report.into_files(), path) {
            Some(entry) => self.convert(entry, path),
            None => Err(EngineError::MissingReport(path.display().to_string())),
        }
    }

    fn lint_batch(
        &self,
        paths: &[PathBuf],
        options: &Value,
    ) -> Result<Vec<BatchEntry>, EngineError> {
        let request = EngineRequest::new(self.kind(), paths, options);
        let report = EslintReport::parse(Self::ENGINE, self.backend.invoke(&request)?)?;
        let files = report.into_files();

        debug!(
            "{} reported {} file(s) for {} input(s)",
            Self::ENGINE,
            files.len(),
            paths.len()
        );

        let owners = attribute(&files, paths);
        let mut claimed = vec![false; paths.len()];
        let mut entries = Vec::with_capacity(paths.len());

        for (file, owner) in files.into_iter().zip(owners) {
            let Some(index) = owner else {
                warn!(
                    "{} reported {}, which is not an input; ignoring it",
                    Self::ENGINE,
                    file.file_path
                );
                continue;
            };
            claimed[index] = true;
            let path = paths[index].clone();
            let output = self.convert(file, &path);
            entries.push(BatchEntry { path, output });
        }

        for (path, _) in paths.iter().zip(&claimed).filter(|(_, seen)| !**seen) {
            entries.push(BatchEntry {
                path: path.clone(),
                output: Err(EngineError::MissingReport(path.display().to_string())),
            });
        }

        Ok(entries)
    }
}

/// Attributes each report entry to at most one input.
///
/// An entry goes to the unclaimed input that matches the most trailing path
/// components. Entries left over are matched by position when the report
/// and the input list have the same length.
fn attribute(files: &[EslintFileReport], paths: &[PathBuf]) -> Vec<Option<usize>> {
    let mut claimed = vec![false; paths.len()];
    let mut owners: Vec<Option<usize>> = Vec::with_capacity(files.len());

    for file in files {
        let owner = paths
            .iter()
            .enumerate()
            .filter(|(index, path)| !claimed[*index] && reports_path(&file.file_path, path))
            .max_by_key(|(_, path)| path.components().count())
            .map(|(index, _)| index);
        if let Some(index) = owner {
            claimed[index] = true;
        }
        owners.push(owner);
    }

    if files.len() == paths.len() {
        for (index, owner) in owners.iter_mut().enumerate() {
            if owner.is_none() && !claimed[index] {
                claimed[index] = true;
                *owner = Some(index);
            }
        }
    }

    owners
}
