//! Storage sinks for streamed documents.
//!
//! The document assembler never touches storage itself; fragments are handed
//! one at a time to a [`StorageSink`], which decides where they land.

use crate::config::ExportOptions;
use crate::error::{ExportError, Result};
use crate::format::{export_file_name, session_file_prefix, unified_file_prefix, ExportFormat};
use crate::graphml::GraphMlDocument;
use crate::preprocess::prepare_networks;
use indexmap::IndexMap;
use network_types::{Codebook, Network, Session};
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Destination for exported files.
pub trait StorageSink {
    fn create_directory(&mut self, path: &Path) -> Result<()>;

    /// Append `chunk` to the file at `path`, creating it if needed.
    fn write(&mut self, path: &Path, chunk: &str) -> Result<()>;

    /// Delete the file at `path`; a missing file is not an error.
    fn remove(&mut self, path: &Path) -> Result<()>;

    /// Flush anything still buffered.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

// ============================================================================
// FILESYSTEM
// ============================================================================

/// Sink writing under a root directory, keeping the current file open.
pub struct FsSink {
    root: PathBuf,
    current: Option<(PathBuf, BufWriter<File>)>,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            current: None,
        }
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        self.root.join(path)
    }

    fn close_current(&mut self) -> Result<()> {
        if let Some((path, mut writer)) = self.current.take() {
            writer.flush().map_err(|e| ExportError::io(&path, e))?;
        }
        Ok(())
    }
}

impl StorageSink for FsSink {
    fn create_directory(&mut self, path: &Path) -> Result<()> {
        let full = self.resolve(path);
        fs::create_dir_all(&full).map_err(|e| ExportError::io(&full, e))
    }

    fn write(&mut self, path: &Path, chunk: &str) -> Result<()> {
        let full = self.resolve(path);
        let is_current = matches!(&self.current, Some((open, _)) if *open == full);
        if !is_current {
            self.close_current()?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&full)
                .map_err(|e| ExportError::io(&full, e))?;
            self.current = Some((full.clone(), BufWriter::new(file)));
        }
        if let Some((_, writer)) = self.current.as_mut() {
            writer
                .write_all(chunk.as_bytes())
                .map_err(|e| ExportError::io(&full, e))?;
        }
        Ok(())
    }

    fn remove(&mut self, path: &Path) -> Result<()> {
        let full = self.resolve(path);
        if matches!(&self.current, Some((open, _)) if *open == full) {
            // Close the handle before the file goes away.
            self.current = None;
        }
        match fs::remove_file(&full) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ExportError::io(&full, e)),
        }
    }

    fn finish(&mut self) -> Result<()> {
        self.close_current()
    }
}

// ============================================================================
// IN-MEMORY
// ============================================================================

/// Sink keeping files in memory, in creation order.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub directories: Vec<PathBuf>,
    pub files: IndexMap<PathBuf, String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<&str> {
        self.files.get(path.as_ref()).map(String::as_str)
    }
}

impl StorageSink for MemorySink {
    fn create_directory(&mut self, path: &Path) -> Result<()> {
        if !self.directories.iter().any(|d| d == path) {
            self.directories.push(path.to_path_buf());
        }
        Ok(())
    }

    fn write(&mut self, path: &Path, chunk: &str) -> Result<()> {
        self.files.entry(path.to_path_buf()).or_default().push_str(chunk);
        Ok(())
    }

    fn remove(&mut self, path: &Path) -> Result<()> {
        self.files.shift_remove(path);
        Ok(())
    }
}

// ============================================================================
// EXPORT
// ============================================================================

/// Outcome of streaming one document into a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub path: PathBuf,
    pub fragments: usize,
    pub bytes: usize,
}

/// Stream `document` into `path`, writing each fragment before pulling the next.
///
/// On any failure the partially written file is removed and the original
/// error is returned.
pub fn export_to_sink<S>(
    document: GraphMlDocument<'_>,
    sink: &mut S,
    path: &Path,
) -> Result<ExportSummary>
where
    S: StorageSink + ?Sized,
{
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        sink.create_directory(parent)?;
    }

    let mut summary = ExportSummary {
        path: path.to_path_buf(),
        fragments: 0,
        bytes: 0,
    };
    for fragment in document {
        let written = fragment.and_then(|chunk| {
            sink.write(path, &chunk)?;
            Ok(chunk.len())
        });
        match written {
            Ok(bytes) => {
                summary.fragments += 1;
                summary.bytes += bytes;
            }
            Err(err) => {
                discard_partial(sink, path);
                return Err(err);
            }
        }
    }
    if let Err(err) = sink.finish() {
        discard_partial(sink, path);
        return Err(err);
    }

    tracing::info!(
        path = %summary.path.display(),
        fragments = summary.fragments,
        bytes = summary.bytes,
        "graphml export complete"
    );
    Ok(summary)
}

/// Best-effort removal of a failed export; the caller reports the original error.
fn discard_partial<S: StorageSink + ?Sized>(sink: &mut S, path: &Path) {
    if let Err(cleanup) = sink.remove(path) {
        tracing::warn!(
            path = %path.display(),
            error = %cleanup,
            "failed to remove partial export"
        );
    }
}

/// Prepare `sessions` and export one GraphML file per resulting network into `directory`.
///
/// Files are named `{caseId}_{sessionUUID}_graphml.graphml`, or after the
/// protocol of the first session when networks are unified.
pub fn export_sessions<S>(
    sessions: &[Session],
    codebook: &Codebook,
    options: &ExportOptions,
    sink: &mut S,
    directory: &Path,
) -> Result<Vec<ExportSummary>>
where
    S: StorageSink + ?Sized,
{
    let networks = prepare_networks(sessions, options)?;
    let mut summaries = Vec::with_capacity(networks.len());
    for network in &networks {
        let prefix = match network {
            Network::Single(session) => session_file_prefix(&session.session_variables),
            Network::Unified(unified) => match unified.session_variables.values().next() {
                Some(variables) => unified_file_prefix(variables),
                None => continue,
            },
        };
        let path = directory.join(export_file_name(&prefix, ExportFormat::GraphMl, None));
        let document = GraphMlDocument::new(network, codebook, options)?;
        summaries.push(export_to_sink(document, sink, &path)?);
    }
    Ok(summaries)
}
