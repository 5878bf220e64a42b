//! The per-run table of output files.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashSet};
use std::path::{Component, Path};

use weave_common::ContentHash;

use crate::error::OutputError;
use crate::kind::FileKind;
use crate::manifest::OutputManifest;
use crate::writer::{Buffer, OutputWriter};

/// Counts of what a flush did on disk.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FlushReport {
    /// Files created or overwritten.
    pub written: usize,
    /// Files whose on-disk content already matched.
    pub unchanged: usize,
    /// Stale files from the previous run that were deleted.
    pub removed: usize,
}

impl FlushReport {
    /// Adds the counts of another report into this one.
    pub fn merge(&mut self, other: FlushReport) {
        self.written += other.written;
        self.unchanged += other.unchanged;
        self.removed += other.removed;
    }
}

#[derive(Debug)]
struct Entry {
    kind: FileKind,
    buffer: Buffer,
    text: String,
    hash: ContentHash,
}

/// Owns every output file of one compiler run.
///
/// Writers are scoped through [`write`](Self::write). Committed files stay in
/// memory until [`flush`](Self::flush) writes the ones committed since the
/// previous flush. All methods take `&self` so that a backend can open a
/// second file while the first one is still being written.
#[derive(Debug, Default)]
pub struct OutputManager {
    files: RefCell<BTreeMap<String, Entry>>,
    open: RefCell<HashSet<String>>,
    pending: RefCell<Vec<String>>,
}

impl OutputManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a writer for `path`, runs `body` with it and commits the file.
    ///
    /// The file is committed whether `body` succeeds or not; the body's
    /// result is returned unchanged. Opening a path that is still open fails
    /// with [`OutputError::AlreadyOpen`]. Reopening a committed header seeds
    /// the writer with its previous directives and body; reopening any other
    /// kind fails with [`OutputError::DuplicateOutput`], and reopening with a
    /// different kind fails with [`OutputError::KindMismatch`].
    pub fn write<W, T, E>(
        &self,
        path: &str,
        body: impl FnOnce(&mut W) -> Result<T, E>,
    ) -> Result<T, E>
    where
        W: OutputWriter,
        E: From<OutputError>,
    {
        validate_path(path)?;
        if self.open.borrow().contains(path) {
            return Err(OutputError::AlreadyOpen(path.to_string()).into());
        }
        let seed = match self.files.borrow().get(path) {
            Some(entry) if entry.kind != W::KIND => {
                return Err(OutputError::KindMismatch {
                    path: path.to_string(),
                    existing: entry.kind,
                    requested: W::KIND,
                }
                .into());
            }
            Some(_) if !W::KIND.accumulates() => {
                return Err(OutputError::DuplicateOutput(path.to_string()).into());
            }
            Some(entry) => entry.buffer.clone(),
            None => Buffer::new(path),
        };

        self.open.borrow_mut().insert(path.to_string());
        let mut writer = W::from_buffer(seed);
        let result = body(&mut writer);
        self.open.borrow_mut().remove(path);
        self.commit::<W>(writer.into_buffer());
        result
    }

    fn commit<W: OutputWriter>(&self, buffer: Buffer) {
        let text = W::render(&buffer);
        let hash = ContentHash::from_bytes(text.as_bytes());
        let path = buffer.path().to_string();
        tracing::debug!(
            path = %path,
            kind = %W::KIND,
            lines = buffer.lines().len(),
            "committed output"
        );
        {
            let mut pending = self.pending.borrow_mut();
            if !pending.contains(&path) {
                pending.push(path.clone());
            }
        }
        self.files.borrow_mut().insert(
            path,
            Entry {
                kind: W::KIND,
                buffer,
                text,
                hash,
            },
        );
    }

    /// Returns the committed text of `path`.
    pub fn contents(&self, path: &str) -> Option<String> {
        self.files.borrow().get(path).map(|e| e.text.clone())
    }

    /// Returns the kind `path` was committed as.
    pub fn kind(&self, path: &str) -> Option<FileKind> {
        self.files.borrow().get(path).map(|e| e.kind)
    }

    /// Returns all committed paths in sorted order.
    pub fn paths(&self) -> Vec<String> {
        self.files.borrow().keys().cloned().collect()
    }

    /// Returns the number of committed files.
    pub fn len(&self) -> usize {
        self.files.borrow().len()
    }

    /// Returns `true` if nothing was committed.
    pub fn is_empty(&self) -> bool {
        self.files.borrow().is_empty()
    }

    /// Writes every file committed since the last flush under `root`.
    ///
    /// Parent directories are created as needed. A file whose current
    /// on-disk content hashes equal to the committed text is left untouched.
    pub fn flush(&self, root: &Path) -> Result<FlushReport, OutputError> {
        let pending = std::mem::take(&mut *self.pending.borrow_mut());
        let files = self.files.borrow();
        let mut report = FlushReport::default();
        for rel in pending {
            let Some(entry) = files.get(&rel) else {
                continue;
            };
            let dst = root.join(&rel);
            if let Ok(existing) = std::fs::read(&dst) {
                if ContentHash::from_bytes(&existing) == entry.hash {
                    tracing::debug!(path = %rel, "output unchanged");
                    report.unchanged += 1;
                    continue;
                }
            }
            if let Some(parent) = dst.parent() {
                std::fs::create_dir_all(parent).map_err(|e| OutputError::Io {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            std::fs::write(&dst, &entry.text).map_err(|e| OutputError::Io {
                path: dst.clone(),
                source: e,
            })?;
            tracing::debug!(path = %rel, hash = %entry.hash, "wrote output");
            report.written += 1;
        }
        Ok(report)
    }

    /// Flushes what is left, removes files the previous run produced but
    /// this one did not, and saves the new manifest.
    pub fn finish(&self, root: &Path) -> Result<FlushReport, OutputError> {
        let mut report = self.flush(root)?;
        let files = self.files.borrow();

        if let Some(previous) = OutputManifest::load(root) {
            for rel in previous.files.keys() {
                if files.contains_key(rel) || validate_path(rel).is_err() {
                    continue;
                }
                let stale = root.join(rel);
                match std::fs::remove_file(&stale) {
                    Ok(()) => {
                        tracing::debug!(path = %rel, "removed stale output");
                        report.removed += 1;
                    }
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => {
                        return Err(OutputError::Io {
                            path: stale,
                            source: e,
                        })
                    }
                }
            }
        }

        let mut manifest = OutputManifest::new(env!("CARGO_PKG_VERSION"));
        for (rel, entry) in files.iter() {
            manifest.files.insert(rel.clone(), entry.hash);
        }
        manifest.save(root)?;
        Ok(report)
    }
}

/// Output paths are relative, non-empty and stay inside the output root.
fn validate_path(path: &str) -> Result<(), OutputError> {
    let p = Path::new(path);
    let ok = !path.is_empty() && p.components().all(|c| matches!(c, Component::Normal(_)));
    if ok {
        Ok(())
    } else {
        Err(OutputError::InvalidPath(path.to_string()))
    }
}
