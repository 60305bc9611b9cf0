//! Transcript archive writer
//!
//! Rendered transcripts are handed to a background thread that owns all file
//! I/O. Files land in `<root>/<channel>/<name>.html`.

use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{unbounded, Receiver, Sender};
use tracing::{info, warn};

use crate::error::{Result, TranscriptError};

/// One transcript to be written.
#[derive(Debug, Clone)]
pub struct ArchiveJob {
    pub channel: String,
    /// File stem, usually the export date.
    pub name: String,
    pub html: String,
}

/// Outcome of every job the writer processed.
#[derive(Debug, Default)]
pub struct ArchiveReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(String, TranscriptError)>,
}

/// Queues transcripts for writing without blocking the caller.
pub struct TranscriptWriter {
    tx: Option<Sender<ArchiveJob>>,
    handle: Option<JoinHandle<ArchiveReport>>,
}

impl TranscriptWriter {
    /// Create the archive root and spawn the writer thread.
    pub fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|source| TranscriptError::Write {
            path: root.clone(),
            source,
        })?;

        let (tx, rx) = unbounded::<ArchiveJob>();
        let handle = thread::spawn(move || run_writer_thread(rx, root));

        Ok(Self {
            tx: Some(tx),
            handle: Some(handle),
        })
    }

    /// Queue a job. Fails only when the writer thread is gone.
    pub fn submit(&self, job: ArchiveJob) -> Result<()> {
        let tx = self.tx.as_ref().ok_or(TranscriptError::WriterClosed)?;
        tx.send(job).map_err(|_| TranscriptError::WriterClosed)
    }

    /// Close the queue, wait for pending writes and return what happened.
    pub fn finish(mut self) -> Result<ArchiveReport> {
        self.tx.take();
        match self.handle.take() {
            Some(handle) => handle.join().map_err(|_| TranscriptError::WriterClosed),
            None => Err(TranscriptError::WriterClosed),
        }
    }
}

impl Drop for TranscriptWriter {
    fn drop(&mut self) {
        self.tx.take();
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn run_writer_thread(rx: Receiver<ArchiveJob>, root: PathBuf) -> ArchiveReport {
    let mut report = ArchiveReport::default();

    while let Ok(job) = rx.recv() {
        match write_job(&root, &job) {
            Ok(path) => {
                info!(path = %path.display(), bytes = job.html.len(), "archived transcript");
                report.written.push(path);
            }
            Err(e) => {
                warn!(channel = %job.channel, error = %e, "failed to archive transcript");
                report.failed.push((job.name, e));
            }
        }
    }

    report
}

fn write_job(root: &Path, job: &ArchiveJob) -> Result<PathBuf> {
    let channel_dir = root.join(sanitize_filename(&job.channel));
    fs::create_dir_all(&channel_dir).map_err(|source| TranscriptError::Write {
        path: channel_dir.clone(),
        source,
    })?;

    let path = channel_dir.join(format!("{}.html", sanitize_filename(&job.name)));
    fs::write(&path, job.html.as_bytes()).map_err(|source| TranscriptError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

/// Sanitize a channel or file name to be filesystem-safe
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            '#' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        "transcript".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("#general"), "_general");
        assert_eq!(sanitize_filename("support-2026-10-17"), "support-2026-10-17");
        assert_eq!(sanitize_filename("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_filename(".."), "transcript");
        assert_eq!(sanitize_filename("  "), "transcript");
    }

    #[test]
    fn test_writes_jobs_in_background() {
        let dir = tempfile::tempdir().unwrap();
        let writer = TranscriptWriter::new(dir.path()).unwrap();
        writer
            .submit(ArchiveJob {
                channel: "#support".into(),
                name: "2026-10-17".into(),
                html: "<div>one</div>".into(),
            })
            .unwrap();
        writer
            .submit(ArchiveJob {
                channel: "#support".into(),
                name: "2026-10-18".into(),
                html: "<div>two</div>".into(),
            })
            .unwrap();

        let report = writer.finish().unwrap();
        assert!(report.failed.is_empty());
        assert_eq!(report.written.len(), 2);

        let first = dir.path().join("_support").join("2026-10-17.html");
        assert_eq!(fs::read_to_string(first).unwrap(), "<div>one</div>");
    }

    #[test]
    fn test_failed_write_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        // A plain file where the channel directory should go.
        fs::write(dir.path().join("blocked"), "x").unwrap();

        let writer = TranscriptWriter::new(dir.path()).unwrap();
        writer
            .submit(ArchiveJob {
                channel: "blocked".into(),
                name: "today".into(),
                html: String::new(),
            })
            .unwrap();

        let report = writer.finish().unwrap();
        assert!(report.written.is_empty());
        assert_eq!(report.failed.len(), 1);
        assert!(matches!(report.failed[0].1, TranscriptError::Write { .. }));
    }
}
